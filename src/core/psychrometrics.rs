/// Conversions between the representations of humid air (absolute humidity, relative humidity,
/// dew point) based on the Magnus approximation of the saturation vapour pressure over water.
///
/// Absolute humidity is expressed in kg water per kg dry air, temperatures in ºC and pressures
/// in hPa. All functions are pure and report physically invalid inputs as a `DomainError`.
use crate::core::units::percent_to_fraction;
use crate::errors::DomainError;

// Magnus coefficients over water
const MAGNUS_A: f64 = 6.112; // hPa
const MAGNUS_B: f64 = 17.62;
const MAGNUS_C: f64 = 243.12; // ºC

const GAS_CONSTANT_DRY_AIR: f64 = 287.; // J/(kg.K)
const GAS_CONSTANT_WATER_VAPOUR: f64 = 461.4; // J/(kg.K)
const GAS_CONSTANT_RATIO: f64 = GAS_CONSTANT_DRY_AIR / GAS_CONSTANT_WATER_VAPOUR;
pub const TOTAL_PRESSURE_HPA: f64 = 1013.;

// empirical dew point approximation, not derived from the Magnus formula
const DEW_POINT_OFFSET: f64 = 109.8; // ºC
const DEW_POINT_EXPONENT: f64 = 8.02;

fn check_magnus_temperature(temperature: f64) -> Result<f64, DomainError> {
    if !temperature.is_finite() || temperature <= -MAGNUS_C {
        return Err(DomainError::TemperatureOutOfRange(temperature));
    }

    Ok(temperature)
}

fn check_relative_humidity_percent(relative_humidity: f64) -> Result<f64, DomainError> {
    if !(0. ..=100.).contains(&relative_humidity) {
        return Err(DomainError::RelativeHumidityOutOfRange(relative_humidity));
    }

    Ok(relative_humidity)
}

/// Saturation vapour pressure over water in hPa.
pub fn saturation_vapour_pressure(temperature: f64) -> Result<f64, DomainError> {
    let temperature = check_magnus_temperature(temperature)?;

    Ok(MAGNUS_A * ((MAGNUS_B * temperature) / (MAGNUS_C + temperature)).exp())
}

fn absolute_humidity_from_vapour_pressure(vapour_pressure: f64) -> Result<f64, DomainError> {
    if vapour_pressure >= TOTAL_PRESSURE_HPA {
        return Err(DomainError::Supersaturated {
            vapour_pressure,
            total_pressure: TOTAL_PRESSURE_HPA,
        });
    }

    Ok(GAS_CONSTANT_RATIO * (vapour_pressure / (TOTAL_PRESSURE_HPA - vapour_pressure)))
}

/// Absolute humidity of air at `temperature` whose dew point is `dew_point_temperature`.
///
/// The saturation ratio is formed from a single combined exponent over the common
/// denominator `(c + T)`.
pub fn absolute_humidity_from_dew_point(
    temperature: f64,
    dew_point_temperature: f64,
) -> Result<f64, DomainError> {
    let saturation_pressure = saturation_vapour_pressure(temperature)?;
    let dew_point_temperature = check_magnus_temperature(dew_point_temperature)?;

    let saturation_ratio = ((((dew_point_temperature * MAGNUS_B * MAGNUS_C)
        / (MAGNUS_C + temperature))
        - ((MAGNUS_C * MAGNUS_B * temperature) / (MAGNUS_C + temperature)))
        / (dew_point_temperature + MAGNUS_C))
        .exp();

    absolute_humidity_from_vapour_pressure(saturation_ratio * saturation_pressure)
}

/// Same quantity as [`absolute_humidity_from_dew_point`], with the saturation ratio formed as
/// the difference of the two Magnus exponents. Both forms agree on physically valid inputs.
pub fn absolute_humidity_from_dew_point_magnus_difference(
    temperature: f64,
    dew_point_temperature: f64,
) -> Result<f64, DomainError> {
    let saturation_pressure = saturation_vapour_pressure(temperature)?;
    let dew_point_temperature = check_magnus_temperature(dew_point_temperature)?;

    let saturation_ratio = (((dew_point_temperature * MAGNUS_B)
        / (dew_point_temperature + MAGNUS_C))
        - ((temperature * MAGNUS_B) / (temperature + MAGNUS_C)))
        .exp();

    absolute_humidity_from_vapour_pressure(saturation_ratio * saturation_pressure)
}

/// Relative humidity as a fraction (0-1) of air at `temperature` with the given absolute humidity.
pub fn relative_humidity_from_absolute(
    temperature: f64,
    absolute_humidity: f64,
) -> Result<f64, DomainError> {
    let saturation_pressure = saturation_vapour_pressure(temperature)?;

    Ok(vapour_partial_pressure(absolute_humidity)? / saturation_pressure)
}

/// Absolute humidity of air at `temperature` with a relative humidity given in percent (0-100).
pub fn absolute_humidity_from_relative(
    temperature: f64,
    relative_humidity: f64,
) -> Result<f64, DomainError> {
    let relative_humidity = percent_to_fraction(check_relative_humidity_percent(relative_humidity)?);
    let saturation_pressure = saturation_vapour_pressure(temperature)?;

    absolute_humidity_from_vapour_pressure(relative_humidity * saturation_pressure)
}

/// Partial pressure of water vapour in hPa.
pub fn vapour_partial_pressure(absolute_humidity: f64) -> Result<f64, DomainError> {
    if !(absolute_humidity >= 0.) {
        return Err(DomainError::NegativeAbsoluteHumidity(absolute_humidity));
    }

    Ok(TOTAL_PRESSURE_HPA * absolute_humidity / (GAS_CONSTANT_RATIO + absolute_humidity))
}

pub fn dew_point_from_absolute(absolute_humidity: f64) -> Result<f64, DomainError> {
    if !(absolute_humidity > 0.) {
        return Err(DomainError::NonPositiveAbsoluteHumidity(absolute_humidity));
    }

    let vapour_pressure = vapour_partial_pressure(absolute_humidity)?;
    let log_pressure_ratio = (vapour_pressure / MAGNUS_A).ln();
    if log_pressure_ratio >= MAGNUS_B {
        return Err(DomainError::DewPointUndefined(vapour_pressure));
    }

    Ok((MAGNUS_C * log_pressure_ratio) / (MAGNUS_B - log_pressure_ratio))
}

/// Dew point from temperature and relative humidity in percent (0-100).
///
/// This is an empirical power-law fit and a different model from the Magnus based
/// conversions above, so it does not round-trip exactly with them.
pub fn dew_point_from_relative(
    temperature: f64,
    relative_humidity: f64,
) -> Result<f64, DomainError> {
    let relative_humidity = percent_to_fraction(check_relative_humidity_percent(relative_humidity)?);

    Ok((DEW_POINT_OFFSET + temperature) * relative_humidity.powf(1. / DEW_POINT_EXPONENT)
        - DEW_POINT_OFFSET)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn test_saturation_vapour_pressure() {
        assert_relative_eq!(
            saturation_vapour_pressure(20.).unwrap(),
            23.32596022097807,
            max_relative = 1e-12
        );
        assert_eq!(saturation_vapour_pressure(0.).unwrap(), MAGNUS_A);
    }

    #[rstest]
    fn test_saturation_vapour_pressure_rejects_temperature_at_pole() {
        assert_eq!(
            saturation_vapour_pressure(-MAGNUS_C),
            Err(DomainError::TemperatureOutOfRange(-MAGNUS_C))
        );
    }

    #[rstest]
    #[case(20., 10., 0.007620515460792282)]
    #[case(20., -50., 3.919082147686444e-05)]
    #[case(20., -60., 1.1670511829307285e-05)]
    fn test_absolute_humidity_from_dew_point(
        #[case] temperature: f64,
        #[case] dew_point: f64,
        #[case] expected: f64,
    ) {
        assert_relative_eq!(
            absolute_humidity_from_dew_point(temperature, dew_point).unwrap(),
            expected,
            max_relative = 1e-10
        );
    }

    #[rstest]
    fn test_dew_point_formula_variants_agree() {
        for temperature in (0..=55).step_by(5).map(f64::from) {
            for dew_point in (-70..=temperature as i32).step_by(5).map(f64::from) {
                assert_relative_eq!(
                    absolute_humidity_from_dew_point(temperature, dew_point).unwrap(),
                    absolute_humidity_from_dew_point_magnus_difference(temperature, dew_point)
                        .unwrap(),
                    max_relative = 1e-9
                );
            }
        }
    }

    #[rstest]
    fn test_absolute_humidity_increases_with_dew_point() {
        let temperature = 20.;
        let humidities = (-80..=20)
            .map(|dew_point| absolute_humidity_from_dew_point(temperature, dew_point as f64).unwrap())
            .collect::<Vec<_>>();

        assert!(humidities.windows(2).all(|pair| pair[1] > pair[0]));
    }

    #[rstest]
    fn test_relative_humidity_round_trips_through_dew_point() {
        for temperature in (0..=40).step_by(4).map(f64::from) {
            for dew_point in (-60..=temperature as i32).step_by(3).map(f64::from) {
                let absolute_humidity =
                    absolute_humidity_from_dew_point(temperature, dew_point).unwrap();
                let expected = saturation_vapour_pressure(dew_point).unwrap()
                    / saturation_vapour_pressure(temperature).unwrap();

                assert_relative_eq!(
                    relative_humidity_from_absolute(temperature, absolute_humidity).unwrap(),
                    expected,
                    max_relative = 1e-3
                );
            }
        }
    }

    #[rstest]
    fn test_absolute_and_relative_humidity_invert_each_other() {
        let absolute_humidity = absolute_humidity_from_relative(25., 60.).unwrap();

        assert_relative_eq!(
            relative_humidity_from_absolute(25., absolute_humidity).unwrap(),
            0.6,
            max_relative = 1e-12
        );
    }

    #[rstest]
    fn test_dew_point_from_absolute_inverts_absolute_from_dew_point() {
        let absolute_humidity = absolute_humidity_from_dew_point(20., -40.).unwrap();

        assert_relative_eq!(
            dew_point_from_absolute(absolute_humidity).unwrap(),
            -40.,
            max_relative = 1e-9
        );
    }

    #[rstest]
    fn test_vapour_partial_pressure() {
        assert_eq!(vapour_partial_pressure(0.).unwrap(), 0.);
        let absolute_humidity = absolute_humidity_from_dew_point(20., 10.).unwrap();
        assert_relative_eq!(
            vapour_partial_pressure(absolute_humidity).unwrap(),
            saturation_vapour_pressure(10.).unwrap(),
            max_relative = 1e-12
        );
    }

    #[rstest]
    fn test_supersaturated_air_is_a_domain_error() {
        // saturation pressure at 100ºC exceeds the reference pressure
        assert!(matches!(
            absolute_humidity_from_relative(100., 100.),
            Err(DomainError::Supersaturated { .. })
        ));
        assert!(matches!(
            absolute_humidity_from_dew_point(100., 100.),
            Err(DomainError::Supersaturated { .. })
        ));
    }

    #[rstest]
    fn test_invalid_humidities_are_domain_errors() {
        assert_eq!(
            vapour_partial_pressure(-0.001),
            Err(DomainError::NegativeAbsoluteHumidity(-0.001))
        );
        assert_eq!(
            dew_point_from_absolute(0.),
            Err(DomainError::NonPositiveAbsoluteHumidity(0.))
        );
        assert_eq!(
            absolute_humidity_from_relative(20., 101.),
            Err(DomainError::RelativeHumidityOutOfRange(101.))
        );
        assert_eq!(
            dew_point_from_relative(20., -1.),
            Err(DomainError::RelativeHumidityOutOfRange(-1.))
        );
    }

    #[rstest]
    #[case(20., 50., 9.252845577850792)]
    #[case(20., 100., 20.)]
    #[case(-5., 0., -DEW_POINT_OFFSET)]
    fn test_dew_point_from_relative(
        #[case] temperature: f64,
        #[case] relative_humidity: f64,
        #[case] expected: f64,
    ) {
        assert_relative_eq!(
            dew_point_from_relative(temperature, relative_humidity).unwrap(),
            expected,
            max_relative = 1e-10
        );
    }
}
