/// Translation of the physical boundary conditions of a dry room into the normalized load used
/// as a query key into the static simulation dataset.
use crate::core::psychrometrics::absolute_humidity_from_dew_point;
use crate::core::units::kg_per_hour_to_kg_per_second;
use crate::errors::DomainError;
use crate::input::BoundaryParameters;
use serde::{Deserialize, Serialize};
use serde_valid::Validate;

const AIR_DENSITY: f64 = 1.17343; // kg/m3
const MOISTURE_RELEASE_PER_PERSON: f64 = 0.113; // kg/h
/// Supply air volume flow of the simulated reference dry room, in m3/h
pub const REFERENCE_VOLUME_FLOW: f64 = 11_000.;

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct NormalizedLoad {
    /// required supply air volume flow relative to the reference dry room
    pub scaling_factor_s: f64,
    /// moisture released into the whole room, in kg/s
    pub max_moisture_load: f64,
}

impl NormalizedLoad {
    pub fn supply_air_volume_flow_m3h(&self) -> f64 {
        self.scaling_factor_s * REFERENCE_VOLUME_FLOW
    }
}

/// Derive the scaling factor S and the room moisture load from the boundary parameters.
///
/// Both absolute humidities are evaluated at the inlet temperature. The supply air has to carry
/// away the moisture released by the people in the air flow zones; leakage and suction flow is
/// added on top of that.
pub fn translate(boundary: &BoundaryParameters) -> Result<NormalizedLoad, DomainError> {
    boundary
        .validate()
        .map_err(|errors| DomainError::InvalidBoundaryParameters(errors.to_string()))?;

    let non_positive_gradient = || DomainError::NonPositiveHumidityGradient {
        room_dew_point: boundary.room_dew_point,
        inlet_dew_point: boundary.inlet_dew_point,
    };

    if boundary.room_dew_point <= boundary.inlet_dew_point {
        return Err(non_positive_gradient());
    }

    let room_absolute_humidity =
        absolute_humidity_from_dew_point(boundary.inlet_temperature, boundary.room_dew_point)?;
    let inlet_absolute_humidity =
        absolute_humidity_from_dew_point(boundary.inlet_temperature, boundary.inlet_dew_point)?;
    let absolute_humidity_difference = room_absolute_humidity - inlet_absolute_humidity;
    if absolute_humidity_difference <= 0. {
        return Err(non_positive_gradient());
    }

    let dehumidification_volume_flow = (boundary.max_humans_in_air_flow as f64
        * MOISTURE_RELEASE_PER_PERSON)
        / (AIR_DENSITY * absolute_humidity_difference);
    let max_volume_flow = dehumidification_volume_flow + boundary.leakage_suction_volume_flow;

    Ok(NormalizedLoad {
        scaling_factor_s: max_volume_flow / REFERENCE_VOLUME_FLOW,
        max_moisture_load: kg_per_hour_to_kg_per_second(
            MOISTURE_RELEASE_PER_PERSON * boundary.max_humans_in_room as f64,
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[fixture]
    fn boundary() -> BoundaryParameters {
        BoundaryParameters {
            max_humans_in_air_flow: 4,
            max_humans_in_room: 6,
            room_dew_point: -50.,
            inlet_dew_point: -60.,
            inlet_temperature: 20.,
            leakage_suction_volume_flow: 500.,
        }
    }

    // partial vapour pressure equals the saturation pressure at the dew point
    fn magnus_absolute_humidity(dew_point: f64) -> f64 {
        let (a, b, c) = (6.112, 17.62, 243.12);
        let vapour_pressure = a * (b * dew_point / (c + dew_point)).exp();
        (287. / 461.4) * vapour_pressure / (1013. - vapour_pressure)
    }

    #[rstest]
    fn test_translate(boundary: BoundaryParameters) {
        let normalized = translate(&boundary).unwrap();

        let humidity_difference =
            magnus_absolute_humidity(-50.) - magnus_absolute_humidity(-60.);
        let volume_flow = 4. * 0.113 / (1.17343 * humidity_difference) + 500.;

        assert_relative_eq!(
            normalized.scaling_factor_s,
            volume_flow / 11000.,
            max_relative = 1e-6
        );
        assert_relative_eq!(
            normalized.scaling_factor_s,
            1.3178884903571928,
            max_relative = 1e-6
        );
        assert_relative_eq!(
            normalized.max_moisture_load,
            0.113 * 6. / 3600.,
            max_relative = 1e-6
        );
        assert_relative_eq!(
            normalized.supply_air_volume_flow_m3h(),
            volume_flow,
            max_relative = 1e-6
        );
    }

    #[rstest]
    fn test_translate_without_people_in_air_flow_uses_leakage_only(
        mut boundary: BoundaryParameters,
    ) {
        boundary.max_humans_in_air_flow = 0;

        assert_relative_eq!(
            translate(&boundary).unwrap().scaling_factor_s,
            500. / 11000.,
            max_relative = 1e-12
        );
    }

    #[rstest]
    #[case(-60.)]
    #[case(-55.)]
    fn test_translate_rejects_room_dew_point_not_above_inlet(
        mut boundary: BoundaryParameters,
        #[case] room_dew_point: f64,
    ) {
        boundary.inlet_dew_point = -55.;
        boundary.room_dew_point = room_dew_point;

        assert_eq!(
            translate(&boundary),
            Err(DomainError::NonPositiveHumidityGradient {
                room_dew_point,
                inlet_dew_point: -55.,
            })
        );
    }

    #[rstest]
    fn test_translate_rejects_negative_leakage(mut boundary: BoundaryParameters) {
        boundary.leakage_suction_volume_flow = -1.;

        assert!(matches!(
            translate(&boundary),
            Err(DomainError::InvalidBoundaryParameters(_))
        ));
    }
}
