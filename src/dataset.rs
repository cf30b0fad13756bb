/// The static simulation dataset: one row per simulated dry room case, plus the derived
/// columns needed for interpolation and analysis.
use crate::core::psychrometrics::dew_point_from_relative;
use crate::errors::{DomainError, SchemaError};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::io::{BufReader, Read};
use strum::{Display, EnumIter, IntoStaticStr};
use tracing::warn;

const LOCATION_VARIANT_COLUMN: &str = "locationVariant";
const LOCATION_CODE_LENGTH: usize = 2;

/// Every numeric column of the augmented dataset, named as in the dataset header.
#[derive(Clone, Copy, Debug, Display, EnumIter, Eq, Hash, IntoStaticStr, PartialEq)]
pub enum NumericColumn {
    LoadScalingFactor,
    ScalingFactorS,
    DryRoomHeatLoad,
    DryRoomMoistureLoad,
    OutsideRelativeHumidity,
    OutsideTemperatureDegrees,
    #[strum(serialize = "electricEnergyKwh")]
    ElectricEnergyKwh,
    #[strum(serialize = "naturalGasEnergyKwh")]
    NaturalGasEnergyKwh,
    #[strum(serialize = "districtHeatingEnergyKwh")]
    DistrictHeatingEnergyKwh,
    #[strum(serialize = "finalEnergy")]
    FinalEnergy,
    OutsideDewPointTemperatureDegrees,
}

impl NumericColumn {
    pub fn header(&self) -> &'static str {
        self.into()
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct StaticCaseRow {
    /// location code followed by the case number, e.g. "OS-3"
    #[serde(rename = "locationVariant")]
    pub location_variant: String,
    #[serde(rename = "LoadScalingFactor")]
    pub load_scaling_factor: f64,
    #[serde(rename = "ScalingFactorS")]
    pub scaling_factor_s: f64,
    /// W
    #[serde(rename = "DryRoomHeatLoad")]
    pub dry_room_heat_load: f64,
    /// kg/s
    #[serde(rename = "DryRoomMoistureLoad")]
    pub dry_room_moisture_load: f64,
    /// %, 0-100
    #[serde(rename = "OutsideRelativeHumidity")]
    pub outside_relative_humidity: f64,
    #[serde(rename = "OutsideTemperatureDegrees")]
    pub outside_temperature: f64,
    #[serde(rename = "electricEnergyKwh")]
    pub electric_energy_kwh: f64,
    #[serde(rename = "naturalGasEnergyKwh")]
    pub natural_gas_energy_kwh: f64,
    #[serde(rename = "districtHeatingEnergyKwh")]
    pub district_heating_energy_kwh: f64,
}

impl StaticCaseRow {
    fn numeric_values(&self) -> [(NumericColumn, f64); 9] {
        [
            (NumericColumn::LoadScalingFactor, self.load_scaling_factor),
            (NumericColumn::ScalingFactorS, self.scaling_factor_s),
            (NumericColumn::DryRoomHeatLoad, self.dry_room_heat_load),
            (NumericColumn::DryRoomMoistureLoad, self.dry_room_moisture_load),
            (NumericColumn::OutsideRelativeHumidity, self.outside_relative_humidity),
            (NumericColumn::OutsideTemperatureDegrees, self.outside_temperature),
            (NumericColumn::ElectricEnergyKwh, self.electric_energy_kwh),
            (NumericColumn::NaturalGasEnergyKwh, self.natural_gas_energy_kwh),
            (NumericColumn::DistrictHeatingEnergyKwh, self.district_heating_energy_kwh),
        ]
    }

    fn from_json_row(row_index: usize, row: &Map<String, Value>) -> Result<Self, SchemaError> {
        let numeric = |column: NumericColumn| numeric_value(row_index, row, column.header());

        Ok(Self {
            location_variant: text_value(row_index, row, LOCATION_VARIANT_COLUMN)?,
            load_scaling_factor: numeric(NumericColumn::LoadScalingFactor)?,
            scaling_factor_s: numeric(NumericColumn::ScalingFactorS)?,
            dry_room_heat_load: numeric(NumericColumn::DryRoomHeatLoad)?,
            dry_room_moisture_load: numeric(NumericColumn::DryRoomMoistureLoad)?,
            outside_relative_humidity: numeric(NumericColumn::OutsideRelativeHumidity)?,
            outside_temperature: numeric(NumericColumn::OutsideTemperatureDegrees)?,
            electric_energy_kwh: numeric(NumericColumn::ElectricEnergyKwh)?,
            natural_gas_energy_kwh: numeric(NumericColumn::NaturalGasEnergyKwh)?,
            district_heating_energy_kwh: numeric(NumericColumn::DistrictHeatingEnergyKwh)?,
        })
    }
}

fn text_value(
    row_index: usize,
    row: &Map<String, Value>,
    column: &'static str,
) -> Result<String, SchemaError> {
    match row.get(column) {
        Some(Value::String(text)) => Ok(text.clone()),
        Some(other) => Err(SchemaError::NotText {
            row: row_index,
            column,
            value: other.to_string(),
        }),
        None => Err(SchemaError::MissingColumn {
            row: row_index,
            column,
        }),
    }
}

// numbers may arrive as text when the loader does not infer column types
fn numeric_value(
    row_index: usize,
    row: &Map<String, Value>,
    column: &'static str,
) -> Result<f64, SchemaError> {
    let not_numeric = |value: &Value| SchemaError::NotNumeric {
        row: row_index,
        column,
        value: value.to_string(),
    };

    match row.get(column) {
        Some(value @ Value::Number(number)) => number.as_f64().ok_or_else(|| not_numeric(value)),
        Some(value @ Value::String(text)) => text
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|number| number.is_finite())
            .ok_or_else(|| not_numeric(value)),
        Some(other) => Err(not_numeric(other)),
        None => Err(SchemaError::MissingColumn {
            row: row_index,
            column,
        }),
    }
}

/// The raw static dataset as supplied by the loader. Row order is irrelevant.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StaticDataset {
    rows: Vec<StaticCaseRow>,
}

impl StaticDataset {
    /// Wrap rows built outside of this crate. Every numeric value must be finite.
    pub fn new(rows: Vec<StaticCaseRow>) -> Result<Self, SchemaError> {
        for (row_index, row) in rows.iter().enumerate() {
            if let Some((column, value)) = row
                .numeric_values()
                .into_iter()
                .find(|(_, value)| !value.is_finite())
            {
                return Err(SchemaError::NotNumeric {
                    row: row_index,
                    column: column.header(),
                    value: value.to_string(),
                });
            }
        }

        Ok(Self { rows })
    }

    /// Build the dataset from loosely typed rows, checking that every required column is
    /// present and numeric. Columns that are not needed are ignored.
    pub fn from_rows(rows: &[Map<String, Value>]) -> Result<Self, SchemaError> {
        let rows = rows
            .iter()
            .enumerate()
            .map(|(row_index, row)| StaticCaseRow::from_json_row(row_index, row))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { rows })
    }

    /// Read the dataset from a JSON array of row objects.
    pub fn from_json(json: impl Read) -> Result<Self, SchemaError> {
        let rows: Vec<Map<String, Value>> = serde_json::from_reader(BufReader::new(json))
            .map_err(|err| SchemaError::Unreadable(err.to_string()))?;

        Self::from_rows(&rows)
    }

    pub fn rows(&self) -> &[StaticCaseRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A static case extended with its location, final energy and outside dew point.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AugmentedCase {
    #[serde(flatten)]
    pub raw: StaticCaseRow,
    pub location: String,
    /// kWh
    #[serde(rename = "finalEnergy")]
    pub final_energy: f64,
    #[serde(rename = "OutsideDewPointTemperatureDegrees")]
    pub outside_dew_point_temperature: f64,
}

impl AugmentedCase {
    pub fn from_raw(raw: StaticCaseRow) -> Result<Self, DomainError> {
        let location = raw
            .location_variant
            .chars()
            .take(LOCATION_CODE_LENGTH)
            .collect();
        let final_energy = raw.electric_energy_kwh
            + raw.natural_gas_energy_kwh
            + raw.district_heating_energy_kwh;
        let outside_dew_point_temperature =
            dew_point_from_relative(raw.outside_temperature, raw.outside_relative_humidity)?;

        Ok(Self {
            raw,
            location,
            final_energy,
            outside_dew_point_temperature,
        })
    }

    pub fn value(&self, column: NumericColumn) -> f64 {
        match column {
            NumericColumn::LoadScalingFactor => self.raw.load_scaling_factor,
            NumericColumn::ScalingFactorS => self.raw.scaling_factor_s,
            NumericColumn::DryRoomHeatLoad => self.raw.dry_room_heat_load,
            NumericColumn::DryRoomMoistureLoad => self.raw.dry_room_moisture_load,
            NumericColumn::OutsideRelativeHumidity => self.raw.outside_relative_humidity,
            NumericColumn::OutsideTemperatureDegrees => self.raw.outside_temperature,
            NumericColumn::ElectricEnergyKwh => self.raw.electric_energy_kwh,
            NumericColumn::NaturalGasEnergyKwh => self.raw.natural_gas_energy_kwh,
            NumericColumn::DistrictHeatingEnergyKwh => self.raw.district_heating_energy_kwh,
            NumericColumn::FinalEnergy => self.final_energy,
            NumericColumn::OutsideDewPointTemperatureDegrees => self.outside_dew_point_temperature,
        }
    }

    pub(crate) fn set_value(&mut self, column: NumericColumn, value: f64) {
        let field = match column {
            NumericColumn::LoadScalingFactor => &mut self.raw.load_scaling_factor,
            NumericColumn::ScalingFactorS => &mut self.raw.scaling_factor_s,
            NumericColumn::DryRoomHeatLoad => &mut self.raw.dry_room_heat_load,
            NumericColumn::DryRoomMoistureLoad => &mut self.raw.dry_room_moisture_load,
            NumericColumn::OutsideRelativeHumidity => &mut self.raw.outside_relative_humidity,
            NumericColumn::OutsideTemperatureDegrees => &mut self.raw.outside_temperature,
            NumericColumn::ElectricEnergyKwh => &mut self.raw.electric_energy_kwh,
            NumericColumn::NaturalGasEnergyKwh => &mut self.raw.natural_gas_energy_kwh,
            NumericColumn::DistrictHeatingEnergyKwh => &mut self.raw.district_heating_energy_kwh,
            NumericColumn::FinalEnergy => &mut self.final_energy,
            NumericColumn::OutsideDewPointTemperatureDegrees => {
                &mut self.outside_dew_point_temperature
            }
        };
        *field = value;
    }

    fn derived_values_match(&self, other: &AugmentedCase) -> bool {
        self.location == other.location
            && is_close!(self.final_energy, other.final_energy)
            && is_close!(
                self.outside_dew_point_temperature,
                other.outside_dew_point_temperature
            )
    }
}

/// The augmented dataset is built once and shared read-only between estimations.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AugmentedDataset {
    cases: Vec<AugmentedCase>,
}

impl AugmentedDataset {
    pub fn cases(&self) -> &[AugmentedCase] {
        &self.cases
    }

    pub fn cases_for_location<'a>(
        &'a self,
        location: &'a str,
    ) -> impl Iterator<Item = &'a AugmentedCase> + 'a {
        self.cases
            .iter()
            .filter(move |case| case.location == location)
    }

    /// Distinct location codes in order of first appearance.
    pub fn locations(&self) -> Vec<&str> {
        self.cases
            .iter()
            .map(|case| case.location.as_str())
            .unique()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }
}

/// Derivation of the augmented columns. Augmenting an already augmented dataset recomputes the
/// derived columns from the raw ones and leaves correctly derived values unchanged.
pub trait Augment {
    fn augment(&self) -> Result<AugmentedDataset, DomainError>;
}

impl Augment for StaticDataset {
    fn augment(&self) -> Result<AugmentedDataset, DomainError> {
        let cases = self
            .rows
            .iter()
            .cloned()
            .map(AugmentedCase::from_raw)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(AugmentedDataset { cases })
    }
}

impl Augment for AugmentedDataset {
    fn augment(&self) -> Result<AugmentedDataset, DomainError> {
        let cases = self
            .cases
            .iter()
            .map(|case| {
                let recomputed = AugmentedCase::from_raw(case.raw.clone())?;
                if !recomputed.derived_values_match(case) {
                    warn!(
                        location_variant = %case.raw.location_variant,
                        "derived columns did not match their raw values and were recomputed"
                    );
                }
                Ok(recomputed)
            })
            .collect::<Result<Vec<_>, DomainError>>()?;

        Ok(AugmentedDataset { cases })
    }
}

pub fn augment(raw: &StaticDataset) -> Result<AugmentedDataset, DomainError> {
    raw.augment()
}
