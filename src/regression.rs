/// Inputs and outputs shared with a learned regression model trained on the static dataset.
/// The model itself lives outside this crate and plugs in through [`EnergyRegressor`].
use crate::core::load_normalization::NormalizedLoad;
use crate::core::units::percent_to_fraction;
use crate::dataset::AugmentedDataset;
use crate::errors::RegressionError;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// Model inputs, in the column order the model is trained with.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct RegressionFeatures {
    pub scaling_factor_s: f64,
    /// W
    pub dry_room_heat_load: f64,
    /// kg/s
    pub dry_room_moisture_load: f64,
    /// fraction, 0-1
    pub outside_relative_humidity: f64,
    pub outside_temperature: f64,
}

impl RegressionFeatures {
    pub fn for_query(
        normalized_load: &NormalizedLoad,
        max_waste_heat_w: f64,
        average_outside_relative_humidity: f64,
        average_outside_temperature: f64,
    ) -> Self {
        Self {
            scaling_factor_s: normalized_load.scaling_factor_s,
            dry_room_heat_load: max_waste_heat_w,
            dry_room_moisture_load: normalized_load.max_moisture_load,
            outside_relative_humidity: percent_to_fraction(average_outside_relative_humidity),
            outside_temperature: average_outside_temperature,
        }
    }

    pub fn to_array(&self) -> [f64; 5] {
        [
            self.scaling_factor_s,
            self.dry_room_heat_load,
            self.dry_room_moisture_load,
            self.outside_relative_humidity,
            self.outside_temperature,
        ]
    }
}

/// Predicted (or observed) annual energy demand, in kWh.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct RegressionTargets {
    pub electric_energy_kwh: f64,
    pub natural_gas_energy_kwh: f64,
    pub district_heating_energy_kwh: f64,
}

impl RegressionTargets {
    pub fn final_energy(&self) -> f64 {
        self.electric_energy_kwh + self.natural_gas_energy_kwh + self.district_heating_energy_kwh
    }
}

pub trait EnergyRegressor: Send + Sync {
    fn predict(&self, features: &RegressionFeatures) -> anyhow::Result<RegressionTargets>;
}

/// Model inputs and targets for every case of the dataset.
pub fn training_set(
    dataset: &AugmentedDataset,
) -> (Vec<RegressionFeatures>, Vec<RegressionTargets>) {
    dataset
        .cases()
        .iter()
        .map(|case| {
            (
                RegressionFeatures {
                    scaling_factor_s: case.raw.scaling_factor_s,
                    dry_room_heat_load: case.raw.dry_room_heat_load,
                    dry_room_moisture_load: case.raw.dry_room_moisture_load,
                    outside_relative_humidity: percent_to_fraction(
                        case.raw.outside_relative_humidity,
                    ),
                    outside_temperature: case.raw.outside_temperature,
                },
                RegressionTargets {
                    electric_energy_kwh: case.raw.electric_energy_kwh,
                    natural_gas_energy_kwh: case.raw.natural_gas_energy_kwh,
                    district_heating_energy_kwh: case.raw.district_heating_energy_kwh,
                },
            )
        })
        .unzip()
}

/// Spread of the mean absolute error over cross-validation folds, in kWh.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct MaeSummary {
    pub mean: f64,
    pub std_dev: f64,
}

impl MaeSummary {
    /// Scores may be reported negated (higher is better); only their magnitude is used.
    pub fn from_scores(scores: &[f64]) -> Result<Self, RegressionError> {
        if scores.is_empty() {
            return Err(RegressionError::NoScores);
        }
        let errors = scores.iter().map(|score| score.abs()).collect::<Vec<_>>();

        Ok(Self {
            mean: errors.iter().mean(),
            std_dev: errors.iter().population_std_dev(),
        })
    }
}
