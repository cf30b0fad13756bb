pub mod core;
pub mod dataset;
pub mod errors;
pub mod estimation;
pub mod input;
pub mod regression;
pub mod statistics;

#[macro_use]
extern crate is_close;

pub use crate::core::load_normalization::{translate, NormalizedLoad};
pub use crate::dataset::{augment, Augment, AugmentedDataset, StaticCaseRow, StaticDataset};
pub use crate::estimation::{estimate, InterpolationResult};
pub use crate::input::{ingest_request, BoundaryParameters, EstimationConfig, EstimationRequest};

use crate::input::RoomLoad;
use serde::Serialize;
use tracing::info;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EstimationOutcome {
    pub normalized_load: NormalizedLoad,
    /// m3/h
    pub supply_air_volume_flow: f64,
    pub result: InterpolationResult,
}

pub fn run_estimation(
    request: &EstimationRequest,
    dataset: &AugmentedDataset,
) -> Result<EstimationOutcome, anyhow::Error> {
    let normalized_load = match request.load {
        RoomLoad::Boundary(boundary) => translate(&boundary)?,
        RoomLoad::Normalized(normalized_load) => normalized_load,
    };
    let supply_air_volume_flow = normalized_load.supply_air_volume_flow_m3h();

    info!(
        scaling_factor_s = normalized_load.scaling_factor_s,
        supply_air_volume_flow,
        max_moisture_load = normalized_load.max_moisture_load,
        "normalized dry room load"
    );

    let result = estimate(
        dataset,
        &request.location,
        normalized_load.scaling_factor_s,
        request.max_waste_heat_w,
        normalized_load.max_moisture_load,
        &request.config,
    )?;

    info!(
        location = %request.location,
        electric_energy_kwh = result.raw.electric_energy_kwh,
        natural_gas_energy_kwh = result.raw.natural_gas_energy_kwh,
        district_heating_energy_kwh = result.raw.district_heating_energy_kwh,
        final_energy_kwh = result.final_energy,
        "estimated annual energy demand"
    );

    Ok(EstimationOutcome {
        normalized_load,
        supply_air_volume_flow,
        result,
    })
}
