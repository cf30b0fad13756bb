use crate::core::interpolation::BoundaryPolicy;
use crate::core::load_normalization::NormalizedLoad;
use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use serde_valid::Validate;
use std::io::{BufReader, Read};

pub fn ingest_request(json: impl Read) -> Result<EstimationRequest, anyhow::Error> {
    let request: EstimationRequest = serde_json::from_reader(BufReader::new(json))?;
    request
        .validate()
        .map_err(|errors| anyhow!("Estimation request is invalid: {errors}"))?;

    Ok(request)
}

/// Physical boundary conditions of the dry room to be evaluated.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct BoundaryParameters {
    /// maximum number of people in the air flow zones of the room
    pub max_humans_in_air_flow: u32,
    /// maximum number of people in the whole room
    pub max_humans_in_room: u32,
    /// desired dew point inside the room, in deg C
    #[validate(maximum = 60.)]
    pub room_dew_point: f64,
    /// dew point of the supply air, in deg C
    #[validate(maximum = 60.)]
    pub inlet_dew_point: f64,
    /// supply air temperature, in deg C
    #[validate(maximum = 60.)]
    pub inlet_temperature: f64,
    /// volume flow escaping through leakages and technical suction, in m3/h
    #[validate(minimum = 0.)]
    pub leakage_suction_volume_flow: f64,
}

/// The load of the room is either described physically or already known in normalized form.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RoomLoad {
    Boundary(BoundaryParameters),
    Normalized(NormalizedLoad),
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct EstimationRequest {
    /// two letter location code, e.g. "OS"
    #[validate(min_length = 1)]
    pub location: String,
    /// maximum waste heat released into the room, in W
    #[validate(minimum = 0.)]
    pub max_waste_heat_w: f64,
    pub load: RoomLoad,
    #[serde(default)]
    pub config: EstimationConfig,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct EstimationConfig {
    pub boundary_policy: BoundaryPolicy,
    /// interpolate the LoadScalingFactor groups on the rayon thread pool
    pub parallel_groups: bool,
}

impl Default for EstimationConfig {
    fn default() -> Self {
        Self {
            boundary_policy: BoundaryPolicy::default(),
            parallel_groups: true,
        }
    }
}
