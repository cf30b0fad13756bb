use crate::dataset::NumericColumn;
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum EstimationError {
    #[error("Physically invalid input: {0}")]
    Domain(#[from] DomainError),
    #[error("Not enough data to interpolate: {0}")]
    InsufficientData(#[from] InsufficientDataError),
    #[error("Static dataset does not match the expected schema: {0}")]
    Schema(#[from] SchemaError),
}

/// Physically invalid input to a psychrometric formula or to the load translation.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum DomainError {
    #[error("Vapour partial pressure of {vapour_pressure} hPa is not below the total pressure of {total_pressure} hPa (supersaturated air)")]
    Supersaturated {
        vapour_pressure: f64,
        total_pressure: f64,
    },
    #[error("Absolute humidity must be positive for this conversion, got {0} kg/kg")]
    NonPositiveAbsoluteHumidity(f64),
    #[error("Absolute humidity must not be negative, got {0} kg/kg")]
    NegativeAbsoluteHumidity(f64),
    #[error("Relative humidity of {0}% is outside 0-100%")]
    RelativeHumidityOutOfRange(f64),
    #[error("Temperature of {0}ºC is outside the range of the Magnus approximation")]
    TemperatureOutOfRange(f64),
    #[error("Vapour pressure of {0} hPa is at or above the saturation limit of the dew point formula")]
    DewPointUndefined(f64),
    #[error("Room dew point ({room_dew_point}ºC) must be warmer than the inlet dew point ({inlet_dew_point}ºC) to remove moisture")]
    NonPositiveHumidityGradient {
        room_dew_point: f64,
        inlet_dew_point: f64,
    },
    #[error("Invalid boundary parameters: {0}")]
    InvalidBoundaryParameters(String),
    #[error("Queried {axis} must be a finite number, got {query}")]
    NonFiniteQuery { axis: NumericColumn, query: f64 },
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum InsufficientDataError {
    #[error("No static cases found for location '{0}'")]
    NoRowsForLocation(String),
    #[error("{axis} needs at least two distinct values to interpolate, found {distinct}{}", group_suffix(.load_scaling_factor))]
    TooFewDistinctValues {
        axis: NumericColumn,
        distinct: usize,
        load_scaling_factor: Option<f64>,
    },
    #[error("Query {query} for {axis} is outside the observed range [{min}, {max}]")]
    QueryOutsideObservedRange {
        axis: NumericColumn,
        query: f64,
        min: f64,
        max: f64,
    },
}

fn group_suffix(load_scaling_factor: &Option<f64>) -> String {
    load_scaling_factor
        .map(|factor| format!(" in LoadScalingFactor group {factor}"))
        .unwrap_or_default()
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum RegressionError {
    #[error("No cross-validation scores were supplied")]
    NoScores,
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum SchemaError {
    #[error("Row {row} is missing required column '{column}'")]
    MissingColumn { row: usize, column: &'static str },
    #[error("Row {row} has a non-numeric value '{value}' in column '{column}'")]
    NotNumeric {
        row: usize,
        column: &'static str,
        value: String,
    },
    #[error("Row {row} has a non-text value '{value}' in column '{column}'")]
    NotText {
        row: usize,
        column: &'static str,
        value: String,
    },
    #[error("Static dataset could not be read as a list of rows: {0}")]
    Unreadable(String),
}
