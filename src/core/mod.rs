pub mod interpolation;
pub mod load_normalization;
pub mod psychrometrics;
pub mod units;
