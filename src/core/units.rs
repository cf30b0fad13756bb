pub const SECONDS_PER_HOUR: u32 = 3_600;
pub const PERCENT_PER_FRACTION: f64 = 100.;

pub(crate) fn kg_per_hour_to_kg_per_second(mass_flow_kg_per_h: f64) -> f64 {
    mass_flow_kg_per_h / SECONDS_PER_HOUR as f64
}

pub(crate) fn percent_to_fraction(percent: f64) -> f64 {
    percent / PERCENT_PER_FRACTION
}
