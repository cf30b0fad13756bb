/// Summary statistics of the simulated energy demand per location, used to compare locations
/// within a LoadScalingFactor group.
use crate::dataset::{AugmentedCase, AugmentedDataset, NumericColumn};
use indexmap::IndexMap;
use itertools::Itertools;
use ordered_float::OrderedFloat;
use serde::Serialize;
use statrs::statistics::{Data, Max, Median, Min, OrderStatistics};

/// Five number summary of one column for the cases of one location.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LocationEnergySummary {
    pub location: String,
    pub count: usize,
    pub min: f64,
    pub lower_quartile: f64,
    pub median: f64,
    pub upper_quartile: f64,
    pub max: f64,
    /// lowest outside dew point among the cases, in deg C
    pub coldest_outside_dew_point: f64,
}

impl LocationEnergySummary {
    fn from_cases(location: &str, cases: &[&AugmentedCase], column: NumericColumn) -> Self {
        let mut data = Data::new(cases.iter().map(|case| case.value(column)).collect_vec());

        Self {
            location: location.to_string(),
            count: cases.len(),
            min: data.min(),
            lower_quartile: data.lower_quartile(),
            median: data.median(),
            upper_quartile: data.upper_quartile(),
            max: data.max(),
            coldest_outside_dew_point: cases
                .iter()
                .map(|case| case.outside_dew_point_temperature)
                .fold(f64::INFINITY, f64::min),
        }
    }
}

/// Summaries of `column` per LoadScalingFactor group (ascending) and location, with locations
/// ordered from the coldest to the warmest outside dew point.
pub fn location_energy_summaries(
    dataset: &AugmentedDataset,
    column: NumericColumn,
) -> IndexMap<OrderedFloat<f64>, Vec<LocationEnergySummary>> {
    dataset
        .cases()
        .iter()
        .into_group_map_by(|case| OrderedFloat(case.raw.load_scaling_factor))
        .into_iter()
        .sorted_by_key(|(load_scaling_factor, _)| *load_scaling_factor)
        .map(|(load_scaling_factor, cases)| {
            let summaries = cases
                .into_iter()
                .into_group_map_by(|case| case.location.clone())
                .into_iter()
                .map(|(location, cases)| {
                    LocationEnergySummary::from_cases(&location, &cases, column)
                })
                .sorted_by(|a, b| {
                    a.coldest_outside_dew_point
                        .total_cmp(&b.coldest_outside_dew_point)
                        .then_with(|| a.location.cmp(&b.location))
                })
                .collect_vec();

            (load_scaling_factor, summaries)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{augment, StaticCaseRow, StaticDataset};
    use pretty_assertions::assert_eq;
    use rstest::*;

    fn row(
        location_variant: &str,
        load_scaling_factor: f64,
        outside_temperature: f64,
        electric_energy_kwh: f64,
    ) -> StaticCaseRow {
        StaticCaseRow {
            location_variant: location_variant.to_string(),
            load_scaling_factor,
            scaling_factor_s: 1.,
            dry_room_heat_load: 2000.,
            dry_room_moisture_load: 0.0002,
            outside_relative_humidity: 75.,
            outside_temperature,
            electric_energy_kwh,
            natural_gas_energy_kwh: 10.,
            district_heating_energy_kwh: 0.,
        }
    }

    #[fixture]
    fn dataset() -> AugmentedDataset {
        augment(&StaticDataset::new(vec![
            row("SG-1", 1., 27., 500.),
            row("SG-2", 1., 27.5, 520.),
            row("SG-3", 1., 28., 540.),
            row("OS-1", 1., 9., 300.),
            row("OS-2", 1., 9.5, 330.),
            row("OS-3", 1., 10., 310.),
            row("OS-4", 0.5, 9., 200.),
            row("SG-4", 0.5, 27., 400.),
        ])
        .unwrap())
        .unwrap()
    }

    #[rstest]
    fn test_groups_are_ascending(dataset: AugmentedDataset) {
        let summaries = location_energy_summaries(&dataset, NumericColumn::ElectricEnergyKwh);

        assert_eq!(
            summaries.keys().map(|key| key.into_inner()).collect_vec(),
            vec![0.5, 1.]
        );
    }

    #[rstest]
    fn test_locations_are_ordered_cold_to_warm(dataset: AugmentedDataset) {
        let summaries = location_energy_summaries(&dataset, NumericColumn::ElectricEnergyKwh);

        let locations = summaries[&OrderedFloat(1.)]
            .iter()
            .map(|summary| summary.location.as_str())
            .collect_vec();
        assert_eq!(locations, vec!["OS", "SG"]);
    }

    #[rstest]
    fn test_five_number_summary(dataset: AugmentedDataset) {
        let summaries = location_energy_summaries(&dataset, NumericColumn::FinalEnergy);
        let os = &summaries[&OrderedFloat(1.)][0];

        assert_eq!(os.count, 3);
        assert_eq!(os.min, 310.);
        assert_eq!(os.median, 320.);
        assert_eq!(os.max, 340.);
        assert!(os.lower_quartile >= os.min && os.lower_quartile <= os.median);
        assert!(os.upper_quartile >= os.median && os.upper_quartile <= os.max);
    }
}
