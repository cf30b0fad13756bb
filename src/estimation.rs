/// Estimation of the energy demand of a dry room by interpolating the static dataset of a
/// location in three ordered passes: along the scaling factor S within every LoadScalingFactor
/// group, then across the groups along the moisture load and finally along the heat load.
///
/// The heat load has the largest effect on the energy demand, so it is resolved last where the
/// interpolation is most local.
use crate::core::interpolation::{interpolate_1d, BoundaryPolicy, Interpolation1dError};
use crate::dataset::{AugmentedCase, AugmentedDataset, NumericColumn};
use crate::errors::{DomainError, EstimationError, InsufficientDataError};
use crate::input::EstimationConfig;
use itertools::Itertools;
use ordered_float::OrderedFloat;
use rayon::prelude::*;
use std::collections::BTreeMap;
use strum::IntoEnumIterator;
use tracing::{debug, warn};

/// All columns of the static dataset interpolated to the queried operating point. Identifier
/// columns are taken from the nearest case.
pub type InterpolationResult = AugmentedCase;

type LoadScalingFactorGroup = (OrderedFloat<f64>, Vec<AugmentedCase>);

pub fn estimate(
    dataset: &AugmentedDataset,
    location: &str,
    scaling_factor_s: f64,
    max_waste_heat_w: f64,
    max_moisture_load: f64,
    config: &EstimationConfig,
) -> Result<InterpolationResult, EstimationError> {
    for (axis, query) in [
        (NumericColumn::ScalingFactorS, scaling_factor_s),
        (NumericColumn::DryRoomHeatLoad, max_waste_heat_w),
        (NumericColumn::DryRoomMoistureLoad, max_moisture_load),
    ] {
        if !query.is_finite() {
            return Err(DomainError::NonFiniteQuery { axis, query }.into());
        }
    }

    let groups = group_by_load_scaling_factor(dataset, location)?;
    debug!(
        location,
        groups = groups.len(),
        "interpolating LoadScalingFactor groups along ScalingFactorS"
    );

    let groups_outside = groups
        .iter()
        .filter(|(_, cases)| {
            outside_observed_range(cases, NumericColumn::ScalingFactorS, scaling_factor_s)
        })
        .count();
    if groups_outside > 0 {
        warn!(
            axis = %NumericColumn::ScalingFactorS,
            query = scaling_factor_s,
            groups_outside,
            policy = ?config.boundary_policy,
            "query is outside the simulated range of some LoadScalingFactor groups"
        );
    }

    let interpolate_group = |(load_scaling_factor, mut cases): LoadScalingFactorGroup| {
        interpolate_along(
            &mut cases,
            NumericColumn::ScalingFactorS,
            scaling_factor_s,
            config.boundary_policy,
            Some(load_scaling_factor.into_inner()),
        )
    };

    let mut group_results = if config.parallel_groups {
        groups
            .into_par_iter()
            .map(interpolate_group)
            .collect::<Result<Vec<_>, _>>()?
    } else {
        groups
            .into_iter()
            .map(interpolate_group)
            .collect::<Result<Vec<_>, _>>()?
    };

    warn_if_outside_observed_range(
        &group_results,
        NumericColumn::DryRoomMoistureLoad,
        max_moisture_load,
        config.boundary_policy,
    );
    interpolate_along(
        &mut group_results,
        NumericColumn::DryRoomMoistureLoad,
        max_moisture_load,
        config.boundary_policy,
        None,
    )?;

    warn_if_outside_observed_range(
        &group_results,
        NumericColumn::DryRoomHeatLoad,
        max_waste_heat_w,
        config.boundary_policy,
    );
    interpolate_along(
        &mut group_results,
        NumericColumn::DryRoomHeatLoad,
        max_waste_heat_w,
        config.boundary_policy,
        None,
    )
}

fn warn_if_outside_observed_range(
    cases: &[AugmentedCase],
    axis: NumericColumn,
    query: f64,
    policy: BoundaryPolicy,
) {
    if outside_observed_range(cases, axis, query) {
        warn!(
            %axis,
            query,
            ?policy,
            "query is outside the simulated range of the LoadScalingFactor groups"
        );
    }
}

fn outside_observed_range(cases: &[AugmentedCase], axis: NumericColumn, query: f64) -> bool {
    cases
        .iter()
        .map(|case| case.value(axis))
        .minmax()
        .into_option()
        .is_some_and(|(min, max)| query < min || query > max)
}

/// Cases of `location` grouped by LoadScalingFactor, in ascending order of the factor.
fn group_by_load_scaling_factor(
    dataset: &AugmentedDataset,
    location: &str,
) -> Result<Vec<LoadScalingFactorGroup>, InsufficientDataError> {
    let mut groups: BTreeMap<OrderedFloat<f64>, Vec<AugmentedCase>> = BTreeMap::new();
    for case in dataset.cases_for_location(location) {
        groups
            .entry(OrderedFloat(case.raw.load_scaling_factor))
            .or_default()
            .push(case.clone());
    }

    if groups.is_empty() {
        return Err(InsufficientDataError::NoRowsForLocation(
            location.to_string(),
        ));
    }

    Ok(groups.into_iter().collect())
}

/// Insert a case at `query` along `axis` into `cases`, with every other numeric column
/// linearly interpolated over the cases sorted by `axis`, and return it.
///
/// The table keeps the inserted case, so later passes over the same table see it as an
/// observation. Identifier columns come from the case with exactly the queried value, or
/// otherwise from the next case in sorted order (the previous one at the upper end).
pub(crate) fn interpolate_along(
    cases: &mut Vec<AugmentedCase>,
    axis: NumericColumn,
    query: f64,
    policy: BoundaryPolicy,
    load_scaling_factor: Option<f64>,
) -> Result<AugmentedCase, EstimationError> {
    if !query.is_finite() {
        return Err(DomainError::NonFiniteQuery { axis, query }.into());
    }

    cases.sort_by(|a, b| a.value(axis).total_cmp(&b.value(axis)));
    let keys = cases.iter().map(|case| case.value(axis)).collect_vec();

    let distinct = keys.iter().dedup().count();
    if distinct < 2 {
        return Err(InsufficientDataError::TooFewDistinctValues {
            axis,
            distinct,
            load_scaling_factor,
        }
        .into());
    }

    let (min, max) = (keys[0], keys[keys.len() - 1]);
    if query < min || query > max {
        debug!(
            %axis,
            query,
            min,
            max,
            load_scaling_factor,
            ?policy,
            "query is outside the simulated range, result is not interpolated on this axis"
        );
    }

    let position = keys.partition_point(|key| *key <= query);
    let nearest = match position {
        0 => 0,
        p if keys[p - 1] == query || p == keys.len() => p - 1,
        p => p,
    };

    let mut inserted = cases[nearest].clone();
    for column in NumericColumn::iter().filter(|column| *column != axis) {
        let points = cases
            .iter()
            .map(|case| (case.value(axis), case.value(column)))
            .collect_vec();
        let value = interpolate_1d(&points, query, policy).map_err(|err| match err {
            Interpolation1dError::OutsideRange { query, min, max } => {
                EstimationError::from(InsufficientDataError::QueryOutsideObservedRange {
                    axis,
                    query,
                    min,
                    max,
                })
            }
            Interpolation1dError::NoPoints => InsufficientDataError::TooFewDistinctValues {
                axis,
                distinct: 0,
                load_scaling_factor,
            }
            .into(),
            Interpolation1dError::NonFiniteQuery(query) => {
                DomainError::NonFiniteQuery { axis, query }.into()
            }
        })?;
        inserted.set_value(column, value);
    }
    inserted.set_value(axis, query);

    debug!(
        %axis,
        query,
        cases = cases.len(),
        nearest_case = %cases[nearest].raw.location_variant,
        "interpolated single axis"
    );

    cases.insert(position, inserted.clone());

    Ok(inserted)
}
