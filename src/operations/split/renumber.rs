use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Relabels group ids to `0..n` in order of first appearance.
pub(super) fn make_group_ids_adjacent(groups: &mut [i64]) {
    let mut mapping: HashMap<i64, i64> = HashMap::new();
    for group in groups.iter_mut() {
        #[allow(clippy::cast_possible_wrap)]
        let next = mapping.len() as i64;
        *group = *mapping.entry(*group).or_insert(next);
    }
}

/// Relabels tract ids of every centerline to `0..n`, keeping their order.
pub(super) fn make_tract_ids_adjacent(centerline_ids: &[i64], tract_ids: &mut [i64]) {
    let mut per_centerline: BTreeMap<i64, BTreeSet<i64>> = BTreeMap::new();
    for (&centerline, &tract) in centerline_ids.iter().zip(tract_ids.iter()) {
        per_centerline.entry(centerline).or_default().insert(tract);
    }

    let ranks: HashMap<(i64, i64), i64> = per_centerline
        .into_iter()
        .flat_map(|(centerline, tracts)| {
            tracts
                .into_iter()
                .zip(0_i64..)
                .map(move |(tract, rank)| ((centerline, tract), rank))
        })
        .collect();

    for (&centerline, tract) in centerline_ids.iter().zip(tract_ids.iter_mut()) {
        if let Some(&rank) = ranks.get(&(centerline, *tract)) {
            *tract = rank;
        }
    }
}
