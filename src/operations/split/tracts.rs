use std::collections::BTreeMap;

use tracing::debug;

use super::SplitRecord;
use crate::config::ArrayNames;
use crate::error::Result;
use crate::geometry::{Cell, CellLocation, CenterlineMesh};
use crate::math::{Point3, POINT_MERGE_TOLERANCE, TOLERANCE};

/// A tract point: either an original cell point or an interpolated cut.
#[derive(Debug, Clone, Copy)]
enum Sample {
    /// Index into the cell's point id list.
    Vertex(usize),
    Cut(CellLocation),
}

/// Cuts every input cell into tracts following its split record.
///
/// The output carries every input point array (interpolated onto cut points),
/// every input cell array (copied from the originating cell), plus fresh
/// centerline id, tract id and blanking arrays. Tracts with fewer than two
/// points or without length are dropped.
pub(super) fn split_into_tracts(
    input: &CenterlineMesh,
    records: &[(usize, SplitRecord)],
    names: &ArrayNames,
) -> Result<CenterlineMesh> {
    let produced = [
        names.group_ids.as_str(),
        names.centerline_ids.as_str(),
        names.tract_ids.as_str(),
        names.blanking.as_str(),
    ];

    let mut output = CenterlineMesh::new();
    let mut point_data: BTreeMap<&str, Vec<f64>> = input
        .point_arrays()
        .map(|(name, _)| (name, Vec::new()))
        .collect();
    let mut cell_data: BTreeMap<&str, Vec<i64>> = input
        .cell_arrays()
        .filter(|(name, _)| !produced.contains(name))
        .map(|(name, _)| (name, Vec::new()))
        .collect();
    let mut centerline_ids = Vec::new();
    let mut tract_ids = Vec::new();
    let mut blanking = Vec::new();

    for (cell_id, record) in records {
        let Some(ids) = input.polyline(*cell_id) else {
            continue;
        };

        for (tract_index, samples) in tract_samples(input.points(), ids, record)
            .into_iter()
            .enumerate()
        {
            let points: Vec<Point3> = samples
                .iter()
                .filter_map(|s| sample_point(input.points(), ids, *s))
                .collect();
            if !has_length(&points) {
                debug!(cell_id, tract_index, "dropping degenerate tract");
                continue;
            }

            let first = output.number_of_points();
            for point in &points {
                output.add_point(*point);
            }
            output.add_cell(Cell::polyline((first..first + points.len()).collect()))?;

            for (name, values) in &mut point_data {
                let Some(source) = input.point_array(name) else {
                    continue;
                };
                values.extend(
                    samples
                        .iter()
                        .filter_map(|s| sample_value(source, ids, *s)),
                );
            }
            for (name, values) in &mut cell_data {
                if let Some(source) = input.cell_array(name) {
                    values.push(source[*cell_id]);
                }
            }

            #[allow(clippy::cast_possible_wrap)]
            let (centerline_id, tract_id) = (*cell_id as i64, tract_index as i64);
            centerline_ids.push(centerline_id);
            tract_ids.push(tract_id);
            blanking.push(i64::from(record.blanking()[tract_index]));
        }
    }

    for (name, values) in point_data {
        output.set_point_array(name, values)?;
    }
    for (name, values) in cell_data {
        output.set_cell_array(name, values)?;
    }
    output.set_cell_array(names.centerline_ids.as_str(), centerline_ids)?;
    output.set_cell_array(names.tract_ids.as_str(), tract_ids)?;
    output.set_cell_array(names.blanking.as_str(), blanking)?;
    Ok(output)
}

/// The samples of every stretch of the cell delimited by the record's cuts.
///
/// Returns one entry per blanking flag. A cut is dropped from a tract when it
/// coincides with the neighboring original point.
fn tract_samples(points: &[Point3], ids: &[usize], record: &SplitRecord) -> Vec<Vec<Sample>> {
    let cuts = record.cuts();
    let last_point = ids.len() - 1;

    (0..=cuts.len())
        .map(|i| {
            let mut samples = Vec::new();
            let lower_vertex = if i == 0 { 0 } else { cuts[i - 1].sub_id + 1 };
            let upper_vertex = if i == cuts.len() {
                last_point
            } else {
                cuts[i].sub_id
            };

            if i > 0 && !coincides(points, ids, cuts[i - 1], lower_vertex) {
                samples.push(Sample::Cut(cuts[i - 1]));
            }
            samples.extend((lower_vertex..=upper_vertex).map(Sample::Vertex));
            if i < cuts.len() && !coincides(points, ids, cuts[i], upper_vertex) {
                samples.push(Sample::Cut(cuts[i]));
            }
            samples
        })
        .collect()
}

fn coincides(points: &[Point3], ids: &[usize], cut: CellLocation, vertex: usize) -> bool {
    match (cut.point(points, ids), ids.get(vertex)) {
        (Some(cut_point), Some(&id)) => {
            (cut_point - points[id]).norm_squared() <= POINT_MERGE_TOLERANCE
        }
        _ => false,
    }
}

fn sample_point(points: &[Point3], ids: &[usize], sample: Sample) -> Option<Point3> {
    match sample {
        Sample::Vertex(index) => points.get(*ids.get(index)?).copied(),
        Sample::Cut(location) => location.point(points, ids),
    }
}

fn sample_value(values: &[f64], ids: &[usize], sample: Sample) -> Option<f64> {
    match sample {
        Sample::Vertex(index) => values.get(*ids.get(index)?).copied(),
        Sample::Cut(location) => location.scalar(values, ids),
    }
}

fn has_length(points: &[Point3]) -> bool {
    points.len() >= 2 && points.windows(2).map(|w| (w[1] - w[0]).norm()).sum::<f64>() > TOLERANCE
}
