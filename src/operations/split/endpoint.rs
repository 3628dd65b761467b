use super::{ComputeSplitting, SplitRecord};
use crate::error::Result;
use crate::geometry::{CellLocation, CenterlineMesh};
use crate::operations::query::{Direction, SphereTouchingLocator};

/// Which terminals of a centerline get a blanked gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EndpointMode {
    First,
    Last,
    #[default]
    Both,
}

/// Isolates a cap at one or both terminals of every centerline.
///
/// From a terminal, `endpoint_spheres` touching spheres mark the end of the
/// cap and `gap_spheres` more mark the end of a blanked gap. This always
/// yields two cuts per selected terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EndpointSplitting {
    pub mode: EndpointMode,
    pub endpoint_spheres: usize,
    pub gap_spheres: usize,
}

impl Default for EndpointSplitting {
    fn default() -> Self {
        Self {
            mode: EndpointMode::default(),
            endpoint_spheres: 2,
            gap_spheres: 1,
        }
    }
}

impl EndpointSplitting {
    #[must_use]
    pub fn new(mode: EndpointMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }
}

impl ComputeSplitting for EndpointSplitting {
    fn compute_splitting(
        &self,
        mesh: &CenterlineMesh,
        radius_array_name: &str,
        cell_id: usize,
    ) -> Result<SplitRecord> {
        let Some(ids) = mesh.polyline(cell_id) else {
            return Ok(SplitRecord::unsplit());
        };
        let locator = SphereTouchingLocator::new(mesh, radius_array_name)?;
        let start = CellLocation::start();
        let end = CellLocation::end(ids.len());

        // Running off the cell clamps to the terminal being walked towards.
        let walk = |from: CellLocation, direction: Direction, spheres: usize| {
            locator
                .find_touching(cell_id, from, direction, spheres)
                .unwrap_or(match direction {
                    Direction::Downstream => end,
                    Direction::Upstream => start,
                })
        };

        let mut record = SplitRecord::unsplit();
        if matches!(self.mode, EndpointMode::First | EndpointMode::Both) {
            let cap = walk(start, Direction::Downstream, self.endpoint_spheres);
            let gap = walk(cap, Direction::Downstream, self.gap_spheres);
            record.push(cap, true);
            record.push(gap, false);
        }
        if matches!(self.mode, EndpointMode::Last | EndpointMode::Both) {
            let cap = walk(end, Direction::Upstream, self.endpoint_spheres);
            let gap = walk(cap, Direction::Upstream, self.gap_spheres);
            record.push(gap, true);
            record.push(cap, false);
        }
        record.make_monotonic();
        Ok(record)
    }
}
