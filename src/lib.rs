//! Splitting of vessel centerline trees into branches, and local reference
//! systems at their bifurcations.
//!
//! Centerlines are polylines carrying a per-point maximum inscribed sphere
//! radius. [`CenterlineSplitter`](operations::split::CenterlineSplitter) cuts
//! them into tracts and labels every tract with a group (branch) id, its
//! originating centerline, its position along that centerline and whether it
//! lies in a bifurcation region. [`BifurcationReferenceSystems`](operations::reference::BifurcationReferenceSystems)
//! turns that labeling into one frame per bifurcation.

pub mod config;
pub mod error;
pub mod geometry;
pub mod math;
pub mod operations;

pub use config::{ArrayNames, GroupingMode, SplitterConfig};
pub use error::{BranchingError, Result};
pub use geometry::{CellLocation, CenterlineMesh, PointSet};
