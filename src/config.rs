use crate::error::ConfigError;

/// Names of the point and cell arrays read and written by the operations.
///
/// An empty name counts as an unset parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ArrayNames {
    /// Per-point maximum inscribed sphere radius.
    pub radius: String,
    /// Per-cell branch membership.
    pub group_ids: String,
    /// Per-cell index of the originating centerline.
    pub centerline_ids: String,
    /// Per-cell position along the originating centerline.
    pub tract_ids: String,
    /// Per-cell `0`/`1` flag marking bifurcation regions.
    pub blanking: String,
    /// Bifurcation plane normal on the reference point set.
    pub normal: String,
    /// In-plane up direction on the reference point set.
    pub up_normal: String,
}

impl Default for ArrayNames {
    fn default() -> Self {
        Self {
            radius: "MaximumInscribedSphereRadius".into(),
            group_ids: "GroupIds".into(),
            centerline_ids: "CenterlineIds".into(),
            tract_ids: "TractIds".into(),
            blanking: "Blanking".into(),
            normal: "Normal".into(),
            up_normal: "UpNormal".into(),
        }
    }
}

impl ArrayNames {
    /// Checks that the names used by the splitter are set.
    ///
    /// # Errors
    ///
    /// Returns the first unset name.
    pub fn validate_for_splitting(&self) -> Result<(), ConfigError> {
        require_name(&self.radius, "RadiusArrayName")?;
        require_name(&self.group_ids, "GroupIdsArrayName")?;
        require_name(&self.centerline_ids, "CenterlineIdsArrayName")?;
        require_name(&self.tract_ids, "TractIdsArrayName")?;
        require_name(&self.blanking, "BlankingArrayName")
    }

    /// Checks that the names used by the reference system computation are set.
    ///
    /// # Errors
    ///
    /// Returns the first unset name.
    pub fn validate_for_reference_systems(&self) -> Result<(), ConfigError> {
        require_name(&self.radius, "RadiusArrayName")?;
        require_name(&self.group_ids, "GroupIdsArrayName")?;
        require_name(&self.blanking, "BlankingArrayName")?;
        require_name(&self.normal, "NormalArrayName")?;
        require_name(&self.up_normal, "UpNormalArrayName")
    }
}

fn require_name(name: &str, parameter: &'static str) -> Result<(), ConfigError> {
    if name.is_empty() {
        Err(ConfigError::UnsetParameter(parameter))
    } else {
        Ok(())
    }
}

/// Rule deciding whether two tracts belong to the same branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GroupingMode {
    /// Tracts whose first points coincide share a group.
    FirstPoint,
    /// Tracts whose last points coincide share a group.
    LastPoint,
    /// A tract joins the group of another centerline's tract whose tube contains
    /// its first point.
    #[default]
    PointInTube,
}

/// Configuration of a [`CenterlineSplitter`](crate::operations::split::CenterlineSplitter) run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SplitterConfig {
    /// Names of the arrays read from the input and written to the output.
    pub names: ArrayNames,
    /// How tracts are matched to the groups of earlier centerlines.
    pub grouping_mode: GroupingMode,
    /// Concatenate consecutive tracts of one centerline that end up in the same group.
    pub merge_tracts: bool,
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self {
            names: ArrayNames::default(),
            grouping_mode: GroupingMode::default(),
            merge_tracts: true,
        }
    }
}
