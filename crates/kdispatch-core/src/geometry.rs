//! Launch geometry: default group sizes, group counts and native ordering.
//!
//! Group counts are rounded up, so a global range that is not a multiple of
//! the group size over-provisions execution units. Dispatchers are expected
//! to range-check every unit against the requested global range.

use serde::{Deserialize, Serialize};

use crate::error::{DispatchError, Result};
use crate::types::{Dim3, Id, Range};

/// Group sizes used when the caller leaves the local range unspecified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalRangeDefaults {
    /// 1D default.
    #[serde(default = "default_one_d")]
    pub one_d: [usize; 1],
    /// 2D default.
    #[serde(default = "default_two_d")]
    pub two_d: [usize; 2],
    /// 3D default.
    #[serde(default = "default_three_d")]
    pub three_d: [usize; 3],
}

fn default_one_d() -> [usize; 1] {
    [128]
}

fn default_two_d() -> [usize; 2] {
    [16, 16]
}

fn default_three_d() -> [usize; 3] {
    [4, 8, 8]
}

impl Default for LocalRangeDefaults {
    fn default() -> Self {
        Self {
            one_d: default_one_d(),
            two_d: default_two_d(),
            three_d: default_three_d(),
        }
    }
}

impl LocalRangeDefaults {
    /// Default group size for dimensionality `D`.
    pub fn for_dim<const D: usize>(&self) -> Range<D> {
        let source: &[usize] = match D {
            1 => &self.one_d[..],
            2 => &self.two_d[..],
            _ => &self.three_d[..],
        };
        let mut out = [0usize; D];
        out.copy_from_slice(source);
        Range::new(out)
    }

    /// Reject defaults containing zero components.
    pub fn validate(&self) -> Result<()> {
        let all = [&self.one_d[..], &self.two_d[..], &self.three_d[..]];
        if all.iter().any(|dims| dims.contains(&0)) {
            return Err(DispatchError::Config(
                "local range defaults must be non-zero in every dimension".to_string(),
            ));
        }
        Ok(())
    }
}

/// Offset, global range and local range of a launch request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionRange<const D: usize> {
    /// Offset added to every global id.
    pub offset: Id<D>,
    /// Number of work-items requested.
    pub global_range: Range<D>,
    /// Work-group size, all-zero for "choose for me".
    pub local_range: Range<D>,
}

impl<const D: usize> ExecutionRange<D> {
    /// Range with no offset and an unspecified group size.
    pub fn new(global_range: impl Into<Range<D>>) -> Self {
        Self {
            offset: Id::zero(),
            global_range: global_range.into(),
            local_range: Range::unspecified(),
        }
    }

    /// Set the group size.
    #[must_use]
    pub fn with_local(mut self, local_range: impl Into<Range<D>>) -> Self {
        self.local_range = local_range.into();
        self
    }

    /// Set the offset.
    #[must_use]
    pub fn with_offset(mut self, offset: impl Into<Id<D>>) -> Self {
        self.offset = offset.into();
        self
    }
}

/// Group size and group count in logical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupLayout<const D: usize> {
    /// Effective work-group size.
    pub local_range: Range<D>,
    /// Number of work-groups.
    pub num_groups: Range<D>,
}

impl<const D: usize> GroupLayout<D> {
    /// Total work-items launched, including over-provisioned ones.
    pub fn provisioned_items(&self) -> usize {
        self.local_range.size() * self.num_groups.size()
    }

    /// Native-order geometry for a backend call.
    pub fn to_geometry(&self, dynamic_local_memory: usize) -> LaunchGeometry {
        LaunchGeometry {
            num_groups: Dim3::from_logical(self.num_groups),
            group_size: Dim3::from_logical(self.local_range),
            dynamic_local_memory,
        }
    }
}

/// Concrete launch parameters in backend-native order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaunchGeometry {
    /// Work-group counts.
    pub num_groups: Dim3,
    /// Work-group size.
    pub group_size: Dim3,
    /// Dynamic local memory in bytes.
    pub dynamic_local_memory: usize,
}

impl LaunchGeometry {
    /// One group of one item, no local memory.
    pub const fn single_task() -> Self {
        Self {
            num_groups: Dim3::one(),
            group_size: Dim3::one(),
            dynamic_local_memory: 0,
        }
    }

    /// Total work-items launched.
    pub fn total_work_items(&self) -> usize {
        self.num_groups.volume() * self.group_size.volume()
    }
}

/// Group size after applying defaults.
///
/// An all-zero `local_range` takes the default for its dimensionality; any
/// other range is used as given and must not contain zeros.
pub fn effective_local_range<const D: usize>(
    local_range: Range<D>,
    defaults: &LocalRangeDefaults,
) -> Result<Range<D>> {
    if local_range.is_unspecified() {
        return Ok(defaults.for_dim::<D>());
    }
    if local_range.has_zero() {
        return Err(DispatchError::InvalidRange(format!(
            "local range {} is partially unspecified",
            local_range
        )));
    }
    Ok(local_range)
}

/// `ceil(global / local)` per dimension. `local_range` must be non-zero.
pub fn num_groups<const D: usize>(global_range: Range<D>, local_range: Range<D>) -> Range<D> {
    let mut out = global_range;
    for i in 0..D {
        out[i] = global_range[i].div_ceil(local_range[i]);
    }
    out
}

/// Layout for a launch that tolerates over-provisioning.
pub fn compute_layout<const D: usize>(
    global_range: Range<D>,
    local_range: Range<D>,
    defaults: &LocalRangeDefaults,
) -> Result<GroupLayout<D>> {
    let local_range = effective_local_range(local_range, defaults)?;
    Ok(GroupLayout {
        local_range,
        num_groups: num_groups(global_range, local_range),
    })
}

/// Check an nd-range request: explicit group size dividing the global range.
pub fn validate_nd_range<const D: usize>(global_range: Range<D>, local_range: Range<D>) -> Result<()> {
    if local_range.has_zero() {
        return Err(DispatchError::InvalidRange(format!(
            "nd-range launches need an explicit local range, got {}",
            local_range
        )));
    }
    if (0..D).any(|i| global_range[i] % local_range[i] != 0) {
        return Err(DispatchError::InvalidRange(format!(
            "global range {} is not divisible by local range {}",
            global_range, local_range
        )));
    }
    Ok(())
}

/// Layout for a validated nd-range launch.
pub fn nd_range_layout<const D: usize>(
    global_range: Range<D>,
    local_range: Range<D>,
) -> Result<GroupLayout<D>> {
    validate_nd_range(global_range, local_range)?;
    Ok(GroupLayout {
        local_range,
        num_groups: num_groups(global_range, local_range),
    })
}
