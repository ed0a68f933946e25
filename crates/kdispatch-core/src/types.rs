//! Range, id and device types shared by every backend.
//!
//! Logical ranges are written outer-to-inner: the last component is the
//! fastest-varying one. Backends expect the reverse, which is what [`Dim3`]
//! models.

use std::fmt;
use std::ops::{Add, Index, IndexMut, Mul};

use serde::{Deserialize, Serialize};

/// Compile-time guard for the supported dimensionalities.
struct AssertDim<const D: usize>;

impl<const D: usize> AssertDim<D> {
    const OK: () = assert!(D >= 1 && D <= 3, "only 1, 2 and 3 dimensional launches are supported");
}

/// Extent of a launch in each dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Range<const D: usize>([usize; D]);

impl<const D: usize> Range<D> {
    /// Create a range from its components.
    #[inline]
    pub const fn new(dims: [usize; D]) -> Self {
        let () = AssertDim::<D>::OK;
        Self(dims)
    }

    /// The all-zero range, meaning "let the dispatcher choose".
    #[inline]
    pub const fn unspecified() -> Self {
        Self::new([0; D])
    }

    /// Number of dimensions.
    #[inline]
    pub const fn dims(&self) -> usize {
        D
    }

    /// Components as an array.
    #[inline]
    pub const fn as_array(&self) -> [usize; D] {
        self.0
    }

    /// Total number of elements covered by the range.
    #[inline]
    pub fn size(&self) -> usize {
        self.0.iter().product()
    }

    /// True when every component is zero.
    #[inline]
    pub fn is_unspecified(&self) -> bool {
        self.0.iter().all(|&c| c == 0)
    }

    /// True when at least one component is zero.
    #[inline]
    pub fn has_zero(&self) -> bool {
        self.0.iter().any(|&c| c == 0)
    }

    /// Components in reverse order.
    ///
    /// Reversing twice is the identity.
    #[must_use]
    pub fn reversed(&self) -> Self {
        let mut out = self.0;
        out.reverse();
        Self(out)
    }

    /// Row-major linearization of `id` within this range.
    pub fn linear_id(&self, id: Id<D>) -> usize {
        (0..D).fold(0, |acc, i| acc * self.0[i] + id[i])
    }

    /// Inverse of [`Range::linear_id`].
    pub fn id_from_linear(&self, mut linear: usize) -> Id<D> {
        let mut out = [0; D];
        for i in (0..D).rev() {
            let extent = self.0[i].max(1);
            out[i] = linear % extent;
            linear /= extent;
        }
        Id(out)
    }

    /// All ids inside the range in row-major order.
    pub fn ids(&self) -> impl Iterator<Item = Id<D>> + '_ {
        (0..self.size()).map(move |linear| self.id_from_linear(linear))
    }

    /// Whether `id` lies inside the range in every dimension.
    #[inline]
    pub fn contains(&self, id: Id<D>) -> bool {
        (0..D).all(|i| id[i] < self.0[i])
    }
}

impl<const D: usize> From<[usize; D]> for Range<D> {
    fn from(dims: [usize; D]) -> Self {
        Self::new(dims)
    }
}

impl<const D: usize> Index<usize> for Range<D> {
    type Output = usize;

    #[inline]
    fn index(&self, dim: usize) -> &usize {
        &self.0[dim]
    }
}

impl<const D: usize> IndexMut<usize> for Range<D> {
    #[inline]
    fn index_mut(&mut self, dim: usize) -> &mut usize {
        &mut self.0[dim]
    }
}

impl<const D: usize> Mul for Range<D> {
    type Output = Range<D>;

    fn mul(self, rhs: Range<D>) -> Range<D> {
        let mut out = self.0;
        for (o, r) in out.iter_mut().zip(rhs.0) {
            *o *= r;
        }
        Range(out)
    }
}

impl<const D: usize> fmt::Display for Range<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_components(f, &self.0)
    }
}

/// Position of a work-item or work-group in each dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Id<const D: usize>([usize; D]);

impl<const D: usize> Id<D> {
    /// Create an id from its components.
    #[inline]
    pub const fn new(components: [usize; D]) -> Self {
        let () = AssertDim::<D>::OK;
        Self(components)
    }

    /// The origin.
    #[inline]
    pub const fn zero() -> Self {
        Self::new([0; D])
    }

    /// Components as an array.
    #[inline]
    pub const fn as_array(&self) -> [usize; D] {
        self.0
    }
}

impl<const D: usize> Default for Id<D> {
    fn default() -> Self {
        Self::zero()
    }
}

impl<const D: usize> From<[usize; D]> for Id<D> {
    fn from(components: [usize; D]) -> Self {
        Self::new(components)
    }
}

impl<const D: usize> Index<usize> for Id<D> {
    type Output = usize;

    #[inline]
    fn index(&self, dim: usize) -> &usize {
        &self.0[dim]
    }
}

impl<const D: usize> IndexMut<usize> for Id<D> {
    #[inline]
    fn index_mut(&mut self, dim: usize) -> &mut usize {
        &mut self.0[dim]
    }
}

impl<const D: usize> Add for Id<D> {
    type Output = Id<D>;

    fn add(self, rhs: Id<D>) -> Id<D> {
        let mut out = self.0;
        for (o, r) in out.iter_mut().zip(rhs.0) {
            *o += r;
        }
        Id(out)
    }
}

/// Scales an id by a range, e.g. `group_id * local_range`.
impl<const D: usize> Mul<Range<D>> for Id<D> {
    type Output = Id<D>;

    fn mul(self, rhs: Range<D>) -> Id<D> {
        let mut out = self.0;
        for (o, r) in out.iter_mut().zip(rhs.0) {
            *o *= r;
        }
        Id(out)
    }
}

impl<const D: usize> fmt::Display for Id<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_components(f, &self.0)
    }
}

fn write_components(f: &mut fmt::Formatter<'_>, components: &[usize]) -> fmt::Result {
    write!(f, "{{")?;
    for (i, c) in components.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", c)?;
    }
    write!(f, "}}")
}

/// Backend-native launch triple, fastest-varying dimension first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Dim3 {
    /// Innermost dimension.
    pub x: usize,
    /// Middle dimension.
    pub y: usize,
    /// Outermost dimension.
    pub z: usize,
}

impl Dim3 {
    /// Create a new triple.
    pub const fn new(x: usize, y: usize, z: usize) -> Self {
        Self { x, y, z }
    }

    /// The `{1, 1, 1}` triple.
    pub const fn one() -> Self {
        Self::new(1, 1, 1)
    }

    /// Remap a logical range into native order.
    ///
    /// `{n}` becomes `{n, 1, 1}`, `{a, b}` becomes `{b, a, 1}` and
    /// `{a, b, c}` becomes `{c, b, a}`.
    pub fn from_logical<const D: usize>(range: Range<D>) -> Self {
        let mut native = [1usize; 3];
        native[..D].copy_from_slice(&range.reversed().as_array());
        Self::new(native[0], native[1], native[2])
    }

    /// Inverse of [`Dim3::from_logical`] for the same dimensionality.
    pub fn to_logical<const D: usize>(&self) -> Range<D> {
        let native = [self.x, self.y, self.z];
        let mut out = [0usize; D];
        out.copy_from_slice(&native[..D]);
        Range::new(out).reversed()
    }

    /// Product of the three components.
    pub const fn volume(&self) -> usize {
        self.x * self.y * self.z
    }
}

impl fmt::Display for Dim3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Compute backend a launcher targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// In-process host execution.
    Host,
    /// NVIDIA CUDA.
    Cuda,
    /// AMD HIP.
    Hip,
    /// Intel oneAPI Level Zero.
    LevelZero,
}

impl Backend {
    /// Short lowercase name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Backend::Host => "host",
            Backend::Cuda => "cuda",
            Backend::Hip => "hip",
            Backend::LevelZero => "level_zero",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A device on a particular backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceId {
    /// Backend that owns the device.
    pub backend: Backend,
    /// Device ordinal within the backend.
    pub index: usize,
}

impl DeviceId {
    /// Create a device id.
    pub const fn new(backend: Backend, index: usize) -> Self {
        Self { backend, index }
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.backend, self.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_size_and_unspecified() {
        assert_eq!(Range::new([4, 8, 8]).size(), 256);
        assert!(Range::<2>::unspecified().is_unspecified());
        assert!(Range::new([0, 4]).has_zero());
        assert!(!Range::new([0, 4]).is_unspecified());
    }

    #[test]
    fn test_linear_id_row_major() {
        let range = Range::new([3, 4]);
        assert_eq!(range.linear_id(Id::new([0, 3])), 3);
        assert_eq!(range.linear_id(Id::new([1, 0])), 4);
        assert_eq!(range.linear_id(Id::new([2, 3])), 11);
        assert_eq!(range.id_from_linear(11), Id::new([2, 3]));
    }

    #[test]
    fn test_ids_enumerates_every_position_once() {
        let range = Range::new([2, 3, 2]);
        let ids: Vec<_> = range.ids().collect();
        assert_eq!(ids.len(), 12);
        assert_eq!(ids[0], Id::new([0, 0, 0]));
        assert_eq!(ids[1], Id::new([0, 0, 1]));
        assert_eq!(ids[11], Id::new([1, 2, 1]));
    }

    #[test]
    fn test_dim3_remap() {
        assert_eq!(Dim3::from_logical(Range::new([7])), Dim3::new(7, 1, 1));
        assert_eq!(Dim3::from_logical(Range::new([2, 5])), Dim3::new(5, 2, 1));
        assert_eq!(Dim3::from_logical(Range::new([2, 3, 4])), Dim3::new(4, 3, 2));
        assert_eq!(Dim3::new(4, 3, 2).to_logical::<3>(), Range::new([2, 3, 4]));
    }

    #[test]
    fn test_id_arithmetic() {
        let global = Id::new([1, 2]) + Id::new([3, 4]) * Range::new([10, 10]);
        assert_eq!(global, Id::new([31, 42]));
    }

    #[test]
    fn test_display() {
        assert_eq!(Range::new([16, 16]).to_string(), "{16, 16}");
        assert_eq!(DeviceId::new(Backend::LevelZero, 0).to_string(), "level_zero:0");
    }
}
