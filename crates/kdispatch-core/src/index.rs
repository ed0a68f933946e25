//! Work-item addressing.
//!
//! [`SpItem`] is the hierarchical index model: it stores only the local id,
//! the group id and the two ranges, and derives everything else on demand.
//! The other types are what kernel bodies receive for each execution model.

use crate::types::{Id, Range};

/// Hierarchical index of one execution unit.
///
/// Used as the logical item of hierarchical kernels and the distributed item
/// of scoped kernels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpItem<const D: usize> {
    local_id: Id<D>,
    group_id: Id<D>,
    local_range: Range<D>,
    num_groups: Range<D>,
}

impl<const D: usize> SpItem<D> {
    /// Create an item from its defining tuple.
    #[inline]
    pub const fn new(
        local_id: Id<D>,
        group_id: Id<D>,
        local_range: Range<D>,
        num_groups: Range<D>,
    ) -> Self {
        Self {
            local_id,
            group_id,
            local_range,
            num_groups,
        }
    }

    /// `num_groups * local_range`, elementwise.
    #[inline]
    pub fn global_range(&self) -> Range<D> {
        self.num_groups * self.local_range
    }

    /// Global range in one dimension.
    #[inline]
    pub fn global_range_in(&self, dim: usize) -> usize {
        self.num_groups[dim] * self.local_range[dim]
    }

    /// `local_id + group_id * local_range`, elementwise.
    #[inline]
    pub fn global_id(&self) -> Id<D> {
        self.local_id + self.group_id * self.local_range
    }

    /// Global id in one dimension.
    #[inline]
    pub fn global_id_in(&self, dim: usize) -> usize {
        self.local_id[dim] + self.group_id[dim] * self.local_range[dim]
    }

    /// Row-major linear global id.
    #[inline]
    pub fn global_linear_id(&self) -> usize {
        self.global_range().linear_id(self.global_id())
    }

    /// Work-group size.
    #[inline]
    pub fn local_range(&self) -> Range<D> {
        self.local_range
    }

    /// Work-group size in one dimension.
    #[inline]
    pub fn local_range_in(&self, dim: usize) -> usize {
        self.local_range[dim]
    }

    /// Id within the work-group.
    #[inline]
    pub fn local_id(&self) -> Id<D> {
        self.local_id
    }

    /// Id within the work-group in one dimension.
    #[inline]
    pub fn local_id_in(&self, dim: usize) -> usize {
        self.local_id[dim]
    }

    /// Row-major linear id within the work-group.
    #[inline]
    pub fn local_linear_id(&self) -> usize {
        self.local_range.linear_id(self.local_id)
    }

    /// Id of the enclosing work-group.
    #[inline]
    pub fn group_id(&self) -> Id<D> {
        self.group_id
    }

    /// Number of work-groups.
    #[inline]
    pub fn num_groups(&self) -> Range<D> {
        self.num_groups
    }

    /// Row-major linear id of the enclosing work-group.
    #[inline]
    pub fn group_linear_id(&self) -> usize {
        self.num_groups.linear_id(self.group_id)
    }
}

/// Item passed to basic parallel-for kernels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Item<const D: usize> {
    index: Id<D>,
    range: Range<D>,
    offset: Id<D>,
}

impl<const D: usize> Item<D> {
    /// Create an item. `index` is relative to `offset`.
    #[inline]
    pub const fn new(index: Id<D>, range: Range<D>, offset: Id<D>) -> Self {
        Self {
            index,
            range,
            offset,
        }
    }

    /// Id including the launch offset.
    #[inline]
    pub fn id(&self) -> Id<D> {
        self.index + self.offset
    }

    /// Id in one dimension, including the launch offset.
    #[inline]
    pub fn id_in(&self, dim: usize) -> usize {
        self.index[dim] + self.offset[dim]
    }

    /// The requested global range.
    #[inline]
    pub fn range(&self) -> Range<D> {
        self.range
    }

    /// The launch offset.
    #[inline]
    pub fn offset(&self) -> Id<D> {
        self.offset
    }

    /// Row-major linear id, ignoring the offset.
    #[inline]
    pub fn linear_id(&self) -> usize {
        self.range.linear_id(self.index)
    }
}

/// Item passed to nd-range kernels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NdItem<const D: usize> {
    item: SpItem<D>,
    offset: Id<D>,
}

impl<const D: usize> NdItem<D> {
    /// Wrap a hierarchical index with a launch offset.
    #[inline]
    pub const fn new(item: SpItem<D>, offset: Id<D>) -> Self {
        Self { item, offset }
    }

    /// Global id including the launch offset.
    #[inline]
    pub fn global_id(&self) -> Id<D> {
        self.item.global_id() + self.offset
    }

    /// Global id in one dimension, including the launch offset.
    #[inline]
    pub fn global_id_in(&self, dim: usize) -> usize {
        self.item.global_id_in(dim) + self.offset[dim]
    }

    /// Row-major linear global id, ignoring the offset.
    #[inline]
    pub fn global_linear_id(&self) -> usize {
        self.item.global_linear_id()
    }

    /// Id within the work-group.
    #[inline]
    pub fn local_id(&self) -> Id<D> {
        self.item.local_id()
    }

    /// Row-major linear id within the work-group.
    #[inline]
    pub fn local_linear_id(&self) -> usize {
        self.item.local_linear_id()
    }

    /// Id of the work-group.
    #[inline]
    pub fn group_id(&self) -> Id<D> {
        self.item.group_id()
    }

    /// Row-major linear id of the work-group.
    #[inline]
    pub fn group_linear_id(&self) -> usize {
        self.item.group_linear_id()
    }

    /// Global range.
    #[inline]
    pub fn global_range(&self) -> Range<D> {
        self.item.global_range()
    }

    /// Work-group size.
    #[inline]
    pub fn local_range(&self) -> Range<D> {
        self.item.local_range()
    }

    /// Number of work-groups.
    #[inline]
    pub fn group_range(&self) -> Range<D> {
        self.item.num_groups()
    }

    /// The launch offset.
    #[inline]
    pub fn offset(&self) -> Id<D> {
        self.offset
    }
}

/// One work-group of a hierarchical or scoped launch.
///
/// The body runs once per group; per-item work is expressed through
/// [`Group::parallel_for_work_item`] or [`Group::distribute_items`]. Items
/// that fall outside the requested global range are never handed out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Group<const D: usize> {
    group_id: Id<D>,
    local_range: Range<D>,
    num_groups: Range<D>,
    requested_range: Range<D>,
}

impl<const D: usize> Group<D> {
    /// Create a group handle.
    pub const fn new(
        group_id: Id<D>,
        local_range: Range<D>,
        num_groups: Range<D>,
        requested_range: Range<D>,
    ) -> Self {
        Self {
            group_id,
            local_range,
            num_groups,
            requested_range,
        }
    }

    /// Id of this group.
    #[inline]
    pub fn group_id(&self) -> Id<D> {
        self.group_id
    }

    /// Row-major linear id of this group.
    #[inline]
    pub fn group_linear_id(&self) -> usize {
        self.num_groups.linear_id(self.group_id)
    }

    /// Work-group size.
    #[inline]
    pub fn local_range(&self) -> Range<D> {
        self.local_range
    }

    /// Number of work-groups.
    #[inline]
    pub fn group_range(&self) -> Range<D> {
        self.num_groups
    }

    /// The global range the caller asked for.
    #[inline]
    pub fn requested_range(&self) -> Range<D> {
        self.requested_range
    }

    /// In-range items of this group, row-major.
    pub fn items(&self) -> impl Iterator<Item = SpItem<D>> + '_ {
        self.local_range
            .ids()
            .map(move |local| SpItem::new(local, self.group_id, self.local_range, self.num_groups))
            .filter(move |item| self.requested_range.contains(item.global_id()))
    }

    /// Run `f` for every logical item of the group.
    pub fn parallel_for_work_item<F>(&self, f: F)
    where
        F: FnMut(SpItem<D>),
    {
        self.items().for_each(f);
    }

    /// Distribute the group's items over `f`.
    pub fn distribute_items<F>(&self, f: F)
    where
        F: FnMut(SpItem<D>),
    {
        self.items().for_each(f);
    }

    /// Run `f` exactly once for the whole group.
    pub fn single_item<F>(&self, f: F)
    where
        F: FnOnce(),
    {
        f();
    }
}
