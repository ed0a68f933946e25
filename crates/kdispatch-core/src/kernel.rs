//! Kernel descriptors: execution category, body and identity.

use std::borrow::Cow;
use std::fmt;

use crate::backend::InteropHandle;
use crate::index::{Group, Item, NdItem};

/// Execution category of a bound kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KernelType {
    /// Exactly one execution unit.
    SingleTask,
    /// Flat parallel launch over a global range.
    BasicParallelFor,
    /// Parallel launch with explicit work-groups.
    NdRangeParallelFor,
    /// Body runs per work-group and spawns per-item work.
    HierarchicalParallelFor,
    /// Body runs per work-group and distributes items.
    ScopedParallelFor,
    /// Raw interop access to the backend.
    Custom,
}

impl KernelType {
    /// Short lowercase name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            KernelType::SingleTask => "single_task",
            KernelType::BasicParallelFor => "basic_parallel_for",
            KernelType::NdRangeParallelFor => "ndrange_parallel_for",
            KernelType::HierarchicalParallelFor => "hierarchical_parallel_for",
            KernelType::ScopedParallelFor => "scoped_parallel_for",
            KernelType::Custom => "custom",
        }
    }
}

impl fmt::Display for KernelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stable identity of a kernel.
///
/// Both tags are assigned when the code object is built and are carried
/// alongside the binary, so module lookups never depend on how a host
/// compiler happens to mangle names.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KernelName {
    name: Cow<'static, str>,
    body: Cow<'static, str>,
}

impl KernelName {
    /// Create an identity whose body tag is `<name>.body`.
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        let name = name.into();
        let body = Cow::Owned(format!("{}.body", name));
        Self { name, body }
    }

    /// Override the body tag.
    #[must_use]
    pub fn with_body_tag(mut self, body: impl Into<Cow<'static, str>>) -> Self {
        self.body = body.into();
        self
    }

    /// Kernel name tag.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Kernel body tag.
    pub fn body_tag(&self) -> &str {
        &self.body
    }
}

impl fmt::Display for KernelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Reduction operator attached to a parallel launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ReductionOp {
    /// `a + b`
    #[default]
    Sum,
    /// `a * b`
    Product,
    /// `min(a, b)`
    Min,
    /// `max(a, b)`
    Max,
    /// `a & b`
    And,
    /// `a | b`
    Or,
    /// `a ^ b`
    Xor,
}

/// Single-task kernel body.
pub type SingleTaskFn = Box<dyn Fn() + Send>;
/// Basic parallel-for kernel body.
pub type ParallelForFn<const D: usize> = Box<dyn Fn(Item<D>) + Send>;
/// Nd-range kernel body.
pub type NdRangeFn<const D: usize> = Box<dyn Fn(NdItem<D>) + Send>;
/// Hierarchical or scoped kernel body, run once per work-group.
pub type GroupFn<const D: usize> = Box<dyn Fn(&Group<D>) + Send>;

/// Interop kernel body that can be re-materialized by cloning.
pub trait InteropKernel: Send {
    /// Fresh value copy of the body.
    fn clone_box(&self) -> Box<dyn InteropKernel>;

    /// Run the body against a backend handle.
    fn call(&self, handle: &InteropHandle);
}

impl<F> InteropKernel for F
where
    F: Fn(&InteropHandle) + Clone + Send + 'static,
{
    fn clone_box(&self) -> Box<dyn InteropKernel> {
        Box::new(self.clone())
    }

    fn call(&self, handle: &InteropHandle) {
        self(handle)
    }
}

/// A kernel body tagged with its execution category.
pub enum KernelBody<const D: usize> {
    /// See [`KernelType::SingleTask`].
    SingleTask(SingleTaskFn),
    /// See [`KernelType::BasicParallelFor`].
    BasicParallelFor(ParallelForFn<D>),
    /// See [`KernelType::NdRangeParallelFor`].
    NdRangeParallelFor(NdRangeFn<D>),
    /// See [`KernelType::HierarchicalParallelFor`].
    HierarchicalParallelFor(GroupFn<D>),
    /// See [`KernelType::ScopedParallelFor`].
    ScopedParallelFor(GroupFn<D>),
    /// See [`KernelType::Custom`].
    Custom(Box<dyn InteropKernel>),
}

impl<const D: usize> KernelBody<D> {
    /// Wrap a single-task body.
    pub fn single_task<F>(f: F) -> Self
    where
        F: Fn() + Send + 'static,
    {
        KernelBody::SingleTask(Box::new(f))
    }

    /// Wrap a basic parallel-for body.
    pub fn parallel_for<F>(f: F) -> Self
    where
        F: Fn(Item<D>) + Send + 'static,
    {
        KernelBody::BasicParallelFor(Box::new(f))
    }

    /// Wrap an nd-range body.
    pub fn nd_range<F>(f: F) -> Self
    where
        F: Fn(NdItem<D>) + Send + 'static,
    {
        KernelBody::NdRangeParallelFor(Box::new(f))
    }

    /// Wrap a hierarchical body.
    pub fn hierarchical<F>(f: F) -> Self
    where
        F: Fn(&Group<D>) + Send + 'static,
    {
        KernelBody::HierarchicalParallelFor(Box::new(f))
    }

    /// Wrap a scoped body.
    pub fn scoped<F>(f: F) -> Self
    where
        F: Fn(&Group<D>) + Send + 'static,
    {
        KernelBody::ScopedParallelFor(Box::new(f))
    }

    /// Wrap an interop body.
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&InteropHandle) + Clone + Send + 'static,
    {
        KernelBody::Custom(Box::new(f))
    }

    /// Category of this body.
    pub fn kernel_type(&self) -> KernelType {
        match self {
            KernelBody::SingleTask(_) => KernelType::SingleTask,
            KernelBody::BasicParallelFor(_) => KernelType::BasicParallelFor,
            KernelBody::NdRangeParallelFor(_) => KernelType::NdRangeParallelFor,
            KernelBody::HierarchicalParallelFor(_) => KernelType::HierarchicalParallelFor,
            KernelBody::ScopedParallelFor(_) => KernelType::ScopedParallelFor,
            KernelBody::Custom(_) => KernelType::Custom,
        }
    }
}

impl<const D: usize> fmt::Debug for KernelBody<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("KernelBody").field(&self.kernel_type()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kernel_name_tags() {
        let name = KernelName::new("vector_add");
        assert_eq!(name.name(), "vector_add");
        assert_eq!(name.body_tag(), "vector_add.body");

        let name = name.with_body_tag("VectorAddBody");
        assert_eq!(name.body_tag(), "VectorAddBody");
    }

    #[test]
    fn test_body_category() {
        let body = KernelBody::<2>::parallel_for(|_item| {});
        assert_eq!(body.kernel_type(), KernelType::BasicParallelFor);
        let body = KernelBody::<1>::custom(|_h: &InteropHandle| {});
        assert_eq!(body.kernel_type(), KernelType::Custom);
    }
}
