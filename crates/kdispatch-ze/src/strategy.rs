//! Launch strategies.
//!
//! A strategy turns a computed layout into an actual launch. [`DirectEntry`]
//! calls the kernel entry point itself and runs every execution unit on the
//! calling thread. [`ModuleInvocation`] hands the launch to the queue's
//! module invoker together with a precompiled code object.

use std::any::Any;

use tracing::{debug, trace};

use kdispatch_core::backend::{CodeObjectRegistry, ErrorSink, Queue};
use kdispatch_core::error::{DispatchError, Result};
use kdispatch_core::geometry::{ExecutionRange, GroupLayout, LaunchGeometry};
use kdispatch_core::index::{Group, Item, NdItem, SpItem};
use kdispatch_core::kernel::{GroupFn, KernelName, KernelType, NdRangeFn, ParallelForFn, SingleTaskFn};
use kdispatch_core::types::{Backend, Id, Range};

use crate::module::invoke_from_module;

/// Collaborators available while a deferred launch runs.
pub struct LaunchContext<'a> {
    /// Queue the launch goes to.
    pub queue: &'a dyn Queue,
    /// Code objects for the module path.
    pub registry: &'a dyn CodeObjectRegistry,
    /// Where launch failures are reported.
    pub error_sink: &'a dyn ErrorSink,
    /// Backend of the launcher.
    pub backend: Backend,
    /// Binary format requested from the registry.
    pub module_format: &'a str,
}

/// How bound kernels reach the device.
pub trait LaunchStrategy: Send + Sync + 'static {
    /// Name used in logs and errors.
    const NAME: &'static str;

    /// Whether this strategy can launch `kernel_type`.
    fn supports(&self, kernel_type: KernelType) -> bool;

    /// Launch a single execution unit.
    fn single_task(&self, ctx: &LaunchContext<'_>, name: &KernelName, body: &SingleTaskFn) -> Result<()>;

    /// Launch a flat parallel-for over `layout`.
    ///
    /// `layout` may over-provision; units outside `range.global_range` must
    /// not run the body.
    fn parallel_for<const D: usize>(
        &self,
        ctx: &LaunchContext<'_>,
        name: &KernelName,
        layout: &GroupLayout<D>,
        dynamic_local_memory: usize,
        range: &ExecutionRange<D>,
        body: &ParallelForFn<D>,
    ) -> Result<()>;

    /// Launch an nd-range kernel. `layout` divides the global range exactly.
    fn nd_range<const D: usize>(
        &self,
        _ctx: &LaunchContext<'_>,
        _name: &KernelName,
        _layout: &GroupLayout<D>,
        _dynamic_local_memory: usize,
        _offset: Id<D>,
        _body: &NdRangeFn<D>,
    ) -> Result<()> {
        Err(unsupported::<Self>(KernelType::NdRangeParallelFor))
    }

    /// Launch a hierarchical kernel: the body runs once per group.
    fn hierarchical<const D: usize>(
        &self,
        _ctx: &LaunchContext<'_>,
        _name: &KernelName,
        _layout: &GroupLayout<D>,
        _dynamic_local_memory: usize,
        _global_range: Range<D>,
        _body: &GroupFn<D>,
    ) -> Result<()> {
        Err(unsupported::<Self>(KernelType::HierarchicalParallelFor))
    }

    /// Launch a scoped kernel: the body runs once per group.
    fn scoped<const D: usize>(
        &self,
        _ctx: &LaunchContext<'_>,
        _name: &KernelName,
        _layout: &GroupLayout<D>,
        _dynamic_local_memory: usize,
        _global_range: Range<D>,
        _body: &GroupFn<D>,
    ) -> Result<()> {
        Err(unsupported::<Self>(KernelType::ScopedParallelFor))
    }
}

fn unsupported<S: LaunchStrategy + ?Sized>(kernel_type: KernelType) -> DispatchError {
    DispatchError::UnsupportedKernelType {
        kernel_type,
        strategy: S::NAME,
    }
}

/// Calls kernel entry points directly on the queue thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectEntry;

impl DirectEntry {
    /// Entry point of a basic parallel-for unit. Returns whether the body ran.
    #[inline]
    fn kernel_parallel_for<const D: usize>(
        unit: SpItem<D>,
        range: &ExecutionRange<D>,
        body: &ParallelForFn<D>,
    ) -> bool {
        let gid = unit.global_id();
        let is_within_range = range.global_range.contains(gid);
        if is_within_range {
            body(Item::new(gid, range.global_range, range.offset));
        }
        is_within_range
    }

    fn run_groups<const D: usize>(
        layout: &GroupLayout<D>,
        global_range: Range<D>,
        body: &GroupFn<D>,
    ) {
        for group_id in layout.num_groups.ids() {
            let group = Group::new(group_id, layout.local_range, layout.num_groups, global_range);
            body(&group);
        }
    }
}

impl LaunchStrategy for DirectEntry {
    const NAME: &'static str = "direct-entry";

    fn supports(&self, _kernel_type: KernelType) -> bool {
        true
    }

    fn single_task(&self, _ctx: &LaunchContext<'_>, name: &KernelName, body: &SingleTaskFn) -> Result<()> {
        trace!(kernel = %name, "Running single task");
        body();
        Ok(())
    }

    fn parallel_for<const D: usize>(
        &self,
        _ctx: &LaunchContext<'_>,
        name: &KernelName,
        layout: &GroupLayout<D>,
        dynamic_local_memory: usize,
        range: &ExecutionRange<D>,
        body: &ParallelForFn<D>,
    ) -> Result<()> {
        let mut executed = 0usize;
        for group_id in layout.num_groups.ids() {
            for local_id in layout.local_range.ids() {
                let unit = SpItem::new(local_id, group_id, layout.local_range, layout.num_groups);
                if Self::kernel_parallel_for(unit, range, body) {
                    executed += 1;
                }
            }
        }

        debug!(
            kernel = %name,
            executed,
            skipped = layout.provisioned_items() - executed,
            dynamic_local_memory,
            "Direct parallel for complete"
        );
        Ok(())
    }

    fn nd_range<const D: usize>(
        &self,
        _ctx: &LaunchContext<'_>,
        name: &KernelName,
        layout: &GroupLayout<D>,
        _dynamic_local_memory: usize,
        offset: Id<D>,
        body: &NdRangeFn<D>,
    ) -> Result<()> {
        for group_id in layout.num_groups.ids() {
            for local_id in layout.local_range.ids() {
                let unit = SpItem::new(local_id, group_id, layout.local_range, layout.num_groups);
                body(NdItem::new(unit, offset));
            }
        }
        trace!(kernel = %name, items = layout.provisioned_items(), "Direct nd-range complete");
        Ok(())
    }

    fn hierarchical<const D: usize>(
        &self,
        _ctx: &LaunchContext<'_>,
        name: &KernelName,
        layout: &GroupLayout<D>,
        _dynamic_local_memory: usize,
        global_range: Range<D>,
        body: &GroupFn<D>,
    ) -> Result<()> {
        Self::run_groups(layout, global_range, body);
        trace!(kernel = %name, groups = layout.num_groups.size(), "Direct hierarchical launch complete");
        Ok(())
    }

    fn scoped<const D: usize>(
        &self,
        _ctx: &LaunchContext<'_>,
        name: &KernelName,
        layout: &GroupLayout<D>,
        _dynamic_local_memory: usize,
        global_range: Range<D>,
        body: &GroupFn<D>,
    ) -> Result<()> {
        Self::run_groups(layout, global_range, body);
        trace!(kernel = %name, groups = layout.num_groups.size(), "Direct scoped launch complete");
        Ok(())
    }
}

/// Launches kernels out of precompiled code objects.
///
/// Code objects only carry single-task and basic parallel-for entry points.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModuleInvocation;

impl LaunchStrategy for ModuleInvocation {
    const NAME: &'static str = "module-invocation";

    fn supports(&self, kernel_type: KernelType) -> bool {
        matches!(
            kernel_type,
            KernelType::SingleTask | KernelType::BasicParallelFor | KernelType::Custom
        )
    }

    fn single_task(&self, ctx: &LaunchContext<'_>, name: &KernelName, body: &SingleTaskFn) -> Result<()> {
        let args: [&dyn Any; 1] = [body];
        invoke_from_module(ctx, name, &LaunchGeometry::single_task(), &args)
    }

    fn parallel_for<const D: usize>(
        &self,
        ctx: &LaunchContext<'_>,
        name: &KernelName,
        layout: &GroupLayout<D>,
        dynamic_local_memory: usize,
        range: &ExecutionRange<D>,
        body: &ParallelForFn<D>,
    ) -> Result<()> {
        let geometry = layout.to_geometry(dynamic_local_memory);
        let args: [&dyn Any; 2] = [body, &range.global_range];
        invoke_from_module(ctx, name, &geometry, &args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_support_matrix() {
        for kernel_type in [
            KernelType::SingleTask,
            KernelType::BasicParallelFor,
            KernelType::NdRangeParallelFor,
            KernelType::HierarchicalParallelFor,
            KernelType::ScopedParallelFor,
            KernelType::Custom,
        ] {
            assert!(DirectEntry.supports(kernel_type));
        }

        assert!(ModuleInvocation.supports(KernelType::BasicParallelFor));
        assert!(ModuleInvocation.supports(KernelType::Custom));
        assert!(!ModuleInvocation.supports(KernelType::NdRangeParallelFor));
        assert!(!ModuleInvocation.supports(KernelType::ScopedParallelFor));
    }

    #[test]
    fn test_unsupported_error_names_strategy() {
        let err = unsupported::<ModuleInvocation>(KernelType::HierarchicalParallelFor);
        assert_eq!(
            err,
            DispatchError::UnsupportedKernelType {
                kernel_type: KernelType::HierarchicalParallelFor,
                strategy: "module-invocation",
            }
        );
    }
}
