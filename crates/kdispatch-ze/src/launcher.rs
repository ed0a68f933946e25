//! Level Zero kernel launcher.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use kdispatch_core::backend::{CodeObjectRegistry, ErrorSink, InteropHandle, Queue};
use kdispatch_core::config::DispatchConfig;
use kdispatch_core::error::{DispatchError, Result};
use kdispatch_core::geometry::{compute_layout, effective_local_range, nd_range_layout, ExecutionRange};
use kdispatch_core::kernel::{KernelBody, KernelName, KernelType, ReductionOp};
use kdispatch_core::launcher::KernelLauncher;
use kdispatch_core::types::Backend;

use crate::strategy::{LaunchContext, LaunchStrategy};
use crate::DefaultStrategy;

/// Deferred launch produced by `bind`, consumed by `invoke`.
type DeferredInvoker<S> = Box<dyn FnOnce(&S, &LaunchContext<'_>) -> Result<()> + Send>;

fn deferred<S, F>(f: F) -> DeferredInvoker<S>
where
    S: LaunchStrategy,
    F: FnOnce(&S, &LaunchContext<'_>) -> Result<()> + Send + 'static,
{
    Box::new(f)
}

enum LauncherState<S> {
    Unbound,
    Bound(DeferredInvoker<S>),
    Invoked,
}

impl<S> LauncherState<S> {
    fn as_str(&self) -> &'static str {
        match self {
            LauncherState::Unbound => "unbound",
            LauncherState::Bound(_) => "bound",
            LauncherState::Invoked => "invoked",
        }
    }
}

/// Launcher for one kernel submission on a Level Zero queue.
///
/// # Example
///
/// ```ignore
/// let mut launcher = ZeKernelLauncher::<DirectEntry>::new(registry, sink);
/// launcher.bind(
///     KernelName::new("scale"),
///     ExecutionRange::new([1000]),
///     0,
///     KernelBody::parallel_for(move |item| { /* ... */ }),
///     vec![],
/// )?;
/// launcher.set_params(queue)?;
/// launcher.invoke()?;
/// ```
pub struct ZeKernelLauncher<S: LaunchStrategy = DefaultStrategy> {
    strategy: S,
    registry: Arc<dyn CodeObjectRegistry>,
    error_sink: Arc<dyn ErrorSink>,
    config: DispatchConfig,
    queue: Option<Arc<dyn Queue>>,
    kernel_type: Option<KernelType>,
    reductions: Vec<ReductionOp>,
    state: LauncherState<S>,
}

impl<S: LaunchStrategy + Default> ZeKernelLauncher<S> {
    /// Create an unbound launcher using the strategy's default instance.
    pub fn new(registry: Arc<dyn CodeObjectRegistry>, error_sink: Arc<dyn ErrorSink>) -> Self {
        Self::with_strategy(S::default(), registry, error_sink)
    }
}

impl<S: LaunchStrategy> ZeKernelLauncher<S> {
    /// Create an unbound launcher with an explicit strategy.
    pub fn with_strategy(
        strategy: S,
        registry: Arc<dyn CodeObjectRegistry>,
        error_sink: Arc<dyn ErrorSink>,
    ) -> Self {
        Self {
            strategy,
            registry,
            error_sink,
            config: DispatchConfig::default(),
            queue: None,
            kernel_type: None,
            reductions: Vec::new(),
            state: LauncherState::Unbound,
        }
    }

    /// Replace the configuration. Only affects subsequent `bind` calls.
    pub fn with_config(mut self, config: DispatchConfig) -> Result<Self> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    /// Active configuration.
    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Launch strategy.
    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    /// Reduction operators attached at bind time.
    pub fn reductions(&self) -> &[ReductionOp] {
        &self.reductions
    }

    /// Whether a kernel is bound and not yet invoked.
    pub fn is_bound(&self) -> bool {
        matches!(self.state, LauncherState::Bound(_))
    }

    /// Whether the launcher has been consumed.
    pub fn is_invoked(&self) -> bool {
        matches!(self.state, LauncherState::Invoked)
    }

    /// Bind a kernel and its geometry.
    ///
    /// The category is taken from `body`. Nothing is submitted here; the
    /// launch happens on [`KernelLauncher::invoke`], which recomputes the
    /// geometry from `range`.
    pub fn bind<const D: usize>(
        &mut self,
        name: KernelName,
        range: ExecutionRange<D>,
        dynamic_local_memory: usize,
        body: KernelBody<D>,
        reductions: Vec<ReductionOp>,
    ) -> Result<()> {
        if !matches!(self.state, LauncherState::Unbound) {
            return Err(DispatchError::AlreadyBound);
        }

        let kernel_type = body.kernel_type();
        if !self.strategy.supports(kernel_type) {
            return Err(DispatchError::UnsupportedKernelType {
                kernel_type,
                strategy: S::NAME,
            });
        }

        debug!(
            kernel = %name,
            %kernel_type,
            dims = D,
            global_range = %range.global_range,
            local_range = %range.local_range,
            dynamic_local_memory,
            reductions = reductions.len(),
            strategy = S::NAME,
            "Binding kernel"
        );

        let defaults = self.config.local_range_defaults.clone();
        let invoker = match body {
            KernelBody::SingleTask(f) => {
                deferred(move |strategy: &S, ctx| strategy.single_task(ctx, &name, &f))
            }
            KernelBody::BasicParallelFor(f) => {
                effective_local_range(range.local_range, &defaults)?;
                deferred(move |strategy: &S, ctx| {
                    let layout = compute_layout(range.global_range, range.local_range, &defaults)?;
                    debug!(
                        kernel = %name,
                        group_size = layout.local_range.size(),
                        num_groups = %layout.num_groups,
                        "Submitting high-level parallel for with selected total group size of {}",
                        layout.local_range.size()
                    );
                    strategy.parallel_for(ctx, &name, &layout, dynamic_local_memory, &range, &f)
                })
            }
            KernelBody::NdRangeParallelFor(f) => {
                nd_range_layout(range.global_range, range.local_range)?;
                deferred(move |strategy: &S, ctx| {
                    let layout = nd_range_layout(range.global_range, range.local_range)?;
                    strategy.nd_range(ctx, &name, &layout, dynamic_local_memory, range.offset, &f)
                })
            }
            KernelBody::HierarchicalParallelFor(f) => {
                effective_local_range(range.local_range, &defaults)?;
                deferred(move |strategy: &S, ctx| {
                    let layout = compute_layout(range.global_range, range.local_range, &defaults)?;
                    strategy.hierarchical(ctx, &name, &layout, dynamic_local_memory, range.global_range, &f)
                })
            }
            KernelBody::ScopedParallelFor(f) => {
                effective_local_range(range.local_range, &defaults)?;
                deferred(move |strategy: &S, ctx| {
                    let layout = compute_layout(range.global_range, range.local_range, &defaults)?;
                    strategy.scoped(ctx, &name, &layout, dynamic_local_memory, range.global_range, &f)
                })
            }
            KernelBody::Custom(kernel) => deferred(move |_strategy: &S, ctx| {
                let handle = InteropHandle::new(ctx.queue.device());
                // Run a fresh copy so bindings captured by the body are
                // materialized at invocation time, not at bind time.
                let initialized_kernel = kernel.clone_box();
                initialized_kernel.call(&handle);
                Ok(())
            }),
        };

        self.kernel_type = Some(kernel_type);
        self.reductions = reductions;
        self.state = LauncherState::Bound(invoker);
        Ok(())
    }
}

impl<S: LaunchStrategy> KernelLauncher for ZeKernelLauncher<S> {
    fn set_params(&mut self, queue: Arc<dyn Queue>) -> Result<()> {
        if self.queue.is_some() {
            return Err(DispatchError::QueueAlreadySet);
        }

        let device = queue.device();
        if device.backend != Backend::LevelZero || device.index != self.config.device_index {
            warn!(
                %device,
                expected_index = self.config.device_index,
                "Queue device does not match the configured Level Zero device"
            );
        }

        self.queue = Some(queue);
        Ok(())
    }

    fn invoke(&mut self) -> Result<()> {
        let queue = match (&self.state, &self.queue) {
            (LauncherState::Unbound, _) => return Err(DispatchError::NotBound),
            (LauncherState::Invoked, _) => return Err(DispatchError::AlreadyInvoked),
            (LauncherState::Bound(_), None) => return Err(DispatchError::QueueNotSet),
            (LauncherState::Bound(_), Some(queue)) => Arc::clone(queue),
        };

        let invoker = match std::mem::replace(&mut self.state, LauncherState::Invoked) {
            LauncherState::Bound(invoker) => invoker,
            _ => return Err(DispatchError::NotBound),
        };

        let ctx = LaunchContext {
            queue: queue.as_ref(),
            registry: self.registry.as_ref(),
            error_sink: self.error_sink.as_ref(),
            backend: self.backend(),
            module_format: &self.config.module_format,
        };

        let result = invoker(&self.strategy, &ctx);
        if let Err(error) = &result {
            debug!(%error, kernel_type = ?self.kernel_type, "Kernel invocation failed");
        }
        result
    }

    fn backend(&self) -> Backend {
        Backend::LevelZero
    }

    fn kernel_type(&self) -> Result<KernelType> {
        self.kernel_type.ok_or(DispatchError::NotBound)
    }
}

impl<S: LaunchStrategy> fmt::Debug for ZeKernelLauncher<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZeKernelLauncher")
            .field("strategy", &S::NAME)
            .field("state", &self.state.as_str())
            .field("kernel_type", &self.kernel_type)
            .field("has_queue", &self.queue.is_some())
            .field("reductions", &self.reductions)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use kdispatch_core::types::DeviceId;
    use kdispatch_host::{CollectingErrorSink, HostQueue, InMemoryRegistry};

    use crate::strategy::{DirectEntry, ModuleInvocation};

    fn direct_launcher() -> ZeKernelLauncher<DirectEntry> {
        ZeKernelLauncher::new(
            Arc::new(InMemoryRegistry::new()),
            Arc::new(CollectingErrorSink::new()),
        )
    }

    fn queue() -> Arc<dyn Queue> {
        Arc::new(HostQueue::new(DeviceId::new(Backend::LevelZero, 0)))
    }

    #[test]
    fn test_kernel_type_requires_bind() {
        let mut launcher = direct_launcher();
        assert_eq!(launcher.kernel_type(), Err(DispatchError::NotBound));

        launcher
            .bind(
                KernelName::new("noop"),
                ExecutionRange::new([1]),
                0,
                KernelBody::single_task(|| {}),
                vec![],
            )
            .unwrap();
        assert_eq!(launcher.kernel_type(), Ok(KernelType::SingleTask));
        assert_eq!(launcher.backend(), Backend::LevelZero);
    }

    #[test]
    fn test_invoke_without_queue_fails() {
        let mut launcher = direct_launcher();
        launcher
            .bind(
                KernelName::new("noop"),
                ExecutionRange::new([1]),
                0,
                KernelBody::single_task(|| {}),
                vec![],
            )
            .unwrap();

        assert_eq!(launcher.invoke(), Err(DispatchError::QueueNotSet));
        // The binding survives a failed precondition check.
        assert!(launcher.is_bound());
    }

    #[test]
    fn test_invoke_unbound_fails() {
        let mut launcher = direct_launcher();
        launcher.set_params(queue()).unwrap();
        assert_eq!(launcher.invoke(), Err(DispatchError::NotBound));
    }

    #[test]
    fn test_single_use() {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&runs);

        let mut launcher = direct_launcher();
        launcher
            .bind(
                KernelName::new("count"),
                ExecutionRange::new([1]),
                0,
                KernelBody::single_task(move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                }),
                vec![ReductionOp::Sum],
            )
            .unwrap();
        launcher.set_params(queue()).unwrap();

        assert!(launcher.invoke().is_ok());
        assert_eq!(launcher.invoke(), Err(DispatchError::AlreadyInvoked));
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert!(launcher.is_invoked());
        assert_eq!(launcher.reductions(), &[ReductionOp::Sum]);
    }

    #[test]
    fn test_double_bind_and_double_queue_rejected() {
        let mut launcher = direct_launcher();
        launcher
            .bind(
                KernelName::new("a"),
                ExecutionRange::new([4]),
                0,
                KernelBody::parallel_for(|_| {}),
                vec![],
            )
            .unwrap();
        let err = launcher
            .bind(
                KernelName::new("b"),
                ExecutionRange::new([4]),
                0,
                KernelBody::parallel_for(|_| {}),
                vec![],
            )
            .unwrap_err();
        assert_eq!(err, DispatchError::AlreadyBound);

        launcher.set_params(queue()).unwrap();
        assert_eq!(launcher.set_params(queue()), Err(DispatchError::QueueAlreadySet));
    }

    #[test]
    fn test_module_strategy_rejects_nd_range_at_bind() {
        let mut launcher: ZeKernelLauncher<ModuleInvocation> = ZeKernelLauncher::new(
            Arc::new(InMemoryRegistry::new()),
            Arc::new(CollectingErrorSink::new()),
        );
        let err = launcher
            .bind(
                KernelName::new("nd"),
                ExecutionRange::new([64]).with_local([8]),
                0,
                KernelBody::nd_range(|_| {}),
                vec![],
            )
            .unwrap_err();
        assert!(matches!(
            err,
            DispatchError::UnsupportedKernelType {
                kernel_type: KernelType::NdRangeParallelFor,
                ..
            }
        ));
        assert!(!launcher.is_bound());
    }

    #[test]
    fn test_invalid_nd_range_rejected_at_bind() {
        let mut launcher = direct_launcher();
        let err = launcher
            .bind(
                KernelName::new("nd"),
                ExecutionRange::new([10]).with_local([4]),
                0,
                KernelBody::nd_range(|_| {}),
                vec![],
            )
            .unwrap_err();
        assert!(matches!(err, DispatchError::InvalidRange(_)));
    }

    #[test]
    fn test_config_defaults_applied() {
        let mut config = DispatchConfig::default();
        config.local_range_defaults.one_d = [64];
        let max_local = Arc::new(AtomicUsize::new(0));
        let observed = Arc::clone(&max_local);

        let mut launcher = direct_launcher().with_config(config).unwrap();
        launcher
            .bind(
                KernelName::new("hier"),
                ExecutionRange::new([100]),
                0,
                KernelBody::hierarchical(move |group| {
                    observed.fetch_max(group.local_range()[0], Ordering::SeqCst);
                }),
                vec![],
            )
            .unwrap();
        launcher.set_params(queue()).unwrap();
        launcher.invoke().unwrap();

        assert_eq!(max_local.load(Ordering::SeqCst), 64);
    }
}
