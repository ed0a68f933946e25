//! # kdispatch
//!
//! Kernel dispatch layer for heterogeneous compute backends.
//!
//! kdispatch turns a kernel body plus a requested execution range into a
//! launch on a device queue. It picks a group size when the caller does not,
//! over-provisions when the global range is not a multiple of it, reorders
//! dimensions into the backend's native layout, and can launch either by
//! calling kernel entry points directly or by invoking a kernel out of a
//! precompiled code object.
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use kdispatch::prelude::*;
//!
//! let registry = Arc::new(InMemoryRegistry::new());
//! let sink = Arc::new(TracingErrorSink);
//! let queue = Arc::new(HostQueue::new(DeviceId::new(Backend::LevelZero, 0)));
//!
//! let mut launcher = ZeKernelLauncher::<DirectEntry>::new(registry, sink);
//! launcher.bind(
//!     KernelName::new("fill"),
//!     ExecutionRange::new([1000]),
//!     0,
//!     KernelBody::parallel_for(|item| {
//!         let _ = item.id()[0];
//!     }),
//!     vec![],
//! )?;
//! launcher.set_params(queue)?;
//! launcher.invoke()?;
//! ```
//!
//! ## Crates
//!
//! - [`kdispatch_core`] - index types, geometry, kernel bodies, collaborator traits
//! - [`kdispatch_ze`] - Level Zero launcher and launch strategies
//! - [`kdispatch_host`] - in-process queue, invoker, registry and error sinks
//!
//! ## Features
//!
//! - `module-fallback` - make [`ModuleInvocation`](kdispatch_ze::ModuleInvocation)
//!   the default launch strategy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub use kdispatch_core;
pub use kdispatch_host;
pub use kdispatch_ze;

pub use kdispatch_core::{
    Backend, DeviceId, Dim3, DispatchConfig, DispatchError, ExecutionRange, Id, KernelBody,
    KernelLauncher, KernelName, KernelType, Range, Result,
};
pub use kdispatch_ze::{DefaultStrategy, ZeKernelLauncher};

/// Prelude for convenient imports.
pub mod prelude {
    pub use kdispatch_core::prelude::*;
    pub use kdispatch_host::{
        CollectingErrorSink, HostQueue, InMemoryRegistry, RecordingInvoker, ReportedError,
        SubmissionRecord, TracingErrorSink,
    };
    pub use kdispatch_ze::{
        DefaultStrategy, DirectEntry, LaunchStrategy, ModuleInvocation, ZeKernelLauncher,
    };
}
