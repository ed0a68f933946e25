//! # kdispatch Level Zero backend
//!
//! Kernel launcher for Level Zero queues.
//!
//! [`ZeKernelLauncher`] binds a kernel body and its geometry, takes the
//! queue through [`KernelLauncher::set_params`](kdispatch_core::KernelLauncher::set_params)
//! and submits on `invoke`. How the submission reaches the device is decided
//! by a [`LaunchStrategy`]:
//!
//! - [`DirectEntry`] - the launcher calls kernel entry points itself (default)
//! - [`ModuleInvocation`] - kernels are taken from a precompiled code object
//!   and handed to the queue's module invoker (`module-fallback` feature)

#![warn(missing_docs)]
#![warn(clippy::all)]

mod launcher;
mod module;
pub mod strategy;

pub use launcher::ZeKernelLauncher;
pub use strategy::{DirectEntry, LaunchContext, LaunchStrategy, ModuleInvocation};

/// Strategy selected by the build configuration.
#[cfg(not(feature = "module-fallback"))]
pub type DefaultStrategy = DirectEntry;

/// Strategy selected by the build configuration.
#[cfg(feature = "module-fallback")]
pub type DefaultStrategy = ModuleInvocation;
