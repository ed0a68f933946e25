//! # kdispatch Core
//!
//! Core types and traits for the kdispatch kernel dispatch layer.
//!
//! ## Core Abstractions
//!
//! - [`Range`], [`Id`], [`Dim3`] - logical and backend-native index spaces
//! - [`SpItem`] - hierarchical index of one execution unit
//! - [`geometry`] - default group sizes, group counts, dimension remapping
//! - [`KernelBody`] - kernel bodies tagged with their execution category
//! - [`Queue`], [`ModuleInvoker`], [`CodeObjectRegistry`], [`ErrorSink`] -
//!   collaborators owned by the surrounding runtime
//! - [`KernelLauncher`] - the set-queue / invoke / query contract

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backend;
pub mod config;
pub mod error;
pub mod geometry;
pub mod index;
pub mod kernel;
pub mod launcher;
pub mod types;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::backend::{
        CodeObject, CodeObjectRegistry, ErrorSink, InteropHandle, ModuleId, ModuleInvoker,
        ModuleLaunch, Queue,
    };
    pub use crate::config::{load_config, DispatchConfig};
    pub use crate::error::{DispatchError, Result};
    pub use crate::geometry::{
        compute_layout, effective_local_range, ExecutionRange, GroupLayout, LaunchGeometry,
        LocalRangeDefaults,
    };
    pub use crate::index::{Group, Item, NdItem, SpItem};
    pub use crate::kernel::{KernelBody, KernelName, KernelType, ReductionOp};
    pub use crate::launcher::KernelLauncher;
    pub use crate::types::{Backend, DeviceId, Dim3, Id, Range};
}

// Re-exports for convenience
pub use backend::{CodeObject, CodeObjectRegistry, ErrorSink, InteropHandle, ModuleInvoker, Queue};
pub use config::DispatchConfig;
pub use error::{DispatchError, Result};
pub use geometry::{ExecutionRange, LaunchGeometry};
pub use index::{Group, Item, NdItem, SpItem};
pub use kernel::{KernelBody, KernelName, KernelType, ReductionOp};
pub use launcher::KernelLauncher;
pub use types::{Backend, DeviceId, Dim3, Id, Range};
