//! Interfaces to the collaborators a launcher depends on.
//!
//! Queues, module invokers, code-object registries and error sinks are owned
//! outside this crate. Launchers only see them through these traits.

use std::any::Any;
use std::fmt;
use std::panic::Location;
use std::sync::Arc;

use crate::error::DispatchError;
use crate::kernel::KernelName;
use crate::types::{Backend, DeviceId, Dim3};

/// Identifier of a compiled module.
pub type ModuleId = u64;

/// Hardware queue a launcher submits to.
pub trait Queue: Send + Sync {
    /// Device the queue is bound to.
    fn device(&self) -> DeviceId;

    /// Module invocation capability, if the backend has one.
    fn module_invoker(&self) -> Option<&dyn ModuleInvoker>;
}

/// One submission through a module invoker.
pub struct ModuleLaunch<'a> {
    /// Module holding the kernel.
    pub module_id: ModuleId,
    /// Binary format of the code object.
    pub format: &'a str,
    /// Code object borrowed from the registry.
    pub code_object: &'a CodeObject,
    /// Work-group counts, native order.
    pub num_groups: Dim3,
    /// Work-group size, native order.
    pub group_size: Dim3,
    /// Dynamic local memory in bytes.
    pub dynamic_local_memory: usize,
    /// Opaque kernel arguments.
    pub args: &'a [&'a dyn Any],
    /// Kernel name tag.
    pub kernel_name: &'a str,
    /// Kernel body tag.
    pub body_tag: &'a str,
}

impl ModuleLaunch<'_> {
    /// Number of kernel arguments.
    pub fn arg_count(&self) -> usize {
        self.args.len()
    }
}

impl fmt::Debug for ModuleLaunch<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleLaunch")
            .field("module_id", &self.module_id)
            .field("format", &self.format)
            .field("num_groups", &self.num_groups)
            .field("group_size", &self.group_size)
            .field("dynamic_local_memory", &self.dynamic_local_memory)
            .field("arg_count", &self.arg_count())
            .field("kernel_name", &self.kernel_name)
            .field("body_tag", &self.body_tag)
            .finish()
    }
}

/// Backend capability to launch kernels out of precompiled modules.
pub trait ModuleInvoker: Send + Sync {
    /// Submit a kernel. Errors carry the backend's description.
    fn submit(&self, launch: &ModuleLaunch<'_>) -> std::result::Result<(), String>;
}

/// A precompiled device binary and its identity metadata.
#[derive(Debug, Clone)]
pub struct CodeObject {
    module_id: ModuleId,
    format: String,
    binary: Arc<[u8]>,
    kernels: Vec<KernelName>,
}

impl CodeObject {
    /// Create a code object.
    pub fn new(module_id: ModuleId, format: impl Into<String>, binary: impl Into<Arc<[u8]>>) -> Self {
        Self {
            module_id,
            format: format.into(),
            binary: binary.into(),
            kernels: Vec::new(),
        }
    }

    /// Declare a kernel exported by this object.
    #[must_use]
    pub fn with_kernel(mut self, name: KernelName) -> Self {
        self.kernels.push(name);
        self
    }

    /// Module id.
    pub fn module_id(&self) -> ModuleId {
        self.module_id
    }

    /// Binary format tag.
    pub fn format(&self) -> &str {
        &self.format
    }

    /// Raw binary.
    pub fn binary(&self) -> &[u8] {
        &self.binary
    }

    /// Declared kernels. Empty when the object carries no kernel table.
    pub fn kernels(&self) -> &[KernelName] {
        &self.kernels
    }

    /// Whether the object can serve `name`.
    ///
    /// Objects without a kernel table are assumed to export everything.
    pub fn exports(&self, name: &KernelName) -> bool {
        self.kernels.is_empty() || self.kernels.iter().any(|k| k.name() == name.name())
    }
}

/// Read-only store of code objects, keyed by backend and format.
pub trait CodeObjectRegistry: Send + Sync {
    /// Number of code objects available for `backend`.
    fn count_objects(&self, backend: Backend) -> usize;

    /// Code object for `backend` in `format`.
    fn get_object(&self, backend: Backend, format: &str) -> Option<&CodeObject>;

    /// Module id registered for `backend`.
    fn module_id(&self, backend: Backend) -> Option<ModuleId>;
}

/// Destination for launch failures that happen after bind.
pub trait ErrorSink: Send + Sync {
    /// Record an error raised at `location`.
    fn register_error(&self, location: &'static Location<'static>, error: &DispatchError);
}

/// Opaque backend access handed to custom kernels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InteropHandle {
    device: DeviceId,
}

impl InteropHandle {
    /// Handle bound to `device`.
    pub const fn new(device: DeviceId) -> Self {
        Self { device }
    }

    /// Device the handle targets.
    pub fn device(&self) -> DeviceId {
        self.device
    }

    /// Backend of the device.
    pub fn backend(&self) -> Backend {
        self.device.backend
    }
}
