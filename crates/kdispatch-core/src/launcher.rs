//! Backend-agnostic launcher contract.

use std::sync::Arc;

use crate::backend::Queue;
use crate::error::Result;
use crate::kernel::KernelType;
use crate::types::Backend;

/// A single-use kernel submission.
///
/// Backends add a generic `bind` on their concrete type; the runtime only
/// needs the operations below. The lifecycle is `Unbound -> Bound -> Invoked`
/// and an instance must not be reused after `invoke`.
pub trait KernelLauncher: Send {
    /// Attach the hardware queue. Must happen exactly once, before `invoke`.
    fn set_params(&mut self, queue: Arc<dyn Queue>) -> Result<()>;

    /// Run the bound kernel.
    fn invoke(&mut self) -> Result<()>;

    /// Backend this launcher targets.
    fn backend(&self) -> Backend;

    /// Category of the bound kernel.
    fn kernel_type(&self) -> Result<KernelType>;
}
