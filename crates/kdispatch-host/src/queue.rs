//! Host queue.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use kdispatch_core::backend::{ModuleInvoker, Queue};
use kdispatch_core::types::DeviceId;

/// Queue bound to a device, running on the host.
#[derive(Clone)]
pub struct HostQueue {
    device: DeviceId,
    invoker: Option<Arc<dyn ModuleInvoker>>,
}

impl HostQueue {
    /// Queue without module invocation capability.
    pub fn new(device: DeviceId) -> Self {
        debug!("Creating host queue for device {}", device);
        Self {
            device,
            invoker: None,
        }
    }

    /// Attach a module invoker.
    pub fn with_invoker(mut self, invoker: Arc<dyn ModuleInvoker>) -> Self {
        self.invoker = Some(invoker);
        self
    }
}

impl Queue for HostQueue {
    fn device(&self) -> DeviceId {
        self.device
    }

    fn module_invoker(&self) -> Option<&dyn ModuleInvoker> {
        self.invoker.as_deref()
    }
}

impl fmt::Debug for HostQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostQueue")
            .field("device", &self.device)
            .field("has_invoker", &self.invoker.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RecordingInvoker;
    use kdispatch_core::types::Backend;

    #[test]
    fn test_invoker_capability() {
        let device = DeviceId::new(Backend::LevelZero, 1);
        let queue = HostQueue::new(device);
        assert_eq!(queue.device(), device);
        assert!(queue.module_invoker().is_none());

        let queue = queue.with_invoker(Arc::new(RecordingInvoker::new()));
        assert!(queue.module_invoker().is_some());
    }
}
