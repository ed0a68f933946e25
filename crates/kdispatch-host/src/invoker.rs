//! Recording module invoker.

use parking_lot::Mutex;
use tracing::{debug, warn};

use kdispatch_core::backend::{ModuleId, ModuleInvoker, ModuleLaunch};
use kdispatch_core::types::Dim3;

/// Owned copy of a [`ModuleLaunch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRecord {
    /// Module holding the kernel.
    pub module_id: ModuleId,
    /// Binary format of the code object.
    pub format: String,
    /// Work-group counts, native order.
    pub num_groups: Dim3,
    /// Work-group size, native order.
    pub group_size: Dim3,
    /// Dynamic local memory in bytes.
    pub dynamic_local_memory: usize,
    /// Number of kernel arguments.
    pub arg_count: usize,
    /// Kernel name tag.
    pub kernel_name: String,
    /// Kernel body tag.
    pub body_tag: String,
}

impl SubmissionRecord {
    fn from_launch(launch: &ModuleLaunch<'_>) -> Self {
        Self {
            module_id: launch.module_id,
            format: launch.format.to_string(),
            num_groups: launch.num_groups,
            group_size: launch.group_size,
            dynamic_local_memory: launch.dynamic_local_memory,
            arg_count: launch.arg_count(),
            kernel_name: launch.kernel_name.to_string(),
            body_tag: launch.body_tag.to_string(),
        }
    }
}

/// Module invoker that accepts (or rejects) every submission and keeps a log.
#[derive(Debug, Default)]
pub struct RecordingInvoker {
    submissions: Mutex<Vec<SubmissionRecord>>,
    failure: Option<String>,
}

impl RecordingInvoker {
    /// Invoker accepting every submission.
    pub fn new() -> Self {
        Self::default()
    }

    /// Invoker rejecting every submission with `reason`. Rejected launches
    /// are still recorded.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            submissions: Mutex::new(Vec::new()),
            failure: Some(reason.into()),
        }
    }

    /// Submissions seen so far.
    pub fn submissions(&self) -> Vec<SubmissionRecord> {
        self.submissions.lock().clone()
    }

    /// Number of submissions seen so far.
    pub fn submission_count(&self) -> usize {
        self.submissions.lock().len()
    }
}

impl ModuleInvoker for RecordingInvoker {
    fn submit(&self, launch: &ModuleLaunch<'_>) -> Result<(), String> {
        debug!(
            "Module submission '{}' (module={}, groups={}, group_size={})",
            launch.kernel_name, launch.module_id, launch.num_groups, launch.group_size
        );
        self.submissions.lock().push(SubmissionRecord::from_launch(launch));

        match &self.failure {
            Some(reason) => {
                warn!("Rejecting module submission '{}': {}", launch.kernel_name, reason);
                Err(reason.clone())
            }
            None => Ok(()),
        }
    }
}
