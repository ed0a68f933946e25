//! Dispatch error types.

use thiserror::Error;

use crate::kernel::KernelType;
use crate::types::Backend;

/// Result type for dispatch operations.
pub type Result<T> = std::result::Result<T, DispatchError>;

/// Errors raised while binding or invoking a kernel.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DispatchError {
    /// The launch strategy cannot serve this execution category.
    #[error("Unsupported kernel type {kernel_type} for {strategy} launches")]
    UnsupportedKernelType {
        /// Category that was requested.
        kernel_type: KernelType,
        /// Strategy that rejected it.
        strategy: &'static str,
    },

    /// No compiled code object matches the backend and format.
    #[error("Cannot invoke {format} kernel on {backend}: no code objects present in this module")]
    MissingCodeObject {
        /// Target backend.
        backend: Backend,
        /// Requested binary format.
        format: String,
    },

    /// The code object does not export the requested kernel.
    #[error("Kernel '{kernel}' is not part of module {module_id}")]
    KernelNotInModule {
        /// Kernel name tag.
        kernel: String,
        /// Module that was searched.
        module_id: u64,
    },

    /// The queue's backend cannot invoke kernels from modules.
    #[error("Runtime backend {0} does not support invoking kernels from modules")]
    InvokerUnavailable(Backend),

    /// The module invoker rejected the submission.
    #[error("Kernel submission failed: {0}")]
    SubmissionFailure(String),

    /// `invoke` was called before a queue was attached.
    #[error("No queue attached; call set_params before invoke")]
    QueueNotSet,

    /// A queue was already attached to this launcher.
    #[error("Queue already attached to this launcher")]
    QueueAlreadySet,

    /// No kernel has been bound yet.
    #[error("No kernel bound to this launcher")]
    NotBound,

    /// A kernel was already bound to this launcher.
    #[error("A kernel is already bound to this launcher")]
    AlreadyBound,

    /// The launcher's kernel has already been invoked.
    #[error("Kernel already invoked; launchers are single-use")]
    AlreadyInvoked,

    /// Execution range is not usable for the requested category.
    #[error("Invalid execution range: {0}")]
    InvalidRange(String),

    /// Configuration could not be loaded or is inconsistent.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl DispatchError {
    /// Whether the error happened after launch preconditions were met,
    /// i.e. it belongs on the error sink.
    pub fn is_launch_failure(&self) -> bool {
        matches!(
            self,
            DispatchError::MissingCodeObject { .. }
                | DispatchError::KernelNotInModule { .. }
                | DispatchError::SubmissionFailure(_)
        )
    }
}

impl From<config::ConfigError> for DispatchError {
    fn from(err: config::ConfigError) -> Self {
        DispatchError::Config(err.to_string())
    }
}
