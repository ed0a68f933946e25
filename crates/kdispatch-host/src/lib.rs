//! # kdispatch host backend
//!
//! In-process implementations of the collaborators a launcher depends on.
//! They are used by the test suites and by embedders that run kernels on
//! the host without a device driver.
//!
//! - [`HostQueue`] - queue bound to a device, optionally with a module invoker
//! - [`RecordingInvoker`] - module invoker that records every submission
//! - [`InMemoryRegistry`] - code-object registry backed by a map
//! - [`CollectingErrorSink`], [`TracingErrorSink`] - error sinks

#![warn(missing_docs)]
#![warn(clippy::all)]

mod invoker;
mod queue;
mod registry;
mod sink;

pub use invoker::{RecordingInvoker, SubmissionRecord};
pub use queue::HostQueue;
pub use registry::InMemoryRegistry;
pub use sink::{CollectingErrorSink, ReportedError, TracingErrorSink};
