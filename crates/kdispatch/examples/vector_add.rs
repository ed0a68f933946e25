//! Vector addition through the direct and module launch paths.
//!
//! Run with `RUST_LOG=debug cargo run --example vector_add` to see the
//! selected geometry.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use kdispatch::prelude::*;

const N: usize = 1000;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let a: Arc<Vec<u32>> = Arc::new((0..N as u32).collect());
    let b: Arc<Vec<u32>> = Arc::new((0..N as u32).map(|x| 2 * x).collect());
    let c: Arc<Vec<AtomicU32>> = Arc::new((0..N).map(|_| AtomicU32::new(0)).collect());

    let device = DeviceId::new(Backend::LevelZero, 0);
    let invoker = Arc::new(RecordingInvoker::new());
    let queue: Arc<dyn Queue> = Arc::new(HostQueue::new(device).with_invoker(invoker.clone()));
    let registry = Arc::new(
        InMemoryRegistry::new().with_object(
            Backend::LevelZero,
            CodeObject::new(1, "spirv", vec![0u8; 16]).with_kernel(KernelName::new("vector_add")),
        ),
    );

    // Direct entry: the body runs on this thread.
    let body = {
        let (a, b, c) = (Arc::clone(&a), Arc::clone(&b), Arc::clone(&c));
        KernelBody::parallel_for(move |item| {
            let i = item.id()[0];
            c[i].store(a[i] + b[i], Ordering::Relaxed);
        })
    };
    let mut direct: ZeKernelLauncher<DirectEntry> =
        ZeKernelLauncher::new(registry.clone(), Arc::new(TracingErrorSink));
    direct.bind(KernelName::new("vector_add"), ExecutionRange::new([N]), 0, body, vec![])?;
    direct.set_params(queue.clone())?;
    direct.invoke()?;

    let checksum: u64 = c.iter().map(|v| u64::from(v.load(Ordering::Relaxed))).sum();
    info!("Direct launch finished, checksum={}", checksum);

    // Module invocation: the launch is handed to the queue's invoker.
    let mut module: ZeKernelLauncher<ModuleInvocation> =
        ZeKernelLauncher::new(registry, Arc::new(TracingErrorSink));
    module.bind(
        KernelName::new("vector_add"),
        ExecutionRange::new([N]),
        0,
        KernelBody::parallel_for(|_| {}),
        vec![],
    )?;
    module.set_params(queue)?;
    module.invoke()?;

    for record in invoker.submissions() {
        info!(
            "Module launch '{}' groups={} group_size={}",
            record.kernel_name, record.num_groups, record.group_size
        );
    }

    Ok(())
}
