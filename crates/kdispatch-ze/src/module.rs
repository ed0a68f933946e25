//! Kernel invocation through precompiled code objects.

use std::any::Any;
use std::panic::Location;

use tracing::{debug, warn};

use kdispatch_core::backend::ModuleLaunch;
use kdispatch_core::error::{DispatchError, Result};
use kdispatch_core::geometry::LaunchGeometry;
use kdispatch_core::kernel::KernelName;

use crate::strategy::LaunchContext;

/// Submit `name` from the registry's code object for the launcher backend.
///
/// Missing code objects and failed submissions are registered with the
/// error sink and returned; nothing is launched in either case.
pub(crate) fn invoke_from_module(
    ctx: &LaunchContext<'_>,
    name: &KernelName,
    geometry: &LaunchGeometry,
    args: &[&dyn Any],
) -> Result<()> {
    if ctx.registry.count_objects(ctx.backend) == 0 {
        return Err(report(ctx, missing_code_object(ctx)));
    }

    let Some(code_object) = ctx.registry.get_object(ctx.backend, ctx.module_format) else {
        return Err(report(ctx, missing_code_object(ctx)));
    };
    let module_id = ctx
        .registry
        .module_id(ctx.backend)
        .unwrap_or_else(|| code_object.module_id());

    if !code_object.exports(name) {
        return Err(report(
            ctx,
            DispatchError::KernelNotInModule {
                kernel: name.name().to_string(),
                module_id,
            },
        ));
    }

    let invoker = ctx
        .queue
        .module_invoker()
        .ok_or(DispatchError::InvokerUnavailable(ctx.backend))?;

    let launch = ModuleLaunch {
        module_id,
        format: ctx.module_format,
        code_object,
        num_groups: geometry.num_groups,
        group_size: geometry.group_size,
        dynamic_local_memory: geometry.dynamic_local_memory,
        args,
        kernel_name: name.name(),
        body_tag: name.body_tag(),
    };

    debug!(
        kernel = %name,
        module_id,
        format = ctx.module_format,
        num_groups = %geometry.num_groups,
        group_size = %geometry.group_size,
        args = launch.arg_count(),
        "Submitting kernel from module"
    );

    invoker
        .submit(&launch)
        .map_err(|reason| report(ctx, DispatchError::SubmissionFailure(reason)))
}

fn missing_code_object(ctx: &LaunchContext<'_>) -> DispatchError {
    DispatchError::MissingCodeObject {
        backend: ctx.backend,
        format: ctx.module_format.to_string(),
    }
}

#[track_caller]
fn report(ctx: &LaunchContext<'_>, error: DispatchError) -> DispatchError {
    let location = Location::caller();
    warn!(%location, %error, "Module launch failed");
    ctx.error_sink.register_error(location, &error);
    error
}
