//! Configuration loading tests.

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tempfile::NamedTempFile;

use kdispatch::prelude::*;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .expect("Failed to create temp file");
    file.write_all(contents.as_bytes())
        .expect("Failed to write config");
    file
}

#[test]
fn test_load_config_from_file() {
    let file = write_config(
        r#"
module_format = "native"
device_index = 1

[local_range_defaults]
one_d = [256]
"#,
    );

    let config = load_config(file.path()).expect("Failed to load config");
    assert_eq!(config.module_format, "native");
    assert_eq!(config.device_index, 1);
    assert_eq!(config.local_range_defaults.one_d, [256]);
    assert_eq!(config.local_range_defaults.two_d, [16, 16]);
}

#[test]
fn test_zero_default_is_rejected() {
    let err = DispatchConfig::from_toml_str(
        r#"
[local_range_defaults]
three_d = [4, 0, 8]
"#,
    )
    .unwrap_err();
    assert!(matches!(err, DispatchError::Config(_)));
}

#[test]
fn test_loaded_defaults_drive_launch_geometry() {
    let file = write_config(
        r#"
[local_range_defaults]
two_d = [8, 4]
"#,
    );
    let config = load_config(file.path()).expect("Failed to load config");

    let groups = Arc::new(AtomicUsize::new(0));
    let group_count = Arc::clone(&groups);

    let mut launcher: ZeKernelLauncher<DirectEntry> = ZeKernelLauncher::new(
        Arc::new(InMemoryRegistry::new()),
        Arc::new(TracingErrorSink),
    )
    .with_config(config)
    .unwrap();
    launcher
        .bind(
            KernelName::new("tiles"),
            ExecutionRange::new([16, 16]),
            0,
            KernelBody::scoped(move |group| {
                assert_eq!(group.local_range(), Range::new([8, 4]));
                group_count.fetch_add(1, Ordering::SeqCst);
            }),
            vec![],
        )
        .unwrap();
    launcher
        .set_params(Arc::new(HostQueue::new(DeviceId::new(Backend::LevelZero, 0))))
        .unwrap();
    launcher.invoke().unwrap();

    assert_eq!(groups.load(Ordering::SeqCst), 2 * 4);
}
