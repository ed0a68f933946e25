//! Property tests for launch geometry and work-item coverage.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use proptest::prelude::*;

use kdispatch::kdispatch_core::geometry::{compute_layout, nd_range_layout};
use kdispatch::prelude::*;

proptest! {
    #[test]
    fn layout_covers_global_range_with_less_than_one_group_of_slack(
        global in prop::array::uniform3(1usize..300),
        local in prop::array::uniform3(1usize..20),
    ) {
        let layout = compute_layout(Range::new(global), Range::new(local), &LocalRangeDefaults::default())
            .unwrap();
        for dim in 0..3 {
            let provisioned = layout.num_groups[dim] * layout.local_range[dim];
            prop_assert!(provisioned >= global[dim]);
            prop_assert!(provisioned - global[dim] < local[dim]);
        }
    }

    #[test]
    fn native_geometry_reverses_dimensions(
        groups in prop::array::uniform2(1usize..100),
        local in prop::array::uniform2(1usize..32),
    ) {
        let layout = GroupLayout { local_range: Range::new(local), num_groups: Range::new(groups) };
        let geometry = layout.to_geometry(0);
        prop_assert_eq!(geometry.num_groups, Dim3::new(groups[1], groups[0], 1));
        prop_assert_eq!(geometry.group_size, Dim3::new(local[1], local[0], 1));
        prop_assert_eq!(geometry.total_work_items(), layout.provisioned_items());
    }

    #[test]
    fn native_remap_inverts_for_every_dimensionality(
        one in prop::array::uniform1(0usize..4096),
        two in prop::array::uniform2(0usize..4096),
        three in prop::array::uniform3(0usize..4096),
    ) {
        let native = Dim3::from_logical(Range::new(one));
        prop_assert_eq!((native.y, native.z), (1, 1));
        prop_assert_eq!(native.to_logical::<1>(), Range::new(one));

        let native = Dim3::from_logical(Range::new(two));
        prop_assert_eq!(native.z, 1);
        prop_assert_eq!(native.to_logical::<2>(), Range::new(two));

        prop_assert_eq!(Dim3::from_logical(Range::new(three)).to_logical::<3>(), Range::new(three));
    }

    #[test]
    fn nd_range_accepts_only_divisible_ranges(
        global in 1usize..512,
        local in 1usize..64,
    ) {
        let result = nd_range_layout(Range::new([global]), Range::new([local]));
        prop_assert_eq!(result.is_ok(), global % local == 0);
    }

    #[test]
    fn direct_dispatch_runs_each_in_range_item_once(
        global in prop::array::uniform2(1usize..40),
        local in prop::option::of(prop::array::uniform2(1usize..9)),
    ) {
        let hits: Arc<Vec<AtomicUsize>> =
            Arc::new((0..global[0] * global[1]).map(|_| AtomicUsize::new(0)).collect());
        let body_hits = Arc::clone(&hits);

        let mut range = ExecutionRange::new(global);
        if let Some(local) = local {
            range = range.with_local(local);
        }

        let mut launcher: ZeKernelLauncher<DirectEntry> = ZeKernelLauncher::new(
            Arc::new(InMemoryRegistry::new()),
            Arc::new(CollectingErrorSink::new()),
        );
        launcher
            .bind(
                KernelName::new("cover"),
                range,
                0,
                KernelBody::parallel_for(move |item| {
                    body_hits[item.linear_id()].fetch_add(1, Ordering::SeqCst);
                }),
                vec![],
            )
            .unwrap();
        launcher
            .set_params(Arc::new(HostQueue::new(DeviceId::new(Backend::LevelZero, 0))))
            .unwrap();
        launcher.invoke().unwrap();

        prop_assert!(hits.iter().all(|hit| hit.load(Ordering::SeqCst) == 1));
    }

    #[test]
    fn sp_item_ids_decompose_into_group_and_local(
        group in prop::array::uniform3(0usize..4),
        local_id in prop::array::uniform3(0usize..4),
    ) {
        let local_range = Range::new([4, 4, 4]);
        let num_groups = Range::new([4, 4, 4]);
        let item = SpItem::new(Id::new(local_id), Id::new(group), local_range, num_groups);

        for dim in 0..3 {
            prop_assert_eq!(item.global_id()[dim], group[dim] * 4 + local_id[dim]);
        }
        prop_assert_eq!(item.global_range(), Range::new([16, 16, 16]));
        prop_assert!(item.global_linear_id() < item.global_range().size());
        prop_assert!(item.local_linear_id() < local_range.size());
    }
}
