#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{DateTime, Duration, FixedOffset, TimeZone};
    use clinicflow_common::models::{AppointmentRequest, TimeWindow};
    use proptest::prelude::*;

    use crate::mock::InMemoryCalendarBackend;
    use crate::scheduler::AppointmentScheduler;

    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
    }

    // Timestamps between 2020 and 2030 at whole-minute offsets from -12h to +14h
    fn timestamp() -> impl Strategy<Value = DateTime<FixedOffset>> {
        (1_577_836_800i64..1_893_456_000i64, -48i32..=56i32).prop_map(|(secs, quarter_hours)| {
            let offset = FixedOffset::east_opt(quarter_hours * 15 * 60).unwrap();
            offset.timestamp_opt(secs, 0).unwrap()
        })
    }

    proptest! {
        #[test]
        fn prop_invalid_windows_never_reach_backend(
            start in timestamp(),
            shrink_minutes in 0i64..100_000,
            query in proptest::option::of("[a-z ]{0,12}"),
            limit in proptest::option::of(0usize..500),
        ) {
            let backend = Arc::new(InMemoryCalendarBackend::new());
            let scheduler = AppointmentScheduler::new(backend.clone(), "primary");
            let window = TimeWindow::new(start, start - Duration::minutes(shrink_minutes));

            let rt = runtime();
            let overlapping = rt.block_on(scheduler.list_overlapping(window)).unwrap();
            let in_range = rt
                .block_on(scheduler.list_events_in_range(window, query.as_deref(), limit))
                .unwrap();
            let available = rt.block_on(scheduler.is_available(window)).unwrap();

            prop_assert!(overlapping.is_empty());
            prop_assert!(in_range.is_empty());
            prop_assert!(available);
            prop_assert_eq!(backend.call_count(), 0);
        }

        #[test]
        fn prop_non_positive_duration_is_rejected(
            start in timestamp(),
            minutes in -10_000i64..=0,
            name in "[A-Za-z ]{0,20}",
        ) {
            let backend = Arc::new(InMemoryCalendarBackend::new());
            let scheduler = AppointmentScheduler::new(backend.clone(), "primary");
            let req = AppointmentRequest::new(start, name).with_duration(minutes);

            let err = runtime().block_on(scheduler.create_appointment(req)).unwrap_err();
            prop_assert!(err.is_invalid_argument());
            prop_assert_eq!(backend.call_count(), 0);
        }

        #[test]
        fn prop_overflowing_duration_is_an_error(
            start in timestamp(),
            minutes in 200_000_000_000i64..=i64::MAX,
        ) {
            let backend = Arc::new(InMemoryCalendarBackend::new());
            let scheduler = AppointmentScheduler::new(backend.clone(), "primary");
            let req = AppointmentRequest::new(start, "Ana").with_duration(minutes);

            let err = runtime().block_on(scheduler.create_appointment(req)).unwrap_err();
            prop_assert!(err.is_invalid_argument());
            prop_assert_eq!(backend.call_count(), 0);
        }

        #[test]
        fn prop_end_is_start_plus_duration(
            start in timestamp(),
            minutes in 1i64..=5_000_000,
        ) {
            let backend = Arc::new(InMemoryCalendarBackend::new());
            let scheduler = AppointmentScheduler::new(backend, "primary");
            let req = AppointmentRequest::new(start, "Ana").with_duration(minutes);

            let created = runtime().block_on(scheduler.create_appointment(req)).unwrap();
            let created_start = created.start.and_then(|t| t.date_time()).unwrap();
            let created_end = created.end.and_then(|t| t.date_time()).unwrap();

            prop_assert_eq!(created_start, start);
            prop_assert_eq!(created_end - created_start, Duration::minutes(minutes));
            prop_assert_eq!(created_end.offset(), start.offset());
        }
    }
}
