//! Integration tests for the day-scheduling engine.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use dayslot_core::{
    find_free_slot, is_slot_free, merge_intervals, ExternalEvent, ScheduleContext,
    SchedulableTask, TimeEstimate,
};
use proptest::prelude::*;

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
}

fn at(h: u32, m: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, h, m, 0).unwrap()
}

fn timed_event(id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> ExternalEvent {
    ExternalEvent {
        id: id.to_string(),
        source_id: "work".to_string(),
        title: id.to_string(),
        start,
        end,
        all_day: false,
    }
}

#[test]
fn morning_gap_wins_over_later_gaps() {
    let tasks = vec![SchedulableTask::new("standup-prep", "Prep")
        .starting_at(at(9, 0))
        .with_estimate(TimeEstimate::ThirtyMinutes)];
    let mut holiday = timed_event("holiday", at(0, 0), at(0, 0) + Duration::days(1));
    holiday.all_day = true;
    let events = vec![holiday];

    let ctx = ScheduleContext::new(&tasks, &events, at(7, 0), Utc);
    let slot = find_free_slot(day(), 60, &ctx, None).unwrap();
    assert_eq!(slot, Some(at(8, 0)));
}

#[test]
fn overlap_with_task_is_reported() {
    let tasks = vec![SchedulableTask::new("deep-work", "Deep work")
        .starting_at(at(10, 0))
        .with_estimate(TimeEstimate::OneHour)];
    let events = vec![timed_event("review", at(11, 0), at(11, 30))];

    let ctx = ScheduleContext::new(&tasks, &events, at(7, 0), Utc);
    assert!(!is_slot_free(day(), at(10, 30), 30, &ctx, None).unwrap());
}

#[test]
fn end_of_day_has_no_room() {
    let ctx = ScheduleContext::new(&[], &[], at(22, 45), Utc);
    assert_eq!(find_free_slot(day(), 30, &ctx, None).unwrap(), None);
}

#[test]
fn fully_booked_day_has_no_slot() {
    let events = vec![
        timed_event("a", at(7, 0), at(12, 0)),
        timed_event("b", at(12, 0), at(18, 0)),
        timed_event("c", at(17, 0), at(23, 30)),
    ];
    let ctx = ScheduleContext::new(&[], &events, at(6, 0), Utc);
    assert_eq!(find_free_slot(day(), 5, &ctx, None).unwrap(), None);
}

#[test]
fn rescheduling_in_place_is_allowed() {
    let task = SchedulableTask::new("t1", "Write draft")
        .starting_at(at(14, 0))
        .with_estimate(TimeEstimate::TwoHours);
    let tasks = vec![task.clone()];
    let ctx = ScheduleContext::new(&tasks, &[], at(7, 0), Utc);

    assert!(!is_slot_free(day(), at(14, 0), task.duration_minutes(), &ctx, None).unwrap());
    assert!(is_slot_free(day(), at(14, 0), task.duration_minutes(), &ctx, Some("t1")).unwrap());
}

#[test]
fn busy_day_packs_first_fit() {
    let tasks = vec![
        SchedulableTask::new("a", "A")
            .starting_at(at(8, 0))
            .with_estimate(TimeEstimate::OneHour),
        SchedulableTask::new("b", "B")
            .starting_at(at(9, 15))
            .with_estimate(TimeEstimate::OneHour),
    ];
    let events = vec![timed_event("lunch", at(10, 30), at(11, 30))];
    let ctx = ScheduleContext::new(&tasks, &events, at(7, 0), Utc);

    assert_eq!(find_free_slot(day(), 15, &ctx, None).unwrap(), Some(at(9, 0)));
    assert_eq!(find_free_slot(day(), 20, &ctx, None).unwrap(), Some(at(11, 30)));
}

fn arb_tasks() -> impl Strategy<Value = Vec<SchedulableTask>> {
    let estimates = prop::sample::select(TimeEstimate::ALL.to_vec());
    prop::collection::vec((0i64..(24 * 12), estimates), 0..12).prop_map(|specs| {
        specs
            .into_iter()
            .enumerate()
            .map(|(i, (slot, estimate))| {
                SchedulableTask::new(format!("t{i}"), "task")
                    .starting_at(at(0, 0) + Duration::minutes(slot * 5))
                    .with_estimate(estimate)
            })
            .collect()
    })
}

fn arb_events() -> impl Strategy<Value = Vec<ExternalEvent>> {
    prop::collection::vec((0i64..(24 * 60), 1i64..240), 0..6).prop_map(|specs| {
        specs
            .into_iter()
            .enumerate()
            .map(|(i, (start, len))| {
                let start = at(0, 0) + Duration::minutes(start);
                timed_event(&format!("e{i}"), start, start + Duration::minutes(len))
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn proposed_slot_is_always_free(
        tasks in arb_tasks(),
        events in arb_events(),
        now_minute in 0i64..(24 * 60),
        duration in 5i64..300,
    ) {
        let now = at(0, 0) + Duration::minutes(now_minute) + Duration::seconds(17);
        let ctx = ScheduleContext::new(&tasks, &events, now, Utc);
        if let Some(slot) = find_free_slot(day(), duration, &ctx, None).unwrap() {
            prop_assert!(is_slot_free(day(), slot, duration, &ctx, None).unwrap());
            prop_assert!(slot >= now);
        }
    }

    #[test]
    fn excluded_task_never_blocks_itself(tasks in arb_tasks()) {
        let ctx = ScheduleContext::new(&tasks, &[], at(6, 0), Utc);
        for task in &tasks {
            let start = task.start_time.unwrap();
            let end = start + Duration::minutes(task.duration_minutes());
            let others: Vec<_> = tasks.iter().filter(|t| t.id != task.id).cloned().collect();
            let alone = ScheduleContext::new(&others, &[], at(6, 0), Utc);
            let inside = start >= at(8, 0) && end <= at(23, 0);
            prop_assert_eq!(
                is_slot_free(day(), start, task.duration_minutes(), &ctx, Some(&task.id)).unwrap(),
                inside && is_slot_free(day(), start, task.duration_minutes(), &alone, None).unwrap()
            );
        }
    }

    #[test]
    fn merge_is_stable_under_remerge(events in arb_events()) {
        let ctx = ScheduleContext::new(&[], &events, at(6, 0), Utc);
        let merged = dayslot_core::busy_blocks(day(), &ctx, None);
        prop_assert_eq!(merge_intervals(&merged), merged);
    }
}
