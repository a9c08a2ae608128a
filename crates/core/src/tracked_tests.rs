// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::TimeZone;
use proptest::prelude::*;

fn t(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 1, hour, 0, 0).unwrap()
}

fn policy(max_retries: u32) -> RetryPolicy {
    RetryPolicy {
        max_retries,
        ban_duration: Duration::from_secs(3600),
    }
}

fn fail() -> ResourceOutcome {
    ResourceOutcome::failed("boom")
}

#[test]
fn success_resets_retries_and_ban() {
    let prior = TrackedState {
        last_modified: Some(ChangeStamp::modified(t(1))),
        retry_count: 4,
        banned_until: Some(t(2)),
        last_error: Some("old".to_string()),
        ..TrackedState::default()
    };
    let stamp = ChangeStamp::modified(t(3));

    let (next, ban) = prior.transition(
        &ResourceOutcome::Succeeded {
            checksum: Some("abc".to_string()),
        },
        &stamp,
        &policy(2),
        t(4),
    );

    assert!(ban.is_none());
    assert_eq!(next.last_modified, Some(stamp));
    assert_eq!(next.checksum.as_deref(), Some("abc"));
    assert_eq!(next.retry_count, 0);
    assert_eq!(next.banned_until, None);
    assert_eq!(next.last_error, None);
    assert_eq!(next.retrieved_at, Some(t(4)));
}

#[test]
fn unchanged_moves_stamp_only() {
    let prior = TrackedState {
        last_modified: Some(ChangeStamp::modified(t(1))),
        checksum: Some("same".to_string()),
        retry_count: 1,
        ..TrackedState::default()
    };
    let stamp = ChangeStamp::modified(t(2));

    let (next, ban) = prior.transition(&ResourceOutcome::Unchanged, &stamp, &policy(3), t(5));

    assert!(ban.is_none());
    assert_eq!(next.last_modified, Some(stamp));
    assert_eq!(next.checksum.as_deref(), Some("same"));
    assert_eq!(next.retry_count, 1);
    assert_eq!(next.banned_until, None);
}

#[test]
fn failure_keeps_last_modified() {
    let prior = TrackedState {
        last_modified: Some(ChangeStamp::modified(t(1))),
        ..TrackedState::default()
    };

    let (next, ban) = prior.transition(&fail(), &ChangeStamp::modified(t(2)), &policy(3), t(3));

    assert!(ban.is_none());
    assert_eq!(next.retry_count, 1);
    assert_eq!(next.last_modified, Some(ChangeStamp::modified(t(1))));
    assert_eq!(next.last_error.as_deref(), Some("boom"));
}

#[test]
fn third_failure_with_two_retries_enters_ban() {
    let stamp = ChangeStamp::modified(t(1));
    let p = policy(2);
    let mut state = TrackedState::default();

    for _ in 0..2 {
        let (next, ban) = state.transition(&fail(), &stamp, &p, t(2));
        assert!(ban.is_none());
        state = next;
    }
    let (state, ban) = state.transition(&fail(), &stamp, &p, t(2));

    assert_eq!(state.retry_count, 3);
    assert_eq!(state.banned_until, Some(t(3)));
    assert_eq!(
        ban,
        Some(BanEntered {
            until: t(3),
            retry_count: 3
        })
    );
    assert!(state.is_banned_at(t(2)));
    assert!(!state.is_banned_at(t(3)));
}

#[test]
fn failure_after_ban_expiry_renews_ban() {
    let banned = TrackedState {
        retry_count: 2,
        banned_until: Some(t(2)),
        ..TrackedState::default()
    };

    let (next, ban) = banned.transition(&fail(), &ChangeStamp::modified(t(1)), &policy(1), t(6));

    assert_eq!(next.retry_count, 3);
    assert_eq!(next.banned_until, Some(t(7)));
    assert!(ban.is_some());
}

#[test]
fn huge_ban_duration_saturates() {
    let p = RetryPolicy {
        max_retries: 0,
        ban_duration: Duration::MAX,
    };
    assert_eq!(p.ban_until(t(0)), DateTime::<Utc>::MAX_UTC);
}

#[test]
fn state_round_trips_through_json_with_missing_fields() {
    let state: TrackedState = serde_json::from_str(r#"{"retry_count": 2}"#).unwrap();
    assert_eq!(state.retry_count, 2);
    assert_eq!(state.last_modified, None);
}

proptest! {
    #[test]
    fn ban_iff_retry_count_exceeds_max(max in 0u32..6, failures in 1u32..12) {
        let p = policy(max);
        let stamp = ChangeStamp::modified(t(1));
        let mut state = TrackedState::default();
        for _ in 0..failures {
            state = state.transition(&fail(), &stamp, &p, t(1)).0;
        }
        prop_assert_eq!(state.retry_count, failures);
        prop_assert_eq!(state.banned_until.is_some(), failures > max);
        prop_assert_eq!(state.last_modified, None);
    }

    #[test]
    fn success_always_clears_failure_bookkeeping(retries in 0u32..50, banned in any::<bool>()) {
        let prior = TrackedState {
            retry_count: retries,
            banned_until: banned.then(|| t(9)),
            ..TrackedState::default()
        };
        let (next, _) = prior.transition(
            &ResourceOutcome::Succeeded { checksum: None },
            &ChangeStamp::modified(t(1)),
            &policy(3),
            t(2),
        );
        prop_assert_eq!(next.retry_count, 0);
        prop_assert_eq!(next.banned_until, None);
    }
}
