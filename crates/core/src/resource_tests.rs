// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::TimeZone;

fn at(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, day, 8, 0, 0).unwrap()
}

#[test]
fn latest_of_single_modified() {
    assert_eq!(ChangeStamp::modified(at(4)).latest(), Some(at(4)));
}

#[test]
fn latest_picks_max_across_modified_and_sources() {
    let stamp = ChangeStamp {
        modified: Some(at(2)),
        sources: vec![at(7), at(1), at(5)],
    };
    assert_eq!(stamp.latest(), Some(at(7)));
}

#[test]
fn empty_stamp_has_no_latest() {
    let stamp = ChangeStamp::default();
    assert!(stamp.is_empty());
    assert_eq!(stamp.latest(), None);
}

#[test]
fn stamps_compare_structurally() {
    let a = ChangeStamp::sources([at(1), at(2)]);
    let b = ChangeStamp::sources([at(2), at(1)]);
    assert_ne!(a, b, "source order is part of the signal");
    assert_eq!(a, ChangeStamp::sources([at(1), at(2)]));
}

#[test]
fn metadata_attributes() {
    let meta = ResourceMetadata::modified_at("r1", at(3)).with_attribute("size", "42");
    assert_eq!(meta.attribute("size"), Some("42"));
    assert_eq!(meta.attribute("path"), None);
    assert_eq!(meta.latest_modified(), Some(at(3)));
}

#[test]
fn stamp_json_omits_empty_parts() {
    let json = serde_json::to_value(ChangeStamp::modified(at(3))).unwrap();
    assert!(json.get("sources").is_none());
    assert!(json.get("modified").is_some());
}
