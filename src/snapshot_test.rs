use super::*;

#[test]
fn save_reason_serializes_snake_case() {
    assert_eq!(serde_json::to_value(SaveReason::Interval).unwrap(), "interval");
    assert_eq!(serde_json::to_value(SaveReason::Manual).unwrap(), "manual");
}

#[test]
fn save_reason_display_matches_as_str() {
    assert_eq!(SaveReason::Manual.to_string(), "manual");
    assert_eq!(format!("({})", SaveReason::Interval), "(interval)");
}

#[test]
fn snapshot_summary_drops_payload() {
    let snap = Snapshot {
        id: "s1".into(),
        version: 4,
        created_at: 1_700_000_000_000,
        reason: "manual".into(),
        snapshot: serde_json::json!({"shapes": [1, 2, 3]}),
    };
    let summary = snap.summary();
    assert_eq!(summary.id, "s1");
    assert_eq!(summary.version, 4);
    assert_eq!(summary.created_at, 1_700_000_000_000);
    assert_eq!(summary.reason, "manual");
}

#[test]
fn snapshot_missing_optional_fields_default() {
    let snap: Snapshot = serde_json::from_str(r#"{"id":"s2","version":2,"created_at":5}"#).unwrap();
    assert_eq!(snap.reason, "");
    assert!(snap.snapshot.is_null());
}

#[test]
fn new_snapshot_carries_reason_and_client_ts() {
    let body = NewSnapshot::new(SaveReason::Manual, 42, serde_json::json!({}));
    let json = serde_json::to_value(&body).unwrap();
    assert_eq!(json["reason"], "manual");
    assert_eq!(json["client_ts"], 42);
    assert_eq!(json["snapshot"], serde_json::json!({}));
}

#[test]
fn new_snapshot_accepts_empty_body() {
    let body: NewSnapshot = serde_json::from_str("{}").unwrap();
    assert_eq!(body, NewSnapshot::default());
}

#[test]
fn now_ms_is_after_2020() {
    assert!(now_ms() > 1_577_836_800_000);
}
