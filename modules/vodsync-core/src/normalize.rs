//! Raw record → validated row mapping, plus the recency ordering.
//!
//! The sort stage and the normalizer both need "when was this published";
//! the derivation is unified here (`recency_key` and `uploaded_at` share
//! `finite_timestamp` and `parse_upload_date`) so the two stages can never
//! disagree about the same record.

use chrono::{DateTime, Days, NaiveDate, TimeZone, Utc};
use serde_json::Value;

use crate::types::{RawVideo, VideoRow};

/// Outcome of normalizing one raw record.
///
/// Explicit variant rather than `Option` so a dropped record is a named
/// decision, not a silently propagated null.
#[derive(Debug)]
pub enum NormalizeOutcome {
    Row(Box<VideoRow>),
    /// The identifier field was missing or empty after trimming.
    MissingId,
}

/// Map one raw record into a `VideoRow`, applying per-field fallback and
/// derivation rules. Pure; the only inputs are the record itself, the
/// run-level channel URL and the run-level scrape timestamp.
pub fn normalize(
    raw: &RawVideo,
    fallback_channel_url: &str,
    scraped_at: DateTime<Utc>,
) -> NormalizeOutcome {
    let Some(id) = trimmed_string(raw.get("id")) else {
        return NormalizeOutcome::MissingId;
    };

    let channel_url = trimmed_string(raw.get("channel_url"))
        .unwrap_or_else(|| fallback_channel_url.to_string());
    let title = trimmed_string(raw.get("title")).unwrap_or_else(|| id.clone());

    NormalizeOutcome::Row(Box::new(VideoRow {
        video_url: resolve_video_url(raw, &id),
        channel_url,
        title,
        description: trimmed_string(raw.get("description")),
        duration_seconds: non_negative_int(raw.get("duration")),
        published_timestamp: non_negative_int(raw.get("timestamp")),
        upload_date: trimmed_string(raw.get("upload_date")),
        uploaded_at: derive_uploaded_at(raw),
        scraped_at,
        is_live: is_live(raw),
        raw_data: Value::Object(raw.clone()),
        updated_at: Utc::now(),
        id,
    }))
}

/// Recency key for the sort stage: raw publish epoch if finite, else the
/// parsed date code, else zero. Reads the same fields the normalizer reads.
pub fn recency_key(raw: &RawVideo) -> i64 {
    if let Some(ts) = finite_timestamp(raw) {
        return ts;
    }
    raw.get("upload_date")
        .and_then(Value::as_str)
        .and_then(parse_upload_date)
        .unwrap_or(0)
}

/// Order raw candidates newest-first. Stable: ties keep parse order.
/// Applied before normalization-drop filtering.
pub fn sort_by_recency(videos: &mut [RawVideo]) {
    videos.sort_by_key(|video| std::cmp::Reverse(recency_key(video)));
}

/// Parse a compact `YYYYMMDD` date code into epoch seconds at UTC midnight.
///
/// Validation is deliberately lenient: exactly 8 characters, month in
/// [1,12], day in [1,31], no calendar check. Out-of-range days roll over
/// into the next month (Feb 30 → Mar 1-ish), matching the source's own
/// deterministic behavior. Anything invalid yields `None`, never an error.
pub fn parse_upload_date(code: &str) -> Option<i64> {
    if code.len() != 8 {
        return None;
    }
    let year: i32 = code.get(0..4)?.parse().ok()?;
    let month: u32 = code.get(4..6)?.parse().ok()?;
    let day: u32 = code.get(6..8)?.parse().ok()?;
    if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return None;
    }

    let date = NaiveDate::from_ymd_opt(year, month, 1)?.checked_add_days(Days::new(day as u64 - 1))?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc().timestamp())
}

fn derive_uploaded_at(raw: &RawVideo) -> Option<DateTime<Utc>> {
    if let Some(ts) = finite_timestamp(raw) {
        if ts > 0 {
            return Utc.timestamp_opt(ts, 0).single();
        }
    }

    let parsed = raw
        .get("upload_date")
        .and_then(Value::as_str)
        .and_then(parse_upload_date)?;
    if parsed > 0 {
        return Utc.timestamp_opt(parsed, 0).single();
    }
    None
}

/// The raw `timestamp` field as an integer, if it is a finite number.
/// String-typed timestamps count for `published_timestamp` but not here.
fn finite_timestamp(raw: &RawVideo) -> Option<i64> {
    match raw.get("timestamp")? {
        Value::Number(n) => number_to_i64(n),
        _ => None,
    }
}

fn resolve_video_url(raw: &RawVideo, id: &str) -> String {
    trimmed_string(raw.get("webpage_url"))
        .or_else(|| trimmed_string(raw.get("url")))
        .unwrap_or_else(|| format!("https://www.youtube.com/watch?v={id}"))
}

fn is_live(raw: &RawVideo) -> bool {
    if let Some(Value::Bool(flag)) = raw.get("is_live") {
        return *flag;
    }
    if let Some(status) = raw.get("live_status").and_then(Value::as_str) {
        let status = status.to_ascii_lowercase();
        return status == "is_live" || status == "live";
    }
    false
}

/// A trimmed, non-empty string value. Empty or whitespace-only strings and
/// non-string values are treated as absent.
fn trimmed_string(value: Option<&Value>) -> Option<String> {
    let Some(Value::String(s)) = value else {
        return None;
    };
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// A non-negative integer from a numeric or numeric-string value.
/// Negative or non-finite input is absent, never clamped to zero.
fn non_negative_int(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => number_to_i64(n).filter(|&v| v >= 0),
        Value::String(s) => {
            let parsed: f64 = s.trim().parse().ok()?;
            (parsed.is_finite() && parsed >= 0.0).then(|| parsed.trunc() as i64)
        }
        _ => None,
    }
}

fn number_to_i64(n: &serde_json::Number) -> Option<i64> {
    if let Some(v) = n.as_i64() {
        return Some(v);
    }
    let f = n.as_f64()?;
    f.is_finite().then(|| f.trunc() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: serde_json::Value) -> RawVideo {
        value.as_object().expect("test record must be an object").clone()
    }

    fn normalize_ok(value: serde_json::Value) -> VideoRow {
        match normalize(&raw(value), "https://example.com/channel", Utc::now()) {
            NormalizeOutcome::Row(row) => *row,
            NormalizeOutcome::MissingId => panic!("record was dropped"),
        }
    }

    #[test]
    fn missing_id_is_dropped() {
        let outcome = normalize(&raw(json!({"title": "no id"})), "c", Utc::now());
        assert!(matches!(outcome, NormalizeOutcome::MissingId));

        let outcome = normalize(&raw(json!({"id": "   "})), "c", Utc::now());
        assert!(matches!(outcome, NormalizeOutcome::MissingId));
    }

    #[test]
    fn title_falls_back_to_id() {
        let row = normalize_ok(json!({"id": "abc123"}));
        assert_eq!(row.title, "abc123");
    }

    #[test]
    fn channel_url_falls_back_to_run_default() {
        let row = normalize_ok(json!({"id": "abc"}));
        assert_eq!(row.channel_url, "https://example.com/channel");

        let row = normalize_ok(json!({"id": "abc", "channel_url": "https://yt/@c"}));
        assert_eq!(row.channel_url, "https://yt/@c");
    }

    #[test]
    fn video_url_fallback_chain() {
        let row = normalize_ok(json!({"id": "v1", "webpage_url": "https://w", "url": "https://u"}));
        assert_eq!(row.video_url, "https://w");

        let row = normalize_ok(json!({"id": "v1", "url": "https://u"}));
        assert_eq!(row.video_url, "https://u");

        let row = normalize_ok(json!({"id": "v1"}));
        assert_eq!(row.video_url, "https://www.youtube.com/watch?v=v1");
    }

    #[test]
    fn whitespace_description_is_absent() {
        let row = normalize_ok(json!({"id": "v1", "description": "  \n "}));
        assert_eq!(row.description, None);
    }

    #[test]
    fn duration_coercion_rules() {
        assert_eq!(normalize_ok(json!({"id": "v", "duration": 90})).duration_seconds, Some(90));
        assert_eq!(normalize_ok(json!({"id": "v", "duration": "125"})).duration_seconds, Some(125));
        assert_eq!(normalize_ok(json!({"id": "v", "duration": 12.9})).duration_seconds, Some(12));
        // Negative and non-numeric input is absent, not clamped to zero.
        assert_eq!(normalize_ok(json!({"id": "v", "duration": -5})).duration_seconds, None);
        assert_eq!(normalize_ok(json!({"id": "v", "duration": "nope"})).duration_seconds, None);
        assert_eq!(normalize_ok(json!({"id": "v", "duration": null})).duration_seconds, None);
    }

    #[test]
    fn uploaded_at_prefers_timestamp_over_date_code() {
        let row = normalize_ok(json!({"id": "v", "timestamp": 1700000000, "upload_date": "20200101"}));
        assert_eq!(row.uploaded_at.map(|t| t.timestamp()), Some(1_700_000_000));

        let row = normalize_ok(json!({"id": "v", "upload_date": "20240102"}));
        assert_eq!(
            row.uploaded_at.map(|t| t.timestamp()),
            parse_upload_date("20240102")
        );

        // Never guessed from "now".
        let row = normalize_ok(json!({"id": "v"}));
        assert_eq!(row.uploaded_at, None);
    }

    #[test]
    fn live_flag_and_status_markers() {
        assert!(normalize_ok(json!({"id": "v", "is_live": true})).is_live);
        assert!(!normalize_ok(json!({"id": "v", "is_live": false, "live_status": "live"})).is_live);
        assert!(normalize_ok(json!({"id": "v", "live_status": "IS_LIVE"})).is_live);
        assert!(!normalize_ok(json!({"id": "v", "live_status": "was_live"})).is_live);
        assert!(!normalize_ok(json!({"id": "v"})).is_live);
    }

    #[test]
    fn raw_payload_is_verbatim() {
        let input = json!({"id": " v1 ", "title": "  t  ", "extra": {"nested": [1, 2]}});
        let row = normalize_ok(input.clone());
        // Fields are trimmed but the preserved payload is untouched.
        assert_eq!(row.id, "v1");
        assert_eq!(row.raw_data, input);
    }

    #[test]
    fn upload_date_requires_eight_chars_and_sane_ranges() {
        assert!(parse_upload_date("20240102").is_some());
        assert_eq!(parse_upload_date("2024010"), None);
        assert_eq!(parse_upload_date("202401021"), None);
        assert_eq!(parse_upload_date("20241301"), None); // month 13
        assert_eq!(parse_upload_date("20240132"), None); // day 32
        assert_eq!(parse_upload_date("2024010x"), None);
        assert_eq!(parse_upload_date("２０２４0102"), None); // non-ASCII digits
    }

    #[test]
    fn upload_date_validation_is_deliberately_lenient() {
        // Day 30 in February passes the range check (month 1-12, day 1-31);
        // the value rolls forward past the end of the month. This matches
        // the upstream tool's permissive date handling and is intentional.
        let feb30 = parse_upload_date("20240230").expect("lenient parse accepts Feb 30");
        let mar01 = parse_upload_date("20240301").expect("valid date");
        assert_eq!(feb30, mar01);
    }

    #[test]
    fn sort_orders_by_descending_recency() {
        let mut videos: Vec<RawVideo> = vec![
            raw(json!({"id": "a", "timestamp": 100})),
            raw(json!({"id": "b", "timestamp": 300})),
            raw(json!({"id": "c", "timestamp": 200})),
        ];
        sort_by_recency(&mut videos);
        let order: Vec<i64> = videos.iter().map(recency_key).collect();
        assert_eq!(order, vec![300, 200, 100]);
    }

    #[test]
    fn keyless_candidates_sort_last() {
        let mut videos: Vec<RawVideo> = vec![
            raw(json!({"id": "none"})),
            raw(json!({"id": "dated", "upload_date": "20240101"})),
            raw(json!({"id": "stamped", "timestamp": 50})),
        ];
        sort_by_recency(&mut videos);
        let ids: Vec<&str> = videos
            .iter()
            .map(|v| v.get("id").and_then(Value::as_str).unwrap())
            .collect();
        assert_eq!(ids, vec!["dated", "stamped", "none"]);
        assert_eq!(recency_key(&videos[2]), 0);
    }

    #[test]
    fn sort_is_stable_on_ties() {
        let mut videos: Vec<RawVideo> = vec![
            raw(json!({"id": "first", "timestamp": 100})),
            raw(json!({"id": "second", "timestamp": 100})),
        ];
        sort_by_recency(&mut videos);
        let ids: Vec<&str> = videos
            .iter()
            .map(|v| v.get("id").and_then(Value::as_str).unwrap())
            .collect();
        assert_eq!(ids, vec!["first", "second"]);
    }
}
