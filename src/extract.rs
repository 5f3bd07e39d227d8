//! Field extraction from upstream JSON of unknown shape.
//!
//! Upstream schemas drift, so every semantic field is looked up through an
//! ordered list of candidate keys and the first usable value wins. Each field
//! has exactly one helper here; adding a new key name is a one-line change
//! to the matching constant.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;

use crate::models::CatalogFields;

/// Candidate keys for a catalog item's business identifier, in priority order.
pub const BUSINESS_KEY_FIELDS: &[&str] = &[
    "dataset_id",
    "id",
    "uuid",
    "studyId",
    "accession",
    "osdr_id",
];
pub const TITLE_FIELDS: &[&str] = &["title", "name", "label"];
pub const STATUS_FIELDS: &[&str] = &["status", "state", "lifecycle"];
pub const UPDATED_FIELDS: &[&str] = &[
    "updated",
    "updated_at",
    "modified",
    "lastUpdated",
    "timestamp",
];

/// Naive layouts tried after RFC 3339, in order. All are interpreted as UTC.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
];
const DATE_FORMATS: &[&str] = &["%Y-%m-%d"];

/// Read a number, accepting numeric strings as upstreams sometimes quote them.
pub fn number(v: &Value) -> Option<f64> {
    if let Some(x) = v.as_f64() {
        return Some(x);
    }
    v.as_str().and_then(|s| s.trim().parse::<f64>().ok())
}

/// Direct numeric lookup of `key` on an object payload.
pub fn number_field(payload: &Value, key: &str) -> Option<f64> {
    payload.get(key).and_then(number)
}

/// First non-empty string (or number, stringified) among `keys`.
pub fn pick_string(item: &Value, keys: &[&str]) -> Option<String> {
    for k in keys {
        match item.get(*k) {
            Some(Value::String(s)) if !s.is_empty() => return Some(s.clone()),
            Some(Value::Number(n)) => return Some(n.to_string()),
            _ => {}
        }
    }
    None
}

/// First value among `keys` that parses as a timestamp.
///
/// Strings go through [`parse_timestamp`]; integers are Unix seconds.
/// A present but unparseable value does not stop the search.
pub fn pick_timestamp(item: &Value, keys: &[&str]) -> Option<DateTime<Utc>> {
    for k in keys {
        let parsed = match item.get(*k) {
            Some(Value::String(s)) => parse_timestamp(s),
            Some(Value::Number(n)) => n
                .as_i64()
                .and_then(|secs| Utc.timestamp_opt(secs, 0).single()),
            _ => None,
        };
        if parsed.is_some() {
            return parsed;
        }
    }
    None
}

/// Parse a timestamp string against the supported formats; first match wins.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&ndt));
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0).map(|ndt| Utc.from_utc_datetime(&ndt));
        }
    }
    None
}

pub fn business_key(item: &Value) -> Option<String> {
    pick_string(item, BUSINESS_KEY_FIELDS)
}

pub fn title(item: &Value) -> Option<String> {
    pick_string(item, TITLE_FIELDS)
}

pub fn status(item: &Value) -> Option<String> {
    pick_string(item, STATUS_FIELDS)
}

pub fn updated_at(item: &Value) -> Option<DateTime<Utc>> {
    pick_timestamp(item, UPDATED_FIELDS)
}

/// Extract every catalog field from one item.
pub fn catalog_fields(item: &Value) -> CatalogFields {
    CatalogFields {
        business_key: business_key(item),
        title: title(item),
        status: status(item),
        updated_at: updated_at(item),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn number_from_float_and_string() {
        assert_eq!(number(&json!(42.5)), Some(42.5));
        assert_eq!(number(&json!("42.5")), Some(42.5));
        assert_eq!(number(&json!(7)), Some(7.0));
        assert_eq!(number(&json!("invalid")), None);
        assert_eq!(number(&json!(null)), None);
    }

    #[test]
    fn pick_string_respects_priority() {
        let item = json!({"name": "second", "title": "first"});
        assert_eq!(title(&item), Some("first".to_string()));
    }

    #[test]
    fn pick_string_skips_empty_values() {
        let item = json!({"dataset_id": "", "id": "OSD-42"});
        assert_eq!(business_key(&item), Some("OSD-42".to_string()));
    }

    #[test]
    fn pick_string_stringifies_numbers() {
        let item = json!({"id": 1234});
        assert_eq!(business_key(&item), Some("1234".to_string()));
    }

    #[test]
    fn pick_string_not_found() {
        let item = json!({"other": "value"});
        assert_eq!(status(&item), None);
        assert_eq!(business_key(&json!([1, 2, 3])), None);
    }

    #[test]
    fn timestamp_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        assert_eq!(parse_timestamp("2024-01-15T10:30:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-15T12:30:00+02:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-15T10:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-15 10:30:00"), Some(expected));
        assert_eq!(
            parse_timestamp("2024-01-15"),
            Some(Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_timestamp("last tuesday"), None);
    }

    #[test]
    fn timestamp_from_unix_seconds() {
        let item = json!({"timestamp": 1705314600});
        assert_eq!(
            updated_at(&item),
            Some(Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap())
        );
    }

    #[test]
    fn unparseable_timestamp_falls_through_to_next_key() {
        let item = json!({"updated": "soon", "modified": "2024-02-01"});
        assert_eq!(
            updated_at(&item),
            Some(Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn catalog_fields_all_absent() {
        assert_eq!(catalog_fields(&json!({"foo": 1})), CatalogFields::default());
    }
}
