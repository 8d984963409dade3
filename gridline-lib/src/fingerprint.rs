//! Content fingerprints
//!
//! SHA-256 digests used to detect row-content changes (sort memo, distinct
//! value index) and to key cached remote responses.

use sha2::Digest;
use sha2::Sha256;

use crate::model::Row;

/// Hex-encoded SHA-256 digest.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Returns the hex digest.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fingerprints a row set: its length plus every cell in every row.
///
/// Two row sets share a fingerprint iff they hold the same cells in the same
/// order (up to hash collision).
pub fn fingerprint_rows(rows: &[Row]) -> Fingerprint {
    let mut hasher = Sha256::new();
    hasher.update((rows.len() as u64).to_le_bytes());
    for row in rows {
        for (key, value) in row.fields() {
            hasher.update(key.as_bytes());
            hasher.update([0]);
            hasher.update(value.type_name().as_bytes());
            hasher.update([0]);
            hasher.update(value.to_filter_string().as_bytes());
            hasher.update([0x1e]);
        }
        hasher.update([0x1d]);
    }
    Fingerprint(format!("{:x}", hasher.finalize()))
}

/// Fingerprints arbitrary bytes.
pub fn fingerprint_bytes(bytes: &[u8]) -> Fingerprint {
    Fingerprint(format!("{:x}", Sha256::digest(bytes)))
}

/// Rebuilds a JSON value with every object's keys in sorted order.
pub fn canonicalize(value: &serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            serde_json::Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.clone(), canonicalize(v)))
                    .collect(),
            )
        }
        serde_json::Value::Array(items) => {
            serde_json::Value::Array(items.iter().map(canonicalize).collect())
        }
        other => other.clone(),
    }
}

/// Canonical (sorted-key, compact) JSON text of a value.
pub fn canonical_json(value: &serde_json::Value) -> String {
    canonicalize(value).to_string()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_canonical_json_sorts_nested_keys() {
        let value = json!({"b": {"y": 1, "x": 2}, "a": [{"d": 1, "c": 2}]});
        assert_eq!(
            canonical_json(&value),
            r#"{"a":[{"c":2,"d":1}],"b":{"x":2,"y":1}}"#
        );
    }

    #[test]
    fn test_row_fingerprint_tracks_values_not_just_length() {
        let a = vec![Row::new().set("n", 1i64), Row::new().set("n", 2i64)];
        let mut b = a.clone();
        assert_eq!(fingerprint_rows(&a), fingerprint_rows(&b));

        b[1].insert("n", 3i64);
        assert_ne!(fingerprint_rows(&a), fingerprint_rows(&b));
    }

    #[test]
    fn test_row_fingerprint_distinguishes_types() {
        let a = vec![Row::new().set("n", 1i64)];
        let b = vec![Row::new().set("n", "1")];
        assert_ne!(fingerprint_rows(&a), fingerprint_rows(&b));
    }

    #[test]
    fn test_bytes_fingerprint_is_hex_sha256() {
        let fp = fingerprint_bytes(b"");
        assert_eq!(
            fp.as_str(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
