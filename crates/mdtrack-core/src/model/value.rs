//! Tagged scalar values for table rows.
//!
//! `RowValue` mirrors SQLite's five storage classes so row equality in the
//! diff engine is well-defined and serialization is unambiguous. Ordering
//! is total (reals compare via `f64::total_cmp`), which is what lets values
//! serve as diff keys in ordered maps.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;

/// A single scalar cell value as produced by the relational source.
///
/// JSON representation: native scalars for null/integer/real/text, and
/// `{"blob": "<base64>"}` for binary values so they cannot be confused
/// with text.
#[derive(Debug, Clone)]
pub enum RowValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl RowValue {
    /// Variant rank used as the primary sort key across variants.
    fn rank(&self) -> u8 {
        match self {
            RowValue::Null => 0,
            RowValue::Integer(_) => 1,
            RowValue::Real(_) => 2,
            RowValue::Text(_) => 3,
            RowValue::Blob(_) => 4,
        }
    }
}

impl PartialEq for RowValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for RowValue {}

impl PartialOrd for RowValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RowValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (RowValue::Null, RowValue::Null) => Ordering::Equal,
            (RowValue::Integer(a), RowValue::Integer(b)) => a.cmp(b),
            // total_cmp keeps NaN and signed zero orderings deterministic
            (RowValue::Real(a), RowValue::Real(b)) => a.total_cmp(b),
            (RowValue::Text(a), RowValue::Text(b)) => a.cmp(b),
            (RowValue::Blob(a), RowValue::Blob(b)) => a.cmp(b),
            (a, b) => a.rank().cmp(&b.rank()),
        }
    }
}

impl fmt::Display for RowValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowValue::Null => write!(f, "NULL"),
            RowValue::Integer(i) => write!(f, "{}", i),
            RowValue::Real(r) => write!(f, "{}", r),
            RowValue::Text(t) => write!(f, "{}", t),
            RowValue::Blob(b) => write!(f, "blob({} bytes)", b.len()),
        }
    }
}

impl Serialize for RowValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            RowValue::Null => serializer.serialize_unit(),
            RowValue::Integer(i) => serializer.serialize_i64(*i),
            RowValue::Real(r) => serializer.serialize_f64(*r),
            RowValue::Text(t) => serializer.serialize_str(t),
            RowValue::Blob(b) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("blob", &BASE64.encode(b))?;
                map.end()
            }
        }
    }
}

struct RowValueVisitor;

impl<'de> Visitor<'de> for RowValueVisitor {
    type Value = RowValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("null, integer, real, string, or {\"blob\": base64}")
    }

    fn visit_unit<E: de::Error>(self) -> Result<RowValue, E> {
        Ok(RowValue::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<RowValue, E> {
        Ok(RowValue::Null)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<RowValue, E> {
        Ok(RowValue::Integer(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<RowValue, E> {
        i64::try_from(v)
            .map(RowValue::Integer)
            .map_err(|_| E::custom(format!("integer value {} out of i64 range", v)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<RowValue, E> {
        Ok(RowValue::Real(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<RowValue, E> {
        Ok(RowValue::Text(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<RowValue, E> {
        Ok(RowValue::Text(v))
    }

    fn visit_bytes<E: de::Error>(self, v: &[u8]) -> Result<RowValue, E> {
        Ok(RowValue::Blob(v.to_vec()))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<RowValue, A::Error> {
        let key: Option<String> = map.next_key()?;
        match key.as_deref() {
            Some("blob") => {
                let encoded: String = map.next_value()?;
                let bytes = BASE64
                    .decode(encoded.as_bytes())
                    .map_err(|e| de::Error::custom(format!("invalid base64 blob: {}", e)))?;
                // Reject trailing keys so malformed cells fail loudly
                if map.next_key::<String>()?.is_some() {
                    return Err(de::Error::custom("blob object must have exactly one key"));
                }
                Ok(RowValue::Blob(bytes))
            }
            Some(other) => Err(de::Error::custom(format!(
                "unexpected object key '{}' in cell value",
                other
            ))),
            None => Err(de::Error::custom("empty object is not a valid cell value")),
        }
    }
}

impl<'de> Deserialize<'de> for RowValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<RowValue, D::Error> {
        deserializer.deserialize_any(RowValueVisitor)
    }
}
