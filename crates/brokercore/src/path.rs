//! Dotted-path addressing into nested [`Value`] trees.
//!
//! A path such as `"payload.sensor.temperature"` names a location inside a
//! mapping. Numeric segments also index into arrays (`"readings.0"`).

use crate::{HandlerError, Value};
use std::fmt;
use std::str::FromStr;

/// A validated, dot-delimited field path.
///
/// Every segment is a non-empty run of non-dot characters. Empty paths and
/// paths with leading, trailing or doubled dots are rejected by [`FieldPath::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath {
    raw: String,
    segments: Vec<String>,
}

impl FieldPath {
    pub fn parse(raw: &str) -> Result<Self, HandlerError> {
        if raw.is_empty() {
            return Err(invalid(raw, "path is empty"));
        }

        let segments: Vec<String> = raw.split('.').map(str::to_string).collect();
        if let Some(position) = segments.iter().position(|s| s.is_empty()) {
            return Err(invalid(raw, format!("segment {} is empty", position)));
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Read the value at this path.
    ///
    /// Fails with [`HandlerError::PropertyNotFound`] carrying the whole path
    /// as soon as a segment is absent.
    pub fn get<'a>(&self, target: &'a Value) -> Result<&'a Value, HandlerError> {
        let mut at = target;
        for key in &self.segments {
            at = match at {
                Value::Object(map) => map.get(key),
                Value::Array(items) => index_of(key, items.len()).map(|i| &items[i]),
                _ => None,
            }
            .ok_or_else(|| self.not_found())?;
        }
        Ok(at)
    }

    /// Write `value` at this path, creating intermediate mappings on demand.
    ///
    /// A scalar met on the way (or a scalar `target`) is replaced by an empty
    /// mapping before descending. Arrays are only descended through in-range
    /// numeric segments; any other segment replaces the array as well.
    pub fn set(&self, value: Value, target: &mut Value) {
        set_in(&self.segments, value, target);
    }

    /// Remove and return the value at this path.
    pub fn remove(&self, target: &mut Value) -> Result<Value, HandlerError> {
        let Some((last, parents)) = self.segments.split_last() else {
            return Err(self.not_found());
        };

        match self.get_mut_in(parents, target)? {
            Value::Object(map) => map.shift_remove(last),
            Value::Array(items) => index_of(last, items.len()).map(|i| items.remove(i)),
            _ => None,
        }
        .ok_or_else(|| self.not_found())
    }

    fn get_mut_in<'a>(
        &self,
        segments: &[String],
        target: &'a mut Value,
    ) -> Result<&'a mut Value, HandlerError> {
        let mut at = target;
        for key in segments {
            at = match at {
                Value::Object(map) => map.get_mut(key),
                Value::Array(items) => match index_of(key, items.len()) {
                    Some(i) => items.get_mut(i),
                    None => None,
                },
                _ => None,
            }
            .ok_or_else(|| self.not_found())?;
        }
        Ok(at)
    }

    fn not_found(&self) -> HandlerError {
        HandlerError::PropertyNotFound(self.raw.clone())
    }
}

impl FromStr for FieldPath {
    type Err = HandlerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldPath::parse(s)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Read the value at `field` inside `target`.
pub fn get<'a>(field: &str, target: &'a Value) -> Result<&'a Value, HandlerError> {
    FieldPath::parse(field)?.get(target)
}

/// Write `value` at `field` inside `target`. Only fails on a malformed path.
pub fn set(field: &str, value: Value, target: &mut Value) -> Result<(), HandlerError> {
    FieldPath::parse(field)?.set(value, target);
    Ok(())
}

fn set_in(segments: &[String], value: Value, at: &mut Value) {
    let Some((key, rest)) = segments.split_first() else {
        *at = value;
        return;
    };

    if let Value::Array(items) = at {
        if let Some(i) = index_of(key, items.len()) {
            set_in(rest, value, &mut items[i]);
            return;
        }
    }

    if !at.is_object() {
        *at = Value::object();
    }
    if let Value::Object(map) = at {
        let slot = map.entry(key.clone()).or_insert_with(Value::object);
        set_in(rest, value, slot);
    }
}

fn index_of(segment: &str, len: usize) -> Option<usize> {
    if !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse::<usize>().ok().filter(|i| *i < len)
}

fn invalid(raw: &str, reason: impl Into<String>) -> HandlerError {
    HandlerError::InvalidPath {
        path: raw.to_string(),
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn value(json: serde_json::Value) -> Value {
        Value::from(json)
    }

    #[test]
    fn set_creates_intermediate_mappings() {
        let mut target = Value::object();
        set("a.b.c", Value::from(5i64), &mut target).unwrap();
        assert_eq!(target, value(json!({"a": {"b": {"c": 5}}})));
    }

    #[test]
    fn get_reads_nested_value() {
        let target = value(json!({"a": {"b": {"c": 5}}}));
        assert_eq!(get("a.b.c", &target).unwrap(), &Value::from(5i64));
    }

    #[test]
    fn get_missing_final_segment_reports_full_path() {
        let target = value(json!({"a": {}}));
        assert_eq!(
            get("a.x", &target),
            Err(HandlerError::PropertyNotFound("a.x".to_string()))
        );
    }

    #[test]
    fn get_missing_intermediate_segment_reports_full_path() {
        let target = value(json!({"a": {"b": 1}}));
        assert_eq!(
            get("a.missing.deeper", &target),
            Err(HandlerError::PropertyNotFound("a.missing.deeper".to_string()))
        );
    }

    #[test]
    fn get_does_not_descend_into_scalars() {
        let target = value(json!({"a": "text"}));
        assert!(matches!(
            get("a.length", &target),
            Err(HandlerError::PropertyNotFound(_))
        ));
    }

    #[test]
    fn set_then_get_returns_value_of_any_shape() {
        let shapes = [
            Value::Null,
            Value::from(true),
            Value::from("hello"),
            value(json!([1, {"x": 2}])),
            value(json!({"nested": {"deep": [true]}})),
        ];
        for (i, shape) in shapes.into_iter().enumerate() {
            let mut target = value(json!({"existing": {"keep": 1}}));
            let path = format!("existing.level{}.leaf", i);
            set(&path, shape.clone(), &mut target).unwrap();
            assert_eq!(get(&path, &target).unwrap(), &shape);
            assert_eq!(get("existing.keep", &target).unwrap(), &Value::from(1i64));
        }
    }

    #[test]
    fn integers_survive_set_and_get() {
        let mut target = Value::object();
        set("device.id", Value::from(9_007_199_254_740_993u64), &mut target).unwrap();
        set("device.count", Value::from(21i64), &mut target).unwrap();

        assert_eq!(
            get("device.id", &target).unwrap().as_u64(),
            Some(9_007_199_254_740_993)
        );
        assert_eq!(
            serde_json::to_string(&target).unwrap(),
            r#"{"device":{"id":9007199254740993,"count":21}}"#
        );
    }

    #[test]
    fn set_overwrites_existing_leaf() {
        let mut target = value(json!({"a": {"b": 1}}));
        set("a.b", Value::from("two"), &mut target).unwrap();
        assert_eq!(target, value(json!({"a": {"b": "two"}})));
    }

    #[test]
    fn set_replaces_scalar_met_mid_path() {
        let mut target = value(json!({"a": 3}));
        set("a.b", Value::from(true), &mut target).unwrap();
        assert_eq!(target, value(json!({"a": {"b": true}})));
    }

    #[test]
    fn set_on_scalar_target_replaces_it() {
        let mut target = Value::from("not a map");
        set("k", Value::from(1i64), &mut target).unwrap();
        assert_eq!(target, value(json!({"k": 1})));
    }

    #[test]
    fn numeric_segments_index_into_arrays() {
        let mut target = value(json!({"readings": [{"t": 1}, {"t": 2}]}));
        assert_eq!(get("readings.1.t", &target).unwrap(), &Value::from(2i64));

        set("readings.0.t", Value::from(10i64), &mut target).unwrap();
        assert_eq!(get("readings.0.t", &target).unwrap(), &Value::from(10i64));

        assert_eq!(
            get("readings.5", &target),
            Err(HandlerError::PropertyNotFound("readings.5".to_string()))
        );
    }

    #[test]
    fn malformed_paths_are_rejected() {
        for raw in ["", ".", ".a", "a.", "a..b"] {
            let err = FieldPath::parse(raw).unwrap_err();
            assert!(
                matches!(err, HandlerError::InvalidPath { ref path, .. } if path == raw),
                "expected InvalidPath for {:?}, got {:?}",
                raw,
                err
            );
        }

        let mut target = Value::object();
        assert!(set("a..b", Value::Null, &mut target).is_err());
        assert_eq!(target, Value::object());
    }

    #[test]
    fn remove_detaches_value() {
        let mut target = value(json!({"a": {"b": 1, "c": 2}, "list": [1, 2, 3]}));
        let path: FieldPath = "a.b".parse().unwrap();
        assert_eq!(path.remove(&mut target).unwrap(), Value::from(1i64));
        assert!(path.get(&target).is_err());

        let path: FieldPath = "list.0".parse().unwrap();
        assert_eq!(path.remove(&mut target).unwrap(), Value::from(1i64));
        assert_eq!(get("list", &target).unwrap(), &value(json!([2, 3])));

        let missing: FieldPath = "a.zzz".parse().unwrap();
        assert_eq!(
            missing.remove(&mut target),
            Err(HandlerError::PropertyNotFound("a.zzz".to_string()))
        );
    }

    #[test]
    fn parsed_path_exposes_segments() {
        let path = FieldPath::parse("payload.sensor.temp").unwrap();
        assert_eq!(path.segments(), ["payload", "sensor", "temp"]);
        assert_eq!(path.to_string(), "payload.sensor.temp");
    }
}
