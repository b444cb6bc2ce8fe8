//! Typed access to raw tool arguments, with range and enum checks.
//!
//! Violations name the field and the constraint, e.g.
//! `Invalid arguments: brightness must be ≤ 100`. Unknown fields are
//! ignored and `null` counts as omitted.

use std::str::FromStr;

use serde_json::{Map, Value};
use webcam::{WebcamError, WebcamResult};

pub struct Arguments<'a> {
    map: &'a Map<String, Value>,
}

impl<'a> Arguments<'a> {
    pub fn new(value: &'a Value) -> WebcamResult<Self> {
        match value {
            Value::Object(map) => Ok(Self { map }),
            _ => Err(WebcamError::invalid("arguments", "must be an object")),
        }
    }

    fn get(&self, field: &str) -> Option<&'a Value> {
        self.map.get(field).filter(|v| !v.is_null())
    }

    /// Optional whole number within `[min, max]`.
    pub fn integer(&self, field: &str, min: i64, max: i64) -> WebcamResult<Option<i64>> {
        let Some(value) = self.get(field) else {
            return Ok(None);
        };
        let Value::Number(number) = value else {
            return Err(WebcamError::invalid(field, "must be a number"));
        };
        let n = match number.as_i64() {
            Some(n) => n,
            None => match number.as_f64() {
                Some(f) if f.is_finite() && f.fract() == 0.0 => f as i64,
                _ => return Err(WebcamError::invalid(field, "must be an integer")),
            },
        };
        if n < min {
            return Err(WebcamError::invalid(field, format!("must be ≥ {min}")));
        }
        if n > max {
            return Err(WebcamError::invalid(field, format!("must be ≤ {max}")));
        }
        Ok(Some(n))
    }

    pub fn string(&self, field: &str) -> WebcamResult<Option<&'a str>> {
        match self.get(field) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(_) => Err(WebcamError::invalid(field, "must be a string")),
        }
    }

    /// Optional string restricted to `names`, parsed into `T`.
    pub fn choice<T: FromStr>(&self, field: &str, names: &[&str]) -> WebcamResult<Option<T>> {
        let Some(raw) = self.string(field)? else {
            return Ok(None);
        };
        if !names.contains(&raw) {
            return Err(WebcamError::invalid(
                field,
                format!("must be one of: {}", names.join(", ")),
            ));
        }
        raw.parse::<T>()
            .map(Some)
            .map_err(|_| WebcamError::invalid(field, format!("must be one of: {}", names.join(", "))))
    }
}
