//! Tool argument extraction and command parameter building.
//!
//! Tool arguments arrive as an untyped JSON object. [`Args`] pulls typed
//! values out of it and reports mistakes as [`ToolError::InvalidArguments`];
//! [`Params`] collects the `params` object sent to the plugin.
//!
//! Optional string arguments treat `""` like an absent value, and `null` is
//! treated as absent everywhere.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::bridge::ToolError;

/// Typed view over a tool's `arguments` object.
#[derive(Debug, Clone, Copy)]
pub struct Args<'a> {
    map: Option<&'a Map<String, Value>>,
}

impl<'a> Args<'a> {
    /// Wraps the raw arguments. `null` behaves like `{}`.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::InvalidArguments`] if `arguments` is neither an
    /// object nor `null`.
    pub fn new(arguments: &'a Value) -> Result<Self, ToolError> {
        match arguments {
            Value::Null => Ok(Self { map: None }),
            Value::Object(map) => Ok(Self { map: Some(map) }),
            _ => Err(ToolError::InvalidArguments(
                "Tool arguments must be a JSON object".to_string(),
            )),
        }
    }

    /// Returns the value for `key`, treating `null` as absent.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&'a Value> {
        self.map
            .and_then(|m| m.get(key))
            .filter(|v| !v.is_null())
    }

    /// Returns a required string argument.
    ///
    /// # Errors
    ///
    /// Fails if the argument is missing, empty, or not a string.
    pub fn required_str(&self, key: &str) -> Result<&'a str, ToolError> {
        self.optional_str(key)?.ok_or_else(|| missing(key))
    }

    /// Returns an optional string argument; `""` counts as absent.
    ///
    /// # Errors
    ///
    /// Fails if the argument is present but not a string.
    pub fn optional_str(&self, key: &str) -> Result<Option<&'a str>, ToolError> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::String(s)) if s.is_empty() => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(_) => Err(wrong_type(key, "a string")),
        }
    }

    /// Returns a required number argument.
    ///
    /// # Errors
    ///
    /// Fails if the argument is missing or not a number.
    pub fn required_f64(&self, key: &str) -> Result<f64, ToolError> {
        self.optional_f64(key)?.ok_or_else(|| missing(key))
    }

    /// Returns an optional number argument.
    ///
    /// # Errors
    ///
    /// Fails if the argument is present but not a number.
    pub fn optional_f64(&self, key: &str) -> Result<Option<f64>, ToolError> {
        self.get(key)
            .map(|v| v.as_f64().ok_or_else(|| wrong_type(key, "a number")))
            .transpose()
    }

    /// Returns an integer argument, or `default` when absent.
    ///
    /// # Errors
    ///
    /// Fails if the argument is present but not an integer.
    pub fn i64_or(&self, key: &str, default: i64) -> Result<i64, ToolError> {
        self.get(key).map_or(Ok(default), |v| {
            v.as_i64().ok_or_else(|| wrong_type(key, "an integer"))
        })
    }

    /// Returns a boolean argument, or `default` when absent.
    ///
    /// # Errors
    ///
    /// Fails if the argument is present but not a boolean.
    pub fn bool_or(&self, key: &str, default: bool) -> Result<bool, ToolError> {
        self.get(key).map_or(Ok(default), |v| {
            v.as_bool().ok_or_else(|| wrong_type(key, "a boolean"))
        })
    }

    /// Returns a required array argument.
    ///
    /// # Errors
    ///
    /// Fails if the argument is missing or not an array.
    pub fn required_array(&self, key: &str) -> Result<&'a [Value], ToolError> {
        self.optional_array(key)?.ok_or_else(|| missing(key))
    }

    /// Returns an optional array argument.
    ///
    /// # Errors
    ///
    /// Fails if the argument is present but not an array.
    pub fn optional_array(&self, key: &str) -> Result<Option<&'a [Value]>, ToolError> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::Array(items)) => Ok(Some(items.as_slice())),
            Some(_) => Err(wrong_type(key, "an array")),
        }
    }

    /// Returns an optional object argument.
    ///
    /// # Errors
    ///
    /// Fails if the argument is present but not an object.
    pub fn optional_object(&self, key: &str) -> Result<Option<&'a Map<String, Value>>, ToolError> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::Object(map)) => Ok(Some(map)),
            Some(_) => Err(wrong_type(key, "an object")),
        }
    }

    /// Returns a required list of strings, such as object IDs.
    ///
    /// # Errors
    ///
    /// Fails if the argument is missing, not an array, or holds a non-string.
    pub fn string_list(&self, key: &str) -> Result<Vec<&'a str>, ToolError> {
        self.required_array(key)?
            .iter()
            .map(|item| item.as_str().ok_or_else(|| wrong_type(key, "a list of strings")))
            .collect()
    }

    /// Returns an optional point argument normalised to `[x, y, z]`.
    ///
    /// # Errors
    ///
    /// Fails if the argument is present but [`parse_point`] rejects it.
    pub fn point(&self, key: &str) -> Result<Option<[f64; 3]>, ToolError> {
        self.get(key)
            .map(|v| parse_point(v).ok_or_else(|| wrong_type(key, "a point [x, y, z]")))
            .transpose()
    }

    /// Returns an optional colour argument.
    ///
    /// # Errors
    ///
    /// Fails if the argument is present but [`parse_color`] rejects it.
    pub fn color(&self, key: &str) -> Result<Option<Rgb>, ToolError> {
        self.get(key)
            .map(|v| {
                parse_color(v).ok_or_else(|| {
                    wrong_type(key, "a colour ([r, g, b], {r, g, b} or \"#RRGGBB\")")
                })
            })
            .transpose()
    }

    /// Checks that at least one of two identifying arguments is present.
    ///
    /// # Errors
    ///
    /// Returns "Either `first` or `second` is required" when both are absent.
    pub fn require_either(&self, first: &str, second: &str) -> Result<(), ToolError> {
        if self.optional_str(first)?.is_none() && self.optional_str(second)?.is_none() {
            return Err(ToolError::InvalidArguments(format!(
                "Either {first} or {second} is required"
            )));
        }
        Ok(())
    }
}

fn missing(key: &str) -> ToolError {
    ToolError::InvalidArguments(format!("Missing required parameter: {key}"))
}

fn wrong_type(key: &str, expected: &str) -> ToolError {
    ToolError::InvalidArguments(format!("Parameter '{key}' must be {expected}"))
}

/// Builder for the `params` object of a plugin command.
#[derive(Debug, Clone, Default)]
pub struct Params(Map<String, Value>);

impl Params {
    /// Creates an empty parameter object.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key` to `value`.
    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    /// Sets `key` only when `value` is `Some`.
    #[must_use]
    pub fn with_opt(self, key: &str, value: Option<impl Into<Value>>) -> Self {
        match value {
            Some(value) => self.with(key, value),
            None => self,
        }
    }

    /// Copies each of `keys` from `args` when present and non-null.
    #[must_use]
    pub fn forward(mut self, args: &Args<'_>, keys: &[&str]) -> Self {
        for key in keys {
            if let Some(value) = args.get(key) {
                self.0.insert((*key).to_string(), value.clone());
            }
        }
        self
    }

    /// Finishes the builder.
    #[must_use]
    pub fn build(self) -> Value {
        Value::Object(self.0)
    }
}

/// An RGB colour with 8-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rgb {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
}

impl Rgb {
    /// The `[r, g, b]` form the plugins expect on the wire.
    #[must_use]
    pub fn to_array(self) -> Value {
        Value::from(vec![self.r, self.g, self.b])
    }
}

/// Normalises a point to `[x, y, z]`.
///
/// Accepts `[x, y]` (z = 0), `[x, y, z, ...]` (extra items ignored) and
/// `{"x", "y", "z"}` (missing keys are 0). Returns `None` for `null` and
/// anything else.
#[must_use]
pub fn parse_point(value: &Value) -> Option<[f64; 3]> {
    match value {
        Value::Array(items) if items.len() >= 2 => {
            let x = items[0].as_f64()?;
            let y = items[1].as_f64()?;
            let z = match items.get(2) {
                Some(z) => z.as_f64()?,
                None => 0.0,
            };
            Some([x, y, z])
        }
        Value::Object(map) => {
            let coord = |key: &str| map.get(key).map_or(Some(0.0), Value::as_f64);
            Some([coord("x")?, coord("y")?, coord("z")?])
        }
        _ => None,
    }
}

/// Normalises a colour.
///
/// Accepts `[r, g, b, ...]`, `{"r", "g", "b"}` (missing keys are 0) and
/// `"#RRGGBB"`. Channels must lie in `0..=255`; fractional channels are
/// truncated.
#[must_use]
pub fn parse_color(value: &Value) -> Option<Rgb> {
    #[allow(clippy::cast_possible_truncation)] // channel range is checked below
    fn channel(value: Option<&Value>) -> Option<u8> {
        let n = value.map_or(Some(0.0), Value::as_f64)?.trunc();
        (0.0..=255.0).contains(&n).then_some(n as u8)
    }

    match value {
        Value::Array(items) if items.len() >= 3 => Some(Rgb {
            r: channel(items.first())?,
            g: channel(items.get(1))?,
            b: channel(items.get(2))?,
        }),
        Value::Object(map) => Some(Rgb {
            r: channel(map.get("r"))?,
            g: channel(map.get("g"))?,
            b: channel(map.get("b"))?,
        }),
        Value::String(s) => {
            let hex = s.strip_prefix('#').filter(|h| h.len() == 6 && h.is_ascii())?;
            let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
            Some(Rgb {
                r: byte(0)?,
                g: byte(2)?,
                b: byte(4)?,
            })
        }
        _ => None,
    }
}

/// Summarises created object IDs for a tool message.
///
/// Lists at most three IDs, then an ellipsis.
#[must_use]
pub fn format_result_ids(result_ids: &[&str], object_type: &str) -> String {
    match result_ids {
        [] => format!("No {object_type}s created"),
        [only] => format!("Created {object_type}: {only}"),
        _ => {
            let shown = result_ids
                .iter()
                .take(3)
                .copied()
                .collect::<Vec<_>>()
                .join(", ");
            let more = if result_ids.len() > 3 { "..." } else { "" };
            format!("Created {} {object_type}s: {shown}{more}", result_ids.len())
        }
    }
}
