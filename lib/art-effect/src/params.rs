//! Style parameters and their schemas
//!
//! Every style declares a fixed table of [`ParamSpec`]s. Caller-supplied values are
//! checked against that table before a single pixel is touched.

use crate::{ArtEffectError, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt};

pub type StyleParams = BTreeMap<String, ParamValue>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Color([u8; 3]),
    Text(String),
}

impl ParamValue {
    /// Interpret command-line text: `true`/`false`, integers, floats, `#RRGGBB`, else text.
    pub fn parse(text: &str) -> Self {
        let text = text.trim();

        if let Ok(v) = text.parse::<bool>() {
            return ParamValue::Bool(v);
        }
        if let Ok(v) = text.parse::<i64>() {
            return ParamValue::Int(v);
        }
        if let Ok(v) = text.parse::<f64>() {
            return ParamValue::Float(v);
        }
        if let Some(rgb) = parse_hex_color(text) {
            return ParamValue::Color(rgb);
        }

        ParamValue::Text(text.to_string())
    }

    fn type_name(&self) -> &'static str {
        match self {
            ParamValue::Bool(_) => "bool",
            ParamValue::Int(_) => "int",
            ParamValue::Float(_) => "float",
            ParamValue::Color(_) => "color",
            ParamValue::Text(_) => "text",
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Bool(v) => write!(f, "{v}"),
            ParamValue::Int(v) => write!(f, "{v}"),
            ParamValue::Float(v) => write!(f, "{v}"),
            ParamValue::Color(rgb) => f.write_str(&format_hex_color(*rgb)),
            ParamValue::Text(v) => write!(f, "\"{v}\""),
        }
    }
}

/// `#RRGGBB` (the leading `#` is optional).
pub fn parse_hex_color(text: &str) -> Option<[u8; 3]> {
    let hex = text.trim().strip_prefix('#').unwrap_or(text.trim());
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some([channel(0)?, channel(2)?, channel(4)?])
}

pub fn format_hex_color(rgb: [u8; 3]) -> String {
    format!("#{:02X}{:02X}{:02X}", rgb[0], rgb[1], rgb[2])
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamKind {
    Int { min: i64, max: i64 },
    Float { min: f64, max: f64 },
    Color,
    Bool,
    Choice(&'static [&'static str]),
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamKind::Int { min, max } => write!(f, "int {min}..={max}"),
            ParamKind::Float { min, max } => write!(f, "float {min:.1}..={max:.1}"),
            ParamKind::Color => f.write_str("color #RRGGBB"),
            ParamKind::Bool => f.write_str("bool"),
            ParamKind::Choice(options) => write!(f, "one of {}", options.join("|")),
        }
    }
}

/// Compile-time default of a parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamDefault {
    Int(i64),
    Float(f64),
    Color([u8; 3]),
    Bool(bool),
    Choice(&'static str),
}

impl ParamDefault {
    pub fn to_value(&self) -> ParamValue {
        match *self {
            ParamDefault::Int(v) => ParamValue::Int(v),
            ParamDefault::Float(v) => ParamValue::Float(v),
            ParamDefault::Color(v) => ParamValue::Color(v),
            ParamDefault::Bool(v) => ParamValue::Bool(v),
            ParamDefault::Choice(v) => ParamValue::Text(v.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub default: ParamDefault,
}

impl ParamSpec {
    pub const fn new(name: &'static str, kind: ParamKind, default: ParamDefault) -> Self {
        Self { name, kind, default }
    }
}

impl fmt::Display for ParamSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<20} {:<26} default {}", self.name, self.kind.to_string(), self.default.to_value())
    }
}

/// What to do with a numeric value outside its declared range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RangePolicy {
    #[default]
    Reject,
    Clamp,
}

/// A value that passed its schema check.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Checked {
    Int(i64),
    Float(f64),
    Color([u8; 3]),
    Bool(bool),
    Choice(&'static str),
}

/// Typed, range-checked access to one style's parameters.
pub struct ParamReader<'a> {
    style: &'a str,
    schema: &'a [ParamSpec],
    params: &'a StyleParams,
    policy: RangePolicy,
}

impl<'a> ParamReader<'a> {
    /// Checks every supplied value up front; unknown names are errors.
    pub fn new(
        style: &'a str,
        schema: &'a [ParamSpec],
        params: &'a StyleParams,
        policy: RangePolicy,
    ) -> Result<Self> {
        let reader = Self {
            style,
            schema,
            params,
            policy,
        };

        for (name, value) in params {
            let spec = schema
                .iter()
                .find(|s| s.name == name.as_str())
                .ok_or_else(|| reader.invalid(name, value, "unknown parameter"))?;
            reader.check(spec, value)?;
        }

        Ok(reader)
    }

    fn invalid(&self, name: &str, value: &ParamValue, reason: impl Into<String>) -> ArtEffectError {
        ArtEffectError::InvalidParameter {
            style: self.style.to_string(),
            name: name.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    fn check(&self, spec: &ParamSpec, value: &ParamValue) -> Result<Checked> {
        let wrong_type = || self.invalid(spec.name, value, format!("expected {}, got {}", spec.kind, value.type_name()));

        match spec.kind {
            ParamKind::Float { min, max } => {
                let v = match value {
                    ParamValue::Float(v) if v.is_finite() => *v,
                    ParamValue::Int(v) => *v as f64,
                    _ => return Err(wrong_type()),
                };

                if (min..=max).contains(&v) {
                    return Ok(Checked::Float(v));
                }
                match self.policy {
                    RangePolicy::Reject => Err(self.invalid(spec.name, value, format!("out of range {min}..={max}"))),
                    RangePolicy::Clamp => {
                        let clamped = v.clamp(min, max);
                        warn!("{}: clamped `{}` from {v} to {clamped}", self.style, spec.name);
                        Ok(Checked::Float(clamped))
                    }
                }
            }
            ParamKind::Int { min, max } => {
                let v = match value {
                    ParamValue::Int(v) => *v,
                    ParamValue::Float(v) if v.is_finite() && v.fract() == 0.0 => *v as i64,
                    _ => return Err(wrong_type()),
                };

                if (min..=max).contains(&v) {
                    return Ok(Checked::Int(v));
                }
                match self.policy {
                    RangePolicy::Reject => Err(self.invalid(spec.name, value, format!("out of range {min}..={max}"))),
                    RangePolicy::Clamp => {
                        let clamped = v.clamp(min, max);
                        warn!("{}: clamped `{}` from {v} to {clamped}", self.style, spec.name);
                        Ok(Checked::Int(clamped))
                    }
                }
            }
            ParamKind::Color => match value {
                ParamValue::Color(rgb) => Ok(Checked::Color(*rgb)),
                ParamValue::Text(text) => parse_hex_color(text)
                    .map(Checked::Color)
                    .ok_or_else(|| self.invalid(spec.name, value, "expected #RRGGBB")),
                _ => Err(wrong_type()),
            },
            ParamKind::Bool => match value {
                ParamValue::Bool(v) => Ok(Checked::Bool(*v)),
                _ => Err(wrong_type()),
            },
            ParamKind::Choice(options) => match value {
                ParamValue::Text(text) => options
                    .iter()
                    .find(|o| o.eq_ignore_ascii_case(text.trim()))
                    .map(|o| Checked::Choice(*o))
                    .ok_or_else(|| self.invalid(spec.name, value, format!("expected one of {}", options.join("|")))),
                _ => Err(wrong_type()),
            },
        }
    }

    fn resolve(&self, name: &str) -> Result<Checked> {
        let spec = self
            .schema
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| ArtEffectError::Processing(format!("{} has no parameter `{name}`", self.style)))?;

        match self.params.get(name) {
            Some(value) => self.check(spec, value),
            None => self.check(spec, &spec.default.to_value()),
        }
    }

    fn mismatch(&self, name: &str) -> ArtEffectError {
        ArtEffectError::Processing(format!("{}: `{name}` read with the wrong type", self.style))
    }

    pub fn float(&self, name: &str) -> Result<f64> {
        match self.resolve(name)? {
            Checked::Float(v) => Ok(v),
            _ => Err(self.mismatch(name)),
        }
    }

    pub fn int(&self, name: &str) -> Result<i64> {
        match self.resolve(name)? {
            Checked::Int(v) => Ok(v),
            _ => Err(self.mismatch(name)),
        }
    }

    pub fn color(&self, name: &str) -> Result<[u8; 3]> {
        match self.resolve(name)? {
            Checked::Color(v) => Ok(v),
            _ => Err(self.mismatch(name)),
        }
    }

    pub fn flag(&self, name: &str) -> Result<bool> {
        match self.resolve(name)? {
            Checked::Bool(v) => Ok(v),
            _ => Err(self.mismatch(name)),
        }
    }

    pub fn choice(&self, name: &str) -> Result<&'static str> {
        match self.resolve(name)? {
            Checked::Choice(v) => Ok(v),
            _ => Err(self.mismatch(name)),
        }
    }

    /// Error for a value that is well-typed and in range but still unusable.
    pub fn reject(&self, name: &str, reason: &str) -> ArtEffectError {
        let value = self
            .params
            .get(name)
            .cloned()
            .unwrap_or(ParamValue::Text(String::new()));
        self.invalid(name, &value, reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA: &[ParamSpec] = &[
        ParamSpec::new("ratio", ParamKind::Float { min: 0.0, max: 1.0 }, ParamDefault::Float(0.5)),
        ParamSpec::new("count", ParamKind::Int { min: 1, max: 5 }, ParamDefault::Int(2)),
        ParamSpec::new("tint", ParamKind::Color, ParamDefault::Color([255, 0, 0])),
        ParamSpec::new("legacy", ParamKind::Bool, ParamDefault::Bool(false)),
        ParamSpec::new("mode", ParamKind::Choice(&["self", "inverted"]), ParamDefault::Choice("self")),
    ];

    fn params(pairs: &[(&str, ParamValue)]) -> StyleParams {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn test_parse_text() {
        assert_eq!(ParamValue::parse("true"), ParamValue::Bool(true));
        assert_eq!(ParamValue::parse("12"), ParamValue::Int(12));
        assert_eq!(ParamValue::parse("0.25"), ParamValue::Float(0.25));
        assert_eq!(ParamValue::parse("#00ff80"), ParamValue::Color([0, 255, 128]));
        assert_eq!(ParamValue::parse("inverted"), ParamValue::Text("inverted".to_string()));
    }

    #[test]
    fn test_hex_color() {
        assert_eq!(parse_hex_color("#FF0000"), Some([255, 0, 0]));
        assert_eq!(parse_hex_color("00FF00"), Some([0, 255, 0]));
        assert_eq!(parse_hex_color("#FF00"), None);
        assert_eq!(parse_hex_color("#GG0000"), None);
        assert_eq!(format_hex_color([1, 171, 255]), "#01ABFF");
    }

    #[test]
    fn test_defaults() {
        let empty = StyleParams::new();
        let reader = ParamReader::new("Test", SCHEMA, &empty, RangePolicy::Reject).unwrap();

        assert_eq!(reader.float("ratio").unwrap(), 0.5);
        assert_eq!(reader.int("count").unwrap(), 2);
        assert_eq!(reader.color("tint").unwrap(), [255, 0, 0]);
        assert!(!reader.flag("legacy").unwrap());
        assert_eq!(reader.choice("mode").unwrap(), "self");
    }

    #[test]
    fn test_out_of_range_rejected() {
        let p = params(&[("ratio", ParamValue::Float(1.5))]);
        let err = ParamReader::new("Test", SCHEMA, &p, RangePolicy::Reject).err().unwrap();

        match err {
            ArtEffectError::InvalidParameter { style, name, value, .. } => {
                assert_eq!(style, "Test");
                assert_eq!(name, "ratio");
                assert_eq!(value, "1.5");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_out_of_range_clamped() {
        let p = params(&[("ratio", ParamValue::Float(1.5)), ("count", ParamValue::Int(-3))]);
        let reader = ParamReader::new("Test", SCHEMA, &p, RangePolicy::Clamp).unwrap();

        assert_eq!(reader.float("ratio").unwrap(), 1.0);
        assert_eq!(reader.int("count").unwrap(), 1);
    }

    #[test]
    fn test_type_coercions() {
        let p = params(&[
            ("ratio", ParamValue::Int(1)),
            ("count", ParamValue::Float(3.0)),
            ("tint", ParamValue::Text("#0000FF".to_string())),
            ("mode", ParamValue::Text("Inverted".to_string())),
        ]);
        let reader = ParamReader::new("Test", SCHEMA, &p, RangePolicy::Reject).unwrap();

        assert_eq!(reader.float("ratio").unwrap(), 1.0);
        assert_eq!(reader.int("count").unwrap(), 3);
        assert_eq!(reader.color("tint").unwrap(), [0, 0, 255]);
        assert_eq!(reader.choice("mode").unwrap(), "inverted");
    }

    #[test]
    fn test_wrong_types_rejected_under_both_policies() {
        let cases = [
            ("count", ParamValue::Float(2.5)),
            ("ratio", ParamValue::Text("half".to_string())),
            ("tint", ParamValue::Int(3)),
            ("legacy", ParamValue::Int(1)),
            ("mode", ParamValue::Text("sideways".to_string())),
            ("nope", ParamValue::Int(1)),
        ];

        for (name, value) in cases {
            let p = params(&[(name, value)]);
            for policy in [RangePolicy::Reject, RangePolicy::Clamp] {
                assert!(matches!(
                    ParamReader::new("Test", SCHEMA, &p, policy),
                    Err(ArtEffectError::InvalidParameter { .. })
                ));
            }
        }
    }
}
