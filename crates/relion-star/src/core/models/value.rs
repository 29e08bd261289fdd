use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The value type shared by every cell of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Int,
    Float,
    Str,
}

impl ColumnType {
    /// Infers the narrowest type that can hold `raw`.
    ///
    /// Integer literals that overflow `i64` are promoted to `Float` rather than
    /// being kept as strings, so large counters still sort numerically.
    pub fn infer(raw: &str) -> Self {
        if is_int_literal(raw) {
            if raw.parse::<i64>().is_ok() {
                ColumnType::Int
            } else {
                ColumnType::Float
            }
        } else if is_float_literal(raw) {
            ColumnType::Float
        } else {
            ColumnType::Str
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ColumnType::Int => "int",
            ColumnType::Float => "float",
            ColumnType::Str => "str",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnType::Int | ColumnType::Float)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unknown column type '{0}'. Expected 'int', 'float' or 'str'.")]
pub struct UnknownColumnType(pub String);

impl FromStr for ColumnType {
    type Err = UnknownColumnType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "int" | "integer" => Ok(ColumnType::Int),
            "float" | "double" | "real" => Ok(ColumnType::Float),
            "str" | "string" | "text" => Ok(ColumnType::Str),
            _ => Err(UnknownColumnType(s.to_string())),
        }
    }
}

/// Returned by the strict per-variant accessors of [`Value`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("expected {expected} value, found {found}")]
pub struct ValueTypeError {
    pub expected: ColumnType,
    pub found: ColumnType,
}

/// A single cell of a STAR table.
///
/// The variant is fixed when the value is created, either by the parser after
/// inferring the column type or by the caller. There is no implicit conversion
/// between variants apart from [`Value::as_f64`], which widens integers.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(String),
}

impl Value {
    pub fn column_type(&self) -> ColumnType {
        match self {
            Value::Int(_) => ColumnType::Int,
            Value::Float(_) => ColumnType::Float,
            Value::Str(_) => ColumnType::Str,
        }
    }

    pub fn as_int(&self) -> Result<i64, ValueTypeError> {
        match self {
            Value::Int(v) => Ok(*v),
            other => Err(other.mismatch(ColumnType::Int)),
        }
    }

    pub fn as_float(&self) -> Result<f64, ValueTypeError> {
        match self {
            Value::Float(v) => Ok(*v),
            other => Err(other.mismatch(ColumnType::Float)),
        }
    }

    pub fn as_str(&self) -> Result<&str, ValueTypeError> {
        match self {
            Value::Str(v) => Ok(v),
            other => Err(other.mismatch(ColumnType::Str)),
        }
    }

    /// Reads any numeric value as `f64`; strings are rejected.
    pub fn as_f64(&self) -> Result<f64, ValueTypeError> {
        match self {
            Value::Int(v) => Ok(*v as f64),
            Value::Float(v) => Ok(*v),
            Value::Str(_) => Err(self.mismatch(ColumnType::Float)),
        }
    }

    /// Converts raw text into a value of the requested type.
    ///
    /// Returns `None` when `raw` is not a valid literal for `kind`. Integer
    /// literals are accepted for float columns.
    pub fn coerce(raw: &str, kind: ColumnType) -> Option<Value> {
        match kind {
            ColumnType::Int => {
                if is_int_literal(raw) {
                    raw.parse().ok().map(Value::Int)
                } else {
                    None
                }
            }
            ColumnType::Float => {
                if is_int_literal(raw) || is_float_literal(raw) {
                    raw.parse().ok().map(Value::Float)
                } else {
                    None
                }
            }
            ColumnType::Str => Some(Value::Str(raw.to_string())),
        }
    }

    fn mismatch(&self, expected: ColumnType) -> ValueTypeError {
        ValueTypeError {
            expected,
            found: self.column_type(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Str(v) => f.write_str(v),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn strip_sign(s: &str) -> &str {
    s.strip_prefix(['+', '-']).unwrap_or(s)
}

pub(crate) fn is_int_literal(raw: &str) -> bool {
    all_digits(strip_sign(raw))
}

/// Matches decimal and scientific literals plus `nan`/`inf`/`infinity`.
///
/// A bare integer is not a float literal; callers check integers first.
pub(crate) fn is_float_literal(raw: &str) -> bool {
    let body = strip_sign(raw);
    if ["nan", "inf", "infinity"]
        .iter()
        .any(|special| body.eq_ignore_ascii_case(special))
    {
        return true;
    }

    let (mantissa, exponent) = match body.find(['e', 'E']) {
        Some(pos) => (&body[..pos], Some(&body[pos + 1..])),
        None => (body, None),
    };
    let (int_part, frac_part) = match mantissa.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (mantissa, None),
    };

    if frac_part.is_none() && exponent.is_none() {
        return false;
    }
    let int_ok = int_part.is_empty() || all_digits(int_part);
    let frac_ok = frac_part.is_none_or(|f| f.is_empty() || all_digits(f));
    let has_digits = !int_part.is_empty() || frac_part.is_some_and(|f| !f.is_empty());
    let exp_ok = exponent.is_none_or(|e| all_digits(strip_sign(e)));

    int_ok && frac_ok && has_digits && exp_ok
}
