use std::fmt::{self, Display};
use std::hash::{Hash, Hasher};
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Markers read as a missing value. `NaN` is not one of them: it is a
/// present float, written for undefined ratios.
pub const MISSING_MARKERS: [&str; 2] = ["", "NA"];

/// Declared type of a metadata column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ColumnType {
    Int,
    Float,
    Str,
    #[cfg_attr(feature = "serde", serde(rename = "cat"))]
    Categorical,
}

impl ColumnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Int => "int",
            ColumnType::Float => "float",
            ColumnType::Str => "str",
            ColumnType::Categorical => "cat",
        }
    }
}

impl FromStr for ColumnType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "int" | "integer" => Ok(ColumnType::Int),
            "float" | "double" | "numeric" => Ok(ColumnType::Float),
            "str" | "string" | "character" => Ok(ColumnType::Str),
            "cat" | "categorical" | "factor" => Ok(ColumnType::Categorical),
            other => Err(format!("unknown column type: {}", other)),
        }
    }
}

impl Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A present metadata value. Missing values are represented as `None`
/// wherever a `Value` is stored.
///
/// Equality and hashing treat floats by bit pattern, with all NaNs equal and
/// `-0.0 == 0.0`, so values can serve as group keys.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(String),
}

fn float_bits(f: f64) -> u64 {
    if f.is_nan() {
        f64::NAN.to_bits()
    } else if f == 0.0 {
        0.0f64.to_bits()
    } else {
        f.to_bits()
    }
}

impl Value {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::Str(_) => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
        }
    }

    pub fn matches(&self, dtype: ColumnType) -> bool {
        matches!(
            (self, dtype),
            (Value::Int(_), ColumnType::Int)
                | (Value::Float(_), ColumnType::Float)
                | (Value::Str(_), ColumnType::Str)
                | (Value::Str(_), ColumnType::Categorical)
        )
    }

    ///
    /// Parse a raw TSV field into a value of the given type.
    ///
    /// Missing markers (`""`, `NA`) yield `Ok(None)`.
    pub fn parse(raw: &str, dtype: ColumnType) -> Result<Option<Value>, String> {
        let raw = raw.trim();
        if MISSING_MARKERS.contains(&raw) {
            return Ok(None);
        }
        match dtype {
            ColumnType::Int => raw
                .parse::<i64>()
                .map(|i| Some(Value::Int(i)))
                .map_err(|_| format!("expected an integer, found {:?}", raw)),
            ColumnType::Float => raw
                .parse::<f64>()
                .map(|f| Some(Value::Float(f)))
                .map_err(|_| format!("expected a number, found {:?}", raw)),
            ColumnType::Str | ColumnType::Categorical => Ok(Some(Value::Str(raw.to_string()))),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => float_bits(*a) == float_bits(*b),
            (Value::Str(a), Value::Str(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Value::Int(i) => {
                0u8.hash(state);
                i.hash(state);
            }
            Value::Float(f) => {
                1u8.hash(state);
                float_bits(*f).hash(state);
            }
            Value::Str(s) => {
                2u8.hash(state);
                s.hash(state);
            }
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(v) if v.is_infinite() && *v > 0.0 => write!(f, "Inf"),
            Value::Float(v) if v.is_infinite() => write!(f, "-Inf"),
            Value::Float(v) => write!(f, "{}", v),
            Value::Str(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

/// Render an optional value as a TSV field; missing becomes `NA`.
pub fn format_field(value: Option<&Value>) -> String {
    value.map_or_else(|| "NA".to_string(), |v| v.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;
    use std::collections::HashSet;

    #[rstest]
    fn test_parse_missing_markers() {
        for raw in ["", "NA"] {
            assert_eq!(Value::parse(raw, ColumnType::Float).unwrap(), None);
        }
    }

    #[rstest]
    #[case("NaN", f64::NAN)]
    #[case("Inf", f64::INFINITY)]
    #[case("-Inf", f64::NEG_INFINITY)]
    fn test_parse_float_sentinels(#[case] raw: &str, #[case] expected: f64) {
        assert_eq!(
            Value::parse(raw, ColumnType::Float).unwrap(),
            Some(Value::Float(expected))
        );
    }

    #[rstest]
    fn test_parse_typed_values() {
        assert_eq!(
            Value::parse("3", ColumnType::Int).unwrap(),
            Some(Value::Int(3))
        );
        assert_eq!(
            Value::parse("-1.5", ColumnType::Float).unwrap(),
            Some(Value::Float(-1.5))
        );
        assert_eq!(
            Value::parse("ENSG1", ColumnType::Categorical).unwrap(),
            Some(Value::Str("ENSG1".to_string()))
        );
        assert!(Value::parse("abc", ColumnType::Int).is_err());
    }

    #[rstest]
    fn test_float_key_equality() {
        let mut set = HashSet::new();
        set.insert(Value::Float(0.0));
        set.insert(Value::Float(-0.0));
        set.insert(Value::Float(f64::NAN));
        set.insert(Value::Float(f64::NAN));
        assert_eq!(set.len(), 2);
        assert_ne!(Value::Int(1), Value::Float(1.0));
    }

    #[rstest]
    fn test_format_field() {
        assert_eq!(format_field(None), "NA");
        assert_eq!(format_field(Some(&Value::Float(f64::INFINITY))), "Inf");
        assert_eq!(format_field(Some(&Value::Float(2.5))), "2.5");
    }
}
