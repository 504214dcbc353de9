//! Core window engine data types.
//!
//! This module contains the fundamental data types used throughout the window
//! evaluation engine:
//! - [`FieldValue`] - The value type system supporting SQL scalar types
//! - [`Row`] - The row format consumed and produced by the engine
//! - [`Schema`] - Ordered column definitions used for validation and output

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A value in a row field
///
/// This enum represents the SQL scalar types supported by the window engine.
/// `Null` is a first-class value: aggregates skip it, ordering places it
/// according to the order key's null placement, and partition grouping treats
/// two `Null`s as equal.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// 64-bit signed integer
    Integer(i64),
    /// 64-bit floating point number
    Float(f64),
    /// UTF-8 string
    String(String),
    /// Boolean value (true/false)
    Boolean(bool),
    /// SQL NULL value
    Null,
    /// Date type (YYYY-MM-DD)
    Date(NaiveDate),
    /// Timestamp type (YYYY-MM-DD HH:MM:SS[.nnn])
    Timestamp(NaiveDateTime),
}

/// Display implementation for FieldValue for clean string formatting
impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => write!(f, "NULL"),
            FieldValue::Integer(i) => write!(f, "{}", i),
            FieldValue::Float(v) => write!(f, "{}", v),
            FieldValue::String(s) => write!(f, "{}", s),
            FieldValue::Boolean(b) => write!(f, "{}", b),
            FieldValue::Date(d) => write!(f, "{}", d),
            FieldValue::Timestamp(t) => write!(f, "{}", t),
        }
    }
}

/// Hash implementation for FieldValue so values can form partition keys.
///
/// Special handling for f64 (Float) using bit representation to make it
/// hashable. This handles NaN, infinity, and -0.0 deterministically.
impl Hash for FieldValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Hash discriminant first to distinguish variants
        std::mem::discriminant(self).hash(state);

        match self {
            FieldValue::Integer(i) => i.hash(state),
            FieldValue::Float(f) => {
                f.to_bits().hash(state);
            }
            FieldValue::String(s) => s.hash(state),
            FieldValue::Boolean(b) => b.hash(state),
            FieldValue::Null => {}
            FieldValue::Date(d) => {
                d.year().hash(state);
                d.month().hash(state);
                d.day().hash(state);
            }
            FieldValue::Timestamp(ts) => {
                ts.and_utc().timestamp_millis().hash(state);
            }
        }
    }
}

impl FieldValue {
    /// Get the type name for error messages and validation
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Integer(_) => "INTEGER",
            FieldValue::Float(_) => "FLOAT",
            FieldValue::String(_) => "STRING",
            FieldValue::Boolean(_) => "BOOLEAN",
            FieldValue::Null => "NULL",
            FieldValue::Date(_) => "DATE",
            FieldValue::Timestamp(_) => "TIMESTAMP",
        }
    }

    /// Check if this value represents a numeric type
    ///
    /// Returns true for integers and floats that can be used in arithmetic.
    pub fn is_numeric(&self) -> bool {
        matches!(self, FieldValue::Integer(_) | FieldValue::Float(_))
    }

    /// Convert a numeric value to f64 for arithmetic; None for everything else
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Integer(i) => Some(*i as f64),
            FieldValue::Float(f) => Some(*f),
            _ => None,
        }
    }
}

/// Compare field values for ordering.
///
/// Nulls sort lowest here; order keys re-place them per their null placement
/// before falling through to this comparison. Integers and floats compare
/// numerically across variants. Values of unrelated types compare equal so a
/// mixed-type sort is a no-op rather than a panic.
pub(crate) fn compare_field_values(a: &FieldValue, b: &FieldValue) -> Ordering {
    use FieldValue::*;

    match (a, b) {
        (Null, Null) => Ordering::Equal,
        (Null, _) => Ordering::Less,
        (_, Null) => Ordering::Greater,
        (Integer(a), Integer(b)) => a.cmp(b),
        (Float(a), Float(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
        (Integer(a), Float(b)) => (*a as f64).partial_cmp(b).unwrap_or(Ordering::Equal),
        (Float(a), Integer(b)) => a.partial_cmp(&(*b as f64)).unwrap_or(Ordering::Equal),
        (String(a), String(b)) => a.cmp(b),
        (Boolean(a), Boolean(b)) => a.cmp(b),
        (Date(a), Date(b)) => a.cmp(b),
        (Timestamp(a), Timestamp(b)) => a.cmp(b),
        (Date(a), Timestamp(b)) => a.and_hms_opt(0, 0, 0).map(|t| t.cmp(b)).unwrap_or(Ordering::Equal),
        (Timestamp(a), Date(b)) => b.and_hms_opt(0, 0, 0).map(|t| a.cmp(&t)).unwrap_or(Ordering::Equal),
        _ => Ordering::Equal,
    }
}

/// Custom Serialize implementation for FieldValue
///
/// Serialization format is JSON-friendly:
/// - Timestamp → ISO format string with milliseconds
/// - Date → YYYY-MM-DD string
/// - Null → JSON null
impl Serialize for FieldValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            FieldValue::Integer(i) => serializer.serialize_i64(*i),
            FieldValue::Float(f) => serializer.serialize_f64(*f),
            FieldValue::String(s) => serializer.serialize_str(s),
            FieldValue::Boolean(b) => serializer.serialize_bool(*b),
            FieldValue::Null => serializer.serialize_none(),
            FieldValue::Date(d) => serializer.serialize_str(&d.format("%Y-%m-%d").to_string()),
            FieldValue::Timestamp(ts) => {
                serializer.serialize_str(&ts.format("%Y-%m-%d %H:%M:%S%.3f").to_string())
            }
        }
    }
}

/// Custom Deserialize implementation for FieldValue
///
/// Deserialization mapping:
/// - JSON number (i64) → Integer
/// - JSON number (f64) → Float
/// - JSON string → String (with Date/Timestamp detection for temporal patterns)
/// - JSON bool → Boolean
/// - JSON null → Null
impl<'de> Deserialize<'de> for FieldValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(FieldValueVisitor)
    }
}

/// Try to parse a string as a Date or Timestamp.
///
/// Returns Some(FieldValue::Date) for "YYYY-MM-DD" and
/// Some(FieldValue::Timestamp) for "YYYY-MM-DD HH:MM:SS[.nnn]", matching the
/// Serialize output so temporal values round-trip through JSON. Returns None
/// for anything else.
#[inline]
fn try_parse_temporal(s: &str) -> Option<FieldValue> {
    // Cheap shape check before handing off to chrono
    if s.len() < 10 || !s.as_bytes()[..4].iter().all(|b| b.is_ascii_digit()) {
        return None;
    }

    if s.len() == 10 {
        if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return Some(FieldValue::Date(d));
        }
        return None;
    }

    for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(FieldValue::Timestamp(ts));
        }
    }
    None
}

/// Visitor for deserializing FieldValue from any JSON scalar
struct FieldValueVisitor;

impl<'de> Visitor<'de> for FieldValueVisitor {
    type Value = FieldValue;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a JSON scalar (string, number, bool, or null)")
    }

    fn visit_bool<E>(self, v: bool) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(FieldValue::Boolean(v))
    }

    fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(FieldValue::Integer(v))
    }

    fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        // Convert u64 to i64 if it fits, otherwise to Float
        if v <= i64::MAX as u64 {
            Ok(FieldValue::Integer(v as i64))
        } else {
            Ok(FieldValue::Float(v as f64))
        }
    }

    fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(FieldValue::Float(v))
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        if let Some(result) = try_parse_temporal(v) {
            return Ok(result);
        }
        Ok(FieldValue::String(v.to_owned()))
    }

    fn visit_string<E>(self, v: String) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        // Check before consuming the String to avoid allocation on the temporal path
        if let Some(result) = try_parse_temporal(&v) {
            return Ok(result);
        }
        Ok(FieldValue::String(v))
    }

    fn visit_none<E>(self) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(FieldValue::Null)
    }

    fn visit_unit<E>(self) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(FieldValue::Null)
    }
}

/// A row of named field values
///
/// Rows are the unit of data flowing through the engine. Input rows are
/// treated as read-only; output rows carry the input fields plus one entry
/// per computed window column. Column order is defined by the [`Schema`],
/// not by the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    /// Field name → value
    pub fields: HashMap<String, FieldValue>,
}

impl Row {
    /// Create a new row with the given fields
    pub fn new(fields: HashMap<String, FieldValue>) -> Self {
        Self { fields }
    }

    /// Borrow a field value by column name
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Resolve a column to an owned value, treating a missing field as NULL
    pub fn column(&self, name: &str) -> FieldValue {
        self.fields.get(name).cloned().unwrap_or(FieldValue::Null)
    }
}

/// Column data types for schema validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Integer,
    Float,
    String,
    Boolean,
    Date,
    Timestamp,
}

impl ColumnType {
    /// Whether values of this type participate in numeric arithmetic
    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnType::Integer | ColumnType::Float)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Integer => write!(f, "INTEGER"),
            ColumnType::Float => write!(f, "FLOAT"),
            ColumnType::String => write!(f, "STRING"),
            ColumnType::Boolean => write!(f, "BOOLEAN"),
            ColumnType::Date => write!(f, "DATE"),
            ColumnType::Timestamp => write!(f, "TIMESTAMP"),
        }
    }
}

/// A named, typed column definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Column name, unique within a schema
    pub name: String,
    /// Declared data type
    pub data_type: ColumnType,
    /// Whether NULL values are expected in this column
    pub nullable: bool,
}

impl Column {
    /// Create a nullable column (the common case for analytical inputs)
    pub fn new(name: impl Into<String>, data_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable: true,
        }
    }

    /// Mark the column as NOT NULL
    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }
}

/// Ordered column definitions for a row set
///
/// The schema drives setup-time validation (unknown column references,
/// non-numeric aggregate arguments) and defines the column order of the
/// output: input columns first, computed window columns after, in request
/// order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Columns in output order
    pub columns: Vec<Column>,
}

impl Schema {
    /// Create a schema from an ordered column list
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    /// Look up a column definition by name
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Check whether a column exists
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    /// Column names in schema order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }
}
