//! Inline values: the leaves and nested literals of a module document.
//!
//! Everything that is written on a single line without layout of its own
//! (type references, attribute lists, constant values, ...) is an
//! [`InlineValue`]. The set of kinds is closed: a document value that does
//! not fit one of these variants is rejected while decoding.

/// A value written inline by the emitter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InlineValue {
    /// `null`
    Null,
    /// `true` / `false`
    Bool(bool),
    /// A decimal integer. Wide enough for every signed and unsigned 64-bit value.
    Int(i128),
    /// A string, written between double quotes without escaping
    Str(String),
    /// `[a,b,...]`
    Array(Vec<InlineValue>),
    /// `{"k":v,...}` with keys kept in document order
    Object(Vec<(String, InlineValue)>),
}

impl InlineValue {
    /// Short name of the value's kind, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            InlineValue::Null => "null",
            InlineValue::Bool(_) => "bool",
            InlineValue::Int(_) => "integer",
            InlineValue::Str(_) => "string",
            InlineValue::Array(_) => "array",
            InlineValue::Object(_) => "object",
        }
    }

    /// Borrow the text of a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            InlineValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Look up a key of an object value.
    pub fn get(&self, key: &str) -> Option<&InlineValue> {
        match self {
            InlineValue::Object(entries) => entries
                .iter()
                .find(|(name, _)| name == key)
                .map(|(_, value)| value),
            _ => None,
        }
    }
}

impl From<bool> for InlineValue {
    fn from(value: bool) -> Self {
        InlineValue::Bool(value)
    }
}

impl From<i64> for InlineValue {
    fn from(value: i64) -> Self {
        InlineValue::Int(i128::from(value))
    }
}

impl From<u64> for InlineValue {
    fn from(value: u64) -> Self {
        InlineValue::Int(i128::from(value))
    }
}

impl From<&str> for InlineValue {
    fn from(value: &str) -> Self {
        InlineValue::Str(value.to_string())
    }
}

impl From<String> for InlineValue {
    fn from(value: String) -> Self {
        InlineValue::Str(value)
    }
}

impl<T: Into<InlineValue>> From<Vec<T>> for InlineValue {
    fn from(values: Vec<T>) -> Self {
        InlineValue::Array(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<InlineValue>> From<Option<T>> for InlineValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(InlineValue::Null, Into::into)
    }
}
