//! Module document -> typed tree.
//!
//! Decoding walks the parsed JSON once and builds an [`ApiModule`]. Every
//! shape problem is reported with a `$.Types[2].Values[0].Value` style path
//! so the offending spot in a multi-megabyte document can be found directly.
//! Fields the tree does not model are ignored; fields it does model must be
//! present and of the right kind.

use serde_json::{Map, Number, Value};

use crate::error::{EmissionError, EmitResult};
use crate::model::{
    ApiModule, ComMethod, ComType, Constant, EnumType, EnumValue, Field, Param, RecordType,
    TypeDecl, TypeKind,
};
use crate::value::InlineValue;

const ROOT_PATH: &str = "$";

impl ApiModule {
    /// Parse and decode a module document.
    pub fn from_json(text: &str) -> EmitResult<Self> {
        let document: Value = serde_json::from_str(text)?;
        Self::from_value(&document)
    }

    /// Decode an already parsed module document.
    pub fn from_value(document: &Value) -> EmitResult<Self> {
        let root = Node::new(document, ROOT_PATH.to_string())?;

        Ok(Self {
            constants: root.records("Constants", decode_constant)?,
            types: root.records("Types", decode_type)?,
            deferred_functions: root.deferred_len("Functions")?,
            deferred_unicode_aliases: root.deferred_len("UnicodeAliases")?,
        })
    }
}

fn decode_constant(node: &Node<'_>) -> EmitResult<Constant> {
    Ok(Constant {
        name: node.string("Name")?,
        ty: node.inline("Type")?,
        value_type: node.string("ValueType")?,
        value: node.inline("Value")?,
        attrs: node.inline_list("Attrs")?,
    })
}

fn decode_type(node: &Node<'_>) -> EmitResult<TypeDecl> {
    let name = node.string("Name")?;
    let architectures = node.inline("Architectures")?;
    let platform = node.inline("Platform")?;
    let kind = node.string("Kind")?;

    let kind = match kind.as_str() {
        "Enum" => TypeKind::Enum(EnumType {
            flags: node.boolean("Flags")?,
            scoped: node.boolean("Scoped")?,
            values: node.records("Values", decode_enum_value)?,
            integer_base: node.inline("IntegerBase")?,
        }),
        "Struct" => TypeKind::Struct(decode_record_type(node)?),
        "Union" => TypeKind::Union(decode_record_type(node)?),
        "Com" => TypeKind::Com(ComType {
            guid: node.inline("Guid")?,
            interface: node.inline("Interface")?,
            methods: node.records("Methods", decode_method)?,
        }),
        other => {
            return Err(EmissionError::UnknownVariantKind {
                path: node.path.clone(),
                kind: other.to_string(),
            });
        }
    };

    Ok(TypeDecl {
        name,
        architectures,
        platform,
        kind,
    })
}

fn decode_record_type(node: &Node<'_>) -> EmitResult<RecordType> {
    Ok(RecordType {
        size: node.integer("Size")?,
        packing_size: node.integer("PackingSize")?,
        fields: node.records("Fields", decode_field)?,
        nested_types: node.records("NestedTypes", decode_type)?,
    })
}

fn decode_enum_value(node: &Node<'_>) -> EmitResult<EnumValue> {
    Ok(EnumValue {
        name: node.string("Name")?,
        value: node.inline("Value")?,
    })
}

fn decode_field(node: &Node<'_>) -> EmitResult<Field> {
    Ok(Field {
        name: node.string("Name")?,
        ty: node.inline("Type")?,
        attrs: node.inline_list("Attrs")?,
    })
}

fn decode_method(node: &Node<'_>) -> EmitResult<ComMethod> {
    Ok(ComMethod {
        name: node.string("Name")?,
        set_last_error: node.boolean("SetLastError")?,
        return_type: node.inline("ReturnType")?,
        architectures: node.inline("Architectures")?,
        platform: node.inline("Platform")?,
        attrs: node.inline_list("Attrs")?,
        params: node.records("Params", decode_param)?,
    })
}

fn decode_param(node: &Node<'_>) -> EmitResult<Param> {
    Ok(Param {
        name: node.string("Name")?,
        ty: node.inline("Type")?,
        attrs: node.inline_list("Attrs")?,
    })
}

/// A JSON object being decoded, together with its location.
struct Node<'a> {
    map: &'a Map<String, Value>,
    path: String,
}

impl<'a> Node<'a> {
    fn new(value: &'a Value, path: String) -> EmitResult<Self> {
        match value {
            Value::Object(map) => Ok(Self { map, path }),
            other => Err(unexpected(path, "object", other)),
        }
    }

    fn child_path(&self, field: &str) -> String {
        format!("{}.{field}", self.path)
    }

    fn get(&self, field: &'static str) -> EmitResult<&'a Value> {
        self.map
            .get(field)
            .ok_or_else(|| EmissionError::MissingField {
                path: self.path.clone(),
                field,
            })
    }

    fn string(&self, field: &'static str) -> EmitResult<String> {
        match self.get(field)? {
            Value::String(s) => Ok(s.clone()),
            other => Err(unexpected(self.child_path(field), "string", other)),
        }
    }

    fn boolean(&self, field: &'static str) -> EmitResult<bool> {
        match self.get(field)? {
            Value::Bool(b) => Ok(*b),
            other => Err(unexpected(self.child_path(field), "bool", other)),
        }
    }

    fn integer(&self, field: &'static str) -> EmitResult<i64> {
        let path = self.child_path(field);
        match self.get(field)? {
            Value::Number(n) => n
                .as_i64()
                .ok_or_else(|| not_an_integer(n, path, "64-bit signed integer")),
            other => Err(unexpected(path, "integer", other)),
        }
    }

    fn inline(&self, field: &'static str) -> EmitResult<InlineValue> {
        inline_value(self.get(field)?, &self.child_path(field))
    }

    fn inline_list(&self, field: &'static str) -> EmitResult<Vec<InlineValue>> {
        let path = self.child_path(field);
        match self.get(field)? {
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(index, item)| inline_value(item, &format!("{path}[{index}]")))
                .collect(),
            other => Err(unexpected(path, "array", other)),
        }
    }

    fn records<T>(
        &self,
        field: &'static str,
        decode: fn(&Node<'_>) -> EmitResult<T>,
    ) -> EmitResult<Vec<T>> {
        let path = self.child_path(field);
        match self.get(field)? {
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(index, item)| decode(&Node::new(item, format!("{path}[{index}]"))?))
                .collect(),
            other => Err(unexpected(path, "array", other)),
        }
    }

    /// Length of a section that is parsed but not emitted yet.
    fn deferred_len(&self, field: &'static str) -> EmitResult<usize> {
        match self.map.get(field) {
            None => Ok(0),
            Some(Value::Array(items)) => Ok(items.len()),
            Some(other) => Err(unexpected(self.child_path(field), "array", other)),
        }
    }
}

fn inline_value(value: &Value, path: &str) -> EmitResult<InlineValue> {
    Ok(match value {
        Value::Null => InlineValue::Null,
        Value::Bool(b) => InlineValue::Bool(*b),
        Value::Number(n) => InlineValue::Int(integer_value(n, path)?),
        Value::String(s) => InlineValue::Str(s.clone()),
        Value::Array(items) => InlineValue::Array(
            items
                .iter()
                .enumerate()
                .map(|(index, item)| inline_value(item, &format!("{path}[{index}]")))
                .collect::<EmitResult<_>>()?,
        ),
        Value::Object(map) => InlineValue::Object(
            map.iter()
                .map(|(key, item)| -> EmitResult<(String, InlineValue)> {
                    Ok((key.clone(), inline_value(item, &format!("{path}.{key}"))?))
                })
                .collect::<EmitResult<_>>()?,
        ),
    })
}

fn integer_value(n: &Number, path: &str) -> EmitResult<i128> {
    n.as_i64()
        .map(i128::from)
        .or_else(|| n.as_u64().map(i128::from))
        .ok_or_else(|| not_an_integer(n, path.to_string(), "64-bit integer"))
}

/// Error for a number that did not fit the integer range asked for.
fn not_an_integer(n: &Number, path: String, expected: &'static str) -> EmissionError {
    if has_fraction(n) {
        EmissionError::UnsupportedValueKind {
            path,
            kind: "float",
        }
    } else {
        EmissionError::UnexpectedValueKind {
            path,
            expected,
            found: "integer out of range",
        }
    }
}

/// Whether the literal was written with a fraction or an exponent.
fn has_fraction(n: &Number) -> bool {
    n.as_str().contains(['.', 'e', 'E'])
}

fn unexpected(path: String, expected: &'static str, found: &Value) -> EmissionError {
    EmissionError::UnexpectedValueKind {
        path,
        expected,
        found: json_kind(found),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if has_fraction(n) => "float",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
