//! Canonical emission of a module tree.
//!
//! The output grammar is fixed byte for byte:
//! - lines end with `\r\n`, indentation is one tab per nesting level;
//! - the four top-level sections always appear, in a fixed order, each after
//!   the first introduced by a leading comma;
//! - list elements sit one per line, every element after the first starting
//!   with a comma;
//! - block records (constants, types, methods) put each field on its own
//!   line, inline records (enum values, fields, params) fit on one line.
//!
//! Field order is owned by the [`Record`] implementations below: each record
//! type lists its fields exactly once, and the emitter only ever walks that
//! list.

use std::fmt;
use std::io::{self, Write};

use crate::error::EmitResult;
use crate::model::{ApiModule, ComMethod, Constant, EnumValue, Field, Param, TypeDecl, TypeKind};
use crate::value::InlineValue;

/// Line terminator used throughout the document.
pub const LINE_END: &str = "\r\n";

/// One level of indentation.
pub const INDENT: &str = "\t";

/// How a record is laid out when it is an element of a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// The whole record on a single line.
    Inline,
    /// Braces on their own lines, one field per line.
    Block,
}

/// The value of one record field, borrowed from the tree.
#[derive(Debug)]
pub enum FieldValue<'a> {
    /// A quoted string
    Str(&'a str),
    /// `true` / `false`
    Bool(bool),
    /// A decimal integer
    Int(i64),
    /// Any inline value
    Value(&'a InlineValue),
    /// An inline array
    Values(&'a [InlineValue]),
    /// A list of records, one element per line
    Records(Vec<&'a dyn Record>),
}

/// A record with a fixed, ordered list of fields.
pub trait Record: fmt::Debug {
    /// Layout used when the record is a list element.
    fn layout(&self) -> Layout {
        Layout::Inline
    }

    /// The record's fields, in output order.
    fn fields(&self) -> Vec<(&'static str, FieldValue<'_>)>;
}

fn as_record<R: Record>(item: &R) -> &dyn Record {
    item
}

fn records<R: Record>(items: &[R]) -> FieldValue<'_> {
    FieldValue::Records(items.iter().map(as_record).collect())
}

impl Record for Constant {
    fn layout(&self) -> Layout {
        Layout::Block
    }

    fn fields(&self) -> Vec<(&'static str, FieldValue<'_>)> {
        vec![
            ("Name", FieldValue::Str(&self.name)),
            ("Type", FieldValue::Value(&self.ty)),
            ("ValueType", FieldValue::Str(&self.value_type)),
            ("Value", FieldValue::Value(&self.value)),
            ("Attrs", FieldValue::Values(&self.attrs)),
        ]
    }
}

impl Record for TypeDecl {
    fn layout(&self) -> Layout {
        Layout::Block
    }

    fn fields(&self) -> Vec<(&'static str, FieldValue<'_>)> {
        let mut fields = vec![
            ("Name", FieldValue::Str(&self.name)),
            ("Architectures", FieldValue::Value(&self.architectures)),
            ("Platform", FieldValue::Value(&self.platform)),
            ("Kind", FieldValue::Str(self.kind.name())),
        ];

        match &self.kind {
            TypeKind::Enum(body) => fields.extend([
                ("Flags", FieldValue::Bool(body.flags)),
                ("Scoped", FieldValue::Bool(body.scoped)),
                ("Values", records(&body.values)),
                ("IntegerBase", FieldValue::Value(&body.integer_base)),
            ]),
            TypeKind::Struct(body) | TypeKind::Union(body) => fields.extend([
                ("Size", FieldValue::Int(body.size)),
                ("PackingSize", FieldValue::Int(body.packing_size)),
                ("Fields", records(&body.fields)),
                ("NestedTypes", records(&body.nested_types)),
            ]),
            TypeKind::Com(body) => fields.extend([
                ("Guid", FieldValue::Value(&body.guid)),
                ("Interface", FieldValue::Value(&body.interface)),
                ("Methods", records(&body.methods)),
            ]),
        }

        fields
    }
}

impl Record for EnumValue {
    fn fields(&self) -> Vec<(&'static str, FieldValue<'_>)> {
        vec![
            ("Name", FieldValue::Str(&self.name)),
            ("Value", FieldValue::Value(&self.value)),
        ]
    }
}

impl Record for Field {
    fn fields(&self) -> Vec<(&'static str, FieldValue<'_>)> {
        vec![
            ("Name", FieldValue::Str(&self.name)),
            ("Type", FieldValue::Value(&self.ty)),
            ("Attrs", FieldValue::Values(&self.attrs)),
        ]
    }
}

impl Record for ComMethod {
    fn layout(&self) -> Layout {
        Layout::Block
    }

    fn fields(&self) -> Vec<(&'static str, FieldValue<'_>)> {
        vec![
            ("Name", FieldValue::Str(&self.name)),
            ("SetLastError", FieldValue::Bool(self.set_last_error)),
            ("ReturnType", FieldValue::Value(&self.return_type)),
            ("Architectures", FieldValue::Value(&self.architectures)),
            ("Platform", FieldValue::Value(&self.platform)),
            ("Attrs", FieldValue::Values(&self.attrs)),
            ("Params", records(&self.params)),
        ]
    }
}

impl Record for Param {
    fn fields(&self) -> Vec<(&'static str, FieldValue<'_>)> {
        vec![
            ("Name", FieldValue::Str(&self.name)),
            ("Type", FieldValue::Value(&self.ty)),
            ("Attrs", FieldValue::Values(&self.attrs)),
        ]
    }
}

/// Write `module` to `sink` as one canonical document.
///
/// Writes go straight to the sink in a single forward pass; wrap unbuffered
/// sinks in a `BufWriter`. On error the sink may hold a partial document,
/// which the caller must discard.
pub fn emit<W: Write>(sink: W, module: &ApiModule) -> EmitResult<()> {
    Emitter { out: sink }.document(module)?;
    Ok(())
}

/// Decode a module document and write its canonical form to `sink`.
///
/// Nothing is written unless the whole document decodes.
pub fn emit_json<W: Write>(sink: W, text: &str) -> EmitResult<()> {
    let module = ApiModule::from_json(text)?;
    emit(sink, &module)
}

/// Emit `module` into a fresh buffer.
pub fn emit_to_vec(module: &ApiModule) -> EmitResult<Vec<u8>> {
    let mut buffer = Vec::new();
    emit(&mut buffer, module)?;
    Ok(buffer)
}

struct Emitter<W> {
    out: W,
}

impl<W: Write> Emitter<W> {
    fn text(&mut self, text: &str) -> io::Result<()> {
        self.out.write_all(text.as_bytes())
    }

    fn newline(&mut self) -> io::Result<()> {
        self.text(LINE_END)
    }

    fn indent(&mut self, depth: usize) -> io::Result<()> {
        for _ in 0..depth {
            self.text(INDENT)?;
        }
        Ok(())
    }

    fn key(&mut self, name: &str) -> io::Result<()> {
        write!(self.out, "\"{name}\":")
    }

    fn document(&mut self, module: &ApiModule) -> io::Result<()> {
        self.text("{")?;
        self.newline()?;
        self.newline()?;

        self.section("", "Constants", &records(&module.constants))?;
        self.section(",", "Types", &records(&module.types))?;
        // Functions and UnicodeAliases are not populated yet
        self.section(",", "Functions", &FieldValue::Records(Vec::new()))?;
        self.section(",", "UnicodeAliases", &FieldValue::Records(Vec::new()))?;

        self.text("}")?;
        self.newline()?;
        self.out.flush()
    }

    fn section(&mut self, separator: &str, name: &str, list: &FieldValue<'_>) -> io::Result<()> {
        self.text(separator)?;
        self.key(name)?;
        self.block_value(0, list)?;
        self.newline()?;
        self.newline()
    }

    fn block(&mut self, depth: usize, separator: &str, record: &dyn Record) -> io::Result<()> {
        self.indent(depth)?;
        self.text(separator)?;
        self.text("{")?;
        self.newline()?;

        for (index, (name, value)) in record.fields().iter().enumerate() {
            self.indent(depth + 1)?;
            if index > 0 {
                self.text(",")?;
            }
            self.key(name)?;
            self.block_value(depth + 1, value)?;
            self.newline()?;
        }

        self.indent(depth)?;
        self.text("}")?;
        self.newline()
    }

    /// A field value inside a block record. `depth` is the field's own line.
    fn block_value(&mut self, depth: usize, value: &FieldValue<'_>) -> io::Result<()> {
        let FieldValue::Records(items) = value else {
            return self.inline_field(value);
        };

        self.text("[")?;
        self.newline()?;
        for (index, item) in items.iter().enumerate() {
            let separator = if index == 0 { "" } else { "," };
            match item.layout() {
                Layout::Block => self.block(depth + 1, separator, *item)?,
                Layout::Inline => {
                    self.indent(depth + 1)?;
                    self.text(separator)?;
                    self.inline_record(*item)?;
                    self.newline()?;
                }
            }
        }
        self.indent(depth)?;
        self.text("]")
    }

    fn inline_record(&mut self, record: &dyn Record) -> io::Result<()> {
        self.text("{")?;
        for (index, (name, value)) in record.fields().iter().enumerate() {
            if index > 0 {
                self.text(",")?;
            }
            self.key(name)?;
            self.inline_field(value)?;
        }
        self.text("}")
    }

    fn inline_field(&mut self, value: &FieldValue<'_>) -> io::Result<()> {
        match value {
            FieldValue::Str(s) => self.string(s),
            FieldValue::Bool(b) => write!(self.out, "{b}"),
            FieldValue::Int(i) => write!(self.out, "{i}"),
            FieldValue::Value(v) => self.inline(v),
            FieldValue::Values(values) => self.array(values),
            FieldValue::Records(items) => {
                self.text("[")?;
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        self.text(",")?;
                    }
                    self.inline_record(*item)?;
                }
                self.text("]")
            }
        }
    }

    fn inline(&mut self, value: &InlineValue) -> io::Result<()> {
        match value {
            InlineValue::Null => self.text("null"),
            InlineValue::Bool(b) => write!(self.out, "{b}"),
            InlineValue::Int(i) => write!(self.out, "{i}"),
            InlineValue::Str(s) => self.string(s),
            InlineValue::Array(values) => self.array(values),
            InlineValue::Object(entries) => {
                self.text("{")?;
                for (index, (name, item)) in entries.iter().enumerate() {
                    if index > 0 {
                        self.text(",")?;
                    }
                    self.key(name)?;
                    self.inline(item)?;
                }
                self.text("}")
            }
        }
    }

    fn array(&mut self, values: &[InlineValue]) -> io::Result<()> {
        self.text("[")?;
        for (index, item) in values.iter().enumerate() {
            if index > 0 {
                self.text(",")?;
            }
            self.inline(item)?;
        }
        self.text("]")
    }

    // Strings are written verbatim. The catalog never needs JSON escapes;
    // revisit if a reference document ever carries one.
    fn string(&mut self, text: &str) -> io::Result<()> {
        write!(self.out, "\"{text}\"")
    }
}
