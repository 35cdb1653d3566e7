//! Typed metadata tree for one API module.
//!
//! The tree mirrors the win32json schema, with one change: type declarations
//! are a closed sum over their `Kind`, and each case carries only the fields
//! that kind defines. A value of these types always has every field the
//! emitter needs, so field presence is checked once while decoding.

use crate::value::InlineValue;

/// One API module: the unit of emission.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ApiModule {
    /// `Constants` section, in document order.
    pub constants: Vec<Constant>,
    /// `Types` section, in document order.
    pub types: Vec<TypeDecl>,
    /// Entries found in the source `Functions` section. Not emitted yet.
    pub deferred_functions: usize,
    /// Entries found in the source `UnicodeAliases` section. Not emitted yet.
    pub deferred_unicode_aliases: usize,
}

/// A named constant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constant {
    /// `Name`
    pub name: String,
    /// `Type`: the declared type reference.
    pub ty: InlineValue,
    /// `ValueType`: primitive type of the literal.
    pub value_type: String,
    /// `Value`
    pub value: InlineValue,
    /// `Attrs`
    pub attrs: Vec<InlineValue>,
}

/// A type declaration with the fields shared by every kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDecl {
    /// `Name`
    pub name: String,
    /// `Architectures` the declaration is limited to (empty means all).
    pub architectures: InlineValue,
    /// `Platform`: minimum supported OS, or null.
    pub platform: InlineValue,
    /// `Kind` and the fields that come with it.
    pub kind: TypeKind,
}

/// Kind-specific part of a [`TypeDecl`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeKind {
    /// `"Kind":"Enum"`
    Enum(EnumType),
    /// `"Kind":"Struct"`
    Struct(RecordType),
    /// `"Kind":"Union"`
    Union(RecordType),
    /// `"Kind":"Com"`
    Com(ComType),
}

impl TypeKind {
    /// Every `Kind` spelling the catalog may use, in declaration order.
    pub const NAMES: [&'static str; 4] = ["Enum", "Struct", "Union", "Com"];

    /// The `Kind` text written for this variant.
    pub fn name(&self) -> &'static str {
        match self {
            TypeKind::Enum(_) => "Enum",
            TypeKind::Struct(_) => "Struct",
            TypeKind::Union(_) => "Union",
            TypeKind::Com(_) => "Com",
        }
    }
}

/// Body of an `Enum` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumType {
    /// `Flags`: whether values combine as a bit set.
    pub flags: bool,
    /// `Scoped`
    pub scoped: bool,
    /// `Values`, in document order.
    pub values: Vec<EnumValue>,
    /// `IntegerBase`: underlying integer type, or null.
    pub integer_base: InlineValue,
}

/// One named value of an enum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValue {
    /// `Name`
    pub name: String,
    /// `Value`
    pub value: InlineValue,
}

/// Body of a `Struct` or `Union` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordType {
    /// `Size` in bytes.
    pub size: i64,
    /// `PackingSize`
    pub packing_size: i64,
    /// `Fields`, in declaration order.
    pub fields: Vec<Field>,
    /// Anonymous or helper types declared inside this one.
    pub nested_types: Vec<TypeDecl>,
}

/// A struct or union member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// `Name`
    pub name: String,
    /// `Type`
    pub ty: InlineValue,
    /// `Attrs`
    pub attrs: Vec<InlineValue>,
}

/// Body of a `Com` interface declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComType {
    /// `Guid`, or null.
    pub guid: InlineValue,
    /// `Interface`: the base interface reference, or null.
    pub interface: InlineValue,
    /// `Methods`, in vtable order.
    pub methods: Vec<ComMethod>,
}

/// A method of a COM interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComMethod {
    /// `Name`
    pub name: String,
    /// `SetLastError`
    pub set_last_error: bool,
    /// `ReturnType`
    pub return_type: InlineValue,
    /// `Architectures`
    pub architectures: InlineValue,
    /// `Platform`
    pub platform: InlineValue,
    /// `Attrs`
    pub attrs: Vec<InlineValue>,
    /// `Params`, in signature order.
    pub params: Vec<Param>,
}

/// A method parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    /// `Name`
    pub name: String,
    /// `Type`
    pub ty: InlineValue,
    /// `Attrs`, e.g. `"In"`, `"Out"`, `"Optional"`.
    pub attrs: Vec<InlineValue>,
}
