//! Canonical re-serialization of win32json API metadata.
//!
//! The pipeline for one module is:
//! 1. List: [`Catalog`] finds `<Module>.json` documents in a checkout
//! 2. Decode: JSON -> [`ApiModule`], rejecting shapes the emitter cannot write
//! 3. Emit: [`ApiModule`] -> canonical bytes on any `io::Write` sink
//!
//! Modules are independent, so callers may emit many in parallel, each with
//! its own sink.

mod catalog;
mod decode;
mod emit;
mod error;
mod index;
mod model;
mod value;

pub use catalog::{
    API_SUBDIR, Catalog, CatalogConfig, DEFAULT_BRANCH, DEFAULT_REMOTE, DEFAULT_SHA,
    DEFAULT_SOURCE_DIR, MODULE_SUFFIX,
};
pub use emit::{FieldValue, INDENT, LINE_END, Layout, Record, emit, emit_json, emit_to_vec};
pub use error::{CatalogError, EmissionError, EmitResult};
pub use index::DeclIndex;
pub use model::{
    ApiModule, ComMethod, ComType, Constant, EnumType, EnumValue, Field, Param, RecordType,
    TypeDecl, TypeKind,
};
pub use value::InlineValue;

pub use apicanon_common::{DeclRef, DeclRefError};
