//! Error types for catalog listing and canonical emission

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for decoding and emission
pub type EmitResult<T> = Result<T, EmissionError>;

/// Errors raised while decoding or emitting one API module.
///
/// Any of these aborts the module: output already written to the sink is
/// incomplete and must be discarded by the caller.
#[derive(Debug, Error)]
pub enum EmissionError {
    /// A value has a kind the output grammar cannot represent
    #[error("{path}: unsupported value kind `{kind}`")]
    UnsupportedValueKind {
        /// Location of the value in the module document
        path: String,
        /// Name of the rejected kind
        kind: &'static str,
    },

    /// A type declaration has a `Kind` outside Enum/Struct/Union/Com
    #[error("{path}: unknown type kind `{kind}` (expected Enum, Struct, Union or Com)")]
    UnknownVariantKind {
        /// Location of the type declaration
        path: String,
        /// The rejected `Kind` text
        kind: String,
    },

    /// A record is missing one of its fixed fields
    #[error("{path}: missing required field `{field}`")]
    MissingField {
        /// Location of the record
        path: String,
        /// Name of the absent field
        field: &'static str,
    },

    /// A field holds a representable value of the wrong kind
    #[error("{path}: expected {expected}, found {found}")]
    UnexpectedValueKind {
        /// Location of the field
        path: String,
        /// Kind the field requires
        expected: &'static str,
        /// Kind actually found
        found: &'static str,
    },

    /// The module document is not valid JSON
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// Writing to the sink failed
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

/// Errors raised while listing or reading the module catalog.
///
/// These are fatal for the whole run except [`CatalogError::Module`], which
/// only concerns the named module.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The metadata source checkout is absent
    #[error("missing '{}'\n{remediation}", path.display())]
    MissingSourceDirectory {
        /// Directory that was expected to exist
        path: PathBuf,
        /// How to obtain the checkout
        remediation: String,
    },

    /// The API directory holds something that is not a module document
    #[error("found a non-{suffix} entry '{entry}' in directory '{}'", dir.display())]
    UnexpectedCatalogEntry {
        /// File name of the offending entry
        entry: String,
        /// Directory being listed
        dir: PathBuf,
        /// Suffix every entry must carry
        suffix: String,
    },

    /// Reading the directory or a module file failed
    #[error("failed to read '{}': {source}", path.display())]
    Read {
        /// Path that could not be read
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: io::Error,
    },

    /// Walking the API directory failed
    #[error("failed to list catalog: {0}")]
    Walk(#[from] walkdir::Error),

    /// A single module failed to decode or emit
    #[error("module '{module}': {source}")]
    Module {
        /// Name of the failed module
        module: String,
        /// What went wrong
        #[source]
        source: EmissionError,
    },
}
