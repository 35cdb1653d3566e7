//! Catalog-wide declaration identity.
//!
//! A [`DeclRef`] names one declaration (a constant, a type, ...) inside one
//! API module. Two references are the same declaration exactly when their
//! `module:name` keys match, so the key is the only thing compared, ordered
//! and hashed.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Separator between the module and declaration parts of a key.
pub const KEY_SEPARATOR: char = ':';

/// Errors raised while building a [`DeclRef`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeclRefError {
    /// One of the two parts was empty.
    #[error("declaration reference has an empty {part} part")]
    Empty {
        /// Which part was empty (`module` or `name`).
        part: &'static str,
    },

    /// One of the two parts contained the key separator.
    #[error("declaration reference {part} `{value}` contains ':'")]
    Separator {
        /// Which part was rejected (`module` or `name`).
        part: &'static str,
        /// The offending text.
        value: String,
    },

    /// A textual key had no separator at all.
    #[error("`{0}` is not a `module:name` declaration key")]
    MissingSeparator(String),
}

/// Identity of a declaration within the whole catalog.
///
/// Equality, ordering and hashing are all derived from [`DeclRef::key`], so a
/// `DeclRef` can be used directly as a map key or sorted-set element, and
/// looked up by its key string through [`Borrow<str>`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DeclRef {
    key: String,
    split: usize,
}

impl DeclRef {
    /// Build a reference from its module and declaration names.
    pub fn new(module: &str, name: &str) -> Result<Self, DeclRefError> {
        validate_part("module", module)?;
        validate_part("name", name)?;

        Ok(Self {
            key: format!("{module}{KEY_SEPARATOR}{name}"),
            split: module.len(),
        })
    }

    /// The API module the declaration lives in.
    pub fn module(&self) -> &str {
        &self.key[..self.split]
    }

    /// The declaration's name within its module.
    pub fn name(&self) -> &str {
        &self.key[self.split + KEY_SEPARATOR.len_utf8()..]
    }

    /// The combined `module:name` key.
    pub fn key(&self) -> &str {
        &self.key
    }
}

fn validate_part(part: &'static str, value: &str) -> Result<(), DeclRefError> {
    if value.is_empty() {
        return Err(DeclRefError::Empty { part });
    }
    if value.contains(KEY_SEPARATOR) {
        return Err(DeclRefError::Separator {
            part,
            value: value.to_string(),
        });
    }
    Ok(())
}

impl PartialEq for DeclRef {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for DeclRef {}

impl PartialOrd for DeclRef {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DeclRef {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}

impl Hash for DeclRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl Borrow<str> for DeclRef {
    fn borrow(&self) -> &str {
        &self.key
    }
}

impl fmt::Display for DeclRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

impl FromStr for DeclRef {
    type Err = DeclRefError;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        let (module, name) = key
            .split_once(KEY_SEPARATOR)
            .ok_or_else(|| DeclRefError::MissingSeparator(key.to_string()))?;
        Self::new(module, name)
    }
}

impl TryFrom<String> for DeclRef {
    type Error = DeclRefError;

    fn try_from(key: String) -> Result<Self, Self::Error> {
        key.parse()
    }
}

impl From<DeclRef> for String {
    fn from(decl: DeclRef) -> Self {
        decl.key
    }
}
