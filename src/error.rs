//! Error types for reading and writing SII units.
//!
//! Every structural or container failure is fatal to the current call; no partial
//! object tree is ever returned. Attribute values never fail to decode: syntax
//! that matches no known form is kept as [`Value::Unknown`](crate::Value::Unknown).
//!
//! ## Error Categories
//!
//! - **Format errors**: wrong text signature or binary container signature
//! - **Structure errors**: unbalanced braces, malformed attribute lines, duplicate keys
//! - **Source errors**: unterminated comments, with the 1-based line number
//! - **Inclusion errors**: no provider configured, unresolvable paths
//! - **Container errors**: decryption or decompression failures
//!
//! ## Examples
//!
//! ```rust
//! use sii_unit::{from_str, Error};
//!
//! let result = from_str("not a unit");
//! assert!(matches!(result, Err(Error::InvalidFormat { .. })));
//! ```

use std::fmt;
use std::io;
use thiserror::Error;

/// Represents all possible errors raised while reading or writing a SII unit.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// IO error during reading or writing
    #[error("IO error: {0}")]
    Io(String),

    /// The input is not a SII unit in the expected encoding
    #[error("Invalid SII unit: {msg}")]
    InvalidFormat { msg: String },

    /// An object body was never closed
    #[error("Unexpected end of object '{object}'")]
    UnexpectedEndOfObject { object: String },

    /// Source scanning ran past the end of input
    #[error("Parse error at line {line}: {msg}")]
    Parse { line: usize, msg: String },

    /// The requested operation needs a collaborator that was not configured
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// A resource could not be resolved by the inclusion provider
    #[error("Not found: {0}")]
    NotFound(String),

    /// An `@include` directive without a quoted path
    #[error("Invalid include directive: {0}")]
    InvalidInclude(String),

    /// Includes nested too deeply, usually an include cycle
    #[error("Include of '{path}' exceeds the maximum nesting depth of {depth}")]
    IncludeDepth { path: String, depth: usize },

    /// An attribute line without a `:` separator
    #[error("Invalid attribute line: {0}")]
    InvalidAttribute(String),

    /// An attribute or child object declared twice in the same object
    #[error("Duplicate key '{key}' in object '{object}'")]
    DuplicateKey { object: String, key: String },

    /// An indexed array item beyond the declared array length
    #[error("Index {index} out of bounds for array '{name}' of length {len}")]
    ArrayIndexOutOfBounds {
        name: String,
        index: usize,
        len: usize,
    },

    /// Decryption or encryption failure
    #[error("Crypto error: {0}")]
    Crypto(String),
}

impl Error {
    /// Creates an invalid format error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sii_unit::Error;
    ///
    /// let err = Error::invalid_format("missing SiiNunit signature");
    /// assert!(err.to_string().contains("SiiNunit"));
    /// ```
    pub fn invalid_format(msg: &str) -> Self {
        Error::InvalidFormat {
            msg: msg.to_string(),
        }
    }

    /// Creates a parse error at a 1-based source line.
    pub fn parse(line: usize, msg: &str) -> Self {
        Error::Parse {
            line,
            msg: msg.to_string(),
        }
    }

    pub fn unexpected_end_of_object(object: &str) -> Self {
        Error::UnexpectedEndOfObject {
            object: object.to_string(),
        }
    }

    pub fn duplicate_key(object: &str, key: &str) -> Self {
        Error::DuplicateKey {
            object: object.to_string(),
            key: key.to_string(),
        }
    }

    /// Creates a not-found error for an unresolvable include path.
    pub fn not_found(path: &str) -> Self {
        Error::NotFound(path.to_string())
    }

    pub fn crypto<T: fmt::Display>(msg: T) -> Self {
        Error::Crypto(msg.to_string())
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Error::NotFound(err.to_string()),
            _ => Error::Io(err.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
