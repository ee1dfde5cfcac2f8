//! Error types for cfdi-wrapper
//!
//! This module defines all error types used throughout the library.
//! Every fallible operation returns the crate-wide [`Result`] alias.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using the cfdi-wrapper Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for CFDI operations
#[derive(Error, Debug)]
pub enum Error {
    /// The input bytes could not be parsed as XML at all
    #[error("malformed XML: {0}")]
    MalformedXml(String),

    /// The document parsed but does not declare the required CFDI namespaces
    #[error("malformed CFDI: {0}")]
    MalformedCfdi(String),

    /// A well-known field's underlying node or attribute is absent
    #[error("field not found: {0}")]
    FieldNotFound(String),

    /// The caller requested a field name the model does not recognize
    #[error("undefined attribute: {0}")]
    UndefinedAttribute(String),

    /// A tax-by-name lookup was requested for a tax other than IVA
    #[error("unsupported tax: {0}")]
    UnsupportedTax(String),

    /// A logical path name missing from the path table (programming error)
    #[error("unknown path: {0}")]
    UnknownPath(String),

    /// Serialization target already exists and overwrite was not requested
    #[error("file already exists: {0}")]
    FileAlreadyExists(PathBuf),

    /// The document path given to the loader does not exist
    #[error("file not found: {0}")]
    FileNotFound(PathBuf),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::MalformedCfdi("implocal".to_string());
        assert!(format!("{}", err).contains("implocal"));

        let err = Error::FieldNotFound("subTotal".to_string());
        assert!(format!("{}", err).contains("subTotal"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_file_errors_carry_path() {
        let err = Error::FileNotFound(PathBuf::from("/tmp/missing.xml"));
        assert!(format!("{}", err).contains("missing.xml"));
    }
}
