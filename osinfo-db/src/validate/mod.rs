//! Structural validation of database directories.
//!
//! A [`Validator`] walks a directory and hands every regular file to a
//! [`SchemaOracle`]. The default [`XmlSchemaOracle`] checks that XML data
//! files are well-formed `<libosinfo>` documents.

mod oracle;
mod report;
mod validator;

pub use oracle::{SchemaOracle, XmlSchemaOracle, DEFAULT_ROOT_ELEMENT};
pub use report::{EntryResult, Outcome, ValidationReport};
pub use validator::{failed_paths, Validator};
