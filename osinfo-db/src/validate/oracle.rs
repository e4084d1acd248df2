//! Pluggable per-file schema checks.

use std::path::Path;

/// Decides whether a single database file is structurally valid.
pub trait SchemaOracle {
    /// Check one file. `Err` carries a diagnostic for the user.
    fn check(&self, path: &Path, contents: &[u8]) -> Result<(), String>;
}

/// Root element every database document must have.
pub const DEFAULT_ROOT_ELEMENT: &str = "libosinfo";

/// Structural XML checks for database files.
///
/// - `.xml` files must be well-formed UTF-8 XML with the expected root element.
/// - `.rng` schema files must be well-formed XML.
/// - Everything else passes.
#[derive(Debug, Clone)]
pub struct XmlSchemaOracle {
    root_element: String,
}

impl Default for XmlSchemaOracle {
    fn default() -> Self {
        Self::new(DEFAULT_ROOT_ELEMENT)
    }
}

impl XmlSchemaOracle {
    /// Require `root_element` as the root of `.xml` files.
    pub fn new(root_element: impl Into<String>) -> Self {
        Self {
            root_element: root_element.into(),
        }
    }

    fn parse<'a>(&self, contents: &'a [u8]) -> Result<roxmltree::Document<'a>, String> {
        let text = std::str::from_utf8(contents).map_err(|e| format!("invalid UTF-8: {}", e))?;
        roxmltree::Document::parse(text).map_err(|e| e.to_string())
    }
}

impl SchemaOracle for XmlSchemaOracle {
    fn check(&self, path: &Path, contents: &[u8]) -> Result<(), String> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match extension.as_deref() {
            Some("xml") => {
                let doc = self.parse(contents)?;
                let root = doc.root_element().tag_name().name();
                if root == self.root_element {
                    Ok(())
                } else {
                    Err(format!(
                        "expected root element <{}>, found <{}>",
                        self.root_element, root
                    ))
                }
            }
            Some("rng") => self.parse(contents).map(|_| ()),
            _ => Ok(()),
        }
    }
}
