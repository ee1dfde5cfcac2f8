//! XML namespace handling
//!
//! This module collects the namespace prefixes a document declares and
//! validates them against the set a well-formed CFDI must carry. Validation
//! inspects declared prefixes only; it does not verify that every
//! namespace-qualified lookup will resolve, so a document can pass here and
//! still fail an individual field access later.

use crate::documents::Document;
use crate::error::{Error, Result};
use std::collections::BTreeMap;

/// Namespace prefixes every CFDI must declare
pub const REQUIRED_PREFIXES: [&str; 4] = ["tfd", "xsi", "cfdi", "implocal"];

/// Qualified name: optional namespace prefix plus local name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    /// Namespace prefix as written in the document (None for no prefix)
    pub prefix: Option<String>,
    /// Local name
    pub local: String,
}

impl QName {
    /// Parse a prefixed name like `cfdi:Comprobante`
    pub fn parse(name: &str) -> Self {
        match name.split_once(':') {
            Some((prefix, local)) => Self {
                prefix: Some(prefix.to_string()),
                local: local.to_string(),
            },
            None => Self {
                prefix: None,
                local: name.to_string(),
            },
        }
    }
}

impl std::fmt::Display for QName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.prefix {
            Some(p) => write!(f, "{}:{}", p, self.local),
            None => write!(f, "{}", self.local),
        }
    }
}

/// The namespace declarations discovered in a document
///
/// Prefixes are collected from every `xmlns:` declaration in the tree, not
/// just the root element: real CFDIs declare `tfd` and `implocal` on the
/// addon elements that use them.
#[derive(Debug, Clone, Default)]
pub struct NamespaceSet {
    prefixes: BTreeMap<String, String>,
    default_namespace: Option<String>,
}

impl NamespaceSet {
    /// Create an empty namespace set
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a prefix declaration
    pub fn add_prefix(&mut self, prefix: impl Into<String>, namespace: impl Into<String>) {
        self.prefixes.insert(prefix.into(), namespace.into());
    }

    /// Record the default (unprefixed) namespace
    pub fn set_default_namespace(&mut self, namespace: impl Into<String>) {
        self.default_namespace = Some(namespace.into());
    }

    /// Get the namespace URI bound to a prefix
    pub fn uri(&self, prefix: &str) -> Option<&str> {
        self.prefixes.get(prefix).map(|s| s.as_str())
    }

    /// Get the default namespace
    pub fn default_namespace(&self) -> Option<&str> {
        self.default_namespace.as_deref()
    }

    /// Whether a prefix is declared
    pub fn contains(&self, prefix: &str) -> bool {
        self.prefixes.contains_key(prefix)
    }

    /// Iterate over the declared prefixes in sorted order
    pub fn prefixes(&self) -> impl Iterator<Item = &str> {
        self.prefixes.keys().map(|s| s.as_str())
    }
}

/// The required prefixes a document fails to declare, in canonical order
pub fn missing_prefixes(document: &Document) -> Vec<&'static str> {
    REQUIRED_PREFIXES
        .iter()
        .copied()
        .filter(|p| !document.namespaces().contains(p))
        .collect()
}

/// Whether a document declares every required CFDI namespace prefix
pub fn is_valid(document: &Document) -> bool {
    missing_prefixes(document).is_empty()
}

/// Throwing form of the namespace check
///
/// Fails with [`Error::MalformedCfdi`] naming the missing prefixes.
pub fn validate(document: &Document) -> Result<()> {
    let missing = missing_prefixes(document);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(Error::MalformedCfdi(format!(
            "missing required namespace prefixes: {}",
            missing.join(", ")
        )))
    }
}
