//! Logical path table and field alias maps
//!
//! This module maps the dotted logical names used throughout the wrapper
//! ("cfdi.issuing.address") onto namespace-qualified query expressions, and
//! holds the per-region alias tables that let historical field names resolve
//! to the canonical schema attribute names.
//!
//! Both tables are fixed at process start and safe for unsynchronized
//! concurrent reads.

use crate::error::{Error, Result};
use indexmap::IndexMap;
use once_cell::sync::Lazy;

/// A single step in a query expression
#[derive(Debug, Clone, PartialEq)]
pub struct PathStep {
    /// The axis this step walks
    pub axis: Axis,
    /// Namespace prefix of the element name
    pub prefix: Option<String>,
    /// Local element name
    pub local: String,
}

/// Axis of a path step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Direct children of the context node (`/`)
    Child,
    /// Any descendant of the context node (`//`)
    Descendant,
}

impl PathStep {
    fn new(axis: Axis, name: &str) -> Self {
        let (prefix, local) = match name.split_once(':') {
            Some((p, l)) => (Some(p.to_string()), l.to_string()),
            None => (None, name.to_string()),
        };
        Self {
            axis,
            prefix,
            local,
        }
    }

    /// The qualified name (prefix:local) of this step
    pub fn qname(&self) -> String {
        match &self.prefix {
            Some(p) => format!("{}:{}", p, self.local),
            None => self.local.clone(),
        }
    }
}

/// A parsed namespace-qualified query expression
#[derive(Debug, Clone, PartialEq)]
pub struct Selector {
    /// The raw expression text
    pub expression: String,
    /// Parsed path steps
    pub steps: Vec<PathStep>,
}

impl Selector {
    /// Parse a query expression into path steps
    ///
    /// Handles both `/` and `//` separators; expressions used by the path
    /// table are rooted descendant lookups like `//cfdi:Comprobante//cfdi:Emisor`.
    pub fn new(expression: impl Into<String>) -> Self {
        let expression = expression.into();
        let mut steps = Vec::new();
        let mut rest = expression.trim();

        while !rest.is_empty() {
            let axis = if let Some(r) = rest.strip_prefix("//") {
                rest = r;
                Axis::Descendant
            } else if let Some(r) = rest.strip_prefix('/') {
                rest = r;
                Axis::Child
            } else {
                Axis::Child
            };

            let end = rest.find('/').unwrap_or(rest.len());
            let name = &rest[..end];
            if !name.is_empty() {
                steps.push(PathStep::new(axis, name));
            }
            rest = &rest[end..];
        }

        Self { expression, steps }
    }

    /// Get the parsed steps
    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }
}

/// Path table: logical dotted name → query expression
///
/// Targets the CFDI 3.2 element names; one schema version only.
static PATHS: Lazy<IndexMap<&'static str, Selector>> = Lazy::new(|| {
    [
        ("cfdi", "//cfdi:Comprobante"),
        ("cfdi.issuing", "//cfdi:Comprobante//cfdi:Emisor"),
        (
            "cfdi.issuing.address",
            "//cfdi:Comprobante//cfdi:Emisor//cfdi:DomicilioFiscal",
        ),
        (
            "cfdi.issuing.issued_at",
            "//cfdi:Comprobante//cfdi:Emisor//cfdi:ExpedidoEn",
        ),
        (
            "cfdi.issuing.regimen",
            "//cfdi:Comprobante//cfdi:Emisor//cfdi:RegimenFiscal",
        ),
        ("cfdi.receiver", "//cfdi:Comprobante//cfdi:Receptor"),
        (
            "cfdi.receiver.address",
            "//cfdi:Comprobante//cfdi:Receptor//cfdi:Domicilio",
        ),
        (
            "cfdi.items",
            "//cfdi:Comprobante//cfdi:Conceptos//cfdi:Concepto",
        ),
        ("cfdi.taxes", "//cfdi:Comprobante//cfdi:Impuestos"),
        (
            "cfdi.taxes.holdbacks",
            "//cfdi:Comprobante//cfdi:Impuestos//cfdi:Retenciones//cfdi:Retencion",
        ),
        (
            "cfdi.taxes.transfers",
            "//cfdi:Comprobante//cfdi:Impuestos//cfdi:Traslados//cfdi:Traslado",
        ),
        (
            "cfdi.addon.taxes",
            "//cfdi:Comprobante//cfdi:Complemento//implocal:ImpuestosLocales",
        ),
        (
            "cfdi.addon.taxes.holdbacks",
            "//cfdi:Comprobante//cfdi:Complemento//implocal:ImpuestosLocales//implocal:RetencionesLocales",
        ),
        ("cfdi.addon.digital_stamp", "//tfd:TimbreFiscalDigital"),
    ]
    .into_iter()
    .map(|(name, expr)| (name, Selector::new(expr)))
    .collect()
});

/// Resolve a logical path name to its query expression
///
/// Fails with [`Error::UnknownPath`] for names missing from the table; this
/// is only reachable through a programming error, never through caller input.
pub fn lookup(logical: &str) -> Result<&'static Selector> {
    PATHS
        .get(logical)
        .ok_or_else(|| Error::UnknownPath(logical.to_string()))
}

/// Logical regions that carry their own alias table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AliasRegion {
    /// Top-level comprobante attributes
    Comprobante,
    /// The tfd digital stamp attributes
    DigitalStamp,
    /// The implocal local-tax addon attributes
    LocalTaxes,
}

/// Comprobante external name → canonical schema attribute name
const COMPROBANTE_ALIASES: &[(&str, &str)] = &[
    ("subtotal", "subTotal"),
    ("tipoCambio", "TipoCambio"),
    ("moneda", "Moneda"),
    ("lugarExpedicion", "LugarExpedicion"),
    ("numCtaPago", "NumCtaPago"),
];

/// Digital-stamp external name → canonical schema attribute name
const STAMP_ALIASES: &[(&str, &str)] = &[
    ("uuid", "UUID"),
    ("fecha", "FechaTimbrado"),
    ("fechaTimbrado", "FechaTimbrado"),
    ("cfd", "selloCFD"),
    ("sat", "selloSAT"),
];

/// Local-tax addon external name → canonical schema attribute name
const LOCAL_TAX_ALIASES: &[(&str, &str)] = &[
    ("retenciones", "TotaldeRetenciones"),
    ("totalDeRetenciones", "TotaldeRetenciones"),
    ("totaldeRetenciones", "TotaldeRetenciones"),
    ("traslados", "TotaldeTraslados"),
    ("totalDeTraslados", "TotaldeTraslados"),
    ("totaldeTraslados", "TotaldeTraslados"),
];

/// Canonical comprobante attribute names accepted by the field resolver
pub const COMPROBANTE_ATTRIBUTES: &[&str] = &[
    "version",
    "serie",
    "folio",
    "fecha",
    "subTotal",
    "total",
    "certificado",
    "noCertificado",
    "condicionesDePago",
    "descuento",
    "motivoDescuento",
    "TipoCambio",
    "Moneda",
    "metodoDePago",
    "sello",
    "tipoDeComprobante",
    "formaDePago",
    "LugarExpedicion",
    "NumCtaPago",
];

/// Rewrite an external field name to the canonical schema attribute name
///
/// Names outside the region's alias set pass through unchanged; rejecting
/// unknown names is the responsibility of the field dispatch, not of this
/// table.
pub fn resolve_alias<'a>(region: AliasRegion, name: &'a str) -> &'a str {
    let table = match region {
        AliasRegion::Comprobante => COMPROBANTE_ALIASES,
        AliasRegion::DigitalStamp => STAMP_ALIASES,
        AliasRegion::LocalTaxes => LOCAL_TAX_ALIASES,
    };
    table
        .iter()
        .find(|(alias, _)| *alias == name)
        .map(|(_, canonical)| *canonical)
        .unwrap_or(name)
}
