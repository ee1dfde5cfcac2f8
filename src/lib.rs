//! # cfdi-wrapper
//!
//! A Rust reader for Mexican CFDI electronic invoices (Comprobante Fiscal
//! Digital por Internet).
//!
//! The wrapper loads a stamped CFDI document, validates that the required
//! namespace prefixes are declared, and exposes the invoice through logical
//! field names instead of raw XML navigation: scalar comprobante attributes
//! (including their historical aliases), nested records for the issuer,
//! receiver, line items, taxes, local-tax addon and digital stamp, plus the
//! derived signing string (cadena original) and the QR verification payload.
//!
//! ## Example
//!
//! ```rust,ignore
//! use cfdi_wrapper::Cfdi;
//!
//! // Load a stamped invoice
//! let cfdi = Cfdi::from_file("path/to/invoice.xml")?;
//!
//! // Scalar fields, aliases included
//! let total = cfdi.field("total")?;
//! let subtotal = cfdi.field("subtotal")?; // resolves to subTotal
//!
//! // Nested records
//! let issuer = cfdi.issuer()?;
//! let stamp = cfdi.stamp()?;
//!
//! // Derived fields
//! let cadena = cfdi.cadena_original()?;
//! let payload = cfdi.qr_payload()?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Foundation
pub mod error;

// Document layer: parsing, namespaces, canonical form
pub mod documents;
pub mod namespaces;

// Logical paths and attribute aliases
pub mod paths;

// The wrapper and its materialized records
pub mod cfdi;
pub mod records;

// QR rendering seam
pub mod qr;

// Re-exports for convenience
pub use cfdi::{AddressKind, Cfdi, Value, LEGEND};
pub use error::{Error, Result};
pub use qr::QrRenderer;
pub use records::{
    Address, DigitalStamp, FiscalRegime, IssuedAt, Issuer, LineItem, LocalTaxes, LocalWithholding,
    Receiver, TaxEntry, TaxSummary, TransferEntry,
};

/// Version of the cfdi-wrapper library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// CFDI 3.x namespace
pub const CFDI_NAMESPACE: &str = "http://www.sat.gob.mx/cfd/3";

/// TimbreFiscalDigital (digital stamp) namespace
pub const TFD_NAMESPACE: &str = "http://www.sat.gob.mx/TimbreFiscalDigital";

/// Local taxes addon namespace
pub const IMPLOCAL_NAMESPACE: &str = "http://www.sat.gob.mx/implocal";

/// XML Schema instance namespace
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";
