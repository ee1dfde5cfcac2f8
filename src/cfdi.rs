//! The CFDI wrapper
//!
//! [`Cfdi`] owns one loaded document at a time and resolves logical field
//! names against it: scalar comprobante attributes (with their historical
//! aliases), computed fields, and the nested records for the issuer,
//! receiver, line items, taxes, local-tax addon and digital stamp.
//!
//! A `Cfdi` is not designed for concurrent mutation: `load` replaces the
//! whole internal state and must not race a field access on the same
//! instance. Use one instance per document for concurrent reads.

use std::fmt;
use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use once_cell::sync::Lazy;

use crate::documents::{canonicalize, Document, Element};
use crate::error::{Error, Result};
use crate::namespaces;
use crate::paths::{self, AliasRegion};
use crate::records::{
    Address, DigitalStamp, FiscalRegime, IssuedAt, Issuer, LineItem, LocalTaxes, LocalWithholding,
    Receiver, TaxEntry, TaxSummary, TransferEntry,
};

/// Fixed legend returned by `field("leyenda")`; a static constant, not
/// derived from the document
pub const LEGEND: &str = "Este documento es una representación impresa de un CFDI";

/// A value produced by the generic name-based lookup
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A scalar comprobante attribute or computed field
    Scalar(String),
    /// The issuer record
    Issuer(Issuer),
    /// The receiver record
    Receiver(Receiver),
    /// The line-item collection
    LineItems(Vec<LineItem>),
    /// The document-level tax summary
    Taxes(TaxSummary),
    /// The local-tax addon
    LocalTaxes(LocalTaxes),
    /// The digital stamp
    Stamp(DigitalStamp),
}

/// Which address region to materialize
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressKind {
    /// The issuer's DomicilioFiscal
    Issuer,
    /// The receiver's Domicilio
    Receiver,
}

type Getter = fn(&Cfdi) -> Result<Value>;

/// Dispatch table for the historical nested-object names, built once at
/// first use and shared read-only afterwards
static NESTED_OBJECTS: Lazy<IndexMap<&'static str, Getter>> = Lazy::new(|| {
    let mut table: IndexMap<&'static str, Getter> = IndexMap::new();
    table.insert("emisor", |c| c.issuer().map(Value::Issuer));
    table.insert("receptor", |c| c.receiver().map(Value::Receiver));
    table.insert("conceptos", |c| c.line_items().map(Value::LineItems));
    table.insert("impuestos", |c| c.taxes().map(Value::Taxes));
    table.insert("impuestosLocales", |c| c.local_taxes().map(Value::LocalTaxes));
    table.insert("timbre", |c| c.stamp().map(Value::Stamp));
    table.insert("timbreFiscalDigital", |c| c.stamp().map(Value::Stamp));
    table
});

/// A loaded CFDI document with aliased field access
#[derive(Debug, Clone)]
pub struct Cfdi {
    /// Canonical serializable form of the current document
    canonical: String,
    /// The queryable tree; None after a failed load
    document: Option<Document>,
}

impl Cfdi {
    /// Parse a CFDI from its XML text
    ///
    /// Fails with [`Error::MalformedXml`] when the text is not parseable and
    /// with [`Error::MalformedCfdi`] when a required namespace prefix is
    /// missing.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut cfdi = Self {
            canonical: String::new(),
            document: None,
        };
        cfdi.load(xml)?;
        Ok(cfdi)
    }

    /// Read a CFDI from a file
    ///
    /// Fails with [`Error::FileNotFound`] when the path does not exist,
    /// otherwise with the underlying load error.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let mut cfdi = Self {
            canonical: String::new(),
            document: None,
        };
        cfdi.load_from_file(path)?;
        Ok(cfdi)
    }

    /// Replace the loaded document with a new XML text
    ///
    /// The replacement is wholesale: after a failed load no field access can
    /// observe data from the previous document; every access fails with
    /// [`Error::MalformedCfdi`] until a later load succeeds.
    pub fn load(&mut self, xml: &str) -> Result<()> {
        self.document = None;
        self.canonical.clear();

        let document = Document::parse(xml)?;
        namespaces::validate(&document)?;

        self.canonical = canonicalize(xml);
        self.document = Some(document);
        Ok(())
    }

    /// Replace the loaded document with the contents of a file
    pub fn load_from_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        let xml = fs::read_to_string(path)?;
        self.load(&xml)
    }

    /// Whether a namespace-valid document is currently loaded
    pub fn is_valid(&self) -> bool {
        self.document.is_some()
    }

    /// The currently loaded document tree
    pub fn document(&self) -> Result<&Document> {
        self.doc()
    }

    /// The canonical serializable form of the loaded document
    pub fn canonical_xml(&self) -> &str {
        &self.canonical
    }

    /// Write the canonical form to a file
    ///
    /// Fails with [`Error::FileAlreadyExists`] when the target exists and
    /// `overwrite` is false; with `overwrite` the contents are replaced
    /// unconditionally.
    pub fn to_file(&self, path: impl AsRef<Path>, overwrite: bool) -> Result<()> {
        let path = path.as_ref();
        if path.exists() && !overwrite {
            return Err(Error::FileAlreadyExists(path.to_path_buf()));
        }
        fs::write(path, self.canonical_xml())?;
        Ok(())
    }

    fn doc(&self) -> Result<&Document> {
        self.document
            .as_ref()
            .ok_or_else(|| Error::MalformedCfdi("no valid document is loaded".to_string()))
    }

    /// First element matching a logical path, failing when there is none
    fn first(&self, logical: &str) -> Result<&Element> {
        let selector = paths::lookup(logical)?;
        self.doc()?
            .select(selector)
            .into_iter()
            .next()
            .ok_or_else(|| Error::FieldNotFound(logical.to_string()))
    }

    /// Every element matching a logical path, in document order
    fn all(&self, logical: &str) -> Result<Vec<&Element>> {
        let selector = paths::lookup(logical)?;
        Ok(self.doc()?.select(selector))
    }

    // -----------------------------------------------------------------
    // Scalar field resolution
    // -----------------------------------------------------------------

    /// Resolve a scalar field by name
    ///
    /// Accepts the canonical comprobante attribute names, their documented
    /// aliases, and the computed names `cadenaOriginal`, `leyenda` and
    /// `iva` (the amount of the IVA transfer entry). Names outside those
    /// sets fail with [`Error::UndefinedAttribute`]; a recognized name whose
    /// attribute is absent fails with [`Error::FieldNotFound`].
    pub fn field(&self, name: &str) -> Result<String> {
        self.doc()?;

        match name {
            "cadenaOriginal" => return self.cadena_original(),
            "leyenda" => return Ok(LEGEND.to_string()),
            "iva" => return self.transferred_tax("IVA").map(|entry| entry.amount),
            _ => {}
        }

        let canonical = paths::resolve_alias(AliasRegion::Comprobante, name);
        if !paths::COMPROBANTE_ATTRIBUTES.contains(&canonical) {
            return Err(Error::UndefinedAttribute(name.to_string()));
        }

        let comprobante = self.first("cfdi")?;
        comprobante
            .attribute(canonical)
            .map(str::to_string)
            .ok_or_else(|| Error::FieldNotFound(name.to_string()))
    }

    /// Generic name-based lookup covering scalars and nested objects
    ///
    /// Reserved for truly dynamic call sites; prefer the typed accessors.
    pub fn get(&self, name: &str) -> Result<Value> {
        self.doc()?;
        if let Some(getter) = NESTED_OBJECTS.get(name) {
            return getter(self);
        }
        self.field(name).map(Value::Scalar)
    }

    /// Look up a transferred-tax entry by tax name
    ///
    /// Only IVA is supported; any other name fails with
    /// [`Error::UnsupportedTax`]. When the document carries no IVA transfer
    /// entry the lookup fails with [`Error::FieldNotFound`].
    pub fn transferred_tax(&self, name: &str) -> Result<TransferEntry> {
        let wanted = name.to_uppercase();
        if wanted != "IVA" {
            return Err(Error::UnsupportedTax(name.to_string()));
        }
        self.taxes()?
            .transfers
            .into_iter()
            .find(|entry| entry.tax.to_uppercase() == wanted)
            .ok_or_else(|| Error::FieldNotFound("iva".to_string()))
    }

    // -----------------------------------------------------------------
    // Nested-object materializers
    // -----------------------------------------------------------------

    /// Materialize the issuer record, including its address, issuing
    /// country and fiscal regime
    pub fn issuer(&self) -> Result<Issuer> {
        let node = self.first("cfdi.issuing")?;
        Ok(Issuer {
            rfc: required_attr(node, "rfc", "emisor")?,
            name: required_attr(node, "nombre", "emisor")?,
            address: self.address(AddressKind::Issuer)?,
            issued_at: self.issued_at()?,
            fiscal_regime: self.fiscal_regime()?,
        })
    }

    /// Materialize the receiver record, including its address
    pub fn receiver(&self) -> Result<Receiver> {
        let node = self.first("cfdi.receiver")?;
        Ok(Receiver {
            rfc: required_attr(node, "rfc", "receptor")?,
            name: required_attr(node, "nombre", "receptor")?,
            address: self.address(AddressKind::Receiver)?,
        })
    }

    /// Materialize an address record
    ///
    /// `localidad` and `noInterior` default to the empty string when the
    /// attribute is absent in the source node; presence is tested per
    /// attribute, never assumed.
    pub fn address(&self, kind: AddressKind) -> Result<Address> {
        let (logical, context) = match kind {
            AddressKind::Issuer => ("cfdi.issuing.address", "domicilioFiscal"),
            AddressKind::Receiver => ("cfdi.receiver.address", "domicilio"),
        };
        let node = self.first(logical)?;
        Ok(Address {
            street: required_attr(node, "calle", context)?,
            neighborhood: required_attr(node, "colonia", context)?,
            locality: optional_attr(node, "localidad"),
            municipality: required_attr(node, "municipio", context)?,
            exterior_number: required_attr(node, "noExterior", context)?,
            interior_number: optional_attr(node, "noInterior"),
            state: required_attr(node, "estado", context)?,
            country: required_attr(node, "pais", context)?,
            postal_code: required_attr(node, "codigoPostal", context)?,
        })
    }

    fn issued_at(&self) -> Result<IssuedAt> {
        let node = self.first("cfdi.issuing.issued_at")?;
        Ok(IssuedAt {
            country: required_attr(node, "pais", "expedidoEn")?,
        })
    }

    fn fiscal_regime(&self) -> Result<FiscalRegime> {
        let node = self.first("cfdi.issuing.regimen")?;
        Ok(FiscalRegime {
            regime: required_attr(node, "Regimen", "regimenFiscal")?,
        })
    }

    /// Materialize every line item, in document order
    ///
    /// An empty collection is valid; zero matches is not an error.
    pub fn line_items(&self) -> Result<Vec<LineItem>> {
        self.all("cfdi.items")?
            .into_iter()
            .map(|node| {
                Ok(LineItem {
                    quantity: required_attr(node, "cantidad", "concepto")?,
                    unit: required_attr(node, "unidad", "concepto")?,
                    description: required_attr(node, "descripcion", "concepto")?,
                    unit_value: required_attr(node, "valorUnitario", "concepto")?,
                    amount: required_attr(node, "importe", "concepto")?,
                })
            })
            .collect()
    }

    /// Materialize the document-level tax summary with its withheld and
    /// transferred entries, in document order
    pub fn taxes(&self) -> Result<TaxSummary> {
        let node = self.first("cfdi.taxes")?;

        let withheld = self
            .all("cfdi.taxes.holdbacks")?
            .into_iter()
            .map(|entry| {
                Ok(TaxEntry {
                    tax: required_attr(entry, "impuesto", "retencion")?,
                    amount: required_attr(entry, "importe", "retencion")?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let transfers = self
            .all("cfdi.taxes.transfers")?
            .into_iter()
            .map(|entry| {
                Ok(TransferEntry {
                    tax: required_attr(entry, "impuesto", "traslado")?,
                    amount: required_attr(entry, "importe", "traslado")?,
                    rate: required_attr(entry, "tasa", "traslado")?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(TaxSummary {
            total_transferred: required_attr(node, "totalImpuestosTrasladados", "impuestos")?,
            total_withheld: required_attr(node, "totalImpuestosRetenidos", "impuestos")?,
            withheld,
            transfers,
        })
    }

    /// Materialize the local-tax addon
    ///
    /// Only the first local withholding node is read even when several
    /// exist; the addon models a one-record relationship and that behavior
    /// is preserved deliberately.
    pub fn local_taxes(&self) -> Result<LocalTaxes> {
        let node = self.first("cfdi.addon.taxes")?;
        let holdback = self.first("cfdi.addon.taxes.holdbacks")?;

        Ok(LocalTaxes {
            version: required_attr(node, "version", "impuestosLocales")?,
            total_withheld: required_attr(node, "TotaldeRetenciones", "impuestosLocales")?,
            total_transferred: required_attr(node, "TotaldeTraslados", "impuestosLocales")?,
            withholding: LocalWithholding {
                tax: required_attr(holdback, "ImpLocRetenido", "retencionesLocales")?,
                amount: required_attr(holdback, "Importe", "retencionesLocales")?,
                rate: required_attr(holdback, "TasadeRetencion", "retencionesLocales")?,
            },
        })
    }

    /// Materialize the digital stamp
    ///
    /// Requires the `tfd` stamp element itself, not just the prefix
    /// declaration: a document can pass namespace validation and still fail
    /// here with [`Error::FieldNotFound`].
    pub fn stamp(&self) -> Result<DigitalStamp> {
        let selector = paths::lookup("cfdi.addon.digital_stamp")?;
        let node = self
            .doc()?
            .select(selector)
            .into_iter()
            .next()
            .ok_or_else(|| Error::FieldNotFound("timbreFiscalDigital".to_string()))?;

        let attr = |name: &str| {
            required_attr(
                node,
                paths::resolve_alias(AliasRegion::DigitalStamp, name),
                "timbreFiscalDigital",
            )
        };

        Ok(DigitalStamp {
            version: attr("version")?,
            uuid: attr("uuid")?,
            stamp_date: attr("fecha")?,
            cfd_signature: attr("selloCFD")?,
            sat_certificate_number: attr("noCertificadoSAT")?,
            sat_signature: attr("selloSAT")?,
        })
    }

    // -----------------------------------------------------------------
    // Derived fields
    // -----------------------------------------------------------------

    /// The canonical signing string derived from the digital stamp
    ///
    /// Format is a hard external contract consumed by signature
    /// verification: double pipes at both ends, single-pipe-delimited
    /// fields in fixed order.
    pub fn cadena_original(&self) -> Result<String> {
        let stamp = self.stamp()?;
        Ok(format!(
            "||{}|{}|{}|{}|{}||",
            stamp.version,
            stamp.uuid,
            stamp.stamp_date,
            stamp.cfd_signature,
            stamp.sat_certificate_number
        ))
    }

    /// The verification payload string intended for QR encoding
    ///
    /// Four query parameters in fixed order, values taken verbatim with no
    /// URL-encoding applied.
    pub fn qr_payload(&self) -> Result<String> {
        let issuer = self.first("cfdi.issuing")?;
        let receiver = self.first("cfdi.receiver")?;
        Ok(format!(
            "?re={}&rr={}&tt={}&id={}",
            required_attr(issuer, "rfc", "emisor")?,
            required_attr(receiver, "rfc", "receptor")?,
            self.field("total")?,
            self.stamp()?.uuid
        ))
    }
}

impl fmt::Display for Cfdi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical_xml())
    }
}

fn required_attr(node: &Element, attribute: &str, context: &str) -> Result<String> {
    node.attribute(attribute)
        .map(str::to_string)
        .ok_or_else(|| Error::FieldNotFound(format!("{}@{}", context, attribute)))
}

fn optional_attr(node: &Element, attribute: &str) -> String {
    node.attribute(attribute).unwrap_or_default().to_string()
}
