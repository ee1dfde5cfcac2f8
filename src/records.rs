//! Nested record types
//!
//! Plain aggregates materialized from the CFDI tree. Every field is a
//! verbatim string from the source attribute; no numeric parsing or rounding
//! happens at this layer. Where a value is reachable under several
//! historical names, the record stores it once and offers alias methods, so
//! the two names can never disagree.

use serde::Serialize;

/// A fiscal address (issuer's DomicilioFiscal or receiver's Domicilio)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Address {
    /// Street name (calle)
    pub street: String,
    /// Neighborhood (colonia)
    pub neighborhood: String,
    /// Locality (localidad); empty string when absent in the source node
    pub locality: String,
    /// Municipality (municipio)
    pub municipality: String,
    /// Exterior number (noExterior)
    pub exterior_number: String,
    /// Interior number (noInterior); empty string when absent in the source node
    pub interior_number: String,
    /// State (estado)
    pub state: String,
    /// Country (pais)
    pub country: String,
    /// Postal code (codigoPostal)
    pub postal_code: String,
}

/// The country where the invoice was issued (ExpedidoEn)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssuedAt {
    /// Country (pais)
    pub country: String,
}

/// The issuer's fiscal regime (RegimenFiscal)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FiscalRegime {
    /// Regime description (Regimen)
    pub regime: String,
}

/// The invoice issuer (Emisor)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issuer {
    /// Issuer tax id (rfc)
    pub rfc: String,
    /// Legal name (nombre)
    pub name: String,
    /// Fiscal address
    pub address: Address,
    /// Where the invoice was issued
    pub issued_at: IssuedAt,
    /// Fiscal regime
    pub fiscal_regime: FiscalRegime,
}

impl Issuer {
    /// Alias of [`Issuer::address`]; always the same value
    pub fn fiscal_address(&self) -> &Address {
        &self.address
    }

    /// Alias of [`Issuer::fiscal_regime`]; always the same value
    pub fn regime(&self) -> &FiscalRegime {
        &self.fiscal_regime
    }
}

/// The invoice receiver (Receptor)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Receiver {
    /// Receiver tax id (rfc)
    pub rfc: String,
    /// Legal name (nombre)
    pub name: String,
    /// Fiscal address
    pub address: Address,
}

impl Receiver {
    /// Alias of [`Receiver::address`]; always the same value
    pub fn fiscal_address(&self) -> &Address {
        &self.address
    }
}

/// A single invoice line item (Concepto)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineItem {
    /// Quantity (cantidad)
    pub quantity: String,
    /// Unit of measure (unidad)
    pub unit: String,
    /// Description (descripcion)
    pub description: String,
    /// Unit value (valorUnitario)
    pub unit_value: String,
    /// Line amount (importe)
    pub amount: String,
}

/// A withheld-tax entry (Retencion)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaxEntry {
    /// Tax type (impuesto)
    pub tax: String,
    /// Amount (importe)
    pub amount: String,
}

/// A transferred-tax entry (Traslado)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferEntry {
    /// Tax type (impuesto)
    pub tax: String,
    /// Amount (importe)
    pub amount: String,
    /// Rate (tasa)
    pub rate: String,
}

/// The document-level tax summary (Impuestos)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaxSummary {
    /// Total of transferred taxes (totalImpuestosTrasladados)
    pub total_transferred: String,
    /// Total of withheld taxes (totalImpuestosRetenidos)
    pub total_withheld: String,
    /// Withheld entries in document order
    pub withheld: Vec<TaxEntry>,
    /// Transferred entries in document order
    pub transfers: Vec<TransferEntry>,
}

/// A local withholding entry (RetencionesLocales)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocalWithholding {
    /// Tax type (ImpLocRetenido)
    pub tax: String,
    /// Amount (Importe)
    pub amount: String,
    /// Rate (TasadeRetencion)
    pub rate: String,
}

/// The local-tax addon (implocal:ImpuestosLocales)
///
/// Only the FIRST local withholding node is ever materialized, even when the
/// schema permits several; the addon models a one-record relationship and
/// the wrapper preserves that behavior rather than generalizing to a
/// collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocalTaxes {
    /// Addon version
    pub version: String,
    /// Total withheld locally (TotaldeRetenciones)
    pub total_withheld: String,
    /// Total transferred locally (TotaldeTraslados)
    pub total_transferred: String,
    /// The single local withholding record
    pub withholding: LocalWithholding,
}

impl LocalTaxes {
    /// Alias of [`LocalTaxes::total_withheld`]; always the same value
    pub fn withheld(&self) -> &str {
        &self.total_withheld
    }

    /// Alias of [`LocalTaxes::total_transferred`]; always the same value
    pub fn transferred(&self) -> &str {
        &self.total_transferred
    }
}

/// The digital stamp (tfd:TimbreFiscalDigital)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DigitalStamp {
    /// Stamp version
    pub version: String,
    /// Fiscal folio (UUID)
    pub uuid: String,
    /// Stamping date (FechaTimbrado)
    pub stamp_date: String,
    /// CFD signature (selloCFD)
    pub cfd_signature: String,
    /// SAT certificate number (noCertificadoSAT)
    pub sat_certificate_number: String,
    /// SAT signature (selloSAT)
    pub sat_signature: String,
}

impl DigitalStamp {
    /// Alias of [`DigitalStamp::stamp_date`]; always the same value
    pub fn date(&self) -> &str {
        &self.stamp_date
    }

    /// Alias of [`DigitalStamp::cfd_signature`]; always the same value
    pub fn cfd(&self) -> &str {
        &self.cfd_signature
    }

    /// Alias of [`DigitalStamp::sat_signature`]; always the same value
    pub fn sat(&self) -> &str {
        &self.sat_signature
    }
}
