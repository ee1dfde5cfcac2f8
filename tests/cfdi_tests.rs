//! Integration tests for the CFDI wrapper against real-shaped invoice files
//!
//! The resources under tests/resources/ are stamped CFDI 3.2 documents with
//! the local-tax addon and digital stamp in place, loaded from disk the way
//! library consumers do.

use std::path::PathBuf;

use pretty_assertions::assert_eq;

use cfdi_wrapper::{AddressKind, Cfdi, Error, Value};

fn resource(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests/resources");
    path.push(name);
    path
}

fn sample() -> Cfdi {
    Cfdi::from_file(resource("sample-cfdi.xml")).unwrap()
}

#[test]
fn test_comprobante_attributes() {
    let cfdi = sample();

    assert_eq!(cfdi.field("version").unwrap(), "3.2");
    assert_eq!(cfdi.field("serie").unwrap(), "AIN");
    assert_eq!(cfdi.field("folio").unwrap(), "AIN2015027");
    assert_eq!(cfdi.field("fecha").unwrap(), "2015-02-27T13:02:13");
    assert_eq!(cfdi.field("subTotal").unwrap(), "320.50");
    assert_eq!(cfdi.field("total").unwrap(), "371.78");
    assert!(cfdi
        .field("certificado")
        .unwrap()
        .starts_with("MIIEmDCCA4CgAwIBAg"));
    assert_eq!(cfdi.field("noCertificado").unwrap(), "00001000000301470107");
    assert_eq!(cfdi.field("condicionesDePago").unwrap(), "No aplica");
    assert_eq!(cfdi.field("descuento").unwrap(), "0.0");
    assert_eq!(cfdi.field("motivoDescuento").unwrap(), "Sin descuento");
    assert_eq!(cfdi.field("metodoDePago").unwrap(), "No Identificado");
    assert!(cfdi.field("sello").unwrap().starts_with("Gg6sfBpGbm"));
    assert_eq!(cfdi.field("tipoDeComprobante").unwrap(), "ingreso");
    assert_eq!(
        cfdi.field("formaDePago").unwrap(),
        "Pago en una sola exhibición"
    );
}

#[test]
fn test_comprobante_aliases() {
    let cfdi = sample();

    assert_eq!(cfdi.field("subtotal").unwrap(), cfdi.field("subTotal").unwrap());
    assert_eq!(cfdi.field("tipoCambio").unwrap(), "1");
    assert_eq!(cfdi.field("tipoCambio").unwrap(), cfdi.field("TipoCambio").unwrap());
    assert_eq!(cfdi.field("moneda").unwrap(), "MXN");
    assert_eq!(cfdi.field("lugarExpedicion").unwrap(), "México DF");
    assert_eq!(cfdi.field("numCtaPago").unwrap(), "No aplica");
}

#[test]
fn test_undefined_attribute_is_rejected() {
    let cfdi = sample();
    let err = cfdi.field("razonSocial").unwrap_err();
    assert!(matches!(err, Error::UndefinedAttribute(_)));
}

#[test]
fn test_issuer_record() {
    let cfdi = sample();
    let issuer = cfdi.issuer().unwrap();

    assert_eq!(issuer.rfc, "AIN020729J92");
    assert_eq!(issuer.name, "Automatización en Internet SA de CV");
    assert_eq!(issuer.issued_at.country, "México");
    assert_eq!(issuer.fiscal_regime.regime, "Persona Moral del Regimen General");
    assert_eq!(*issuer.regime(), issuer.fiscal_regime);

    let address = issuer.fiscal_address();
    assert_eq!(address.street, "ALFONSO NAPOLES GANDARA");
    assert_eq!(address.exterior_number, "50");
    assert_eq!(address.neighborhood, "PEÑA BLANCA SANTA FE");
    assert_eq!(address.locality, "DF");
    assert_eq!(address.municipality, "ALVARO OBREGON");
    assert_eq!(address.state, "DF");
    assert_eq!(address.country, "México");
    assert_eq!(address.postal_code, "01210");
    // The issuer's address carries no noInterior
    assert_eq!(address.interior_number, "");
}

#[test]
fn test_receiver_record() {
    let cfdi = sample();
    let receiver = cfdi.receiver().unwrap();

    assert_eq!(receiver.rfc, "BEGL7407295B7");
    assert_eq!(receiver.name, "LUIS DANIEL BELTRAN GIRON");

    let address = &receiver.address;
    assert_eq!(address.street, "Alfonso Napoles Gandara");
    assert_eq!(address.interior_number, "4");
    assert_eq!(address.locality, "Santa Fe");
    assert_eq!(address.state, "Distrito Federal");
    assert_eq!(*receiver.fiscal_address(), receiver.address);
}

#[test]
fn test_address_kinds_select_distinct_nodes() {
    let cfdi = sample();
    let issuer = cfdi.address(AddressKind::Issuer).unwrap();
    let receiver = cfdi.address(AddressKind::Receiver).unwrap();
    assert_ne!(issuer, receiver);
    assert_eq!(issuer.street, "ALFONSO NAPOLES GANDARA");
    assert_eq!(receiver.street, "Alfonso Napoles Gandara");
}

#[test]
fn test_line_items_in_document_order() {
    let cfdi = sample();
    let items = cfdi.line_items().unwrap();

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].quantity, "1");
    assert_eq!(items[0].unit, "Servicio");
    assert!(items[0].description.starts_with("Actualización"));
    assert_eq!(items[0].unit_value, "120.50");
    assert_eq!(items[0].amount, "120.50");

    assert_eq!(items[1].quantity, "2");
    assert_eq!(items[1].unit, "Producto");
    assert!(items[1].description.starts_with("Servidor"));
    assert_eq!(items[1].unit_value, "100.00");
    assert_eq!(items[1].amount, "200.00");
}

#[test]
fn test_tax_summary() {
    let cfdi = sample();
    let taxes = cfdi.taxes().unwrap();

    assert_eq!(taxes.total_transferred, "51.28");
    assert_eq!(taxes.total_withheld, "0.00");

    assert_eq!(taxes.withheld.len(), 2);
    assert_eq!(taxes.withheld[0].tax, "IVA");
    assert_eq!(taxes.withheld[0].amount, "0.00");
    assert_eq!(taxes.withheld[1].tax, "ISR");

    assert_eq!(taxes.transfers.len(), 1);
    assert_eq!(taxes.transfers[0].tax, "IVA");
    assert_eq!(taxes.transfers[0].rate, "0.16");
    assert_eq!(taxes.transfers[0].amount, "51.28");
}

#[test]
fn test_iva_field_and_lookup() {
    let cfdi = sample();
    assert_eq!(cfdi.field("iva").unwrap(), "51.28");

    let entry = cfdi.transferred_tax("IVA").unwrap();
    assert_eq!(entry.amount, "51.28");

    let err = cfdi.transferred_tax("IEPS").unwrap_err();
    assert!(matches!(err, Error::UnsupportedTax(_)));
}

#[test]
fn test_local_taxes() {
    let cfdi = sample();
    let local = cfdi.local_taxes().unwrap();

    assert_eq!(local.version, "1.0");
    assert_eq!(local.total_withheld, "0.00");
    assert_eq!(local.total_transferred, "51.28");
    assert_eq!(local.withheld(), "0.00");
    assert_eq!(local.transferred(), "51.28");

    assert_eq!(local.withholding.tax, "ICED");
    assert_eq!(local.withholding.amount, "0.00");
    assert_eq!(local.withholding.rate, "0.00");
}

#[test]
fn test_digital_stamp() {
    let cfdi = sample();
    let stamp = cfdi.stamp().unwrap();

    assert_eq!(stamp.version, "1.0");
    assert_eq!(stamp.uuid, "2F613767-0610-4686-9EA1-BE330AFD6C66");
    assert_eq!(stamp.stamp_date, "2015-02-27T13:40:41");
    assert_eq!(stamp.cfd_signature, "Gg6sfBpGbm");
    assert_eq!(stamp.sat_certificate_number, "00001000000202639096");
    assert_eq!(stamp.sat_signature, "04R+3SnVfe+R5");

    assert_eq!(stamp.date(), stamp.stamp_date);
    assert_eq!(stamp.cfd(), stamp.cfd_signature);
    assert_eq!(stamp.sat(), stamp.sat_signature);
}

#[test]
fn test_get_nested_and_scalar() {
    let cfdi = sample();

    match cfdi.get("receptor").unwrap() {
        Value::Receiver(receiver) => assert_eq!(receiver.rfc, "BEGL7407295B7"),
        other => panic!("expected receiver, got {:?}", other),
    }
    match cfdi.get("conceptos").unwrap() {
        Value::LineItems(items) => assert_eq!(items.len(), 2),
        other => panic!("expected line items, got {:?}", other),
    }
    match cfdi.get("impuestosLocales").unwrap() {
        Value::LocalTaxes(local) => assert_eq!(local.withholding.tax, "ICED"),
        other => panic!("expected local taxes, got {:?}", other),
    }
    match cfdi.get("folio").unwrap() {
        Value::Scalar(folio) => assert_eq!(folio, "AIN2015027"),
        other => panic!("expected scalar, got {:?}", other),
    }
}

#[test]
fn test_cadena_original() {
    let cfdi = sample();
    assert_eq!(
        cfdi.cadena_original().unwrap(),
        "||1.0|2F613767-0610-4686-9EA1-BE330AFD6C66|2015-02-27T13:40:41|Gg6sfBpGbm|00001000000202639096||"
    );
    assert_eq!(
        cfdi.field("cadenaOriginal").unwrap(),
        cfdi.cadena_original().unwrap()
    );
}

#[test]
fn test_qr_payload() {
    let cfdi = sample();
    assert_eq!(
        cfdi.qr_payload().unwrap(),
        "?re=AIN020729J92&rr=BEGL7407295B7&tt=371.78&id=2F613767-0610-4686-9EA1-BE330AFD6C66"
    );
}

#[test]
fn test_missing_implocal_prefix_is_malformed() {
    let err = Cfdi::from_file(resource("sample-cfdi-invalid.xml")).unwrap_err();
    match err {
        Error::MalformedCfdi(message) => assert!(message.contains("implocal")),
        other => panic!("expected MalformedCfdi, got {:?}", other),
    }
}

#[test]
fn test_missing_file() {
    let err = Cfdi::from_file(resource("no-such-file.xml")).unwrap_err();
    assert!(matches!(err, Error::FileNotFound(_)));
}

#[test]
fn test_load_replaces_previous_document() {
    let mut cfdi = sample();
    assert_eq!(cfdi.field("folio").unwrap(), "AIN2015027");

    cfdi.load_from_file(resource("sample-cfdi-2.xml")).unwrap();
    assert_eq!(cfdi.field("folio").unwrap(), "AIN2015099");
    assert_eq!(
        cfdi.stamp().unwrap().uuid,
        "7A4420E0-1C2B-4D11-8E4F-0A1B2C3D4E5F"
    );
    // The first file's noInterior must not leak into the new document
    assert_eq!(cfdi.receiver().unwrap().address.interior_number, "");
}

#[test]
fn test_failed_reload_clears_state() {
    let mut cfdi = sample();
    assert!(cfdi
        .load_from_file(resource("sample-cfdi-invalid.xml"))
        .is_err());

    assert!(!cfdi.is_valid());
    assert!(matches!(
        cfdi.field("total").unwrap_err(),
        Error::MalformedCfdi(_)
    ));

    // A later successful load recovers
    cfdi.load_from_file(resource("sample-cfdi.xml")).unwrap();
    assert!(cfdi.is_valid());
    assert_eq!(cfdi.field("total").unwrap(), "371.78");
}

#[test]
fn test_canonical_serialization_round_trip() {
    let cfdi = sample();
    let rendered = cfdi.to_string();

    assert!(rendered.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n"));
    assert!(!rendered["<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n".len()..].contains('\n'));

    let reloaded = Cfdi::parse(&rendered).unwrap();
    assert_eq!(reloaded.field("total").unwrap(), cfdi.field("total").unwrap());
    assert_eq!(reloaded.issuer().unwrap(), cfdi.issuer().unwrap());
    assert_eq!(reloaded.stamp().unwrap(), cfdi.stamp().unwrap());
    assert_eq!(reloaded.to_string(), rendered);
}

#[test]
fn test_to_file_overwrite_semantics() {
    let cfdi = sample();
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("out.xml");

    cfdi.to_file(&target, false).unwrap();
    let err = cfdi.to_file(&target, false).unwrap_err();
    assert!(matches!(err, Error::FileAlreadyExists(_)));

    cfdi.to_file(&target, true).unwrap();
    let written = std::fs::read_to_string(&target).unwrap();
    assert_eq!(written, cfdi.to_string());

    // Written output loads back to an equivalent document
    let reloaded = Cfdi::from_file(&target).unwrap();
    assert_eq!(reloaded.field("folio").unwrap(), "AIN2015027");
}
