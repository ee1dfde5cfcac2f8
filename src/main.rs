//! Command-line interface for cfdi-wrapper

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};

#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
use cfdi_wrapper::{namespaces, Cfdi, Value};

#[cfg(feature = "cli")]
#[derive(Parser, Debug)]
#[command(name = "cfdi")]
#[command(author, version, about = "CFDI invoice inspection tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the main fields of a CFDI document
    Show {
        /// Path to the CFDI XML file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Print the QR verification payload
    Qr {
        /// Path to the CFDI XML file
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Rewrite a CFDI in its canonical form
    Canonicalize {
        /// Path to the CFDI XML file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Overwrite the output file if it exists
        #[arg(short, long)]
        force: bool,
    },

    /// Check that a file parses and declares the required namespaces
    Validate {
        /// Path to the CFDI XML file
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

#[cfg(feature = "cli")]
fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Show { file, json } => cmd_show(file, json),
        Commands::Qr { file } => cmd_qr(file),
        Commands::Canonicalize {
            file,
            output,
            force,
        } => cmd_canonicalize(file, output, force),
        Commands::Validate { file } => cmd_validate(file),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(feature = "cli")]
fn cmd_show(file: PathBuf, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let cfdi = Cfdi::from_file(&file)?;

    if json {
        let document = serde_json::json!({
            "version": cfdi.field("version")?,
            "folio": field_or_null(&cfdi, "folio"),
            "serie": field_or_null(&cfdi, "serie"),
            "fecha": cfdi.field("fecha")?,
            "subTotal": cfdi.field("subTotal")?,
            "total": cfdi.field("total")?,
            "emisor": cfdi.issuer()?,
            "receptor": cfdi.receiver()?,
            "conceptos": cfdi.line_items()?,
            "impuestos": cfdi.taxes()?,
            "timbre": cfdi.stamp()?,
            "cadenaOriginal": cfdi.cadena_original()?,
        });
        println!("{}", serde_json::to_string_pretty(&document)?);
        return Ok(());
    }

    println!("cfdi-wrapper v{}", cfdi_wrapper::VERSION);
    println!();
    println!("Comprobante:");
    for name in ["version", "serie", "folio", "fecha", "subTotal", "total"] {
        match cfdi.field(name) {
            Ok(value) => println!("  {}: {}", name, value),
            Err(_) => println!("  {}: (absent)", name),
        }
    }
    println!();

    let issuer = cfdi.issuer()?;
    println!("Emisor: {} ({})", issuer.name, issuer.rfc);
    let receiver = cfdi.receiver()?;
    println!("Receptor: {} ({})", receiver.name, receiver.rfc);
    println!();

    println!("Conceptos:");
    for item in cfdi.line_items()? {
        println!(
            "  {} {} {} @ {} = {}",
            item.quantity, item.unit, item.description, item.unit_value, item.amount
        );
    }
    println!();

    if let Ok(Value::Stamp(stamp)) = cfdi.get("timbre") {
        println!("Timbre:");
        println!("  UUID: {}", stamp.uuid);
        println!("  FechaTimbrado: {}", stamp.stamp_date);
        println!("  Cadena original: {}", cfdi.cadena_original()?);
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn field_or_null(cfdi: &Cfdi, name: &str) -> serde_json::Value {
    match cfdi.field(name) {
        Ok(value) => serde_json::Value::String(value),
        Err(_) => serde_json::Value::Null,
    }
}

#[cfg(feature = "cli")]
fn cmd_qr(file: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let cfdi = Cfdi::from_file(&file)?;
    println!("{}", cfdi.qr_payload()?);
    Ok(())
}

#[cfg(feature = "cli")]
fn cmd_canonicalize(
    file: PathBuf,
    output: Option<PathBuf>,
    force: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let cfdi = Cfdi::from_file(&file)?;
    match output {
        Some(path) => cfdi.to_file(path, force)?,
        None => println!("{}", cfdi),
    }
    Ok(())
}

#[cfg(feature = "cli")]
fn cmd_validate(file: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    match Cfdi::from_file(&file) {
        Ok(cfdi) => {
            let document = cfdi.document()?;
            println!("{}: valid CFDI", file.display());
            for prefix in namespaces::REQUIRED_PREFIXES {
                if let Some(uri) = document.namespaces().uri(prefix) {
                    println!("  xmlns:{} = {}", prefix, uri);
                }
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("{}: {}", file.display(), e);
            std::process::exit(1);
        }
    }
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Rebuild with --features cli");
    std::process::exit(1);
}
