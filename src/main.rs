//! Command-line interface for xsd2codemirror

#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
use xsd2codemirror::{CodeMirrorSerializer, Logger, SchemaParser};

#[cfg(feature = "cli")]
#[derive(Parser, Debug)]
#[command(name = "xsd2codemirror")]
#[command(author, version, about = "Convert an XSD schema to CodeMirror XML schema info", long_about = None)]
struct Cli {
    /// Path to the XSD schema file
    #[arg(value_name = "XSD")]
    schema: PathBuf,

    /// Log progress to stderr
    #[arg(short, long)]
    verbose: bool,
}

/// Accept the single-dash `-verbose` spelling
#[cfg(feature = "cli")]
fn normalize_args(args: impl Iterator<Item = String>) -> Vec<String> {
    args.map(|arg| if arg == "-verbose" { "--verbose".to_string() } else { arg })
        .collect()
}

#[cfg(feature = "cli")]
fn main() {
    let cli = Cli::parse_from(normalize_args(std::env::args()));

    let log = if cli.verbose {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
        Logger::tracing()
    } else {
        Logger::null()
    };

    match run(cli.schema, log) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(feature = "cli")]
fn run(schema_path: PathBuf, log: Logger) -> Result<String, Box<dyn std::error::Error>> {
    let mut parser = SchemaParser::new(schema_path).with_logger(log);
    parser.compile()?;
    let graph = parser.xml_elements()?;
    Ok(CodeMirrorSerializer::new(&graph).pretty(true).to_json_string()?)
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Rebuild with --features cli");
    std::process::exit(1);
}
