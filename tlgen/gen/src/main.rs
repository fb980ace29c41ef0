//! tlgen Code Generator
//!
//! Generates a typed Rust TDLib client crate from a TL schema file.

use std::path::Path;

use clap::Parser;
use colored::Colorize;
use tlgen_gen::cargo_gen::{DEFAULT_PACKAGE, write_cargo_toml};
use tlgen_gen::errors::GeneratorError;
use tlgen_gen::load_schema;
use tlgen_gen::output::generate_and_write;
use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// tlgen - transforms a TDLib TL schema into a typed Rust client crate
#[derive(Parser, Debug)]
#[command(name = "tlgen")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TL schema file to read (e.g., td_api.tl)
    #[arg(short, long)]
    input: String,

    /// Output directory for generated sources (Cargo.toml goes to its parent)
    #[arg(short, long, default_value = "tdlib/src")]
    output: String,

    /// Package name of the generated crate
    #[arg(long, default_value = DEFAULT_PACKAGE)]
    package: String,

    /// Print generated code without writing files
    #[arg(long)]
    dry_run: bool,

    /// Print the resolved schema as JSON and exit
    #[arg(long)]
    dump_schema: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Sets up stderr logging. `RUST_LOG` takes precedence over `-v`.
fn init_tracing(verbose: u8) {
    let filter = match std::env::var("RUST_LOG") {
        Ok(directives) => EnvFilter::try_new(directives),
        Err(_) => {
            let level = match verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            };
            EnvFilter::try_new(format!("tlgen_gen={level},tlgen={level}"))
        }
    }
    .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false).compact())
        .init();
}

fn main() -> Result<(), GeneratorError> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.verbose > 0 {
        eprintln!("Reading schema: {}", cli.input);
        eprintln!("Output directory: {}", cli.output);
        if cli.dry_run {
            eprintln!("Dry run mode - no files will be written");
        }
    }

    let schema = load_schema(Path::new(&cli.input))?;

    if cli.dump_schema {
        let json = serde_json::to_string_pretty(&schema)
            .map_err(|e| GeneratorError::CodeGenError(format!("Failed to serialize schema: {}", e)))?;
        println!("{}", json);
        return Ok(());
    }

    if cli.verbose > 1 {
        eprintln!(
            "Schema: {} interfaces, {} classes, {} functions",
            schema.interfaces.len(),
            schema.classes.len(),
            schema.functions.len()
        );
    }

    let output_dir = Path::new(&cli.output);
    let files = generate_and_write(&schema, output_dir, cli.dry_run)?;

    // output_dir points to src/, the manifest lives next to it
    let crate_dir = match output_dir.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    write_cargo_toml(crate_dir, &cli.package, cli.dry_run)?;

    if !cli.dry_run {
        eprintln!(
            "{} Generated {} files in {}",
            "✓".green(),
            files.len(),
            cli.output.bold()
        );
        eprintln!("{} Wrote {}/Cargo.toml", "✓".green(), crate_dir.display());
    }

    Ok(())
}
