//! Class Schema CLI
//!
//! Command-line interface for deriving schemas from declaration manifests
//! and validating payloads against them.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use class_schema::{
    load_json, load_manifest_auto, validate, DeclareError, Manifest, SchemaCatalog, ValidateError,
};
use serde_json::{Map, Value};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "class-schema")]
#[command(about = "Derive JSON Schemas from declared model classes")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build every class of a manifest and print the schemas
    Generate {
        /// Manifest source: file path or URL (http:// or https://)
        manifest: String,

        /// Print only this class's schema
        #[arg(long)]
        class: Option<String>,

        /// Inline every $ref with the referenced schema
        #[arg(long)]
        bundle: bool,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Print the class bound to a schema id
    Lookup {
        /// Manifest source: file path or URL (http:// or https://)
        manifest: String,

        /// Schema id to look up
        id: String,
    },

    /// Validate a payload against a class's schema
    Validate {
        /// Payload file to validate
        payload: PathBuf,

        /// Manifest source: file path or URL (http:// or https://)
        #[arg(long)]
        manifest: String,

        /// Class to validate against
        #[arg(long)]
        class: String,

        /// Output results as JSON (for automation)
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Generate {
            manifest,
            class,
            bundle,
            output,
            pretty,
        } => run_generate(&manifest, class.as_deref(), bundle, output, pretty),

        Commands::Lookup { manifest, id } => run_lookup(&manifest, &id),

        Commands::Validate {
            payload,
            manifest,
            class,
            json,
        } => run_validate(&payload, &manifest, &class, json),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

/// Load a manifest and declare all of its classes.
fn build_catalog(source: &str, report: impl Fn(&str)) -> Result<(Manifest, SchemaCatalog), u8> {
    let manifest = load_manifest_auto(source).map_err(|e| {
        report(&format!("loading manifest: {}", e));
        e.exit_code() as u8
    })?;

    let catalog = manifest.build().map_err(|e| {
        report(&e.to_string());
        e.exit_code() as u8
    })?;

    Ok((manifest, catalog))
}

fn run_generate(
    source: &str,
    class: Option<&str>,
    bundle: bool,
    output: Option<PathBuf>,
    pretty: bool,
) -> Result<(), u8> {
    let (manifest, catalog) = build_catalog(source, |msg| eprintln!("Error: {}", msg))?;

    let render = |name: &str| -> Result<Value, u8> {
        let schema = if bundle {
            catalog.bundle(name)
        } else {
            catalog
                .schema(name)
                .map(|s| s.to_value())
                .ok_or_else(|| DeclareError::NotFinalized {
                    class: name.to_string(),
                })
        };
        schema.map_err(|e| {
            eprintln!("Error: {}", e);
            e.exit_code() as u8
        })
    };

    let document = match class {
        Some(name) => render(name)?,
        None => {
            let mut all = Map::new();
            for name in manifest.class_names() {
                all.insert(name.to_string(), render(name)?);
            }
            Value::Object(all)
        }
    };

    let json_output = if pretty {
        serde_json::to_string_pretty(&document)
    } else {
        serde_json::to_string(&document)
    }
    .map_err(|e| {
        eprintln!("Error serializing output: {}", e);
        2u8
    })?;

    match output {
        Some(path) => {
            std::fs::write(&path, &json_output).map_err(|e| {
                eprintln!("Error writing to {}: {}", path.display(), e);
                3u8
            })?;
        }
        None => {
            println!("{}", json_output);
        }
    }

    Ok(())
}

fn run_lookup(source: &str, id: &str) -> Result<(), u8> {
    let (_, catalog) = build_catalog(source, |msg| eprintln!("Error: {}", msg))?;

    let class = catalog.get_by_id(id).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;
    println!("{}", class);
    Ok(())
}

fn run_validate(
    payload_path: &Path,
    source: &str,
    class: &str,
    json_output: bool,
) -> Result<(), u8> {
    let payload: Value = load_json(payload_path).map_err(|e| {
        report_error(json_output, &format!("loading payload: {}", e));
        e.exit_code() as u8
    })?;

    let (_, catalog) = build_catalog(source, |msg| report_error(json_output, msg))?;

    match validate(&catalog, class, &payload) {
        Ok(()) => {
            if json_output {
                println!(r#"{{"valid":true}}"#);
            } else {
                println!("Valid");
            }
            Ok(())
        }
        Err(ValidateError::Invalid { errors }) => {
            if json_output {
                let output = serde_json::json!({
                    "valid": false,
                    "errors": errors
                });
                println!("{}", output);
            } else {
                eprintln!("Validation failed:");
                for error in errors {
                    eprintln!("  {}", error);
                }
            }
            Err(1)
        }
        Err(e) => {
            report_error(json_output, &e.to_string());
            Err(e.exit_code() as u8)
        }
    }
}

/// Output an error message in plain text or JSON format.
fn report_error(json_output: bool, msg: &str) {
    if json_output {
        println!("{}", serde_json::json!({ "valid": false, "error": msg }));
    } else {
        eprintln!("Error: {}", msg);
    }
}
