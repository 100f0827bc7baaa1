//! Schema Provider CLI
//!
//! Command-line interface for locating sub-schemas and validating instances.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use schema_provider::{
    load_schema, load_schema_auto, source_uri, validate, DialectVersion, JsonPointer,
    ResolutionContext, ResolveError, SchemeRegistry, ValidateError,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "schema-provider")]
#[command(about = "Locate JSON sub-schemas across pointers, references and dialects")]
#[command(version)]
struct Cli {
    /// Log resolution steps (cache hits, fetches) to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Where to go from the root schema.
#[derive(clap::Args)]
struct Target {
    /// Reference to follow first (absolute URI, relative URI or #fragment)
    #[arg(long = "ref")]
    reference: Option<String>,

    /// JSON Pointer to navigate after following --ref
    #[arg(long)]
    pointer: Option<String>,

    /// Dialect assumed for documents without a recognized $schema
    #[arg(long, default_value = "draft4")]
    default_dialect: DialectVersion,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the sub-schema active at a location
    Resolve {
        /// Schema source: file path or URL (http:// or https://)
        schema: String,

        #[command(flatten)]
        target: Target,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Print the dialect detected at a location
    Dialect {
        /// Schema source: file path or URL (http:// or https://)
        schema: String,

        #[command(flatten)]
        target: Target,
    },

    /// Validate an instance against the sub-schema active at a location
    Validate {
        /// Instance file to validate
        payload: PathBuf,

        /// Schema source: file path or URL (http:// or https://)
        #[arg(long)]
        schema: String,

        #[command(flatten)]
        target: Target,

        /// Output results as JSON (for automation)
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Resolve {
            schema,
            target,
            output,
            pretty,
        } => run_resolve(&schema, &target, output, pretty),
        Commands::Dialect { schema, target } => run_dialect(&schema, &target),
        Commands::Validate {
            payload,
            schema,
            target,
            json,
        } => run_validate(&payload, &schema, &target, json),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("schema_provider=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Load the root schema and walk to the requested target.
///
/// Errors carry the message and the exit code to report.
fn locate(schema_source: &str, target: &Target) -> Result<ResolutionContext, (String, u8)> {
    let resolve_failed = |e: ResolveError| (e.to_string(), e.exit_code() as u8);

    let document = load_schema_auto(schema_source)
        .map_err(|e| (format!("loading schema: {}", e), 3u8))?;

    let mut root = ResolutionContext::with_registry(
        target.default_dialect,
        document,
        SchemeRegistry::with_builtin_handlers(),
    )
    .map_err(resolve_failed)?;

    // An anonymous root is still reachable through the URI it was loaded from.
    if root.location().is_anonymous() {
        if let Some(uri) = source_uri(schema_source) {
            root.cache().put(uri.clone().into(), root.shared_document());
            root = root.at_url(uri).map_err(resolve_failed)?;
        }
    }

    let ctx = match &target.reference {
        Some(reference) => root.follow_ref(reference).map_err(resolve_failed)?,
        None => root,
    };

    match &target.pointer {
        Some(pointer) => {
            let pointer = JsonPointer::parse(pointer).map_err(resolve_failed)?;
            ctx.at_point(&pointer).map_err(resolve_failed)
        }
        None => Ok(ctx),
    }
}

fn run_resolve(
    schema_source: &str,
    target: &Target,
    output: Option<PathBuf>,
    pretty: bool,
) -> Result<(), u8> {
    let ctx = locate_or_report(schema_source, target, false)?;

    let json_output = if pretty {
        serde_json::to_string_pretty(ctx.document())
    } else {
        serde_json::to_string(ctx.document())
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

fn run_dialect(schema_source: &str, target: &Target) -> Result<(), u8> {
    let ctx = locate_or_report(schema_source, target, false)?;
    println!("{}", ctx.version());
    Ok(())
}

fn run_validate(
    payload_path: &std::path::Path,
    schema_source: &str,
    target: &Target,
    json_output: bool,
) -> Result<(), u8> {
    let payload = load_schema(payload_path).map_err(|e| {
        report_error(json_output, &format!("loading payload: {}", e));
        3u8
    })?;

    let ctx = locate_or_report(schema_source, target, json_output)?;

    match validate(&ctx, &payload) {
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

fn locate_or_report(
    schema_source: &str,
    target: &Target,
    json_output: bool,
) -> Result<ResolutionContext, u8> {
    locate(schema_source, target).map_err(|(msg, code)| {
        report_error(json_output, &msg);
        code
    })
}

/// Output an error message in plain text or JSON format.
fn report_error(json_output: bool, msg: &str) {
    if json_output {
        let output = serde_json::json!({ "valid": false, "error": msg });
        println!("{}", output);
    } else {
        eprintln!("Error: {}", msg);
    }
}
