//! looseapi CLI
//!
//! Command-line interface for inspecting loosely formatted API
//! specifications: normalized documents, resolved components, synthesized
//! templates, and operation listings.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use looseapi_common::Recovery;
use looseapi_model::ApiModel;
use looseapi_parser::{Document, ParseOptions, SourceFormat};
use looseapi_schema::schema_at;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "looseapi")]
#[command(version, about = "Inspect loosely formatted API specifications", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a spec file and print the normalized document
    #[command(after_help = "EXAMPLES:\n  \
        # Print an indented spec as JSON\n  \
        looseapi parse --spec petstore.yaml\n\n  \
        # Fail on the first structural repair\n  \
        looseapi parse --spec petstore.yaml --strict")]
    Parse {
        /// Path to the spec file
        #[arg(short, long)]
        spec: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "json")]
        format: OutputFormat,

        /// Treat structural repairs as errors
        #[arg(long)]
        strict: bool,
    },

    /// Print the document fragment at a reference path
    #[command(after_help = "EXAMPLES:\n  \
        looseapi component --spec petstore.yaml '#/components/schemas/Pet'")]
    Component {
        /// Path to the spec file
        #[arg(short, long)]
        spec: PathBuf,

        /// Reference path, e.g. `#/components/schemas/Pet`
        pointer: String,

        /// Output format
        #[arg(short, long, default_value = "json")]
        format: OutputFormat,
    },

    /// Synthesize an example instance of the schema at a reference path
    #[command(after_help = "EXAMPLES:\n  \
        # Runnable example\n  \
        looseapi template --spec petstore.yaml '#/components/schemas/Pet'\n\n  \
        # Show field descriptions instead of values\n  \
        looseapi template --spec petstore.yaml '#/components/schemas/Pet' --explain")]
    Template {
        /// Path to the spec file
        #[arg(short, long)]
        spec: PathBuf,

        /// Reference path of the schema
        pointer: String,

        /// Show descriptions in place of leaf values
        #[arg(long)]
        explain: bool,

        /// Output format
        #[arg(short, long, default_value = "json")]
        format: OutputFormat,
    },

    /// List the operations of a spec
    Operations {
        /// Path to the spec file
        #[arg(short, long)]
        spec: PathBuf,

        /// Only operations carrying this tag
        #[arg(short, long)]
        tag: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Yaml,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Parse {
            spec,
            format,
            strict,
        } => parse_command(&spec, format, strict, cli.verbose)?,
        Commands::Component {
            spec,
            pointer,
            format,
        } => component_command(&spec, &pointer, format)?,
        Commands::Template {
            spec,
            pointer,
            explain,
            format,
        } => template_command(&spec, &pointer, explain, format)?,
        Commands::Operations { spec, tag } => {
            operations_command(&spec, tag.as_deref(), cli.verbose)?
        },
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let default_filter = if verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_document(spec_path: &Path, strict: bool) -> Result<Document> {
    let options = ParseOptions::default().strict(strict);
    Document::from_file(spec_path, &options)
        .with_context(|| format!("Failed to load spec {}", spec_path.display()))
}

fn parse_command(
    spec_path: &Path,
    format: OutputFormat,
    strict: bool,
    verbose: bool,
) -> Result<()> {
    eprintln!("{} Parsing spec file: {}", "→".cyan(), spec_path.display());

    let document = load_document(spec_path, strict)?;

    if verbose {
        let source = match document.format() {
            SourceFormat::Json => "JSON",
            SourceFormat::Indented => "indented text",
        };
        eprintln!("  Source format: {}", source.yellow());
    }

    report_recoveries(document.recoveries());
    println!("{}", render(&document.root().to_json(), format)?);

    Ok(())
}

fn component_command(spec_path: &Path, pointer: &str, format: OutputFormat) -> Result<()> {
    let document = load_document(spec_path, false)?;
    let component = looseapi_schema::get_component(document.root(), pointer)
        .with_context(|| format!("Failed to resolve {}", pointer))?;

    println!("{}", render(&component.to_json(), format)?);
    Ok(())
}

fn template_command(
    spec_path: &Path,
    pointer: &str,
    explain: bool,
    format: OutputFormat,
) -> Result<()> {
    let document = load_document(spec_path, false)?;
    let schema = schema_at(document.root(), pointer)
        .with_context(|| format!("Failed to build schema {}", pointer))?;

    let synthesized = if explain {
        schema.build_template_explained()
    } else {
        schema.build_template()
    };
    let template =
        synthesized.with_context(|| format!("Failed to synthesize template for {}", schema))?;

    println!("{}", render(&template, format)?);
    Ok(())
}

fn operations_command(spec_path: &Path, tag: Option<&str>, verbose: bool) -> Result<()> {
    let document = load_document(spec_path, false)?;
    let model = ApiModel::from_document(document).context("Failed to read operations")?;

    let operations: Vec<_> = match tag {
        Some(tag) => model.operations_for_tag(tag),
        None => model.operations().iter().collect(),
    };

    println!("{}", model.title().bold());
    if let Some(tag) = tag {
        if !model.tags().iter().any(|t| t == tag) {
            eprintln!("{} Tag '{}' is not declared at the top level", "!".yellow(), tag);
        }
    }

    for operation in &operations {
        println!(
            "  • {} {} {}",
            operation.operation_id.cyan(),
            operation.method.to_uppercase().yellow(),
            operation.path
        );
        if verbose {
            if let Some(about) = operation.about() {
                println!("      {}", about);
            }
            for parameter in &operation.parameters {
                println!(
                    "      {} {}",
                    parameter,
                    if parameter.required { "(required)" } else { "" }
                );
            }
        }
    }

    println!("\n{} {} operations", "✓".green(), operations.len());
    Ok(())
}

fn report_recoveries(recoveries: &[Recovery]) {
    if recoveries.is_empty() {
        eprintln!("{}", "✓ Parse successful!".green().bold());
        return;
    }

    eprintln!(
        "{} Parsed with {} structural repairs:",
        "!".yellow(),
        recoveries.len()
    );
    for recovery in recoveries {
        eprintln!("  • {}", recovery);
    }
}

fn render(value: &serde_json::Value, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(value).context("Failed to render JSON output")
        },
        OutputFormat::Yaml => serde_yaml::to_string(value).context("Failed to render YAML output"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use serde_json::json;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_template_arguments() {
        let cli = Cli::try_parse_from([
            "looseapi",
            "template",
            "--spec",
            "petstore.yaml",
            "#/components/schemas/Pet",
            "--explain",
            "--format",
            "yaml",
        ])
        .unwrap();

        match cli.command {
            Commands::Template {
                pointer,
                explain,
                format,
                ..
            } => {
                assert_eq!(pointer, "#/components/schemas/Pet");
                assert!(explain);
                assert_eq!(format, OutputFormat::Yaml);
            },
            _ => panic!("expected template command"),
        }
    }

    #[test]
    fn test_render_formats() {
        let value = json!({"name": "placeholder", "tags": ["a"]});
        assert_eq!(
            render(&value, OutputFormat::Json).unwrap(),
            "{\n  \"name\": \"placeholder\",\n  \"tags\": [\n    \"a\"\n  ]\n}"
        );
        assert_eq!(
            render(&value, OutputFormat::Yaml).unwrap(),
            "name: placeholder\ntags:\n- a\n"
        );
    }
}
