//! pg-anyset: inspect IN-list rewriting and array literals
//!
//! # Usage
//!
//! ```bash
//! # Show how a fragment is rewritten for a bound list
//! pg-anyset rewrite "u.id IN (?)" --bind 1,2,3
//!
//! # Encode and decode array literals
//! pg-anyset encode --kind int32 1 2 3
//! pg-anyset decode --kind text '{"a",b}' --format json
//! ```

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use pg_anyset::prelude::*;
use pg_anyset::validate::sequence_element_type;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pg-anyset")]
#[command(version)]
#[command(about = "Rewrite IN (?) lists to = ANY(?) and work with PostgreSQL array literals", long_about = None)]
#[command(after_help = "EXAMPLES:
    pg-anyset rewrite 'id IN (?)' --bind 1,2,3
    pg-anyset rewrite '\"t\".\"col\" NOT IN (?)' --bind a,b --kind text --format json
    pg-anyset encode --kind float64 1.5 2
    pg-anyset decode --kind int64 '{1,2,3}'")]
struct Cli {
    /// Config file (defaults to ./pg-anyset.toml, then the user config dir)
    #[arg(long, global = true, env = "PG_ANYSET_CONFIG")]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Rewrite a single WHERE fragment and show the resulting SQL
    Rewrite {
        /// Fragment with one `?` placeholder, e.g. "id IN (?)"
        sql: String,

        /// List elements bound to the placeholder
        #[arg(short, long, value_delimiter = ',')]
        bind: Vec<String>,

        /// Element kind of the bound list (inferred per element when omitted)
        #[arg(short, long)]
        kind: Option<ElemKind>,

        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// Encode values as an array literal
    Encode {
        #[arg(short, long)]
        kind: ElemKind,

        values: Vec<String>,
    },
    /// Decode an array literal
    Decode {
        #[arg(short, long)]
        kind: ElemKind,

        literal: String,

        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// List element kinds
    Kinds,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::discover()?,
    };
    init_tracing(&config, cli.verbose);

    match cli.command {
        Commands::Rewrite {
            sql,
            bind,
            kind,
            format,
        } => rewrite(&config, sql, &bind, kind, format),
        Commands::Encode { kind, values } => {
            let array = parse_array(kind, &values)?;
            println!("{}", encode_array(&array));
            Ok(())
        }
        Commands::Decode {
            kind,
            literal,
            format,
        } => decode_literal(kind, literal, format),
        Commands::Kinds => {
            show_kinds();
            Ok(())
        }
    }
}

/// `RUST_LOG` wins, then the config's filter, then `pg_anyset=info`.
fn init_tracing(config: &Config, verbose: bool) {
    let fallback = if verbose {
        "pg_anyset=debug"
    } else {
        config.log_filter.as_deref().unwrap_or("pg_anyset=info")
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn rewrite(
    config: &Config,
    sql: String,
    bind: &[String],
    kind: Option<ElemKind>,
    format: OutputFormat,
) -> Result<()> {
    let list = match kind {
        Some(kind) => Value::Array(parse_array(kind, bind)?),
        None => Value::List(bind.iter().map(|s| infer_value(s)).collect()),
    };
    let rejection = sequence_element_type(&list).err();

    let original = Expr::Where(vec![Expr::fragment(sql, vec![list])]);
    let rewritten = Rewriter::new(config.rewrite.clone()).rewrite(original.clone());
    let changed = rewritten != original;

    let before = original.to_sql_parameterized();
    let after = rewritten.to_sql_parameterized();

    match format {
        OutputFormat::Json => {
            let out = serde_json::json!({
                "rewritten": changed,
                "rejection": rejection.map(|r| r.to_string()),
                "original": statement_json(&before),
                "result": statement_json(&after),
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        OutputFormat::Text => {
            print_statement("Original SQL:", &before);
            println!();
            print_statement("Rewritten SQL:", &after);
            println!();
            if changed {
                println!("{} list bound as a single array parameter", "✓".green());
            } else {
                let reason = rejection
                    .map(|r| r.to_string())
                    .unwrap_or_else(|| "fragment does not match `col [NOT] IN (?)`".to_string());
                println!("{} not rewritten: {}", "⚠".yellow(), reason);
            }
        }
    }
    Ok(())
}

fn statement_json(stmt: &TranspileResult) -> serde_json::Value {
    serde_json::json!({
        "sql": stmt.sql,
        "params": stmt.params.iter().map(|p| p.to_string()).collect::<Vec<_>>(),
    })
}

fn print_statement(title: &str, stmt: &TranspileResult) {
    println!("{}", title.green().bold());
    println!("  {}", stmt.sql.white());
    for (i, param) in stmt.params.iter().enumerate() {
        println!("  {} = {}", format!("${}", i + 1).dimmed(), param.to_string().yellow());
    }
}

fn decode_literal(kind: ElemKind, literal: String, format: OutputFormat) -> Result<()> {
    let array = decode_array(kind, &Value::String(literal))?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&array)?),
        OutputFormat::Text => {
            println!(
                "{} ({} elements)",
                kind.array_name().cyan().bold(),
                array.len()
            );
            for (i, value) in array.to_values().iter().enumerate() {
                println!("  [{}] {}", i, value.to_string().white());
            }
        }
    }
    Ok(())
}

fn show_kinds() {
    println!(
        "{:10} {:12} {}",
        "Kind".white().bold(),
        "Array".white().bold(),
        "Decode".white().bold()
    );
    println!("{}", "─".repeat(32).dimmed());

    for kind in ElemKind::ALL {
        let decode = if kind.supports_decode() {
            "yes".green()
        } else {
            "no".red()
        };
        println!("{:10} {:12} {}", kind.name().cyan(), kind.array_name(), decode);
    }
}

/// Parse every input as `kind`. Unlike literal decoding this is strict.
fn parse_array(kind: ElemKind, values: &[String]) -> Result<TypedArray> {
    let array = match kind {
        ElemKind::Bool => TypedArray::Bool(parse_all(kind, values)?),
        ElemKind::Int8 => TypedArray::Int8(parse_all(kind, values)?),
        ElemKind::Int16 => TypedArray::Int16(parse_all(kind, values)?),
        ElemKind::Int32 => TypedArray::Int32(parse_all(kind, values)?),
        ElemKind::Int64 => TypedArray::Int64(parse_all(kind, values)?),
        ElemKind::Uint8 => TypedArray::Uint8(parse_all(kind, values)?),
        ElemKind::Uint16 => TypedArray::Uint16(parse_all(kind, values)?),
        ElemKind::Uint32 => TypedArray::Uint32(parse_all(kind, values)?),
        ElemKind::Uint64 => TypedArray::Uint64(parse_all(kind, values)?),
        ElemKind::Float32 => TypedArray::Float32(parse_all(kind, values)?),
        ElemKind::Float64 => TypedArray::Float64(parse_all(kind, values)?),
        ElemKind::String => TypedArray::String(values.to_vec()),
    };
    Ok(array)
}

fn parse_all<T: FromStr>(kind: ElemKind, values: &[String]) -> Result<Vec<T>> {
    values
        .iter()
        .map(|s| s.parse().map_err(|_| anyhow!("'{}' is not a valid {}", s, kind)))
        .collect()
}

/// Number first, then boolean, otherwise text.
fn infer_value(s: &str) -> Value {
    if let Ok(n) = s.parse::<i64>() {
        Value::Int64(n)
    } else if let Ok(f) = s.parse::<f64>() {
        Value::Float64(f)
    } else if s == "true" {
        Value::Bool(true)
    } else if s == "false" {
        Value::Bool(false)
    } else {
        Value::String(s.to_string())
    }
}
