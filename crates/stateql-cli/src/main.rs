mod runtime;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::{Args, Parser, Subcommand};
use runtime::{LogFormat, ModelArtifact, Settings, init_logging, load_settings, write_json};
use sqlx::postgres::PgPoolOptions;
use stateql_core::{
    Diagnostic, Error as CoreError, ParseOptions, ParseReport, ParsedSchema,
    parse_source_with_options,
};
use stateql_ddl::{CompileOptions, IdPolicy, apply_postgres_with_options, compile};
use thiserror::Error;

#[derive(Debug, Error)]
enum CliError {
    #[error("runtime error: {0}")]
    Runtime(#[from] runtime::RuntimeError),
    #[error("{0}")]
    Core(#[from] CoreError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("failed to read {path}: {source}")]
    ReadSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path}: {errors} error(s) found")]
    InvalidSource { path: PathBuf, errors: usize },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("unsupported engine: {0}")]
    UnsupportedEngine(String),
}

#[derive(Parser, Debug)]
#[command(name = "stateql", version, about = "StateQL schema compiler")]
struct Cli {
    /// Settings file (defaults to ./stateql.toml when present).
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Log output format on stderr.
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormat>,
    /// Log debug events (overridden by RUST_LOG).
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a source file and report diagnostics.
    Check(CheckArgs),
    /// Parse a source file and write the model as JSON.
    Model(ModelArgs),
    /// Print the DDL statements for a source file.
    Ddl(DdlArgs),
    /// Create the tables for a source file in PostgreSQL.
    Apply(ApplyArgs),
}

#[derive(Args, Debug)]
struct CheckArgs {
    file: PathBuf,
    /// Treat unknown primitive types as errors.
    #[arg(long, default_value_t = false)]
    strict: bool,
}

#[derive(Args, Debug)]
struct ModelArgs {
    file: PathBuf,
    /// Output path for the model JSON (stdout when absent).
    #[arg(long)]
    out: Option<PathBuf>,
    /// Treat unknown primitive types as errors.
    #[arg(long, default_value_t = false)]
    strict: bool,
}

#[derive(Args, Debug)]
struct DdlArgs {
    file: PathBuf,
    /// How a declared `id` field is handled: reject or adopt.
    #[arg(long, value_name = "POLICY")]
    id_policy: Option<IdPolicy>,
    /// Print statements as JSON.
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Args, Debug)]
struct ApplyArgs {
    file: PathBuf,
    /// Database connection string (falls back to settings, then DATABASE_URL).
    #[arg(long, value_name = "CONNECTION_STRING")]
    conn: Option<String>,
    /// How a declared `id` field is handled: reject or adopt.
    #[arg(long, value_name = "POLICY")]
    id_policy: Option<IdPolicy>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(event = "run_failed", error = %err);
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let settings = load_settings(cli.config.as_deref())?;
    let format = cli.log_format.unwrap_or(settings.log_format);
    init_logging(format, cli.verbose, settings.log_file.as_deref())?;

    match cli.command {
        Command::Check(args) => run_check(args, &settings),
        Command::Model(args) => run_model(args, &settings),
        Command::Ddl(args) => run_ddl(args, &settings),
        Command::Apply(args) => run_apply(args, &settings).await,
    }
}

fn run_check(args: CheckArgs, settings: &Settings) -> Result<(), CliError> {
    let parsed = load_source(&args.file, args.strict || settings.strict_types)?;
    println!(
        "{}: {} entities, {} fields, {} warning(s)",
        args.file.display(),
        parsed.model.entities.len(),
        parsed.model.field_count(),
        parsed.warnings.len()
    );
    Ok(())
}

fn run_model(args: ModelArgs, settings: &Settings) -> Result<(), CliError> {
    let parsed = load_source(&args.file, args.strict || settings.strict_types)?;
    let artifact = ModelArtifact::new(&args.file, &parsed.model, &parsed.warnings);

    match args.out {
        Some(path) => {
            write_json(&path, &artifact)?;
            tracing::info!(event = "model_written", path = %path.display());
        }
        None => {
            let json = serde_json::to_string_pretty(&artifact).map_err(runtime::RuntimeError::from)?;
            println!("{json}");
        }
    }
    Ok(())
}

fn run_ddl(args: DdlArgs, settings: &Settings) -> Result<(), CliError> {
    let parsed = load_source(&args.file, settings.strict_types)?;
    let options = CompileOptions {
        id_policy: args.id_policy.unwrap_or(settings.id_policy),
    };
    let statements = compile(&parsed.model, &options)?;

    if args.json {
        let json =
            serde_json::to_string_pretty(&statements).map_err(runtime::RuntimeError::from)?;
        println!("{json}");
    } else {
        for statement in &statements {
            println!("{};", statement.sql);
        }
    }
    Ok(())
}

async fn run_apply(args: ApplyArgs, settings: &Settings) -> Result<(), CliError> {
    let conn = resolve_connection(args.conn, settings)?;
    let engine = detect_engine(&conn)?;
    let parsed = load_source(&args.file, settings.strict_types)?;
    let options = CompileOptions {
        id_policy: args.id_policy.unwrap_or(settings.id_policy),
    };

    tracing::info!(event = "engine_detected", engine = %engine);
    let timer = Instant::now();

    let pool = PgPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect(&conn)
        .await?;

    let report = apply_postgres_with_options(&pool, &parsed.model, options).await?;
    pool.close().await;

    for table in report.tables() {
        println!("{table}");
    }
    tracing::info!(
        event = "run_finished",
        status = "success",
        tables = report.executed.len(),
        duration_ms = timer.elapsed().as_millis()
    );
    Ok(())
}

/// Read and parse `path`, printing every diagnostic to stderr.
fn load_source(path: &Path, strict_types: bool) -> Result<ParsedSchema, CliError> {
    let source = std::fs::read_to_string(path).map_err(|source| CliError::ReadSource {
        path: path.to_path_buf(),
        source,
    })?;
    let options = ParseOptions { strict_types };

    match parse_source_with_options(&source, &options) {
        Ok(parsed) => {
            print_diagnostics(path, &parsed.warnings);
            tracing::info!(
                event = "source_parsed",
                path = %path.display(),
                entities = parsed.model.entities.len(),
                warnings = parsed.warnings.len()
            );
            Ok(parsed)
        }
        Err(report) => {
            print_report(path, &report);
            Err(CliError::InvalidSource {
                path: path.to_path_buf(),
                errors: report.errors.len(),
            })
        }
    }
}

fn print_report(path: &Path, report: &ParseReport) {
    for diagnostic in report.sorted() {
        eprintln!("{}: {diagnostic}", path.display());
    }
}

fn print_diagnostics(path: &Path, diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        eprintln!("{}: {diagnostic}", path.display());
    }
}

fn resolve_connection(flag: Option<String>, settings: &Settings) -> Result<String, CliError> {
    flag.or_else(|| settings.database_url.clone())
        .or_else(|| std::env::var("DATABASE_URL").ok())
        .filter(|conn| !conn.trim().is_empty())
        .ok_or_else(|| {
            CliError::InvalidConfig(
                "connection string is required (--conn, database_url or DATABASE_URL)".to_string(),
            )
        })
}

fn detect_engine(conn: &str) -> Result<&'static str, CliError> {
    if conn.starts_with("postgres://") || conn.starts_with("postgresql://") {
        Ok("postgres")
    } else {
        Err(CliError::UnsupportedEngine(redact(conn)))
    }
}

/// Drop the userinfo part of a connection string before it is displayed.
fn redact(conn: &str) -> String {
    match (conn.find("://"), conn.rfind('@')) {
        (Some(scheme), Some(at)) if at > scheme => {
            format!("{}://***@{}", &conn[..scheme], &conn[at + 1..])
        }
        _ => conn.to_string(),
    }
}
