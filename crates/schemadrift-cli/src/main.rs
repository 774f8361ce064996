mod registry;
mod settings;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::{Args, Parser, Subcommand};
use schemadrift_compare::{CompareError, SchemaComparer};
use schemadrift_core::{
    DatabaseSchema, Error as CoreError, SCHEMA_VERSION, parse_model_json,
    redact_connection_string, validate_schema,
};
use schemadrift_introspect::{Adapter, IntrospectOptions, PostgresAdapter};
use registry::{
    RunContext, RunOptions, init_run_logging, start_run, write_compare_outcome, write_report,
    write_schema,
};
use settings::{ConfigOverrides, SettingsError, load_compare_config};
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
enum CliError {
    #[error("registry error: {0}")]
    Registry(#[from] registry::RegistryError),
    #[error("core error: {0}")]
    Core(#[from] CoreError),
    #[error("{0}")]
    Compare(#[from] CompareError),
    #[error("config error: {0}")]
    Settings(#[from] SettingsError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("unsupported engine: {0}")]
    UnsupportedEngine(String),
}

#[derive(Parser, Debug)]
#[command(name = "schemadrift", version, about = "Compare a model schema with a live database")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compare a model snapshot with a database or a saved snapshot.
    Compare(CompareArgs),
    /// Capture a database snapshot.
    Introspect(IntrospectArgs),
}

#[derive(Args, Debug)]
struct CompareArgs {
    /// Model snapshot (JSON) exported from the application.
    #[arg(long, value_name = "MODEL_JSON")]
    model: PathBuf,
    /// Database connection string.
    #[arg(long, value_name = "CONNECTION_STRING", conflicts_with = "snapshot")]
    conn: Option<String>,
    /// Previously captured database snapshot.
    #[arg(long, value_name = "SCHEMA_JSON", required_unless_present = "conn")]
    snapshot: Option<PathBuf>,
    /// Comparison config (TOML).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Output directory for runs.
    #[arg(long, default_value = "runs")]
    run_dir: PathBuf,
    /// Schema name(s) to introspect.
    #[arg(long, value_name = "SCHEMA")]
    schema: Vec<String>,
    /// Comma-delimited `[schema.]table` list to leave out of the comparison.
    #[arg(long, value_name = "TABLES")]
    tables_to_ignore: Option<String>,
    /// Match names case-insensitively.
    #[arg(long, default_value_t = false)]
    case_insensitive: bool,
    /// Skip the scan for unused tables, columns and indexes.
    #[arg(long, default_value_t = false)]
    skip_unused_check: bool,
}

#[derive(Args, Debug)]
struct IntrospectArgs {
    /// Database connection string (flag form).
    #[arg(long, value_name = "CONNECTION_STRING", conflicts_with = "conn_pos")]
    conn: Option<String>,
    /// Database connection string (positional form).
    #[arg(value_name = "CONNECTION_STRING", required_unless_present = "conn")]
    conn_pos: Option<String>,
    /// Output directory for runs.
    #[arg(long, default_value = "runs")]
    run_dir: PathBuf,
    /// Optional output path for the snapshot.
    #[arg(long)]
    out: Option<PathBuf>,
    /// Schema name(s) to include.
    #[arg(long, value_name = "SCHEMA")]
    schema: Vec<String>,
    /// Include system schemas such as pg_catalog.
    #[arg(long, default_value_t = false)]
    include_system_schemas: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode, CliError> {
    let cli = Cli::parse();

    match cli.command {
        Command::Compare(args) => run_compare(args).await,
        Command::Introspect(args) => run_introspect(args).await.map(|()| ExitCode::SUCCESS),
    }
}

async fn run_compare(args: CompareArgs) -> Result<ExitCode, CliError> {
    let CompareArgs {
        model,
        conn,
        snapshot,
        config,
        run_dir,
        schema,
        tables_to_ignore,
        case_insensitive,
        skip_unused_check,
    } = args;

    let mut compare_config = load_compare_config(config.as_deref())?;
    ConfigOverrides {
        tables_to_ignore,
        case_insensitive,
        skip_unused_check,
    }
    .apply(&mut compare_config);

    let model_schema = parse_model_json(&std::fs::read_to_string(&model)?)?;

    let (engine, saved) = match (&conn, &snapshot) {
        (Some(conn), None) => (detect_engine(conn)?.to_string(), None),
        (None, Some(path)) => {
            let saved = load_snapshot(path)?;
            (saved.engine.clone(), Some(saved))
        }
        _ => {
            return Err(CliError::InvalidConfig(
                "use exactly one of --conn or --snapshot".to_string(),
            ));
        }
    };

    let run_id = Uuid::new_v4().to_string();
    let run_ctx = RunContext {
        run_id: run_id.clone(),
        started_at: chrono::Utc::now(),
        engine: engine.clone(),
        schema_version: SCHEMA_VERSION.to_string(),
        run_dir,
        options: RunOptions {
            command: "compare".to_string(),
            model: Some(model),
            snapshot,
            schemas: (!schema.is_empty()).then(|| schema.clone()),
            compare: Some(compare_config.clone()),
        },
        connection: conn.as_deref().map(redact_connection_string),
    };

    let run_paths = start_run(&run_ctx)?;
    init_run_logging(&run_paths.logs_path)?;

    tracing::info!(event = "run_started", run_id = %run_id, engine = %engine, command = "compare");
    let timer = Instant::now();

    let database = match (saved, conn) {
        (Some(saved), _) => saved,
        (None, Some(conn)) => introspect(&conn, IntrospectOptions::for_schemas(schema)).await?,
        (None, None) => {
            return Err(CliError::InvalidConfig(
                "connection string is required".to_string(),
            ));
        }
    };
    write_schema(&run_paths, &database, None)?;

    let outcome = SchemaComparer::new(compare_config).compare(&model_schema, &database)?;
    let report = outcome.report();

    write_compare_outcome(&run_paths, &outcome)?;
    write_report(&run_paths, &report)?;
    tracing::info!(
        event = "report_written",
        path = %run_paths.report_path.display(),
        has_errors = outcome.has_errors
    );

    if report.is_empty() {
        println!("OK: {} matches the database", model_schema.context_name);
    } else {
        println!("{report}");
    }

    let duration_ms = timer.elapsed().as_millis();
    tracing::info!(
        event = "run_finished",
        status = if outcome.has_errors { "drift" } else { "success" },
        duration_ms = duration_ms
    );

    Ok(if outcome.has_errors {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

async fn run_introspect(args: IntrospectArgs) -> Result<(), CliError> {
    let IntrospectArgs {
        conn,
        conn_pos,
        run_dir,
        out,
        schema,
        include_system_schemas,
    } = args;

    let conn = match (conn, conn_pos) {
        (Some(value), None) => value,
        (None, Some(value)) => value,
        (Some(_), Some(_)) => {
            return Err(CliError::InvalidConfig(
                "use either --conn or positional connection string".to_string(),
            ));
        }
        (None, None) => {
            return Err(CliError::InvalidConfig(
                "connection string is required".to_string(),
            ));
        }
    };

    let engine = detect_engine(&conn)?;
    let options = IntrospectOptions {
        include_system_schemas,
        ..IntrospectOptions::for_schemas(schema)
    };

    let run_id = Uuid::new_v4().to_string();
    let run_ctx = RunContext {
        run_id: run_id.clone(),
        started_at: chrono::Utc::now(),
        engine: engine.to_string(),
        schema_version: SCHEMA_VERSION.to_string(),
        run_dir,
        options: RunOptions {
            command: "introspect".to_string(),
            model: None,
            snapshot: None,
            schemas: options.schemas.clone(),
            compare: None,
        },
        connection: Some(redact_connection_string(&conn)),
    };

    let run_paths = start_run(&run_ctx)?;
    init_run_logging(&run_paths.logs_path)?;

    tracing::info!(event = "run_started", run_id = %run_id, engine = %engine, command = "introspect");
    let timer = Instant::now();

    let schema = introspect(&conn, options).await?;

    write_schema(&run_paths, &schema, out.as_deref())?;
    tracing::info!(event = "schema_written", path = %run_paths.schema_path.display());

    let duration_ms = timer.elapsed().as_millis();
    tracing::info!(event = "run_finished", status = "success", duration_ms = duration_ms);

    Ok(())
}

async fn introspect(conn: &str, options: IntrospectOptions) -> Result<DatabaseSchema, CliError> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(10))
        .connect(conn)
        .await?;
    let adapter = PostgresAdapter::new(pool);

    tracing::info!(event = "introspection_started", engine = adapter.engine());
    let schema = adapter.introspect(&options).await?;
    validate_schema(&schema)?;
    tracing::info!(
        event = "introspection_finished",
        schemas = schema.schemas.len(),
        tables = schema.tables().count()
    );

    Ok(schema)
}

fn load_snapshot(path: &Path) -> Result<DatabaseSchema, CliError> {
    let content = std::fs::read_to_string(path)?;
    let schema: DatabaseSchema = serde_json::from_str(&content)?;
    validate_schema(&schema)?;
    Ok(schema)
}

fn detect_engine(conn: &str) -> Result<&'static str, CliError> {
    if conn.starts_with("postgres://") || conn.starts_with("postgresql://") {
        Ok("postgres")
    } else {
        Err(CliError::UnsupportedEngine(
            redact_connection_string(conn).redacted,
        ))
    }
}
