use std::fs::{OpenOptions, create_dir_all};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use chrono::{DateTime, Utc};
use serde::Serialize;

use schemadrift_compare::CompareOutcome;
use schemadrift_core::{CompareConfig, DatabaseSchema, RedactedConnection};

use super::{RegistryError, RegistryResult};

/// Serializable options for runs.
#[derive(Debug, Clone, Serialize)]
pub struct RunOptions {
    pub command: String,
    pub model: Option<PathBuf>,
    pub snapshot: Option<PathBuf>,
    pub schemas: Option<Vec<String>>,
    pub compare: Option<CompareConfig>,
}

/// Metadata captured at run start.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub engine: String,
    pub schema_version: String,
    pub run_dir: PathBuf,
    pub options: RunOptions,
    pub connection: Option<RedactedConnection>,
}

/// JSON config written to each run directory.
#[derive(Debug, Serialize)]
pub struct RunConfig {
    pub run_id: String,
    pub started_at: String,
    pub engine: String,
    pub schema_version: String,
    pub options: RunOptions,
    pub connection: Option<RedactedConnection>,
    pub git: GitInfo,
}

/// Git metadata for reproducibility.
#[derive(Debug, Serialize)]
pub struct GitInfo {
    pub commit: Option<String>,
    pub dirty: Option<bool>,
}

/// Paths for run artifacts.
#[derive(Debug, Clone)]
pub struct RunPaths {
    pub root: PathBuf,
    pub schema_path: PathBuf,
    pub compare_path: PathBuf,
    pub report_path: PathBuf,
    pub logs_path: PathBuf,
}

/// Create `<run_dir>/<timestamp>__run_<id>/` with its `config.json` and an
/// empty `logs.ndjson`.
pub fn start_run(ctx: &RunContext) -> RegistryResult<RunPaths> {
    let timestamp = ctx.started_at.format("%Y-%m-%dT%H-%M-%SZ").to_string();
    let root = ctx.run_dir.join(format!("{timestamp}__run_{}", ctx.run_id));

    create_dir_all(&root)?;

    let paths = RunPaths {
        schema_path: root.join("database.schema.json"),
        compare_path: root.join("compare.json"),
        report_path: root.join("report.txt"),
        logs_path: root.join("logs.ndjson"),
        root,
    };

    let config = RunConfig {
        run_id: ctx.run_id.clone(),
        started_at: ctx.started_at.to_rfc3339(),
        engine: ctx.engine.clone(),
        schema_version: ctx.schema_version.clone(),
        options: ctx.options.clone(),
        connection: ctx.connection.clone(),
        git: collect_git_info(),
    };

    write_json(&paths.root.join("config.json"), &config)?;

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&paths.logs_path)?;

    Ok(paths)
}

pub fn write_schema(
    paths: &RunPaths,
    schema: &DatabaseSchema,
    out_path: Option<&Path>,
) -> RegistryResult<()> {
    write_json(&paths.schema_path, schema)?;

    if let Some(out_path) = out_path {
        if let Some(parent) = out_path.parent() {
            if !parent.as_os_str().is_empty() {
                create_dir_all(parent)?;
            }
        }
        write_json(out_path, schema)?;
    }

    Ok(())
}

pub fn write_compare_outcome(paths: &RunPaths, outcome: &CompareOutcome) -> RegistryResult<()> {
    write_json(&paths.compare_path, outcome)
}

pub fn write_report(paths: &RunPaths, report: &str) -> RegistryResult<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(&paths.report_path)?;
    file.write_all(report.as_bytes())?;
    if !report.is_empty() {
        file.write_all(b"\n")?;
    }
    Ok(())
}

pub fn collect_git_info() -> GitInfo {
    let commit = Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .and_then(|output| {
            if output.status.success() {
                Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
            } else {
                None
            }
        })
        .filter(|value| !value.is_empty());

    let dirty = Command::new("git")
        .args(["status", "--porcelain"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .map(|output| !output.stdout.is_empty());

    GitInfo { commit, dirty }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> RegistryResult<()> {
    let file = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(path)?;
    serde_json::to_writer_pretty(file, value).map_err(RegistryError::from)
}
