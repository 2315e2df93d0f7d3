//! Daemon configuration, read from `FLEETSURE_*` environment variables

use anyhow::{bail, Context, Result};
use fleetsure_api_rpc::server::{DEFAULT_RPC_HOST, DEFAULT_RPC_PORT};
use std::path::PathBuf;

const DEFAULT_DB_PATH: &str = "~/.fleetsure/fleetsure.db";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Which job-number allocator to run with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobNumberMode {
    /// Per-year counter seeded from the highest stored number
    Sequential,
    Random,
}

#[derive(Debug, Clone)]
pub struct DaemonConfig {
    pub db_path: PathBuf,
    pub rpc_host: String,
    pub rpc_port: u16,
    pub log_format: LogFormat,
    pub log_dir: Option<PathBuf>,
    pub job_numbers: JobNumberMode,
}

impl DaemonConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as unset
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let db_path = get("FLEETSURE_DB_PATH").unwrap_or_else(|| DEFAULT_DB_PATH.to_string());
        let db_path = PathBuf::from(shellexpand::tilde(&db_path).into_owned());

        let rpc_port = match get("FLEETSURE_RPC_PORT") {
            Some(port) => port
                .parse()
                .with_context(|| format!("FLEETSURE_RPC_PORT must be a port number, got {port:?}"))?,
            None => DEFAULT_RPC_PORT,
        };

        let log_format = match get("FLEETSURE_LOG_FORMAT").as_deref() {
            None | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => bail!("FLEETSURE_LOG_FORMAT must be pretty or json, got {other:?}"),
        };

        let job_numbers = match get("FLEETSURE_JOB_NUMBERS").as_deref() {
            None | Some("sequential") => JobNumberMode::Sequential,
            Some("random") => JobNumberMode::Random,
            Some(other) => {
                bail!("FLEETSURE_JOB_NUMBERS must be sequential or random, got {other:?}")
            }
        };

        Ok(Self {
            db_path,
            rpc_host: get("FLEETSURE_RPC_HOST").unwrap_or_else(|| DEFAULT_RPC_HOST.to_string()),
            rpc_port,
            log_format,
            log_dir: get("FLEETSURE_LOG_DIR")
                .map(|dir| PathBuf::from(shellexpand::tilde(&dir).into_owned())),
            job_numbers,
        })
    }
}
