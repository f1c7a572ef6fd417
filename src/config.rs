use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use chrono::Datelike;

use crate::store::default_db_path;

const APP_DIR: &str = "brownlow_votes";
const DEFAULT_DATA_PATH: &str = "data/afl_gbg_";

pub const ENV_YEAR: &str = "BROWNLOW_YEAR";
pub const ENV_DATA_PATH: &str = "BROWNLOW_DATA_PATH";
pub const ENV_MODEL_PATH: &str = "BROWNLOW_MODEL_PATH";
pub const ENV_DB: &str = "BROWNLOW_DB";

/// Everything one inference run needs to know.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub year: i32,
    /// Prefix; the year's file is `{data_path}{year}.parquet`.
    pub data_path: String,
    /// Also the model identifier written with every record.
    pub model_path: String,
    pub db_path: PathBuf,
}

impl PipelineConfig {
    /// `.env.local`, `.env`, process environment, then CLI flags.
    pub fn load() -> Result<Self> {
        let _ = dotenvy::from_filename(".env.local");
        let _ = dotenvy::from_filename(".env");
        let args = std::env::args().skip(1).collect::<Vec<_>>();
        Self::from_sources(&args, |key| std::env::var(key).ok())
    }

    pub fn from_sources<F>(args: &[String], env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let setting = |flag: &str, key: &str| {
            flag_value(args, flag).or_else(|| env(key).filter(|v| !v.trim().is_empty()))
        };

        let year = match setting("--year", ENV_YEAR) {
            Some(raw) => raw
                .trim()
                .parse::<i32>()
                .with_context(|| format!("invalid year {raw:?}"))?,
            None => chrono::Local::now().year(),
        };
        let data_path =
            setting("--data-path", ENV_DATA_PATH).unwrap_or_else(|| DEFAULT_DATA_PATH.to_string());
        let model_path = setting("--model", ENV_MODEL_PATH)
            .ok_or_else(|| anyhow!("no model path: set {ENV_MODEL_PATH} or pass --model"))?;
        let db_path = setting("--db", ENV_DB)
            .map(PathBuf::from)
            .or_else(default_db_path)
            .context("unable to resolve sqlite path")?;

        Ok(Self {
            year,
            data_path: data_path.trim().to_string(),
            model_path: model_path.trim().to_string(),
            db_path,
        })
    }
}

/// `--flag value` or `--flag=value`.
pub fn flag_value(args: &[String], flag: &str) -> Option<String> {
    for (idx, arg) in args.iter().enumerate() {
        if let Some(v) = arg.strip_prefix(flag).and_then(|rest| rest.strip_prefix('='))
            && !v.trim().is_empty()
        {
            return Some(v.trim().to_string());
        }
        if arg == flag
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(next.trim().to_string());
        }
    }
    None
}

pub fn app_cache_dir() -> Option<PathBuf> {
    // Prefer XDG cache.
    if let Ok(base) = std::env::var("XDG_CACHE_HOME")
        && !base.trim().is_empty()
    {
        return Some(PathBuf::from(base).join(APP_DIR));
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".cache").join(APP_DIR))
}
