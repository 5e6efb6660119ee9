use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::sync::OnceLock;

pub const DEFAULT_SNAPSHOT_KEY: &str = "hiring_pipeline_candidates";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotBackend {
    File(PathBuf),
    Postgres(String),
    Memory,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub snapshot_backend: SnapshotBackend,
    pub snapshot_key: String,
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub openai_model: String,
    pub openai_audio_model: Option<String>,
    pub ai_timeout_secs: u64,
    pub jwt_secret: String,
    pub api_rps: u32,
    pub cors_allowed_origins: Vec<String>,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_address: get_env("SERVER_ADDRESS")?,
            snapshot_backend: snapshot_backend_from_env()?,
            snapshot_key: get_env_or("SNAPSHOT_KEY", DEFAULT_SNAPSHOT_KEY),
            openai_api_key: get_env("OPENAI_API_KEY")?,
            openai_base_url: get_env_or("OPENAI_BASE_URL", "https://api.openai.com/v1"),
            openai_model: get_env_or("OPENAI_MODEL", "gpt-4o"),
            openai_audio_model: get_env_opt("OPENAI_AUDIO_MODEL"),
            ai_timeout_secs: get_env_parse_or("AI_TIMEOUT_SECS", 120)?,
            jwt_secret: get_env("JWT_SECRET")?,
            api_rps: get_env_parse_or("API_RPS", 20)?,
            cors_allowed_origins: get_env_opt("CORS_ALLOWED_ORIGINS")
                .map(|raw| parse_origins(&raw))
                .unwrap_or_default(),
        })
    }
}

fn snapshot_backend_from_env() -> Result<SnapshotBackend> {
    let kind = get_env_or("SNAPSHOT_BACKEND", "file");
    match kind.to_ascii_lowercase().as_str() {
        "file" => Ok(SnapshotBackend::File(PathBuf::from(get_env_or(
            "SNAPSHOT_DIR",
            "./data",
        )))),
        "postgres" => Ok(SnapshotBackend::Postgres(get_env("DATABASE_URL")?)),
        "memory" => Ok(SnapshotBackend::Memory),
        other => Err(Error::Config(format!(
            "Invalid value for SNAPSHOT_BACKEND: {} (expected file, postgres or memory)",
            other
        ))),
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_opt(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn get_env_or(name: &str, default: &str) -> String {
    get_env_opt(name).unwrap_or_else(|| default.to_string())
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match get_env_opt(name) {
        Some(raw) => raw
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        None => Ok(default),
    }
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> Option<&'static Config> {
    CONFIG.get()
}
