use anyhow::Result;
use clap::Parser;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "repasties")]
#[command(about = "Runs the repasties paste service", long_about = None)]
pub struct Cli {
    #[arg(short = 'c', long = "config")]
    pub config_path: Option<String>,
}

pub fn default_config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".repasties")
}

pub fn default_config_path() -> PathBuf {
    default_config_dir().join("config.yaml")
}

#[derive(Debug, Clone, Deserialize)]
pub struct App {
    #[serde(default = "default_app_port")]
    pub port: u16,
}

impl Default for App {
    fn default() -> Self {
        Self {
            port: default_app_port(),
        }
    }
}

fn default_app_port() -> u16 {
    3000
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreMode {
    /// A libsql server reachable over HTTP.
    Remote,
    /// An embedded database file under `data_dir`.
    Local,
}

impl StoreMode {
    fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "remote" => Some(StoreMode::Remote),
            "local" => Some(StoreMode::Local),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_mode")]
    pub mode: StoreMode,
    #[serde(default = "default_store_host")]
    pub host: String,
    #[serde(default = "default_store_port")]
    pub port: u16,
    #[serde(default = "default_store_database")]
    pub database: String,
    #[serde(default)]
    pub auth_token: Option<String>,
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            mode: default_store_mode(),
            host: default_store_host(),
            port: default_store_port(),
            database: default_store_database(),
            auth_token: None,
            data_dir: None,
        }
    }
}

impl StoreConfig {
    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(default_config_dir)
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir().join(format!("{}.db", self.database))
    }
}

fn default_store_mode() -> StoreMode {
    StoreMode::Remote
}

fn default_store_host() -> String {
    "localhost".to_string()
}

fn default_store_port() -> u16 {
    28015
}

fn default_store_database() -> String {
    "repasties".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct HighlightConfig {
    #[serde(default = "default_executable")]
    pub executable: String,
    #[serde(default = "default_style")]
    pub style: String,
    #[serde(default = "default_encoding")]
    pub encoding: String,
    #[serde(default = "default_line_numbers")]
    pub line_numbers: bool,
    #[serde(default = "default_remote_url")]
    pub remote_url: String,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            executable: default_executable(),
            style: default_style(),
            encoding: default_encoding(),
            line_numbers: default_line_numbers(),
            remote_url: default_remote_url(),
        }
    }
}

fn default_executable() -> String {
    "pygmentize".to_string()
}

fn default_style() -> String {
    "colorful".to_string()
}

fn default_encoding() -> String {
    "utf-8".to_string()
}

fn default_line_numbers() -> bool {
    true
}

fn default_remote_url() -> String {
    "http://pygments.appspot.com/".to_string()
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub app: App,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub highlight: HighlightConfig,
}

impl Config {
    pub fn new(path: &str) -> Result<Self> {
        let cfg = Config::load_config(path)?;
        Ok(cfg)
    }

    /// Builds the configuration from process environment variables, falling
    /// back to the built-in defaults for anything unset.
    pub fn from_env() -> Result<Self> {
        let mut cfg = Config::default();

        if let Ok(port) = env::var("PORT") {
            cfg.app.port = port.parse()?;
        }
        if let Ok(mode) = env::var("DB_MODE") {
            cfg.store.mode = StoreMode::from_str(&mode)
                .ok_or_else(|| anyhow::anyhow!("invalid DB_MODE: {}", mode))?;
        }
        if let Ok(host) = env::var("DB_HOST") {
            cfg.store.host = host;
        }
        if let Ok(port) = env::var("DB_PORT") {
            cfg.store.port = port.parse()?;
        }
        if let Ok(database) = env::var("DB_NAME") {
            cfg.store.database = database;
        }
        cfg.store.auth_token = env::var("DB_AUTH_TOKEN").ok();
        if let Ok(executable) = env::var("HIGHLIGHTER") {
            cfg.highlight.executable = executable;
        }
        if let Ok(url) = env::var("HIGHLIGHT_URL") {
            cfg.highlight.remote_url = url;
        }

        Ok(cfg)
    }

    pub fn from_yaml(yaml_str: &str) -> Result<Self> {
        let yaml_with_env = Config::substitute_env_vars(yaml_str)?;
        let config: Config = serde_yaml::from_str(&yaml_with_env)?;
        Ok(config)
    }

    fn load_config(path: &str) -> Result<Config> {
        let yaml_str = fs::read_to_string(path)?;
        Config::from_yaml(&yaml_str)
    }

    fn substitute_env_vars(yaml_str: &str) -> Result<String> {
        let mut result = yaml_str.to_string();
        let mut offset = 0;

        while let Some(start) = result[offset..].find("${") {
            let actual_start = offset + start;
            if let Some(end) = result[actual_start..].find("}") {
                let var_name = &result[actual_start + 2..actual_start + end];

                // ${VAR:-default}
                let env_value = if let Some(default_start) = var_name.find(":-") {
                    let actual_var = &var_name[..default_start];
                    let default_val = &var_name[default_start + 2..];
                    env::var(actual_var).unwrap_or_else(|_| default_val.to_string())
                } else {
                    env::var(var_name).unwrap_or_else(|_| {
                        tracing::warn!(var = var_name, "environment variable not found");
                        String::new()
                    })
                };

                result.replace_range(actual_start..actual_start + end + 1, &env_value);
                offset = actual_start + env_value.len();
            } else {
                break;
            }
        }

        Ok(result)
    }
}
