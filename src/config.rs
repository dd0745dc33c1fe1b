use http::{HeaderName, Method};
use serde::Deserialize;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub workspaces: Workspaces,
    #[serde(default)]
    pub server: Server,
    #[serde(default)]
    pub cors: Cors,
    #[serde(default)]
    pub logging: Logging,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Workspaces {
    #[serde(default = "default_root_dir")]
    pub root_dir: PathBuf,
}
fn default_root_dir() -> PathBuf { PathBuf::from("./workspaces") }
impl Default for Workspaces {
    fn default() -> Self { Self { root_dir: default_root_dir() } }
}

#[derive(Debug, Deserialize, Clone)]
pub struct Server {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_base_path")]
    pub base_path: String,
}
fn default_bind_addr() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 8000 }
fn default_base_path() -> String { "/api/v1".to_string() }
impl Default for Server {
    fn default() -> Self {
        Self { bind_addr: default_bind_addr(), port: default_port(), base_path: default_base_path() }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct Cors {
    #[serde(default = "default_allow_origins")]
    pub allow_origins: Vec<String>,
    #[serde(default = "default_allow_methods")]
    pub allow_methods: Vec<String>,
    #[serde(default = "default_allow_headers")]
    pub allow_headers: Vec<String>,
    #[serde(default)]
    pub allow_credentials: bool,
}
fn default_allow_origins() -> Vec<String> {
    vec!["http://localhost:3000".into(), "http://127.0.0.1:3000".into()]
}
fn default_allow_methods() -> Vec<String> {
    ["GET", "POST", "PUT", "DELETE", "OPTIONS"].map(String::from).to_vec()
}
fn default_allow_headers() -> Vec<String> {
    vec!["Authorization".into(), "Content-Type".into()]
}
impl Default for Cors {
    fn default() -> Self {
        Self {
            allow_origins: default_allow_origins(),
            allow_methods: default_allow_methods(),
            allow_headers: default_allow_headers(),
            allow_credentials: false,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct Logging {
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default = "default_json")]
    pub json: bool,
}
fn default_level() -> String { "info".to_string() }
fn default_json() -> bool { true }
impl Default for Logging {
    fn default() -> Self { Self { level: default_level(), json: default_json() } }
}

impl Config {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)?;
        if path.extension().map(|e| e == "json").unwrap_or(false) {
            Ok(serde_json::from_str(&raw)?)
        } else {
            Ok(toml::from_str(&raw)?)
        }
    }

    /// Applies `WORKSPACE_ROOT` and the `ALLOW_*` overrides. List values are
    /// comma separated.
    pub fn apply_env<F>(&mut self, lookup: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("WORKSPACE_ROOT") {
            self.workspaces.root_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup("ALLOW_ORIGINS") { self.cors.allow_origins = parse_csv_list(&v); }
        if let Some(v) = lookup("ALLOW_METHODS") { self.cors.allow_methods = parse_csv_list(&v); }
        if let Some(v) = lookup("ALLOW_HEADERS") { self.cors.allow_headers = parse_csv_list(&v); }
        if let Some(v) = lookup("ALLOW_CREDENTIALS") {
            self.cors.allow_credentials = match v.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" | "" => false,
                other => anyhow::bail!("ALLOW_CREDENTIALS must be a boolean, got {other:?}"),
            };
        }
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        self.socket_addr()?;
        let base = &self.server.base_path;
        if !base.starts_with('/') { anyhow::bail!("base_path must start with '/': {base}"); }
        if base.len() > 1 && base.ends_with('/') { anyhow::bail!("base_path must not end with '/': {base}"); }
        for m in &self.cors.allow_methods {
            Method::from_bytes(m.as_bytes()).map_err(|_| anyhow::anyhow!("invalid CORS method: {m}"))?;
        }
        for h in &self.cors.allow_headers {
            HeaderName::from_bytes(h.as_bytes()).map_err(|_| anyhow::anyhow!("invalid CORS header: {h}"))?;
        }
        if self.cors.allow_credentials && self.cors.allow_origins.iter().any(|o| o == "*") {
            anyhow::bail!("allow_credentials cannot be combined with a wildcard origin");
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let raw = format!("{}:{}", self.server.bind_addr, self.server.port);
        raw.parse().map_err(|e| anyhow::anyhow!("invalid bind address {raw}: {e}"))
    }

    /// Routes are mounted under this prefix; `/` mounts them at the top.
    pub fn route_prefix(&self) -> &str {
        self.server.base_path.trim_end_matches('/')
    }
}

/// `"a, b,,c"` → `["a", "b", "c"]`; blank input → empty list.
pub fn parse_csv_list(raw: &str) -> Vec<String> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty()).map(String::from).collect()
}
