use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("static resources definition not found at {0}")]
    Missing(PathBuf),
    #[error("reading {path} failed: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid static resources definition: {0}")]
    Parse(#[from] roxmltree::Error),
    #[error("invalid value for {key}: {value}")]
    Env { key: &'static str, value: String },
}

/// Process settings, read from `SOLO_*` environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen_addr: SocketAddr,
    pub server_scheme: String,
    pub server_host: String,
    /// Empty means the scheme's default port.
    pub server_port: String,
    pub context_path: String,
    pub webapp_dir: PathBuf,
    pub static_resources: PathBuf,
    pub data_dir: Option<PathBuf>,
    pub blog_title: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let webapp_dir = PathBuf::from("webapp");
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            server_scheme: "http".into(),
            server_host: "localhost".into(),
            server_port: "8080".into(),
            context_path: String::new(),
            static_resources: webapp_dir.join("WEB-INF").join("static-resources.xml"),
            webapp_dir,
            data_dir: None,
            blog_title: "Solo".into(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut cfg = Self::default();
        if let Some(v) = get("SOLO_LISTEN_ADDR") {
            cfg.listen_addr = v.parse().map_err(|_| ConfigError::Env {
                key: "SOLO_LISTEN_ADDR",
                value: v.clone(),
            })?;
        }
        if let Some(v) = get("SOLO_SERVER_SCHEME") {
            cfg.server_scheme = v;
        }
        if let Some(v) = get("SOLO_SERVER_HOST") {
            cfg.server_host = v;
        }
        if let Some(v) = get("SOLO_SERVER_PORT") {
            if !v.is_empty() && v.parse::<u16>().is_err() {
                return Err(ConfigError::Env {
                    key: "SOLO_SERVER_PORT",
                    value: v,
                });
            }
            cfg.server_port = v;
        }
        if let Some(v) = get("SOLO_CONTEXT_PATH") {
            cfg.context_path = v.trim_end_matches('/').to_string();
        }
        if let Some(v) = get("SOLO_WEBAPP_DIR") {
            cfg.webapp_dir = PathBuf::from(v);
            cfg.static_resources = cfg.webapp_dir.join("WEB-INF").join("static-resources.xml");
        }
        if let Some(v) = get("SOLO_STATIC_RESOURCES") {
            cfg.static_resources = PathBuf::from(v);
        }
        cfg.data_dir = get("SOLO_DATA_DIR").filter(|v| !v.is_empty()).map(PathBuf::from);
        if let Some(v) = get("SOLO_BLOG_TITLE") {
            cfg.blog_title = v;
        }
        Ok(cfg)
    }

    /// Public base URL, e.g. `http://localhost:8080`.
    pub fn server(&self) -> String {
        if self.server_port.is_empty() {
            format!("{}://{}", self.server_scheme, self.server_host)
        } else {
            format!(
                "{}://{}:{}",
                self.server_scheme, self.server_host, self.server_port
            )
        }
    }
}
