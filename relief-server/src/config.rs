use anyhow::Context;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    pub db_path: String,
    pub host: String,
    pub port: u16,
    pub static_dir: Option<PathBuf>,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let port = match lookup("RELIEF_PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("RELIEF_PORT '{raw}' is not a port number"))?,
            None => 8080,
        };

        Ok(Self {
            db_path: lookup("RELIEF_DB_PATH").unwrap_or_else(|| "reports.db".into()),
            host: lookup("RELIEF_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            static_dir: lookup("RELIEF_STATIC_DIR")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
        })
    }

    pub fn addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = ServerConfig::from_lookup(lookup(&[])).expect("config");
        assert_eq!(config.db_path, "reports.db");
        assert_eq!(config.port, 8080);
        assert_eq!(config.static_dir, None);
        assert_eq!(config.addr().expect("addr").to_string(), "0.0.0.0:8080");
    }

    #[test]
    fn reads_overrides() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("RELIEF_DB_PATH", "/var/lib/relief/reports.db"),
            ("RELIEF_HOST", "127.0.0.1"),
            ("RELIEF_PORT", "9000"),
            ("RELIEF_STATIC_DIR", "dist"),
        ]))
        .expect("config");
        assert_eq!(config.addr().expect("addr").to_string(), "127.0.0.1:9000");
        assert_eq!(config.static_dir, Some(PathBuf::from("dist")));
    }

    #[test]
    fn bad_port_is_an_error() {
        assert!(ServerConfig::from_lookup(lookup(&[("RELIEF_PORT", "eighty")])).is_err());
    }
}
