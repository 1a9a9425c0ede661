use clap::Parser;
use serde::Deserialize;
use std::net::IpAddr;
use std::path::{Path, PathBuf};

pub const DEV_JWT_SECRET: &str = "dev-secret";

#[derive(Parser, Debug)]
#[command(name = "tripboard", about = "A shared trip itinerary planner")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Host to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Path to data directory
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Load the demo trip when the database has no trips yet
    #[arg(long)]
    pub seed: bool,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub cookie_name: String,
    pub token_days: i64,
    pub bcrypt_cost: u32,
    /// Let requests without a token read trips they are not a member of.
    pub allow_anonymous_read: bool,
}

impl ServerConfig {
    /// True when the server only accepts local connections.
    pub fn is_loopback(&self) -> bool {
        self.host == "localhost"
            || self
                .host
                .parse::<IpAddr>()
                .map(|ip| ip.is_loopback())
                .unwrap_or(false)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 4000,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: DEV_JWT_SECRET.to_string(),
            cookie_name: "jp_token".to_string(),
            token_days: 7,
            bcrypt_cost: bcrypt::DEFAULT_COST,
            allow_anonymous_read: true,
        }
    }
}

impl Config {
    pub fn load(cli: &Cli) -> anyhow::Result<Self> {
        let data_dir = Self::data_dir(cli);
        let config_path = cli
            .config
            .clone()
            .unwrap_or_else(|| data_dir.join("config.toml"));

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            Config::default()
        };

        // CLI overrides
        if let Some(ref host) = cli.host {
            config.server.host = host.clone();
        }
        if let Some(port) = cli.port {
            config.server.port = port;
        }
        if let Ok(secret) = std::env::var("JWT_SECRET") {
            if !secret.is_empty() {
                config.auth.jwt_secret = secret;
            }
        }

        // Resolve paths relative to data dir
        if config.database.path.is_none() {
            config.database.path = Some(data_dir.join("tripboard.db"));
        }

        if config.auth.jwt_secret == DEV_JWT_SECRET {
            if !config.server.is_loopback() {
                anyhow::bail!(
                    "refusing to listen on {} with the development JWT secret; \
                     set auth.jwt_secret or JWT_SECRET",
                    config.server.host
                );
            }
            tracing::warn!("Using the built-in development JWT secret; set auth.jwt_secret");
        }

        Ok(config)
    }

    pub fn data_dir(cli: &Cli) -> PathBuf {
        cli.data_dir.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".tripboard")
        })
    }

    pub fn db_path(&self) -> &Path {
        self.database
            .path
            .as_deref()
            .unwrap_or_else(|| Path::new("tripboard.db"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(data_dir: Option<PathBuf>) -> Cli {
        Cli {
            config: None,
            host: None,
            port: None,
            data_dir,
            seed: false,
        }
    }

    #[test]
    fn default_config_has_expected_values() {
        let config = Config::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 4000);
        assert_eq!(config.auth.cookie_name, "jp_token");
        assert_eq!(config.auth.token_days, 7);
        assert!(config.auth.allow_anonymous_read);
        assert!(config.database.path.is_none());
    }

    #[test]
    fn data_dir_uses_cli_override() {
        let cli = cli(Some(PathBuf::from("/tmp/test-tripboard")));
        assert_eq!(Config::data_dir(&cli), PathBuf::from("/tmp/test-tripboard"));
    }

    #[test]
    fn data_dir_defaults_to_home_dot_tripboard() {
        let dir = Config::data_dir(&cli(None));
        assert!(dir.ends_with(".tripboard"));
    }

    #[test]
    fn load_with_no_config_file_uses_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config::load(&cli(Some(tmp.path().to_path_buf()))).unwrap();
        assert_eq!(config.server.port, 4000);
        assert_eq!(config.db_path(), tmp.path().join("tripboard.db"));
    }

    #[test]
    fn load_applies_cli_overrides() {
        let tmp = tempfile::tempdir().unwrap();
        let cli = Cli {
            host: Some("127.0.0.1".to_string()),
            port: Some(8080),
            ..cli(Some(tmp.path().to_path_buf()))
        };
        let config = Config::load(&cli).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn load_reads_toml_file() {
        let tmp = tempfile::tempdir().unwrap();
        let config_path = tmp.path().join("config.toml");
        std::fs::write(
            &config_path,
            r#"
[server]
port = 9000

[database]
path = "/var/lib/tripboard/trips.db"

[auth]
cookie_name = "trip_cookie"
token_days = 1
bcrypt_cost = 4
allow_anonymous_read = false
"#,
        )
        .unwrap();

        let cli = Cli {
            config: Some(config_path),
            ..cli(Some(tmp.path().to_path_buf()))
        };
        let config = Config::load(&cli).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.db_path(), Path::new("/var/lib/tripboard/trips.db"));
        assert_eq!(config.auth.cookie_name, "trip_cookie");
        assert_eq!(config.auth.token_days, 1);
        assert_eq!(config.auth.bcrypt_cost, 4);
        assert!(!config.auth.allow_anonymous_read);
    }

    #[test]
    fn cli_overrides_beat_toml_values() {
        let tmp = tempfile::tempdir().unwrap();
        let config_path = tmp.path().join("config.toml");
        std::fs::write(
            &config_path,
            r#"
[server]
host = "192.168.1.1"
port = 9000

[auth]
jwt_secret = "a-real-secret"
"#,
        )
        .unwrap();

        let cli = Cli {
            config: Some(config_path),
            host: Some("10.0.0.1".to_string()),
            port: Some(4100),
            ..cli(Some(tmp.path().to_path_buf()))
        };
        let config = Config::load(&cli).unwrap();
        assert_eq!(config.server.host, "10.0.0.1");
        assert_eq!(config.server.port, 4100);
    }

    #[test]
    fn dev_secret_is_refused_off_loopback() {
        let tmp = tempfile::tempdir().unwrap();
        let cli = Cli {
            host: Some("0.0.0.0".to_string()),
            ..cli(Some(tmp.path().to_path_buf()))
        };
        let err = Config::load(&cli).unwrap_err();
        assert!(err.to_string().contains("development JWT secret"));
    }

    #[test]
    fn loopback_hosts_are_recognised() {
        let server = |host: &str| ServerConfig {
            host: host.to_string(),
            port: 4000,
        };
        assert!(server("127.0.0.1").is_loopback());
        assert!(server("::1").is_loopback());
        assert!(server("localhost").is_loopback());
        assert!(!server("0.0.0.0").is_loopback());
        assert!(!server("10.0.0.1").is_loopback());
    }
}
