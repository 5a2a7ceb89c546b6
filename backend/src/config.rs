use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;
const DEFAULT_OP_TIMEOUT_SECS: u64 = 5;
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),
    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreMode {
    Memory,
    Database,
}

impl FromStr for StoreMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StoreMode::Memory),
            "database" => Ok(StoreMode::Database),
            _ => Err(ConfigError::Invalid { name: "MODE", value: s.to_string() }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbSettings {
    pub url: String,
    pub connect_timeout: Duration,
    pub op_timeout: Duration,
    pub max_connections: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub mode: StoreMode,
    pub database: Option<DbSettings>,
    pub server_url: String,
    pub bot_token: String,
    pub team_name: String,
    pub bot_hostname: String,
    /// Socket as advertised to the chat platform, e.g. `:8080`.
    pub bot_socket: String,
    pub listen: SocketAddr,
}

/// Accepts `:8080` (all interfaces) as well as a full `host:port`.
pub fn parse_socket(socket: &str) -> Result<SocketAddr, ConfigError> {
    let invalid = || ConfigError::Invalid { name: "BOT_SOCKET", value: socket.to_string() };

    if let Some(port) = socket.strip_prefix(':') {
        let port = port.parse::<u16>().map_err(|_| invalid())?;
        return Ok(SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, port)));
    }
    socket.parse().map_err(|_| invalid())
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |name: &'static str| {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };
        let number = |name: &'static str, default: u64| match lookup(name) {
            Some(value) => value
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::Invalid { name, value }),
            None => Ok(default),
        };

        let mode: StoreMode = require("MODE")?.parse()?;

        let database = match mode {
            StoreMode::Memory => None,
            StoreMode::Database => {
                let max_connections = number("DB_MAX_CONNECTIONS", u64::from(DEFAULT_MAX_CONNECTIONS))?;
                Some(DbSettings {
                    url: require("DATABASE_URL")?,
                    connect_timeout: Duration::from_secs(number("DB_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS)?),
                    op_timeout: Duration::from_secs(number("DB_OP_TIMEOUT_SECS", DEFAULT_OP_TIMEOUT_SECS)?),
                    max_connections: u32::try_from(max_connections).map_err(|_| ConfigError::Invalid {
                        name: "DB_MAX_CONNECTIONS",
                        value: max_connections.to_string(),
                    })?,
                })
            }
        };

        let bot_socket = require("BOT_SOCKET")?;
        let listen = parse_socket(&bot_socket)?;

        Ok(Self {
            mode,
            database,
            server_url: require("SERVER_URL")?.trim_end_matches('/').to_string(),
            bot_token: require("BOT_TOKEN")?,
            team_name: require("TEAM_NAME")?,
            bot_hostname: require("BOT_HOSTNAME")?,
            bot_socket,
            listen,
        })
    }

    /// URL the chat platform calls for a command path.
    pub fn command_url(&self, path: &str) -> String {
        format!("http://{}:{}{}", self.bot_hostname, self.listen.port(), path)
    }
}
