//! Relay configuration parsed from environment variables.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;

use canvas::consts::MAX_USERNAME_CHARS;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_BIND_ADDR: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);
pub const DEFAULT_CLIENT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    pub bind_addr: IpAddr,
    /// Per-connection outbound queue length.
    pub client_channel_capacity: usize,
    /// Longest username the relay stores, in characters.
    pub max_username_chars: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind_addr: DEFAULT_BIND_ADDR,
            client_channel_capacity: DEFAULT_CLIENT_CHANNEL_CAPACITY,
            max_username_chars: MAX_USERNAME_CHARS,
        }
    }
}

impl ServerConfig {
    /// Build config from the process environment.
    ///
    /// Optional:
    /// - `PORT`: default 3000
    /// - `BIND_ADDR`: default `0.0.0.0`
    /// - `CLIENT_CHANNEL_CAPACITY`: default 256
    /// - `MAX_USERNAME_CHARS`: default 20
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a variable is set but does not
    /// parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// See [`ServerConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let client_channel_capacity =
            parse_var(&lookup, "CLIENT_CHANNEL_CAPACITY", defaults.client_channel_capacity)?;
        let max_username_chars = parse_var(&lookup, "MAX_USERNAME_CHARS", defaults.max_username_chars)?;
        if client_channel_capacity == 0 {
            return Err(ConfigError::Invalid { var: "CLIENT_CHANNEL_CAPACITY", value: "0".into() });
        }
        if max_username_chars == 0 {
            return Err(ConfigError::Invalid { var: "MAX_USERNAME_CHARS", value: "0".into() });
        }

        Ok(Self {
            port: parse_var(&lookup, "PORT", defaults.port)?,
            bind_addr: parse_var(&lookup, "BIND_ADDR", defaults.bind_addr)?,
            client_channel_capacity,
            max_username_chars,
        })
    }

    #[must_use]
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(var) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid { var, value: raw }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
