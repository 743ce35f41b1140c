//! Process configuration loaded from environment variables.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: IpAddr,
    pub port: u16,
    /// Close connections that stay silent this long (None = never)
    pub idle_timeout: Option<Duration>,
    /// Unregister an accept-time-bound participant when its connection drops
    pub remove_on_disconnect: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            idle_timeout: None,
            remove_on_disconnect: false,
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

impl ServerConfig {
    /// Load config from environment variables
    ///
    /// - `PORT` (default 3000)
    /// - `BIND_ADDR` (default 0.0.0.0)
    /// - `CHAT_IDLE_TIMEOUT_SECS` (unset or 0 disables)
    /// - `CHAT_REMOVE_ON_DISCONNECT` (default false)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let port = match non_empty_var("PORT") {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                tracing::warn!(value = %raw, "Invalid PORT, using {}", DEFAULT_PORT);
                DEFAULT_PORT
            }),
            None => DEFAULT_PORT,
        };

        let bind_addr = match non_empty_var("BIND_ADDR") {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                tracing::warn!(value = %raw, "Invalid BIND_ADDR, using {}", defaults.bind_addr);
                defaults.bind_addr
            }),
            None => defaults.bind_addr,
        };

        let idle_timeout = non_empty_var("CHAT_IDLE_TIMEOUT_SECS")
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        let remove_on_disconnect = non_empty_var("CHAT_REMOVE_ON_DISCONNECT")
            .map(|v| v != "0" && v.to_lowercase() != "false")
            .unwrap_or(false);

        let config = Self {
            bind_addr,
            port,
            idle_timeout,
            remove_on_disconnect,
        };

        tracing::info!(
            port = config.port,
            bind_addr = %config.bind_addr,
            idle_timeout = ?config.idle_timeout,
            remove_on_disconnect = config.remove_on_disconnect,
            "Server config loaded"
        );

        config
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }
}
