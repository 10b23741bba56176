//! Configuration for the den-remote server
//!
//! Everything here is read once at startup (CLI flags and environment) and
//! treated as immutable for the process lifetime. Device addresses are plain
//! hosts on the local network; ports and timeouts have defaults matching the
//! vendor endpoints.

use crate::error::{DenError, Result};
use crate::server::rate_limiter::RateLimitConfig;
use crate::validation;
use std::time::Duration;

/// Top-level server configuration
#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
    /// HTTP listener configuration
    pub http: HttpConfig,

    /// Samsung TV configuration
    pub tv: TvConfig,

    /// Chromecast configuration
    pub cast: CastConfig,

    /// PS5 configuration
    pub ps5: Ps5Config,

    /// Per-command-family rate limits
    pub limits: CommandLimits,
}

/// HTTP listener configuration
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Bind address
    pub host: String,

    /// Bind port
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

/// Samsung TV configuration
#[derive(Debug, Clone)]
pub struct TvConfig {
    /// TV host on the local network
    pub host: String,

    /// MAC address for wake-on-LAN, if known
    pub mac: Option<String>,

    /// Display name reported in status responses
    pub name: String,

    /// Port of the Tizen REST API
    pub rest_port: u16,

    /// Port of the remote-control WebSocket channel
    pub ws_port: u16,

    /// Hard deadline for one TV command
    pub command_timeout: Duration,
}

impl Default for TvConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            mac: None,
            name: "Samsung TV".to_string(),
            rest_port: 8001,
            ws_port: 8001,
            command_timeout: Duration::from_secs(5),
        }
    }
}

/// Chromecast configuration
#[derive(Debug, Clone)]
pub struct CastConfig {
    /// Chromecast host on the local network
    pub host: String,

    /// Helper binary dispatching cast commands
    pub helper: String,

    /// Display name reported in status responses
    pub name: String,

    /// Hard deadline for one cast command
    pub command_timeout: Duration,
}

impl Default for CastConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            helper: "catt".to_string(),
            name: "Chromecast".to_string(),
            command_timeout: Duration::from_secs(10),
        }
    }
}

/// PS5 configuration
#[derive(Debug, Clone)]
pub struct Ps5Config {
    /// Console host on the local network
    pub host: String,

    /// Helper binary dispatching console commands
    pub helper: String,

    /// Display name reported in status responses
    pub name: String,

    /// Hard deadline for one console command (wake is slow)
    pub command_timeout: Duration,
}

impl Default for Ps5Config {
    fn default() -> Self {
        Self {
            host: String::new(),
            helper: "playactor".to_string(),
            name: "PlayStation 5".to_string(),
            command_timeout: Duration::from_secs(15),
        }
    }
}

/// Rate limits per command family.
///
/// Each family owns an independent limiter: casting is throttled harder than
/// key presses, and app launches harder still since they restart receivers.
#[derive(Debug, Clone)]
pub struct CommandLimits {
    /// Cast playback control and media casting
    pub cast_control: RateLimitConfig,

    /// TV key presses and PS5 button presses
    pub key_press: RateLimitConfig,

    /// App launches and power transitions
    pub app_launch: RateLimitConfig,
}

impl Default for CommandLimits {
    fn default() -> Self {
        Self {
            cast_control: RateLimitConfig::per_window(5, Duration::from_secs(1)),
            key_press: RateLimitConfig::per_window(10, Duration::from_secs(1)),
            app_launch: RateLimitConfig::per_window(2, Duration::from_secs(5)),
        }
    }
}

impl ServerConfig {
    /// Validate configuration before the server starts
    pub fn validate(&self) -> Result<()> {
        if self.http.port == 0 {
            return Err(DenError::config("Listen port cannot be 0"));
        }

        for (label, host) in [
            ("TV", &self.tv.host),
            ("Chromecast", &self.cast.host),
            ("PS5", &self.ps5.host),
        ] {
            if host.is_empty() {
                return Err(DenError::config(format!("{label} host is not configured")));
            }
        }

        if let Some(mac) = &self.tv.mac {
            validation::validate_mac(mac)
                .map_err(|e| DenError::config(format!("TV MAC address: {e}")))?;
        }

        for (label, timeout) in [
            ("TV", self.tv.command_timeout),
            ("Chromecast", self.cast.command_timeout),
            ("PS5", self.ps5.command_timeout),
        ] {
            if timeout.is_zero() {
                return Err(DenError::config(format!(
                    "{label} command timeout cannot be zero"
                )));
            }
        }

        for (label, limits) in [
            ("cast control", &self.limits.cast_control),
            ("key press", &self.limits.key_press),
            ("app launch", &self.limits.app_launch),
        ] {
            if limits.max_requests == 0 {
                return Err(DenError::config(format!(
                    "Max requests cannot be 0 for {label}"
                )));
            }
            if limits.window.is_zero() {
                return Err(DenError::config(format!(
                    "Rate limit window cannot be zero for {label}"
                )));
            }
        }

        if self.cast.helper.is_empty() || self.ps5.helper.is_empty() {
            return Err(DenError::config("Helper binary names cannot be empty"));
        }

        Ok(())
    }
}
