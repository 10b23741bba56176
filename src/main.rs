//! den-remote server - main entry point

use clap::Parser;
use den_remote::{config, server, Result, ServerConfig};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// den-remote server configuration
#[derive(Parser, Debug)]
#[command(name = "den-remote")]
#[command(about = "Local-network remote control server for living room devices")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "DEN_PORT", default_value = "3000")]
    port: u16,

    /// Bind address
    #[arg(long, env = "DEN_BIND", default_value = "0.0.0.0")]
    bind: String,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,

    /// Samsung TV host on the local network
    #[arg(long, env = "DEN_TV_HOST")]
    tv_host: String,

    /// Samsung TV MAC address for wake-on-LAN
    #[arg(long, env = "DEN_TV_MAC")]
    tv_mac: Option<String>,

    /// Chromecast host on the local network
    #[arg(long, env = "DEN_CAST_HOST")]
    cast_host: String,

    /// PS5 host on the local network
    #[arg(long, env = "DEN_PS5_HOST")]
    ps5_host: String,

    /// Cast helper binary
    #[arg(long, env = "DEN_CAST_HELPER", default_value = "catt")]
    cast_helper: String,

    /// PS5 helper binary
    #[arg(long, env = "DEN_PS5_HELPER", default_value = "playactor")]
    ps5_helper: String,

    /// Device command timeout in seconds (TV and Chromecast)
    #[arg(long, env = "DEN_COMMAND_TIMEOUT", default_value = "10")]
    command_timeout: u64,
}

impl Args {
    /// Initialize logging based on debug flag
    fn initialize_logging(&self) {
        let filter = if self.debug {
            EnvFilter::new("debug")
        } else {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
        };

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact())
            .init();
    }

    /// Assemble the immutable server configuration
    fn into_config(self) -> ServerConfig {
        ServerConfig {
            http: config::HttpConfig {
                host: self.bind,
                port: self.port,
            },
            tv: config::TvConfig {
                host: self.tv_host,
                mac: self.tv_mac,
                command_timeout: Duration::from_secs(self.command_timeout),
                ..Default::default()
            },
            cast: config::CastConfig {
                host: self.cast_host,
                helper: self.cast_helper,
                command_timeout: Duration::from_secs(self.command_timeout),
                ..Default::default()
            },
            ps5: config::Ps5Config {
                host: self.ps5_host,
                helper: self.ps5_helper,
                ..Default::default()
            },
            limits: config::CommandLimits::default(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    args.initialize_logging();

    info!("🚀 Starting den-remote v{}", env!("CARGO_PKG_VERSION"));

    let config = args.into_config();
    config.validate()?;

    server::serve(config).await
}
