//! Samsung TV controller
//!
//! Tizen TVs expose a REST API on port 8001 (`/api/v2/`) for device info and
//! app launching, and a WebSocket channel on the same port for remote key
//! presses. Wake-up goes over wake-on-LAN since a TV in standby answers
//! neither surface.

use crate::config::TvConfig;
use crate::devices::{DeviceController, DeviceStatus};
use crate::error::{DenError, Result};
use crate::invoker::{CommandInvoker, CommandResult, Invocation};
use async_trait::async_trait;
use base64::Engine;
use serde_json::json;
use std::sync::Arc;
use tokio::net::UdpSocket;
use tracing::debug;
use url::Url;

/// Client name announced on the remote-control channel
const REMOTE_NAME: &str = "den-remote";

/// Controller for one Samsung TV
pub struct SamsungTv {
    config: TvConfig,
    invoker: Arc<dyn CommandInvoker>,
    rest_base: Url,
    ws_url: Url,
}

impl SamsungTv {
    /// Create a controller for the configured TV
    pub fn new(config: TvConfig, invoker: Arc<dyn CommandInvoker>) -> Result<Self> {
        let rest_base = Url::parse(&format!(
            "http://{}:{}/api/v2/",
            config.host, config.rest_port
        ))
        .map_err(|e| DenError::config(format!("Invalid TV host '{}': {e}", config.host)))?;

        let name = base64::engine::general_purpose::STANDARD.encode(REMOTE_NAME);
        let ws_url = Url::parse(&format!(
            "ws://{}:{}/api/v2/channels/samsung.remote.control?name={name}",
            config.host, config.ws_port
        ))
        .map_err(|e| DenError::config(format!("Invalid TV host '{}': {e}", config.host)))?;

        Ok(Self {
            config,
            invoker,
            rest_base,
            ws_url,
        })
    }

    /// Send one remote key press over the WebSocket channel.
    ///
    /// `key_code` is a registry value (`KEY_*`), never raw client input.
    pub async fn send_key(&self, key_code: &str) -> CommandResult {
        let payload = json!({
            "method": "ms.remote.control",
            "params": {
                "Cmd": "Click",
                "DataOfCmd": key_code,
                "Option": "false",
                "TypeOfRemote": "SendRemoteKey",
            }
        });
        self.invoker
            .invoke(
                Invocation::WsMessage {
                    url: self.ws_url.clone(),
                    payload,
                },
                self.config.command_timeout,
            )
            .await
    }

    /// Launch a Tizen application by its registry ID
    pub async fn launch_app(&self, app_id: &str) -> CommandResult {
        let url = match self.rest_base.join(&format!("applications/{app_id}")) {
            Ok(url) => url,
            Err(e) => return CommandResult::failure(format!("Invalid app URL: {e}")),
        };
        self.invoker
            .invoke(
                Invocation::HttpPost { url, body: None },
                self.config.command_timeout,
            )
            .await
    }

    /// Probe the REST API for device info
    pub async fn probe(&self) -> CommandResult {
        self.invoker
            .invoke(
                Invocation::HttpGet {
                    url: self.rest_base.clone(),
                },
                self.config.command_timeout,
            )
            .await
    }

    /// Send a wake-on-LAN magic packet to the TV's MAC address
    pub async fn wake(&self) -> Result<()> {
        let mac = self
            .config
            .mac
            .as_deref()
            .ok_or_else(|| DenError::config("TV MAC address is not configured"))?;
        let packet = magic_packet(mac)?;

        let socket = UdpSocket::bind("0.0.0.0:0").await?;
        socket.set_broadcast(true)?;
        socket.send_to(&packet, ("255.255.255.255", 9)).await?;
        debug!(mac = mac, "wake-on-LAN packet sent");
        Ok(())
    }
}

#[async_trait]
impl DeviceController for SamsungTv {
    fn name(&self) -> &str {
        &self.config.name
    }

    async fn status(&self) -> DeviceStatus {
        let probe = self.probe().await;
        let status = if probe.success {
            "online".to_string()
        } else {
            probe.error_message()
        };
        DeviceStatus::new(&self.config.name, &self.config.host, probe.success, status)
    }
}

/// Build a wake-on-LAN magic packet: six 0xFF bytes then the MAC 16 times
fn magic_packet(mac: &str) -> Result<Vec<u8>> {
    crate::validation::validate_mac(mac)?;
    let mut bytes = [0u8; 6];
    for (slot, octet) in bytes.iter_mut().zip(mac.split(&[':', '-'])) {
        let decoded = hex::decode(octet)
            .map_err(|e| DenError::invalid_input(format!("Invalid MAC octet '{octet}': {e}")))?;
        *slot = decoded[0];
    }

    let mut packet = vec![0xFF; 6];
    for _ in 0..16 {
        packet.extend_from_slice(&bytes);
    }
    Ok(packet)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoker::Invoker;
    use crate::mock::RecordingInvoker;
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn tv_config(host: &str, rest_port: u16) -> TvConfig {
        TvConfig {
            host: host.to_string(),
            rest_port,
            ws_port: rest_port,
            ..TvConfig::default()
        }
    }

    #[test]
    fn test_magic_packet_layout() {
        let packet = magic_packet("AA:BB:CC:DD:EE:FF").unwrap();
        assert_eq!(packet.len(), 102);
        assert_eq!(&packet[..6], &[0xFF; 6]);
        assert_eq!(&packet[6..12], &[0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF]);
        assert_eq!(&packet[96..], &[0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF]);
    }

    #[test]
    fn test_magic_packet_rejects_malformed_mac() {
        assert!(magic_packet("AA:BB:CC").is_err());
        assert!(magic_packet("zz:BB:CC:DD:EE:FF").is_err());
    }

    #[tokio::test]
    async fn test_send_key_shapes_ws_invocation() {
        let invoker = Arc::new(RecordingInvoker::new());
        let tv = SamsungTv::new(tv_config("192.168.1.20", 8001), invoker.clone()).unwrap();

        let result = tv.send_key("KEY_POWER").await;
        assert!(result.success);

        let calls = invoker.calls();
        assert_eq!(calls.len(), 1);
        match &calls[0] {
            Invocation::WsMessage { url, payload } => {
                assert!(url
                    .as_str()
                    .starts_with("ws://192.168.1.20:8001/api/v2/channels/samsung.remote.control"));
                assert_eq!(payload["params"]["DataOfCmd"], "KEY_POWER");
                assert_eq!(payload["params"]["Cmd"], "Click");
            }
            other => panic!("expected WsMessage, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_launch_app_hits_applications_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v2/applications/11101200001"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&server)
            .await;

        let addr = server.address();
        let invoker = Arc::new(Invoker::new().unwrap());
        let tv = SamsungTv::new(tv_config(&addr.ip().to_string(), addr.port()), invoker).unwrap();

        let result = tv.launch_app("11101200001").await;
        assert!(result.success, "{result:?}");
    }

    #[tokio::test]
    async fn test_status_degrades_when_unreachable() {
        // Port 1 refuses connections immediately.
        let invoker = Arc::new(Invoker::new().unwrap());
        let tv = SamsungTv::new(tv_config("127.0.0.1", 1), invoker).unwrap();

        let status = tv.status().await;
        assert!(!status.online);
        assert_eq!(status.ip, "127.0.0.1");
        assert!(!status.status.is_empty());
    }
}
