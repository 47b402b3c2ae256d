pub mod noop;

use crate::registry::{ServerRecord, ServerRegistry};
use log::{error, info, warn};
use std::net::{Ipv4Addr, SocketAddrV4, UdpSocket};
use std::sync::Arc;

const SYNCHRONIZATION_SCHEME: [u8; 6] = [0xff; 6];
const MAC_REPETITIONS: usize = 16;
// Conventional WoL discard port.
const WOL_PORT: u16 = 9;

#[derive(thiserror::Error, Debug)]
pub enum WakeError {
    #[error("server '{0}' not found")]
    NotFound(String),
    #[error("server '{0}' is not active")]
    Inactive(String),
    #[error("invalid MAC address format: {0}")]
    InvalidMacAddress(String),
    #[error("invalid gateway address: {0}")]
    InvalidGatewayAddress(String),
    #[error("failed to send magic packet: {0}")]
    TransmissionFailed(#[from] std::io::Error),
}

/// Decode a MAC address string to its 6 bytes. Accepts colon- or
/// hyphen-delimited hex as well as 12 bare hex digits, either case.
pub fn parse_mac_address(mac: &str) -> Result<[u8; 6], WakeError> {
    let cleaned: String = mac.chars().filter(|c| *c != ':' && *c != '-').collect();
    if cleaned.len() != 12 || !cleaned.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(WakeError::InvalidMacAddress(mac.to_string()));
    }
    let mut bytes = [0u8; 6];
    for (i, byte) in bytes.iter_mut().enumerate() {
        *byte = u8::from_str_radix(&cleaned[i * 2..i * 2 + 2], 16)
            .map_err(|_| WakeError::InvalidMacAddress(mac.to_string()))?;
    }
    Ok(bytes)
}

/// The 102-byte WoL payload: six 0xff bytes, then the MAC repeated
/// sixteen times.
pub struct MagicPacket([u8; 102]);

impl MagicPacket {
    pub fn new(mac: [u8; 6]) -> Self {
        let mut data = [0u8; 102];
        data[..6].copy_from_slice(&SYNCHRONIZATION_SCHEME);
        for i in 0..MAC_REPETITIONS {
            data[6 + i * 6..12 + i * 6].copy_from_slice(&mac);
        }
        MagicPacket(data)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Seam for the network side effect, so the dispatch logic can be tested
/// without touching a socket.
pub trait WolTransport {
    fn send(&self, packet: &MagicPacket, dest: SocketAddrV4) -> std::io::Result<()>;
}

/// Real transport: one broadcast-capable UDP socket per send, released
/// when the call returns.
pub struct UdpBroadcast;

impl WolTransport for UdpBroadcast {
    fn send(&self, packet: &MagicPacket, dest: SocketAddrV4) -> std::io::Result<()> {
        let socket = UdpSocket::bind("0.0.0.0:0")?;
        socket.set_broadcast(true)?;
        socket.send_to(packet.as_bytes(), dest)?;
        Ok(())
    }
}

/// Validates a wake request against the registry and performs the send.
/// Holds no state between calls; concurrent wakes are independent.
pub struct WakeDispatcher {
    registry: Arc<ServerRegistry>,
    transport: Box<dyn WolTransport + Sync + Send>,
}

impl WakeDispatcher {
    pub fn new(
        registry: Arc<ServerRegistry>,
        transport: Box<dyn WolTransport + Sync + Send>,
    ) -> Self {
        WakeDispatcher {
            registry,
            transport,
        }
    }

    /// Resolve `name`, check eligibility, and broadcast one magic packet
    /// to the target's segment. Exactly one datagram leaves on success;
    /// none on any error.
    pub fn wake(&self, name: &str) -> Result<(), WakeError> {
        let server = match self.registry.find(name) {
            Some(s) => s,
            None => {
                warn!("server not found: {}", name);
                return Err(WakeError::NotFound(name.to_string()));
            }
        };
        if !server.is_active {
            warn!("server found: {} but not active", server.name);
            return Err(WakeError::Inactive(server.name.clone()));
        }
        self.send_packet(server).map_err(|e| {
            error!(
                "failed to wake {} (mac {}, gateway {}): {}",
                server.name, server.mac_address, server.gateway_ip, e
            );
            e
        })
    }

    fn send_packet(&self, server: &ServerRecord) -> Result<(), WakeError> {
        info!(
            "sending wake-on-lan packet to {} ({})",
            server.name, server.mac_address
        );
        let mac = parse_mac_address(&server.mac_address)?;
        let packet = MagicPacket::new(mac);
        let gateway: Ipv4Addr = server
            .gateway_ip
            .parse()
            .map_err(|_| WakeError::InvalidGatewayAddress(server.gateway_ip.clone()))?;
        self.transport
            .send(&packet, SocketAddrV4::new(gateway, WOL_PORT))?;
        info!(
            "wake-on-lan packet sent to {} via {}",
            server.name, server.gateway_ip
        );
        Ok(())
    }
}
