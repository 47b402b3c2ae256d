use crate::wol::{MagicPacket, WolTransport};
use log::info;
use std::net::SocketAddrV4;

pub struct LogOnlyTransport;

impl WolTransport for LogOnlyTransport {
    fn send(&self, packet: &MagicPacket, dest: SocketAddrV4) -> std::io::Result<()> {
        info!("faking {} byte send to {}", packet.as_bytes().len(), dest);
        Ok(())
    }
}
