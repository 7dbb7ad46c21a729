pub use ivory_midi::{Message, NoteMessages, u4, u7};
use std::net::{Ipv4Addr, SocketAddr, ToSocketAddrs, UdpSocket};

/// Sends each message as its own datagram with no additional framing
pub struct MidiUdpClient {
    socket: UdpSocket,
}

impl MidiUdpClient {
    pub fn new<A: ToSocketAddrs>(addrs: A) -> anyhow::Result<Self> {
        let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))?;
        socket.connect(addrs)?;
        Ok(Self { socket })
    }

    pub fn server_address(&self) -> anyhow::Result<SocketAddr> {
        Ok(self.socket.peer_addr()?)
    }

    pub fn send(&self, message: &Message) -> anyhow::Result<()> {
        let size = self.socket.send(message.as_bytes())?;
        if size != message.len() {
            anyhow::bail!(
                "only sent {} of the {} bytes of {:?}",
                size,
                message.len(),
                message
            );
        }
        Ok(())
    }

    /// Sends each message in turn, stopping at the first failure
    pub fn send_all<'a>(
        &self,
        messages: impl IntoIterator<Item = &'a Message>,
    ) -> anyhow::Result<()> {
        for message in messages {
            self.send(message)?;
        }
        Ok(())
    }
}
