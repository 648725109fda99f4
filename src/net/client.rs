//=========================================================================
// Net Client
//=========================================================================
//
// Non-blocking TCP connection polled once per logic tick.
//
// send() only queues; poll() flushes the outbox, reads what is available
// and returns every complete packet. Nothing here blocks the tick except
// the initial connect and join handshake.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::io::{ErrorKind, Read, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, info};

//=== Internal Dependencies ===============================================

use super::codec::{encode_frame, FrameDecoder};
use super::packet::{Packet, PlayerId};
use super::NetError;

//=== Constants ===========================================================

const HANDSHAKE_POLL: Duration = Duration::from_millis(2);

//=== NetClient ===========================================================

pub struct NetClient {
    stream: TcpStream,
    peer: SocketAddr,
    decoder: FrameDecoder,
    outbox: Vec<u8>,
}

impl NetClient {
    /// Opens a connection, failing with `ConnectTimeout` after `timeout`.
    pub fn connect(addr: &str, timeout: Duration) -> Result<Self, NetError> {
        let peer = addr
            .to_socket_addrs()
            .map_err(|_| NetError::BadAddress(addr.to_string()))?
            .next()
            .ok_or_else(|| NetError::BadAddress(addr.to_string()))?;

        let stream = TcpStream::connect_timeout(&peer, timeout).map_err(|e| connect_error(addr, e))?;
        stream.set_nonblocking(true)?;
        stream.set_nodelay(true)?;

        debug!("Connected to {}", peer);
        Ok(Self {
            stream,
            peer,
            decoder: FrameDecoder::new(),
            outbox: Vec::new(),
        })
    }

    /// Connects, sends Hello and waits for Welcome or Rejected.
    ///
    /// Packets that arrive alongside Welcome (the first roster) are
    /// returned so the caller does not miss them.
    pub fn join(addr: &str, name: &str, timeout: Duration) -> Result<(Self, PlayerId, Vec<Packet>), NetError> {
        let deadline = Instant::now() + timeout;
        let mut client = Self::connect(addr, timeout)?;
        client.send(&Packet::Hello { name: name.to_string() })?;

        loop {
            let mut packets = client.poll()?.into_iter();
            while let Some(packet) = packets.next() {
                match packet {
                    Packet::Welcome { player_id } => {
                        info!("Joined {} as player {}", client.peer, player_id);
                        return Ok((client, player_id, packets.collect()));
                    }
                    Packet::Rejected { reason } => return Err(NetError::Rejected(reason)),
                    other => debug!("Ignoring {:?} before Welcome", other),
                }
            }
            if Instant::now() >= deadline {
                return Err(NetError::ConnectTimeout(addr.to_string()));
            }
            thread::sleep(HANDSHAKE_POLL);
        }
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Queues `packet`; it goes out on the next `poll`.
    pub fn send(&mut self, packet: &Packet) -> Result<(), NetError> {
        let frame = encode_frame(packet)?;
        self.outbox.extend_from_slice(&frame);
        Ok(())
    }

    /// Flushes queued bytes and returns every packet received so far.
    pub fn poll(&mut self) -> Result<Vec<Packet>, NetError> {
        self.flush()?;

        let mut chunk = [0u8; 1024];
        loop {
            match self.stream.read(&mut chunk) {
                Ok(0) => {
                    // Deliver what arrived before the close (e.g. Rejected).
                    let packets = self.decoder.drain_packets()?;
                    if packets.is_empty() {
                        return Err(NetError::Disconnected);
                    }
                    return Ok(packets);
                }
                Ok(n) => self.decoder.extend(&chunk[..n]),
                Err(e) if e.kind() == ErrorKind::WouldBlock => break,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) if is_disconnect(&e) => return Err(NetError::Disconnected),
                Err(e) => return Err(e.into()),
            }
        }

        self.decoder.drain_packets()
    }

    /// Sends Disconnect and writes it out before dropping the socket.
    pub fn disconnect(mut self) {
        if self.send(&Packet::Disconnect).is_ok() {
            let _ = self.stream.set_nonblocking(false);
            let _ = self.stream.write_all(&self.outbox);
        }
        debug!("Disconnected from {}", self.peer);
    }

    fn flush(&mut self) -> Result<(), NetError> {
        while !self.outbox.is_empty() {
            match self.stream.write(&self.outbox) {
                Ok(0) => return Err(NetError::Disconnected),
                Ok(n) => {
                    self.outbox.drain(..n);
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => break,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) if is_disconnect(&e) => return Err(NetError::Disconnected),
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}

fn connect_error(addr: &str, e: std::io::Error) -> NetError {
    match e.kind() {
        ErrorKind::TimedOut | ErrorKind::WouldBlock => NetError::ConnectTimeout(addr.to_string()),
        _ => NetError::Io(e),
    }
}

fn is_disconnect(e: &std::io::Error) -> bool {
    matches!(
        e.kind(),
        ErrorKind::ConnectionReset | ErrorKind::ConnectionAborted | ErrorKind::BrokenPipe
    )
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::ServerHandle;

    const TIMEOUT: Duration = Duration::from_secs(2);

    /// Polls until `pred` matches a packet or the timeout passes.
    fn wait_for(client: &mut NetClient, pred: impl Fn(&Packet) -> bool) -> Packet {
        let deadline = Instant::now() + TIMEOUT;
        loop {
            for packet in client.poll().unwrap() {
                if pred(&packet) {
                    return packet;
                }
            }
            assert!(Instant::now() < deadline, "timed out waiting for packet");
            thread::sleep(Duration::from_millis(2));
        }
    }

    #[test]
    fn bad_address_is_reported() {
        let result = NetClient::connect("not an address", TIMEOUT);
        assert!(matches!(result, Err(NetError::BadAddress(_))));
    }

    #[test]
    fn connect_to_closed_port_fails() {
        let addr = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap()
        };
        assert!(NetClient::connect(&addr.to_string(), TIMEOUT).is_err());
    }

    #[test]
    fn connect_timeouts_become_connect_timeout() {
        for kind in [ErrorKind::TimedOut, ErrorKind::WouldBlock] {
            let error = connect_error("10.0.0.1:7777", std::io::Error::from(kind));
            assert!(matches!(error, NetError::ConnectTimeout(addr) if addr == "10.0.0.1:7777"));
        }
        let refused = connect_error("10.0.0.1:7777", std::io::Error::from(ErrorKind::ConnectionRefused));
        assert!(matches!(refused, NetError::Io(_)));
    }

    #[test]
    fn silent_server_times_out_join() {
        // Accepted by the backlog, never answered.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap().to_string();

        let started = Instant::now();
        let result = NetClient::join(&addr, "Anne", Duration::from_millis(100));

        assert!(matches!(result, Err(NetError::ConnectTimeout(_))));
        assert!(started.elapsed() < TIMEOUT);
    }

    #[test]
    fn join_receives_welcome_and_roster() {
        let server = ServerHandle::spawn("127.0.0.1:0", 4).unwrap();
        let addr = server.local_addr().to_string();

        let (mut client, id, early) = NetClient::join(&addr, "Anne", TIMEOUT).unwrap();
        assert_eq!(id, 0);

        let roster = early
            .into_iter()
            .find(|p| matches!(p, Packet::LobbyState { .. }))
            .unwrap_or_else(|| wait_for(&mut client, |p| matches!(p, Packet::LobbyState { .. })));
        let Packet::LobbyState { players } = roster else { unreachable!() };
        assert_eq!(players.len(), 1);
        assert!(players[0].host);
    }

    #[test]
    fn duplicate_name_is_rejected() {
        let server = ServerHandle::spawn("127.0.0.1:0", 4).unwrap();
        let addr = server.local_addr().to_string();

        let _first = NetClient::join(&addr, "Mary", TIMEOUT).unwrap();
        let second = NetClient::join(&addr, "Mary", TIMEOUT);
        assert!(matches!(second, Err(NetError::Rejected(reason)) if reason == "name already taken"));
    }

    #[test]
    fn chat_reaches_other_players() {
        let server = ServerHandle::spawn("127.0.0.1:0", 4).unwrap();
        let addr = server.local_addr().to_string();

        let (mut anne, anne_id, _) = NetClient::join(&addr, "Anne", TIMEOUT).unwrap();
        let (mut mary, _, _) = NetClient::join(&addr, "Mary", TIMEOUT).unwrap();

        anne.send(&Packet::Chat { from: 0, text: "ahoy".into() }).unwrap();
        anne.poll().unwrap();

        let chat = wait_for(&mut mary, |p| matches!(p, Packet::Chat { .. }));
        assert_eq!(chat, Packet::Chat { from: anne_id, text: "ahoy".into() });
    }

    #[test]
    fn leaving_updates_roster_for_remaining_players() {
        let server = ServerHandle::spawn("127.0.0.1:0", 4).unwrap();
        let addr = server.local_addr().to_string();

        let (mut anne, _, _) = NetClient::join(&addr, "Anne", TIMEOUT).unwrap();
        let (mary, _, _) = NetClient::join(&addr, "Mary", TIMEOUT).unwrap();
        wait_for(&mut anne, |p| matches!(p, Packet::LobbyState { players } if players.len() == 2));

        mary.disconnect();
        wait_for(&mut anne, |p| matches!(p, Packet::LobbyState { players } if players.len() == 1));
    }

    #[test]
    fn stopped_server_disconnects_client() {
        let mut server = ServerHandle::spawn("127.0.0.1:0", 4).unwrap();
        let addr = server.local_addr().to_string();
        let (mut client, _, _) = NetClient::join(&addr, "Jack", TIMEOUT).unwrap();

        server.stop();
        assert!(!server.is_running());

        let deadline = Instant::now() + TIMEOUT;
        loop {
            match client.poll() {
                Err(NetError::Disconnected) => break,
                Ok(_) => {}
                Err(e) => panic!("unexpected error: {e}"),
            }
            assert!(Instant::now() < deadline, "client never saw the disconnect");
            thread::sleep(Duration::from_millis(2));
        }
    }
}
