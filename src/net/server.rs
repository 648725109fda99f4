//=========================================================================
// Lobby Server
//=========================================================================
//
// Background thread that accepts TCP connections and drives a Lobby.
//
//   spawn() ──► thread binds ──► ready channel ──► spawn() returns
//                   │
//                   └─ loop: accept → read → Lobby → route → flush
//
// The caller blocks on the ready channel until the socket is bound (or
// binding failed), so a client can connect immediately after spawn().
// Sockets are non-blocking; each connection keeps an outbox that is
// flushed as far as the OS accepts. A peer whose outbox passes
// MAX_OUTBOX (it stopped reading) is dropped, as is one that has not
// sent Hello within HELLO_TIMEOUT.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::io::{ErrorKind, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, RecvTimeoutError};
use log::{debug, error, info, warn};

//=== Internal Dependencies ===============================================

use super::codec::{encode_frame, FrameDecoder};
use super::lobby::{JoinOutcome, Lobby, Outgoing};
use super::packet::{Packet, PlayerId};
use super::NetError;

//=== Constants ===========================================================

const STARTUP_TIMEOUT: Duration = Duration::from_secs(5);
const IDLE_SLEEP: Duration = Duration::from_millis(2);
const HELLO_TIMEOUT: Duration = Duration::from_secs(5);

/// Queued bytes allowed per peer before it is dropped.
const MAX_OUTBOX: usize = 64 * 1024;

//=== ServerHandle ========================================================

/// Owns the server thread; stops it on [`ServerHandle::stop`] or drop.
pub struct ServerHandle {
    local_addr: SocketAddr,
    shutdown: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl ServerHandle {
    /// Binds `addr` on a new thread and waits until it is listening.
    pub fn spawn(addr: impl ToSocketAddrs, max_players: usize) -> Result<Self, NetError> {
        let addr = addr
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| NetError::BadAddress("no socket address".into()))?;

        let shutdown = Arc::new(AtomicBool::new(false));
        let (ready_tx, ready_rx) = bounded(1);
        let thread_shutdown = Arc::clone(&shutdown);

        let thread = thread::Builder::new()
            .name("lobby-server".into())
            .spawn(move || {
                let listener = match bind(addr) {
                    Ok(listener) => listener,
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };
                let local = listener.local_addr();
                if ready_tx.send(local.map_err(NetError::from)).is_err() {
                    return;
                }

                let seed = std::time::SystemTime::now()
                    .duration_since(std::time::UNIX_EPOCH)
                    .map_or(0, |d| d.as_nanos() as u64);
                Server::new(listener, Lobby::new(max_players, seed)).run(&thread_shutdown);
            })?;

        let local_addr = match ready_rx.recv_timeout(STARTUP_TIMEOUT) {
            Ok(Ok(local_addr)) => local_addr,
            Ok(Err(e)) => {
                let _ = thread.join();
                return Err(e);
            }
            Err(RecvTimeoutError::Timeout) => {
                shutdown.store(true, Ordering::Relaxed);
                return Err(NetError::ServerStartup("server thread did not report ready".into()));
            }
            Err(RecvTimeoutError::Disconnected) => {
                let _ = thread.join();
                return Err(NetError::ServerStartup("server thread exited during startup".into()));
            }
        };

        info!("Lobby server listening on {}", local_addr);
        Ok(Self {
            local_addr,
            shutdown,
            thread: Some(thread),
        })
    }

    /// Actual bound address (resolves port 0).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn is_running(&self) -> bool {
        self.thread.as_ref().is_some_and(|t| !t.is_finished())
    }

    pub fn stop(&mut self) {
        let Some(thread) = self.thread.take() else {
            return;
        };
        self.shutdown.store(true, Ordering::Relaxed);
        if thread.join().is_err() {
            error!("Lobby server thread panicked");
        } else {
            info!("Lobby server on {} stopped", self.local_addr);
        }
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

fn bind(addr: SocketAddr) -> Result<TcpListener, NetError> {
    let listener = TcpListener::bind(addr)?;
    listener.set_nonblocking(true)?;
    Ok(listener)
}

//=== Connection ==========================================================

struct Connection {
    stream: TcpStream,
    peer: SocketAddr,
    decoder: FrameDecoder,
    outbox: Vec<u8>,
    player: Option<PlayerId>,
    accepted_at: Instant,
    /// Close once the outbox drains (rejected joins).
    closing: bool,
    dead: bool,
}

impl Connection {
    fn new(stream: TcpStream, peer: SocketAddr) -> Result<Self, NetError> {
        stream.set_nonblocking(true)?;
        stream.set_nodelay(true)?;
        Ok(Self {
            stream,
            peer,
            decoder: FrameDecoder::new(),
            outbox: Vec::new(),
            player: None,
            accepted_at: Instant::now(),
            closing: false,
            dead: false,
        })
    }

    fn queue(&mut self, packet: &Packet) {
        if self.dead {
            return;
        }
        match encode_frame(packet) {
            Ok(frame) if self.outbox.len() + frame.len() > MAX_OUTBOX => {
                warn!("{} stopped reading, dropping it", self.peer);
                self.outbox.clear();
                self.dead = true;
            }
            Ok(frame) => self.outbox.extend_from_slice(&frame),
            Err(e) => warn!("Dropping unencodable packet for {}: {}", self.peer, e),
        }
    }

    fn hello_overdue(&self, timeout: Duration) -> bool {
        self.player.is_none() && !self.closing && self.accepted_at.elapsed() > timeout
    }

    /// Reads everything available; returns decoded packets.
    fn receive(&mut self) -> Vec<Packet> {
        let mut chunk = [0u8; 1024];
        loop {
            match self.stream.read(&mut chunk) {
                Ok(0) => {
                    self.dead = true;
                    break;
                }
                Ok(n) => self.decoder.extend(&chunk[..n]),
                Err(e) if e.kind() == ErrorKind::WouldBlock => break,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    debug!("Read from {} failed: {}", self.peer, e);
                    self.dead = true;
                    break;
                }
            }
        }

        match self.decoder.drain_packets() {
            Ok(packets) => packets,
            Err(e) => {
                warn!("Malformed stream from {}: {}", self.peer, e);
                self.dead = true;
                Vec::new()
            }
        }
    }

    fn flush(&mut self) {
        while !self.outbox.is_empty() {
            match self.stream.write(&self.outbox) {
                Ok(0) => {
                    self.dead = true;
                    return;
                }
                Ok(n) => {
                    self.outbox.drain(..n);
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => return,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    debug!("Write to {} failed: {}", self.peer, e);
                    self.dead = true;
                    return;
                }
            }
        }
        if self.closing {
            self.dead = true;
        }
    }
}

//=== Server Loop =========================================================

struct Server {
    listener: TcpListener,
    lobby: Lobby,
    connections: Vec<Connection>,
    hello_timeout: Duration,
}

impl Server {
    fn new(listener: TcpListener, lobby: Lobby) -> Self {
        Self {
            listener,
            lobby,
            connections: Vec::new(),
            hello_timeout: HELLO_TIMEOUT,
        }
    }

    fn run(mut self, shutdown: &AtomicBool) {
        while !shutdown.load(Ordering::Relaxed) {
            let busy = self.accept() | self.pump();
            if !busy {
                thread::sleep(IDLE_SLEEP);
            }
        }

        for connection in &mut self.connections {
            connection.queue(&Packet::Disconnect);
            connection.flush();
        }
    }

    fn accept(&mut self) -> bool {
        let mut accepted = false;
        loop {
            match self.listener.accept() {
                Ok((stream, peer)) => match Connection::new(stream, peer) {
                    Ok(connection) => {
                        debug!("Connection from {}", peer);
                        self.connections.push(connection);
                        accepted = true;
                    }
                    Err(e) => warn!("Could not configure connection from {}: {}", peer, e),
                },
                Err(e) if e.kind() == ErrorKind::WouldBlock => return accepted,
                Err(e) => {
                    warn!("Accept failed: {}", e);
                    return accepted;
                }
            }
        }
    }

    fn pump(&mut self) -> bool {
        let mut outgoing = Vec::new();
        let mut busy = false;

        for index in 0..self.connections.len() {
            let packets = self.connections[index].receive();
            busy |= !packets.is_empty();
            for packet in packets {
                self.dispatch(index, packet, &mut outgoing);
            }
        }

        for connection in &mut self.connections {
            if connection.hello_overdue(self.hello_timeout) {
                debug!("{} never said Hello, closing", connection.peer);
                connection.dead = true;
            }
        }

        // Departures are announced before routing so the roster is current.
        outgoing.extend(self.reap());
        for message in outgoing {
            self.route(&message);
        }
        for connection in &mut self.connections {
            connection.flush();
        }

        // Peers lost while routing or flushing; their roster goes out on
        // the next pump.
        let departures = self.reap();
        busy |= !departures.is_empty();
        for message in departures {
            self.route(&message);
        }

        busy
    }

    /// Drops dead connections, returning the lobby's reaction.
    fn reap(&mut self) -> Vec<Outgoing> {
        let mut outgoing = Vec::new();
        for connection in &mut self.connections {
            if connection.dead {
                if let Some(player) = connection.player.take() {
                    outgoing.extend(self.lobby.leave(player));
                }
            }
        }
        self.connections.retain(|c| !c.dead);
        outgoing
    }

    fn dispatch(&mut self, index: usize, packet: Packet, outgoing: &mut Vec<Outgoing>) {
        let connection = &mut self.connections[index];
        match (connection.player, packet) {
            (None, Packet::Hello { name }) => match self.lobby.join(&name) {
                JoinOutcome::Accepted { player_id, outgoing: out } => {
                    connection.player = Some(player_id);
                    outgoing.extend(out);
                }
                JoinOutcome::Rejected { reason } => {
                    connection.queue(&Packet::Rejected { reason });
                    connection.closing = true;
                }
            },
            (None, other) => {
                debug!("{} sent {:?} before Hello", connection.peer, other);
            }
            (Some(player), Packet::Disconnect) => {
                connection.player = None;
                connection.closing = true;
                outgoing.extend(self.lobby.leave(player));
            }
            (Some(player), packet) => outgoing.extend(self.lobby.handle(player, packet)),
        }
    }

    fn route(&mut self, message: &Outgoing) {
        for connection in &mut self.connections {
            if connection.player.is_some_and(|id| message.target.includes(id)) {
                connection.queue(&message.packet);
            }
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_resolves_ephemeral_port() {
        let server = ServerHandle::spawn("127.0.0.1:0", 4).unwrap();
        assert_ne!(server.local_addr().port(), 0);
        assert!(server.is_running());
    }

    #[test]
    fn spawn_on_taken_port_fails() {
        let first = ServerHandle::spawn("127.0.0.1:0", 4).unwrap();
        let second = ServerHandle::spawn(first.local_addr(), 4);
        assert!(second.is_err());
    }

    #[test]
    fn stop_is_idempotent() {
        let mut server = ServerHandle::spawn("127.0.0.1:0", 2).unwrap();
        server.stop();
        server.stop();
        assert!(!server.is_running());
    }

    #[test]
    fn packets_before_hello_are_ignored() {
        let server = ServerHandle::spawn("127.0.0.1:0", 2).unwrap();
        let mut stream = TcpStream::connect(server.local_addr()).unwrap();
        stream.write_all(&encode_frame(&Packet::SetReady { ready: true }).unwrap()).unwrap();
        stream.write_all(&encode_frame(&Packet::Hello { name: "Anne".into() }).unwrap()).unwrap();

        stream.set_read_timeout(Some(Duration::from_secs(2))).unwrap();
        let mut decoder = FrameDecoder::new();
        let mut chunk = [0u8; 256];
        let first = loop {
            if let Some(packet) = decoder.next_packet().unwrap() {
                break packet;
            }
            let n = stream.read(&mut chunk).unwrap();
            assert!(n > 0, "server closed the connection");
            decoder.extend(&chunk[..n]);
        };
        assert_eq!(first, Packet::Welcome { player_id: 0 });
    }

    fn local_server(lobby: Lobby) -> (Server, SocketAddr) {
        let listener = bind("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = listener.local_addr().unwrap();
        (Server::new(listener, lobby), addr)
    }

    fn pump_until(server: &mut Server, done: impl Fn(&Server) -> bool) {
        let deadline = Instant::now() + Duration::from_secs(2);
        while !done(server) {
            server.accept();
            server.pump();
            assert!(Instant::now() < deadline, "server never reached expected state");
            thread::sleep(IDLE_SLEEP);
        }
    }

    #[test]
    fn silent_connection_is_closed_after_hello_timeout() {
        let (mut server, addr) = local_server(Lobby::new(2, 7));
        server.hello_timeout = Duration::from_millis(100);

        let _stream = TcpStream::connect(addr).unwrap();
        pump_until(&mut server, |s| s.connections.len() == 1);

        thread::sleep(Duration::from_millis(150));
        server.pump();
        assert!(server.connections.is_empty());
    }

    #[test]
    fn stalled_reader_is_dropped_and_leaves_lobby() {
        let (mut server, addr) = local_server(Lobby::new(2, 7));
        let mut anne = TcpStream::connect(addr).unwrap();
        anne.write_all(&encode_frame(&Packet::Hello { name: "Anne".into() }).unwrap()).unwrap();
        pump_until(&mut server, |s| s.connections.iter().any(|c| c.player.is_some()));
        assert_eq!(server.lobby.players().len(), 1);

        // Anne never reads; her outbox fills until she is cut off.
        let chat = Packet::Chat { from: 0, text: "x".repeat(200) };
        let connection = &mut server.connections[0];
        for _ in 0..MAX_OUTBOX {
            connection.queue(&chat);
            if connection.dead {
                break;
            }
        }
        assert!(connection.dead);
        assert!(connection.outbox.is_empty());

        server.pump();
        assert!(server.connections.is_empty());
        assert!(server.lobby.players().is_empty());
    }
}
