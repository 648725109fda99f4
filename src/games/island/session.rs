//=========================================================================
// Session
//=========================================================================
//
// The player's seat in a networked game, stored as a context resource
// while the Lobby and Game scenes run.
//
// Lobby bookkeeping (roster, chat, start seed) is absorbed here on every
// poll so both scenes see the same view; the packets are still returned
// for scene-specific handling.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::VecDeque;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;

use log::info;

//=== Internal Dependencies ===============================================

use crate::config::PlayerConfig;
use crate::net::{NetClient, NetError, Packet, PlayerId, PlayerInfo, ServerHandle, DEFAULT_MAX_PLAYERS};

//=== Constants ===========================================================

const CHAT_HISTORY: usize = 6;

//=== Session =============================================================

pub struct Session {
    client: NetClient,
    /// Present when this player hosts the game.
    server: Option<ServerHandle>,
    player_id: PlayerId,
    roster: Vec<PlayerInfo>,
    chat: VecDeque<String>,
    seed: Option<u64>,
}

impl Session {
    /// Starts a server on every interface at the configured port and
    /// joins it over loopback.
    pub fn host(config: &PlayerConfig, timeout: Duration) -> Result<Self, NetError> {
        let bind = config.host_bind_addr();
        let server = ServerHandle::spawn(bind, DEFAULT_MAX_PLAYERS)?;
        let loopback = if bind.is_ipv6() {
            IpAddr::V6(Ipv6Addr::LOCALHOST)
        } else {
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        };
        let local = SocketAddr::new(loopback, server.local_addr().port());

        let (client, player_id, early) = NetClient::join(&local.to_string(), &config.name, timeout)?;
        info!("Hosting on {}", server.local_addr());

        let mut session = Self::new(client, Some(server), player_id);
        session.absorb(&early);
        Ok(session)
    }

    /// Joins the server at the configured address.
    pub fn join(config: &PlayerConfig, timeout: Duration) -> Result<Self, NetError> {
        let (client, player_id, early) = NetClient::join(&config.server_addr(), &config.name, timeout)?;

        let mut session = Self::new(client, None, player_id);
        session.absorb(&early);
        Ok(session)
    }

    fn new(client: NetClient, server: Option<ServerHandle>, player_id: PlayerId) -> Self {
        Self {
            client,
            server,
            player_id,
            roster: Vec::new(),
            chat: VecDeque::with_capacity(CHAT_HISTORY),
            seed: None,
        }
    }

    //--- Queries ----------------------------------------------------------

    pub fn player_id(&self) -> PlayerId {
        self.player_id
    }

    pub fn roster(&self) -> &[PlayerInfo] {
        &self.roster
    }

    pub fn me(&self) -> Option<&PlayerInfo> {
        self.roster.iter().find(|p| p.id == self.player_id)
    }

    pub fn is_host(&self) -> bool {
        self.me().is_some_and(|p| p.host)
    }

    pub fn all_ready(&self) -> bool {
        !self.roster.is_empty() && self.roster.iter().all(|p| p.ready)
    }

    pub fn chat(&self) -> impl Iterator<Item = &str> {
        self.chat.iter().map(String::as_str)
    }

    /// Seed from the last StartGame, if the game has started.
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn server_addr(&self) -> Option<SocketAddr> {
        self.server.as_ref().map(ServerHandle::local_addr)
    }

    //--- Traffic ----------------------------------------------------------

    pub fn send(&mut self, packet: &Packet) -> Result<(), NetError> {
        self.client.send(packet)
    }

    /// Exchanges pending traffic; a server Disconnect becomes an error.
    pub fn poll(&mut self) -> Result<Vec<Packet>, NetError> {
        let packets = self.client.poll()?;
        self.absorb(&packets);
        if packets.iter().any(|p| matches!(p, Packet::Disconnect)) {
            return Err(NetError::Disconnected);
        }
        Ok(packets)
    }

    /// Adds a local line to the chat log.
    pub fn note(&mut self, line: impl Into<String>) {
        if self.chat.len() == CHAT_HISTORY {
            self.chat.pop_front();
        }
        self.chat.push_back(line.into());
    }

    /// Tells the server we are leaving; stops it when hosting.
    pub fn leave(self) {
        self.client.disconnect();
        if let Some(mut server) = self.server {
            server.stop();
        }
    }

    fn absorb(&mut self, packets: &[Packet]) {
        for packet in packets {
            match packet {
                Packet::LobbyState { players } => self.roster = players.clone(),
                Packet::Chat { from, text } => {
                    let name = self
                        .roster
                        .iter()
                        .find(|p| p.id == *from)
                        .map_or_else(|| format!("#{}", from), |p| p.name.clone());
                    self.note(format!("{}: {}", name, text));
                }
                Packet::StartGame { seed } => self.seed = Some(*seed),
                _ => {}
            }
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
