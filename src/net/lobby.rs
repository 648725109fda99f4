//=========================================================================
// Lobby
//=========================================================================
//
// Server-side rules for who is in the room and when the game starts.
// Pure state machine: packets in, addressed packets out. The server
// thread owns the sockets and routes the results.
//
// Rules:
//   - at most `max_players`; joins during a running game are rejected
//   - the first player to join hosts; host passes on in join order
//   - only the host starts, and only when every player is ready
//   - chat is broadcast; position updates go to everyone else
//
//=========================================================================

//=== External Dependencies ===============================================

use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

//=== Internal Dependencies ===============================================

use super::packet::{Packet, PlayerId, PlayerInfo};
use crate::config::MAX_NAME_LEN;

//=== Constants ===========================================================

pub const DEFAULT_MAX_PLAYERS: usize = 4;

//=== Routing =============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    All,
    One(PlayerId),
    AllExcept(PlayerId),
}

impl Target {
    pub fn includes(self, player: PlayerId) -> bool {
        match self {
            Target::All => true,
            Target::One(id) => id == player,
            Target::AllExcept(id) => id != player,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Outgoing {
    pub target: Target,
    pub packet: Packet,
}

impl Outgoing {
    fn new(target: Target, packet: Packet) -> Self {
        Self { target, packet }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum JoinOutcome {
    Accepted { player_id: PlayerId, outgoing: Vec<Outgoing> },
    Rejected { reason: String },
}

//=== Lobby ===============================================================

#[derive(Debug)]
pub struct Lobby {
    max_players: usize,
    /// Join order; index 0 is the host.
    players: Vec<PlayerInfo>,
    next_id: PlayerId,
    in_game: bool,
    rng: StdRng,
}

impl Lobby {
    pub fn new(max_players: usize, seed: u64) -> Self {
        Self {
            max_players: max_players.clamp(1, usize::from(u8::MAX)),
            players: Vec::new(),
            next_id: 0,
            in_game: false,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    //--- Queries ----------------------------------------------------------

    pub fn players(&self) -> &[PlayerInfo] {
        &self.players
    }

    pub fn host(&self) -> Option<PlayerId> {
        self.players.first().map(|p| p.id)
    }

    pub fn in_game(&self) -> bool {
        self.in_game
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    //--- Membership -------------------------------------------------------

    pub fn join(&mut self, name: &str) -> JoinOutcome {
        let name = name.trim();
        let reason = if self.in_game {
            Some("game already in progress")
        } else if self.players.len() >= self.max_players {
            Some("lobby is full")
        } else if name.is_empty() || name.len() > MAX_NAME_LEN {
            Some("invalid name")
        } else if self.players.iter().any(|p| p.name == name) {
            Some("name already taken")
        } else {
            None
        };
        if let Some(reason) = reason {
            debug!("Rejected join from '{}': {}", name, reason);
            return JoinOutcome::Rejected { reason: reason.to_string() };
        }

        let player_id = self.allocate_id();
        self.players.push(PlayerInfo {
            id: player_id,
            name: name.to_string(),
            ready: false,
            host: self.players.is_empty(),
        });
        info!("Player {} '{}' joined ({} in lobby)", player_id, name, self.players.len());

        JoinOutcome::Accepted {
            player_id,
            outgoing: vec![
                Outgoing::new(Target::One(player_id), Packet::Welcome { player_id }),
                self.roster(),
            ],
        }
    }

    pub fn leave(&mut self, player: PlayerId) -> Vec<Outgoing> {
        let Some(index) = self.players.iter().position(|p| p.id == player) else {
            return Vec::new();
        };
        let left = self.players.remove(index);
        info!("Player {} '{}' left", left.id, left.name);

        if let Some(first) = self.players.first_mut() {
            first.host = true;
        }
        if self.players.is_empty() {
            self.in_game = false;
            return Vec::new();
        }
        vec![self.roster()]
    }

    //--- Packet Handling --------------------------------------------------

    pub fn handle(&mut self, from: PlayerId, packet: Packet) -> Vec<Outgoing> {
        if !self.players.iter().any(|p| p.id == from) {
            debug!("Packet from unknown player {} ignored", from);
            return Vec::new();
        }

        match packet {
            Packet::Chat { text, .. } => {
                vec![Outgoing::new(Target::All, Packet::Chat { from, text })]
            }
            Packet::SetReady { ready } if !self.in_game => {
                if let Some(player) = self.players.iter_mut().find(|p| p.id == from) {
                    player.ready = ready;
                }
                vec![self.roster()]
            }
            Packet::StartGame { .. } => self.try_start(from),
            Packet::PlayerUpdate { x, y, rotation, .. } if self.in_game => vec![Outgoing::new(
                Target::AllExcept(from),
                Packet::PlayerUpdate { id: from, x, y, rotation },
            )],
            Packet::Disconnect => self.leave(from),
            other => {
                debug!("Ignoring {:?} from player {}", other, from);
                Vec::new()
            }
        }
    }

    fn try_start(&mut self, from: PlayerId) -> Vec<Outgoing> {
        if self.in_game || self.host() != Some(from) {
            debug!("Start from {} ignored (host {:?})", from, self.host());
            return Vec::new();
        }
        if !self.players.iter().all(|p| p.ready) {
            debug!("Start ignored: not every player is ready");
            return Vec::new();
        }

        self.in_game = true;
        let seed: u64 = self.rng.gen();
        info!("Game starting with {} players, seed {}", self.players.len(), seed);
        vec![Outgoing::new(Target::All, Packet::StartGame { seed })]
    }

    //--- Internal Helpers -------------------------------------------------

    fn roster(&self) -> Outgoing {
        Outgoing::new(Target::All, Packet::LobbyState { players: self.players.clone() })
    }

    fn allocate_id(&mut self) -> PlayerId {
        // At most max_players (< 256) ids are live, so a free one exists.
        loop {
            let id = self.next_id;
            self.next_id = self.next_id.wrapping_add(1);
            if !self.players.iter().any(|p| p.id == id) {
                return id;
            }
        }
    }
}

impl Default for Lobby {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PLAYERS, 0)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn join(lobby: &mut Lobby, name: &str) -> PlayerId {
        match lobby.join(name) {
            JoinOutcome::Accepted { player_id, .. } => player_id,
            JoinOutcome::Rejected { reason } => panic!("{} rejected: {}", name, reason),
        }
    }

    fn ready_all(lobby: &mut Lobby) {
        let ids: Vec<_> = lobby.players().iter().map(|p| p.id).collect();
        for id in ids {
            lobby.handle(id, Packet::SetReady { ready: true });
        }
    }

    #[test]
    fn first_player_hosts_and_gets_welcome() {
        let mut lobby = Lobby::default();
        let JoinOutcome::Accepted { player_id, outgoing } = lobby.join("Anne") else {
            panic!("join rejected");
        };

        assert_eq!(lobby.host(), Some(player_id));
        assert_eq!(outgoing[0], Outgoing::new(Target::One(player_id), Packet::Welcome { player_id }));
        assert_eq!(outgoing[1].target, Target::All);
        assert!(lobby.players()[0].host);
    }

    #[test]
    fn full_lobby_and_duplicate_names_are_rejected() {
        let mut lobby = Lobby::new(2, 0);
        join(&mut lobby, "Anne");
        assert!(matches!(lobby.join("Anne"), JoinOutcome::Rejected { .. }));
        join(&mut lobby, "Mary");
        assert_eq!(
            lobby.join("Jack"),
            JoinOutcome::Rejected { reason: "lobby is full".into() }
        );
    }

    #[test]
    fn only_host_starts_and_only_when_all_ready() {
        let mut lobby = Lobby::default();
        let host = join(&mut lobby, "Anne");
        let guest = join(&mut lobby, "Mary");

        lobby.handle(host, Packet::SetReady { ready: true });
        assert!(lobby.handle(host, Packet::StartGame { seed: 0 }).is_empty());

        lobby.handle(guest, Packet::SetReady { ready: true });
        assert!(lobby.handle(guest, Packet::StartGame { seed: 0 }).is_empty());

        let out = lobby.handle(host, Packet::StartGame { seed: 0 });
        assert!(matches!(out.as_slice(), [Outgoing { target: Target::All, packet: Packet::StartGame { .. } }]));
        assert!(lobby.in_game());
    }

    #[test]
    fn joins_rejected_while_in_game() {
        let mut lobby = Lobby::default();
        let host = join(&mut lobby, "Anne");
        ready_all(&mut lobby);
        lobby.handle(host, Packet::StartGame { seed: 0 });

        assert_eq!(
            lobby.join("Late"),
            JoinOutcome::Rejected { reason: "game already in progress".into() }
        );
    }

    #[test]
    fn chat_is_broadcast_with_sender_id() {
        let mut lobby = Lobby::default();
        join(&mut lobby, "Anne");
        let mary = join(&mut lobby, "Mary");

        let out = lobby.handle(mary, Packet::Chat { from: 99, text: "Yo ho".into() });
        assert_eq!(out, vec![Outgoing::new(Target::All, Packet::Chat { from: mary, text: "Yo ho".into() })]);
    }

    #[test]
    fn updates_relay_to_others_only_in_game() {
        let mut lobby = Lobby::default();
        let host = join(&mut lobby, "Anne");
        let update = Packet::PlayerUpdate { id: 200, x: 1.0, y: 2.0, rotation: 0.0 };
        assert!(lobby.handle(host, update.clone()).is_empty());

        ready_all(&mut lobby);
        lobby.handle(host, Packet::StartGame { seed: 0 });
        let out = lobby.handle(host, update);
        assert_eq!(out[0].target, Target::AllExcept(host));
        assert_eq!(out[0].packet, Packet::PlayerUpdate { id: host, x: 1.0, y: 2.0, rotation: 0.0 });
    }

    #[test]
    fn host_passes_on_and_empty_lobby_resets() {
        let mut lobby = Lobby::default();
        let anne = join(&mut lobby, "Anne");
        let mary = join(&mut lobby, "Mary");
        ready_all(&mut lobby);
        lobby.handle(anne, Packet::StartGame { seed: 0 });

        lobby.handle(anne, Packet::Disconnect);
        assert_eq!(lobby.host(), Some(mary));
        assert!(lobby.players()[0].host);

        assert!(lobby.leave(mary).is_empty());
        assert!(!lobby.in_game());
        join(&mut lobby, "Jack");
    }

    #[test]
    fn ids_are_not_reused_while_live() {
        let mut lobby = Lobby::default();
        let a = join(&mut lobby, "A");
        let b = join(&mut lobby, "B");
        lobby.leave(a);
        let c = join(&mut lobby, "C");
        assert_ne!(b, c);
    }

    #[test]
    fn target_membership() {
        assert!(Target::All.includes(3));
        assert!(Target::One(3).includes(3));
        assert!(!Target::One(3).includes(4));
        assert!(!Target::AllExcept(3).includes(3));
    }
}
