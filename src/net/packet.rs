//=========================================================================
// Packets
//=========================================================================
//
// Body layout per packet (after the u8 id):
//
//   1 Hello        name: str
//   2 Welcome      player_id: u8
//   3 Rejected     reason: str
//   4 LobbyState   count: u8, count × (id: u8, flags: u8, name: str)
//   5 Chat         from: u8, text: str
//   6 SetReady     ready: u8 (0/1)
//   7 StartGame    seed: u64
//   8 PlayerUpdate id: u8, x: f32, y: f32, rotation: f32
//   9 Disconnect   -
//
// str = u8 byte length + UTF-8 bytes. flags: bit 0 ready, bit 1 host.
//
//=========================================================================

//=== Internal Dependencies ===============================================

use super::NetError;

//=== Types ===============================================================

pub type PlayerId = u8;

/// Longest encodable string, in bytes.
pub const MAX_STRING_LEN: usize = u8::MAX as usize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerInfo {
    pub id: PlayerId,
    pub name: String,
    pub ready: bool,
    pub host: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Packet {
    Hello { name: String },
    Welcome { player_id: PlayerId },
    Rejected { reason: String },
    LobbyState { players: Vec<PlayerInfo> },
    Chat { from: PlayerId, text: String },
    SetReady { ready: bool },
    StartGame { seed: u64 },
    PlayerUpdate { id: PlayerId, x: f32, y: f32, rotation: f32 },
    Disconnect,
}

impl Packet {
    pub fn id(&self) -> u8 {
        match self {
            Packet::Hello { .. } => 1,
            Packet::Welcome { .. } => 2,
            Packet::Rejected { .. } => 3,
            Packet::LobbyState { .. } => 4,
            Packet::Chat { .. } => 5,
            Packet::SetReady { .. } => 6,
            Packet::StartGame { .. } => 7,
            Packet::PlayerUpdate { .. } => 8,
            Packet::Disconnect => 9,
        }
    }

    /// Appends id + payload to `out`.
    pub fn encode_body(&self, out: &mut Vec<u8>) -> Result<(), NetError> {
        out.push(self.id());
        match self {
            Packet::Hello { name } => put_str(out, name)?,
            Packet::Welcome { player_id } => out.push(*player_id),
            Packet::Rejected { reason } => put_str(out, reason)?,
            Packet::LobbyState { players } => {
                let count = u8::try_from(players.len()).map_err(|_| NetError::PacketTooLarge(players.len()))?;
                out.push(count);
                for player in players {
                    out.push(player.id);
                    out.push(u8::from(player.ready) | (u8::from(player.host) << 1));
                    put_str(out, &player.name)?;
                }
            }
            Packet::Chat { from, text } => {
                out.push(*from);
                put_str(out, text)?;
            }
            Packet::SetReady { ready } => out.push(u8::from(*ready)),
            Packet::StartGame { seed } => out.extend_from_slice(&seed.to_le_bytes()),
            Packet::PlayerUpdate { id, x, y, rotation } => {
                out.push(*id);
                out.extend_from_slice(&x.to_le_bytes());
                out.extend_from_slice(&y.to_le_bytes());
                out.extend_from_slice(&rotation.to_le_bytes());
            }
            Packet::Disconnect => {}
        }
        Ok(())
    }

    /// Parses a complete body. Every byte must be consumed.
    pub fn decode_body(body: &[u8]) -> Result<Self, NetError> {
        let mut reader = Reader { bytes: body, pos: 0 };
        let packet = match reader.u8()? {
            1 => Packet::Hello { name: reader.string()? },
            2 => Packet::Welcome { player_id: reader.u8()? },
            3 => Packet::Rejected { reason: reader.string()? },
            4 => {
                let count = reader.u8()?;
                let mut players = Vec::with_capacity(usize::from(count));
                for _ in 0..count {
                    let id = reader.u8()?;
                    let flags = reader.u8()?;
                    players.push(PlayerInfo {
                        id,
                        ready: flags & 0b01 != 0,
                        host: flags & 0b10 != 0,
                        name: reader.string()?,
                    });
                }
                Packet::LobbyState { players }
            }
            5 => Packet::Chat { from: reader.u8()?, text: reader.string()? },
            6 => Packet::SetReady { ready: reader.u8()? != 0 },
            7 => Packet::StartGame { seed: u64::from_le_bytes(reader.array()?) },
            8 => Packet::PlayerUpdate {
                id: reader.u8()?,
                x: f32::from_le_bytes(reader.array()?),
                y: f32::from_le_bytes(reader.array()?),
                rotation: f32::from_le_bytes(reader.array()?),
            },
            9 => Packet::Disconnect,
            other => return Err(NetError::UnknownPacket(other)),
        };

        match reader.remaining() {
            0 => Ok(packet),
            extra => Err(NetError::TrailingBytes(extra)),
        }
    }
}

//=== Byte Helpers ========================================================

fn put_str(out: &mut Vec<u8>, s: &str) -> Result<(), NetError> {
    let len = u8::try_from(s.len()).map_err(|_| NetError::StringTooLong(s.len()))?;
    out.push(len);
    out.extend_from_slice(s.as_bytes());
    Ok(())
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], NetError> {
        let end = self.pos.checked_add(n).ok_or(NetError::UnexpectedEof)?;
        let slice = self.bytes.get(self.pos..end).ok_or(NetError::UnexpectedEof)?;
        self.pos = end;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8, NetError> {
        Ok(self.take(1)?[0])
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], NetError> {
        let mut array = [0; N];
        array.copy_from_slice(self.take(N)?);
        Ok(array)
    }

    fn string(&mut self) -> Result<String, NetError> {
        let len = usize::from(self.u8()?);
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| NetError::InvalidUtf8)
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
