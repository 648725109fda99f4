//=========================================================================
// Framing
//=========================================================================
//
// Each frame is a u16 LE body length followed by the body. TCP may
// split or merge frames arbitrarily; FrameDecoder buffers bytes until a
// whole body is available.
//
//=========================================================================

//=== Internal Dependencies ===============================================

use super::{NetError, Packet};

//=== Constants ===========================================================

/// Largest accepted body (packet id + payload).
pub const MAX_BODY_LEN: usize = 1024;

const HEADER_LEN: usize = 2;

//=== Encoding ============================================================

pub fn encode_frame(packet: &Packet) -> Result<Vec<u8>, NetError> {
    let mut frame = vec![0; HEADER_LEN];
    packet.encode_body(&mut frame)?;

    let body_len = frame.len() - HEADER_LEN;
    if body_len > MAX_BODY_LEN {
        return Err(NetError::PacketTooLarge(body_len));
    }
    // MAX_BODY_LEN fits in u16.
    frame[..HEADER_LEN].copy_from_slice(&(body_len as u16).to_le_bytes());
    Ok(frame)
}

//=== FrameDecoder ========================================================

#[derive(Debug, Default)]
pub struct FrameDecoder {
    buffer: Vec<u8>,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Bytes received but not yet part of a decoded packet.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Decodes the next complete frame, or `None` if more bytes are needed.
    ///
    /// An error leaves the stream unrecoverable; the connection should be
    /// dropped.
    pub fn next_packet(&mut self) -> Result<Option<Packet>, NetError> {
        if self.buffer.len() < HEADER_LEN {
            return Ok(None);
        }

        let body_len = usize::from(u16::from_le_bytes([self.buffer[0], self.buffer[1]]));
        if body_len > MAX_BODY_LEN {
            return Err(NetError::PacketTooLarge(body_len));
        }
        if self.buffer.len() < HEADER_LEN + body_len {
            return Ok(None);
        }

        let frame: Vec<u8> = self.buffer.drain(..HEADER_LEN + body_len).collect();
        Packet::decode_body(&frame[HEADER_LEN..]).map(Some)
    }

    /// Decodes every complete frame currently buffered.
    pub fn drain_packets(&mut self) -> Result<Vec<Packet>, NetError> {
        let mut packets = Vec::new();
        while let Some(packet) = self.next_packet()? {
            packets.push(packet);
        }
        Ok(packets)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
