// MIT License - Copyright (c) 2026 garnet-bridge contributors
// SIA DC-09 frame codec (CRC, tokenizing, ACK generation)

use chrono::NaiveDateTime;
use tracing::debug;

use crate::constants::{
    FRAME_END, FRAME_HEADER_LEN, FRAME_START, FRAME_TIMESTAMP_FORMAT, TOKEN_ACK, TOKEN_CID,
    TOKEN_NULL,
};
use crate::error::{GarnetError, Result};

/// CRC-16 over a byte slice (reflected, polynomial 0xA001, seed 0x0000).
pub fn crc16(data: &[u8]) -> u16 {
    let mut crc: u16 = 0;
    for &byte in data {
        crc ^= byte as u16;
        for _ in 0..8 {
            crc = if crc & 0x0001 != 0 {
                (crc >> 1) ^ 0xA001
            } else {
                crc >> 1
            };
        }
    }
    crc
}

/// Wrap a data block in an inbound-style frame: start byte, big-endian CRC,
/// filler, 3 hex-digit length, data.
pub fn encode_frame(block: &[u8]) -> Vec<u8> {
    let crc = crc16(block);
    let mut frame = Vec::with_capacity(FRAME_HEADER_LEN + block.len());
    frame.push(FRAME_START);
    frame.extend_from_slice(&crc.to_be_bytes());
    frame.push(b'0');
    frame.extend_from_slice(format!("{:03X}", block.len()).as_bytes());
    frame.extend_from_slice(block);
    frame
}

/// A decoded, CRC-validated datagram.
///
/// Fields the panel left out default to empty strings and zero, so periodic
/// test reports without a CID payload still decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiaFrame {
    /// CRC carried in the header (equal to the computed CRC).
    pub crc: u16,
    /// Message token without quotes ("ADM-CID", "NULL", ...).
    pub token: String,
    pub sequence: String,
    /// Receiver field including its `R` marker.
    pub receiver: String,
    /// Line prefix including its `L` marker.
    pub prefix: String,
    pub account: String,
    /// Raw message body, brackets included.
    pub body: String,
    /// Optional extended data following `][`.
    pub extended: Option<String>,
    pub timestamp: Option<NaiveDateTime>,
    pub qualifier: u8,
    pub event_code: u16,
    pub partition: u32,
    pub zone: u32,
}

impl SiaFrame {
    /// Decode a raw datagram.
    ///
    /// Returns `MalformedFrame` when the header is unusable and `CrcMismatch`
    /// when the data block fails validation. Either way no ACK must be sent.
    pub fn decode(datagram: &[u8]) -> Result<Self> {
        if datagram.first() != Some(&FRAME_START) {
            return Err(malformed("missing frame start"));
        }
        if datagram.len() < FRAME_HEADER_LEN {
            return Err(malformed("truncated header"));
        }

        let expected = u16::from_be_bytes([datagram[1], datagram[2]]);
        let len_field = std::str::from_utf8(&datagram[4..FRAME_HEADER_LEN])
            .map_err(|_| malformed("length field is not text"))?;
        let len = usize::from_str_radix(len_field, 16)
            .map_err(|_| malformed(&format!("bad length field {len_field:?}")))?;

        let end = FRAME_HEADER_LEN + len;
        let block = datagram
            .get(FRAME_HEADER_LEN..end)
            .ok_or_else(|| malformed(&format!("data block shorter than {len} bytes")))?;

        let computed = crc16(block);
        if computed != expected {
            return Err(GarnetError::CrcMismatch { expected, computed });
        }

        let text = std::str::from_utf8(block).map_err(|_| malformed("data block is not UTF-8"))?;
        debug!("Frame data block: {}", text);
        Ok(Self::tokenize(expected, text))
    }

    fn tokenize(crc: u16, text: &str) -> Self {
        // The token runs through the second quote.
        let (token, rest) = match text.get(1..).and_then(|t| t.find('"')) {
            Some(i) => text.split_at(i + 2),
            None => ("", text),
        };
        let (sequence, rest) = split_before(rest, 'R');
        let (receiver, rest) = split_before(rest, 'L');
        let (prefix, rest) = split_before(rest, '#');
        let (account, rest) = split_before(rest, '[');
        let (body, rest) = split_before(rest, '_');

        let timestamp = rest
            .strip_prefix('_')
            .and_then(|ts| NaiveDateTime::parse_from_str(ts.trim(), FRAME_TIMESTAMP_FORMAT).ok());

        let mut frame = Self {
            crc,
            token: token.replace('"', ""),
            sequence: sequence.to_string(),
            receiver: receiver.to_string(),
            prefix: prefix.to_string(),
            account: account.strip_prefix('#').unwrap_or(account).to_string(),
            body: body.to_string(),
            extended: None,
            timestamp,
            qualifier: 0,
            event_code: 0,
            partition: 0,
            zone: 0,
        };

        if frame.token == TOKEN_CID {
            frame.parse_cid();
        }
        frame
    }

    /// Split a Contact-ID body like `[#1234|1407 01 003][extra]`.
    fn parse_cid(&mut self) {
        let (primary, extended) = match self.body.find("][") {
            Some(i) if i > 1 => (&self.body[..i], Some(strip_brackets(&self.body[i + 2..]))),
            _ => (self.body.as_str(), None),
        };
        let primary = strip_brackets(primary);
        let data = match primary.find('|') {
            Some(i) if i > 1 => &primary[i + 1..],
            _ => primary.as_str(),
        };

        let mut fields = data.split_whitespace();
        if let Some(event) = fields.next() {
            let mut chars = event.chars();
            self.qualifier = chars
                .next()
                .and_then(|c| c.to_digit(10))
                .map_or(0, |d| d as u8);
            self.event_code = chars.as_str().parse().unwrap_or(0);
        }
        self.partition = fields.next().and_then(|p| p.parse().ok()).unwrap_or(0);
        self.zone = fields.next().and_then(|z| z.parse().ok()).unwrap_or(0);
        self.extended = extended;
    }

    /// Whether this frame is the communicator's link test.
    pub fn is_keepalive(&self) -> bool {
        self.token == TOKEN_NULL && self.event_code == 0
    }

    /// Body of the acknowledgement for this frame.
    pub fn ack_body(&self) -> String {
        format!(
            "\"{}\"{}{}{}#{}[]",
            TOKEN_ACK, self.sequence, self.receiver, self.prefix, self.account
        )
    }

    /// Complete ACK frame: `\n<CRC as 4 hex digits>0<3 hex-digit length><body>\r`.
    pub fn ack(&self) -> Vec<u8> {
        let body = self.ack_body();
        let crc = crc16(body.as_bytes());
        let mut out = format!("\n{:04X}0{:03X}{}", crc, body.len(), body).into_bytes();
        out.push(FRAME_END);
        out
    }
}

fn malformed(details: &str) -> GarnetError {
    GarnetError::MalformedFrame {
        details: details.to_string(),
    }
}

/// Split `s` at the first `delim`, keeping the delimiter on the right side.
fn split_before(s: &str, delim: char) -> (&str, &str) {
    match s.find(delim) {
        Some(i) => s.split_at(i),
        None => (s, ""),
    }
}

fn strip_brackets(s: &str) -> String {
    s.replace(['[', ']'], "")
}
