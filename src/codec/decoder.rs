//! OSC message decoder
//!
//! Decodes a single, individually framed OSC message. Bundles are not
//! supported. Every failure maps to a [`CodecError`] so the caller can drop
//! the packet; nothing here panics on malformed input.

use std::net::IpAddr;

use crate::codec::aligned_len;
use crate::error::CodecError;
use crate::protocol::{Message, Value};

/// Decode one OSC message from `buffer`.
pub fn decode(buffer: &[u8]) -> Result<Message, CodecError> {
    let mut reader = Reader::new(buffer);

    if buffer.first() != Some(&b'/') {
        return Err(CodecError::MissingAddress);
    }
    let address = reader.read_token()?.to_owned();

    if reader.peek() != Some(b',') {
        return Err(CodecError::MissingTypeTag);
    }
    let tags = reader.read_token()?;
    // Skip the leading ','
    let tag = tags[1..].chars().next().ok_or(CodecError::NoPayload)?;
    if tags.len() > 2 {
        tracing::trace!(address = %address, tags, "ignoring trailing OSC arguments");
    }

    let value = match tag {
        'i' => Value::Int(i32::from_be_bytes(reader.read_word()?)),
        'f' => Value::Float(f32::from_be_bytes(reader.read_word()?)),
        'T' => Value::Bool(true),
        'F' => Value::Bool(false),
        's' => {
            let text = reader.read_token()?;
            match text.parse::<IpAddr>() {
                Ok(addr) => Value::IpAddr(addr),
                Err(_) => Value::Str(text.to_owned()),
            }
        }
        other => {
            tracing::warn!(address = %address, tag = %other, "unsupported OSC type tag");
            return Err(CodecError::UnsupportedTag(other));
        }
    };

    Ok(Message { address, value })
}

/// Cursor over an OSC buffer that enforces 4-byte alignment per token.
struct Reader<'a> {
    buffer: &'a [u8],
    position: usize,
}

impl<'a> Reader<'a> {
    fn new(buffer: &'a [u8]) -> Self {
        Self {
            buffer,
            position: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.buffer.get(self.position).copied()
    }

    /// Read a NUL-terminated string and advance past its padding.
    fn read_token(&mut self) -> Result<&'a str, CodecError> {
        let start = self.position;
        let remaining = self
            .buffer
            .get(start..)
            .ok_or(CodecError::Truncated(start))?;
        let nul = remaining
            .iter()
            .position(|&b| b == 0)
            .ok_or(CodecError::Truncated(self.buffer.len()))?;

        let text = std::str::from_utf8(&remaining[..nul]).map_err(|_| CodecError::InvalidText)?;
        self.position = start + aligned_len(nul + 1);
        Ok(text)
    }

    /// Read one big-endian 32-bit word.
    fn read_word(&mut self) -> Result<[u8; 4], CodecError> {
        let start = self.position;
        let word = self
            .buffer
            .get(start..start + 4)
            .ok_or(CodecError::Truncated(start))?;
        self.position += 4;
        let mut out = [0u8; 4];
        out.copy_from_slice(word);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn packet(parts: &[&[u8]]) -> Vec<u8> {
        parts.concat()
    }

    #[test]
    fn test_big_endian_float() {
        let data = packet(&[b"/a\0\0", b",f\0\0", &[0x3F, 0x80, 0x00, 0x00]]);
        let msg = decode(&data).unwrap();
        assert_eq!(msg.address, "/a");
        assert_eq!(msg.value, Value::Float(1.0));
    }

    #[test]
    fn test_big_endian_int() {
        let data = packet(&[b"/port\0\0\0", b",i\0\0", &[0x00, 0x00, 0x22, 0xB9]]);
        assert_eq!(decode(&data).unwrap().value, Value::Int(8889));
    }

    #[test]
    fn test_address_alignment() {
        // "/abc" + NUL is exactly 5 bytes, padded to 8
        let mut reader = Reader::new(b"/abc\0\0\0\0,f\0\0");
        assert_eq!(reader.read_token().unwrap(), "/abc");
        assert_eq!(reader.position, 8);

        // "/ab" + NUL is exactly 4 bytes, no padding
        let mut reader = Reader::new(b"/ab\0,f\0\0");
        assert_eq!(reader.read_token().unwrap(), "/ab");
        assert_eq!(reader.position, 4);
    }

    #[test]
    fn test_bool_tags_have_no_payload() {
        let t = decode(b"/command/set/ShouldEmulateEyebrows\0\0,T\0\0").unwrap();
        assert_eq!(t.value, Value::Bool(true));

        let f = decode(b"/x\0\0,F\0\0").unwrap();
        assert_eq!(f.value, Value::Bool(false));
    }

    #[test]
    fn test_string_reclassified_as_ip() {
        let data = packet(&[b"/addr\0\0\0", b",s\0\0", b"127.0.0.1\0\0\0"]);
        assert_eq!(
            decode(&data).unwrap().value,
            Value::IpAddr(IpAddr::V4(Ipv4Addr::LOCALHOST))
        );

        let data = packet(&[b"/name\0\0\0", b",s\0\0", b"hello\0\0\0"]);
        assert_eq!(decode(&data).unwrap().value, Value::Str("hello".into()));
    }

    #[test]
    fn test_missing_slash() {
        assert_eq!(decode(b"abc\0,f\0\0\0\0\0\0"), Err(CodecError::MissingAddress));
        assert_eq!(decode(b""), Err(CodecError::MissingAddress));
    }

    #[test]
    fn test_missing_type_tag() {
        assert_eq!(decode(b"/abc\0\0\0\0"), Err(CodecError::MissingTypeTag));
        assert_eq!(decode(b"/ab\0xf\0\0"), Err(CodecError::MissingTypeTag));
    }

    #[test]
    fn test_empty_type_tag() {
        assert_eq!(decode(b"/ab\0,\0\0\0"), Err(CodecError::NoPayload));
    }

    #[test]
    fn test_unsupported_tag() {
        let data = packet(&[b"/a\0\0", b",d\0\0", &[0; 8]]);
        assert_eq!(decode(&data), Err(CodecError::UnsupportedTag('d')));
    }

    #[test]
    fn test_truncated_payload() {
        let data = packet(&[b"/a\0\0", b",f\0\0", &[0x3F, 0x80]]);
        assert_eq!(decode(&data), Err(CodecError::Truncated(8)));

        // Address with no terminator
        assert!(matches!(decode(b"/abcdef"), Err(CodecError::Truncated(_))));

        // String payload with no terminator
        let data = packet(&[b"/a\0\0", b",s\0\0", b"abc"]);
        assert!(matches!(decode(&data), Err(CodecError::Truncated(_))));
    }

    #[test]
    fn test_only_first_argument_is_decoded() {
        let data = packet(&[b"/a\0\0", b",fi\0", &[0x3F, 0x80, 0, 0], &[0, 0, 0, 1]]);
        assert_eq!(decode(&data).unwrap().value, Value::Float(1.0));
    }
}
