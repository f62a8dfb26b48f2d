//! OSC message encoder
//!
//! Mirror of the decoder: writes one message with a single argument.

use bytes::{BufMut, Bytes, BytesMut};

use crate::codec::aligned_len;
use crate::protocol::{Message, Value};

/// Encode `message` into a standalone OSC packet.
pub fn encode(message: &Message) -> Bytes {
    let mut buffer = BytesMut::with_capacity(encoded_len(message));

    put_token(&mut buffer, &message.address);

    // ",X" plus NUL and one byte of padding
    buffer.put_slice(&[b',', message.value.type_tag() as u8, 0, 0]);

    match &message.value {
        Value::Int(v) => buffer.put_i32(*v),
        Value::Float(v) => buffer.put_f32(*v),
        Value::Bool(_) => {}
        Value::Str(s) => put_token(&mut buffer, s),
        Value::IpAddr(addr) => put_token(&mut buffer, &addr.to_string()),
    }

    buffer.freeze()
}

/// Exact size of the packet `encode` will produce.
pub fn encoded_len(message: &Message) -> usize {
    let payload = match &message.value {
        Value::Int(_) | Value::Float(_) => 4,
        Value::Bool(_) => 0,
        Value::Str(s) => aligned_len(s.len() + 1),
        Value::IpAddr(addr) => aligned_len(addr.to_string().len() + 1),
    };
    aligned_len(message.address.len() + 1) + 4 + payload
}

/// Write a NUL-terminated string padded to a 4-byte boundary.
fn put_token(buffer: &mut BytesMut, text: &str) {
    let padded = aligned_len(text.len() + 1);
    buffer.put_slice(text.as_bytes());
    buffer.put_bytes(0, padded - text.len());
}
