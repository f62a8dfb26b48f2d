//! OSC packet codec
//!
//! Decodes and encodes single OSC messages as used by the eye tracker:
//! a padded address, a padded type-tag string and one big-endian argument.

pub mod decoder;
pub mod encoder;

pub use decoder::decode;
pub use encoder::{encode, encoded_len};

/// Round `len` up to the next multiple of 4, the OSC token alignment.
pub const fn aligned_len(len: usize) -> usize {
    (len + 3) & !3
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aligned_len() {
        assert_eq!(aligned_len(0), 0);
        assert_eq!(aligned_len(1), 4);
        assert_eq!(aligned_len(4), 4);
        assert_eq!(aligned_len(5), 8);
        assert_eq!(aligned_len(35), 36);
    }
}
