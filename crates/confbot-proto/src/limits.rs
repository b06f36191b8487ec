//! Transport limits.
//!
//! The messaging engine enforces these on the wire; the bot mirrors them so
//! that it never hands the engine a value it would truncate or refuse.

/// Maximum byte length of a single private message.
pub const MAX_MESSAGE_LENGTH: usize = 1372;

/// Maximum byte length of a display name or room title.
pub const MAX_NAME_LENGTH: usize = 128;

/// Maximum byte length of a status message.
pub const MAX_STATUS_MESSAGE_LENGTH: usize = 1007;

/// Room passwords must be strictly shorter than this many bytes.
pub const MAX_PASSWORD_SIZE: usize = 64;

/// Maximum number of tokens captured from one command line, command name
/// included. Anything after the last captured token is discarded.
pub const MAX_NUM_ARGS: usize = 4;

/// Byte length of a public key.
pub const PUBLIC_KEY_SIZE: usize = 32;

/// Byte length of a friend address (key + nospam + checksum).
pub const ADDRESS_SIZE: usize = PUBLIC_KEY_SIZE + 4 + 2;

/// Truncate `s` to at most `max` bytes without splitting a character.
pub fn clamp_str(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_str_keeps_short_input() {
        assert_eq!(clamp_str("abc", 8), "abc");
        assert_eq!(clamp_str("", 0), "");
    }

    #[test]
    fn clamp_str_cuts_at_byte_limit() {
        assert_eq!(clamp_str("abcdef", 4), "abcd");
    }

    #[test]
    fn clamp_str_respects_char_boundaries() {
        // "é" is two bytes; cutting at 2 would split it.
        assert_eq!(clamp_str("aé", 2), "a");
        assert_eq!(clamp_str("aé", 3), "aé");
    }

    #[test]
    fn address_size_is_38() {
        assert_eq!(ADDRESS_SIZE, 38);
    }
}
