//! Random identifiers and secrets.

use covey_protocol::{PlayerId, SessionToken, TownId};
use rand::Rng;
use rand::distr::{Alphanumeric, SampleString};

/// Length of a town update password.
pub const UPDATE_PASSWORD_LEN: usize = 24;

/// 64 random bits as 16 lowercase hex characters.
pub fn new_player_id() -> PlayerId {
    let bytes: [u8; 8] = rand::rng().random();
    PlayerId::new(hex(&bytes))
}

/// 128 random bits as 32 lowercase hex characters. Guessing a live token
/// is infeasible.
pub fn new_session_token() -> SessionToken {
    let bytes: [u8; 16] = rand::rng().random();
    SessionToken::new(hex(&bytes))
}

/// Short, human-shareable town ID: 8 upper-case hex characters.
pub fn new_town_id() -> TownId {
    let bytes: [u8; 4] = rand::rng().random();
    TownId::new(hex(&bytes).to_uppercase())
}

/// Alphanumeric password required to update or delete a town.
pub fn new_update_password() -> String {
    Alphanumeric.sample_string(&mut rand::rng(), UPDATE_PASSWORD_LEN)
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_tokens_are_32_hex_chars_and_unique() {
        let a = new_session_token();
        let b = new_session_token();
        assert_eq!(a.as_str().len(), 32);
        assert!(a.as_str().chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_town_ids_are_upper_hex() {
        let id = new_town_id();
        assert_eq!(id.as_str().len(), 8);
        assert!(
            id.as_str()
                .chars()
                .all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c))
        );
    }

    #[test]
    fn test_update_password_is_alphanumeric() {
        let pw = new_update_password();
        assert_eq!(pw.len(), UPDATE_PASSWORD_LEN);
        assert!(pw.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_player_ids_are_16_hex_chars() {
        assert_eq!(new_player_id().as_str().len(), 16);
    }
}
