use rand::{rngs::OsRng, RngCore};

const TOKEN_BYTES: usize = 32;

/// Identifiant aléatoire de 256 bits (hexa, 64 caractères)
/// Utilisé pour les tokens magic link et les session ids
pub fn secure_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_length_and_charset() {
        let token = secure_token();
        assert_eq!(token.len(), TOKEN_BYTES * 2);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_tokens_differ() {
        assert_ne!(secure_token(), secure_token());
    }
}
