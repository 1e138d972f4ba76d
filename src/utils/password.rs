use sha2::{Digest, Sha256};

/// Hash SHA-256 en hexadécimal minuscule (format déjà stocké en base)
/// Déterministe, sans sel ni itérations
pub fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

/// Vérifie un mot de passe contre le hash stocké (comparaison octet par octet)
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    hash_password(password).as_bytes() == stored_hash.as_bytes()
}
