use sea_orm::ConnectionTrait;

use crate::errors::AppError;
use crate::services::settings_service::SettingsService;
use crate::utils::password;

pub const DENTIST_PASSWORD_KEY: &str = "dentist_password_hash";

// Mot de passe initial, à changer à la première connexion
pub const DEFAULT_PASSWORD: &str = "admin";

pub struct CredentialService;

impl CredentialService {
    /// Vérifie le mot de passe du dentiste.
    /// Premier appel (aucun hash stocké): enregistre le hash du mot de passe
    /// par défaut puis compare avec celui-ci.
    pub async fn verify_password<C: ConnectionTrait>(db: &C, candidate: &str) -> Result<bool, AppError> {
        let stored_hash = match SettingsService::get(db, DENTIST_PASSWORD_KEY).await? {
            Some(hash) => hash,
            None => {
                let default_hash = password::hash_password(DEFAULT_PASSWORD);
                SettingsService::set(db, DENTIST_PASSWORD_KEY, &default_hash).await?;
                tracing::warn!("dentist password initialised with the default value");
                default_hash
            }
        };

        Ok(password::verify_password(candidate, &stored_hash))
    }

    /// Remplace le hash stocké, sans condition
    pub async fn set_password<C: ConnectionTrait>(db: &C, new_password: &str) -> Result<(), AppError> {
        let hash = password::hash_password(new_password);
        SettingsService::set(db, DENTIST_PASSWORD_KEY, &hash).await?;
        tracing::info!("dentist password changed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::setup_db;

    #[tokio::test]
    async fn test_first_use_seeds_default_password() {
        let db = setup_db().await;

        assert!(CredentialService::verify_password(&db, DEFAULT_PASSWORD).await.unwrap());

        let stored = SettingsService::get(&db, DENTIST_PASSWORD_KEY).await.unwrap();
        assert_eq!(stored, Some(password::hash_password(DEFAULT_PASSWORD)));
    }

    #[tokio::test]
    async fn test_first_use_with_wrong_password_still_seeds() {
        let db = setup_db().await;

        assert!(!CredentialService::verify_password(&db, "guess").await.unwrap());
        assert!(SettingsService::get(&db, DENTIST_PASSWORD_KEY).await.unwrap().is_some());
        assert!(CredentialService::verify_password(&db, DEFAULT_PASSWORD).await.unwrap());
    }

    #[tokio::test]
    async fn test_set_password_replaces_default() {
        let db = setup_db().await;

        CredentialService::set_password(&db, "new-password").await.unwrap();

        assert!(CredentialService::verify_password(&db, "new-password").await.unwrap());
        assert!(!CredentialService::verify_password(&db, DEFAULT_PASSWORD).await.unwrap());
    }
}
