use chrono::{DateTime, Duration, Utc};
use sea_orm::*;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::patient_portal_sessions::{self, Entity as Sessions, Column as SessionColumn};
use crate::utils::token::secure_token;

/// Durée de vie d'une session du portail patient
pub const SESSION_TTL_DAYS: i64 = 30;

pub struct SessionService;

impl SessionService {
    /// Crée une session pour un patient dont le token vient d'être consommé
    pub async fn create<C: ConnectionTrait>(
        db: &C,
        patient_id: Uuid,
        email: &str,
    ) -> Result<patient_portal_sessions::Model, AppError> {
        Self::create_at(db, patient_id, email, Utc::now()).await
    }

    pub async fn create_at<C: ConnectionTrait>(
        db: &C,
        patient_id: Uuid,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<patient_portal_sessions::Model, AppError> {
        let session = patient_portal_sessions::ActiveModel {
            id: Set(Uuid::new_v4()),
            session_id: Set(secure_token()),
            patient_id: Set(patient_id),
            email: Set(email.to_string()),
            created_at: Set(now),
            expires_at: Set(now + Duration::days(SESSION_TTL_DAYS)),
        };

        let session = session.insert(db).await?;
        tracing::info!(patient_id = %patient_id, "patient portal session created");

        Ok(session)
    }

    /// Vérifie une session. Expirée: supprimée puis refusée.
    pub async fn verify<C: ConnectionTrait>(
        db: &C,
        session_id: &str,
    ) -> Result<patient_portal_sessions::Model, AppError> {
        Self::verify_at(db, session_id, Utc::now()).await
    }

    pub async fn verify_at<C: ConnectionTrait>(
        db: &C,
        session_id: &str,
        now: DateTime<Utc>,
    ) -> Result<patient_portal_sessions::Model, AppError> {
        let session = Sessions::find()
            .filter(SessionColumn::SessionId.eq(session_id))
            .one(db)
            .await?
            .ok_or(AppError::NotFound("Session"))?;

        if now > session.expires_at {
            Self::destroy(db, session_id).await?;
            tracing::info!(patient_id = %session.patient_id, "expired patient portal session removed");
            return Err(AppError::SessionExpired);
        }

        Ok(session)
    }

    /// Déconnexion. Idempotent: supprimer une session absente n'est pas une erreur.
    pub async fn destroy<C: ConnectionTrait>(db: &C, session_id: &str) -> Result<(), AppError> {
        Sessions::delete_many()
            .filter(SessionColumn::SessionId.eq(session_id))
            .exec(db)
            .await?;

        Ok(())
    }

    /// Nettoyage optionnel des sessions expirées, retourne le nombre supprimé
    pub async fn purge_expired<C: ConnectionTrait>(db: &C, now: DateTime<Utc>) -> Result<u64, AppError> {
        let result = Sessions::delete_many()
            .filter(SessionColumn::ExpiresAt.lt(now))
            .exec(db)
            .await?;

        if result.rows_affected > 0 {
            tracing::info!(count = result.rows_affected, "expired patient portal sessions purged");
        }

        Ok(result.rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{insert_patient, setup_db};

    #[tokio::test]
    async fn test_create_and_verify() {
        let db = setup_db().await;
        let patient = insert_patient(&db, Some("a@b.hu"), "123456789").await;

        let session = SessionService::create(&db, patient.id, "a@b.hu").await.unwrap();
        assert_eq!(session.session_id.len(), 64);

        let verified = SessionService::verify(&db, &session.session_id).await.unwrap();
        assert_eq!(verified.patient_id, patient.id);
        assert_eq!(verified.email, "a@b.hu");
    }

    #[tokio::test]
    async fn test_expired_session_is_deleted() {
        let db = setup_db().await;
        let patient = insert_patient(&db, Some("a@b.hu"), "123456789").await;
        let issued_at = Utc::now();
        let session = SessionService::create_at(&db, patient.id, "a@b.hu", issued_at).await.unwrap();

        let later = issued_at + Duration::days(30) + Duration::seconds(1);
        let result = SessionService::verify_at(&db, &session.session_id, later).await;
        assert!(matches!(result, Err(AppError::SessionExpired)));

        let again = SessionService::verify_at(&db, &session.session_id, later).await;
        assert!(matches!(again, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_session_valid_before_expiry() {
        let db = setup_db().await;
        let patient = insert_patient(&db, Some("a@b.hu"), "123456789").await;
        let issued_at = Utc::now();
        let session = SessionService::create_at(&db, patient.id, "a@b.hu", issued_at).await.unwrap();

        let day_29 = issued_at + Duration::days(29);
        assert!(SessionService::verify_at(&db, &session.session_id, day_29).await.is_ok());
    }

    #[tokio::test]
    async fn test_destroy_is_idempotent() {
        let db = setup_db().await;
        let patient = insert_patient(&db, Some("a@b.hu"), "123456789").await;
        let session = SessionService::create(&db, patient.id, "a@b.hu").await.unwrap();

        SessionService::destroy(&db, &session.session_id).await.unwrap();
        SessionService::destroy(&db, &session.session_id).await.unwrap();
        SessionService::destroy(&db, "never-existed").await.unwrap();

        let result = SessionService::verify(&db, &session.session_id).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let db = setup_db().await;
        let patient = insert_patient(&db, Some("a@b.hu"), "123456789").await;
        let now = Utc::now();

        SessionService::create_at(&db, patient.id, "a@b.hu", now - Duration::days(40)).await.unwrap();
        let fresh = SessionService::create_at(&db, patient.id, "a@b.hu", now).await.unwrap();

        assert_eq!(SessionService::purge_expired(&db, now).await.unwrap(), 1);
        assert!(SessionService::verify_at(&db, &fresh.session_id, now).await.is_ok());
    }
}
