use chrono::{DateTime, Duration, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::*;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::patient_portal_tokens::{self, Entity as Tokens, Column as TokenColumn};
use crate::utils::token::secure_token;

/// Durée de validité d'un lien de connexion
pub const TOKEN_TTL_HOURS: i64 = 24;

pub struct TokenService;

impl TokenService {
    /// Crée un token magic link pour (email, TAJ).
    /// Le service n'envoie pas d'email: l'appelant transmet le token au Notifier.
    pub async fn issue<C: ConnectionTrait>(
        db: &C,
        email: &str,
        taj: &str,
        patient_id: Option<Uuid>,
    ) -> Result<patient_portal_tokens::Model, AppError> {
        Self::issue_at(db, email, taj, patient_id, Utc::now()).await
    }

    pub async fn issue_at<C: ConnectionTrait>(
        db: &C,
        email: &str,
        taj: &str,
        patient_id: Option<Uuid>,
        now: DateTime<Utc>,
    ) -> Result<patient_portal_tokens::Model, AppError> {
        let token = patient_portal_tokens::ActiveModel {
            id: Set(Uuid::new_v4()),
            token: Set(secure_token()),
            patient_id: Set(patient_id),
            email: Set(email.to_string()),
            taj: Set(taj.to_string()),
            expires_at: Set(now + Duration::hours(TOKEN_TTL_HOURS)),
            used: Set(false),
            created_at: Set(now),
        };

        let token = token.insert(db).await?;
        tracing::info!(email = %token.email, expires_at = %token.expires_at, "patient portal token issued");

        Ok(token)
    }

    /// Lecture simple, sans consommer le token
    pub async fn find<C: ConnectionTrait>(
        db: &C,
        token: &str,
    ) -> Result<Option<patient_portal_tokens::Model>, AppError> {
        Ok(Tokens::find()
            .filter(TokenColumn::Token.eq(token))
            .one(db)
            .await?)
    }

    /// Vérifie et consomme un token (usage unique).
    /// `patient_id` permet d'enregistrer le patient résolu au même moment.
    pub async fn verify_and_consume<C: ConnectionTrait>(
        db: &C,
        token: &str,
        patient_id: Option<Uuid>,
    ) -> Result<patient_portal_tokens::Model, AppError> {
        Self::verify_and_consume_at(db, token, patient_id, Utc::now()).await
    }

    pub async fn verify_and_consume_at<C: ConnectionTrait>(
        db: &C,
        token: &str,
        patient_id: Option<Uuid>,
        now: DateTime<Utc>,
    ) -> Result<patient_portal_tokens::Model, AppError> {
        // 1. Le token existe ?
        let record = Self::find(db, token)
            .await?
            .ok_or(AppError::NotFound("Token"))?;

        // 2. Déjà utilisé ? (vérifié avant l'expiration)
        if record.used {
            return Err(AppError::TokenAlreadyUsed);
        }

        // 3. Expiré ?
        if now > record.expires_at {
            return Err(AppError::TokenExpired);
        }

        // 4. Consommation atomique: UPDATE ... WHERE token = ? AND used = false
        let mut update = Tokens::update_many()
            .col_expr(TokenColumn::Used, Expr::value(true))
            .filter(TokenColumn::Token.eq(token))
            .filter(TokenColumn::Used.eq(false));

        if let Some(patient_id) = patient_id {
            update = update.col_expr(TokenColumn::PatientId, Expr::value(patient_id));
        }

        let result = update.exec(db).await?;

        // Une autre requête a consommé le token entre la lecture et l'update
        if result.rows_affected == 0 {
            tracing::warn!("concurrent use of a patient portal token rejected");
            return Err(AppError::TokenAlreadyUsed);
        }

        tracing::info!(email = %record.email, "patient portal token consumed");

        Ok(patient_portal_tokens::Model {
            used: true,
            patient_id: patient_id.or(record.patient_id),
            ..record
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{insert_patient, setup_db, setup_file_db};

    #[tokio::test]
    async fn test_issue_token() {
        let db = setup_db().await;
        let now = Utc::now();

        let token = TokenService::issue_at(&db, "a@b.hu", "123456789", None, now).await.unwrap();

        assert_eq!(token.token.len(), 64);
        assert!(!token.used);
        assert_eq!(token.patient_id, None);
        let drift = token.expires_at - (now + Duration::hours(24));
        assert!(drift.num_milliseconds().abs() < 1);
    }

    #[tokio::test]
    async fn test_token_is_single_use() {
        let db = setup_db().await;
        let token = TokenService::issue(&db, "a@b.hu", "123456789", None).await.unwrap();

        let first = TokenService::verify_and_consume(&db, &token.token, None).await.unwrap();
        assert!(first.used);

        let second = TokenService::verify_and_consume(&db, &token.token, None).await;
        assert!(matches!(second, Err(AppError::TokenAlreadyUsed)));

        let stored = TokenService::find(&db, &token.token).await.unwrap().unwrap();
        assert!(stored.used);
    }

    #[tokio::test]
    async fn test_used_token_reported_as_used_even_when_expired() {
        let db = setup_db().await;
        let issued_at = Utc::now();
        let token = TokenService::issue_at(&db, "a@b.hu", "123456789", None, issued_at).await.unwrap();

        TokenService::verify_and_consume_at(&db, &token.token, None, issued_at).await.unwrap();

        let later = issued_at + Duration::hours(48);
        let result = TokenService::verify_and_consume_at(&db, &token.token, None, later).await;
        assert!(matches!(result, Err(AppError::TokenAlreadyUsed)));
    }

    #[tokio::test]
    async fn test_expired_token_rejected() {
        let db = setup_db().await;
        let issued_at = Utc::now();
        let token = TokenService::issue_at(&db, "a@b.hu", "123456789", None, issued_at).await.unwrap();

        let after_expiry = issued_at + Duration::hours(24) + Duration::seconds(1);
        let result = TokenService::verify_and_consume_at(&db, &token.token, None, after_expiry).await;
        assert!(matches!(result, Err(AppError::TokenExpired)));

        // Toujours utilisable juste avant l'expiration
        let just_before = issued_at + Duration::hours(23);
        assert!(TokenService::verify_and_consume_at(&db, &token.token, None, just_before).await.is_ok());
    }

    #[tokio::test]
    async fn test_unknown_token() {
        let db = setup_db().await;
        let result = TokenService::verify_and_consume(&db, "deadbeef", None).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_consume_records_patient() {
        let db = setup_db().await;
        let patient = insert_patient(&db, Some("a@b.hu"), "123456789").await;
        let token = TokenService::issue(&db, "a@b.hu", "123456789", None).await.unwrap();

        let consumed = TokenService::verify_and_consume(&db, &token.token, Some(patient.id)).await.unwrap();
        assert_eq!(consumed.patient_id, Some(patient.id));

        let stored = TokenService::find(&db, &token.token).await.unwrap().unwrap();
        assert_eq!(stored.patient_id, Some(patient.id));
    }

    #[tokio::test]
    async fn test_concurrent_consumption_succeeds_once() {
        let file_db = setup_file_db().await;
        let db = &file_db.db;

        for _ in 0..10 {
            let token = TokenService::issue(db, "a@b.hu", "123456789", None).await.unwrap();

            let (first, second) = tokio::join!(
                TokenService::verify_and_consume(db, &token.token, None),
                TokenService::verify_and_consume(db, &token.token, None),
            );

            let results = [first, second];
            assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
            assert!(results
                .iter()
                .any(|r| matches!(r, Err(AppError::TokenAlreadyUsed))));
        }
    }
}
