use actix_web::{get, post, web, HttpResponse};
use sea_orm::DatabaseConnection;
use serde_json::json;
use validator::Validate;

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::middleware::DentistAuth;
use crate::models::dto::{ChangePasswordRequest, LoginRequest, LoginResponse, MessageResponse};
use crate::services::credential_service::CredentialService;
use crate::utils::jwt;

/// POST /auth/login - Connexion du dentiste (PUBLIC)
#[post("/login")]
pub async fn login(
    body: web::Json<LoginRequest>,
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, AppError> {
    // 1. Vérifier le mot de passe (initialisé à "admin" au premier appel)
    if !CredentialService::verify_password(db.get_ref(), &body.password).await? {
        tracing::warn!("dentist login rejected");
        return Err(AppError::Unauthorized("Invalid password".to_string()));
    }

    // 2. Générer le JWT
    let token = jwt::generate_token(&config.jwt_secret, config.jwt_ttl_hours)
        .map_err(AppError::Unauthorized)?;

    tracing::info!("dentist logged in");

    Ok(HttpResponse::Ok().json(LoginResponse {
        token,
        expires_in_hours: config.jwt_ttl_hours,
    }))
}

/// GET /auth/me - Vérifier le token (PROTÉGÉE)
#[get("/me")]
pub async fn me(auth: DentistAuth) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "role": jwt::DENTIST_SUBJECT,
        "expiresAt": auth.expires_at,
    }))
}

/// POST /auth/change-password - Changer le mot de passe (PROTÉGÉE)
#[post("/change-password")]
pub async fn change_password(
    _auth: DentistAuth,
    body: web::Json<ChangePasswordRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    body.validate()?;

    // 1. Vérifier l'ancien mot de passe
    if !CredentialService::verify_password(db.get_ref(), &body.current_password).await? {
        return Err(AppError::Unauthorized("Current password is incorrect".to_string()));
    }

    // 2. Enregistrer le nouveau hash
    CredentialService::set_password(db.get_ref(), &body.new_password).await?;
    tracing::info!("dentist password changed");

    Ok(HttpResponse::Ok().json(MessageResponse::ok("Password changed successfully")))
}

pub fn auth_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .service(login)
            .service(me)
            .service(change_password)
    );
}
