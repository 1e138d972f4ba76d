// ============================================================================
// ROUTES : PORTAIL PATIENT
// ============================================================================
//
// Connexion sans mot de passe (magic link) puis réservation en libre service.
//
//   POST   /patient-portal/login           email + TAJ -> email avec le lien
//   GET    /patient-portal/verify?token=   consomme le token, ouvre une session
//   POST   /patient-portal/logout          (session)
//   GET    /patient-portal/me              (session)
//   PUT    /patient-portal/me              (session)
//   GET    /patient-portal/appointments    (session)
//   POST   /patient-portal/appointments    (session) demande de rendez-vous
//   DELETE /patient-portal/appointments/{id} (session)
//   GET    /patient-portal/available-slots (session)
//
// Accès bas niveau aux tokens et sessions:
//   POST   /patient-portal/tokens          (dentiste)
//   GET    /patient-portal/tokens/{token}
//   PUT    /patient-portal/tokens/{token}  consommation
//   POST   /patient-portal/sessions        (dentiste)
//   DELETE /patient-portal/sessions        (dentiste) purge des sessions expirées
//   GET    /patient-portal/sessions/{id}
//   DELETE /patient-portal/sessions/{id}
//
// ============================================================================

use actix_web::{delete, get, post, put, web, HttpResponse};
use chrono::Utc;
use sea_orm::DatabaseConnection;
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::middleware::{DentistAuth, PortalPatient};
use crate::models::appointments::CreatedBy;
use crate::models::dto::{
    BookingRequest, ConsumeTokenRequest, CreateSessionRequest, IssueTokenRequest, MessageResponse,
    PatientInput, PortalBookingRequest, PortalLoginRequest, PortalSessionResponse, VerifyQuery,
};
use crate::services::email_templates::{self, CancelledBy};
use crate::services::notifier::Notifier;
use crate::services::patient_service::{normalize_taj, PatientService};
use crate::services::scheduling_service::SchedulingService;
use crate::services::session_service::SessionService;
use crate::services::token_service::TokenService;

// ----------------------------------------------------------------------------
// Flux magic link
// ----------------------------------------------------------------------------

/// POST /patient-portal/login - Envoie le lien de connexion (PUBLIC)
/// Le token n'est jamais renvoyé dans la réponse, seulement par email.
#[post("/login")]
pub async fn login(
    body: web::Json<PortalLoginRequest>,
    db: web::Data<DatabaseConnection>,
    notifier: web::Data<dyn Notifier>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, AppError> {
    body.validate()?;
    let request = body.into_inner();
    let email = request.email.trim().to_string();
    let taj = normalize_taj(&request.taj)?;

    // 1. Patient existant ou inscription
    let patient = PatientService::find_or_create(db.get_ref(), &email, &taj, request.name).await?;

    // 2. Token à usage unique (24h)
    let token = TokenService::issue(db.get_ref(), &email, &taj, Some(patient.id)).await?;

    // 3. Email avec le lien (un échec ici est remonté: sans email, pas de connexion)
    let message = email_templates::magic_link(&config.clinic, &email, &token.token);
    notifier.send(&message).await?;

    Ok(HttpResponse::Ok().json(MessageResponse::ok("Login link sent")))
}

/// GET /patient-portal/verify?token= - Consomme le lien et ouvre une session (PUBLIC)
#[get("/verify")]
pub async fn verify(
    query: web::Query<VerifyQuery>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    // 1. Consommer le token (usage unique, expiration)
    let token = TokenService::verify_and_consume(db.get_ref(), &query.token, None).await?;

    // 2. Retrouver (ou créer) le patient: le token peut n'en désigner aucun,
    //    ou un patient supprimé depuis l'envoi du lien
    let known = match token.patient_id {
        Some(patient_id) => PatientService::find(db.get_ref(), patient_id).await?,
        None => None,
    };
    let patient_id = match known {
        Some(patient) => patient.id,
        None => {
            PatientService::find_or_create(db.get_ref(), &token.email, &token.taj, None)
                .await?
                .id
        }
    };

    // 3. Session de 30 jours
    let session = SessionService::create(db.get_ref(), patient_id, &token.email).await?;

    Ok(HttpResponse::Ok().json(PortalSessionResponse {
        session_id: session.session_id,
        patient_id: session.patient_id,
        email: session.email,
        expires_at: session.expires_at,
    }))
}

/// POST /patient-portal/logout
#[post("/logout")]
pub async fn logout(
    patient: PortalPatient,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    SessionService::destroy(db.get_ref(), &patient.session_id).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::ok("Logged out")))
}

// ----------------------------------------------------------------------------
// Espace patient
// ----------------------------------------------------------------------------

#[get("/me")]
pub async fn get_profile(
    patient: PortalPatient,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let profile = PatientService::find(db.get_ref(), patient.patient_id).await?;
    Ok(HttpResponse::Ok().json(profile))
}

/// PUT /patient-portal/me - Email et TAJ (clé de connexion) ne changent pas ici
#[put("/me")]
pub async fn update_profile(
    patient: PortalPatient,
    body: web::Json<PatientInput>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    body.validate()?;

    let current = PatientService::find(db.get_ref(), patient.patient_id)
        .await?
        .ok_or(AppError::NotFound("Patient"))?;

    let input = PatientInput {
        email: current.email,
        taj: current.taj,
        ..body.into_inner()
    };

    let updated = PatientService::update(db.get_ref(), patient.patient_id, input).await?;
    Ok(HttpResponse::Ok().json(updated))
}

#[get("/appointments")]
pub async fn my_appointments(
    patient: PortalPatient,
    db: web::Data<DatabaseConnection>,
    notifier: web::Data<dyn Notifier>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, AppError> {
    let service = SchedulingService::new(db.get_ref(), notifier.get_ref(), &config.clinic);
    let appointments = service.appointments_for_patient(patient.patient_id).await?;

    Ok(HttpResponse::Ok().json(appointments))
}

/// POST /patient-portal/appointments - Demande de rendez-vous (en attente d'approbation)
#[post("/appointments")]
pub async fn request_appointment(
    patient: PortalPatient,
    body: web::Json<PortalBookingRequest>,
    db: web::Data<DatabaseConnection>,
    notifier: web::Data<dyn Notifier>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, AppError> {
    let service = SchedulingService::new(db.get_ref(), notifier.get_ref(), &config.clinic);

    let request = BookingRequest {
        patient_id: patient.patient_id,
        time_slot_id: body.time_slot_id,
        appointment_type: body.appointment_type,
    };
    let appointment = service.book(request, CreatedBy::Patient).await?;

    Ok(HttpResponse::Created().json(appointment))
}

/// DELETE /patient-portal/appointments/{id} - Le patient annule SON rendez-vous
#[delete("/appointments/{id}")]
pub async fn cancel_my_appointment(
    patient: PortalPatient,
    path: web::Path<Uuid>,
    db: web::Data<DatabaseConnection>,
    notifier: web::Data<dyn Notifier>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, AppError> {
    let service = SchedulingService::new(db.get_ref(), notifier.get_ref(), &config.clinic);
    let appointment_id = path.into_inner();

    // Le rendez-vous d'un autre patient est traité comme inexistant
    let owned = service
        .find_appointment(appointment_id)
        .await?
        .filter(|appointment| appointment.patient_id == patient.patient_id)
        .ok_or(AppError::NotFound("Appointment"))?;

    service.cancel(owned.id, CancelledBy::Patient).await?;

    Ok(HttpResponse::Ok().json(MessageResponse::ok("Appointment cancelled")))
}

#[get("/available-slots")]
pub async fn available_slots(
    _patient: PortalPatient,
    db: web::Data<DatabaseConnection>,
    notifier: web::Data<dyn Notifier>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, AppError> {
    let service = SchedulingService::new(db.get_ref(), notifier.get_ref(), &config.clinic);
    let slots = service.list_available_slots(Utc::now()).await?;

    Ok(HttpResponse::Ok().json(slots))
}

// ----------------------------------------------------------------------------
// Tokens et sessions
// ----------------------------------------------------------------------------

#[post("/tokens")]
pub async fn issue_token(
    _auth: DentistAuth,
    body: web::Json<IssueTokenRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    body.validate()?;
    let taj = normalize_taj(&body.taj)?;

    let token = TokenService::issue(db.get_ref(), body.email.trim(), &taj, body.patient_id).await?;
    Ok(HttpResponse::Created().json(token))
}

/// GET /patient-portal/tokens/{token} - Lecture sans consommation (null si absent)
#[get("/tokens/{token}")]
pub async fn get_token(
    path: web::Path<String>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let token = TokenService::find(db.get_ref(), &path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(token))
}

#[put("/tokens/{token}")]
pub async fn consume_token(
    path: web::Path<String>,
    body: Option<web::Json<ConsumeTokenRequest>>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let patient_id = body.and_then(|body| body.into_inner().patient_id);
    let token = TokenService::verify_and_consume(db.get_ref(), &path.into_inner(), patient_id).await?;

    Ok(HttpResponse::Ok().json(token))
}

#[post("/sessions")]
pub async fn create_session(
    _auth: DentistAuth,
    body: web::Json<CreateSessionRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    PatientService::find(db.get_ref(), body.patient_id)
        .await?
        .ok_or(AppError::NotFound("Patient"))?;

    let session = SessionService::create(db.get_ref(), body.patient_id, body.email.trim()).await?;
    Ok(HttpResponse::Created().json(session))
}

#[delete("/sessions")]
pub async fn purge_sessions(
    _auth: DentistAuth,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let purged = SessionService::purge_expired(db.get_ref(), Utc::now()).await?;
    Ok(HttpResponse::Ok().json(json!({ "purged": purged })))
}

#[get("/sessions/{session_id}")]
pub async fn get_session(
    path: web::Path<String>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let session = SessionService::verify(db.get_ref(), &path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(session))
}

#[delete("/sessions/{session_id}")]
pub async fn delete_session(
    path: web::Path<String>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    SessionService::destroy(db.get_ref(), &path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::ok("Session deleted")))
}

pub fn patient_portal_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/patient-portal")
            .service(login)
            .service(verify)
            .service(logout)
            .service(get_profile)
            .service(update_profile)
            .service(my_appointments)
            .service(request_appointment)
            .service(cancel_my_appointment)
            .service(available_slots)
            .service(issue_token)
            .service(get_token)
            .service(consume_token)
            .service(create_session)
            .service(purge_sessions)
            .service(get_session)
            .service(delete_session)
    );
}
