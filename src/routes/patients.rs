use actix_web::{delete, get, post, put, web, HttpResponse};
use sea_orm::DatabaseConnection;
use uuid::Uuid;
use validator::Validate;

use crate::errors::AppError;
use crate::middleware::DentistAuth;
use crate::models::dto::{EmailTajRequest, MessageResponse, PatientInput, SearchQuery};
use crate::services::patient_service::PatientService;

#[get("")]
pub async fn list_patients(
    _auth: DentistAuth,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(PatientService::list(db.get_ref()).await?))
}

#[post("")]
pub async fn create_patient(
    _auth: DentistAuth,
    body: web::Json<PatientInput>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    body.validate()?;
    let patient = PatientService::create(db.get_ref(), body.into_inner()).await?;

    Ok(HttpResponse::Created().json(patient))
}

/// GET /patients/search?q= - nom, email, TAJ ou téléphone
#[get("/search")]
pub async fn search_patients(
    _auth: DentistAuth,
    query: web::Query<SearchQuery>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let patients = PatientService::search(db.get_ref(), &query.q).await?;
    Ok(HttpResponse::Ok().json(patients))
}

/// POST /patients/email-taj - null si aucun patient ne correspond
#[post("/email-taj")]
pub async fn find_by_email_and_taj(
    _auth: DentistAuth,
    body: web::Json<EmailTajRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    if body.email.trim().is_empty() || body.taj.trim().is_empty() {
        return Err(AppError::Validation("email and taj are required".to_string()));
    }

    let patient = PatientService::find_by_email_and_taj(db.get_ref(), &body.email, &body.taj).await?;
    Ok(HttpResponse::Ok().json(patient))
}

#[get("/email/{email}")]
pub async fn find_by_email(
    _auth: DentistAuth,
    path: web::Path<String>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let patient = PatientService::find_by_email(db.get_ref(), &path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(patient))
}

#[get("/{id}")]
pub async fn get_patient(
    _auth: DentistAuth,
    path: web::Path<Uuid>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let patient = PatientService::find(db.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(patient))
}

#[put("/{id}")]
pub async fn update_patient(
    _auth: DentistAuth,
    path: web::Path<Uuid>,
    body: web::Json<PatientInput>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    body.validate()?;
    let patient = PatientService::update(db.get_ref(), path.into_inner(), body.into_inner()).await?;

    Ok(HttpResponse::Ok().json(patient))
}

#[delete("/{id}")]
pub async fn delete_patient(
    _auth: DentistAuth,
    path: web::Path<Uuid>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    PatientService::delete(db.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::ok("Patient deleted")))
}

pub fn patient_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/patients")
            .service(list_patients)
            .service(create_patient)
            .service(search_patients)
            .service(find_by_email_and_taj)
            .service(find_by_email)
            .service(get_patient)
            .service(update_patient)
            .service(delete_patient)
    );
}
