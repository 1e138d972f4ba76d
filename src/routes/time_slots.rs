use actix_web::{delete, get, post, put, web, HttpResponse};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::middleware::DentistAuth;
use crate::models::dto::{DateRangeQuery, MessageResponse, TimeSlotInput, TimeSlotUpdate};
use crate::services::notifier::Notifier;
use crate::services::scheduling_service::SchedulingService;
use crate::services::slot_generation::RecurrenceRule;

/// GET /time-slots - Tous les créneaux (les dérives sont réparées au passage)
#[get("")]
pub async fn list_slots(
    _auth: DentistAuth,
    db: web::Data<DatabaseConnection>,
    notifier: web::Data<dyn Notifier>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, AppError> {
    let service = SchedulingService::new(db.get_ref(), notifier.get_ref(), &config.clinic);
    Ok(HttpResponse::Ok().json(service.list_slots().await?))
}

#[post("")]
pub async fn create_slot(
    _auth: DentistAuth,
    body: web::Json<TimeSlotInput>,
    db: web::Data<DatabaseConnection>,
    notifier: web::Data<dyn Notifier>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, AppError> {
    let service = SchedulingService::new(db.get_ref(), notifier.get_ref(), &config.clinic);
    let slot = service.create_slot(body.into_inner()).await?;

    Ok(HttpResponse::Created().json(slot))
}

/// GET /time-slots/range?startDate=...&endDate=...
#[get("/range")]
pub async fn slots_in_range(
    _auth: DentistAuth,
    query: web::Query<DateRangeQuery>,
    db: web::Data<DatabaseConnection>,
    notifier: web::Data<dyn Notifier>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, AppError> {
    if query.end_date < query.start_date {
        return Err(AppError::Validation("endDate must not be before startDate".to_string()));
    }

    let service = SchedulingService::new(db.get_ref(), notifier.get_ref(), &config.clinic);
    let slots = service.list_slots_in_range(query.start_date, query.end_date).await?;

    Ok(HttpResponse::Ok().json(slots))
}

/// POST /time-slots/generate - Créneaux récurrents (corps `{}` = règle par défaut)
#[post("/generate")]
pub async fn generate_slots(
    _auth: DentistAuth,
    body: web::Json<RecurrenceRule>,
    db: web::Data<DatabaseConnection>,
    notifier: web::Data<dyn Notifier>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, AppError> {
    let service = SchedulingService::new(db.get_ref(), notifier.get_ref(), &config.clinic);
    let report = service.generate_weekly_slots(&body).await?;

    Ok(HttpResponse::Created().json(report))
}

#[get("/{id}")]
pub async fn get_slot(
    _auth: DentistAuth,
    path: web::Path<Uuid>,
    db: web::Data<DatabaseConnection>,
    notifier: web::Data<dyn Notifier>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, AppError> {
    let service = SchedulingService::new(db.get_ref(), notifier.get_ref(), &config.clinic);
    Ok(HttpResponse::Ok().json(service.find_slot(path.into_inner()).await?))
}

#[put("/{id}")]
pub async fn update_slot(
    _auth: DentistAuth,
    path: web::Path<Uuid>,
    body: web::Json<TimeSlotUpdate>,
    db: web::Data<DatabaseConnection>,
    notifier: web::Data<dyn Notifier>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, AppError> {
    let service = SchedulingService::new(db.get_ref(), notifier.get_ref(), &config.clinic);
    let slot = service.update_slot(path.into_inner(), body.into_inner()).await?;

    Ok(HttpResponse::Ok().json(slot))
}

#[delete("/{id}")]
pub async fn delete_slot(
    _auth: DentistAuth,
    path: web::Path<Uuid>,
    db: web::Data<DatabaseConnection>,
    notifier: web::Data<dyn Notifier>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, AppError> {
    let service = SchedulingService::new(db.get_ref(), notifier.get_ref(), &config.clinic);
    service.delete_slot(path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(MessageResponse::ok("Time slot deleted")))
}

pub fn time_slot_routes(cfg: &mut web::ServiceConfig) {
    // "/range" et "/generate" avant "/{id}"
    cfg.service(
        web::scope("/time-slots")
            .service(list_slots)
            .service(create_slot)
            .service(slots_in_range)
            .service(generate_slots)
            .service(get_slot)
            .service(update_slot)
            .service(delete_slot)
    );
}
