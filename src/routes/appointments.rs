use actix_web::{delete, get, post, put, web, HttpResponse};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::middleware::DentistAuth;
use crate::models::appointments::CreatedBy;
use crate::models::dto::{
    ApprovalUpdateRequest, BookingRequest, CancelQuery, DateRangeQuery, MessageResponse,
    ModifyAppointmentRequest, StatusUpdateRequest,
};
use crate::services::email_templates::CancelledBy;
use crate::services::notifier::Notifier;
use crate::services::scheduling_service::SchedulingService;

/// Handlers du dentiste: tous protégés par JWT
type Deps = (web::Data<DatabaseConnection>, web::Data<dyn Notifier>, web::Data<AppConfig>);

fn scheduling(deps: &Deps) -> SchedulingService<'_> {
    let (db, notifier, config) = deps;
    SchedulingService::new(db.get_ref(), notifier.get_ref(), &config.clinic)
}

/// GET /appointments - Les plus récents d'abord
#[get("")]
pub async fn list_appointments(_auth: DentistAuth, deps: Deps) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(scheduling(&deps).list_appointments().await?))
}

/// POST /appointments - Réservation par le dentiste (approuvée d'office)
#[post("")]
pub async fn book_appointment(
    _auth: DentistAuth,
    body: web::Json<BookingRequest>,
    deps: Deps,
) -> Result<HttpResponse, AppError> {
    let appointment = scheduling(&deps)
        .book(body.into_inner(), CreatedBy::Dentist)
        .await?;

    Ok(HttpResponse::Created().json(appointment))
}

#[get("/range")]
pub async fn appointments_in_range(
    _auth: DentistAuth,
    query: web::Query<DateRangeQuery>,
    deps: Deps,
) -> Result<HttpResponse, AppError> {
    if query.end_date < query.start_date {
        return Err(AppError::Validation("endDate must not be before startDate".to_string()));
    }

    let appointments = scheduling(&deps)
        .appointments_in_range(query.start_date, query.end_date)
        .await?;

    Ok(HttpResponse::Ok().json(appointments))
}

#[get("/patient/{patient_id}")]
pub async fn appointments_for_patient(
    _auth: DentistAuth,
    path: web::Path<Uuid>,
    deps: Deps,
) -> Result<HttpResponse, AppError> {
    let appointments = scheduling(&deps)
        .appointments_for_patient(path.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(appointments))
}

#[get("/time-slot/{time_slot_id}")]
pub async fn appointment_for_slot(
    _auth: DentistAuth,
    path: web::Path<Uuid>,
    deps: Deps,
) -> Result<HttpResponse, AppError> {
    let appointment = scheduling(&deps)
        .appointment_for_slot(path.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(appointment))
}

#[get("/{id}")]
pub async fn get_appointment(
    _auth: DentistAuth,
    path: web::Path<Uuid>,
    deps: Deps,
) -> Result<HttpResponse, AppError> {
    let appointment = scheduling(&deps).find_appointment(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(appointment))
}

/// PUT /appointments/{id} - Déplacer vers un autre créneau
#[put("/{id}")]
pub async fn modify_appointment(
    _auth: DentistAuth,
    path: web::Path<Uuid>,
    body: web::Json<ModifyAppointmentRequest>,
    deps: Deps,
) -> Result<HttpResponse, AppError> {
    let appointment = scheduling(&deps)
        .modify(path.into_inner(), body.time_slot_id)
        .await?;

    Ok(HttpResponse::Ok().json(appointment))
}

/// DELETE /appointments/{id}?cancelledBy=doctor|patient
#[delete("/{id}")]
pub async fn cancel_appointment(
    _auth: DentistAuth,
    path: web::Path<Uuid>,
    query: web::Query<CancelQuery>,
    deps: Deps,
) -> Result<HttpResponse, AppError> {
    let cancelled_by = query.cancelled_by.unwrap_or(CancelledBy::Doctor);
    scheduling(&deps).cancel(path.into_inner(), cancelled_by).await?;

    Ok(HttpResponse::Ok().json(MessageResponse::ok("Appointment cancelled")))
}

#[put("/{id}/status")]
pub async fn update_status(
    _auth: DentistAuth,
    path: web::Path<Uuid>,
    body: web::Json<StatusUpdateRequest>,
    deps: Deps,
) -> Result<HttpResponse, AppError> {
    let appointment = scheduling(&deps)
        .update_status(path.into_inner(), body.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(appointment))
}

#[put("/{id}/approval")]
pub async fn update_approval(
    _auth: DentistAuth,
    path: web::Path<Uuid>,
    body: web::Json<ApprovalUpdateRequest>,
    deps: Deps,
) -> Result<HttpResponse, AppError> {
    let appointment = scheduling(&deps)
        .update_approval(path.into_inner(), body.approval_status)
        .await?;

    Ok(HttpResponse::Ok().json(appointment))
}

pub fn appointment_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/appointments")
            .service(list_appointments)
            .service(book_appointment)
            .service(appointments_in_range)
            .service(appointments_for_patient)
            .service(appointment_for_slot)
            .service(get_appointment)
            .service(modify_appointment)
            .service(cancel_appointment)
            .service(update_status)
            .service(update_approval)
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::json_config;
    use crate::test_support::{
        insert_patient, insert_slot, setup_db, test_config, RecordingNotifier, TEST_JWT_SECRET,
    };
    use crate::utils::jwt;
    use actix_web::{http::StatusCode, test, App};
    use chrono::{Duration, Utc};
    use serde_json::json;
    use std::sync::Arc;

    #[actix_web::test]
    async fn test_book_modify_status_cancel() {
        let db = setup_db().await;
        let patient = insert_patient(&db, Some("a@b.hu"), "123456789").await;
        let first_slot = insert_slot(&db, Utc::now() + Duration::days(1)).await;
        let second_slot = insert_slot(&db, Utc::now() + Duration::days(2)).await;
        let notifier: Arc<dyn Notifier> = Arc::new(RecordingNotifier::default());
        let bearer = format!("Bearer {}", jwt::generate_token(TEST_JWT_SECRET, 1).unwrap());

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(db))
                .app_data(web::Data::new(test_config()))
                .app_data(web::Data::from(notifier))
                .app_data(json_config())
                .configure(appointment_routes),
        )
        .await;

        // Réservation
        let req = test::TestRequest::post()
            .uri("/appointments")
            .insert_header(("Authorization", bearer.as_str()))
            .set_json(json!({
                "patientId": patient.id,
                "timeSlotId": first_slot.id,
                "appointmentType": "kontroll"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let appointment: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(appointment["approvalStatus"], "approved");
        let id = appointment["id"].as_str().unwrap().to_string();

        // Le même créneau une deuxième fois: 400
        let req = test::TestRequest::post()
            .uri("/appointments")
            .insert_header(("Authorization", bearer.as_str()))
            .set_json(json!({ "patientId": patient.id, "timeSlotId": first_slot.id }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        // Lookup par créneau (route spécifique avant /{id})
        let req = test::TestRequest::get()
            .uri(&format!("/appointments/time-slot/{}", first_slot.id))
            .insert_header(("Authorization", bearer.as_str()))
            .to_request();
        let by_slot: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(by_slot["id"], id.as_str());

        // Déplacement
        let req = test::TestRequest::put()
            .uri(&format!("/appointments/{}", id))
            .insert_header(("Authorization", bearer.as_str()))
            .set_json(json!({ "timeSlotId": second_slot.id }))
            .to_request();
        let moved: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(moved["timeSlotId"], second_slot.id.to_string());

        // Terminé sans notes: 400
        let req = test::TestRequest::put()
            .uri(&format!("/appointments/{}/status", id))
            .insert_header(("Authorization", bearer.as_str()))
            .set_json(json!({ "appointmentStatus": "completed", "completionNotes": " " }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        // Annulation, puis deuxième annulation: 404
        let req = test::TestRequest::delete()
            .uri(&format!("/appointments/{}?cancelledBy=patient", id))
            .insert_header(("Authorization", bearer.as_str()))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::delete()
            .uri(&format!("/appointments/{}", id))
            .insert_header(("Authorization", bearer.as_str()))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }
}
