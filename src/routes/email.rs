// Envoi manuel des emails depuis l'interface du dentiste.
// Les dates arrivent déjà formatées par le front.

use actix_web::{post, web, HttpResponse};
use validator::Validate;

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::middleware::DentistAuth;
use crate::models::dto::{
    AppointmentEmailRequest, CancellationEmailRequest, MagicLinkEmailRequest, MessageResponse,
    ModificationEmailRequest, SendEmailRequest,
};
use crate::services::email_templates::{self, AppointmentDetails};
use crate::services::notifier::{EmailMessage, Notifier};

#[post("/appointment-confirmation")]
pub async fn appointment_confirmation(
    _auth: DentistAuth,
    body: web::Json<AppointmentEmailRequest>,
    notifier: web::Data<dyn Notifier>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, AppError> {
    body.validate()?;

    let details = AppointmentDetails {
        patient_name: &body.patient_name,
        date: &body.appointment_date,
        dentist_name: body.dentist_name.as_deref(),
        address: body.address.as_deref(),
        room: body.room.as_deref(),
    };
    let message = email_templates::appointment_confirmation(&config.clinic, &body.patient_email, &details);
    notifier.send(&message).await?;

    Ok(HttpResponse::Ok().json(MessageResponse::ok("Appointment confirmation email sent")))
}

#[post("/appointment-cancellation")]
pub async fn appointment_cancellation(
    _auth: DentistAuth,
    body: web::Json<CancellationEmailRequest>,
    notifier: web::Data<dyn Notifier>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, AppError> {
    body.validate()?;

    let message = email_templates::appointment_cancellation(
        &config.clinic,
        &body.patient_email,
        &body.patient_name,
        &body.appointment_date,
        body.cancelled_by,
    );
    notifier.send(&message).await?;

    Ok(HttpResponse::Ok().json(MessageResponse::ok("Appointment cancellation email sent")))
}

#[post("/appointment-modification")]
pub async fn appointment_modification(
    _auth: DentistAuth,
    body: web::Json<ModificationEmailRequest>,
    notifier: web::Data<dyn Notifier>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, AppError> {
    body.validate()?;

    let details = AppointmentDetails {
        patient_name: &body.patient_name,
        date: &body.new_date,
        dentist_name: body.dentist_name.as_deref(),
        address: body.address.as_deref(),
        room: body.room.as_deref(),
    };
    let message = email_templates::appointment_modification(
        &config.clinic,
        &body.patient_email,
        &body.old_date,
        &details,
    );
    notifier.send(&message).await?;

    Ok(HttpResponse::Ok().json(MessageResponse::ok("Appointment modification email sent")))
}

#[post("/magic-link")]
pub async fn magic_link(
    _auth: DentistAuth,
    body: web::Json<MagicLinkEmailRequest>,
    notifier: web::Data<dyn Notifier>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, AppError> {
    body.validate()?;

    let message = email_templates::magic_link(&config.clinic, &body.patient_email, &body.token);
    notifier.send(&message).await?;

    Ok(HttpResponse::Ok().json(MessageResponse::ok("Magic link email sent")))
}

/// POST /email/send - Email libre (sujet + HTML fournis)
#[post("/send")]
pub async fn send_email(
    _auth: DentistAuth,
    body: web::Json<SendEmailRequest>,
    notifier: web::Data<dyn Notifier>,
) -> Result<HttpResponse, AppError> {
    body.validate()?;

    let body = body.into_inner();
    let message = EmailMessage {
        to: body.to,
        subject: body.subject,
        html: body.html,
        text: body.text,
    };
    notifier.send(&message).await?;

    Ok(HttpResponse::Ok().json(MessageResponse::ok("Email sent successfully")))
}

pub fn email_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/email")
            .service(appointment_confirmation)
            .service(appointment_cancellation)
            .service(appointment_modification)
            .service(magic_link)
            .service(send_email)
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::json_config;
    use crate::test_support::{test_config, FailingNotifier, RecordingNotifier, TEST_JWT_SECRET};
    use crate::utils::jwt;
    use actix_web::{http::StatusCode, test, App};
    use serde_json::json;
    use std::sync::Arc;

    #[actix_web::test]
    async fn test_cancellation_email_is_sent() {
        let recorder = Arc::new(RecordingNotifier::default());
        let notifier: Arc<dyn Notifier> = recorder.clone();
        let bearer = format!("Bearer {}", jwt::generate_token(TEST_JWT_SECRET, 1).unwrap());

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(test_config()))
                .app_data(web::Data::from(notifier))
                .app_data(json_config())
                .configure(email_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/email/appointment-cancellation")
            .insert_header(("Authorization", bearer.as_str()))
            .set_json(json!({
                "patientEmail": "a@b.hu",
                "patientName": "Kiss Anna",
                "appointmentDate": "2026. október 19. 14:00",
                "cancelledBy": "doctor"
            }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let sent = recorder.messages();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "a@b.hu");
        assert!(sent[0].html.contains("az orvos által"));
    }

    #[actix_web::test]
    async fn test_send_failure_is_500() {
        let notifier: Arc<dyn Notifier> = Arc::new(FailingNotifier);
        let bearer = format!("Bearer {}", jwt::generate_token(TEST_JWT_SECRET, 1).unwrap());

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(test_config()))
                .app_data(web::Data::from(notifier))
                .app_data(json_config())
                .configure(email_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/email/send")
            .insert_header(("Authorization", bearer.as_str()))
            .set_json(json!({ "to": "a@b.hu", "subject": "Teszt", "html": "<p>x</p>" }))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );

        let req = test::TestRequest::post()
            .uri("/email/send")
            .insert_header(("Authorization", bearer.as_str()))
            .set_json(json!({ "to": "a@b.hu", "subject": "", "html": "<p>x</p>" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }
}
