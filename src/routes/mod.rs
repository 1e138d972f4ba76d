pub mod appointments;
pub mod auth;
pub mod email;
pub mod health;
pub mod patient_portal;
pub mod patients;
pub mod settings;
pub mod time_slots;

use actix_web::{error, web};

use crate::errors::AppError;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .app_data(json_config())
            .service(health::health_check)
            .configure(auth::auth_routes)
            .configure(patient_portal::patient_portal_routes)
            .configure(time_slots::time_slot_routes)
            .configure(appointments::appointment_routes)
            .configure(patients::patient_routes)
            .configure(settings::settings_routes)
            .configure(email::email_routes)
    );
}

/// Corps JSON invalide = 400 au format {"error": "..."}
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let message = match &err {
            error::JsonPayloadError::Deserialize(e) => format!("Invalid request body: {}", e),
            other => other.to_string(),
        };
        AppError::Validation(message).into()
    })
}
