use actix_web::{get, put, web, HttpResponse};
use sea_orm::DatabaseConnection;

use crate::errors::AppError;
use crate::middleware::DentistAuth;
use crate::models::dto::{SettingResponse, SettingValue};
use crate::services::credential_service::DENTIST_PASSWORD_KEY;
use crate::services::settings_service::SettingsService;

// Le hash du mot de passe ne passe jamais par ces routes (voir /auth/change-password)
fn check_key(key: &str) -> Result<(), AppError> {
    if key == DENTIST_PASSWORD_KEY {
        return Err(AppError::Validation(format!("{} cannot be accessed here", key)));
    }
    Ok(())
}

#[get("/{key}")]
pub async fn get_setting(
    _auth: DentistAuth,
    path: web::Path<String>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let key = path.into_inner();
    check_key(&key)?;

    let value = SettingsService::get(db.get_ref(), &key).await?;
    Ok(HttpResponse::Ok().json(SettingResponse { value }))
}

#[put("/{key}")]
pub async fn put_setting(
    _auth: DentistAuth,
    path: web::Path<String>,
    body: web::Json<SettingValue>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let key = path.into_inner();
    check_key(&key)?;

    let body = body.into_inner();
    SettingsService::set(db.get_ref(), &key, &body.value).await?;
    tracing::info!(key = %key, "setting updated");

    Ok(HttpResponse::Ok().json(SettingResponse { value: Some(body.value) }))
}

pub fn settings_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/settings")
            .service(get_setting)
            .service(put_setting)
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::json_config;
    use crate::test_support::{setup_db, test_config, TEST_JWT_SECRET};
    use crate::utils::jwt;
    use actix_web::{http::StatusCode, test, App};
    use serde_json::json;

    #[actix_web::test]
    async fn test_settings_roundtrip_and_protected_key() {
        let db = setup_db().await;
        let bearer = format!("Bearer {}", jwt::generate_token(TEST_JWT_SECRET, 1).unwrap());

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(db))
                .app_data(web::Data::new(test_config()))
                .app_data(json_config())
                .configure(settings_routes),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/settings/reminder_hours")
            .insert_header(("Authorization", bearer.as_str()))
            .to_request();
        let empty: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert!(empty["value"].is_null());

        let req = test::TestRequest::put()
            .uri("/settings/reminder_hours")
            .insert_header(("Authorization", bearer.as_str()))
            .set_json(json!({ "value": "24" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::get()
            .uri("/settings/reminder_hours")
            .insert_header(("Authorization", bearer.as_str()))
            .to_request();
        let stored: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(stored["value"], "24");

        let req = test::TestRequest::get()
            .uri(&format!("/settings/{}", DENTIST_PASSWORD_KEY))
            .insert_header(("Authorization", bearer.as_str()))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }
}
