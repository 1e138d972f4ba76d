use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use futures::future::{ready, Ready};

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::utils::jwt;

/// Dentiste authentifié (JWT valide dans le header Authorization)
/// Utilisé comme extracteur dans les routes protégées
#[derive(Debug, Clone)]
pub struct DentistAuth {
    pub expires_at: i64,
}

impl FromRequest for DentistAuth {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

fn authenticate(req: &HttpRequest) -> Result<DentistAuth, AppError> {
    // 1. Extraire le header Authorization
    let auth_header = req
        .headers()
        .get("Authorization")
        .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".to_string()))?;

    // 2. Convertir le header en string
    let auth_str = auth_header
        .to_str()
        .map_err(|_| AppError::Unauthorized("Invalid Authorization header".to_string()))?;

    // 3. Extraire le token (format: "Bearer <token>")
    let token = auth_str.strip_prefix("Bearer ").ok_or_else(|| {
        AppError::Unauthorized("Invalid Authorization format (expected: Bearer <token>)".to_string())
    })?;

    // 4. Vérifier le token JWT avec le secret de la config
    let config = req
        .app_data::<web::Data<AppConfig>>()
        .ok_or_else(|| AppError::Unauthorized("Authentication is not configured".to_string()))?;

    let claims = jwt::verify_token(&config.jwt_secret, token).map_err(AppError::Unauthorized)?;

    Ok(DentistAuth { expires_at: claims.exp })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{test_config, TEST_JWT_SECRET};
    use actix_web::test::TestRequest;

    #[test]
    fn test_valid_bearer_token() {
        let token = jwt::generate_token(TEST_JWT_SECRET, 1).unwrap();
        let req = TestRequest::default()
            .app_data(web::Data::new(test_config()))
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_http_request();

        assert!(authenticate(&req).is_ok());
    }

    #[test]
    fn test_missing_or_malformed_header() {
        let req = TestRequest::default()
            .app_data(web::Data::new(test_config()))
            .to_http_request();
        assert!(matches!(authenticate(&req), Err(AppError::Unauthorized(_))));

        let req = TestRequest::default()
            .app_data(web::Data::new(test_config()))
            .insert_header(("Authorization", "Token abc"))
            .to_http_request();
        assert!(matches!(authenticate(&req), Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn test_token_signed_with_other_secret() {
        let token = jwt::generate_token("another-secret", 1).unwrap();
        let req = TestRequest::default()
            .app_data(web::Data::new(test_config()))
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_http_request();

        assert!(matches!(authenticate(&req), Err(AppError::Unauthorized(_))));
    }
}
