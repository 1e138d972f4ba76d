use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use futures::future::LocalBoxFuture;
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::errors::AppError;
use crate::services::session_service::SessionService;

/// Header portant l'identifiant de session du portail patient
pub const PORTAL_SESSION_HEADER: &str = "X-Portal-Session";

/// Patient connecté au portail. La session est revérifiée en BD à chaque
/// requête (une session expirée est supprimée au passage).
#[derive(Debug, Clone)]
pub struct PortalPatient {
    pub session_id: String,
    pub patient_id: Uuid,
    pub email: String,
}

impl FromRequest for PortalPatient {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let session_id = req
            .headers()
            .get(PORTAL_SESSION_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let db = req.app_data::<web::Data<DatabaseConnection>>().cloned();

        Box::pin(async move {
            resolve(session_id, db).await.map_err(actix_web::Error::from)
        })
    }
}

async fn resolve(
    session_id: Option<String>,
    db: Option<web::Data<DatabaseConnection>>,
) -> Result<PortalPatient, AppError> {
    let session_id = session_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| AppError::Unauthorized("Missing patient portal session".to_string()))?;
    let db = db.ok_or_else(|| AppError::Unauthorized("Session store unavailable".to_string()))?;

    let session = match SessionService::verify(db.get_ref(), &session_id).await {
        Ok(session) => session,
        Err(AppError::NotFound(_)) => {
            return Err(AppError::Unauthorized("Invalid patient portal session".to_string()));
        }
        Err(e) => return Err(e),
    };

    Ok(PortalPatient {
        session_id: session.session_id,
        patient_id: session.patient_id,
        email: session.email,
    })
}
