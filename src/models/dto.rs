//pour les corps de requête et les réponses structurées
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::appointments::{AppointmentStatus, AppointmentType, ApprovalStatus};
use crate::models::patients::Sex;
use crate::services::email_templates::CancelledBy;

// ============================================================================
// AUTH DENTISTE
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub expires_in_hours: i64,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    #[validate(length(min = 4, message = "newPassword must be at least 4 characters"))]
    pub new_password: String,
}

// ============================================================================
// PORTAIL PATIENT
// ============================================================================

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct IssueTokenRequest {
    #[validate(email(message = "email is invalid"))]
    pub email: String,
    pub taj: String,
    pub patient_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConsumeTokenRequest {
    pub patient_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    pub patient_id: Uuid,
    pub email: String,
}

/// Connexion / inscription sur le portail. Le nom n'est utilisé qu'à la
/// création du patient.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PortalLoginRequest {
    #[validate(email(message = "email is invalid"))]
    pub email: String,
    pub taj: String,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VerifyQuery {
    pub token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortalSessionResponse {
    pub session_id: String,
    pub patient_id: Uuid,
    pub email: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortalBookingRequest {
    pub time_slot_id: Uuid,
    pub appointment_type: Option<AppointmentType>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

// ============================================================================
// CRÉNEAUX
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlotInput {
    pub start_time: DateTime<Utc>,
    pub location: Option<String>,
    pub room: Option<String>,
    pub dentist_name: Option<String>,
    pub dentist_email: Option<String>,
}

/// Champs absents = inchangés. Le status n'est jamais modifiable ici.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimeSlotUpdate {
    pub start_time: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub room: Option<String>,
    pub dentist_name: Option<String>,
    pub dentist_email: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRangeQuery {
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationReport {
    pub created: usize,
    pub skipped: usize,
}

// ============================================================================
// RENDEZ-VOUS
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub patient_id: Uuid,
    pub time_slot_id: Uuid,
    pub appointment_type: Option<AppointmentType>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModifyAppointmentRequest {
    pub time_slot_id: Uuid,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CancelQuery {
    pub cancelled_by: Option<CancelledBy>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatusUpdateRequest {
    pub appointment_status: Option<AppointmentStatus>,
    pub completion_notes: Option<String>,
    pub is_late: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalUpdateRequest {
    pub approval_status: ApprovalStatus,
}

// ============================================================================
// PATIENTS
// ============================================================================

#[derive(Debug, Default, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct PatientInput {
    #[validate(length(max = 255))]
    pub name: Option<String>,
    pub taj: Option<String>,
    #[validate(email(message = "email is invalid"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub sex: Option<Sex>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub referring_doctor: Option<String>,
    pub referral_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct EmailTajRequest {
    pub email: String,
    pub taj: String,
}

// ============================================================================
// SETTINGS + EMAILS
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SettingValue {
    pub value: String,
}

/// `{"value": null}` quand la clé n'existe pas
#[derive(Debug, Serialize)]
pub struct SettingResponse {
    pub value: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentEmailRequest {
    #[validate(email(message = "patientEmail is invalid"))]
    pub patient_email: String,
    pub patient_name: String,
    pub appointment_date: String,
    pub dentist_name: Option<String>,
    pub address: Option<String>,
    pub room: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CancellationEmailRequest {
    #[validate(email(message = "patientEmail is invalid"))]
    pub patient_email: String,
    pub patient_name: String,
    pub appointment_date: String,
    pub cancelled_by: CancelledBy,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ModificationEmailRequest {
    #[validate(email(message = "patientEmail is invalid"))]
    pub patient_email: String,
    pub patient_name: String,
    pub old_date: String,
    pub new_date: String,
    pub dentist_name: Option<String>,
    pub address: Option<String>,
    pub room: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MagicLinkEmailRequest {
    #[validate(email(message = "patientEmail is invalid"))]
    pub patient_email: String,
    pub token: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SendEmailRequest {
    #[validate(email(message = "to is invalid"))]
    pub to: String,
    #[validate(length(min = 1, message = "subject is required"))]
    pub subject: String,
    #[validate(length(min = 1, message = "html is required"))]
    pub html: String,
    pub text: Option<String>,
}
