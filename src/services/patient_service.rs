use chrono::Utc;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::*;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::appointments::{Column as AppointmentColumn, Entity as Appointments};
use crate::models::dto::PatientInput;
use crate::models::patients::{self, Column as PatientColumn, Entity as Patients};

pub struct PatientService;

impl PatientService {
    /// Les derniers créés d'abord
    pub async fn list<C: ConnectionTrait>(db: &C) -> Result<Vec<patients::Model>, AppError> {
        Ok(Patients::find()
            .order_by_desc(PatientColumn::CreatedAt)
            .all(db)
            .await?)
    }

    pub async fn find<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<Option<patients::Model>, AppError> {
        Ok(Patients::find_by_id(id).one(db).await?)
    }

    pub async fn create<C: ConnectionTrait>(db: &C, input: PatientInput) -> Result<patients::Model, AppError> {
        let taj = input.taj.as_deref().map(normalize_taj).transpose()?;
        let now = Utc::now();

        let patient = patients::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(blank_to_none(input.name)),
            taj: Set(taj),
            email: Set(blank_to_none(input.email)),
            phone: Set(blank_to_none(input.phone)),
            birth_date: Set(input.birth_date),
            sex: Set(input.sex),
            address: Set(blank_to_none(input.address)),
            city: Set(blank_to_none(input.city)),
            postal_code: Set(blank_to_none(input.postal_code)),
            referring_doctor: Set(blank_to_none(input.referring_doctor)),
            referral_reason: Set(blank_to_none(input.referral_reason)),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let patient = patient.insert(db).await?;
        tracing::info!(patient_id = %patient.id, "patient created");

        Ok(patient)
    }

    /// Remplace toutes les données du patient (PUT)
    pub async fn update<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
        input: PatientInput,
    ) -> Result<patients::Model, AppError> {
        let taj = input.taj.as_deref().map(normalize_taj).transpose()?;

        let patient = Self::find(db, id).await?.ok_or(AppError::NotFound("Patient"))?;

        let mut active: patients::ActiveModel = patient.into();
        active.name = Set(blank_to_none(input.name));
        active.taj = Set(taj);
        active.email = Set(blank_to_none(input.email));
        active.phone = Set(blank_to_none(input.phone));
        active.birth_date = Set(input.birth_date);
        active.sex = Set(input.sex);
        active.address = Set(blank_to_none(input.address));
        active.city = Set(blank_to_none(input.city));
        active.postal_code = Set(blank_to_none(input.postal_code));
        active.referring_doctor = Set(blank_to_none(input.referring_doctor));
        active.referral_reason = Set(blank_to_none(input.referral_reason));
        active.updated_at = Set(Utc::now());

        let patient = active.update(db).await?;
        tracing::info!(patient_id = %patient.id, "patient updated");

        Ok(patient)
    }

    /// Refusé tant que le patient a des rendez-vous (à annuler d'abord)
    pub async fn delete<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<(), AppError> {
        Self::find(db, id).await?.ok_or(AppError::NotFound("Patient"))?;

        let appointment_count = Appointments::find()
            .filter(AppointmentColumn::PatientId.eq(id))
            .count(db)
            .await?;

        if appointment_count > 0 {
            return Err(AppError::Validation(format!(
                "Patient still has {} appointment(s), cancel them first",
                appointment_count
            )));
        }

        Patients::delete_by_id(id).exec(db).await?;
        tracing::info!(patient_id = %id, "patient deleted");

        Ok(())
    }

    /// Recherche insensible à la casse sur le nom et l'email,
    /// recherche partielle sur le TAJ et le téléphone
    pub async fn search<C: ConnectionTrait>(db: &C, query: &str) -> Result<Vec<patients::Model>, AppError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::Validation("q query parameter is required".to_string()));
        }

        let lowered = format!("%{}%", query.to_lowercase());
        let raw = format!("%{}%", query);

        Ok(Patients::find()
            .filter(
                Condition::any()
                    .add(Expr::expr(Func::lower(Expr::col(PatientColumn::Name))).like(lowered.as_str()))
                    .add(Expr::expr(Func::lower(Expr::col(PatientColumn::Email))).like(lowered.as_str()))
                    .add(PatientColumn::Taj.like(raw.as_str()))
                    .add(PatientColumn::Phone.like(raw.as_str())),
            )
            .order_by_desc(PatientColumn::CreatedAt)
            .all(db)
            .await?)
    }

    pub async fn find_by_email<C: ConnectionTrait>(db: &C, email: &str) -> Result<Option<patients::Model>, AppError> {
        Ok(Patients::find()
            .filter(PatientColumn::Email.eq(email.trim()))
            .order_by_desc(PatientColumn::CreatedAt)
            .one(db)
            .await?)
    }

    pub async fn find_by_email_and_taj<C: ConnectionTrait>(
        db: &C,
        email: &str,
        taj: &str,
    ) -> Result<Option<patients::Model>, AppError> {
        let taj = normalize_taj(taj)?;

        Ok(Patients::find()
            .filter(PatientColumn::Email.eq(email.trim()))
            .filter(PatientColumn::Taj.eq(taj))
            .one(db)
            .await?)
    }

    /// Patient existant pour (email, TAJ), sinon créé (inscription via le portail)
    pub async fn find_or_create<C: ConnectionTrait>(
        db: &C,
        email: &str,
        taj: &str,
        name: Option<String>,
    ) -> Result<patients::Model, AppError> {
        if let Some(patient) = Self::find_by_email_and_taj(db, email, taj).await? {
            return Ok(patient);
        }

        let input = PatientInput {
            name,
            taj: Some(taj.to_string()),
            email: Some(email.trim().to_string()),
            ..PatientInput::default()
        };

        Self::create(db, input).await
    }
}

/// TAJ: 9 chiffres. Les tirets et espaces saisis sont retirés.
pub fn normalize_taj(raw: &str) -> Result<String, AppError> {
    let taj: String = raw
        .chars()
        .filter(|c| *c != '-' && !c.is_whitespace())
        .collect();

    if taj.len() != 9 || !taj.chars().all(|c| c.is_ascii_digit()) {
        return Err(AppError::Validation("TAJ must contain exactly 9 digits".to_string()));
    }

    Ok(taj)
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
