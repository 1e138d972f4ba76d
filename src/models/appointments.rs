use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Statut du cycle de vie (NULL = rendez-vous à venir / sans statut)
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    #[sea_orm(string_value = "cancelled_by_doctor")]
    CancelledByDoctor,
    #[sea_orm(string_value = "cancelled_by_patient")]
    CancelledByPatient,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "no_show")]
    NoShow,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum AppointmentType {
    #[sea_orm(string_value = "elso_konzultacio")]
    ElsoKonzultacio,
    #[sea_orm(string_value = "munkafazis")]
    Munkafazis,
    #[sea_orm(string_value = "kontroll")]
    Kontroll,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum CreatedBy {
    #[sea_orm(string_value = "dentist")]
    Dentist,
    #[sea_orm(string_value = "patient")]
    Patient,
}

impl CreatedBy {
    /// Réservation faite par le dentiste = approuvée d'office,
    /// demande du patient = en attente de confirmation
    pub fn initial_approval(self) -> ApprovalStatus {
        match self {
            CreatedBy::Dentist => ApprovalStatus::Approved,
            CreatedBy::Patient => ApprovalStatus::Pending,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "appointments")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub patient_id: Uuid,

    // Au plus un rendez-vous par créneau, garanti aussi par la BD
    #[sea_orm(unique)]
    pub time_slot_id: Uuid,

    // Copies faites à la réservation (patient + créneau)
    pub start_time: DateTimeUtc,
    pub patient_name: Option<String>,
    pub patient_taj: Option<String>,
    pub dentist_email: Option<String>,
    pub dentist_name: Option<String>,
    pub location: Option<String>,
    pub room: Option<String>,

    pub appointment_status: Option<AppointmentStatus>,
    pub appointment_type: Option<AppointmentType>,
    pub approval_status: ApprovalStatus,
    pub completion_notes: Option<String>,
    pub is_late: bool,
    pub created_by: CreatedBy,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::patients::Entity",
        from = "Column::PatientId",
        to = "super::patients::Column::Id"
    )]
    Patient,

    #[sea_orm(
        belongs_to = "super::time_slots::Entity",
        from = "Column::TimeSlotId",
        to = "super::time_slots::Column::Id"
    )]
    TimeSlot,
}

impl Related<super::patients::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Patient.def()
    }
}

impl Related<super::time_slots::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TimeSlot.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
