// ============================================================================
// MODÈLE : TIME SLOTS
// ============================================================================
//
// Description:
//   Créneau réservable du cabinet (un instant de début, un lieu, un dentiste).
//
// Colonnes de la table time_slots:
//   - id (UUID, PRIMARY KEY)
//   - start_time (TIMESTAMPTZ, NOT NULL)
//   - status (VARCHAR, 'available' | 'booked', DEFAULT 'available')
//   - location (VARCHAR, NULL) - adresse du cabinet
//   - room (VARCHAR, NULL) - numéro de salle
//   - dentist_name / dentist_email (VARCHAR, NULL)
//   - user_email (VARCHAR, NULL) - créateur du créneau
//   - created_at / updated_at (TIMESTAMPTZ)
//
// Points d'attention:
//   - status = 'booked' <=> exactement un rendez-vous référence ce créneau
//   - Le status n'est modifié QUE par SchedulingService (updates conditionnels)
//   - Un créneau 'booked' ne peut pas être supprimé
//
// ============================================================================

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum SlotStatus {
    #[default]
    #[sea_orm(string_value = "available")]
    Available,
    #[sea_orm(string_value = "booked")]
    Booked,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "time_slots")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub start_time: DateTimeUtc,

    pub status: SlotStatus,

    pub location: Option<String>,

    pub room: Option<String>,

    pub dentist_name: Option<String>,

    pub dentist_email: Option<String>,

    pub user_email: Option<String>,

    pub created_at: DateTimeUtc,

    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::appointments::Entity")]
    Appointment,
}

impl Related<super::appointments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Appointment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
