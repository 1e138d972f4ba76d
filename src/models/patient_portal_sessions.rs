// ============================================================================
// MODÈLE : PATIENT PORTAL SESSIONS
// ============================================================================
//
// Colonnes de la table patient_portal_sessions:
//   - id (UUID, PRIMARY KEY)
//   - session_id (VARCHAR, UNIQUE, NOT NULL) - 32 octets aléatoires en hexa
//   - patient_id (UUID, NOT NULL, FK vers patients)
//   - email (VARCHAR, NOT NULL)
//   - created_at (TIMESTAMPTZ)
//   - expires_at (TIMESTAMPTZ, NOT NULL) - created_at + 30 jours
//
// Points d'attention:
//   - Expiration vérifiée à la lecture (pas de tâche de fond)
//   - Session expirée = supprimée au moment où on la détecte
//   - ON DELETE CASCADE: si patient supprimé, sessions supprimées aussi
//
// ============================================================================

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "patient_portal_sessions")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[sea_orm(unique)]
    pub session_id: String,

    pub patient_id: Uuid,

    pub email: String,

    pub created_at: DateTimeUtc,

    pub expires_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::patients::Entity",
        from = "Column::PatientId",
        to = "super::patients::Column::Id",
        on_delete = "Cascade"
    )]
    Patient,
}

impl Related<super::patients::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Patient.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
