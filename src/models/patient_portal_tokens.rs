// ============================================================================
// MODÈLE : PATIENT PORTAL TOKENS
// ============================================================================
//
// Description:
//   Tokens "magic link" du portail patient (connexion sans mot de passe).
//
// Colonnes de la table patient_portal_tokens:
//   - id (UUID, PRIMARY KEY)
//   - token (VARCHAR, UNIQUE, NOT NULL) - 32 octets aléatoires en hexa
//   - patient_id (UUID, NULL, FK vers patients) - NULL si nouveau patient
//   - email / taj (VARCHAR, NOT NULL) - identifiants saisis par le patient
//   - expires_at (TIMESTAMPTZ, NOT NULL) - created_at + 24 heures
//   - used (BOOLEAN, DEFAULT FALSE, NOT NULL)
//   - created_at (TIMESTAMPTZ)
//
// Workflow:
//   1. Patient saisit email + TAJ sur POST /api/patient-portal/login
//   2. Backend génère le token et l'insère dans cette table
//   3. Backend envoie l'email avec le lien (via le Notifier)
//   4. Patient clique -> GET /api/patient-portal/verify?token=xxx
//   5. Backend consomme le token (UPDATE ... WHERE used = false)
//   6. Backend crée une session patient (30 jours)
//
// Points d'attention:
//   - Un token ne peut être utilisé qu'une fois (update conditionnel)
//   - Les tokens ne sont jamais supprimés (trace d'audit)
//   - ON DELETE SET NULL: si patient supprimé, le token reste
//
// ============================================================================

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "patient_portal_tokens")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[sea_orm(unique)]
    pub token: String,

    pub patient_id: Option<Uuid>,

    pub email: String,

    pub taj: String,

    pub expires_at: DateTimeUtc,

    pub used: bool,

    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::patients::Entity",
        from = "Column::PatientId",
        to = "super::patients::Column::Id",
        on_delete = "SetNull"
    )]
    Patient,
}

impl Related<super::patients::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Patient.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
