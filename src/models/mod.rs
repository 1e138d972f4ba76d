// ============================================================================
// MODELS - MODULE PRINCIPAL
// ============================================================================
//
// Description:
//   Point d'entrée pour tous les modèles de données.
//   Chaque modèle correspond à une table avec SeaORM (PostgreSQL en prod,
//   SQLite en mémoire pour les tests).
//
// Liste des modules:
//   - health : Health check API
//   - dto : Data Transfer Objects pour les réponses API
//   - patients : Patients du cabinet (clé pratique: email + TAJ)
//   - time_slots : Créneaux réservables (available / booked)
//   - appointments : Rendez-vous (un par créneau réservé)
//   - patient_portal_tokens : Tokens magic link (expire 24h, usage unique)
//   - patient_portal_sessions : Sessions du portail patient (expire 30 jours)
//   - settings : Paramètres clé/valeur (hash du mot de passe dentiste)
//
// Points d'attention:
//   - Tous les modèles utilisent SeaORM (pas de SQL brut)
//   - Les clés primaires sont des UUID v4
//   - Les JSON sont en camelCase (consommés par le front)
//
// ============================================================================

pub mod health;
pub mod dto;
pub mod patients;
pub mod time_slots;
pub mod appointments;
pub mod patient_portal_tokens;
pub mod patient_portal_sessions;
pub mod settings;
