// Logique métier: services sans état, la connexion BD est passée en paramètre
// (SchedulingService garde en plus le Notifier et la config du cabinet)

pub mod credential_service;
pub mod email_templates;
pub mod notifier;
pub mod patient_service;
pub mod scheduling_service;
pub mod session_service;
pub mod settings_service;
pub mod slot_generation;
pub mod token_service;
