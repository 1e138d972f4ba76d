// Outils partagés par les tests: BD SQLite en mémoire, fixtures, faux notifiers

use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};
use uuid::Uuid;

use crate::config::{AppConfig, ClinicConfig, EmailConfig};
use crate::db::ensure_schema;
use crate::errors::AppError;
use crate::models::{patients, time_slots};
use crate::services::notifier::{EmailMessage, Notifier};

pub const TEST_JWT_SECRET: &str = "test-secret";

/// Une seule connexion: chaque connexion SQLite en mémoire est une BD distincte
pub async fn setup_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    let db = Database::connect(options).await.expect("sqlite in memory");
    ensure_schema(&db).await.expect("schema");
    db
}

/// BD SQLite sur fichier avec deux connexions, pour les requêtes réellement concurrentes.
/// Le fichier est supprimé au drop.
pub struct FileDb {
    pub db: DatabaseConnection,
    path: PathBuf,
}

impl Drop for FileDb {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm", "-journal"] {
            let _ = std::fs::remove_file(format!("{}{}", self.path.display(), suffix));
        }
    }
}

pub async fn setup_file_db() -> FileDb {
    let path = std::env::temp_dir().join(format!("clinic-test-{}.db", Uuid::new_v4()));
    let mut options = ConnectOptions::new(format!("sqlite://{}?mode=rwc", path.display()));
    options
        .max_connections(2)
        .min_connections(2)
        .sqlx_logging(false);

    let db = Database::connect(options).await.expect("sqlite file");
    ensure_schema(&db).await.expect("schema");
    FileDb { db, path }
}

pub async fn insert_patient(db: &DatabaseConnection, email: Option<&str>, taj: &str) -> patients::Model {
    let now = Utc::now();

    patients::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(Some("Teszt Páciens".to_string())),
        taj: Set(Some(taj.to_string())),
        email: Set(email.map(str::to_string)),
        phone: Set(None),
        birth_date: Set(None),
        sex: Set(None),
        address: Set(None),
        city: Set(None),
        postal_code: Set(None),
        referring_doctor: Set(None),
        referral_reason: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .expect("insert patient")
}

pub async fn insert_slot(db: &DatabaseConnection, start_time: DateTime<Utc>) -> time_slots::Model {
    let now = Utc::now();

    time_slots::ActiveModel {
        id: Set(Uuid::new_v4()),
        start_time: Set(start_time),
        status: Set(time_slots::SlotStatus::Available),
        location: Set(Some("5600 Békéscsaba, Kolozsvári utca 3".to_string())),
        room: Set(Some("1".to_string())),
        dentist_name: Set(Some("dr. König János".to_string())),
        dentist_email: Set(Some("drkonigjanos@gmail.com".to_string())),
        user_email: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .expect("insert slot")
}

pub fn clinic() -> ClinicConfig {
    ClinicConfig::default()
}

pub fn test_config() -> AppConfig {
    AppConfig {
        database_url: "sqlite::memory:".to_string(),
        bind_addr: "127.0.0.1:0".to_string(),
        jwt_secret: TEST_JWT_SECRET.to_string(),
        jwt_ttl_hours: 12,
        clinic: clinic(),
        email: EmailConfig::default(),
    }
}

/// Garde les emails "envoyés" pour les assertions
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<EmailMessage>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<EmailMessage> {
        self.sent.lock().expect("notifier lock").clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, message: &EmailMessage) -> Result<(), AppError> {
        self.sent.lock().expect("notifier lock").push(message.clone());
        Ok(())
    }
}

pub struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn send(&self, _message: &EmailMessage) -> Result<(), AppError> {
        Err(AppError::Notification("smtp down".to_string()))
    }
}
