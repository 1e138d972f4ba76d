// connexion BD + création des tables manquantes

use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, Schema};
use std::time::Duration;

use crate::models::{
    appointments, patient_portal_sessions, patient_portal_tokens, patients, settings, time_slots,
};

pub async fn establish_connection(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(database_url.to_owned());
    options
        .max_connections(10)
        .connect_timeout(Duration::from_secs(8))
        .sqlx_logging(false);

    Database::connect(options).await
}

/// Crée les tables à partir des entités SeaORM (IF NOT EXISTS).
/// L'ordre compte: les tables référencées par une FK passent en premier.
pub async fn ensure_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    let mut statements = vec![
        schema.create_table_from_entity(patients::Entity),
        schema.create_table_from_entity(time_slots::Entity),
        schema.create_table_from_entity(appointments::Entity),
        schema.create_table_from_entity(patient_portal_tokens::Entity),
        schema.create_table_from_entity(patient_portal_sessions::Entity),
        schema.create_table_from_entity(settings::Entity),
    ];

    for statement in statements.iter_mut() {
        statement.if_not_exists();
        db.execute(backend.build(&*statement)).await?;
    }

    Ok(())
}
