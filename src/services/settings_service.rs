use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::*;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::settings;

pub struct SettingsService;

impl SettingsService {
    /// Lit une valeur (None si la clé n'existe pas)
    pub async fn get<C: ConnectionTrait>(db: &C, key: &str) -> Result<Option<String>, AppError> {
        let setting = settings::Entity::find()
            .filter(settings::Column::Key.eq(key))
            .one(db)
            .await?;

        Ok(setting.map(|s| s.value))
    }

    /// Écrit une valeur (INSERT ... ON CONFLICT (key) DO UPDATE)
    pub async fn set<C: ConnectionTrait>(db: &C, key: &str, value: &str) -> Result<(), AppError> {
        let setting = settings::ActiveModel {
            id: Set(Uuid::new_v4()),
            key: Set(key.to_string()),
            value: Set(value.to_string()),
            updated_at: Set(Utc::now()),
        };

        settings::Entity::insert(setting)
            .on_conflict(
                OnConflict::column(settings::Column::Key)
                    .update_columns([settings::Column::Value, settings::Column::UpdatedAt])
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::setup_db;

    #[tokio::test]
    async fn test_get_missing_key() {
        let db = setup_db().await;
        assert_eq!(SettingsService::get(&db, "missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_overwrites() {
        let db = setup_db().await;

        SettingsService::set(&db, "theme", "light").await.unwrap();
        SettingsService::set(&db, "theme", "dark").await.unwrap();

        assert_eq!(SettingsService::get(&db, "theme").await.unwrap().as_deref(), Some("dark"));
        let rows = settings::Entity::find().count(&db).await.unwrap();
        assert_eq!(rows, 1);
    }
}
