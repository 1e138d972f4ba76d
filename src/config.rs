// Configuration lue une seule fois au démarrage (variables d'env + .env)

use std::env;
use thiserror::Error;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_APP_URL: &str = "http://localhost:3000";
const DEFAULT_SENDER: &str = "noreply@konigfogaszat.hu";
const INSECURE_JWT_SECRET: &str = "default-insecure-key-change-this";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set in .env file")]
    Missing(&'static str),

    #[error("{0} has an invalid value: {1}")]
    Invalid(&'static str, String),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: String,
    pub jwt_secret: String,
    pub jwt_ttl_hours: i64,
    pub clinic: ClinicConfig,
    pub email: EmailConfig,
}

/// Informations du cabinet reprises dans les créneaux et les emails
#[derive(Debug, Clone)]
pub struct ClinicConfig {
    pub name: String,
    pub dentist_name: String,
    pub dentist_email: String,
    pub address: String,
    pub app_url: String,
}

#[derive(Debug, Clone, Default)]
pub struct EmailConfig {
    pub sendgrid_api_key: Option<String>,
    pub from: String,
    pub reply_to: String,
}

impl Default for ClinicConfig {
    fn default() -> Self {
        Self {
            name: "König Fogászat".to_string(),
            dentist_name: "dr. König János".to_string(),
            dentist_email: "drkonigjanos@gmail.com".to_string(),
            address: "5600 Békéscsaba, Kolozsvári utca 3".to_string(),
            app_url: DEFAULT_APP_URL.to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            tracing::warn!("JWT_SECRET not found in .env, using default (INSECURE)");
            INSECURE_JWT_SECRET.to_string()
        });

        let jwt_ttl_hours = match env::var("JWT_TTL_HOURS") {
            Ok(raw) => raw
                .parse::<i64>()
                .ok()
                .filter(|hours| *hours > 0)
                .ok_or(ConfigError::Invalid("JWT_TTL_HOURS", raw))?,
            Err(_) => 12,
        };

        let defaults = ClinicConfig::default();
        let clinic = ClinicConfig {
            name: env_or("CLINIC_NAME", defaults.name),
            dentist_name: env_or("CLINIC_DENTIST_NAME", defaults.dentist_name),
            dentist_email: env_or("CLINIC_DENTIST_EMAIL", defaults.dentist_email),
            address: env_or("CLINIC_ADDRESS", defaults.address),
            app_url: env_or("APP_URL", defaults.app_url)
                .trim_end_matches('/')
                .to_string(),
        };

        // Les deux noms de variable existent dans les déploiements
        let sendgrid_api_key = env::var("SENDGRID_API_KEY")
            .or_else(|_| env::var("SendGridAPI_Key"))
            .ok()
            .filter(|key| !key.trim().is_empty());

        let from = env::var("SMTP_FROM")
            .or_else(|_| env::var("SMTP_REPLY_TO"))
            .unwrap_or_else(|_| DEFAULT_SENDER.to_string());
        let reply_to = env::var("SMTP_REPLY_TO").unwrap_or_else(|_| from.clone());

        Ok(Self {
            database_url,
            bind_addr: env_or("BIND_ADDR", DEFAULT_BIND_ADDR.to_string()),
            jwt_secret,
            jwt_ttl_hours,
            clinic,
            email: EmailConfig {
                sendgrid_api_key,
                from,
                reply_to,
            },
        })
    }
}

fn env_or(name: &str, default: String) -> String {
    env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or(default)
}
