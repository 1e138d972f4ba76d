use async_trait::async_trait;
use serde_json::json;

use crate::config::EmailConfig;
use crate::errors::AppError;

const SENDGRID_URL: &str = "https://api.sendgrid.com/v3/mail/send";

#[derive(Debug, Clone, PartialEq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
    pub text: Option<String>,
}

impl EmailMessage {
    /// Version texte: fournie, sinon le HTML sans ses balises
    pub fn plain_text(&self) -> String {
        match &self.text {
            Some(text) => text.clone(),
            None => strip_tags(&self.html),
        }
    }
}

//trait = Interface (SendGrid en prod, faux notifiers dans les tests)
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), AppError>;
}

pub struct SendGridNotifier {
    client: reqwest::Client,
    api_key: Option<String>,
    from: String,
    reply_to: String,
}

impl SendGridNotifier {
    pub fn new(config: &EmailConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: config.sendgrid_api_key.clone(),
            from: config.from.clone(),
            reply_to: config.reply_to.clone(),
        }
    }
}

#[async_trait]
impl Notifier for SendGridNotifier {
    async fn send(&self, message: &EmailMessage) -> Result<(), AppError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            AppError::Notification("Email service not configured (set SENDGRID_API_KEY)".to_string())
        })?;

        let body = json!({
            "personalizations": [{ "to": [{ "email": message.to }] }],
            "from": { "email": self.from },
            "reply_to": { "email": self.reply_to },
            "subject": message.subject,
            "content": [
                { "type": "text/plain", "value": message.plain_text() },
                { "type": "text/html", "value": message.html }
            ]
        });

        let response = self
            .client
            .post(SENDGRID_URL)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Notification(format!("SendGrid request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(AppError::Notification(format!(
                "SendGrid answered {}: {}",
                status, detail
            )));
        }

        tracing::info!(to = %message.to, "email sent via SendGrid");
        Ok(())
    }
}

/// Retire les balises HTML (suffisant pour nos propres templates)
pub fn strip_tags(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut inside_tag = false;

    for c in html.chars() {
        match c {
            '<' => inside_tag = true,
            '>' => inside_tag = false,
            _ if !inside_tag => text.push(c),
            _ => {}
        }
    }

    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_tags() {
        assert_eq!(strip_tags("<p>Hello <strong>world</strong></p>"), "Hello world");
        assert_eq!(strip_tags("no tags"), "no tags");
    }

    #[test]
    fn test_plain_text_prefers_explicit_text() {
        let message = EmailMessage {
            to: "a@b.hu".to_string(),
            subject: "s".to_string(),
            html: "<b>html</b>".to_string(),
            text: Some("text".to_string()),
        };
        assert_eq!(message.plain_text(), "text");
        assert_eq!(EmailMessage { text: None, ..message }.plain_text(), "html");
    }

    #[tokio::test]
    async fn test_sendgrid_without_key_fails() {
        let notifier = SendGridNotifier::new(&EmailConfig::default());
        let message = EmailMessage {
            to: "a@b.hu".to_string(),
            subject: "s".to_string(),
            html: "<p>x</p>".to_string(),
            text: None,
        };

        let result = notifier.send(&message).await;
        assert!(matches!(result, Err(AppError::Notification(_))));
    }
}
