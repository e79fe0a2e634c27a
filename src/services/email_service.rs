use askama::Template;
use async_trait::async_trait;
use reqwest::Url;
use thiserror::Error;
use tracing::info;

use crate::error::AppError;

#[derive(Debug, Error)]
pub enum EmailError {
    #[error("email delivery failed: {0}")]
    Delivery(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, message: EmailMessage) -> Result<(), EmailError>;
}

/// Writes outgoing mail to the log instead of delivering it.
#[derive(Debug, Default)]
pub struct LogEmailSender;

#[async_trait]
impl EmailSender for LogEmailSender {
    async fn send(&self, message: EmailMessage) -> Result<(), EmailError> {
        info!(to = %message.to, subject = %message.subject, "email queued");
        info!(body = %message.html, "email body");
        Ok(())
    }
}

#[derive(Template)]
#[template(path = "email/confirm_email.html")]
struct ConfirmEmailTemplate<'a> {
    display_name: &'a str,
    link: &'a str,
}

#[derive(Template)]
#[template(path = "email/reset_password.html")]
struct ResetPasswordTemplate<'a> {
    display_name: &'a str,
    link: &'a str,
    valid_hours: i64,
}

fn client_link(client_app_url: &str, path: &str, params: &[(&str, &str)]) -> Result<String, AppError> {
    let base = format!("{}/{}", client_app_url.trim_end_matches('/'), path);
    Url::parse_with_params(&base, params)
        .map(String::from)
        .map_err(|e| AppError::Internal(format!("bad client app url {base}: {e}")))
}

fn render(template: &impl Template) -> Result<String, AppError> {
    template
        .render()
        .map_err(|e| AppError::Internal(format!("email template failed: {e}")))
}

pub fn confirmation_email(
    client_app_url: &str,
    to: &str,
    display_name: &str,
    user_id: &str,
    code: &str,
) -> Result<EmailMessage, AppError> {
    let link = client_link(
        client_app_url,
        "confirm-email",
        &[("userId", user_id), ("code", code)],
    )?;
    Ok(EmailMessage {
        to: to.to_string(),
        subject: "Confirm your email address".to_string(),
        html: render(&ConfirmEmailTemplate {
            display_name,
            link: &link,
        })?,
    })
}

pub fn reset_password_email(
    client_app_url: &str,
    to: &str,
    display_name: &str,
    code: &str,
    valid_hours: i64,
) -> Result<EmailMessage, AppError> {
    let link = client_link(
        client_app_url,
        "resetPassword",
        &[("email", to), ("code", code)],
    )?;
    Ok(EmailMessage {
        to: to.to_string(),
        subject: "Reset your password".to_string(),
        html: render(&ResetPasswordTemplate {
            display_name,
            link: &link,
            valid_hours,
        })?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirmation_link_points_at_client_app() {
        let message =
            confirmation_email("https://localhost:3000/", "bob@test.com", "Bob", "u-1", "abc123")
                .unwrap();

        assert_eq!(message.to, "bob@test.com");
        assert!(message
            .html
            .contains("https://localhost:3000/confirm-email?userId=u-1&code=abc123"));
    }

    #[test]
    fn reset_link_encodes_the_email() {
        let message =
            reset_password_email("https://app.test", "a+b@test.com", "<Al>", "xyz", 24).unwrap();

        assert!(message.html.contains("resetPassword?email=a%2Bb%40test.com&code=xyz"));
        assert!(message.html.contains("&lt;Al&gt;"));
        assert!(message.html.contains("24 hours"));
    }
}
