//! SMTP delivery of one-time codes.

use anyhow::Context;
use async_trait::async_trait;
use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::str::FromStr;
use std::time::Duration;

use super::NotifyError;
use crate::config::EnvLookup;

const DEFAULT_MAIL_PORT: u16 = 587;
const SMTP_TIMEOUT: Duration = Duration::from_secs(10);
const CODE_SUBJECT: &str = "Your sign-in code";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailEncryption {
    StartTls,
    Tls,
    None,
}

impl FromStr for MailEncryption {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "starttls" => Ok(MailEncryption::StartTls),
            "tls" | "ssl" => Ok(MailEncryption::Tls),
            "none" => Ok(MailEncryption::None),
            other => Err(format!("expected starttls, tls or none, got {:?}", other)),
        }
    }
}

#[derive(Clone)]
pub struct MailConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
    pub encryption: MailEncryption,
}

impl std::fmt::Debug for MailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("from", &self.from)
            .field("encryption", &self.encryption)
            .finish()
    }
}

impl MailConfig {
    /// `MAIL_SERVER` switches notifications on; the remaining values are then required.
    pub(crate) fn load(env: &EnvLookup<'_>) -> anyhow::Result<Option<Self>> {
        let Some(host) = env.optional("MAIL_SERVER") else {
            return Ok(None);
        };

        let from = env.required("MAIL_FROM")?;
        from.parse::<Mailbox>()
            .with_context(|| format!("MAIL_FROM {:?} is not a valid address", from))?;

        Ok(Some(Self {
            host,
            port: env.parsed_or("MAIL_PORT", DEFAULT_MAIL_PORT)?,
            username: env.required("MAIL_USERNAME")?,
            password: env.required("MAIL_PASSWORD")?,
            from,
            encryption: env.parsed_or("MAIL_ENCRYPTION", MailEncryption::StartTls)?,
        }))
    }
}

/// Delivers a one-time code to a recipient.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_code(&self, recipient: &str, code: &str) -> Result<(), NotifyError>;
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &MailConfig) -> Result<Self, NotifyError> {
        let builder = match config.encryption {
            MailEncryption::StartTls => {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
            }
            MailEncryption::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)?,
            MailEncryption::None => {
                AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
            }
        };

        let transport = builder
            .port(config.port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .timeout(Some(SMTP_TIMEOUT))
            .build();

        Ok(Self {
            transport,
            from: config.from.parse::<Mailbox>()?,
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_code(&self, recipient: &str, code: &str) -> Result<(), NotifyError> {
        let message = build_code_message(&self.from, recipient, code)?;
        self.transport.send(message).await?;
        Ok(())
    }
}

pub(crate) fn build_code_message(
    from: &Mailbox,
    recipient: &str,
    code: &str,
) -> Result<Message, NotifyError> {
    let body = format!(
        "Your one-time sign-in code is {}.\n\nIt is valid for a short time only. \
         If you did not just sign in, you can ignore this message.\n",
        code
    );

    Ok(Message::builder()
        .from(from.clone())
        .to(recipient.parse::<Mailbox>()?)
        .subject(CODE_SUBJECT)
        .header(ContentType::TEXT_PLAIN)
        .body(body)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encryption_parsing() {
        assert_eq!("STARTTLS".parse::<MailEncryption>(), Ok(MailEncryption::StartTls));
        assert_eq!("ssl".parse::<MailEncryption>(), Ok(MailEncryption::Tls));
        assert_eq!("none".parse::<MailEncryption>(), Ok(MailEncryption::None));
        assert!("plaintext".parse::<MailEncryption>().is_err());
    }

    #[test]
    fn test_code_message_contents() {
        let from: Mailbox = "Sign-in <noreply@example.com>".parse().unwrap();
        let message = build_code_message(&from, "a@example.com", "123456").unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();

        assert!(raw.contains("To: a@example.com"));
        assert!(raw.contains("Subject: Your sign-in code"));
        assert!(raw.contains("123456"));
    }

    #[test]
    fn test_invalid_recipient_rejected() {
        let from: Mailbox = "noreply@example.com".parse().unwrap();
        assert!(matches!(
            build_code_message(&from, "not an address", "123456"),
            Err(NotifyError::Address(_))
        ));
    }

    #[tokio::test]
    async fn test_smtp_mailer_builds_for_each_mode() {
        for encryption in [
            MailEncryption::StartTls,
            MailEncryption::Tls,
            MailEncryption::None,
        ] {
            let config = MailConfig {
                host: "smtp.example.com".to_string(),
                port: 2525,
                username: "user".to_string(),
                password: "pass".to_string(),
                from: "noreply@example.com".to_string(),
                encryption,
            };
            assert!(SmtpMailer::new(&config).is_ok());
        }
    }
}
