use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::{self, SmtpConfig};
use crate::error::ApiError;

/// Outbound email over the configured SMTP relay.
///
/// Delivery is best-effort from the caller's perspective: handlers log
/// failures and keep going, so a flaky relay never fails a request.
pub struct EmailService {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    frontend_url: String,
}

impl EmailService {
    pub fn from_config() -> Result<Self, ApiError> {
        let cfg = config::config();
        Self::new(&cfg.smtp, cfg.server.frontend_url.clone())
    }

    fn new(smtp: &SmtpConfig, frontend_url: String) -> Result<Self, ApiError> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(&smtp.host)
            .map_err(|e| {
                tracing::error!("SMTP relay configuration error: {}", e);
                ApiError::internal("Email service misconfigured")
            })?
            .port(smtp.port);

        if !smtp.username.is_empty() {
            builder = builder.credentials(Credentials::new(
                smtp.username.clone(),
                smtp.password.clone(),
            ));
        }

        let from = smtp.from_address.parse::<Mailbox>().map_err(|e| {
            tracing::error!("Invalid SMTP from address '{}': {}", smtp.from_address, e);
            ApiError::internal("Email service misconfigured")
        })?;

        Ok(Self {
            transport: builder.build(),
            from,
            frontend_url,
        })
    }

    pub async fn send_welcome(&self, to: &str, first_name: &str) -> Result<(), ApiError> {
        let body = format!(
            "Hi {},\n\n\
             Welcome to Coverly. Your account is ready - sign in at {} to view \
             your policies, file claims and track payments.\n\n\
             The Coverly team",
            first_name, self.frontend_url
        );
        self.send(to, "Welcome to Coverly", body).await
    }

    pub async fn send_claim_status(
        &self,
        to: &str,
        claim_number: &str,
        status: &str,
    ) -> Result<(), ApiError> {
        let body = format!(
            "Your claim {} is now {}.\n\n\
             View the details at {}/claims.\n\n\
             The Coverly team",
            claim_number, status, self.frontend_url
        );
        self.send(to, &format!("Claim {} update", claim_number), body)
            .await
    }

    async fn send(&self, to: &str, subject: &str, body: String) -> Result<(), ApiError> {
        let to_mailbox = to.parse::<Mailbox>().map_err(|_| {
            ApiError::bad_request(format!("Invalid recipient address: {}", to))
        })?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to_mailbox)
            .subject(subject)
            .body(body)
            .map_err(|e| {
                tracing::error!("Failed to build email: {}", e);
                ApiError::internal("Failed to build email")
            })?;

        self.transport.send(message).await.map_err(|e| {
            tracing::error!("SMTP delivery failed: {}", e);
            ApiError::bad_gateway("Email provider unavailable")
        })?;

        tracing::debug!("Email '{}' sent to {}", subject, to);
        Ok(())
    }
}
