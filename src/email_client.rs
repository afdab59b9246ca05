use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use secrecy::ExposeSecret;

use crate::{config::EmailConfig, web::types::ValidEmail};

/// An outbound mail transport that delivers one HTML message to one recipient.
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send_email(
        &self,
        recipient: &ValidEmail,
        subject: &str,
        html_content: &str,
    ) -> Result<()>;
}

/// Sends mail through an SMTP relay using STARTTLS and the sender's credentials.
pub struct EmailClient {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    sender: Mailbox,
}

impl EmailClient {
    /// Builds a pooled STARTTLS transport for the configured relay.
    /// The pool spawns a background task, so this has to be called inside a Tokio runtime.
    pub fn new(config: &EmailConfig) -> Result<Self> {
        let sender_addr = config.valid_sender().map_err(|e| Error::Address(e.to_string()))?;
        let sender = Mailbox::new(
            Some(config.sender_name.clone()),
            sender_addr.as_ref().parse()?,
        );

        let credentials = Credentials::new(
            config.sender_addr.clone(),
            config.sender_password.expose_secret().to_owned(),
        );
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(EmailClient { transport, sender })
    }

    pub fn sender(&self) -> &Mailbox {
        &self.sender
    }

    fn build_message(
        &self,
        recipient: &ValidEmail,
        subject: &str,
        html_content: &str,
    ) -> Result<Message> {
        let message = Message::builder()
            .from(self.sender.clone())
            .to(Mailbox::new(None, recipient.as_ref().parse()?))
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html_content.to_owned())?;

        Ok(message)
    }
}

#[async_trait]
impl EmailSender for EmailClient {
    async fn send_email(
        &self,
        recipient: &ValidEmail,
        subject: &str,
        html_content: &str,
    ) -> Result<()> {
        let message = self.build_message(recipient, subject, html_content)?;
        let _resp = self.transport.send(message).await?;

        Ok(())
    }
}

impl std::fmt::Debug for EmailClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailClient")
            .field("sender", &self.sender.to_string())
            .finish_non_exhaustive()
    }
}

// ###################################
// ->   ERROR & RESULT
// ###################################
pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid address: {0}")]
    Address(String),
    #[error("failed to build the message: {0}")]
    Message(#[from] lettre::error::Error),
    #[error("smtp error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

impl From<lettre::address::AddressError> for Error {
    fn from(value: lettre::address::AddressError) -> Self {
        Self::Address(value.to_string())
    }
}
