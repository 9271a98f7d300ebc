use crate::domain::model::EmailMessage;
use crate::domain::ports::{MailTransport, Storage};
use crate::utils::error::Result;
use crate::utils::helpers::generate_id;

/// Spools each message as an `.eml` file for a relay to pick up.
#[derive(Debug, Clone)]
pub struct OutboxTransport<S: Storage> {
    storage: S,
}

impl<S: Storage> OutboxTransport<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }
}

impl<S: Storage> MailTransport for OutboxTransport<S> {
    async fn deliver(&self, message: &EmailMessage) -> Result<()> {
        let filename = format!(
            "{}-{}.eml",
            chrono::Utc::now().format("%Y%m%d%H%M%S"),
            generate_id("msg_")
        );

        tracing::debug!("Spooling email to {} as {}", message.to, filename);
        self.storage
            .write_file(&filename, message.to_mime().as_bytes())
            .await
    }
}
