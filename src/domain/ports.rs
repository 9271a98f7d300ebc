use crate::domain::model::{EmailMessage, PaymentStatus};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait MailTransport: Send + Sync {
    fn deliver(&self, message: &EmailMessage)
        -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Picked at runtime (dev mode vs. live gateway), hence object safe.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn charge(&self, amount: f64, card_number: &str, currency: &str)
        -> Result<PaymentStatus>;
}
