use crate::config::AppConfig;
use crate::domain::model::PaymentStatus;
use crate::domain::ports::PaymentGateway;
use crate::utils::error::{AppError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Serialize)]
struct ChargeRequest<'a> {
    amount: f64,
    currency: &'a str,
    card_number: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChargeResponse {
    status: PaymentStatus,
}

/// JSON-over-HTTP payment gateway client (`POST {base_url}/charges`).
pub struct HttpGateway {
    client: Client,
    base_url: String,
    api_key: String,
}

impl HttpGateway {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Self::new(&config.payment_gateway_url, &config.payment_api_key)
    }
}

#[async_trait]
impl PaymentGateway for HttpGateway {
    async fn charge(&self, amount: f64, card_number: &str, currency: &str) -> Result<PaymentStatus> {
        let url = format!("{}/charges", self.base_url);
        tracing::debug!("Calling gateway {} for {:.2} {}", url, amount, currency);

        let mut request = self.client.post(&url).json(&ChargeRequest {
            amount,
            currency,
            card_number,
        });
        if !self.api_key.is_empty() {
            request = request.bearer_auth(&self.api_key);
        }

        let response = request.send().await?;
        let status = response.status();
        tracing::debug!("Gateway response status: {}", status);

        if !status.is_success() {
            return Err(AppError::PaymentError {
                message: format!("gateway returned HTTP {}", status.as_u16()),
            });
        }

        let body: ChargeResponse = response.json().await?;
        Ok(body.status)
    }
}
