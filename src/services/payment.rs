use crate::config::AppConfig;
use crate::domain::model::PaymentStatus;
use crate::domain::ports::PaymentGateway;
use crate::utils::error::{AppError, Result};
use crate::utils::helpers::format_currency;
use crate::utils::validation::validate_card_number;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    pub transaction_id: String,
    pub amount: f64,
    pub formatted_amount: String,
    pub card: String,
    pub currency: String,
    pub status: PaymentStatus,
    pub timestamp: DateTime<Utc>,
    pub refunded_at: Option<DateTime<Utc>>,
}

fn mask_card(card_number: &str) -> String {
    let digits: Vec<char> = card_number.chars().filter(char::is_ascii_digit).collect();
    let last4: String = digits[digits.len().saturating_sub(4)..].iter().collect();
    format!("****-****-****-{}", last4)
}

/// Charges cards through a [`PaymentGateway`] and keeps an in-memory ledger.
///
/// In debug mode the gateway is never called and every valid charge succeeds.
pub struct PaymentService {
    debug: bool,
    gateway: Box<dyn PaymentGateway>,
    transactions: HashMap<String, Transaction>,
}

impl PaymentService {
    pub fn new(config: &AppConfig, gateway: Box<dyn PaymentGateway>) -> Self {
        Self {
            debug: config.debug,
            gateway,
            transactions: HashMap::new(),
        }
    }

    pub async fn charge(
        &mut self,
        amount: f64,
        card_number: &str,
        currency: &str,
    ) -> Result<Transaction> {
        if !(amount > 0.0) || !amount.is_finite() {
            return Err(AppError::validation("Amount must be positive."));
        }
        if !validate_card_number(card_number) {
            return Err(AppError::validation("Invalid card number."));
        }

        let status = if self.debug {
            PaymentStatus::Success
        } else {
            self.gateway.charge(amount, card_number, currency).await?
        };

        let transaction = Transaction {
            transaction_id: Uuid::new_v4().to_string(),
            amount,
            formatted_amount: format_currency(amount, currency),
            card: mask_card(card_number),
            currency: currency.to_string(),
            status,
            timestamp: Utc::now(),
            refunded_at: None,
        };

        tracing::info!(
            "Payment {}: {} [{}]",
            status,
            transaction.formatted_amount,
            transaction.transaction_id
        );
        self.transactions
            .insert(transaction.transaction_id.clone(), transaction.clone());
        Ok(transaction)
    }

    /// `Ok(None)` when the transaction is unknown.
    pub fn refund(&mut self, transaction_id: &str) -> Result<Option<Transaction>> {
        let Some(transaction) = self.transactions.get_mut(transaction_id) else {
            tracing::warn!("Refund failed: transaction {} not found.", transaction_id);
            return Ok(None);
        };

        if transaction.status != PaymentStatus::Success {
            return Err(AppError::validation(
                "Only successful transactions can be refunded.",
            ));
        }

        transaction.status = PaymentStatus::Refunded;
        transaction.refunded_at = Some(Utc::now());
        tracing::info!("Refund issued for transaction {}", transaction_id);
        Ok(Some(transaction.clone()))
    }

    pub fn get_transaction(&self, transaction_id: &str) -> Option<&Transaction> {
        self.transactions.get(transaction_id)
    }

    pub fn transactions(&self) -> impl Iterator<Item = &Transaction> {
        self.transactions.values()
    }
}
