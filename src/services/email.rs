use crate::config::AppConfig;
use crate::domain::model::EmailMessage;
use crate::domain::ports::MailTransport;
use crate::utils::helpers::format_currency;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentEmail {
    pub to: String,
    pub subject: String,
}

fn welcome_body(name: &str, app_name: &str, username: &str) -> String {
    format!(
        "\nHello {name},\n\n\
         Welcome to {app_name}! Your account has been created successfully.\n\n\
         Username: {username}\n\n\
         Thanks for joining us!\n"
    )
}

fn order_body(name: &str, order_id: &str, total: &str) -> String {
    format!(
        "\nHello {name},\n\n\
         Your order has been confirmed.\n\n\
         Order ID : {order_id}\n\
         Total     : {total}\n\n\
         We'll notify you when it ships.\n"
    )
}

/// Renders notification emails and hands them to a [`MailTransport`].
///
/// In debug mode nothing is delivered; every attempt is still recorded in the sent log.
pub struct EmailService<T: MailTransport> {
    app_name: String,
    sender: String,
    debug: bool,
    transport: T,
    sent: Vec<SentEmail>,
}

impl<T: MailTransport> EmailService<T> {
    pub fn new(config: &AppConfig, transport: T) -> Self {
        Self {
            app_name: config.app_name.clone(),
            sender: config.sender_address().to_string(),
            debug: config.debug,
            transport,
            sent: Vec::new(),
        }
    }

    pub async fn send_welcome_email(&mut self, to_email: &str, username: &str, name: &str) -> bool {
        let display_name = if name.trim().is_empty() { username } else { name };
        let body = welcome_body(display_name, &self.app_name, username);
        let subject = format!("Welcome to {}!", self.app_name);
        self.send(to_email, subject, body).await
    }

    pub async fn send_order_confirmation(
        &mut self,
        to_email: &str,
        name: &str,
        order_id: &str,
        total: f64,
    ) -> bool {
        let body = order_body(name, order_id, &format_currency(total, "USD"));
        let subject = format!("Order Confirmation - {}", order_id);
        self.send(to_email, subject, body).await
    }

    async fn send(&mut self, to: &str, subject: String, body: String) -> bool {
        let message = EmailMessage {
            from: self.sender.clone(),
            to: to.to_string(),
            subject,
            body,
        };

        self.sent.push(SentEmail {
            to: message.to.clone(),
            subject: message.subject.clone(),
        });

        if self.debug {
            tracing::debug!("Skipping delivery in debug mode. Email to {}: {}", to, message.subject);
            return true;
        }

        match self.transport.deliver(&message).await {
            Ok(()) => {
                tracing::info!("Email sent to {}: {}", to, message.subject);
                true
            }
            Err(e) => {
                tracing::error!("Failed to send email to {}: {}", to, e);
                false
            }
        }
    }

    pub fn sent_count(&self) -> usize {
        self.sent.len()
    }

    pub fn sent(&self) -> &[SentEmail] {
        &self.sent
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::{AppError, Result};
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct RecordingTransport {
        delivered: Arc<Mutex<Vec<EmailMessage>>>,
        fail: bool,
    }

    impl MailTransport for RecordingTransport {
        async fn deliver(&self, message: &EmailMessage) -> Result<()> {
            if self.fail {
                return Err(AppError::IoError(std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    "relay down",
                )));
            }
            self.delivered.lock().unwrap().push(message.clone());
            Ok(())
        }
    }

    fn live_config() -> AppConfig {
        AppConfig {
            debug: false,
            ..AppConfig::default()
        }
    }

    #[test]
    fn test_welcome_falls_back_to_username() {
        let transport = RecordingTransport::default();
        let mut email = EmailService::new(&live_config(), transport.clone());

        assert!(tokio_test::block_on(email.send_welcome_email(
            "frank@example.com",
            "frank",
            ""
        )));

        let delivered = transport.delivered.lock().unwrap();
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].subject, "Welcome to SampleApp!");
        assert!(delivered[0].body.contains("Hello frank,"));
        assert!(delivered[0].body.contains("Username: frank"));
    }

    #[tokio::test]
    async fn test_order_confirmation_formats_total() {
        let transport = RecordingTransport::default();
        let mut email = EmailService::new(&live_config(), transport.clone());

        assert!(
            email
                .send_order_confirmation("gina@example.com", "Gina", "ORD-001", 1149.5)
                .await
        );

        let delivered = transport.delivered.lock().unwrap();
        assert_eq!(delivered[0].subject, "Order Confirmation - ORD-001");
        assert!(delivered[0].body.contains("Total     : $1,149.50"));
    }

    #[tokio::test]
    async fn test_transport_failure_returns_false_but_is_logged() {
        let transport = RecordingTransport {
            fail: true,
            ..Default::default()
        };
        let mut email = EmailService::new(&live_config(), transport);

        assert!(!email.send_welcome_email("x@example.com", "x", "X").await);
        assert_eq!(email.sent_count(), 1);
    }

    #[tokio::test]
    async fn test_debug_mode_skips_transport() {
        let transport = RecordingTransport {
            fail: true,
            ..Default::default()
        };
        let config = AppConfig {
            debug: true,
            ..AppConfig::default()
        };
        let mut email = EmailService::new(&config, transport.clone());

        assert!(email.send_welcome_email("x@example.com", "x", "X").await);
        assert!(transport.delivered.lock().unwrap().is_empty());
        assert_eq!(email.sent()[0].to, "x@example.com");
    }
}
