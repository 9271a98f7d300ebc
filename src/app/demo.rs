use crate::config::AppConfig;
use crate::core::{DataLoader, DataProcessor, FieldStats, Record};
use crate::domain::ports::{MailTransport, PaymentGateway, Storage};
use crate::domain::product::{Product, ProductCategory, ProductVariant};
use crate::domain::user::{User, UserSummary};
use crate::services::{AuthService, EmailService, NewUser, PaymentService, Transaction};
use crate::utils::error::{AppError, Result};
use crate::utils::helpers::paginate;
use serde::Serialize;
use serde_json::json;
use std::collections::BTreeMap;

pub const TEST_CARD: &str = "4532015112830366";
const ORDER_AMOUNT: f64 = 149.99;
const CATALOG_PAGE_SIZE: usize = 3;

#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub records: Vec<Record>,
    pub stats: Option<FieldStats>,
    pub group_sizes: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DemoReport {
    pub user: UserSummary,
    pub catalog_size: usize,
    pub transaction: Transaction,
    pub emails_sent: usize,
    pub pipeline: PipelineReport,
}

/// Records with a blank name and an unparsable price, to exercise the cleaning steps.
pub fn sample_records() -> Vec<Record> {
    [
        json!({"name": "  alice ", "category": "FOOD", "price": "12.5"}),
        json!({"name": "bob", "category": "ELECTRONICS", "price": "499"}),
        json!({"name": "", "category": "BOOKS", "price": "9.99"}),
        json!({"name": "carol", "category": "clothing", "price": "bad"}),
    ]
    .into_iter()
    .filter_map(|v| match v {
        serde_json::Value::Object(obj) => Some(Record::from(obj)),
        _ => None,
    })
    .collect()
}

/// Wires config and services together and runs the demo flows in order.
pub struct DemoApp<T: MailTransport, S: Storage> {
    config: AppConfig,
    auth: AuthService,
    email: EmailService<T>,
    payment: PaymentService,
    loader: DataLoader<S>,
}

impl<T: MailTransport, S: Storage> DemoApp<T, S> {
    pub fn new(
        config: AppConfig,
        transport: T,
        gateway: Box<dyn PaymentGateway>,
        data_storage: S,
    ) -> Self {
        Self {
            auth: AuthService::new(&config),
            email: EmailService::new(&config, transport),
            payment: PaymentService::new(&config, gateway),
            loader: DataLoader::new(data_storage),
            config,
        }
    }

    pub fn auth(&self) -> &AuthService {
        &self.auth
    }

    pub fn email(&self) -> &EmailService<T> {
        &self.email
    }

    pub fn payment(&self) -> &PaymentService {
        &self.payment
    }

    /// Register a user, log them in, and send a welcome email.
    pub async fn demo_user_flow(&mut self) -> Result<User> {
        tracing::info!("=== User Registration Flow ===");

        let user = self
            .auth
            .register(
                NewUser::new("john_doe", "john@example.com", "SecurePass1").name("John", "Doe"),
            )?
            .clone();

        let token = self.auth.login("john_doe", "SecurePass1")?;
        tracing::info!("Login token: {}...", &token[..10]);

        if self
            .email
            .send_welcome_email(&user.email, &user.username, &user.full_name())
            .await
        {
            tracing::info!("Welcome email sent to {}", user.email);
        } else {
            tracing::warn!("Welcome email to {} was not delivered", user.email);
        }

        Ok(user)
    }

    pub fn demo_product_catalog(&self) -> Result<Vec<Product>> {
        tracing::info!("=== Building Product Catalog ===");

        let mut products = vec![
            Product::new("Gaming Laptop", 1299.99, ProductCategory::Electronics)
                .with_description("High-performance gaming laptop"),
            Product::new("Rust Cookbook", 39.99, ProductCategory::Books)
                .with_description("Advanced Rust recipes"),
            Product::new("Running Shoes", 89.99, ProductCategory::Clothing),
            Product::new("Organic Coffee", 14.99, ProductCategory::Food),
        ];

        products[2].add_variant(
            ProductVariant::new("SHOE-BLK-42")
                .color("Black")
                .size("42")
                .stock(10),
        );
        products[2].add_variant(
            ProductVariant::new("SHOE-WHT-43")
                .color("White")
                .size("43")
                .stock(5),
        );

        for p in &products {
            tracing::info!(
                "  {} - {} | stock: {}",
                p.name,
                p.formatted_price(),
                p.total_stock()
            );
        }

        let (page_items, total_pages) = paginate(&products, 1, CATALOG_PAGE_SIZE)?;
        let names: Vec<&str> = page_items.iter().map(|p| p.name.as_str()).collect();
        tracing::info!("Page 1 of {}: {:?}", total_pages, names);

        Ok(products)
    }

    /// Charge the test card, email the confirmation, then refund. Returns the refunded transaction.
    pub async fn demo_payment_flow(&mut self, user: &User) -> Result<Transaction> {
        tracing::info!("=== Payment Flow ===");

        let tx = self.payment.charge(ORDER_AMOUNT, TEST_CARD, "USD").await?;
        tracing::info!("Charged: {} | Status: {}", tx.formatted_amount, tx.status);

        let order_id: String = tx.transaction_id.chars().take(8).collect();
        self.email
            .send_order_confirmation(&user.email, &user.full_name(), &order_id, tx.amount)
            .await;

        let refund = self
            .payment
            .refund(&tx.transaction_id)?
            .ok_or_else(|| AppError::NotFoundError(format!("transaction {}", tx.transaction_id)))?;
        tracing::info!("Refund status: {}", refund.status);

        Ok(refund)
    }

    /// Cleans `data_file` (under the data directory) or the built-in sample records.
    pub async fn demo_data_pipeline(&self, data_file: Option<&str>) -> Result<PipelineReport> {
        tracing::info!("=== Data Pipeline ===");

        let raw_data = match data_file {
            Some(file) => self.loader.load_records(file).await?,
            None => sample_records(),
        };

        let settings = &self.config.pipeline;
        let processor = DataProcessor::from_settings(settings);
        let records = processor.run(raw_data);

        let stats = settings
            .stats_field
            .as_deref()
            .and_then(|field| DataProcessor::compute_stats(&records, field));
        match &stats {
            Some(s) => tracing::info!(
                "Processed {} records. Stats: count={} mean={:.2} median={:.2} stdev={:.2} min={:.2} max={:.2}",
                records.len(),
                s.count,
                s.mean,
                s.median,
                s.stdev,
                s.min,
                s.max
            ),
            None => tracing::info!("Processed {} records. Stats: none", records.len()),
        }

        let mut group_sizes = BTreeMap::new();
        if let Some(key) = settings.group_by.as_deref() {
            for (group, items) in DataProcessor::group_by(&records, key) {
                tracing::info!("  [{}] {} item(s)", group, items.len());
                group_sizes.insert(group, items.len());
            }
        }

        Ok(PipelineReport {
            records,
            stats,
            group_sizes,
        })
    }

    pub async fn run(&mut self, data_file: Option<&str>) -> Result<DemoReport> {
        tracing::info!("Starting {} demo", self.config.app_name);
        tracing::debug!("Config: {}", self.config.public_view());

        let user = self.demo_user_flow().await?;
        let catalog = self.demo_product_catalog()?;
        let transaction = self.demo_payment_flow(&user).await?;
        let pipeline = self.demo_data_pipeline(data_file).await?;

        tracing::info!("All demo flows completed successfully.");
        Ok(DemoReport {
            user: user.summary(),
            catalog_size: catalog.len(),
            transaction,
            emails_sent: self.email.sent_count(),
            pipeline,
        })
    }
}
