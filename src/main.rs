use clap::Parser;
use sample_app::utils::error::ErrorSeverity;
use sample_app::utils::{logger, validation::Validate};
use sample_app::{CliArgs, DemoApp, HttpGateway, LocalStorage, OutboxTransport};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    let config = match args.load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load configuration: {}", e);
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    // 初始化日誌
    if args.json_logs {
        logger::init_json_logger(&config.log_level);
    } else {
        logger::init_cli_logger(&config.log_level, args.verbose);
    }

    tracing::info!("Starting sample-app");
    if let Some(path) = args.missing_config_file() {
        tracing::warn!(
            "Config file not found: {} (using environment and defaults)",
            path
        );
    }
    tracing::debug!("CLI args: {:?}", args);

    // 驗證配置
    if let Err(e) = args.validate().and_then(|_| config.validate()) {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let transport = OutboxTransport::new(LocalStorage::new(config.outbox_dir.as_str()));
    let gateway = HttpGateway::from_config(&config)?;
    let data_storage = LocalStorage::new(config.data_dir.as_str());
    let mut app = DemoApp::new(config, transport, Box::new(gateway), data_storage);

    match app.run(args.data.as_deref()).await {
        Ok(report) => {
            println!("✅ All demo flows completed successfully!");
            println!(
                "👤 {} | 🛒 {} products | 💳 {} ({}) | 📧 {} emails | 📊 {} records",
                report.user.username,
                report.catalog_size,
                report.transaction.formatted_amount,
                report.transaction.status,
                report.emails_sent,
                report.pipeline.records.len()
            );
        }
        Err(e) => {
            tracing::error!(
                "❌ Demo failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            // 根據錯誤嚴重程度決定退出碼
            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}
