use anyhow::Context;
use clap::Parser;
use employee_etl::app::runner::{self, Capabilities, View};
use employee_etl::utils::{logger, validation::Validate};
use employee_etl::{CliConfig, TomlConfig};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.log_json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }
    tracing::debug!("CLI config: {:?}", cli);

    let file = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path);
            Some(
                TomlConfig::from_file(path)
                    .with_context(|| format!("failed to load config file '{}'", path))?,
            )
        }
        None => None,
    };

    let settings = cli.resolve(file.as_ref());
    if let Err(e) = settings.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(e.severity().exit_code());
    }

    let view = if cli.ui { View::Dashboard } else { View::Query };

    match runner::run(settings, view, Capabilities::detect(), ".").await {
        Ok(report) => println!("{}", report),
        Err(e) => {
            tracing::error!(
                "Employee ETL failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            std::process::exit(e.severity().exit_code());
        }
    }

    Ok(())
}
