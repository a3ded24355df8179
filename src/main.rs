use clap::Parser;
use medical_centers_etl::core::ConfigProvider;
use medical_centers_etl::utils::error::EtlError;
use medical_centers_etl::utils::{logger, validation::Validate};
use medical_centers_etl::{CliConfig, EtlEngine, LocalStorage, MedicalCenterPipeline, TomlConfig};

async fn run<C: ConfigProvider + Validate>(config: C) -> Result<Vec<String>, EtlError> {
    config.validate()?;

    let storage = LocalStorage::new(config.output_path().to_string());
    let pipeline = MedicalCenterPipeline::new(storage, config)?;
    EtlEngine::new(pipeline).run().await
}

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }
    tracing::debug!("CLI config: {:?}", cli);

    let result = match cli.config.clone() {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            match TomlConfig::from_file(&path) {
                Ok(config) => run(config).await,
                Err(e) => Err(e),
            }
        }
        None => run(cli).await,
    };

    match result {
        Ok(paths) => {
            println!("✅ Export completed: {}", paths.join(", "));
        }
        Err(e) => {
            tracing::error!(
                "❌ Export failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());

            std::process::exit(e.severity().exit_code());
        }
    }
}
