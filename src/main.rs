use genpix::{logger, proxy::server, Config};

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let env_loaded = dotenv::dotenv().is_ok();

    let config = Config::from_env();
    let logger_config = if config.log_json {
        logger::LoggerConfig::production()
    } else {
        logger::LoggerConfig::development()
    };
    logger::init_with_config(logger_config)?;

    if env_loaded {
        log::info!("✅ .env file loaded successfully");
    } else {
        log::warn!("⚠️  No .env file found, using system environment variables");
    }

    logger::log_startup_info(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"), &config);
    logger::log_config_info(&config);

    if let Err(e) = config.proxy.validate() {
        log::error!("❌ {}", e);
        return Err(e.into());
    }

    server::run(config.proxy).await?;
    log::info!("👋 Download proxy stopped");
    Ok(())
}
