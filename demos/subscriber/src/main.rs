use log::{error, info};
use telemq_tokio::{run_subscriber, HarnessConfig, PrintHandler};

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match HarnessConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };
    info!("Configuration: broker={}, topic={}", config.broker.address(), config.topic);

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
        }
        info!("Interrupt received, shutting down");
    };

    if let Err(e) = run_subscriber(&config, PrintHandler::new(), shutdown).await {
        error!("Subscriber failed: {}", e);
        std::process::exit(1);
    }
}
