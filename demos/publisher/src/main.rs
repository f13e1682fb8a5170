use log::{error, info};
use telemq_tokio::{run_publisher, HarnessConfig};

#[tokio::main]
async fn main() {
    // Initialize logger with info level by default, can be overridden with RUST_LOG
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match HarnessConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    info!(
        "Configuration: broker={}, topic={}, count={}, delay={}..={}s",
        config.broker.address(),
        config.topic,
        config.publisher.count,
        config.publisher.min_delay_secs,
        config.publisher.max_delay_secs
    );

    match run_publisher(&config).await {
        Ok(report) => info!("Publisher completed: {}", report),
        Err(e) => {
            error!("Publisher failed: {}", e);
            std::process::exit(1);
        }
    }
}
