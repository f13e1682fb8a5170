use log::{error, info};
use telemq_tokio::{Coordinator, HarnessConfig, PrintHandler};

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
    let sessions = config.subscriber.sessions;
    info!(
        "Configuration: broker={}, topic={}, sessions={}",
        config.broker.address(),
        config.topic,
        sessions
    );

    let mut coordinator = Coordinator::new(config);
    for i in 1..=sessions {
        let label = format!("Subscriber {}", i);
        if let Err(e) = coordinator.start(label.clone(), PrintHandler::labelled(label.clone())).await {
            error!("{} failed to start: {}", label, e);
            for summary in coordinator.shutdown().await {
                info!("{}", summary);
            }
            std::process::exit(1);
        }
    }
    info!("{} subscribers running, press Ctrl+C to stop", coordinator.active_sessions());

    let summaries = coordinator
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for Ctrl+C: {}", e);
            }
            info!("Interrupt received, stopping all subscribers");
        })
        .await;

    for summary in summaries {
        info!("{}", summary);
    }
}
