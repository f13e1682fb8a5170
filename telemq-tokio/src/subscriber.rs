use std::future::Future;

use log::info;
use telemq_core::ClientId;

use crate::config::HarnessConfig;
use crate::error::ClientError;
use crate::handler::EventHandler;
use crate::session::{SessionSummary, SubscriberSession};

/// Subscribe to the configured topic and hand every event to `handler` until
/// `shutdown` resolves or the broker ends the session.
///
/// Connection and subscription failures are returned as errors. Once the
/// session runs, the way it ended is reported in the summary.
pub async fn run_subscriber<H, F>(
    config: &HarnessConfig,
    handler: H,
    shutdown: F,
) -> Result<SessionSummary, ClientError>
where
    H: EventHandler,
    F: Future<Output = ()>,
{
    let client_id = ClientId::generate(&config.subscriber.client_id_prefix, rand::random());
    let session = SubscriberSession::connect(config, client_id, "Subscriber").await?;
    info!("Subscribed to '{}', waiting for messages", session.topic());

    let summary = session.spawn(handler).run_until(shutdown).await;
    info!("{}", summary);
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{DisconnectReason, SessionEvent};
    use crate::handler::ChannelHandler;
    use crate::testing::FakeBroker;
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn test_run_subscriber_until_shutdown() {
        let broker = FakeBroker::start().await;
        let config = broker.config();
        let (handler, mut rx) = ChannelHandler::new();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let runner = tokio::spawn({
            let config = config.clone();
            async move {
                run_subscriber(&config, handler, async {
                    let _ = shutdown_rx.await;
                })
                .await
            }
        });

        broker.wait_for_subscribers(1).await;
        broker.inject("data", b"Device 1: Data 0".to_vec());
        assert!(matches!(rx.recv().await, Some(SessionEvent::Connected { .. })));
        match rx.recv().await {
            Some(SessionEvent::MessageReceived(message)) => {
                assert_eq!(message.text(), "Device 1: Data 0");
            }
            other => panic!("unexpected event {:?}", other),
        }

        shutdown_tx.send(()).unwrap();
        let summary = runner.await.unwrap().unwrap();
        assert_eq!(summary.messages_received, 1);
        assert_eq!(summary.reason, DisconnectReason::Stopped);
        assert!(summary.client_id.as_str().starts_with("subscriber-"));
    }

    #[tokio::test]
    async fn test_run_subscriber_rejected() {
        let broker = FakeBroker::builder().reject_subscriptions().start().await;
        let (handler, _rx) = ChannelHandler::new();
        let result = run_subscriber(&broker.config(), handler, std::future::pending()).await;
        assert!(matches!(result, Err(ClientError::SubscriptionRejected { .. })));
    }

    #[tokio::test]
    async fn test_run_subscriber_ends_when_broker_closes() {
        let broker = FakeBroker::start().await;
        let config = broker.config();
        let (handler, _rx) = ChannelHandler::new();

        let runner = tokio::spawn({
            let config = config.clone();
            async move { run_subscriber(&config, handler, std::future::pending()).await }
        });
        broker.wait_for_subscribers(1).await;
        broker.close_all();

        let summary = runner.await.unwrap().unwrap();
        assert_eq!(summary.reason, DisconnectReason::ClosedByBroker);
    }
}
