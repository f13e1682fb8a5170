use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;

use log::{debug, info, trace};
use rand::Rng;
use telemq_core::protocol::packets::Packet;
use telemq_core::{ClientId, TelemetryMessage, TopicName};
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::config::{HarnessConfig, PublisherConfig};
use crate::connection::MqttConnection;
use crate::error::ClientError;

/// Latencies kept for the running average
pub const LATENCY_WINDOW: usize = 100;

/// Uniform random delay in whole seconds, bounds inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayRange {
    min_secs: u64,
    max_secs: u64,
}

impl DelayRange {
    /// Bounds are swapped if given in the wrong order.
    pub fn from_secs(min_secs: u64, max_secs: u64) -> Self {
        Self {
            min_secs: min_secs.min(max_secs),
            max_secs: min_secs.max(max_secs),
        }
    }

    pub fn from_config(config: &PublisherConfig) -> Self {
        Self::from_secs(config.min_delay_secs, config.max_delay_secs)
    }

    pub fn sample(&self) -> Duration {
        let secs = rand::thread_rng().gen_range(self.min_secs..=self.max_secs);
        Duration::from_secs(secs)
    }
}

/// Running average over the most recent [`LATENCY_WINDOW`] publishes.
#[derive(Debug, Default)]
pub struct LatencyWindow {
    samples: VecDeque<Duration>,
}

impl LatencyWindow {
    pub fn record(&mut self, latency: Duration) {
        if self.samples.len() == LATENCY_WINDOW {
            self.samples.pop_front();
        }
        self.samples.push_back(latency);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn average(&self) -> Option<Duration> {
        if self.samples.is_empty() {
            return None;
        }
        let total: Duration = self.samples.iter().sum();
        Some(total / self.samples.len() as u32)
    }
}

/// Outcome of a finished publish run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublishReport {
    pub sent: u64,
    pub average_latency: Option<Duration>,
}

impl fmt::Display for PublishReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.average_latency {
            Some(latency) => write!(f, "{} messages sent, average latency {:?}", self.sent, latency),
            None => write!(f, "{} messages sent", self.sent),
        }
    }
}

pub struct Publisher {
    connection: MqttConnection,
    topic: TopicName,
    device_id: u32,
    delays: DelayRange,
    keep_alive: Option<Duration>,
    latencies: LatencyWindow,
}

impl Publisher {
    pub async fn connect(config: &HarnessConfig) -> Result<Self, ClientError> {
        let topic = TopicName::new(&config.topic)?;
        let client_id = ClientId::generate(&config.publisher.client_id_prefix, rand::random());
        let connection = MqttConnection::connect(&config.broker, client_id).await?;
        Ok(Self {
            connection,
            topic,
            device_id: config.publisher.device_id,
            delays: DelayRange::from_config(&config.publisher),
            keep_alive: config.broker.keep_alive(),
            latencies: LatencyWindow::default(),
        })
    }

    pub fn client_id(&self) -> &ClientId {
        self.connection.client_id()
    }

    /// Publish one telemetry sample and log the acknowledgment.
    pub async fn publish_telemetry(&mut self, sequence: u64) -> Result<TelemetryMessage, ClientError> {
        let message = TelemetryMessage::new(self.device_id, sequence);
        let started = Instant::now();
        self.connection
            .publish(&self.topic, message.payload().as_bytes().to_vec())
            .await?;
        let latency = started.elapsed();
        self.latencies.record(latency);
        info!("Message published to '{}': {} ({:?})", self.topic, message, latency);
        Ok(message)
    }

    /// Publish `count` messages numbered `0..count`, each after a random
    /// delay, then disconnect.
    pub async fn run(mut self, count: u64) -> Result<PublishReport, ClientError> {
        for sequence in 0..count {
            let delay = self.delays.sample();
            debug!("Waiting {:?} before message {}", delay, sequence);
            self.idle(delay).await?;
            self.publish_telemetry(sequence).await?;
        }
        self.connection.disconnect().await?;

        let report = PublishReport {
            sent: count,
            average_latency: self.latencies.average(),
        };
        info!("Publisher '{}' finished: {}", self.client_id(), report);
        Ok(report)
    }

    /// Wait `delay`, sending PINGREQ every keep-alive period meanwhile.
    async fn idle(&mut self, delay: Duration) -> Result<(), ClientError> {
        let Some(period) = self.keep_alive else {
            tokio::time::sleep(delay).await;
            return Ok(());
        };

        let deadline = tokio::time::sleep(delay);
        tokio::pin!(deadline);
        let mut ping = interval_at(Instant::now() + period, period);
        ping.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = &mut deadline => return Ok(()),
                _ = ping.tick() => self.connection.ping().await?,
                packet = self.connection.next_packet() => match packet? {
                    Some(Packet::PingResp(_)) => trace!("PINGRESP received"),
                    Some(other) => debug!("Publisher ignoring {}", other.packet_type()),
                    None => return Err(ClientError::ConnectionClosed),
                },
            }
        }
    }
}

/// Connect with `config` and publish `config.publisher.count` messages.
pub async fn run_publisher(config: &HarnessConfig) -> Result<PublishReport, ClientError> {
    let publisher = Publisher::connect(config).await?;
    publisher.run(config.publisher.count).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeBroker;

    #[test]
    fn test_delay_range_bounds() {
        let range = DelayRange::from_secs(1, 5);
        for _ in 0..200 {
            let delay = range.sample();
            assert!(delay >= Duration::from_secs(1) && delay <= Duration::from_secs(5));
            assert_eq!(delay.subsec_nanos(), 0);
        }
        assert_eq!(DelayRange::from_secs(0, 0).sample(), Duration::ZERO);
        assert_eq!(DelayRange::from_secs(5, 1), DelayRange::from_secs(1, 5));
    }

    #[test]
    fn test_latency_window_keeps_last_100() {
        let mut window = LatencyWindow::default();
        assert_eq!(window.average(), None);

        for _ in 0..LATENCY_WINDOW {
            window.record(Duration::from_millis(100));
        }
        for _ in 0..LATENCY_WINDOW {
            window.record(Duration::from_millis(10));
        }
        assert_eq!(window.len(), LATENCY_WINDOW);
        assert_eq!(window.average(), Some(Duration::from_millis(10)));
    }

    #[tokio::test]
    async fn test_run_publishes_sequential_counters() {
        let broker = FakeBroker::start().await;
        let mut config = broker.config();
        config.publisher.count = 5;
        config.publisher.device_id = 7;

        let report = run_publisher(&config).await.unwrap();
        assert_eq!(report.sent, 5);
        assert!(report.average_latency.is_some());

        // the run returns once frames are written, not once the broker read them
        tokio::time::timeout(Duration::from_secs(5), async {
            while broker.published().len() < 5 {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap();

        let payloads: Vec<String> = broker
            .published()
            .into_iter()
            .map(|p| {
                assert_eq!(p.topic_name.as_str(), "data");
                String::from_utf8(p.payload).unwrap()
            })
            .collect();
        let expected: Vec<String> = (0..5).map(|i| format!("Device 7: Data {}", i)).collect();
        assert_eq!(payloads, expected);
    }

    #[tokio::test]
    async fn test_pings_while_waiting_past_keep_alive() {
        let broker = FakeBroker::start().await;
        let mut config = broker.config();
        config.broker.keep_alive_secs = 1;
        config.publisher.count = 1;
        config.publisher.min_delay_secs = 3;
        config.publisher.max_delay_secs = 3;

        let report = run_publisher(&config).await.unwrap();
        assert_eq!(report.sent, 1);
        assert!(broker.pings_received() >= 2);
    }

    #[tokio::test]
    async fn test_zero_count_sends_nothing() {
        let broker = FakeBroker::start().await;
        let mut config = broker.config();
        config.publisher.count = 0;

        let report = run_publisher(&config).await.unwrap();
        assert_eq!(report, PublishReport { sent: 0, average_latency: None });
        assert!(broker.published().is_empty());
    }

    #[tokio::test]
    async fn test_refused_connection_is_error() {
        let broker = FakeBroker::builder().refuse_connections().start().await;
        let result = run_publisher(&broker.config()).await;
        assert!(matches!(result, Err(ClientError::ConnectionRefused(_))));
    }
}
