//! Loopback broker for tests.
//!
//! Speaks the same codec as the client: accepts CONNECT, SUBSCRIBE, PUBLISH,
//! PINGREQ and DISCONNECT, and fans each PUBLISH out to every connection
//! subscribed to exactly that topic.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::BytesMut;
use dashmap::DashMap;
use log::debug;
use telemq_core::protocol::packets::{
    ConnAckPacket, ConnectReturnCode, Packet, PingRespPacket, PublishPacket, SubAckPacket,
    SubAckReturnCode,
};
use telemq_core::protocol::QoS;
use telemq_core::TopicName;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::config::HarnessConfig;
use crate::io::{read_packet, write_packet};

#[derive(Debug, Default, Clone, Copy)]
struct Behaviour {
    refuse_connections: bool,
    reject_subscriptions: bool,
    ignore_pings: bool,
}

#[derive(Default)]
struct BrokerState {
    behaviour: Behaviour,
    subscribers: DashMap<u64, (TopicName, mpsc::UnboundedSender<Packet>)>,
    published: Mutex<Vec<PublishPacket>>,
    pings: AtomicUsize,
    next_connection: AtomicU64,
}

impl BrokerState {
    fn route(&self, publish: PublishPacket) {
        for entry in self.subscribers.iter() {
            let (topic, tx) = entry.value();
            if *topic == publish.topic_name {
                let forwarded = PublishPacket::at_most_once(topic.clone(), publish.payload.clone());
                let _ = tx.send(forwarded.into());
            }
        }
        if let Ok(mut published) = self.published.lock() {
            published.push(publish);
        }
    }
}

#[derive(Default)]
pub(crate) struct FakeBrokerBuilder {
    behaviour: Behaviour,
}

impl FakeBrokerBuilder {
    /// Answer every CONNECT with "not authorized"
    pub(crate) fn refuse_connections(mut self) -> Self {
        self.behaviour.refuse_connections = true;
        self
    }

    pub(crate) fn reject_subscriptions(mut self) -> Self {
        self.behaviour.reject_subscriptions = true;
        self
    }

    /// Count PINGREQs but never answer them
    pub(crate) fn ignore_pings(mut self) -> Self {
        self.behaviour.ignore_pings = true;
        self
    }

    pub(crate) async fn start(self) -> FakeBroker {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let state = Arc::new(BrokerState {
            behaviour: self.behaviour,
            ..BrokerState::default()
        });
        let (close_tx, close_rx) = watch::channel(false);

        let accept_state = state.clone();
        let accept_task = tokio::spawn(async move {
            while let Ok((socket, peer)) = listener.accept().await {
                let id = accept_state.next_connection.fetch_add(1, Ordering::Relaxed);
                debug!("Fake broker accepted {} as connection {}", peer, id);
                tokio::spawn(serve(socket, id, accept_state.clone(), close_rx.clone()));
            }
        });

        FakeBroker {
            addr,
            state,
            close: close_tx,
            accept_task,
        }
    }
}

pub(crate) struct FakeBroker {
    addr: SocketAddr,
    state: Arc<BrokerState>,
    close: watch::Sender<bool>,
    accept_task: JoinHandle<()>,
}

impl FakeBroker {
    pub(crate) fn builder() -> FakeBrokerBuilder {
        FakeBrokerBuilder::default()
    }

    pub(crate) async fn start() -> FakeBroker {
        Self::builder().start().await
    }

    /// Harness settings pointing at this broker, with pings and delays off.
    pub(crate) fn config(&self) -> HarnessConfig {
        let mut config = HarnessConfig::default();
        config.broker.host = self.addr.ip().to_string();
        config.broker.port = self.addr.port();
        config.broker.keep_alive_secs = 0;
        config.publisher.min_delay_secs = 0;
        config.publisher.max_delay_secs = 0;
        config
    }

    /// Route a message as if a client had published it.
    pub(crate) fn inject(&self, topic: &str, payload: Vec<u8>) {
        let topic = TopicName::new(topic).unwrap();
        self.state.route(PublishPacket::at_most_once(topic, payload));
    }

    pub(crate) fn published(&self) -> Vec<PublishPacket> {
        self.state.published.lock().unwrap().clone()
    }

    pub(crate) fn pings_received(&self) -> usize {
        self.state.pings.load(Ordering::Relaxed)
    }

    pub(crate) fn subscriber_count(&self) -> usize {
        self.state.subscribers.len()
    }

    /// Wait until `count` subscriptions are registered.
    pub(crate) async fn wait_for_subscribers(&self, count: usize) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while self.subscriber_count() < count {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap();
    }

    /// Drop every open connection.
    pub(crate) fn close_all(&self) {
        self.close.send_replace(true);
    }
}

impl Drop for FakeBroker {
    fn drop(&mut self) {
        self.accept_task.abort();
        self.close.send_replace(true);
    }
}

async fn serve(socket: TcpStream, id: u64, state: Arc<BrokerState>, mut close: watch::Receiver<bool>) {
    let (mut reader, mut writer) = socket.into_split();
    let (tx, mut rx) = mpsc::unbounded_channel::<Packet>();
    let writer_task = tokio::spawn(async move {
        while let Some(packet) = rx.recv().await {
            if write_packet(&mut writer, &packet).await.is_err() {
                break;
            }
        }
    });

    let behaviour = state.behaviour;
    let mut buffer = BytesMut::new();
    loop {
        let closed = *close.borrow();
        if closed {
            break;
        }
        let packet = tokio::select! {
            _ = close.changed() => break,
            packet = read_packet(&mut reader, &mut buffer) => packet,
        };
        let packet = match packet {
            Ok(Some(packet)) => packet,
            _ => break,
        };

        match packet {
            Packet::Connect(_) if behaviour.refuse_connections => {
                let refused = ConnAckPacket {
                    session_present: false,
                    return_code: ConnectReturnCode::NotAuthorized,
                };
                let _ = tx.send(refused.into());
                break;
            }
            Packet::Connect(_) => {
                let _ = tx.send(ConnAckPacket::accepted().into());
            }
            Packet::Subscribe(subscribe) => {
                let return_code = if behaviour.reject_subscriptions {
                    SubAckReturnCode::Failure
                } else {
                    state.subscribers.insert(id, (subscribe.topic_filter, tx.clone()));
                    SubAckReturnCode::Granted(QoS::AtMostOnce)
                };
                let suback = SubAckPacket {
                    packet_id: subscribe.packet_id,
                    return_code,
                };
                let _ = tx.send(suback.into());
            }
            Packet::Publish(publish) => state.route(publish),
            Packet::PingReq(_) => {
                state.pings.fetch_add(1, Ordering::Relaxed);
                if !behaviour.ignore_pings {
                    let _ = tx.send(Packet::PingResp(PingRespPacket));
                }
            }
            Packet::Disconnect(_) => break,
            other => debug!("Fake broker ignoring {}", other.packet_type()),
        }
    }

    state.subscribers.remove(&id);
    drop(tx);
    let _ = writer_task.await;
    debug!("Fake broker closed connection {}", id);
}
