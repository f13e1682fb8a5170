use std::collections::VecDeque;

use bytes::BytesMut;
use log::{debug, info, trace, warn};
use telemq_core::protocol::packets::{
    ConnectPacket, ConnectReturnCode, DisconnectPacket, Packet, PingReqPacket, PublishPacket,
    SubAckReturnCode, SubscribePacket,
};
use telemq_core::protocol::QoS;
use telemq_core::{ClientId, TopicName};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

use crate::config::BrokerConfig;
use crate::error::ClientError;
use crate::io::{packet_details, read_packet, write_packet};

/// One MQTT session over one TCP connection.
pub struct MqttConnection {
    socket: TcpStream,
    buffer: BytesMut,
    client_id: ClientId,
    session_present: bool,
    next_packet_id: u16,
    /// Packets that arrived while waiting for a specific acknowledgment
    pending: VecDeque<Packet>,
}

impl MqttConnection {
    /// Connect to the broker and return a connected client
    pub async fn connect(broker: &BrokerConfig, client_id: ClientId) -> Result<Self, ClientError> {
        let addr = broker.address();
        info!("Connecting to broker at {} as client '{}'", addr, client_id);

        let socket = TcpStream::connect(&addr).await?;
        socket.set_nodelay(true)?;
        debug!("TCP connection established to {}", addr);

        let mut connection = MqttConnection {
            socket,
            buffer: BytesMut::with_capacity(4096),
            client_id,
            session_present: false,
            next_packet_id: 1,
            pending: VecDeque::new(),
        };

        let connect = ConnectPacket::clean_session(connection.client_id.clone(), broker.keep_alive_secs);
        connection.send(&Packet::from(connect)).await?;

        let connack = match connection.read_required().await? {
            Packet::ConnAck(connack) => connack,
            other => {
                warn!("Expected CONNACK, got {}", other.packet_type());
                return Err(ClientError::UnexpectedPacket {
                    expected: telemq_core::protocol::PacketType::ConnAck,
                    actual: other.packet_type(),
                });
            }
        };
        if connack.return_code != ConnectReturnCode::Accepted {
            warn!("Connection refused for '{}': {}", connection.client_id, connack.return_code);
            return Err(ClientError::ConnectionRefused(connack.return_code));
        }

        connection.session_present = connack.session_present;
        info!(
            "Client '{}' connected, session present: {}",
            connection.client_id, connack.session_present
        );
        Ok(connection)
    }

    pub fn client_id(&self) -> &ClientId {
        &self.client_id
    }

    pub fn session_present(&self) -> bool {
        self.session_present
    }

    /// Publish a QoS 0 message. Completes once the frame is written.
    pub async fn publish(&mut self, topic: &TopicName, payload: Vec<u8>) -> Result<(), ClientError> {
        let packet = PublishPacket::at_most_once(topic.clone(), payload);
        self.send(&Packet::from(packet)).await
    }

    /// Subscribe to a single topic at QoS 0 and wait for the SUBACK.
    pub async fn subscribe(&mut self, topic: &TopicName) -> Result<(), ClientError> {
        let packet_id = self.allocate_packet_id();
        let subscribe = SubscribePacket {
            packet_id,
            topic_filter: topic.clone(),
            requested_qos: QoS::AtMostOnce,
        };
        self.send(&Packet::from(subscribe)).await?;

        loop {
            match self.read_required().await? {
                Packet::SubAck(suback) if suback.packet_id == packet_id => {
                    return match suback.return_code {
                        SubAckReturnCode::Granted(qos) => {
                            info!("Client '{}' subscribed to '{}' (granted {:?})", self.client_id, topic, qos);
                            Ok(())
                        }
                        SubAckReturnCode::Failure => Err(ClientError::SubscriptionRejected {
                            topic: topic.to_string(),
                        }),
                    };
                }
                other => {
                    trace!("Deferring {} received before SUBACK", other.packet_type());
                    self.pending.push_back(other);
                }
            }
        }
    }

    pub async fn ping(&mut self) -> Result<(), ClientError> {
        self.send(&Packet::PingReq(PingReqPacket)).await
    }

    /// Next packet from the broker, or `None` once the broker closed the
    /// connection. Cancel safe.
    pub async fn next_packet(&mut self) -> Result<Option<Packet>, ClientError> {
        if let Some(packet) = self.pending.pop_front() {
            return Ok(Some(packet));
        }
        let packet = read_packet(&mut self.socket, &mut self.buffer).await?;
        if let Some(packet) = &packet {
            let details = packet_details(packet);
            if details.is_empty() {
                debug!("'{}' received {}", self.client_id, packet.packet_type());
            } else {
                debug!("'{}' received {} ({})", self.client_id, packet.packet_type(), details);
            }
        }
        Ok(packet)
    }

    /// Send DISCONNECT and shut the socket down.
    pub async fn disconnect(&mut self) -> Result<(), ClientError> {
        info!("Client '{}' disconnecting from broker", self.client_id);
        self.send(&Packet::Disconnect(DisconnectPacket)).await?;
        self.socket.shutdown().await?;
        debug!("TCP socket shut down");
        Ok(())
    }

    async fn send(&mut self, packet: &Packet) -> Result<(), ClientError> {
        let details = packet_details(packet);
        if details.is_empty() {
            debug!("'{}' sending {}", self.client_id, packet.packet_type());
        } else {
            debug!("'{}' sending {} ({})", self.client_id, packet.packet_type(), details);
        }
        write_packet(&mut self.socket, packet).await
    }

    async fn read_required(&mut self) -> Result<Packet, ClientError> {
        read_packet(&mut self.socket, &mut self.buffer)
            .await?
            .ok_or(ClientError::ConnectionClosed)
    }

    fn allocate_packet_id(&mut self) -> u16 {
        let id = self.next_packet_id;
        self.next_packet_id = self.next_packet_id.checked_add(1).unwrap_or(1);
        id
    }
}
