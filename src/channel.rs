// Copyright (c) 2025, The Ruskit Authors
// MIT License
// All rights reserved.

//! # AMQP Connection and Channels
//!
//! This module binds the broker traits to RabbitMQ through lapin. `AmqpConnection`
//! dials the server from [`AmqpConfigs`] and opens one `AmqpChannel` per caller;
//! lapin's `Acker` settles the deliveries those channels produce.

use crate::{
    broker::{BrokerChannel, BrokerConnection, DeliveryAcker, DeliveryStream, Envelope, OutboundMessage},
    config::AmqpConfigs,
    errors::AmqpError,
    queue::QueueDefinition,
};
use async_trait::async_trait;
use futures_util::StreamExt;
use lapin::{
    acker::Acker,
    message::Delivery,
    options::{
        BasicAckOptions, BasicConsumeOptions, BasicNackOptions, BasicPublishOptions,
        BasicQosOptions, QueueBindOptions, QueueDeclareOptions,
    },
    types::{AMQPValue, FieldTable, LongString, ShortString},
    BasicProperties, Channel, Connection, ConnectionProperties,
};
use std::{collections::BTreeMap, sync::Arc};
use tracing::{debug, error};

/// A RabbitMQ connection shared by every channel opened from it.
#[derive(Clone)]
pub struct AmqpConnection {
    conn: Arc<Connection>,
}

impl AmqpConnection {
    /// Connects to RabbitMQ using the address, credentials and connection name in `cfg`.
    pub async fn connect(cfg: &AmqpConfigs) -> Result<AmqpConnection, AmqpError> {
        debug!("creating amqp connection...");
        let options = ConnectionProperties::default()
            .with_connection_name(LongString::from(cfg.connection_name.clone()));

        let conn = match Connection::connect(&cfg.uri(), options).await {
            Ok(c) => Ok(c),
            Err(err) => {
                error!(error = err.to_string(), host = cfg.host, "failure to connect");
                Err(AmqpError::ConnectionError(err.to_string()))
            }
        }?;
        debug!("amqp connected");

        Ok(AmqpConnection {
            conn: Arc::new(conn),
        })
    }

    /// Closes the connection, ending every consumer loop running on it.
    pub async fn close(&self) -> Result<(), AmqpError> {
        self.conn
            .close(200, "closing")
            .await
            .map_err(|err| AmqpError::ConnectionError(err.to_string()))
    }
}

#[async_trait]
impl BrokerConnection for AmqpConnection {
    type Channel = AmqpChannel;

    async fn create_channel(&self) -> Result<AmqpChannel, AmqpError> {
        debug!("creating amqp channel...");
        match self.conn.create_channel().await {
            Ok(channel) => {
                debug!("channel created");
                Ok(AmqpChannel { channel })
            }
            Err(err) => {
                error!(error = err.to_string(), "error to create the channel");
                Err(AmqpError::ChannelError(err.to_string()))
            }
        }
    }
}

/// A lapin channel implementing the broker operations.
#[derive(Clone)]
pub struct AmqpChannel {
    channel: Channel,
}

#[async_trait]
impl BrokerChannel for AmqpChannel {
    async fn queue_declare(&self, def: &QueueDefinition) -> Result<(), AmqpError> {
        match self
            .channel
            .queue_declare(
                &def.name,
                QueueDeclareOptions {
                    passive: false,
                    durable: def.durable,
                    exclusive: def.exclusive,
                    auto_delete: def.auto_delete,
                    nowait: false,
                },
                field_table(&def.arguments()),
            )
            .await
        {
            Err(err) => Err(AmqpError::DeclareQueueError(def.name.clone(), err.to_string())),
            _ => Ok(()),
        }
    }

    async fn queue_bind(
        &self,
        queue: &str,
        exchange: &str,
        routing_key: &str,
    ) -> Result<(), AmqpError> {
        self.channel
            .queue_bind(
                queue,
                exchange,
                routing_key,
                QueueBindOptions { nowait: false },
                FieldTable::default(),
            )
            .await
            .map_err(|err| AmqpError::BindingExchangeToQueueError {
                queue: queue.to_owned(),
                exchange: exchange.to_owned(),
                key: routing_key.to_owned(),
                reason: err.to_string(),
            })
    }

    async fn basic_qos(&self, prefetch_count: u16) -> Result<(), AmqpError> {
        self.channel
            .basic_qos(prefetch_count, BasicQosOptions { global: false })
            .await
            .map_err(|err| AmqpError::QoSDeclarationError(err.to_string()))
    }

    async fn basic_publish(
        &self,
        exchange: &str,
        routing_key: &str,
        message: OutboundMessage,
    ) -> Result<(), AmqpError> {
        let properties = BasicProperties::default()
            .with_content_type(ShortString::from(message.content_type))
            .with_message_id(ShortString::from(message.message_id))
            .with_headers(field_table(&message.headers));

        match self
            .channel
            .basic_publish(
                exchange,
                routing_key,
                BasicPublishOptions {
                    immediate: false,
                    mandatory: false,
                },
                &message.payload,
                properties,
            )
            .await
        {
            Err(err) => Err(AmqpError::PublishingError(err.to_string())),
            _ => Ok(()),
        }
    }

    async fn basic_consume(
        &self,
        queue: &str,
        consumer_tag: &str,
    ) -> Result<DeliveryStream, AmqpError> {
        let consumer = match self
            .channel
            .basic_consume(
                queue,
                consumer_tag,
                BasicConsumeOptions {
                    no_local: false,
                    no_ack: false,
                    exclusive: false,
                    nowait: false,
                },
                FieldTable::default(),
            )
            .await
        {
            Err(err) => {
                error!(error = err.to_string(), "error to create the consumer");
                Err(AmqpError::ConsumerDeclarationError(
                    queue.to_owned(),
                    err.to_string(),
                ))
            }
            Ok(c) => Ok(c),
        }?;

        Ok(consumer
            .map(|result| match result {
                Ok(delivery) => Ok(envelope(delivery)),
                Err(err) => Err(AmqpError::ConsumerError(err.to_string())),
            })
            .boxed())
    }
}

/// Settles lapin deliveries.
struct LapinAcker {
    acker: Acker,
}

#[async_trait]
impl DeliveryAcker for LapinAcker {
    async fn ack(&self) -> Result<(), AmqpError> {
        self.acker
            .ack(BasicAckOptions { multiple: false })
            .await
            .map(|_| ())
            .map_err(|err| AmqpError::AckMessageError(err.to_string()))
    }

    async fn nack(&self, requeue: bool) -> Result<(), AmqpError> {
        self.acker
            .nack(BasicNackOptions {
                multiple: false,
                requeue,
            })
            .await
            .map(|_| ())
            .map_err(|err| AmqpError::NackMessageError(err.to_string()))
    }
}

fn envelope(delivery: Delivery) -> Envelope {
    let headers = delivery
        .properties
        .headers()
        .as_ref()
        .map(string_headers)
        .unwrap_or_default();

    Envelope {
        delivery_tag: delivery.delivery_tag,
        exchange: delivery.exchange.to_string(),
        routing_key: delivery.routing_key.to_string(),
        redelivered: delivery.redelivered,
        content_type: delivery
            .properties
            .content_type()
            .as_ref()
            .map(|ct| ct.to_string()),
        headers,
        data: delivery.data,
        acker: Box::new(LapinAcker {
            acker: delivery.acker,
        }),
    }
}

/// Converts string headers or arguments to an AMQP field table of long strings.
fn field_table(values: &BTreeMap<String, String>) -> FieldTable {
    let mut btree = BTreeMap::<ShortString, AMQPValue>::default();

    for (key, value) in values {
        btree.insert(
            ShortString::from(key.clone()),
            AMQPValue::LongString(LongString::from(value.clone())),
        );
    }

    FieldTable::from(btree)
}

/// Keeps the string-valued entries of an AMQP field table.
fn string_headers(table: &FieldTable) -> BTreeMap<String, String> {
    table
        .inner()
        .iter()
        .filter_map(|(key, value)| {
            let value = match value {
                AMQPValue::LongString(v) => String::from_utf8_lossy(v.as_bytes()).into_owned(),
                AMQPValue::ShortString(v) => v.to_string(),
                _ => return None,
            };
            Some((key.to_string(), value))
        })
        .collect()
}
