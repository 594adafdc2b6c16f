// Copyright (c) 2025, The Ruskit Authors
// MIT License
// All rights reserved.

//! # Broker Protocol Surface
//!
//! The delivery layer talks to the broker only through these traits. [`crate::channel`]
//! implements them over lapin for RabbitMQ, and [`crate::memory`] implements them in
//! process. Every channel is owned by a single task at a time: one per subscription and
//! one per publisher.

use crate::{errors::AmqpError, queue::QueueDefinition};
use async_trait::async_trait;
use futures_util::stream::BoxStream;
use std::collections::BTreeMap;

#[cfg(test)]
use mockall::automock;

/// Stream of deliveries for one consumer. It ends when the channel or its
/// connection is closed.
pub type DeliveryStream = BoxStream<'static, Result<Envelope, AmqpError>>;

/// A connection able to open independent channels.
#[cfg_attr(test, automock(type Channel = MockBrokerChannel;))]
#[async_trait]
pub trait BrokerConnection: Send + Sync {
    type Channel: BrokerChannel + 'static;

    async fn create_channel(&self) -> Result<Self::Channel, AmqpError>;
}

/// The broker operations the delivery layer issues on a channel.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait BrokerChannel: Send + Sync {
    /// Declares `def`. Redeclaring an identical queue is a no-op; redeclaring with
    /// different flags fails with the broker's reason.
    async fn queue_declare(&self, def: &QueueDefinition) -> Result<(), AmqpError>;

    async fn queue_bind(&self, queue: &str, exchange: &str, routing_key: &str)
        -> Result<(), AmqpError>;

    /// Limits the unacknowledged deliveries held by consumers created afterwards on
    /// this channel.
    async fn basic_qos(&self, prefetch_count: u16) -> Result<(), AmqpError>;

    /// Hands a message to the broker. Success means the broker accepted it for
    /// routing, not that any consumer received it.
    async fn basic_publish(
        &self,
        exchange: &str,
        routing_key: &str,
        message: OutboundMessage,
    ) -> Result<(), AmqpError>;

    async fn basic_consume(&self, queue: &str, consumer_tag: &str)
        -> Result<DeliveryStream, AmqpError>;
}

/// Settles one delivery. Each delivery is settled exactly once.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait DeliveryAcker: Send + Sync {
    /// Removes the message from the queue.
    async fn ack(&self) -> Result<(), AmqpError>;

    /// Rejects the message. With `requeue` it is redelivered later, otherwise it is
    /// dead-lettered (or dropped when the queue has no dead-letter target).
    async fn nack(&self, requeue: bool) -> Result<(), AmqpError>;
}

/// A message ready to be handed to the broker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub content_type: String,
    pub message_id: String,
    pub headers: BTreeMap<String, String>,
    pub payload: Vec<u8>,
}

/// A delivered message together with the handle that settles it.
pub struct Envelope {
    pub delivery_tag: u64,
    pub exchange: String,
    pub routing_key: String,
    pub redelivered: bool,
    pub content_type: Option<String>,
    pub headers: BTreeMap<String, String>,
    pub data: Vec<u8>,
    pub acker: Box<dyn DeliveryAcker>,
}

impl std::fmt::Debug for Envelope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Envelope")
            .field("delivery_tag", &self.delivery_tag)
            .field("exchange", &self.exchange)
            .field("routing_key", &self.routing_key)
            .field("redelivered", &self.redelivered)
            .field("content_type", &self.content_type)
            .field("len", &self.data.len())
            .finish()
    }
}
