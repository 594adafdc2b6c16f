// Copyright (c) 2025, The Ruskit Authors
// MIT License
// All rights reserved.

//! # Queue Definitions
//!
//! This module provides the types used to declare queues and bind them to exchanges.
//! A queue's flags are derived from its [`DurabilityMode`], so a durable queue is never
//! auto-delete or exclusive and a transient queue is always both.

use std::collections::BTreeMap;

/// Queue argument naming the exchange that receives rejected or expired messages
pub const AMQP_HEADERS_DEAD_LETTER_EXCHANGE: &str = "x-dead-letter-exchange";

/// How long a queue lives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DurabilityMode {
    /// Survives broker restarts and outlives its consumers
    #[default]
    Durable,
    /// Exclusive to the declaring connection and removed with its last consumer
    Transient,
}

/// Definition of a RabbitMQ queue with its configuration parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueDefinition {
    pub(crate) name: String,
    pub(crate) durable: bool,
    pub(crate) auto_delete: bool,
    pub(crate) exclusive: bool,
    pub(crate) dead_letter_exchange: Option<String>,
}

impl QueueDefinition {
    /// Creates a new queue definition whose flags follow `mode`.
    ///
    /// # Parameters
    /// * `name` - The name of the queue
    /// * `mode` - Durable or transient
    ///
    /// # Returns
    /// A new queue definition without a dead-letter target
    pub fn new(name: &str, mode: DurabilityMode) -> QueueDefinition {
        let durable = mode == DurabilityMode::Durable;

        QueueDefinition {
            name: name.to_owned(),
            durable,
            auto_delete: !durable,
            exclusive: !durable,
            dead_letter_exchange: None,
        }
    }

    /// Routes rejected messages to the given exchange.
    ///
    /// # Parameters
    /// * `exchange` - Name of the dead-letter exchange, expected to already exist
    ///
    /// # Returns
    /// Self for method chaining
    pub fn dead_letter_exchange(mut self, exchange: &str) -> Self {
        self.dead_letter_exchange = Some(exchange.to_owned());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_durable(&self) -> bool {
        self.durable
    }

    pub fn is_auto_delete(&self) -> bool {
        self.auto_delete
    }

    pub fn is_exclusive(&self) -> bool {
        self.exclusive
    }

    pub fn dead_letter_target(&self) -> Option<&str> {
        self.dead_letter_exchange.as_deref()
    }

    /// Broker-side declaration arguments (`x-*` keys).
    pub fn arguments(&self) -> BTreeMap<String, String> {
        let mut args = BTreeMap::new();

        if let Some(dlx) = &self.dead_letter_exchange {
            args.insert(AMQP_HEADERS_DEAD_LETTER_EXCHANGE.to_owned(), dlx.clone());
        }

        args
    }
}

/// Configuration for binding a queue to an exchange.
///
/// Queue bindings define how messages flow from exchanges to queues based on
/// routing keys and exchange types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueBinding<'qeb> {
    pub(crate) queue_name: &'qeb str,
    pub(crate) exchange_name: &'qeb str,
    pub(crate) routing_key: &'qeb str,
}

impl<'qeb> QueueBinding<'qeb> {
    /// Creates a new queue binding for the given queue.
    ///
    /// The exchange name and routing key start empty and are set with
    /// [`exchange`](Self::exchange) and [`routing_key`](Self::routing_key).
    pub fn new(queue: &'qeb str) -> QueueBinding<'qeb> {
        QueueBinding {
            queue_name: queue,
            exchange_name: "",
            routing_key: "",
        }
    }

    /// Sets the exchange to bind the queue to.
    pub fn exchange(mut self, exchange: &'qeb str) -> Self {
        self.exchange_name = exchange;
        self
    }

    /// Sets the routing key (or pattern, for topic exchanges) for the binding.
    pub fn routing_key(mut self, key: &'qeb str) -> Self {
        self.routing_key = key;
        self
    }
}
