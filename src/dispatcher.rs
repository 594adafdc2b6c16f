// Copyright (c) 2025, The Ruskit Authors
// MIT License
// All rights reserved.

//! # Subscription Dispatcher
//!
//! `RabbitMQDispatcher` registers typed handlers on queues. Each subscription gets its
//! own channel, its own prefetch limit and its own task running the consumer loop, so a
//! slow handler only throttles its own subscription.
//!
//! Setup failures (declaring, binding, qos, registering the consumer) are returned from
//! [`RabbitMQDispatcher::subscribe`]. Once the loop runs, per-message failures are
//! handled inside it and never reach the caller.

use crate::{
    broker::{BrokerChannel, BrokerConnection},
    codec::Codec,
    config::AmqpConfigs,
    consumer,
    errors::AmqpError,
    handler::ConsumerHandler,
    queue::DurabilityMode,
    routing::EXCHANGE_PERIL_DLX,
    topology::AmqpTopology,
};
use serde::de::DeserializeOwned;
use tokio::task::JoinHandle;
use tracing::{error, info};
use uuid::Uuid;

/// Default number of unacknowledged deliveries per subscription
pub const DEFAULT_PREFETCH_COUNT: u16 = 10;

pub struct RabbitMQDispatcher<B> {
    connection: B,
    prefetch_count: u16,
    dead_letter_exchange: String,
}

impl<B> RabbitMQDispatcher<B>
where
    B: BrokerConnection,
{
    /// Creates a dispatcher with the default prefetch limit and dead-letter exchange.
    pub fn new(connection: B) -> Self {
        RabbitMQDispatcher {
            connection,
            prefetch_count: DEFAULT_PREFETCH_COUNT,
            dead_letter_exchange: EXCHANGE_PERIL_DLX.to_owned(),
        }
    }

    /// Creates a dispatcher using the prefetch limit and dead-letter exchange in `cfg`.
    pub fn from_configs(connection: B, cfg: &AmqpConfigs) -> Self {
        RabbitMQDispatcher::new(connection)
            .prefetch(cfg.prefetch_count)
            .dead_letter_exchange(&cfg.dead_letter_exchange)
    }

    /// Sets the maximum number of unacknowledged deliveries per subscription.
    pub fn prefetch(mut self, prefetch_count: u16) -> Self {
        self.prefetch_count = prefetch_count;
        self
    }

    pub fn dead_letter_exchange(mut self, exchange: &str) -> Self {
        self.dead_letter_exchange = exchange.to_owned();
        self
    }

    /// Declares and binds `queue_name`, then starts a consumer loop that decodes each
    /// delivery with `codec` and settles it according to `handler`'s disposition.
    ///
    /// # Parameters
    /// * `exchange` - Exchange the queue is bound to
    /// * `queue_name` - Queue to declare and consume
    /// * `routing_key` - Binding key (a pattern for topic exchanges)
    /// * `mode` - Durable or transient queue
    /// * `codec` - Decoder for this subscription's payloads
    /// * `handler` - Called once per decoded delivery, in delivery order
    ///
    /// # Returns
    /// The handle of the loop's task, which finishes when the channel or connection
    /// closes, or the setup error
    pub async fn subscribe<T, C, H>(
        &self,
        exchange: &str,
        queue_name: &str,
        routing_key: &str,
        mode: DurabilityMode,
        codec: C,
        handler: H,
    ) -> Result<JoinHandle<()>, AmqpError>
    where
        T: DeserializeOwned + Send + 'static,
        C: Codec,
        H: ConsumerHandler<T> + 'static,
    {
        if self.prefetch_count == 0 {
            return Err(AmqpError::InvalidArgument(
                "prefetch count must be at least 1".to_owned(),
            ));
        }

        let channel = AmqpTopology::new(&self.connection)
            .dead_letter_exchange(&self.dead_letter_exchange)
            .declare_and_bind(exchange, queue_name, routing_key, mode)
            .await?;

        if let Err(err) = channel.basic_qos(self.prefetch_count).await {
            error!(
                error = err.to_string(),
                queue = queue_name,
                "failure to configure qos"
            );
            return Err(err);
        }

        let consumer_tag = format!("{}-{}", queue_name, Uuid::new_v4());
        let deliveries = match channel.basic_consume(queue_name, &consumer_tag).await {
            Err(err) => {
                error!(
                    error = err.to_string(),
                    queue = queue_name,
                    "failure to create the consumer"
                );
                return Err(err);
            }
            Ok(deliveries) => deliveries,
        };

        info!(
            exchange,
            queue = queue_name,
            routing_key,
            consumer_tag,
            prefetch = self.prefetch_count,
            "subscribed"
        );

        let queue = queue_name.to_owned();
        Ok(tokio::spawn(async move {
            // the channel lives as long as its consumer loop
            let _channel = channel;
            consumer::run::<T, C, H>(queue, deliveries, codec, handler).await;
        }))
    }
}
