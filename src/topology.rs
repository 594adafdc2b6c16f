// Copyright (c) 2025, The Ruskit Authors
// MIT License
// All rights reserved.

//! # Topology Management
//!
//! `AmqpTopology` declares a queue and binds it to an exchange on a fresh channel,
//! then hands that channel back for publishing or consuming.
//!
//! Every queue it declares routes rejected messages to the dead-letter exchange
//! (`peril_dlx` unless configured otherwise). That exchange, like every exchange the
//! queues bind to, is provisioned outside this crate.
//!
//! Declaration is idempotent: calling [`AmqpTopology::declare_and_bind`] again with the
//! same arguments redeclares an identical queue, which the broker treats as a no-op.

use crate::{
    broker::{BrokerChannel, BrokerConnection},
    errors::AmqpError,
    queue::{DurabilityMode, QueueBinding, QueueDefinition},
    routing::EXCHANGE_PERIL_DLX,
};
use tracing::{debug, error};

/// Declares queues and bindings on channels opened from one connection.
pub struct AmqpTopology<'tp, B> {
    connection: &'tp B,
    dead_letter_exchange: String,
}

impl<'tp, B> AmqpTopology<'tp, B>
where
    B: BrokerConnection,
{
    /// Creates a topology manager using the default dead-letter exchange.
    pub fn new(connection: &'tp B) -> AmqpTopology<'tp, B> {
        AmqpTopology {
            connection,
            dead_letter_exchange: EXCHANGE_PERIL_DLX.to_owned(),
        }
    }

    /// Sets the exchange rejected messages are routed to.
    pub fn dead_letter_exchange(mut self, exchange: &str) -> Self {
        self.dead_letter_exchange = exchange.to_owned();
        self
    }

    /// Declares `queue_name` with the flags implied by `mode` and binds it to
    /// `exchange` under `routing_key`.
    ///
    /// Every queue declared here dead-letters to this topology's exchange, so the
    /// dead-letter queue itself must be declared without it (or it would reject into
    /// itself).
    ///
    /// # Parameters
    /// * `exchange` - An existing exchange
    /// * `queue_name` - Non-empty queue name
    /// * `routing_key` - Non-empty binding key (a pattern for topic exchanges)
    /// * `mode` - Durable or transient
    ///
    /// # Returns
    /// The channel the declaration ran on, or the broker's rejection
    pub async fn declare_and_bind(
        &self,
        exchange: &str,
        queue_name: &str,
        routing_key: &str,
        mode: DurabilityMode,
    ) -> Result<B::Channel, AmqpError> {
        if queue_name.is_empty() {
            return Err(AmqpError::InvalidArgument("queue name is empty".to_owned()));
        }
        if routing_key.is_empty() {
            return Err(AmqpError::InvalidArgument("routing key is empty".to_owned()));
        }

        let channel = self.connection.create_channel().await?;

        let def =
            QueueDefinition::new(queue_name, mode).dead_letter_exchange(&self.dead_letter_exchange);
        let binding = QueueBinding::new(queue_name)
            .exchange(exchange)
            .routing_key(routing_key);

        self.install_queue(&channel, &def).await?;
        self.binding_queue(&channel, &binding).await?;

        Ok(channel)
    }

    async fn install_queue(
        &self,
        channel: &B::Channel,
        def: &QueueDefinition,
    ) -> Result<(), AmqpError> {
        debug!(
            queue = def.name,
            durable = def.durable,
            dead_letter_exchange = self.dead_letter_exchange,
            "declaring queue"
        );

        channel.queue_declare(def).await.inspect_err(|err| {
            error!(error = err.to_string(), queue = def.name, "failure to declare queue");
        })?;

        debug!(queue = def.name, "queue was declared");

        Ok(())
    }

    async fn binding_queue(
        &self,
        channel: &B::Channel,
        binding: &QueueBinding<'_>,
    ) -> Result<(), AmqpError> {
        debug!(
            "binding queue: {} to the exchange: {} with the key: {}",
            binding.queue_name, binding.exchange_name, binding.routing_key
        );

        channel
            .queue_bind(binding.queue_name, binding.exchange_name, binding.routing_key)
            .await
            .inspect_err(|err| {
                error!(error = err.to_string(), "error to bind queue to exchange");
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        broker::{MockBrokerChannel, MockBrokerConnection},
        errors::ErrorKind,
    };
    use mockall::{predicate::eq, Sequence};

    fn connection_with(channel: MockBrokerChannel) -> MockBrokerConnection {
        let mut connection = MockBrokerConnection::new();
        let mut channel = Some(channel);
        connection
            .expect_create_channel()
            .times(1)
            .returning(move || Ok(channel.take().expect("single channel")));
        connection
    }

    #[tokio::test]
    async fn declares_then_binds_with_dead_letter_target() {
        let mut seq = Sequence::new();
        let mut channel = MockBrokerChannel::new();
        channel
            .expect_queue_declare()
            .withf(|def| {
                def.name() == "pause.alice"
                    && !def.is_durable()
                    && def.is_auto_delete()
                    && def.is_exclusive()
                    && def.dead_letter_target() == Some("peril_dlx")
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        channel
            .expect_queue_bind()
            .with(eq("pause.alice"), eq("peril_direct"), eq("pause"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(()));

        let connection = connection_with(channel);
        AmqpTopology::new(&connection)
            .declare_and_bind("peril_direct", "pause.alice", "pause", DurabilityMode::Transient)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn custom_dead_letter_exchange_is_used() {
        let mut channel = MockBrokerChannel::new();
        channel
            .expect_queue_declare()
            .withf(|def| def.is_durable() && def.dead_letter_target() == Some("custom_dlx"))
            .times(1)
            .returning(|_| Ok(()));
        channel
            .expect_queue_bind()
            .times(1)
            .returning(|_, _, _| Ok(()));

        let connection = connection_with(channel);
        AmqpTopology::new(&connection)
            .dead_letter_exchange("custom_dlx")
            .declare_and_bind("peril_topic", "game_logs", "game_logs.*", DurabilityMode::Durable)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn empty_names_are_rejected_before_touching_the_broker() {
        let mut connection = MockBrokerConnection::new();
        connection.expect_create_channel().never();
        let topology = AmqpTopology::new(&connection);

        let err = topology
            .declare_and_bind("peril_direct", "", "pause", DurabilityMode::Durable)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        let err = topology
            .declare_and_bind("peril_direct", "pause", "", DurabilityMode::Durable)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[tokio::test]
    async fn broker_rejection_is_surfaced_and_nothing_is_bound() {
        let reason = "PRECONDITION_FAILED - inequivalent arg 'durable' for queue 'game_logs'";
        let mut channel = MockBrokerChannel::new();
        channel.expect_queue_declare().times(1).returning(move |def| {
            Err(AmqpError::DeclareQueueError(
                def.name().to_owned(),
                reason.to_owned(),
            ))
        });
        channel.expect_queue_bind().never();

        let connection = connection_with(channel);
        let err = AmqpTopology::new(&connection)
            .declare_and_bind("peril_topic", "game_logs", "game_logs.*", DurabilityMode::Durable)
            .await
            .unwrap_err();

        assert_eq!(
            err,
            AmqpError::DeclareQueueError("game_logs".into(), reason.into())
        );
        assert_eq!(err.kind(), ErrorKind::Topology);
    }

    #[tokio::test]
    async fn unusable_connection_is_surfaced() {
        let mut connection = MockBrokerConnection::new();
        connection
            .expect_create_channel()
            .times(1)
            .returning(|| Err(AmqpError::ConnectionError("connection closed".into())));

        let err = AmqpTopology::new(&connection)
            .declare_and_bind("peril_direct", "pause.alice", "pause", DurabilityMode::Transient)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Connectivity);
    }
}
