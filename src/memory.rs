// Copyright (c) 2025, The Ruskit Authors
// MIT License
// All rights reserved.

//! # In-Memory Broker
//!
//! `MemoryBroker` implements the broker traits in process, for tests and for running
//! publishers and subscribers without a RabbitMQ server. It follows the AMQP 0-9-1
//! behaviour the delivery layer relies on:
//!
//! - exchanges are declared up front and route by [`ExchangeKind`]; `""` is the default
//!   exchange, which routes to the queue named by the routing key
//! - queue declaration is idempotent and refuses a redeclaration with other flags
//! - a consumer holds at most `prefetch_count` unacknowledged deliveries; consumers of
//!   one queue are served round-robin
//! - a requeued message goes back to the head of its queue, flagged as redelivered
//! - a message rejected without requeue is published to the queue's dead-letter
//!   exchange, or dropped when the queue has none
//! - closing a channel cancels its consumers and requeues what they held; closing the
//!   broker ends every consumer

use crate::{
    broker::{
        BrokerChannel, BrokerConnection, DeliveryAcker, DeliveryStream, Envelope, OutboundMessage,
    },
    errors::AmqpError,
    exchange::{ExchangeDefinition, ExchangeKind},
    queue::QueueDefinition,
};
use async_trait::async_trait;
use futures_util::{stream, StreamExt};
use parking_lot::Mutex;
use std::{
    collections::{BTreeMap, HashMap, VecDeque},
    sync::{
        atomic::{AtomicBool, AtomicU16, Ordering},
        Arc, Weak,
    },
};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Header naming the queue a dead-lettered message was rejected from
pub const HEADER_FIRST_DEATH_QUEUE: &str = "x-first-death-queue";
/// Header naming why a message was dead-lettered
pub const HEADER_FIRST_DEATH_REASON: &str = "x-first-death-reason";

type Shared = Arc<Mutex<BrokerState>>;

/// An AMQP-like broker living in this process. Clones share the same state.
#[derive(Clone, Default)]
pub struct MemoryBroker {
    state: Shared,
}

#[derive(Default)]
struct BrokerState {
    closed: bool,
    exchanges: HashMap<String, ExchangeKind>,
    queues: HashMap<String, MemoryQueue>,
    bindings: Vec<Binding>,
    next_channel_id: u64,
    next_consumer_id: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Binding {
    queue: String,
    exchange: String,
    routing_key: String,
}

#[derive(Debug, Clone)]
struct StoredMessage {
    exchange: String,
    routing_key: String,
    redelivered: bool,
    message: OutboundMessage,
}

struct Unacked {
    message: StoredMessage,
    consumer_id: u64,
}

struct ConsumerSlot {
    id: u64,
    channel_id: u64,
    prefetch: u16,
    outstanding: usize,
    sender: mpsc::UnboundedSender<Result<Envelope, AmqpError>>,
}

impl ConsumerSlot {
    fn has_capacity(&self) -> bool {
        self.prefetch == 0 || self.outstanding < usize::from(self.prefetch)
    }
}

struct MemoryQueue {
    def: QueueDefinition,
    ready: VecDeque<StoredMessage>,
    unacked: BTreeMap<u64, Unacked>,
    consumers: Vec<ConsumerSlot>,
    next_delivery_tag: u64,
    peak_unacked: usize,
}

impl MemoryQueue {
    fn new(def: QueueDefinition) -> Self {
        MemoryQueue {
            def,
            ready: VecDeque::new(),
            unacked: BTreeMap::new(),
            consumers: vec![],
            next_delivery_tag: 1,
            peak_unacked: 0,
        }
    }

    /// Pushes ready messages to consumers with spare prefetch capacity.
    fn dispatch(&mut self, handle: &Weak<Mutex<BrokerState>>) {
        while !self.ready.is_empty() {
            let Some(idx) = self.consumers.iter().position(ConsumerSlot::has_capacity) else {
                break;
            };
            let Some(stored) = self.ready.pop_front() else {
                break;
            };

            let delivery_tag = self.next_delivery_tag;
            self.next_delivery_tag += 1;

            let envelope = Envelope {
                delivery_tag,
                exchange: stored.exchange.clone(),
                routing_key: stored.routing_key.clone(),
                redelivered: stored.redelivered,
                content_type: Some(stored.message.content_type.clone()),
                headers: stored.message.headers.clone(),
                data: stored.message.payload.clone(),
                acker: Box::new(MemoryAcker {
                    state: handle.clone(),
                    queue: self.def.name.clone(),
                    delivery_tag,
                }),
            };

            let consumer = self.consumers.remove(idx);
            if consumer.sender.send(Ok(envelope)).is_err() {
                // receiver dropped without a close: forget the consumer, keep the message
                debug!(queue = self.def.name, consumer = consumer.id, "consumer gone");
                self.ready.push_front(stored);
                continue;
            }

            let mut consumer = consumer;
            consumer.outstanding += 1;
            self.unacked.insert(
                delivery_tag,
                Unacked {
                    message: stored,
                    consumer_id: consumer.id,
                },
            );
            self.peak_unacked = self.peak_unacked.max(self.unacked.len());
            // round-robin: the consumer just served goes to the back
            self.consumers.push(consumer);
        }
    }

    /// Removes `delivery_tag` from the unacked set and frees its consumer's slot.
    fn settle(&mut self, delivery_tag: u64) -> Option<StoredMessage> {
        let unacked = self.unacked.remove(&delivery_tag)?;
        if let Some(consumer) = self
            .consumers
            .iter_mut()
            .find(|c| c.id == unacked.consumer_id)
        {
            consumer.outstanding = consumer.outstanding.saturating_sub(1);
        }
        Some(unacked.message)
    }
}

impl BrokerState {
    fn ensure_open(&self) -> Result<(), AmqpError> {
        if self.closed {
            return Err(AmqpError::ConnectionError("connection closed".to_owned()));
        }
        Ok(())
    }

    /// Queues bound to `exchange` whose binding matches `routing_key`.
    fn route(&self, exchange: &str, routing_key: &str) -> Result<Vec<String>, String> {
        if exchange.is_empty() {
            return Ok(self
                .queues
                .contains_key(routing_key)
                .then(|| vec![routing_key.to_owned()])
                .unwrap_or_default());
        }

        let Some(kind) = self.exchanges.get(exchange) else {
            return Err(format!("NOT_FOUND - no exchange '{}' in vhost '/'", exchange));
        };

        let mut targets: Vec<String> = vec![];
        for binding in self.bindings.iter().filter(|b| b.exchange == exchange) {
            if kind.matches(&binding.routing_key, routing_key) && !targets.contains(&binding.queue)
            {
                targets.push(binding.queue.clone());
            }
        }

        Ok(targets)
    }

    fn deliver(
        &mut self,
        handle: &Weak<Mutex<BrokerState>>,
        exchange: &str,
        routing_key: &str,
        message: OutboundMessage,
    ) -> Result<usize, String> {
        let targets = self.route(exchange, routing_key)?;

        for name in &targets {
            if let Some(queue) = self.queues.get_mut(name) {
                queue.ready.push_back(StoredMessage {
                    exchange: exchange.to_owned(),
                    routing_key: routing_key.to_owned(),
                    redelivered: false,
                    message: message.clone(),
                });
                queue.dispatch(handle);
            }
        }

        Ok(targets.len())
    }

    /// Republishes a rejected message to its queue's dead-letter exchange.
    fn dead_letter(&mut self, handle: &Weak<Mutex<BrokerState>>, queue: &str, stored: StoredMessage) {
        let Some(dlx) = self
            .queues
            .get(queue)
            .and_then(|q| q.def.dead_letter_exchange.clone())
        else {
            debug!(queue, "rejected message dropped, no dead-letter exchange");
            return;
        };

        let mut message = stored.message;
        message
            .headers
            .insert(HEADER_FIRST_DEATH_QUEUE.to_owned(), queue.to_owned());
        message
            .headers
            .insert(HEADER_FIRST_DEATH_REASON.to_owned(), "rejected".to_owned());

        if let Err(reason) = self.deliver(handle, &dlx, &stored.routing_key, message) {
            warn!(queue, dead_letter_exchange = dlx, reason, "dead-lettering failed");
        }
    }

    /// Cancels the consumers matched by `cancelled`, requeues what they held and
    /// deletes auto-delete queues left without consumers.
    fn cancel_consumers(
        &mut self,
        handle: &Weak<Mutex<BrokerState>>,
        cancelled: impl Fn(&ConsumerSlot) -> bool,
    ) {
        let mut emptied = vec![];

        for (name, queue) in self.queues.iter_mut() {
            let before = queue.consumers.len();
            let gone: Vec<u64> = queue
                .consumers
                .iter()
                .filter(|c| cancelled(*c))
                .map(|c| c.id)
                .collect();
            queue.consumers.retain(|c| !gone.contains(&c.id));

            let held: Vec<u64> = queue
                .unacked
                .iter()
                .filter(|(_, u)| gone.contains(&u.consumer_id))
                .map(|(tag, _)| *tag)
                .collect();
            // push back newest first so the oldest ends up at the head
            for tag in held.into_iter().rev() {
                if let Some(unacked) = queue.unacked.remove(&tag) {
                    let mut stored = unacked.message;
                    stored.redelivered = true;
                    queue.ready.push_front(stored);
                }
            }

            if before > 0 && queue.consumers.is_empty() && queue.def.auto_delete {
                emptied.push(name.clone());
            } else {
                queue.dispatch(handle);
            }
        }

        for name in emptied {
            debug!(queue = name, "auto-delete queue removed");
            self.queues.remove(&name);
            self.bindings.retain(|b| b.queue != name);
        }
    }
}

impl MemoryBroker {
    pub fn new() -> MemoryBroker {
        MemoryBroker::default()
    }

    fn handle(&self) -> Weak<Mutex<BrokerState>> {
        Arc::downgrade(&self.state)
    }

    /// Provisions an exchange. Redeclaring with the same kind is a no-op.
    pub fn declare_exchange(&self, def: &ExchangeDefinition) -> Result<(), AmqpError> {
        let mut state = self.state.lock();
        state.ensure_open()?;

        match state.exchanges.get(&def.name) {
            Some(kind) if *kind != def.kind => Err(AmqpError::ChannelError(format!(
                "PRECONDITION_FAILED - inequivalent arg 'type' for exchange '{}'",
                def.name
            ))),
            Some(_) => Ok(()),
            None => {
                state.exchanges.insert(def.name.clone(), def.kind);
                Ok(())
            }
        }
    }

    /// Messages waiting for delivery, or `None` if the queue does not exist.
    pub fn message_count(&self, queue: &str) -> Option<usize> {
        self.state.lock().queues.get(queue).map(|q| q.ready.len())
    }

    /// Messages delivered but not yet settled, or `None` if the queue does not exist.
    pub fn unacked_count(&self, queue: &str) -> Option<usize> {
        self.state.lock().queues.get(queue).map(|q| q.unacked.len())
    }

    /// The largest number of simultaneously unsettled deliveries seen on `queue`.
    pub fn peak_unacked(&self, queue: &str) -> Option<usize> {
        self.state.lock().queues.get(queue).map(|q| q.peak_unacked)
    }

    pub fn consumer_count(&self, queue: &str) -> Option<usize> {
        self.state.lock().queues.get(queue).map(|q| q.consumers.len())
    }

    pub fn queue_definition(&self, queue: &str) -> Option<QueueDefinition> {
        self.state.lock().queues.get(queue).map(|q| q.def.clone())
    }

    pub fn binding_count(&self, queue: &str) -> usize {
        self.state
            .lock()
            .bindings
            .iter()
            .filter(|b| b.queue == queue)
            .count()
    }

    /// Closes the broker: every delivery stream ends and exclusive or auto-delete
    /// queues are removed.
    pub fn close(&self) {
        let handle = self.handle();
        let mut state = self.state.lock();
        state.closed = true;
        state.cancel_consumers(&handle, |_| true);

        let gone: Vec<String> = state
            .queues
            .iter()
            .filter(|(_, q)| q.def.exclusive || q.def.auto_delete)
            .map(|(name, _)| name.clone())
            .collect();
        for name in gone {
            state.queues.remove(&name);
            state.bindings.retain(|b| b.queue != name);
        }
    }
}

#[async_trait]
impl BrokerConnection for MemoryBroker {
    type Channel = MemoryChannel;

    async fn create_channel(&self) -> Result<MemoryChannel, AmqpError> {
        let mut state = self.state.lock();
        state.ensure_open()?;
        state.next_channel_id += 1;

        Ok(MemoryChannel {
            id: state.next_channel_id,
            state: self.state.clone(),
            prefetch: AtomicU16::new(0),
            closed: AtomicBool::new(false),
        })
    }
}

/// A channel on a [`MemoryBroker`].
pub struct MemoryChannel {
    id: u64,
    state: Shared,
    prefetch: AtomicU16,
    closed: AtomicBool,
}

impl MemoryChannel {
    fn ensure_open(&self, state: &BrokerState) -> Result<(), AmqpError> {
        state.ensure_open()?;
        if self.closed.load(Ordering::SeqCst) {
            return Err(AmqpError::ChannelError("channel closed".to_owned()));
        }
        Ok(())
    }

    /// Closes the channel: its consumers are cancelled and their unacknowledged
    /// messages requeued.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        let handle = Arc::downgrade(&self.state);
        let channel_id = self.id;
        self.state
            .lock()
            .cancel_consumers(&handle, |c| c.channel_id == channel_id);
    }
}

impl Drop for MemoryChannel {
    fn drop(&mut self) {
        self.close();
    }
}

fn inequivalent(existing: &QueueDefinition, def: &QueueDefinition) -> Option<&'static str> {
    if existing.durable != def.durable {
        Some("durable")
    } else if existing.auto_delete != def.auto_delete {
        Some("auto_delete")
    } else if existing.exclusive != def.exclusive {
        Some("exclusive")
    } else if existing.dead_letter_exchange != def.dead_letter_exchange {
        Some("x-dead-letter-exchange")
    } else {
        None
    }
}

#[async_trait]
impl BrokerChannel for MemoryChannel {
    async fn queue_declare(&self, def: &QueueDefinition) -> Result<(), AmqpError> {
        let mut state = self.state.lock();
        self.ensure_open(&state)
            .map_err(|err| AmqpError::DeclareQueueError(def.name.clone(), err.to_string()))?;

        if let Some(existing) = state.queues.get(&def.name) {
            return match inequivalent(&existing.def, def) {
                Some(field) => Err(AmqpError::DeclareQueueError(
                    def.name.clone(),
                    format!(
                        "PRECONDITION_FAILED - inequivalent arg '{}' for queue '{}' in vhost '/'",
                        field, def.name
                    ),
                )),
                None => Ok(()),
            };
        }

        state
            .queues
            .insert(def.name.clone(), MemoryQueue::new(def.clone()));
        Ok(())
    }

    async fn queue_bind(
        &self,
        queue: &str,
        exchange: &str,
        routing_key: &str,
    ) -> Result<(), AmqpError> {
        let mut state = self.state.lock();
        let fail = |reason: String| AmqpError::BindingExchangeToQueueError {
            queue: queue.to_owned(),
            exchange: exchange.to_owned(),
            key: routing_key.to_owned(),
            reason,
        };

        self.ensure_open(&state).map_err(|err| fail(err.to_string()))?;

        if exchange.is_empty() {
            return Err(fail(
                "ACCESS_REFUSED - operation not permitted on the default exchange".to_owned(),
            ));
        }
        if !state.exchanges.contains_key(exchange) {
            return Err(fail(format!(
                "NOT_FOUND - no exchange '{}' in vhost '/'",
                exchange
            )));
        }
        if !state.queues.contains_key(queue) {
            return Err(fail(format!("NOT_FOUND - no queue '{}' in vhost '/'", queue)));
        }

        let binding = Binding {
            queue: queue.to_owned(),
            exchange: exchange.to_owned(),
            routing_key: routing_key.to_owned(),
        };
        if !state.bindings.contains(&binding) {
            state.bindings.push(binding);
        }

        Ok(())
    }

    async fn basic_qos(&self, prefetch_count: u16) -> Result<(), AmqpError> {
        let state = self.state.lock();
        self.ensure_open(&state)
            .map_err(|err| AmqpError::QoSDeclarationError(err.to_string()))?;
        self.prefetch.store(prefetch_count, Ordering::SeqCst);
        Ok(())
    }

    async fn basic_publish(
        &self,
        exchange: &str,
        routing_key: &str,
        message: OutboundMessage,
    ) -> Result<(), AmqpError> {
        let handle = Arc::downgrade(&self.state);
        let mut state = self.state.lock();
        self.ensure_open(&state)
            .map_err(|err| AmqpError::PublishingError(err.to_string()))?;

        let routed = state
            .deliver(&handle, exchange, routing_key, message)
            .map_err(AmqpError::PublishingError)?;
        if routed == 0 {
            debug!(exchange, routing_key, "message unroutable, dropped");
        }

        Ok(())
    }

    async fn basic_consume(
        &self,
        queue: &str,
        consumer_tag: &str,
    ) -> Result<DeliveryStream, AmqpError> {
        let handle = Arc::downgrade(&self.state);
        let mut state = self.state.lock();
        self.ensure_open(&state)
            .map_err(|err| AmqpError::ConsumerDeclarationError(queue.to_owned(), err.to_string()))?;

        state.next_consumer_id += 1;
        let consumer_id = state.next_consumer_id;
        let (sender, receiver) = mpsc::unbounded_channel();

        let Some(target) = state.queues.get_mut(queue) else {
            return Err(AmqpError::ConsumerDeclarationError(
                queue.to_owned(),
                format!("NOT_FOUND - no queue '{}' in vhost '/'", queue),
            ));
        };

        target.consumers.push(ConsumerSlot {
            id: consumer_id,
            channel_id: self.id,
            prefetch: self.prefetch.load(Ordering::SeqCst),
            outstanding: 0,
            sender,
        });
        target.dispatch(&handle);

        debug!(queue, consumer_tag, "consumer registered");

        Ok(stream::unfold(receiver, |mut receiver| async move {
            receiver.recv().await.map(|item| (item, receiver))
        })
        .boxed())
    }
}

/// Settles one delivery of a [`MemoryBroker`] queue.
struct MemoryAcker {
    state: Weak<Mutex<BrokerState>>,
    queue: String,
    delivery_tag: u64,
}

impl MemoryAcker {
    fn settle(&self, requeue: Option<bool>) -> Result<(), String> {
        let state = self
            .state
            .upgrade()
            .ok_or_else(|| "connection closed".to_owned())?;
        let mut state = state.lock();
        if state.closed {
            return Err("connection closed".to_owned());
        }

        let unknown = || {
            format!(
                "PRECONDITION_FAILED - unknown delivery tag {}",
                self.delivery_tag
            )
        };
        let queue = state.queues.get_mut(&self.queue).ok_or_else(unknown)?;
        let mut stored = queue.settle(self.delivery_tag).ok_or_else(unknown)?;

        match requeue {
            None => queue.dispatch(&self.state),
            Some(true) => {
                stored.redelivered = true;
                queue.ready.push_front(stored);
                queue.dispatch(&self.state);
            }
            Some(false) => {
                queue.dispatch(&self.state);
                state.dead_letter(&self.state, &self.queue, stored);
            }
        }

        Ok(())
    }
}

#[async_trait]
impl DeliveryAcker for MemoryAcker {
    async fn ack(&self) -> Result<(), AmqpError> {
        self.settle(None).map_err(AmqpError::AckMessageError)
    }

    async fn nack(&self, requeue: bool) -> Result<(), AmqpError> {
        self.settle(Some(requeue))
            .map_err(AmqpError::NackMessageError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::DurabilityMode;

    fn message(body: &str) -> OutboundMessage {
        OutboundMessage {
            content_type: "text/plain".into(),
            message_id: body.into(),
            headers: BTreeMap::new(),
            payload: body.as_bytes().to_vec(),
        }
    }

    async fn setup() -> (MemoryBroker, MemoryChannel) {
        let broker = MemoryBroker::new();
        broker
            .declare_exchange(&ExchangeDefinition::new("peril_topic").topic())
            .unwrap();
        broker
            .declare_exchange(&ExchangeDefinition::new("peril_dlx").fanout())
            .unwrap();
        let channel = broker.create_channel().await.unwrap();
        (broker, channel)
    }

    #[tokio::test]
    async fn redeclaring_with_other_flags_is_refused() {
        let (broker, channel) = setup().await;
        let durable = QueueDefinition::new("game_logs", DurabilityMode::Durable);
        channel.queue_declare(&durable).await.unwrap();
        channel.queue_declare(&durable).await.unwrap();

        let err = channel
            .queue_declare(&QueueDefinition::new("game_logs", DurabilityMode::Transient))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("inequivalent arg 'durable'"));
        assert_eq!(broker.queue_definition("game_logs"), Some(durable));
    }

    #[tokio::test]
    async fn binding_requires_existing_exchange_and_queue() {
        let (_broker, channel) = setup().await;
        let def = QueueDefinition::new("q", DurabilityMode::Durable);
        channel.queue_declare(&def).await.unwrap();

        let err = channel.queue_bind("q", "nope", "k").await.unwrap_err();
        assert!(err.to_string().contains("no exchange 'nope'"));

        let err = channel.queue_bind("missing", "peril_topic", "k").await.unwrap_err();
        assert!(err.to_string().contains("no queue 'missing'"));

        let err = channel.queue_bind("q", "", "q").await.unwrap_err();
        assert!(err.to_string().contains("ACCESS_REFUSED"));
    }

    #[tokio::test]
    async fn publishing_to_unknown_exchange_fails() {
        let (_broker, channel) = setup().await;

        let err = channel
            .basic_publish("nope", "k", message("m"))
            .await
            .unwrap_err();
        assert!(matches!(err, AmqpError::PublishingError(_)));
    }

    #[tokio::test]
    async fn default_exchange_routes_by_queue_name() {
        let (broker, channel) = setup().await;
        channel
            .queue_declare(&QueueDefinition::new("direct_q", DurabilityMode::Durable))
            .await
            .unwrap();

        channel
            .basic_publish("", "direct_q", message("m"))
            .await
            .unwrap();
        assert_eq!(broker.message_count("direct_q"), Some(1));
    }

    #[tokio::test]
    async fn rejected_message_goes_to_dead_letter_exchange() {
        let (broker, channel) = setup().await;
        let dlq = QueueDefinition::new("peril_dlq", DurabilityMode::Durable);
        channel.queue_declare(&dlq).await.unwrap();
        channel.queue_bind("peril_dlq", "peril_dlx", "").await.unwrap();

        let def = QueueDefinition::new("moves", DurabilityMode::Durable).dead_letter_exchange("peril_dlx");
        channel.queue_declare(&def).await.unwrap();
        channel
            .queue_bind("moves", "peril_topic", "army_moves.*")
            .await
            .unwrap();
        channel
            .basic_publish("peril_topic", "army_moves.alice", message("m"))
            .await
            .unwrap();

        channel.basic_qos(1).await.unwrap();
        let mut deliveries = channel.basic_consume("moves", "t").await.unwrap();
        let envelope = deliveries.next().await.unwrap().unwrap();
        envelope.acker.nack(false).await.unwrap();

        assert_eq!(broker.message_count("moves"), Some(0));
        assert_eq!(broker.unacked_count("moves"), Some(0));
        assert_eq!(broker.message_count("peril_dlq"), Some(1));

        let err = envelope.acker.ack().await.unwrap_err();
        assert!(err.to_string().contains("unknown delivery tag"));
    }

    #[tokio::test]
    async fn closing_a_channel_requeues_and_removes_auto_delete_queues() {
        let (broker, publisher) = setup().await;
        let consumer = broker.create_channel().await.unwrap();

        let durable = QueueDefinition::new("logs", DurabilityMode::Durable);
        let transient = QueueDefinition::new("moves.alice", DurabilityMode::Transient);
        for def in [&durable, &transient] {
            consumer.queue_declare(def).await.unwrap();
            consumer
                .queue_bind(def.name(), "peril_topic", "#")
                .await
                .unwrap();
        }
        publisher
            .basic_publish("peril_topic", "a", message("m"))
            .await
            .unwrap();

        consumer.basic_qos(5).await.unwrap();
        let mut logs = consumer.basic_consume("logs", "t1").await.unwrap();
        let mut moves = consumer.basic_consume("moves.alice", "t2").await.unwrap();
        assert!(logs.next().await.unwrap().is_ok());
        assert!(moves.next().await.unwrap().is_ok());
        assert_eq!(broker.unacked_count("logs"), Some(1));

        consumer.close();

        assert!(logs.next().await.is_none());
        assert!(moves.next().await.is_none());
        assert_eq!(broker.message_count("logs"), Some(1));
        assert_eq!(broker.unacked_count("logs"), Some(0));
        assert_eq!(broker.queue_definition("moves.alice"), None);
    }
}
