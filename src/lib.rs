// Copyright (c) 2025, The Ruskit Authors
// MIT License
// All rights reserved.

//! Typed publish/subscribe over an AMQP broker.
//!
//! Producers [`publish`](publisher::publish) values with a chosen [`Codec`](codec::Codec);
//! consumers [`subscribe`](dispatcher::RabbitMQDispatcher::subscribe) handlers that
//! return a [`Disposition`](disposition::Disposition), which decides how each delivery
//! is acknowledged.

mod consumer;
mod otel;

pub mod broker;
pub mod channel;
pub mod codec;
pub mod config;
pub mod dispatcher;
pub mod disposition;
pub mod errors;
pub mod exchange;
pub mod handler;
pub mod memory;
pub mod publisher;
pub mod queue;
pub mod routing;
pub mod topology;
