// Copyright (c) 2025, The Ruskit Authors
// MIT License
// All rights reserved.

//! # Error Types for the Delivery Layer
//!
//! `AmqpError` enumerates every failure the delivery layer can report. Setup-time
//! failures (connecting, declaring, binding, registering a consumer) and publish-time
//! failures are returned to the caller. Per-message failures inside a running consumer
//! loop are logged and contained, they never reach the subscriber.
//!
//! `ErrorKind` groups the variants into the coarse categories callers usually branch on.

use thiserror::Error;

/// Coarse classification of an [`AmqpError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A caller-supplied argument was rejected before reaching the broker
    InvalidArgument,
    /// Configuration could not be loaded
    Configuration,
    /// The connection or channel is unusable
    Connectivity,
    /// The broker rejected a declare, bind, qos or consume request
    Topology,
    /// A value could not be serialized
    Encoding,
    /// A payload could not be deserialized
    Decoding,
}

/// Represents errors that can occur during AMQP/RabbitMQ operations.
///
/// Variants that wrap a broker failure carry the broker's message verbatim so the
/// caller can see why, e.g., a redeclaration with different flags was refused.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmqpError {
    /// A required argument was empty or out of range
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Error loading the configuration
    #[error("failure to load configuration: {0}")]
    ConfigurationError(String),

    /// Error establishing a connection to the RabbitMQ server
    #[error("failure to connect: {0}")]
    ConnectionError(String),

    /// Error creating or using a channel
    #[error("failure to create a channel: {0}")]
    ChannelError(String),

    /// Error declaring a queue with the given name
    #[error("failure to declare a queue `{0}`: {1}")]
    DeclareQueueError(String, String),

    /// Error binding a queue to an exchange
    #[error("failure to bind queue `{queue}` to exchange `{exchange}` with key `{key}`: {reason}")]
    BindingExchangeToQueueError {
        queue: String,
        exchange: String,
        key: String,
        reason: String,
    },

    /// Error configuring Quality of Service parameters
    #[error("failure to configure qos `{0}`")]
    QoSDeclarationError(String),

    /// Error registering a consumer on a queue
    #[error("failure to declare consumer on `{0}`: {1}")]
    ConsumerDeclarationError(String, String),

    /// Error serializing a value
    #[error("failure to encode payload: {0}")]
    EncodingError(String),

    /// Error deserializing a payload
    #[error("failure to decode payload: {0}")]
    DecodingError(String),

    /// Error handing a message to the broker
    #[error("failure to publish: {0}")]
    PublishingError(String),

    /// Error acknowledging a message
    #[error("failure to ack message: {0}")]
    AckMessageError(String),

    /// Error negative-acknowledging a message
    #[error("failure to nack message: {0}")]
    NackMessageError(String),

    /// Error receiving a delivery
    #[error("failure to consume message `{0}`")]
    ConsumerError(String),
}

impl AmqpError {
    /// Returns the category this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AmqpError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            AmqpError::ConfigurationError(_) => ErrorKind::Configuration,
            AmqpError::ConnectionError(_)
            | AmqpError::ChannelError(_)
            | AmqpError::PublishingError(_)
            | AmqpError::AckMessageError(_)
            | AmqpError::NackMessageError(_)
            | AmqpError::ConsumerError(_) => ErrorKind::Connectivity,
            AmqpError::DeclareQueueError(..)
            | AmqpError::BindingExchangeToQueueError { .. }
            | AmqpError::QoSDeclarationError(_)
            | AmqpError::ConsumerDeclarationError(..) => ErrorKind::Topology,
            AmqpError::EncodingError(_) => ErrorKind::Encoding,
            AmqpError::DecodingError(_) => ErrorKind::Decoding,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_setup_failures_as_topology() {
        let err = AmqpError::DeclareQueueError("q".into(), "PRECONDITION_FAILED".into());
        assert_eq!(err.kind(), ErrorKind::Topology);

        let err = AmqpError::BindingExchangeToQueueError {
            queue: "q".into(),
            exchange: "x".into(),
            key: "k".into(),
            reason: "NOT_FOUND".into(),
        };
        assert_eq!(err.kind(), ErrorKind::Topology);
        assert_eq!(
            err.to_string(),
            "failure to bind queue `q` to exchange `x` with key `k`: NOT_FOUND"
        );
    }

    #[test]
    fn classifies_transport_failures_as_connectivity() {
        assert_eq!(
            AmqpError::PublishingError("closed".into()).kind(),
            ErrorKind::Connectivity
        );
        assert_eq!(
            AmqpError::ConnectionError("refused".into()).kind(),
            ErrorKind::Connectivity
        );
        assert_eq!(
            AmqpError::NackMessageError("closed".into()).kind(),
            ErrorKind::Connectivity
        );
    }
}
