// Copyright (c) 2025, The Ruskit Authors
// MIT License
// All rights reserved.

//! # Message Publisher
//!
//! Publishing encodes a value with the chosen codec, stamps the codec's content type, a
//! fresh message id and the current trace context on the message, and hands it to the
//! broker. It runs on the caller's task and does not wait for any consumer; an `Ok`
//! only means the broker took the message. Nothing is retried here.

use crate::{
    broker::{BrokerChannel, OutboundMessage},
    codec::Codec,
    errors::AmqpError,
    otel,
};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, error};
use uuid::Uuid;

/// Publishes `value` to `exchange` under `routing_key`.
///
/// # Parameters
/// * `channel` - The channel to publish on, typically the one returned by
///   [`declare_and_bind`](crate::topology::AmqpTopology::declare_and_bind)
/// * `exchange` - Target exchange (`""` for the default exchange)
/// * `routing_key` - Routing key matched against the exchange's bindings
/// * `value` - The payload
/// * `codec` - Serialization format for this message
///
/// # Returns
/// `EncodingError` if `value` cannot be serialized (nothing is sent), or
/// `PublishingError` if the broker did not accept the message
pub async fn publish<Ch, T, C>(
    channel: &Ch,
    exchange: &str,
    routing_key: &str,
    value: &T,
    codec: &C,
) -> Result<(), AmqpError>
where
    Ch: BrokerChannel + ?Sized,
    T: Serialize + Sync + ?Sized,
    C: Codec,
{
    let (payload, content_type) = codec.encode(value).inspect_err(|err| {
        error!(
            error = err.to_string(),
            exchange, routing_key, "failure to encode message"
        );
    })?;

    let mut headers = BTreeMap::new();
    otel::inject_current(&mut headers);

    let message = OutboundMessage {
        content_type: content_type.to_owned(),
        message_id: Uuid::new_v4().to_string(),
        headers,
        payload,
    };

    match channel.basic_publish(exchange, routing_key, message).await {
        Err(err) => {
            error!(
                error = err.to_string(),
                exchange, routing_key, "error publishing message"
            );
            Err(match err {
                AmqpError::PublishingError(_) => err,
                other => AmqpError::PublishingError(other.to_string()),
            })
        }
        _ => {
            debug!(exchange, routing_key, content_type, "message published");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        broker::MockBrokerChannel,
        codec::{BincodeCodec, JsonCodec, BINCODE_CONTENT_TYPE, JSON_CONTENT_TYPE},
        errors::ErrorKind,
        routing::PlayingState,
    };
    use std::collections::HashMap;

    #[tokio::test]
    async fn publishes_json_with_content_type_and_message_id() {
        let mut channel = MockBrokerChannel::new();
        channel
            .expect_basic_publish()
            .withf(|exchange, key, msg| {
                exchange == "peril_direct"
                    && key == "pause"
                    && msg.content_type == JSON_CONTENT_TYPE
                    && !msg.message_id.is_empty()
                    && msg.payload == br#"{"isPaused":true}"#
            })
            .times(1)
            .returning(|_, _, _| Ok(()));

        publish(
            &channel,
            "peril_direct",
            "pause",
            &PlayingState { is_paused: true },
            &JsonCodec,
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn codec_is_chosen_per_call() {
        let mut channel = MockBrokerChannel::new();
        channel
            .expect_basic_publish()
            .withf(|_, key, msg| key == "army_moves.alice" && msg.content_type == BINCODE_CONTENT_TYPE)
            .times(1)
            .returning(|_, _, _| Ok(()));
        channel
            .expect_basic_publish()
            .withf(|_, key, msg| key == "pause" && msg.content_type == JSON_CONTENT_TYPE)
            .times(1)
            .returning(|_, _, _| Ok(()));

        publish(&channel, "peril_topic", "army_moves.alice", &42u64, &BincodeCodec)
            .await
            .unwrap();
        publish(&channel, "peril_direct", "pause", &42u64, &JsonCodec)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn encoding_failure_sends_nothing() {
        let mut channel = MockBrokerChannel::new();
        channel.expect_basic_publish().never();

        let mut value = HashMap::new();
        value.insert((1u8, 2u8), 3u8);

        let err = publish(&channel, "peril_direct", "pause", &value, &JsonCodec)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Encoding);
    }

    #[tokio::test]
    async fn transport_failure_is_reported_as_publishing_error() {
        let mut channel = MockBrokerChannel::new();
        channel
            .expect_basic_publish()
            .times(1)
            .returning(|_, _, _| Err(AmqpError::ChannelError("channel closed".into())));

        let err = publish(&channel, "peril_direct", "pause", &1u8, &JsonCodec)
            .await
            .unwrap_err();

        assert!(matches!(err, AmqpError::PublishingError(_)));
        assert_eq!(err.kind(), ErrorKind::Connectivity);
    }
}
