// Copyright (c) 2025, The Ruskit Authors
// MIT License
// All rights reserved.

//! # Consumer Loop
//!
//! One loop runs per subscription. For every delivery, in delivery order, it:
//! 1. Opens a consumer span parented on the trace context in the headers
//! 2. Decodes the payload with the subscription's codec
//! 3. On a decode failure, rejects the message without requeue so it is dead-lettered,
//!    and never calls the handler
//! 4. Otherwise awaits the handler and settles the delivery according to the returned
//!    [`Disposition`]
//!
//! The next delivery is not pulled until the current one is settled. Per-message
//! failures are logged and never stop the loop; it ends only when the delivery stream
//! ends.

use crate::{
    broker::{DeliveryStream, Envelope},
    codec::Codec,
    disposition::{Acknowledgement, Disposition},
    errors::AmqpError,
    handler::ConsumerHandler,
    otel,
};
use futures_util::StreamExt;
use opentelemetry::{
    global::{self, BoxedTracer},
    trace::{Span, Status},
};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use tracing::{debug, error, warn};

/// Drives one subscription until its delivery stream ends.
pub(crate) async fn run<T, C, H>(queue: String, mut deliveries: DeliveryStream, codec: C, handler: H)
where
    T: DeserializeOwned + Send + 'static,
    C: Codec,
    H: ConsumerHandler<T>,
{
    let tracer = global::tracer("amqp consumer");

    while let Some(result) = deliveries.next().await {
        match result {
            Ok(envelope) => {
                let settled =
                    consume::<T, C, H>(&tracer, &queue, envelope, &codec, &handler).await;
                if let Err(err) = settled {
                    error!(error = err.to_string(), queue, "error consume msg");
                }
            }
            Err(err) => error!(error = err.to_string(), queue, "errors consume msg"),
        }
    }

    debug!(queue, "delivery stream closed, consumer stopped");
}

/// Decodes, handles and settles a single delivery.
///
/// # Returns
/// The acknowledgement that was issued, or the error raised while issuing it
pub(crate) async fn consume<T, C, H>(
    tracer: &BoxedTracer,
    queue: &str,
    envelope: Envelope,
    codec: &C,
    handler: &H,
) -> Result<Acknowledgement, AmqpError>
where
    T: DeserializeOwned + Send + 'static,
    C: Codec,
    H: ConsumerHandler<T>,
{
    let mut span = otel::new_span(&envelope.headers, tracer, &envelope.routing_key);

    debug!(
        queue,
        exchange = envelope.exchange,
        routing_key = envelope.routing_key,
        delivery_tag = envelope.delivery_tag,
        redelivered = envelope.redelivered,
        "received"
    );

    let decoded = codec.decode::<T>(&envelope.data, envelope.content_type.as_deref());

    let disposition = match decoded {
        Ok(msg) => handler.exec(msg).await,
        Err(err) => {
            warn!(
                error = err.to_string(),
                queue,
                delivery_tag = envelope.delivery_tag,
                "discarding undecodable message"
            );
            span.record_error(&err);
            Disposition::Discard
        }
    };

    match disposition {
        Disposition::Accept => span.set_status(Status::Ok),
        Disposition::RetryLater => span.set_status(Status::Error {
            description: Cow::from("message requeued for retry"),
        }),
        Disposition::Discard => span.set_status(Status::Error {
            description: Cow::from("message discarded"),
        }),
    }

    let ack = disposition.acknowledgement();

    match ack.apply(envelope.acker.as_ref()).await {
        Err(err) => {
            error!(
                error = err.to_string(),
                queue,
                delivery_tag = envelope.delivery_tag,
                "error while settling msg"
            );
            span.record_error(&err);
            Err(err)
        }
        _ => {
            debug!(queue, delivery_tag = envelope.delivery_tag, ?ack, "settled");
            Ok(ack)
        }
    }
}
