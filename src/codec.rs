// Copyright (c) 2025, The Ruskit Authors
// MIT License
// All rights reserved.

//! # Payload Codecs
//!
//! A [`Codec`] turns a typed value into bytes plus the content type advertised on the
//! wire, and back. The codec is chosen per publish call and per subscription, so one
//! process can publish JSON on one routing key and bincode on another.
//!
//! - [`JsonCodec`]: `application/json`, human readable and tolerant of unknown fields
//! - [`BincodeCodec`]: `application/x-bincode`, compact, producer and consumer must
//!   agree on the exact schema

use crate::errors::AmqpError;
use bincode::Options;
use serde::{de::DeserializeOwned, Serialize};

/// Default content type for JSON messages
pub const JSON_CONTENT_TYPE: &str = "application/json";
/// Content type for bincode messages
pub const BINCODE_CONTENT_TYPE: &str = "application/x-bincode";

/// Largest bincode payload accepted in either direction (16 MiB)
const BINCODE_SIZE_LIMIT: u64 = 16 * 1024 * 1024;

/// An encode/decode pair tagged with the content type it produces.
pub trait Codec: Send + Sync + 'static {
    /// The content type written on every message this codec encodes.
    fn content_type(&self) -> &'static str;

    fn serialize<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, AmqpError>;

    fn deserialize<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, AmqpError>;

    /// Serializes `value` and returns the bytes with this codec's content type.
    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<(Vec<u8>, &'static str), AmqpError> {
        Ok((self.serialize(value)?, self.content_type()))
    }

    /// Deserializes `data`, refusing payloads whose declared content type belongs to
    /// another codec. A missing content type is decoded optimistically.
    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
        content_type: Option<&str>,
    ) -> Result<T, AmqpError> {
        if let Some(content_type) = content_type {
            if !same_media_type(content_type, self.content_type()) {
                return Err(AmqpError::DecodingError(format!(
                    "unexpected content type `{}`, expected `{}`",
                    content_type,
                    self.content_type()
                )));
            }
        }

        self.deserialize(data)
    }
}

/// Compares the MIME essence of two content types, ignoring parameters and case.
fn same_media_type(received: &str, expected: &str) -> bool {
    let essence = received.split(';').next().unwrap_or_default().trim();
    essence.eq_ignore_ascii_case(expected)
}

/// Structured-text codec backed by `serde_json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn content_type(&self) -> &'static str {
        JSON_CONTENT_TYPE
    }

    fn serialize<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, AmqpError> {
        serde_json::to_vec(value).map_err(|err| AmqpError::EncodingError(err.to_string()))
    }

    fn deserialize<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, AmqpError> {
        serde_json::from_slice(data).map_err(|err| AmqpError::DecodingError(err.to_string()))
    }
}

/// Binary codec backed by `bincode` with varint integers and no trailing bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct BincodeCodec;

impl BincodeCodec {
    fn options() -> impl Options {
        bincode::options()
            .with_limit(BINCODE_SIZE_LIMIT)
            .reject_trailing_bytes()
    }
}

impl Codec for BincodeCodec {
    fn content_type(&self) -> &'static str {
        BINCODE_CONTENT_TYPE
    }

    fn serialize<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, AmqpError> {
        Self::options()
            .serialize(value)
            .map_err(|err| AmqpError::EncodingError(err.to_string()))
    }

    fn deserialize<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, AmqpError> {
        Self::options()
            .deserialize(data)
            .map_err(|err| AmqpError::DecodingError(err.to_string()))
    }
}
