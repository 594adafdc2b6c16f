// Copyright (c) 2025, The Ruskit Authors
// MIT License
// All rights reserved.

//! # Consumer Handlers
//!
//! A handler receives one decoded payload and returns a [`Disposition`]. Plain closures
//! `Fn(T) -> Disposition` are handlers; implement [`ConsumerHandler`] directly when the
//! handler needs to await.
//!
//! Handlers run on their subscription's task, one at a time. A handler that never
//! returns stalls its subscription.

use crate::disposition::Disposition;
use async_trait::async_trait;

#[async_trait]
pub trait ConsumerHandler<T>: Send + Sync
where
    T: Send + 'static,
{
    async fn exec(&self, msg: T) -> Disposition;
}

#[async_trait]
impl<T, F> ConsumerHandler<T> for F
where
    T: Send + 'static,
    F: Fn(T) -> Disposition + Send + Sync,
{
    async fn exec(&self, msg: T) -> Disposition {
        self(msg)
    }
}
