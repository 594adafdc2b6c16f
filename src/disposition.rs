// Copyright (c) 2025, The Ruskit Authors
// MIT License
// All rights reserved.

//! # Handler Dispositions
//!
//! Every handler returns a [`Disposition`]. The consumer loop turns it into exactly
//! one [`Acknowledgement`] and issues that against the delivery.

use crate::{broker::DeliveryAcker, errors::AmqpError};

/// The business outcome of handling one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Handled; remove the message from the queue
    Accept,
    /// Not handled now; put the message back for redelivery
    RetryLater,
    /// Never handle; route the message to the dead-letter target
    Discard,
}

/// The acknowledgement primitive issued for a delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acknowledgement {
    Ack,
    NackRequeue,
    NackDiscard,
}

impl Disposition {
    pub fn acknowledgement(self) -> Acknowledgement {
        match self {
            Disposition::Accept => Acknowledgement::Ack,
            Disposition::RetryLater => Acknowledgement::NackRequeue,
            Disposition::Discard => Acknowledgement::NackDiscard,
        }
    }
}

impl Acknowledgement {
    pub(crate) async fn apply(self, acker: &dyn DeliveryAcker) -> Result<(), AmqpError> {
        match self {
            Acknowledgement::Ack => acker.ack().await,
            Acknowledgement::NackRequeue => acker.nack(true).await,
            Acknowledgement::NackDiscard => acker.nack(false).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broker::MockDeliveryAcker;
    use mockall::predicate::eq;

    #[test]
    fn maps_each_disposition_to_one_primitive() {
        assert_eq!(Disposition::Accept.acknowledgement(), Acknowledgement::Ack);
        assert_eq!(
            Disposition::RetryLater.acknowledgement(),
            Acknowledgement::NackRequeue
        );
        assert_eq!(
            Disposition::Discard.acknowledgement(),
            Acknowledgement::NackDiscard
        );
    }

    #[tokio::test]
    async fn requeue_issues_nack_with_requeue() {
        let mut acker = MockDeliveryAcker::new();
        acker.expect_ack().never();
        acker
            .expect_nack()
            .with(eq(true))
            .times(1)
            .returning(|_| Ok(()));

        Acknowledgement::NackRequeue.apply(&acker).await.unwrap();
    }

    #[tokio::test]
    async fn failures_from_the_acker_are_returned() {
        let mut acker = MockDeliveryAcker::new();
        acker
            .expect_ack()
            .times(1)
            .returning(|| Err(AmqpError::AckMessageError("channel closed".into())));

        let err = Acknowledgement::Ack.apply(&acker).await.unwrap_err();
        assert_eq!(err, AmqpError::AckMessageError("channel closed".into()));
    }
}
