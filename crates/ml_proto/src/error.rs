use thiserror::Error;

use crate::message::DeliveryStatus;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Invalid delivery-status transition: {from:?} -> {to:?}")]
    InvalidStatusTransition {
        from: DeliveryStatus,
        to: DeliveryStatus,
    },
}
