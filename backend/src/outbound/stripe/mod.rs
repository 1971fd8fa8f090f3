//! Payment processor outbound adapter.
//!
//! This module provides a thin HTTP implementation of the `PaymentGateway`
//! port.

mod dto;
mod gateway;

pub use gateway::{STRIPE_API_BASE, StripeGateway, StripeSettings};
