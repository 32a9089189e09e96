//! Outbound adapters for the storybook service.
//!
//! Each concern is a trait object seam so the API can be exercised with
//! in-process fakes:
//!
//! - [`stripe`] -- [`PaymentGateway`] over the Stripe Checkout API, plus the
//!   webhook event payload types.
//! - [`automation`] -- [`OrderForwarder`] posting paid orders to the
//!   story-generation automation webhook.
//! - [`storage`] -- [`ObjectStore`] for uploaded photos.

pub mod automation;
pub mod storage;
pub mod stripe;

pub use automation::{ForwardError, ForwardedCharacter, ForwardedOrder, HttpForwarder, OrderForwarder};
pub use storage::{LocalObjectStore, ObjectStore, StorageError};
pub use stripe::{CheckoutRequest, CheckoutSession, PaymentError, PaymentGateway, StripeGateway};
