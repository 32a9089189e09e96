//! Domain logic for the storybook ordering service.
//!
//! Everything in this crate is pure: no database access, no HTTP. The `db`
//! and `api` crates build on these types and rules.

pub mod catalog;
pub mod checkout;
pub mod claim;
pub mod error;
pub mod pagination;
pub mod storybook;
pub mod types;
pub mod upload;
pub mod webhook_signature;
pub mod wizard;
