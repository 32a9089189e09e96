pub mod catalog;
pub mod checkout;
pub mod internal;
pub mod orders;
pub mod photo;
pub mod profile;
pub mod storybooks;
pub mod stripe_webhook;
pub mod wizard;
