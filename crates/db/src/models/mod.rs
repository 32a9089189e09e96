//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - `Deserialize` DTOs for inserts and updates where the API accepts them

pub mod catalog;
pub mod character;
pub mod profile;
pub mod story_image;
pub mod storybook;
pub mod wizard_session;
