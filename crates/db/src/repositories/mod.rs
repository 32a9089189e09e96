//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod catalog_repo;
pub mod character_repo;
pub mod profile_repo;
pub mod story_image_repo;
pub mod storybook_repo;
pub mod wizard_session_repo;

pub use catalog_repo::CatalogRepo;
pub use character_repo::CharacterRepo;
pub use profile_repo::ProfileRepo;
pub use story_image_repo::StoryImageRepo;
pub use storybook_repo::StorybookRepo;
pub use wizard_session_repo::WizardSessionRepo;
