/// Primary keys are PostgreSQL `uuid` columns (`gen_random_uuid()` defaults),
/// matching the ids issued by the hosted auth service for users.
pub type DbId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
