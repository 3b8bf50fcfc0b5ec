/// Opaque user identifier issued by the identity provider.
pub type UserId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Per-row write counter assigned by the row-store on every upsert.
pub type Version = i64;
