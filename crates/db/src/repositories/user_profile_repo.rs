//! Repository for the `user_profiles` table.

use sqlx::PgPool;

use crate::models::user_profile::UserProfile;

/// Column list for `user_profiles` queries.
const COLUMNS: &str = "user_id, username, display_name, created_at";

/// Read-only lookups of public profiles.
pub struct UserProfileRepo;

impl UserProfileRepo {
    /// Find a profile by its public username. Exact, case-sensitive match.
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<UserProfile>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM user_profiles WHERE username = $1");
        sqlx::query_as::<_, UserProfile>(&query)
            .bind(username)
            .fetch_optional(pool)
            .await
    }
}
