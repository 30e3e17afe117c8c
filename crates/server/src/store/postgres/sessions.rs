//! Session token lookups.
//!
//! Sessions are provisioned by the external identity provider; this side
//! only validates bearer tokens against them.

use chrono::{DateTime, Utc};

use tiktokflow_core::{SellerId, Session};

use super::PgStore;
use crate::store::RepositoryError;

impl PgStore {
    pub(super) async fn session_by_token(
        &self,
        token: &str,
    ) -> Result<Option<Session>, RepositoryError> {
        let row: Option<(SellerId, DateTime<Utc>)> = sqlx::query_as(
            "SELECT seller_id, expires_at FROM sessions \
             WHERE token = $1 AND expires_at > NOW()",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|(seller_id, expires_at)| Session {
            seller_id,
            expires_at,
        }))
    }
}
