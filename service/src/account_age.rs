//! Resolves when each stash (and identity parent) first appeared on chain, by
//! searching the indexed `event` table for its `system.NewAccount` event.

use std::collections::BTreeMap;

use futures::stream::{self, StreamExt, TryStreamExt};
use sqlx::PgPool;
use validator_rank_core::types::AccountAge;
use validator_rank_core::AccountId32;

use crate::error::SqlError;

/// Bounded concurrency for the per-account lookups; one query per distinct
/// account touching the same pool.
const CONCURRENCY: usize = 8;

pub struct AccountAgeResolver<'a> {
    pool: &'a PgPool,
}

impl<'a> AccountAgeResolver<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        AccountAgeResolver { pool }
    }

    /// Resolves ages for every stash and (where present) identity parent in
    /// `accounts`, deduplicated, in parallel up to [`CONCURRENCY`] at a time.
    pub async fn resolve(
        &self,
        accounts: impl IntoIterator<Item = (AccountId32, Option<AccountId32>)>,
    ) -> Result<BTreeMap<AccountId32, AccountAge>, SqlError> {
        let pairs: Vec<(AccountId32, Option<AccountId32>)> = accounts.into_iter().collect();

        let ages: Vec<(AccountId32, AccountAge)> = stream::iter(pairs)
            .map(|(stash, parent)| async move {
                let stash_created_at_block = self.created_at_block(stash).await?;
                let parent_created_at_block = match parent {
                    Some(p) => Some(self.created_at_block(p).await?),
                    None => None,
                };
                Ok::<_, SqlError>((
                    stash,
                    AccountAge { stash_created_at_block, parent_created_at_block },
                ))
            })
            .buffer_unordered(CONCURRENCY)
            .try_collect()
            .await?;

        Ok(ages.into_iter().collect())
    }

    /// The block height of the account's `system.NewAccount` event, or genesis
    /// (block 0) if none is found - accounts that existed at genesis never emit one.
    async fn created_at_block(&self, account: AccountId32) -> Result<u64, SqlError> {
        let needle = account.to_string();
        let row: Option<(i64,)> = sqlx::query_as(
            "SELECT block_number FROM event \
             WHERE method = 'NewAccount' AND data LIKE '%' || $1 || '%' \
             ORDER BY block_number ASC LIMIT 1",
        )
        .bind(&needle)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|(block,)| block as u64).unwrap_or(0))
    }
}
