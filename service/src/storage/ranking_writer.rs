//! Persists one run's ranking to Postgres: a row per validator, plus a handful
//! of singleton counters in the `total` table.

use sqlx::PgPool;
use tracing::warn;
use validator_rank_core::types::RankedValidator;

use crate::error::SqlError;

const INSERT_RANKING_SQL: &str = "INSERT INTO ranking (
                block_height, stash, controller, active, rank, total_rating,
                commission_percent, self_stake, total_stake, other_stake,
                nominator_count, active_eras, performance, relative_performance,
                cluster_name, cluster_members, part_of_cluster, show_cluster_member,
                dominated, identity, council_backing, active_in_governance,
                included_thousand_validators, ratings, commission_history,
                era_points_history, payout_history, slash_history
             ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
                $15, $16, $17, $18, $19, $20, $21, $22, $23, $24, $25, $26,
                $27, $28
             )
             ON CONFLICT (block_height, stash) DO UPDATE SET
                rank = EXCLUDED.rank,
                total_rating = EXCLUDED.total_rating";

const DELETE_STALE_SQL: &str = "DELETE FROM ranking WHERE block_height != $1";

const UPSERT_TOTAL_SQL: &str = "INSERT INTO total (name, count) VALUES ($1, $2)
                 ON CONFLICT (name) DO UPDATE SET count = EXCLUDED.count";

pub struct RankingWriter<'a> {
    pool: &'a PgPool,
}

impl<'a> RankingWriter<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        RankingWriter { pool }
    }

    /// Inserts every validator's ranking row for `block_height`, logging and
    /// skipping any row that fails to insert rather than aborting the batch,
    /// then atomically drops every row from a prior block height.
    pub async fn write(&self, block_height: u64, validators: &[RankedValidator]) -> Result<(), SqlError> {
        for v in validators {
            if let Err(err) = self.insert_row(block_height, v).await {
                warn!(stash = %v.stash(), %err, "failed to insert ranking row, skipping");
            }
        }

        sqlx::query(DELETE_STALE_SQL)
            .bind(block_height as i64)
            .execute(self.pool)
            .await?;

        Ok(())
    }

    async fn insert_row(&self, block_height: u64, v: &RankedValidator) -> Result<(), SqlError> {
        sqlx::query(INSERT_RANKING_SQL)
            .bind(block_height as i64)
            .bind(v.stash().to_string())
            .bind(v.record.controller.to_string())
            .bind(v.record.active)
            .bind(v.rank as i64)
            .bind(v.total_rating as i64)
            .bind(v.commission_percent)
            .bind(v.self_stake.to_string())
            .bind(v.total_stake.to_string())
            .bind(v.other_stake.to_string())
            .bind(v.nominator_count as i64)
            .bind(v.active_eras as i64)
            .bind(v.performance)
            .bind(v.relative_performance)
            .bind(v.cluster_name.clone())
            .bind(v.cluster_members as i64)
            .bind(v.part_of_cluster)
            .bind(v.show_cluster_member)
            .bind(v.dominated)
            .bind(sqlx::types::Json(&v.record.identity))
            .bind(v.council_backing)
            .bind(v.active_in_governance)
            .bind(v.included_thousand_validators)
            .bind(sqlx::types::Json(v.ratings))
            .bind(sqlx::types::Json(&v.commission_history))
            .bind(sqlx::types::Json(&v.era_points_history))
            .bind(sqlx::types::Json(&v.payout_history))
            .bind(sqlx::types::Json(&v.slash_history))
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// Upserts the run-wide singleton counters: active/waiting/nominator counts,
    /// current era, and minimum bonded stake to be an active validator.
    pub async fn write_totals(&self, totals: &[(&str, i64)]) -> Result<(), SqlError> {
        for &(name, count) in totals {
            sqlx::query(UPSERT_TOTAL_SQL)
                .bind(name)
                .bind(count)
                .execute(self.pool)
                .await?;
        }
        Ok(())
    }
}
