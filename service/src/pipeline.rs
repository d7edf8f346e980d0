//! Orchestrates one end-to-end run: fetch, resolve ages, score, cluster, rank
//! by dominance, persist.

use std::time::Instant;

use sqlx::PgPool;
use tracing::info;
use validator_rank_core::scorer::{self, ScoringInput};
use validator_rank_core::{cluster, dominance};

use crate::chain::client::ChainClient;
use crate::chain::ChainSnapshot;
use crate::config::Config;
use crate::error::PipelineError;
use crate::account_age::AccountAgeResolver;
use crate::storage::RankingWriter;
use crate::thousand_validators;

pub async fn run_once(config: &Config, pool: &PgPool) -> Result<(), PipelineError> {
    let started = Instant::now();

    let client = ChainClient::connect(&config.ws_provider_url).await?;
    let snapshot = ChainSnapshot::fetch(&client, config).await?;

    let account_ages = AccountAgeResolver::new(pool)
        .resolve(
            snapshot
                .records
                .iter()
                .map(|r| (r.stash, r.identity.parent)),
        )
        .await?;

    let thousand_validators = thousand_validators::fetch(thousand_validators::CANDIDATES_URL).await;

    let input = ScoringInput {
        block_height: snapshot.block_height,
        eras: &snapshot.eras,
        eras_per_day: config.eras_per_day,
        token_decimals: config.token_decimals,
        max_nominator_rewarded_per_validator: config.max_nominator_rewarded_per_validator,
        era_points: &snapshot.era_points,
        era_prefs: &snapshot.era_prefs,
        era_slashes: &snapshot.era_slashes,
        era_exposures: &snapshot.era_exposures,
        nominations: &snapshot.nominations,
        council_votes: &snapshot.council_votes,
        governance: &snapshot.governance,
        thousand_validators: &thousand_validators,
        account_ages: &account_ages,
    };

    let mut ranked = scorer::score_all(&snapshot.records, &input);
    scorer::normalize_relative_performance(&mut ranked);
    cluster::analyze(&mut ranked);
    dominance::analyze(&mut ranked);

    let active_count = ranked.iter().filter(|v| v.record.active).count();
    let waiting_count = ranked.len() - active_count;
    let nominator_count = snapshot.nominations.len();
    let dominated_count = ranked.iter().filter(|v| v.dominated).count();
    let minimum_stake = ranked
        .iter()
        .filter(|v| v.record.active)
        .filter_map(|v| v.record.exposure.as_ref())
        .flat_map(|exposure| exposure.others.iter())
        .map(|individual| individual.value)
        .min()
        .unwrap_or(validator_rank_core::types::Stake::ZERO);

    let writer = RankingWriter::new(pool);
    writer.write(snapshot.block_height, &ranked).await?;
    writer
        .write_totals(&[
            ("active_validator_count", active_count as i64),
            ("waiting_validator_count", waiting_count as i64),
            ("nominator_count", nominator_count as i64),
            ("current_era", snapshot.current_era as i64),
            ("minimum_stake", minimum_stake.as_f64() as i64),
        ])
        .await?;

    info!(
        block_height = snapshot.block_height,
        validators = ranked.len(),
        active = active_count,
        waiting = waiting_count,
        dominated = dominated_count,
        elapsed_ms = started.elapsed().as_millis(),
        "run complete"
    );

    Ok(())
}
