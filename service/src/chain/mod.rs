//! Concurrent chain-state fan-out: one [`ChainSnapshot`] per run.

pub mod client;
pub mod queries;

use std::collections::{BTreeMap, BTreeSet};

use futures::future::try_join_all;
use tracing::info;
use validator_rank_core::types::{
    Era, Exposure, GovernanceActivity, Nomination, ValidatorPrefs, ValidatorRecord,
};
use validator_rank_core::AccountId32;

use crate::config::Config;
use crate::error::ChainError;
use client::ChainClient;

/// Everything pulled off-chain for one run, ready to hand to the scorer.
pub struct ChainSnapshot {
    pub block_height: u64,
    /// The live current era, fetched fresh each run. `eras` deliberately excludes
    /// it (see [`queries::era_window`]), so totals that need "now" use this field.
    pub current_era: Era,
    pub records: Vec<ValidatorRecord>,
    pub eras: Vec<Era>,
    pub era_points: BTreeMap<Era, BTreeMap<AccountId32, u32>>,
    pub era_prefs: BTreeMap<Era, BTreeMap<AccountId32, ValidatorPrefs>>,
    pub era_slashes: BTreeMap<Era, BTreeMap<AccountId32, validator_rank_core::types::Stake>>,
    pub era_exposures: BTreeMap<Era, BTreeMap<AccountId32, Exposure>>,
    pub nominations: Vec<Nomination>,
    pub council_votes: BTreeSet<AccountId32>,
    pub governance: GovernanceActivity,
}

impl ChainSnapshot {
    /// Fans out the independent reads concurrently, then fetches per-era exposure
    /// sequentially (one request per era, since each can be large).
    pub async fn fetch(client: &ChainClient, config: &Config) -> Result<Self, ChainError> {
        let block_height = client.best_block_number().await?;
        let current_era = client.current_era().await?;
        let eras: Vec<Era> = queries::era_window(current_era, config.history_size);

        let (active_set, waiting_set, nominations, council_votes, governance) = futures::try_join!(
            client.active_validators(),
            client.waiting_validators(),
            client.nominations(),
            client.council_votes(),
            client.governance_activity(),
        )?;

        info!(
            block_height,
            active = active_set.len(),
            waiting = waiting_set.len(),
            "fetched validator sets"
        );

        let mut records = Vec::with_capacity(active_set.len() + waiting_set.len());
        let identity_futures = active_set
            .iter()
            .chain(waiting_set.iter())
            .map(|stash| client.build_record(*stash, active_set.contains(stash)));
        for record in try_join_all(identity_futures).await? {
            records.push(record);
        }

        let mut era_points = BTreeMap::new();
        let mut era_prefs = BTreeMap::new();
        let mut era_slashes = BTreeMap::new();
        let mut era_exposures = BTreeMap::new();
        for &era in &eras {
            era_points.insert(era, client.era_points(era).await?);
            era_prefs.insert(era, client.era_prefs(era).await?);
            era_slashes.insert(era, client.era_slashes(era).await?);
            era_exposures.insert(era, client.era_exposures(era).await?);
        }

        Ok(ChainSnapshot {
            block_height,
            current_era,
            records,
            eras,
            era_points,
            era_prefs,
            era_slashes,
            era_exposures,
            nominations,
            council_votes,
            governance,
        })
    }
}
