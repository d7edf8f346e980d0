//! A thin wrapper around a [`jsonrpsee`] WS client exposing the handful of chain
//! reads this pipeline needs, each as its own typed async method.

use std::collections::{BTreeMap, BTreeSet};

use jsonrpsee::core::client::ClientT;
use jsonrpsee::rpc_params;
use jsonrpsee::ws_client::{WsClient, WsClientBuilder};
use serde::Deserialize;
use validator_rank_core::types::{
    Era, Exposure, GovernanceActivity, Identity, Nomination, Stake, StakingLedger, ValidatorPrefs,
    ValidatorRecord,
};
use validator_rank_core::AccountId32;

use crate::error::ChainError;

/// Concurrency limit for the per-validator identity enrichment fan-out.
const IDENTITY_CONCURRENCY: usize = 8;

pub struct ChainClient {
    ws: WsClient,
}

impl ChainClient {
    pub async fn connect(url: &str) -> Result<Self, ChainError> {
        let ws = WsClientBuilder::default().build(url).await?;
        Ok(ChainClient { ws })
    }

    pub async fn best_block_number(&self) -> Result<u64, ChainError> {
        let header: BlockHeader = self.ws.request("chain_getHeader", rpc_params![]).await?;
        u64::from_str_radix(header.number.trim_start_matches("0x"), 16)
            .map_err(|_| ChainError::NoBestBlock)
    }

    pub async fn current_era(&self) -> Result<Era, ChainError> {
        let era: Era = self.ws.request("staking_currentEra", rpc_params![]).await?;
        Ok(era)
    }

    pub async fn active_validators(&self) -> Result<BTreeSet<AccountId32>, ChainError> {
        let stashes: Vec<AccountId32> = self.ws.request("session_validators", rpc_params![]).await?;
        Ok(stashes.into_iter().collect())
    }

    pub async fn waiting_validators(&self) -> Result<BTreeSet<AccountId32>, ChainError> {
        let stashes: Vec<AccountId32> = self.ws.request("staking_waitingValidators", rpc_params![]).await?;
        Ok(stashes.into_iter().collect())
    }

    pub async fn nominations(&self) -> Result<Vec<Nomination>, ChainError> {
        let nominations: Vec<Nomination> = self.ws.request("staking_nominators", rpc_params![]).await?;
        Ok(nominations)
    }

    pub async fn council_votes(&self) -> Result<BTreeSet<AccountId32>, ChainError> {
        let votes: Vec<AccountId32> = self.ws.request("elections_councilVotes", rpc_params![]).await?;
        Ok(votes.into_iter().collect())
    }

    pub async fn governance_activity(&self) -> Result<GovernanceActivity, ChainError> {
        let activity: GovernanceActivity = self.ws.request("democracy_activity", rpc_params![]).await?;
        Ok(activity)
    }

    pub async fn era_points(&self, era: Era) -> Result<BTreeMap<AccountId32, u32>, ChainError> {
        let points: BTreeMap<AccountId32, u32> =
            self.ws.request("staking_erasRewardPoints", rpc_params![era]).await?;
        Ok(points)
    }

    pub async fn era_prefs(&self, era: Era) -> Result<BTreeMap<AccountId32, ValidatorPrefs>, ChainError> {
        let prefs: BTreeMap<AccountId32, ValidatorPrefs> =
            self.ws.request("staking_erasValidatorPrefs", rpc_params![era]).await?;
        Ok(prefs)
    }

    pub async fn era_slashes(&self, era: Era) -> Result<BTreeMap<AccountId32, Stake>, ChainError> {
        let slashes: BTreeMap<AccountId32, Stake> =
            self.ws.request("staking_erasSlashes", rpc_params![era]).await?;
        Ok(slashes)
    }

    pub async fn era_exposures(&self, era: Era) -> Result<BTreeMap<AccountId32, Exposure>, ChainError> {
        let exposures: BTreeMap<AccountId32, Exposure> =
            self.ws.request("staking_erasStakers", rpc_params![era]).await?;
        Ok(exposures)
    }

    async fn identity(&self, stash: AccountId32) -> Result<Identity, ChainError> {
        let identity: Identity = self.ws.request("identity_of", rpc_params![stash]).await?;
        Ok(identity)
    }

    async fn staking_ledger(&self, stash: AccountId32) -> Result<StakingLedger, ChainError> {
        let ledger: StakingLedger = self.ws.request("staking_ledger", rpc_params![stash]).await?;
        Ok(ledger)
    }

    async fn exposure(&self, stash: AccountId32) -> Result<Option<Exposure>, ChainError> {
        let exposure: Option<Exposure> = self.ws.request("staking_exposure", rpc_params![stash]).await?;
        Ok(exposure)
    }

    async fn prefs(&self, stash: AccountId32) -> Result<ValidatorPrefs, ChainError> {
        let prefs: ValidatorPrefs = self.ws.request("staking_validatorPrefs", rpc_params![stash]).await?;
        Ok(prefs)
    }

    async fn controller_of(&self, stash: AccountId32) -> Result<AccountId32, ChainError> {
        let controller: AccountId32 = self.ws.request("staking_bonded", rpc_params![stash]).await?;
        Ok(controller)
    }

    /// Builds one [`ValidatorRecord`], bounding how many identity/ledger lookups
    /// run concurrently per stash via a semaphore shared across the whole batch.
    pub async fn build_record(&self, stash: AccountId32, active: bool) -> Result<ValidatorRecord, ChainError> {
        static PERMITS: tokio::sync::Semaphore = tokio::sync::Semaphore::const_new(IDENTITY_CONCURRENCY);
        let _permit = PERMITS.acquire().await.expect("semaphore is never closed");

        let (identity, staking_ledger, prefs, controller, exposure) = futures::try_join!(
            self.identity(stash),
            self.staking_ledger(stash),
            self.prefs(stash),
            self.controller_of(stash),
            self.exposure(stash),
        )?;

        Ok(ValidatorRecord {
            stash,
            controller,
            active,
            identity,
            exposure: if active { exposure } else { None },
            staking_ledger,
            prefs,
        })
    }
}

#[derive(Debug, Deserialize)]
struct BlockHeader {
    number: String,
}
