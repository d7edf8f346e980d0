//! Fetches the thousand-validator-program candidate list over HTTP. A failure
//! here is non-fatal: the run proceeds with an empty set rather than aborting.

use std::collections::BTreeSet;
use std::str::FromStr;

use serde::Deserialize;
use tracing::warn;
use validator_rank_core::AccountId32;

use crate::error::HttpError;

/// Fixed endpoint for the thousand-validator-program candidate list. Not
/// configurable: every run fetches from here, and only failure is non-fatal.
pub const CANDIDATES_URL: &str = "https://kusama.w3f.community/candidates";

#[derive(Debug, Deserialize)]
struct Candidate {
    stash: String,
}

pub async fn fetch(url: &str) -> BTreeSet<AccountId32> {
    match fetch_inner(url).await {
        Ok(set) => set,
        Err(err) => {
            warn!(%err, "failed to fetch thousand validator program candidates, continuing without it");
            BTreeSet::new()
        }
    }
}

async fn fetch_inner(url: &str) -> Result<BTreeSet<AccountId32>, HttpError> {
    let candidates: Vec<Candidate> = reqwest::get(url).await?.json().await?;
    Ok(parse_candidates(candidates))
}

/// Addresses that fail to parse are dropped rather than failing the whole fetch;
/// the program's API is not under our control and occasionally returns malformed
/// entries.
fn parse_candidates(candidates: Vec<Candidate>) -> BTreeSet<AccountId32> {
    candidates
        .into_iter()
        .filter_map(|c| AccountId32::from_str(&c.stash).ok())
        .collect()
}
