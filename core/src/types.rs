//! Chain-derived domain model shared by every stage of the pipeline.

use std::collections::BTreeSet;
use std::fmt;

use primitive_types::U256;
use serde::{Deserialize, Serialize};

use crate::account_id::AccountId32;

/// An epoch identifier. Monotonically increasing.
pub type Era = u32;

/// `ValidatorPrefs.commission`, expressed in parts-per-billion as the chain stores it.
pub type PerbillInt = u32;

pub const PERBILL_MAX: PerbillInt = 1_000_000_000;

/// Arbitrary-precision, non-negative chain balance. All arithmetic is exact: we never
/// coerce into a float until the scoring stage needs one for `performance`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Stake(#[serde(with = "stake_serde")] pub U256);

mod stake_serde {
    use primitive_types::U256;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &U256, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<U256, D::Error> {
        let raw = String::deserialize(d)?;
        U256::from_dec_str(&raw).map_err(serde::de::Error::custom)
    }
}

impl Stake {
    pub const ZERO: Stake = Stake(U256::zero());

    pub fn from_u128(value: u128) -> Self {
        Stake(U256::from(value))
    }

    /// Lossy conversion used only for the `performance` normalization, which is
    /// inherently floating point per the scoring spec.
    pub fn as_f64(&self) -> f64 {
        // U256 doesn't implement a direct `as f64`; go via its decimal string for
        // values that exceed u128, which is the expected rare case for total stake.
        if let Ok(v) = u128::try_from(self.0) {
            v as f64
        } else {
            self.0.to_string().parse().unwrap_or(f64::MAX)
        }
    }

    pub fn saturating_sub(&self, other: Stake) -> Stake {
        Stake(self.0.saturating_sub(other.0))
    }
}

impl fmt::Display for Stake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::ops::Add for Stake {
    type Output = Stake;
    fn add(self, rhs: Stake) -> Stake {
        Stake(self.0 + rhs.0)
    }
}

/// The kind of attestation a registrar judgement carries.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum JudgementKind {
    FeePaid,
    KnownGood,
    Reasonable,
    /// Anything else the chain reports (`Erroneous`, `LowQuality`, `OutOfDate`, ...).
    Other(String),
}

/// A registrar's attestation about an identity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Judgement {
    pub registrar_index: u32,
    pub kind: JudgementKind,
}

/// On-chain identity information for a stash (or its identity parent).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub display: Option<String>,
    pub legal: Option<String>,
    pub web: Option<String>,
    pub email: Option<String>,
    pub twitter: Option<String>,
    pub riot: Option<String>,
    /// Display name of the identity's parent, if this is a sub-identity.
    pub display_parent: Option<String>,
    /// The parent account, if this is a sub-identity.
    pub parent: Option<AccountId32>,
    pub judgements: Vec<Judgement>,
}

fn non_empty(field: &Option<String>) -> bool {
    field.as_deref().is_some_and(|s| !s.is_empty())
}

impl Identity {
    /// Verified iff it carries at least one non-`FeePaid` judgement of kind
    /// `KnownGood` or `Reasonable`.
    pub fn is_verified(&self) -> bool {
        self.judgements
            .iter()
            .any(|j| matches!(j.kind, JudgementKind::KnownGood | JudgementKind::Reasonable))
    }

    /// All of {display, legal, web, email, twitter, riot} are non-empty.
    pub fn all_fields_present(&self) -> bool {
        non_empty(&self.display)
            && non_empty(&self.legal)
            && non_empty(&self.web)
            && non_empty(&self.email)
            && non_empty(&self.twitter)
            && non_empty(&self.riot)
    }

    /// `"{displayParent}/{display}"` when both are set, else just `display`.
    pub fn name(&self) -> String {
        match (&self.display_parent, &self.display) {
            (Some(parent), Some(display)) if !parent.is_empty() && !display.is_empty() => {
                format!("{parent}/{display}")
            }
            _ => self.display.clone().unwrap_or_default(),
        }
    }

    pub fn has_sub_identity_parent(&self) -> bool {
        self.parent.is_some()
    }
}

/// Per-era record of a validator's own stake plus nominator stakes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exposure {
    pub own: Stake,
    pub total: Stake,
    pub others: Vec<IndividualExposure>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndividualExposure {
    pub who: AccountId32,
    pub value: Stake,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakingLedger {
    pub total: Stake,
    pub claimed_rewards: BTreeSet<Era>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorPrefs {
    pub commission: PerbillInt,
}

impl ValidatorPrefs {
    /// Commission as a percentage with 2-decimal precision (`commission / 1e7`).
    pub fn commission_percent(&self) -> f64 {
        self.commission as f64 / 1e7
    }
}

/// A single nominator's set of targets.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nomination {
    pub nominator: AccountId32,
    pub targets: Vec<AccountId32>,
}

/// Proposers, seconders and referendum voters observed in the democracy pallet.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernanceActivity {
    pub proposers: BTreeSet<AccountId32>,
    pub seconders: BTreeSet<AccountId32>,
    pub referendum_voters: BTreeSet<AccountId32>,
}

impl GovernanceActivity {
    pub fn is_active(&self, who: &AccountId32) -> bool {
        self.proposers.contains(who) || self.seconders.contains(who) || self.referendum_voters.contains(who)
    }
}

/// A validator or waiting intention, before scoring.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorRecord {
    pub stash: AccountId32,
    pub controller: AccountId32,
    pub active: bool,
    pub identity: Identity,
    /// Only populated for currently active validators.
    pub exposure: Option<Exposure>,
    pub staking_ledger: StakingLedger,
    pub prefs: ValidatorPrefs,
}

impl ValidatorRecord {
    /// A schema invariant violation: an active validator with no exposure data.
    pub fn violates_exposure_invariant(&self) -> bool {
        self.active && self.exposure.is_none()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PayoutStatus {
    Paid,
    Pending,
    Inactive,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CommissionHistoryEntry {
    pub era: Era,
    /// `None` when the validator had no preferences recorded for this era.
    pub commission: Option<f64>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EraPointsHistoryEntry {
    pub era: Era,
    pub points: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PayoutHistoryEntry {
    pub era: Era,
    pub status: PayoutStatus,
}

/// A non-zero slash recorded against the validator in a given era.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SlashHistoryEntry {
    pub era: Era,
    pub amount: Stake,
}

/// The per-dimension integer ratings that sum into `total_rating`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ratings {
    pub active: u32,
    pub address_creation: u32,
    pub identity: u32,
    pub sub_accounts: u32,
    pub nominators: u32,
    pub commission: u32,
    pub era_points: u32,
    pub slash: u32,
    pub governance: u32,
    pub payout: u32,
}

impl Ratings {
    pub fn total(&self) -> u32 {
        self.active
            + self.address_creation
            + self.identity
            + self.sub_accounts
            + self.nominators
            + self.commission
            + self.era_points
            + self.slash
            + self.governance
            + self.payout
    }
}

/// The block height at which a stash, and optionally its identity parent, first
/// appeared on chain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountAge {
    pub stash_created_at_block: u64,
    pub parent_created_at_block: Option<u64>,
}

impl AccountAge {
    /// The more favourable (earlier) of the two ages, used for `addressCreationRating`.
    pub fn best_block(&self) -> u64 {
        match self.parent_created_at_block {
            Some(parent) => self.stash_created_at_block.min(parent),
            None => self.stash_created_at_block,
        }
    }
}

/// A validator record extended with scores and derived metrics, produced once per run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RankedValidator {
    pub record: ValidatorRecord,
    pub account_age: AccountAge,

    pub ratings: Ratings,
    pub total_rating: u32,

    pub commission_percent: f64,
    pub commission_history: Vec<CommissionHistoryEntry>,
    pub era_points_history: Vec<EraPointsHistoryEntry>,
    pub payout_history: Vec<PayoutHistoryEntry>,
    pub slash_history: Vec<SlashHistoryEntry>,

    pub self_stake: Stake,
    pub total_stake: Stake,
    pub other_stake: Stake,
    pub nominator_count: u32,
    pub active_eras: u32,

    pub council_backing: bool,
    pub active_in_governance: bool,
    pub included_thousand_validators: bool,

    pub performance: f64,
    pub relative_performance: f64,

    pub cluster_name: String,
    pub cluster_members: u32,
    pub part_of_cluster: bool,
    pub show_cluster_member: bool,

    pub dominated: bool,
    pub rank: u32,
}

impl RankedValidator {
    pub fn stash(&self) -> &AccountId32 {
        &self.record.stash
    }
}
