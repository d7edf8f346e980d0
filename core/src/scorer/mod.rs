//! Applies the fixed scoring function to a chain snapshot, producing one
//! [`RankedValidator`] per input record.
//!
//! The scorer is pure: given the same [`ScoringInput`] it always returns the same
//! ratings, histories and rank order (the only non-determinism in a run lives in
//! [`crate::cluster`], which is seeded from system entropy).

mod performance;
mod rating;

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use crate::account_id::AccountId32;
use tracing::warn;

use crate::error::CoreError;
use crate::types::{
    AccountAge, CommissionHistoryEntry, Era, EraPointsHistoryEntry, Exposure, GovernanceActivity,
    Nomination, PayoutHistoryEntry, RankedValidator, Ratings, SlashHistoryEntry, ValidatorPrefs,
    ValidatorRecord,
};

/// Everything the scorer needs beyond the validator record itself: snapshot-wide
/// derived data and the run's configuration.
pub struct ScoringInput<'a> {
    pub block_height: u64,
    /// The era window, oldest first.
    pub eras: &'a [Era],
    pub eras_per_day: u32,
    pub token_decimals: u32,
    pub max_nominator_rewarded_per_validator: u32,
    pub era_points: &'a BTreeMap<Era, BTreeMap<AccountId32, u32>>,
    pub era_prefs: &'a BTreeMap<Era, BTreeMap<AccountId32, ValidatorPrefs>>,
    pub era_slashes: &'a BTreeMap<Era, BTreeMap<AccountId32, crate::types::Stake>>,
    pub era_exposures: &'a BTreeMap<Era, BTreeMap<AccountId32, Exposure>>,
    pub nominations: &'a [Nomination],
    pub council_votes: &'a BTreeSet<AccountId32>,
    pub governance: &'a GovernanceActivity,
    pub thousand_validators: &'a BTreeSet<AccountId32>,
    pub account_ages: &'a BTreeMap<AccountId32, AccountAge>,
}

/// Scores every validator record, then sorts descending by `total_rating` (stable)
/// and assigns dense 1-based ranks.
///
/// Records that violate the "active implies exposure" invariant are logged and
/// dropped, per the error design: a schema invariant violation skips that
/// validator rather than aborting the run.
pub fn score_all(records: &[ValidatorRecord], input: &ScoringInput<'_>) -> Vec<RankedValidator> {
    let average_era_points = average_total_era_points(records, input);

    let mut scored: Vec<RankedValidator> = records
        .iter()
        .filter_map(|record| {
            if record.violates_exposure_invariant() {
                let err = CoreError::MissingExposure { stash: record.stash.to_string() };
                warn!(%err, "skipping validator");
                return None;
            }
            Some(score_one(record, input, average_era_points))
        })
        .collect();

    scored.sort_by(|a, b| b.total_rating.cmp(&a.total_rating));
    for (i, v) in scored.iter_mut().enumerate() {
        v.rank = (i + 1) as u32;
    }
    scored
}

fn average_total_era_points(records: &[ValidatorRecord], input: &ScoringInput<'_>) -> f64 {
    let sums: Vec<u32> = records
        .iter()
        .map(|r| {
            input
                .eras
                .iter()
                .filter_map(|era| input.era_points.get(era).and_then(|m| m.get(&r.stash)))
                .sum()
        })
        .collect();
    if sums.is_empty() {
        return 0.0;
    }
    sums.iter().map(|&s| s as f64).sum::<f64>() / sums.len() as f64
}

fn score_one(
    record: &ValidatorRecord,
    input: &ScoringInput<'_>,
    average_era_points: f64,
) -> RankedValidator {
    let account_age = input
        .account_ages
        .get(&record.stash)
        .copied()
        .unwrap_or_default();

    let (self_stake, total_stake, other_stake, nominator_count) = stake_and_nominators(record, input);

    let commission_percent = record.prefs.commission_percent();
    let commission_history = rating::commission_history(record, input);
    let (era_points_history, payout_history, active_eras) = era_histories(record, input);
    let slash_history = slash_history(record, input);
    let (performance, _) = performance::performance(record, input);

    let council_backing = is_backed_by_council(record, input.council_votes);
    let active_in_governance = is_active_in_governance(record, input.governance);
    let included_thousand_validators = input.thousand_validators.contains(&record.stash);

    let total_era_points: u32 = era_points_history.iter().map(|e| e.points).sum();

    let ratings = Ratings {
        active: rating::active_rating(record),
        address_creation: rating::address_creation_rating(input.block_height, account_age),
        identity: rating::identity_rating(&record.identity),
        sub_accounts: rating::sub_accounts_rating(&record.identity),
        nominators: rating::nominators_rating(nominator_count, input.max_nominator_rewarded_per_validator),
        commission: rating::commission_rating(commission_percent, &commission_history),
        era_points: rating::era_points_rating(total_era_points as f64, average_era_points),
        slash: rating::slash_rating(record, input),
        governance: rating::governance_rating(council_backing, active_in_governance),
        payout: rating::payout_rating(&payout_history, input.eras_per_day),
    };
    let total_rating = ratings.total();

    RankedValidator {
        record: record.clone(),
        account_age,
        ratings,
        total_rating,
        commission_percent,
        commission_history,
        era_points_history,
        payout_history,
        slash_history,
        self_stake,
        total_stake,
        other_stake,
        nominator_count,
        active_eras,
        council_backing,
        active_in_governance,
        included_thousand_validators,
        performance,
        // Filled in by `normalize_relative_performance` once every validator has scored.
        relative_performance: 0.0,
        cluster_name: String::new(),
        cluster_members: 0,
        part_of_cluster: false,
        show_cluster_member: true,
        dominated: false,
        rank: 0,
    }
}

fn stake_and_nominators(
    record: &ValidatorRecord,
    input: &ScoringInput<'_>,
) -> (crate::types::Stake, crate::types::Stake, crate::types::Stake, u32) {
    if record.active {
        // Invariant-checked in `score_all`: exposure is guaranteed present here.
        let exposure = record.exposure.as_ref().expect("active validator has exposure");
        let self_stake = exposure.own;
        let total_stake = exposure.total;
        let other_stake = total_stake.saturating_sub(self_stake);
        (self_stake, total_stake, other_stake, exposure.others.len() as u32)
    } else {
        let self_stake = record.staking_ledger.total;
        let nominator_count = input
            .nominations
            .iter()
            .filter(|n| n.targets.contains(&record.stash))
            .count() as u32;
        (self_stake, self_stake, crate::types::Stake::ZERO, nominator_count)
    }
}

fn era_histories(
    record: &ValidatorRecord,
    input: &ScoringInput<'_>,
) -> (Vec<EraPointsHistoryEntry>, Vec<PayoutHistoryEntry>, u32) {
    let mut points_history = Vec::with_capacity(input.eras.len());
    let mut payout_history = Vec::with_capacity(input.eras.len());
    let mut active_eras = 0u32;

    for &era in input.eras {
        let was_active = input
            .era_exposures
            .get(&era)
            .is_some_and(|m| m.contains_key(&record.stash));

        if was_active {
            active_eras += 1;
            let points = input
                .era_points
                .get(&era)
                .and_then(|m| m.get(&record.stash))
                .copied()
                .unwrap_or(0);
            points_history.push(EraPointsHistoryEntry { era, points });

            let status = if record.staking_ledger.claimed_rewards.contains(&era) {
                crate::types::PayoutStatus::Paid
            } else {
                crate::types::PayoutStatus::Pending
            };
            payout_history.push(PayoutHistoryEntry { era, status });
        } else {
            points_history.push(EraPointsHistoryEntry { era, points: 0 });
            payout_history.push(PayoutHistoryEntry {
                era,
                status: crate::types::PayoutStatus::Inactive,
            });
        }
    }

    (points_history, payout_history, active_eras)
}

/// Every era in the window where this validator was slashed a non-zero amount.
fn slash_history(record: &ValidatorRecord, input: &ScoringInput<'_>) -> Vec<SlashHistoryEntry> {
    input
        .eras
        .iter()
        .filter_map(|&era| {
            let amount = input.era_slashes.get(&era).and_then(|m| m.get(&record.stash)).copied()?;
            if amount == crate::types::Stake::ZERO {
                None
            } else {
                Some(SlashHistoryEntry { era, amount })
            }
        })
        .collect()
}

fn is_backed_by_council(record: &ValidatorRecord, council_votes: &BTreeSet<AccountId32>) -> bool {
    council_votes.contains(&record.stash)
        || record
            .identity
            .parent
            .as_ref()
            .is_some_and(|p| council_votes.contains(p))
}

fn is_active_in_governance(record: &ValidatorRecord, governance: &GovernanceActivity) -> bool {
    governance.is_active(&record.stash)
        || record
            .identity
            .parent
            .as_ref()
            .is_some_and(|p| governance.is_active(p))
}

/// Stamps `relative_performance` across a whole scored set. `min_perf` is seeded
/// at `0.0` rather than `+inf`, matching a documented quirk of the source system:
/// if every performance is positive, the effective minimum stays `0.0` and biases
/// every validator's relative performance upward. See `DESIGN.md`.
pub fn normalize_relative_performance(validators: &mut [RankedValidator]) {
    let mut min_perf = 0.0_f64;
    let mut max_perf = f64::MIN;
    for v in validators.iter() {
        if v.performance < min_perf {
            min_perf = v.performance;
        }
        if v.performance > max_perf {
            max_perf = v.performance;
        }
    }

    let spread = max_perf - min_perf;
    for v in validators.iter_mut() {
        let relative = if spread <= 0.0 {
            0.0
        } else {
            (v.performance - min_perf) / spread
        };
        // 6 decimal places, per spec.
        v.relative_performance = (relative * 1_000_000.0).round() / 1_000_000.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::*;

    fn account(byte: u8) -> AccountId32 {
        AccountId32::new([byte; 32])
    }

    fn empty_input<'a>(
        eras: &'a [Era],
        era_points: &'a BTreeMap<Era, BTreeMap<AccountId32, u32>>,
        era_prefs: &'a BTreeMap<Era, BTreeMap<AccountId32, ValidatorPrefs>>,
        era_slashes: &'a BTreeMap<Era, BTreeMap<AccountId32, Stake>>,
        era_exposures: &'a BTreeMap<Era, BTreeMap<AccountId32, Exposure>>,
        nominations: &'a [Nomination],
        council_votes: &'a BTreeSet<AccountId32>,
        governance: &'a GovernanceActivity,
        thousand_validators: &'a BTreeSet<AccountId32>,
        account_ages: &'a BTreeMap<AccountId32, AccountAge>,
    ) -> ScoringInput<'a> {
        ScoringInput {
            block_height: 1_000_000,
            eras,
            eras_per_day: 4,
            token_decimals: 12,
            max_nominator_rewarded_per_validator: 512,
            era_points,
            era_prefs,
            era_slashes,
            era_exposures,
            nominations,
            council_votes,
            governance,
            thousand_validators,
            account_ages,
        }
    }

    #[test]
    fn tiny_world_two_validators() {
        let v1 = account(1);
        let v2 = account(2);
        let eras = vec![1, 2, 3];

        let mut era_prefs = BTreeMap::new();
        era_prefs.insert(1, BTreeMap::from([(v1, ValidatorPrefs { commission: 120_000_000 })]));
        era_prefs.insert(2, BTreeMap::from([(v1, ValidatorPrefs { commission: 70_000_000 })]));
        era_prefs.insert(3, BTreeMap::from([(v1, ValidatorPrefs { commission: 70_000_000 })]));

        let mut era_exposures = BTreeMap::new();
        for &era in &eras {
            era_exposures.insert(
                era,
                BTreeMap::from([(
                    v1,
                    Exposure { own: Stake::from_u128(1_000), total: Stake::from_u128(10_000), others: vec![] },
                )]),
            );
        }

        let mut era_points = BTreeMap::new();
        for &era in &eras {
            era_points.insert(era, BTreeMap::from([(v1, 100)]));
        }

        let era_slashes = BTreeMap::new();
        let nominations = vec![];
        let council_votes = BTreeSet::from([v1]);
        let governance = GovernanceActivity { proposers: BTreeSet::from([v1]), ..Default::default() };
        let thousand_validators = BTreeSet::new();

        let mut account_ages = BTreeMap::new();
        account_ages.insert(v1, AccountAge { stash_created_at_block: 0, parent_created_at_block: None });
        account_ages.insert(v2, AccountAge { stash_created_at_block: 0, parent_created_at_block: None });

        let input = empty_input(
            &eras, &era_points, &era_prefs, &era_slashes, &era_exposures, &nominations,
            &council_votes, &governance, &thousand_validators, &account_ages,
        );

        let record_v1 = ValidatorRecord {
            stash: v1,
            controller: v1,
            active: true,
            identity: Identity {
                display: Some("Alice".into()),
                legal: Some("Alice Inc".into()),
                web: Some("https://alice.example".into()),
                email: Some("alice@example.com".into()),
                twitter: Some("@alice".into()),
                riot: Some("@alice:matrix.org".into()),
                display_parent: None,
                parent: None,
                judgements: vec![Judgement { registrar_index: 0, kind: JudgementKind::KnownGood }],
            },
            exposure: Some(Exposure { own: Stake::from_u128(1_000), total: Stake::from_u128(10_000), others: vec![] }),
            staking_ledger: StakingLedger { total: Stake::from_u128(1_000), claimed_rewards: BTreeSet::new() },
            prefs: ValidatorPrefs { commission: 70_000_000 },
        };
        let record_v2 = ValidatorRecord {
            stash: v2,
            controller: v2,
            active: false,
            identity: Identity::default(),
            exposure: None,
            staking_ledger: StakingLedger { total: Stake::from_u128(500), claimed_rewards: BTreeSet::new() },
            prefs: ValidatorPrefs { commission: PERBILL_MAX },
        };

        let mut scored = score_all(&[record_v1, record_v2], &input);
        normalize_relative_performance(&mut scored);

        let v1_scored = scored.iter().find(|v| v.record.stash == v1).unwrap();
        let v2_scored = scored.iter().find(|v| v.record.stash == v2).unwrap();

        assert_eq!(v1_scored.rank, 1);
        assert_eq!(v1_scored.ratings.commission, 3, "trending-down commission in 5-10% band upgrades to 3");
        assert_eq!(v2_scored.ratings.commission, 0, "commission of exactly 100% is always 0");
        assert_eq!(v2_scored.ratings.payout, 3, "no pending payouts for a waiting validator");
        assert!(v1_scored.total_rating > v2_scored.total_rating);
    }

    #[test]
    fn commission_exactly_100_is_zero_regardless_of_history() {
        let history = vec![
            CommissionHistoryEntry { era: 1, commission: Some(50.0) },
            CommissionHistoryEntry { era: 2, commission: Some(10.0) },
        ];
        assert_eq!(rating::commission_rating(100.0, &history), 0);
        assert_eq!(rating::commission_rating(0.0, &history), 0);
    }

    #[test]
    fn relative_performance_stays_in_unit_range() {
        let mut scored = vec![
            dummy_ranked(0.0),
            dummy_ranked(5.0),
            dummy_ranked(-2.0),
        ];
        normalize_relative_performance(&mut scored);
        for v in &scored {
            assert!((0.0..=1.0).contains(&v.relative_performance));
        }
        assert!(scored.iter().any(|v| v.relative_performance == 1.0));
    }

    #[test]
    fn relative_performance_is_zero_when_all_equal() {
        let mut scored = vec![dummy_ranked(3.0), dummy_ranked(3.0)];
        normalize_relative_performance(&mut scored);
        assert!(scored.iter().all(|v| v.relative_performance == 0.0));
    }

    fn dummy_ranked(performance: f64) -> RankedValidator {
        let stash = account(9);
        RankedValidator {
            record: ValidatorRecord {
                stash,
                controller: stash,
                active: false,
                identity: Identity::default(),
                exposure: None,
                staking_ledger: StakingLedger::default(),
                prefs: ValidatorPrefs::default(),
            },
            account_age: AccountAge::default(),
            ratings: Ratings::default(),
            total_rating: 0,
            commission_percent: 0.0,
            commission_history: vec![],
            era_points_history: vec![],
            payout_history: vec![],
            slash_history: vec![],
            self_stake: Stake::ZERO,
            total_stake: Stake::ZERO,
            other_stake: Stake::ZERO,
            nominator_count: 0,
            active_eras: 0,
            council_backing: false,
            active_in_governance: false,
            included_thousand_validators: false,
            performance,
            relative_performance: 0.0,
            cluster_name: String::new(),
            cluster_members: 0,
            part_of_cluster: false,
            show_cluster_member: true,
            dominated: false,
            rank: 0,
        }
    }
}
