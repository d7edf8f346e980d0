//! Pareto dominance across four dimensions: relative performance, self stake,
//! active eras, and total rating. O(N^2) over the ranking, acceptable for the
//! validator-set sizes this pipeline deals with (a few thousand at most).

use crate::types::RankedValidator;

/// Marks `dominated` on every validator for which some other validator is weakly
/// better or equal on all four dimensions. Ties do not break domination: two
/// validators identical on all four dimensions are both marked dominated, since
/// each weakly dominates the other. This mirrors a known quirk of the source
/// system and is preserved deliberately - see `DESIGN.md`.
pub fn analyze(validators: &mut [RankedValidator]) {
    let n = validators.len();
    let mut dominated = vec![false; n];

    for i in 0..n {
        for j in 0..n {
            if i == j {
                continue;
            }
            if weakly_dominates(&validators[j], &validators[i]) {
                dominated[i] = true;
                break;
            }
        }
    }

    for (v, d) in validators.iter_mut().zip(dominated) {
        v.dominated = d;
    }
}

fn weakly_dominates(o: &RankedValidator, v: &RankedValidator) -> bool {
    o.relative_performance >= v.relative_performance
        && o.self_stake >= v.self_stake
        && o.active_eras >= v.active_eras
        && o.total_rating >= v.total_rating
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::*;
    use crate::account_id::AccountId32;

    fn make(byte: u8, perf: f64, stake: u128, eras: u32, rating: u32) -> RankedValidator {
        let stash = AccountId32::new([byte; 32]);
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
            total_rating: rating,
            commission_percent: 0.0,
            commission_history: vec![],
            era_points_history: vec![],
            payout_history: vec![],
            slash_history: vec![],
            self_stake: Stake::from_u128(stake),
            total_stake: Stake::from_u128(stake),
            other_stake: Stake::ZERO,
            nominator_count: 0,
            active_eras: eras,
            council_backing: false,
            active_in_governance: false,
            included_thousand_validators: false,
            performance: perf,
            relative_performance: perf,
            cluster_name: String::new(),
            cluster_members: 0,
            part_of_cluster: false,
            show_cluster_member: true,
            dominated: false,
            rank: 0,
        }
    }

    #[test]
    fn strictly_worse_validator_is_dominated() {
        let mut validators = vec![make(1, 0.5, 100, 5, 10), make(2, 0.9, 200, 8, 20)];
        analyze(&mut validators);
        assert!(validators[0].dominated);
        assert!(!validators[1].dominated);
    }

    #[test]
    fn exact_ties_are_mutually_dominated() {
        let mut validators = vec![make(1, 0.5, 100, 5, 10), make(2, 0.5, 100, 5, 10)];
        analyze(&mut validators);
        assert!(validators[0].dominated);
        assert!(validators[1].dominated);
    }

    #[test]
    fn incomparable_validators_are_not_dominated() {
        // v1 has higher performance, v2 has higher stake: neither dominates.
        let mut validators = vec![make(1, 0.9, 50, 5, 10), make(2, 0.1, 500, 5, 10)];
        analyze(&mut validators);
        assert!(!validators[0].dominated);
        assert!(!validators[1].dominated);
    }
}
