//! Per-era performance, normalized by stake, summed over the active eras in the window.

use crate::types::ValidatorRecord;

use super::ScoringInput;

/// `eraPerformance = points * (1 - commission/100) / (eraTotalStake / 10^tokenDecimals)`.
/// Eras the validator wasn't active in contribute nothing.
pub fn performance(record: &ValidatorRecord, input: &ScoringInput<'_>) -> (f64, u32) {
    let mut total = 0.0;
    let mut active_eras = 0u32;

    for &era in input.eras {
        let Some(exposure) = input.era_exposures.get(&era).and_then(|m| m.get(&record.stash)) else {
            continue;
        };
        active_eras += 1;

        let points = input
            .era_points
            .get(&era)
            .and_then(|m| m.get(&record.stash))
            .copied()
            .unwrap_or(0) as f64;
        let commission = input
            .era_prefs
            .get(&era)
            .and_then(|m| m.get(&record.stash))
            .map(|p| p.commission_percent())
            .unwrap_or_else(|| record.prefs.commission_percent());

        let era_total_stake = exposure.total.as_f64() / 10f64.powi(input.token_decimals as i32);
        if era_total_stake > 0.0 {
            total += (points * (1.0 - commission / 100.0)) / era_total_stake;
        }
    }

    (total, active_eras)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::*;
    use crate::account_id::AccountId32;
    use std::collections::{BTreeMap, BTreeSet};

    fn input_with_one_active_era<'a>(
        stash: AccountId32,
        eras: &'a [Era],
        era_points: &'a BTreeMap<Era, BTreeMap<AccountId32, u32>>,
        era_prefs: &'a BTreeMap<Era, BTreeMap<AccountId32, ValidatorPrefs>>,
        era_exposures: &'a BTreeMap<Era, BTreeMap<AccountId32, Exposure>>,
        era_slashes: &'a BTreeMap<Era, BTreeMap<AccountId32, Stake>>,
        nominations: &'a [Nomination],
        council_votes: &'a BTreeSet<AccountId32>,
        governance: &'a GovernanceActivity,
        thousand_validators: &'a BTreeSet<AccountId32>,
        account_ages: &'a BTreeMap<AccountId32, AccountAge>,
    ) -> ScoringInput<'a> {
        let _ = stash;
        ScoringInput {
            block_height: 1000,
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
    fn inactive_eras_contribute_nothing() {
        let stash = AccountId32::new([7; 32]);
        let eras = vec![1, 2];
        let mut era_exposures = BTreeMap::new();
        era_exposures.insert(
            1,
            BTreeMap::from([(
                stash,
                Exposure { own: Stake::from_u128(100), total: Stake::from_u128(1_000_000_000_000), others: vec![] },
            )]),
        );
        // era 2: validator not in the exposure map => treated as inactive that era.
        let era_points = BTreeMap::from([(1, BTreeMap::from([(stash, 100)])), (2, BTreeMap::from([(stash, 999)]))]);
        let era_prefs = BTreeMap::new();
        let era_slashes = BTreeMap::new();
        let nominations = vec![];
        let council_votes = BTreeSet::new();
        let governance = GovernanceActivity::default();
        let thousand_validators = BTreeSet::new();
        let account_ages = BTreeMap::new();

        let input = input_with_one_active_era(
            stash, &eras, &era_points, &era_prefs, &era_exposures, &era_slashes,
            &nominations, &council_votes, &governance, &thousand_validators, &account_ages,
        );
        let record = ValidatorRecord {
            stash,
            controller: stash,
            active: true,
            identity: Identity::default(),
            exposure: era_exposures.get(&1).and_then(|m| m.get(&stash)).cloned(),
            staking_ledger: StakingLedger::default(),
            prefs: ValidatorPrefs { commission: 50_000_000 },
        };

        let (perf, active_eras) = performance(&record, &input);
        assert_eq!(active_eras, 1, "era 2 has no exposure entry, so it doesn't count as active");
        assert!(perf > 0.0);
    }
}
