//! Groups validators by identity parent or display-name prefix, then randomly hides
//! a size-dependent share of each cluster's members from default visibility.

use std::collections::BTreeMap;

use rand::seq::SliceRandom;

use crate::types::RankedValidator;

/// Assigns `cluster_name`, `cluster_members` and `part_of_cluster` to every
/// validator, then samples `show_cluster_member` per the size bands below.
pub fn analyze(validators: &mut [RankedValidator]) {
    assign_clusters(validators);
    sample_visibility(validators);
}

fn assign_clusters(validators: &mut [RankedValidator]) {
    let mut parent_counts: BTreeMap<String, u32> = BTreeMap::new();
    let mut prefix_counts: BTreeMap<String, u32> = BTreeMap::new();

    for v in validators.iter() {
        if let Some(parent) = non_empty(&v.record.identity.display_parent) {
            *parent_counts.entry(parent.to_string()).or_default() += 1;
        } else if let Some(display) = non_empty(&v.record.identity.display) {
            *prefix_counts.entry(prefix_of(display)).or_default() += 1;
        }
    }

    for v in validators.iter_mut() {
        if let Some(parent) = non_empty(&v.record.identity.display_parent) {
            v.cluster_name = parent.to_string();
            v.cluster_members = parent_counts[parent];
        } else if let Some(display) = non_empty(&v.record.identity.display) {
            let prefix = prefix_of(display);
            v.cluster_name = strip_cluster_name_suffix(display);
            v.cluster_members = prefix_counts[&prefix];
        } else {
            v.cluster_name = String::new();
            v.cluster_members = 0;
        }
        v.part_of_cluster = v.cluster_members > 1;
    }
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

fn prefix_of(display: &str) -> String {
    display.chars().take(6).collect()
}

/// Strips up to 2 trailing ASCII digits, then any trailing `-`/`_`.
fn strip_cluster_name_suffix(display: &str) -> String {
    let mut chars: Vec<char> = display.chars().collect();
    for _ in 0..2 {
        if chars.last().is_some_and(|c| c.is_ascii_digit()) {
            chars.pop();
        } else {
            break;
        }
    }
    while chars.last().is_some_and(|c| *c == '-' || *c == '_') {
        chars.pop();
    }
    chars.into_iter().collect()
}

/// Number of members that stay visible for a cluster of the given size.
fn visible_count(size: u32) -> u32 {
    match size {
        0 | 1 => size,
        2 => 2,
        3..=10 => (0.8 * size as f64).floor() as u32,
        11..=20 => (0.6 * size as f64).floor() as u32,
        21..=50 => (0.4 * size as f64).floor() as u32,
        _ => (0.2 * size as f64).floor() as u32,
    }
}

/// The same key `assign_clusters` groups by when computing `cluster_members`:
/// the identity parent name, or the 6-char display prefix. Unlike `cluster_name`
/// (cosmetic, suffix-stripped for display) this key must stay exactly in sync
/// with `cluster_members`, or sampling splits one real cluster into several.
fn cluster_key(v: &RankedValidator) -> Option<String> {
    if let Some(parent) = non_empty(&v.record.identity.display_parent) {
        Some(parent.to_string())
    } else {
        non_empty(&v.record.identity.display).map(prefix_of)
    }
}

fn sample_visibility(validators: &mut [RankedValidator]) {
    let mut by_cluster: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for (i, v) in validators.iter().enumerate() {
        if v.cluster_members > 1 {
            if let Some(key) = cluster_key(v) {
                by_cluster.entry(key).or_default().push(i);
            }
        }
    }

    let mut rng = rand::thread_rng();
    for indices in by_cluster.values() {
        let size = indices.len() as u32;
        let show = visible_count(size);
        let hide = size.saturating_sub(show) as usize;

        let mut shuffled = indices.clone();
        shuffled.shuffle(&mut rng);
        let hidden: std::collections::HashSet<usize> = shuffled.into_iter().take(hide).collect();

        for &i in indices {
            validators[i].show_cluster_member = !hidden.contains(&i);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visibility_bands_match_spec_table() {
        assert_eq!(visible_count(2), 2);
        assert_eq!(visible_count(3), 2); // floor(0.8*3) = 2
        assert_eq!(visible_count(10), 8);
        assert_eq!(visible_count(11), 6); // floor(0.6*11) = 6
        assert_eq!(visible_count(20), 12);
        assert_eq!(visible_count(21), 8); // floor(0.4*21) = 8
        assert_eq!(visible_count(50), 20);
        assert_eq!(visible_count(51), 10); // floor(0.2*51) = 10
    }

    #[test]
    fn cluster_of_twelve_hides_exactly_five() {
        use crate::types::*;
        use crate::account_id::AccountId32;

        let mut validators: Vec<RankedValidator> = (0..12u8)
            .map(|i| {
                let stash = AccountId32::new([i; 32]);
                RankedValidator {
                    record: ValidatorRecord {
                        stash,
                        controller: stash,
                        active: false,
                        identity: Identity { display_parent: Some("Acme".into()), ..Default::default() },
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
                    performance: 0.0,
                    relative_performance: 0.0,
                    cluster_name: String::new(),
                    cluster_members: 0,
                    part_of_cluster: false,
                    show_cluster_member: true,
                    dominated: false,
                    rank: 0,
                }
            })
            .collect();

        analyze(&mut validators);

        assert!(validators.iter().all(|v| v.cluster_members == 12));
        let hidden = validators.iter().filter(|v| !v.show_cluster_member).count();
        assert_eq!(hidden, 5, "band M (11-20) shows floor(0.6*12)=7, hides 5");
    }

    #[test]
    fn singleton_is_never_sampled() {
        use crate::types::*;
        use crate::account_id::AccountId32;

        let stash = AccountId32::new([1; 32]);
        let mut validators = vec![RankedValidator {
            record: ValidatorRecord {
                stash,
                controller: stash,
                active: false,
                identity: Identity { display: Some("Solo".into()), ..Default::default() },
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
            performance: 0.0,
            relative_performance: 0.0,
            cluster_name: String::new(),
            cluster_members: 0,
            part_of_cluster: false,
            show_cluster_member: true,
            dominated: false,
            rank: 0,
        }];

        analyze(&mut validators);
        assert_eq!(validators[0].cluster_members, 1);
        assert!(!validators[0].part_of_cluster);
        assert!(validators[0].show_cluster_member);
    }

    #[test]
    fn cluster_name_strips_trailing_digits_and_separator() {
        assert_eq!(strip_cluster_name_suffix("Staker-01"), "Staker");
        assert_eq!(strip_cluster_name_suffix("Staker_2"), "Staker");
        assert_eq!(strip_cluster_name_suffix("Staker"), "Staker");
    }
}
