//! The individual rating dimensions that sum into `total_rating`.

use crate::types::{
    AccountAge, CommissionHistoryEntry, Identity, PayoutHistoryEntry, PayoutStatus, ValidatorRecord,
};

use super::ScoringInput;

pub fn active_rating(record: &ValidatorRecord) -> u32 {
    if record.active {
        2
    } else {
        0
    }
}

pub fn address_creation_rating(block_height: u64, age: AccountAge) -> u32 {
    let best = age.best_block();
    if best <= block_height / 4 {
        3
    } else if best <= block_height / 2 {
        2
    } else if best <= 3 * block_height / 4 {
        1
    } else {
        0
    }
}

pub fn identity_rating(identity: &Identity) -> u32 {
    if identity.is_verified() && identity.all_fields_present() {
        3
    } else if identity.is_verified() {
        2
    } else if !identity.name().is_empty() {
        1
    } else {
        0
    }
}

pub fn sub_accounts_rating(identity: &Identity) -> u32 {
    if identity.has_sub_identity_parent() {
        2
    } else {
        0
    }
}

pub fn nominators_rating(nominator_count: u32, max_nominator_rewarded_per_validator: u32) -> u32 {
    if nominator_count > 0 && nominator_count <= max_nominator_rewarded_per_validator {
        2
    } else {
        0
    }
}

/// Iterates `era_prefs` in era order, emitting one entry per era in the window.
pub fn commission_history(
    record: &ValidatorRecord,
    input: &ScoringInput<'_>,
) -> Vec<CommissionHistoryEntry> {
    input
        .eras
        .iter()
        .map(|&era| {
            let commission = input
                .era_prefs
                .get(&era)
                .and_then(|m| m.get(&record.stash))
                .map(|prefs| prefs.commission_percent());
            CommissionHistoryEntry { era, commission }
        })
        .collect()
}

/// Commission banding. Rejects both 0% and 100% as anti-social/indicative of a
/// private pool; otherwise bands on the current commission, with the 5-10% band
/// upgraded when the validator's commission history trends downward (oldest
/// recorded commission exceeds the newest). The comparison is on the numeric
/// commission values, not on object identity - a documented fix versus the source
/// system, which compared the raw history objects. See `DESIGN.md`.
pub fn commission_rating(commission_percent: f64, history: &[CommissionHistoryEntry]) -> u32 {
    if commission_percent == 0.0 || commission_percent == 100.0 {
        return 0;
    }
    if commission_percent > 10.0 {
        return 1;
    }
    if (5.0..=10.0).contains(&commission_percent) {
        let trending_down = history
            .iter()
            .filter_map(|e| e.commission)
            .next()
            .zip(history.iter().rev().filter_map(|e| e.commission).next())
            .is_some_and(|(oldest, newest)| oldest > newest);
        return if trending_down { 3 } else { 2 };
    }
    3
}

pub fn era_points_rating(validator_total_points: f64, average_total_points: f64) -> u32 {
    if validator_total_points > average_total_points {
        2
    } else {
        0
    }
}

pub fn slash_rating(record: &ValidatorRecord, input: &ScoringInput<'_>) -> u32 {
    let slashed = input.eras.iter().any(|era| {
        input
            .era_slashes
            .get(era)
            .and_then(|m| m.get(&record.stash))
            .is_some_and(|amount| *amount != crate::types::Stake::ZERO)
    });
    if slashed {
        0
    } else {
        2
    }
}

pub fn governance_rating(council_backing: bool, active_in_governance: bool) -> u32 {
    match (council_backing, active_in_governance) {
        (true, true) => 3,
        (false, false) => 0,
        _ => 2,
    }
}

pub fn payout_rating(history: &[PayoutHistoryEntry], eras_per_day: u32) -> u32 {
    let pending = history.iter().filter(|e| e.status == PayoutStatus::Pending).count() as u32;
    let e = eras_per_day;
    if pending <= e {
        3
    } else if pending <= 3 * e {
        2
    } else if pending < 7 * e {
        1
    } else {
        0
    }
}
