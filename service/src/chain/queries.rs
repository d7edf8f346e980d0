//! Small, pure helpers around the raw RPC calls in [`super::client`].

use validator_rank_core::types::Era;

/// The trailing window of eras to pull history for, oldest first, excluding the
/// current (still in-progress) era.
pub fn era_window(current_era: Era, history_size: u32) -> Vec<Era> {
    (current_era.saturating_sub(history_size)..current_era).collect()
}
