//! Token selection engine.
//!
//! A pure function choosing a token subset whose denominations cover a
//! required amount. This is a constrained subset-sum; the engine uses a
//! greedy accumulation followed by bounded single-swap repair rather than
//! exhaustive enumeration. That is a deliberate heuristic — per-user token
//! counts are small and the result is fully deterministic, but it is not
//! an optimal subset-sum solver.
//!
//! The exact tie-break policy is configuration, not a load-bearing
//! contract: callers pick a [`SelectionPolicy`] and may always bypass
//! selection entirely by submitting an explicit token set (the transaction
//! engine re-validates sufficiency regardless of who chose the set).

use serde::{Deserialize, Serialize};

use crate::domain::entities::token::TimeToken;
use crate::errors::LedgerError;

/// Policy applied when multiple subsets could cover the required amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SelectionPolicy {
    /// Minimize the number of tokens used, then the overshoot
    #[default]
    FewestTokens,
    /// Minimize overshoot (selected sum minus required), then token count
    SmallestOvershoot,
}

impl std::str::FromStr for SelectionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fewest_tokens" => Ok(SelectionPolicy::FewestTokens),
            "smallest_overshoot" => Ok(SelectionPolicy::SmallestOvershoot),
            other => Err(format!("unknown selection policy: {}", other)),
        }
    }
}

/// Choose a token subset whose denominations sum to at least `required`
///
/// Ties are broken by earliest `created_at`, then id, so the result is
/// deterministic for any input ordering.
///
/// # Arguments
/// * `tokens` - The candidate tokens (the caller's spendable holdings)
/// * `required` - Minutes the subset must cover; `<= 0` selects nothing
/// * `policy` - Tie-break policy between subset candidates
///
/// # Errors
/// * `LedgerError::InsufficientFunds` - the full set sums below `required`
pub fn select_tokens(
    tokens: &[TimeToken],
    required: i32,
    policy: SelectionPolicy,
) -> Result<Vec<TimeToken>, LedgerError> {
    if required <= 0 {
        return Ok(Vec::new());
    }

    let available: i32 = tokens.iter().map(|t| t.denomination).sum();
    if available < required {
        return Err(LedgerError::InsufficientFunds {
            available,
            required,
        });
    }

    let mut candidates: Vec<&TimeToken> = tokens.iter().collect();
    let mut selected = match policy {
        SelectionPolicy::FewestTokens => {
            // Largest-first accumulation reaches the target with the fewest
            // tokens this greedy can achieve
            candidates.sort_by(|a, b| {
                b.denomination
                    .cmp(&a.denomination)
                    .then(a.created_at.cmp(&b.created_at))
                    .then(a.id.cmp(&b.id))
            });
            accumulate(&candidates, required)
        }
        SelectionPolicy::SmallestOvershoot => {
            // Smallest-first accumulation, then prune what the sum no
            // longer needs
            candidates.sort_by(|a, b| {
                a.denomination
                    .cmp(&b.denomination)
                    .then(a.created_at.cmp(&b.created_at))
                    .then(a.id.cmp(&b.id))
            });
            let mut picked = accumulate(&candidates, required);
            prune(&mut picked, required);
            picked
        }
    };

    repair(&mut selected, &candidates, required);

    Ok(selected.into_iter().cloned().collect())
}

/// Take tokens in order until the running sum reaches `required`
fn accumulate<'a>(candidates: &[&'a TimeToken], required: i32) -> Vec<&'a TimeToken> {
    let mut selected = Vec::new();
    let mut sum = 0;
    for token in candidates {
        if sum >= required {
            break;
        }
        selected.push(*token);
        sum += token.denomination;
    }
    selected
}

/// Drop tokens, largest first, while the sum still covers `required`
fn prune(selected: &mut Vec<&TimeToken>, required: i32) {
    let mut sum: i32 = selected.iter().map(|t| t.denomination).sum();
    let mut by_size: Vec<usize> = (0..selected.len()).collect();
    by_size.sort_by(|&a, &b| selected[b].denomination.cmp(&selected[a].denomination));

    let mut removed = vec![false; selected.len()];
    for index in by_size {
        if sum - selected[index].denomination >= required {
            sum -= selected[index].denomination;
            removed[index] = true;
        }
    }
    let mut keep_iter = removed.iter();
    selected.retain(|_| !*keep_iter.next().unwrap());
}

/// Bounded local search: swap a selected token for a smaller unused one
/// whenever that still covers `required` with strictly smaller overshoot.
/// Repeats to a fixpoint, bounded by the token count.
fn repair<'a>(selected: &mut Vec<&'a TimeToken>, candidates: &[&'a TimeToken], required: i32) {
    let max_passes = candidates.len();

    for _ in 0..max_passes {
        let sum: i32 = selected.iter().map(|t| t.denomination).sum();
        let mut best_swap: Option<(usize, &TimeToken)> = None;
        let mut best_overshoot = sum - required;

        for (index, current) in selected.iter().enumerate() {
            for replacement in candidates {
                if selected.iter().any(|t| t.id == replacement.id) {
                    continue;
                }
                if replacement.denomination >= current.denomination {
                    continue;
                }
                let new_sum = sum - current.denomination + replacement.denomination;
                let new_overshoot = new_sum - required;
                if new_overshoot >= 0 && new_overshoot < best_overshoot {
                    best_overshoot = new_overshoot;
                    best_swap = Some((index, replacement));
                }
            }
        }

        match best_swap {
            Some((index, replacement)) => selected[index] = replacement,
            None => break,
        }
    }
}
