use std::collections::HashMap;

use crate::cards::{rank_counts, Card, Rank};

/// How a best-keep card relates to the player's own keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Highlight {
    /// The player holds a card of this rank (suits are interchangeable).
    Match,
    /// A genuine substitution.
    NoMatch,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Reconciliation {
    pub matched: Vec<Card>,
    pub unmatched: Vec<Card>,
}

impl Reconciliation {
    pub fn is_complete(&self) -> bool {
        self.unmatched.is_empty()
    }
}

/// Labels each card of `best` in order. A card matches while the player
/// still has an unclaimed card of the same rank.
pub fn classify(user: &[Card], best: &[Card]) -> Vec<Highlight> {
    let available = rank_counts(user);
    let mut claimed: HashMap<Rank, usize> = HashMap::new();
    best.iter()
        .map(|card| {
            let held = available.get(&card.rank).copied().unwrap_or(0);
            let used = claimed.entry(card.rank).or_insert(0);
            if held > *used {
                *used += 1;
                Highlight::Match
            } else {
                Highlight::NoMatch
            }
        })
        .collect()
}

/// Splits `best` into the cards the player already effectively holds and
/// the rest. Both outputs keep `best`'s order and together partition it.
pub fn reconcile(user: &[Card], best: &[Card]) -> Reconciliation {
    let (matched, unmatched): (Vec<_>, Vec<_>) = best
        .iter()
        .zip(classify(user, best))
        .partition(|(_, h)| *h == Highlight::Match);
    Reconciliation {
        matched: matched.into_iter().map(|(c, _)| *c).collect(),
        unmatched: unmatched.into_iter().map(|(c, _)| *c).collect(),
    }
}
