//! Hand ranking and the equity oracle consulted at showdown.

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt};

use super::{
    constants::{BOARD_CARDS, DEFAULT_ODDS_SAMPLES},
    entities::{Card, Suit, Value},
};

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Rank {
    HighCard,
    OnePair,
    TwoPair,
    ThreeOfAKind,
    Straight,
    Flush,
    FullHouse,
    FourOfAKind,
    StraightFlush,
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::HighCard => "high card",
            Self::OnePair => "a pair",
            Self::TwoPair => "two pair",
            Self::ThreeOfAKind => "three of a kind",
            Self::Straight => "a straight",
            Self::Flush => "a flush",
            Self::FullHouse => "a full house",
            Self::FourOfAKind => "four of a kind",
            Self::StraightFlush => "a straight flush",
        };
        write!(f, "{repr}")
    }
}

/// Strength of the best five-card hand. Comparison is by rank first, then
/// by the tie-break values in order.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct HandValue {
    pub rank: Rank,
    pub values: Vec<Value>,
}

impl fmt::Display for HandValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let values: Vec<String> = self.values.iter().map(|v| face(*v).to_string()).collect();
        write!(f, "{} ({})", self.rank, values.join(" "))
    }
}

fn face(value: Value) -> char {
    match value {
        14 | 1 => 'A',
        13 => 'K',
        12 => 'Q',
        11 => 'J',
        10 => 'T',
        v => char::from(b'0' + v),
    }
}

/// Highest card of a five-long run in `values`, which must be sorted
/// descending and deduplicated. Aces also play low.
fn straight_high(values: &[Value]) -> Option<Value> {
    let mut run: Vec<Value> = values.to_vec();
    if run.first() == Some(&14) {
        run.push(1);
    }
    let mut len = 1;
    for i in 1..run.len() {
        if run[i - 1] == run[i] + 1 {
            len += 1;
            if len == 5 {
                return Some(run[i] + 4);
            }
        } else {
            len = 1;
        }
    }
    None
}

/// Evaluate the best five-card hand out of up to seven cards.
///
/// Fewer than five cards are ranked on what is there, which is enough to
/// order hole cards before the flop.
#[must_use]
pub fn eval(cards: &[Card]) -> HandValue {
    let mut by_suit: BTreeMap<Suit, Vec<Value>> = BTreeMap::new();
    let mut counts: BTreeMap<Value, usize> = BTreeMap::new();
    for card in cards {
        by_suit.entry(card.1).or_default().push(card.0);
        *counts.entry(card.0).or_default() += 1;
    }

    let flush = by_suit.into_values().find(|values| values.len() >= 5).map(|mut values| {
        values.sort_unstable_by(|a, b| b.cmp(a));
        values
    });
    if let Some(values) = &flush {
        let mut distinct = values.clone();
        distinct.dedup();
        if let Some(high) = straight_high(&distinct) {
            return HandValue {
                rank: Rank::StraightFlush,
                values: vec![high],
            };
        }
    }

    // Groups ordered by multiplicity, then value, both descending.
    let mut groups: Vec<(usize, Value)> = counts.iter().map(|(v, c)| (*c, *v)).collect();
    groups.sort_unstable_by(|a, b| b.cmp(a));
    let distinct: Vec<Value> = counts.keys().rev().copied().collect();
    let kickers = |exclude: &[Value], n: usize| -> Vec<Value> {
        distinct
            .iter()
            .filter(|v| !exclude.contains(v))
            .take(n)
            .copied()
            .collect()
    };

    let (top_count, top) = groups.first().copied().unwrap_or((0, 0));
    let second = groups.get(1).copied();

    if top_count >= 4 {
        let mut values = vec![top];
        values.extend(kickers(&[top], 1));
        return HandValue {
            rank: Rank::FourOfAKind,
            values,
        };
    }
    if top_count == 3 {
        if let Some((count, pair)) = second {
            if count >= 2 {
                return HandValue {
                    rank: Rank::FullHouse,
                    values: vec![top, pair],
                };
            }
        }
    }
    if let Some(values) = flush {
        return HandValue {
            rank: Rank::Flush,
            values: values.into_iter().take(5).collect(),
        };
    }
    if let Some(high) = straight_high(&distinct) {
        return HandValue {
            rank: Rank::Straight,
            values: vec![high],
        };
    }
    if top_count == 3 {
        let mut values = vec![top];
        values.extend(kickers(&[top], 2));
        return HandValue {
            rank: Rank::ThreeOfAKind,
            values,
        };
    }
    if top_count == 2 {
        if let Some((2, low)) = second {
            let mut values = vec![top, low];
            values.extend(kickers(&[top, low], 1));
            return HandValue {
                rank: Rank::TwoPair,
                values,
            };
        }
        let mut values = vec![top];
        values.extend(kickers(&[top], 3));
        return HandValue {
            rank: Rank::OnePair,
            values,
        };
    }
    HandValue {
        rank: Rank::HighCard,
        values: kickers(&[], 5),
    }
}

/// Indices of every maximal element.
#[must_use]
pub fn argmax<T: Ord>(items: &[T]) -> Vec<usize> {
    let Some(best) = items.iter().max() else {
        return Vec::new();
    };
    items
        .iter()
        .enumerate()
        .filter(|(_, item)| *item == best)
        .map(|(idx, _)| idx)
        .collect()
}

/// Win and tie percentages for one hand.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Odds {
    pub win: f64,
    pub tie: f64,
}

impl fmt::Display for Odds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}% win, {:.1}% tie", self.win, self.tie)
    }
}

/// Ranking and equity provider.
///
/// The round only relies on `rank` for settlement. `odds` is display-only.
pub trait HandOracle: Send + Sync {
    fn rank(&self, hole: &[Card], board: &[Card]) -> HandValue;

    /// Equity of each hand in `hands` given a partial board.
    fn odds(&self, hands: &[Vec<Card>], board: &[Card]) -> Vec<Odds>;
}

/// Built-in oracle. Enumerates every remaining board when at most two
/// cards are to come, samples otherwise.
#[derive(Clone, Debug)]
pub struct StandardOracle {
    samples: usize,
}

impl StandardOracle {
    #[must_use]
    pub fn new(samples: usize) -> Self {
        Self {
            samples: samples.max(1),
        }
    }

    fn tally(&self, hands: &[Vec<Card>], board: &[Card], wins: &mut [u32], ties: &mut [u32]) {
        let values: Vec<HandValue> = hands.iter().map(|hole| self.rank(hole, board)).collect();
        let winners = argmax(&values);
        if let [winner] = winners[..] {
            wins[winner] += 1;
        } else {
            for idx in winners {
                ties[idx] += 1;
            }
        }
    }
}

impl Default for StandardOracle {
    fn default() -> Self {
        Self::new(DEFAULT_ODDS_SAMPLES)
    }
}

impl HandOracle for StandardOracle {
    fn rank(&self, hole: &[Card], board: &[Card]) -> HandValue {
        let mut cards = Vec::with_capacity(hole.len() + board.len());
        cards.extend_from_slice(hole);
        cards.extend_from_slice(board);
        eval(&cards)
    }

    fn odds(&self, hands: &[Vec<Card>], board: &[Card]) -> Vec<Odds> {
        let mut wins = vec![0u32; hands.len()];
        let mut ties = vec![0u32; hands.len()];
        let to_come = BOARD_CARDS.saturating_sub(board.len());

        let mut remaining: Vec<Card> = (2u8..=14)
            .flat_map(|v| Suit::ALL.into_iter().map(move |s| Card(v, s)))
            .filter(|card| !board.contains(card) && !hands.iter().any(|h| h.contains(card)))
            .collect();

        let mut runs = 0u32;
        let mut full = board.to_vec();
        match to_come {
            0 => {
                self.tally(hands, &full, &mut wins, &mut ties);
                runs = 1;
            }
            1 => {
                for card in &remaining {
                    full.push(*card);
                    self.tally(hands, &full, &mut wins, &mut ties);
                    full.pop();
                    runs += 1;
                }
            }
            2 => {
                for (i, first) in remaining.iter().enumerate() {
                    for second in &remaining[i + 1..] {
                        full.push(*first);
                        full.push(*second);
                        self.tally(hands, &full, &mut wins, &mut ties);
                        full.truncate(board.len());
                        runs += 1;
                    }
                }
            }
            _ => {
                let mut rng = rand::rng();
                for _ in 0..self.samples {
                    let (drawn, _) = remaining.partial_shuffle(&mut rng, to_come);
                    full.extend_from_slice(drawn);
                    self.tally(hands, &full, &mut wins, &mut ties);
                    full.truncate(board.len());
                    runs += 1;
                }
            }
        }

        let runs = f64::from(runs.max(1));
        wins.iter()
            .zip(&ties)
            .map(|(w, t)| Odds {
                win: f64::from(*w) * 100.0 / runs,
                tie: f64::from(*t) * 100.0 / runs,
            })
            .collect()
    }
}
