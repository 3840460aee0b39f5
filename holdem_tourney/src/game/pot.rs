//! Main and side pots of a hand.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::entities::{Chips, Player, Username};

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Pot {
    pub total: Chips,
    /// Contributors who have not folded or been removed.
    pub eligible: BTreeSet<Username>,
    /// Set once an all-in capped this pot; later bets open a new one.
    pub closed: bool,
}

/// Outcome of settling one pot.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct PotAward {
    /// Zero for the main pot, then side pots in creation order.
    pub pot: usize,
    pub total: Chips,
    pub shares: Vec<(Username, Chips)>,
    /// Remainder chips of an uneven split, already folded into `shares`.
    pub odd_chips: Chips,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct PotLedger {
    pots: Vec<Pot>,
}

impl PotLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn pots(&self) -> &[Pot] {
        &self.pots
    }

    #[must_use]
    pub fn total(&self) -> Chips {
        self.pots.iter().map(|p| p.total).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pots.is_empty()
    }

    pub fn clear(&mut self) {
        self.pots.clear();
    }

    /// Sweep every player's street contribution into the pots.
    ///
    /// Contributions are layered: while some non-folded all-in player has
    /// a smaller outstanding bet than others, everyone pays up to that
    /// level into the current pot, which then closes, and the excess moves
    /// on to a fresh side pot. Returns the number of chips swept.
    pub fn add_bets_to_pot(&mut self, players: &mut [Player]) -> Chips {
        let mut swept = 0;
        while players.iter().any(|p| p.bet > 0) {
            let cap = players
                .iter()
                .filter(|p| p.bet > 0 && p.all_in && !p.folded)
                .map(|p| p.bet)
                .min();
            let level = cap.unwrap_or_else(|| players.iter().map(|p| p.bet).max().unwrap_or(0));

            if self.pots.last().is_none_or(|pot| pot.closed) {
                self.pots.push(Pot::default());
            }
            let Some(pot) = self.pots.last_mut() else {
                break;
            };
            for player in players.iter_mut().filter(|p| p.bet > 0) {
                let amount = player.bet.min(level);
                player.bet -= amount;
                pot.total += amount;
                swept += amount;
                if !player.folded {
                    pot.eligible.insert(player.name.clone());
                }
            }
            if cap.is_some() {
                pot.closed = true;
            }
        }
        swept
    }

    /// Remove a player from every pot's eligibility set. Totals are left
    /// untouched.
    pub fn disqualify(&mut self, name: &Username) {
        for pot in &mut self.pots {
            pot.eligible.remove(name);
        }
    }

    /// Award every pot and empty the ledger.
    ///
    /// `tiers` ranks the remaining players best first; players in the same
    /// tier tie. Within a tier, order decides who receives the odd chips of
    /// an uneven split, one chip each.
    pub fn settle(&mut self, tiers: &[Vec<Username>]) -> Vec<PotAward> {
        self.merge_orphans();
        let mut awards = Vec::with_capacity(self.pots.len());
        for (idx, pot) in self.pots.drain(..).enumerate() {
            let winners: Vec<&Username> = tiers
                .iter()
                .map(|tier| tier.iter().filter(|name| pot.eligible.contains(*name)).collect::<Vec<_>>())
                .find(|tier| !tier.is_empty())
                .unwrap_or_default();
            if winners.is_empty() {
                log::error!("pot {idx} of {} has no ranked winner", pot.total);
                continue;
            }
            let count = Chips::try_from(winners.len()).unwrap_or(Chips::MAX);
            let share = pot.total / count;
            let odd_chips = pot.total % count;
            let shares = winners
                .into_iter()
                .enumerate()
                .map(|(i, name)| {
                    let bonus = Chips::from(u32::try_from(i).is_ok_and(|i| i < odd_chips));
                    (name.clone(), share + bonus)
                })
                .collect();
            awards.push(PotAward {
                pot: idx,
                total: pot.total,
                shares,
                odd_chips,
            });
        }
        awards
    }

    /// Fold pots nobody can win into a neighbour.
    fn merge_orphans(&mut self) {
        for idx in (1..self.pots.len()).rev() {
            if self.pots[idx].eligible.is_empty() {
                let orphan = self.pots.remove(idx);
                self.pots[idx - 1].total += orphan.total;
            }
        }
        if self.pots.len() > 1 && self.pots[0].eligible.is_empty() {
            let orphan = self.pots.remove(0);
            self.pots[0].total += orphan.total;
        }
    }
}
