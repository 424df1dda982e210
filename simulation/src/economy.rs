//! Score and gold ledger fed by enemy deaths.

use werian_defence_core::Reward;

/// Score and gold balances.
///
/// Affordability is checked by whoever issues placement and upgrade
/// requests; the simulation itself never refuses a request for lack of gold.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Economy {
    score: u32,
    gold: u32,
}

impl Economy {
    /// Creates a ledger with zero score and the provided gold.
    #[must_use]
    pub const fn new(starting_gold: u32) -> Self {
        Self {
            score: 0,
            gold: starting_gold,
        }
    }

    /// Accumulated score.
    #[must_use]
    pub const fn score(&self) -> u32 {
        self.score
    }

    /// Gold available to spend.
    #[must_use]
    pub const fn gold(&self) -> u32 {
        self.gold
    }

    /// Reports whether the balance covers `price`.
    #[must_use]
    pub const fn can_afford(&self, price: u32) -> bool {
        self.gold >= price
    }

    /// Deducts `price` when affordable, returning whether it was.
    pub fn spend(&mut self, price: u32) -> bool {
        if !self.can_afford(price) {
            return false;
        }
        self.gold -= price;
        true
    }

    /// Adds the reward for one enemy death.
    pub fn credit(&mut self, reward: Reward) {
        self.score = self.score.saturating_add(reward.points);
        self.gold = self.gold.saturating_add(reward.gold);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spending_is_refused_beyond_balance() {
        let mut economy = Economy::new(100);
        assert!(economy.spend(50));
        assert!(economy.spend(50));
        assert!(!economy.spend(1));
        assert_eq!(economy.gold(), 0);
    }

    #[test]
    fn rewards_raise_score_and_gold() {
        let mut economy = Economy::new(100);
        economy.credit(Reward {
            points: 20,
            gold: 20,
        });
        assert_eq!(economy.score(), 20);
        assert_eq!(economy.gold(), 120);
        assert!(economy.can_afford(120));
    }
}
