// Lottery weights for the non-playoff block of the draft.
//
// Position 0 is the worst non-qualifier (lowest points-for). Small lotteries
// use hand-tuned tables that favour the worst team without handing it the
// top pick outright; larger ones use a decaying share of the undistributed
// mass (never below zero) with a floor of 3, renormalised to 100.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Largest lottery whose exact slot odds are computed (2^n states).
pub const MAX_EXACT_LOTTERY: usize = 20;

const FIXED_TABLES: [&[f64]; 6] = [
    &[100.0],
    &[55.0, 45.0],
    &[42.0, 33.0, 25.0],
    &[36.0, 28.0, 21.0, 15.0],
    &[33.0, 25.0, 19.0, 14.0, 9.0],
    &[30.0, 22.5, 17.5, 14.0, 10.0, 6.0],
];

const DECAY_START: f64 = 0.35;
const DECAY_STEP: f64 = 0.03;
const MIN_WEIGHT: f64 = 3.0;

/// Top-pick weights, one per lottery position, summing to 100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LotteryWeightTable {
    weights: Vec<f64>,
}

impl LotteryWeightTable {
    pub fn for_teams(count: usize) -> Result<Self, EngineError> {
        if count == 0 {
            return Err(EngineError::EmptyLottery);
        }
        if let Some(table) = FIXED_TABLES.get(count - 1) {
            return Ok(LotteryWeightTable {
                weights: table.to_vec(),
            });
        }

        let mut remaining: f64 = 100.0;
        let mut weights = Vec::with_capacity(count);
        for i in 0..count {
            let w = (remaining * (DECAY_START - i as f64 * DECAY_STEP)).max(MIN_WEIGHT);
            remaining = (remaining - w).max(0.0);
            weights.push(w);
        }
        let total: f64 = weights.iter().sum();
        for w in &mut weights {
            *w = *w / total * 100.0;
        }
        Ok(LotteryWeightTable { weights })
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Exact slot odds of drawing every slot by weight without replacement.
    /// `odds[position][slot]` is a percentage; every row and column sums to
    /// 100.
    pub fn slot_odds(&self) -> Result<Vec<Vec<f64>>, EngineError> {
        let n = self.weights.len();
        if n > MAX_EXACT_LOTTERY {
            return Err(EngineError::LotteryTooLarge {
                count: n,
                max: MAX_EXACT_LOTTERY,
            });
        }

        // reach[mask]: percent chance the first popcount(mask) picks are
        // exactly the positions in `mask`.
        let mut reach = vec![0.0f64; 1 << n];
        reach[0] = 100.0;
        let mut odds = vec![vec![0.0; n]; n];

        for mask in 0..reach.len() {
            let p = reach[mask];
            if p == 0.0 {
                continue;
            }
            let slot = mask.count_ones() as usize;
            if slot == n {
                continue;
            }
            let open: f64 = (0..n)
                .filter(|&i| mask & (1 << i) == 0)
                .map(|i| self.weights[i])
                .sum();
            for i in (0..n).filter(|&i| mask & (1 << i) == 0) {
                let q = p * self.weights[i] / open;
                odds[i][slot] += q;
                reach[mask | (1 << i)] += q;
            }
        }
        Ok(odds)
    }

    /// Sample one full lottery order: `order[slot]` is the lottery position
    /// that receives that slot.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<usize> {
        let mut pool: Vec<usize> = (0..self.weights.len()).collect();
        let mut order = Vec::with_capacity(pool.len());
        while !pool.is_empty() {
            let open: f64 = pool.iter().map(|&i| self.weights[i]).sum();
            let mut ticket = rng.gen::<f64>() * open;
            let mut chosen = pool.len() - 1;
            for (k, &i) in pool.iter().enumerate() {
                if ticket < self.weights[i] {
                    chosen = k;
                    break;
                }
                ticket -= self.weights[i];
            }
            order.push(pool.remove(chosen));
        }
        order
    }
}
