// Draft order assignment: per-team probability of landing each pick slot.
//
// Slots 1..=non_playoff_slots belong to teams that miss the playoffs (worst
// first); the remaining slots go to playoff teams, with the projected
// champion picking last. While the regular season runs, qualification itself
// is sampled from `make_playoffs_pct`; once it ends, only the playoff block
// stays uncertain.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::ops::Range;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::aggregate::{apply_floor, slot_percentages};
use crate::config::{DraftOddsConfig, Eligibility};
use crate::draft::lottery::LotteryWeightTable;
use crate::error::{check_remaining_weeks, EngineError};
use crate::simulation::TeamPrediction;
use crate::standings::{RosterId, StandingsSnapshot};
use crate::tiebreak::{TeamLine, TiebreakResolver};
use crate::trials::{resolve_seed, run_trials};

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Pick-slot distribution for one team. `slots[0]` is the first overall pick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftSlotOdds {
    pub roster_id: RosterId,
    pub eligibility: Eligibility,
    /// Percentages, one per slot.
    pub slots: Vec<f64>,
}

impl DraftSlotOdds {
    /// 1-based slot with the highest probability (earliest on ties).
    pub fn most_likely_slot(&self) -> Option<usize> {
        self.slots
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1).then_with(|| b.0.cmp(&a.0)))
            .map(|(i, _)| i + 1)
    }

    /// Probability-weighted mean slot (1-based).
    pub fn expected_slot(&self) -> f64 {
        let total: f64 = self.slots.iter().sum();
        if total <= 0.0 {
            return 0.0;
        }
        self.slots
            .iter()
            .enumerate()
            .map(|(i, p)| (i + 1) as f64 * p)
            .sum::<f64>()
            / total
    }

    pub fn total_pct(&self) -> f64 {
        self.slots.iter().sum()
    }
}

/// Slot indices (0-based) a team with this status may occupy.
pub fn eligible_range(
    eligibility: Eligibility,
    non_playoff_slots: usize,
    total_teams: usize,
) -> Range<usize> {
    match eligibility {
        Eligibility::Eliminated => 0..non_playoff_slots,
        Eligibility::Clinched => non_playoff_slots..total_teams,
        Eligibility::Bubble => 0..total_teams,
    }
}

// ---------------------------------------------------------------------------
// Internal team view
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct Candidate {
    roster_id: RosterId,
    points_for: f64,
    make_playoffs_pct: f64,
    projected_wins: f64,
    /// Position in current standings, 0 = best.
    rank: usize,
}

/// Worst team first among equal keys.
fn worse_first(a: &Candidate, b: &Candidate) -> Ordering {
    b.rank.cmp(&a.rank)
}

fn jitter<R: Rng + ?Sized>(rng: &mut R, spread: f64) -> f64 {
    if spread > 0.0 {
        rng.gen_range(-spread..=spread)
    } else {
        0.0
    }
}

fn merge_counts(mut a: Vec<u32>, b: Vec<u32>) -> Vec<u32> {
    for (x, y) in a.iter_mut().zip(&b) {
        *x += y;
    }
    a
}

// ---------------------------------------------------------------------------
// Assigner
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct DraftOrderAssigner {
    config: DraftOddsConfig,
}

impl DraftOrderAssigner {
    pub fn new(config: DraftOddsConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(DraftOrderAssigner { config })
    }

    pub fn config(&self) -> &DraftOddsConfig {
        &self.config
    }

    /// Per-team pick-slot odds, ordered like current standings.
    ///
    /// `remaining_weeks > 0` samples playoff qualification from the
    /// predictions; `0` fixes the non-playoff block and samples only the
    /// playoff block.
    pub fn assign_draft_order(
        &self,
        standings: &StandingsSnapshot,
        predictions: &[TeamPrediction],
        total_teams: usize,
        non_playoff_slots: usize,
        remaining_weeks: i32,
    ) -> Result<Vec<DraftSlotOdds>, EngineError> {
        let remaining_weeks = check_remaining_weeks(remaining_weeks)?;

        if standings.is_empty() {
            return Ok(Vec::new());
        }
        if standings.is_malformed() {
            warn!("standings snapshot is malformed; returning no draft odds");
            return Ok(Vec::new());
        }
        if total_teams != standings.len() || non_playoff_slots > total_teams {
            return Err(EngineError::InvalidDraftSlots {
                total_teams,
                non_playoff_slots,
                teams: standings.len(),
            });
        }

        let candidates = self.candidates(standings, predictions);
        let layout = Layout {
            total_teams,
            non_playoff_slots,
        };
        let lottery = if self.config.lottery && non_playoff_slots > 0 {
            Some(LotteryWeightTable::for_teams(non_playoff_slots)?)
        } else {
            None
        };

        info!(
            "assigning draft odds for {} teams ({} non-playoff slots, {})",
            total_teams,
            non_playoff_slots,
            if remaining_weeks > 0 { "season in progress" } else { "season complete" }
        );

        if remaining_weeks > 0 {
            Ok(self.in_progress(&candidates, layout, lottery.as_ref()))
        } else {
            self.season_complete(&candidates, layout, lottery.as_ref())
        }
    }

    /// One candidate per standings team, in current-standings order.
    fn candidates(
        &self,
        standings: &StandingsSnapshot,
        predictions: &[TeamPrediction],
    ) -> Vec<Candidate> {
        let by_id: HashMap<RosterId, &TeamPrediction> =
            predictions.iter().map(|p| (p.roster_id, p)).collect();
        let resolver = TiebreakResolver::new(standings.h2h());
        let order = resolver.ranked_ids(
            &standings.teams().iter().map(TeamLine::from).collect::<Vec<_>>(),
        );

        order
            .iter()
            .enumerate()
            .filter_map(|(rank, id)| standings.team(*id).map(|team| (rank, team)))
            .map(|(rank, team)| {
                let prediction = by_id.get(&team.roster_id);
                if prediction.is_none() {
                    warn!("no prediction for roster {}; treating as eliminated", team.roster_id);
                }
                Candidate {
                    roster_id: team.roster_id,
                    points_for: team.points_for,
                    make_playoffs_pct: prediction.map_or(0.0, |p| p.make_playoffs_pct),
                    projected_wins: prediction.map_or(team.wins as f64, |p| p.projected_wins),
                    rank,
                }
            })
            .collect()
    }

    // -----------------------------------------------------------------------
    // Regular season still running
    // -----------------------------------------------------------------------

    fn in_progress(
        &self,
        candidates: &[Candidate],
        layout: Layout,
        lottery: Option<&LotteryWeightTable>,
    ) -> Vec<DraftSlotOdds> {
        let n = candidates.len();
        let trials = self.config.trials;
        let seed = resolve_seed(self.config.seed);

        let counts = run_trials(
            trials,
            seed,
            || vec![0u32; n * n],
            |rng, acc| {
                let order = self.sample_order(candidates, layout, lottery, rng);
                for (slot, &idx) in order.iter().enumerate() {
                    acc[idx * n + slot] += 1;
                }
            },
            merge_counts,
        );

        candidates
            .iter()
            .enumerate()
            .map(|(idx, c)| {
                let eligibility = self.config.eligibility.classify(c.make_playoffs_pct);
                let mut slots = slot_percentages(&counts[idx * n..(idx + 1) * n], trials);
                apply_floor(
                    &mut slots,
                    eligible_range(eligibility, layout.non_playoff_slots, layout.total_teams),
                    self.config.slot_floor_pct,
                );
                DraftSlotOdds {
                    roster_id: c.roster_id,
                    eligibility,
                    slots,
                }
            })
            .collect()
    }

    /// One trial: `order[slot]` is the candidate index holding that slot.
    fn sample_order<R: Rng + ?Sized>(
        &self,
        candidates: &[Candidate],
        layout: Layout,
        lottery: Option<&LotteryWeightTable>,
        rng: &mut R,
    ) -> Vec<usize> {
        let mut qualified: Vec<bool> = candidates
            .iter()
            .map(|c| rng.gen::<f64>() * 100.0 < c.make_playoffs_pct)
            .collect();
        force_qualifier_count(&mut qualified, candidates, layout.playoff_slots());

        let (qualifiers, non_qualifiers): (Vec<usize>, Vec<usize>) =
            (0..candidates.len()).partition(|&i| qualified[i]);

        let noise = self.config.points_noise_fraction;
        let mut missed: Vec<(f64, usize)> = non_qualifiers
            .into_iter()
            .map(|i| {
                let pf = candidates[i].points_for;
                (pf + pf * jitter(rng, noise), i)
            })
            .collect();
        missed.sort_by(|a, b| {
            a.0.total_cmp(&b.0)
                .then_with(|| worse_first(&candidates[a.1], &candidates[b.1]))
        });
        let mut order: Vec<usize> = missed.into_iter().map(|(_, i)| i).collect();
        if let Some(table) = lottery.filter(|t| t.len() == order.len()) {
            let worst_first = order.clone();
            order = table.draw(rng).into_iter().map(|pos| worst_first[pos]).collect();
        }

        let mut made: Vec<(f64, usize)> = qualifiers
            .into_iter()
            .map(|i| (candidates[i].projected_wins + jitter(rng, self.config.wins_noise), i))
            .collect();
        made.sort_by(|a, b| {
            a.0.total_cmp(&b.0)
                .then_with(|| worse_first(&candidates[a.1], &candidates[b.1]))
        });
        order.extend(made.into_iter().map(|(_, i)| i));
        order
    }

    // -----------------------------------------------------------------------
    // Regular season complete
    // -----------------------------------------------------------------------

    fn season_complete(
        &self,
        candidates: &[Candidate],
        layout: Layout,
        lottery: Option<&LotteryWeightTable>,
    ) -> Result<Vec<DraftSlotOdds>, EngineError> {
        let n = candidates.len();

        // Qualifiers: the top playoff_slots teams by playoff odds.
        let mut by_odds: Vec<usize> = (0..n).collect();
        by_odds.sort_by(|&a, &b| {
            candidates[b]
                .make_playoffs_pct
                .total_cmp(&candidates[a].make_playoffs_pct)
                .then_with(|| candidates[a].rank.cmp(&candidates[b].rank))
        });
        let (qualifiers, missed) = by_odds.split_at(layout.playoff_slots());
        let qualifiers = qualifiers.to_vec();
        let mut missed = missed.to_vec();

        missed.sort_by(|&a, &b| {
            candidates[a]
                .points_for
                .total_cmp(&candidates[b].points_for)
                .then_with(|| worse_first(&candidates[a], &candidates[b]))
        });

        let mut slots = vec![vec![0.0; n]; n];
        match lottery {
            Some(table) if table.len() == missed.len() => {
                let odds = table.slot_odds()?;
                for (pos, &idx) in missed.iter().enumerate() {
                    slots[idx][..missed.len()].copy_from_slice(&odds[pos]);
                }
            }
            _ => {
                for (slot, &idx) in missed.iter().enumerate() {
                    slots[idx][slot] = 100.0;
                }
            }
        }

        self.postseason_block(candidates, &qualifiers, layout, &mut slots);

        let mut is_qualifier = vec![false; n];
        for &idx in &qualifiers {
            is_qualifier[idx] = true;
        }

        Ok(candidates
            .iter()
            .zip(slots)
            .enumerate()
            .map(|(idx, (c, slots))| DraftSlotOdds {
                roster_id: c.roster_id,
                eligibility: if is_qualifier[idx] {
                    Eligibility::Clinched
                } else {
                    Eligibility::Eliminated
                },
                slots,
            })
            .collect())
    }

    /// Monte Carlo over the playoff block only: perturbed projected wins,
    /// then perturbed points, fewest first.
    fn postseason_block(
        &self,
        candidates: &[Candidate],
        qualifiers: &[usize],
        layout: Layout,
        slots: &mut [Vec<f64>],
    ) {
        let q = qualifiers.len();
        if q == 0 {
            return;
        }
        let trials = self.config.postseason_trials;
        let seed = resolve_seed(self.config.seed);
        let wins_noise = self.config.wins_noise;
        let points_noise = self.config.points_noise_fraction;

        let counts = run_trials(
            trials,
            seed,
            || vec![0u32; q * q],
            |rng, acc| {
                let mut keyed: Vec<(f64, f64, usize)> = (0..q)
                    .map(|k| {
                        let c = &candidates[qualifiers[k]];
                        let wins = c.projected_wins + jitter(rng, wins_noise);
                        let points = c.points_for + c.points_for * jitter(rng, points_noise);
                        (wins, points, k)
                    })
                    .collect();
                keyed.sort_by(|a, b| {
                    a.0.total_cmp(&b.0)
                        .then_with(|| a.1.total_cmp(&b.1))
                        .then_with(|| {
                            worse_first(&candidates[qualifiers[a.2]], &candidates[qualifiers[b.2]])
                        })
                });
                for (place, &(_, _, k)) in keyed.iter().enumerate() {
                    acc[k * q + place] += 1;
                }
            },
            merge_counts,
        );

        for (k, &idx) in qualifiers.iter().enumerate() {
            let pct = slot_percentages(&counts[k * q..(k + 1) * q], trials);
            let row = &mut slots[idx];
            row[layout.non_playoff_slots..].copy_from_slice(&pct);
            apply_floor(
                row,
                layout.non_playoff_slots..layout.total_teams,
                self.config.slot_floor_pct,
            );
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Layout {
    total_teams: usize,
    non_playoff_slots: usize,
}

impl Layout {
    fn playoff_slots(&self) -> usize {
        self.total_teams - self.non_playoff_slots
    }
}

/// Move the lowest-odds qualifiers out, or the highest-odds non-qualifiers
/// in, until exactly `target` teams qualify.
fn force_qualifier_count(qualified: &mut [bool], candidates: &[Candidate], target: usize) {
    let count = qualified.iter().filter(|&&q| q).count();
    match count.cmp(&target) {
        Ordering::Greater => {
            let mut inside: Vec<usize> = (0..qualified.len()).filter(|&i| qualified[i]).collect();
            inside.sort_by(|&a, &b| {
                candidates[a]
                    .make_playoffs_pct
                    .total_cmp(&candidates[b].make_playoffs_pct)
                    .then_with(|| worse_first(&candidates[a], &candidates[b]))
            });
            for &i in inside.iter().take(count - target) {
                qualified[i] = false;
            }
        }
        Ordering::Less => {
            let mut outside: Vec<usize> =
                (0..qualified.len()).filter(|&i| !qualified[i]).collect();
            outside.sort_by(|&a, &b| {
                candidates[b]
                    .make_playoffs_pct
                    .total_cmp(&candidates[a].make_playoffs_pct)
                    .then_with(|| candidates[a].rank.cmp(&candidates[b].rank))
            });
            for &i in outside.iter().take(target - count) {
                qualified[i] = true;
            }
        }
        Ordering::Equal => {}
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::standings::{HeadToHeadMatrix, TeamRecord};

    fn snapshot(records: &[(RosterId, u32, u32, f64)]) -> StandingsSnapshot {
        StandingsSnapshot::from_records(
            records
                .iter()
                .map(|&(id, w, l, pf)| TeamRecord::new(id, w, l, 0, pf, None))
                .collect(),
            HeadToHeadMatrix::new(),
        )
    }

    fn prediction(roster_id: RosterId, pct: f64, projected_wins: f64) -> TeamPrediction {
        TeamPrediction {
            roster_id,
            wins: 0,
            losses: 0,
            ties: 0,
            points_for: 0.0,
            one_seed_pct: 0.0,
            division_winner_pct: None,
            make_playoffs_pct: pct,
            projected_wins,
        }
    }

    fn assigner(lottery: bool) -> DraftOrderAssigner {
        DraftOrderAssigner::new(DraftOddsConfig {
            trials: 4_000,
            postseason_trials: 2_000,
            seed: Some(2024),
            lottery,
            ..DraftOddsConfig::default()
        })
        .unwrap()
    }

    fn four_team() -> (StandingsSnapshot, Vec<TeamPrediction>) {
        let snap = snapshot(&[
            (1, 7, 1, 1_100.0),
            (2, 5, 3, 1_000.0),
            (3, 3, 5, 900.0),
            (4, 1, 7, 800.0),
        ]);
        let preds = vec![
            prediction(1, 100.0, 10.5),
            prediction(2, 70.0, 7.9),
            prediction(3, 30.0, 5.1),
            prediction(4, 0.0, 2.4),
        ];
        (snap, preds)
    }

    fn odds_for(out: &[DraftSlotOdds], id: RosterId) -> &DraftSlotOdds {
        out.iter().find(|o| o.roster_id == id).unwrap()
    }

    #[test]
    fn slot_mismatch_rejected() {
        let (snap, preds) = four_team();
        let err = assigner(false)
            .assign_draft_order(&snap, &preds, 5, 2, 3)
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidDraftSlots { .. }));
        let err = assigner(false)
            .assign_draft_order(&snap, &preds, 4, 5, 3)
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidDraftSlots { .. }));
    }

    #[test]
    fn negative_weeks_rejected() {
        let (snap, preds) = four_team();
        assert_eq!(
            assigner(false).assign_draft_order(&snap, &preds, 4, 2, -1),
            Err(EngineError::NegativeRemainingWeeks(-1))
        );
    }

    #[test]
    fn in_progress_respects_eligibility_ranges() {
        let (snap, preds) = four_team();
        let out = assigner(false)
            .assign_draft_order(&snap, &preds, 4, 2, 3)
            .unwrap();
        assert_eq!(out.len(), 4);

        let clinched = odds_for(&out, 1);
        assert_eq!(clinched.eligibility, Eligibility::Clinched);
        assert_eq!(clinched.slots[0], 0.0);
        assert_eq!(clinched.slots[1], 0.0);

        let eliminated = odds_for(&out, 4);
        assert_eq!(eliminated.eligibility, Eligibility::Eliminated);
        assert_eq!(eliminated.slots[2], 0.0);
        assert_eq!(eliminated.slots[3], 0.0);
        // lowest points-for among non-qualifiers, picks first most often
        assert_eq!(eliminated.most_likely_slot(), Some(1));

        for team in &out {
            assert!((team.total_pct() - 100.0).abs() <= 0.5, "{team:?}");
            let range = eligible_range(team.eligibility, 2, 4);
            for slot in range {
                assert!(team.slots[slot] >= 0.001 - 1e-12);
            }
        }
        assert_eq!(odds_for(&out, 2).eligibility, Eligibility::Bubble);
    }

    #[test]
    fn champion_projection_picks_last() {
        let (snap, preds) = four_team();
        let out = assigner(false)
            .assign_draft_order(&snap, &preds, 4, 2, 3)
            .unwrap();
        assert_eq!(odds_for(&out, 1).most_likely_slot(), Some(4));
    }

    #[test]
    fn force_count_moves_lowest_odds_out() {
        let candidates: Vec<Candidate> = [(1, 90.0), (2, 60.0), (3, 40.0), (4, 10.0)]
            .iter()
            .enumerate()
            .map(|(rank, &(id, pct))| Candidate {
                roster_id: id,
                points_for: 100.0,
                make_playoffs_pct: pct,
                projected_wins: 5.0,
                rank,
            })
            .collect();

        let mut all_in = vec![true; 4];
        force_qualifier_count(&mut all_in, &candidates, 2);
        assert_eq!(all_in, vec![true, true, false, false]);

        let mut none_in = vec![false; 4];
        force_qualifier_count(&mut none_in, &candidates, 3);
        assert_eq!(none_in, vec![true, true, true, false]);
    }

    #[test]
    fn season_complete_fixes_non_playoff_block() {
        let snap = snapshot(&[
            (1, 7, 1, 1_100.0),
            (2, 5, 3, 1_000.0),
            (3, 3, 5, 950.0),
            (4, 1, 7, 800.0),
        ]);
        let preds = vec![
            prediction(1, 100.0, 7.0),
            prediction(2, 100.0, 5.0),
            prediction(3, 0.0, 3.0),
            prediction(4, 0.0, 1.0),
        ];
        let out = assigner(false)
            .assign_draft_order(&snap, &preds, 4, 2, 0)
            .unwrap();

        assert_eq!(odds_for(&out, 4).slots, vec![100.0, 0.0, 0.0, 0.0]);
        assert_eq!(odds_for(&out, 3).slots, vec![0.0, 100.0, 0.0, 0.0]);
        assert_eq!(odds_for(&out, 4).eligibility, Eligibility::Eliminated);

        let top = odds_for(&out, 1);
        assert_eq!(top.eligibility, Eligibility::Clinched);
        assert_eq!(top.slots[0], 0.0);
        assert_eq!(top.slots[1], 0.0);
        assert!((top.total_pct() - 100.0).abs() <= 0.5);
        assert!(top.slots[3] > top.slots[2]);
    }

    #[test]
    fn season_complete_lottery_uses_exact_weights() {
        let snap = snapshot(&[
            (1, 7, 1, 1_100.0),
            (2, 5, 3, 1_000.0),
            (3, 3, 5, 950.0),
            (4, 1, 7, 800.0),
        ]);
        let preds = vec![
            prediction(1, 100.0, 7.0),
            prediction(2, 100.0, 5.0),
            prediction(3, 0.0, 3.0),
            prediction(4, 0.0, 1.0),
        ];
        let out = assigner(true)
            .assign_draft_order(&snap, &preds, 4, 2, 0)
            .unwrap();
        assert_eq!(odds_for(&out, 4).slots[..2], [55.0, 45.0]);
        assert_eq!(odds_for(&out, 3).slots[..2], [45.0, 55.0]);
    }

    #[test]
    fn missing_prediction_counts_as_eliminated() {
        let (snap, mut preds) = four_team();
        preds.retain(|p| p.roster_id != 3);
        let out = assigner(false)
            .assign_draft_order(&snap, &preds, 4, 2, 2)
            .unwrap();
        assert_eq!(odds_for(&out, 3).eligibility, Eligibility::Eliminated);
    }

    #[test]
    fn seeded_results_repeat() {
        let (snap, preds) = four_team();
        let a = assigner(true).assign_draft_order(&snap, &preds, 4, 2, 2).unwrap();
        let b = assigner(true).assign_draft_order(&snap, &preds, 4, 2, 2).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn expected_slot_weighted_mean() {
        let odds = DraftSlotOdds {
            roster_id: 1,
            eligibility: Eligibility::Bubble,
            slots: vec![50.0, 0.0, 50.0],
        };
        assert!((odds.expected_slot() - 2.0).abs() < 1e-12);
        assert_eq!(odds.most_likely_slot(), Some(1));
    }
}
