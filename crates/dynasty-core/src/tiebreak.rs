// Tie-break resolution: wins, then points-for, then head-to-head, then
// roster id.

use std::cmp::Ordering;

use crate::standings::{HeadToHeadMatrix, RosterId, TeamRecord};

/// Default tolerance for points-for comparisons.
pub const POINTS_EPSILON: f64 = 0.01;

/// The rankable view of a team: actual standings or one simulated trial.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TeamLine {
    pub roster_id: RosterId,
    pub wins: u32,
    pub points_for: f64,
}

impl From<&TeamRecord> for TeamLine {
    fn from(record: &TeamRecord) -> Self {
        TeamLine {
            roster_id: record.roster_id,
            wins: record.wins,
            points_for: record.points_for,
        }
    }
}

/// Total-orders teams. Points within `epsilon` of each other count as level,
/// so totals that differ only by accumulated rounding go to head-to-head.
#[derive(Debug, Clone, Copy)]
pub struct TiebreakResolver<'a> {
    h2h: &'a HeadToHeadMatrix,
    epsilon: f64,
}

impl<'a> TiebreakResolver<'a> {
    pub fn new(h2h: &'a HeadToHeadMatrix) -> Self {
        Self::with_epsilon(h2h, POINTS_EPSILON)
    }

    pub fn with_epsilon(h2h: &'a HeadToHeadMatrix, epsilon: f64) -> Self {
        let epsilon = if epsilon > 0.0 { epsilon } else { POINTS_EPSILON };
        TiebreakResolver { h2h, epsilon }
    }

    fn level(&self, a: &TeamLine, b: &TeamLine) -> bool {
        a.wins == b.wins && (a.points_for - b.points_for).abs() <= self.epsilon
    }

    /// Pairwise comparison. `Less` means `a` ranks ahead of `b`; never returns
    /// `Equal` for distinct roster ids. Agrees with [`rank`](Self::rank) on
    /// any two-team slice.
    pub fn compare(&self, a: &TeamLine, b: &TeamLine) -> Ordering {
        let points = if self.level(a, b) {
            Ordering::Equal
        } else {
            b.points_for.total_cmp(&a.points_for)
        };
        b.wins
            .cmp(&a.wins)
            .then(points)
            .then_with(|| {
                self.h2h
                    .wins(b.roster_id, a.roster_id)
                    .cmp(&self.h2h.wins(a.roster_id, b.roster_id))
            })
            .then_with(|| a.roster_id.cmp(&b.roster_id))
    }

    /// Sort `lines` best-first.
    ///
    /// After sorting by wins and raw points, neighbours on the same wins whose
    /// points are within `epsilon` are chained into one tie group, so a run
    /// like 800.000, 800.008, 800.016 is a single group. Inside a group each
    /// team is scored by its head-to-head wins against the other members.
    /// For three or more teams this avoids cyclic results (A beat B, B beat C,
    /// C beat A).
    pub fn rank(&self, lines: &mut [TeamLine]) {
        lines.sort_by(|a, b| {
            b.wins
                .cmp(&a.wins)
                .then_with(|| b.points_for.total_cmp(&a.points_for))
                .then_with(|| a.roster_id.cmp(&b.roster_id))
        });

        let mut start = 0;
        while start < lines.len() {
            let mut end = start + 1;
            while end < lines.len() && self.level(&lines[end - 1], &lines[end]) {
                end += 1;
            }
            if end - start > 1 {
                self.order_group(&mut lines[start..end]);
            }
            start = end;
        }
    }

    /// Convenience: rank and return the roster ids best-first.
    pub fn ranked_ids(&self, lines: &[TeamLine]) -> Vec<RosterId> {
        let mut sorted = lines.to_vec();
        self.rank(&mut sorted);
        sorted.iter().map(|l| l.roster_id).collect()
    }

    fn order_group(&self, group: &mut [TeamLine]) {
        let ids: Vec<RosterId> = group.iter().map(|l| l.roster_id).collect();
        let h2h_score = |id: RosterId| -> u32 {
            ids.iter()
                .filter(|&&other| other != id)
                .map(|&other| self.h2h.wins(id, other))
                .sum()
        };
        group.sort_by_cached_key(|l| (std::cmp::Reverse(h2h_score(l.roster_id)), l.roster_id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(roster_id: RosterId, wins: u32, points_for: f64) -> TeamLine {
        TeamLine {
            roster_id,
            wins,
            points_for,
        }
    }

    #[test]
    fn more_wins_ranks_first() {
        let h2h = HeadToHeadMatrix::new();
        let r = TiebreakResolver::new(&h2h);
        let a = line(1, 6, 900.0);
        let b = line(2, 5, 1_400.0);
        assert_eq!(r.compare(&a, &b), Ordering::Less);
        assert_eq!(r.compare(&b, &a), Ordering::Greater);
    }

    #[test]
    fn points_break_equal_wins() {
        let h2h = HeadToHeadMatrix::new();
        let r = TiebreakResolver::new(&h2h);
        assert_eq!(r.ranked_ids(&[line(1, 4, 800.0), line(2, 4, 812.4)]), vec![2, 1]);
    }

    #[test]
    fn points_within_epsilon_fall_through_to_h2h() {
        let mut h2h = HeadToHeadMatrix::new();
        h2h.record_win(2, 1);
        let r = TiebreakResolver::new(&h2h);
        let a = line(1, 4, 800.001);
        let b = line(2, 4, 800.0);
        assert_eq!(r.compare(&b, &a), Ordering::Less);
        assert_eq!(r.ranked_ids(&[a, b]), vec![2, 1]);
    }

    #[test]
    fn close_totals_across_a_rounding_edge_are_level() {
        // 800.004 and 800.006 round to different hundredths
        let mut h2h = HeadToHeadMatrix::new();
        h2h.record_win(1, 2);
        let r = TiebreakResolver::new(&h2h);
        let a = line(1, 4, 800.004);
        let b = line(2, 4, 800.006);
        assert_eq!(r.compare(&a, &b), Ordering::Less);
        assert_eq!(r.ranked_ids(&[a, b]), vec![1, 2]);
        assert_eq!(r.ranked_ids(&[b, a]), vec![1, 2]);
    }

    #[test]
    fn points_gap_beyond_epsilon_beats_h2h() {
        let mut h2h = HeadToHeadMatrix::new();
        h2h.record_win(1, 2);
        let r = TiebreakResolver::new(&h2h);
        let a = line(1, 4, 800.0);
        let b = line(2, 4, 800.05);
        assert_eq!(r.compare(&b, &a), Ordering::Less);
        assert_eq!(r.ranked_ids(&[a, b]), vec![2, 1]);
    }

    #[test]
    fn chained_close_totals_form_one_group() {
        let mut h2h = HeadToHeadMatrix::new();
        h2h.record_win(3, 1);
        h2h.record_win(3, 2);
        h2h.record_win(2, 1);
        let r = TiebreakResolver::new(&h2h);
        let ranked = r.ranked_ids(&[line(1, 5, 700.016), line(2, 5, 700.008), line(3, 5, 700.0)]);
        assert_eq!(ranked, vec![3, 2, 1]);
    }

    #[test]
    fn roster_id_is_last_resort() {
        let h2h = HeadToHeadMatrix::new();
        let r = TiebreakResolver::new(&h2h);
        let a = line(9, 3, 500.0);
        let b = line(4, 3, 500.0);
        assert_eq!(r.compare(&b, &a), Ordering::Less);
        assert_ne!(r.compare(&a, &b), Ordering::Equal);
        assert_eq!(r.ranked_ids(&[a, b]), vec![4, 9]);
    }

    #[test]
    fn cyclic_h2h_is_still_a_total_order() {
        let mut h2h = HeadToHeadMatrix::new();
        h2h.record_win(1, 2);
        h2h.record_win(2, 3);
        h2h.record_win(3, 1);
        h2h.record_win(3, 2);
        let r = TiebreakResolver::new(&h2h);
        // team 3 has two wins inside the group, 1 and 2 one each
        let ranked = r.ranked_ids(&[line(1, 5, 700.0), line(2, 5, 700.0), line(3, 5, 700.0)]);
        assert_eq!(ranked, vec![3, 1, 2]);
    }

    #[test]
    fn rank_is_deterministic_regardless_of_input_order() {
        let h2h = HeadToHeadMatrix::new();
        let r = TiebreakResolver::new(&h2h);
        let forward = vec![line(1, 2, 300.0), line(2, 2, 300.0), line(3, 7, 100.0)];
        let mut backward = forward.clone();
        backward.reverse();
        assert_eq!(r.ranked_ids(&forward), r.ranked_ids(&backward));
        assert_eq!(r.ranked_ids(&forward), vec![3, 1, 2]);
    }
}
