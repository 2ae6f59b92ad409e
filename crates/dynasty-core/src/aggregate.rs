// Trial counts to percentages, plus the slot floor used by draft odds.

use std::ops::Range;

/// Round to one decimal place for display.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// `count / trials * 100`, rounded to one decimal. Zero trials yield 0.
pub fn percent(count: u32, trials: u32) -> f64 {
    if trials == 0 {
        return 0.0;
    }
    round1(count as f64 / trials as f64 * 100.0)
}

/// `sum / trials`, rounded to one decimal. Zero trials yield 0.
pub fn average(sum: u64, trials: u32) -> f64 {
    if trials == 0 {
        return 0.0;
    }
    round1(sum as f64 / trials as f64)
}

/// Unrounded percentages for a row of slot counts.
pub fn slot_percentages(counts: &[u32], trials: u32) -> Vec<f64> {
    if trials == 0 {
        return vec![0.0; counts.len()];
    }
    counts
        .iter()
        .map(|&c| c as f64 / trials as f64 * 100.0)
        .collect()
}

/// Lift every slot in `range` to at least `floor`, taking the added mass
/// proportionally from slots in the range that sit above the floor. The sum
/// over the range is unchanged whenever enough mass sits above the floor.
pub fn apply_floor(slots: &mut [f64], range: Range<usize>, floor: f64) {
    let range = range.start.min(slots.len())..range.end.min(slots.len());
    if floor <= 0.0 || range.is_empty() {
        return;
    }

    let window = &mut slots[range];
    let deficit: f64 = window
        .iter()
        .filter(|&&v| v < floor)
        .map(|&v| floor - v)
        .sum();
    if deficit <= 0.0 {
        return;
    }

    let room: f64 = window
        .iter()
        .filter(|&&v| v > floor)
        .map(|&v| v - floor)
        .sum();

    let take_fraction = if room > 0.0 { (deficit / room).min(1.0) } else { 0.0 };
    for v in window.iter_mut() {
        if *v < floor {
            *v = floor;
        } else if *v > floor {
            *v -= (*v - floor) * take_fraction;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_rounds_to_one_decimal() {
        assert_eq!(percent(1, 3), 33.3);
        assert_eq!(percent(2, 3), 66.7);
        assert_eq!(percent(10_000, 10_000), 100.0);
        assert_eq!(percent(0, 10_000), 0.0);
        assert_eq!(percent(5, 0), 0.0);
    }

    #[test]
    fn average_rounds_to_one_decimal() {
        assert_eq!(average(72_345, 10_000), 7.2);
        assert_eq!(average(75_000, 10_000), 7.5);
        assert_eq!(average(3, 0), 0.0);
    }

    #[test]
    fn slot_percentages_unrounded() {
        let p = slot_percentages(&[1, 2, 0], 3);
        assert!((p[0] - 33.333_333).abs() < 1e-4);
        assert!((p[1] - 66.666_666).abs() < 1e-4);
        assert_eq!(p[2], 0.0);
    }

    #[test]
    fn floor_preserves_mass() {
        let mut slots = vec![60.0, 40.0, 0.0, 0.0, 0.0];
        apply_floor(&mut slots, 0..4, 0.001);
        let total: f64 = slots[0..4].iter().sum();
        assert!((total - 100.0).abs() < 1e-9);
        assert!(slots[2] >= 0.001 && slots[3] >= 0.001);
        // outside the range is untouched
        assert_eq!(slots[4], 0.0);
        // proportional: the larger slot gives more
        assert!(60.0 - slots[0] > 40.0 - slots[1]);
    }

    #[test]
    fn floor_noop_when_everything_above() {
        let mut slots = vec![50.0, 50.0];
        apply_floor(&mut slots, 0..2, 0.001);
        assert_eq!(slots, vec![50.0, 50.0]);
    }

    #[test]
    fn floor_clamps_out_of_bounds_range() {
        let mut slots = vec![100.0, 0.0];
        apply_floor(&mut slots, 0..10, 0.5);
        assert_eq!(slots[1], 0.5);
        assert!((slots.iter().sum::<f64>() - 100.0).abs() < 1e-9);
    }
}
