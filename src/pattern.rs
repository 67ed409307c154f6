use std::collections::HashMap;

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::construction::{base_pattern, total_quantity};
use crate::types::{DesignOption, WoodStockPiece};

/// Which rows of an end-grain board get the reversed sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FlipPolicy {
    EvenRows,
    EveryThirdRow,
    OddRows,
    /// Each row flips on its own coin toss.
    Random,
}

impl FlipPolicy {
    pub const ALL: [FlipPolicy; 4] = [
        FlipPolicy::EvenRows,
        FlipPolicy::EveryThirdRow,
        FlipPolicy::OddRows,
        FlipPolicy::Random,
    ];

    pub fn choose<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }

    fn flips<R: Rng + ?Sized>(self, row: usize, rng: &mut R) -> bool {
        match self {
            FlipPolicy::EvenRows => row % 2 == 0,
            FlipPolicy::EveryThirdRow => row % 3 == 2,
            FlipPolicy::OddRows => row % 2 == 1,
            FlipPolicy::Random => rng.gen_bool(0.5),
        }
    }
}

/// A copy of `option` with a freshly shuffled pattern and a randomly
/// chosen row-flip policy. Dimensions, cuts and kerf are carried over.
pub fn regenerate_pattern<R: Rng + ?Sized>(
    option: &DesignOption,
    stock: &[WoodStockPiece],
    rng: &mut R,
) -> DesignOption {
    let policy = FlipPolicy::choose(rng);
    regenerate_pattern_with(option, stock, policy, rng)
}

/// Like [`regenerate_pattern`] with a fixed flip policy. The policy is
/// ignored for face and edge grain, which have a single row.
pub fn regenerate_pattern_with<R: Rng + ?Sized>(
    option: &DesignOption,
    stock: &[WoodStockPiece],
    policy: FlipPolicy,
    rng: &mut R,
) -> DesignOption {
    let target_len = option.pattern.len();
    if target_len == 0 {
        return option.clone();
    }
    let (mut base, rows) = shuffle_base(option, stock);
    base.shuffle(rng);

    let pattern = if option.construction_kind.is_end_grain() {
        let flipped: Vec<String> = base.iter().rev().cloned().collect();
        let mut pattern = Vec::with_capacity(target_len);
        for row in 0..rows {
            let source = if policy.flips(row, rng) { &flipped } else { &base };
            pattern.extend(source.iter().cloned());
        }
        pattern
    } else {
        base
    };

    tracing::debug!(
        kind = %option.construction_kind,
        ?policy,
        rows,
        strips = pattern.len(),
        "regenerated pattern"
    );

    DesignOption {
        pattern,
        ..option.clone()
    }
}

/// The row to shuffle and how many times it repeats. The result always
/// holds exactly the option's wood types: `rows` copies of the base have
/// the same multiset as `option.pattern`.
///
/// The current stock is used when it still describes the option. Otherwise
/// the option's own first row is used, and failing that the whole pattern
/// becomes a single row.
fn shuffle_base(option: &DesignOption, stock: &[WoodStockPiece]) -> (Vec<String>, usize) {
    let pattern = &option.pattern;
    let rows = row_count(option, stock);

    let stock_fits = (rows as u64)
        .checked_mul(total_quantity(stock))
        .is_some_and(|n| n == pattern.len() as u64);
    if stock_fits {
        let base = base_pattern(stock);
        if tiles(&base, rows, pattern) {
            return (base, rows);
        }
    }

    if rows > 0 && pattern.len() % rows == 0 {
        let first_row = &pattern[..pattern.len() / rows];
        if tiles(first_row, rows, pattern) {
            tracing::debug!(rows, "stock no longer matches, shuffling the option's first row");
            return (first_row.to_vec(), rows);
        }
    }

    tracing::debug!("rows differ in content, shuffling the whole pattern as one row");
    (pattern.clone(), 1)
}

/// Whether `rows` copies of `base` hold the same wood types, with the same
/// counts, as `pattern`.
fn tiles(base: &[String], rows: usize, pattern: &[String]) -> bool {
    let mut counts: HashMap<&str, i64> = HashMap::new();
    for wood in pattern {
        *counts.entry(wood.as_str()).or_insert(0) += 1;
    }
    for wood in base {
        *counts.entry(wood.as_str()).or_insert(0) -= rows as i64;
    }
    counts.values().all(|&n| n == 0)
}

fn row_count(option: &DesignOption, stock: &[WoodStockPiece]) -> usize {
    if !option.construction_kind.is_end_grain() {
        return 1;
    }
    if option.cut_count > 0 {
        return option.cut_count as usize;
    }
    (option.pattern.len() as u64)
        .checked_div(total_quantity(stock))
        .map_or(0, |rows| rows as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::construction::{Generator, LayoutSettings};
    use crate::types::ConstructionKind;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn stock() -> Vec<WoodStockPiece> {
        vec![
            WoodStockPiece::new("Maple", 0.75, 2.0, 24.0, 4),
            WoodStockPiece::new("Walnut", 0.75, 1.5, 24.0, 3),
            WoodStockPiece::new("Cherry", 0.75, 2.0, 20.0, 2),
        ]
    }

    fn tally(pattern: &[String]) -> HashMap<&str, usize> {
        let mut counts = HashMap::new();
        for wood in pattern {
            *counts.entry(wood.as_str()).or_insert(0) += 1;
        }
        counts
    }

    fn generate(stock: &[WoodStockPiece]) -> Vec<DesignOption> {
        Generator::new(LayoutSettings::default(), stock)
            .generate()
            .unwrap()
    }

    fn options() -> Vec<DesignOption> {
        generate(&stock())
    }

    #[test]
    fn test_regeneration_preserves_geometry_and_multiset() {
        let stock = stock();
        let mut rng = StdRng::seed_from_u64(42);
        for original in options() {
            for _ in 0..100 {
                let regenerated = regenerate_pattern(&original, &stock, &mut rng);
                assert_eq!(regenerated.dimensions, original.dimensions);
                assert_eq!(regenerated.cut_count, original.cut_count);
                assert_eq!(regenerated.kerf_loss, original.kerf_loss);
                assert_eq!(regenerated.construction_kind, original.construction_kind);
                assert_eq!(regenerated.pattern.len(), original.pattern.len());
                assert_eq!(tally(&regenerated.pattern), tally(&original.pattern));
            }
        }
    }

    #[test]
    fn test_same_seed_same_pattern() {
        let stock = stock();
        let options = options();
        let original = &options[2];
        let a = regenerate_pattern(original, &stock, &mut StdRng::seed_from_u64(7));
        let b = regenerate_pattern(original, &stock, &mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
    }

    #[test]
    fn test_shuffle_eventually_differs() {
        let stock = stock();
        let options = options();
        let original = &options[0];
        let mut rng = StdRng::seed_from_u64(1);
        let changed =
            (0..50).any(|_| regenerate_pattern(original, &stock, &mut rng).pattern != original.pattern);
        assert!(changed);
    }

    #[test]
    fn test_odd_rows_policy_reverses_odd_rows() {
        let stock = stock();
        let original = options()
            .into_iter()
            .find(|o| o.construction_kind == ConstructionKind::EndGrainFromEdgeGrain)
            .unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let regenerated = regenerate_pattern_with(&original, &stock, FlipPolicy::OddRows, &mut rng);

        let rows: Vec<_> = regenerated.pattern.chunks(9).collect();
        assert_eq!(rows.len(), original.cut_count as usize);
        let reversed: Vec<String> = rows[0].iter().rev().cloned().collect();
        for (i, row) in rows.iter().enumerate() {
            if i % 2 == 1 {
                assert_eq!(*row, reversed.as_slice());
            } else {
                assert_eq!(*row, rows[0]);
            }
        }
    }

    #[test]
    fn test_every_third_row_policy() {
        let stock = stock();
        let original = options()
            .into_iter()
            .find(|o| o.construction_kind == ConstructionKind::EndGrainFromFaceGrain)
            .unwrap();
        let mut rng = StdRng::seed_from_u64(11);
        let regenerated =
            regenerate_pattern_with(&original, &stock, FlipPolicy::EveryThirdRow, &mut rng);
        let rows: Vec<_> = regenerated.pattern.chunks(9).collect();
        let reversed: Vec<String> = rows[0].iter().rev().cloned().collect();
        assert_eq!(rows[1], rows[0]);
        assert_eq!(rows[2], reversed.as_slice());
        assert_eq!(rows[3], rows[0]);
        assert_eq!(rows[5], reversed.as_slice());
    }

    #[test]
    fn test_round_tripped_option_regenerates() {
        let stock = stock();
        let json = serde_json::to_string(&options()[3]).unwrap();
        let restored: DesignOption = serde_json::from_str(&json).unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        let regenerated = regenerate_pattern(&restored, &stock, &mut rng);
        assert_eq!(regenerated.pattern.len(), restored.pattern.len());
        assert_eq!(regenerated.dimensions, restored.dimensions);
    }

    #[test]
    fn test_stale_stock_falls_back_to_option_rows() {
        let original = options()[2].clone();
        let edited = vec![WoodStockPiece::new("Oak", 0.75, 2.0, 24.0, 1)];
        let mut rng = StdRng::seed_from_u64(9);
        let regenerated = regenerate_pattern(&original, &edited, &mut rng);
        assert_eq!(tally(&regenerated.pattern), tally(&original.pattern));
    }

    #[test]
    fn test_same_count_different_wood_keeps_option_woods() {
        let maple = vec![WoodStockPiece::new("Maple", 0.75, 2.0, 24.0, 3)];
        let oak = vec![WoodStockPiece::new("Oak", 0.75, 2.0, 24.0, 3)];
        let mut rng = StdRng::seed_from_u64(17);
        for original in generate(&maple) {
            let regenerated = regenerate_pattern(&original, &oak, &mut rng);
            assert_eq!(regenerated.pattern.len(), original.pattern.len());
            assert_eq!(
                tally(&regenerated.pattern),
                tally(&original.pattern),
                "{}",
                original.construction_kind
            );
            assert!(regenerated.pattern.iter().all(|w| w == "Maple"));
        }
    }

    #[test]
    fn test_same_count_different_mix_keeps_option_mix() {
        let original_stock = vec![
            WoodStockPiece::new("Maple", 0.75, 2.0, 8.0, 2),
            WoodStockPiece::new("Walnut", 0.75, 2.0, 8.0, 1),
        ];
        let edited = vec![
            WoodStockPiece::new("Maple", 0.75, 2.0, 8.0, 1),
            WoodStockPiece::new("Walnut", 0.75, 2.0, 8.0, 2),
        ];
        let original = generate(&original_stock)[2].clone();
        assert_eq!(original.cut_count, 4);
        let mut rng = StdRng::seed_from_u64(19);
        for policy in FlipPolicy::ALL {
            let regenerated = regenerate_pattern_with(&original, &edited, policy, &mut rng);
            assert_eq!(tally(&regenerated.pattern), tally(&original.pattern));
            assert_eq!(regenerated.rows().len(), 4);
        }
    }

    #[test]
    fn test_uneven_rows_shuffle_as_one_row() {
        let mut original = options()[2].clone();
        original.cut_count = 2;
        original.pattern = ["Maple", "Walnut", "Walnut", "Walnut"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let mut rng = StdRng::seed_from_u64(23);
        for _ in 0..20 {
            let regenerated = regenerate_pattern(&original, &[], &mut rng);
            assert_eq!(tally(&regenerated.pattern), tally(&original.pattern));
        }
    }

    #[test]
    fn test_tiles() {
        let row = |woods: &[&str]| woods.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        let pattern = row(&["A", "B", "B", "A"]);
        assert!(tiles(&row(&["B", "A"]), 2, &pattern));
        assert!(tiles(&pattern, 1, &pattern));
        assert!(!tiles(&row(&["A", "A"]), 2, &pattern));
        assert!(!tiles(&row(&["C", "D"]), 2, &pattern));
        assert!(!tiles(&row(&["A", "B"]), 1, &pattern));
    }

    #[test]
    fn test_missing_cut_count_uses_quantity() {
        let stock = stock();
        let mut original = options()[2].clone();
        let rows = original.cut_count as usize;
        original.cut_count = 0;
        let mut rng = StdRng::seed_from_u64(13);
        let regenerated =
            regenerate_pattern_with(&original, &stock, FlipPolicy::EvenRows, &mut rng);
        assert_eq!(regenerated.pattern.len(), rows * 9);
        assert_eq!(regenerated.cut_count, 0);
    }

    #[test]
    fn test_empty_pattern_stays_empty() {
        let stock = vec![WoodStockPiece::new("Maple", 0.75, 2.0, 1.0, 3)];
        let options = generate(&stock);
        let mut rng = StdRng::seed_from_u64(0);
        for o in &options {
            let regenerated = regenerate_pattern(o, &stock, &mut rng);
            assert_eq!(regenerated.pattern.len(), o.pattern.len());
        }
    }

    #[test]
    fn test_choose_covers_every_policy() {
        let mut rng = StdRng::seed_from_u64(21);
        let seen: std::collections::HashSet<_> =
            (0..200).map(|_| FlipPolicy::choose(&mut rng)).collect();
        assert_eq!(seen.len(), FlipPolicy::ALL.len());
    }
}
