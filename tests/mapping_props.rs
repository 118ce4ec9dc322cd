//! Property-Based Tests for the LedMap Decoding Engine
//!
//! These tests verify invariants and contracts of the pattern encoder,
//! index decoder and reconciler using proptest for input generation and
//! shrinking.
//!
//! Run with: cargo test --test mapping_props

use proptest::prelude::*;

use ledmap::types::Point;
use ledmap::{decode_index, pattern, reconcile, CollisionPolicy};

// ═══════════════════════════════════════════════════════════════════════════
// ENCODE / DECODE INVARIANTS
// ═══════════════════════════════════════════════════════════════════════════

proptest! {
    /// INVARIANT: Every light index round-trips through the pattern
    /// schedule. The presence history a perfectly-observed light would
    /// accumulate decodes back to exactly its own index.
    #[test]
    fn every_index_round_trips(light_count in 1usize..=300) {
        let width = pattern::bit_width(light_count);
        let patterns: Vec<_> = (0..width)
            .map(|bit| pattern::bit_pattern(light_count, bit))
            .collect();

        for index in 0..light_count {
            let presence: Vec<Option<bool>> =
                patterns.iter().map(|p| Some(p.is_lit(index))).collect();
            let decoded = decode_index(&presence).unwrap();
            prop_assert_eq!(decoded, index, "index {} decoded to {}", index, decoded);
        }
    }

    /// INVARIANT: The schedule width is the smallest power-of-two cover:
    /// 2^B >= N, and no shorter schedule could disambiguate N lights.
    #[test]
    fn bit_width_is_minimal_cover(light_count in 1usize..=100_000) {
        let width = pattern::bit_width(light_count);
        prop_assert!(width < usize::BITS);
        prop_assert!(1usize << width >= light_count);
        if width > 0 {
            prop_assert!(1usize << (width - 1) < light_count);
        }
    }

    /// INVARIANT: Every pattern covers every light exactly once.
    #[test]
    fn patterns_span_the_strand(light_count in 1usize..=2048, bit in 0u32..12) {
        prop_assert_eq!(pattern::bit_pattern(light_count, bit).len(), light_count);
        prop_assert_eq!(pattern::all_on(light_count).lit_count(), light_count);
    }

    /// INVARIANT: Decoding has no hidden state; identical histories give
    /// identical indices.
    #[test]
    fn decode_is_idempotent(bits in prop::collection::vec(any::<bool>(), 0..16)) {
        let presence: Vec<Option<bool>> = bits.iter().map(|b| Some(*b)).collect();
        let first = decode_index(&presence).unwrap();
        let second = decode_index(&presence).unwrap();
        prop_assert_eq!(first, second);
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// RECONCILER INVARIANTS
// ═══════════════════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// INVARIANT: The coordinate map always has exactly one slot per
    /// light, however many candidates decoded and wherever they landed.
    #[test]
    fn map_length_is_light_count(
        light_count in 1usize..=64,
        candidates in prop::collection::vec((0usize..96, -50i32..50, -50i32..50), 0..64),
    ) {
        let decoded: Vec<(usize, Point)> = candidates
            .iter()
            .map(|&(index, x, y)| (index, Point::new(x, y)))
            .collect();
        let outcome = reconcile(&decoded, light_count, CollisionPolicy::KeepFirst).unwrap();
        prop_assert_eq!(outcome.map.len(), light_count);
    }

    /// INVARIANT: Under keep-first, nothing is silently lost: every
    /// candidate either fills a slot, or is reported as a conflict or an
    /// out-of-range rejection.
    #[test]
    fn reconcile_accounts_for_every_candidate(
        light_count in 1usize..=32,
        candidates in prop::collection::vec((0usize..48, 0i32..100, 0i32..100), 0..48),
    ) {
        let decoded: Vec<(usize, Point)> = candidates
            .iter()
            .map(|&(index, x, y)| (index, Point::new(x, y)))
            .collect();
        let outcome = reconcile(&decoded, light_count, CollisionPolicy::KeepFirst).unwrap();
        let accounted = outcome.map.mapped_count()
            + outcome.conflicts.len()
            + outcome.out_of_range.len();
        prop_assert_eq!(accounted, decoded.len());
    }
}
