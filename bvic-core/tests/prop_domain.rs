//! Property-based tests for the bit-vector primitive and domain (spec §8).

use bvic_core::bv::Bv;
use bvic_core::domain::BvDomain;
use proptest::prelude::*;

const MAX_W: u32 = 12;

fn width() -> impl Strategy<Value = u32> {
    1u32..=MAX_W
}

fn ternary_string(w: u32) -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(vec!['0', '1', 'x']), w as usize)
        .prop_map(|v| v.into_iter().collect())
}

/// A width paired with a ternary string of exactly that width.
fn width_and_string() -> impl Strategy<Value = (u32, String)> {
    width().prop_flat_map(|w| (Just(w), ternary_string(w)))
}

proptest! {
    /// Invariant 4: `not` is an involution.
    #[test]
    fn not_involution(w in width(), lo in any::<u64>(), hi in any::<u64>()) {
        let lo = Bv::uint64_to_bv(lo, w);
        let hi = Bv::uint64_to_bv(hi, w);
        let d = BvDomain::new(lo, hi);
        prop_assert!(d.not().not().equal(&d));
    }

    /// Invariant 3: ternary string round-trips through `to_char`.
    #[test]
    fn string_round_trip((_w, s) in width_and_string()) {
        let d = BvDomain::new_from_char(&s).unwrap();
        prop_assert_eq!(d.to_char(), s);
    }

    /// Invariant 5: slicing commutes with slicing the bounds.
    #[test]
    fn slice_matches_bounds(w in 2u32..=MAX_W, lo_v in any::<u64>(), hi_v in any::<u64>()) {
        let lo = Bv::uint64_to_bv(lo_v, w);
        let hi = Bv::uint64_to_bv(hi_v, w);
        let d = BvDomain::new(lo.clone(), hi.clone());
        let upper = w - 1;
        let lower = 0u32;
        let sliced = d.slice(upper, lower);
        prop_assert_eq!(sliced.lo(), &lo.slice(upper, lower));
        prop_assert_eq!(sliced.hi(), &hi.slice(upper, lower));
    }

    /// Invariant 7: `check_fixed_bits` agrees with the bit-by-bit definition.
    #[test]
    fn check_fixed_bits_matches_definition((w, s) in width_and_string(), v in any::<u64>()) {
        let d = BvDomain::new_from_char(&s).unwrap();
        let b = Bv::uint64_to_bv(v, w);
        let by_formula = d.check_fixed_bits(&b);
        let mut by_bits = true;
        for i in 0..w {
            if d.is_fixed_bit(i) && d.lo().get_bit(i) != b.get_bit(i) {
                by_bits = false;
            }
        }
        prop_assert_eq!(by_formula, by_bits);
    }

    /// Validity characterization: `is_valid` matches the per-bit definition.
    #[test]
    fn validity_matches_per_bit(w in width(), lo in any::<u64>(), hi in any::<u64>()) {
        let lo_bv = Bv::uint64_to_bv(lo, w);
        let hi_bv = Bv::uint64_to_bv(hi, w);
        let d = BvDomain::new(lo_bv.clone(), hi_bv.clone());
        let mut expect_valid = true;
        for i in 0..w {
            if lo_bv.get_bit(i) && !hi_bv.get_bit(i) {
                expect_valid = false;
            }
        }
        prop_assert_eq!(d.is_valid(), expect_valid);
    }

    /// Bit-vector arithmetic matches native u64 arithmetic for widths that
    /// fit comfortably below 64 bits (wrap-around via masking).
    #[test]
    fn add_matches_native(w in 1u32..=32, a in any::<u64>(), b in any::<u64>()) {
        let mask = if w == 64 { u64::MAX } else { (1u64 << w) - 1 };
        let av = a & mask;
        let bv = b & mask;
        let expected = av.wrapping_add(bv) & mask;
        let result = Bv::uint64_to_bv(av, w).add(&Bv::uint64_to_bv(bv, w));
        prop_assert_eq!(result, Bv::uint64_to_bv(expected, w));
    }

    #[test]
    fn mul_matches_native(w in 1u32..=32, a in any::<u64>(), b in any::<u64>()) {
        let mask = if w == 64 { u64::MAX } else { (1u64 << w) - 1 };
        let av = a & mask;
        let bv = b & mask;
        let expected = av.wrapping_mul(bv) & mask;
        let result = Bv::uint64_to_bv(av, w).mul(&Bv::uint64_to_bv(bv, w));
        prop_assert_eq!(result, Bv::uint64_to_bv(expected, w));
    }

    #[test]
    fn udivmod_matches_native(w in 1u32..=32, a in any::<u64>(), b in any::<u64>()) {
        let mask = if w == 64 { u64::MAX } else { (1u64 << w) - 1 };
        let av = a & mask;
        let bv = b & mask;
        let (q, r) = Bv::uint64_to_bv(av, w).udivmod(&Bv::uint64_to_bv(bv, w));
        if bv == 0 {
            prop_assert_eq!(q, Bv::ones(w));
            prop_assert_eq!(r, Bv::uint64_to_bv(av, w));
        } else {
            prop_assert_eq!(q, Bv::uint64_to_bv(av / bv, w));
            prop_assert_eq!(r, Bv::uint64_to_bv(av % bv, w));
        }
    }
}
