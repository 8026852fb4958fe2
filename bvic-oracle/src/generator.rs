//! Ascending enumerator over `γ(D) ∩ [min, max]` (spec §4.4).
//!
//! Progress is tracked by a counter over only the domain's *free* bit
//! positions (`bits`), which is narrower than the domain itself whenever
//! `D` has any fixed bits. Composition into a full-width concrete value
//! happens lazily, on each emission.

use bvic_core::{Bv, BvDomain, BvError};

use crate::error::OracleError;

#[cfg(feature = "tracing")]
use tracing::trace;

#[cfg(not(feature = "tracing"))]
macro_rules! trace {
    ($($tt:tt)*) => {};
}

/// Enumerates `γ(D) ∩ [min, max]` in ascending order.
pub struct DomainGenerator {
    domain: BvDomain,
    free_positions: Vec<u32>,
    bits_min: Bv,
    bits_max: Bv,
    bits: Option<Bv>,
    empty: bool,
}

impl DomainGenerator {
    /// Full range of the domain: `min = 0`, `max = ones`.
    pub fn full_range(domain: BvDomain) -> Self {
        let w = domain.get_width();
        Self::new(domain, Bv::zero(w), Bv::ones(w))
    }

    /// Builds a generator over `γ(D) ∩ [min, max]`. Widths of `min`/`max`
    /// must match `D`'s width (contract violation otherwise); an empty
    /// effective range is a normal, representable state, not an error.
    pub fn new(domain: BvDomain, min: Bv, max: Bv) -> Self {
        debug_assert_eq!(min.get_width(), domain.get_width());
        debug_assert_eq!(max.get_width(), domain.get_width());
        Self::build(domain, min, max)
    }

    /// Fallible counterpart of [`Self::new`] for callers at a crate
    /// boundary who have not already established `min`/`max`'s width
    /// invariant themselves, and who want the empty-range case reported
    /// rather than returned as a silently-exhausted generator.
    pub fn try_new(domain: BvDomain, min: Bv, max: Bv) -> Result<Self, OracleError> {
        if min.get_width() != domain.get_width() {
            return Err(OracleError::Domain(BvError::WidthMismatch {
                lo: min.get_width(),
                hi: domain.get_width(),
            }));
        }
        if max.get_width() != domain.get_width() {
            return Err(OracleError::Domain(BvError::WidthMismatch {
                lo: max.get_width(),
                hi: domain.get_width(),
            }));
        }
        let gen = Self::build(domain, min, max);
        if gen.is_exhausted() {
            return Err(OracleError::EmptyRange);
        }
        Ok(gen)
    }

    fn build(domain: BvDomain, min: Bv, max: Bv) -> Self {
        let w = domain.get_width();
        let free_positions: Vec<u32> = (0..w).filter(|&i| !domain.is_fixed_bit(i)).collect();
        let cnt = free_positions.len() as u32;

        let eff_min = if min.ult(domain.lo()) { domain.lo().clone() } else { min };
        let eff_max = if max.ugt(domain.hi()) { domain.hi().clone() } else { max };

        if cnt == 0 || eff_min.ugt(domain.hi()) || eff_max.ult(domain.lo()) {
            return Self::empty(domain, free_positions);
        }

        let bits_min = derive_bits_min(&domain, &eff_min, &free_positions);
        let bits_max = derive_bits_max(&domain, &eff_max, &free_positions);
        let (bits_min, bits_max) = match (bits_min, bits_max) {
            (Some(a), Some(b)) => (a, b),
            _ => return Self::empty(domain, free_positions),
        };
        if bits_min.ugt(&bits_max) {
            return Self::empty(domain, free_positions);
        }
        trace!(cnt, "generator built with nonempty range");
        Self {
            domain,
            free_positions,
            bits: Some(bits_min.clone()),
            bits_min,
            bits_max,
            empty: false,
        }
    }

    fn empty(domain: BvDomain, free_positions: Vec<u32>) -> Self {
        let cnt = free_positions.len().max(1) as u32;
        Self {
            domain,
            free_positions,
            bits_min: Bv::zero(cnt),
            bits_max: Bv::zero(cnt),
            bits: None,
            empty: true,
        }
    }

    /// Composes a full-width value from `D.lo` with the free positions
    /// overwritten by `bits` (low-to-high counter bit ↔ low-to-high free
    /// position).
    fn compose(&self, bits: &Bv) -> Bv {
        let mut cur = self.domain.lo().clone();
        for (k, &pos) in self.free_positions.iter().enumerate() {
            cur.set_bit(pos, bits.get_bit(k as u32));
        }
        cur
    }

    /// `true` iff no further values remain (including the never-had-any case).
    pub fn is_exhausted(&self) -> bool {
        self.empty || self.bits.is_none()
    }

    /// Number of values remaining (including one about to be yielded by
    /// the next call to [`Iterator::next`]), saturating at `u128::MAX`
    /// for free-bit counts too wide to represent the true count exactly.
    pub fn remaining_count(&self) -> u128 {
        match &self.bits {
            None => 0,
            Some(b) => saturating_range_count(b, &self.bits_max),
        }
    }

    /// Draws a value uniformly at random from `γ(D) ∩ [min, max]`, by
    /// rejection-sampling the free-bit counter into `[bits_min, bits_max]`.
    /// Does not consume the forward-iteration cursor.
    #[cfg(feature = "random-draw")]
    pub fn random<R: rand::Rng + ?Sized>(&self, rng: &mut R) -> Option<Bv> {
        if self.empty {
            return None;
        }
        let cnt = self.free_positions.len() as u32;
        loop {
            let mut candidate = Bv::zero(cnt);
            for i in 0..cnt {
                candidate.set_bit(i, rng.random_bool(0.5));
            }
            if candidate.uge(&self.bits_min) && candidate.ule(&self.bits_max) {
                return Some(self.compose(&candidate));
            }
        }
    }
}

impl Iterator for DomainGenerator {
    type Item = Bv;

    fn next(&mut self) -> Option<Bv> {
        let bits = self.bits.take()?;
        let cur = self.compose(&bits);
        if !bits.eq_bv(&self.bits_max) {
            self.bits = Some(bits.inc());
        }
        Some(cur)
    }
}

/// Smallest free-bit pattern such that the composed value is `≥ min`,
/// `None` if no such pattern exists under `D`'s fixed bits.
fn derive_bits_min(domain: &BvDomain, min: &Bv, free_positions: &[u32]) -> Option<Bv> {
    let cnt = free_positions.len() as u32;
    let mut bits_min = Bv::zero(cnt);
    let mut last_zero_copy: Option<u32> = None;
    let mut free_rank = cnt;
    for i in (0..domain.get_width()).rev() {
        if domain.is_fixed_bit(i) {
            let fixed_val = domain.lo().get_bit(i);
            let min_val = min.get_bit(i);
            if fixed_val && !min_val {
                return Some(bits_min);
            } else if !fixed_val && min_val {
                return match last_zero_copy {
                    Some(j) => {
                        bits_min.set_bit(j, true);
                        for k in 0..j {
                            bits_min.set_bit(k, false);
                        }
                        Some(bits_min)
                    }
                    None => None,
                };
            }
        } else {
            free_rank -= 1;
            let mval = min.get_bit(i);
            bits_min.set_bit(free_rank, mval);
            if !mval {
                last_zero_copy = Some(free_rank);
            }
        }
    }
    Some(bits_min)
}

/// Largest free-bit pattern such that the composed value is `≤ max`,
/// derived symmetrically to [`derive_bits_min`].
fn derive_bits_max(domain: &BvDomain, max: &Bv, free_positions: &[u32]) -> Option<Bv> {
    let cnt = free_positions.len() as u32;
    let mut bits_max = Bv::ones(cnt);
    let mut last_one_copy: Option<u32> = None;
    let mut free_rank = cnt;
    for i in (0..domain.get_width()).rev() {
        if domain.is_fixed_bit(i) {
            let fixed_val = domain.lo().get_bit(i);
            let max_val = max.get_bit(i);
            if !fixed_val && max_val {
                return Some(bits_max);
            } else if fixed_val && !max_val {
                return match last_one_copy {
                    Some(j) => {
                        bits_max.set_bit(j, false);
                        for k in 0..j {
                            bits_max.set_bit(k, true);
                        }
                        Some(bits_max)
                    }
                    None => None,
                };
            }
        } else {
            free_rank -= 1;
            let mval = max.get_bit(i);
            bits_max.set_bit(free_rank, mval);
            if mval {
                last_one_copy = Some(free_rank);
            }
        }
    }
    Some(bits_max)
}

fn bv_to_u128(v: &Bv) -> u128 {
    let mut out = 0u128;
    for i in 0..v.get_width().min(128) {
        if v.get_bit(i) {
            out |= 1 << i;
        }
    }
    out
}

/// `hi - lo + 1` as a `u128`, saturating at `u128::MAX` instead of
/// overflowing when `lo`/`hi` are wide enough that the true count does
/// not fit. `lo` and `hi` must share a width and satisfy `lo <= hi`.
fn saturating_range_count(lo: &Bv, hi: &Bv) -> u128 {
    let diff = hi.sub(lo);
    let w = diff.get_width();
    if (128..w).any(|i| diff.get_bit(i)) {
        return u128::MAX;
    }
    bv_to_u128(&diff).saturating_add(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exhaustive_over_full_range_matches_brute_force() {
        let d = BvDomain::new_from_char("x0x1").unwrap();
        let gen = DomainGenerator::full_range(d.clone());
        let got: Vec<Bv> = gen.collect();
        let expected: Vec<Bv> = (0u64..16)
            .map(|v| Bv::uint64_to_bv(v, 4))
            .filter(|b| d.contains(b))
            .collect();
        assert_eq!(got, expected);
    }

    #[test]
    fn ascending_order() {
        let d = BvDomain::new_from_char("xxxx").unwrap();
        let gen = DomainGenerator::full_range(d);
        let got: Vec<Bv> = gen.collect();
        for w in got.windows(2) {
            assert!(w[0].ult(&w[1]));
        }
    }

    #[test]
    fn try_new_rejects_width_mismatch() {
        let d = BvDomain::new_from_char("xxxx").unwrap();
        let min = Bv::zero(8);
        let max = Bv::ones(4);
        assert!(matches!(
            DomainGenerator::try_new(d, min, max),
            Err(OracleError::Domain(BvError::WidthMismatch { .. }))
        ));
    }

    #[test]
    fn try_new_rejects_empty_range() {
        let d = BvDomain::new_from_char("xx00").unwrap();
        let min = Bv::uint64_to_bv(5, 4);
        let max = Bv::uint64_to_bv(7, 4);
        assert!(matches!(DomainGenerator::try_new(d, min, max), Err(OracleError::EmptyRange)));
    }

    #[test]
    fn try_new_accepts_nonempty_range() {
        let d = BvDomain::new_from_char("xxxx").unwrap();
        let min = Bv::uint64_to_bv(5, 4);
        let max = Bv::uint64_to_bv(11, 4);
        assert!(DomainGenerator::try_new(d, min, max).is_ok());
    }

    #[test]
    fn remaining_count_saturates_beyond_u128_for_wide_domains() {
        let d = BvDomain::new_init(200);
        let gen = DomainGenerator::full_range(d);
        assert_eq!(gen.remaining_count(), u128::MAX);
    }

    #[test]
    fn remaining_count_is_exact_for_wide_domain_with_small_range() {
        let d = BvDomain::new_init(200);
        let min = Bv::zero(200);
        let max = Bv::uint64_to_bv(9, 200);
        let gen = DomainGenerator::new(d, min, max);
        assert_eq!(gen.remaining_count(), 10);
    }

    #[test]
    fn respects_min_max_bounds() {
        let d = BvDomain::new_from_char("xxxx").unwrap();
        let min = Bv::uint64_to_bv(5, 4);
        let max = Bv::uint64_to_bv(11, 4);
        let gen = DomainGenerator::new(d, min, max);
        let got: Vec<Bv> = gen.collect();
        let expected: Vec<Bv> = (5u64..=11).map(|v| Bv::uint64_to_bv(v, 4)).collect();
        assert_eq!(got, expected);
    }

    #[test]
    fn fixed_domain_is_empty() {
        let d = BvDomain::new_from_char("1010").unwrap();
        let gen = DomainGenerator::full_range(d);
        assert!(gen.is_exhausted());
        assert_eq!(gen.count(), 0);
    }

    #[test]
    fn disjoint_range_is_empty() {
        let d = BvDomain::new_from_char("xx00").unwrap();
        let min = Bv::uint64_to_bv(5, 4);
        let max = Bv::uint64_to_bv(7, 4);
        let gen = DomainGenerator::new(d, min, max);
        assert!(gen.is_exhausted());
    }

    #[cfg(feature = "random-draw")]
    #[test]
    fn random_draw_stays_within_domain_and_bounds() {
        use rand::SeedableRng;
        use rand_chacha::ChaCha20Rng;

        let d = BvDomain::new_from_char("x1xx").unwrap();
        let min = Bv::uint64_to_bv(3, 4);
        let max = Bv::uint64_to_bv(13, 4);
        let gen = DomainGenerator::new(d.clone(), min.clone(), max.clone());
        let mut rng = ChaCha20Rng::seed_from_u64(42);
        for _ in 0..64 {
            let v = gen.random(&mut rng).expect("nonempty range");
            assert!(d.contains(&v));
            assert!(v.uge(&min) && v.ule(&max));
        }
    }

    #[cfg(feature = "random-draw")]
    #[test]
    fn random_draw_on_empty_generator_is_none() {
        use rand::SeedableRng;
        use rand_chacha::ChaCha20Rng;

        let d = BvDomain::new_from_char("1010").unwrap();
        let gen = DomainGenerator::full_range(d);
        let mut rng = ChaCha20Rng::seed_from_u64(7);
        assert!(gen.random(&mut rng).is_none());
    }
}
