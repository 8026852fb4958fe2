//! Mod-30 wheel trial division (spec §4.5).
//!
//! An initial prefix visits 2, 3, and 5 directly; every candidate after
//! that skips multiples of 2, 3, and 5 by stepping through the residues
//! mod 30 that are coprime to 30, so the full candidate sequence for any
//! `n` is `2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, ...`.

use bvic_core::Bv;
use bvic_core::BvDomain;

#[cfg(feature = "tracing")]
use tracing::trace;

#[cfg(not(feature = "tracing"))]
macro_rules! trace {
    ($($tt:tt)*) => {};
}

/// Per-step increment cycle. Indices 0, 1, 2 are a one-time prefix that
/// walks the wheel onto 3, 5, 7; indices 3..=10 are the repeating mod-30
/// residue gaps (summing to 30), re-entered at index 3 after index 10.
const INCREMENTS: [u64; 11] = [1, 2, 2, 4, 2, 4, 2, 4, 6, 2, 6];

/// Trial-division iterator over a concrete `n`, producing its prime
/// factors (with multiplicity) in ascending order via the mod-30 wheel.
pub struct WheelFactorizer {
    n: u64,
    fact: u64,
    pos: usize,
    steps: u64,
    limit: u64,
    done: bool,
}

impl WheelFactorizer {
    /// `n` must be a positive concrete value; `limit` bounds the number of
    /// trial-division steps before giving up.
    pub fn new(n: &Bv, limit: u64) -> Self {
        debug_assert!(!n.is_zero(), "wheel factorizer requires a positive n");
        Self { n: bv_to_u64(n), fact: 2, pos: 0, steps: 0, limit, done: false }
    }
}

impl Iterator for WheelFactorizer {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        if self.done {
            return None;
        }
        loop {
            if self.fact.saturating_mul(self.fact) > self.n {
                self.done = true;
                if self.n > 1 {
                    return Some(self.n);
                }
                return None;
            }
            if self.steps > self.limit {
                self.done = true;
                return None;
            }
            self.steps += 1;
            if self.n % self.fact == 0 {
                self.n /= self.fact;
                trace!(fact = self.fact, remaining = self.n, "wheel factor found");
                return Some(self.fact);
            }
            let inc = INCREMENTS[self.pos];
            let next_fact = self.fact + inc;
            if next_fact <= self.fact {
                self.done = true;
                return None;
            }
            self.fact = next_fact;
            self.pos = if self.pos == 10 { 3 } else { self.pos + 1 };
        }
    }
}

fn bv_to_u64(v: &Bv) -> u64 {
    let mut out = 0u64;
    for i in 0..v.get_width().min(64) {
        if v.get_bit(i) {
            out |= 1 << i;
        }
    }
    out
}

/// Finds a factor of `n` that lies in `γ(domain)` and is strictly greater
/// than `excl_min`, trying both each wheel-yielded prime and its
/// complementary cofactor as candidates.
pub fn find_factor_in_domain(
    n: &Bv,
    domain: &BvDomain,
    excl_min: Option<&Bv>,
    step_limit: u64,
) -> Option<Bv> {
    let w = n.get_width();
    let n64 = bv_to_u64(n);
    if n64 == 0 {
        return None;
    }
    let excl = excl_min.map(bv_to_u64);
    let mut remaining = n64;
    let factorizer = WheelFactorizer::new(n, step_limit);
    for f in factorizer {
        let cofactor = if f != 0 { remaining / f } else { 0 };
        remaining /= f.max(1);
        for candidate in [f, cofactor] {
            if candidate == 0 {
                continue;
            }
            if let Some(e) = excl {
                if candidate <= e {
                    continue;
                }
            }
            let cand_bv = Bv::uint64_to_bv(candidate, w);
            if domain.contains(&cand_bv) {
                return Some(cand_bv);
            }
        }
    }
    None
}
