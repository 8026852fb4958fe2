//! Three-valued abstract bit-vector domain (BVD).
//!
//! `D = (lo, hi)`: a concrete bit-vector `b` is in `D` iff `lo ≤bit b ≤bit
//! hi`, bitwise. A bit position is fixed iff `lo[i] = hi[i]`.

use std::cell::RefCell;
use std::fmt;

use crate::bv::Bv;
use crate::error::BvError;

/// Process-wide (here: thread-local) rotating print buffer size, matching
/// the legacy `to_str` convenience described in spec §6. Prefer
/// [`BvDomain::to_char`], which returns an owned `String` with no
/// reentrancy caveats; `to_str` exists only for parity with callers that
/// expect the legacy bounded-buffer behavior.
const PRINT_BUF_LEN: usize = 1024;

thread_local! {
    static PRINT_BUF: RefCell<PrintBuf> = RefCell::new(PrintBuf::new());
}

struct PrintBuf {
    buf: Vec<u8>,
    pos: usize,
}

impl PrintBuf {
    fn new() -> Self {
        Self { buf: vec![0u8; PRINT_BUF_LEN], pos: 0 }
    }

    /// Writes `s` into the rotating buffer, resetting to the start if it
    /// would not fit in the remaining space, and returns the byte range it
    /// occupies. Strings longer than the whole buffer are truncated to
    /// `width - 3` bits and suffixed with `"..."` by the caller before this
    /// is invoked.
    fn write(&mut self, s: &str) -> (usize, usize) {
        if self.pos + s.len() > self.buf.len() {
            self.pos = 0;
        }
        let start = self.pos;
        self.buf[start..start + s.len()].copy_from_slice(s.as_bytes());
        self.pos += s.len();
        (start, start + s.len())
    }
}

/// A three-valued abstract bit-vector: `(lo, hi)` of equal width.
#[derive(Clone, PartialEq, Eq)]
pub struct BvDomain {
    lo: Bv,
    hi: Bv,
}

impl fmt::Debug for BvDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BvDomain({})", self.to_char())
    }
}

impl BvDomain {
    /// Fully-unknown domain of width `w`: `lo = 0`, `hi = ones`.
    pub fn new_init(w: u32) -> Self {
        Self { lo: Bv::zero(w), hi: Bv::ones(w) }
    }

    /// Constructs a domain from explicit bounds. Widths must already match
    /// (contract violation otherwise, per spec §7); callers are responsible
    /// for ensuring `lo ≤bit hi` (validity) if they depend on it - this
    /// mirrors the source's own "construction does not imply validity"
    /// contract.
    pub fn new(lo: Bv, hi: Bv) -> Self {
        debug_assert_eq!(lo.get_width(), hi.get_width(), "BvDomain bounds must share a width");
        Self { lo, hi }
    }

    /// Fallible counterpart of [`Self::new`] for callers at a crate boundary
    /// (e.g. a fuzz harness) who have not already established the width
    /// invariant themselves.
    pub fn try_new(lo: Bv, hi: Bv) -> Result<Self, BvError> {
        if lo.get_width() != hi.get_width() {
            return Err(BvError::WidthMismatch { lo: lo.get_width(), hi: hi.get_width() });
        }
        Ok(Self { lo, hi })
    }

    /// Parses a ternary string (`{'0','1','x'}`, MSB first) into a domain.
    pub fn new_from_char(s: &str) -> Result<Self, BvError> {
        if s.is_empty() {
            return Err(BvError::EmptyDomainString);
        }
        let w = s.chars().count() as u32;
        let mut lo = Bv::zero(w);
        let mut hi = Bv::zero(w);
        for (pos_from_msb, c) in s.chars().enumerate() {
            let i = w - 1 - pos_from_msb as u32;
            match c {
                '0' => {
                    lo.set_bit(i, false);
                    hi.set_bit(i, false);
                }
                '1' => {
                    lo.set_bit(i, true);
                    hi.set_bit(i, true);
                }
                'x' => {
                    lo.set_bit(i, false);
                    hi.set_bit(i, true);
                }
                other => return Err(BvError::InvalidChar(other)),
            }
        }
        Ok(Self { lo, hi })
    }

    /// A singleton domain containing exactly `bv`.
    pub fn new_fixed(bv: Bv) -> Self {
        Self { lo: bv.clone(), hi: bv }
    }

    pub fn new_fixed_u64(val: u64, w: u32) -> Self {
        Self::new_fixed(Bv::uint64_to_bv(val, w))
    }

    pub fn copy(&self) -> Self {
        self.clone()
    }

    pub fn lo(&self) -> &Bv {
        &self.lo
    }

    pub fn hi(&self) -> &Bv {
        &self.hi
    }

    pub fn get_width(&self) -> u32 {
        self.lo.get_width()
    }

    pub fn equal(&self, other: &Self) -> bool {
        self.lo.eq_bv(&other.lo) && self.hi.eq_bv(&other.hi)
    }

    pub fn slice(&self, hi: u32, lo: u32) -> Self {
        Self { lo: self.lo.slice(hi, lo), hi: self.hi.slice(hi, lo) }
    }

    /// `not(D) = (~hi, ~lo)` - the bounds swap to preserve `lo ≤ hi`.
    pub fn not(&self) -> Self {
        Self { lo: self.hi.not(), hi: self.lo.not() }
    }

    /// `~lo | hi = ones`: no position has `lo=1, hi=0`.
    pub fn is_valid(&self) -> bool {
        self.lo.not().or(&self.hi).is_ones()
    }

    pub fn is_fixed(&self) -> bool {
        self.lo.eq_bv(&self.hi)
    }

    /// The fixed-bit mask `m = ~(lo ^ hi)`.
    pub fn fixed_mask(&self) -> Bv {
        self.lo.xnor(&self.hi)
    }

    pub fn has_fixed_bits(&self) -> bool {
        self.fixed_mask().redor()
    }

    pub fn fix_bit(&mut self, i: u32, v: bool) {
        self.lo.set_bit(i, v);
        self.hi.set_bit(i, v);
    }

    pub fn is_fixed_bit(&self, i: u32) -> bool {
        self.lo.get_bit(i) == self.hi.get_bit(i)
    }

    pub fn is_fixed_bit_true(&self, i: u32) -> bool {
        self.is_fixed_bit(i) && self.lo.get_bit(i)
    }

    pub fn is_fixed_bit_false(&self, i: u32) -> bool {
        self.is_fixed_bit(i) && !self.lo.get_bit(i)
    }

    /// `true` iff every fixed bit of `D` equals the corresponding bit of
    /// `b`: `((b & hi) | lo) = b`. For a valid `D` this is exactly
    /// membership in `γ(D)`.
    pub fn check_fixed_bits(&self, b: &Bv) -> bool {
        b.and(&self.hi).or(&self.lo).eq_bv(b)
    }

    /// Bit-by-bit restatement of [`Self::check_fixed_bits`] (spec §4.1),
    /// kept distinct to witness the identity the spec calls out in its
    /// testable properties (§8, invariant 7).
    pub fn is_consistent(&self, b: &Bv) -> bool {
        for i in 0..self.get_width() {
            if self.is_fixed_bit(i) && self.lo.get_bit(i) != b.get_bit(i) {
                return false;
            }
        }
        true
    }

    /// Membership test `b ∈ γ(D)`.
    pub fn contains(&self, b: &Bv) -> bool {
        self.check_fixed_bits(b)
    }

    /// Fixed-bit consistency of two domains (spec §4.4): `true` iff they
    /// agree on every position fixed in both.
    pub fn consistent_with(&self, other: &Self) -> bool {
        debug_assert_eq!(self.get_width(), other.get_width());
        let c = self.fixed_mask().and(&other.fixed_mask());
        c.and(&self.lo).eq_bv(&c.and(&other.lo))
    }

    /// Per-bit rendering: `'0'`/`'1'` for agreement, `'x'` for
    /// `lo=0,hi=1`, `'?'` for the invalid case `lo=1,hi=0`. MSB first.
    pub fn to_char(&self) -> String {
        let w = self.get_width();
        let mut s = String::with_capacity(w as usize);
        for i in (0..w).rev() {
            let (l, h) = (self.lo.get_bit(i), self.hi.get_bit(i));
            s.push(match (l, h) {
                (false, false) => '0',
                (true, true) => '1',
                (false, true) => 'x',
                (true, false) => '?',
            });
        }
        s
    }

    /// Legacy rotating-buffer pretty-printer (spec §6). Thread-local rather
    /// than process-wide (spec §9's suggested remediation), still not safe
    /// to treat as a stable borrow across calls from the same thread: each
    /// call may rewind the buffer and overwrite a previous result.
    pub fn to_str(&self) -> String {
        let rendered = self.to_char();
        let text = if rendered.len() > PRINT_BUF_LEN {
            let keep = (self.get_width() as usize).saturating_sub(3).min(PRINT_BUF_LEN - 3);
            format!("{}...", &rendered[..keep])
        } else {
            rendered
        };
        PRINT_BUF.with(|buf| {
            let mut buf = buf.borrow_mut();
            let (start, end) = buf.write(&text);
            String::from_utf8(buf.buf[start..end].to_vec()).expect("ASCII-only domain text")
        })
    }
}

impl fmt::Display for BvDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_char_matches_spec_example() {
        let d = BvDomain::new_from_char("1x0x").unwrap();
        assert_eq!(d.lo(), &Bv::uint64_to_bv(0b1000, 4));
        assert_eq!(d.hi(), &Bv::uint64_to_bv(0b1101, 4));
    }

    #[test]
    fn round_trip_to_char() {
        for s in ["xxxx", "1010", "x0x1", "0000", "1111"] {
            let d = BvDomain::new_from_char(s).unwrap();
            assert_eq!(d.to_char(), s);
        }
    }

    #[test]
    fn not_is_involution() {
        let d = BvDomain::new_from_char("x01x").unwrap();
        assert!(d.not().not().equal(&d));
    }

    #[test]
    fn invalid_domain_renders_question_marks() {
        let lo = Bv::uint64_to_bv(0b1000, 4);
        let hi = Bv::uint64_to_bv(0b0111, 4);
        let d = BvDomain::new(lo, hi);
        assert!(!d.is_valid());
        assert_eq!(d.to_char(), "????");
    }

    #[test]
    fn check_fixed_bits_matches_is_consistent() {
        let d = BvDomain::new_from_char("x0x1").unwrap();
        for v in 0u64..16 {
            let b = Bv::uint64_to_bv(v, 4);
            assert_eq!(d.check_fixed_bits(&b), d.is_consistent(&b));
        }
    }

    #[test]
    fn slice_matches_bound_slices() {
        let d = BvDomain::new_from_char("10x1x0").unwrap();
        let s = d.slice(4, 1);
        assert_eq!(s.lo(), &d.lo().slice(4, 1));
        assert_eq!(s.hi(), &d.hi().slice(4, 1));
    }
}
