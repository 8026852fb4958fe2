//! Domain-oblivious invertibility conditions (spec §4.2).
//!
//! Each function decides `∃ x ∈ {0,1}^w . f(x, s) = t` (or `f(s, x) = t`
//! for `pos_x = Right`), treating `x` as fully unconstrained. These are
//! the existence half of the kernel; [`crate::ic_const`] strengthens
//! them to a caller-supplied domain.

use bvic_core::Bv;

use crate::Position;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// `add`: always invertible (commutative, surjective onto every `t`).
#[cfg_attr(feature = "tracing", instrument(skip_all))]
pub fn inv_add(_t: &Bv, _s: &Bv) -> bool {
    true
}

/// `and`: `t & s = t`.
#[cfg_attr(feature = "tracing", instrument(skip_all))]
pub fn inv_and(t: &Bv, s: &Bv) -> bool {
    t.and(s).eq_bv(t)
}

/// `eq`: always invertible (`x = s` and `x ≠ s` both have witnesses
/// whenever `w(x) ≥ 1`, which is always true).
#[cfg_attr(feature = "tracing", instrument(skip_all))]
pub fn inv_eq(_t: &Bv, _s: &Bv) -> bool {
    true
}

/// `mul`: `(-s | s) & t = t`.
#[cfg_attr(feature = "tracing", instrument(skip_all))]
pub fn inv_mul(t: &Bv, s: &Bv) -> bool {
    s.neg().or(s).and(t).eq_bv(t)
}

/// `udiv`: `pos_x=Left` is `(s * t) / s = t`; `pos_x=Right` is
/// `s / (s / t) = t`.
#[cfg_attr(feature = "tracing", instrument(skip_all))]
pub fn inv_udiv(t: &Bv, s: &Bv, pos_x: Position) -> bool {
    if pos_x.is_left() {
        s.mul(t).udiv(s).eq_bv(t)
    } else {
        s.udiv(&s.udiv(t)).eq_bv(t)
    }
}

/// `urem`: `pos_x=Left` is `~(-s) ≥ t`; `pos_x=Right` is
/// `((t + t - s) & s) ≥ t`.
#[cfg_attr(feature = "tracing", instrument(skip_all))]
pub fn inv_urem(t: &Bv, s: &Bv, pos_x: Position) -> bool {
    if pos_x.is_left() {
        s.neg().not().uge(t)
    } else {
        t.add(t).sub(s).and(s).uge(t)
    }
}

/// `ult`: `pos_x=Left` is `t=0 ∨ s≠0`; `pos_x=Right` is `t=0 ∨ s≠ones`.
#[cfg_attr(feature = "tracing", instrument(skip_all))]
pub fn inv_ult(t: &Bv, s: &Bv, pos_x: Position) -> bool {
    debug_assert_eq!(t.get_width(), 1);
    if t.is_false() {
        return true;
    }
    if pos_x.is_left() {
        !s.is_zero()
    } else {
        !s.is_ones()
    }
}

/// `sll`: `pos_x=Left` is `(t >> s) << s = t`; `pos_x=Right` is
/// `∃ i ∈ [0, w(s)]. s << i = t`.
#[cfg_attr(feature = "tracing", instrument(skip_all))]
pub fn inv_sll(t: &Bv, s: &Bv, pos_x: Position) -> bool {
    if pos_x.is_left() {
        t.srl(s).sll(s).eq_bv(t)
    } else {
        exists_shift(s, t, Bv::sll)
    }
}

/// `srl`: `pos_x=Left` is `(t << s) >> s = t`; `pos_x=Right` is
/// `∃ i ∈ [0, w(s)]. s >> i = t`.
#[cfg_attr(feature = "tracing", instrument(skip_all))]
pub fn inv_srl(t: &Bv, s: &Bv, pos_x: Position) -> bool {
    if pos_x.is_left() {
        t.sll(s).srl(s).eq_bv(t)
    } else {
        exists_shift(s, t, Bv::srl)
    }
}

/// Shared existential-shift search for `sll`/`srl` with `pos_x=Right`:
/// iterates `i = 0 ..= w(s)`, using a width-`w(s)` shift amount, and
/// stops at the first `i` with `op(s, i) = t`.
fn exists_shift(s: &Bv, t: &Bv, op: impl Fn(&Bv, &Bv) -> Bv) -> bool {
    let w = s.get_width();
    for i in 0..=w {
        let amount = Bv::uint64_to_bv(i as u64, w);
        if op(s, &amount).eq_bv(t) {
            return true;
        }
    }
    false
}

/// `concat`: `pos_x=Left` (`x∘s=t`) is `s = t[w(s)-1:0]`; `pos_x=Right`
/// (`s∘x=t`) is `s = t[w(t)-1:w(t)-w(s)]`.
#[cfg_attr(feature = "tracing", instrument(skip_all))]
pub fn inv_concat(t: &Bv, s: &Bv, pos_x: Position) -> bool {
    let ws = s.get_width();
    let wt = t.get_width();
    if pos_x.is_left() {
        s.eq_bv(&t.slice(ws - 1, 0))
    } else {
        s.eq_bv(&t.slice(wt - 1, wt - ws))
    }
}

/// `slice`: always invertible (every bit pattern of `t` is reachable by
/// some full-width `x`).
#[cfg_attr(feature = "tracing", instrument(skip_all))]
pub fn inv_slice(_t: &Bv, _upper: u32, _lower: u32) -> bool {
    true
}
