#![no_main]

//! Fuzz target for oracle soundness/completeness against brute force.
//!
//! Generates a small-width domain and operands, then checks that
//! `inv_and_const`/`inv_mul_const` agree exactly with exhaustive
//! enumeration over the domain (spec §8, invariant 1).

use libfuzzer_sys::fuzz_target;

use arbitrary::Arbitrary;
use bvic_core::{Bv, BvDomain};
use bvic_oracle::ic_const;

const W: u32 = 4;

#[derive(Arbitrary, Debug)]
struct FuzzInput {
    chars: [u8; W as usize],
    t: u16,
    s: u16,
}

fn char_at(byte: u8) -> char {
    match byte % 3 {
        0 => '0',
        1 => '1',
        _ => 'x',
    }
}

fuzz_target!(|input: FuzzInput| {
    let s: String = input.chars.iter().map(|&b| char_at(b)).collect();
    let Ok(domain) = BvDomain::new_from_char(&s) else {
        return;
    };
    let t = Bv::uint64_to_bv(input.t as u64, W);
    let s = Bv::uint64_to_bv(input.s as u64, W);

    let brute_and = (0u64..(1 << W))
        .map(|v| Bv::uint64_to_bv(v, W))
        .any(|x| domain.contains(&x) && x.and(&s).eq_bv(&t));
    assert_eq!(ic_const::inv_and_const(&domain, &t, &s), brute_and);

    let brute_mul = (0u64..(1 << W))
        .map(|v| Bv::uint64_to_bv(v, W))
        .any(|x| domain.contains(&x) && x.mul(&s).eq_bv(&t));
    assert_eq!(ic_const::inv_mul_const(&domain, &t, &s), brute_mul);
});
