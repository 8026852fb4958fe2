#![no_main]

//! Fuzz target for ternary domain-string parsing.
//!
//! Tests that `BvDomain::new_from_char` handles arbitrary input without
//! panicking, and that any domain it does produce round-trips through
//! `to_char`.

use libfuzzer_sys::fuzz_target;

use bvic_core::BvDomain;

fuzz_target!(|data: &str| {
    if let Ok(domain) = BvDomain::new_from_char(data) {
        assert_eq!(domain.to_char(), data);
        let _ = domain.is_valid();
        let _ = domain.fixed_mask();
    }
});
