use thiserror::Error;

/// Errors returned at the crate's genuinely fallible boundaries:
/// parsing externally-sourced ternary domain strings, and constructing a
/// domain from two bit-vectors whose widths were not already established
/// by the caller. Everything else in this kernel is a contract violation
/// (mismatched widths already known to match, out-of-range bit positions,
/// generator misuse) and aborts via `assert!`/`debug_assert!` per spec §7.
#[derive(Debug, Error)]
pub enum BvError {
    #[error("domain string must not be empty")]
    EmptyDomainString,

    #[error("invalid ternary domain character {0:?}, expected one of '0', '1', 'x'")]
    InvalidChar(char),

    #[error("domain bounds have mismatched widths: lo={lo}, hi={hi}")]
    WidthMismatch { lo: u32, hi: u32 },
}
