use thiserror::Error;

/// Recoverable errors for the oracle crate's own boundary. The oracles
/// themselves always return `bool` (spec §7: feasibility has no error
/// kind) - this enum exists for the generator's fallible construction
/// entry point, [`crate::generator::DomainGenerator::try_new`], which can
/// be misconfigured by a caller in a way that is worth reporting rather
/// than asserting on.
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("domain generator range is empty after clipping to the domain")]
    EmptyRange,

    #[error(transparent)]
    Domain(#[from] bvic_core::BvError),
}
