#![forbid(unsafe_code)]

pub mod bv;
pub mod domain;
pub mod error;

pub use crate::bv::Bv;
pub use crate::domain::BvDomain;
pub use crate::error::BvError;
