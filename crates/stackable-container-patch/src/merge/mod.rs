//! Merge algorithms for container fields with non-trivial list semantics.
//!
//! These are pure functions on the base values of one container. They never fail on their own,
//! except where a parameter list cannot be interpreted unambiguously (see
//! [`ports::Error::DuplicatePortKey`]).
pub mod args;
pub mod env;
pub mod ports;
