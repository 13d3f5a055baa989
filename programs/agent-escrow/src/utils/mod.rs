//! Shared helpers for access control, proof verification and input checks

pub mod access;
pub mod guard;
pub mod validation;
pub mod verifier;
