//! Shared helpers for staging and packaging.

pub mod fs;
pub mod naming;
pub mod process;
