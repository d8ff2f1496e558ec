//! Shared utilities for feature slices

pub mod pagination;
pub mod validation;
