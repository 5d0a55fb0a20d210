//! Command handlers.

pub mod up;
