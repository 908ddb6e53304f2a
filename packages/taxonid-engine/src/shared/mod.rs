//! Shared code used by every feature slice

pub mod utils;
