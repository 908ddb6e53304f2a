//! Shared utilities

pub mod id_converter;
pub mod text;

pub use id_converter::{decode, encode, IdConverter};
pub use text::{build_label, digits_or_ascii_letters, equals_digit_or_ascii_letters};
