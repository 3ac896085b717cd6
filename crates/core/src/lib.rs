//! Domain rules for the mutuelle backend.
//!
//! This crate performs no I/O. It owns the value types shared by the
//! database and HTTP layers, and the cotisation lifecycle transition rules.

pub mod adherent;
pub mod cotisation;
pub mod documents;
pub mod error;
pub mod lifecycle;
pub mod soin;
pub mod types;
