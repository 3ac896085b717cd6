pub mod adherent;
pub mod auth;
pub mod cotisation;
pub mod soin;
