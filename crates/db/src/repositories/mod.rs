//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods.
//! Methods take any Postgres executor, so the same query runs against the
//! pool or inside a transaction (`&mut *tx`).

pub mod adherent_repo;
pub mod cotisation_repo;
pub mod session_repo;
pub mod soin_repo;
pub mod user_repo;

pub use adherent_repo::AdherentRepo;
pub use cotisation_repo::CotisationRepo;
pub use session_repo::SessionRepo;
pub use soin_repo::SoinRepo;
pub use user_repo::UserRepo;
