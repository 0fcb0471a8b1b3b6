/// Inventory rows
pub mod holding;
/// User profiles and localities
pub mod profile;

pub use holding::{Holding, Listing, Status};
pub use profile::{Locality, Member, Profile};
