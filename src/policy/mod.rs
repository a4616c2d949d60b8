//! Policy parameters and batch loading

mod data;
pub mod loader;

pub use data::{Gender, PolicyParameters};
pub use loader::{load_policies, load_policies_from_reader};
