pub mod repository;

mod asset;
mod id_types;
pub use asset::*;
pub use id_types::*;
