pub mod assets;
pub mod repositories;
pub mod siblings;
