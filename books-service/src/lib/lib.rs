pub mod config;
pub mod domain;
pub mod inbound;
pub mod outbound;
pub mod tasks;

pub use domain::book;
pub use outbound::repositories;
