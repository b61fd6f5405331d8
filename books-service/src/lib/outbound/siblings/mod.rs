//! HTTP clients for sibling services.

pub mod client;
pub mod registry;
pub mod user_details;

pub use client::SiblingClient;
pub use registry::ServiceName;
pub use registry::ServiceRegistry;
pub use user_details::RemoteUserDetails;
