pub mod notifications;
pub mod repositories;
pub mod user_details;
