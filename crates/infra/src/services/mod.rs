pub mod identity;
pub mod notifications;
