pub mod reconcile;
pub mod store;
pub mod usecase;
