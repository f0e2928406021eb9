pub mod firestore;
pub mod inmemory_repo;
