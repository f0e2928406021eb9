use crate::repos::{DeleteResult, RepoError};
use medication_reminder_domain::{Entity, ID};
use std::sync::Mutex;

/// Useful functions for creating inmemory repositories

/// Inserts `val` unless an entity with the same id is already stored
pub fn insert<T: Clone + Entity>(val: &T, collection: &Mutex<Vec<T>>) -> Result<(), RepoError> {
    let mut collection = collection.lock().unwrap();
    if collection.iter().any(|item| item.id() == val.id()) {
        return Err(RepoError::AlreadyExists);
    }
    collection.push(val.clone());
    Ok(())
}

/// Replaces the entity with the same id as `val`, returns false if there was none
pub fn save<T: Clone + Entity>(val: &T, collection: &Mutex<Vec<T>>) -> bool {
    let mut collection = collection.lock().unwrap();
    match collection.iter().position(|item| item.id() == val.id()) {
        Some(index) => {
            collection[index] = val.clone();
            true
        }
        None => false,
    }
}

pub fn find_by<T: Clone + Entity, F: FnMut(&T) -> bool>(
    collection: &Mutex<Vec<T>>,
    mut compare: F,
) -> Vec<T> {
    let collection = collection.lock().unwrap();
    collection.iter().filter(|item| compare(item)).cloned().collect()
}

pub fn delete<T: Clone + Entity>(val_id: &ID, collection: &Mutex<Vec<T>>) -> Option<T> {
    let mut collection = collection.lock().unwrap();
    let index = collection.iter().position(|item| item.id() == val_id)?;
    Some(collection.remove(index))
}

pub fn delete_by<T: Clone + Entity, F: Fn(&T) -> bool>(
    collection: &Mutex<Vec<T>>,
    compare: F,
) -> DeleteResult {
    let mut collection = collection.lock().unwrap();
    let before = collection.len();
    collection.retain(|item| !compare(item));
    DeleteResult {
        deleted_count: (before - collection.len()) as i64,
    }
}
