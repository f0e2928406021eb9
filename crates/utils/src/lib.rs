extern crate rand;

use rand::Rng;

const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz\
                            0123456789";

/// Creates a random lowercase alphanumeric string of `len` characters
pub fn create_random_id(len: usize) -> String {
    let mut rng = rand::thread_rng();

    (0..len)
        .map(|_| {
            let idx = rng.gen_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}

/// Creates an identifier for a scheduled notification in the
/// `8-4-4-12` grouping used by the platform schedulers.
pub fn create_notification_identifier() -> String {
    [8, 4, 4, 12]
        .iter()
        .map(|len| create_random_id(*len))
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_creates_random_ids() {
        let len = 30;
        let id1 = create_random_id(len);
        let id2 = create_random_id(len);
        assert_eq!(id1.len(), 30);
        assert_eq!(id2.len(), 30);
        assert_ne!(id1, id2);
        assert!(id1.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }

    #[test]
    fn it_creates_grouped_notification_identifiers() {
        let id = create_notification_identifier();
        let groups = id.split('-').map(|g| g.len()).collect::<Vec<_>>();
        assert_eq!(groups, vec![8, 4, 4, 12]);
        assert_ne!(id, create_notification_identifier());
    }
}
