//! Work item identity.

use uuid::Uuid;

/// A unit of work that can be enqueued.
///
/// The queue never stores or mutates the item itself, only its
/// identifier: a stable random token assigned by the caller when the
/// item is created. Duplicates are not rejected; two items carrying the
/// same identifier are processed independently.
pub trait WorkItem {
    /// The stable random identifier used as the queue payload.
    fn rand_id(&self) -> &str;
}

/// Generate a random identifier suitable for a [`WorkItem`].
pub fn generate_rand_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Order {
        rand_id: String,
    }

    impl WorkItem for Order {
        fn rand_id(&self) -> &str {
            &self.rand_id
        }
    }

    #[test]
    fn test_generate_rand_id_uniqueness() {
        let id1 = generate_rand_id();
        let id2 = generate_rand_id();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_generate_rand_id_format() {
        let id = generate_rand_id();
        // UUID v4 format: 8-4-4-4-12 hex characters
        assert_eq!(id.len(), 36);
        assert_eq!(id.chars().filter(|c| *c == '-').count(), 4);
    }

    #[test]
    fn test_work_item_exposes_identifier() {
        let order = Order {
            rand_id: generate_rand_id(),
        };
        assert_eq!(order.rand_id(), order.rand_id.as_str());
    }
}
