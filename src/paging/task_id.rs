//! Task id generation used to recognise superseded loads.

/// Issues strictly increasing task ids.
///
/// Not thread-safe; the owning controller serializes access.
#[derive(Debug, Clone, Default)]
pub struct TaskIdGenerator {
    next: u64,
}

impl TaskIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a generator whose first issued id is `next`
    pub fn starting_at(next: u64) -> Self {
        Self { next }
    }

    /// Mint a fresh id, never returned before by this generator
    pub fn next_id(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// Peek the id the next call to [`next_id`](Self::next_id) will return
    pub fn current_id(&self) -> u64 {
        self.next
    }

    pub fn set_next_id(&mut self, next: u64) {
        self.next = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_strictly_increasing() {
        let mut generator = TaskIdGenerator::new();
        let a = generator.next_id();
        let b = generator.next_id();
        let c = generator.next_id();
        assert!(a < b && b < c);
    }

    #[test]
    fn test_current_id_peeks_without_consuming() {
        let mut generator = TaskIdGenerator::starting_at(5);
        assert_eq!(generator.current_id(), 5);
        assert_eq!(generator.current_id(), 5);
        assert_eq!(generator.next_id(), 5);
        assert_eq!(generator.current_id(), 6);
    }

    #[test]
    fn test_restored_counter_continues() {
        let mut original = TaskIdGenerator::new();
        original.next_id();
        original.next_id();

        let mut restored = TaskIdGenerator::new();
        restored.set_next_id(original.current_id());
        assert_eq!(restored.next_id(), original.next_id());
    }
}
