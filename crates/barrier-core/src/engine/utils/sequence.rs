/// Hands out node ids in creation order.
///
/// Every construction owns its own sequence, so ids of one build never depend on what was
/// built before it.
#[derive(Debug, Clone, Default)]
pub struct IdSequence {
    next: usize,
}

impl IdSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sequence whose first id is `first`.
    pub fn starting_at(first: usize) -> Self {
        Self { next: first }
    }

    pub fn next_id(&mut self) -> usize {
        let id = self.next;
        self.next += 1;
        id
    }

    /// The id the next call to [`next_id`](Self::next_id) will return.
    pub fn peek(&self) -> usize {
        self.next
    }
}
