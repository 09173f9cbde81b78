/// Rows accumulated between two flushes.
///
/// A batch has a single owner; it is appended to in arrival order and handed
/// over whole to the sink with [`Batch::take`], which leaves a fresh empty
/// batch behind.
#[derive(Debug, Clone)]
pub struct Batch<R> {
    pub id: String,
    pub rows: Vec<R>,
}

impl<R> Batch<R> {
    pub fn new() -> Self {
        Self {
            id: uuid::Uuid::new_v4().simple().to_string(),
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: R) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Swaps in a new empty batch and returns the accumulated one.
    pub fn take(&mut self) -> Batch<R> {
        std::mem::take(self)
    }
}

impl<R> Default for Batch<R> {
    fn default() -> Self {
        Self::new()
    }
}
