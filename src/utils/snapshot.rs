/// Opening and current quote of one market.
///
/// The opening quote is the first entry of the history and the current quote
/// the last, in the order the source delivered them. Both are `None` for an
/// empty history, so field reads on them just yield `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<T> {
    pub opening: Option<T>,
    pub current: Option<T>,
}

impl<T: Clone> Snapshot<T> {
    pub fn from_history(history: &[T]) -> Self {
        Self {
            opening: history.first().cloned(),
            current: history.last().cloned(),
        }
    }
}

impl<T> Default for Snapshot<T> {
    fn default() -> Self {
        Self {
            opening: None,
            current: None,
        }
    }
}

impl<T> Snapshot<T> {
    /// Read a field of the opening quote
    pub fn read_opening<V>(&self, field: impl Fn(&T) -> Option<V>) -> Option<V> {
        self.opening.as_ref().and_then(field)
    }

    /// Read a field of the current quote
    pub fn read_current<V>(&self, field: impl Fn(&T) -> Option<V>) -> Option<V> {
        self.current.as_ref().and_then(field)
    }
}
