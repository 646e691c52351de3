use std::sync::Arc;

/// A page-owned collection. Every write swaps in a new snapshot and bumps
/// `revision`, so views derived from a snapshot can tell when to recompute.
#[derive(Debug, Clone)]
pub struct Store<T> {
    items: Arc<Vec<T>>,
    revision: u64,
}

impl<T> Default for Store<T> {
    fn default() -> Self {
        Self {
            items: Arc::new(Vec::new()),
            revision: 0,
        }
    }
}

impl<T: Clone> Store<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items: Arc::new(items),
            revision: 1,
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// A cheap handle on the current snapshot; later writes never touch it.
    #[cfg(test)]
    fn snapshot(&self) -> Arc<Vec<T>> {
        Arc::clone(&self.items)
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&T> {
        self.items.get(idx)
    }

    pub fn replace(&mut self, items: Vec<T>) {
        self.items = Arc::new(items);
        self.revision += 1;
    }

    pub fn append(&mut self, item: T) {
        let mut next = Vec::with_capacity(self.items.len() + 1);
        next.extend(self.items.iter().cloned());
        next.push(item);
        self.replace(next);
    }

    /// Drops every item matching `pred`; returns how many were removed.
    pub fn remove_where(&mut self, pred: impl Fn(&T) -> bool) -> usize {
        let next: Vec<T> = self.items.iter().filter(|item| !pred(item)).cloned().collect();
        let removed = self.items.len() - next.len();
        if removed > 0 {
            self.replace(next);
        }
        removed
    }

    /// Swaps the first item matching `pred` for `item`. Returns false when
    /// nothing matched.
    pub fn replace_where(&mut self, pred: impl Fn(&T) -> bool, item: T) -> bool {
        let Some(idx) = self.items.iter().position(|existing| pred(existing)) else {
            return false;
        };
        let mut next = self.items.as_ref().clone();
        next[idx] = item;
        self.replace(next);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_do_not_disturb_earlier_snapshots() {
        let mut store = Store::new(vec![1, 2, 3]);
        let before = store.snapshot();
        store.append(4);
        assert_eq!(before.as_slice(), &[1, 2, 3]);
        assert_eq!(store.items(), &[1, 2, 3, 4]);
    }

    #[test]
    fn revision_moves_only_on_effective_writes() {
        let mut store = Store::new(vec![1, 2, 3]);
        let rev = store.revision();
        assert_eq!(store.remove_where(|n| *n == 9), 0);
        assert_eq!(store.revision(), rev);
        assert_eq!(store.remove_where(|n| *n == 2), 1);
        assert!(store.revision() > rev);
        assert_eq!(store.items(), &[1, 3]);
    }

    #[test]
    fn replace_where_swaps_in_place() {
        let mut store = Store::new(vec![(1, "a"), (2, "b")]);
        assert!(store.replace_where(|(id, _)| *id == 2, (2, "z")));
        assert!(!store.replace_where(|(id, _)| *id == 7, (7, "q")));
        assert_eq!(store.items(), &[(1, "a"), (2, "z")]);
    }
}
