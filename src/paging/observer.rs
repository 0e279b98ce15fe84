//! Hooks for keeping secondary indexes in sync with the item list

/// Notified whenever items enter or leave the controller's list
pub trait DataObserver<E>: Send {
    fn on_add(&mut self, _items: &[E]) {}

    fn on_remove(&mut self, _items: &[E]) {}

    fn on_clear(&mut self) {}
}

/// Observer that ignores everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl<E> DataObserver<E> for NoopObserver {}
