// ============================================================================
// REACTIVITY - Celda observable para estado de UI
// ============================================================================

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

type Callback<T> = Rc<dyn Fn(&T)>;
type Subscribers<T> = RefCell<Vec<(u64, Callback<T>)>>;

/// Valor compartido que notifica a sus subscribers en cada cambio.
/// Las clones comparten valor y subscribers.
pub struct ReactiveState<T> {
    value: Rc<RefCell<T>>,
    subscribers: Rc<Subscribers<T>>,
    next_id: Rc<Cell<u64>>,
}

/// Handle de una suscripción. Soltarlo no la cancela: hay que llamar a
/// `unsubscribe` (p. ej. en el cleanup de un effect).
pub struct Subscription<T> {
    id: u64,
    subscribers: Weak<Subscribers<T>>,
}

impl<T> Subscription<T> {
    pub fn unsubscribe(self) {
        if let Some(subscribers) = self.subscribers.upgrade() {
            subscribers.borrow_mut().retain(|(id, _)| *id != self.id);
        }
    }
}

impl<T: Clone> ReactiveState<T> {
    pub fn new(value: T) -> Self {
        Self {
            value: Rc::new(RefCell::new(value)),
            subscribers: Rc::new(RefCell::new(Vec::new())),
            next_id: Rc::new(Cell::new(0)),
        }
    }

    pub fn get(&self) -> T {
        self.value.borrow().clone()
    }

    /// Establecer nuevo valor y notificar subscribers
    pub fn set(&self, new_value: T) {
        *self.value.borrow_mut() = new_value;
        self.notify();
    }

    pub fn update<F>(&self, updater: F)
    where
        F: FnOnce(&mut T),
    {
        updater(&mut *self.value.borrow_mut());
        self.notify();
    }

    pub fn subscribe<F>(&self, callback: F) -> Subscription<T>
    where
        F: Fn(&T) + 'static,
    {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.subscribers.borrow_mut().push((id, Rc::new(callback)));
        Subscription {
            id,
            subscribers: Rc::downgrade(&self.subscribers),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }

    fn notify(&self) {
        // Copia de la lista: un callback puede suscribir a otros
        let callbacks: Vec<Callback<T>> = self
            .subscribers
            .borrow()
            .iter()
            .map(|(_, callback)| callback.clone())
            .collect();
        let value = self.get();
        for callback in callbacks {
            callback(&value);
        }
    }
}

impl<T> Clone for ReactiveState<T> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            subscribers: self.subscribers.clone(),
            next_id: self.next_id.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_notifies_every_subscriber() {
        let state = ReactiveState::new(false);
        let seen = Rc::new(Cell::new(0));

        for _ in 0..2 {
            let seen = seen.clone();
            state.subscribe(move |connected: &bool| {
                if *connected {
                    seen.set(seen.get() + 1);
                }
            });
        }

        state.clone().set(true);
        assert_eq!(seen.get(), 2);
        assert!(state.get());
        assert_eq!(state.subscriber_count(), 2);
    }

    #[test]
    fn unsubscribed_callbacks_stop_firing() {
        let state = ReactiveState::new(0u32);
        let seen = Rc::new(Cell::new(0));
        let kept_seen = Rc::new(Cell::new(0));

        let seen_in = seen.clone();
        let subscription = state.subscribe(move |_| seen_in.set(seen_in.get() + 1));
        let kept_in = kept_seen.clone();
        let _kept = state.clone().subscribe(move |_| kept_in.set(kept_in.get() + 1));

        state.set(1);
        subscription.unsubscribe();
        state.set(2);

        assert_eq!(seen.get(), 1);
        assert_eq!(kept_seen.get(), 2);
        assert_eq!(state.subscriber_count(), 1);
    }

    #[test]
    fn callbacks_may_read_the_value() {
        let state = ReactiveState::new(1u32);
        let reader = state.clone();
        let last = Rc::new(Cell::new(0));
        let last_in = last.clone();
        state.subscribe(move |_| last_in.set(reader.get()));
        state.update(|v| *v += 41);
        assert_eq!(last.get(), 42);
    }
}
