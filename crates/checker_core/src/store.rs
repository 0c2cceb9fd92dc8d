//! Observable container around [`AppState`].
//!
//! Callers never touch the state directly: they [`Store::dispatch`] messages
//! into a FIFO queue and call [`Store::process`], which runs each message
//! through [`update`] in order, notifies subscribers after every message that
//! changed the state, and hands back the effects to execute.

use std::collections::VecDeque;

use crate::{update, AppState, AppViewModel, Effect, Msg};

pub type Subscriber = Box<dyn FnMut(&AppViewModel) + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub struct Store {
    state: AppState,
    queue: VecDeque<Msg>,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
}

impl Default for Store {
    fn default() -> Self {
        Self::new(AppState::default())
    }
}

impl Store {
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            queue: VecDeque::new(),
            subscribers: Vec::new(),
            next_subscription: 0,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn view(&self) -> AppViewModel {
        self.state.view()
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn dispatch(&mut self, msg: Msg) {
        self.queue.push_back(msg);
    }

    pub fn subscribe(&mut self, subscriber: Subscriber) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, subscriber));
        id
    }

    /// Returns false if the id was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(existing, _)| *existing != id);
        self.subscribers.len() != before
    }

    /// Drains the queue and returns the effects of every processed message,
    /// in order.
    pub fn process(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        while let Some(msg) = self.queue.pop_front() {
            let state = std::mem::take(&mut self.state);
            let (mut state, produced) = update(state, msg);
            let changed = state.consume_dirty();
            self.state = state;
            effects.extend(produced);
            if changed {
                self.notify();
            }
        }
        effects
    }

    /// Convenience for a single message: dispatch, then process.
    pub fn send(&mut self, msg: Msg) -> Vec<Effect> {
        self.dispatch(msg);
        self.process()
    }

    fn notify(&mut self) {
        let view = self.state.view();
        for (_, subscriber) in &mut self.subscribers {
            subscriber(&view);
        }
    }
}
