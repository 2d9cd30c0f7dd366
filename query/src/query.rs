use std::{
    cell::{Cell, RefCell},
    pin::pin,
    rc::Rc,
    time::Duration,
};

use futures_channel::oneshot;
use leptos::logging;
use slotmap::{new_key_type, SlotMap};

use crate::{
    query_executor::{
        execute_with_cancellation, execute_with_retry, Fetcher, RetriesExhausted,
    },
    Instant, QueryData, QueryFailure, QueryOptions, QueryState,
};

new_key_type! {
    pub(crate) struct ListenerKey;
}

type Listener<V, E> = Rc<dyn Fn(&QueryState<V, E>)>;

#[derive(Clone)]
pub(crate) struct Query<K, V, E> {
    pub(crate) key: K,

    // Cancellation
    current_request: Rc<Cell<Option<oneshot::Sender<()>>>>,

    // State
    state: Rc<Cell<QueryState<V, E>>>,

    // Synchronization
    listeners: Rc<RefCell<SlotMap<ListenerKey, Listener<V, E>>>>,
}

impl<K: PartialEq, V, E> PartialEq for Query<K, V, E> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl<K: PartialEq, V, E> Eq for Query<K, V, E> {}

impl<K, V, E> Query<K, V, E>
where
    K: crate::QueryKey + 'static,
    V: crate::QueryValue + 'static,
    E: crate::QueryError + 'static,
{
    pub(crate) fn new(key: K) -> Self {
        Query {
            key,
            current_request: Rc::new(Cell::new(None)),
            state: Rc::new(Cell::new(QueryState::Created)),
            listeners: Rc::new(RefCell::new(SlotMap::with_key())),
        }
    }

    pub(crate) fn set_state(&self, state: QueryState<V, E>) {
        self.state.set(state);

        // Snapshot so listeners may subscribe or unsubscribe while being notified.
        let listeners: Vec<Listener<V, E>> = self
            .listeners
            .try_borrow()
            .expect("set_state borrow")
            .values()
            .cloned()
            .collect();

        if listeners.is_empty() {
            return;
        }

        let state = self.get_state();
        for listener in listeners {
            listener(&state);
        }
    }

    /// If update returns Ok(_) the state will be updated and listeners will be notified.
    /// If update returns Err(_) the state will not be updated and listeners will not be notified.
    /// Err(_) must always contain the previous state.
    pub(crate) fn maybe_map_state(
        &self,
        update_fn: impl FnOnce(QueryState<V, E>) -> Result<QueryState<V, E>, QueryState<V, E>>,
    ) -> bool {
        let current_state = self.state.take();

        match update_fn(current_state) {
            Ok(new_state) => {
                self.set_state(new_state);
                true
            }
            Err(old_state) => {
                self.state.set(old_state);
                false
            }
        }
    }

    /// Marks loaded data as invalid, which will cause it to be refetched on next use.
    pub(crate) fn mark_invalid(&self) -> bool {
        self.maybe_map_state(|state| {
            if let QueryState::Loaded(data) = state {
                Ok(QueryState::Invalid(data))
            } else {
                Err(state)
            }
        })
    }

    pub(crate) fn get_state(&self) -> QueryState<V, E> {
        self.with_state(Clone::clone)
    }

    // Useful to avoid clones.
    pub(crate) fn with_state<T>(&self, func: impl FnOnce(&QueryState<V, E>) -> T) -> T {
        let state = self.state.take();
        let result = func(&state);
        self.state.set(state);
        result
    }

    pub(crate) fn add_listener(&self, listener: impl Fn(&QueryState<V, E>) + 'static) -> ListenerKey {
        self.listeners
            .try_borrow_mut()
            .expect("add_listener borrow_mut")
            .insert(Rc::new(listener))
    }

    pub(crate) fn remove_listener(&self, key: ListenerKey) -> bool {
        self.listeners
            .try_borrow_mut()
            .expect("remove_listener borrow_mut")
            .remove(key)
            .is_some()
    }

    #[cfg(test)]
    pub(crate) fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    pub(crate) fn is_stale(&self, stale_time: Option<Duration>) -> bool {
        let last_update = self.with_state(|state| state.updated_at());

        match (last_update, stale_time) {
            (Some(updated_at), Some(stale_time)) => updated_at.elapsed() >= stale_time,
            _ => false,
        }
    }

    /// Whether a newly mounted reader should start a fetch.
    pub(crate) fn needs_fetch(&self, stale_time: Option<Duration>) -> bool {
        let needs_fetch = self.with_state(|state| match state {
            QueryState::Created | QueryState::Failed(_) | QueryState::Invalid(_) => Some(true),
            QueryState::Loading | QueryState::Fetching(_) => Some(false),
            QueryState::Loaded(_) => None,
        });
        needs_fetch.unwrap_or_else(|| self.is_stale(stale_time))
    }

    /**
     * Execution and Cancellation.
     */

    /// Runs the fetcher unless a fetch for this query is already in flight.
    pub(crate) async fn execute(&self, fetcher: Fetcher<K, V, E>, options: QueryOptions) {
        let Some(cancellation) = self.new_execution() else {
            return;
        };

        let previous = self.get_state();
        match previous.query_data() {
            Some(data) => self.set_state(QueryState::Fetching(data.clone())),
            None => self.set_state(QueryState::Loading),
        }

        let fetch = pin!(execute_with_retry(&fetcher, &self.key, options.attempts()));
        match execute_with_cancellation(fetch, cancellation).await {
            Ok(Ok(data)) => {
                self.set_state(QueryState::Loaded(QueryData::now(data)));
                self.finalize_execution();
            }
            Ok(Err(RetriesExhausted { error, attempts })) => {
                logging::error!("Query {:?} failed after {} attempt(s): {}", self.key, attempts, error);
                self.set_state(QueryState::Failed(QueryFailure {
                    error,
                    attempts,
                    failed_at: Instant::now(),
                }));
                self.finalize_execution();
            }
            Err(_) => {
                logging::log!("Query {:?} was cancelled.", self.key);
                // A newer execution owns the state now.
                if !self.is_executing() {
                    self.set_state(previous);
                }
            }
        }
    }

    // Only one request may be in flight. A cancelled request releases its slot immediately.
    pub(crate) fn new_execution(&self) -> Option<oneshot::Receiver<()>> {
        let current_request = self.current_request.take();
        if current_request.is_none() {
            let (sender, receiver) = oneshot::channel();
            self.current_request.set(Some(sender));
            Some(receiver)
        } else {
            self.current_request.set(current_request);
            None
        }
    }

    pub(crate) fn finalize_execution(&self) {
        self.current_request.set(None);
    }

    pub(crate) fn is_executing(&self) -> bool {
        let current_request = self.current_request.take();
        let executing = current_request.is_some();
        self.current_request.set(current_request);
        executing
    }

    pub(crate) fn cancel(&self) -> bool {
        if let Some(current_request) = self.current_request.take() {
            let cancellation = current_request.send(());
            if cancellation.is_err() {
                logging::error!("Failed to cancel request {:?}", self.key);
            }
            cancellation.is_ok()
        } else {
            false
        }
    }
}
