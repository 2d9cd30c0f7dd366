use futures_channel::oneshot;
use leptos::logging;
use std::{future::Future, pin::Pin, rc::Rc};

pub(crate) type Fetcher<K, V, E> = Rc<dyn Fn(K) -> Pin<Box<dyn Future<Output = Result<V, E>>>>>;

pub(crate) fn boxed_fetcher<K, V, E, Fu>(fetcher: impl Fn(K) -> Fu + 'static) -> Fetcher<K, V, E>
where
    Fu: Future<Output = Result<V, E>> + 'static,
{
    Rc::new(move |key| Box::pin(fetcher(key)) as Pin<Box<dyn Future<Output = Result<V, E>>>>)
}

/// The error of the final attempt, and how many attempts were made.
#[derive(Debug)]
pub(crate) struct RetriesExhausted<E> {
    pub(crate) error: E,
    pub(crate) attempts: u32,
}

/// Runs `fetcher` up to `attempts` times, stopping at the first success.
/// Attempts run back to back.
pub(crate) async fn execute_with_retry<K, V, E>(
    fetcher: &Fetcher<K, V, E>,
    key: &K,
    attempts: u32,
) -> Result<V, RetriesExhausted<E>>
where
    K: crate::QueryKey,
    E: crate::QueryError,
{
    let attempts = attempts.max(1);
    let mut attempt = 1;
    loop {
        match fetcher(key.clone()).await {
            Ok(value) => return Ok(value),
            Err(error) if attempt < attempts => {
                logging::debug_warn!(
                    "Query {:?} failed attempt {}/{}: {}",
                    key,
                    attempt,
                    attempts,
                    error
                );
                attempt += 1;
            }
            Err(error) => {
                return Err(RetriesExhausted {
                    error,
                    attempts: attempt,
                })
            }
        }
    }
}

/// Marker for a fetch that was cancelled before it completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Cancelled;

pub(crate) async fn execute_with_cancellation<V, Fu>(
    fut: Fu,
    cancellation: oneshot::Receiver<()>,
) -> Result<V, Cancelled>
where
    Fu: Future<Output = V> + Unpin,
{
    use futures::future::Either;

    match futures::future::select(fut, cancellation).await {
        Either::Left((result, _)) => Ok(result),
        Either::Right((cancelled, _)) => {
            if cancelled.is_err() {
                logging::debug_warn!("Query cancellation was incorrectly dropped.");
            }
            Err(Cancelled)
        }
    }
}
