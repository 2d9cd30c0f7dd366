//! Deterministic fakes shared by the unit tests.

use std::{
    cell::{Cell, RefCell},
    rc::Rc,
    time::Duration,
};

use async_trait::async_trait;
use futures::channel::oneshot;

use crate::{FailurePolicy, FetchError, Transport, Upstream, UpstreamOptions};

pub(crate) const TWO_POKEMON: &str = r#"{"results":[
    {"name":"bulbasaur","url":"u1"},
    {"name":"ivysaur","url":"u2"}
]}"#;

/// Canned response, a call counter, and an optional gate holding the
/// response back until released.
pub(crate) struct MockTransport {
    response: Result<String, FetchError>,
    calls: Rc<Cell<usize>>,
    urls: Rc<RefCell<Vec<String>>>,
    gate: RefCell<Option<oneshot::Receiver<()>>>,
}

impl MockTransport {
    pub(crate) fn ok(body: &str) -> Self {
        Self::respond(Ok(body.to_string()))
    }

    pub(crate) fn failing(error: FetchError) -> Self {
        Self::respond(Err(error))
    }

    fn respond(response: Result<String, FetchError>) -> Self {
        Self {
            response,
            calls: Rc::new(Cell::new(0)),
            urls: Rc::new(RefCell::new(Vec::new())),
            gate: RefCell::new(None),
        }
    }

    /// The first request waits until the returned sender fires or is dropped.
    pub(crate) fn gated(mut self) -> (Self, oneshot::Sender<()>) {
        let (sender, receiver) = oneshot::channel();
        self.gate = RefCell::new(Some(receiver));
        (self, sender)
    }

    pub(crate) fn calls(&self) -> Rc<Cell<usize>> {
        self.calls.clone()
    }

    pub(crate) fn urls(&self) -> Rc<RefCell<Vec<String>>> {
        self.urls.clone()
    }
}

#[async_trait(?Send)]
impl Transport for MockTransport {
    async fn get(&self, url: &str) -> Result<String, FetchError> {
        self.calls.set(self.calls.get() + 1);
        self.urls.borrow_mut().push(url.to_string());
        let gate = self.gate.borrow_mut().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        self.response.clone()
    }
}

/// An upstream with no artificial delay.
pub(crate) fn upstream(transport: MockTransport, failure: FailurePolicy) -> Upstream {
    Upstream::new(
        transport,
        failure,
        UpstreamOptions {
            delay: Duration::ZERO,
            ..UpstreamOptions::default()
        },
    )
}
