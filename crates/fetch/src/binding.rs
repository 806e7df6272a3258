//! Per-endpoint fetch state with last-request-wins semantics.
//!
//! A binding owns one published [`FetchState`]. Each `fetch` takes a fresh
//! generation number; only the newest generation may publish, so a slow
//! early response can never overwrite a later one. Tearing a binding down
//! wakes every pending fetch and keeps it from publishing.

use mastery_core::{
    EngineConfig, FetchError, FetchState, IntoProgressSource, ProgressView, RequestId, SourceId,
};
use std::ops::Deref;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Notify};
use tracing::{debug, info, warn};

use crate::endpoint::Endpoint;
use crate::transport::{parse_json_response, HttpRequest, Method, Transport};

/// Lifetime bookkeeping shared by a binding and its teardown guards.
#[derive(Debug, Default)]
struct Lifecycle {
    generation: AtomicU64,
    abandoned: AtomicBool,
    cancel: Notify,
}

impl Lifecycle {
    fn is_abandoned(&self) -> bool {
        self.abandoned.load(Ordering::SeqCst)
    }

    fn is_current(&self, generation: u64) -> bool {
        !self.is_abandoned() && self.generation.load(Ordering::SeqCst) == generation
    }

    fn teardown(&self) {
        if self.abandoned.swap(true, Ordering::SeqCst) {
            return;
        }
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.cancel.notify_waiters();
    }
}

struct Shared<E: Endpoint> {
    endpoint: E,
    transport: Arc<dyn Transport>,
    url: String,
    timeout: Duration,
    state: watch::Sender<FetchState<E::Payload>>,
    lifecycle: Arc<Lifecycle>,
}

/// Remote data binding for one endpoint.
///
/// The binding owns its lifecycle: dropping it tears it down, so fetches
/// still running on a [`BindingHandle`] resolve without publishing.
pub struct AsyncDataBinding<E: Endpoint> {
    handle: BindingHandle<E>,
}

impl<E: Endpoint> AsyncDataBinding<E> {
    /// Create an idle binding.
    pub fn new(endpoint: E, transport: Arc<dyn Transport>, config: &EngineConfig) -> Self {
        let (state, _) = watch::channel(FetchState::Idle);
        Self {
            handle: BindingHandle {
                shared: Arc::new(Shared {
                    url: endpoint.url(config),
                    endpoint,
                    transport,
                    timeout: config.timeout(),
                    state,
                    lifecycle: Arc::new(Lifecycle::default()),
                }),
            },
        }
    }

    /// Cheap handle sharing this binding's state, for use in spawned tasks.
    pub fn handle(&self) -> BindingHandle<E> {
        self.handle.clone()
    }
}

impl<E: Endpoint> Deref for AsyncDataBinding<E> {
    type Target = BindingHandle<E>;

    fn deref(&self) -> &BindingHandle<E> {
        &self.handle
    }
}

impl<E: Endpoint> Drop for AsyncDataBinding<E> {
    fn drop(&mut self) {
        self.handle.teardown();
    }
}

/// Non-owning access to a binding. Dropping a handle does not tear down.
pub struct BindingHandle<E: Endpoint> {
    shared: Arc<Shared<E>>,
}

impl<E: Endpoint> Clone for BindingHandle<E> {
    fn clone(&self) -> Self {
        Self { shared: Arc::clone(&self.shared) }
    }
}

impl<E: Endpoint> BindingHandle<E> {
    /// Issue a request and return how it resolved.
    ///
    /// The resolution is published only if no newer fetch was issued in the
    /// meantime and the binding was not torn down.
    pub async fn fetch(&self, request: Option<&E::Request>) -> FetchState<E::Payload> {
        let shared = &self.shared;
        let lifecycle = &shared.lifecycle;
        let name = shared.endpoint.name();

        if lifecycle.is_abandoned() {
            debug!("Fetch on torn down binding '{}' ignored", name);
            return FetchState::Failed(FetchError::network("binding torn down"));
        }

        let http = match self.build_request(request) {
            Ok(http) => http,
            Err(e) => return FetchState::Failed(e),
        };

        let mut generation = 0;
        shared.state.send_modify(|state| {
            generation = lifecycle.generation.fetch_add(1, Ordering::SeqCst) + 1;
            *state = FetchState::Loading;
        });
        let request_id = RequestId::new();
        debug!("[{}] {} generation {} issued", request_id, name, generation);

        let cancelled = lifecycle.cancel.notified();
        tokio::pin!(cancelled);
        cancelled.as_mut().enable();
        if lifecycle.is_abandoned() {
            return FetchState::Failed(FetchError::network("request abandoned"));
        }

        let outcome = tokio::select! {
            _ = &mut cancelled => None,
            result = tokio::time::timeout(shared.timeout, self.execute(&http)) => Some(match result {
                Ok(result) => result,
                Err(_) => Err(FetchError::network(format!(
                    "no response within {} ms",
                    shared.timeout.as_millis()
                ))),
            }),
        };

        let resolved = match outcome {
            Some(Ok(payload)) => FetchState::Ready(payload),
            Some(Err(err)) => {
                warn!("[{}] {} failed: {}", request_id, name, err);
                FetchState::Failed(err)
            }
            None => {
                debug!("[{}] {} abandoned on teardown", request_id, name);
                return FetchState::Failed(FetchError::network("request abandoned"));
            }
        };

        let published = shared.state.send_if_modified(|state| {
            if lifecycle.is_current(generation) {
                *state = resolved.clone();
                true
            } else {
                false
            }
        });
        if published {
            debug!("[{}] {} generation {} -> {}", request_id, name, generation, resolved.as_str());
        } else {
            debug!("[{}] {} generation {} is stale, result discarded", request_id, name, generation);
        }

        resolved
    }

    fn build_request(&self, request: Option<&E::Request>) -> Result<HttpRequest, FetchError> {
        let method = self.shared.endpoint.method();
        let body = match (method, request) {
            (Method::Post, Some(request)) => Some(
                serde_json::to_value(request)
                    .map_err(|e| FetchError::validation(format!("failed to encode request: {}", e)))?,
            ),
            _ => None,
        };
        Ok(HttpRequest { method, url: self.shared.url.clone(), body })
    }

    async fn execute(&self, request: &HttpRequest) -> Result<E::Payload, FetchError> {
        let raw = self.shared.transport.send(request).await?;
        let body = parse_json_response(&raw)?;
        self.shared.endpoint.decode(&body)
    }

    /// Current published state.
    pub fn state(&self) -> FetchState<E::Payload> {
        self.shared.state.borrow().clone()
    }

    /// Receive state updates.
    pub fn subscribe(&self) -> watch::Receiver<FetchState<E::Payload>> {
        self.shared.state.subscribe()
    }

    /// Abandon all in-flight fetches. Later fetches return immediately.
    pub fn teardown(&self) {
        if !self.shared.lifecycle.is_abandoned() {
            info!("Binding '{}' torn down", self.shared.endpoint.name());
        }
        self.shared.lifecycle.teardown();
    }

    /// Whether the binding was torn down.
    pub fn is_torn_down(&self) -> bool {
        self.shared.lifecycle.is_abandoned()
    }

    /// Guard that tears the binding down when dropped.
    pub fn guard(&self) -> TeardownGuard {
        TeardownGuard { lifecycle: Arc::clone(&self.shared.lifecycle) }
    }

    /// Endpoint name.
    pub fn name(&self) -> &'static str {
        self.shared.endpoint.name()
    }
}

impl<E> BindingHandle<E>
where
    E: Endpoint,
    E::Payload: IntoProgressSource,
{
    /// Render view of the current state for widget `id`.
    pub fn progress_view(&self, id: &SourceId) -> ProgressView {
        let state = self.shared.state.borrow();
        mastery_progress::progress_view(id, &*state)
    }
}

/// Tears a binding down on drop. Hold one per mounted screen.
#[derive(Debug)]
pub struct TeardownGuard {
    lifecycle: Arc<Lifecycle>,
}

impl Drop for TeardownGuard {
    fn drop(&mut self) {
        self.lifecycle.teardown();
    }
}
