//! Integration test support for the storefront account actions.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p storefront-account-integration-tests
//! ```
//!
//! No backend is needed. [`Harness`] wires [`AccountActions`] to recording
//! collaborators that append to one shared [`EventLog`], so a test can assert
//! on the relative order of requests, token writes, cache writes, store
//! dispatches and cart/wishlist resets.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use storefront_account::cache::{LocalCache, MokaLocalCache};
use storefront_account::reset::InitialStateReset;
use storefront_account::token::{InMemoryTokenStorage, TokenStorage};
use storefront_account::transport::{GraphQLError, Operation, Transport, TransportError};
use storefront_account::{AccountActions, Dispatch, StoreUpdate};

/// Something a collaborator observed.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// An operation reached the transport.
    Request {
        /// GraphQL operation name.
        operation: &'static str,
        /// Request variables.
        variables: Value,
    },
    /// An update reached the store.
    Dispatch(StoreUpdate),
    /// A token was stored.
    TokenSet(String),
    /// The token was cleared.
    TokenCleared,
    /// A value was written to the local cache.
    CacheSet {
        /// Cache key.
        key: String,
        /// Stored value.
        value: Value,
        /// Entry time-to-live.
        ttl: Duration,
    },
    /// A cart or wishlist reset was triggered.
    Reset(&'static str),
}

/// Shared, ordered record of [`Event`]s.
#[derive(Debug, Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<Event>>>);

impl EventLog {
    fn push(&self, event: Event) {
        self.0.lock().expect("event log poisoned").push(event);
    }

    /// Everything observed so far, in order.
    #[must_use]
    pub fn events(&self) -> Vec<Event> {
        self.0.lock().expect("event log poisoned").clone()
    }

    /// Store updates, in order.
    #[must_use]
    pub fn dispatches(&self) -> Vec<StoreUpdate> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Dispatch(update) => Some(update),
                _ => None,
            })
            .collect()
    }

    /// Operation names sent to the transport, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<&'static str> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Request { operation, .. } => Some(operation),
                _ => None,
            })
            .collect()
    }

    /// Cache writes, in order.
    #[must_use]
    pub fn cache_writes(&self) -> Vec<Event> {
        self.events()
            .into_iter()
            .filter(|e| matches!(e, Event::CacheSet { .. }))
            .collect()
    }

    /// Token writes and clears, in order.
    #[must_use]
    pub fn token_events(&self) -> Vec<Event> {
        self.events()
            .into_iter()
            .filter(|e| matches!(e, Event::TokenSet(_) | Event::TokenCleared))
            .collect()
    }

    /// How many times the named reset was triggered.
    #[must_use]
    pub fn resets(&self, name: &str) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, Event::Reset(n) if *n == name))
            .count()
    }

    /// Position of the first event matching `predicate`.
    #[must_use]
    pub fn position(&self, predicate: impl Fn(&Event) -> bool) -> Option<usize> {
        self.events().iter().position(predicate)
    }
}

/// [`Transport`] answering from per-operation scripts.
///
/// Unscripted operations fail with HTTP 500.
pub struct ScriptedTransport {
    log: EventLog,
    responses: Mutex<HashMap<&'static str, VecDeque<Result<Value, TransportError>>>>,
}

impl ScriptedTransport {
    fn new(log: EventLog) -> Self {
        Self {
            log,
            responses: Mutex::new(HashMap::new()),
        }
    }

    fn script(&self, operation: &'static str, response: Result<Value, TransportError>) {
        self.responses
            .lock()
            .expect("transport script poisoned")
            .entry(operation)
            .or_default()
            .push_back(response);
    }

    /// Answer the next `operation` with `data`.
    pub fn respond(&self, operation: &'static str, data: Value) {
        self.script(operation, Ok(data));
    }

    /// Fail the next `operation` with a GraphQL error list.
    pub fn fail(&self, operation: &'static str, messages: &[&str]) {
        self.script(
            operation,
            Err(TransportError::GraphQL(
                messages
                    .iter()
                    .map(|m| GraphQLError::from_message(*m))
                    .collect(),
            )),
        );
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, operation: &Operation) -> Result<Value, TransportError> {
        self.log.push(Event::Request {
            operation: operation.operation_name,
            variables: operation.variables.clone(),
        });

        // Yield so anything dispatched "before the network resolves" really is.
        tokio::task::yield_now().await;

        self.responses
            .lock()
            .expect("transport script poisoned")
            .get_mut(operation.operation_name)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| {
                Err(TransportError::Status {
                    status: 500,
                    body: format!("no scripted response for {}", operation.operation_name),
                })
            })
    }
}

/// [`Dispatch`] that records every update.
#[derive(Debug, Clone)]
pub struct RecordingDispatch {
    log: EventLog,
}

impl Dispatch for RecordingDispatch {
    fn dispatch(&self, update: StoreUpdate) {
        self.log.push(Event::Dispatch(update));
    }
}

/// [`TokenStorage`] that records writes and clears.
pub struct RecordingTokens {
    log: EventLog,
    inner: InMemoryTokenStorage,
}

impl TokenStorage for RecordingTokens {
    fn set(&self, token: SecretString) {
        self.log
            .push(Event::TokenSet(token.expose_secret().to_string()));
        self.inner.set(token);
    }

    fn get(&self) -> Option<SecretString> {
        self.inner.get()
    }

    fn clear(&self) {
        self.log.push(Event::TokenCleared);
        self.inner.clear();
    }
}

/// [`LocalCache`] that records writes in front of a real `moka` cache.
pub struct RecordingCache {
    log: EventLog,
    inner: MokaLocalCache,
}

impl RecordingCache {
    /// Seed the cache without recording a write.
    pub async fn seed(&self, key: &str, value: Value) {
        self.inner
            .set(value, key, storefront_account::CUSTOMER_CACHE_TTL)
            .await;
    }
}

#[async_trait]
impl LocalCache for RecordingCache {
    async fn get(&self, key: &str) -> Option<Value> {
        self.inner.get(key).await
    }

    async fn set(&self, value: Value, key: &str, ttl: Duration) {
        self.log.push(Event::CacheSet {
            key: key.to_string(),
            value: value.clone(),
            ttl,
        });
        self.inner.set(value, key, ttl).await;
    }
}

/// [`InitialStateReset`] that records each trigger under a name.
pub struct RecordingReset {
    log: EventLog,
    name: &'static str,
}

#[async_trait]
impl InitialStateReset for RecordingReset {
    async fn reset_initial_state(&self, _dispatch: &dyn Dispatch) {
        self.log.push(Event::Reset(self.name));
    }
}

/// [`AccountActions`] wired to recording collaborators.
pub struct Harness {
    /// Shared event log.
    pub log: EventLog,
    /// Scriptable transport.
    pub transport: Arc<ScriptedTransport>,
    /// Token storage.
    pub tokens: Arc<RecordingTokens>,
    /// Local cache.
    pub cache: Arc<RecordingCache>,
    /// Dispatch target to pass to actions.
    pub dispatch: RecordingDispatch,
    /// Actions under test.
    pub actions: AccountActions,
}

impl Harness {
    /// Build a harness with empty scripts, no token and an empty cache.
    #[must_use]
    pub fn new() -> Self {
        init_tracing();

        let log = EventLog::default();
        let transport = Arc::new(ScriptedTransport::new(log.clone()));
        let tokens = Arc::new(RecordingTokens {
            log: log.clone(),
            inner: InMemoryTokenStorage::default(),
        });
        let cache = Arc::new(RecordingCache {
            log: log.clone(),
            inner: MokaLocalCache::new(16),
        });
        let cart = Arc::new(RecordingReset {
            log: log.clone(),
            name: "cart",
        });
        let wishlist = Arc::new(RecordingReset {
            log: log.clone(),
            name: "wishlist",
        });

        let actions = AccountActions::new(
            transport.clone(),
            tokens.clone(),
            cache.clone(),
            cart,
            wishlist,
        );

        Self {
            dispatch: RecordingDispatch { log: log.clone() },
            log,
            transport,
            tokens,
            cache,
            actions,
        }
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}

/// Install a test-writer subscriber once; honours `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
