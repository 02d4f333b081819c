//! Keyed request cache with in-flight de-duplication.
//!
//! A [`CacheKey`] is only `Ready` once every input it depends on (endpoint and,
//! for admin reads, the session token) is known. Reads against an
//! `Unresolved` key never reach the fetcher.

use std::future::Future;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use dashmap::DashMap;
use futures::future::{BoxFuture, FutureExt, Shared};

use crate::error::ClientError;

pub type SharedError = Arc<ClientError>;

type InFlight<T> = Shared<BoxFuture<'static, Result<T, SharedError>>>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Unresolved,
    Ready {
        endpoint: String,
        credential: Option<String>,
    },
}

impl CacheKey {
    /// Ready only when both the endpoint and a token are present.
    pub fn authorized(endpoint: Option<&str>, token: Option<&str>) -> Self {
        match (present(endpoint), present(token)) {
            (Some(endpoint), Some(token)) => Self::Ready {
                endpoint: endpoint.to_string(),
                credential: Some(token.to_string()),
            },
            _ => Self::Unresolved,
        }
    }

    pub fn public(endpoint: Option<&str>) -> Self {
        match present(endpoint) {
            Some(endpoint) => Self::Ready {
                endpoint: endpoint.to_string(),
                credential: None,
            },
            None => Self::Unresolved,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready { .. })
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.is_empty())
}

/// Observable state of one key.
#[derive(Debug, Clone)]
pub enum CacheState<T> {
    NoKey,
    Loading,
    Ready(T),
    /// Stale data stays visible while a refetch runs.
    Revalidating(T),
    Error(SharedError),
}

struct Entry<T> {
    data: Option<T>,
    error: Option<SharedError>,
    in_flight: Option<InFlight<T>>,
}

impl<T> Default for Entry<T> {
    fn default() -> Self {
        Self {
            data: None,
            error: None,
            in_flight: None,
        }
    }
}

pub struct RequestCache<T> {
    entries: DashMap<CacheKey, Entry<T>>,
}

impl<T> Default for RequestCache<T> {
    fn default() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }
}

impl<T> RequestCache<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, key: &CacheKey) -> CacheState<T> {
        if !key.is_ready() {
            return CacheState::NoKey;
        }
        let Some(entry) = self.entries.get(key) else {
            return CacheState::Loading;
        };

        match (&entry.in_flight, &entry.data, &entry.error) {
            (Some(_), Some(data), _) => CacheState::Revalidating(data.clone()),
            (Some(_), None, _) => CacheState::Loading,
            (None, _, Some(error)) => CacheState::Error(error.clone()),
            (None, Some(data), None) => CacheState::Ready(data.clone()),
            (None, None, None) => CacheState::Loading,
        }
    }

    /// Cached data for a key, if any.
    pub fn get(&self, key: &CacheKey) -> Option<T> {
        self.entries.get(key).and_then(|entry| entry.data.clone())
    }

    /// Returns cached data, or fetches once. Concurrent reads of the same key share one fetch.
    pub async fn read<F, Fut>(&self, key: &CacheKey, fetcher: F) -> Result<Option<T>, SharedError>
    where
        F: FnOnce(&str, Option<&str>) -> Fut,
        Fut: Future<Output = Result<T, ClientError>> + Send + 'static,
    {
        let CacheKey::Ready {
            endpoint,
            credential,
        } = key
        else {
            return Ok(None);
        };

        let flight = {
            let mut entry = self.entries.entry(key.clone()).or_default();
            if let Some(data) = entry.data.as_ref() {
                return Ok(Some(data.clone()));
            }
            join_or_start(&mut entry, endpoint, credential.as_deref(), fetcher)
        };

        self.settle(key, flight).await.map(Some)
    }

    /// Refetches even when data is cached, keeping the stale value visible meanwhile.
    pub async fn revalidate<F, Fut>(
        &self,
        key: &CacheKey,
        fetcher: F,
    ) -> Result<Option<T>, SharedError>
    where
        F: FnOnce(&str, Option<&str>) -> Fut,
        Fut: Future<Output = Result<T, ClientError>> + Send + 'static,
    {
        let CacheKey::Ready {
            endpoint,
            credential,
        } = key
        else {
            return Ok(None);
        };

        let flight = {
            let mut entry = self.entries.entry(key.clone()).or_default();
            join_or_start(&mut entry, endpoint, credential.as_deref(), fetcher)
        };

        self.settle(key, flight).await.map(Some)
    }

    pub fn invalidate(&self, key: &CacheKey) {
        self.entries.remove(key);
    }

    async fn settle(&self, key: &CacheKey, flight: InFlight<T>) -> Result<T, SharedError> {
        let result = flight.clone().await;

        let Some(mut entry) = self.entries.get_mut(key) else {
            return result;
        };
        // Only the flight that is still registered may write back.
        let current = entry
            .in_flight
            .as_ref()
            .is_some_and(|registered| registered.ptr_eq(&flight));
        if current {
            entry.in_flight = None;
            match &result {
                Ok(data) => {
                    entry.data = Some(data.clone());
                    entry.error = None;
                }
                Err(error) => entry.error = Some(error.clone()),
            }
        }
        drop(entry);

        result
    }
}

fn join_or_start<T, F, Fut>(
    entry: &mut Entry<T>,
    endpoint: &str,
    credential: Option<&str>,
    fetcher: F,
) -> InFlight<T>
where
    T: Clone + Send + Sync + 'static,
    F: FnOnce(&str, Option<&str>) -> Fut,
    Fut: Future<Output = Result<T, ClientError>> + Send + 'static,
{
    if let Some(flight) = entry.in_flight.as_ref() {
        return flight.clone();
    }

    let flight = fetcher(endpoint, credential)
        .map(|result| result.map_err(Arc::new))
        .boxed()
        .shared();
    entry.in_flight = Some(flight.clone());
    flight
}

/// A write bound to a key. Results are not merged into any [`RequestCache`].
pub struct Mutation<A, R> {
    key: CacheKey,
    mutating: AtomicBool,
    last_error: Mutex<Option<String>>,
    _marker: PhantomData<fn(A) -> R>,
}

impl<A, R> Mutation<A, R> {
    pub fn new(key: CacheKey) -> Self {
        Self {
            key,
            mutating: AtomicBool::new(false),
            last_error: Mutex::new(None),
            _marker: PhantomData,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.key.is_ready()
    }

    pub fn is_mutating(&self) -> bool {
        self.mutating.load(Ordering::SeqCst)
    }

    pub fn last_error(&self) -> Option<String> {
        self.last_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub async fn trigger<F, Fut>(&self, arg: A, mutator: F) -> Result<R, ClientError>
    where
        F: FnOnce(String, Option<String>, A) -> Fut,
        Fut: Future<Output = Result<R, ClientError>>,
    {
        let CacheKey::Ready {
            endpoint,
            credential,
        } = &self.key
        else {
            return Err(ClientError::NotReady);
        };

        self.mutating.store(true, Ordering::SeqCst);
        let result = mutator(endpoint.clone(), credential.clone(), arg).await;
        self.mutating.store(false, Ordering::SeqCst);

        *self
            .last_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = result.as_ref().err().map(ToString::to_string);
        result
    }
}
