#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use reqwest::StatusCode;
use xrate::{
    Clock, ConversionService, ProviderError, RateProvider, RateStore, RateTable, StoreError,
    cache_key,
};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// In-memory rate cache that counts calls and can be told to fail.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<Vec<u8>, Vec<u8>>>,
    gets: AtomicUsize,
    sets: AtomicUsize,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn with_entry(key: Vec<u8>, payload: &str) -> Self {
        let store = Self::default();
        store.entries.lock().unwrap().insert(key, payload.as_bytes().to_vec());
        store
    }

    pub fn fail_reads(&self) {
        self.fail_reads.store(true, Ordering::SeqCst);
    }

    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn sets(&self) -> usize {
        self.sets.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn payload(&self, key: &[u8]) -> Option<Vec<u8>> {
        self.entries.lock().unwrap().get(key).cloned()
    }
}

#[async_trait]
impl RateStore for MemoryStore {
    async fn get(&self, key: &[u8]) -> Result<RateTable, StoreError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Database(sqlx::Error::PoolClosed));
        }
        let payload = self.payload(key).ok_or(StoreError::NotFound)?;
        Ok(RateTable::from_slice(&payload)?)
    }

    async fn set(&self, key: &[u8], payload: &[u8]) -> Result<(), StoreError> {
        self.sets.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        self.entries.lock().unwrap().entry(key.to_vec()).or_insert_with(|| payload.to_vec());
        Ok(())
    }
}

/// Provider answering from canned payloads. Unknown bases get a 404.
#[derive(Default)]
pub struct StubProvider {
    payloads: HashMap<String, String>,
    calls: AtomicUsize,
}

impl StubProvider {
    pub fn with_payload(base: &str, payload: &str) -> Self {
        let mut provider = Self::default();
        provider.payloads.insert(base.to_string(), payload.to_string());
        provider
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RateProvider for StubProvider {
    async fn fetch(&self, base: &str) -> Result<Vec<u8>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.payloads
            .get(base)
            .map(|p| p.as_bytes().to_vec())
            .ok_or(ProviderError::Status(StatusCode::NOT_FOUND))
    }
}

/// A clock that can be moved forward between requests.
pub struct SteppingClock(Mutex<NaiveDate>);

impl SteppingClock {
    pub fn new(date: NaiveDate) -> Self {
        Self(Mutex::new(date))
    }

    pub fn next_day(&self) {
        let mut today = self.0.lock().unwrap();
        *today = today.checked_add_days(Days::new(1)).unwrap();
    }
}

impl Clock for SteppingClock {
    fn today(&self) -> NaiveDate {
        *self.0.lock().unwrap()
    }
}

pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub provider: Arc<StubProvider>,
    pub clock: Arc<SteppingClock>,
    pub service: ConversionService,
}

impl Harness {
    pub fn new(store: MemoryStore, provider: StubProvider, today: NaiveDate) -> Self {
        let store = Arc::new(store);
        let provider = Arc::new(provider);
        let clock = Arc::new(SteppingClock::new(today));
        let service = ConversionService::new(store.clone(), provider.clone(), clock.clone());
        Self { store, provider, clock, service }
    }

    /// A harness whose cache already holds `payload` for `currency` on `today`.
    pub fn cached(today: NaiveDate, currency: &str, payload: &str) -> Self {
        let store = MemoryStore::with_entry(cache_key(today, currency), payload);
        Self::new(store, StubProvider::default(), today)
    }
}
