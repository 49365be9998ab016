//! The conversion service: cache first, provider on miss.
//!
//! Concurrent misses for the same key are not coalesced. Each one fetches from the provider and
//! tries to write the cache; the store keeps whichever write lands first.

use std::sync::Arc;

use log::*;

use crate::{
    cache_key::{Clock, cache_key},
    error::{ConvertError, ProviderError, StoreError},
    provider::RateProvider,
    rates::{Conversion, RateTable, parse_decimal},
    store::RateStore,
};

#[derive(Clone)]
pub struct ConversionService {
    store: Arc<dyn RateStore>,
    provider: Arc<dyn RateProvider>,
    clock: Arc<dyn Clock>,
}

impl ConversionService {
    pub fn new(
        store: Arc<dyn RateStore>,
        provider: Arc<dyn RateProvider>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            provider,
            clock,
        }
    }

    /// Converts `amount` of `currency` into every currency of today's rate table for `currency`.
    ///
    /// The currency is validated before the amount, and neither check touches the cache or the
    /// provider.
    pub async fn convert(&self, amount: &str, currency: &str) -> Result<Conversion, ConvertError> {
        if currency.is_empty() {
            return Err(ConvertError::EmptyCurrency);
        }
        let amount = parse_decimal(amount).ok_or(ConvertError::InvalidAmount)?;
        let table = self.rate_table(currency).await?;
        table.convert(amount, currency)
    }

    async fn rate_table(&self, currency: &str) -> Result<RateTable, ConvertError> {
        let key = cache_key(self.clock.today(), currency);
        match self.store.get(&key).await {
            Ok(table) => {
                debug!("Rate cache hit for {}", String::from_utf8_lossy(&key));
                return Ok(table);
            }
            Err(StoreError::NotFound) => {
                debug!("Rate cache miss for {}", String::from_utf8_lossy(&key))
            }
            Err(e) => warn!("Could not read cached rates for {currency}. Asking the provider. {e}"),
        }
        self.fetch_rates(currency, &key).await.map_err(|e| {
            error!("Could not obtain rates for {currency}. {e}");
            ConvertError::Upstream(e)
        })
    }

    async fn fetch_rates(&self, currency: &str, key: &[u8]) -> Result<RateTable, ProviderError> {
        let payload = self.provider.fetch(currency).await?;
        let table = RateTable::from_slice(&payload).map_err(ProviderError::Decode)?;
        if let Err(e) = self.store.set(key, &payload).await {
            warn!(
                "Could not cache rates for {currency}. Answering from the fresh table anyway. {e}"
            );
        }
        Ok(table)
    }
}
