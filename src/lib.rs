//! Currency conversion backed by a daily rate cache.
//!
//! [`ConversionService`] answers "convert this amount from that currency" from today's cached rate
//! table, fetching and caching a fresh table from the [`RateProvider`] on a miss.

pub mod cache_key;
pub mod config;
pub mod error;
pub mod http;
pub mod provider;
pub mod rates;
pub mod service;
pub mod store;

pub use cache_key::{Clock, FixedClock, SystemClock, cache_key};
pub use config::Config;
pub use error::{ConfigError, ConvertError, ProviderError, RenderError, StoreError};
pub use provider::{FixerProvider, RateProvider};
pub use rates::{Conversion, RateTable};
pub use service::ConversionService;
pub use store::{PgRateStore, RateStore};
