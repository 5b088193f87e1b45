//! # Action/Endpoint Catalogue
//!
//! Domain-grouped convenience calls. Every function picks exactly one
//! primitive of [`BackendAdapter`], supplies a literal action name or
//! endpoint path, forwards the caller's parameters, and returns whatever the
//! primitive returns.
//!
//! Several domains are reachable through more than one backend style
//! (watchlist, portfolio and news exist in all three). All of them are kept;
//! none is treated as the authoritative one.

use super::adapter::BackendAdapter;

mod analytics;
mod health;
mod market;
mod news;
mod payments;
mod portfolio;
mod stocks;
mod support;
mod watchlist;

pub use analytics::AnalyticsApi;
pub use health::HealthApi;
pub use market::MarketApi;
pub use news::{NewsApi, DEFAULT_NEWS_LIMIT};
pub use payments::PaymentsApi;
pub use portfolio::PortfolioApi;
pub use stocks::StocksApi;
pub use support::SupportApi;
pub use watchlist::WatchlistApi;

impl BackendAdapter {
    pub fn stocks(&self) -> StocksApi<'_> {
        StocksApi::new(self)
    }

    pub fn market(&self) -> MarketApi<'_> {
        MarketApi::new(self)
    }

    pub fn watchlist(&self) -> WatchlistApi<'_> {
        WatchlistApi::new(self)
    }

    pub fn portfolio(&self) -> PortfolioApi<'_> {
        PortfolioApi::new(self)
    }

    pub fn news(&self) -> NewsApi<'_> {
        NewsApi::new(self)
    }

    pub fn payments(&self) -> PaymentsApi<'_> {
        PaymentsApi::new(self)
    }

    pub fn support(&self) -> SupportApi<'_> {
        SupportApi::new(self)
    }

    pub fn analytics(&self) -> AnalyticsApi<'_> {
        AnalyticsApi::new(self)
    }

    pub fn health(&self) -> HealthApi<'_> {
        HealthApi::new(self)
    }
}
