//! Core traits.

mod indicator;
mod provider;

pub use indicator::Indicator;
pub use provider::PriceProvider;
