mod models;
mod registry;
mod valuation;

pub use models::{PricePoint, ValuationGap};
pub use registry::{CommodityRegistry, MemoryCommodityRegistry};
pub use valuation::{Valuation, Valuator};
