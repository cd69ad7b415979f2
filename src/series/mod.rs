mod engine;
mod periods;
mod rollup;
mod sparse;
mod time_series;
mod wedges;

pub use engine::{build, AccountSeries, BalanceSeries, SeriesBuilder};
pub use periods::Granularity;
pub use rollup::{resolve, Resolution, RolledAccount, RollupPass, SeriesKind};
pub use sparse::SparseSeries;
pub use time_series::{time_series, CommoditySeries};
pub use wedges::{wedges, Wedges, DEFAULT_THRESHOLD};
