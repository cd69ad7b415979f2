//! Reducers that turn a build snapshot into presentation-ready reports.
//!
//! Every report reads the immutable build indices only; numbers are rendered
//! as strings so they survive JSON round trips exactly.

mod accounts;
mod commodities;
mod periodic;
mod pie;
mod types;

pub use accounts::{account_report, valued_accounts, ValuedAccount};
pub use commodities::{commodity_list, commodity_report};
pub use periodic::periodic_report;
pub use pie::{pie_report, under_prefix};
pub use types::{
    AccountReport, CommodityOutput, CommodityReport, PeriodOutput, PeriodicReport, PieReport,
    PointOutput, SegmentOutput, SeriesOutput,
};

use crate::config::DisplayConfig;
use crate::models::CommodityRef;
use crate::pricing::Valuator;

/// What every account-based report needs: how to value, into what, and how
/// deep to go.
#[derive(Clone, Copy)]
pub struct ReportContext<'a> {
    pub valuator: Valuator<'a>,
    pub target: &'a CommodityRef,
    pub depth_limit: usize,
    pub display: &'a DisplayConfig,
}
