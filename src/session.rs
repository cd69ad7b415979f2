//! Rebuild-and-notify orchestration around the build indices.
//!
//! A [`Session`] owns the current [`Snapshot`]. Settings that change which
//! postings are read or how they are valued trigger a full reset; the rest
//! only ask listeners to redraw from the snapshot they already have.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::config::DisplayConfig;
use crate::error::{Error, Result};
use crate::journal::{Journal, Query};
use crate::models::{CommodityRef, Posting};
use crate::pricing::{CommodityRegistry, Valuator};
use crate::report::{
    self, AccountReport, CommodityReport, PeriodicReport, PieReport, ReportContext,
};
use crate::series::{
    time_series, AccountSeries, CommoditySeries, Granularity, SeriesBuilder, DEFAULT_THRESHOLD,
};

/// Everything a view can be asked to change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub filter: String,
    pub display_commodity: Option<String>,
    pub merge: bool,
    pub effective_dates: bool,
    pub depth_limit: usize,
    pub granularity: Granularity,
    pub pie_threshold: Decimal,
    pub pie_account: Option<String>,
    pub strict_accounts: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            filter: String::new(),
            display_commodity: None,
            merge: false,
            effective_dates: false,
            depth_limit: 0,
            granularity: Granularity::default(),
            pie_threshold: DEFAULT_THRESHOLD,
            pie_account: None,
            strict_accounts: false,
        }
    }
}

impl Settings {
    /// True when moving to `next` means the journal has to be queried again.
    pub fn requires_reset(&self, next: &Settings) -> bool {
        self.filter != next.filter
            || self.display_commodity != next.display_commodity
            || self.merge != next.merge
            || self.effective_dates != next.effective_dates
            || self.strict_accounts != next.strict_accounts
    }

    fn query(&self) -> Query {
        Query::new(self.filter.clone()).with_effective_dates(self.effective_dates)
    }
}

/// The immutable result of one reset.
#[derive(Debug)]
pub struct Snapshot {
    generation: u64,
    settings: Settings,
    display_commodity: Option<CommodityRef>,
    accounts: AccountSeries,
    commodities: CommoditySeries,
}

impl Snapshot {
    /// Increases by one with every successful reset of the owning session.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Settings the snapshot was built with.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn display_commodity(&self) -> Option<&CommodityRef> {
        self.display_commodity.as_ref()
    }

    pub fn accounts(&self) -> &AccountSeries {
        &self.accounts
    }

    pub fn commodities(&self) -> &CommoditySeries {
        &self.commodities
    }
}

#[derive(Debug, Clone)]
pub enum Change {
    /// A new snapshot replaced the previous one.
    Reset(Arc<Snapshot>),
    /// Presentation settings changed; the snapshot is unchanged.
    Redraw(Arc<Snapshot>),
    Cleared,
}

pub type Listener = Box<dyn Fn(&Change) + Send + Sync>;

pub struct Session {
    journal: Arc<dyn Journal>,
    registry: Arc<dyn CommodityRegistry>,
    settings: Settings,
    display: DisplayConfig,
    snapshot: Option<Arc<Snapshot>>,
    generation: u64,
    listeners: Vec<Listener>,
}

impl Session {
    pub fn new(journal: Arc<dyn Journal>, registry: Arc<dyn CommodityRegistry>) -> Self {
        Self {
            journal,
            registry,
            settings: Settings::default(),
            display: DisplayConfig::default(),
            snapshot: None,
            generation: 0,
            listeners: Vec::new(),
        }
    }

    /// Initial settings; nothing is built until [`Session::reset`].
    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_display(mut self, display: DisplayConfig) -> Self {
        self.display = display;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn registry(&self) -> &dyn CommodityRegistry {
        self.registry.as_ref()
    }

    /// The currently published snapshot, if any.
    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.snapshot.clone()
    }

    pub fn subscribe(&mut self, listener: impl Fn(&Change) + Send + Sync + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Queries the journal once and rebuilds every index.
    ///
    /// The new snapshot is published only if the whole build succeeds; on
    /// failure the previous snapshot stays in place.
    pub fn reset(&mut self) -> Result<Arc<Snapshot>> {
        let settings = self.settings.clone();
        self.rebuild(settings)
    }

    /// Builds a snapshot for `settings` and, on success, commits both.
    fn rebuild(&mut self, settings: Settings) -> Result<Arc<Snapshot>> {
        match self.build_snapshot(&settings) {
            Ok(snapshot) => {
                let snapshot = Arc::new(snapshot);
                self.settings = settings;
                self.generation = snapshot.generation;
                self.snapshot = Some(snapshot.clone());
                info!(
                    generation = snapshot.generation,
                    postings = snapshot.accounts.posting_count(),
                    accounts = snapshot.accounts.tree().len(),
                    "snapshot rebuilt"
                );
                self.notify(&Change::Reset(snapshot.clone()));
                Ok(snapshot)
            }
            Err(e) => {
                warn!(error = %e, "reset failed, keeping previous snapshot and settings");
                Err(e)
            }
        }
    }

    fn build_snapshot(&self, settings: &Settings) -> Result<Snapshot> {
        let postings: Vec<Posting> = self.journal.query(&settings.query())?.collect();

        let display_commodity = match &settings.display_commodity {
            Some(symbol) => Some(self.registry.find(symbol).ok_or_else(|| {
                Error::UnknownCommodity {
                    symbol: symbol.clone(),
                }
            })?),
            None => None,
        };

        let mut builder = SeriesBuilder::new().strict(settings.strict_accounts);
        if let Some(declared) = self.journal.declared_accounts() {
            builder = builder.with_accounts(declared.clone());
        }
        let accounts = builder.build(&postings)?;

        let valuator = Valuator::new(self.registry.as_ref());
        let commodities = time_series(
            &postings,
            display_commodity.as_ref(),
            settings.merge,
            &valuator,
        );

        Ok(Snapshot {
            generation: self.generation + 1,
            settings: settings.clone(),
            display_commodity,
            accounts,
            commodities,
        })
    }

    /// Switches to `settings`, resetting or redrawing as needed.
    ///
    /// When a required reset fails the current settings are left untouched.
    pub fn apply_settings(&mut self, settings: Settings) -> Result<()> {
        if settings == self.settings {
            return Ok(());
        }

        if self.settings.requires_reset(&settings) || self.snapshot.is_none() {
            self.rebuild(settings)?;
        } else {
            self.settings = settings;
            if let Some(snapshot) = self.snapshot.clone() {
                debug!(generation = snapshot.generation, "presentation settings changed");
                self.notify(&Change::Redraw(snapshot));
            }
        }
        Ok(())
    }

    /// Drops the published snapshot.
    pub fn clear(&mut self) {
        if self.snapshot.take().is_some() {
            self.notify(&Change::Cleared);
        }
    }

    fn notify(&self, change: &Change) {
        for listener in &self.listeners {
            listener(change);
        }
    }

    fn current(&self) -> Result<Arc<Snapshot>> {
        self.snapshot.clone().ok_or(Error::NotLoaded)
    }

    fn with_context<T>(
        &self,
        f: impl FnOnce(&Snapshot, &ReportContext<'_>) -> T,
    ) -> Result<T> {
        let snapshot = self.current()?;
        let target = snapshot
            .display_commodity
            .as_ref()
            .ok_or(Error::NoDisplayCommodity)?;
        let ctx = ReportContext {
            valuator: Valuator::new(self.registry.as_ref()),
            target,
            depth_limit: self.settings.depth_limit,
            display: &self.display,
        };
        Ok(f(snapshot.as_ref(), &ctx))
    }

    pub fn commodity_report(&self) -> Result<CommodityReport> {
        let snapshot = self.current()?;
        Ok(report::commodity_report(
            &snapshot.commodities,
            snapshot.display_commodity.as_ref(),
            snapshot.settings.merge,
            &self.display,
        ))
    }

    pub fn account_report(&self) -> Result<AccountReport> {
        self.with_context(|snapshot, ctx| report::account_report(&snapshot.accounts, ctx))
    }

    pub fn periodic_report(&self) -> Result<PeriodicReport> {
        let granularity = self.settings.granularity;
        self.with_context(|snapshot, ctx| {
            report::periodic_report(&snapshot.accounts, ctx, granularity)
        })
    }

    pub fn pie_report(&self) -> Result<PieReport> {
        let prefix = self.settings.pie_account.as_deref();
        let threshold = self.settings.pie_threshold;
        self.with_context(|snapshot, ctx| {
            report::pie_report(&snapshot.accounts, ctx, prefix, threshold)
        })
    }
}
