//! Reference data for conventional gilts.
//!
//! - [`GiltRecord`]: one listing row as published in the gilts-in-issue data
//! - [`GiltDirectory`]: an immutable snapshot keyed by ISIN, with terms and
//!   coupon schedules built once at construction
//! - [`GiltReferenceSource`]: async provider of directory snapshots
//!
//! Reference data is semi-static (updated daily, not real-time).

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use gilt_bonds::cashflows::CouponSchedule;
use gilt_bonds::types::{BondTerms, CouponAnchor};
use gilt_bonds::valuation::{GiltValuer, SettlementContext, ValuationResult};
use gilt_bonds::{BondError, BondResult};
use gilt_core::Date;

use crate::error::TraitError;

// =============================================================================
// GILT RECORDS
// =============================================================================

/// One conventional gilt as listed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GiltRecord {
    /// Maturity bucket (`Ultra-Short`, `Short`, `Medium`, `Long`).
    pub category: String,
    /// Display name.
    pub name: String,
    /// ISIN code.
    pub isin: String,
    /// Redemption date.
    pub redemption_date: Date,
    /// First issue date.
    pub first_issue_date: Date,
    /// Dividend dates descriptor as published, e.g. `7 Jun/Dec`.
    pub dividend_dates: String,
    /// Total amount in issue, £ million nominal.
    pub total_amount_in_issue: Option<Decimal>,
    /// Annual coupon rate in percent.
    pub coupon_rate_percent: f64,
}

impl GiltRecord {
    /// Builds validated bond terms from the record.
    ///
    /// A blank dividend descriptor leaves the coupon anchor unset.
    ///
    /// # Errors
    ///
    /// Returns `BondError::InvalidTerms` for malformed terms or an
    /// unrecognised dividend descriptor.
    pub fn to_terms(&self) -> BondResult<BondTerms> {
        let mut terms = BondTerms::new(
            self.isin.clone(),
            self.name.clone(),
            self.first_issue_date,
            self.redemption_date,
            self.coupon_rate_percent,
        )?
        .with_category(self.category.clone());

        if !self.dividend_dates.trim().is_empty() {
            terms = terms.with_dividend_anchor(self.dividend_dates.parse::<CouponAnchor>()?);
        }

        Ok(terms)
    }
}

// =============================================================================
// DIRECTORY
// =============================================================================

#[derive(Debug, Clone)]
struct DirectoryEntry {
    terms: BondTerms,
    schedule: CouponSchedule,
}

/// Immutable snapshot of the gilts in issue.
///
/// Records are held sorted by `(redemption_date, name)`. Every ISIN is
/// unique and has terms and a coupon schedule built up front, so lookups
/// and valuations need no locking.
#[derive(Debug, Clone)]
pub struct GiltDirectory {
    data_date: Date,
    records: Vec<GiltRecord>,
    entries: HashMap<String, DirectoryEntry>,
    valuer: GiltValuer,
}

impl GiltDirectory {
    /// Builds a directory as of `data_date`.
    ///
    /// # Errors
    ///
    /// - `TraitError::AlreadyExists` if an ISIN appears twice
    /// - `TraitError::InvalidInput` if a record has invalid terms
    pub fn new(data_date: Date, mut records: Vec<GiltRecord>) -> Result<Self, TraitError> {
        let mut entries = HashMap::with_capacity(records.len());

        for record in &records {
            let terms = record
                .to_terms()
                .map_err(|e| TraitError::InvalidInput(format!("{}: {e}", record.isin)))?;
            let schedule = CouponSchedule::build(&terms)
                .map_err(|e| TraitError::InvalidInput(format!("{}: {e}", record.isin)))?;

            if entries
                .insert(record.isin.clone(), DirectoryEntry { terms, schedule })
                .is_some()
            {
                return Err(TraitError::AlreadyExists(record.isin.clone()));
            }
        }

        records.sort_by(|a, b| {
            a.redemption_date
                .cmp(&b.redemption_date)
                .then_with(|| a.name.cmp(&b.name))
        });

        log::debug!("gilt directory as of {data_date}: {} gilts", records.len());

        Ok(Self {
            data_date,
            records,
            entries,
            valuer: GiltValuer::default(),
        })
    }

    /// Replaces the valuer used by [`GiltDirectory::value`].
    #[must_use]
    pub fn with_valuer(mut self, valuer: GiltValuer) -> Self {
        self.valuer = valuer;
        self
    }

    /// Reference date of the underlying data.
    #[must_use]
    pub fn data_date(&self) -> Date {
        self.data_date
    }

    /// All records sorted by `(redemption_date, name)`.
    #[must_use]
    pub fn records(&self) -> &[GiltRecord] {
        &self.records
    }

    /// Number of gilts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True if there are no gilts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Looks up a record by ISIN.
    #[must_use]
    pub fn record(&self, isin: &str) -> Option<&GiltRecord> {
        self.records.iter().find(|r| r.isin == isin)
    }

    /// Looks up bond terms by ISIN.
    #[must_use]
    pub fn terms(&self, isin: &str) -> Option<&BondTerms> {
        self.entries.get(isin).map(|e| &e.terms)
    }

    /// Looks up the coupon schedule by ISIN.
    #[must_use]
    pub fn schedule(&self, isin: &str) -> Option<&CouponSchedule> {
        self.entries.get(isin).map(|e| &e.schedule)
    }

    /// Values a gilt; `purchase_date` defaults to the data date.
    ///
    /// # Errors
    ///
    /// Returns `BondError::UnknownIsin` for a missing ISIN, otherwise any
    /// valuation error.
    pub fn value(
        &self,
        isin: &str,
        clean_price: f64,
        tax_rate: f64,
        purchase_date: Option<Date>,
    ) -> BondResult<ValuationResult> {
        let entry = self
            .entries
            .get(isin)
            .ok_or_else(|| BondError::unknown_isin(isin))?;
        let ctx = SettlementContext::new(purchase_date.unwrap_or(self.data_date), clean_price, tax_rate);

        self.valuer.value_with_schedule(&entry.terms, &entry.schedule, &ctx)
    }

    /// Splits records into those redeeming on or after `today` and those
    /// already redeemed. Both keep the directory order.
    #[must_use]
    pub fn partition(&self, today: Date) -> (Vec<&GiltRecord>, Vec<&GiltRecord>) {
        self.records.iter().partition(|r| r.redemption_date >= today)
    }
}

// =============================================================================
// SOURCES
// =============================================================================

/// Provider of gilt directory snapshots.
#[async_trait]
pub trait GiltReferenceSource: Send + Sync {
    /// Returns the current snapshot, reloading if the source changed.
    async fn snapshot(&self) -> Result<Arc<GiltDirectory>, TraitError>;

    /// Get a gilt record by ISIN.
    async fn get_by_isin(&self, isin: &str) -> Result<Option<GiltRecord>, TraitError> {
        Ok(self.snapshot().await?.record(isin).cloned())
    }
}
