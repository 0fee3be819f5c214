//! Settlement classification against a coupon schedule.

use serde::Serialize;

use gilt_core::Date;

use crate::cashflows::CouponSchedule;
use crate::error::{BondError, BondResult};
use crate::types::ExDividendRule;

/// Where a settlement date sits in the coupon schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SettlementInfo {
    /// The settlement date classified.
    pub settlement_date: Date,
    /// Latest coupon on or before settlement, or first issue if none.
    pub previous_coupon_date: Date,
    /// Earliest coupon strictly after settlement.
    pub next_coupon_date: Date,
    /// Start of the ex-dividend window before `next_coupon_date`.
    pub ex_dividend_date: Date,
    /// True if settlement falls in the ex-dividend window.
    pub is_ex_dividend_period: bool,
}

impl SettlementInfo {
    /// Calendar days from the previous coupon to settlement.
    #[must_use]
    pub fn days_since_previous(&self) -> i64 {
        self.previous_coupon_date.days_between(&self.settlement_date)
    }
}

/// Classifies `settlement` against `schedule`.
///
/// # Errors
///
/// - `BondError::PriorToIssue` if settlement precedes first issue
/// - `BondError::Matured` if settlement is on or after redemption
pub fn classify_settlement(
    schedule: &CouponSchedule,
    settlement: Date,
    rule: &ExDividendRule,
) -> BondResult<SettlementInfo> {
    if settlement < schedule.first_issue_date() {
        return Err(BondError::PriorToIssue {
            settlement,
            first_issue: schedule.first_issue_date(),
        });
    }

    let Some(next_coupon_date) = schedule
        .next_after(settlement)
        .filter(|_| settlement < schedule.redemption_date())
    else {
        return Err(BondError::Matured {
            settlement,
            redemption: schedule.redemption_date(),
        });
    };

    let previous_coupon_date = schedule
        .previous_on_or_before(settlement)
        .unwrap_or(schedule.first_issue_date());

    Ok(SettlementInfo {
        settlement_date: settlement,
        previous_coupon_date,
        next_coupon_date,
        ex_dividend_date: rule.ex_dividend_date(next_coupon_date),
        is_ex_dividend_period: rule.is_ex_dividend(settlement, next_coupon_date),
    })
}
