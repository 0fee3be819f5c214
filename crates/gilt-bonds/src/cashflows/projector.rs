//! Forward cashflows seen by a purchaser.
//!
//! The stream opens with the dirty price paid at settlement, followed by
//! every coupon strictly after settlement and the redemption of 100. The
//! next coupon is dropped when settlement is ex-dividend. Redemption is
//! never taxed; the final coupon and the redemption share one entry.

use gilt_core::{CashflowSet, Date};

use crate::cashflows::{CouponSchedule, SettlementInfo};
use crate::error::BondResult;
use crate::types::BondTerms;

/// Nominal repaid at redemption, per 100.
pub const REDEMPTION_PER_100: f64 = 100.0;

/// Pre-tax and post-tax cashflow streams for one settlement.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedCashflows {
    /// Gross coupons.
    pub pre_tax: CashflowSet,
    /// Coupons reduced by the tax rate.
    pub post_tax: CashflowSet,
}

/// Projects both cashflow streams.
///
/// # Errors
///
/// Returns an error if `dirty_price` is not positive or a cashflow cannot
/// be placed in order.
pub fn project_cashflows(
    terms: &BondTerms,
    schedule: &CouponSchedule,
    settlement: &SettlementInfo,
    dirty_price: f64,
    tax_rate: f64,
) -> BondResult<ProjectedCashflows> {
    Ok(ProjectedCashflows {
        pre_tax: project(terms, schedule, settlement, dirty_price, 1.0)?,
        post_tax: project(terms, schedule, settlement, dirty_price, 1.0 - tax_rate)?,
    })
}

/// Projects one stream, scaling each coupon by `coupon_factor`.
///
/// # Errors
///
/// Returns an error if `dirty_price` is not positive or a cashflow cannot
/// be placed in order.
pub fn project(
    terms: &BondTerms,
    schedule: &CouponSchedule,
    settlement: &SettlementInfo,
    dirty_price: f64,
    coupon_factor: f64,
) -> BondResult<CashflowSet> {
    let coupon = terms.coupon_per_period() * coupon_factor;
    let excluded: Option<Date> = settlement
        .is_ex_dividend_period
        .then_some(settlement.next_coupon_date);

    let mut flows = CashflowSet::new(settlement.settlement_date, dirty_price)?;

    for &date in schedule.after(settlement.settlement_date) {
        if Some(date) == excluded {
            log::debug!("{}: coupon on {date} excluded, settlement is ex-dividend", terms.isin);
            continue;
        }
        if coupon > 0.0 {
            flows.push(date, coupon)?;
        }
    }

    flows.push(schedule.redemption_date(), REDEMPTION_PER_100)?;

    Ok(flows)
}
