//! Coupon schedules, settlement classification, accrual and cashflow projection.

mod accrued;
mod projector;
mod schedule;
mod settlement;

pub use accrued::{accrued_interest, Accrual, HALF_YEAR_DAYS};
pub use projector::{project, project_cashflows, ProjectedCashflows, REDEMPTION_PER_100};
pub use schedule::CouponSchedule;
pub use settlement::{classify_settlement, SettlementInfo};
