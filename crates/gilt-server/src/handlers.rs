//! Request handlers.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use gilt_bonds::valuation::ValuationResult;
use gilt_bonds::BondError;
use gilt_core::Date;
use gilt_traits::{GiltRecord, GiltReferenceSource, TraitError};

/// Application state.
pub struct AppState {
    /// Reference data for conventional gilts
    pub source: Arc<dyn GiltReferenceSource>,
}

// =============================================================================
// ERRORS
// =============================================================================

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    error: String,
    code: String,
}

/// Caller-facing error. Details stay in the server log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: &'static str,
}

impl ApiError {
    fn new(status: StatusCode, code: &'static str, message: &'static str) -> Self {
        Self {
            status,
            code,
            message,
        }
    }

    /// Status code sent to the caller.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Machine-readable error code.
    pub fn code(&self) -> &'static str {
        self.code
    }

    fn invalid_request(status: StatusCode) -> Self {
        Self::new(status, "invalid_request", "Invalid request body")
    }

    fn load_failed() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "load_failed",
            "Failed to load gilt data",
        )
    }
}

impl From<&BondError> for ApiError {
    fn from(e: &BondError) -> Self {
        let (status, message) = match e {
            BondError::UnknownIsin { .. } => (StatusCode::NOT_FOUND, "Unknown ISIN"),
            BondError::InvalidInput { .. } => (StatusCode::BAD_REQUEST, "Invalid input"),
            BondError::PriorToIssue { .. } => {
                (StatusCode::BAD_REQUEST, "Purchase date is before the first issue date")
            }
            BondError::Matured { .. } => (StatusCode::BAD_REQUEST, "Gilt has matured"),
            BondError::DegenerateTaxRate { .. } => {
                (StatusCode::BAD_REQUEST, "Tax rate must be below 100%")
            }
            BondError::NoConvergence { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "Yield calculation did not converge")
            }
            BondError::InvalidTerms { .. } | BondError::Core(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
            }
        };
        Self::new(status, e.kind(), message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message.to_string(),
                code: self.code.to_string(),
            }),
        )
            .into_response()
    }
}

fn load_error(e: &TraitError) -> ApiError {
    tracing::error!("failed to load gilt data: {e}");
    ApiError::load_failed()
}

// =============================================================================
// HEALTH
// =============================================================================

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    version: String,
}

/// Health check handler.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// =============================================================================
// GILT LISTING
// =============================================================================

/// Gilts split around today's date.
#[derive(Debug, Serialize)]
pub struct GiltListResponse {
    /// Server's local date
    pub today: Date,
    /// Gilts redeeming today or later
    pub active_rows: Vec<GiltRecord>,
    /// Gilts already redeemed
    pub past_rows: Vec<GiltRecord>,
}

/// List all conventional gilts, partitioned into active and past.
pub async fn list_gilts(
    State(state): State<Arc<AppState>>,
) -> Result<Json<GiltListResponse>, ApiError> {
    let directory = state.source.snapshot().await.map_err(|e| load_error(&e))?;

    let today = Date::today();
    let (active, past) = directory.partition(today);

    Ok(Json(GiltListResponse {
        today,
        active_rows: active.into_iter().cloned().collect(),
        past_rows: past.into_iter().cloned().collect(),
    }))
}

// =============================================================================
// YIELD
// =============================================================================

/// Valuation request.
#[derive(Debug, Deserialize)]
pub struct YieldRequest {
    /// ISIN of the gilt
    pub isin: String,
    /// Clean price per 100 nominal
    pub price: f64,
    /// Income tax rate as a fraction
    pub tax_rate: f64,
    /// Settlement date (YYYY-MM-DD). Defaults to the data date.
    #[serde(default)]
    pub purchase_date: Option<String>,
}

/// Valuation response.
#[derive(Debug, Serialize)]
pub struct YieldResponse {
    /// ISIN of the gilt
    pub isin: String,
    /// Accrued interest per 100 nominal
    pub accrued_interest_per_100: f64,
    /// Dirty price per 100 nominal
    pub dirty_price_per_100: f64,
    /// Sum of future pre-tax inflows per 100 nominal
    pub total_future_cashflow_per_100: f64,
    /// Pre-tax effective annual yield
    pub annualized_yield: f64,
    /// Post-tax effective annual return
    pub post_tax_return: f64,
    /// Gross yield equivalent to the post-tax return
    pub gross_equivalent_yield: f64,
    /// Whether the next coupon goes to the seller
    pub is_ex_dividend_period: bool,
    /// Next coupon date
    pub next_coupon_date: Date,
}

impl From<ValuationResult> for YieldResponse {
    fn from(result: ValuationResult) -> Self {
        Self {
            isin: result.isin,
            accrued_interest_per_100: result.accrued_interest_per_100,
            dirty_price_per_100: result.dirty_price_per_100,
            total_future_cashflow_per_100: result.total_future_cashflow_per_100,
            annualized_yield: result.annualized_yield,
            post_tax_return: result.post_tax_return,
            gross_equivalent_yield: result.gross_equivalent_yield,
            is_ex_dividend_period: result.is_ex_dividend_period,
            next_coupon_date: result.next_coupon_date,
        }
    }
}

/// Parses an optional purchase date. Blank means absent.
fn parse_purchase_date(raw: Option<&str>) -> Result<Option<Date>, ApiError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => Date::parse(s).map(Some).map_err(|e| {
            tracing::error!("invalid purchase date {s:?}: {e}");
            ApiError::new(StatusCode::BAD_REQUEST, "invalid_input", "Invalid purchase date")
        }),
    }
}

/// Value a gilt at a clean price and tax rate.
pub async fn calculate_yield(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<YieldRequest>, JsonRejection>,
) -> Result<Json<YieldResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::error!("rejected yield request: {}", rejection.body_text());
        ApiError::invalid_request(rejection.status())
    })?;

    let purchase_date = parse_purchase_date(request.purchase_date.as_deref())?;
    let directory = state.source.snapshot().await.map_err(|e| load_error(&e))?;

    let result = directory
        .value(request.isin.trim(), request.price, request.tax_rate, purchase_date)
        .map_err(|e| {
            tracing::error!("valuation failed for {}: {e}", request.isin);
            ApiError::from(&e)
        })?;

    Ok(Json(result.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bond_error_statuses() {
        let cases = [
            (BondError::unknown_isin("GB00TEST0001"), StatusCode::NOT_FOUND),
            (BondError::invalid_input("price"), StatusCode::BAD_REQUEST),
            (BondError::DegenerateTaxRate { tax_rate: 1.0 }, StatusCode::BAD_REQUEST),
            (BondError::no_convergence("bracket"), StatusCode::UNPROCESSABLE_ENTITY),
            (BondError::invalid_terms("coupon"), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (error, status) in cases {
            let api = ApiError::from(&error);
            assert_eq!(api.status(), status, "{error}");
            assert_eq!(api.code(), error.kind());
        }
    }

    #[test]
    fn test_parse_purchase_date() {
        assert_eq!(parse_purchase_date(None).unwrap(), None);
        assert_eq!(parse_purchase_date(Some("")).unwrap(), None);
        assert_eq!(parse_purchase_date(Some("  ")).unwrap(), None);
        assert_eq!(
            parse_purchase_date(Some("2025-03-03")).unwrap(),
            Some(Date::from_ymd(2025, 3, 3).unwrap())
        );

        let err = parse_purchase_date(Some("03/03/2025")).unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), "invalid_input");
    }
}
