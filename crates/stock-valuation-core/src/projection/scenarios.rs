//! Bear / base / bull scenario projector.
//!
//! Compounds five years of revenue, net income and EPS per scenario, converts
//! EPS into a low/high share-price band with the scenario's P/E multiples, and
//! reports the 5-year CAGR of each band against the current share price.
//!
//! Year 1 carries the base financials unchanged; growth compounds from year 2.
//! EPS grows at the net-income growth rate, independent of share count.
//!
//! All arithmetic uses `rust_decimal::Decimal`. No `f64`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;

use crate::error::ValuationError;
use crate::time_value::cagr;
use crate::types::{with_metadata, ComputationOutput, Money, Multiple, PerShare, Rate};
use crate::ValuationResult;

/// Number of projected years per scenario.
pub const PROJECTION_YEARS: usize = 5;

/// Share count used when none (or a non-positive one) is supplied.
pub const DEFAULT_SHARES_OUTSTANDING: i64 = 50_000_000;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Snapshot of the company the projection starts from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyFinancials {
    /// Trailing revenue
    pub revenue: Money,
    /// Trailing net income (may be negative)
    pub net_income: Money,
    /// Shares outstanding; absent or non-positive falls back to 50,000,000
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shares_outstanding: Option<i64>,
    /// Reported EPS; when positive it seeds the EPS trajectory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_eps: Option<PerShare>,
    /// Current share price, only used for CAGR
    pub stock_price: Money,
}

/// Growth and multiple assumptions for one scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioAssumptions {
    /// Annual revenue growth (0.10 = 10%)
    pub revenue_growth_rate: Rate,
    /// Annual growth applied to net income and EPS
    pub net_income_growth_rate: Rate,
    /// P/E multiple for the low price band
    pub pe_low: Multiple,
    /// P/E multiple for the high price band
    pub pe_high: Multiple,
}

/// The three named scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioKind {
    Bear,
    Base,
    Bull,
}

impl ScenarioKind {
    pub const ALL: [ScenarioKind; 3] = [
        ScenarioKind::Bear,
        ScenarioKind::Base,
        ScenarioKind::Bull,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScenarioKind::Bear => "bear",
            ScenarioKind::Base => "base",
            ScenarioKind::Bull => "bull",
        }
    }
}

impl fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One value per scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioMap<T> {
    pub bear: T,
    pub base: T,
    pub bull: T,
}

impl<T> ScenarioMap<T> {
    pub fn get(&self, kind: ScenarioKind) -> &T {
        match kind {
            ScenarioKind::Bear => &self.bear,
            ScenarioKind::Base => &self.base,
            ScenarioKind::Bull => &self.bull,
        }
    }

    /// Apply `f` to every scenario, keeping the bear/base/bull slots.
    pub fn map<U>(&self, mut f: impl FnMut(ScenarioKind, &T) -> U) -> ScenarioMap<U> {
        ScenarioMap {
            bear: f(ScenarioKind::Bear, &self.bear),
            base: f(ScenarioKind::Base, &self.base),
            bull: f(ScenarioKind::Bull, &self.bull),
        }
    }

    /// Fallible variant of [`ScenarioMap::map`]; stops at the first error.
    pub fn try_map<U, E>(
        &self,
        mut f: impl FnMut(ScenarioKind, &T) -> Result<U, E>,
    ) -> Result<ScenarioMap<U>, E> {
        Ok(ScenarioMap {
            bear: f(ScenarioKind::Bear, &self.bear)?,
            base: f(ScenarioKind::Base, &self.base)?,
            bull: f(ScenarioKind::Bull, &self.bull)?,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (ScenarioKind, &T)> + '_ {
        ScenarioKind::ALL.into_iter().map(move |k| (k, self.get(k)))
    }
}

/// Assumptions for bear, base and bull.
pub type ScenarioSet = ScenarioMap<ScenarioAssumptions>;

/// Where the year-1 EPS came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EpsSource {
    /// Seeded from `current_eps`
    Reported,
    /// Net income divided by shares outstanding
    Derived,
}

/// Five-year projection for a single scenario. Index 0 is year 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionSeries {
    pub revenue_by_year: Vec<Money>,
    pub net_income_by_year: Vec<Money>,
    pub eps_by_year: Vec<PerShare>,
    pub share_price_low_by_year: Vec<PerShare>,
    pub share_price_high_by_year: Vec<PerShare>,
}

/// Output of the scenario projector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioProjection {
    pub series: ScenarioMap<ProjectionSeries>,
    /// 5-year CAGR of the low band; `None` when not computable
    pub cagr_low: ScenarioMap<Option<Rate>>,
    /// 5-year CAGR of the high band; `None` when not computable
    pub cagr_high: ScenarioMap<Option<Rate>>,
    /// Share count actually used for derived EPS
    pub shares_outstanding_used: i64,
    pub eps_source: EpsSource,
}

/// Serialised input envelope (CLI / bindings).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionInput {
    pub financials: CompanyFinancials,
    pub scenarios: ScenarioSet,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Project bear/base/bull scenarios from one financial snapshot.
///
/// Tolerated input (missing share count, inverted P/E band, zero price) is
/// reported in `warnings`. The only error is arithmetic overflow on inputs
/// that leave the Decimal range.
pub fn project(
    financials: &CompanyFinancials,
    scenarios: &ScenarioSet,
) -> ValuationResult<ComputationOutput<ScenarioProjection>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let shares = resolve_shares_outstanding(financials, &mut warnings);
    let (eps_seed, eps_source) = resolve_eps_seed(financials, shares);

    if financials.revenue < Decimal::ZERO {
        warnings.push(format!(
            "Revenue is negative ({}); projections compound it as given",
            financials.revenue
        ));
    }

    let series = scenarios.try_map(|kind, assumptions| {
        if assumptions.pe_high < assumptions.pe_low {
            warnings.push(format!(
                "{kind} scenario: pe_high ({}) is below pe_low ({}); price band is inverted",
                assumptions.pe_high, assumptions.pe_low
            ));
        }
        project_series(financials, eps_seed, assumptions)
            .map_err(|e| annotate_overflow(e, kind))
    })?;

    let cagr_low =
        series.map(|_, s| band_cagr(&s.share_price_low_by_year, financials.stock_price));
    let cagr_high =
        series.map(|_, s| band_cagr(&s.share_price_high_by_year, financials.stock_price));

    if financials.stock_price <= Decimal::ZERO {
        warnings.push(format!(
            "Stock price is {}; CAGR is not computable for any scenario",
            financials.stock_price
        ));
    } else {
        for kind in ScenarioKind::ALL {
            if cagr_low.get(kind).is_none() || cagr_high.get(kind).is_none() {
                warnings.push(format!(
                    "{kind} scenario: year-{PROJECTION_YEARS} price is not positive; CAGR not computable"
                ));
            }
        }
    }

    let output = ScenarioProjection {
        series,
        cagr_low,
        cagr_high,
        shares_outstanding_used: shares,
        eps_source,
    };

    let assumptions = ProjectionAssumptions {
        financials,
        scenarios,
        projection_years: PROJECTION_YEARS,
    };
    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Scenario projection (5-year compounding, P/E price bands)",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct ProjectionAssumptions<'a> {
    financials: &'a CompanyFinancials,
    scenarios: &'a ScenarioSet,
    projection_years: usize,
}

fn resolve_shares_outstanding(financials: &CompanyFinancials, warnings: &mut Vec<String>) -> i64 {
    match financials.shares_outstanding {
        Some(n) if n > 0 => n,
        Some(n) => {
            warnings.push(format!(
                "Shares outstanding is {n}; using default of {DEFAULT_SHARES_OUTSTANDING}"
            ));
            DEFAULT_SHARES_OUTSTANDING
        }
        None => {
            warnings.push(format!(
                "Shares outstanding not provided; using default of {DEFAULT_SHARES_OUTSTANDING}"
            ));
            DEFAULT_SHARES_OUTSTANDING
        }
    }
}

fn resolve_eps_seed(financials: &CompanyFinancials, shares: i64) -> (PerShare, EpsSource) {
    match financials.current_eps {
        Some(eps) if eps > Decimal::ZERO => (eps, EpsSource::Reported),
        // shares is always positive here
        _ => (financials.net_income / Decimal::from(shares), EpsSource::Derived),
    }
}

fn project_series(
    financials: &CompanyFinancials,
    eps_seed: PerShare,
    assumptions: &ScenarioAssumptions,
) -> ValuationResult<ProjectionSeries> {
    let revenue_by_year =
        compound_path(financials.revenue, assumptions.revenue_growth_rate, "revenue")?;
    let net_income_by_year =
        compound_path(financials.net_income, assumptions.net_income_growth_rate, "net income")?;
    let eps_by_year = compound_path(eps_seed, assumptions.net_income_growth_rate, "EPS")?;

    let share_price_low_by_year = price_band(&eps_by_year, assumptions.pe_low, "low price band")?;
    let share_price_high_by_year =
        price_band(&eps_by_year, assumptions.pe_high, "high price band")?;

    Ok(ProjectionSeries {
        revenue_by_year,
        net_income_by_year,
        eps_by_year,
        share_price_low_by_year,
        share_price_high_by_year,
    })
}

/// `[v, v(1+g), v(1+g)^2, ...]`, each year multiplied from the previous one.
fn compound_path(start: Decimal, growth: Rate, label: &str) -> ValuationResult<Vec<Decimal>> {
    let factor = Decimal::ONE + growth;
    let mut path = Vec::with_capacity(PROJECTION_YEARS);
    let mut current = start;
    path.push(current);
    for year in 2..=PROJECTION_YEARS {
        current = current
            .checked_mul(factor)
            .ok_or_else(|| ValuationError::overflow(format!("{label} in year {year}")))?;
        path.push(current);
    }
    Ok(path)
}

fn price_band(eps: &[PerShare], multiple: Multiple, label: &str) -> ValuationResult<Vec<PerShare>> {
    eps.iter()
        .enumerate()
        .map(|(i, e)| {
            e.checked_mul(multiple)
                .ok_or_else(|| ValuationError::overflow(format!("{label} in year {}", i + 1)))
        })
        .collect()
}

fn band_cagr(band: &[PerShare], stock_price: Money) -> Option<Rate> {
    let final_price = *band.last()?;
    cagr(stock_price, final_price, PROJECTION_YEARS as u32)
}

fn annotate_overflow(err: ValuationError, kind: ScenarioKind) -> ValuationError {
    match err {
        ValuationError::ArithmeticOverflow { context } => {
            ValuationError::overflow(format!("{kind} scenario {context}"))
        }
        other => other,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
