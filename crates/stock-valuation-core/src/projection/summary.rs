//! Year-5 target prices and upside per scenario, with an optional
//! probability-weighted target across bear/base/bull.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::ValuationError;
use crate::types::{with_metadata, ComputationOutput, Money, PerShare, Rate};
use crate::ValuationResult;

use super::scenarios::{
    project, ProjectionInput, ProjectionSeries, ScenarioKind, ScenarioMap, ScenarioProjection,
};

const WEIGHT_TOLERANCE: Decimal = dec!(0.001);

/// Input for a projection summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryInput {
    pub projection: ProjectionInput,
    /// Scenario probabilities; must sum to 1.0
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weights: Option<ScenarioMap<Rate>>,
}

/// Year-5 targets for one scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioTarget {
    pub target_low: PerShare,
    pub target_high: PerShare,
    pub target_mid: PerShare,
    /// target_low / price - 1; `None` when price is not positive
    pub upside_low: Option<Rate>,
    pub upside_high: Option<Rate>,
    pub upside_mid: Option<Rate>,
    pub cagr_low: Option<Rate>,
    pub cagr_high: Option<Rate>,
}

/// Output of the projection summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionSummary {
    pub current_price: Money,
    pub targets: ScenarioMap<ScenarioTarget>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weighted_target: Option<PerShare>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weighted_upside: Option<Rate>,
    pub projection: ScenarioProjection,
}

/// Project the scenarios and condense them into year-5 targets.
pub fn summarize(input: &SummaryInput) -> ValuationResult<ComputationOutput<ProjectionSummary>> {
    let start = Instant::now();

    if let Some(ref weights) = input.weights {
        validate_weights(weights)?;
    }

    let projected = project(&input.projection.financials, &input.projection.scenarios)?;
    let mut warnings = projected.warnings;
    let projection = projected.result;
    let price = input.projection.financials.stock_price;

    let targets = projection.series.try_map(|kind, series| {
        scenario_target(
            kind,
            series,
            price,
            *projection.cagr_low.get(kind),
            *projection.cagr_high.get(kind),
        )
    })?;

    let weighted_target = match input.weights {
        Some(ref w) => Some(weighted_mid(w, &targets)?),
        None => None,
    };
    let weighted_upside = weighted_target.and_then(|t| upside(t, price));

    if price > Decimal::ZERO {
        let missing: Vec<&str> = targets
            .iter()
            .filter(|(_, t)| t.upside_low.is_none() || t.upside_high.is_none())
            .map(|(kind, _)| kind.as_str())
            .collect();
        if !missing.is_empty() {
            warnings.push(format!(
                "Upside out of range against price {price} for: {}",
                missing.join(", ")
            ));
        }
    }

    if targets.bear.target_mid > targets.bull.target_mid {
        warnings.push(
            "Bear year-5 target exceeds bull target; check scenario ordering".to_string(),
        );
    }

    let output = ProjectionSummary {
        current_price: price,
        targets,
        weighted_target,
        weighted_upside,
        projection,
    };

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Scenario projection summary (year-5 P/E targets)",
        input,
        warnings,
        elapsed,
        output,
    ))
}

fn scenario_target(
    kind: ScenarioKind,
    series: &ProjectionSeries,
    price: Money,
    cagr_low: Option<Rate>,
    cagr_high: Option<Rate>,
) -> ValuationResult<ScenarioTarget> {
    let target_low = series
        .share_price_low_by_year
        .last()
        .copied()
        .unwrap_or(Decimal::ZERO);
    let target_high = series
        .share_price_high_by_year
        .last()
        .copied()
        .unwrap_or(Decimal::ZERO);
    let target_mid = target_low
        .checked_add(target_high)
        .ok_or_else(|| ValuationError::overflow(format!("{kind} scenario mid target")))?
        / dec!(2);

    Ok(ScenarioTarget {
        target_low,
        target_high,
        target_mid,
        upside_low: upside(target_low, price),
        upside_high: upside(target_high, price),
        upside_mid: upside(target_mid, price),
        cagr_low,
        cagr_high,
    })
}

fn weighted_mid(
    weights: &ScenarioMap<Rate>,
    targets: &ScenarioMap<ScenarioTarget>,
) -> ValuationResult<PerShare> {
    ScenarioKind::ALL.iter().try_fold(Decimal::ZERO, |acc, kind| {
        weights
            .get(*kind)
            .checked_mul(targets.get(*kind).target_mid)
            .and_then(|term| acc.checked_add(term))
            .ok_or_else(|| ValuationError::overflow("probability-weighted target"))
    })
}

/// `target / price - 1`; `None` when price is not positive or the ratio
/// leaves the `Decimal` range.
fn upside(target: PerShare, price: Money) -> Option<Rate> {
    if price <= Decimal::ZERO {
        return None;
    }
    target
        .checked_div(price)
        .and_then(|ratio| ratio.checked_sub(Decimal::ONE))
}

fn validate_weights(weights: &ScenarioMap<Rate>) -> ValuationResult<()> {
    for (kind, w) in weights.iter() {
        if *w < Decimal::ZERO || *w > Decimal::ONE {
            return Err(ValuationError::InvalidInput {
                field: format!("weights.{kind}"),
                reason: "Weight must be between 0 and 1".into(),
            });
        }
    }
    let total: Decimal = weights.iter().map(|(_, w)| *w).sum();
    if (total - Decimal::ONE).abs() > WEIGHT_TOLERANCE {
        return Err(ValuationError::InvalidInput {
            field: "weights".into(),
            reason: format!("Weights must sum to 1.0 (got {total})"),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
