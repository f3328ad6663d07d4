//! Value types shared by the LX-first and unified arbitrage engines.

use crate::decimal::Decimal;

/// A real-time oracle price for a symbol.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LxPrice {
    pub symbol: String,
    pub bid: Decimal,
    pub ask: Decimal,
    pub mid: Decimal,
    pub timestamp_ms: i64,
}

/// A quoted price from a (possibly lagging) venue.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VenuePrice {
    pub symbol: String,
    pub venue: String,
    pub bid: Decimal,
    pub ask: Decimal,
    pub timestamp_ms: i64,
}

/// The side of an [`LxFirstOpportunity`] relative to the stale venue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum StaleSide {
    /// Buy on the stale venue; it is quoting below the oracle.
    Buy,
    /// Sell on the stale venue; it is quoting above the oracle.
    Sell,
}

impl StaleSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            StaleSide::Buy => "buy",
            StaleSide::Sell => "sell",
        }
    }
}

/// An oracle-vs-stale-venue divergence detected by [`super::lx_first::LxFirstArbitrage`].
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LxFirstOpportunity {
    pub id: String,
    pub symbol: String,
    pub timestamp_ms: i64,
    pub lx_price: LxPrice,
    pub stale_venue: String,
    pub stale_price: VenuePrice,
    pub staleness_ms: i64,
    pub side: StaleSide,
    pub divergence: Decimal,
    pub divergence_bps: Decimal,
    pub expected_profit: Decimal,
    pub max_size: Decimal,
    pub confidence: f64,
}

/// A buy-low-sell-high opportunity found across two venues in the aggregated
/// book, produced by [`super::unified::UnifiedArbitrage`]'s scanner loop.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct UnifiedOpportunity {
    pub id: String,
    pub symbol: String,
    pub created_at_ms: i64,
    pub expires_at_ms: i64,
    pub buy_venue: String,
    pub buy_price: Decimal,
    pub buy_size: Decimal,
    pub sell_venue: String,
    pub sell_price: Decimal,
    pub sell_size: Decimal,
    pub spread: Decimal,
    pub spread_bps: Decimal,
    pub max_size: Decimal,
    pub gross_profit: Decimal,
    pub est_fees: Decimal,
    pub net_profit: Decimal,
    pub confidence: f64,
    pub latency_ms: i64,
}

/// Outcome of executing a [`UnifiedOpportunity`]'s two legs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ExecutionStatus {
    Executing,
    Completed,
    Expired,
    Failed,
}

impl ExecutionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionStatus::Executing => "executing",
            ExecutionStatus::Completed => "completed",
            ExecutionStatus::Expired => "expired",
            ExecutionStatus::Failed => "failed",
        }
    }
}

/// A record of one attempt (successful or not) to execute a [`UnifiedOpportunity`].
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct UnifiedExecution {
    pub id: String,
    pub opportunity: UnifiedOpportunity,
    pub start_ms: i64,
    pub end_ms: i64,
    pub status: ExecutionStatus,
    pub buy_order_id: Option<String>,
    pub sell_order_id: Option<String>,
    pub actual_profit: Decimal,
    pub fees: Decimal,
    pub error: Option<String>,
}

/// Summary statistics derived from a list of [`UnifiedExecution`]s.
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct UnifiedArbStats {
    pub total_executions: u64,
    pub successful_executions: u64,
    pub total_pnl: Decimal,
    pub win_rate: f64,
}

impl UnifiedArbStats {
    pub fn from_executions(executions: &[UnifiedExecution]) -> Self {
        let total_executions = executions.len() as u64;
        let successful_executions = executions
            .iter()
            .filter(|e| e.status == ExecutionStatus::Completed && e.actual_profit.is_positive())
            .count() as u64;
        let total_pnl = executions
            .iter()
            .filter(|e| e.status == ExecutionStatus::Completed)
            .fold(Decimal::zero(), |acc, e| acc + e.actual_profit);
        let win_rate = if total_executions == 0 {
            0.0
        } else {
            successful_executions as f64 / total_executions as f64
        };
        UnifiedArbStats {
            total_executions,
            successful_executions,
            total_pnl,
            win_rate,
        }
    }
}
