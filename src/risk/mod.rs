//! Pre-trade validation, position/PnL/open-order tracking and a kill switch.

mod error;
mod tracker;

pub use error::RiskError;
pub use tracker::ScopedOrderTracker;

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use crossbeam::atomic::AtomicCell;
use dashmap::DashMap;
use tracing::warn;

use crate::decimal::Decimal;
use crate::primitives::{OrderRequest, Side, TradingPair};

/// Static risk limits. All size/loss fields use `Decimal::zero()` to mean
/// "no limit".
#[derive(Debug, Clone, PartialEq)]
pub struct RiskConfig {
    pub enabled: bool,
    pub max_order_size: Decimal,
    pub max_position_size: Decimal,
    pub max_daily_loss: Decimal,
    pub max_open_orders: u32,
    pub position_limits: HashMap<String, Decimal>,
    pub kill_switch_on_loss: bool,
}

impl Default for RiskConfig {
    fn default() -> Self {
        RiskConfig {
            enabled: true,
            max_order_size: Decimal::zero(),
            max_position_size: Decimal::zero(),
            max_daily_loss: Decimal::zero(),
            max_open_orders: u32::MAX,
            position_limits: HashMap::new(),
            kill_switch_on_loss: false,
        }
    }
}

/// Thread-safe pre-trade gate and position/PnL/open-order bookkeeping.
///
/// State is partitioned into three independently synchronized containers
/// (positions, daily PnL, open-order counts) plus an atomic kill switch, so
/// that readers of one partition never wait on writers of another.
pub struct RiskManager {
    config: RiskConfig,
    kill_switch: AtomicBool,
    positions: DashMap<String, Decimal>,
    daily_pnl: AtomicCell<Decimal>,
    open_orders: DashMap<String, u32>,
}

impl RiskManager {
    pub fn new(config: RiskConfig) -> Self {
        RiskManager {
            config,
            kill_switch: AtomicBool::new(false),
            positions: DashMap::new(),
            daily_pnl: AtomicCell::new(Decimal::zero()),
            open_orders: DashMap::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    pub fn config(&self) -> &RiskConfig {
        &self.config
    }

    pub fn is_killed(&self) -> bool {
        self.kill_switch.load(Ordering::Acquire)
    }

    pub fn kill(&self) {
        self.kill_switch.store(true, Ordering::Release);
    }

    pub fn reset(&self) {
        self.kill_switch.store(false, Ordering::Release);
    }

    /// Validate `request` against the configured limits, in the fixed order
    /// of `§4.6`: disabled bypass, kill switch, order size, position limit,
    /// open-order count, daily loss.
    pub fn validate(&self, request: &OrderRequest) -> Result<(), RiskError> {
        if !self.config.enabled {
            return Ok(());
        }

        if self.is_killed() {
            return Err(RiskError::KillSwitchActive);
        }

        if self.config.max_order_size.is_positive() && request.quantity > self.config.max_order_size {
            return Err(RiskError::OrderSizeExceeded {
                quantity: request.quantity.to_string(),
                max: self.config.max_order_size.to_string(),
            });
        }

        if let Some(pair) = TradingPair::from_symbol(&request.symbol) {
            let base = pair.base().to_string();
            let current = self.position(&base);
            let new_position = match request.side {
                Side::Buy => current + request.quantity,
                Side::Sell => current - request.quantity,
            };

            if let Some(limit) = self.config.position_limits.get(&base) {
                if new_position.abs() > *limit {
                    return Err(RiskError::PositionLimitExceeded {
                        asset: base,
                        new_position: new_position.abs().to_string(),
                        limit: limit.to_string(),
                    });
                }
            } else if self.config.max_position_size.is_positive() && new_position.abs() > self.config.max_position_size {
                return Err(RiskError::PositionLimitExceeded {
                    asset: base,
                    new_position: new_position.abs().to_string(),
                    limit: self.config.max_position_size.to_string(),
                });
            }
        }

        if self.open_orders(&request.symbol) >= self.config.max_open_orders {
            return Err(RiskError::MaxOpenOrdersReached {
                symbol: request.symbol.clone(),
                max: self.config.max_open_orders,
            });
        }

        if self.config.max_daily_loss.is_positive() {
            let pnl = self.daily_pnl.load();
            if pnl.is_negative() && pnl.abs() > self.config.max_daily_loss {
                return Err(RiskError::DailyLossExceeded {
                    loss: pnl.abs().to_string(),
                    max: self.config.max_daily_loss.to_string(),
                });
            }
        }

        Ok(())
    }

    pub fn update_position(&self, asset: &str, quantity: Decimal, side: Side) {
        let mut entry = self.positions.entry(asset.to_string()).or_insert(Decimal::zero());
        *entry = match side {
            Side::Buy => *entry + quantity,
            Side::Sell => *entry - quantity,
        };
    }

    pub fn position(&self, asset: &str) -> Decimal {
        self.positions.get(asset).map(|e| *e.value()).unwrap_or(Decimal::zero())
    }

    pub fn positions(&self) -> HashMap<String, Decimal> {
        self.positions.iter().map(|e| (e.key().clone(), *e.value())).collect()
    }

    /// Accumulate PnL; if `kill_switch_on_loss` is enabled and the
    /// accumulated loss exceeds `max_daily_loss`, set the kill switch.
    pub fn update_pnl(&self, pnl: Decimal) {
        let mut current = self.daily_pnl.load();
        let updated = loop {
            let updated = current + pnl;
            match self.daily_pnl.compare_exchange(current, updated) {
                Ok(_) => break updated,
                Err(actual) => current = actual,
            }
        };

        if self.config.kill_switch_on_loss
            && self.config.max_daily_loss.is_positive()
            && updated.is_negative()
            && updated.abs() > self.config.max_daily_loss
        {
            warn!(loss = %updated, "daily loss limit breached, engaging kill switch");
            self.kill();
        }
    }

    pub fn daily_pnl(&self) -> Decimal {
        self.daily_pnl.load()
    }

    pub fn reset_daily_pnl(&self) {
        self.daily_pnl.store(Decimal::zero());
    }

    pub fn order_opened(&self, symbol: &str) {
        *self.open_orders.entry(symbol.to_string()).or_insert(0) += 1;
    }

    pub fn order_closed(&self, symbol: &str) {
        if let Some(mut count) = self.open_orders.get_mut(symbol) {
            if *count > 0 {
                *count -= 1;
            }
        }
    }

    pub fn open_orders(&self, symbol: &str) -> u32 {
        self.open_orders.get(symbol).map(|e| *e.value()).unwrap_or(0)
    }
}
