//! RAII guard for the open-order count.

use super::RiskManager;

/// Increments a symbol's open-order count on construction and decrements it
/// on drop, unless [`release`](Self::release) was called first.
///
/// The decrement-once guarantee comes from consuming `self` on drop (there
/// is no way to run the decrement twice) and from `released` gating it:
/// once set, drop is a no-op.
pub struct ScopedOrderTracker<'a> {
    risk_manager: &'a RiskManager,
    symbol: String,
    released: bool,
}

impl<'a> ScopedOrderTracker<'a> {
    pub fn new(risk_manager: &'a RiskManager, symbol: impl Into<String>) -> Self {
        let symbol = symbol.into();
        risk_manager.order_opened(&symbol);
        ScopedOrderTracker {
            risk_manager,
            symbol,
            released: false,
        }
    }

    /// Disarm the tracker: `drop` will not decrement the open-order count.
    pub fn release(&mut self) {
        self.released = true;
    }
}

impl Drop for ScopedOrderTracker<'_> {
    fn drop(&mut self) {
        if !self.released {
            self.risk_manager.order_closed(&self.symbol);
        }
    }
}
