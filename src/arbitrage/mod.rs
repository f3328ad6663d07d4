//! Opportunistic cross-venue arbitrage: an oracle-vs-stale-venue detector
//! and a scanner/executor pipeline over the aggregated book, plus a
//! cross-chain transport chooser for settling both legs.

mod cross_chain;
mod lx_first;
mod types;
mod unified;

pub use cross_chain::{
    ChainInfo, ChainType, CrossChainConfig, CrossChainRouter, CrossChainTransport, EnhancedOpportunity,
    TeleportFeeEstimator,
};
pub use lx_first::{LxFirstArbitrage, LxFirstCallback, LxFirstConfig};
pub use types::{
    ExecutionStatus, LxFirstOpportunity, LxPrice, StaleSide, UnifiedArbStats, UnifiedExecution, UnifiedOpportunity,
    VenuePrice,
};
pub use unified::{UnifiedArbConfig, UnifiedArbitrage, UnifiedCallback};
