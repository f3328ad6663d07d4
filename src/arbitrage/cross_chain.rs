//! Picks a transport between two chains for settling both legs of an
//! opportunity, and estimates its latency and bridging cost.

use std::collections::{BTreeSet, HashMap};
use std::sync::Mutex;

use crate::decimal::Decimal;

use super::types::UnifiedOpportunity;

const WARP_LATENCY_MS: i64 = 500;
const CEX_API_LATENCY_MS: i64 = 100;
const TELEPORT_PROCESSING_MS: i64 = 10_000;
const UNKNOWN_CHAIN_LATENCY_MS: i64 = 3_600_000;
const WARP_COST_USD: f64 = 0.001;
const TELEPORT_FALLBACK_COST_USD: f64 = 1.0;

/// The kind of chain a venue settles on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainType {
    LuxSubnet,
    Evm,
    Cex,
}

/// Static facts about one settlement chain.
#[derive(Debug, Clone)]
pub struct ChainInfo {
    pub chain_id: String,
    pub display_name: String,
    pub chain_type: ChainType,
    pub block_time_ms: i64,
    pub finality_ms: i64,
    pub warp_supported: bool,
    pub teleport_supported: bool,
    pub venues: BTreeSet<String>,
}

/// The transport [`CrossChainRouter::determine_transport`] picks for a
/// source/destination chain pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrossChainTransport {
    Direct,
    Warp,
    CexApi,
    Teleport,
}

/// Queried for a Teleport bridging fee quote; falls back to a flat estimate
/// on error, matching [`CrossChainRouter::estimate_cost`]'s source behavior.
pub trait TeleportFeeEstimator: Send + Sync {
    fn estimate_bridge_fee(&self, dest_chain: &str, token: &str, amount: Decimal) -> Result<Decimal, String>;
}

/// A [`UnifiedOpportunity`] annotated with the chosen transport and its
/// latency/cost impact on net profit.
#[derive(Debug, Clone)]
pub struct EnhancedOpportunity {
    pub base: UnifiedOpportunity,
    pub transport: CrossChainTransport,
    pub estimated_latency_ms: i64,
    pub bridge_cost: Decimal,
    pub adjusted_net_profit: Decimal,
}

/// Configuration for [`CrossChainRouter`]: the known chains, keyed by chain
/// id, plus feature flags for the two bridging transports.
#[derive(Debug, Clone, Default)]
pub struct CrossChainConfig {
    pub chains: HashMap<String, ChainInfo>,
    pub warp_enabled: bool,
    pub teleport_enabled: bool,
}

/// Chooses a settlement transport between two chains and estimates its
/// latency and USD cost.
pub struct CrossChainRouter {
    config: CrossChainConfig,
    teleport_client: Mutex<Option<Box<dyn TeleportFeeEstimator>>>,
}

impl CrossChainRouter {
    pub fn new(config: CrossChainConfig) -> Self {
        CrossChainRouter {
            config,
            teleport_client: Mutex::new(None),
        }
    }

    pub fn set_teleport_client(&self, client: Box<dyn TeleportFeeEstimator>) {
        *self.teleport_client.lock().unwrap_or_else(|e| e.into_inner()) = Some(client);
    }

    /// same chain => Direct; either endpoint a CEX => CexApi; both Lux
    /// subnets with warp enabled => Warp; both teleport-capable with
    /// teleport enabled => Teleport; else Direct as fallback.
    pub fn determine_transport(&self, source_chain: &str, dest_chain: &str) -> CrossChainTransport {
        if source_chain == dest_chain {
            return CrossChainTransport::Direct;
        }

        let src = self.config.chains.get(source_chain);
        let dst = self.config.chains.get(dest_chain);

        if src.is_some_and(|c| c.chain_type == ChainType::Cex) || dst.is_some_and(|c| c.chain_type == ChainType::Cex) {
            return CrossChainTransport::CexApi;
        }

        if let (Some(src), Some(dst)) = (src, dst) {
            if src.chain_type == ChainType::LuxSubnet
                && dst.chain_type == ChainType::LuxSubnet
                && src.warp_supported
                && dst.warp_supported
                && self.config.warp_enabled
            {
                return CrossChainTransport::Warp;
            }

            if src.teleport_supported && dst.teleport_supported && self.config.teleport_enabled {
                return CrossChainTransport::Teleport;
            }
        }

        CrossChainTransport::Direct
    }

    pub fn estimate_latency(&self, source_chain: &str, dest_chain: &str) -> i64 {
        match self.determine_transport(source_chain, dest_chain) {
            CrossChainTransport::Direct => 0,
            CrossChainTransport::Warp => WARP_LATENCY_MS,
            CrossChainTransport::CexApi => CEX_API_LATENCY_MS,
            CrossChainTransport::Teleport => self
                .config
                .chains
                .get(source_chain)
                .map(|c| c.finality_ms + TELEPORT_PROCESSING_MS)
                .unwrap_or(UNKNOWN_CHAIN_LATENCY_MS),
        }
    }

    pub fn estimate_cost(&self, source_chain: &str, dest_chain: &str, token: &str, amount: Decimal) -> Decimal {
        match self.determine_transport(source_chain, dest_chain) {
            CrossChainTransport::Direct => Decimal::zero(),
            CrossChainTransport::Warp => Decimal::from_f64(WARP_COST_USD),
            CrossChainTransport::CexApi => Decimal::zero(),
            CrossChainTransport::Teleport => {
                let client = self.teleport_client.lock().unwrap_or_else(|e| e.into_inner());
                match client.as_ref() {
                    Some(client) => client
                        .estimate_bridge_fee(dest_chain, token, amount)
                        .unwrap_or_else(|_| Decimal::from_f64(TELEPORT_FALLBACK_COST_USD)),
                    None => Decimal::from_f64(TELEPORT_FALLBACK_COST_USD),
                }
            }
        }
    }

    /// Maps a venue name back to the chain id that hosts it, falling back to
    /// the venue name itself if no chain lists it.
    pub fn venue_to_chain(&self, venue: &str) -> String {
        for (chain_id, info) in &self.config.chains {
            if info.venues.contains(venue) {
                return chain_id.clone();
            }
        }
        venue.to_string()
    }

    pub fn enhance_opportunity(&self, opportunity: UnifiedOpportunity) -> EnhancedOpportunity {
        let buy_chain = self.venue_to_chain(&opportunity.buy_venue);
        let sell_chain = self.venue_to_chain(&opportunity.sell_venue);

        let transport = self.determine_transport(&buy_chain, &sell_chain);
        let estimated_latency_ms = self.estimate_latency(&buy_chain, &sell_chain);
        let bridge_cost = self.estimate_cost(&buy_chain, &sell_chain, &opportunity.symbol, opportunity.max_size);
        let adjusted_net_profit = opportunity.net_profit - bridge_cost;

        EnhancedOpportunity {
            base: opportunity,
            transport,
            estimated_latency_ms,
            bridge_cost,
            adjusted_net_profit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lux_chain(id: &str, venues: &[&str]) -> ChainInfo {
        ChainInfo {
            chain_id: id.to_string(),
            display_name: id.to_string(),
            chain_type: ChainType::LuxSubnet,
            block_time_ms: 2_000,
            finality_ms: 4_000,
            warp_supported: true,
            teleport_supported: true,
            venues: venues.iter().map(|v| v.to_string()).collect(),
        }
    }

    fn cex_chain(id: &str, venues: &[&str]) -> ChainInfo {
        ChainInfo {
            chain_id: id.to_string(),
            display_name: id.to_string(),
            chain_type: ChainType::Cex,
            block_time_ms: 0,
            finality_ms: 0,
            warp_supported: false,
            teleport_supported: false,
            venues: venues.iter().map(|v| v.to_string()).collect(),
        }
    }

    fn router_with(chains: Vec<ChainInfo>, warp_enabled: bool, teleport_enabled: bool) -> CrossChainRouter {
        let mut config = CrossChainConfig { warp_enabled, teleport_enabled, ..Default::default() };
        for chain in chains {
            config.chains.insert(chain.chain_id.clone(), chain);
        }
        CrossChainRouter::new(config)
    }

    #[test]
    fn same_chain_is_direct() {
        let router = router_with(vec![lux_chain("lux-a", &["venueA"])], true, true);
        assert_eq!(router.determine_transport("lux-a", "lux-a"), CrossChainTransport::Direct);
    }

    #[test]
    fn either_endpoint_cex_uses_cex_api() {
        let router = router_with(
            vec![lux_chain("lux-a", &["venueA"]), cex_chain("binance", &["venueB"])],
            true,
            true,
        );
        assert_eq!(router.determine_transport("lux-a", "binance"), CrossChainTransport::CexApi);
        assert_eq!(router.determine_transport("binance", "lux-a"), CrossChainTransport::CexApi);
    }

    #[test]
    fn two_lux_subnets_with_warp_enabled_use_warp() {
        let router = router_with(
            vec![lux_chain("lux-a", &["venueA"]), lux_chain("lux-b", &["venueB"])],
            true,
            true,
        );
        assert_eq!(router.determine_transport("lux-a", "lux-b"), CrossChainTransport::Warp);
        assert_eq!(router.estimate_latency("lux-a", "lux-b"), WARP_LATENCY_MS);
    }

    #[test]
    fn warp_disabled_falls_through_to_teleport() {
        let router = router_with(
            vec![lux_chain("lux-a", &["venueA"]), lux_chain("lux-b", &["venueB"])],
            false,
            true,
        );
        assert_eq!(router.determine_transport("lux-a", "lux-b"), CrossChainTransport::Teleport);
        assert_eq!(router.estimate_latency("lux-a", "lux-b"), 4_000 + TELEPORT_PROCESSING_MS);
    }

    #[test]
    fn unknown_chains_fall_back_to_direct() {
        let router = router_with(Vec::new(), true, true);
        assert_eq!(router.determine_transport("ghost-a", "ghost-b"), CrossChainTransport::Direct);
        assert_eq!(router.estimate_cost("ghost-a", "ghost-b", "BTC", Decimal::from_i64(1)), Decimal::zero());
    }

    #[test]
    fn teleport_without_client_uses_fallback_cost() {
        let router = router_with(
            vec![lux_chain("lux-a", &["venueA"]), lux_chain("lux-b", &["venueB"])],
            false,
            true,
        );
        let cost = router.estimate_cost("lux-a", "lux-b", "BTC", Decimal::from_i64(1));
        assert_eq!(cost, Decimal::from_f64(TELEPORT_FALLBACK_COST_USD));
    }

    #[test]
    fn enhance_opportunity_subtracts_bridge_cost() {
        let router = router_with(
            vec![lux_chain("lux-a", &["venueA"]), lux_chain("lux-b", &["venueB"])],
            true,
            true,
        );
        let opp = UnifiedOpportunity {
            id: "arb-1".to_string(),
            symbol: "BTC-USDC".to_string(),
            created_at_ms: 0,
            expires_at_ms: 5_000,
            buy_venue: "venueA".to_string(),
            buy_price: Decimal::from_i64(100),
            buy_size: Decimal::from_i64(1),
            sell_venue: "venueB".to_string(),
            sell_price: Decimal::from_i64(101),
            sell_size: Decimal::from_i64(1),
            spread: Decimal::from_i64(1),
            spread_bps: Decimal::from_i64(100),
            max_size: Decimal::from_i64(1),
            gross_profit: Decimal::from_i64(1),
            est_fees: Decimal::zero(),
            net_profit: Decimal::from_i64(1),
            confidence: 0.8,
            latency_ms: 0,
        };
        let enhanced = router.enhance_opportunity(opp);
        assert_eq!(enhanced.transport, CrossChainTransport::Warp);
        assert_eq!(enhanced.bridge_cost, Decimal::from_f64(WARP_COST_USD));
        assert_eq!(enhanced.adjusted_net_profit, Decimal::from_i64(1) - Decimal::from_f64(WARP_COST_USD));
    }
}
