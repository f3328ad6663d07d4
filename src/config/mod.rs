//! Configuration file loading: a minimal TOML subset (section headers,
//! `key = value`, quoted strings, booleans, integers, decimals) is
//! sufficient for this system's needs (see [`Config::from_str`]).

mod error;

pub use error::ConfigError;

use std::collections::HashMap;

use crate::decimal::Decimal;

/// `[general]`.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneralConfig {
    pub log_level: String,
    pub timeout_ms: i64,
    pub smart_routing: bool,
    pub venue_priority: Vec<String>,
    pub min_improvement_bps: Decimal,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        GeneralConfig {
            log_level: "info".to_string(),
            timeout_ms: 5_000,
            smart_routing: false,
            venue_priority: Vec::new(),
            min_improvement_bps: Decimal::from_i64(5),
        }
    }
}

/// `[risk]`. Mirrors [`crate::risk::RiskConfig`]'s shape; `position_limits`
/// can only be populated through the builder methods below, since a
/// per-asset map has no natural `key = value` expression in the file format.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskSection {
    pub enabled: bool,
    pub max_order_size: Decimal,
    pub max_position_size: Decimal,
    pub max_daily_loss: Decimal,
    pub max_open_orders: u32,
    pub kill_switch_enabled: bool,
    pub position_limits: HashMap<String, Decimal>,
}

impl Default for RiskSection {
    fn default() -> Self {
        RiskSection {
            enabled: true,
            max_order_size: Decimal::zero(),
            max_position_size: Decimal::zero(),
            max_daily_loss: Decimal::zero(),
            max_open_orders: 0,
            kill_switch_enabled: false,
            position_limits: HashMap::new(),
        }
    }
}

/// `[native.<name>]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NativeVenueConfig {
    pub venue_type: String,
    pub api_url: String,
    pub ws_url: String,
    pub api_key: String,
    pub api_secret: String,
    pub wallet_address: String,
    pub private_key: String,
    pub network: String,
    pub chain_id: i64,
    pub streaming: bool,
}

/// `[ccxt.<name>]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CcxtConfig {
    pub exchange_id: String,
    pub api_key: String,
    pub api_secret: String,
    pub password: String,
    pub sandbox: bool,
    pub rate_limit: bool,
}

/// `[hummingbot.<name>]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HummingbotConfig {
    pub host: String,
    pub port: i64,
    pub https: bool,
    pub connector: String,
    pub chain: String,
    pub network: String,
    pub wallet_address: String,
}

/// The full parsed contents of a configuration file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub general: GeneralConfig,
    pub risk: RiskSection,
    pub native: HashMap<String, NativeVenueConfig>,
    pub ccxt: HashMap<String, CcxtConfig>,
    pub hummingbot: HashMap<String, HummingbotConfig>,
}

impl Config {
    /// Registers (or replaces) a native venue section, mirroring
    /// `config.hpp`'s `with_native` builder method.
    pub fn with_native(mut self, name: impl Into<String>, cfg: NativeVenueConfig) -> Self {
        self.native.insert(name.into(), cfg);
        self
    }

    /// Registers (or replaces) a CCXT-bridged exchange section.
    pub fn with_ccxt(mut self, name: impl Into<String>, cfg: CcxtConfig) -> Self {
        self.ccxt.insert(name.into(), cfg);
        self
    }

    /// Registers (or replaces) a Hummingbot Gateway connector section.
    pub fn with_hummingbot(mut self, name: impl Into<String>, cfg: HummingbotConfig) -> Self {
        self.hummingbot.insert(name.into(), cfg);
        self
    }

    /// Toggles smart order routing.
    pub fn enable_smart_routing(mut self, enabled: bool) -> Self {
        self.general.smart_routing = enabled;
        self
    }

    /// Sets the per-adapter-call timeout in milliseconds.
    pub fn set_timeout(mut self, ms: i64) -> Self {
        self.general.timeout_ms = ms;
        self
    }

    /// Sets the preferred venue name ordering for this configuration.
    pub fn set_venue_priority(mut self, priority: Vec<String>) -> Self {
        self.general.venue_priority = priority;
        self
    }

    /// Toggles risk checks on order placement.
    pub fn enable_risk_management(mut self, enabled: bool) -> Self {
        self.risk.enabled = enabled;
        self
    }

    /// Sets the per-order size cap.
    pub fn set_max_order_size(mut self, size: Decimal) -> Self {
        self.risk.max_order_size = size;
        self
    }

    /// Sets the per-symbol absolute position cap.
    pub fn set_max_position_size(mut self, size: Decimal) -> Self {
        self.risk.max_position_size = size;
        self
    }

    /// Sets the daily realized-loss kill threshold.
    pub fn set_max_daily_loss(mut self, loss: Decimal) -> Self {
        self.risk.max_daily_loss = loss;
        self
    }

    /// Sets a per-asset position limit, overriding `max_position_size` for
    /// that asset only.
    pub fn set_position_limit(mut self, asset: impl Into<String>, limit: Decimal) -> Self {
        self.risk.position_limits.insert(asset.into(), limit);
        self
    }

    /// Reads and parses a config file from disk.
    pub fn from_file(path: &str) -> Result<Config, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::Io(path.to_string()))?;
        Config::from_str(&content)
    }

    /// Parses the minimal TOML subset this system understands: `[section]`
    /// and `[section.name]` headers, `key = value` pairs, `#` line
    /// comments, quoted strings, `true`/`false`, integers, and decimals.
    /// Unrecognized keys within a known section are ignored; unrecognized
    /// sections are ignored entirely.
    pub fn from_str(content: &str) -> Result<Config, ConfigError> {
        let mut config = Config::default();
        let mut section = String::new();
        let mut subsection = String::new();

        for raw_line in content.lines() {
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some(stripped) = line.strip_prefix('[') {
                if let Some(end) = stripped.find(']') {
                    let header = &stripped[..end];
                    match header.split_once('.') {
                        Some((sec, sub)) => {
                            section = sec.to_string();
                            subsection = sub.to_string();
                        }
                        None => {
                            section = header.to_string();
                            subsection.clear();
                        }
                    }
                }
                continue;
            }

            let Some((key, value)) = line.split_once('=') else { continue };
            let key = key.trim();
            let value = unquote(value.trim());

            config.apply(&section, &subsection, key, value)?;
        }

        Ok(config)
    }

    fn apply(&mut self, section: &str, subsection: &str, key: &str, value: &str) -> Result<(), ConfigError> {
        match section {
            "general" => match key {
                "log_level" => self.general.log_level = value.to_string(),
                "timeout_ms" => self.general.timeout_ms = parse_int(section, key, value)?,
                "smart_routing" => self.general.smart_routing = value == "true",
                "min_improvement_bps" => self.general.min_improvement_bps = Decimal::parse_lenient(value),
                _ => {}
            },
            "risk" => match key {
                "enabled" => self.risk.enabled = value == "true",
                "max_position_size" => self.risk.max_position_size = Decimal::parse_lenient(value),
                "max_order_size" => self.risk.max_order_size = Decimal::parse_lenient(value),
                "max_daily_loss" => self.risk.max_daily_loss = Decimal::parse_lenient(value),
                "max_open_orders" => self.risk.max_open_orders = parse_int(section, key, value)? as u32,
                "kill_switch_enabled" => self.risk.kill_switch_enabled = value == "true",
                _ => {}
            },
            "native" if !subsection.is_empty() => {
                let entry = self.native.entry(subsection.to_string()).or_default();
                match key {
                    "venue_type" => entry.venue_type = value.to_string(),
                    "api_url" => entry.api_url = value.to_string(),
                    "ws_url" => entry.ws_url = value.to_string(),
                    "api_key" => entry.api_key = value.to_string(),
                    "api_secret" => entry.api_secret = value.to_string(),
                    "wallet_address" => entry.wallet_address = value.to_string(),
                    "private_key" => entry.private_key = value.to_string(),
                    "network" => entry.network = value.to_string(),
                    "chain_id" => entry.chain_id = parse_int(section, key, value)?,
                    "streaming" => entry.streaming = value == "true",
                    _ => {}
                }
            }
            "ccxt" if !subsection.is_empty() => {
                let entry = self.ccxt.entry(subsection.to_string()).or_default();
                match key {
                    "exchange_id" => entry.exchange_id = value.to_string(),
                    "api_key" => entry.api_key = value.to_string(),
                    "api_secret" => entry.api_secret = value.to_string(),
                    "password" => entry.password = value.to_string(),
                    "sandbox" => entry.sandbox = value == "true",
                    "rate_limit" => entry.rate_limit = value == "true",
                    _ => {}
                }
            }
            "hummingbot" if !subsection.is_empty() => {
                let entry = self.hummingbot.entry(subsection.to_string()).or_default();
                match key {
                    "host" => entry.host = value.to_string(),
                    "port" => entry.port = parse_int(section, key, value)?,
                    "https" => entry.https = value == "true",
                    "connector" => entry.connector = value.to_string(),
                    "chain" => entry.chain = value.to_string(),
                    "network" => entry.network = value.to_string(),
                    "wallet_address" => entry.wallet_address = value.to_string(),
                    _ => {}
                }
            }
            _ => {}
        }
        Ok(())
    }
}

fn unquote(s: &str) -> &str {
    if s.len() >= 2 && s.starts_with('"') && s.ends_with('"') {
        &s[1..s.len() - 1]
    } else {
        s
    }
}

fn parse_int(section: &str, key: &str, value: &str) -> Result<i64, ConfigError> {
    value.parse::<i64>().map_err(|_| ConfigError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        [general]
        log_level = "debug"
        timeout_ms = 2500
        smart_routing = true
        min_improvement_bps = 7.5

        [risk]
        enabled = true
        max_order_size = 10.5
        max_daily_loss = 500
        max_open_orders = 20
        kill_switch_enabled = true

        [native.lx]
        api_url = "https://lx.example/api"
        streaming = true
        chain_id = 96369

        [ccxt.binance]
        exchange_id = "binance"
        sandbox = false

        [hummingbot.gateway]
        host = "localhost"
        port = 15888
    "#;

    #[test]
    fn parses_general_section() {
        let config = Config::from_str(SAMPLE).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.general.timeout_ms, 2500);
        assert!(config.general.smart_routing);
        assert_eq!(config.general.min_improvement_bps, Decimal::from_f64(7.5));
    }

    #[test]
    fn parses_risk_section() {
        let config = Config::from_str(SAMPLE).unwrap();
        assert!(config.risk.enabled);
        assert_eq!(config.risk.max_order_size, Decimal::from_f64(10.5));
        assert_eq!(config.risk.max_daily_loss, Decimal::from_i64(500));
        assert_eq!(config.risk.max_open_orders, 20);
        assert!(config.risk.kill_switch_enabled);
    }

    #[test]
    fn parses_subsectioned_venues() {
        let config = Config::from_str(SAMPLE).unwrap();
        let lx = config.native.get("lx").unwrap();
        assert_eq!(lx.api_url, "https://lx.example/api");
        assert!(lx.streaming);
        assert_eq!(lx.chain_id, 96369);

        let binance = config.ccxt.get("binance").unwrap();
        assert_eq!(binance.exchange_id, "binance");
        assert!(!binance.sandbox);

        let gateway = config.hummingbot.get("gateway").unwrap();
        assert_eq!(gateway.host, "localhost");
        assert_eq!(gateway.port, 15888);
    }

    #[test]
    fn unknown_sections_and_keys_are_ignored() {
        let config = Config::from_str("[mystery]\nfoo = \"bar\"\n[general]\nbogus_key = 1\n").unwrap();
        assert_eq!(config.general, GeneralConfig::default());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = Config::from_file("/nonexistent/path/lx-trading.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn builder_chain_assembles_a_config() {
        let config = Config::default()
            .with_native("lx", NativeVenueConfig {
                api_url: "https://lx.example/api".to_string(),
                ..Default::default()
            })
            .with_ccxt("binance", CcxtConfig {
                exchange_id: "binance".to_string(),
                ..Default::default()
            })
            .enable_smart_routing(true)
            .set_timeout(10_000)
            .set_venue_priority(vec!["lx".to_string(), "binance".to_string()])
            .enable_risk_management(true)
            .set_max_order_size(Decimal::from_i64(50))
            .set_max_position_size(Decimal::from_i64(500))
            .set_max_daily_loss(Decimal::from_i64(1_000))
            .set_position_limit("BTC", Decimal::from_i64(5));

        assert_eq!(config.native.get("lx").unwrap().api_url, "https://lx.example/api");
        assert_eq!(config.ccxt.get("binance").unwrap().exchange_id, "binance");
        assert!(config.general.smart_routing);
        assert_eq!(config.general.timeout_ms, 10_000);
        assert_eq!(config.general.venue_priority, vec!["lx".to_string(), "binance".to_string()]);
        assert!(config.risk.enabled);
        assert_eq!(config.risk.max_order_size, Decimal::from_i64(50));
        assert_eq!(config.risk.max_position_size, Decimal::from_i64(500));
        assert_eq!(config.risk.max_daily_loss, Decimal::from_i64(1_000));
        assert_eq!(config.risk.position_limits.get("BTC"), Some(&Decimal::from_i64(5)));
    }
}
