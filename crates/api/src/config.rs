//! Application configuration loaded from environment variables.

use std::time::Duration;

use checkout::GatewayConfig;

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST` — bind address (default: `"0.0.0.0"`)
/// - `PORT` — listen port (default: `3000`)
/// - `RUST_LOG` — tracing filter directive (default: `"info"`)
/// - `PAYMENT_SUCCESS_RATE` — simulated charge success probability (default: `0.7`)
/// - `PAYMENT_DELAY_MS` — simulated processor latency in ms (default: `500`)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub payment_success_rate: f64,
    pub payment_delay: Duration,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("HOST").unwrap_or(defaults.host),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            log_level: std::env::var("RUST_LOG").unwrap_or(defaults.log_level),
            payment_success_rate: std::env::var("PAYMENT_SUCCESS_RATE")
                .ok()
                .and_then(|r| r.parse().ok())
                .unwrap_or(defaults.payment_success_rate),
            payment_delay: std::env::var("PAYMENT_DELAY_MS")
                .ok()
                .and_then(|ms| ms.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.payment_delay),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Payment gateway behaviour derived from this configuration.
    pub fn gateway_config(&self) -> GatewayConfig {
        GatewayConfig {
            success_rate: self.payment_success_rate,
            processing_delay: self.payment_delay,
            ..GatewayConfig::default()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            payment_success_rate: 0.7,
            payment_delay: Duration::from_millis(500),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let config = Config::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.payment_success_rate, 0.7);
        assert_eq!(config.payment_delay, Duration::from_millis(500));
    }

    #[test]
    fn addr_formatting() {
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 8080,
            ..Config::default()
        };
        assert_eq!(config.addr(), "127.0.0.1:8080");
    }

    #[test]
    fn gateway_config_carries_tuning() {
        let config = Config {
            payment_success_rate: 1.0,
            payment_delay: Duration::ZERO,
            ..Config::default()
        };
        let gateway = config.gateway_config();
        assert_eq!(gateway.success_rate, 1.0);
        assert_eq!(gateway.processing_delay, Duration::ZERO);
    }
}
