use dotenv::dotenv;
use std::env;
use std::net::SocketAddr;
use std::time::Duration;

const LISTEN_ADDR: &str = "MATCHBOOK_LISTEN_ADDR";
const SWEEP_INTERVAL_SECS: &str = "MATCHBOOK_SWEEP_INTERVAL_SECS";
const ALLOWED_ORIGINS: &str = "MATCHBOOK_ALLOWED_ORIGINS";

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 5;

#[derive(Clone, Debug)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub sweep_interval: Duration,
    pub allowed_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Config {
        match Self::try_from_env() {
            Ok(config) => config,
            Err(err) => panic!("{}", err),
        }
    }

    pub fn try_from_env() -> Result<Config, String> {
        // Load .env file if present
        dotenv().ok();

        let listen_addr = env::var(LISTEN_ADDR)
            .unwrap_or_else(|_| DEFAULT_LISTEN_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|_| format!("failed to parse environment variable {}", LISTEN_ADDR))?;

        let sweep_interval_secs = match env::var(SWEEP_INTERVAL_SECS) {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|_| format!("failed to parse environment variable {}", SWEEP_INTERVAL_SECS))?,
            Err(_) => DEFAULT_SWEEP_INTERVAL_SECS,
        };
        if sweep_interval_secs == 0 {
            return Err(format!("{} must be greater than zero", SWEEP_INTERVAL_SECS));
        }

        let allowed_origins = match env::var(ALLOWED_ORIGINS) {
            Ok(raw) => raw
                .split(',')
                .map(|origin| origin.trim().to_string())
                .filter(|origin| !origin.is_empty())
                .collect(),
            Err(_) => vec!["http://localhost:3000".to_string()],
        };

        Ok(Config {
            listen_addr,
            sweep_interval: Duration::from_secs(sweep_interval_secs),
            allowed_origins,
        })
    }

    pub fn default() -> Config {
        Config {
            listen_addr: DEFAULT_LISTEN_ADDR.parse().expect("default listen address"),
            sweep_interval: Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS),
            allowed_origins: vec!["http://localhost:3000".to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.listen_addr.port(), 8080);
        assert_eq!(config.sweep_interval, Duration::from_secs(5));
        assert_eq!(config.allowed_origins.len(), 1);
    }
}
