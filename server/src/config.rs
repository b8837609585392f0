//! Simulation settings read from the environment

use std::env;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use rand::seq::SliceRandom;

/// Accounts before the oracle block: owner/first airline, five airlines,
/// five passengers.
pub const RESERVED_ACCOUNTS: usize = 11;

const STATUS_CODES: [u32; 6] = [
    flight_surety::STATUS_CODE_UNKNOWN,
    flight_surety::STATUS_CODE_ON_TIME,
    flight_surety::STATUS_CODE_LATE_AIRLINE,
    flight_surety::STATUS_CODE_LATE_WEATHER,
    flight_surety::STATUS_CODE_LATE_TECHNICAL,
    flight_surety::STATUS_CODE_LATE_OTHER,
];

/// How pool oracles pick the status code they report.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusMode {
    /// Every oracle reports `ORACLE_STATUS_CODE`.
    Fixed(u32),
    /// Every oracle draws one of the known status codes per request.
    Random,
}

impl StatusMode {
    pub fn pick(&self) -> u32 {
        match self {
            StatusMode::Fixed(code) => *code,
            StatusMode::Random => *STATUS_CODES
                .choose(&mut rand::thread_rng())
                .unwrap_or(&flight_surety::STATUS_CODE_UNKNOWN),
        }
    }
}

#[derive(Clone, Debug)]
pub struct SimulationConfig {
    pub port: u16,
    pub accounts: usize,
    pub oracle_count: usize,
    pub status_mode: StatusMode,
    /// Token balance minted to every sandbox account, in stroops.
    pub starting_balance: i128,
    pub cors_allowed_origins: Vec<String>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            accounts: 40,
            oracle_count: 20,
            status_mode: StatusMode::Fixed(flight_surety::STATUS_CODE_LATE_AIRLINE),
            starting_balance: 10_000 * flight_surety::UNIT,
            cors_allowed_origins: vec!["http://localhost:8000".to_string()],
        }
    }
}

impl SimulationConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the configuration from any variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let status_code = parse_var(
            &lookup,
            "ORACLE_STATUS_CODE",
            flight_surety::STATUS_CODE_LATE_AIRLINE,
        )?;
        if !flight_surety::is_known_status_code(status_code) {
            bail!("ORACLE_STATUS_CODE {} is not a known flight status", status_code);
        }

        let status_mode = match lookup("ORACLE_STATUS_MODE")
            .unwrap_or_else(|| "fixed".to_string())
            .to_lowercase()
            .as_str()
        {
            "fixed" => StatusMode::Fixed(status_code),
            "random" => StatusMode::Random,
            other => bail!("ORACLE_STATUS_MODE must be `fixed` or `random`, got `{}`", other),
        };

        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .map(|origins| {
                origins
                    .split(',')
                    .map(|origin| origin.trim().to_string())
                    .filter(|origin| !origin.is_empty())
                    .collect()
            })
            .unwrap_or(defaults.cors_allowed_origins);

        let config = Self {
            port: parse_var(&lookup, "PORT", defaults.port)?,
            accounts: parse_var(&lookup, "SANDBOX_ACCOUNTS", defaults.accounts)?,
            oracle_count: parse_var(&lookup, "ORACLE_COUNT", defaults.oracle_count)?,
            status_mode,
            starting_balance: parse_var(
                &lookup,
                "SANDBOX_STARTING_BALANCE",
                defaults.starting_balance,
            )?,
            cors_allowed_origins,
        };
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.oracle_count == 0 {
            bail!("ORACLE_COUNT must be at least 1");
        }
        if self.accounts < RESERVED_ACCOUNTS + self.oracle_count {
            bail!(
                "SANDBOX_ACCOUNTS must be at least {} for {} oracles",
                RESERVED_ACCOUNTS + self.oracle_count,
                self.oracle_count
            );
        }
        if self.starting_balance <= 0 {
            bail!("SANDBOX_STARTING_BALANCE must be positive");
        }
        Ok(())
    }

    /// Account indexes of the oracle pool: the last `oracle_count` accounts.
    pub fn oracle_accounts(&self) -> std::ops::Range<usize> {
        self.accounts - self.oracle_count..self.accounts
    }
}

fn parse_var<F, T>(lookup: &F, name: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a number, got `{}`", name, raw)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = SimulationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.oracle_accounts(), 20..40);
    }

    fn lookup<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |name| {
            vars.iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| value.to_string())
        }
    }

    #[test]
    fn unset_variables_fall_back_to_defaults() {
        let config = SimulationConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.oracle_count, 20);
        assert_eq!(
            config.status_mode,
            StatusMode::Fixed(flight_surety::STATUS_CODE_LATE_AIRLINE)
        );
        assert_eq!(config.cors_allowed_origins, vec!["http://localhost:8000"]);
    }

    #[test]
    fn parses_status_mode() {
        let config = SimulationConfig::from_lookup(lookup(&[
            ("ORACLE_STATUS_MODE", "Fixed"),
            ("ORACLE_STATUS_CODE", "10"),
        ]))
        .unwrap();
        assert_eq!(config.status_mode, StatusMode::Fixed(10));

        let config =
            SimulationConfig::from_lookup(lookup(&[("ORACLE_STATUS_MODE", "random")])).unwrap();
        assert_eq!(config.status_mode, StatusMode::Random);

        assert!(
            SimulationConfig::from_lookup(lookup(&[("ORACLE_STATUS_MODE", "sometimes")])).is_err()
        );
    }

    #[test]
    fn rejects_unknown_status_code() {
        assert!(SimulationConfig::from_lookup(lookup(&[("ORACLE_STATUS_CODE", "25")])).is_err());
        assert!(SimulationConfig::from_lookup(lookup(&[("ORACLE_STATUS_CODE", "late")])).is_err());
    }

    #[test]
    fn splits_cors_origins() {
        let config = SimulationConfig::from_lookup(lookup(&[(
            "CORS_ALLOWED_ORIGINS",
            "http://localhost:8000, https://dapp.example ,,",
        )]))
        .unwrap();
        assert_eq!(
            config.cors_allowed_origins,
            vec!["http://localhost:8000", "https://dapp.example"]
        );
    }

    #[test]
    fn rejects_oracle_pool_larger_than_sandbox() {
        let result = SimulationConfig::from_lookup(lookup(&[
            ("SANDBOX_ACCOUNTS", "25"),
            ("ORACLE_COUNT", "20"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn random_mode_draws_known_codes() {
        for _ in 0..100 {
            let code = StatusMode::Random.pick();
            assert!(flight_surety::is_known_status_code(code));
        }
        assert_eq!(StatusMode::Fixed(30).pick(), 30);
    }

    #[test]
    fn rejects_too_few_accounts() {
        let config = SimulationConfig {
            accounts: 15,
            ..SimulationConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
