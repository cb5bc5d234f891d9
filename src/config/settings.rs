use crate::core::{LedgerParams, DEFAULT_EXCHANGE_RATIO, DEFAULT_MAX_DERIVED_SUPPLY};
use crate::error::{LedgerError, Result};
use crate::utils::Address;
use log::info;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::RwLock;

pub static GLOBAL_CONFIG: Lazy<Config> = Lazy::new(Config::new);

static DEFAULT_DATA_DIR: &str = "data";
static DEFAULT_CUSTODIAN_SEED: &str = "exchange-ledger";

const CONFIG_FILE_KEY: &str = "LEDGER_CONFIG";
const EXCHANGE_RATIO_KEY: &str = "LEDGER_EXCHANGE_RATIO";
const MAX_SUPPLY_KEY: &str = "LEDGER_MAX_SUPPLY";
const DATA_DIR_KEY: &str = "LEDGER_DATA_DIR";
const CUSTODIAN_SEED_KEY: &str = "LEDGER_CUSTODIAN_SEED";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub exchange_ratio: u64,
    pub max_derived_supply: u64,
    pub data_dir: PathBuf,
    pub custodian_seed: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            exchange_ratio: DEFAULT_EXCHANGE_RATIO,
            max_derived_supply: DEFAULT_MAX_DERIVED_SUPPLY,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            custodian_seed: String::from(DEFAULT_CUSTODIAN_SEED),
        }
    }
}

impl Settings {
    /// Defaults, then the TOML file if any, then environment variables
    pub fn load(file: Option<&Path>) -> Result<Settings> {
        let file = match file {
            Some(path) => Some(path.to_path_buf()),
            None => env::var(CONFIG_FILE_KEY).ok().map(PathBuf::from),
        };
        Self::from_sources(file.as_deref(), |key| env::var(key).ok())
    }

    pub fn from_sources<F>(file: Option<&Path>, lookup: F) -> Result<Settings>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = match file {
            Some(path) => {
                let text = fs::read_to_string(path).map_err(|e| {
                    LedgerError::Config(format!("Cannot read {}: {e}", path.display()))
                })?;
                info!("Loaded settings from {}", path.display());
                Self::from_toml(&text)?
            }
            None => Settings::default(),
        };

        if let Some(ratio) = lookup(EXCHANGE_RATIO_KEY) {
            settings.exchange_ratio = parse_var(EXCHANGE_RATIO_KEY, &ratio)?;
        }
        if let Some(cap) = lookup(MAX_SUPPLY_KEY) {
            settings.max_derived_supply = parse_var(MAX_SUPPLY_KEY, &cap)?;
        }
        if let Some(dir) = lookup(DATA_DIR_KEY) {
            settings.data_dir = PathBuf::from(dir);
        }
        if let Some(seed) = lookup(CUSTODIAN_SEED_KEY) {
            settings.custodian_seed = seed;
        }

        settings.validate()?;
        Ok(settings)
    }

    pub fn from_toml(text: &str) -> Result<Settings> {
        let settings: Settings = toml::from_str(text)?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.exchange_ratio == 0 {
            return Err(LedgerError::Config(
                "exchange_ratio must be a positive integer".to_string(),
            ));
        }
        if self.custodian_seed.trim().is_empty() {
            return Err(LedgerError::Config(
                "custodian_seed must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn params(&self) -> Result<LedgerParams> {
        LedgerParams::new(self.exchange_ratio, self.max_derived_supply)
    }

    pub fn custodian(&self) -> Address {
        Address::from_seed(&self.custodian_seed)
    }
}

fn parse_var<T: FromStr>(key: &str, raw: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| LedgerError::Config(format!("{key}={raw}: {e}")))
}

/// Process-wide settings, replaceable once the CLI has parsed its flags
pub struct Config {
    inner: RwLock<Settings>,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Config {
        let settings = Settings::load(None).unwrap_or_else(|e| {
            log::warn!("Falling back to default settings: {e}");
            Settings::default()
        });
        Config {
            inner: RwLock::new(settings),
        }
    }

    pub fn get(&self) -> Settings {
        match self.inner.read() {
            Ok(settings) => settings.clone(),
            Err(_) => {
                log::error!("Failed to acquire read lock on config");
                Settings::default()
            }
        }
    }

    pub fn replace(&self, settings: Settings) {
        match self.inner.write() {
            Ok(mut inner) => *inner = settings,
            Err(_) => log::error!("Failed to acquire write lock on config"),
        }
    }

    pub fn set_data_dir(&self, dir: PathBuf) {
        match self.inner.write() {
            Ok(mut inner) => inner.data_dir = dir,
            Err(_) => log::error!("Failed to acquire write lock on config"),
        }
    }
}
