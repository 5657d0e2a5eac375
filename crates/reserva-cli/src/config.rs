use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use reserva_core::recurrence::MaterializationPolicy;
use serde::Deserialize;

#[derive(Deserialize, Debug)]
pub struct Config {
    /// User's default timezone (IANA format)
    #[serde(default = "crate::timezone::detect_system_timezone")]
    pub default_timezone: String,
    #[serde(default)]
    pub materialization: MaterializationSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_timezone: crate::timezone::detect_system_timezone(),
            materialization: MaterializationSettings::default(),
        }
    }
}

/// Configuration for series materialization
#[derive(Deserialize, Debug)]
pub struct MaterializationSettings {
    /// How far ahead occurrences are materialized, in days
    pub lookahead_days: i64,
    /// Limit for bookings created per series per run
    pub max_batch_size: usize,
    /// Cap on occurrence dates resolved per run and per preview
    pub generation_cap: usize,
    /// Occurrences older than now minus this many hours are not backfilled
    pub grace_hours: i64,
}

impl Default for MaterializationSettings {
    fn default() -> Self {
        let policy = MaterializationPolicy::default();
        Self {
            lookahead_days: policy.lookahead_days,
            max_batch_size: policy.max_batch_size,
            generation_cap: policy.generation_cap,
            grace_hours: policy.grace_hours,
        }
    }
}

impl MaterializationSettings {
    pub fn to_policy(&self) -> MaterializationPolicy {
        MaterializationPolicy {
            lookahead_days: self.lookahead_days,
            max_batch_size: self.max_batch_size,
            generation_cap: self.generation_cap,
            grace_hours: self.grace_hours,
        }
    }
}

impl Config {
    pub fn new() -> Result<Self, figment::Error> {
        Figment::new()
            .merge(Toml::file("reserva.toml"))
            .merge(Env::prefixed("RESERVA_"))
            .extract()
    }
}
