// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./recap.toml` > `~/.config/recap/recap.toml` > `/etc/recap/recap.toml`
//! with environment variable overrides via the `RECAP_` prefix and a few
//! well-known unprefixed variables.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::RecapConfig;

/// Top-level sections recognized in `RECAP_<SECTION>_<KEY>` variables.
const SECTIONS: &[&str] = &[
    "bot",
    "telegram",
    "openai",
    "storage",
    "cache",
    "gateway",
    "retention",
];

/// Unprefixed variables honoured for deployment compatibility, and the key
/// each one sets.
const WELL_KNOWN_VARS: &[(&str, &str)] = &[
    ("database_url", "storage.database_url"),
    ("telegram_bot_token", "telegram.bot_token"),
    ("openai_api_key", "openai.api_key"),
    ("redis_url", "cache.redis_url"),
    ("secret_key", "gateway.secret_key"),
];

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/recap/recap.toml` (system-wide)
/// 3. `~/.config/recap/recap.toml` (user XDG config)
/// 4. `./recap.toml` (local directory)
/// 5. `RECAP_*` environment variables
/// 6. `DATABASE_URL`, `TELEGRAM_BOT_TOKEN`, `OPENAI_API_KEY`, `REDIS_URL`, `SECRET_KEY`
pub fn load_config() -> Result<RecapConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<RecapConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RecapConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<RecapConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RecapConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .merge(well_known_env_provider())
        .extract()
}

/// Build the Figment used for config loading, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(RecapConfig::default()))
        .merge(Toml::file("/etc/recap/recap.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("recap/recap.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("recap.toml"))
        .merge(env_provider())
        .merge(well_known_env_provider())
}

/// Maps a lowercased, prefix-stripped variable name onto a dotted config key.
///
/// Only the first underscore after a known section is replaced, so
/// `telegram_bot_token` becomes `telegram.bot_token` and not `telegram.bot.token`.
pub fn map_env_key(key: &str) -> String {
    for section in SECTIONS {
        if let Some(rest) = key.strip_prefix(section).and_then(|r| r.strip_prefix('_')) {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}

fn env_provider() -> Env {
    Env::prefixed("RECAP_").map(|key| map_env_key(key.as_str()).into())
}

fn well_known_env_provider() -> Env {
    let names: Vec<&str> = WELL_KNOWN_VARS.iter().map(|(name, _)| *name).collect();
    Env::raw().only(&names).map(|key| {
        WELL_KNOWN_VARS
            .iter()
            .find(|(name, _)| key.as_str().eq_ignore_ascii_case(name))
            .map(|(_, target)| (*target).into())
            .unwrap_or_else(|| key.into())
    })
}
