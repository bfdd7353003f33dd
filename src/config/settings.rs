//! Reloadable plugin settings.

use std::collections::HashSet;
use std::env;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tracing::warn;

use crate::world::WorldId;

/// Periodic rest-reset task settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatisticTask {
    /// Fixed delay in ticks before the first run. `None` means automatic
    /// (aligned to the next nightfall).
    pub delay: Option<u64>,
    /// Ticks between runs.
    pub period: u64,
}

impl Default for StatisticTask {
    fn default() -> Self {
        Self {
            delay: None,
            period: 24_000, // one in-game day
        }
    }
}

/// World filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorldsBlacklist {
    /// `None` when no list is configured.
    pub list: Option<HashSet<WorldId>>,
    pub treat_as_whitelist: bool,
}

impl WorldsBlacklist {
    /// Build the filter from raw names.
    ///
    /// An empty list only counts as "configured" in whitelist mode.
    pub fn new<I, S>(names: I, treat_as_whitelist: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: HashSet<WorldId> = names.into_iter().map(|n| WorldId(n.into())).collect();
        let list = if names.is_empty() && !treat_as_whitelist {
            None
        } else {
            Some(names)
        };
        Self {
            list,
            treat_as_whitelist,
        }
    }
}

/// Immutable settings snapshot, rebuilt wholesale on every reload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Whether phantoms are enabled for players who never chose.
    pub default_enabled: bool,
    pub command_cooldown: Duration,
    pub statistic_task: StatisticTask,
    pub worlds_blacklist: WorldsBlacklist,
    pub debug_mode: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_enabled: true,
            command_cooldown: Duration::from_secs(600), // 10 minutes
            statistic_task: StatisticTask::default(),
            worlds_blacklist: WorldsBlacklist::default(),
            debug_mode: false,
        }
    }
}

impl Settings {
    /// Load settings from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load settings through an arbitrary key lookup.
    ///
    /// Missing keys take their default; malformed ones are logged and
    /// take their default as well.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let delay = match lookup("PP_TASK_DELAY") {
            None => None,
            Some(raw) if raw.trim().eq_ignore_ascii_case("automatic") => None,
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(ticks) => Some(ticks),
                Err(_) => {
                    warn!("Invalid PP_TASK_DELAY '{}', using automatic", raw);
                    None
                }
            },
        };

        let period = parse_or(&lookup, "PP_TASK_PERIOD", defaults.statistic_task.period);
        if period == 0 {
            warn!("PP_TASK_PERIOD must be positive, using 1 tick");
        }

        let cooldown_secs = parse_or(
            &lookup,
            "PP_COMMAND_COOLDOWN",
            defaults.command_cooldown.as_secs(),
        );

        let names: Vec<String> = lookup("PP_WORLDS_LIST")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let treat_as_whitelist = parse_or(&lookup, "PP_TREAT_AS_WHITELIST", false);

        Self {
            default_enabled: parse_or(&lookup, "PP_DEFAULT", defaults.default_enabled),
            command_cooldown: Duration::from_secs(cooldown_secs),
            statistic_task: StatisticTask {
                delay,
                period: period.max(1),
            },
            worlds_blacklist: WorldsBlacklist::new(names, treat_as_whitelist),
            debug_mode: parse_or(&lookup, "PP_DEBUG_MODE", defaults.debug_mode),
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Copy + std::fmt::Debug,
{
    match lookup(key) {
        Some(raw) => raw.trim().to_lowercase().parse().unwrap_or_else(|_| {
            warn!("Invalid {} '{}', using {:?}", key, raw, default);
            default
        }),
        None => default,
    }
}

/// Current settings snapshot, shared by everything that reads it.
///
/// Readers get a cheap `Arc` clone; reload swaps the whole snapshot.
#[derive(Debug, Clone)]
pub struct SharedSettings {
    inner: Arc<RwLock<Arc<Settings>>>,
}

impl SharedSettings {
    pub fn new(settings: Settings) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(settings))),
        }
    }

    pub fn current(&self) -> Arc<Settings> {
        Arc::clone(&self.inner.read())
    }

    /// Install a new snapshot, returning the previous one.
    pub fn replace(&self, settings: Arc<Settings>) -> Arc<Settings> {
        std::mem::replace(&mut *self.inner.write(), settings)
    }
}

impl Default for SharedSettings {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}
