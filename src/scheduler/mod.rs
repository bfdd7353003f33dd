//! Per-world rest reset scheduling.
//!
//! Every eligible world gets one repeating job that resets the "time since
//! rest" statistic of its connected players who opted out of phantoms. The
//! first run is aligned to nightfall unless a fixed delay is configured.
//!
//! Every reload replaces each world's job: the old one is cancelled before
//! the new one is started.

pub mod clock;
pub mod eligibility;
mod timer;

use std::collections::HashMap;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::preferences::PreferenceCache;
use crate::world::{Server, WorldId};

pub use eligibility::is_eligible;
pub use timer::{Job, TaskHandle, Timer, TokioTimer};

/// Timing of a scheduled world job, in ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleParams {
    pub delay: u64,
    pub period: u64,
}

#[derive(Debug)]
struct WorldSchedule {
    params: ScheduleParams,
    handle: TaskHandle,
}

/// Outcome of one reload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReloadSummary {
    pub scheduled: usize,
    pub ineligible: usize,
    pub failed: usize,
}

/// Owns one repeating job per eligible world.
pub struct WorldScheduler {
    server: Arc<dyn Server>,
    preferences: Arc<PreferenceCache>,
    timer: Arc<dyn Timer>,
    /// Held for the whole reload, which serializes reloads.
    tasks: Mutex<HashMap<WorldId, WorldSchedule>>,
}

impl WorldScheduler {
    pub fn new(
        server: Arc<dyn Server>,
        preferences: Arc<PreferenceCache>,
        timer: Arc<dyn Timer>,
    ) -> Self {
        Self {
            server,
            preferences,
            timer,
            tasks: Mutex::new(HashMap::new()),
        }
    }

    /// Rebuild every world's job from `settings`.
    ///
    /// A world whose clock cannot be read is skipped and left without a
    /// job; the others are still scheduled.
    pub async fn reload(&self, settings: &Settings) -> ReloadSummary {
        let mut tasks = self.tasks.lock().await;
        let worlds = self.server.worlds();
        let mut summary = ReloadSummary::default();

        // Worlds unloaded since the last reload
        tasks.retain(|world, schedule| {
            let loaded = worlds.contains(world);
            if !loaded {
                schedule.handle.cancel();
                debug!("Cancelled rest reset for unloaded world {}", world);
            }
            loaded
        });

        for world in worlds {
            // Cancel previous task
            if let Some(previous) = tasks.remove(&world) {
                previous.handle.cancel();
            }

            if !is_eligible(&world, &settings.worlds_blacklist) {
                debug!("World {} is not eligible, not scheduling", world);
                summary.ineligible += 1;
                continue;
            }

            let time = match self.server.world_time(&world) {
                Ok(time) => time,
                Err(e) => {
                    warn!("Skipping world {}: {}", world, e);
                    summary.failed += 1;
                    continue;
                }
            };

            // Cover the night already in progress
            if clock::is_night(time) {
                reset_world(self.server.as_ref(), &self.preferences, &world).await;
            }

            let params = ScheduleParams {
                delay: clock::initial_delay(time, settings.statistic_task.delay),
                period: settings.statistic_task.period,
            };
            let handle = self
                .timer
                .run_timer(self.reset_job(world.clone()), params.delay, params.period);

            if settings.debug_mode {
                info!(
                    "Scheduled rest reset for {} at time {}: delay {}, period {}",
                    world, time, params.delay, params.period
                );
            } else {
                debug!(
                    "Scheduled rest reset for {}: delay {}, period {}",
                    world, params.delay, params.period
                );
            }

            tasks.insert(world, WorldSchedule { params, handle });
            summary.scheduled += 1;
        }

        info!(
            "Rest reset scheduled for {} worlds ({} ineligible, {} failed)",
            summary.scheduled, summary.ineligible, summary.failed
        );
        summary
    }

    /// Cancel every job. Safe to call repeatedly.
    pub async fn shutdown(&self) {
        let mut tasks = self.tasks.lock().await;
        let count = tasks.len();
        for (_, schedule) in tasks.drain() {
            schedule.handle.cancel();
        }
        if count > 0 {
            info!("Cancelled {} rest reset tasks", count);
        }
    }

    /// Worlds with a live job, sorted.
    pub async fn scheduled_worlds(&self) -> Vec<WorldId> {
        let mut worlds: Vec<WorldId> = self.tasks.lock().await.keys().cloned().collect();
        worlds.sort();
        worlds
    }

    pub async fn schedule_of(&self, world: &WorldId) -> Option<ScheduleParams> {
        self.tasks.lock().await.get(world).map(|s| s.params)
    }

    fn reset_job(&self, world: WorldId) -> Job {
        let server = Arc::clone(&self.server);
        let preferences = Arc::clone(&self.preferences);
        Arc::new(move || {
            let server = Arc::clone(&server);
            let preferences = Arc::clone(&preferences);
            let world = world.clone();
            async move {
                reset_world(server.as_ref(), &preferences, &world).await;
            }
            .boxed()
        })
    }
}

impl std::fmt::Debug for WorldScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorldScheduler").finish_non_exhaustive()
    }
}

/// Reset the rest statistic of every connected player in `world` who has
/// phantoms disabled. Returns how many players were reset.
pub async fn reset_world(
    server: &dyn Server,
    preferences: &PreferenceCache,
    world: &WorldId,
) -> usize {
    let players = match server.players_in(world) {
        Ok(players) => players,
        Err(e) => {
            warn!("Rest reset skipped for {}: {}", world, e);
            return 0;
        }
    };

    let mut reset = 0;
    for user in players {
        match preferences.resolve(&user).await {
            Ok(true) => {}
            Ok(false) => match server.set_time_since_rest(&user, 0) {
                Ok(()) => reset += 1,
                // Left between listing and reset
                Err(e) => debug!("Rest reset skipped for {}: {}", user, e),
            },
            Err(e) => warn!("Failed to resolve preference for {}: {}", user, e),
        }
    }

    debug!("Reset rest statistic of {} players in {}", reset, world);
    reset
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{StatisticTask, WorldsBlacklist};
    use crate::preferences::MemoryPreferenceStore;
    use crate::world::{HostError, Presence, SimulatedServer, UserId};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::time;

    /// Counts firings across every job it starts.
    struct CountingTimer {
        inner: TokioTimer,
        fired: Arc<AtomicUsize>,
    }

    impl Timer for CountingTimer {
        fn run_timer(&self, job: Job, delay: u64, period: u64) -> TaskHandle {
            let fired = Arc::clone(&self.fired);
            let counted: Job = Arc::new(move || {
                fired.fetch_add(1, Ordering::SeqCst);
                job()
            });
            self.inner.run_timer(counted, delay, period)
        }
    }

    /// Lists a world that vanishes before its clock can be read.
    struct VanishingWorld {
        inner: SimulatedServer,
        ghost: WorldId,
    }

    impl Presence for VanishingWorld {
        fn is_online(&self, user: &UserId) -> bool {
            self.inner.is_online(user)
        }
    }

    impl Server for VanishingWorld {
        fn worlds(&self) -> Vec<WorldId> {
            let mut worlds = self.inner.worlds();
            worlds.push(self.ghost.clone());
            worlds
        }

        fn world_time(&self, world: &WorldId) -> Result<u64, HostError> {
            self.inner.world_time(world)
        }

        fn players_in(&self, world: &WorldId) -> Result<Vec<UserId>, HostError> {
            self.inner.players_in(world)
        }

        fn world_of(&self, user: &UserId) -> Option<WorldId> {
            self.inner.world_of(user)
        }

        fn set_time_since_rest(&self, user: &UserId, ticks: u32) -> Result<(), HostError> {
            self.inner.set_time_since_rest(user, ticks)
        }
    }

    struct Fixture {
        server: Arc<SimulatedServer>,
        preferences: Arc<PreferenceCache>,
        scheduler: WorldScheduler,
        fired: Arc<AtomicUsize>,
    }

    /// One tick per millisecond of paused tokio time.
    fn fixture(worlds: &[&str]) -> Fixture {
        let server = Arc::new(SimulatedServer::with_worlds(worlds.iter().copied()));
        let store = Arc::new(MemoryPreferenceStore::new());
        let preferences = Arc::new(PreferenceCache::new(
            store,
            server.clone(),
            &Settings::default(),
        ));
        let fired = Arc::new(AtomicUsize::new(0));
        let timer = Arc::new(CountingTimer {
            inner: TokioTimer::new(Duration::from_millis(1)),
            fired: fired.clone(),
        });
        let scheduler = WorldScheduler::new(server.clone(), preferences.clone(), timer);
        Fixture {
            server,
            preferences,
            scheduler,
            fired,
        }
    }

    async fn opted_out(fx: &Fixture, world: &str) -> UserId {
        let user = UserId::random();
        fx.server.connect(user, WorldId::new(world)).unwrap();
        fx.preferences.on_connect(&user).await.unwrap();
        fx.preferences.set_preference(&user, false).await.unwrap();
        user
    }

    fn settings(delay: Option<u64>, period: u64) -> Settings {
        Settings {
            statistic_task: StatisticTask { delay, period },
            ..Settings::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_daytime_reload_waits_for_nightfall() {
        let fx = fixture(&["world"]);
        let world = WorldId::new("world");
        let user = opted_out(&fx, "world").await;
        fx.server.advance(300);
        fx.server.set_time(&world, 5_000).unwrap();

        fx.scheduler.reload(&settings(None, 24_000)).await;
        assert_eq!(
            fx.scheduler.schedule_of(&world).await,
            Some(ScheduleParams {
                delay: 7_000,
                period: 24_000
            })
        );
        // No immediate reset during the day
        assert_eq!(fx.server.time_since_rest(&user), Some(300));

        time::sleep(Duration::from_millis(7_001)).await;
        assert_eq!(fx.fired.load(Ordering::SeqCst), 1);
        assert_eq!(fx.server.time_since_rest(&user), Some(0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_nighttime_reload_resets_immediately() {
        let fx = fixture(&["world"]);
        let world = WorldId::new("world");
        let user = opted_out(&fx, "world").await;
        fx.server.advance(500);
        fx.server.set_time(&world, 15_000).unwrap();

        fx.scheduler.reload(&settings(None, 24_000)).await;

        assert_eq!(fx.server.time_since_rest(&user), Some(0));
        assert_eq!(fx.fired.load(Ordering::SeqCst), 0);
        assert_eq!(
            fx.scheduler.schedule_of(&world).await.map(|p| p.delay),
            Some(21_000)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_skips_players_with_phantoms_enabled() {
        let fx = fixture(&["world"]);
        let world = WorldId::new("world");
        fx.server.set_time(&world, 13_000).unwrap();
        let quiet = opted_out(&fx, "world").await;
        let normal = UserId::random();
        fx.server.connect(normal, world.clone()).unwrap();
        fx.server.advance(1_000);

        let reset = reset_world(fx.server.as_ref(), &fx.preferences, &world).await;

        assert_eq!(reset, 1);
        assert_eq!(fx.server.time_since_rest(&quiet), Some(0));
        assert_eq!(fx.server.time_since_rest(&normal), Some(1_000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fixed_delay_is_used_verbatim() {
        let fx = fixture(&["world"]);
        let world = WorldId::new("world");
        fx.server.set_time(&world, 15_000).unwrap();

        fx.scheduler.reload(&settings(Some(40), 100)).await;

        assert_eq!(
            fx.scheduler.schedule_of(&world).await,
            Some(ScheduleParams {
                delay: 40,
                period: 100
            })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeated_reload_replaces_instead_of_duplicating() {
        let fx = fixture(&["world", "world_nether"]);
        let config = settings(Some(10), 1_000);

        fx.scheduler.reload(&config).await;
        fx.scheduler.reload(&config).await;

        assert_eq!(
            fx.scheduler.scheduled_worlds().await,
            vec![WorldId::new("world"), WorldId::new("world_nether")]
        );

        // Two worlds, three firings each (t = 10, 1010, 2010)
        time::sleep(Duration::from_millis(2_011)).await;
        assert_eq!(fx.fired.load(Ordering::SeqCst), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ineligible_worlds_lose_their_task() {
        let fx = fixture(&["world", "world_nether"]);
        fx.scheduler.reload(&settings(Some(10), 1_000)).await;
        assert_eq!(fx.scheduler.scheduled_worlds().await.len(), 2);

        let blacklisted = Settings {
            worlds_blacklist: WorldsBlacklist::new(["world_nether"], false),
            ..settings(Some(10), 1_000)
        };
        let summary = fx.scheduler.reload(&blacklisted).await;

        assert_eq!(summary.scheduled, 1);
        assert_eq!(summary.ineligible, 1);
        assert_eq!(
            fx.scheduler.scheduled_worlds().await,
            vec![WorldId::new("world")]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_whitelist_schedules_nothing() {
        let fx = fixture(&["world"]);
        let whitelist = Settings {
            worlds_blacklist: WorldsBlacklist::new(Vec::<String>::new(), true),
            ..Settings::default()
        };

        let summary = fx.scheduler.reload(&whitelist).await;

        assert_eq!(summary.scheduled, 0);
        assert!(fx.scheduler.scheduled_worlds().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unloaded_world_is_cancelled() {
        let fx = fixture(&["world", "world_the_end"]);
        fx.scheduler.reload(&settings(Some(10), 1_000)).await;

        fx.server.remove_world(&WorldId::new("world_the_end"));
        fx.scheduler.reload(&settings(Some(10), 1_000)).await;

        assert_eq!(
            fx.scheduler.scheduled_worlds().await,
            vec![WorldId::new("world")]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_vanished_world_does_not_abort_reload() {
        let server = Arc::new(VanishingWorld {
            inner: SimulatedServer::with_worlds(["world"]),
            ghost: WorldId::new("world_gone"),
        });
        let preferences = Arc::new(PreferenceCache::new(
            Arc::new(MemoryPreferenceStore::new()),
            server.clone(),
            &Settings::default(),
        ));
        let scheduler = WorldScheduler::new(
            server.clone(),
            preferences,
            Arc::new(TokioTimer::new(Duration::from_millis(1))),
        );

        let summary = scheduler.reload(&Settings::default()).await;

        assert_eq!(summary.scheduled, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(scheduler.scheduled_worlds().await, vec![WorldId::new("world")]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_cancels_everything_and_is_idempotent() {
        let fx = fixture(&["world", "world_nether"]);
        fx.scheduler.reload(&settings(Some(10), 10)).await;

        fx.scheduler.shutdown().await;
        fx.scheduler.shutdown().await;
        assert!(fx.scheduler.scheduled_worlds().await.is_empty());

        time::sleep(Duration::from_millis(100)).await;
        assert_eq!(fx.fired.load(Ordering::SeqCst), 0);
    }
}
