//! In-memory game server.
//!
//! Drives the plugin when no real host is attached: worlds with running
//! clocks and players whose rest counter grows every tick.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::task::JoinHandle;
use tracing::debug;

use super::{HostError, Presence, Server, UserId, WorldId};
use crate::scheduler::clock::DAY_LENGTH;

#[derive(Debug, Clone)]
struct PlayerState {
    world: WorldId,
    time_since_rest: u32,
}

/// Lock-free simulated server.
#[derive(Debug, Default)]
pub struct SimulatedServer {
    /// World name -> time of day
    worlds: DashMap<WorldId, u64>,
    players: DashMap<UserId, PlayerState>,
}

impl SimulatedServer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a server with the given worlds, all at time 0.
    pub fn with_worlds<I, W>(worlds: I) -> Self
    where
        I: IntoIterator<Item = W>,
        W: Into<WorldId>,
    {
        let server = Self::new();
        for world in worlds {
            server.add_world(world.into(), 0);
        }
        server
    }

    pub fn add_world(&self, world: WorldId, time: u64) {
        self.worlds.insert(world, time % DAY_LENGTH);
    }

    /// Unload a world. Players inside it are disconnected.
    pub fn remove_world(&self, world: &WorldId) {
        self.worlds.remove(world);
        self.players.retain(|_, p| &p.world != world);
    }

    pub fn set_time(&self, world: &WorldId, time: u64) -> Result<(), HostError> {
        let mut entry = self
            .worlds
            .get_mut(world)
            .ok_or_else(|| HostError::UnknownWorld(world.clone()))?;
        *entry = time % DAY_LENGTH;
        Ok(())
    }

    /// Advance every clock and rest counter by `ticks`.
    pub fn advance(&self, ticks: u64) {
        for mut world in self.worlds.iter_mut() {
            *world = (*world + ticks) % DAY_LENGTH;
        }
        let step = u32::try_from(ticks).unwrap_or(u32::MAX);
        for mut player in self.players.iter_mut() {
            player.time_since_rest = player.time_since_rest.saturating_add(step);
        }
    }

    pub fn connect(&self, user: UserId, world: WorldId) -> Result<(), HostError> {
        if !self.worlds.contains_key(&world) {
            return Err(HostError::UnknownWorld(world));
        }
        debug!("Player {} joined {}", user, world);
        self.players.insert(
            user,
            PlayerState {
                world,
                time_since_rest: 0,
            },
        );
        Ok(())
    }

    pub fn disconnect(&self, user: &UserId) {
        if self.players.remove(user).is_some() {
            debug!("Player {} left", user);
        }
    }

    pub fn time_since_rest(&self, user: &UserId) -> Option<u32> {
        self.players.get(user).map(|p| p.time_since_rest)
    }

    /// Run the clocks in the background, one tick per `tick`.
    pub fn spawn_clock(self: Arc<Self>, tick: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(tick);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                self.advance(1);
            }
        })
    }
}

impl Presence for SimulatedServer {
    fn is_online(&self, user: &UserId) -> bool {
        self.players.contains_key(user)
    }
}

impl Server for SimulatedServer {
    fn worlds(&self) -> Vec<WorldId> {
        let mut worlds: Vec<WorldId> = self.worlds.iter().map(|w| w.key().clone()).collect();
        worlds.sort();
        worlds
    }

    fn world_time(&self, world: &WorldId) -> Result<u64, HostError> {
        self.worlds
            .get(world)
            .map(|time| *time)
            .ok_or_else(|| HostError::UnknownWorld(world.clone()))
    }

    fn players_in(&self, world: &WorldId) -> Result<Vec<UserId>, HostError> {
        if !self.worlds.contains_key(world) {
            return Err(HostError::UnknownWorld(world.clone()));
        }
        Ok(self
            .players
            .iter()
            .filter(|p| &p.world == world)
            .map(|p| *p.key())
            .collect())
    }

    fn world_of(&self, user: &UserId) -> Option<WorldId> {
        self.players.get(user).map(|p| p.world.clone())
    }

    fn set_time_since_rest(&self, user: &UserId, ticks: u32) -> Result<(), HostError> {
        let mut player = self
            .players
            .get_mut(user)
            .ok_or(HostError::UnknownPlayer(*user))?;
        player.time_since_rest = ticks;
        Ok(())
    }
}
