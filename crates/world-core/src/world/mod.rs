//! World registry: actor lifecycle, world-index assignment, and the tick
//! driver that consumes walking queues.

mod step;

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use contracts::{Position, WorldConfig};

use crate::actor::{Actor, ActorHandle, OutgoingPackets};
use crate::items::ItemCatalog;

pub use step::StepMetrics;

#[derive(Debug)]
pub struct World {
    config: Arc<WorldConfig>,
    item_catalog: Arc<ItemCatalog>,
    actors: BTreeMap<u32, ActorHandle>,
    free_indices: BTreeSet<u32>,
    next_index: u32,
    current_tick: u64,
    last_step_metrics: StepMetrics,
}

impl World {
    pub fn new(config: WorldConfig, item_catalog: ItemCatalog) -> Self {
        Self {
            config: Arc::new(config),
            item_catalog: Arc::new(item_catalog),
            actors: BTreeMap::new(),
            free_indices: BTreeSet::new(),
            next_index: 0,
            current_tick: 0,
            last_step_metrics: StepMetrics::default(),
        }
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn item_catalog(&self) -> Arc<ItemCatalog> {
        Arc::clone(&self.item_catalog)
    }

    pub fn current_tick(&self) -> u64 {
        self.current_tick
    }

    pub fn last_step_metrics(&self) -> StepMetrics {
        self.last_step_metrics
    }

    pub fn actor_count(&self) -> usize {
        self.actors.len()
    }

    pub fn actor(&self, world_index: u32) -> Option<ActorHandle> {
        self.actors.get(&world_index).cloned()
    }

    pub fn actors(&self) -> impl Iterator<Item = (u32, &ActorHandle)> {
        self.actors.iter().map(|(index, handle)| (*index, handle))
    }

    /// Lowest freed index first, then the high-water mark.
    fn allocate_index(&mut self) -> u32 {
        if let Some(reused) = self.free_indices.iter().next().copied() {
            self.free_indices.remove(&reused);
            return reused;
        }
        let index = self.next_index;
        self.next_index += 1;
        index
    }

    async fn register(&mut self, actor: Actor) -> ActorHandle {
        let index = self.allocate_index();
        let handle = ActorHandle::new(actor);
        handle.lock().await.set_world_index(Some(index));
        self.actors.insert(index, handle.clone());
        handle
    }

    pub async fn spawn_player(
        &mut self,
        username: &str,
        outgoing: Box<dyn OutgoingPackets>,
        position: Position,
    ) -> ActorHandle {
        let actor = Actor::player(
            username,
            outgoing,
            position,
            Arc::clone(&self.config),
            Arc::clone(&self.item_catalog),
        );
        let handle = self.register(actor).await;
        log::info!("player {username} spawned at {position}");
        handle
    }

    /// Spawns a non-player actor and starts its ambient wander behavior.
    pub async fn spawn_npc(
        &mut self,
        npc_id: u32,
        position: Position,
        movement_radius: i32,
    ) -> ActorHandle {
        let actor = Actor::npc(
            npc_id,
            position,
            movement_radius,
            Arc::clone(&self.config),
            Arc::clone(&self.item_catalog),
        );
        let handle = self.register(actor).await;
        handle.initiate_random_movement().await;
        log::info!("npc {npc_id} spawned at {position} radius {movement_radius}");
        handle
    }

    /// Removes an actor from the world: clears its index, stops its wander
    /// interval and any pending face-clear, and releases the index for
    /// reuse. Timers that already fired find a dead weak reference and do
    /// nothing. Returns false for an unknown index.
    pub async fn despawn(&mut self, world_index: u32) -> bool {
        let Some(handle) = self.actors.remove(&world_index) else {
            return false;
        };
        self.free_indices.insert(world_index);
        let mut actor = handle.lock().await;
        actor.set_world_index(None);
        actor.cancel_background_tasks();
        log::info!("actor {world_index} despawned");
        true
    }
}
