//! Actors: the shared mobile-entity model, specialized for player-controlled
//! and non-player variants, with facing, the inventory surface, and the two
//! voluntary movement algorithms.
//!
//! Every live actor sits behind its own `tokio::sync::Mutex`; the tick
//! driver, the wander interval, and any pending face-clear timer all mutate
//! the walking queue and update flags through that one lock.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Weak};

use contracts::{
    ActiveWidget, Animation, Direction, Graphic, Item, Position, WorldConfig, DIRECTION_NONE,
    DIRECTION_SOUTH_INDEX, INVENTORY_SIZE,
};
use serde_json::Value;
use tokio::sync::{Mutex, MutexGuard};
use tokio::task::AbortHandle;

use crate::items::{ItemCatalog, ItemContainer};
use crate::rng::MovementRng;
use crate::schedule;
use crate::skills::Skills;
use crate::update_flags::UpdateFlags;
use crate::walking_queue::WalkingQueue;

// ---------------------------------------------------------------------------
// Outbound protocol contract
// ---------------------------------------------------------------------------

/// Fire-and-forget sink for client-bound updates. The wire encoding behind
/// these calls is owned by the session layer, not this core.
pub trait OutgoingPackets: fmt::Debug + Send {
    fn send_update_single_widget_item(&mut self, widget_id: u16, slot: usize, item: Option<Item>);
    fn send_update_all_widget_items(&mut self, widget_id: u16, items: &[Option<Item>]);
    fn show_screen_and_tab_widgets(&mut self, screen_widget_id: u16, tab_widget_id: u16);
    fn send_message(&mut self, message: &str);
}

// ---------------------------------------------------------------------------
// Variant payloads
// ---------------------------------------------------------------------------

/// State carried only by player-controlled actors.
#[derive(Debug)]
pub struct PlayerData {
    pub username: String,
    pub outgoing: Box<dyn OutgoingPackets>,
    pub active_widget: Option<ActiveWidget>,
}

/// State carried only by non-player actors: the home point set at spawn and
/// the tile radius every voluntary move must respect.
#[derive(Debug, Clone, Copy)]
pub struct NpcData {
    pub npc_id: u32,
    pub initial_position: Position,
    pub movement_radius: i32,
}

#[derive(Debug)]
pub enum ActorKind {
    Player(PlayerData),
    Npc(NpcData),
}

/// The faced-actor reference together with its scheduled expiry, so despawn
/// and superseding faces can cancel the timer explicitly.
#[derive(Debug)]
pub(crate) struct FaceTarget {
    pub(crate) target: Weak<Mutex<Actor>>,
    pub(crate) clear_task: Option<AbortHandle>,
}

impl FaceTarget {
    fn cancel(self) {
        if let Some(task) = self.clear_task {
            task.abort();
        }
    }
}

// ---------------------------------------------------------------------------
// Actor
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct Actor {
    kind: ActorKind,
    world_index: Option<u32>,
    position: Position,
    walk_direction: i32,
    run_direction: i32,
    face_direction: i32,
    busy: bool,
    inventory: ItemContainer,
    skills: Skills,
    metadata: BTreeMap<String, Value>,
    update_flags: UpdateFlags,
    walking_queue: WalkingQueue,
    face_target: Option<FaceTarget>,
    wander_task: Option<AbortHandle>,
    config: Arc<WorldConfig>,
    item_catalog: Arc<ItemCatalog>,
}

impl Actor {
    fn new(
        kind: ActorKind,
        position: Position,
        config: Arc<WorldConfig>,
        item_catalog: Arc<ItemCatalog>,
    ) -> Self {
        Self {
            kind,
            world_index: None,
            position,
            walk_direction: DIRECTION_NONE,
            run_direction: DIRECTION_NONE,
            face_direction: DIRECTION_SOUTH_INDEX,
            busy: false,
            inventory: ItemContainer::new(INVENTORY_SIZE),
            skills: Skills::new(),
            metadata: BTreeMap::new(),
            update_flags: UpdateFlags::new(),
            walking_queue: WalkingQueue::new(),
            face_target: None,
            wander_task: None,
            config,
            item_catalog,
        }
    }

    pub fn player(
        username: &str,
        outgoing: Box<dyn OutgoingPackets>,
        position: Position,
        config: Arc<WorldConfig>,
        item_catalog: Arc<ItemCatalog>,
    ) -> Self {
        Self::new(
            ActorKind::Player(PlayerData {
                username: username.to_string(),
                outgoing,
                active_widget: None,
            }),
            position,
            config,
            item_catalog,
        )
    }

    pub fn npc(
        npc_id: u32,
        position: Position,
        movement_radius: i32,
        config: Arc<WorldConfig>,
        item_catalog: Arc<ItemCatalog>,
    ) -> Self {
        Self::new(
            ActorKind::Npc(NpcData {
                npc_id,
                initial_position: position,
                movement_radius,
            }),
            position,
            config,
            item_catalog,
        )
    }

    // --- Accessors ---

    pub fn kind(&self) -> &ActorKind {
        &self.kind
    }

    pub fn player_data(&self) -> Option<&PlayerData> {
        match &self.kind {
            ActorKind::Player(data) => Some(data),
            ActorKind::Npc(_) => None,
        }
    }

    pub fn player_data_mut(&mut self) -> Option<&mut PlayerData> {
        match &mut self.kind {
            ActorKind::Player(data) => Some(data),
            ActorKind::Npc(_) => None,
        }
    }

    pub fn npc_data(&self) -> Option<&NpcData> {
        match &self.kind {
            ActorKind::Npc(data) => Some(data),
            ActorKind::Player(_) => None,
        }
    }

    pub fn world_index(&self) -> Option<u32> {
        self.world_index
    }

    pub fn set_world_index(&mut self, world_index: Option<u32>) {
        self.world_index = world_index;
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    pub fn walk_direction(&self) -> i32 {
        self.walk_direction
    }

    pub fn set_walk_direction(&mut self, value: i32) {
        self.walk_direction = value;
    }

    pub fn run_direction(&self) -> i32 {
        self.run_direction
    }

    pub fn set_run_direction(&mut self, value: i32) {
        self.run_direction = value;
    }

    pub fn face_direction(&self) -> i32 {
        self.face_direction
    }

    pub fn set_face_direction(&mut self, value: i32) {
        self.face_direction = value;
    }

    pub fn busy(&self) -> bool {
        self.busy
    }

    pub fn set_busy(&mut self, value: bool) {
        self.busy = value;
    }

    pub fn walking_queue(&self) -> &WalkingQueue {
        &self.walking_queue
    }

    pub fn walking_queue_mut(&mut self) -> &mut WalkingQueue {
        &mut self.walking_queue
    }

    pub fn update_flags(&self) -> &UpdateFlags {
        &self.update_flags
    }

    pub fn update_flags_mut(&mut self) -> &mut UpdateFlags {
        &mut self.update_flags
    }

    pub fn inventory(&self) -> &ItemContainer {
        &self.inventory
    }

    pub fn inventory_mut(&mut self) -> &mut ItemContainer {
        &mut self.inventory
    }

    pub fn skills(&self) -> &Skills {
        &self.skills
    }

    pub fn skills_mut(&mut self) -> &mut Skills {
        &mut self.skills
    }

    pub fn metadata(&self) -> &BTreeMap<String, Value> {
        &self.metadata
    }

    pub fn set_metadata(&mut self, key: &str, value: Value) {
        self.metadata.insert(key.to_string(), value);
    }

    pub fn config(&self) -> &Arc<WorldConfig> {
        &self.config
    }

    pub fn item_catalog(&self) -> Arc<ItemCatalog> {
        Arc::clone(&self.item_catalog)
    }

    // --- Facing ---

    /// Turns toward a map position. Clears any faced actor: the two facing
    /// targets are mutually exclusive. When `clear_walking_queue` is set the
    /// queue is emptied and invalidated, cancelling in-flight redirects
    /// without resuming the previous path.
    pub fn face(&mut self, position: Position, clear_walking_queue: bool) {
        self.clear_face_actor();
        self.update_flags.face_position = Some(position);
        if clear_walking_queue {
            self.walking_queue.clear();
        }
    }

    /// Idempotently drops the faced-actor reference and cancels its pending
    /// expiry. No-op when nothing is faced.
    pub fn clear_face_actor(&mut self) {
        if let Some(face_target) = self.face_target.take() {
            face_target.cancel();
        }
        self.update_flags.face_actor = None;
    }

    pub(crate) fn set_face_target(
        &mut self,
        target: Weak<Mutex<Actor>>,
        clear_task: Option<AbortHandle>,
    ) {
        if let Some(previous) = self.face_target.take() {
            previous.cancel();
        }
        self.update_flags.face_actor = Some(target.clone());
        self.face_target = Some(FaceTarget { target, clear_task });
    }

    /// Whether the recorded face reference still points at `target`. The
    /// expiry timer checks this before clearing so it never clobbers a face
    /// set after it was scheduled.
    pub(crate) fn face_target_is(&self, target: &Weak<Mutex<Actor>>) -> bool {
        self.face_target
            .as_ref()
            .map(|face| Weak::ptr_eq(&face.target, target))
            .unwrap_or(false)
    }

    // --- Observable-state shortcuts ---

    pub fn play_animation(&mut self, animation: impl Into<Animation>) {
        self.update_flags.animation = Some(animation.into());
    }

    pub fn play_graphics(&mut self, graphic: impl Into<Graphic>) {
        self.update_flags.graphic = Some(graphic.into());
    }

    pub fn say(&mut self, message: &str) {
        self.update_flags.force_chat = Some(message.to_string());
    }

    /// Pushes a chat-box message to a player; silently dropped for NPCs.
    pub fn send_message(&mut self, message: &str) {
        if let ActorKind::Player(data) = &mut self.kind {
            data.outgoing.send_message(message);
        }
    }

    // --- Inventory surface ---

    /// Places one item, merging stacks per the catalog's stackability.
    /// `false` means the container had no eligible slot; nothing was placed.
    pub fn give_item(&mut self, item: Item) -> bool {
        let stackable = self
            .item_catalog
            .lookup(item.item_id)
            .map(|definition| definition.stackable)
            .unwrap_or(false);
        self.inventory.add(item, stackable).is_some()
    }

    pub fn remove_item(&mut self, slot: usize) -> Option<Item> {
        self.inventory.remove(slot)
    }

    pub fn has_item_in_inventory(&self, item: Item) -> bool {
        self.inventory.has(item)
    }

    /// Currently identical to [`Self::has_item_in_inventory`]; the worn
    /// equipment extension hangs off this method once it exists.
    pub fn has_item_on_person(&self, item: Item) -> bool {
        self.has_item_in_inventory(item)
    }

    // --- Movement ---

    /// The busy gate. All voluntary movement checks this and drops the
    /// request outright when it fails; busy-time requests are not queued.
    pub fn can_move(&self) -> bool {
        !self.busy
    }

    /// Whether a candidate tile is legal for this actor: NPCs stay inside
    /// their home radius box, players are unconstrained here.
    pub fn movement_allowed(&self, x: i32, y: i32) -> bool {
        match &self.kind {
            ActorKind::Npc(data) => {
                Position::within_box(x, y, data.initial_position, data.movement_radius)
            }
            ActorKind::Player(_) => true,
        }
    }

    /// One pulse of the ambient wander behavior. Roughly 30% of pulses
    /// attempt a move; candidates are drawn with bounded retries and the
    /// pulse falls back to standing still when none validates.
    pub fn wander_tick(&mut self, rng: &mut MovementRng) {
        if !self.can_move() {
            return;
        }
        if rng.roll(10) < 7 {
            return;
        }

        let mut candidate = None;
        for _ in 0..self.config.max_wander_attempts {
            let (x, y) = self.propose_wander_target(rng);
            if self.movement_allowed(x, y) {
                candidate = Some((x, y));
                break;
            }
        }

        let Some((x, y)) = candidate else {
            return;
        };
        if x != self.position.x || y != self.position.y {
            self.redirect_walking_queue(x, y);
        }
    }

    fn propose_wander_target(&self, rng: &mut MovementRng) -> (i32, i32) {
        let mut x = self.position.x;
        let mut y = self.position.y;

        if rng.roll(10) > 6 {
            let amount = rng.roll(5) as i32;
            if rng.roll(2) == 0 {
                x -= amount;
            } else {
                x += amount;
            }
        }

        if rng.roll(10) > 6 {
            let amount = rng.roll(5) as i32;
            if rng.roll(2) == 0 {
                y -= amount;
            } else {
                y += amount;
            }
        }

        (x, y)
    }

    /// Dashes `steps` tiles along a direction, committing only the end
    /// position to the walking queue. An unknown direction index or a busy
    /// actor is a silent no-op, and an NPC whose home box any intermediate
    /// step would leave rejects the whole movement rather than part of it.
    pub fn force_movement(&mut self, direction: i32, steps: u32) {
        if !self.can_move() {
            return;
        }
        let Some(direction) = Direction::from_index(direction) else {
            return;
        };

        let (delta_x, delta_y) = direction.delta();
        let mut x = self.position.x;
        let mut y = self.position.y;
        for _ in 0..steps {
            x += delta_x;
            y += delta_y;
            if !self.movement_allowed(x, y) {
                return;
            }
        }

        if x != self.position.x || y != self.position.y {
            self.redirect_walking_queue(x, y);
        }
    }

    /// Replaces whatever the queue held with a single committed destination.
    fn redirect_walking_queue(&mut self, x: i32, y: i32) {
        self.walking_queue.clear();
        self.walking_queue.set_valid(true);
        self.walking_queue.add(x, y);
    }

    // --- Lifecycle ---

    pub(crate) fn set_wander_task(&mut self, task: AbortHandle) {
        if let Some(previous) = self.wander_task.replace(task) {
            previous.abort();
        }
    }

    pub(crate) fn has_wander_task(&self) -> bool {
        self.wander_task.is_some()
    }

    /// Stops the wander interval and any pending face-clear. Called on
    /// despawn; a timer that already fired finds only a dead weak reference.
    pub(crate) fn cancel_background_tasks(&mut self) {
        if let Some(task) = self.wander_task.take() {
            task.abort();
        }
        if let Some(face_target) = self.face_target.take() {
            face_target.cancel();
        }
    }
}

impl Drop for Actor {
    fn drop(&mut self) {
        self.cancel_background_tasks();
    }
}

// ---------------------------------------------------------------------------
// ActorHandle
// ---------------------------------------------------------------------------

/// Cloneable handle to a live actor. Operations that schedule timers or need
/// another actor's identity live here; everything else locks and works on
/// [`Actor`] directly.
#[derive(Debug, Clone)]
pub struct ActorHandle {
    inner: Arc<Mutex<Actor>>,
}

impl ActorHandle {
    pub fn new(actor: Actor) -> Self {
        Self {
            inner: Arc::new(Mutex::new(actor)),
        }
    }

    pub async fn lock(&self) -> MutexGuard<'_, Actor> {
        self.inner.lock().await
    }

    pub fn downgrade(&self) -> Weak<Mutex<Actor>> {
        Arc::downgrade(&self.inner)
    }

    pub fn ptr_eq(&self, other: &ActorHandle) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Faces another actor. Records a weak reference in the update flags and,
    /// with `auto_clear`, schedules a one-shot expiry; a face issued later
    /// supersedes the timer, which then leaves the newer reference alone.
    pub async fn face_actor(
        &self,
        target: &ActorHandle,
        clear_walking_queue: bool,
        auto_clear: bool,
    ) {
        let mut actor = self.inner.lock().await;
        let faced = target.downgrade();
        let clear_task = if auto_clear {
            Some(schedule::spawn_face_clear(
                self.downgrade(),
                faced.clone(),
                actor.config().face_clear_timeout_millis,
            ))
        } else {
            None
        };
        actor.set_face_target(faced, clear_task);
        if clear_walking_queue {
            actor.walking_queue_mut().clear();
        }
    }

    pub async fn clear_face_actor(&self) {
        self.inner.lock().await.clear_face_actor();
    }

    /// Starts the recurring ambient wander behavior for this actor. One
    /// behavior per actor; starting twice keeps the first.
    pub async fn initiate_random_movement(&self) {
        let mut actor = self.inner.lock().await;
        if actor.has_wander_task() {
            return;
        }
        let rng = MovementRng::for_actor(
            actor.config().seed,
            actor.world_index().unwrap_or(0),
        );
        let task = schedule::spawn_wander(
            self.downgrade(),
            actor.config().wander_interval_millis,
            rng,
        );
        actor.set_wander_task(task);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::ItemDefinition;
    use serde_json::json;

    fn test_catalog() -> Arc<ItemCatalog> {
        let mut catalog = ItemCatalog::new();
        catalog.register(ItemDefinition {
            item_id: 995,
            name: "Coins".to_string(),
            stackable: true,
            value: 1,
        });
        catalog.register(ItemDefinition {
            item_id: 1277,
            name: "Sword".to_string(),
            stackable: false,
            value: 91,
        });
        Arc::new(catalog)
    }

    fn test_npc(radius: i32) -> Actor {
        Actor::npc(
            7,
            Position::new(3222, 3222),
            radius,
            Arc::new(WorldConfig::default()),
            test_catalog(),
        )
    }

    #[test]
    fn npc_spawns_facing_south_and_standing() {
        let actor = test_npc(4);
        assert_eq!(actor.face_direction(), DIRECTION_SOUTH_INDEX);
        assert_eq!(actor.walk_direction(), DIRECTION_NONE);
        assert_eq!(actor.run_direction(), DIRECTION_NONE);
        assert!(actor.world_index().is_none());
    }

    #[test]
    fn busy_actor_drops_wander_pulses() {
        let mut actor = test_npc(4);
        actor.set_busy(true);
        let mut rng = MovementRng::new(9);
        for _ in 0..100 {
            actor.wander_tick(&mut rng);
        }
        assert!(actor.walking_queue().is_empty());
        assert!(!actor.walking_queue().valid());
        assert_eq!(actor.position(), Position::new(3222, 3222));
    }

    #[test]
    fn wander_destinations_stay_inside_the_home_box() {
        let mut actor = test_npc(3);
        let home = Position::new(3222, 3222);
        let mut rng = MovementRng::new(1234);
        for _ in 0..500 {
            actor.wander_tick(&mut rng);
            if let Some(step) = actor.walking_queue().peek() {
                assert!(Position::within_box(step.x, step.y, home, 3));
                // Walk completes before the next pulse in this model.
                let level = actor.position().level;
                actor.set_position(Position::at_level(step.x, step.y, level));
                actor.walking_queue_mut().clear();
            }
        }
    }

    #[test]
    fn wander_commits_valid_single_destination() {
        let mut actor = test_npc(10);
        let mut rng = MovementRng::new(5);
        for _ in 0..200 {
            actor.wander_tick(&mut rng);
            if !actor.walking_queue().is_empty() {
                assert!(actor.walking_queue().valid());
                assert_eq!(actor.walking_queue().len(), 1);
                return;
            }
        }
        panic!("no wander movement in 200 pulses");
    }

    #[test]
    fn force_movement_rejects_out_of_radius_atomically() {
        let mut actor = test_npc(2);
        // The third tile north leaves a radius-2 box; nothing may change.
        actor.force_movement(Direction::North.index(), 3);
        assert!(actor.walking_queue().is_empty());
        assert!(!actor.walking_queue().valid());
        assert_eq!(actor.position(), Position::new(3222, 3222));
    }

    #[test]
    fn force_movement_commits_only_the_end_position() {
        let mut actor = test_npc(5);
        actor.force_movement(Direction::East.index(), 3);
        assert!(actor.walking_queue().valid());
        assert_eq!(actor.walking_queue().len(), 1);
        let step = actor.walking_queue().peek().expect("destination");
        assert_eq!((step.x, step.y), (3225, 3222));
    }

    #[test]
    fn force_movement_with_unknown_direction_is_a_silent_no_op() {
        let mut actor = test_npc(5);
        actor.force_movement(11, 3);
        actor.force_movement(-1, 3);
        assert!(actor.walking_queue().is_empty());
    }

    #[test]
    fn busy_gate_blocks_forced_movement() {
        let mut actor = test_npc(5);
        actor.set_busy(true);
        actor.force_movement(Direction::East.index(), 2);
        assert!(actor.walking_queue().is_empty());
        assert_eq!(actor.position(), Position::new(3222, 3222));
    }

    #[test]
    fn players_wander_without_a_radius_constraint() {
        let mut actor = Actor::player(
            "test",
            Box::new(DiscardPackets),
            Position::new(3222, 3222),
            Arc::new(WorldConfig::default()),
            test_catalog(),
        );
        // A far-flung candidate is legal for players.
        assert!(actor.movement_allowed(4000, 2000));
        actor.force_movement(Direction::North.index(), 50);
        assert_eq!(
            actor.walking_queue().peek().map(|step| (step.x, step.y)),
            Some((3222, 3272))
        );
    }

    #[test]
    fn face_position_clears_and_invalidates_the_queue() {
        let mut actor = test_npc(5);
        actor.force_movement(Direction::East.index(), 2);
        assert!(actor.walking_queue().valid());

        actor.face(Position::new(3220, 3220), true);
        assert!(actor.walking_queue().is_empty());
        assert!(!actor.walking_queue().valid());
        assert_eq!(
            actor.update_flags().face_position,
            Some(Position::new(3220, 3220))
        );
    }

    #[test]
    fn face_position_can_preserve_the_queue() {
        let mut actor = test_npc(5);
        actor.force_movement(Direction::East.index(), 2);
        actor.face(Position::new(3220, 3220), false);
        assert!(actor.walking_queue().valid());
        assert_eq!(actor.walking_queue().len(), 1);
    }

    #[test]
    fn clear_face_actor_is_idempotent() {
        let mut actor = test_npc(5);
        actor.clear_face_actor();
        actor.clear_face_actor();
        assert!(actor.update_flags().face_actor.is_none());
    }

    #[test]
    fn give_item_merges_stackables_and_spreads_non_stackables() {
        let mut actor = test_npc(5);
        assert!(actor.give_item(Item::new(995, 1_000)));
        assert!(actor.give_item(Item::new(995, 500)));
        assert_eq!(actor.inventory().occupied_slot_count(), 1);
        assert!(actor.has_item_in_inventory(Item::new(995, 1_500)));

        assert!(actor.give_item(Item::single(1277)));
        assert!(actor.give_item(Item::single(1277)));
        assert_eq!(actor.inventory().occupied_slot_count(), 3);
        assert!(actor.has_item_on_person(Item::new(1277, 2)));
    }

    #[test]
    fn remove_item_vacates_the_slot() {
        let mut actor = test_npc(5);
        actor.give_item(Item::single(1277));
        assert_eq!(actor.remove_item(0), Some(Item::single(1277)));
        assert_eq!(actor.remove_item(0), None);
    }

    #[test]
    fn metadata_round_trips_open_values() {
        let mut actor = test_npc(5);
        actor.set_metadata("last_interaction", json!({"kind": "trade"}));
        assert_eq!(
            actor.metadata().get("last_interaction"),
            Some(&json!({"kind": "trade"}))
        );
    }

    #[test]
    fn say_and_animation_set_update_flags() {
        let mut actor = test_npc(5);
        actor.say("Hello there");
        actor.play_animation(422_u32);
        actor.play_graphics(86_u32);
        assert!(actor.update_flags().update_required());
        assert_eq!(actor.update_flags().force_chat.as_deref(), Some("Hello there"));

        actor.update_flags_mut().reset();
        assert!(!actor.update_flags().update_required());
    }

    #[derive(Debug)]
    struct DiscardPackets;

    impl OutgoingPackets for DiscardPackets {
        fn send_update_single_widget_item(&mut self, _: u16, _: usize, _: Option<Item>) {}
        fn send_update_all_widget_items(&mut self, _: u16, _: &[Option<Item>]) {}
        fn show_screen_and_tab_widgets(&mut self, _: u16, _: u16) {}
        fn send_message(&mut self, _: &str) {}
    }
}
