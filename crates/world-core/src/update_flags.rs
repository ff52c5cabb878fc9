//! Per-tick observable-state record consumed by the broadcast layer.
//!
//! These fields describe what changed about an actor this tick, as opposed to
//! the durable state on the actor itself. The broadcast layer serializes and
//! then [`UpdateFlags::reset`]s them each cycle. The faced-actor reference is
//! the exception: it survives resets and expires only through
//! `Actor::clear_face_actor`, its auto-clear timer, or a superseding face.

use std::sync::Weak;

use contracts::{Animation, Graphic, Position};
use tokio::sync::Mutex;

use crate::actor::Actor;

#[derive(Debug, Default)]
pub struct UpdateFlags {
    pub animation: Option<Animation>,
    pub graphic: Option<Graphic>,
    pub face_position: Option<Position>,
    /// Weak back reference to the actor currently being faced; never an
    /// ownership edge, so a despawned target simply fails to upgrade.
    pub face_actor: Option<Weak<Mutex<Actor>>>,
    pub force_chat: Option<String>,
}

impl UpdateFlags {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when any transient flag is set for this tick.
    pub fn update_required(&self) -> bool {
        self.animation.is_some()
            || self.graphic.is_some()
            || self.face_position.is_some()
            || self.force_chat.is_some()
    }

    /// Called by the broadcast layer after a cycle. Leaves `face_actor`
    /// alone; that reference has its own expiry.
    pub fn reset(&mut self) {
        self.animation = None;
        self.graphic = None;
        self.face_position = None;
        self.force_chat = None;
    }
}
