//! World simulation core: the actor data model and its two variants, the
//! walking-queue-driven pathing, randomized and forced movement, the per-tick
//! observable-state record, inventories, shops, and the per-actor timer
//! behaviors that produce ambient motion.
//!
//! Network encoding, widget rendering, and command parsing live outside this
//! crate; they consume the contracts re-exported from [`contracts`] and the
//! operation surface on [`actor::Actor`] / [`world::World`].

pub mod actor;
pub mod commands;
pub mod items;
pub mod rng;
pub mod schedule;
pub mod shops;
pub mod skills;
pub mod update_flags;
pub mod walking_queue;
pub mod world;

pub use actor::{Actor, ActorHandle, ActorKind, OutgoingPackets};
pub use world::World;
