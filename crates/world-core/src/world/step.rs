use contracts::{Direction, DIRECTION_NONE};

use super::World;
use crate::actor::Actor;

/// Per-step movement accounting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepMetrics {
    pub tick: u64,
    pub moved_actors: u64,
}

impl World {
    /// One simulation tick: advances every actor at most one tile toward the
    /// front of its walking queue. Queues that are pending-invalid are not
    /// authoritative and are left untouched, as are busy actors. Update
    /// flags are never reset here; the broadcast layer owns that.
    pub async fn step(&mut self) -> StepMetrics {
        self.current_tick = self.current_tick.saturating_add(1);
        let mut moved_actors = 0_u64;
        for handle in self.actors.values() {
            let mut actor = handle.lock().await;
            if advance_actor(&mut actor) {
                moved_actors += 1;
            }
        }
        let metrics = StepMetrics {
            tick: self.current_tick,
            moved_actors,
        };
        self.last_step_metrics = metrics;
        metrics
    }

    /// Runs `n` ticks back to back; returns the final tick's metrics.
    pub async fn step_n(&mut self, n: u64) -> StepMetrics {
        for _ in 0..n {
            self.step().await;
        }
        self.last_step_metrics
    }
}

/// Moves an actor one tile toward its current destination. Returns whether
/// the actor moved this tick.
fn advance_actor(actor: &mut Actor) -> bool {
    if !actor.can_move() || !actor.walking_queue().valid() {
        stand(actor);
        return false;
    }
    let Some(destination) = actor.walking_queue().peek() else {
        stand(actor);
        return false;
    };

    let position = actor.position();
    let delta_x = (destination.x - position.x).signum();
    let delta_y = (destination.y - position.y).signum();
    if delta_x == 0 && delta_y == 0 {
        actor.walking_queue_mut().pop_step();
        stand(actor);
        return false;
    }

    let next = position.translated(delta_x, delta_y);
    actor.set_position(next);
    if let Some(direction) = Direction::from_delta(delta_x, delta_y) {
        actor.set_walk_direction(direction.index());
        actor.set_face_direction(direction.index());
    }
    if next.x == destination.x && next.y == destination.y {
        actor.walking_queue_mut().pop_step();
    }
    true
}

fn stand(actor: &mut Actor) {
    actor.set_walk_direction(DIRECTION_NONE);
    actor.set_run_direction(DIRECTION_NONE);
}
