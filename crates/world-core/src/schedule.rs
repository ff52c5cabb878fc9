//! Per-actor background behaviors.
//!
//! Each behavior is its own tokio task holding only a `Weak` reference to the
//! actor it mutates, so a task that outlives a despawn wakes up, fails to
//! upgrade, and exits. Cancellation is layered on top of that: the spawning
//! side keeps the `AbortHandle` and aborts it on despawn or supersede.
//! Every mutation happens under the actor's own lock.

use std::sync::Weak;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::AbortHandle;
use tokio::time::{self, MissedTickBehavior};

use crate::actor::Actor;
use crate::rng::MovementRng;

/// Starts the recurring wander pulse for an actor. The period is fixed for
/// the behavior's lifetime; throttling below the period is done inside the
/// pulse by the 30% movement roll.
pub(crate) fn spawn_wander(
    actor: Weak<Mutex<Actor>>,
    period_millis: u64,
    mut rng: MovementRng,
) -> AbortHandle {
    let period = Duration::from_millis(period_millis.max(1));
    let task = tokio::spawn(async move {
        // First pulse lands one full period after the behavior starts.
        let mut ticker = time::interval_at(time::Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let Some(actor) = actor.upgrade() else {
                log::debug!("wander behavior stopping: actor despawned");
                break;
            };
            let mut actor = actor.lock().await;
            actor.wander_tick(&mut rng);
        }
    });
    task.abort_handle()
}

/// Schedules the one-shot expiry of a faced-actor reference. On firing it
/// compares the stored reference with the one it was scheduled for and only
/// clears on a match, so a newer face set after this timer started is never
/// clobbered by it.
pub(crate) fn spawn_face_clear(
    actor: Weak<Mutex<Actor>>,
    faced: Weak<Mutex<Actor>>,
    timeout_millis: u64,
) -> AbortHandle {
    let task = tokio::spawn(async move {
        time::sleep(Duration::from_millis(timeout_millis)).await;
        let Some(actor) = actor.upgrade() else {
            return;
        };
        let mut actor = actor.lock().await;
        if actor.face_target_is(&faced) {
            log::debug!("faced-actor reference expired");
            actor.clear_face_actor();
        }
    });
    task.abort_handle()
}
