//! Ordered pending-destination queue driving per-tick position advancement.
//!
//! Each actor owns exactly one queue for its whole lifetime. Redirects never
//! replace the queue; they clear it, which also withdraws its authority: a
//! queue whose `valid` flag is false must not be consumed by the tick driver
//! even when steps remain, because a redirect is still in flight.

use std::collections::VecDeque;

/// A queued destination. Levels are not queued; the owning actor's current
/// level applies to every step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkPoint {
    pub x: i32,
    pub y: i32,
}

/// The three observable states are empty, pending-valid, and pending-invalid;
/// `clear` always lands in empty with `valid == false` in the same call.
#[derive(Debug, Default)]
pub struct WalkingQueue {
    steps: VecDeque<WalkPoint>,
    valid: bool,
}

impl WalkingQueue {
    pub fn new() -> Self {
        Self {
            steps: VecDeque::new(),
            valid: false,
        }
    }

    /// Empties the queue and invalidates it. The two effects are a single
    /// state transition; there is no moment where an emptied queue is still
    /// marked valid.
    pub fn clear(&mut self) {
        self.steps.clear();
        self.valid = false;
    }

    /// Appends a destination. Does not touch the `valid` flag; committing a
    /// redirect is the caller's explicit `set_valid(true)`.
    pub fn add(&mut self, x: i32, y: i32) {
        self.steps.push_back(WalkPoint { x, y });
    }

    pub fn valid(&self) -> bool {
        self.valid
    }

    pub fn set_valid(&mut self, valid: bool) {
        self.valid = valid;
    }

    /// The destination currently being walked toward.
    pub fn peek(&self) -> Option<WalkPoint> {
        self.steps.front().copied()
    }

    /// Drops the front destination once it has been reached.
    pub fn pop_step(&mut self) -> Option<WalkPoint> {
        self.steps.pop_front()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_empties_and_invalidates_in_one_transition() {
        let mut queue = WalkingQueue::new();
        queue.add(10, 12);
        queue.set_valid(true);
        assert!(queue.valid());
        assert_eq!(queue.len(), 1);

        queue.clear();
        assert!(queue.is_empty());
        assert!(!queue.valid());
    }

    #[test]
    fn add_does_not_grant_authority() {
        let mut queue = WalkingQueue::new();
        queue.add(3, 4);
        assert!(!queue.valid());
        assert_eq!(queue.peek(), Some(WalkPoint { x: 3, y: 4 }));
    }

    #[test]
    fn steps_come_out_in_insertion_order() {
        let mut queue = WalkingQueue::new();
        queue.add(1, 1);
        queue.add(2, 2);
        queue.set_valid(true);

        assert_eq!(queue.pop_step(), Some(WalkPoint { x: 1, y: 1 }));
        assert_eq!(queue.pop_step(), Some(WalkPoint { x: 2, y: 2 }));
        assert_eq!(queue.pop_step(), None);
    }

    #[test]
    fn redirect_pattern_drops_stale_steps() {
        let mut queue = WalkingQueue::new();
        queue.add(5, 5);
        queue.set_valid(true);

        // A redirect clears first, then commits the replacement destination.
        queue.clear();
        queue.set_valid(true);
        queue.add(9, 9);

        assert_eq!(queue.len(), 1);
        assert_eq!(queue.peek(), Some(WalkPoint { x: 9, y: 9 }));
    }
}
