//! Deferred single-shot tasks.
//!
//! Replaces "call me again next frame" style continuations with an explicit
//! queue. Every task carries a cancellation handle and, optionally, the entity
//! that owns it; despawning an entity cancels everything it owns, so a task
//! never runs against a dead entity.
//!
//! Tasks fire once. A task that wants to repeat schedules itself again when it
//! runs. Nothing is guaranteed about the order of unrelated tasks that come
//! due in the same tick.

use serde::{Deserialize, Serialize};
use slotmap::{new_key_type, SlotMap};

use crate::entity::EntityId;

new_key_type! {
    /// Cancellation handle for a scheduled task.
    pub struct TaskHandle;
}

/// Events tasks can wait for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SimEvent {
    /// Any key was pressed this tick.
    KeyDown,
}

/// When a task becomes due.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Trigger {
    /// At the start of the next tick.
    NextTick,
    /// Once this many seconds have passed.
    After(f32),
    /// The next time the event fires.
    OnEvent(SimEvent),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Due {
    Frame(u64),
    Time(f64),
    Event(SimEvent),
}

#[derive(Debug, Clone)]
struct Scheduled<A> {
    due: Due,
    owner: Option<EntityId>,
    action: A,
}

/// Queue of pending tasks with payload `A`.
#[derive(Debug, Clone)]
pub struct Scheduler<A> {
    tasks: SlotMap<TaskHandle, Scheduled<A>>,
    frame: u64,
    time: f64,
}

impl<A> Default for Scheduler<A> {
    fn default() -> Self {
        Self {
            tasks: SlotMap::with_key(),
            frame: 0,
            time: 0.0,
        }
    }
}

impl<A> Scheduler<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `action` for `trigger`, optionally owned by an entity.
    pub fn schedule(&mut self, trigger: Trigger, owner: Option<EntityId>, action: A) -> TaskHandle {
        let due = match trigger {
            Trigger::NextTick => Due::Frame(self.frame + 1),
            Trigger::After(seconds) => Due::Time(self.time + f64::from(seconds.max(0.0))),
            Trigger::OnEvent(event) => Due::Event(event),
        };
        self.tasks.insert(Scheduled { due, owner, action })
    }

    /// Cancel one task. Returns false if it already ran or was cancelled.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        self.tasks.remove(handle).is_some()
    }

    /// Cancel every task owned by `owner`, returning how many were dropped.
    pub fn cancel_owner(&mut self, owner: EntityId) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|_, task| task.owner != Some(owner));
        before - self.tasks.len()
    }

    /// Whether the task is still waiting.
    pub fn is_pending(&self, handle: TaskHandle) -> bool {
        self.tasks.contains_key(handle)
    }

    /// Number of tasks waiting.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Drop every task.
    pub fn clear(&mut self) {
        self.tasks.clear();
    }

    /// Move to a new tick and take every task that is now due.
    pub fn begin_tick(&mut self, frame: u64, time: f64) -> Vec<A> {
        self.frame = frame;
        self.time = time;
        self.take(|due| match due {
            Due::Frame(f) => f <= frame,
            Due::Time(t) => t <= time,
            Due::Event(_) => false,
        })
    }

    /// Take every task waiting on `event`.
    pub fn fire(&mut self, event: SimEvent) -> Vec<A> {
        self.take(|due| due == Due::Event(event))
    }

    fn take(&mut self, mut is_due: impl FnMut(Due) -> bool) -> Vec<A> {
        let handles: Vec<TaskHandle> = self
            .tasks
            .iter()
            .filter(|(_, task)| is_due(task.due))
            .map(|(handle, _)| handle)
            .collect();

        handles
            .into_iter()
            .filter_map(|handle| self.tasks.remove(handle))
            .map(|task| task.action)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn owners() -> (EntityId, EntityId) {
        let mut map: SlotMap<EntityId, ()> = SlotMap::with_key();
        (map.insert(()), map.insert(()))
    }

    #[test]
    fn test_next_tick() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(Trigger::NextTick, None, 1);

        assert!(scheduler.begin_tick(0, 0.0).is_empty());
        assert_eq!(scheduler.begin_tick(1, 0.1), vec![1]);
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_after_delay() {
        let mut scheduler = Scheduler::new();
        scheduler.begin_tick(1, 1.0);
        scheduler.schedule(Trigger::After(0.5), None, "late");

        assert!(scheduler.begin_tick(2, 1.25).is_empty());
        assert_eq!(scheduler.begin_tick(3, 1.5), vec!["late"]);
        // Single shot.
        assert!(scheduler.begin_tick(4, 2.0).is_empty());
    }

    #[test]
    fn test_event_tasks_wait_for_event() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(Trigger::OnEvent(SimEvent::KeyDown), None, 7);

        assert!(scheduler.begin_tick(10, 100.0).is_empty());
        assert_eq!(scheduler.fire(SimEvent::KeyDown), vec![7]);
        assert!(scheduler.fire(SimEvent::KeyDown).is_empty());
    }

    #[test]
    fn test_cancel() {
        let mut scheduler = Scheduler::new();
        let handle = scheduler.schedule(Trigger::NextTick, None, ());

        assert!(scheduler.is_pending(handle));
        assert!(scheduler.cancel(handle));
        assert!(!scheduler.cancel(handle));
        assert!(scheduler.begin_tick(1, 1.0).is_empty());
    }

    #[test]
    fn test_cancel_owner() {
        let (a, b) = owners();
        let mut scheduler = Scheduler::new();
        scheduler.schedule(Trigger::NextTick, Some(a), "a1");
        scheduler.schedule(Trigger::After(1.0), Some(a), "a2");
        scheduler.schedule(Trigger::NextTick, Some(b), "b");
        scheduler.schedule(Trigger::NextTick, None, "free");

        assert_eq!(scheduler.cancel_owner(a), 2);
        let mut due = scheduler.begin_tick(1, 5.0);
        due.sort();
        assert_eq!(due, vec!["b", "free"]);
    }

    #[test]
    fn test_reschedule_from_due_task() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(Trigger::NextTick, None, 0u32);

        for frame in 1..=3 {
            let due = scheduler.begin_tick(frame, frame as f64);
            assert_eq!(due.len(), 1);
            scheduler.schedule(Trigger::NextTick, None, due[0] + 1);
        }
        assert_eq!(scheduler.begin_tick(4, 4.0), vec![3]);
    }
}
