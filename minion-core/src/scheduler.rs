//! Cooperative task queue for multi-tick minion operations.
//!
//! Tasks never run on their own thread. The registry drains whatever is due
//! at the start of each tick and runs it inline. A task that wants to yield
//! again simply schedules its continuation.
//!
//! Cancellation is by token: a cancelled task is removed from the queue, so
//! it can never fire late.

use std::collections::VecDeque;

use crate::types::{CreatureId, SimTime, Vec3};

/// Handle to a scheduled task, used for cancellation and staleness checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskToken(u64);

/// When a suspended task resumes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResumeAt {
    /// At or after a simulation time.
    Time(SimTime),
    /// On the next drain, whatever the time.
    NextTick,
}

impl ResumeAt {
    fn is_due(self, now: SimTime) -> bool {
        match self {
            Self::Time(at) => at <= now,
            Self::NextTick => true,
        }
    }
}

/// Work left for a reposition pass.
#[derive(Debug, Clone, PartialEq)]
pub struct RepositionJob {
    /// Followers still to be considered, in order.
    pub pending: VecDeque<CreatureId>,
}

impl RepositionJob {
    /// A job over the given followers.
    #[must_use]
    pub fn new(followers: impl IntoIterator<Item = CreatureId>) -> Self {
        Self {
            pending: followers.into_iter().collect(),
        }
    }
}

/// A suspended operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Task {
    /// End a push impulse on `creature`.
    ClearPush {
        /// The pushed minion.
        creature: CreatureId,
    },
    /// Continue placing followers near the player.
    Reposition(RepositionJob),
}

#[derive(Debug)]
struct Scheduled {
    token: TaskToken,
    resume_at: ResumeAt,
    task: Task,
}

/// Single-threaded queue of suspended tasks.
#[derive(Debug, Default)]
pub struct TaskQueue {
    next_token: u64,
    scheduled: Vec<Scheduled>,
}

impl TaskQueue {
    /// An empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Suspend `task` until `resume_at`.
    pub fn schedule(&mut self, resume_at: ResumeAt, task: Task) -> TaskToken {
        self.next_token += 1;
        let token = TaskToken(self.next_token);
        self.scheduled.push(Scheduled {
            token,
            resume_at,
            task,
        });
        token
    }

    /// Drop a pending task. Returns `false` if it already ran or was never
    /// scheduled.
    pub fn cancel(&mut self, token: TaskToken) -> bool {
        let before = self.scheduled.len();
        self.scheduled.retain(|s| s.token != token);
        self.scheduled.len() != before
    }

    /// Remove and return every task due at `now`, in scheduling order.
    ///
    /// Tasks scheduled while the returned batch is being run are not part of
    /// it, so a `NextTick` continuation always waits for the next drain.
    pub fn take_due(&mut self, now: SimTime) -> Vec<(TaskToken, Task)> {
        let (due, waiting): (Vec<_>, Vec<_>) = std::mem::take(&mut self.scheduled)
            .into_iter()
            .partition(|s| s.resume_at.is_due(now));
        self.scheduled = waiting;
        due.into_iter().map(|s| (s.token, s.task)).collect()
    }

    /// Number of pending tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.scheduled.len()
    }

    /// Whether nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scheduled.is_empty()
    }

    /// Pending push-clear tasks for one creature.
    #[must_use]
    pub fn pending_push_clears(&self, creature: CreatureId) -> usize {
        self.scheduled
            .iter()
            .filter(|s| matches!(s.task, Task::ClearPush { creature: c } if c == creature))
            .count()
    }

    /// Whether a reposition pass is still in flight.
    #[must_use]
    pub fn has_reposition(&self) -> bool {
        self.scheduled
            .iter()
            .any(|s| matches!(s.task, Task::Reposition(_)))
    }

    /// Forget everything, e.g. on area change.
    pub fn clear(&mut self) {
        self.scheduled.clear();
    }
}

/// Uniform sample in the square of half-extent `radius` around `center`,
/// lifted by `lift`.
pub(crate) fn square_sample<R: rand::Rng + ?Sized>(
    rng: &mut R,
    center: Vec3,
    radius: f32,
    lift: f32,
) -> Vec3 {
    let mut offset = || {
        if radius > 0.0 {
            rng.gen_range(-radius..radius)
        } else {
            0.0
        }
    };
    let (dx, dz) = (offset(), offset());
    Vec3::new(center.x + dx, center.y + lift, center.z + dz)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn timed_tasks_wait_for_their_time() {
        let mut q = TaskQueue::new();
        let c = CreatureId::new();
        q.schedule(ResumeAt::Time(SimTime(1.5)), Task::ClearPush { creature: c });

        assert!(q.take_due(SimTime(1.0)).is_empty());
        let due = q.take_due(SimTime(1.5));
        assert_eq!(due.len(), 1);
        assert!(q.is_empty());
    }

    #[test]
    fn cancelled_task_never_fires() {
        let mut q = TaskQueue::new();
        let c = CreatureId::new();
        let first = q.schedule(ResumeAt::Time(SimTime(1.5)), Task::ClearPush { creature: c });
        assert!(q.cancel(first));
        assert!(!q.cancel(first));
        let second = q.schedule(ResumeAt::Time(SimTime(2.0)), Task::ClearPush { creature: c });

        assert_eq!(q.pending_push_clears(c), 1);
        let due = q.take_due(SimTime(10.0));
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].0, second);
    }

    #[test]
    fn next_tick_continuation_waits_one_drain() {
        let mut q = TaskQueue::new();
        q.schedule(ResumeAt::NextTick, Task::Reposition(RepositionJob::new([])));
        let due = q.take_due(SimTime::ZERO);
        assert_eq!(due.len(), 1);

        q.schedule(ResumeAt::NextTick, Task::Reposition(RepositionJob::new([])));
        assert!(q.has_reposition());
        assert_eq!(q.take_due(SimTime::ZERO).len(), 1);
        assert!(!q.has_reposition());
    }

    #[test]
    fn tokens_are_unique() {
        let mut q = TaskQueue::new();
        let c = CreatureId::new();
        let a = q.schedule(ResumeAt::NextTick, Task::ClearPush { creature: c });
        let b = q.schedule(ResumeAt::NextTick, Task::ClearPush { creature: c });
        assert_ne!(a, b);
    }

    #[test]
    fn square_samples_stay_inside_extent() {
        let mut rng = StdRng::seed_from_u64(9);
        let center = Vec3::new(5.0, 0.0, -3.0);
        for _ in 0..500 {
            let p = square_sample(&mut rng, center, 3.0, 0.3);
            assert!((p.x - center.x).abs() <= 3.0);
            assert!((p.z - center.z).abs() <= 3.0);
            assert!((p.y - 0.3).abs() < 1e-6);
        }
    }
}
