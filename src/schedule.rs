//! Tick-checked scheduled-task table.
//!
//! Cooldowns and timed effects are entries `(due, task)` polled once per tick
//! instead of asynchronous callbacks. A task is removed from the table before
//! it is handed back, so it can never fire twice; [`Scheduler::cancel_all`]
//! drops everything pending (run reset).

use std::time::Duration;

/// Something that should happen once the run clock reaches its due time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerTask {
    /// Stomp cooldown finished.
    StompReady,
    /// One Gummy Magnet pull.
    MagnetPulse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ScheduledTask {
    due: Duration,
    /// Insertion order, so tasks due on the same instant fire FIFO.
    seq: u64,
    task: TimerTask,
}

/// Run clock plus the pending task table.
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    now: Duration,
    next_seq: u64,
    tasks: Vec<ScheduledTask>,
}

impl Scheduler {
    /// Schedule `task` to fire `delay` after the current clock.
    pub fn schedule(&mut self, delay: Duration, task: TimerTask) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.tasks.push(ScheduledTask {
            due: self.now + delay,
            seq,
            task,
        });
    }

    /// Advance the clock by `dt` and take every task now due, earliest first.
    pub fn advance(&mut self, dt: Duration) -> Vec<TimerTask> {
        self.now += dt;
        let now = self.now;

        let mut due: Vec<ScheduledTask> = Vec::new();
        self.tasks.retain(|entry| {
            if entry.due <= now {
                due.push(*entry);
                false
            } else {
                true
            }
        });
        due.sort_by_key(|entry| (entry.due, entry.seq));
        due.into_iter().map(|entry| entry.task).collect()
    }

    /// Time left until the first pending `task`, if any is scheduled.
    pub fn remaining(&self, task: TimerTask) -> Option<Duration> {
        self.tasks
            .iter()
            .filter(|entry| entry.task == task)
            .map(|entry| entry.due.saturating_sub(self.now))
            .min()
    }

    /// Whether any magnet pulse is still pending.
    pub fn magnet_active(&self) -> bool {
        self.tasks.iter().any(|entry| entry.task == TimerTask::MagnetPulse)
    }

    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    pub fn cancel_all(&mut self) {
        self.tasks.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn task_fires_once_when_due() {
        let mut scheduler = Scheduler::default();
        scheduler.schedule(ms(3000), TimerTask::StompReady);

        assert!(scheduler.advance(ms(2999)).is_empty());
        assert_eq!(scheduler.advance(ms(1)), vec![TimerTask::StompReady]);
        assert!(scheduler.advance(ms(5000)).is_empty());
    }

    #[test]
    fn overdue_tasks_fire_in_due_order() {
        let mut scheduler = Scheduler::default();
        scheduler.schedule(ms(200), TimerTask::MagnetPulse);
        scheduler.schedule(ms(100), TimerTask::StompReady);

        let fired = scheduler.advance(ms(500));
        assert_eq!(fired, vec![TimerTask::StompReady, TimerTask::MagnetPulse]);
    }

    #[test]
    fn remaining_reports_time_left() {
        let mut scheduler = Scheduler::default();
        scheduler.schedule(ms(1000), TimerTask::StompReady);
        scheduler.advance(ms(250));
        assert_eq!(scheduler.remaining(TimerTask::StompReady), Some(ms(750)));
        assert_eq!(scheduler.remaining(TimerTask::MagnetPulse), None);
    }

    #[test]
    fn cancel_all_drops_pending_tasks() {
        let mut scheduler = Scheduler::default();
        scheduler.schedule(ms(10), TimerTask::StompReady);
        scheduler.schedule(ms(10), TimerTask::MagnetPulse);
        scheduler.cancel_all();

        assert_eq!(scheduler.pending(), 0);
        assert!(scheduler.advance(ms(100)).is_empty());
    }
}
