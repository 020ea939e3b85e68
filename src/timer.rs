//! Scheduled, non-blocking delayed actions. Countdowns, cooldowns, and
//! the celebration delay all live here as tick-deadline entries; nothing
//! ever blocks the tick loop. Every entry carries the generation it was
//! scheduled under, and a session restart bumps the generation so stale
//! entries are dropped instead of mutating fresh state.

/// What to do when a deadline is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerAction {
    /// Re-enable steering/physics on a clicked agent.
    EnableCollision(hecs::Entity),
    /// Accept pointer input again after the click debounce.
    ClickCooldownOver,
    /// Turn-announcement banner finished fading.
    AnnounceDone,
    /// The question has been on screen long enough; start the countdown.
    AskDelayDone,
    /// One countdown decrement.
    CountdownStep,
    /// Celebration finished; restart the session.
    CelebrationOver,
}

#[derive(Debug, Clone, Copy)]
struct TimerEntry {
    due_tick: u64,
    generation: u32,
    action: TimerAction,
}

/// Flat queue of pending delayed actions, drained once per tick.
#[derive(Default)]
pub struct TimerQueue {
    entries: Vec<TimerEntry>,
    generation: u32,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due_tick: u64, action: TimerAction) {
        self.entries.push(TimerEntry {
            due_tick,
            generation: self.generation,
            action,
        });
    }

    /// Invalidate everything scheduled so far. Entries from earlier
    /// generations are silently discarded when they come due.
    pub fn bump_generation(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.entries.clear();
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Collect every live action due at or before `now`, in deadline
    /// order, removing them from the queue.
    pub fn drain_due(&mut self, now: u64, out: &mut Vec<TimerAction>) {
        out.clear();
        let generation = self.generation;
        let mut due: Vec<TimerEntry> = Vec::new();
        self.entries.retain(|e| {
            if e.due_tick <= now {
                if e.generation == generation {
                    due.push(*e);
                }
                false
            } else {
                true
            }
        });
        due.sort_by_key(|e| e.due_tick);
        out.extend(due.iter().map(|e| e.action));
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
