// Copyright 2026 Tomás Arrieta <tomas.arrieta@efflux-rs.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! A dedicated timer thread running deadline-ordered callbacks.

use std::cmp::Ordering as CmpOrdering;
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

/// Handle to one scheduled callback.
///
/// Cancelling flips a liveness flag that is honored in two places: a dead
/// entry is discarded when its deadline pops, and a periodic task that dies
/// mid-run is not rescheduled. Cancellation is idempotent.
#[derive(Clone)]
pub struct TaskHandle {
    task: Arc<TimerTask>,
}

impl TaskHandle {
    /// Prevents any further run of the callback.
    pub fn cancel(&self) {
        self.task.alive.store(false, Ordering::Release);
    }

    /// Returns `true` once the task has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        !self.task.alive.load(Ordering::Acquire)
    }
}

struct TimerTask {
    alive: AtomicBool,
    callback: Mutex<Box<dyn FnMut() + Send>>,
}

impl TimerTask {
    fn run_if_alive(&self) {
        if self.alive.load(Ordering::Acquire) {
            (self.callback.lock())();
        }
    }
}

struct Entry {
    deadline: Instant,
    seq: u64,
    period: Option<Duration>,
    task: Arc<TimerTask>,
}

// BinaryHeap is a max-heap; order entries so the earliest deadline is the
// greatest. `seq` breaks ties in submission order.
impl Ord for Entry {
    fn cmp(&self, other: &Self) -> CmpOrdering {
        other
            .deadline
            .cmp(&self.deadline)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.deadline == other.deadline && self.seq == other.seq
    }
}

impl Eq for Entry {}

struct SchedulerState {
    queue: BinaryHeap<Entry>,
    next_seq: u64,
    shutdown: bool,
}

struct SchedulerCore {
    name: String,
    state: Mutex<SchedulerState>,
    wakeup: Condvar,
}

/// A timer thread delivering callbacks at their deadlines.
///
/// Cloning is cheap; clones submit to the same thread. The worker exits
/// when the last handle is dropped. Most callers use the process-wide
/// [`Scheduler::shared`] instance; a dedicated instance isolates timing-
/// sensitive work from everything else.
///
/// Callbacks run on the timer thread, one at a time, so they must stay
/// short; stream sources only hand signals over and return.
#[derive(Clone)]
pub struct Scheduler {
    core: Arc<SchedulerCore>,
    _guard: Arc<ShutdownGuard>,
}

/// Tells the worker to exit once every `Scheduler` clone is gone.
struct ShutdownGuard {
    core: Arc<SchedulerCore>,
}

impl Drop for ShutdownGuard {
    fn drop(&mut self) {
        self.core.state.lock().shutdown = true;
        self.core.wakeup.notify_all();
    }
}

impl Scheduler {
    /// Spawns a named timer thread.
    pub fn new(name: impl Into<String>) -> Self {
        let core = Arc::new(SchedulerCore {
            name: name.into(),
            state: Mutex::new(SchedulerState {
                queue: BinaryHeap::new(),
                next_seq: 0,
                shutdown: false,
            }),
            wakeup: Condvar::new(),
        });

        let worker_core = core.clone();
        std::thread::Builder::new()
            .name(format!("efflux-timer-{}", core.name))
            .spawn(move || run_worker(worker_core))
            .unwrap_or_else(|error| panic!("failed to spawn timer thread: {error}"));

        Self {
            _guard: Arc::new(ShutdownGuard { core: core.clone() }),
            core,
        }
    }

    /// The process-wide default instance, spawned on first use.
    pub fn shared() -> Scheduler {
        static SHARED: OnceLock<Scheduler> = OnceLock::new();
        SHARED.get_or_init(|| Scheduler::new("shared")).clone()
    }

    /// Runs `callback` once, `delay` from now.
    pub fn schedule_once<F>(&self, delay: Duration, callback: F) -> TaskHandle
    where
        F: FnOnce() + Send + 'static,
    {
        let mut callback = Some(callback);
        self.submit(
            delay,
            None,
            Box::new(move || {
                if let Some(callback) = callback.take() {
                    callback();
                }
            }),
        )
    }

    /// Runs `callback` every `period`, starting `initial_delay` from now.
    ///
    /// Deadlines advance by whole periods from the previous deadline, not
    /// from when the callback happened to run, so the average rate holds
    /// even when individual ticks jitter.
    pub fn schedule_periodic<F>(
        &self,
        initial_delay: Duration,
        period: Duration,
        callback: F,
    ) -> TaskHandle
    where
        F: FnMut() + Send + 'static,
    {
        self.submit(initial_delay, Some(period), Box::new(callback))
    }

    fn submit(
        &self,
        delay: Duration,
        period: Option<Duration>,
        callback: Box<dyn FnMut() + Send>,
    ) -> TaskHandle {
        let task = Arc::new(TimerTask {
            alive: AtomicBool::new(true),
            callback: Mutex::new(callback),
        });
        {
            let mut state = self.core.state.lock();
            let seq = state.next_seq;
            state.next_seq += 1;
            state.queue.push(Entry {
                deadline: Instant::now() + delay,
                seq,
                period,
                task: task.clone(),
            });
        }
        self.core.wakeup.notify_all();
        tracing::trace!(scheduler = %self.core.name, ?delay, periodic = period.is_some(), "task scheduled");
        TaskHandle { task }
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("name", &self.core.name)
            .finish()
    }
}

fn run_worker(core: Arc<SchedulerCore>) {
    tracing::debug!(scheduler = %core.name, "timer thread started");
    let mut state = core.state.lock();
    loop {
        if state.shutdown {
            tracing::debug!(scheduler = %core.name, "timer thread stopping");
            return;
        }
        let now = Instant::now();
        match state.queue.peek() {
            None => {
                core.wakeup.wait(&mut state);
            }
            Some(entry) if entry.deadline > now => {
                let deadline = entry.deadline;
                core.wakeup.wait_until(&mut state, deadline);
            }
            Some(_) => {
                let entry = match state.queue.pop() {
                    Some(entry) => entry,
                    None => continue,
                };
                // Cancelled entries are discarded lazily, at their deadline.
                if !entry.task.alive.load(Ordering::Acquire) {
                    continue;
                }
                drop(state);
                entry.task.run_if_alive();
                state = core.state.lock();
                if let Some(period) = entry.period {
                    if entry.task.alive.load(Ordering::Acquire) {
                        let seq = state.next_seq;
                        state.next_seq += 1;
                        state.queue.push(Entry {
                            deadline: entry.deadline + period,
                            seq,
                            period: entry.period,
                            task: entry.task,
                        });
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU64;

    #[test]
    fn one_shot_task_fires_once() {
        let scheduler = Scheduler::new("test-once");
        let runs = Arc::new(AtomicU64::new(0));
        let counter = runs.clone();

        scheduler.schedule_once(Duration::from_millis(10), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        std::thread::sleep(Duration::from_millis(200));
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn cancelled_task_never_runs() {
        let scheduler = Scheduler::new("test-cancel");
        let runs = Arc::new(AtomicU64::new(0));
        let counter = runs.clone();

        let handle = scheduler.schedule_once(Duration::from_millis(50), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        handle.cancel();
        assert!(handle.is_cancelled());

        std::thread::sleep(Duration::from_millis(200));
        assert_eq!(runs.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn periodic_task_reruns_until_cancelled() {
        let scheduler = Scheduler::new("test-periodic");
        let runs = Arc::new(AtomicU64::new(0));
        let counter = runs.clone();

        let handle = scheduler.schedule_periodic(
            Duration::from_millis(5),
            Duration::from_millis(5),
            move || {
                counter.fetch_add(1, Ordering::SeqCst);
            },
        );

        while runs.load(Ordering::SeqCst) < 3 {
            std::thread::sleep(Duration::from_millis(5));
        }
        handle.cancel();
        std::thread::sleep(Duration::from_millis(50));
        let settled = runs.load(Ordering::SeqCst);
        std::thread::sleep(Duration::from_millis(100));

        assert_eq!(runs.load(Ordering::SeqCst), settled);
    }

    #[test]
    fn cancelling_from_inside_the_callback_stops_the_series() {
        let scheduler = Scheduler::new("test-self-cancel");
        let runs = Arc::new(AtomicU64::new(0));
        let handle_slot: Arc<Mutex<Option<TaskHandle>>> = Arc::new(Mutex::new(None));

        let counter = runs.clone();
        let slot = handle_slot.clone();
        let handle = scheduler.schedule_periodic(
            Duration::from_millis(5),
            Duration::from_millis(5),
            move || {
                if counter.fetch_add(1, Ordering::SeqCst) + 1 == 2 {
                    if let Some(handle) = slot.lock().as_ref() {
                        handle.cancel();
                    }
                }
            },
        );
        *handle_slot.lock() = Some(handle);

        std::thread::sleep(Duration::from_millis(200));
        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn tasks_fire_in_deadline_order() {
        let scheduler = Scheduler::new("test-order");
        let order: Arc<Mutex<Vec<&str>>> = Arc::new(Mutex::new(Vec::new()));

        let late = order.clone();
        scheduler.schedule_once(Duration::from_millis(60), move || late.lock().push("late"));
        let early = order.clone();
        scheduler.schedule_once(Duration::from_millis(10), move || early.lock().push("early"));

        std::thread::sleep(Duration::from_millis(250));
        assert_eq!(*order.lock(), vec!["early", "late"]);
    }
}
