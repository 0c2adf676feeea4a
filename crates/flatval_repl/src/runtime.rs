use std::collections::VecDeque;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};

use eval_api::EvalRequest;
use flatval::{EntryId, SessionId};
use tracing::{debug, error};

use crate::app::{App, EvalOutcome, HostOps};
use crate::evaluator::Evaluator;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvalEvent {
    Completed {
        session_id: SessionId,
        /// The user-input entry this result answers.
        entry_id: EntryId,
        outcome: EvalOutcome,
    },
}

#[derive(Debug, Default)]
struct HostSignals {
    render_requested: bool,
    stop_requested: bool,
}

/// Runs evaluations off the UI thread and hands their results back to it.
///
/// Each submission gets its own worker thread. Workers never touch `App`;
/// they queue an [`EvalEvent`] and the UI thread applies queued events with
/// [`RuntimeController::flush_pending_events`], so all state transitions
/// happen on one thread in queue order.
pub struct RuntimeController {
    app: Arc<Mutex<App>>,
    evaluator: Arc<dyn Evaluator>,
    pending_events: Arc<Mutex<VecDeque<EvalEvent>>>,
    signals: Mutex<HostSignals>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    next_worker_id: AtomicU64,
}

impl RuntimeController {
    pub fn new(app: Arc<Mutex<App>>, evaluator: Arc<dyn Evaluator>) -> Arc<Self> {
        Arc::new(Self {
            app,
            evaluator,
            pending_events: Arc::new(Mutex::new(VecDeque::new())),
            signals: Mutex::new(HostSignals::default()),
            workers: Mutex::new(Vec::new()),
            next_worker_id: AtomicU64::new(1),
        })
    }

    fn start_evaluation_internal(
        self: &Arc<Self>,
        session_id: SessionId,
        entry_id: EntryId,
        code: String,
    ) -> Result<(), String> {
        let worker_id = self.next_worker_id.fetch_add(1, Ordering::SeqCst);
        let controller = Arc::clone(self);
        let request = EvalRequest::new(code, session_id.as_str());

        debug!(worker_id, %session_id, %entry_id, "spawning evaluation worker");
        let handle = thread::Builder::new()
            .name(format!("flatval-eval-{worker_id}"))
            .spawn(move || controller.run_worker(request, session_id, entry_id))
            .map_err(|error| format!("Failed to spawn evaluation worker: {error}"))?;

        let mut workers = lock_unpoisoned(&self.workers);
        workers.retain(|worker| !worker.is_finished());
        workers.push(handle);
        Ok(())
    }

    fn run_worker(self: Arc<Self>, request: EvalRequest, session_id: SessionId, entry_id: EntryId) {
        let evaluator = Arc::clone(&self.evaluator);
        let outcome = catch_unwind(AssertUnwindSafe(|| evaluator.evaluate(request)))
            .unwrap_or_else(|_| {
                error!(%session_id, %entry_id, "evaluator panicked");
                Err("Evaluator panicked".to_string())
            });

        self.enqueue_event(EvalEvent::Completed {
            session_id,
            entry_id,
            outcome,
        });
    }

    fn enqueue_event(&self, event: EvalEvent) {
        lock_unpoisoned(&self.pending_events).push_back(event);
        lock_unpoisoned(&self.signals).render_requested = true;
    }

    /// Applies every queued event to `App` and returns how many were applied.
    ///
    /// Must not be called while holding the `App` lock.
    pub fn flush_pending_events(&self) -> usize {
        let mut drained = 0usize;

        loop {
            let event = lock_unpoisoned(&self.pending_events).pop_front();
            match event {
                Some(event) => {
                    self.apply_event(event);
                    drained += 1;
                }
                None => break,
            }
        }

        if drained > 0 {
            lock_unpoisoned(&self.signals).render_requested = true;
        }
        drained
    }

    fn apply_event(&self, event: EvalEvent) {
        match event {
            EvalEvent::Completed {
                session_id,
                entry_id,
                outcome,
            } => {
                let applied =
                    lock_unpoisoned(&self.app).on_evaluation_complete(&session_id, outcome);
                debug!(%session_id, %entry_id, applied, "evaluation completed");
            }
        }
    }

    /// Returns and clears the pending render request.
    pub fn take_render_request(&self) -> bool {
        std::mem::take(&mut lock_unpoisoned(&self.signals).render_requested)
    }

    pub fn stop_requested(&self) -> bool {
        lock_unpoisoned(&self.signals).stop_requested
    }

    /// Number of evaluation workers that have not finished yet.
    pub fn in_flight(&self) -> usize {
        lock_unpoisoned(&self.workers)
            .iter()
            .filter(|worker| !worker.is_finished())
            .count()
    }

    /// Blocks until every spawned worker has finished. Events they queued
    /// still need [`RuntimeController::flush_pending_events`].
    pub fn join_workers(&self) {
        let workers = std::mem::take(&mut *lock_unpoisoned(&self.workers));
        for worker in workers {
            if worker.join().is_err() {
                error!("evaluation worker exited with a panic");
            }
        }
    }
}

impl HostOps for Arc<RuntimeController> {
    fn start_evaluation(
        &mut self,
        session_id: SessionId,
        entry_id: EntryId,
        code: String,
    ) -> Result<(), String> {
        self.start_evaluation_internal(session_id, entry_id, code)
    }

    fn request_render(&mut self) {
        lock_unpoisoned(&self.signals).render_requested = true;
    }

    fn request_stop(&mut self) {
        lock_unpoisoned(&self.signals).stop_requested = true;
    }
}

pub(crate) fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
