#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use eval_api::EvalRequest;
use flatval::{EntryId, SerializedGraph, SessionId};
use flatval_repl::app::HostOps;
use flatval_repl::evaluator::Evaluator;
use serde_json::json;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartedEvaluation {
    pub session_id: SessionId,
    pub entry_id: EntryId,
    pub code: String,
}

#[derive(Default)]
pub struct HostSpy {
    pub started: Vec<StartedEvaluation>,
    pub fail_start: Option<String>,
    pub render_requests: usize,
    pub stop_requests: usize,
}

impl HostOps for HostSpy {
    fn start_evaluation(
        &mut self,
        session_id: SessionId,
        entry_id: EntryId,
        code: String,
    ) -> Result<(), String> {
        if let Some(error) = self.fail_start.clone() {
            return Err(error);
        }
        self.started.push(StartedEvaluation {
            session_id,
            entry_id,
            code,
        });
        Ok(())
    }

    fn request_render(&mut self) {
        self.render_requests += 1;
    }

    fn request_stop(&mut self) {
        self.stop_requests += 1;
    }
}

pub enum Scripted {
    Graph(SerializedGraph),
    Fail(String),
    Panic,
}

/// Answers requests from a script, in order, and records what it was asked.
#[derive(Default)]
pub struct StubEvaluator {
    script: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<EvalRequest>>,
}

impl StubEvaluator {
    pub fn new(script: Vec<Scripted>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<EvalRequest> {
        lock_unpoisoned(&self.requests).clone()
    }
}

impl Evaluator for StubEvaluator {
    fn evaluate(&self, request: EvalRequest) -> Result<SerializedGraph, String> {
        lock_unpoisoned(&self.requests).push(request);
        match lock_unpoisoned(&self.script).pop_front() {
            Some(Scripted::Graph(graph)) => Ok(graph),
            Some(Scripted::Fail(message)) => Err(message),
            Some(Scripted::Panic) => panic!("scripted evaluator panic"),
            None => Err("no scripted response".to_string()),
        }
    }
}

pub fn number_graph(value: i64) -> SerializedGraph {
    serde_json::from_value(json!({
        "root": "n",
        "serialized": {"n": {"type": "number", "value": value}}
    }))
    .expect("number graph fixture")
}

pub fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
