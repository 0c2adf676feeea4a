//! Terminal REPL front end for the flatval evaluator.
//!
//! ## Configuration
//!
//! - `FLATVAL_URL`: evaluator base URL, `/eval` is appended (default `http://127.0.0.1:3000`)
//! - `FLATVAL_TIMEOUT_SEC`: optional request timeout in seconds, must be > 0
//! - `FLATVAL_LOG`: optional log file; `RUST_LOG` filters it (default `info`)
//!
//! ## Threading
//!
//! `App` state is only mutated on the UI thread. Evaluations run on worker
//! threads owned by [`runtime::RuntimeController`], whose results are queued
//! and applied when the UI loop flushes the queue. A result for a tab that was
//! closed or reset in the meantime is dropped.

pub mod app;
pub mod commands;
pub mod editor;
pub mod evaluator;
pub mod runtime;
pub mod terminal;
pub mod tui;
