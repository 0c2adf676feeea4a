//! Client-side core of the flatval REPL.
//!
//! Invariant: session and transcript state only change through
//! [`SessionRegistry`] transitions; renderers and history readers never
//! mutate it.
//!
//! # Public API Overview
//! - Decode evaluator results into a [`SerializedGraph`] and resolve nodes by [`NodeId`].
//! - Manage tabs with [`SessionRegistry`]; each [`Session`] owns a transcript and a [`History`].
//! - Render transcripts with [`render_transcript`] and graph values with [`GraphRenderer`],
//!   driven by a per-occurrence [`ExpansionState`].
//! - Read environment configuration with [`EnvConfig`] and install file logging with
//!   [`logging::init`].

pub mod config;
pub mod logging;

pub mod core;
pub mod render;

/// Evaluation result model.
pub use crate::core::graph::{
    ErrorValue, GraphError, NodeId, ObjectEntry, SerializedGraph, SerializedNode,
};
/// Input recall.
pub use crate::core::history::History;
/// Tabs and their lifecycle.
pub use crate::core::registry::{RegistryError, RegistryEvent, SessionRegistry};
/// One REPL conversation.
pub use crate::core::session::{EntryId, Session, SessionId, TranscriptEntry};

/// Styled render model and renderers.
pub use crate::render::{
    classify_string, render_entry, render_transcript, ExpansionState, Frame, GraphRenderer,
    Line, OccurrenceKey, PathStep, RenderPath, Span, StringKind, Style,
};

pub use crate::config::EnvConfig;
