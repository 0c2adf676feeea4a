//! Rendering pipeline: transcript entries and graph values to styled lines.

pub mod expansion;
pub mod frame;
pub mod graph;
pub mod transcript;

pub use expansion::{ExpansionState, OccurrenceKey, PathStep, RenderPath};
pub use frame::{Frame, Line, Span, Style};
pub use graph::{classify_string, GraphRenderer, StringKind};
pub use transcript::{render_entry, render_transcript};
