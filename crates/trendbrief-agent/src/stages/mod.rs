//! Pipeline stages.
//!
//! Each stage is a free function taking only the fields it reads and
//! returning only the field it owns; the orchestrator in
//! [`crate::pipeline`] threads them through the shared
//! [`crate::PipelineState`].

mod evidence;
mod finalize;
mod intent;
mod refine;
mod synthesize;

pub use evidence::fetch_evidence;
pub use finalize::finalize;
pub use intent::{extract_intent, Intent};
pub use refine::refine;
pub use synthesize::synthesize;
