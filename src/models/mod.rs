//! Data types shared by sources, the dispatcher and the seen engine.

mod job;
mod search;

pub use job::Job;
pub use search::{JobType, SearchParams};
