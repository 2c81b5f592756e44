//! Operation traits implemented by runtime clients

mod merge;
mod search;
mod transform;

pub use merge::MergeOps;
pub use search::SearchOps;
pub use transform::TransformOps;
