pub mod comment;
pub mod summary;

pub use comment::{count_replies, CommentKind, CommentRecord};
pub use summary::{ModelCandidates, SummaryResult};
