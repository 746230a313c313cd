pub mod comment;
pub mod diagnosis;
pub mod post;
pub mod profile;

pub use comment::{Comment, CommentInput, CommentReply, ReplyInput};
pub use diagnosis::DiagnosisRecord;
pub use post::{Post, PostInput};
pub use profile::UserProfile;
