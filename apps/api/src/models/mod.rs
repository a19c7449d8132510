pub mod feedback;
pub mod file;
pub mod resume;

pub use feedback::{Category, Feedback, Tip};
pub use file::FileHandle;
pub use resume::{FeedbackSlot, ResumeRecord};
