pub mod change_detector;
pub mod change_set;

pub use change_detector::ChangeDetector;
pub use change_set::ChangeSet;
