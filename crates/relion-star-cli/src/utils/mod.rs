pub mod files;
pub mod predicate;
pub mod progress;
