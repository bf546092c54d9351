//! Strength tiers for teams and conferences

pub mod assignment;
pub mod classifier;

pub use assignment::{TierAssignment, TierAssignments};
pub use classifier::TierClassifier;
