pub mod opportunity_set;
pub mod scored_signal;
pub mod signal;
