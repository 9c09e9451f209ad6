pub mod dedup;
pub mod normalize;
pub mod pipeline;
pub mod rank;
pub mod scoring;
pub mod summarize;
