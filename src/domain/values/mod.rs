pub mod category;
pub mod category_config;
pub mod decay;
pub mod pipeline_stage;
pub mod score;
pub mod source_kind;
pub mod urgency;
