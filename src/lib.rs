pub mod construction;
pub mod error;
pub mod measure;
pub mod pattern;
pub mod render;
pub mod requirements;
pub mod types;
pub mod weave;
