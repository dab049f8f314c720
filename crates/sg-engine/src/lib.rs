pub mod extract;
pub mod graph;
pub mod parser;
pub mod pipeline;

pub use extract::{extract, Extraction, ModelBuilder, ShapePolicy};
pub use pipeline::Pipeline;
