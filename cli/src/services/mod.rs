pub mod merger;
pub mod pipeline;
pub mod table_builder;

pub use merger::*;
pub use pipeline::*;
pub use table_builder::*;
