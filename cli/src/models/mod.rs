pub mod kpi;
pub mod metric_set;
pub mod table;
pub mod ticker;
pub mod value;

pub use kpi::*;
pub use metric_set::*;
pub use table::*;
pub use ticker::*;
pub use value::*;
