mod table;
mod document;
mod model;
mod store;

pub use crate::table::*;
pub use crate::document::*;
pub use crate::model::*;
pub use crate::store::*;
