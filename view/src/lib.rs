mod layout;
mod outline;
mod render;

pub use crate::layout::*;
pub use crate::outline::*;
pub use crate::render::*;
