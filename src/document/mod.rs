pub mod color;
pub mod lookup;
pub mod model;
