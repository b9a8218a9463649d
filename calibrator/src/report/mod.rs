pub mod model;
pub mod reporter;
