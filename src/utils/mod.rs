pub mod data;
pub mod display;
pub mod normalize;
pub mod snapshot;
