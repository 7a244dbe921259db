mod interval;

pub use interval::{split, Intervals};
