// Domain layer - Timescales, readings and the pure charting algorithms
pub mod error;
pub mod reading;
pub mod slice;
pub mod style;
pub mod tick_plan;
pub mod timescale;
pub mod window;
