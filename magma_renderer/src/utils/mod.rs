/// Small shared helpers

pub mod time_step;

pub use time_step::TimeStep;
