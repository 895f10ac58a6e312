//! Event dispatch pipeline

mod dispatcher;

pub use dispatcher::{Dispatcher, FanoutMode};
