pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod parser;
pub mod replay;
pub mod schedule;

pub use config::{OpenHours, OpenRange, SearchConfig, Settings};
pub use error::{Error, Result};
pub use schedule::{Outcome, Plan, Student};
