//! Per-state summaries of NOAA climate observations, plus the sorted string
//! list exercise that ships alongside them.

pub mod commands;
pub mod convert;
pub mod ingest;
pub mod record;
pub mod registry;
pub mod report;
pub mod sorted_list;

pub use convert::DisplayZone;
pub use registry::{Registry, StateAccumulator};
pub use sorted_list::SortedList;
