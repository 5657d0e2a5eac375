pub mod book;
pub mod list;
pub mod materialize;
pub mod recurrence;
pub mod remind;
pub mod reschedule;
pub mod service;
pub mod staff;
pub mod status;
