pub mod classification;
pub mod job;
pub mod profile;
pub mod run_state;
