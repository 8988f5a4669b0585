pub mod partition_job;
pub mod trigger;
