pub mod normalize_job;
