// Application layer - Store trait, render fan-out and use cases
pub mod dispatcher;
pub mod ingest_service;
pub mod render_job;
pub mod render_service;
pub mod series_store;

#[cfg(test)]
pub mod test_support;
