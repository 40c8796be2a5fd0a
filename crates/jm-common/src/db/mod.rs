pub mod applications;
pub mod match_cache;
pub mod migrations;
pub mod pool;
pub mod population;
pub mod store;

pub use applications::{fetch_application, fetch_applications_for_job, update_match_score};
pub use match_cache::{
    delete_job_matches, delete_jobseeker_matches, fetch_job_matches, fetch_jobseeker_matches,
    upsert_job_matches, upsert_jobseeker_matches,
};
pub use migrations::{run_migrations, MigrationError};
pub use pool::{create_pool_from_url, DbPoolError, PgPool};
pub use population::{
    fetch_candidate, fetch_job, stream_active_jobs, stream_completed_candidates,
    DEFAULT_FETCH_BATCH,
};
pub use store::PgStore;
