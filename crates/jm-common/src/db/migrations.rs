use deadpool_postgres::PoolError;
use thiserror::Error;
use tokio_postgres::Error as PgError;
use tracing::{info, instrument};

use crate::db::PgPool;

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("failed to get postgres connection: {0}")]
    Pool(#[from] PoolError),
    #[error("failed to run migration: {0}")]
    Postgres(#[from] PgError),
}

struct Migration {
    id: i32,
    description: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        id: 1,
        description: "jobseeker, job and application read model",
        sql: r#"
CREATE TABLE IF NOT EXISTS jobmatch.jobseekers (
    id BIGINT PRIMARY KEY,
    skills TEXT[] NOT NULL DEFAULT '{}',
    total_experience_years DOUBLE PRECISION,
    experience JSONB NOT NULL DEFAULT '[]'::jsonb,
    education JSONB NOT NULL DEFAULT '[]'::jsonb,
    availability JSONB NOT NULL DEFAULT '[]'::jsonb,
    longitude DOUBLE PRECISION,
    latitude DOUBLE PRECISION,
    preferred_salary DOUBLE PRECISION,
    preferred_industry TEXT,
    accepts_remote BOOLEAN,
    profile_completed BOOLEAN NOT NULL DEFAULT FALSE,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX IF NOT EXISTS idx_jobseekers_completed
    ON jobmatch.jobseekers(id)
    WHERE profile_completed;

CREATE TABLE IF NOT EXISTS jobmatch.jobs (
    id BIGINT PRIMARY KEY,
    title TEXT NOT NULL DEFAULT '',
    skills_required TEXT[] NOT NULL DEFAULT '{}',
    education TEXT,
    experience_level TEXT NOT NULL DEFAULT 'entry',
    availability JSONB NOT NULL DEFAULT '[]'::jsonb,
    longitude DOUBLE PRECISION,
    latitude DOUBLE PRECISION,
    remote_option BOOLEAN NOT NULL DEFAULT FALSE,
    min_salary DOUBLE PRECISION,
    max_salary DOUBLE PRECISION,
    industry TEXT,
    status TEXT NOT NULL DEFAULT 'active'
        CONSTRAINT chk_job_status CHECK (status IN ('active', 'closed', 'draft')),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX IF NOT EXISTS idx_jobs_active
    ON jobmatch.jobs(id)
    WHERE status = 'active';

CREATE TABLE IF NOT EXISTS jobmatch.applications (
    id BIGINT PRIMARY KEY,
    job_id BIGINT NOT NULL,
    applicant_id BIGINT NOT NULL,
    status TEXT NOT NULL DEFAULT 'applied',
    match_score SMALLINT
        CONSTRAINT chk_application_score CHECK (match_score BETWEEN 0 AND 100),
    applied_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX IF NOT EXISTS idx_applications_job
    ON jobmatch.applications(job_id, id);
"#,
    },
    Migration {
        id: 2,
        description: "per-job and per-jobseeker match cache",
        sql: r#"
CREATE TABLE IF NOT EXISTS jobmatch.job_matches (
    job_id BIGINT PRIMARY KEY,
    matches JSONB NOT NULL DEFAULT '[]'::jsonb,
    last_updated TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE TABLE IF NOT EXISTS jobmatch.jobseeker_matches (
    jobseeker_id BIGINT PRIMARY KEY,
    matches JSONB NOT NULL DEFAULT '[]'::jsonb,
    last_updated TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
"#,
    },
];

/// Applies pending migrations in order, each in its own transaction.
#[instrument(skip(pool))]
pub async fn run_migrations(pool: &PgPool) -> Result<(), MigrationError> {
    let mut client = pool.get().await?;
    client
        .batch_execute(
            "CREATE SCHEMA IF NOT EXISTS jobmatch;
             CREATE TABLE IF NOT EXISTS jobmatch.schema_migrations (
                id INTEGER PRIMARY KEY,
                description TEXT NOT NULL,
                applied_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
             );",
        )
        .await?;

    for migration in MIGRATIONS {
        let applied: bool = client
            .query_one(
                "SELECT EXISTS (SELECT 1 FROM jobmatch.schema_migrations WHERE id = $1)",
                &[&migration.id],
            )
            .await?
            .get(0);

        if applied {
            continue;
        }

        let tx = client.transaction().await?;
        tx.batch_execute(migration.sql).await?;
        tx.execute(
            "INSERT INTO jobmatch.schema_migrations (id, description) VALUES ($1, $2)",
            &[&migration.id, &migration.description],
        )
        .await?;
        tx.commit().await?;

        info!(id = migration.id, description = migration.description, "applied migration");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migration_ids_are_strictly_increasing() {
        let ids: Vec<_> = MIGRATIONS.iter().map(|m| m.id).collect();
        assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn migrations_stay_inside_the_schema() {
        for migration in MIGRATIONS {
            assert!(migration.sql.contains("jobmatch."), "migration {}", migration.id);
            assert!(!migration.sql.contains("DROP TABLE"), "migration {}", migration.id);
        }
    }
}
