use std::sync::Arc;

use axum::{body::Body, http::Request, http::StatusCode, Router};
use chrono::{TimeZone, Utc};
use http_body_util::BodyExt;
use jm_common::store::MemoryStore;
use jm_common::{
    Application, ApplicationId, AvailabilitySlot, Candidate, CandidateId, ExperienceTier,
    GeoPoint, JobId, JobPosting,
};
use serde_json::Value;
use tower::ServiceExt;

const API_KEY: &str = "test-key";

fn sales_job(id: i64) -> JobPosting {
    JobPosting {
        id: JobId(id),
        title: "Sales associate".into(),
        skills_required: vec!["excel".into(), "sales".into()],
        experience_tier: ExperienceTier::Mid,
        location: Some(GeoPoint::new(77.0, 28.0)),
        availability: vec![
            AvailabilitySlot::new("Monday", "09:00", "13:00"),
            AvailabilitySlot::new("Tuesday", "09:00", "13:00"),
        ],
        ..JobPosting::default()
    }
}

fn jobseeker(id: i64, skills: &[&str], years: f64) -> Candidate {
    Candidate {
        id: CandidateId(id),
        skills: skills.iter().map(|s| s.to_string()).collect(),
        total_experience_years: Some(years),
        location: Some(GeoPoint::new(77.0, 28.036)),
        availability: vec![AvailabilitySlot::new("Monday", "12:00", "15:00")],
        profile_completed: true,
        ..Candidate::default()
    }
}

fn application(id: i64, job: i64, applicant: i64) -> Application {
    Application {
        id: ApplicationId(id),
        job_id: JobId(job),
        applicant_id: CandidateId(applicant),
        status: "applied".into(),
        match_score: None,
        applied_at: Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap(),
    }
}

fn app() -> Router {
    let store = Arc::new(MemoryStore::new());
    store.insert_job(sales_job(1)).unwrap();
    store.insert_candidate(jobseeker(10, &["excel"], 1.0)).unwrap();
    store.insert_candidate(jobseeker(11, &["excel", "sales"], 3.0)).unwrap();
    store.insert_candidate(jobseeker(12, &["Sales"], 1.0)).unwrap();
    store.insert_candidate(jobseeker(13, &["welding"], 9.0)).unwrap();
    store.insert_application(application(100, 1, 10)).unwrap();
    // Applicant profile no longer exists.
    store.insert_application(application(101, 1, 77)).unwrap();

    jm_api::create_router(jm_api::test_state_with_store(API_KEY, store))
}

async fn call(app: &Router, method: &str, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .header("x-api-key", API_KEY)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn pairs(body: &Value) -> Vec<(i64, Value)> {
    body["candidates"]
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| (entry["candidate_id"].as_i64().unwrap(), entry["score"].clone()))
        .collect()
}

#[tokio::test]
async fn ranks_candidates_for_a_job() {
    let app = app();

    let (status, body) = call(&app, "GET", "/api/jobs/1/candidates").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["job_id"], 1);
    assert_eq!(
        pairs(&body),
        vec![(11, 88.into()), (10, 58.into()), (12, 58.into())]
    );

    let (status, body) = call(&app, "GET", "/api/jobs/1/candidates?limit=1&cache_only=true").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(pairs(&body), vec![(11, 88.into())]);
}

#[tokio::test]
async fn rejects_zero_limit_and_unknown_job() {
    let app = app();

    let (status, body) = call(&app, "GET", "/api/jobs/1/candidates?limit=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "bad_request");

    let (status, body) = call(&app, "GET", "/api/jobs/99/candidates").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");
    assert_eq!(body["message"], "job 99 not found");
}

#[tokio::test]
async fn recommends_jobs_with_a_snapshot() {
    let app = app();

    let (status, body) = call(&app, "GET", "/api/jobseekers/10/recommendations").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["jobseeker_id"], 10);

    let recommendations = body["recommendations"].as_array().unwrap();
    assert_eq!(recommendations.len(), 1);
    assert_eq!(recommendations[0]["job_id"], 1);
    assert_eq!(recommendations[0]["score"], 58);
    assert_eq!(recommendations[0]["job"]["title"], "Sales associate");

    let (status, _) = call(&app, "GET", "/api/jobseekers/404/recommendations").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn scores_an_application_and_reads_it_back() {
    let app = app();

    let (status, body) = call(&app, "POST", "/api/applications/100/score").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["application_id"], 100);
    assert_eq!(body["match_score"], 58);
    assert_eq!(body["breakdown"]["skills"], 50);

    let (status, body) = call(&app, "GET", "/api/applications/100/score").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["match_score"], 58);

    let (status, _) = call(&app, "POST", "/api/applications/555/score").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn lists_applicants_with_lazy_scores() {
    let app = app();

    let (status, body) = call(&app, "GET", "/api/jobs/1/candidates?only_applied=true").await;
    assert_eq!(status, StatusCode::OK);

    let entries = body["candidates"].as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["application_id"], 100);
    assert_eq!(entries[0]["candidate_id"], 10);
    assert_eq!(entries[0]["score"], 58);
    assert_eq!(entries[0]["status"], "applied");
    assert_eq!(entries[1]["application_id"], 101);
    assert!(entries[1]["score"].is_null());
}
