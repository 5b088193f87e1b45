//! # Direct API Smoke Checks
//!
//! Runs the three status-check calls against the direct API in order
//! (API root, create a status check, list status checks), records each
//! outcome, and summarizes. A check failing does not stop the later ones.

use std::fmt;

use serde_json::Value;

use super::adapter::BackendAdapter;
use super::error::BackendError;

/// Outcome of a single smoke check.
#[derive(Debug)]
pub struct CheckOutcome {
    /// Human-readable check name.
    pub name: &'static str,
    /// The decoded body on success, the error otherwise.
    pub result: Result<Value, BackendError>,
}

impl CheckOutcome {
    pub fn passed(&self) -> bool {
        self.result.is_ok()
    }
}

/// Counts and per-check outcomes of one smoke run.
#[derive(Debug, Default)]
pub struct SmokeReport {
    pub tests_run: usize,
    pub tests_passed: usize,
    pub outcomes: Vec<CheckOutcome>,
    /// The `id` of the created status check. A successful creation without
    /// one still counts as passed.
    pub created_id: Option<Value>,
}

impl SmokeReport {
    fn record(&mut self, name: &'static str, result: Result<Value, BackendError>) {
        self.tests_run += 1;
        match &result {
            Ok(_) => {
                self.tests_passed += 1;
                tracing::info!(check = name, "Smoke check passed");
            }
            Err(err) => tracing::warn!(check = name, error = %err, "Smoke check failed"),
        }
        self.outcomes.push(CheckOutcome { name, result });
    }

    pub fn all_passed(&self) -> bool {
        self.tests_passed == self.tests_run
    }

    /// Process exit code for the run: 0 when every check passed, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        if self.all_passed() {
            0
        } else {
            1
        }
    }

    /// Number of status checks returned by the listing call, when it
    /// succeeded with an array.
    pub fn listed_status_checks(&self) -> Option<usize> {
        self.outcomes
            .iter()
            .find(|outcome| outcome.name == LIST_STATUS_CHECKS)
            .and_then(|outcome| outcome.result.as_ref().ok())
            .and_then(Value::as_array)
            .map(Vec::len)
    }
}

impl fmt::Display for SmokeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tests passed: {}/{}", self.tests_passed, self.tests_run)
    }
}

const API_ROOT: &str = "Root API Endpoint";
const CREATE_STATUS_CHECK: &str = "Create Status Check";
const LIST_STATUS_CHECKS: &str = "Get Status Checks";

/// Runs every smoke check against `adapter`, creating the status check
/// under `client_name`.
pub async fn run_smoke_checks(adapter: &BackendAdapter, client_name: &str) -> SmokeReport {
    let health = adapter.health();
    let mut report = SmokeReport::default();

    report.record(API_ROOT, health.get_api_root().await);

    let created = health.create_status_check(client_name).await;
    report.created_id = created
        .as_ref()
        .ok()
        .and_then(|body| body.get("id"))
        .filter(|id| !id.is_null())
        .cloned();
    if created.is_ok() && report.created_id.is_none() {
        tracing::warn!(check = CREATE_STATUS_CHECK, "Created status check has no id");
    }
    report.record(CREATE_STATUS_CHECK, created);

    report.record(LIST_STATUS_CHECKS, health.list_status_checks().await);

    tracing::info!(
        tests_run = report.tests_run,
        tests_passed = report.tests_passed,
        "Smoke run finished"
    );
    report
}
