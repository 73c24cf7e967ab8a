//! Testing utilities for the submission broker workspace
//!
//! Shared fixtures, a fake archive client and tracing setup.

#![allow(missing_docs)]

use broker_archive::{accession_from_response, ArchiveClient, ArchiveError, Payload};
use broker_submission::{attributes, Attributes};
use parking_lot::Mutex;
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Once;

static TRACING: Once = Once::new();

/// Install a fmt subscriber honouring `RUST_LOG`, once per test binary
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    });
}

pub fn study_attributes() -> Attributes {
    attributes! {
        "study_accession" => "PRJEB12345",
        "study_alias" => "SARS-CoV-2 genomes 123ABC alias",
        "email_address" => "joe@example.com",
        "center_name" => "EBI",
        "study_name" => "SARS-CoV-2 genomes 123ABC name",
        "short_description" => "test short description",
        "abstract" => "test abstract",
        "release_date" => "2020-08-21",
    }
}

pub fn sample_attributes(accession: &str, alias: &str) -> Attributes {
    attributes! {
        "sample_accession" => accession,
        "sample_alias" => alias,
        "release_date" => "2020-08-21",
    }
}

pub fn run_experiment_attributes() -> Attributes {
    attributes! {
        "experiment_accession" => "EXP123",
        "experiment_alias" => "exp1",
        "release_date" => "2020-08-21",
    }
}

/// In-memory archive implementing only the submit contract
///
/// Answers each payload with an `{"accno": prefix + counter}` response and
/// reads the accession back out of it. Records every payload it receives,
/// fails payloads whose `alias` field was registered with `rejecting`, and
/// answers aliases registered with `without_accession` with an empty
/// response.
#[derive(Debug)]
pub struct FakeArchiveClient {
    name: String,
    prefix: String,
    issued: AtomicUsize,
    received: Mutex<Vec<Payload>>,
    rejections: HashMap<String, ArchiveError>,
    unaccessioned: HashSet<String>,
}

impl FakeArchiveClient {
    pub fn new(name: &str, prefix: &str) -> Self {
        Self {
            name: name.to_string(),
            prefix: prefix.to_string(),
            issued: AtomicUsize::new(0),
            received: Mutex::new(Vec::new()),
            rejections: HashMap::new(),
            unaccessioned: HashSet::new(),
        }
    }

    #[must_use]
    pub fn rejecting(mut self, alias: &str, error: ArchiveError) -> Self {
        self.rejections.insert(alias.to_string(), error);
        self
    }

    #[must_use]
    pub fn without_accession(mut self, alias: &str) -> Self {
        self.unaccessioned.insert(alias.to_string());
        self
    }

    pub fn received(&self) -> Vec<Payload> {
        self.received.lock().clone()
    }

    pub fn issued(&self) -> usize {
        self.issued.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ArchiveClient for FakeArchiveClient {
    fn archive_name(&self) -> &str {
        &self.name
    }

    async fn submit(&self, payload: &Payload) -> Result<String, ArchiveError> {
        self.received.lock().push(payload.clone());

        let alias = payload.get("alias").and_then(serde_json::Value::as_str);
        if let Some(error) = alias.and_then(|alias| self.rejections.get(alias)) {
            return Err(error.clone());
        }

        let response = if alias.is_some_and(|alias| self.unaccessioned.contains(alias)) {
            json!({ "status": "accepted" })
        } else {
            let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
            json!({ "accno": format!("{}{n}", self.prefix) })
        };
        accession_from_response(&response, "accno")
    }
}
