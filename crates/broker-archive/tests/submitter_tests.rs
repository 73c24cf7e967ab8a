use broker_archive::{ArchiveError, ArchiveSubmitter, Payload, SubmitterConfig};
use broker_submission::prelude::*;
use broker_test_utils::{init_tracing, sample_attributes, study_attributes, FakeArchiveClient};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;

fn sample_payload(_: &Submission, entity: &EntityHandle) -> Payload {
    json!({
        "alias": entity.attribute("sample_alias").and_then(|v| v.as_str().map(str::to_string)),
        "release": entity.attribute("release_date").and_then(|v| v.as_str().map(str::to_string)),
    })
}

fn submission_with_samples(count: usize) -> Submission {
    let submission = Submission::new();
    for n in 1..=count {
        let alias = format!("sample{n}");
        submission
            .map("sample", alias.clone(), sample_attributes("", &alias))
            .unwrap();
    }
    submission
}

#[tokio::test]
async fn successful_submission_records_accession() {
    init_tracing();
    let client = Arc::new(FakeArchiveClient::new("BioSamples", "SAMFAKE"));
    let submitter = ArchiveSubmitter::new(client.clone());
    let submission = submission_with_samples(1);
    let sample = submission.get_entity("sample", "sample1").unwrap();

    let accession = submitter
        .submit_entity(&sample, &json!({ "name": "FakeSample" }))
        .await
        .unwrap();

    assert_eq!(accession, "SAMFAKE1");
    assert_eq!(sample.accession("BioSamples").as_deref(), Some("SAMFAKE1"));
    assert_eq!(client.received(), vec![json!({ "name": "FakeSample" })]);
}

#[tokio::test]
async fn rejected_submission_is_recorded_and_returned() {
    init_tracing();
    let client = Arc::new(
        FakeArchiveClient::new("BioStudies", "S-BSST")
            .rejecting("study1", ArchiveError::validation("Submission validation errors.", 400)),
    );
    let submitter = ArchiveSubmitter::new(client);
    let submission = Submission::new();
    let study = submission.map("study", "study1", study_attributes()).unwrap();

    let err = submitter
        .submit_entity(&study, &json!({ "alias": "study1" }))
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(400));
    assert_eq!(err.message(), "Submission validation errors.");
    assert!(!study.has_accessions());
    assert_eq!(
        submission.get_errors("study")["study1"]["BioStudies"],
        vec!["validation rejected (400): Submission validation errors.".to_string()]
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn submit_all_accessions_every_entity() {
    init_tracing();
    let client = Arc::new(FakeArchiveClient::new("BioSamples", "SAME"));
    let submitter =
        ArchiveSubmitter::with_config(client.clone(), SubmitterConfig::new().with_max_in_flight(3));
    let submission = submission_with_samples(10);

    let report = submitter.submit_all(&submission, "sample", sample_payload).await;

    assert!(report.is_success());
    assert_eq!(report.archive, "BioSamples");
    assert_eq!(report.accessioned.len(), 10);
    assert_eq!(client.issued(), 10);
    assert_eq!(submission.get_all_accessions()["BioSamples"].len(), 10);
    assert!(submission.accession_conflicts().is_empty());
}

#[tokio::test]
async fn submit_all_reports_failures_per_entity() {
    init_tracing();
    let client = Arc::new(
        FakeArchiveClient::new("ENA", "ERS")
            .rejecting("sample2", ArchiveError::transport("connection reset"))
            .rejecting("sample3", ArchiveError::validation("missing checklist", 400)),
    );
    let submitter = ArchiveSubmitter::new(client);
    let submission = submission_with_samples(3);

    let report = submitter.submit_all(&submission, "sample", sample_payload).await;

    assert!(!report.is_success());
    assert_eq!(report.accessioned.len(), 1);
    assert_eq!(report.failed.len(), 2);
    assert_eq!(report.retryable(), vec![EntityIdentifier::new("sample", "sample2")]);
    assert_eq!(submission.get_errors("sample").len(), 2);
}

#[tokio::test]
async fn resubmission_skips_accessioned_entities() {
    init_tracing();
    let client = Arc::new(FakeArchiveClient::new("BioSamples", "SAME"));
    let submitter = ArchiveSubmitter::new(client.clone());
    let submission = submission_with_samples(2);
    submission
        .get_entity("sample", "sample1")
        .unwrap()
        .add_accession("BioSamples", "SAME999");

    let report = submitter.submit_all(&submission, "sample", sample_payload).await;

    assert_eq!(report.skipped, vec![EntityIdentifier::new("sample", "sample1")]);
    assert_eq!(report.accessioned.len(), 1);
    assert_eq!(client.issued(), 1);
}

#[tokio::test]
async fn payload_builder_can_resolve_links() {
    init_tracing();
    let client = Arc::new(FakeArchiveClient::new("BioStudies", "S-BSST"));
    let submitter = ArchiveSubmitter::new(client.clone());
    let submission = Submission::new();
    let study = submission.map("study", "study1", study_attributes()).unwrap();
    for n in [123, 456] {
        let sample = submission
            .map("sample", n.to_string(), Attributes::new())
            .unwrap();
        sample.add_accession("BioSamples", format!("SAME{n}"));
        study.add_link("sample", n.to_string());
    }

    let report = submitter
        .submit_all(&submission, "study", |submission, study| {
            let links: Vec<_> = submission
                .get_linked_accessions(study)
                .into_iter()
                .flat_map(|(archive, accessions)| {
                    accessions
                        .into_iter()
                        .map(move |accession| json!({ "url": accession, "type": archive.clone() }))
                })
                .collect();
            json!({ "alias": "study1", "links": links })
        })
        .await;

    assert!(report.is_success());
    let sent = client.received();
    assert_eq!(
        sent[0]["links"],
        json!([
            { "url": "SAME123", "type": "BioSamples" },
            { "url": "SAME456", "type": "BioSamples" }
        ])
    );
    assert_eq!(study.accession("BioStudies").as_deref(), Some("S-BSST1"));
}

#[tokio::test]
async fn response_without_accession_fails_the_entity() {
    init_tracing();
    let client = Arc::new(FakeArchiveClient::new("BioStudies", "S-BSST").without_accession("sample2"));
    let submitter = ArchiveSubmitter::new(client.clone());
    let submission = submission_with_samples(2);

    let report = submitter.submit_all(&submission, "sample", sample_payload).await;

    let failed = EntityIdentifier::new("sample", "sample2");
    assert!(matches!(report.failed[&failed], ArchiveError::MissingAccession { .. }));
    assert!(!report.failed[&failed].is_retryable());
    assert_eq!(report.accessioned.len(), 1);
    assert_eq!(client.issued(), 1);

    let sample2 = submission.get_entity("sample", "sample2").unwrap();
    assert!(!sample2.has_accessions());
    assert!(submission.get_errors("sample")["sample2"]["BioStudies"][0].contains("accno"));
}

#[tokio::test]
async fn resubmission_can_be_forced() {
    init_tracing();
    let client = Arc::new(FakeArchiveClient::new("BioSamples", "SAME"));
    let submitter = ArchiveSubmitter::with_config(
        client.clone(),
        SubmitterConfig::new().with_skip_accessioned(false),
    );
    let submission = submission_with_samples(1);
    let sample = submission.get_entity("sample", "sample1").unwrap();
    sample.add_accession("BioSamples", "SAME999");

    let report = submitter.submit_all(&submission, "sample", sample_payload).await;

    assert!(report.skipped.is_empty());
    assert_eq!(report.accessioned[&EntityIdentifier::new("sample", "sample1")], "SAME1");
    assert_eq!(client.issued(), 1);
}
