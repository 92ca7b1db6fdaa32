//! Wizard submission and workspace loading against a mock backend

mod common;

use common::{answers, harness, workspace_json};
use icpwiz_core::{
    CoreError, SubmitOutcome, SubmitTarget, WizardSession, WizardStep, WizardSubmitter,
    WorkspaceLoader,
};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_create_caches_workspace_and_answers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/workspaces"))
        .and(body_partial_json(json!({
            "name": "Acme Corp",
            "slug": "acme-corp",
            "company": { "domain": "acme.com" }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(workspace_json("w1", "acme-corp")))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server.uri(), Some("tok"));
    let submitter = WizardSubmitter::new(&h.api, &h.storage);
    let target = SubmitTarget::NewWorkspace {
        name: "Acme Corp".to_string(),
    };

    let outcome = submitter.submit(&answers(), &target).await.unwrap();
    let SubmitOutcome::Submitted(workspace) = outcome else {
        panic!("expected a submitted workspace");
    };
    assert_eq!(workspace.id, "w1");
    assert!(!submitter.is_submitting());

    let cached = h.storage.get_workspace("acme-corp").unwrap().unwrap();
    assert_eq!(cached, workspace);
    assert_eq!(h.storage.get_icp_data("w1").unwrap(), Some(answers()));
}

#[tokio::test]
async fn test_invalid_answers_never_reach_the_backend() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201).set_body_json(workspace_json("w1", "acme")))
        .expect(0)
        .mount(&server)
        .await;

    let h = harness(&server.uri(), Some("tok"));
    let submitter = WizardSubmitter::new(&h.api, &h.storage);

    let mut incomplete = answers();
    incomplete.target_account_segments[0].personas.clear();
    let mut session = WizardSession::with_answers(incomplete);

    let outcome = submitter
        .submit_session(
            &mut session,
            &SubmitTarget::NewWorkspace {
                name: "Acme".to_string(),
            },
        )
        .await
        .unwrap();

    let SubmitOutcome::Invalid(failure) = outcome else {
        panic!("expected validation failure");
    };
    assert_eq!(failure.step, WizardStep::Personas);
    assert_eq!(session.step(), WizardStep::Personas);
    assert!(h.storage.list_workspaces().unwrap().is_empty());

    let draft = submitter.draft("acme").unwrap().unwrap();
    assert_eq!(&draft, session.answers());
}

#[tokio::test]
async fn test_successful_submission_clears_the_draft() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/workspaces/acme"))
        .respond_with(ResponseTemplate::new(200).set_body_json(workspace_json("w1", "acme")))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server.uri(), Some("tok"));
    let submitter = WizardSubmitter::new(&h.api, &h.storage);
    let target = SubmitTarget::Existing {
        slug: "acme".to_string(),
    };

    let mut incomplete = answers();
    incomplete.company.domain.clear();
    let outcome = submitter.submit(&incomplete, &target).await.unwrap();
    assert!(matches!(outcome, SubmitOutcome::Invalid(_)));
    assert_eq!(submitter.draft("acme").unwrap(), Some(incomplete));

    let outcome = submitter.submit(&answers(), &target).await.unwrap();
    assert!(matches!(outcome, SubmitOutcome::Submitted(_)));
    assert_eq!(submitter.draft("acme").unwrap(), None);
}

#[tokio::test]
async fn test_second_submission_while_in_flight_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/workspaces/acme"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(workspace_json("w1", "acme"))
                .set_delay(Duration::from_millis(300)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server.uri(), Some("tok"));
    let submitter = WizardSubmitter::new(&h.api, &h.storage);
    let target = SubmitTarget::Existing {
        slug: "acme".to_string(),
    };
    let answers = answers();

    let second = async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        submitter.submit(&answers, &target).await
    };
    let (first, second) = tokio::join!(submitter.submit(&answers, &target), second);

    assert!(matches!(first, Ok(SubmitOutcome::Submitted(_))));
    assert!(matches!(second, Err(CoreError::SubmissionInProgress)));
    assert!(!submitter.is_submitting());
}

#[tokio::test]
async fn test_backend_failure_keeps_cache_untouched() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(422).set_body_json(json!({ "message": "Slug already taken" })),
        )
        .mount(&server)
        .await;

    let h = harness(&server.uri(), Some("tok"));
    let submitter = WizardSubmitter::new(&h.api, &h.storage);
    let result = submitter
        .submit(
            &answers(),
            &SubmitTarget::NewWorkspace {
                name: "Acme".to_string(),
            },
        )
        .await;

    match result {
        Err(CoreError::Api { status, message }) => {
            assert_eq!(status, Some(422));
            assert_eq!(message, "Slug already taken");
        }
        other => panic!("unexpected result: {:?}", other),
    }
    assert!(h.storage.list_workspaces().unwrap().is_empty());
    assert!(!submitter.is_submitting());
}

#[tokio::test]
async fn test_loader_reads_through_cache() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/workspaces/acme"))
        .respond_with(ResponseTemplate::new(200).set_body_json(workspace_json("w1", "acme")))
        .expect(2)
        .mount(&server)
        .await;

    let h = harness(&server.uri(), Some("tok"));
    let loader = WorkspaceLoader::new(&h.api, &h.storage);

    let fetched = loader.load("acme", false).await.unwrap();
    assert_eq!(fetched.id, "w1");
    // Served from the cache, no second request
    let cached = loader.load("acme", false).await.unwrap();
    assert_eq!(cached, fetched);
    // Forced refresh goes back to the backend
    loader.load("acme", true).await.unwrap();

    match loader.load("ghost", false).await {
        Err(CoreError::WorkspaceNotFound { slug }) => assert_eq!(slug, "ghost"),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn test_collaborators_fall_back_to_cache() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/workspaces/acme/collaborators"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let h = harness(&server.uri(), Some("tok"));
    let workspace: icpwiz_types::Workspace =
        serde_json::from_value(workspace_json("w1", "acme")).unwrap();
    h.storage
        .add_collaborator(
            "w1",
            icpwiz_types::Collaborator::new("pat@acme.io", icpwiz_types::CollaboratorRole::Editor),
        )
        .unwrap();

    let loader = WorkspaceLoader::new(&h.api, &h.storage);
    let collaborators = loader.collaborators(&workspace).await.unwrap();
    assert_eq!(collaborators.len(), 1);
    assert_eq!(collaborators[0].email, "pat@acme.io");
}
