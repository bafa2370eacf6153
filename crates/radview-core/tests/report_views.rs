use std::num::NonZeroUsize;

use httpmock::prelude::*;
use radview_api_models::{ReportId, ReportStatus};
use radview_config::ClientSettings;
use radview_core::{
    ApiClient, DetailMode, LoadState, MemoryCredentialStore, PredictionClient, ReportDetailView,
    ReportEdit, Session, SessionStore, ViewError,
};
use radview_test_support::fixtures::{prediction_json, report_json, template_catalog, template_json};
use serde_json::json;

fn api_for(server: &MockServer) -> ApiClient {
    let config = ClientSettings {
        api_url: Some(server.base_url()),
        predict_url: Some(server.url("/ml")),
        credential_path: Some("unused.json".into()),
        ..ClientSettings::default()
    }
    .validate()
    .expect("settings validate");
    ApiClient::new(&config, None).expect("client builds")
}

fn session() -> Session {
    SessionStore::restore(MemoryCredentialStore::with_token("tok"))
        .session()
        .clone()
}

fn mock_catalog(server: &MockServer) {
    server.mock(|when, then| {
        when.method(GET).path("/templates");
        then.status(200).json_body(template_catalog(vec![
            template_json("t-1", "Chest PA", &["Clear lung fields"], "No acute disease"),
            template_json("t-2", "Chest Follow-up", &["Improved opacity"], "Resolving"),
        ]));
    });
}

#[tokio::test]
async fn revised_report_is_saved_and_refetched() {
    let server = MockServer::start_async().await;
    mock_catalog(&server);
    let fetch = server.mock(|when, then| {
        when.method(GET).path("/report/r-1");
        then.status(200)
            .json_body(json!({"report": report_json("r-1", "Jane Roe", "Complete")}));
    });
    let update = server.mock(|when, then| {
        when.method(PUT)
            .path("/report/r-1")
            .header("authorization", "Bearer tok")
            .body_includes(r#""status":"In Review""#)
            .body_includes(r#""reportTemplate":"Chest Follow-up""#)
            .body_includes(r#""findings":["Improved opacity"]"#)
            .body_includes(r#""doctor_feedback":"Compare with prior""#)
            .body_includes(r#""isChest":true"#);
        then.status(200).json_body(json!({"message": "updated"}));
    });

    let api = api_for(&server);
    let session = session();
    let mut view = ReportDetailView::new(ReportId::from("r-1"));
    view.load(&api, &session).await;
    assert_eq!(view.state(), &LoadState::Ready);
    assert_eq!(view.templates().len(), 2);

    view.enter_edit_mode().expect("complete report can be revised");
    view.apply_edit(&ReportEdit::Status(ReportStatus::InReview))
        .expect("status while revising");
    view.apply_edit(&ReportEdit::Feedback("Compare with prior".into()))
        .expect("feedback while revising");
    view.select_template("Chest Follow-up").expect("template exists");

    view.save(&api, &session).await.expect("save succeeds");
    update.assert();
    fetch.assert_calls(2);
    assert_eq!(view.mode(), DetailMode::ReadOnly);
    assert!(view.selected_template().is_none());
    assert!(!view.is_dirty());
}

#[tokio::test]
async fn rejected_save_keeps_draft_for_retry() {
    let server = MockServer::start_async().await;
    mock_catalog(&server);
    server.mock(|when, then| {
        when.method(GET).path("/report/r-1");
        then.status(200)
            .json_body(json!({"report": report_json("r-1", "Jane Roe", "Pending")}));
    });
    server.mock(|when, then| {
        when.method(PUT).path("/report/r-1");
        then.status(500).json_body(json!({"message": "write failed"}));
    });

    let api = api_for(&server);
    let session = session();
    let mut view = ReportDetailView::new(ReportId::from("r-1"));
    view.load(&api, &session).await;
    assert!(view.awaiting_information());
    view.apply_edit(&ReportEdit::History("Added smoking history".into()))
        .expect("history is editable");

    let err = view.save(&api, &session).await.expect_err("save rejected");
    assert!(matches!(err, ViewError::Api(_)));
    assert_eq!(err.to_string(), "update report returned status 500: write failed");
    assert_eq!(
        view.draft().map(|r| r.history.as_str()),
        Some("Added smoking history")
    );
    assert!(view.is_dirty());
}

#[tokio::test]
async fn save_without_token_is_refused() {
    let server = MockServer::start_async().await;
    let api = api_for(&server);
    let mut view = ReportDetailView::new(ReportId::from("r-1"));
    view.load(&api, &Session::default()).await;
    assert_eq!(view.state(), &LoadState::Idle);
    assert!(matches!(
        view.save(&api, &Session::default()).await,
        Err(ViewError::Unauthenticated)
    ));
}

#[tokio::test]
async fn one_failed_image_does_not_affect_its_sibling() {
    let server = MockServer::start_async().await;
    mock_catalog(&server);
    server.mock(|when, then| {
        when.method(GET).path("/report/r-1");
        then.status(200)
            .json_body(json!({"report": report_json("r-1", "Jane Roe", "Complete")}));
    });
    server.mock(|when, then| {
        when.method(GET).path("/images/r-1-1.jpg");
        then.status(200).body(vec![0xFF, 0xD8, 0xFF, 0xE0]);
    });
    server.mock(|when, then| {
        when.method(GET).path("/images/r-1-2.jpg");
        then.status(404);
    });
    let predict = server.mock(|when, then| {
        when.method(POST)
            .path("/ml/predict")
            .header("authorization", "Bearer tok")
            .body_includes("name=\"image\"")
            .body_includes("filename=\"image.jpg\"");
        then.status(200)
            .json_body(prediction_json("Normal chest", 0.8421));
    });

    let api = api_for(&server);
    let session = session();
    let mut view = ReportDetailView::new(ReportId::from("r-1"));
    view.load(&api, &session).await;

    let client = PredictionClient::new(api.clone(), NonZeroUsize::MIN);
    view.run_predictions(&client, &session)
        .await
        .expect("predictions run");

    predict.assert_calls(1);
    let slots = view.predictions();
    assert_eq!(slots.len(), 2);
    let first = slots[0].as_ref().expect("first image classified");
    assert_eq!(first.label, "chest");
    assert!((first.confidence_percent - 84.2).abs() < f64::EPSILON);
    let second = slots[1].as_ref().expect("second image has a slot");
    assert!(second.is_error());
    assert_eq!(second.label, "Error in prediction");
    assert!(second.confidence_percent.abs() < f64::EPSILON);
}

#[tokio::test]
async fn blank_image_url_gets_no_prediction() {
    let server = MockServer::start_async().await;
    mock_catalog(&server);
    let mut report = report_json("r-2", "John Doe", "Complete");
    report["xrayFiles"][0]["imageUrl"] = json!("");
    server.mock(move |when, then| {
        when.method(GET).path("/report/r-2");
        then.status(200).json_body(json!({ "report": report }));
    });
    let root = server.mock(|when, then| {
        when.method(GET).path("/");
        then.status(200).body("service root");
    });
    server.mock(|when, then| {
        when.method(GET).path("/images/r-2-2.jpg");
        then.status(200).body(vec![0xFF, 0xD8]);
    });
    let predict = server.mock(|when, then| {
        when.method(POST).path("/ml/predict");
        then.status(200)
            .json_body(prediction_json("Normal chest", 0.8421));
    });

    let api = api_for(&server);
    let session = session();
    let mut view = ReportDetailView::new(ReportId::from("r-2"));
    view.load(&api, &session).await;
    let client = PredictionClient::new(api.clone(), NonZeroUsize::MIN);
    view.run_predictions(&client, &session)
        .await
        .expect("predictions run");

    assert_eq!(root.calls(), 0);
    predict.assert_calls(1);
    assert_eq!(view.predictions()[0], None);
    assert_eq!(
        view.predictions()[1].as_ref().map(|result| result.label.as_str()),
        Some("chest")
    );
}
