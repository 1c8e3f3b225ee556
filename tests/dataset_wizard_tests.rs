mod common;

use common::{preview, tenant, workflows, ScriptedSource};
use trainboard::api::{DataSource, MockBackend, RunCatalog};
use trainboard::error::{FetchError, WizardError};
use trainboard::models::{ArtifactType, QualityFlag};
use trainboard::wizard::dataset::{DatasetEdit, STEP_CUSTOMER, STEP_FILTERS, STEP_PREVIEW, STEP_SAVE};
use trainboard::wizard::{DatasetWizard, NoticeLevel};

async fn wizard_on_preview(source: &ScriptedSource) -> DatasetWizard {
    let mut wizard = DatasetWizard::new();
    wizard.select_tenant_with(&tenant("tenant_001", "Customer A"), source).await;
    wizard.advance_with(source).await.unwrap();
    assert_eq!(wizard.current_step(), STEP_FILTERS);
    wizard.advance_with(source).await.unwrap();
    assert_eq!(wizard.current_step(), STEP_PREVIEW);
    wizard
}

#[tokio::test]
async fn test_happy_path_saves_once_with_preview_fetch_id() {
    let source = ScriptedSource::new();
    let mut wizard = wizard_on_preview(&source).await;

    let shown = wizard.form().preview.clone().unwrap();
    assert_eq!(shown.fetch_id, "fetch_1");
    assert_eq!(shown.record_count, 12345);

    wizard.advance().unwrap();
    assert_eq!(wizard.current_step(), STEP_SAVE);
    wizard
        .apply_edit(DatasetEdit::SetName { name: "Test Dataset".into() })
        .unwrap();

    let saved = wizard.submit(&source).await.unwrap();
    assert_eq!(saved.training_data_preparation_id, "data_gen_1");

    let calls = source.save_calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].fetch_id, "fetch_1");
    assert_eq!(calls[0].dataset_name, "Test Dataset");
    assert_eq!(calls[0].filters.tenant_id.as_deref(), Some("tenant_001"));
    assert_eq!(calls[0].filters.customer_name.as_deref(), Some("Customer A"));
    assert!(!wizard.is_submitting());

    let notices = wizard.notices_mut().drain();
    assert!(notices
        .iter()
        .any(|n| n.level == NoticeLevel::Success && n.message == "Dataset created successfully!"));
}

#[tokio::test]
async fn test_zero_record_preview_blocks_continue() {
    let source = ScriptedSource::new();
    source.set_preview(Ok(preview("fetch_9", 0)));
    let mut wizard = wizard_on_preview(&source).await;

    assert!(!wizard.can_advance());
    assert_eq!(wizard.advance().unwrap_err(), WizardError::StepBlocked(STEP_PREVIEW));
    assert_eq!(wizard.current_step(), STEP_PREVIEW);
}

#[tokio::test]
async fn test_customer_step_requires_a_tenant() {
    let source = ScriptedSource::new();
    let mut wizard = DatasetWizard::new();
    assert_eq!(wizard.advance_with(&source).await, Err(WizardError::StepBlocked(STEP_CUSTOMER)));
    assert_eq!(wizard.current_step(), STEP_CUSTOMER);
    assert!(source.preview_calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_late_response_for_previous_tenant_is_dropped() {
    let source = ScriptedSource::new();
    source.set_workflows("tenant_002", Ok(workflows("b", 2)));
    source.set_models("tenant_002", ArtifactType::Trtllm, vec![common::model("trt_b", ArtifactType::Trtllm, Some("tenant_002"))]);
    let release_a = source.hold_workflows("tenant_001");

    let mut wizard = DatasetWizard::new();
    let load_a = wizard.select_tenant(&tenant("tenant_001", "Customer A"));
    let load_b = wizard.select_tenant(&tenant("tenant_002", "Customer B"));

    assert!(wizard.workflows().loading);
    assert!(wizard.workflows().items.is_empty());
    assert!(wizard.asr_models().loading);

    let pending_a = load_a.fetch(&source);
    let loaded_b = load_b.fetch(&source).await;
    assert!(wizard.apply_tenant_load(loaded_b));

    release_a.send(Ok(workflows("a", 3))).unwrap();
    let loaded_a = pending_a.await;
    assert!(!wizard.apply_tenant_load(loaded_a));

    let ids: Vec<_> = wizard.workflows().items.iter().map(|w| w.workflow_id.as_str()).collect();
    assert_eq!(ids, vec!["b_wf_1", "b_wf_2"]);
    assert_eq!(wizard.asr_models().items.len(), 1);
    assert!(!wizard.workflows().loading);
    assert_eq!(wizard.form().tenant_id, "tenant_002");
}

#[tokio::test]
async fn test_failed_load_empties_options_and_notifies() {
    let source = ScriptedSource::new();
    source.set_workflows("tenant_001", Err(FetchError::Network("connection refused".into())));

    let mut wizard = DatasetWizard::new();
    assert!(wizard.select_tenant_with(&tenant("tenant_001", "Customer A"), &source).await);

    assert!(wizard.workflows().error);
    assert!(!wizard.workflows().loading);
    assert!(wizard.workflows().items.is_empty());
    let notices = wizard.notices_mut().drain();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);

    // Filters are optional, so the wizard is not stuck.
    wizard.advance().unwrap();
    assert_eq!(wizard.current_step(), STEP_FILTERS);
}

#[tokio::test]
async fn test_filter_edit_during_preview_drops_the_result() {
    let source = ScriptedSource::new();
    let mut wizard = DatasetWizard::new();
    wizard.select_tenant_with(&tenant("tenant_001", "Customer A"), &source).await;
    wizard.advance().unwrap();
    let load = wizard.advance().unwrap().expect("entering preview starts a fetch");
    assert!(wizard.is_preview_loading());

    wizard
        .apply_edit(DatasetEdit::SetFlag {
            flag: QualityFlag::IsNoisy,
            value: Some(false),
        })
        .unwrap();
    let outcome = load.fetch(&source).await;
    assert!(!wizard.apply_preview(outcome));
    assert!(wizard.form().preview.is_none());
    assert!(!wizard.can_advance());

    let retry = wizard.begin_preview();
    assert_eq!(retry.request().filters.is_noisy, Some(false));
    let outcome = retry.fetch(&source).await;
    assert!(wizard.apply_preview(outcome));
    assert!(wizard.can_advance());
}

#[tokio::test]
async fn test_back_navigation_needs_no_validation() {
    let source = ScriptedSource::new();
    let mut wizard = wizard_on_preview(&source).await;
    wizard.advance().unwrap();

    wizard.apply_edit(DatasetEdit::SetName { name: "   ".into() }).unwrap();
    assert!(wizard.retreat());
    assert_eq!(wizard.current_step(), STEP_PREVIEW);
    assert!(wizard.retreat());
    assert!(wizard.retreat());
    assert_eq!(wizard.current_step(), STEP_CUSTOMER);
    assert!(!wizard.retreat());
}

#[tokio::test]
async fn test_save_failure_keeps_everything() {
    let source = ScriptedSource::new();
    source.set_save(Err(FetchError::Status {
        status: 500,
        reason: "Internal Server Error".into(),
    }));
    let mut wizard = wizard_on_preview(&source).await;
    wizard.advance().unwrap();
    wizard.apply_edit(DatasetEdit::SetName { name: "Test Dataset".into() }).unwrap();
    let before = wizard.form().clone();

    let err = wizard.submit(&source).await.unwrap_err();
    assert!(matches!(err, WizardError::Fetch(FetchError::Status { status: 500, .. })));
    assert!(!wizard.is_submitting());
    assert_eq!(wizard.current_step(), STEP_SAVE);
    assert_eq!(wizard.form(), &before);
    let notices = wizard.notices_mut().drain();
    assert!(notices.iter().any(|n| n.message == "Failed to create dataset"));

    // Retry goes through once the backend recovers.
    source.set_save(Ok(trainboard::models::SavedDataset {
        training_data_preparation_id: "data_gen_2".into(),
        s3_root_path: "s3://datasets/test-dataset/data_gen_2/".into(),
        record_count: 12345,
    }));
    assert!(wizard.submit(&source).await.is_ok());
    assert_eq!(source.save_calls.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn test_second_submit_while_in_flight_is_refused() {
    let source = ScriptedSource::new();
    let mut wizard = wizard_on_preview(&source).await;
    wizard.advance().unwrap();
    wizard.apply_edit(DatasetEdit::SetName { name: "Test Dataset".into() }).unwrap();

    let request = wizard.begin_submit().unwrap();
    assert!(wizard.is_submitting());
    assert_eq!(wizard.begin_submit().unwrap_err(), WizardError::SubmissionInFlight);

    let result = source.save_dataset(&request).await;
    wizard.finish_submit(result).unwrap();
    assert!(!wizard.is_submitting());
}

#[tokio::test]
async fn test_back_navigation_while_save_in_flight() {
    let source = ScriptedSource::new();
    let mut wizard = wizard_on_preview(&source).await;
    wizard.advance().unwrap();
    wizard.apply_edit(DatasetEdit::SetName { name: "Test Dataset".into() }).unwrap();

    let request = wizard.begin_submit().unwrap();
    assert!(wizard.retreat());
    assert_eq!(wizard.current_step(), STEP_PREVIEW);
    assert!(wizard.is_submitting());

    let result = source.save_dataset(&request).await;
    wizard.finish_submit(result).unwrap();
    assert!(!wizard.is_submitting());
    assert_eq!(wizard.current_step(), STEP_PREVIEW);
    assert_eq!(source.save_calls.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_submit_only_on_final_step() {
    let source = ScriptedSource::new();
    let mut wizard = wizard_on_preview(&source).await;
    assert_eq!(wizard.begin_submit().unwrap_err(), WizardError::NotOnFinalStep(STEP_PREVIEW));
    assert!(!wizard.is_submitting());
}

#[tokio::test]
async fn test_fixture_backend_round_trip() {
    let backend = MockBackend::new();
    let tenants = backend.list_tenants().await.unwrap();
    let customer_a = tenants.iter().find(|t| t.tenant_id == "tenant_001").unwrap();

    let mut wizard = DatasetWizard::new();
    wizard.select_tenant_with(customer_a, &backend).await;
    assert_eq!(wizard.workflows().items.len(), 3);
    wizard
        .apply_edit(DatasetEdit::SetDateRange {
            start: Some("2024-10-01".into()),
            end: Some("2024-10-10".into()),
        })
        .unwrap();
    wizard.advance_with(&backend).await.unwrap();
    wizard.advance_with(&backend).await.unwrap();
    assert_eq!(wizard.form().preview.as_ref().unwrap().record_count, 1500);
    wizard.advance().unwrap();
    wizard.apply_edit(DatasetEdit::SetName { name: "October slice".into() }).unwrap();
    let saved = wizard.submit(&backend).await.unwrap();

    let listed = backend.list_datasets(Some("tenant_001")).await.unwrap();
    let stored = listed
        .iter()
        .find(|d| d.training_data_preparation_id == saved.training_data_preparation_id)
        .unwrap();
    assert_eq!(stored.dataset_name, "October slice");
    assert_eq!(stored.date_range_start.as_deref(), Some("2024-10-01T00:00:00.000Z"));
    assert_eq!(stored.total_records(), 1500);
}
