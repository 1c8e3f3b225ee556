use trainboard::api::{Backend, DataSource, MockBackend, RunCatalog};
use trainboard::config::{AppConfig, DataMode};
use trainboard::error::FetchError;
use trainboard::models::{
    ArtifactType, DataFilters, PreviewRequest, RunFilters, RunStatus, SaveDatasetRequest,
};

fn filters_for(tenant: &str) -> DataFilters {
    DataFilters {
        tenant_id: Some(tenant.to_string()),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_preview_ids_count_up_and_counts_are_stable() {
    let backend = MockBackend::new();
    let request = PreviewRequest {
        filters: filters_for("tenant_001"),
        limit: Some(10),
    };
    let first = backend.preview_filtered_data(&request).await.unwrap();
    let second = backend.preview_filtered_data(&request).await.unwrap();

    assert_eq!(first.fetch_id, "fetch_1");
    assert_eq!(second.fetch_id, "fetch_2");
    assert_eq!(first.record_count, second.record_count);
    assert_eq!(first.record_count, 90 * 150);
    assert_eq!(first.preview.len(), 3);
}

#[tokio::test]
async fn test_unknown_tenant_or_reversed_range_yields_nothing() {
    let backend = MockBackend::new();
    assert_eq!(backend.estimate_records(&filters_for("tenant_999")), 0);

    let reversed = DataFilters {
        date_range_start: Some("2024-10-10T00:00:00.000Z".into()),
        date_range_end: Some("2024-10-01T00:00:00.000Z".into()),
        ..filters_for("tenant_001")
    };
    assert_eq!(backend.estimate_records(&reversed), 0);
}

#[tokio::test]
async fn test_each_constraint_narrows_the_estimate() {
    let backend = MockBackend::new();
    let base = filters_for("tenant_001");
    let all = backend.estimate_records(&base);

    let narrowed = DataFilters {
        languages: vec!["English".into()],
        is_noisy: Some(false),
        ..base.clone()
    };
    assert!(backend.estimate_records(&narrowed) < all);
}

#[tokio::test]
async fn test_save_requires_a_known_fetch() {
    let backend = MockBackend::new();
    let err = backend
        .save_dataset(&SaveDatasetRequest {
            fetch_id: "fetch_404".into(),
            dataset_name: "Nope".into(),
            filters: DataFilters::default(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::NotFound(_)));
}

#[tokio::test]
async fn test_base_models_are_scoped_to_tenant() {
    let backend = MockBackend::new();
    let a = backend.list_models("tenant_001", ArtifactType::RawWeight).await.unwrap();
    let b = backend.list_models("tenant_002", ArtifactType::RawWeight).await.unwrap();
    assert!(a.iter().any(|m| m.artifact_id == "base_003"));
    assert!(!b.iter().any(|m| m.artifact_id == "base_003"));
    assert!(b.iter().all(|m| m.artifact_type == ArtifactType::RawWeight));
}

#[tokio::test]
async fn test_abort_only_active_runs() {
    let backend = MockBackend::new();
    backend.abort_training_run("train_002", Some("wrong data")).await.unwrap();
    let cancelled = backend
        .list_training_runs(&RunFilters {
            status: Some(RunStatus::Cancelled),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(cancelled.len(), 1);

    let err = backend.abort_training_run("train_001", None).await.unwrap_err();
    assert!(matches!(err, FetchError::Status { status: 409, .. }));
    let err = backend.abort_training_run("train_999", None).await.unwrap_err();
    assert!(matches!(err, FetchError::NotFound(_)));
}

#[tokio::test]
async fn test_delete_dataset() {
    let backend = MockBackend::new();
    let before = backend.list_datasets(None).await.unwrap().len();
    backend
        .delete_dataset("660e8400-e29b-41d4-a716-446655440004")
        .await
        .unwrap();
    assert_eq!(backend.list_datasets(None).await.unwrap().len(), before - 1);
    assert!(backend.delete_dataset("660e8400-e29b-41d4-a716-446655440004").await.is_err());
}

#[tokio::test]
async fn test_backend_follows_configured_mode() {
    let dummy = Backend::from_config(&AppConfig::default()).unwrap();
    assert_eq!(dummy.mode(), DataMode::Dummy);
    assert_eq!(dummy.list_tenants().await.unwrap().len(), 4);

    let live = Backend::from_config(&AppConfig::default().with_data_mode(DataMode::Live)).unwrap();
    assert_eq!(live.mode(), DataMode::Live);
}

#[tokio::test]
async fn test_run_filters_by_tenant_and_date() {
    let backend = MockBackend::new();
    let runs = backend
        .list_training_runs(&RunFilters {
            tenant_id: vec!["tenant_001".into()],
            start_date: Some("2025-01-16".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    let ids: Vec<_> = runs.iter().map(|r| r.training_execution_id.as_str()).collect();
    assert_eq!(ids, vec!["train_003"]);
}

#[tokio::test]
async fn test_single_record_lookups() {
    let backend = MockBackend::new();
    let dataset = backend
        .get_dataset("660e8400-e29b-41d4-a716-446655440003")
        .await
        .unwrap();
    assert_eq!(dataset.dataset_name, "Customer A - Q4 2024 Dataset");
    assert_eq!(dataset.files.len(), 3);
    assert_eq!(dataset.total_records(), 50_000);

    let run = backend.get_training_run("train_002").await.unwrap();
    assert_eq!(run.status, RunStatus::Running);

    assert!(matches!(backend.get_dataset("data_gen_999").await, Err(FetchError::NotFound(_))));
    assert!(matches!(backend.get_training_run("train_999").await, Err(FetchError::NotFound(_))));
}

#[tokio::test]
async fn test_lookup_sees_aborted_run() {
    let backend = MockBackend::new();
    backend.abort_training_run("train_002", Some("wrong data")).await.unwrap();
    let run = backend.get_training_run("train_002").await.unwrap();
    assert_eq!(run.status, RunStatus::Cancelled);
    assert_eq!(run.error_message.as_deref(), Some("wrong data"));
}
