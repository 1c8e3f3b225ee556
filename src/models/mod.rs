pub mod app_state;
pub mod dataset_preparation;
pub mod filters;
pub mod model_artifact;
pub mod preview;
pub mod saved_dataset;
pub mod tenant;
pub mod training_run;
pub mod workflow;

pub use app_state::AppState;
pub use dataset_preparation::{DataFile, DatasetPreparation, FileType};
pub use filters::{DataFilters, QualityFlag};
pub use model_artifact::{ArtifactType, ModelArtifact};
pub use preview::{PreviewRequest, PreviewResult};
pub use saved_dataset::{SaveDatasetRequest, SavedDataset};
pub use tenant::Tenant;
pub use training_run::{RunFilters, RunStatus, TrainingRun, TrainingRunCreated, TrainingRunRequest};
pub use workflow::Workflow;
