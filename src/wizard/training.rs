//! "Create training run" wizard.
//!
//! Tenant selection loads that tenant's dataset preparations and the base
//! (raw weight) models it may start from. The final request merges the
//! visible hyperparameters with the hidden ones and the per-split file
//! paths of every selected preparation.

use chrono::NaiveDate;
use futures_util::future::join;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::hyperparameters::{
    visible, HyperparameterSpec, Hyperparameters, TEST_DATA_PATH, TRAIN_DATA_PATH,
    VALIDATION_DATA_PATH,
};
use super::navigator::{Navigator, NavigatorView};
use super::notice::{Notice, Notices};
use super::options::{KeyedLoader, LoadTicket, OptionSet};
use super::step::TRAINING_STEPS;
use crate::api::DataSource;
use crate::error::{FetchError, WizardError};
use crate::models::{
    ArtifactType, DatasetPreparation, FileType, ModelArtifact, Tenant, TrainingRunCreated,
    TrainingRunRequest,
};
use crate::utils::{is_present, non_blank, slugify};

pub const STEP_BASIC: u8 = 1;
pub const STEP_DATA: u8 = 2;
pub const STEP_BASE_MODEL: u8 = 3;
pub const STEP_HYPERPARAMETERS: u8 = 4;
pub const STEP_EXECUTION: u8 = 5;
pub const STEP_REVIEW: u8 = 6;

pub const GPU_TYPES: &[&str] = &["V100", "A100", "T4", "A10G"];
pub const INSTANCE_TYPES: &[&str] = &["p3.2xlarge", "p3.8xlarge", "p4d.24xlarge", "g4dn.xlarge", "g5.xlarge"];

const MEMORY_MIN_GB: u32 = 8;
const MEMORY_MAX_GB: u32 = 64;
const MEMORY_STEP_GB: u32 = 8;
const MAX_RETRY_ATTEMPTS: u32 = 10;

/// Orchestrator ("Prefect") settings for the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionParams {
    pub gpu_type: String,
    pub instance_type: String,
    pub memory_gb: u32,
    pub timeout_secs: u32,
    pub retry_attempts: u32,
}

impl Default for ExecutionParams {
    fn default() -> Self {
        Self {
            gpu_type: "V100".to_string(),
            instance_type: "p3.2xlarge".to_string(),
            memory_gb: 16,
            timeout_secs: 3600,
            retry_attempts: 3,
        }
    }
}

impl ExecutionParams {
    pub fn set(&mut self, field: &str, raw: &str) -> Result<(), WizardError> {
        let value = raw.trim();
        match field {
            "gpu_type" => self.gpu_type = pick(field, GPU_TYPES, value)?,
            "instance_type" => self.instance_type = pick(field, INSTANCE_TYPES, value)?,
            "memory_gb" => {
                let gb = parse_u32(field, value)?;
                if !(MEMORY_MIN_GB..=MEMORY_MAX_GB).contains(&gb) || gb % MEMORY_STEP_GB != 0 {
                    return Err(invalid(
                        field,
                        format!("must be a multiple of {} between {} and {}", MEMORY_STEP_GB, MEMORY_MIN_GB, MEMORY_MAX_GB),
                    ));
                }
                self.memory_gb = gb;
            }
            "timeout_secs" => {
                let secs = parse_u32(field, value)?;
                if secs == 0 {
                    return Err(invalid(field, "must be positive".to_string()));
                }
                self.timeout_secs = secs;
            }
            "retry_attempts" => {
                let n = parse_u32(field, value)?;
                if n > MAX_RETRY_ATTEMPTS {
                    return Err(invalid(field, format!("at most {}", MAX_RETRY_ATTEMPTS)));
                }
                self.retry_attempts = n;
            }
            other => return Err(invalid(other, "unknown execution parameter".to_string())),
        }
        Ok(())
    }

    pub fn to_payload(&self) -> Map<String, Value> {
        let mut out = Map::new();
        out.insert("gpu_type".into(), Value::from(self.gpu_type.clone()));
        out.insert("instance_type".into(), Value::from(self.instance_type.clone()));
        out.insert("memory".into(), Value::from(format!("{}GB", self.memory_gb)));
        out.insert("timeout".into(), Value::from(self.timeout_secs));
        out.insert("retry_attempts".into(), Value::from(self.retry_attempts));
        out
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrainingForm {
    pub tenant_id: String,
    pub customer_name: String,
    pub name: String,
    /// Last name written automatically; user edits are never overwritten.
    pub generated_name: String,
    pub description: String,
    /// Selection order is kept; it drives the order of the path arrays.
    pub selected_preparations: Vec<String>,
    pub base_model_id: String,
    pub hyperparameters: Hyperparameters,
    pub execution: ExecutionParams,
}

/// Whether the form content lets the user leave `step` going forward.
pub fn can_advance(step: u8, form: &TrainingForm) -> bool {
    match step {
        STEP_BASIC => is_present(&form.tenant_id),
        STEP_DATA => !form.selected_preparations.is_empty(),
        STEP_BASE_MODEL => is_present(&form.base_model_id),
        STEP_HYPERPARAMETERS | STEP_EXECUTION => true,
        STEP_REVIEW => (STEP_BASIC..STEP_REVIEW).all(|s| can_advance(s, form)),
        _ => false,
    }
}

/// `<tenant-slug>-training-<yyyymmdd>`
pub fn generated_run_name(tenant: &Tenant, day: NaiveDate) -> String {
    let slug = match slugify(&tenant.tenant_name) {
        s if s.is_empty() => slugify(&tenant.tenant_id),
        s => s,
    };
    format!("{}-training-{}", slug, day.format("%Y%m%d"))
}

/// Build the start request. `preparations` is the option set the user
/// picked from; a selected preparation without a given split adds nothing
/// to that split's path list.
pub fn compose_training(form: &TrainingForm, preparations: &[DatasetPreparation]) -> TrainingRunRequest {
    let mut train = Vec::new();
    let mut test = Vec::new();
    let mut validation = Vec::new();
    for id in &form.selected_preparations {
        let Some(prep) = preparations.iter().find(|p| &p.training_data_preparation_id == id) else {
            continue;
        };
        train.extend(prep.paths_for(FileType::Train).map(Value::from));
        test.extend(prep.paths_for(FileType::Test).map(Value::from));
        validation.extend(prep.paths_for(FileType::Val).map(Value::from));
    }

    let mut hyperparameters = form.hyperparameters.to_payload();
    hyperparameters.insert(TRAIN_DATA_PATH.into(), Value::Array(train));
    hyperparameters.insert(TEST_DATA_PATH.into(), Value::Array(test));
    hyperparameters.insert(VALIDATION_DATA_PATH.into(), Value::Array(validation));

    let name = non_blank(&form.name).unwrap_or_else(|| form.generated_name.clone());
    TrainingRunRequest {
        training_execution_name: name,
        customer_name: non_blank(&form.customer_name),
        description: non_blank(&form.description),
        tenant_id: non_blank(&form.tenant_id),
        hyperparameters,
        prefect_parameters: form.execution.to_payload(),
        training_data_preparation_ids: form.selected_preparations.clone(),
        base_model_artifact_id: non_blank(&form.base_model_id),
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum TrainingEdit {
    SetName { name: String },
    SetDescription { description: String },
    TogglePreparation { id: String },
    SetBaseModel { artifact_id: String },
    SetHyperparameter { name: String, value: String },
    ResetHyperparameters,
    SetExecution { field: String, value: String },
}

/// Preparation and base-model fetch for one tenant selection.
#[derive(Debug, Clone)]
pub struct TrainingLoad {
    ticket: LoadTicket<String>,
}

#[derive(Debug)]
pub struct TrainingLoadResult {
    ticket: LoadTicket<String>,
    preparations: Result<Vec<DatasetPreparation>, FetchError>,
    base_models: Result<Vec<ModelArtifact>, FetchError>,
}

impl TrainingLoad {
    pub fn tenant_id(&self) -> &str {
        &self.ticket.key
    }

    pub async fn fetch<S: DataSource>(self, source: &S) -> TrainingLoadResult {
        let tenant = self.ticket.key.as_str();
        let (preparations, base_models) = join(
            source.list_dataset_preparations(tenant),
            source.list_models(tenant, ArtifactType::RawWeight),
        )
        .await;
        TrainingLoadResult {
            ticket: self.ticket,
            preparations,
            base_models,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TrainingWizardView {
    #[serde(flatten)]
    pub nav: NavigatorView,
    pub can_advance: bool,
    pub form: TrainingForm,
    pub preparations: OptionSet<DatasetPreparation>,
    pub base_models: OptionSet<ModelArtifact>,
    pub hyperparameter_specs: Vec<HyperparameterSpec>,
    pub gpu_types: &'static [&'static str],
    pub instance_types: &'static [&'static str],
    pub request: TrainingRunRequest,
    pub notices: Vec<Notice>,
}

#[derive(Debug, Clone)]
pub struct TrainingWizard {
    nav: Navigator,
    form: TrainingForm,
    today: NaiveDate,
    tenants: KeyedLoader<String>,
    preparations: OptionSet<DatasetPreparation>,
    base_models: OptionSet<ModelArtifact>,
    notices: Notices,
}

impl Default for TrainingWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl TrainingWizard {
    pub fn new() -> Self {
        Self::with_date(chrono::Local::now().date_naive())
    }

    /// Wizard whose generated run names use `today`.
    pub fn with_date(today: NaiveDate) -> Self {
        Self {
            nav: Navigator::new(TRAINING_STEPS),
            form: TrainingForm::default(),
            today,
            tenants: KeyedLoader::default(),
            preparations: OptionSet::default(),
            base_models: OptionSet::default(),
            notices: Notices::default(),
        }
    }

    pub fn form(&self) -> &TrainingForm {
        &self.form
    }

    pub fn navigator(&self) -> &Navigator {
        &self.nav
    }

    pub fn current_step(&self) -> u8 {
        self.nav.current()
    }

    pub fn is_submitting(&self) -> bool {
        self.nav.is_submitting()
    }

    pub fn preparations(&self) -> &OptionSet<DatasetPreparation> {
        &self.preparations
    }

    pub fn base_models(&self) -> &OptionSet<ModelArtifact> {
        &self.base_models
    }

    pub fn notices_mut(&mut self) -> &mut Notices {
        &mut self.notices
    }

    /// Form validity plus the loading gate: a step that owns an option set
    /// cannot be confirmed while that set is still loading.
    pub fn step_ready(&self, step: u8) -> bool {
        let loading = match step {
            STEP_DATA => self.preparations.loading,
            STEP_BASE_MODEL => self.base_models.loading,
            STEP_REVIEW => self.preparations.loading || self.base_models.loading,
            _ => false,
        };
        !loading && can_advance(step, &self.form)
    }

    pub fn can_advance(&self) -> bool {
        self.step_ready(self.nav.current())
    }

    pub fn select_tenant(&mut self, tenant: &Tenant) -> TrainingLoad {
        if self.form.tenant_id != tenant.tenant_id {
            self.form.selected_preparations.clear();
            self.form.base_model_id.clear();
        }
        self.form.tenant_id = tenant.tenant_id.clone();
        self.form.customer_name = tenant.tenant_name.clone();

        let generated = generated_run_name(tenant, self.today);
        if !is_present(&self.form.name) || self.form.name == self.form.generated_name {
            self.form.name = generated.clone();
        }
        self.form.generated_name = generated;

        self.preparations.reset_loading();
        self.base_models.reset_loading();
        let ticket = self.tenants.begin(tenant.tenant_id.clone());
        tracing::info!(tenant_id = %ticket.key, generation = ticket.generation, "Training wizard tenant selected");
        TrainingLoad { ticket }
    }

    pub fn apply_tenant_load(&mut self, loaded: TrainingLoadResult) -> bool {
        if !self.tenants.is_current(&loaded.ticket) {
            tracing::debug!(
                tenant_id = %loaded.ticket.key,
                generation = loaded.ticket.generation,
                "Dropping stale tenant load"
            );
            return false;
        }
        if let Some(e) = self.preparations.resolve(loaded.preparations) {
            tracing::warn!(tenant_id = %loaded.ticket.key, error = %e, "Failed to load dataset preparations");
            self.notices.error(format!("Failed to load datasets: {}", e));
        }
        if let Some(e) = self.base_models.resolve(loaded.base_models) {
            tracing::warn!(tenant_id = %loaded.ticket.key, error = %e, "Failed to load base models");
            self.notices.error(format!("Failed to load base models: {}", e));
        }
        // A failed load says nothing about which selections are still valid.
        if !self.preparations.error {
            let known = &self.preparations.items;
            self.form
                .selected_preparations
                .retain(|id| known.iter().any(|p| &p.training_data_preparation_id == id));
        }
        if !self.base_models.error
            && !self
                .base_models
                .items
                .iter()
                .any(|m| m.artifact_id == self.form.base_model_id)
        {
            self.form.base_model_id.clear();
        }
        true
    }

    pub async fn select_tenant_with<S: DataSource>(&mut self, tenant: &Tenant, source: &S) -> bool {
        let load = self.select_tenant(tenant);
        let loaded = load.fetch(source).await;
        self.apply_tenant_load(loaded)
    }

    pub fn apply_edit(&mut self, edit: TrainingEdit) -> Result<(), WizardError> {
        match edit {
            TrainingEdit::SetName { name } => self.form.name = name,
            TrainingEdit::SetDescription { description } => self.form.description = description,
            TrainingEdit::TogglePreparation { id } => {
                let id = id.trim();
                if let Some(pos) = self.form.selected_preparations.iter().position(|p| p == id) {
                    self.form.selected_preparations.remove(pos);
                } else if self
                    .preparations
                    .items
                    .iter()
                    .any(|p| p.training_data_preparation_id == id)
                {
                    self.form.selected_preparations.push(id.to_string());
                } else {
                    return Err(invalid("training_data_preparation_ids", format!("unknown dataset '{}'", id)));
                }
            }
            TrainingEdit::SetBaseModel { artifact_id } => {
                let id = artifact_id.trim();
                if !id.is_empty() && !self.base_models.items.iter().any(|m| m.artifact_id == id) {
                    return Err(invalid("base_model_artifact_id", format!("unknown base model '{}'", id)));
                }
                self.form.base_model_id = id.to_string();
            }
            TrainingEdit::SetHyperparameter { name, value } => {
                self.form.hyperparameters.set(name.trim(), &value)?;
            }
            TrainingEdit::ResetHyperparameters => self.form.hyperparameters.reset(),
            TrainingEdit::SetExecution { field, value } => {
                self.form.execution.set(field.trim(), &value)?;
            }
        }
        Ok(())
    }

    pub fn advance(&mut self) -> Result<(), WizardError> {
        let from = self.nav.current();
        if !self.nav.advance(self.step_ready(from)) {
            tracing::debug!(step = from, "Training wizard advance blocked");
            return Err(WizardError::StepBlocked(from));
        }
        tracing::info!(step = self.nav.current(), "Training wizard advanced");
        Ok(())
    }

    pub fn retreat(&mut self) -> bool {
        let moved = self.nav.retreat();
        if moved {
            tracing::info!(step = self.nav.current(), "Training wizard went back");
        }
        moved
    }

    pub fn compose(&self) -> TrainingRunRequest {
        compose_training(&self.form, &self.preparations.items)
    }

    pub fn begin_submit(&mut self) -> Result<TrainingRunRequest, WizardError> {
        let step_valid = self.step_ready(self.nav.current());
        self.nav.begin_submit(step_valid)?;
        Ok(self.compose())
    }

    /// Record the outcome of the start call. On failure everything the user
    /// entered stays in place and the wizard remains on the review step.
    pub fn finish_submit(
        &mut self,
        result: Result<TrainingRunCreated, FetchError>,
    ) -> Result<TrainingRunCreated, WizardError> {
        self.nav.finish_submit();
        match result {
            Ok(created) => {
                tracing::info!(id = %created.training_execution_id, status = %created.status, "Training run created");
                self.notices.success("Training run created successfully!");
                Ok(created)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Training run creation failed");
                self.notices.error("Failed to create training run");
                Err(e.into())
            }
        }
    }

    pub async fn submit<S: DataSource>(&mut self, source: &S) -> Result<TrainingRunCreated, WizardError> {
        let request = self.begin_submit()?;
        let result = source.create_training_run(&request).await;
        self.finish_submit(result)
    }

    pub fn view(&mut self) -> TrainingWizardView {
        TrainingWizardView {
            nav: self.nav.view(),
            can_advance: self.can_advance(),
            form: self.form.clone(),
            preparations: self.preparations.clone(),
            base_models: self.base_models.clone(),
            hyperparameter_specs: visible().copied().collect(),
            gpu_types: GPU_TYPES,
            instance_types: INSTANCE_TYPES,
            request: self.compose(),
            notices: self.notices.drain(),
        }
    }
}

fn invalid(field: &str, reason: String) -> WizardError {
    WizardError::InvalidField {
        field: field.to_string(),
        reason,
    }
}

fn pick(field: &str, catalogue: &[&str], value: &str) -> Result<String, WizardError> {
    catalogue
        .iter()
        .find(|c| c.eq_ignore_ascii_case(value))
        .map(|c| c.to_string())
        .ok_or_else(|| invalid(field, format!("'{}' is not one of {}", value, catalogue.join(", "))))
}

fn parse_u32(field: &str, value: &str) -> Result<u32, WizardError> {
    value
        .parse::<u32>()
        .map_err(|_| invalid(field, format!("'{}' is not a whole number", value)))
}
