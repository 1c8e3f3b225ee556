//! "Create dataset" wizard: pick a tenant, narrow the warehouse pull with
//! optional filters, preview the record count, then save under a name.

use chrono::NaiveDate;
use futures_util::future::join;
use serde::{Deserialize, Serialize};

use super::navigator::{Navigator, NavigatorView};
use super::notice::{Notice, Notices};
use super::options::{KeyedLoader, LoadTicket, OptionSet};
use super::step::DATASET_STEPS;
use crate::api::DataSource;
use crate::error::{FetchError, WizardError};
use crate::models::{
    ArtifactType, DataFilters, ModelArtifact, PreviewRequest, PreviewResult, QualityFlag,
    SaveDatasetRequest, SavedDataset, Tenant, Workflow,
};
use crate::utils::{format_boundary, is_present, non_blank, parse_day};

pub const STEP_CUSTOMER: u8 = 1;
pub const STEP_FILTERS: u8 = 2;
pub const STEP_PREVIEW: u8 = 3;
pub const STEP_SAVE: u8 = 4;

/// Sample rows requested with every preview.
const PREVIEW_LIMIT: u32 = 10;

pub const LANGUAGES: &[&str] = &[
    "English",
    "Spanish",
    "French",
    "German",
    "Italian",
    "Portuguese",
    "Chinese",
    "Japanese",
    "Korean",
    "Arabic",
];

/// Everything the user has entered so far. Every field exists from the
/// start; empty strings and empty lists mean "not chosen yet".
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DatasetForm {
    pub tenant_id: String,
    pub customer_name: String,
    pub date_range_start: Option<NaiveDate>,
    pub date_range_end: Option<NaiveDate>,
    /// Languages, ASR versions, workflows and quality flags. Tenant,
    /// customer and dates are filled in by [`request_filters`].
    pub filters: DataFilters,
    pub dataset_name: String,
    pub preview: Option<PreviewResult>,
}

/// Whether the user may leave `step` going forward.
pub fn can_advance(step: u8, form: &DatasetForm) -> bool {
    match step {
        STEP_CUSTOMER => is_present(&form.tenant_id),
        STEP_FILTERS => true,
        STEP_PREVIEW => form.preview.as_ref().is_some_and(|p| p.record_count > 0),
        STEP_SAVE => is_present(&form.dataset_name),
        _ => false,
    }
}

/// The filter object sent to the warehouse, with tenant, customer and the
/// canonical date boundaries merged in.
pub fn request_filters(form: &DatasetForm) -> DataFilters {
    let mut filters = form.filters.clone();
    filters.tenant_id = non_blank(&form.tenant_id);
    filters.customer_name = non_blank(&form.customer_name);
    filters.date_range_start = form.date_range_start.map(format_boundary);
    filters.date_range_end = form.date_range_end.map(format_boundary);
    filters
}

/// Build the save call from the form. Carries the full filter object so the
/// stored dataset describes how it was pulled.
pub fn compose_save(form: &DatasetForm) -> Result<SaveDatasetRequest, WizardError> {
    let preview = form.preview.as_ref().ok_or(WizardError::MissingPreview)?;
    Ok(SaveDatasetRequest {
        fetch_id: preview.fetch_id.clone(),
        dataset_name: form.dataset_name.trim().to_string(),
        filters: request_filters(form),
    })
}

/// A user edit to the form, as received over the wire.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DatasetEdit {
    SetDateRange {
        #[serde(default)]
        start: Option<String>,
        #[serde(default)]
        end: Option<String>,
    },
    ToggleLanguage { language: String },
    AddWorkflow { workflow_id: String },
    RemoveWorkflow { workflow_id: String },
    AddAsrVersion { version: String },
    RemoveAsrVersion { version: String },
    SetFlag { flag: QualityFlag, value: Option<bool> },
    SetName { name: String },
}

/// Workflow and ASR-model fetch for one tenant selection.
#[derive(Debug, Clone)]
pub struct TenantLoad {
    ticket: LoadTicket<String>,
}

#[derive(Debug)]
pub struct TenantLoadResult {
    ticket: LoadTicket<String>,
    workflows: Result<Vec<Workflow>, FetchError>,
    models: Result<Vec<ModelArtifact>, FetchError>,
}

impl TenantLoad {
    pub fn tenant_id(&self) -> &str {
        &self.ticket.key
    }

    pub async fn fetch<S: DataSource>(self, source: &S) -> TenantLoadResult {
        let tenant = self.ticket.key.as_str();
        let (workflows, models) = join(
            source.list_workflows(tenant),
            source.list_models(tenant, ArtifactType::Trtllm),
        )
        .await;
        TenantLoadResult {
            ticket: self.ticket,
            workflows,
            models,
        }
    }
}

/// Preview fetch for one revision of the filters.
#[derive(Debug, Clone)]
pub struct PreviewLoad {
    ticket: LoadTicket<u64>,
    request: PreviewRequest,
}

#[derive(Debug)]
pub struct PreviewOutcome {
    ticket: LoadTicket<u64>,
    result: Result<PreviewResult, FetchError>,
}

impl PreviewLoad {
    pub fn request(&self) -> &PreviewRequest {
        &self.request
    }

    pub async fn fetch<S: DataSource>(self, source: &S) -> PreviewOutcome {
        let result = source.preview_filtered_data(&self.request).await;
        PreviewOutcome {
            ticket: self.ticket,
            result,
        }
    }
}

/// Serializable snapshot handed to API clients.
#[derive(Debug, Clone, Serialize)]
pub struct DatasetWizardView {
    #[serde(flatten)]
    pub nav: NavigatorView,
    pub can_advance: bool,
    pub form: DatasetForm,
    pub request_filters: DataFilters,
    pub workflows: OptionSet<Workflow>,
    pub asr_models: OptionSet<ModelArtifact>,
    pub preview_loading: bool,
    pub languages: &'static [&'static str],
    pub notices: Vec<Notice>,
}

#[derive(Debug, Clone)]
pub struct DatasetWizard {
    nav: Navigator,
    form: DatasetForm,
    tenants: KeyedLoader<String>,
    previews: KeyedLoader<u64>,
    /// Bumped on every edit that changes what a preview would return.
    revision: u64,
    workflows: OptionSet<Workflow>,
    asr_models: OptionSet<ModelArtifact>,
    preview_loading: bool,
    notices: Notices,
}

impl Default for DatasetWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl DatasetWizard {
    pub fn new() -> Self {
        Self {
            nav: Navigator::new(DATASET_STEPS),
            form: DatasetForm::default(),
            tenants: KeyedLoader::default(),
            previews: KeyedLoader::default(),
            revision: 0,
            workflows: OptionSet::default(),
            asr_models: OptionSet::default(),
            preview_loading: false,
            notices: Notices::default(),
        }
    }

    pub fn form(&self) -> &DatasetForm {
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

    pub fn workflows(&self) -> &OptionSet<Workflow> {
        &self.workflows
    }

    pub fn asr_models(&self) -> &OptionSet<ModelArtifact> {
        &self.asr_models
    }

    pub fn is_preview_loading(&self) -> bool {
        self.preview_loading
    }

    pub fn can_advance(&self) -> bool {
        can_advance(self.nav.current(), &self.form)
    }

    pub fn notices_mut(&mut self) -> &mut Notices {
        &mut self.notices
    }

    /// Choose the tenant. Option sets from any earlier tenant are discarded
    /// immediately; the returned load fetches the new tenant's data.
    pub fn select_tenant(&mut self, tenant: &Tenant) -> TenantLoad {
        if self.form.tenant_id != tenant.tenant_id {
            self.form.filters.workflow_ids.clear();
            self.form.filters.asr_model_versions.clear();
        }
        self.form.tenant_id = tenant.tenant_id.clone();
        self.form.customer_name = tenant.tenant_name.clone();
        self.invalidate_preview();
        self.workflows.reset_loading();
        self.asr_models.reset_loading();
        let ticket = self.tenants.begin(tenant.tenant_id.clone());
        tracing::info!(tenant_id = %ticket.key, generation = ticket.generation, "Dataset wizard tenant selected");
        TenantLoad { ticket }
    }

    /// Store a tenant fetch. Returns false (and changes nothing) when a
    /// newer selection has superseded it.
    pub fn apply_tenant_load(&mut self, loaded: TenantLoadResult) -> bool {
        if !self.tenants.is_current(&loaded.ticket) {
            tracing::debug!(
                tenant_id = %loaded.ticket.key,
                generation = loaded.ticket.generation,
                "Dropping stale tenant load"
            );
            return false;
        }
        if let Some(e) = self.workflows.resolve(loaded.workflows) {
            tracing::warn!(tenant_id = %loaded.ticket.key, error = %e, "Failed to load workflows");
            self.notices.error(format!("Failed to load workflows: {}", e));
        }
        if let Some(e) = self.asr_models.resolve(loaded.models) {
            tracing::warn!(tenant_id = %loaded.ticket.key, error = %e, "Failed to load ASR models");
            self.notices.error(format!("Failed to load ASR models: {}", e));
        }
        true
    }

    /// Select a tenant and wait for its option sets.
    pub async fn select_tenant_with<S: DataSource>(&mut self, tenant: &Tenant, source: &S) -> bool {
        let load = self.select_tenant(tenant);
        let loaded = load.fetch(source).await;
        self.apply_tenant_load(loaded)
    }

    pub fn apply_edit(&mut self, edit: DatasetEdit) -> Result<(), WizardError> {
        match edit {
            DatasetEdit::SetDateRange { start, end } => {
                let start = parse_optional_day("date_range_start", start.as_deref())?;
                let end = parse_optional_day("date_range_end", end.as_deref())?;
                if let (Some(s), Some(e)) = (start, end) {
                    if e < s {
                        return Err(invalid("date_range_end", "end date is before start date"));
                    }
                }
                self.form.date_range_start = start;
                self.form.date_range_end = end;
            }
            DatasetEdit::ToggleLanguage { language } => {
                let known = LANGUAGES
                    .iter()
                    .find(|l| l.eq_ignore_ascii_case(language.trim()))
                    .ok_or_else(|| invalid("languages", &format!("unknown language '{}'", language)))?;
                toggle(&mut self.form.filters.languages, known.to_string());
            }
            DatasetEdit::AddWorkflow { workflow_id } => {
                let id = non_blank(&workflow_id).ok_or_else(|| invalid("workflow_ids", "workflow id is empty"))?;
                if self.form.filters.workflow_ids.contains(&id) {
                    return Ok(());
                }
                self.form.filters.workflow_ids.push(id);
            }
            DatasetEdit::RemoveWorkflow { workflow_id } => {
                self.form.filters.workflow_ids.retain(|w| w != workflow_id.trim());
            }
            DatasetEdit::AddAsrVersion { version } => {
                let version = non_blank(&version).ok_or_else(|| invalid("asr_model_versions", "version is empty"))?;
                if self.form.filters.asr_model_versions.contains(&version) {
                    return Ok(());
                }
                self.form.filters.asr_model_versions.push(version);
            }
            DatasetEdit::RemoveAsrVersion { version } => {
                self.form.filters.asr_model_versions.retain(|v| v != version.trim());
            }
            DatasetEdit::SetFlag { flag, value } => {
                self.form.filters.set_flag(flag, value);
            }
            DatasetEdit::SetName { name } => {
                self.form.dataset_name = name;
                return Ok(());
            }
        }
        self.invalidate_preview();
        Ok(())
    }

    pub fn set_dataset_name(&mut self, name: &str) {
        self.form.dataset_name = name.to_string();
    }

    /// Move forward. Landing on the Preview step starts a preview fetch,
    /// returned for the caller to run.
    pub fn advance(&mut self) -> Result<Option<PreviewLoad>, WizardError> {
        let from = self.nav.current();
        if !self.nav.advance(self.can_advance()) {
            tracing::debug!(step = from, "Dataset wizard advance blocked");
            return Err(WizardError::StepBlocked(from));
        }
        tracing::info!(step = self.nav.current(), "Dataset wizard advanced");
        if self.nav.current() == STEP_PREVIEW && self.form.preview.is_none() && !self.preview_loading {
            return Ok(Some(self.begin_preview()));
        }
        Ok(None)
    }

    /// Advance and, if that started a preview, run it to completion.
    pub async fn advance_with<S: DataSource>(&mut self, source: &S) -> Result<(), WizardError> {
        if let Some(load) = self.advance()? {
            let outcome = load.fetch(source).await;
            self.apply_preview(outcome);
        }
        Ok(())
    }

    pub fn retreat(&mut self) -> bool {
        let moved = self.nav.retreat();
        if moved {
            tracing::info!(step = self.nav.current(), "Dataset wizard went back");
        }
        moved
    }

    /// Start a fresh preview of the current filters, superseding any that
    /// is still in flight.
    pub fn begin_preview(&mut self) -> PreviewLoad {
        self.form.preview = None;
        self.preview_loading = true;
        let ticket = self.previews.begin(self.revision);
        PreviewLoad {
            ticket,
            request: PreviewRequest {
                filters: request_filters(&self.form),
                limit: Some(PREVIEW_LIMIT),
            },
        }
    }

    /// Store a preview. Ignored when the filters changed after it started.
    pub fn apply_preview(&mut self, outcome: PreviewOutcome) -> bool {
        if !self.previews.is_current(&outcome.ticket) {
            tracing::debug!(generation = outcome.ticket.generation, "Dropping stale preview");
            return false;
        }
        self.preview_loading = false;
        match outcome.result {
            Ok(preview) => {
                tracing::info!(fetch_id = %preview.fetch_id, record_count = preview.record_count, "Preview fetched");
                if preview.record_count == 0 {
                    self.notices.info("No records match these filters");
                }
                self.form.preview = Some(preview);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Preview fetch failed");
                self.notices.error("Failed to fetch data preview");
            }
        }
        true
    }

    /// Close the submission gate and compose the save request.
    pub fn begin_submit(&mut self) -> Result<SaveDatasetRequest, WizardError> {
        let step_valid = self.can_advance();
        self.nav.begin_submit(step_valid)?;
        match compose_save(&self.form) {
            Ok(request) => Ok(request),
            Err(e) => {
                self.nav.finish_submit();
                Err(e)
            }
        }
    }

    /// Record the outcome of the save call. State is kept as-is on failure
    /// so the user can retry.
    pub fn finish_submit(&mut self, result: Result<SavedDataset, FetchError>) -> Result<SavedDataset, WizardError> {
        self.nav.finish_submit();
        match result {
            Ok(saved) => {
                tracing::info!(id = %saved.training_data_preparation_id, "Dataset saved");
                self.notices.success("Dataset created successfully!");
                Ok(saved)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Dataset save failed");
                self.notices.error("Failed to create dataset");
                Err(e.into())
            }
        }
    }

    pub async fn submit<S: DataSource>(&mut self, source: &S) -> Result<SavedDataset, WizardError> {
        let request = self.begin_submit()?;
        let result = source.save_dataset(&request).await;
        self.finish_submit(result)
    }

    /// Snapshot for API clients. Drains pending notices.
    pub fn view(&mut self) -> DatasetWizardView {
        DatasetWizardView {
            nav: self.nav.view(),
            can_advance: self.can_advance(),
            form: self.form.clone(),
            request_filters: request_filters(&self.form),
            workflows: self.workflows.clone(),
            asr_models: self.asr_models.clone(),
            preview_loading: self.preview_loading,
            languages: LANGUAGES,
            notices: self.notices.drain(),
        }
    }

    fn invalidate_preview(&mut self) {
        self.revision += 1;
        self.form.preview = None;
        if self.preview_loading {
            self.previews.cancel();
            self.preview_loading = false;
        }
    }
}

fn invalid(field: &str, reason: &str) -> WizardError {
    WizardError::InvalidField {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_optional_day(field: &str, raw: Option<&str>) -> Result<Option<NaiveDate>, WizardError> {
    match raw.and_then(non_blank) {
        None => Ok(None),
        Some(day) => parse_day(&day).map(Some).map_err(|reason| invalid(field, &reason)),
    }
}

fn toggle(list: &mut Vec<String>, item: String) {
    if let Some(pos) = list.iter().position(|x| *x == item) {
        list.remove(pos);
    } else {
        list.push(item);
    }
}
