//! Multi-step wizard state machines.
//!
//! Each wizard owns a [`Navigator`] over its step table, a form, and the
//! option sets loaded for the current tenant. Remote calls are split in
//! two: a synchronous `select_*`/`begin_*` that hands back a load, and an
//! `apply_*`/`finish_*` that stores the result. The await happens in
//! between without borrowing the wizard.

pub mod dataset;
pub mod hyperparameters;
pub mod navigator;
pub mod notice;
pub mod options;
pub mod step;
pub mod training;

pub use dataset::{DatasetEdit, DatasetForm, DatasetWizard, DatasetWizardView, PreviewLoad, TenantLoad};
pub use hyperparameters::{HyperparameterSpec, Hyperparameters, ParamKind, ParamValue, HYPERPARAMETERS};
pub use navigator::{Navigator, NavigatorView};
pub use notice::{Notice, NoticeLevel, Notices};
pub use options::{KeyedLoader, LoadTicket, OptionSet};
pub use step::{Step, DATASET_STEPS, TRAINING_STEPS};
pub use training::{
    ExecutionParams, TrainingEdit, TrainingForm, TrainingLoad, TrainingWizard, TrainingWizardView,
};
