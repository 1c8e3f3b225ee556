pub mod wizard_store;

pub use wizard_store::{random_session_id, WizardSession, WizardStore};
