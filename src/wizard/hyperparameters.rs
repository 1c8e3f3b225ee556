//! Training hyperparameters.
//!
//! One table drives both the form (visible entries) and the request body
//! (visible entries plus the hidden `wandb-*` ones, which always go out
//! with their configured defaults).

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::WizardError;

/// Keys the composer fills from the selected dataset preparations.
pub const TRAIN_DATA_PATH: &str = "train-data-path";
pub const TEST_DATA_PATH: &str = "test-data-path";
pub const VALIDATION_DATA_PATH: &str = "validation-data-path";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamKind {
    Int,
    Float,
    Bool,
    Str,
}

impl ParamKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamKind::Int => "int",
            ParamKind::Float => "float",
            ParamKind::Bool => "bool",
            ParamKind::Str => "str",
        }
    }
}

/// A typed hyperparameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
}

impl ParamValue {
    pub fn kind(&self) -> ParamKind {
        match self {
            ParamValue::Int(_) => ParamKind::Int,
            ParamValue::Float(_) => ParamKind::Float,
            ParamValue::Bool(_) => ParamKind::Bool,
            ParamValue::Str(_) => ParamKind::Str,
        }
    }

    /// Parse user input as the given kind.
    pub fn parse(kind: ParamKind, raw: &str) -> Result<Self, String> {
        let trimmed = raw.trim();
        match kind {
            ParamKind::Int => trimmed
                .parse::<i64>()
                .map(ParamValue::Int)
                .map_err(|_| format!("'{}' is not an integer", trimmed)),
            ParamKind::Float => match trimmed.parse::<f64>() {
                Ok(f) if f.is_finite() => Ok(ParamValue::Float(f)),
                _ => Err(format!("'{}' is not a finite number", trimmed)),
            },
            ParamKind::Bool => match trimmed.to_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => Ok(ParamValue::Bool(true)),
                "false" | "0" | "no" | "off" => Ok(ParamValue::Bool(false)),
                _ => Err(format!("'{}' is not a boolean", trimmed)),
            },
            ParamKind::Str => Ok(ParamValue::Str(raw.to_string())),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            ParamValue::Int(i) => Value::from(*i),
            ParamValue::Float(f) => Value::from(*f),
            ParamValue::Bool(b) => Value::Bool(*b),
            ParamValue::Str(s) => Value::String(s.clone()),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Int(i) => write!(f, "{}", i),
            ParamValue::Float(v) => write!(f, "{}", v),
            ParamValue::Bool(b) => write!(f, "{}", b),
            ParamValue::Str(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HyperparameterSpec {
    pub argument: &'static str,
    pub kind: ParamKind,
    pub default: &'static str,
    pub description: &'static str,
    pub hidden: bool,
}

const fn spec(argument: &'static str, kind: ParamKind, default: &'static str, description: &'static str) -> HyperparameterSpec {
    HyperparameterSpec {
        argument,
        kind,
        default,
        description,
        hidden: false,
    }
}

const fn hidden(argument: &'static str, kind: ParamKind, default: &'static str, description: &'static str) -> HyperparameterSpec {
    HyperparameterSpec {
        argument,
        kind,
        default,
        description,
        hidden: true,
    }
}

pub const HYPERPARAMETERS: &[HyperparameterSpec] = &[
    spec("gradient-accumulation-steps", ParamKind::Int, "2", "gradient accumulation steps"),
    spec("max-steps", ParamKind::Int, "20000", "number of update steps to train for"),
    spec("save-steps", ParamKind::Int, "1000", "number of every steps to save model checkpoint"),
    spec("eval-steps", ParamKind::Int, "1000", "number of every steps to evaluate the model"),
    spec("batch-size", ParamKind::Int, "8", "batch size"),
    spec("lr", ParamKind::Float, "0.0001", "learning rate"),
    spec("optim", ParamKind::Str, "adafactor", "optimization strategy"),
    spec("debug-mode", ParamKind::Bool, "false", "use limited amount of eval data"),
    spec("debug-examples", ParamKind::Int, "1000", "use debug-examples amount of eval data"),
    spec("whisper-model-name", ParamKind::Str, "openai/whisper-large-v2", "whisper model name"),
    spec("parts-to-freeze", ParamKind::Str, "None", "which model parts to freeze"),
    spec("kws-prompt-prob", ParamKind::Float, "0", "probability to sample keyword spotter prompt"),
    spec("max-tokens", ParamKind::Int, "4", "max number of tokens to sample for keyword"),
    spec("min-keyword-len", ParamKind::Int, "3", "min keyword length"),
    spec("max-prompt-keywords", ParamKind::Int, "5", "max number of keywords to sample for prompt"),
    spec("neg-keyword-prob", ParamKind::Float, "0.1", "probability to sample a negative keyword"),
    spec("use-lora", ParamKind::Bool, "false", "use training with LoRA"),
    spec("lora-merge-and-unload", ParamKind::Bool, "false", "merge the LoRA layers into the base model"),
    spec("sot-prob", ParamKind::Float, "0", "probability of adding start of transcript tokens to an audio sample"),
    spec("max-sot-tokens", ParamKind::Int, "10", "maximum number of start of transcript tokens to add to an audio sample"),
    hidden("wandb-logging", ParamKind::Bool, "true", "enable wandb logging"),
    hidden("wandb-project", ParamKind::Str, "internal-asr", "wandb project name"),
    hidden("wandb-entity", ParamKind::Str, "asr-ds", "wandb entity name"),
];

impl HyperparameterSpec {
    /// Typed default. An unparsable numeric default degrades to zero.
    pub fn default_value(&self) -> ParamValue {
        ParamValue::parse(self.kind, self.default).unwrap_or(match self.kind {
            ParamKind::Int => ParamValue::Int(0),
            ParamKind::Float => ParamValue::Float(0.0),
            ParamKind::Bool => ParamValue::Bool(false),
            ParamKind::Str => ParamValue::Str(String::new()),
        })
    }
}

pub fn lookup(argument: &str) -> Option<&'static HyperparameterSpec> {
    HYPERPARAMETERS.iter().find(|h| h.argument == argument)
}

pub fn visible() -> impl Iterator<Item = &'static HyperparameterSpec> {
    HYPERPARAMETERS.iter().filter(|h| !h.hidden)
}

pub fn hidden_params() -> impl Iterator<Item = &'static HyperparameterSpec> {
    HYPERPARAMETERS.iter().filter(|h| h.hidden)
}

/// Values of the user-editable hyperparameters, keyed by argument name.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Hyperparameters(BTreeMap<String, ParamValue>);

impl Default for Hyperparameters {
    fn default() -> Self {
        Self(
            visible()
                .map(|h| (h.argument.to_string(), h.default_value()))
                .collect(),
        )
    }
}

impl Hyperparameters {
    pub fn get(&self, argument: &str) -> Option<&ParamValue> {
        self.0.get(argument)
    }

    /// Parse `raw` against the declared kind and store it. Hidden and
    /// unknown arguments are refused.
    pub fn set(&mut self, argument: &str, raw: &str) -> Result<(), WizardError> {
        let spec = lookup(argument)
            .filter(|h| !h.hidden)
            .ok_or_else(|| WizardError::InvalidField {
                field: argument.to_string(),
                reason: "not an editable hyperparameter".to_string(),
            })?;
        let value = ParamValue::parse(spec.kind, raw).map_err(|reason| WizardError::InvalidField {
            field: argument.to_string(),
            reason,
        })?;
        self.0.insert(argument.to_string(), value);
        Ok(())
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ParamValue)> {
        self.0.iter()
    }

    /// Every table entry in table order: visible ones from `self` (default if
    /// absent), hidden ones always from their default.
    pub fn to_payload(&self) -> Map<String, Value> {
        let mut out = Map::new();
        for spec in HYPERPARAMETERS {
            let value = if spec.hidden {
                spec.default_value()
            } else {
                self.0
                    .get(spec.argument)
                    .cloned()
                    .unwrap_or_else(|| spec.default_value())
            };
            out.insert(spec.argument.to_string(), value.to_json());
        }
        out
    }
}
