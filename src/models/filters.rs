use serde::{Deserialize, Serialize};

/// Warehouse filter set used both to preview a data pull and to describe
/// the saved dataset. Tri-state flags use `None` for "any".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataFilters {
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub tenant_id: Option<String>,
    #[serde(default)]
    pub date_range_start: Option<String>,
    #[serde(default)]
    pub date_range_end: Option<String>,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub asr_model_versions: Vec<String>,
    #[serde(default)]
    pub workflow_ids: Vec<String>,
    #[serde(default)]
    pub is_noisy: Option<bool>,
    #[serde(default)]
    pub overlapping_speech: Option<bool>,
    #[serde(default)]
    pub is_not_relevant: Option<bool>,
    #[serde(default)]
    pub is_voice_recording_na: Option<bool>,
    #[serde(default)]
    pub is_partial_audio: Option<bool>,
    #[serde(default)]
    pub is_unclear_audio: Option<bool>,
}

/// The tri-state audio-quality flags that can be toggled on a filter set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityFlag {
    IsNoisy,
    OverlappingSpeech,
    IsNotRelevant,
    IsVoiceRecordingNa,
    IsPartialAudio,
    IsUnclearAudio,
}

impl QualityFlag {
    pub const ALL: [QualityFlag; 6] = [
        QualityFlag::IsNoisy,
        QualityFlag::OverlappingSpeech,
        QualityFlag::IsNotRelevant,
        QualityFlag::IsVoiceRecordingNa,
        QualityFlag::IsPartialAudio,
        QualityFlag::IsUnclearAudio,
    ];
}

impl DataFilters {
    pub fn flag(&self, flag: QualityFlag) -> Option<bool> {
        match flag {
            QualityFlag::IsNoisy => self.is_noisy,
            QualityFlag::OverlappingSpeech => self.overlapping_speech,
            QualityFlag::IsNotRelevant => self.is_not_relevant,
            QualityFlag::IsVoiceRecordingNa => self.is_voice_recording_na,
            QualityFlag::IsPartialAudio => self.is_partial_audio,
            QualityFlag::IsUnclearAudio => self.is_unclear_audio,
        }
    }

    pub fn set_flag(&mut self, flag: QualityFlag, value: Option<bool>) {
        let slot = match flag {
            QualityFlag::IsNoisy => &mut self.is_noisy,
            QualityFlag::OverlappingSpeech => &mut self.overlapping_speech,
            QualityFlag::IsNotRelevant => &mut self.is_not_relevant,
            QualityFlag::IsVoiceRecordingNa => &mut self.is_voice_recording_na,
            QualityFlag::IsPartialAudio => &mut self.is_partial_audio,
            QualityFlag::IsUnclearAudio => &mut self.is_unclear_audio,
        };
        *slot = value;
    }

    /// Number of constraints beyond the tenant itself.
    pub fn constraint_count(&self) -> usize {
        let flags = QualityFlag::ALL
            .iter()
            .filter(|f| self.flag(**f).is_some())
            .count();
        let dates = [&self.date_range_start, &self.date_range_end]
            .iter()
            .filter(|d| d.is_some())
            .count();
        flags
            + dates
            + self.languages.len()
            + self.asr_model_versions.len()
            + self.workflow_ids.len()
    }
}
