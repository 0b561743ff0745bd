//! Content-safety policy attached to every Gemini request.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HarmCategory {
    HarmCategoryHarassment,
    HarmCategoryHateSpeech,
    HarmCategorySexuallyExplicit,
    HarmCategoryDangerousContent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HarmBlockThreshold {
    BlockLowAndAbove,
    BlockMediumAndAbove,
    BlockOnlyHigh,
    BlockNone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SafetySetting {
    pub category: HarmCategory,
    pub threshold: HarmBlockThreshold,
}

/// Immutable set of safety thresholds, built once and shared by the client.
///
/// ```
/// use sitechat_llm::safety::{HarmBlockThreshold, SafetySettings};
///
/// let settings = SafetySettings::default();
/// assert_eq!(settings.as_slice().len(), 4);
/// assert!(settings
///     .as_slice()
///     .iter()
///     .all(|s| s.threshold == HarmBlockThreshold::BlockMediumAndAbove));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SafetySettings(Vec<SafetySetting>);

impl SafetySettings {
    /// Apply one threshold to every listed category.
    pub fn uniform(categories: &[HarmCategory], threshold: HarmBlockThreshold) -> Self {
        Self(
            categories
                .iter()
                .map(|&category| SafetySetting {
                    category,
                    threshold,
                })
                .collect(),
        )
    }

    pub fn as_slice(&self) -> &[SafetySetting] {
        &self.0
    }
}

impl Default for SafetySettings {
    fn default() -> Self {
        Self::uniform(
            &[
                HarmCategory::HarmCategoryHarassment,
                HarmCategory::HarmCategoryHateSpeech,
                HarmCategory::HarmCategorySexuallyExplicit,
                HarmCategory::HarmCategoryDangerousContent,
            ],
            HarmBlockThreshold::BlockMediumAndAbove,
        )
    }
}
