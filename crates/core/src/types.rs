use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SummarizeError};

/// One visual or audio observation anchored to a time range of the video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextEntry {
    #[serde(rename = "type")]
    pub kind: String,
    pub content: String,
    pub start_time: f64,
    pub end_time: f64,
}

impl ContextEntry {
    pub fn new(kind: impl Into<String>, content: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            kind: kind.into(),
            content: content.into(),
            start_time: start,
            end_time: end,
        }
    }

    pub fn visual(content: impl Into<String>, start: f64, end: f64) -> Self {
        Self::new("visual", content, start, end)
    }

    pub fn audio(content: impl Into<String>, start: f64, end: f64) -> Self {
        Self::new("audio", content, start, end)
    }

    fn check_times(&self) -> std::result::Result<(), String> {
        if !self.start_time.is_finite() || !self.end_time.is_finite() {
            return Err(format!(
                "time bounds must be finite (start_time {}, end_time {})",
                self.start_time, self.end_time
            ));
        }
        if self.start_time < 0.0 {
            return Err(format!("start_time {} is negative", self.start_time));
        }
        if self.start_time > self.end_time {
            return Err(format!(
                "start_time {} is after end_time {}",
                self.start_time, self.end_time
            ));
        }
        Ok(())
    }
}

/// Context entries in the order they appear in the video.
///
/// Accepts either `{"context_list": [...]}` or a bare array when deserialized,
/// and always serializes as the former.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "ContextBatchRepr")]
pub struct ContextBatch {
    pub context_list: Vec<ContextEntry>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ContextBatchRepr {
    Wrapped { context_list: Vec<ContextEntry> },
    Bare(Vec<ContextEntry>),
}

impl From<ContextBatchRepr> for ContextBatch {
    fn from(repr: ContextBatchRepr) -> Self {
        match repr {
            ContextBatchRepr::Wrapped { context_list } | ContextBatchRepr::Bare(context_list) => {
                Self { context_list }
            }
        }
    }
}

impl ContextBatch {
    pub fn new(entries: Vec<ContextEntry>) -> Self {
        Self {
            context_list: entries,
        }
    }

    pub fn len(&self) -> usize {
        self.context_list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.context_list.is_empty()
    }

    pub fn entries(&self) -> &[ContextEntry] {
        &self.context_list
    }

    /// Latest `end_time` across all entries, in seconds.
    pub fn duration(&self) -> f64 {
        self.context_list
            .iter()
            .map(|e| e.end_time)
            .fold(0.0, f64::max)
    }

    /// Reject batches that cannot produce a meaningful prompt.
    pub fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(SummarizeError::EmptyContext);
        }
        for (index, entry) in self.context_list.iter().enumerate() {
            entry
                .check_times()
                .map_err(|reason| SummarizeError::InvalidEntry { index, reason })?;
        }
        Ok(())
    }
}

impl From<Vec<ContextEntry>> for ContextBatch {
    fn from(entries: Vec<ContextEntry>) -> Self {
        Self::new(entries)
    }
}

impl FromIterator<ContextEntry> for ContextBatch {
    fn from_iter<I: IntoIterator<Item = ContextEntry>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[schemars(title = "Summary")]
pub struct SummaryResult {
    /// Summary of the video built from its visual and audio context.
    pub summary: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn red_car() -> ContextBatch {
        ContextBatch::new(vec![
            ContextEntry::visual("a red car drives by", 0.0, 3.5),
            ContextEntry::audio("engine revving sound", 1.0, 3.0),
        ])
    }

    #[test]
    fn entry_serializes_kind_as_type() {
        let value = serde_json::to_value(ContextEntry::visual("a cat", 0.0, 1.0)).unwrap();
        assert_eq!(value["type"], "visual");
        assert!(value.get("kind").is_none());
    }

    #[test]
    fn batch_accepts_wrapped_and_bare_arrays() {
        let wrapped: ContextBatch = serde_json::from_str(
            r#"{"context_list": [{"type": "audio", "content": "hi", "start_time": 0, "end_time": 1}]}"#,
        )
        .unwrap();
        let bare: ContextBatch = serde_json::from_str(
            r#"[{"type": "audio", "content": "hi", "start_time": 0, "end_time": 1}]"#,
        )
        .unwrap();
        assert_eq!(wrapped, bare);
        assert_eq!(wrapped.len(), 1);
    }

    #[test]
    fn batch_serializes_wrapped() {
        let value = serde_json::to_value(red_car()).unwrap();
        assert_eq!(value["context_list"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn duration_is_latest_end() {
        assert_eq!(red_car().duration(), 3.5);
        assert_eq!(ContextBatch::default().duration(), 0.0);
    }

    #[test]
    fn validate_accepts_overlapping_entries() {
        assert!(red_car().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty() {
        let err = ContextBatch::default().validate().unwrap_err();
        assert!(matches!(err, SummarizeError::EmptyContext));
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn validate_rejects_inverted_range() {
        let batch = ContextBatch::new(vec![
            ContextEntry::visual("ok", 0.0, 1.0),
            ContextEntry::audio("backwards", 5.0, 2.0),
        ]);
        match batch.validate() {
            Err(SummarizeError::InvalidEntry { index, .. }) => assert_eq!(index, 1),
            other => panic!("expected InvalidEntry, got {other:?}"),
        }
    }

    #[test]
    fn validate_rejects_negative_and_nan() {
        let negative = ContextBatch::new(vec![ContextEntry::visual("x", -1.0, 1.0)]);
        assert!(matches!(
            negative.validate(),
            Err(SummarizeError::InvalidEntry { index: 0, .. })
        ));

        let nan = ContextBatch::new(vec![ContextEntry::visual("x", 0.0, f64::NAN)]);
        assert!(matches!(
            nan.validate(),
            Err(SummarizeError::InvalidEntry { index: 0, .. })
        ));
    }

    #[test]
    fn zero_length_entry_is_valid() {
        let batch = ContextBatch::new(vec![ContextEntry::visual("flash", 2.0, 2.0)]);
        assert!(batch.validate().is_ok());
    }
}
