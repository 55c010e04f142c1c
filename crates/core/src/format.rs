use crate::types::ContextBatch;

/// Format seconds as MM:SS timestamp
pub fn format_timestamp(seconds: f64) -> String {
    let mins = (seconds / 60.0) as u32;
    let secs = (seconds % 60.0) as u32;
    format!("{:02}:{:02}", mins, secs)
}

/// Format context entries as a timeline, one entry per line
pub fn format_context_timeline(batch: &ContextBatch) -> String {
    batch
        .entries()
        .iter()
        .map(|entry| {
            format!(
                "[{}–{}] {}: {}",
                format_timestamp(entry.start_time),
                format_timestamp(entry.end_time),
                entry.kind,
                entry.content.trim()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
