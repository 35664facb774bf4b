//! Finalize: wrap the refined records into the terminal output shape.

use crate::types::{CompetitorRecord, TrendReport};

/// Produce the pipeline's single well-defined result. No content changes
/// here; this fixes the boundary contract between the pipeline and its
/// caller.
#[must_use]
pub fn finalize(records: Vec<CompetitorRecord>) -> TrendReport {
    TrendReport { summaries: records }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_records_without_modification() {
        let records = vec![CompetitorRecord {
            heading: "Tom Ford".to_string(),
            summary: "summary".to_string(),
            engagement: "High".to_string(),
        }];
        let report = finalize(records.clone());
        assert_eq!(report.summaries, records);
    }
}
