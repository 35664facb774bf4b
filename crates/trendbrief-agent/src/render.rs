//! Plain-text email rendering of a finished report.

use crate::types::CompetitorRecord;

/// Render the records into the delivery layout: heading behind a marker
/// glyph, summary on the next line, an engagement-labeled line, and a blank
/// line between records.
#[must_use]
pub fn format_email_body(records: &[CompetitorRecord]) -> String {
    let blocks: Vec<String> = records
        .iter()
        .map(|r| {
            format!(
                "📌 *{}*\n{}\n🔸 Engagement: {}\n",
                r.heading, r.summary, r.engagement
            )
        })
        .collect();
    blocks.join("\n\n")
}

/// Default email subject when the request does not supply one.
#[must_use]
pub fn default_subject(brand: &str) -> String {
    format!("{brand} - Trend Summary")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(heading: &str, summary: &str, engagement: &str) -> CompetitorRecord {
        CompetitorRecord {
            heading: heading.to_string(),
            summary: summary.to_string(),
            engagement: engagement.to_string(),
        }
    }

    #[test]
    fn renders_marker_summary_and_engagement_lines() {
        let body = format_email_body(&[record("Tom Ford", "Uses Instagram.", "High")]);
        assert_eq!(body, "📌 *Tom Ford*\nUses Instagram.\n🔸 Engagement: High\n");
    }

    #[test]
    fn separates_records_with_a_blank_line() {
        let body = format_email_body(&[
            record("Tom Ford", "A", "High"),
            record("Byredo", "B", "Moderate"),
        ]);
        assert!(body.contains("High\n\n\n📌 *Byredo*"));
    }

    #[test]
    fn empty_report_renders_empty_body() {
        assert_eq!(format_email_body(&[]), "");
    }

    #[test]
    fn default_subject_names_the_brand() {
        assert_eq!(default_subject("Dior"), "Dior - Trend Summary");
    }
}
