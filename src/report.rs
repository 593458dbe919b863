//! Report assembly — turns a finished session into the analysis request.

use crate::checklist::Session;

/// Fixed instruction that opens every report.
pub const REPORT_PREAMBLE: &str =
    "Analyze the photo and the report. Describe what is wrong with the cleanliness at the location:";

/// A deterministic analysis request: the report text plus the photo
/// references, each tagged with its 1-based entry index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub text: String,
    pub photos: Vec<(usize, String)>,
}

/// Build the report for one completed pass.
///
/// Iterates entries 1..=N explicitly, so the output order depends only on the
/// entry indices, never on the order findings were recorded. Pure: identical
/// sessions produce identical reports.
pub fn build_report(session: &Session) -> Report {
    let location = session.chosen_location.as_deref().unwrap_or("(not selected)");

    let mut text = String::from(REPORT_PREAMBLE);
    text.push_str(&format!("Location: {location}\n"));

    let mut photos = Vec::new();
    for entry in 1..=session.entries() {
        match session.finding(entry) {
            Some(finding) => {
                text.push_str(&format!("Check list {entry} A comment: {}\n", finding.comment));
                if let Some(url) = &finding.photo_ref {
                    photos.push((entry, url.clone()));
                }
            }
            None => text.push_str(&format!("Check list {entry} all clear \n")),
        }
    }

    Report { text, photos }
}
