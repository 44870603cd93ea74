//! The normalized output of the pipeline.

use serde::{Deserialize, Serialize};

/// Structured fields extracted from one resume.
///
/// Constructed once per document by the response normalizer and handed
/// to the caller unchanged; the persistence layer may enrich it with a
/// file identity and uploader reference, but this crate never mutates
/// it after assembly. Every field is optional — a record with nothing
/// recognized is still a valid record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumeRecord {
    pub name: Option<String>,
    /// Validated and lowercased, or absent.
    pub email: Option<String>,
    /// Validated (10-15 digits), kept in the candidate's own formatting.
    pub phone: Option<String>,
    pub linkedin: Option<String>,
    pub github: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    /// Canonical decimal-year string, e.g. `"4.5"`, or `"4+"` for
    /// open-ended claims.
    pub total_experience_years: Option<String>,
    pub ug_degree: Option<String>,
    pub ug_college: Option<String>,
    pub ug_year: Option<i32>,
    pub pg_degree: Option<String>,
    pub pg_college: Option<String>,
    pub pg_year: Option<i32>,
    #[serde(default)]
    pub work_experience: Vec<WorkExperience>,
}

/// One employment entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkExperience {
    pub title: Option<String>,
    pub company: Option<String>,
    pub start_year: Option<i32>,
    /// `None` means the position is current.
    pub end_year: Option<i32>,
}

/// Outcome of processing one document.
///
/// Every code path sets all four fields; a result is never partially
/// constructed. Failures for one document never abort a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingResult {
    pub filename: String,
    pub success: bool,
    pub record: Option<ResumeRecord>,
    pub error: Option<String>,
}

impl ProcessingResult {
    /// A successful extraction with a populated record.
    pub fn success(filename: impl Into<String>, record: ResumeRecord) -> Self {
        Self {
            filename: filename.into(),
            success: true,
            record: Some(record),
            error: None,
        }
    }

    /// A failed extraction with a reason the caller can report.
    pub fn failure(filename: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            success: false,
            record: None,
            error: Some(error.into()),
        }
    }

    /// Text was extracted but no credentials were configured, so field
    /// extraction was skipped. Reported as success with an empty record
    /// and an informational note.
    pub fn text_only(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            success: true,
            record: Some(ResumeRecord::default()),
            error: Some("no API key configured; text extracted but not parsed".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_record_is_empty() {
        let record = ResumeRecord::default();
        assert!(record.name.is_none());
        assert!(record.skills.is_empty());
        assert!(record.work_experience.is_empty());
    }

    #[test]
    fn all_constructors_set_every_field() {
        let ok = ProcessingResult::success("a.pdf", ResumeRecord::default());
        assert!(ok.success && ok.record.is_some() && ok.error.is_none());

        let failed = ProcessingResult::failure("b.pdf", "corrupt file");
        assert!(!failed.success && failed.record.is_none());
        assert_eq!(failed.error.as_deref(), Some("corrupt file"));

        let text_only = ProcessingResult::text_only("c.pdf");
        assert!(text_only.success);
        assert_eq!(text_only.record, Some(ResumeRecord::default()));
        assert!(text_only.error.is_some());
    }
}
