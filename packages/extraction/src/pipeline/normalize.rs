//! Service response normalization.
//!
//! The extraction service is asked for a single JSON object, but what
//! comes back may be wrapped in a code fence, surrounded by prose, or
//! carry missing and wrong-typed keys. Everything here is tolerant:
//! fields that cannot be read degrade to absent, and a response that
//! cannot be parsed at all is "no data", never a panic.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use tracing::{error, info};

use crate::text::{validate_email, validate_phone};
use crate::types::{ResumeRecord, WorkExperience};

static PLUS_YEARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*\+").unwrap());
static YEARS_MONTHS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*years?\s*(\d+)\s*months?").unwrap());
static MONTHS_ONLY: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*months?").unwrap());
static YEARS_ONLY: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*years?").unwrap());
static BARE_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+(?:\.\d+)?)$").unwrap());

/// Parse a raw service response into a record.
///
/// Returns `None` when the body (after optional fence stripping) is
/// not a JSON object.
pub fn parse_response(raw: &str) -> Option<ResumeRecord> {
    let body = strip_code_fence(raw);
    let value: Value = match serde_json::from_str(body.trim()) {
        Ok(value) => value,
        Err(err) => {
            error!(error = %err, "service response was not valid JSON");
            return None;
        }
    };
    let obj = value.as_object()?;

    let (ug_degree, ug_college, ug_year) = education_fields(obj, "ug_education");
    let (pg_degree, pg_college, pg_year) = education_fields(obj, "pg_education");

    Some(ResumeRecord {
        name: string_field(obj, "name"),
        email: string_field(obj, "email").and_then(|e| validate_email(&e)),
        phone: string_field(obj, "phone").and_then(|p| validate_phone(&p)),
        linkedin: string_field(obj, "linkedin"),
        github: string_field(obj, "github"),
        skills: string_list(obj, "skills"),
        total_experience_years: obj
            .get("total_experience_years")
            .and_then(normalize_experience),
        ug_degree,
        ug_college,
        ug_year,
        pg_degree,
        pg_college,
        pg_year,
        work_experience: work_experience(obj),
    })
}

/// Strip one surrounding markdown code fence, with or without a
/// language tag. Content before the fence (prose preambles) is
/// discarded along with it.
fn strip_code_fence(raw: &str) -> &str {
    if let Some(idx) = raw.find("```json") {
        let rest = &raw[idx + 7..];
        return rest.split("```").next().unwrap_or(rest);
    }
    if let Some(idx) = raw.find("```") {
        let rest = &raw[idx + 3..];
        return rest.split("```").next().unwrap_or(rest);
    }
    raw
}

/// Normalize a free-form experience value to a canonical string.
///
/// Handles `"4+"`, `"2 years 6 months"`, `"18 months"`, `"4 years"`,
/// and bare numbers; anything unparseable becomes `None`.
pub fn normalize_experience(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };

    let exp = text.trim().to_lowercase();
    if exp.is_empty() || exp == "null" || exp == "none" {
        return None;
    }

    // Open-ended claims keep their "+" marker untouched.
    if exp.contains('+') {
        return PLUS_YEARS.captures(&exp).map(|c| format!("{}+", &c[1]));
    }

    if let Some(caps) = YEARS_MONTHS.captures(&exp) {
        let years: f64 = caps[1].parse().ok()?;
        let months: f64 = caps[2].parse().ok()?;
        let total = years + round1(months / 12.0);
        return Some(format!("{total:?}"));
    }

    if let Some(caps) = MONTHS_ONLY.captures(&exp) {
        let months: f64 = caps[1].parse().ok()?;
        return Some(format!("{:?}", round1(months / 12.0)));
    }

    if let Some(caps) = YEARS_ONLY.captures(&exp) {
        let years: f64 = caps[1].parse().ok()?;
        return Some(format!("{years:?}"));
    }

    if let Some(caps) = BARE_NUMBER.captures(&exp) {
        let value: f64 = caps[1].parse().ok()?;
        return if value.fract() == 0.0 {
            Some(format!("{}", value as i64))
        } else {
            Some(format!("{value:?}"))
        };
    }

    None
}

/// Whether an education entry is a sub-degree credential that must be
/// excluded from UG/PG reporting.
pub fn is_diploma_entry(degree: Option<&str>, college: Option<&str>) -> bool {
    let degree = degree.unwrap_or("").to_lowercase();
    let college = college.unwrap_or("").to_lowercase();
    degree.contains("diploma") || college.contains("diploma") || college.contains("polytechnic")
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round_ties_even() / 10.0
}

fn string_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(str::to_string)
}

fn string_list(obj: &Map<String, Value>, key: &str) -> Vec<String> {
    obj.get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn year_field(obj: &Map<String, Value>, key: &str) -> Option<i32> {
    obj.get(key).and_then(Value::as_i64).map(|y| y as i32)
}

/// Degree, college, and year for one education entry, with diploma
/// filtering. Filtered or missing entries null all three together.
fn education_fields(
    obj: &Map<String, Value>,
    key: &str,
) -> (Option<String>, Option<String>, Option<i32>) {
    let Some(entry) = obj.get(key).and_then(Value::as_object) else {
        return (None, None, None);
    };
    let degree = string_field(entry, "degree");
    let college = string_field(entry, "college");
    let year = year_field(entry, "year");

    if is_diploma_entry(degree.as_deref(), college.as_deref()) {
        info!(entry = key, ?degree, ?college, "filtering diploma entry from education");
        (None, None, None)
    } else {
        (degree, college, year)
    }
}

fn work_experience(obj: &Map<String, Value>) -> Vec<WorkExperience> {
    obj.get("work_experience")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_object)
                .map(|job| WorkExperience {
                    title: string_field(job, "title"),
                    company: string_field(job, "company"),
                    start_year: year_field(job, "start_year"),
                    end_year: year_field(job, "end_year"),
                })
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn exp(value: &str) -> Option<String> {
        normalize_experience(&Value::String(value.to_string()))
    }

    #[test]
    fn experience_normalization_table() {
        assert_eq!(exp("4+"), Some("4+".to_string()));
        assert_eq!(exp("2 years 6 months"), Some("2.5".to_string()));
        assert_eq!(exp("18 months"), Some("1.5".to_string()));
        assert_eq!(exp("6"), Some("6".to_string()));
        assert_eq!(exp("4.5"), Some("4.5".to_string()));
        assert_eq!(exp(""), None);
        assert_eq!(exp("abc"), None);
        assert_eq!(normalize_experience(&Value::Null), None);
    }

    #[test]
    fn experience_year_only_keeps_decimal_form() {
        assert_eq!(exp("4 years"), Some("4.0".to_string()));
        assert_eq!(exp("3 years 0 months"), Some("3.0".to_string()));
    }

    #[test]
    fn experience_accepts_numeric_json_values() {
        assert_eq!(
            normalize_experience(&json!(6)),
            Some("6".to_string())
        );
        assert_eq!(
            normalize_experience(&json!(4.5)),
            Some("4.5".to_string())
        );
    }

    #[test]
    fn experience_none_and_null_strings() {
        assert_eq!(exp("none"), None);
        assert_eq!(exp("null"), None);
        assert_eq!(exp("   "), None);
    }

    #[test]
    fn diploma_entries_detected() {
        assert!(is_diploma_entry(Some("Diploma in Engineering"), None));
        assert!(is_diploma_entry(None, Some("Government Polytechnic")));
        assert!(is_diploma_entry(None, Some("Diploma College")));
        assert!(!is_diploma_entry(Some("B.Tech"), Some("IIT Delhi")));
        assert!(!is_diploma_entry(None, None));
    }

    #[test]
    fn diploma_entry_nulls_all_three_fields() {
        let response = json!({
            "ug_education": {
                "degree": "Diploma in Engineering",
                "college": "City College",
                "year": 2015
            }
        });
        let record = parse_response(&response.to_string()).unwrap();
        assert_eq!(record.ug_degree, None);
        assert_eq!(record.ug_college, None);
        assert_eq!(record.ug_year, None);
    }

    #[test]
    fn fenced_response_with_extra_and_missing_keys() {
        let raw = r#"Here is the extracted data:
```json
{
  "name": "Jane Doe",
  "email": "JANE@EXAMPLE.COM",
  "phone": "+1 (555) 123-4567",
  "linkedin": "https://linkedin.com/in/janedoe",
  "skills": ["Rust", "Python"],
  "confidence": 0.97,
  "work_experience": [
    {"title": "Engineer", "company": "Acme", "start_year": 2019, "end_year": null}
  ]
}
```"#;
        let record = parse_response(raw).unwrap();
        assert_eq!(record.name.as_deref(), Some("Jane Doe"));
        assert_eq!(record.email.as_deref(), Some("jane@example.com"));
        assert_eq!(record.phone.as_deref(), Some("+1 (555) 123-4567"));
        // Missing key is absent, unknown key is ignored.
        assert_eq!(record.github, None);
        assert_eq!(record.skills, vec!["Rust", "Python"]);
        assert_eq!(record.work_experience.len(), 1);
        assert_eq!(record.work_experience[0].end_year, None);
    }

    #[test]
    fn fence_without_language_tag() {
        let raw = "```\n{\"name\": \"Jane\"}\n```";
        let record = parse_response(raw).unwrap();
        assert_eq!(record.name.as_deref(), Some("Jane"));
    }

    #[test]
    fn non_json_response_is_no_data() {
        assert!(parse_response("I could not parse this resume.").is_none());
        assert!(parse_response("").is_none());
    }

    #[test]
    fn non_object_json_is_no_data() {
        assert!(parse_response("[1, 2, 3]").is_none());
        assert!(parse_response("\"just a string\"").is_none());
    }

    #[test]
    fn wrong_typed_fields_degrade_to_absent() {
        let response = json!({
            "name": 42,
            "email": ["not", "a", "string"],
            "skills": "Rust",
            "ug_education": "none",
            "work_experience": {"title": "not a list"}
        });
        let record = parse_response(&response.to_string()).unwrap();
        assert_eq!(record.name, None);
        assert_eq!(record.email, None);
        assert!(record.skills.is_empty());
        assert_eq!(record.ug_degree, None);
        assert!(record.work_experience.is_empty());
    }

    #[test]
    fn invalid_contact_fields_become_absent() {
        let response = json!({
            "email": "not-an-email",
            "phone": "12345"
        });
        let record = parse_response(&response.to_string()).unwrap();
        assert_eq!(record.email, None);
        assert_eq!(record.phone, None);
    }
}
