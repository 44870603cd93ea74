//! OCR artifact repair, fuzzy deduplication, and contact validation.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::text::similarity::ratio;

/// Truncated mail domains OCR commonly produces: `@gmail.c`, `@yahoo.co`.
/// The optional trailing word character stands in for a lookahead — when
/// it matched, the domain was not actually clipped.
static DOMAIN_FIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)@(gmail|yahoo|hotmail|outlook|icloud)\.c(?:om?)?(\w?)").unwrap()
});

static EMAIL_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap());

/// Remove near-duplicate lines using fuzzy matching.
///
/// Blank lines are dropped, remaining lines are trimmed, and a line is
/// kept only if its case-insensitive similarity against every line kept
/// so far stays below `threshold`. Order-preserving; quadratic in the
/// number of kept lines, which is bounded by per-page line counts.
pub fn deduplicate_lines<S: AsRef<str>>(lines: &[S], threshold: f64) -> Vec<String> {
    let mut unique: Vec<String> = Vec::new();
    let mut unique_lower: Vec<String> = Vec::new();
    for line in lines {
        let line = line.as_ref().trim();
        if line.is_empty() {
            continue;
        }
        let lower = line.to_lowercase();
        let is_duplicate = unique_lower.iter().any(|kept| ratio(&lower, kept) >= threshold);
        if !is_duplicate {
            unique.push(line.to_string());
            unique_lower.push(lower);
        }
    }
    unique
}

/// Fix common OCR misreads.
///
/// Repairs clipped mail domains, then the character substitutions OCR
/// engines make most often: `|` read for `I`, and `0`/`1` read for
/// `O`/`l` when sandwiched between letters (numeric tokens are left
/// alone).
pub fn fix_ocr_artifacts(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let repaired = DOMAIN_FIX.replace_all(text, |caps: &Captures| {
        match caps.get(2).map(|m| m.as_str()) {
            // A word character follows: this was a longer domain, not a
            // clipped one. Leave it untouched.
            Some(tail) if !tail.is_empty() => caps[0].to_string(),
            _ => format!("@{}.com", caps[1].to_lowercase()),
        }
    });

    let piped = repaired.replace('|', "I");

    let chars: Vec<char> = piped.chars().collect();
    let mut out = String::with_capacity(piped.len());
    for (i, &c) in chars.iter().enumerate() {
        let prev_alpha = i > 0 && chars[i - 1].is_ascii_alphabetic();
        let next_alpha = i + 1 < chars.len() && chars[i + 1].is_ascii_alphabetic();
        out.push(match c {
            '0' if prev_alpha && next_alpha => 'O',
            '1' if prev_alpha && next_alpha => 'l',
            _ => c,
        });
    }
    out
}

/// Validate and clean an email address.
///
/// Runs artifact repair first, then requires the full string to be a
/// `local@domain.tld` shape with a final label of at least two letters.
/// Returns the lowercased address.
pub fn validate_email(email: &str) -> Option<String> {
    if email.is_empty() {
        return None;
    }
    let fixed = fix_ocr_artifacts(email);
    if EMAIL_SHAPE.is_match(&fixed) {
        Some(fixed.to_lowercase())
    } else {
        None
    }
}

/// Validate a phone number.
///
/// Accepts 10 to 15 digits, ignoring a leading international `+` and
/// any separators. The original string is returned unstripped so the
/// caller keeps the formatting the candidate wrote.
pub fn validate_phone(phone: &str) -> Option<String> {
    if phone.is_empty() {
        return None;
    }
    let digit_count = phone.chars().filter(char::is_ascii_digit).count();
    if (10..=15).contains(&digit_count) {
        Some(phone.to_string())
    } else {
        None
    }
}
