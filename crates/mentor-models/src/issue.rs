//! Review issues and the quality score derived from them.

use serde::{Deserialize, Deserializer, Serialize};

/// Category of a review finding.
///
/// Model output is not trusted to use the exact vocabulary, so unknown
/// labels deserialize to [`IssueKind::BestPractice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum IssueKind {
    Bug,
    Security,
    Performance,
    #[default]
    BestPractice,
    Accessibility,
}

impl IssueKind {
    /// Parses a loose label such as `"best_practice"` or `"Security"`.
    pub fn parse_lossy(label: &str) -> Self {
        let normalized = label.trim().to_lowercase().replace(['_', ' '], "-");
        match normalized.as_str() {
            "bug" => Self::Bug,
            "security" => Self::Security,
            "performance" => Self::Performance,
            "accessibility" | "a11y" => Self::Accessibility,
            _ => Self::BestPractice,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bug => "bug",
            Self::Security => "security",
            Self::Performance => "performance",
            Self::BestPractice => "best-practice",
            Self::Accessibility => "accessibility",
        }
    }
}

impl<'de> Deserialize<'de> for IssueKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(lenient_label(deserializer)?
            .map(|label| Self::parse_lossy(&label))
            .unwrap_or_default())
    }
}

/// How serious a finding is. Unknown labels fall back to [`Severity::Info`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Warning,
    #[default]
    Info,
}

impl Severity {
    pub fn parse_lossy(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "critical" => Self::Critical,
            "warning" => Self::Warning,
            _ => Self::Info,
        }
    }
}

impl<'de> Deserialize<'de> for Severity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(lenient_label(deserializer)?
            .map(|label| Self::parse_lossy(&label))
            .unwrap_or_default())
    }
}

/// A label string, or `None` for `null` and non-string values.
fn lenient_label<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(label) => Ok(Some(label)),
        _ => Ok(None),
    }
}

/// A single review finding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    #[serde(rename = "type", default)]
    pub kind: IssueKind,

    #[serde(default)]
    pub severity: Severity,

    /// 1-based line number, when the reviewer could pin one down.
    #[serde(
        default,
        deserialize_with = "lenient_line",
        skip_serializing_if = "Option::is_none"
    )]
    pub line: Option<u32>,

    #[serde(default)]
    pub description: String,

    /// Suggested change, usually a short code example.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix: Option<String>,

    /// Why the issue matters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl Issue {
    pub fn new(kind: IssueKind, severity: Severity, description: impl Into<String>) -> Self {
        Self {
            kind,
            severity,
            line: None,
            description: description.into(),
            fix: None,
            explanation: None,
        }
    }

    /// Deserializes issues one by one, dropping entries that are not
    /// objects rather than rejecting the whole list.
    pub fn list_from_values(values: Vec<serde_json::Value>) -> Vec<Issue> {
        values
            .into_iter()
            .filter_map(|value| serde_json::from_value(value).ok())
            .collect()
    }
}

/// Accepts `12`, `12.0` and `"12"`; anything else reads as no line.
fn lenient_line<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    let number = match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(number
        .filter(|n| n.is_finite() && *n >= 0.0 && *n <= u32::MAX as f64)
        .map(|n| n.trunc() as u32))
}

/// Number of issues at each severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityCounts {
    #[serde(rename = "criticalCount")]
    pub critical: usize,
    #[serde(rename = "warningCount")]
    pub warning: usize,
    #[serde(rename = "infoCount")]
    pub info: usize,
}

impl SeverityCounts {
    pub fn from_issues(issues: &[Issue]) -> Self {
        issues.iter().fold(Self::default(), |mut counts, issue| {
            match issue.severity {
                Severity::Critical => counts.critical += 1,
                Severity::Warning => counts.warning += 1,
                Severity::Info => counts.info += 1,
            }
            counts
        })
    }
}

/// Quality score on a 0..=10 scale.
///
/// Each critical issue costs 2 points and each warning 0.5; info issues are
/// free. The result is clamped at zero and rounded to one decimal place.
pub fn score_issues(issues: &[Issue]) -> f64 {
    let counts = SeverityCounts::from_issues(issues);
    let raw = 10.0 - 2.0 * counts.critical as f64 - 0.5 * counts.warning as f64;
    (raw.clamp(0.0, 10.0) * 10.0).round() / 10.0
}
