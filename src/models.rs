//! Core data models for Taintriage
//!
//! These models represent static-analysis findings on the way in and
//! triage verdicts on the way out; both sides are plain serde records.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;

/// Generate a deterministic finding ID from its content.
///
/// Findings that arrive without an `id` get one derived from hashing the
/// category, message, and line pair, so re-running the triage yields
/// stable IDs for suppression and tracking. A 16-character hex prefix is
/// plenty at the scale of one findings file.
pub fn deterministic_finding_id(
    vulnerability_type: &str,
    message: &str,
    source_line: u32,
    sink_line: u32,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(vulnerability_type.as_bytes());
    hasher.update(b"\n");
    hasher.update(message.as_bytes());
    hasher.update(b"\n");
    hasher.update(source_line.to_le_bytes());
    hasher.update(sink_line.to_le_bytes());
    let digest = hasher.finalize();
    digest.iter().take(8).map(|b| format!("{b:02x}")).collect()
}

/// Severity levels assigned to triaged findings
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

/// Final classification of a static-analysis finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Classification {
    #[serde(rename = "True Positive")]
    TruePositive,
    #[serde(rename = "False Positive")]
    FalsePositive,
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Classification::TruePositive => write!(f, "True Positive"),
            Classification::FalsePositive => write!(f, "False Positive"),
        }
    }
}

/// One raw finding from a static-analysis tool, as loaded from the
/// findings file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VulnerabilityReport {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(alias = "type")]
    pub vulnerability_type: String,
    #[serde(default)]
    pub message: String,
    pub source_line: u32,
    pub sink_line: u32,
}

impl VulnerabilityReport {
    /// The finding's ID, or a deterministic content hash when absent.
    pub fn id_or_default(&self) -> String {
        self.id.clone().unwrap_or_else(|| {
            deterministic_finding_id(
                &self.vulnerability_type,
                &self.message,
                self.source_line,
                self.sink_line,
            )
        })
    }
}

/// The source-to-sink trace supporting a verdict
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TracePath {
    pub file: String,
    pub function: String,
    pub source_line: u32,
    pub sink_line: u32,
    /// Variables or intermediate steps from source to sink
    pub flow: Vec<String>,
}

/// One sanitizer observed in the flow
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SanitizerInfo {
    pub name: String,
    pub line: u32,
    pub sufficient: bool,
    pub explanation: String,
}

/// The triage verdict for one finding
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VulnerabilityAnalysis {
    pub id: String,
    pub classification: Classification,
    pub severity: Severity,
    pub trace: TracePath,
    #[serde(default)]
    pub sanitizers: Vec<SanitizerInfo>,
    pub assumptions: Vec<String>,
    pub justification: String,
    #[serde(default)]
    pub counterexample: Option<String>,
}

/// Accepted findings-file shapes: a bare array, an object wrapping a
/// `vulnerabilities` array, or a single finding object.
#[derive(Deserialize)]
#[serde(untagged)]
enum FindingsFile {
    Many(Vec<VulnerabilityReport>),
    Wrapped {
        vulnerabilities: Vec<VulnerabilityReport>,
    },
    One(VulnerabilityReport),
}

/// Load findings from a JSON file in any of the accepted shapes.
pub fn load_findings(path: &Path) -> anyhow::Result<Vec<VulnerabilityReport>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read findings file {}: {e}", path.display()))?;
    let parsed: FindingsFile = serde_json::from_str(&content)
        .map_err(|e| anyhow::anyhow!("invalid findings JSON in {}: {e}", path.display()))?;
    Ok(match parsed {
        FindingsFile::Many(findings) => findings,
        FindingsFile::Wrapped { vulnerabilities } => vulnerabilities,
        FindingsFile::One(finding) => vec![finding],
    })
}
