//! Final interview report.
//!
//! Built leniently from whatever the model produced. The four top-level
//! sections (`decision`, `skills_matrix`, `knowledge_gaps`, `roadmap`) are
//! typed fields, so a report can never be missing one of them.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::utils::{
    Record, json_extra, json_number_lenient, json_string, json_string_array,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Decision {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hiring_recommendation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation_reason: Option<String>,
    /// 0-100
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence_score: Option<f64>,
    #[serde(flatten)]
    pub extra: Record,
}

impl Decision {
    fn from_record(record: &Record) -> Self {
        Self {
            grade: json_string(record, "grade"),
            hiring_recommendation: json_string(record, "hiring_recommendation"),
            recommendation_reason: json_string(record, "recommendation_reason"),
            confidence_score: json_number_lenient(record, "confidence_score"),
            extra: json_extra(
                record,
                &[
                    "grade",
                    "hiring_recommendation",
                    "recommendation_reason",
                    "confidence_score",
                ],
            ),
        }
    }
}

/// Scores are 0-10
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillsMatrix {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub technical_skills: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub communication: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub problem_solving: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cultural_fit: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub confirmed_skills: Vec<String>,
    #[serde(flatten)]
    pub extra: Record,
}

impl SkillsMatrix {
    const SCORES: [&'static str; 5] = [
        "technical_skills",
        "communication",
        "problem_solving",
        "experience",
        "cultural_fit",
    ];

    fn from_record(record: &Record) -> Self {
        let mut known = Self::SCORES.to_vec();
        known.push("confirmed_skills");
        Self {
            technical_skills: json_number_lenient(record, "technical_skills"),
            communication: json_number_lenient(record, "communication"),
            problem_solving: json_number_lenient(record, "problem_solving"),
            experience: json_number_lenient(record, "experience"),
            cultural_fit: json_number_lenient(record, "cultural_fit"),
            confirmed_skills: json_string_array(record, "confirmed_skills"),
            extra: json_extra(record, &known),
        }
    }

    fn zeroed() -> Self {
        Self {
            technical_skills: Some(0.0),
            communication: Some(0.0),
            problem_solving: Some(0.0),
            experience: Some(0.0),
            cultural_fit: Some(0.0),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KnowledgeGap {
    pub gap: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub educational_content: String,
    #[serde(flatten)]
    pub extra: Record,
}

impl KnowledgeGap {
    /// Gaps arrive either as objects or as bare strings
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) if !s.trim().is_empty() => Some(Self {
                gap: s.trim().to_string(),
                ..Self::default()
            }),
            Value::Object(record) => Some(Self {
                gap: json_string(record, "gap").unwrap_or_default(),
                educational_content: json_string(record, "educational_content")
                    .unwrap_or_default(),
                extra: json_extra(record, &["gap", "educational_content"]),
            }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Roadmap {
    pub immediate: Vec<String>,
    pub short_term: Vec<String>,
    pub long_term: Vec<String>,
    #[serde(flatten)]
    pub extra: Record,
}

impl Roadmap {
    fn from_record(record: &Record) -> Self {
        Self {
            immediate: json_string_array(record, "immediate"),
            short_term: json_string_array(record, "short_term"),
            long_term: json_string_array(record, "long_term"),
            extra: json_extra(record, &["immediate", "short_term", "long_term"]),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinalReport {
    pub decision: Decision,
    pub skills_matrix: SkillsMatrix,
    pub knowledge_gaps: Vec<KnowledgeGap>,
    pub roadmap: Roadmap,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub summary: String,
    #[serde(flatten)]
    pub extra: Record,
}

impl FinalReport {
    /// Normalize a parsed model record; absent or mistyped sections become empty
    pub fn from_record(record: &Record) -> Self {
        let section = |key: &str| record.get(key).and_then(Value::as_object);

        Self {
            decision: section("decision")
                .map(Decision::from_record)
                .unwrap_or_default(),
            skills_matrix: section("skills_matrix")
                .map(SkillsMatrix::from_record)
                .unwrap_or_default(),
            knowledge_gaps: record
                .get("knowledge_gaps")
                .and_then(Value::as_array)
                .map(|gaps| gaps.iter().filter_map(KnowledgeGap::from_value).collect())
                .unwrap_or_default(),
            roadmap: section("roadmap")
                .map(Roadmap::from_record)
                .unwrap_or_default(),
            summary: json_string(record, "summary").unwrap_or_default(),
            extra: json_extra(
                record,
                &[
                    "decision",
                    "skills_matrix",
                    "knowledge_gaps",
                    "roadmap",
                    "summary",
                ],
            ),
        }
    }

    /// Deterministic report used when the model output could not be recovered
    pub fn fallback() -> Self {
        Self {
            decision: Decision {
                grade: Some("Junior".to_string()),
                hiring_recommendation: Some("no_hire".to_string()),
                recommendation_reason: Some(
                    "Report generation failed. Manual review required.".to_string(),
                ),
                confidence_score: Some(0.0),
                extra: Record::new(),
            },
            skills_matrix: SkillsMatrix::zeroed(),
            knowledge_gaps: Vec::new(),
            roadmap: Roadmap::default(),
            summary: "An error occurred while generating the report. Please check the logs."
                .to_string(),
            extra: Record::new(),
        }
    }

    pub fn is_fallback(&self) -> bool {
        *self == Self::fallback()
    }

    pub fn grade(&self) -> &str {
        self.decision.grade.as_deref().unwrap_or("N/A")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(v: Value) -> Record {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn test_missing_sections_default_to_empty() {
        let report = FinalReport::from_record(&record(json!({"summary": "ok"})));
        let value = serde_json::to_value(&report).unwrap();

        for key in ["decision", "skills_matrix", "knowledge_gaps", "roadmap"] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
        assert_eq!(value["decision"], json!({}));
        assert_eq!(value["knowledge_gaps"], json!([]));
    }

    #[test]
    fn test_lenient_sections() {
        let report = FinalReport::from_record(&record(json!({
            "decision": {"grade": "Middle", "confidence_score": "85", "notes": "x"},
            "skills_matrix": "not an object",
            "knowledge_gaps": ["asyncio", {"gap": "GIL", "educational_content": "read docs"}, 3],
            "roadmap": {"immediate": ["practice"]},
        })));

        assert_eq!(report.grade(), "Middle");
        assert_eq!(report.decision.confidence_score, Some(85.0));
        assert_eq!(report.decision.extra["notes"], "x");
        assert_eq!(report.skills_matrix, SkillsMatrix::default());
        assert_eq!(report.knowledge_gaps.len(), 2);
        assert_eq!(report.knowledge_gaps[1].educational_content, "read docs");
        assert_eq!(report.roadmap.immediate, vec!["practice"]);
    }

    #[test]
    fn test_fallback_report() {
        let report = FinalReport::fallback();
        assert!(report.is_fallback());
        assert_eq!(report.grade(), "Junior");
        assert_eq!(
            report.decision.hiring_recommendation.as_deref(),
            Some("no_hire")
        );
        assert_eq!(report.decision.confidence_score, Some(0.0));
        assert!(report.skills_matrix.confirmed_skills.is_empty());

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["roadmap"]["short_term"], json!([]));
    }
}
