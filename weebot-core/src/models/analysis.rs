use serde::{Deserialize, Deserializer, Serialize};

/// Accept any JSON number, round it and clamp into 0-100.
fn percent<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let v = f64::deserialize(deserializer)?;
    if !v.is_finite() {
        return Err(serde::de::Error::custom("percentage must be finite"));
    }
    Ok(v.round().clamp(0.0, 100.0) as u8)
}

/// Per-answer evaluation from `analyze-response`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseAnalysis {
    #[serde(deserialize_with = "percent")]
    pub score: u8,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub feedback: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunicationMetrics {
    #[serde(deserialize_with = "percent")]
    pub communication_skills: u8,
    #[serde(deserialize_with = "percent")]
    pub vocabulary: u8,
    #[serde(deserialize_with = "percent")]
    pub confidence: u8,
    #[serde(deserialize_with = "percent")]
    pub body_language: u8,
    #[serde(deserialize_with = "percent")]
    pub clarity: u8,
}

impl CommunicationMetrics {
    /// Canned metrics served when analysis fails.
    pub fn fallback() -> Self {
        Self {
            communication_skills: 70,
            vocabulary: 65,
            confidence: 75,
            body_language: 70,
            clarity: 72,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeAnalysis {
    #[serde(deserialize_with = "percent")]
    pub code_quality: u8,
    #[serde(deserialize_with = "percent")]
    pub efficiency: u8,
    #[serde(deserialize_with = "percent")]
    pub readability: u8,
    pub suggestions: Vec<String>,
    pub optimizations: Vec<String>,
}

impl CodeAnalysis {
    /// Canned analysis served when analysis fails.
    pub fn fallback() -> Self {
        Self {
            code_quality: 70,
            efficiency: 65,
            readability: 75,
            suggestions: vec![
                "Add comments".to_string(),
                "Improve variable names".to_string(),
                "Handle edge cases".to_string(),
            ],
            optimizations: vec![
                "Use more efficient algorithm".to_string(),
                "Reduce time complexity".to_string(),
                "Optimize memory usage".to_string(),
            ],
        }
    }
}

/// Canned tips served when tip generation fails, regardless of category.
pub fn fallback_tips() -> Vec<String> {
    [
        "Practice active listening and engage with the interviewer",
        "Use the STAR method for behavioral questions",
        "Maintain eye contact and confident posture",
        "Ask clarifying questions when needed",
        "Provide specific examples from your experience",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Interpret model output as a tip list: a JSON array, or an object whose
/// values are taken in key order. Non-string entries are stringified.
pub fn tips_from_value(value: serde_json::Value) -> Option<Vec<String>> {
    let items: Vec<serde_json::Value> = match value {
        serde_json::Value::Array(items) => items,
        serde_json::Value::Object(map) => map.into_iter().map(|(_, v)| v).collect(),
        _ => return None,
    };

    Some(
        items
            .into_iter()
            .map(|v| match v {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_metrics_round_and_clamp() {
        let m: CommunicationMetrics = serde_json::from_value(json!({
            "communicationSkills": 82.6,
            "vocabulary": 140,
            "confidence": -5,
            "bodyLanguage": 70,
            "clarity": 71.4
        }))
        .unwrap();
        assert_eq!(m.communication_skills, 83);
        assert_eq!(m.vocabulary, 100);
        assert_eq!(m.confidence, 0);
        assert_eq!(m.clarity, 71);
    }

    #[test]
    fn test_metrics_reject_non_numeric() {
        let r = serde_json::from_value::<CommunicationMetrics>(json!({
            "communicationSkills": "high",
            "vocabulary": 1,
            "confidence": 1,
            "bodyLanguage": 1,
            "clarity": 1
        }));
        assert!(r.is_err());
    }

    #[test]
    fn test_code_analysis_fallback_shape() {
        let v = serde_json::to_value(CodeAnalysis::fallback()).unwrap();
        assert_eq!(v["codeQuality"], 70);
        assert_eq!(v["efficiency"], 65);
        assert_eq!(v["readability"], 75);
        assert_eq!(v["suggestions"].as_array().unwrap().len(), 3);
        assert_eq!(v["optimizations"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_communication_fallback_values() {
        let v = serde_json::to_value(CommunicationMetrics::fallback()).unwrap();
        assert_eq!(
            v,
            json!({
                "communicationSkills": 70,
                "vocabulary": 65,
                "confidence": 75,
                "bodyLanguage": 70,
                "clarity": 72
            })
        );
    }

    #[test]
    fn test_tips_from_array_and_object() {
        assert_eq!(
            tips_from_value(json!(["a", "b"])),
            Some(vec!["a".to_string(), "b".to_string()])
        );
        let from_obj = tips_from_value(json!({"tip1": "x", "tip2": 3})).unwrap();
        assert_eq!(from_obj.len(), 2);
        assert!(from_obj.contains(&"x".to_string()));
        assert!(from_obj.contains(&"3".to_string()));
        assert_eq!(tips_from_value(json!("just text")), None);
    }

    #[test]
    fn test_fallback_tips_has_five() {
        assert_eq!(fallback_tips().len(), 5);
    }
}
