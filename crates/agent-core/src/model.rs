use serde::{Deserialize, Serialize};
use tabpilot_core_types::OutputFormat;

use crate::errors::AgentError;

/// Plan handed over by the planning collaborator.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlanRequest {
    /// One-line statement of the user's original request. Only used to
    /// derive a discovery search query.
    #[serde(default)]
    pub intent: String,
    #[serde(default)]
    pub output_format: OutputFormat,
    /// Ordered free-text step descriptions.
    pub steps: Vec<String>,
}

impl PlanRequest {
    pub fn new(intent: impl Into<String>, output_format: OutputFormat) -> Self {
        Self {
            intent: intent.into(),
            output_format,
            steps: Vec::new(),
        }
    }

    pub fn with_steps<I, S>(mut self, steps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.steps.extend(steps.into_iter().map(Into::into));
        self
    }

    /// Decode a plan document. JSON is valid YAML, so one parser covers both.
    pub fn from_document(raw: &str) -> Result<Self, AgentError> {
        let request: PlanRequest = serde_yaml::from_str(raw)?;
        if request.steps.iter().all(|step| step.trim().is_empty()) && request.intent.trim().is_empty()
        {
            return Err(AgentError::invalid_request("plan has no steps and no intent"));
        }
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_yaml_and_json_documents() {
        let yaml = "intent: find laptops\noutput_format: csv\nsteps:\n  - Search for laptops\n";
        let from_yaml = PlanRequest::from_document(yaml).unwrap();
        assert_eq!(from_yaml.output_format, OutputFormat::Csv);
        assert_eq!(from_yaml.steps, vec!["Search for laptops".to_string()]);

        let json = r#"{"intent":"find laptops","output_format":"csv","steps":["Search for laptops"]}"#;
        assert_eq!(PlanRequest::from_document(json).unwrap(), from_yaml);
    }

    #[test]
    fn output_format_defaults_to_text() {
        let request = PlanRequest::from_document("steps: [\"Extract results\"]").unwrap();
        assert_eq!(request.output_format, OutputFormat::Text);
    }

    #[test]
    fn rejects_documents_without_content() {
        assert!(matches!(
            PlanRequest::from_document("steps: []"),
            Err(AgentError::InvalidRequest(_))
        ));
    }
}
