use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpecificationId(pub i64);

impl fmt::Display for SpecificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A persisted agent specification as the rest of the application sees it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSpecification {
    pub id: SpecificationId,
    pub name: String,
    pub description: String,
    pub goal: String,
    pub instructions: String,
    pub tools: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AgentSpecification {
    /// Applies the present fields of `patch` in place. `updated_at` is left to the caller.
    pub fn apply(&mut self, patch: AgentSpecificationPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(goal) = patch.goal {
            self.goal = goal;
        }
        if let Some(instructions) = patch.instructions {
            self.instructions = instructions;
        }
        if let Some(tools) = patch.tools {
            self.tools = tools;
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAgentSpecification {
    pub name: String,
    pub description: String,
    pub goal: String,
    pub instructions: String,
    #[serde(default)]
    pub tools: Vec<String>,
}

impl NewAgentSpecification {
    pub fn validate(&self) -> Result<(), DomainError> {
        require_text("name", &self.name)?;
        require_text("description", &self.description)?;
        require_text("goal", &self.goal)?;
        require_text("instructions", &self.instructions)?;
        Ok(())
    }
}

/// Partial update. Absent fields are left untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSpecificationPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<String>>,
}

impl AgentSpecificationPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.goal.is_none()
            && self.instructions.is_none()
            && self.tools.is_none()
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        let text_fields = [
            ("name", &self.name),
            ("description", &self.description),
            ("goal", &self.goal),
            ("instructions", &self.instructions),
        ];
        for (field, value) in text_fields {
            if let Some(value) = value {
                require_text(field, value)?;
            }
        }
        Ok(())
    }
}

fn require_text(field: &'static str, value: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::required(field));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::{AgentSpecification, AgentSpecificationPatch, NewAgentSpecification, SpecificationId};
    use crate::errors::DomainError;

    fn new_spec() -> NewAgentSpecification {
        NewAgentSpecification {
            name: "Test Agent".to_string(),
            description: "A test agent specification".to_string(),
            goal: "Test goal".to_string(),
            instructions: "Test instructions".to_string(),
            tools: vec!["tool1".to_string(), "tool2".to_string()],
        }
    }

    #[test]
    fn complete_new_specification_validates() {
        assert_eq!(new_spec().validate(), Ok(()));
    }

    #[test]
    fn blank_required_field_is_rejected_with_field_name() {
        let spec = NewAgentSpecification { goal: "   ".to_string(), ..new_spec() };

        let error = spec.validate().expect_err("blank goal should fail");
        assert!(matches!(error, DomainError::InvalidInput { field: "goal", .. }));
    }

    #[test]
    fn tools_default_to_empty_when_omitted() {
        let spec: NewAgentSpecification = serde_json::from_str(
            r#"{"name":"n","description":"d","goal":"g","instructions":"i"}"#,
        )
        .expect("deserialize");

        assert!(spec.tools.is_empty());
    }

    #[test]
    fn patch_reports_empty_and_rejects_blank_present_fields() {
        assert!(AgentSpecificationPatch::default().is_empty());

        let patch = AgentSpecificationPatch { name: Some(String::new()), ..Default::default() };
        assert!(!patch.is_empty());
        assert!(matches!(patch.validate(), Err(DomainError::InvalidInput { field: "name", .. })));

        let tools_only = AgentSpecificationPatch { tools: Some(Vec::new()), ..Default::default() };
        assert_eq!(tools_only.validate(), Ok(()));
    }

    #[test]
    fn apply_touches_only_present_fields() {
        let now = Utc::now();
        let mut spec = AgentSpecification {
            id: SpecificationId(1),
            name: "Test Agent".to_string(),
            description: "A test agent specification".to_string(),
            goal: "Test goal".to_string(),
            instructions: "Test instructions".to_string(),
            tools: vec!["tool1".to_string()],
            created_at: now,
            updated_at: now,
        };

        spec.apply(AgentSpecificationPatch {
            name: Some("Only Name Updated".to_string()),
            tools: Some(vec!["new-tool".to_string()]),
            ..Default::default()
        });

        assert_eq!(spec.name, "Only Name Updated");
        assert_eq!(spec.tools, vec!["new-tool".to_string()]);
        assert_eq!(spec.goal, "Test goal");
        assert_eq!(spec.description, "A test agent specification");
    }
}
