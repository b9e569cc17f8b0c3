use serde::{Deserialize, Serialize};

use crate::shared::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleAction {
    Proxy,
    Direct,
    Reject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleType {
    DomainSuffix,
    // Spelling is part of the backend contract
    #[serde(rename = "domain_preffix")]
    DomainPrefix,
    FullDomain,
    Cidr,
}

/// Traffic routing rule in UI shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,
    pub action: RuleAction,
    pub rule_type: RuleType,
    pub pattern: String,
}

impl ProxyRule {
    pub fn new(action: RuleAction, rule_type: RuleType, pattern: impl Into<String>) -> Self {
        Self {
            id: None,
            action,
            rule_type,
            pattern: pattern.into(),
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.pattern.trim().is_empty() {
            return Err(DomainError::Validation(
                "Rule pattern cannot be empty".to_string(),
            ));
        }
        if self.rule_type == RuleType::Cidr && !self.pattern.contains('/') {
            return Err(DomainError::Validation(format!(
                "Invalid CIDR pattern: {}",
                self.pattern
            )));
        }
        Ok(())
    }
}
