use kitty_domain::backend::args;
use kitty_domain::mapping::schemas;
use kitty_domain::rule::ProxyRule;
use kitty_domain::{BackendCaller, CallArgs, DomainError};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::instrument;

use super::{from_backend, to_backend};

/// Routing rule commands. Writes always travel as single-element batches.
pub struct RuleApi {
    backend: Arc<dyn BackendCaller>,
}

impl RuleApi {
    pub fn new(backend: Arc<dyn BackendCaller>) -> Self {
        Self { backend }
    }

    #[instrument(skip(self))]
    pub async fn get_all_rules(&self) -> Result<Vec<ProxyRule>, DomainError> {
        let reply = self.backend.call("query_rules", CallArgs::new()).await?;
        from_backend(schemas::rule(), reply)
    }

    #[instrument(skip(self, rule), fields(pattern = %rule.pattern))]
    pub async fn create_rule(&self, rule: &ProxyRule) -> Result<(), DomainError> {
        rule.validate()?;
        self.backend
            .call("add_rules", self.records(rule)?)
            .await?;
        Ok(())
    }

    #[instrument(skip(self, rule), fields(id = ?rule.id))]
    pub async fn update_rule(&self, rule: &ProxyRule) -> Result<(), DomainError> {
        rule.validate()?;
        self.backend
            .call("update_rules_item", self.records(rule)?)
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn delete_rule(&self, id: i32) -> Result<(), DomainError> {
        self.backend
            .call("delete_rules", args([("ids", json!([id]))]))
            .await?;
        Ok(())
    }

    fn records(&self, rule: &ProxyRule) -> Result<CallArgs, DomainError> {
        let record = to_backend(schemas::rule(), rule)?;
        Ok(args([("records", Value::Array(vec![record]))]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::{expect_once, no_args, MockBackend};
    use kitty_domain::rule::{RuleAction, RuleType};

    #[tokio::test]
    async fn test_get_all_rules_renames_fields() {
        let backend = expect_once(
            "query_rules",
            no_args,
            Ok(json!([
                {"id": 1, "rule_action": "proxy", "rule_type": "domain_suffix", "rule": "google.com"},
                {"id": 2, "rule_action": "direct", "rule_type": "domain_preffix", "rule": "cn."}
            ])),
        );
        let rules = RuleApi::new(backend).get_all_rules().await.unwrap();

        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].pattern, "google.com");
        assert_eq!(rules[0].action, RuleAction::Proxy);
        assert_eq!(rules[1].rule_type, RuleType::DomainPrefix);
        assert_eq!(rules[1].id, Some(2));
    }

    #[tokio::test]
    async fn test_create_rule_sends_single_record_batch() {
        let backend = expect_once(
            "add_rules",
            |args| {
                assert_eq!(
                    args["records"],
                    json!([{"rule_action": "reject", "rule_type": "full_domain", "rule": "ads.example.com"}])
                )
            },
            Ok(Value::Null),
        );
        RuleApi::new(backend)
            .create_rule(&ProxyRule::new(
                RuleAction::Reject,
                RuleType::FullDomain,
                "ads.example.com",
            ))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_update_rule_keeps_id() {
        let backend = expect_once(
            "update_rules_item",
            |args| assert_eq!(args["records"][0]["id"], json!(8)),
            Ok(Value::Null),
        );
        let mut rule = ProxyRule::new(RuleAction::Direct, RuleType::Cidr, "10.0.0.0/8");
        rule.id = Some(8);
        RuleApi::new(backend).update_rule(&rule).await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_rule_wraps_id() {
        let backend = expect_once(
            "delete_rules",
            |args| assert_eq!(args["ids"], json!([4])),
            Ok(Value::Null),
        );
        RuleApi::new(backend).delete_rule(4).await.unwrap();
    }

    #[tokio::test]
    async fn test_invalid_rule_never_reaches_backend() {
        let backend = Arc::new(MockBackend::new());
        let err = RuleApi::new(backend)
            .create_rule(&ProxyRule::new(RuleAction::Direct, RuleType::Cidr, "10.0.0.0"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }
}
