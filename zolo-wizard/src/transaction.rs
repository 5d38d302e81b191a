//! Transaction scoping for `_transaction: true` workflows: find the first
//! `zData` step whose `model` begins with `$`, begin a transaction on that
//! alias's Schema Cache handle, commit on success, roll back on failure.

use indexmap::IndexMap;
use zolo_cache::SchemaTier;
use zolo_core::block::StepValue;

use crate::error::EngineError;

/// The alias a workflow's transaction is scoped to, found by scanning for
/// the first `zData` step whose `model` starts with `$`.
pub fn find_transaction_alias(steps: &IndexMap<String, StepValue>) -> Option<String> {
    steps.values().find_map(|step| {
        let StepValue::Data(value) = step else { return None };
        let model = value.as_mapping()?.get(serde_yaml::Value::String("model".to_string()))?.as_str()?;
        model.strip_prefix('$').map(|alias| alias.to_string())
    })
}

/// Run `body`, beginning a transaction on `alias` first and committing or
/// rolling back based on the result. The Schema Cache entry for `alias` is
/// always disconnected afterward, regardless of outcome.
pub async fn run_transactional<F, Fut, T>(
    schema: &SchemaTier,
    alias: &str,
    body: F,
) -> Result<T, EngineError>
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = Result<T, EngineError>>,
{
    schema.begin(alias).map_err(|e| EngineError::Dispatch { key: alias.to_string(), message: e.to_string() })?;

    let result = body().await;

    let outcome = match &result {
        Ok(_) => schema.commit(alias),
        Err(_) => schema.rollback(alias),
    };
    if let Err(e) = outcome {
        tracing::warn!(alias, error = %e, "failed to finalise transaction");
    }

    schema.disconnect(alias);

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_yaml::Value as YamlValue;

    #[test]
    fn finds_first_dollar_prefixed_model() {
        let mut steps = IndexMap::new();
        steps.insert("A".to_string(), StepValue::Display(YamlValue::Null));
        let data: YamlValue = serde_yaml::from_str("model: $users").unwrap();
        steps.insert("B".to_string(), StepValue::Data(data));
        assert_eq!(find_transaction_alias(&steps), Some("users".to_string()));
    }

    #[test]
    fn no_dollar_prefixed_model_returns_none() {
        let mut steps = IndexMap::new();
        let data: YamlValue = serde_yaml::from_str("model: users").unwrap();
        steps.insert("A".to_string(), StepValue::Data(data));
        assert_eq!(find_transaction_alias(&steps), None);
    }
}
