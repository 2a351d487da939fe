use rand::Rng;
use serde::{Deserialize, Serialize};

pub const RULE_PRIORITY_MIN: u32 = 10;
pub const RULE_PRIORITY_MAX: u32 = 500;

/// The slice of a remote listener rule that matters for idempotency: the
/// first action's forward target and the first condition's path values.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExistingRule {
    pub target_group_arn: Option<String>,
    pub path_patterns: Vec<String>,
}

/// True when some rule already forwards to `target_group_arn` with exactly
/// the desired path list. Comparison is order-sensitive.
pub fn rule_already_routes(
    rules: &[ExistingRule],
    target_group_arn: &str,
    rule_paths: &[String],
) -> bool {
    rules.iter().any(|rule| {
        rule.target_group_arn.as_deref() == Some(target_group_arn)
            && rule.path_patterns == rule_paths
    })
}

/// Uniform draw over the allowed rule-priority range. The draw is not
/// checked against priorities already taken on the listener.
pub fn pick_rule_priority<R: Rng + ?Sized>(rng: &mut R) -> u32 {
    rng.gen_range(RULE_PRIORITY_MIN..=RULE_PRIORITY_MAX)
}

/// Statement id for the invoke-permission grant issued alongside a rule.
/// Distinct priorities across runs yield distinct grants.
pub fn permission_statement_id(priority: u32) -> String {
    priority.to_string()
}
