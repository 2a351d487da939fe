use crate::adapters::error::RemoteError;
use crate::runtime::contract::{ResourceTag, Scheme, TargetType};
use crate::runtime::routing::ExistingRule;

/// Blocking facade over the load-balancing control plane. Every method is
/// one remote call; implementations classify duplicate-resource rejections
/// via `RemoteErrorKind`.
pub trait LoadBalancingApi {
    fn create_target_group(
        &self,
        name: &str,
        target_type: TargetType,
        health_check_enabled: bool,
        health_check_path: &str,
    ) -> Result<String, RemoteError>;

    fn describe_target_group(&self, name: &str) -> Result<String, RemoteError>;

    fn modify_target_group(
        &self,
        target_group_arn: &str,
        health_check_enabled: bool,
        health_check_path: &str,
    ) -> Result<String, RemoteError>;

    fn create_load_balancer(
        &self,
        name: &str,
        subnet_ids: &[String],
        security_groups: &[String],
        scheme: Scheme,
        tags: &[ResourceTag],
    ) -> Result<String, RemoteError>;

    fn create_listener(
        &self,
        load_balancer_arn: &str,
        target_group_arn: &str,
        certificate_arn: &str,
        ssl_policy: &str,
    ) -> Result<String, RemoteError>;

    fn describe_listeners(&self, load_balancer_arn: &str) -> Result<Vec<String>, RemoteError>;

    fn describe_rules(&self, listener_arn: &str) -> Result<Vec<ExistingRule>, RemoteError>;

    fn create_rule(
        &self,
        listener_arn: &str,
        target_group_arn: &str,
        path_patterns: &[String],
        priority: u32,
    ) -> Result<(), RemoteError>;

    fn register_target(
        &self,
        target_group_arn: &str,
        target_id: &str,
    ) -> Result<(), RemoteError>;
}
