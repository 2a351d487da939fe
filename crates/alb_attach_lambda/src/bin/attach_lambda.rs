use std::future::Future;

use alb_attach_lambda::adapters::error::{RemoteError, RemoteErrorKind};
use alb_attach_lambda::adapters::functions::{
    FunctionApi, INVOKE_FUNCTION_ACTION, LOAD_BALANCER_PRINCIPAL,
};
use alb_attach_lambda::adapters::load_balancing::LoadBalancingApi;
use alb_attach_lambda::handlers::provision::{handle_provision_event, ProvisionReport};
use alb_attach_lambda::runtime::contract::{ResourceTag, Scheme, TargetType};
use alb_attach_lambda::runtime::routing::ExistingRule;
use aws_sdk_elasticloadbalancingv2::types::{
    Action, ActionTypeEnum, Certificate, LoadBalancerSchemeEnum, ProtocolEnum, RuleCondition, Tag,
    TargetDescription, TargetTypeEnum,
};
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;

const HTTPS_LISTENER_PORT: i32 = 443;

struct AwsLoadBalancing {
    client: aws_sdk_elasticloadbalancingv2::Client,
}

struct AwsFunctions {
    client: aws_sdk_lambda::Client,
}

fn block_on<T>(future: impl Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}

fn scheme_enum(scheme: Scheme) -> LoadBalancerSchemeEnum {
    match scheme {
        Scheme::Internal => LoadBalancerSchemeEnum::Internal,
        Scheme::InternetFacing => LoadBalancerSchemeEnum::InternetFacing,
    }
}

fn target_type_enum(target_type: TargetType) -> TargetTypeEnum {
    match target_type {
        TargetType::Ip => TargetTypeEnum::Ip,
        TargetType::Lambda => TargetTypeEnum::Lambda,
        TargetType::Instance => TargetTypeEnum::Instance,
    }
}

fn forward_action(target_group_arn: &str) -> Result<Action, RemoteError> {
    Ok(Action::builder()
        .r#type(ActionTypeEnum::Forward)
        .target_group_arn(target_group_arn)
        .build())
}

impl LoadBalancingApi for AwsLoadBalancing {
    fn create_target_group(
        &self,
        name: &str,
        target_type: TargetType,
        health_check_enabled: bool,
        health_check_path: &str,
    ) -> Result<String, RemoteError> {
        let client = self.client.clone();
        let name = name.to_string();
        let health_check_path = health_check_path.to_string();

        block_on(async move {
            let output = client
                .create_target_group()
                .name(name)
                .target_type(target_type_enum(target_type))
                .health_check_enabled(health_check_enabled)
                .health_check_path(health_check_path)
                .send()
                .await
                .map_err(|error| {
                    let service_error = error.into_service_error();
                    if service_error.is_duplicate_target_group_name_exception() {
                        RemoteError::new(
                            RemoteErrorKind::DuplicateTargetGroup,
                            format!("target group already exists: {service_error}"),
                        )
                    } else {
                        RemoteError::other(format!(
                            "failed to create target group: {service_error}"
                        ))
                    }
                })?;

            output
                .target_groups()
                .first()
                .and_then(|group| group.target_group_arn())
                .map(str::to_string)
                .ok_or_else(|| {
                    RemoteError::other("create_target_group returned no target group arn")
                })
        })
    }

    fn describe_target_group(&self, name: &str) -> Result<String, RemoteError> {
        let client = self.client.clone();
        let name = name.to_string();

        block_on(async move {
            let output = client
                .describe_target_groups()
                .names(name)
                .send()
                .await
                .map_err(|error| {
                    RemoteError::other(format!(
                        "failed to describe target group: {}",
                        error.into_service_error()
                    ))
                })?;

            output
                .target_groups()
                .first()
                .and_then(|group| group.target_group_arn())
                .map(str::to_string)
                .ok_or_else(|| {
                    RemoteError::other("describe_target_groups returned no target group arn")
                })
        })
    }

    fn modify_target_group(
        &self,
        target_group_arn: &str,
        health_check_enabled: bool,
        health_check_path: &str,
    ) -> Result<String, RemoteError> {
        let client = self.client.clone();
        let target_group_arn = target_group_arn.to_string();
        let health_check_path = health_check_path.to_string();

        block_on(async move {
            let output = client
                .modify_target_group()
                .target_group_arn(target_group_arn)
                .health_check_enabled(health_check_enabled)
                .health_check_path(health_check_path)
                .send()
                .await
                .map_err(|error| {
                    RemoteError::other(format!(
                        "failed to modify target group: {}",
                        error.into_service_error()
                    ))
                })?;

            output
                .target_groups()
                .first()
                .and_then(|group| group.target_group_arn())
                .map(str::to_string)
                .ok_or_else(|| {
                    RemoteError::other("modify_target_group returned no target group arn")
                })
        })
    }

    fn create_load_balancer(
        &self,
        name: &str,
        subnet_ids: &[String],
        security_groups: &[String],
        scheme: Scheme,
        tags: &[ResourceTag],
    ) -> Result<String, RemoteError> {
        let client = self.client.clone();
        let name = name.to_string();
        let subnet_ids = subnet_ids.to_vec();
        let security_groups = security_groups.to_vec();
        let tags = tags.to_vec();

        block_on(async move {
            let mut request_tags = Vec::with_capacity(tags.len());
            for tag in &tags {
                let built = Tag::builder()
                    .key(&tag.key)
                    .value(&tag.value)
                    .build();
                request_tags.push(built);
            }

            let output = client
                .create_load_balancer()
                .name(name)
                .set_subnets(Some(subnet_ids))
                .set_security_groups(Some(security_groups))
                .scheme(scheme_enum(scheme))
                .set_tags(Some(request_tags))
                .send()
                .await
                .map_err(|error| {
                    RemoteError::other(format!(
                        "failed to create load balancer: {}",
                        error.into_service_error()
                    ))
                })?;

            output
                .load_balancers()
                .first()
                .and_then(|balancer| balancer.load_balancer_arn())
                .map(str::to_string)
                .ok_or_else(|| {
                    RemoteError::other("create_load_balancer returned no load balancer arn")
                })
        })
    }

    fn create_listener(
        &self,
        load_balancer_arn: &str,
        target_group_arn: &str,
        certificate_arn: &str,
        ssl_policy: &str,
    ) -> Result<String, RemoteError> {
        let client = self.client.clone();
        let load_balancer_arn = load_balancer_arn.to_string();
        let target_group_arn = target_group_arn.to_string();
        let certificate_arn = certificate_arn.to_string();
        let ssl_policy = ssl_policy.to_string();

        block_on(async move {
            let output = client
                .create_listener()
                .load_balancer_arn(load_balancer_arn)
                .protocol(ProtocolEnum::Https)
                .port(HTTPS_LISTENER_PORT)
                .ssl_policy(ssl_policy)
                .certificates(
                    Certificate::builder()
                        .certificate_arn(certificate_arn)
                        .build(),
                )
                .default_actions(forward_action(&target_group_arn)?)
                .send()
                .await
                .map_err(|error| {
                    let service_error = error.into_service_error();
                    if service_error.is_duplicate_listener_exception() {
                        RemoteError::new(
                            RemoteErrorKind::DuplicateListener,
                            format!("listener already exists: {service_error}"),
                        )
                    } else {
                        RemoteError::other(format!("failed to create listener: {service_error}"))
                    }
                })?;

            output
                .listeners()
                .first()
                .and_then(|listener| listener.listener_arn())
                .map(str::to_string)
                .ok_or_else(|| RemoteError::other("create_listener returned no listener arn"))
        })
    }

    fn describe_listeners(&self, load_balancer_arn: &str) -> Result<Vec<String>, RemoteError> {
        let client = self.client.clone();
        let load_balancer_arn = load_balancer_arn.to_string();

        block_on(async move {
            let output = client
                .describe_listeners()
                .load_balancer_arn(load_balancer_arn)
                .send()
                .await
                .map_err(|error| {
                    RemoteError::other(format!(
                        "failed to describe listeners: {}",
                        error.into_service_error()
                    ))
                })?;

            Ok(output
                .listeners()
                .iter()
                .filter_map(|listener| listener.listener_arn())
                .map(str::to_string)
                .collect())
        })
    }

    fn describe_rules(&self, listener_arn: &str) -> Result<Vec<ExistingRule>, RemoteError> {
        let client = self.client.clone();
        let listener_arn = listener_arn.to_string();

        block_on(async move {
            let output = client
                .describe_rules()
                .listener_arn(listener_arn)
                .send()
                .await
                .map_err(|error| {
                    RemoteError::other(format!(
                        "failed to describe rules: {}",
                        error.into_service_error()
                    ))
                })?;

            Ok(output
                .rules()
                .iter()
                .map(|rule| ExistingRule {
                    target_group_arn: rule
                        .actions()
                        .first()
                        .and_then(|action| action.target_group_arn())
                        .map(str::to_string),
                    path_patterns: rule
                        .conditions()
                        .first()
                        .map(|condition| condition.values().to_vec())
                        .unwrap_or_default(),
                })
                .collect())
        })
    }

    fn create_rule(
        &self,
        listener_arn: &str,
        target_group_arn: &str,
        path_patterns: &[String],
        priority: u32,
    ) -> Result<(), RemoteError> {
        let client = self.client.clone();
        let listener_arn = listener_arn.to_string();
        let target_group_arn = target_group_arn.to_string();
        let path_patterns = path_patterns.to_vec();

        block_on(async move {
            client
                .create_rule()
                .listener_arn(listener_arn)
                .priority(priority as i32)
                .conditions(
                    RuleCondition::builder()
                        .field("path-pattern")
                        .set_values(Some(path_patterns))
                        .build(),
                )
                .actions(forward_action(&target_group_arn)?)
                .send()
                .await
                .map(|_| ())
                .map_err(|error| {
                    RemoteError::other(format!(
                        "failed to create rule: {}",
                        error.into_service_error()
                    ))
                })
        })
    }

    fn register_target(
        &self,
        target_group_arn: &str,
        target_id: &str,
    ) -> Result<(), RemoteError> {
        let client = self.client.clone();
        let target_group_arn = target_group_arn.to_string();
        let target_id = target_id.to_string();

        block_on(async move {
            let target = TargetDescription::builder()
                .id(target_id)
                .build();

            client
                .register_targets()
                .target_group_arn(target_group_arn)
                .targets(target)
                .send()
                .await
                .map(|_| ())
                .map_err(|error| {
                    RemoteError::other(format!(
                        "failed to register target: {}",
                        error.into_service_error()
                    ))
                })
        })
    }
}

impl FunctionApi for AwsFunctions {
    fn add_invoke_permission(
        &self,
        function_name: &str,
        source_arn: &str,
        statement_id: &str,
    ) -> Result<(), RemoteError> {
        let client = self.client.clone();
        let function_name = function_name.to_string();
        let source_arn = source_arn.to_string();
        let statement_id = statement_id.to_string();

        block_on(async move {
            client
                .add_permission()
                .function_name(function_name)
                .action(INVOKE_FUNCTION_ACTION)
                .principal(LOAD_BALANCER_PRINCIPAL)
                .source_arn(source_arn)
                .statement_id(statement_id)
                .send()
                .await
                .map(|_| ())
                .map_err(|error| {
                    RemoteError::other(format!(
                        "failed to add invoke permission: {}",
                        error.into_service_error()
                    ))
                })
        })
    }

    fn function_arn(&self, function_name: &str) -> Result<String, RemoteError> {
        let client = self.client.clone();
        let function_name = function_name.to_string();

        block_on(async move {
            let output = client
                .get_function()
                .function_name(&function_name)
                .send()
                .await
                .map_err(|error| {
                    RemoteError::other(format!(
                        "failed to look up function {function_name}: {}",
                        error.into_service_error()
                    ))
                })?;

            output
                .configuration()
                .and_then(|configuration| configuration.function_arn())
                .map(str::to_string)
                .ok_or_else(|| RemoteError::other("get_function returned no function arn"))
        })
    }
}

async fn handle_request(event: LambdaEvent<Value>) -> Result<ProvisionReport, Error> {
    let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let load_balancing = AwsLoadBalancing {
        client: aws_sdk_elasticloadbalancingv2::Client::new(&config),
    };
    let functions = AwsFunctions {
        client: aws_sdk_lambda::Client::new(&config),
    };

    handle_provision_event(
        event.payload,
        &load_balancing,
        &functions,
        &mut rand::thread_rng(),
    )
    .map_err(|error| Error::from(error.message))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    lambda_runtime::run(service_fn(handle_request)).await
}
