use rand::RngCore;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::adapters::error::{RemoteError, RemoteErrorKind};
use crate::adapters::functions::FunctionApi;
use crate::adapters::load_balancing::LoadBalancingApi;
use crate::runtime::contract::{
    normalize_request, request_fingerprint, DesiredState, ProvisionRequest,
};
use crate::runtime::routing::{permission_statement_id, pick_rule_priority, rule_already_routes};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProvisionReport {
    pub status: String,
    pub target_group_arn: String,
    pub load_balancer_arn: String,
    pub listener_arn: String,
    pub rule_priority: u32,
    pub rule_created: bool,
    pub statement_id: String,
    pub function_arn: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionError {
    pub message: String,
}

impl ProvisionError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<RemoteError> for ProvisionError {
    fn from(error: RemoteError) -> Self {
        Self {
            message: error.message,
        }
    }
}

pub fn handle_provision_event(
    event: Value,
    load_balancing: &dyn LoadBalancingApi,
    functions: &dyn FunctionApi,
    rng: &mut dyn RngCore,
) -> Result<ProvisionReport, ProvisionError> {
    let request = serde_json::from_value::<ProvisionRequest>(event)
        .map_err(|error| ProvisionError::new(format!("Malformed request: {error}")))?;
    let desired =
        normalize_request(request).map_err(|error| ProvisionError::new(error.message()))?;
    let priority = pick_rule_priority(rng);

    match reconcile(&desired, priority, load_balancing, functions) {
        Ok(report) => Ok(report),
        Err(error) => {
            log_provision_error(
                "provision_failed",
                json!({
                    "app_name": desired.app_name.clone(),
                    "error": error.message.clone(),
                }),
            );
            Err(error)
        }
    }
}

/// Drives the control plane toward `desired`: target group (create or
/// converge), load balancer, listener (create or reuse), routing rule
/// (create unless one already routes), invoke-permission grant, and target
/// registration.
pub fn reconcile(
    desired: &DesiredState,
    priority: u32,
    load_balancing: &dyn LoadBalancingApi,
    functions: &dyn FunctionApi,
) -> Result<ProvisionReport, ProvisionError> {
    let target_group_name = desired.target_group_name();
    let load_balancer_name = desired.load_balancer_name();
    log_provision_info(
        "provision_started",
        json!({
            "app_name": desired.app_name.clone(),
            "target_group_name": target_group_name.clone(),
            "load_balancer_name": load_balancer_name.clone(),
            "request_fingerprint": request_fingerprint(desired),
        }),
    );

    let target_group_arn = match load_balancing.create_target_group(
        &target_group_name,
        desired.target_type,
        desired.health_check_enabled,
        &desired.health_check_path,
    ) {
        Ok(arn) => arn,
        Err(error) if error.kind == RemoteErrorKind::DuplicateTargetGroup => {
            let existing_arn = load_balancing.describe_target_group(&target_group_name)?;
            log_provision_info(
                "target_group_exists",
                json!({
                    "target_group_name": target_group_name.clone(),
                    "target_group_arn": existing_arn.clone(),
                }),
            );
            load_balancing.modify_target_group(
                &existing_arn,
                desired.health_check_enabled,
                &desired.health_check_path,
            )?
        }
        Err(error) => return Err(error.into()),
    };

    // The load balancer is created on every run; a name collision is
    // surfaced by the control plane, not handled here.
    let load_balancer_arn = load_balancing.create_load_balancer(
        &load_balancer_name,
        &desired.subnet_ids,
        &desired.security_groups,
        desired.scheme,
        &desired.owner_tags(),
    )?;

    let listener_arn = match load_balancing.create_listener(
        &load_balancer_arn,
        &target_group_arn,
        &desired.certificate_arn,
        &desired.ssl_policy,
    ) {
        Ok(arn) => arn,
        Err(error) if error.kind == RemoteErrorKind::DuplicateListener => {
            log_provision_info(
                "listener_exists",
                json!({ "load_balancer_arn": load_balancer_arn.clone() }),
            );
            let listeners = load_balancing.describe_listeners(&load_balancer_arn)?;
            listeners.into_iter().next().ok_or_else(|| {
                ProvisionError::new(format!(
                    "No listener found on load balancer {load_balancer_arn}"
                ))
            })?
        }
        Err(error) => return Err(error.into()),
    };

    let existing_rules = load_balancing.describe_rules(&listener_arn)?;
    let rule_created =
        if rule_already_routes(&existing_rules, &target_group_arn, &desired.rule_paths) {
            log_provision_info(
                "rule_exists",
                json!({
                    "listener_arn": listener_arn.clone(),
                    "target_group_arn": target_group_arn.clone(),
                    "rule_paths": desired.rule_paths.clone(),
                }),
            );
            false
        } else {
            load_balancing.create_rule(
                &listener_arn,
                &target_group_arn,
                &desired.rule_paths,
                priority,
            )?;
            true
        };

    let statement_id = permission_statement_id(priority);
    functions.add_invoke_permission(&desired.app_name, &target_group_arn, &statement_id)?;

    let function_arn = functions.function_arn(&desired.app_name)?;
    load_balancing.register_target(&target_group_arn, &function_arn)?;

    log_provision_info(
        "provision_completed",
        json!({
            "target_group_arn": target_group_arn.clone(),
            "load_balancer_arn": load_balancer_arn.clone(),
            "listener_arn": listener_arn.clone(),
            "rule_priority": priority,
            "rule_created": rule_created,
            "function_arn": function_arn.clone(),
        }),
    );

    Ok(ProvisionReport {
        status: "registered".to_string(),
        target_group_arn,
        load_balancer_arn,
        listener_arn,
        rule_priority: priority,
        rule_created,
        statement_id,
        function_arn,
    })
}

fn log_provision_info(event: &str, details: Value) {
    eprintln!(
        "{}",
        json!({
            "component": "provision_handler",
            "event": event,
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "details": details,
        })
    );
}

fn log_provision_error(event: &str, details: Value) {
    eprintln!(
        "{}",
        json!({
            "component": "provision_handler",
            "level": "error",
            "event": event,
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "details": details,
        })
    );
}
