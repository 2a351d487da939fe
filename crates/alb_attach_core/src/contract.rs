use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub const TARGET_GROUP_NAME_SUFFIX: &str = "-tg";
pub const LOAD_BALANCER_NAME_SUFFIX: &str = "-alb";
pub const DEFAULT_HEALTH_CHECK_PATH: &str = "/";
pub const OWNER_CONTACT_TAG_KEY: &str = "OwnerContact";

/// Raw invocation payload, field names as they arrive on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProvisionRequest {
    #[serde(rename = "AppName")]
    pub app_name: String,
    #[serde(rename = "OwnerContact")]
    pub owner_contact: String,
    #[serde(rename = "IamRole")]
    pub iam_role: String,
    #[serde(rename = "SubnetIds")]
    pub subnet_ids: String,
    #[serde(rename = "SecurityGroups")]
    pub security_groups: String,
    #[serde(rename = "Scheme", default)]
    pub scheme: Option<String>,
    #[serde(rename = "HealthCheckEnabled", default)]
    pub health_check_enabled: Option<String>,
    #[serde(rename = "HealthCheckPath", default)]
    pub health_check_path: Option<String>,
    #[serde(rename = "TargetType", default)]
    pub target_type: Option<String>,
    pub rule_path: String,
    #[serde(rename = "AlbName")]
    pub alb_name: String,
    #[serde(rename = "CertificateArn")]
    pub certificate_arn: String,
    #[serde(rename = "SslPolicy")]
    pub ssl_policy: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Scheme {
    Internal,
    InternetFacing,
}

impl Scheme {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Internal => "internal",
            Self::InternetFacing => "internet-facing",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TargetType {
    Ip,
    Lambda,
    Instance,
}

impl TargetType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ip => "ip",
            Self::Lambda => "lambda",
            Self::Instance => "instance",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResourceTag {
    pub key: String,
    pub value: String,
}

/// Validated, typed view of one reconciliation run's input. Immutable for
/// the duration of the run; resource identity is re-derived from it on
/// every invocation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DesiredState {
    pub app_name: String,
    pub owner_contact: String,
    pub iam_role: String,
    pub subnet_ids: Vec<String>,
    pub security_groups: Vec<String>,
    pub scheme: Scheme,
    pub health_check_enabled: bool,
    pub health_check_path: String,
    pub target_type: TargetType,
    pub rule_paths: Vec<String>,
    pub alb_name: String,
    pub certificate_arn: String,
    pub ssl_policy: String,
}

impl DesiredState {
    pub fn target_group_name(&self) -> String {
        format!("{}{TARGET_GROUP_NAME_SUFFIX}", self.app_name)
    }

    pub fn load_balancer_name(&self) -> String {
        format!("{}{LOAD_BALANCER_NAME_SUFFIX}", self.alb_name)
    }

    pub fn owner_tags(&self) -> Vec<ResourceTag> {
        vec![ResourceTag {
            key: OWNER_CONTACT_TAG_KEY.to_string(),
            value: self.owner_contact.clone(),
        }]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ValidationError {}

pub fn normalize_request(payload: ProvisionRequest) -> Result<DesiredState, ValidationError> {
    let app_name = required_field("AppName", &payload.app_name)?;
    let owner_contact = required_field("OwnerContact", &payload.owner_contact)?;
    let iam_role = required_field("IamRole", &payload.iam_role)?;
    let alb_name = required_field("AlbName", &payload.alb_name)?;
    let certificate_arn = required_field("CertificateArn", &payload.certificate_arn)?;
    let ssl_policy = required_field("SslPolicy", &payload.ssl_policy)?;

    let subnet_ids = split_id_list("SubnetIds", &payload.subnet_ids)?;
    let security_groups = split_id_list("SecurityGroups", &payload.security_groups)?;
    let rule_paths = split_id_list("rule_path", &payload.rule_path)?;

    let scheme = match payload.scheme.as_deref() {
        None => Scheme::Internal,
        Some(value) => parse_scheme(value)?,
    };
    let target_type = match payload.target_type.as_deref() {
        None => TargetType::Lambda,
        Some(value) => parse_target_type(value)?,
    };
    // Only the exact string "True" enables health checks; any other value
    // disables them.
    let health_check_enabled = payload
        .health_check_enabled
        .as_deref()
        .map(|value| value == "True")
        .unwrap_or(true);
    let health_check_path = payload
        .health_check_path
        .unwrap_or_else(|| DEFAULT_HEALTH_CHECK_PATH.to_string());

    Ok(DesiredState {
        app_name,
        owner_contact,
        iam_role,
        subnet_ids,
        security_groups,
        scheme,
        health_check_enabled,
        health_check_path,
        target_type,
        rule_paths,
        alb_name,
        certificate_arn,
        ssl_policy,
    })
}

fn required_field(name: &str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new(format!("{name} cannot be empty")));
    }
    Ok(trimmed.to_string())
}

fn split_id_list(name: &str, value: &str) -> Result<Vec<String>, ValidationError> {
    let parts: Vec<String> = value.split_whitespace().map(str::to_string).collect();
    if parts.is_empty() {
        return Err(ValidationError::new(format!(
            "{name} must contain at least one value"
        )));
    }
    Ok(parts)
}

fn parse_scheme(value: &str) -> Result<Scheme, ValidationError> {
    match value {
        "internal" => Ok(Scheme::Internal),
        "internet-facing" => Ok(Scheme::InternetFacing),
        other => Err(ValidationError::new(format!(
            "Scheme '{other}' is not one of internal | internet-facing"
        ))),
    }
}

fn parse_target_type(value: &str) -> Result<TargetType, ValidationError> {
    match value {
        "ip" => Ok(TargetType::Ip),
        "lambda" => Ok(TargetType::Lambda),
        "instance" => Ok(TargetType::Instance),
        other => Err(ValidationError::new(format!(
            "TargetType '{other}' is not one of ip | lambda | instance"
        ))),
    }
}

pub fn request_fingerprint(desired: &DesiredState) -> String {
    let mut hasher = Sha256::new();
    hasher.update(stable_contract_json(desired));
    format!("{:x}", hasher.finalize())
}

pub fn stable_contract_json(value: impl Serialize) -> String {
    serde_json::to_string(&value).expect("serialization of contract value should not fail")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_request() -> ProvisionRequest {
        ProvisionRequest {
            app_name: "svc1".to_string(),
            owner_contact: "a@b.com".to_string(),
            iam_role: "r".to_string(),
            subnet_ids: "subnet-1 subnet-2".to_string(),
            security_groups: "sg-1".to_string(),
            scheme: None,
            health_check_enabled: None,
            health_check_path: None,
            target_type: None,
            rule_path: "/health".to_string(),
            alb_name: "svc1".to_string(),
            certificate_arn: "arn:cert".to_string(),
            ssl_policy: "ELBSecurityPolicy-2016-08".to_string(),
        }
    }

    #[test]
    fn normalize_request_applies_optional_defaults() {
        let desired = normalize_request(sample_request()).expect("request should pass");

        assert_eq!(desired.scheme, Scheme::Internal);
        assert!(desired.health_check_enabled);
        assert_eq!(desired.health_check_path, "/");
        assert_eq!(desired.target_type, TargetType::Lambda);
    }

    #[test]
    fn normalize_request_splits_space_delimited_lists() {
        let desired = normalize_request(sample_request()).expect("request should pass");

        assert_eq!(desired.subnet_ids, vec!["subnet-1", "subnet-2"]);
        assert_eq!(desired.security_groups, vec!["sg-1"]);
        assert_eq!(desired.rule_paths, vec!["/health"]);
    }

    #[test]
    fn normalize_request_rejects_blank_app_name() {
        let mut request = sample_request();
        request.app_name = " ".to_string();

        let error = normalize_request(request).expect_err("request should fail");
        assert_eq!(error.message(), "AppName cannot be empty");
    }

    #[test]
    fn normalize_request_rejects_empty_subnet_list() {
        let mut request = sample_request();
        request.subnet_ids = "  ".to_string();

        let error = normalize_request(request).expect_err("request should fail");
        assert_eq!(error.message(), "SubnetIds must contain at least one value");
    }

    #[test]
    fn normalize_request_rejects_unknown_scheme() {
        let mut request = sample_request();
        request.scheme = Some("public".to_string());

        let error = normalize_request(request).expect_err("request should fail");
        assert_eq!(
            error.message(),
            "Scheme 'public' is not one of internal | internet-facing"
        );
    }

    #[test]
    fn normalize_request_rejects_unknown_target_type() {
        let mut request = sample_request();
        request.target_type = Some("container".to_string());

        let error = normalize_request(request).expect_err("request should fail");
        assert_eq!(
            error.message(),
            "TargetType 'container' is not one of ip | lambda | instance"
        );
    }

    #[test]
    fn health_check_flag_requires_exact_true_string() {
        let mut request = sample_request();
        request.health_check_enabled = Some("true".to_string());

        let desired = normalize_request(request).expect("request should pass");
        assert!(!desired.health_check_enabled);
    }

    #[test]
    fn derived_names_append_resource_suffixes() {
        let desired = normalize_request(sample_request()).expect("request should pass");

        assert_eq!(desired.target_group_name(), "svc1-tg");
        assert_eq!(desired.load_balancer_name(), "svc1-alb");
    }

    #[test]
    fn owner_tags_carry_the_contact() {
        let desired = normalize_request(sample_request()).expect("request should pass");
        let tags = desired.owner_tags();

        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].key, "OwnerContact");
        assert_eq!(tags[0].value, "a@b.com");
    }

    #[test]
    fn fingerprint_is_stable_for_identical_state() {
        let first = normalize_request(sample_request()).expect("request should pass");
        let second = normalize_request(sample_request()).expect("request should pass");

        assert_eq!(request_fingerprint(&first), request_fingerprint(&second));
    }
}
