use crate::adapters::error::RemoteError;

pub const LOAD_BALANCER_PRINCIPAL: &str = "elasticloadbalancing.amazonaws.com";
pub const INVOKE_FUNCTION_ACTION: &str = "lambda:InvokeFunction";

/// Blocking facade over the function-management control plane.
pub trait FunctionApi {
    /// Grants the load-balancing principal permission to invoke the
    /// function, scoped by `source_arn` and keyed by `statement_id`.
    fn add_invoke_permission(
        &self,
        function_name: &str,
        source_arn: &str,
        statement_id: &str,
    ) -> Result<(), RemoteError>;

    fn function_arn(&self, function_name: &str) -> Result<String, RemoteError>;
}
