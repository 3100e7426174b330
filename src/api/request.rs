// ABOUTME: Lowstate command request and form-body encoding.
// ABOUTME: Field order and omission rules match what salt-api expects.

use crate::types::TargetType;

/// Client interface used for every command: run synchronously on the master.
pub const CLIENT_LOCAL: &str = "local";

/// A single remote-execution request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRequest {
    client: &'static str,
    target: String,
    function: String,
    arguments: String,
    expr_form: Option<TargetType>,
}

impl CommandRequest {
    pub fn new(
        target: impl Into<String>,
        function: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        Self {
            client: CLIENT_LOCAL,
            target: target.into(),
            function: function.into(),
            arguments: arguments.into(),
            expr_form: None,
        }
    }

    pub fn expr_form(mut self, expr_form: TargetType) -> Self {
        self.expr_form = Some(expr_form);
        self
    }

    pub fn client(&self) -> &str {
        self.client
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn function(&self) -> &str {
        &self.function
    }

    pub fn arguments(&self) -> &str {
        &self.arguments
    }

    pub fn target_type(&self) -> Option<TargetType> {
        self.expr_form
    }

    /// Encode as `application/x-www-form-urlencoded`.
    ///
    /// Order is `client, tgt, fun, arg, expr_form`. `arg` is left out when the
    /// arguments are empty, `expr_form` when no target type is set.
    pub fn to_form(&self) -> String {
        let mut fields = vec![
            ("client", self.client),
            ("tgt", self.target.as_str()),
            ("fun", self.function.as_str()),
        ];
        if !self.arguments.is_empty() {
            fields.push(("arg", self.arguments.as_str()));
        }
        if let Some(expr_form) = &self.expr_form {
            fields.push(("expr_form", expr_form.as_str()));
        }
        encode_form(&fields)
    }
}

/// Encode key/value pairs in the given order.
pub(crate) fn encode_form(fields: &[(&str, &str)]) -> String {
    fields
        .iter()
        .map(|(k, v)| format!("{}={}", encode_component(k), encode_component(v)))
        .collect::<Vec<_>>()
        .join("&")
}

// Query-component escaping: unreserved bytes pass, space becomes '+'.
fn encode_component(value: &str) -> String {
    urlencoding::encode(value).replace("%20", "+")
}
