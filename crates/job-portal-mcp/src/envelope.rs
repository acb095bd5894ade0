use serde::Serialize;
use serde_json::{Value, json};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

/// Result body every tool returns, success or not.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolResponse {
    pub success: bool,
    pub data: Value,
    pub error: Option<ToolError>,
}

impl ToolResponse {
    pub fn success(data: Value) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }

    pub fn failure(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: Value::Null,
            error: Some(ToolError {
                code: code.into(),
                message: message.into(),
                details: None,
            }),
        }
    }

    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        if let Some(error) = self.error.as_mut() {
            error.details = Some(details);
        }
        self
    }

    /// Wraps the envelope into an MCP `tools/call` result.
    pub fn into_result(self) -> Value {
        let text = serde_json::to_string(&self).unwrap_or_else(|_| "{}".to_string());
        let structured = serde_json::to_value(&self).unwrap_or_else(|_| json!({}));
        json!({
            "structuredContent": structured,
            "content": [{"type": "text", "text": text}]
        })
    }
}
