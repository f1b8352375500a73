use serde::Serialize;

/// Body of a streamed analysis request. Serialized as-is onto the wire;
/// `conversation_id` is omitted for the first turn of a transcript.
#[derive(Debug, Clone, Serialize)]
pub struct QueryRequest {
    pub query: String,
    pub persona: String,
    pub catalog: String,
    pub schema: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

impl QueryRequest {
    pub fn new(query: impl Into<String>) -> Self {
        QueryRequest {
            query: query.into(),
            persona: "analyst".to_string(),
            catalog: String::new(),
            schema: String::new(),
            conversation_id: None,
        }
    }
}

/// Source of the bearer token attached to a request. Kept behind a trait so
/// callers can plug in a refreshing credential store without touching the
/// request path.
pub trait CredentialProvider {
    fn bearer(&self) -> Option<String>;
}

/// Fixed token, typically read from the environment at startup.
pub struct StaticToken(pub String);

impl CredentialProvider for StaticToken {
    fn bearer(&self) -> Option<String> {
        if self.0.is_empty() {
            None
        } else {
            Some(self.0.clone())
        }
    }
}
