//! Wire types shared by the proxy and its clients.

use serde::{Deserialize, Serialize};

/// Route the proxy serves and clients post to.
pub const DECODE_ROUTE: &str = "/.netlify/functions/decode";

/// Substituted whenever the model returns no usable text.
pub const NO_EXPLANATION_FALLBACK: &str = "No explanation found.";

/// Body a client sends to the decode route.
///
/// `phrase` is optional at the type level so the proxy can tell a missing
/// phrase (a client mistake) apart from a body that is not JSON at all.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExplainRequest {
    #[serde(default)]
    pub phrase: Option<String>,
}

impl ExplainRequest {
    pub fn new(phrase: impl Into<String>) -> Self {
        Self {
            phrase: Some(phrase.into()),
        }
    }
}

/// Successful proxy reply.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExplanationBody {
    pub explanation: String,
}

/// Failed proxy reply.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
}

/// What a client reads back from the proxy. Either field may be absent.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct ProxyReply {
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}
