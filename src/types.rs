//! Domain records for the OAuth2 auth endpoint.
//!
//! Both records are produced only through [`Serializable::load`], so a
//! value of either type has already passed the schema in `crate::schema`.
//!
//! [`Serializable::load`]: authgate_core::Serializable::load

use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

/// Identity provider the customer authenticates against.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    A,
    B,
}

impl Provider {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::A => "a",
            Self::B => "b",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Query parameters of an auth request.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct AuthQuery {
    pub customer_id: Uuid,
    pub provider: Provider,
    pub role: String,
    /// Where the provider sends the customer back to.
    pub return_url: Url,
}

/// An auth request as delivered by the host. Unknown keys are ignored.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct AuthRequest {
    #[serde(rename = "httpMethod", default, skip_serializing_if = "Option::is_none")]
    pub http_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(rename = "queryStringParameters")]
    pub query: AuthQuery,
}
