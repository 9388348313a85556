//! Per-request client metadata.

use serde::{Deserialize, Serialize};

/// Who is calling, as far as the transport can tell.
///
/// Built by the HTTP layer and handed to the components that audit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestContext {
    /// Client IP address.
    pub ip: Option<String>,
    /// User-Agent header value.
    pub user_agent: Option<String>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(ip: Option<String>, user_agent: Option<String>) -> Self {
        Self { ip, user_agent }
    }
}
