use serde::{Deserialize, Serialize};

/// Identity handed over by the authentication layer. The pipeline treats the
/// id as opaque and only records it in logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: String,
    pub email: Option<String>,
}
