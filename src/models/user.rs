use serde::{Deserialize, Serialize};

/// Role attached to a user account.
/// Opaque to the client core - no permission logic is derived from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: String,
    pub name: String,
}

/// The client's cached view of the authenticated user.
/// Identity and display needs only; the backend is authoritative for
/// everything else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: String,
    pub username: String,
    #[serde(rename = "imgUrl")]
    pub avatar_url: String,
    #[serde(rename = "vip")]
    pub is_vip: bool,
    pub role: Role,
}

/// Payload returned by the login and verify-email endpoints.
/// Carries both tokens alongside the identity fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginPayload {
    pub access_token: String,
    pub refresh_token: String,
    pub id: String,
    pub username: String,
    pub img_url: String,
    pub vip: bool,
    pub role: Role,
}

impl LoginPayload {
    /// Derive the cached identity from a server-issued login payload.
    pub fn identity(&self) -> UserIdentity {
        UserIdentity {
            id: self.id.clone(),
            username: self.username.clone(),
            avatar_url: self.img_url.clone(),
            is_vip: self.vip,
            role: self.role.clone(),
        }
    }
}
