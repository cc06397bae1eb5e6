//! Staff profiles in the `users` collection.

use serde::{Deserialize, Serialize};

use super::{Collection, Entity};

/// Profile data kept alongside an identity-service account.
///
/// Documents are usually created with the principal's id as a foreign key in
/// mind, but the store still assigns its own identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Login email.
    pub email: String,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Whether the identity service has verified the email.
    #[serde(default)]
    pub email_verified: bool,
}

/// Partial update of a [`UserProfile`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfilePatch {
    /// New login email.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// New display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New verification flag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_verified: Option<bool>,
}

impl Entity for UserProfile {
    const COLLECTION: Collection = Collection::Users;
    type Patch = UserProfilePatch;
}
