//! Named collections.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A named grouping of documents of one entity kind.
///
/// The string forms are the wire-level contract shared with every other tool
/// reading the same store, so they must never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Collection {
    /// `patients`
    #[serde(rename = "patients")]
    Patients,
    /// `users`
    #[serde(rename = "users")]
    Users,
    /// `appointments`
    #[serde(rename = "appointments")]
    Appointments,
    /// `followUps`
    #[serde(rename = "followUps")]
    FollowUps,
    /// `payments`
    #[serde(rename = "payments")]
    Payments,
    /// `medicines`
    #[serde(rename = "medicines")]
    Medicines,
    /// `treatments`
    #[serde(rename = "treatments")]
    Treatments,
}

impl Collection {
    /// Every collection, in declaration order.
    pub const ALL: [Collection; 7] = [
        Collection::Patients,
        Collection::Users,
        Collection::Appointments,
        Collection::FollowUps,
        Collection::Payments,
        Collection::Medicines,
        Collection::Treatments,
    ];

    /// Returns the wire name of the collection.
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Patients => "patients",
            Collection::Users => "users",
            Collection::Appointments => "appointments",
            Collection::FollowUps => "followUps",
            Collection::Payments => "payments",
            Collection::Medicines => "medicines",
            Collection::Treatments => "treatments",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for Collection {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Error returned when parsing an unknown collection name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown collection: {0}")]
pub struct UnknownCollection(pub String);

impl FromStr for Collection {
    type Err = UnknownCollection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Collection::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownCollection(s.to_string()))
    }
}
