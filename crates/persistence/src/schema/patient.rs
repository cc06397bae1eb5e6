//! Patient records.

// Entity fields are named after their wire keys
#![allow(missing_docs)]

use serde::{Deserialize, Serialize};

use super::{Collection, Entity};

/// Where a patient stands in their course of care.
///
/// Stored as a plain string. Values outside the three known states are kept
/// as [`PatientStatus::Other`] and written back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PatientStatus {
    #[default]
    Active,
    FollowUp,
    Inactive,
    Other(String),
}

impl PatientStatus {
    /// Returns the wire form of the status.
    pub fn as_str(&self) -> &str {
        match self {
            PatientStatus::Active => "Active",
            PatientStatus::FollowUp => "Follow-up",
            PatientStatus::Inactive => "Inactive",
            PatientStatus::Other(status) => status,
        }
    }
}

impl From<String> for PatientStatus {
    fn from(status: String) -> Self {
        match status.as_str() {
            "Active" => PatientStatus::Active,
            "Follow-up" => PatientStatus::FollowUp,
            "Inactive" => PatientStatus::Inactive,
            _ => PatientStatus::Other(status),
        }
    }
}

impl From<PatientStatus> for String {
    fn from(status: PatientStatus) -> Self {
        match status {
            PatientStatus::Other(status) => status,
            known => known.as_str().to_string(),
        }
    }
}

/// A patient of the practice.
///
/// The clinical notes (`nadiParikshan`, `parikshan`, `ho`, ...) are free text
/// entered by the practitioner and are never interpreted here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub name: String,
    /// Any JSON number; range checks belong to the forms that collect it.
    pub age: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dob: Option<String>,
    pub address: String,
    pub phone_number: String,
    pub job: String,
    pub reference: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symptoms: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub treatment_plan: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_visit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_appointment_date: Option<String>,
    pub status: PatientStatus,
    /// Pulse diagnosis notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nadi_parikshan: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    /// History of illness.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ho: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub treatment: Option<String>,
    /// Examination notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parikshan: Option<String>,
}

/// Partial update of a [`Patient`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dob: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symptoms: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub treatment_plan: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_visit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_appointment_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PatientStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nadi_parikshan: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ho: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub treatment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parikshan: Option<String>,
}

impl Entity for Patient {
    const COLLECTION: Collection = Collection::Patients;
    type Patch = PatientPatch;
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::schema::to_field_map;

    fn rajesh() -> Patient {
        Patient {
            name: "Rajesh Kumar".to_string(),
            age: 45.0,
            dob: None,
            address: "12 MG Road, Pune".to_string(),
            phone_number: "+91 98220 00000".to_string(),
            job: "Teacher".to_string(),
            reference: "Walk-in".to_string(),
            symptoms: Some("Joint pain".to_string()),
            treatment_plan: None,
            last_visit: None,
            next_appointment_date: None,
            status: PatientStatus::FollowUp,
            nadi_parikshan: None,
            condition: None,
            ho: None,
            treatment: None,
            parikshan: None,
        }
    }

    #[test]
    fn test_wire_shape() {
        let value = serde_json::to_value(rajesh()).unwrap();
        assert_eq!(value["phoneNumber"], json!("+91 98220 00000"));
        assert_eq!(value["status"], json!("Follow-up"));
        assert!(value.get("dob").is_none());
        assert!(value.get("id").is_none());
    }

    #[test]
    fn test_decodes_loosely_shaped_documents() {
        let value = json!({
            "name": "Meera Iyer",
            "age": -1.5,
            "address": "",
            "phoneNumber": "",
            "job": "",
            "reference": "",
            "status": "Discharged"
        });
        let patient: Patient = serde_json::from_value(value).unwrap();
        assert_eq!(patient.age, -1.5);
        assert_eq!(patient.status, PatientStatus::Other("Discharged".to_string()));

        let back = serde_json::to_value(&patient).unwrap();
        assert_eq!(back["status"], json!("Discharged"));
    }

    #[test]
    fn test_patch_field_names() {
        let patch = PatientPatch {
            next_appointment_date: Some("2025-03-01".to_string()),
            ..Default::default()
        };
        let map = to_field_map(&patch).unwrap();
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["nextAppointmentDate"]);
    }
}
