//! Patient operations spanning several collections.

use serde::Serialize;
use tracing::info;

use sadhak_persistence::schema::{Collection, Patient};
use sadhak_persistence::types::{StoredDocument, where_eq};
use sadhak_persistence::{DocumentAccess, StorageResult};

/// Field referencing the owning patient in dependent collections.
const PATIENT_REF: &str = "patientId";

/// Collections holding documents that reference a patient.
pub const DEPENDENT_COLLECTIONS: [Collection; 3] = [
    Collection::Appointments,
    Collection::FollowUps,
    Collection::Payments,
];

/// What [`delete_with_dependents`] removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CascadeReport {
    /// Whether the patient document existed.
    pub patient: bool,
    /// Appointments removed.
    pub appointments: usize,
    /// Follow-ups removed.
    pub follow_ups: usize,
    /// Payments removed.
    pub payments: usize,
}

impl CascadeReport {
    fn record(&mut self, collection: Collection, removed: usize) {
        match collection {
            Collection::Appointments => self.appointments = removed,
            Collection::FollowUps => self.follow_ups = removed,
            Collection::Payments => self.payments = removed,
            _ => {}
        }
    }
}

/// Deletes a patient together with the appointments, follow-ups and
/// payments referencing it.
///
/// Dependents are removed before the patient. The deletes are independent
/// writes: a failure part way leaves the documents already removed deleted
/// and the rest in place, and the call can simply be repeated.
pub async fn delete_with_dependents(
    access: &DocumentAccess,
    patient_id: &str,
) -> StorageResult<CascadeReport> {
    let (appointments, follow_ups, payments) = tokio::try_join!(
        referencing(access, Collection::Appointments, patient_id),
        referencing(access, Collection::FollowUps, patient_id),
        referencing(access, Collection::Payments, patient_id),
    )?;

    let mut report = CascadeReport::default();
    for (collection, documents) in DEPENDENT_COLLECTIONS
        .into_iter()
        .zip([appointments, follow_ups, payments])
    {
        for document in &documents {
            access.delete_in(collection, &document.id).await?;
        }
        report.record(collection, documents.len());
    }

    report.patient = access.exists::<Patient>(patient_id).await?;
    access.delete::<Patient>(patient_id).await?;

    info!(
        patient_id,
        patient = report.patient,
        appointments = report.appointments,
        follow_ups = report.follow_ups,
        payments = report.payments,
        "Deleted patient with dependents"
    );
    Ok(report)
}

async fn referencing(
    access: &DocumentAccess,
    collection: Collection,
    patient_id: &str,
) -> StorageResult<Vec<StoredDocument>> {
    access
        .query_documents(collection, [where_eq(PATIENT_REF, patient_id)])
        .await
}
