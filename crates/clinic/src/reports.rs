//! Aggregations behind the patient detail page and the dashboard.
//!
//! Every report issues its reads concurrently and waits for all of them; the
//! first failing read fails the report.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use sadhak_persistence::schema::{
    Appointment, AppointmentStatus, FollowUp, Medicine, Patient, PatientStatus, Payment,
};
use sadhak_persistence::types::where_eq;
use sadhak_persistence::{DocumentAccess, StorageResult, Stored};

/// Billing totals over a set of payments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentTotals {
    /// Sum of `totalAmount`.
    #[serde(with = "rust_decimal::serde::float")]
    pub billed: Decimal,
    /// Sum of `paidAmount`.
    #[serde(with = "rust_decimal::serde::float")]
    pub paid: Decimal,
    /// Sum of `totalAmount - paidAmount`.
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Decimal,
}

impl PaymentTotals {
    /// Totals the given payments.
    pub fn from_payments<'a>(payments: impl IntoIterator<Item = &'a Payment>) -> Self {
        payments
            .into_iter()
            .fold(PaymentTotals::default(), |mut totals, payment| {
                totals.billed += payment.total_amount;
                totals.paid += payment.paid_amount;
                totals.balance += payment.total_amount - payment.paid_amount;
                totals
            })
    }
}

/// Everything the patient detail page shows.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientSummary {
    /// The patient record.
    pub patient: Stored<Patient>,
    /// Follow-ups referencing the patient.
    pub follow_ups: Vec<Stored<FollowUp>>,
    /// Payments referencing the patient.
    pub payments: Vec<Stored<Payment>>,
    /// Totals over `payments`.
    pub totals: PaymentTotals,
    /// Notes of the most recent follow-up, if it has any.
    pub latest_notes: Option<String>,
}

/// Practice-wide figures for the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    /// Number of patients.
    pub total_patients: usize,
    /// Patients whose status is `Active`.
    pub active_patients: usize,
    /// Number of appointments.
    pub total_appointments: usize,
    /// Appointments not yet completed. An appointment without a status
    /// counts as scheduled.
    pub scheduled_appointments: usize,
    /// Units in stock across all medicines.
    pub medicine_stock: i64,
    /// Medicines flagged low on stock.
    pub low_stock_items: usize,
    /// Totals over every payment.
    pub payments: PaymentTotals,
}

/// Builds the detail view of one patient.
///
/// Returns `None` when the patient does not exist. Follow-ups and payments
/// are matched on `patientId`.
pub async fn patient_summary(
    access: &DocumentAccess,
    patient_id: &str,
) -> StorageResult<Option<PatientSummary>> {
    let (patient, follow_ups, payments) = tokio::try_join!(
        access.get_by_id::<Patient>(patient_id),
        access.query::<FollowUp>([where_eq("patientId", patient_id)]),
        access.query::<Payment>([where_eq("patientId", patient_id)]),
    )?;

    let Some(patient) = patient else {
        debug!(patient_id, "No patient for summary");
        return Ok(None);
    };

    let totals = PaymentTotals::from_payments(payments.iter().map(|p| &p.data));
    let latest_notes = latest_follow_up(&follow_ups)
        .map(|f| f.notes.clone())
        .filter(|notes| !notes.trim().is_empty());

    debug!(
        patient_id,
        follow_ups = follow_ups.len(),
        payments = payments.len(),
        "Built patient summary"
    );
    Ok(Some(PatientSummary {
        patient,
        follow_ups,
        payments,
        totals,
        latest_notes,
    }))
}

/// The follow-up with the latest date. Dates that do not parse as
/// `YYYY-MM-DD` sort before every valid date.
fn latest_follow_up(follow_ups: &[Stored<FollowUp>]) -> Option<&Stored<FollowUp>> {
    follow_ups.iter().max_by_key(|f| {
        (
            NaiveDate::parse_from_str(&f.date, "%Y-%m-%d").ok(),
            f.date.clone(),
        )
    })
}

/// Computes the dashboard figures.
pub async fn dashboard(access: &DocumentAccess) -> StorageResult<DashboardMetrics> {
    let (patients, appointments, medicines, payments) = tokio::try_join!(
        access.get_all::<Patient>(),
        access.get_all::<Appointment>(),
        access.get_all::<Medicine>(),
        access.get_all::<Payment>(),
    )?;

    let metrics = DashboardMetrics {
        total_patients: patients.len(),
        active_patients: patients
            .iter()
            .filter(|p| p.status == PatientStatus::Active)
            .count(),
        total_appointments: appointments.len(),
        scheduled_appointments: appointments
            .iter()
            .filter(|a| a.status != Some(AppointmentStatus::Completed))
            .count(),
        medicine_stock: medicines.iter().map(|m| m.stock).sum(),
        low_stock_items: medicines.iter().filter(|m| m.low_stock).count(),
        payments: PaymentTotals::from_payments(payments.iter().map(|p| &p.data)),
    };

    debug!(
        total_patients = metrics.total_patients,
        low_stock_items = metrics.low_stock_items,
        "Computed dashboard metrics"
    );
    Ok(metrics)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payment(total: i64, paid: i64) -> Payment {
        let mut payment = Payment::new("p1", "2025-01-15");
        payment.total_amount = Decimal::from(total);
        payment.paid_amount = Decimal::from(paid);
        payment
    }

    fn follow_up(date: &str, notes: &str) -> Stored<FollowUp> {
        Stored {
            id: date.to_string(),
            created_at: None,
            updated_at: None,
            data: FollowUp {
                patient_id: "p1".to_string(),
                date: date.to_string(),
                time: None,
                reason: "Review".to_string(),
                notes: notes.to_string(),
                status: Default::default(),
            },
        }
    }

    #[test]
    fn test_payment_totals() {
        let payments = [payment(500, 500), payment(400, 400), payment(700, 600)];
        let totals = PaymentTotals::from_payments(&payments);
        assert_eq!(totals.billed, Decimal::from(1600));
        assert_eq!(totals.paid, Decimal::from(1500));
        assert_eq!(totals.balance, Decimal::from(100));
    }

    #[test]
    fn test_payment_totals_empty() {
        assert_eq!(PaymentTotals::from_payments([]), PaymentTotals::default());
    }

    #[test]
    fn test_latest_follow_up_by_date() {
        let follow_ups = [
            follow_up("2025-01-08", "first"),
            follow_up("2025-01-15", "latest"),
            follow_up("2024-12-30", "oldest"),
            follow_up("soon", "undated"),
        ];
        assert_eq!(latest_follow_up(&follow_ups).unwrap().notes, "latest");
        assert!(latest_follow_up(&[]).is_none());
    }

    #[test]
    fn test_totals_serialize_as_numbers() {
        let totals = PaymentTotals::from_payments(&[payment(750, 500)]);
        let json = serde_json::to_value(totals).unwrap();
        assert_eq!(json["billed"], serde_json::json!(750.0));
        assert_eq!(json["balance"], serde_json::json!(250.0));
    }
}
