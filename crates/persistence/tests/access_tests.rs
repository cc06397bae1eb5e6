//! Access-layer integration tests.
//!
//! These tests run the typed access layer against an in-memory SQLite store.

use rust_decimal::Decimal;
use serde_json::{Value, json};

use sadhak_persistence::backends::sqlite::SqliteStore;
use sadhak_persistence::schema::{
    Appointment, AppointmentStatus, Medicine, MedicinePatch, Patient, PatientPatch, PatientStatus,
    Payment, PaymentPatch, Treatment,
};
use sadhak_persistence::types::where_eq;
use sadhak_persistence::{DocumentAccess, StorageError, StoreConfig, StoreConnection};

fn create_access() -> DocumentAccess {
    let store = SqliteStore::in_memory("sadhak-test").expect("Failed to create SQLite store");
    DocumentAccess::new(StoreConnection::connected(store))
}

fn patient(name: &str, age: f64) -> Patient {
    Patient {
        name: name.to_string(),
        age,
        dob: None,
        address: "12 MG Road, Pune".to_string(),
        phone_number: "+91 98220 00000".to_string(),
        job: "Teacher".to_string(),
        reference: "Walk-in".to_string(),
        symptoms: Some("Joint pain".to_string()),
        treatment_plan: None,
        last_visit: None,
        next_appointment_date: None,
        status: PatientStatus::Active,
        nadi_parikshan: None,
        condition: None,
        ho: None,
        treatment: None,
        parikshan: None,
    }
}

fn payment(patient_id: &str, consulting_fee: i64, paid: i64) -> Payment {
    let mut payment = Payment::new(patient_id, "2024-03-01");
    payment.consulting_fee = Decimal::from(consulting_fee);
    payment.paid_amount = Decimal::from(paid);
    payment
}

// ============================================================================
// Create / Read Tests
// ============================================================================

#[tokio::test]
async fn test_create_then_get() {
    let access = create_access();

    let id = access.create(&patient("Rajesh Kumar", 45.0)).await.unwrap();
    assert!(!id.is_empty());

    let stored = access.get_by_id::<Patient>(&id).await.unwrap().unwrap();
    assert_eq!(stored.id, id);
    assert_eq!(stored.name, "Rajesh Kumar");
    assert_eq!(stored.age, 45.0);
    assert_eq!(stored.status, PatientStatus::Active);
    assert!(stored.created_at.is_some());
    assert_eq!(stored.created_at, stored.updated_at);
}

#[tokio::test]
async fn test_create_assigns_distinct_ids() {
    let access = create_access();

    let a = access.create(&patient("Asha", 31.0)).await.unwrap();
    let b = access.create(&patient("Asha", 31.0)).await.unwrap();
    assert_ne!(a, b);
}

#[tokio::test]
async fn test_get_missing_is_none() {
    let access = create_access();
    assert!(access.get_by_id::<Patient>("no-such-id").await.unwrap().is_none());
}

#[tokio::test]
async fn test_get_all() {
    let access = create_access();
    for name in ["Asha", "Vikram", "Meera"] {
        access.create(&patient(name, 40.0)).await.unwrap();
    }

    let mut names: Vec<_> = access
        .get_all::<Patient>()
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.name.clone())
        .collect();
    names.sort();
    assert_eq!(names, vec!["Asha", "Meera", "Vikram"]);
    assert!(access.get_all::<Treatment>().await.unwrap().is_empty());
}

// ============================================================================
// Update Tests
// ============================================================================

#[tokio::test]
async fn test_partial_update() {
    let access = create_access();
    let id = access.create(&patient("Rajesh Kumar", 45.0)).await.unwrap();
    let before = access.get_by_id::<Patient>(&id).await.unwrap().unwrap();

    let patch = PatientPatch {
        status: Some(PatientStatus::FollowUp),
        symptoms: Some("Reduced joint pain".to_string()),
        ..Default::default()
    };
    access.update::<Patient>(&id, &patch).await.unwrap();

    let after = access.get_by_id::<Patient>(&id).await.unwrap().unwrap();
    assert_eq!(after.status, PatientStatus::FollowUp);
    assert_eq!(after.symptoms.as_deref(), Some("Reduced joint pain"));
    assert_eq!(after.name, before.name);
    assert_eq!(after.age, before.age);
    assert_eq!(after.phone_number, before.phone_number);
    assert_eq!(after.created_at, before.created_at);
    assert!(after.updated_at > before.updated_at);
}

#[tokio::test]
async fn test_repeated_updates_advance_updated_at() {
    let access = create_access();
    let id = access.create(&patient("Asha", 31.0)).await.unwrap();

    let mut last = access.get_by_id::<Patient>(&id).await.unwrap().unwrap().updated_at;
    for age in [32.0, 33.0, 34.0, 35.0] {
        let patch = PatientPatch {
            age: Some(age),
            ..Default::default()
        };
        access.update::<Patient>(&id, &patch).await.unwrap();
        let current = access.get_by_id::<Patient>(&id).await.unwrap().unwrap();
        assert_eq!(current.age, age);
        assert!(current.updated_at > last);
        last = current.updated_at;
    }
}

#[tokio::test]
async fn test_update_missing_is_write_failure() {
    let access = create_access();

    let err = access
        .update::<Patient>("no-such-id", &PatientPatch::default())
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::WriteFailure { .. }));
    assert_eq!(err.collection(), "patients");
    assert!(!access.exists::<Patient>("no-such-id").await.unwrap());
}

#[tokio::test]
async fn test_update_recomputes_low_stock() {
    let access = create_access();
    let id = access
        .create(&Medicine::new("Ashwagandha Churna", "Churna", 40, "₹150"))
        .await
        .unwrap();
    assert!(!access.get_by_id::<Medicine>(&id).await.unwrap().unwrap().low_stock);

    let patch = MedicinePatch {
        stock: Some(14),
        ..Default::default()
    };
    access.update::<Medicine>(&id, &patch).await.unwrap();
    let medicine = access.get_by_id::<Medicine>(&id).await.unwrap().unwrap();
    assert_eq!(medicine.stock, 14);
    assert!(medicine.low_stock);

    // A caller-supplied flag is overridden by the stock level
    let patch = MedicinePatch {
        low_stock: Some(true),
        ..Default::default()
    };
    access.update::<Medicine>(&id, &patch).await.unwrap();
    let patch = MedicinePatch {
        stock: Some(15),
        low_stock: Some(true),
        ..Default::default()
    };
    access.update::<Medicine>(&id, &patch).await.unwrap();
    assert!(!access.get_by_id::<Medicine>(&id).await.unwrap().unwrap().low_stock);
}

#[tokio::test]
async fn test_update_recomputes_payment_totals() {
    let access = create_access();
    let mut initial = payment("p1", 500, 200);
    initial.medicine_charges = Decimal::from(300);
    let id = access.create(&initial).await.unwrap();

    let stored = access.get_by_id::<Payment>(&id).await.unwrap().unwrap();
    assert_eq!(stored.total_amount, Decimal::from(800));
    assert_eq!(stored.balance_amount, Decimal::from(600));

    let patch = PaymentPatch {
        paid_amount: Some(Decimal::from(800)),
        ..Default::default()
    };
    access.update::<Payment>(&id, &patch).await.unwrap();
    let stored = access.get_by_id::<Payment>(&id).await.unwrap().unwrap();
    assert_eq!(stored.total_amount, Decimal::from(800));
    assert_eq!(stored.balance_amount, Decimal::ZERO);
    assert_eq!(stored.medicine_charges, Decimal::from(300));
}

#[tokio::test]
async fn test_update_without_derived_inputs_keeps_totals() {
    let access = create_access();
    let id = access.create(&payment("p1", 700, 600)).await.unwrap();

    let patch = PaymentPatch {
        date: Some("2024-03-05".to_string()),
        ..Default::default()
    };
    access.update::<Payment>(&id, &patch).await.unwrap();

    let stored = access.get_by_id::<Payment>(&id).await.unwrap().unwrap();
    assert_eq!(stored.date, "2024-03-05");
    assert_eq!(stored.total_amount, Decimal::from(700));
    assert_eq!(stored.balance_amount, Decimal::from(100));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_updates_keep_balance_consistent() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("clinic.db").display());
    let access =
        DocumentAccess::new(StoreConnection::from_config(&StoreConfig::new(url, "sadhak-test")).unwrap());

    for _ in 0..20 {
        let id = access.create(&payment("p1", 300, 0)).await.unwrap();

        let pay = PaymentPatch {
            paid_amount: Some(Decimal::from(100)),
            ..Default::default()
        };
        let reprice = PaymentPatch {
            consulting_fee: Some(Decimal::from(500)),
            ..Default::default()
        };
        let (paid, repriced) = tokio::join!(
            access.update::<Payment>(&id, &pay),
            access.update::<Payment>(&id, &reprice),
        );
        paid.unwrap();
        repriced.unwrap();

        let stored = access.get_by_id::<Payment>(&id).await.unwrap().unwrap();
        assert_eq!(stored.consulting_fee, Decimal::from(500));
        assert_eq!(stored.paid_amount, Decimal::from(100));
        assert_eq!(stored.total_amount, Decimal::from(500));
        assert_eq!(stored.balance_amount, Decimal::from(400));
    }
}

// ============================================================================
// Delete / Exists / Count Tests
// ============================================================================

#[tokio::test]
async fn test_delete_then_get() {
    let access = create_access();
    let id = access.create(&patient("Asha", 31.0)).await.unwrap();
    assert!(access.exists::<Patient>(&id).await.unwrap());

    access.delete::<Patient>(&id).await.unwrap();
    assert!(access.get_by_id::<Patient>(&id).await.unwrap().is_none());
    assert!(!access.exists::<Patient>(&id).await.unwrap());
}

#[tokio::test]
async fn test_delete_nonexistent_succeeds() {
    let access = create_access();
    access.delete::<Patient>("never-existed").await.unwrap();
}

#[tokio::test]
async fn test_delete_does_not_cascade() {
    let access = create_access();
    let patient_id = access.create(&patient("Vikram", 52.0)).await.unwrap();
    let appointment = Appointment {
        date: "2024-03-10".to_string(),
        time: "10:30".to_string(),
        patient_id: patient_id.clone(),
        patient_name: "Vikram".to_string(),
        kind: "Consultation".to_string(),
        duration: "30 min".to_string(),
        status: Some(AppointmentStatus::Scheduled),
    };
    let appointment_id = access.create(&appointment).await.unwrap();

    access.delete::<Patient>(&patient_id).await.unwrap();
    assert!(access.exists::<Appointment>(&appointment_id).await.unwrap());
}

#[tokio::test]
async fn test_count_after_creates_and_deletes() {
    let access = create_access();

    let mut ids = Vec::new();
    for i in 0..5 {
        ids.push(access.create(&patient(&format!("Patient {i}"), f64::from(30 + i))).await.unwrap());
    }
    assert_eq!(access.count::<Patient>().await.unwrap(), 5);

    access.delete::<Patient>(&ids[0]).await.unwrap();
    access.delete::<Patient>(&ids[3]).await.unwrap();
    assert_eq!(access.count::<Patient>().await.unwrap(), 3);
    assert_eq!(access.count::<Medicine>().await.unwrap(), 0);
}

// ============================================================================
// Query Tests
// ============================================================================

#[tokio::test]
async fn test_query_equality() {
    let access = create_access();
    let asha = access.create(&patient("Asha", 31.0)).await.unwrap();
    access.create(&patient("Vikram", 52.0)).await.unwrap();

    let mut inactive = patient("Meera", 64.0);
    inactive.status = PatientStatus::Inactive;
    access.create(&inactive).await.unwrap();

    let found = access
        .query::<Patient>([where_eq("name", "Asha")])
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, asha);

    let active = access
        .query::<Patient>([where_eq("status", PatientStatus::Active.as_str())])
        .await
        .unwrap();
    assert_eq!(active.len(), 2);
    assert!(active.iter().all(|p| p.status == PatientStatus::Active));

    let none = access
        .query::<Patient>([where_eq("name", "Nobody")])
        .await
        .unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn test_payment_aggregation_for_patient() {
    let access = create_access();
    for (fee, paid) in [(500, 500), (400, 400), (700, 600)] {
        access.create(&payment("patient-x", fee, paid)).await.unwrap();
    }
    access.create(&payment("patient-y", 900, 0)).await.unwrap();

    let payments = access
        .query::<Payment>([where_eq("patientId", "patient-x")])
        .await
        .unwrap();
    assert_eq!(payments.len(), 3);

    let paid: Decimal = payments.iter().map(|p| p.paid_amount).sum();
    let billed: Decimal = payments.iter().map(|p| p.total_amount).sum();
    let balance: Decimal = payments
        .iter()
        .map(|p| p.total_amount - p.paid_amount)
        .sum();
    assert_eq!(paid, Decimal::from(1500));
    assert_eq!(billed, Decimal::from(1600));
    assert_eq!(balance, Decimal::from(100));

    let stored_balance: Decimal = payments.iter().map(|p| p.balance_amount).sum();
    assert_eq!(stored_balance, balance);
}

#[tokio::test]
async fn test_loosely_shaped_patient_still_decodes() {
    let access = create_access();
    access.create(&patient("Asha", 31.0)).await.unwrap();

    let Value::Object(fields) = json!({
        "name": "Meera",
        "age": 41.5,
        "address": "",
        "phoneNumber": "",
        "job": "",
        "reference": "",
        "status": "Discharged"
    }) else {
        unreachable!()
    };
    let store = access.connection().store().unwrap();
    store.insert("patients", "legacy-1", fields).await.unwrap();

    let patients = access.get_all::<Patient>().await.unwrap();
    assert_eq!(patients.len(), 2);
    let meera = access.get_by_id::<Patient>("legacy-1").await.unwrap().unwrap();
    assert_eq!(meera.age, 41.5);
    assert_eq!(meera.status.as_str(), "Discharged");
}

#[tokio::test]
async fn test_invalid_field_name_is_read_failure() {
    let access = create_access();
    let err = access
        .query::<Patient>([where_eq("name') OR 1=1 --", "x")])
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::ReadFailure { .. }));
}

// ============================================================================
// Connection Tests
// ============================================================================

#[tokio::test]
async fn test_unconfigured_connection() {
    let connection = StoreConnection::from_config(&StoreConfig::default()).unwrap();
    assert!(!connection.is_connected());

    let access = DocumentAccess::new(connection);
    let err = access.create(&patient("Asha", 31.0)).await.unwrap_err();
    assert!(err.is_unavailable());
    assert!(err.to_string().contains("patients"));

    let err = access.paginate::<Patient>(10, None).await.unwrap_err();
    assert!(err.is_unavailable());
}

#[tokio::test]
async fn test_file_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("clinic.db").display());
    let config = StoreConfig::new(url, "sadhak-test");

    let id = {
        let access = DocumentAccess::new(StoreConnection::from_config(&config).unwrap());
        access.create(&patient("Rajesh Kumar", 45.0)).await.unwrap()
    };

    let access = DocumentAccess::new(StoreConnection::from_config(&config).unwrap());
    let stored = access.get_by_id::<Patient>(&id).await.unwrap().unwrap();
    assert_eq!(stored.name, "Rajesh Kumar");
    assert_eq!(access.count::<Patient>().await.unwrap(), 1);
}

#[tokio::test]
async fn test_probe_against_store() {
    let access = create_access();
    access.create(&patient("Asha", 31.0)).await.unwrap();

    let report = access.probe().await.unwrap();
    assert!(report.can_write);
    assert!(report.can_read);
    assert_eq!(report.documents_found, 1);
    assert_eq!(access.count::<Patient>().await.unwrap(), 1);
}
