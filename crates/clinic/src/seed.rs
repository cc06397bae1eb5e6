//! Demo clinic data.

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;

use sadhak_persistence::schema::{
    Appointment, AppointmentStatus, FollowUp, FollowUpStatus, Medicine, Patient, PatientStatus,
    Payment, Treatment, UserProfile,
};
use sadhak_persistence::{DocumentAccess, StorageResult};

/// Identifiers of the documents created by [`seed_demo_data`], in creation
/// order.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeededIds {
    /// Rajesh Kumar, Priya Sharma, Amit Patel, Lakshmi Reddy.
    pub patients: Vec<String>,
    /// One per patient, on 2025-01-16.
    pub appointments: Vec<String>,
    /// Two for Rajesh Kumar, one for Amit Patel.
    pub follow_ups: Vec<String>,
    /// Two for Rajesh Kumar, one for Amit Patel.
    pub payments: Vec<String>,
    /// Two of the four are low on stock.
    pub medicines: Vec<String>,
    /// Panchakarma and herbal treatments.
    pub treatments: Vec<String>,
    /// Staff profiles.
    pub users: Vec<String>,
}

fn patient(name: &str, age: f64, condition: &str, last_visit: &str, status: PatientStatus) -> Patient {
    Patient {
        name: name.to_string(),
        age,
        dob: None,
        address: "Pune".to_string(),
        phone_number: String::new(),
        job: String::new(),
        reference: "Demo".to_string(),
        symptoms: None,
        treatment_plan: None,
        last_visit: Some(last_visit.to_string()),
        next_appointment_date: None,
        status,
        nadi_parikshan: None,
        condition: Some(condition.to_string()),
        ho: None,
        treatment: None,
        parikshan: None,
    }
}

fn payment(patient_id: &str, date: &str, charges: [i64; 3], paid: i64) -> Payment {
    let [consulting, medicine, procedure] = charges.map(Decimal::from);
    let mut payment = Payment::new(patient_id, date);
    payment.consulting_fee = consulting;
    payment.medicine_charges = medicine;
    payment.procedure_charges = procedure;
    payment.paid_amount = Decimal::from(paid);
    payment
}

/// Creates a small demo clinic.
///
/// Every call adds a fresh copy; nothing already stored is touched.
pub async fn seed_demo_data(access: &DocumentAccess) -> StorageResult<SeededIds> {
    let mut ids = SeededIds::default();

    let patients = [
        ("Rajesh Kumar", 45.0, "Joint Pain", "2025-01-15", PatientStatus::Active),
        ("Priya Sharma", 32.0, "Digestive Issues", "2025-01-14", PatientStatus::Active),
        ("Amit Patel", 58.0, "Hypertension", "2025-01-13", PatientStatus::FollowUp),
        ("Lakshmi Reddy", 28.0, "Stress & Anxiety", "2025-01-12", PatientStatus::Active),
    ];
    let mut names = Vec::new();
    for (name, age, condition, last_visit, status) in patients {
        let id = access
            .create(&patient(name, age, condition, last_visit, status))
            .await?;
        ids.patients.push(id);
        names.push(name);
    }

    let appointments = [
        ("09:00 AM", "Initial Consultation", "45 min", AppointmentStatus::Completed),
        ("10:00 AM", "Follow-up", "30 min", AppointmentStatus::Scheduled),
        ("11:30 AM", "Panchakarma Session", "60 min", AppointmentStatus::Scheduled),
        ("02:00 PM", "Consultation", "45 min", AppointmentStatus::Scheduled),
    ];
    for (i, (time, kind, duration, status)) in appointments.into_iter().enumerate() {
        let appointment = Appointment {
            date: "2025-01-16".to_string(),
            time: time.to_string(),
            patient_id: ids.patients[i].clone(),
            patient_name: names[i].to_string(),
            kind: kind.to_string(),
            duration: duration.to_string(),
            status: Some(status),
        };
        ids.appointments.push(access.create(&appointment).await?);
    }

    let follow_ups = [
        (0, "2025-01-08", "Knee stiffness", "Started Abhyanga", FollowUpStatus::Completed),
        (0, "2025-01-15", "Knee stiffness", "Reduced stiffness, continue twice weekly", FollowUpStatus::Completed),
        (2, "2025-01-20", "Blood pressure review", "", FollowUpStatus::Pending),
    ];
    for (patient, date, reason, notes, status) in follow_ups {
        let follow_up = FollowUp {
            patient_id: ids.patients[patient].clone(),
            date: date.to_string(),
            time: None,
            reason: reason.to_string(),
            notes: notes.to_string(),
            status,
        };
        ids.follow_ups.push(access.create(&follow_up).await?);
    }

    let payments = [
        payment(&ids.patients[0], "2025-01-08", [500, 250, 0], 750),
        payment(&ids.patients[0], "2025-01-15", [0, 0, 1200], 1000),
        payment(&ids.patients[2], "2025-01-13", [500, 0, 0], 0),
    ];
    for payment in &payments {
        ids.payments.push(access.create(payment).await?);
    }

    let medicines = [
        Medicine::new("Ashwagandha Churna", "Rasayana", 45, "₹250"),
        Medicine::new("Triphala Powder", "Digestive", 12, "₹180"),
        Medicine::new("Brahmi Oil", "Neural", 28, "₹320"),
        Medicine::new("Chyawanprash", "Immunity", 8, "₹450"),
    ];
    for medicine in &medicines {
        ids.medicines.push(access.create(medicine).await?);
    }

    let treatments = [
        ("Abhyanga", "Full body oil massage therapy", "60 min", "Panchakarma"),
        ("Shirodhara", "Continuous oil pouring on forehead", "45 min", "Panchakarma"),
        ("Rasayana Therapy", "Rejuvenation treatment with herbs", "90 min", "Herbal"),
    ];
    for (name, description, duration, category) in treatments {
        let treatment = Treatment {
            name: name.to_string(),
            description: description.to_string(),
            duration: duration.to_string(),
            category: category.to_string(),
        };
        ids.treatments.push(access.create(&treatment).await?);
    }

    for n in 1..=3 {
        let user = UserProfile {
            email: format!("user{n}@sadhak.com"),
            name: Some(format!("Test User {n}")),
            email_verified: false,
        };
        ids.users.push(access.create(&user).await?);
    }

    info!(
        patients = ids.patients.len(),
        appointments = ids.appointments.len(),
        payments = ids.payments.len(),
        medicines = ids.medicines.len(),
        "Seeded demo clinic"
    );
    Ok(ids)
}
