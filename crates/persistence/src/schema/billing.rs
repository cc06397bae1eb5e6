//! Payments.

// Entity fields are named after their wire keys
#![allow(missing_docs)]

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Collection, Entity};

/// A bill for one visit, with the amount paid against it.
///
/// `total_amount` and `balance_amount` are derived: the total is the sum of
/// the five charge components and the balance is total minus paid. They are
/// recomputed by the access layer on create and on any update touching a
/// component or `paid_amount`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub patient_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appointment_id: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub consulting_fee: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub medicine_charges: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub procedure_charges: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub panchakarma_charges: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub extra_charges: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub paid_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub balance_amount: Decimal,
    pub date: String,
}

impl Payment {
    /// Builds a payment with every amount at zero.
    pub fn new(patient_id: impl Into<String>, date: impl Into<String>) -> Self {
        Payment {
            patient_id: patient_id.into(),
            appointment_id: None,
            consulting_fee: Decimal::ZERO,
            medicine_charges: Decimal::ZERO,
            procedure_charges: Decimal::ZERO,
            panchakarma_charges: Decimal::ZERO,
            extra_charges: Decimal::ZERO,
            total_amount: Decimal::ZERO,
            paid_amount: Decimal::ZERO,
            balance_amount: Decimal::ZERO,
            date: date.into(),
        }
    }

    /// Sum of the charge components.
    pub fn charges_total(&self) -> Decimal {
        self.consulting_fee
            + self.medicine_charges
            + self.procedure_charges
            + self.panchakarma_charges
            + self.extra_charges
    }
}

/// Partial update of a [`Payment`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appointment_id: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float_option", skip_serializing_if = "Option::is_none")]
    pub consulting_fee: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::float_option", skip_serializing_if = "Option::is_none")]
    pub medicine_charges: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::float_option", skip_serializing_if = "Option::is_none")]
    pub procedure_charges: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::float_option", skip_serializing_if = "Option::is_none")]
    pub panchakarma_charges: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::float_option", skip_serializing_if = "Option::is_none")]
    pub extra_charges: Option<Decimal>,
    /// Overwritten by the derivation; accepted for wire compatibility.
    #[serde(default, with = "rust_decimal::serde::float_option", skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::float_option", skip_serializing_if = "Option::is_none")]
    pub paid_amount: Option<Decimal>,
    /// Overwritten by the derivation; accepted for wire compatibility.
    #[serde(default, with = "rust_decimal::serde::float_option", skip_serializing_if = "Option::is_none")]
    pub balance_amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl Entity for Payment {
    const COLLECTION: Collection = Collection::Payments;
    const DERIVED_INPUTS: &'static [&'static str] = &[
        "consultingFee",
        "medicineCharges",
        "procedureCharges",
        "panchakarmaCharges",
        "extraCharges",
        "paidAmount",
    ];
    const DERIVED_OUTPUTS: &'static [&'static str] = &["totalAmount", "balanceAmount"];
    type Patch = PaymentPatch;

    fn derive(&mut self) {
        self.total_amount = self.charges_total();
        self.balance_amount = self.total_amount - self.paid_amount;
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn dec(value: i64) -> Decimal {
        Decimal::from(value)
    }

    #[test]
    fn test_derive_totals() {
        let mut payment = Payment::new("p1", "2025-01-20");
        payment.consulting_fee = dec(300);
        payment.medicine_charges = dec(250);
        payment.extra_charges = dec(150);
        payment.paid_amount = dec(600);
        payment.derive();

        assert_eq!(payment.total_amount, dec(700));
        assert_eq!(payment.balance_amount, dec(100));
    }

    #[test]
    fn test_amounts_are_json_numbers() {
        let mut payment = Payment::new("p1", "2025-01-20");
        payment.consulting_fee = Decimal::new(50050, 2);
        payment.derive();
        let value = serde_json::to_value(&payment).unwrap();
        assert_eq!(value["consultingFee"], json!(500.5));
        assert_eq!(value["totalAmount"], json!(500.5));
        assert!(value.get("appointmentId").is_none());
    }

    #[test]
    fn test_patch_skips_unset_amounts() {
        let patch = PaymentPatch {
            paid_amount: Some(dec(200)),
            ..Default::default()
        };
        let value = serde_json::to_value(&patch).unwrap();
        assert_eq!(value, json!({ "paidAmount": 200.0 }));
    }

    #[test]
    fn test_decodes_integer_amounts() {
        let payment: Payment = serde_json::from_value(json!({
            "patientId": "p1",
            "consultingFee": 500,
            "medicineCharges": 0,
            "procedureCharges": 0,
            "panchakarmaCharges": 0,
            "extraCharges": 0,
            "totalAmount": 500,
            "paidAmount": 500,
            "balanceAmount": 0,
            "date": "2025-01-20"
        }))
        .unwrap();
        assert_eq!(payment.total_amount, dec(500));
    }
}
