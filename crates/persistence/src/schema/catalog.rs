//! Medicine inventory and the treatment catalog.

// Entity fields are named after their wire keys
#![allow(missing_docs)]

use serde::{Deserialize, Serialize};

use super::{Collection, Entity};

/// Stock level below which a medicine is flagged for reordering.
pub const LOW_STOCK_THRESHOLD: i64 = 15;

/// An inventory item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Medicine {
    pub name: String,
    pub category: String,
    pub stock: i64,
    /// Derived from `stock`.
    pub low_stock: bool,
    /// Display price, e.g. `"₹250"`. Not parsed.
    pub price: String,
}

impl Medicine {
    /// Builds a medicine with the low-stock flag computed.
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        stock: i64,
        price: impl Into<String>,
    ) -> Self {
        let mut medicine = Medicine {
            name: name.into(),
            category: category.into(),
            stock,
            low_stock: false,
            price: price.into(),
        };
        medicine.derive();
        medicine
    }
}

/// Partial update of a [`Medicine`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicinePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub low_stock: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
}

impl Entity for Medicine {
    const COLLECTION: Collection = Collection::Medicines;
    const DERIVED_INPUTS: &'static [&'static str] = &["stock"];
    const DERIVED_OUTPUTS: &'static [&'static str] = &["lowStock"];
    type Patch = MedicinePatch;

    fn derive(&mut self) {
        self.low_stock = self.stock < LOW_STOCK_THRESHOLD;
    }
}

/// A therapy offered by the practice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Treatment {
    pub name: String,
    pub description: String,
    pub duration: String,
    pub category: String,
}

/// Partial update of a [`Treatment`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreatmentPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Entity for Treatment {
    const COLLECTION: Collection = Collection::Treatments;
    type Patch = TreatmentPatch;
}
