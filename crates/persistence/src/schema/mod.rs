//! The clinic's domain schema.
//!
//! Every entity maps to exactly one named [`Collection`]. Payloads never carry
//! the document identifier or timestamps; reads return them wrapped in
//! [`Stored`].
//!
//! | Entity | Collection |
//! |---|---|
//! | [`Patient`] | `patients` |
//! | [`UserProfile`] | `users` |
//! | [`Appointment`] | `appointments` |
//! | [`FollowUp`] | `followUps` |
//! | [`Payment`] | `payments` |
//! | [`Medicine`] | `medicines` |
//! | [`Treatment`] | `treatments` |

mod billing;
mod catalog;
mod collection;
mod entity;
mod patient;
mod scheduling;
pub mod timestamp;
mod user;

pub use billing::{Payment, PaymentPatch};
pub use catalog::{LOW_STOCK_THRESHOLD, Medicine, MedicinePatch, Treatment, TreatmentPatch};
pub use collection::{Collection, UnknownCollection};
pub use entity::{CREATED_AT, Entity, FieldMap, ID, Stored, UPDATED_AT, to_field_map};
pub use patient::{Patient, PatientPatch, PatientStatus};
pub use scheduling::{
    Appointment, AppointmentPatch, AppointmentStatus, FollowUp, FollowUpPatch, FollowUpStatus,
};
pub use user::{UserProfile, UserProfilePatch};
