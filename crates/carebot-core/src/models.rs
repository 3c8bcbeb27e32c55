//! Serde models for entities returned by the DBOps backend.
//!
//! These are read-only mirrors: CareBot never invents identifiers, it only
//! echoes what the backend hands out. The backend mixes snake_case and
//! camelCase across endpoints, so fields carry aliases where both spellings
//! have been observed. Unknown fields are ignored throughout.

use serde::{Deserialize, Serialize};

/// A clinic staff member from `GET /doctors`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: String,
    #[serde(default, alias = "firstName")]
    pub first_name: String,
    #[serde(default, alias = "lastName")]
    pub last_name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub languages_spoken: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialties: Option<serde_json::Value>,
}

impl Doctor {
    /// "First Last", the form name resolution matches against.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// One availability slot from `GET /doctors/{id}/availability`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilitySlot {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub doctor_id: String,
    /// String or integer depending on backend version.
    #[serde(default)]
    pub day_of_week: serde_json::Value,
    #[serde(default)]
    pub start_time: String,
    #[serde(default)]
    pub end_time: String,
    #[serde(default)]
    pub is_available: bool,
}

/// A patient record from `GET /patients` or `GET /patients/by-phone/{phone}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    #[serde(default)]
    pub id: String,
    #[serde(default, alias = "firstName")]
    pub first_name: String,
    #[serde(default, alias = "lastName")]
    pub last_name: String,
    #[serde(default, alias = "dateOfBirth", skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    #[serde(default, alias = "phoneNumber", skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reliability_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insurance_provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medical_history: Option<String>,
    #[serde(default)]
    pub allergies: Vec<String>,
}

impl Patient {
    /// "First Last", the form name resolution matches against.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// An appointment from `GET /appointments` or
/// `GET /patients/{id}/appointments`. Never cached locally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clinic_id: Option<String>,
    #[serde(default)]
    pub patient_id: String,
    #[serde(default)]
    pub doctor_id: String,
    /// Zero-padded `YYYY-MM-DD`; lexicographic order is chronological.
    #[serde(default)]
    pub appointment_date: String,
    /// Zero-padded `HH:MM`.
    #[serde(default)]
    pub start_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A clinic from `GET /clinics`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Clinic {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// A medication record from `GET /patients/{id}/medications`.
///
/// This endpoint family speaks camelCase.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Medication {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub medication_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dosage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<String>,
}
