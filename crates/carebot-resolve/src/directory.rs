//! Name and phone resolution over cached entity listings.

use crate::cache::ListingCache;
use crate::phone::phone_candidates;
use carebot_core::{Appointment, CacheConfig, Clinic, Doctor, Medication, Patient};
use carebot_dbops::{DbOpsClient, DbOpsError};
use std::sync::Arc;

/// Resolvers from human-supplied identifiers to backend identifiers.
///
/// Owns the listing caches and is handed to handlers by reference; there are
/// no module-level cache globals. Lookups are best-effort: any transport
/// failure during resolution is logged and reported as not-found.
pub struct EntityDirectory {
    client: Arc<DbOpsClient>,
    doctors: ListingCache<Doctor>,
    patients: ListingCache<Patient>,
    clinics: ListingCache<Clinic>,
}

impl EntityDirectory {
    /// Create a directory over `client` with the configured cache TTLs.
    pub fn new(client: Arc<DbOpsClient>, cache: &CacheConfig) -> Self {
        Self {
            client,
            doctors: ListingCache::new(cache.doctors_ttl()),
            patients: ListingCache::new(cache.patients_ttl()),
            clinics: ListingCache::new(cache.clinics_ttl()),
        }
    }

    /// The underlying backend client.
    pub fn client(&self) -> &Arc<DbOpsClient> {
        &self.client
    }

    /// The staff registry, served from cache within its TTL.
    pub async fn doctors(&self) -> Result<Arc<Vec<Doctor>>, DbOpsError> {
        let client = Arc::clone(&self.client);
        self.doctors
            .get_or_fetch(|| async move {
                let raw = client.get("/doctors", None).await?;
                serde_json::from_value(raw).map_err(DbOpsError::Decode)
            })
            .await
    }

    /// The patient registry, served from cache within its TTL.
    pub async fn patients(&self) -> Result<Arc<Vec<Patient>>, DbOpsError> {
        let client = Arc::clone(&self.client);
        self.patients
            .get_or_fetch(|| async move {
                let raw = client.get("/patients", None).await?;
                serde_json::from_value(raw).map_err(DbOpsError::Decode)
            })
            .await
    }

    /// The clinic listing, served from cache within its TTL.
    pub async fn clinics(&self) -> Result<Arc<Vec<Clinic>>, DbOpsError> {
        let client = Arc::clone(&self.client);
        self.clinics
            .get_or_fetch(|| async move {
                let raw = client.get("/clinics", None).await?;
                serde_json::from_value(raw).map_err(DbOpsError::Decode)
            })
            .await
    }

    /// Drop the patient snapshot. Call after any write that changes the
    /// patient registry (registration, profile updates).
    pub async fn invalidate_patients(&self) {
        self.patients.invalidate().await;
    }

    /// Drop the staff snapshot.
    pub async fn invalidate_doctors(&self) {
        self.doctors.invalidate().await;
    }

    /// Translate "Dr. Smith" (or any name fragment) into a doctor id.
    ///
    /// The query is lowercased, "dr." honorifics are removed, and the result
    /// must be a substring of a registry member's lowercased "first last"
    /// name. First match in listing order wins.
    pub async fn resolve_doctor_id(&self, name: &str) -> Option<String> {
        let doctors = match self.doctors().await {
            Ok(doctors) => doctors,
            Err(err) => {
                tracing::warn!(%err, "doctor registry fetch failed during resolution");
                return None;
            }
        };

        let needle = name.to_lowercase().replace("dr.", "").trim().to_string();
        doctors
            .iter()
            .find(|d| d.full_name().to_lowercase().contains(&needle))
            .map(|d| d.id.clone())
    }

    /// Translate a patient name (or fragment) into a patient id.
    ///
    /// Same substring rule as doctors, minus the honorific handling.
    pub async fn resolve_patient_id(&self, name: &str) -> Option<String> {
        let patients = match self.patients().await {
            Ok(patients) => patients,
            Err(err) => {
                tracing::warn!(%err, "patient registry fetch failed during resolution");
                return None;
            }
        };

        let needle = name.to_lowercase().trim().to_string();
        patients
            .iter()
            .find(|p| p.full_name().to_lowercase().contains(&needle))
            .map(|p| p.id.clone())
    }

    /// Look a patient up by phone number, trying format variations in order.
    ///
    /// Each candidate is probed against `GET /patients/by-phone/{candidate}`;
    /// the first one that yields a record with a non-empty id wins.
    /// Per-candidate failures, transport errors included, are swallowed and
    /// logged: a flaky lookup must not fail the surrounding workflow.
    pub async fn resolve_patient_by_phone(&self, phone: &str) -> Option<Patient> {
        for candidate in phone_candidates(phone) {
            let path = format!("/patients/by-phone/{candidate}");
            match self.client.get(&path, None).await {
                Ok(value) => {
                    if let Ok(patient) = serde_json::from_value::<Patient>(value) {
                        if !patient.id.is_empty() {
                            return Some(patient);
                        }
                    }
                }
                Err(err) => {
                    tracing::debug!(candidate = %candidate, %err, "phone candidate lookup failed");
                }
            }
        }
        None
    }

    /// The most recent appointment id for a patient, by descending
    /// (date, start time). Appointments are never cached, always fetched.
    ///
    /// Dates and times arrive zero-padded (`YYYY-MM-DD`, `HH:MM`), so the
    /// string comparison is chronological.
    pub async fn last_appointment_id(&self, patient_id: &str) -> Option<String> {
        let path = format!("/patients/{patient_id}/appointments");
        let raw = match self.client.get(&path, None).await {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!(%err, patient_id, "appointment fetch failed during enrichment");
                return None;
            }
        };

        let mut appointments: Vec<Appointment> = serde_json::from_value(raw).ok()?;
        appointments.sort_by(|a, b| {
            (b.appointment_date.as_str(), b.start_time.as_str())
                .cmp(&(a.appointment_date.as_str(), a.start_time.as_str()))
        });
        appointments.into_iter().next().map(|a| a.id)
    }

    /// Find a patient's medication id by (substring) name, for commands like
    /// "refill Metformin" where the agent has no id.
    pub async fn resolve_medication_id(&self, patient_id: &str, med_name: &str) -> Option<String> {
        let path = format!("/patients/{patient_id}/medications");
        let raw = match self.client.get(&path, None).await {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!(%err, patient_id, "medication fetch failed during enrichment");
                return None;
            }
        };

        let medications: Vec<Medication> = serde_json::from_value(raw).ok()?;
        let needle = med_name.to_lowercase().trim().to_string();
        medications
            .iter()
            .find(|m| m.medication_name.to_lowercase().contains(&needle))
            .map(|m| m.id.clone())
    }

    /// The first clinic in the network, used when a booking does not name one.
    pub async fn default_clinic_id(&self) -> Option<String> {
        match self.clinics().await {
            Ok(clinics) => clinics.first().map(|c| c.id.clone()),
            Err(err) => {
                tracing::warn!(%err, "clinic fetch failed during enrichment");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_directory(server: &mockito::ServerGuard) -> EntityDirectory {
        let client = Arc::new(DbOpsClient::new(server.url(), Some("t".to_string())).unwrap());
        EntityDirectory::new(client, &CacheConfig::default())
    }

    fn doctors_body() -> String {
        json!([
            {"id": "doc-1", "first_name": "John", "last_name": "Smith", "title": "Dentist", "languages_spoken": ["en"]},
            {"id": "doc-2", "first_name": "Aisha", "last_name": "Smithson", "title": "Orthodontist", "languages_spoken": ["ar"]}
        ])
        .to_string()
    }

    #[tokio::test]
    async fn partial_name_matches_by_substring() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/doctors")
            .with_body(doctors_body())
            .create_async()
            .await;

        let directory = test_directory(&server);
        assert_eq!(
            directory.resolve_doctor_id("Smith").await.as_deref(),
            Some("doc-1")
        );
    }

    #[tokio::test]
    async fn honorific_prefix_is_stripped() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/doctors")
            .with_body(doctors_body())
            .create_async()
            .await;

        let directory = test_directory(&server);
        assert_eq!(
            directory.resolve_doctor_id("Dr. Smith").await.as_deref(),
            Some("doc-1")
        );
    }

    #[tokio::test]
    async fn unknown_name_is_not_found() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/doctors")
            .with_body(doctors_body())
            .create_async()
            .await;

        let directory = test_directory(&server);
        assert!(directory.resolve_doctor_id("Zzz").await.is_none());
    }

    #[tokio::test]
    async fn repeated_resolution_fetches_the_registry_once() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/doctors")
            .with_body(doctors_body())
            .expect(1)
            .create_async()
            .await;

        let directory = test_directory(&server);
        directory.resolve_doctor_id("Smith").await;
        directory.resolve_doctor_id("Smithson").await;
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn patient_invalidation_forces_refetch() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/patients")
            .with_body(json!([{"id": "p-1", "first_name": "John", "last_name": "Doe"}]).to_string())
            .expect(2)
            .create_async()
            .await;

        let directory = test_directory(&server);
        directory.resolve_patient_id("John").await;
        directory.invalidate_patients().await;
        directory.resolve_patient_id("John").await;
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn registry_fetch_failure_resolves_to_not_found() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/doctors")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let directory = test_directory(&server);
        assert!(directory.resolve_doctor_id("Smith").await.is_none());
    }

    #[tokio::test]
    async fn phone_lookup_tries_variations_until_one_matches() {
        let mut server = mockito::Server::new_async().await;
        // The first three candidates miss; the zero-stripped form hits.
        server
            .mock("GET", "/patients/by-phone/0509998888")
            .with_status(404)
            .expect(2) // raw input and digits-only form are identical here
            .create_async()
            .await;
        server
            .mock("GET", "/patients/by-phone/+0509998888")
            .with_status(404)
            .create_async()
            .await;
        server
            .mock("GET", "/patients/by-phone/509998888")
            .with_body(json!({"id": "p-7", "first_name": "Omar", "last_name": "Hadid"}).to_string())
            .create_async()
            .await;

        let directory = test_directory(&server);
        let patient = directory.resolve_patient_by_phone("0509998888").await.unwrap();
        assert_eq!(patient.id, "p-7");
    }

    #[tokio::test]
    async fn phone_lookup_swallows_every_failure_and_reports_not_found() {
        let mut server = mockito::Server::new_async().await;
        // No mocks registered: every candidate 501s (mockito's default for
        // unmatched requests). The resolver must come back empty, not error.
        let directory = test_directory(&server);
        assert!(directory.resolve_patient_by_phone("0509998888").await.is_none());
        drop(server);
    }

    #[tokio::test]
    async fn record_without_id_is_not_a_match() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", mockito::Matcher::Regex("^/patients/by-phone/.*".to_string()))
            .with_body(json!({"first_name": "ghost"}).to_string())
            .create_async()
            .await;

        let directory = test_directory(&server);
        assert!(directory.resolve_patient_by_phone("12345").await.is_none());
    }

    #[tokio::test]
    async fn last_appointment_picks_latest_date_and_time() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/patients/p-1/appointments")
            .with_body(
                json!([
                    {"id": "a-jan", "appointment_date": "2025-01-10", "start_time": "09:00", "status": "completed"},
                    {"id": "a-mar", "appointment_date": "2025-03-01", "start_time": "14:00", "status": "completed"},
                    {"id": "a-feb", "appointment_date": "2025-02-15", "start_time": "08:00", "status": "completed"}
                ])
                .to_string(),
            )
            .create_async()
            .await;

        let directory = test_directory(&server);
        assert_eq!(
            directory.last_appointment_id("p-1").await.as_deref(),
            Some("a-mar")
        );
    }

    #[tokio::test]
    async fn last_appointment_of_empty_history_is_not_found() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/patients/p-1/appointments")
            .with_body("[]")
            .create_async()
            .await;

        let directory = test_directory(&server);
        assert!(directory.last_appointment_id("p-1").await.is_none());
    }

    #[tokio::test]
    async fn medication_resolves_by_substring_name() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/patients/p-1/medications")
            .with_body(
                json!([
                    {"id": "m-1", "medicationName": "Amoxicillin", "status": "active"},
                    {"id": "m-2", "medicationName": "Metformin 500mg", "status": "active"}
                ])
                .to_string(),
            )
            .create_async()
            .await;

        let directory = test_directory(&server);
        assert_eq!(
            directory.resolve_medication_id("p-1", "metformin").await.as_deref(),
            Some("m-2")
        );
    }

    #[tokio::test]
    async fn default_clinic_is_the_first_listed() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/clinics")
            .with_body(json!([{"id": "c-1", "name": "Downtown"}, {"id": "c-2", "name": "Marina"}]).to_string())
            .create_async()
            .await;

        let directory = test_directory(&server);
        assert_eq!(directory.default_clinic_id().await.as_deref(), Some("c-1"));
    }
}
