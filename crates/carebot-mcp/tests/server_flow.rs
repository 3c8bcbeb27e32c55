//! End-to-end flows against a mock DBOps backend.
//!
//! These tests drive the server through the same JSON-RPC surface an agent
//! uses, with mockito standing in for the backend.

use carebot_core::{CacheConfig, McpConfig};
use carebot_dbops::DbOpsClient;
use carebot_mcp::{JsonRpcRequest, McpServer, ToolContext, build_registry};
use serde_json::{Value, json};
use std::sync::Arc;

fn server_over(backend: &mockito::ServerGuard) -> McpServer {
    let client = Arc::new(DbOpsClient::new(backend.url(), Some("test-token".to_string())).unwrap());
    let ctx = Arc::new(ToolContext::new(client, &CacheConfig::default()));
    McpServer::new(McpConfig::default(), build_registry(&ctx))
}

fn request(method: &str, params: Value) -> JsonRpcRequest {
    JsonRpcRequest {
        jsonrpc: "2.0".to_string(),
        id: Some(json!(1)),
        method: method.to_string(),
        params: Some(params),
    }
}

async fn call_tool(server: &McpServer, name: &str, arguments: Value) -> String {
    let response = server
        .handle_request(request(
            "tools/call",
            json!({"name": name, "arguments": arguments}),
        ))
        .await;
    response.result.expect("tool call must succeed")["content"][0]["text"]
        .as_str()
        .expect("tool content must be text")
        .to_string()
}

async fn read_resource(server: &McpServer, uri: &str) -> String {
    let response = server
        .handle_request(request("resources/read", json!({"uri": uri})))
        .await;
    response.result.expect("resource read must succeed")["contents"][0]["text"]
        .as_str()
        .expect("resource content must be text")
        .to_string()
}

#[tokio::test]
async fn doctors_resource_and_tool_share_the_cached_listing() {
    let mut backend = mockito::Server::new_async().await;
    let listing = backend
        .mock("GET", "/doctors")
        .match_header("authorization", "Bearer test-token")
        .with_body(
            json!([
                {"id": "doc-1", "first_name": "John", "last_name": "Smith",
                 "title": "Dentist", "languages_spoken": ["en"]}
            ])
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let server = server_over(&backend);

    let resource_text = read_resource(&server, "doctors://list").await;
    let tool_text = call_tool(&server, "get_doctors", json!({})).await;

    assert!(resource_text.contains("John Smith (Dentist)"));
    assert_eq!(resource_text, tool_text);
    // Two reads within the TTL window, exactly one backend fetch.
    listing.assert_async().await;
}

#[tokio::test]
async fn availability_resource_resolves_the_doctor_from_the_uri() {
    let mut backend = mockito::Server::new_async().await;
    backend
        .mock("GET", "/doctors")
        .with_body(
            json!([{"id": "doc-1", "first_name": "John", "last_name": "Smith"}]).to_string(),
        )
        .create_async()
        .await;
    backend
        .mock("GET", "/doctors/doc-1/availability")
        .match_query(mockito::Matcher::UrlEncoded(
            "date".into(),
            "2025-12-25".into(),
        ))
        .with_body(
            json!([
                {"id": "s-1", "doctor_id": "doc-1", "day_of_week": "thursday",
                 "start_time": "09:00", "end_time": "09:30", "is_available": true}
            ])
            .to_string(),
        )
        .create_async()
        .await;

    let server = server_over(&backend);
    let text = read_resource(&server, "doctors://availability/Dr. Smith/2025-12-25").await;

    assert!(text.contains("Availability for Dr. Smith on 2025-12-25"));
    assert!(text.contains("09:00 - 09:30: Available"));
}

#[tokio::test]
async fn booking_aborts_without_touching_the_write_endpoint() {
    let mut backend = mockito::Server::new_async().await;
    backend
        .mock("GET", "/doctors")
        .with_body(
            json!([{"id": "doc-1", "first_name": "John", "last_name": "Smith"}]).to_string(),
        )
        .create_async()
        .await;
    backend
        .mock("GET", "/patients")
        .with_body("[]")
        .create_async()
        .await;
    let write = backend
        .mock("POST", "/appointments")
        .expect(0)
        .create_async()
        .await;

    let server = server_over(&backend);
    let text = call_tool(
        &server,
        "book_appointment",
        json!({
            "patient_name": "Nobody",
            "doctor_name": "Dr. Smith",
            "date": "2025-12-25",
            "start_time": "10:00",
            "end_time": "10:30"
        }),
    )
    .await;

    // The failed identifier is named and nothing was written.
    assert!(text.contains("patient 'Nobody'"));
    write.assert_async().await;
}

#[tokio::test]
async fn booking_happy_path_confirms_in_text() {
    let mut backend = mockito::Server::new_async().await;
    backend
        .mock("GET", "/doctors")
        .with_body(
            json!([{"id": "doc-1", "first_name": "John", "last_name": "Smith"}]).to_string(),
        )
        .create_async()
        .await;
    backend
        .mock("GET", "/patients")
        .with_body(json!([{"id": "p-1", "first_name": "Jane", "last_name": "Doe"}]).to_string())
        .create_async()
        .await;
    backend
        .mock("GET", "/clinics")
        .with_body(json!([{"id": "c-1", "name": "Downtown"}]).to_string())
        .create_async()
        .await;
    let write = backend
        .mock("POST", "/appointments")
        .with_body(json!({"id": "a-1"}).to_string())
        .expect(1)
        .create_async()
        .await;

    let server = server_over(&backend);
    let text = call_tool(
        &server,
        "book_appointment",
        json!({
            "patient_name": "Jane",
            "doctor_name": "Smith",
            "date": "2025-12-25",
            "start_time": "10:00",
            "end_time": "10:30",
            "notes": "first visit"
        }),
    )
    .await;

    assert!(text.contains("Appointment confirmed for Jane with Smith on 2025-12-25 at 10:00."));
    write.assert_async().await;
}

#[tokio::test]
async fn phone_resolution_survives_a_backend_with_no_matches() {
    let backend = mockito::Server::new_async().await;
    // No mocks: every candidate probe fails. The tool must still answer.
    let server = server_over(&backend);
    let text = call_tool(
        &server,
        "resolve_patient_by_phone",
        json!({"phone_number": "0509998888"}),
    )
    .await;

    assert_eq!(text, "Patient not found for number: 0509998888");
}

#[tokio::test]
async fn soap_note_flow_enriches_the_appointment_id() {
    let mut backend = mockito::Server::new_async().await;
    backend
        .mock("GET", "/patients")
        .with_body(json!([{"id": "p-1", "first_name": "Jane", "last_name": "Doe"}]).to_string())
        .create_async()
        .await;
    backend
        .mock("GET", "/patients/p-1/appointments")
        .with_body(
            json!([
                {"id": "a-1", "appointment_date": "2025-01-10", "start_time": "09:00"},
                {"id": "a-2", "appointment_date": "2025-03-01", "start_time": "14:00"},
                {"id": "a-3", "appointment_date": "2025-02-15", "start_time": "08:00"}
            ])
            .to_string(),
        )
        .create_async()
        .await;
    let write = backend
        .mock("POST", "/appointments/a-2/soap-notes")
        .with_body("{}")
        .expect(1)
        .create_async()
        .await;

    let server = server_over(&backend);
    let text = call_tool(
        &server,
        "create_soap_note",
        json!({
            "patient_name": "Jane",
            "subjective": "tooth pain",
            "objective": "visible cavity",
            "assessment": "caries",
            "plan": "filling"
        }),
    )
    .await;

    assert!(text.contains("Appt: a-2"));
    write.assert_async().await;
}

#[tokio::test]
async fn patient_registration_refreshes_name_resolution() {
    let mut backend = mockito::Server::new_async().await;
    // Empty before registration, populated after: the second resolution must
    // come from a refetch, not the stale snapshot.
    let empty = backend
        .mock("GET", "/patients")
        .with_body("[]")
        .expect(1)
        .create_async()
        .await;
    backend
        .mock("POST", "/patients")
        .with_body(json!({"id": "p-1"}).to_string())
        .create_async()
        .await;

    let server = server_over(&backend);

    let miss = read_resource(&server, "patients://summary/Nora").await;
    assert!(miss.contains("'Nora' not found"));

    call_tool(
        &server,
        "create_patient_tool",
        json!({
            "first_name": "Nora", "last_name": "Aziz", "email": "nora@example.com",
            "phone": "0501112222", "dob": "1990-04-01"
        }),
    )
    .await;

    empty.assert_async().await;

    let populated = backend
        .mock("GET", "/patients")
        .with_body(json!([{"id": "p-1", "first_name": "Nora", "last_name": "Aziz"}]).to_string())
        .create_async()
        .await;

    let summary_backend = backend
        .mock("GET", "/patients/p-1")
        .with_body(
            json!({"id": "p-1", "first_name": "Nora", "last_name": "Aziz",
                   "reliability_score": 0.9, "allergies": []})
            .to_string(),
        )
        .create_async()
        .await;

    let server2_text = read_resource(&server, "patients://summary/Nora").await;
    assert!(server2_text.contains("Patient: Nora Aziz"));
    populated.assert_async().await;
    summary_backend.assert_async().await;
}
