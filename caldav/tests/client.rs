// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Client integration tests with wiremock.

use tinycal_caldav::{AuthMethod, CalDavClient, CalDavConfig, CalDavError};
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
#[ignore = "require network"]
async fn client_test_connection() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PROPFIND"))
        .and(path("/dav/"))
        .and(header("Depth", "0"))
        .and(header("Authorization", "Basic YWxpY2U6c2VjcmV0"))
        .respond_with(ResponseTemplate::new(207))
        .mount(&mock_server)
        .await;

    let config = CalDavConfig {
        server_url: format!("{}/dav/", mock_server.uri()),
        auth: AuthMethod::Basic {
            username: "alice".to_string(),
            password: "secret".to_string(),
        },
        ..Default::default()
    };

    let client = CalDavClient::new(config).expect("Failed to create client");
    let status = client
        .test_connection()
        .await
        .expect("Failed to connect");
    assert_eq!(status, 207);
}

#[tokio::test]
#[ignore = "require network"]
async fn client_test_connection_unauthorized() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PROPFIND"))
        .and(path("/dav/"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock_server)
        .await;

    let config = CalDavConfig {
        server_url: format!("{}/dav/", mock_server.uri()),
        ..Default::default()
    };

    let client = CalDavClient::new(config).expect("Failed to create client");
    let err = client.test_connection().await.unwrap_err();
    assert!(matches!(err, CalDavError::Auth(_)));
}

#[tokio::test]
#[ignore = "require network"]
async fn client_list_calendars_via_principal() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PROPFIND"))
        .and(path("/dav/"))
        .and(header("Depth", "1"))
        .and(header("Content-Type", "application/xml; charset=utf-8"))
        .respond_with(ResponseTemplate::new(207).set_body_raw(
            r#"<?xml version="1.0" encoding="utf-8" ?>
<D:multistatus xmlns:D="DAV:">
  <D:response>
    <D:href>/principals/alice/</D:href>
    <D:propstat>
      <D:prop>
        <D:resourcetype><D:principal/></D:resourcetype>
      </D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
</D:multistatus>"#,
            "application/xml",
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("PROPFIND"))
        .and(path("/principals/alice/"))
        .and(header("Depth", "1"))
        .respond_with(ResponseTemplate::new(207).set_body_raw(
            r#"<?xml version="1.0" encoding="utf-8" ?>
<D:multistatus xmlns:D="DAV:" xmlns:C="urn:ietf:params:xml:ns:caldav" xmlns:CS="http://calendarserver.org/ns/">
  <D:response>
    <D:href>/calendars/alice/personal/</D:href>
    <D:propstat>
      <D:prop>
        <D:displayname>Personal Calendar</D:displayname>
        <D:resourcetype>
          <D:collection/>
          <C:calendar/>
        </D:resourcetype>
        <CS:getctag>http://example.com/ns/sync/1234</CS:getctag>
      </D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
</D:multistatus>"#,
            "application/xml",
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = CalDavConfig {
        server_url: format!("{}/dav/", mock_server.uri()),
        ..Default::default()
    };

    let client = CalDavClient::new(config).expect("Failed to create client");
    let calendars = client
        .list_calendars()
        .await
        .expect("Failed to list calendars");

    assert_eq!(calendars.len(), 1);
    assert_eq!(calendars[0].name, "personal");
    assert_eq!(calendars[0].path.as_str(), "/calendars/alice/personal/");
    assert_eq!(
        calendars[0].display_name.as_deref(),
        Some("Personal Calendar")
    );
    assert_eq!(
        calendars[0].ctag.as_deref(),
        Some("http://example.com/ns/sync/1234")
    );
}

#[tokio::test]
#[ignore = "require network"]
async fn client_list_events() {
    let mock_server = MockServer::start().await;

    let body = "\
<?xml version=\"1.0\" encoding=\"utf-8\" ?>
<D:multistatus xmlns:D=\"DAV:\" xmlns:C=\"urn:ietf:params:xml:ns:caldav\">
  <D:response>
    <D:href>/calendars/alice/work/event1.ics</D:href>
    <D:propstat>
      <D:prop>
        <D:getetag>\"12345\"</D:getetag>
        <C:calendar-data>BEGIN:VCALENDAR\r
VERSION:2.0\r
BEGIN:VEVENT\r
UID:1@example.com\r
DTSTART:20250101T120000Z\r
DTEND:20250101T130000Z\r
SUMMARY:Test Event\r
LOCATION:Room 42\r
END:VEVENT\r
END:VCALENDAR\r
</C:calendar-data>
      </D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
</D:multistatus>";

    Mock::given(method("POST"))
        .and(path("/calendars/alice/work/"))
        .and(header("X-HTTP-Method-Override", "REPORT"))
        .and(header("Depth", "1"))
        .and(header("Authorization", "Bearer t0k3n"))
        .and(body_string_contains("<C:comp-filter name=\"VEVENT\">"))
        .and(body_string_contains(
            "<C:time-range start=\"20250101T000000Z\" end=\"20250201T000000Z\"/>",
        ))
        .respond_with(ResponseTemplate::new(207).set_body_raw(body, "application/xml"))
        .mount(&mock_server)
        .await;

    let config = CalDavConfig {
        server_url: format!("{}/dav/", mock_server.uri()),
        calendar_path: Some("/calendars/alice/work/".to_string()),
        auth: AuthMethod::Bearer {
            token: "t0k3n".to_string(),
        },
        ..Default::default()
    };

    let client = CalDavClient::new(config).expect("Failed to create client");
    let events = client
        .list_configured_events(
            "2025-01-01T00:00:00Z".parse().unwrap(),
            "2025-02-01T00:00:00Z".parse().unwrap(),
        )
        .await
        .expect("Failed to list events");

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].uid, "1@example.com");
    assert_eq!(events[0].summary.as_deref(), Some("Test Event"));
    assert_eq!(events[0].location.as_deref(), Some("Room 42"));
    assert_eq!(events[0].start_time.as_deref(), Some("20250101T120000Z"));
    assert_eq!(events[0].end_time.as_deref(), Some("20250101T130000Z"));
}

#[tokio::test]
#[ignore = "require network"]
async fn client_list_events_rejects_plain_ok() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/calendars/alice/work/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
        .mount(&mock_server)
        .await;

    let config = CalDavConfig {
        server_url: mock_server.uri(),
        ..Default::default()
    };

    let client = CalDavClient::new(config).expect("Failed to create client");
    let err = client
        .list_events(
            "/calendars/alice/work/",
            "2025-01-01T00:00:00Z".parse().unwrap(),
            "2025-02-01T00:00:00Z".parse().unwrap(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, CalDavError::Http { status: 200, .. }));
}

#[tokio::test]
#[ignore = "require network"]
async fn client_unreachable_server() {
    // Nothing listens on the discard port.
    let config = CalDavConfig {
        server_url: "http://127.0.0.1:9/dav/".to_string(),
        timeout_secs: 2,
        ..Default::default()
    };

    let client = CalDavClient::new(config).expect("Failed to create client");
    let err = client.list_calendars().await.unwrap_err();
    assert!(matches!(err, CalDavError::Connection(_)));
}

#[test]
fn client_rejects_invalid_user_agent() {
    let config = CalDavConfig {
        server_url: "https://dav.example.com/".to_string(),
        user_agent: "tinycal\nagent".to_string(),
        ..Default::default()
    };

    let err = CalDavClient::new(config).unwrap_err();
    assert!(matches!(err, CalDavError::InvalidArgument(_)));
}
