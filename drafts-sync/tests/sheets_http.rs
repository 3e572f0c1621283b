//! `GoogleSheets` and service-account auth against a local mock server.

use chrono::Utc;
use drafts_core::SheetRow;
use drafts_sync::auth::{AccessToken, Claims, ServiceAccount};
use drafts_sync::{GoogleSheets, SheetStore, SheetsSettings, SyncError};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use mockito::Matcher;
use serde_json::json;

const PRIVATE_KEY: &str = include_str!("fixtures/test_service_account.pem");
const PUBLIC_KEY: &str = include_str!("fixtures/test_service_account.pub.pem");
const SPREADSHEET: &str = "sheet-1";

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn client(server: &mockito::Server) -> GoogleSheets {
    GoogleSheets::with_token(
        ureq::agent(),
        &server.url(),
        SPREADSHEET,
        AccessToken::new("tok"),
    )
    .expect("client")
}

fn values_path() -> Matcher {
    Matcher::Regex(format!("^/v4/spreadsheets/{SPREADSHEET}/values/"))
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

#[test]
fn read_range_returns_rows_as_sent() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", values_path())
        .match_header("authorization", "Bearer tok")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "range": "'Draft Images'!A2:I1000",
                "majorDimension": "ROWS",
                "values": [["a", "https://img/a.png"], ["b"]]
            })
            .to_string(),
        )
        .create();

    let rows = client(&server)
        .read_range("'Draft Images'!A2:I")
        .expect("read");
    mock.assert();
    assert_eq!(
        rows,
        vec![SheetRow::from(["a", "https://img/a.png"]), SheetRow::from(["b"])]
    );
}

#[test]
fn empty_range_has_no_values_key() {
    let mut server = mockito::Server::new();
    server
        .mock("GET", values_path())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"range":"'Draft Images'!A2:I1000","majorDimension":"ROWS"}"#)
        .create();

    let rows = client(&server)
        .read_range("'Draft Images'!A2:I")
        .expect("read");
    assert!(rows.is_empty());
}

#[test]
fn error_status_carries_status_and_body() {
    let mut server = mockito::Server::new();
    server
        .mock("GET", values_path())
        .with_status(403)
        .with_body(r#"{"error":{"status":"PERMISSION_DENIED"}}"#)
        .create();

    let err = client(&server)
        .read_range("'Draft Images'!A1:I1")
        .expect_err("forbidden");
    match err {
        SyncError::Http { status, body, .. } => {
            assert_eq!(status, 403);
            assert!(body.contains("PERMISSION_DENIED"), "{body}");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn malformed_json_is_a_decode_error() {
    let mut server = mockito::Server::new();
    server
        .mock("GET", values_path())
        .with_status(200)
        .with_body("<html>not json</html>")
        .create();

    let err = client(&server)
        .read_range("'Draft Images'!A1:I1")
        .expect_err("decode");
    assert!(matches!(err, SyncError::Decode { .. }), "{err}");
}

// ---------------------------------------------------------------------------
// Appends
// ---------------------------------------------------------------------------

#[test]
fn append_posts_raw_values_in_one_batch() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock(
            "POST",
            Matcher::Regex(format!("^/v4/spreadsheets/{SPREADSHEET}/values/.*:append")),
        )
        .match_header("authorization", "Bearer tok")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("valueInputOption".into(), "RAW".into()),
            Matcher::UrlEncoded("insertDataOption".into(), "INSERT_ROWS".into()),
        ]))
        .match_body(Matcher::Json(json!({
            "values": [["c", "=SUM(A1)"], ["d", ""]]
        })))
        .with_status(200)
        .with_body("{}")
        .expect(1)
        .create();

    client(&server)
        .append_rows(
            "'Draft Images'!A2:I",
            &[SheetRow::from(["c", "=SUM(A1)"]), SheetRow::from(["d", ""])],
        )
        .expect("append");
    mock.assert();
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

#[test]
fn token_exchange_posts_signed_assertion() {
    let mut server = mockito::Server::new();
    let token_url = format!("{}/token", server.url());
    let mock = server
        .mock("POST", "/token")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded(
                "grant_type".into(),
                "urn:ietf:params:oauth:grant-type:jwt-bearer".into(),
            ),
            Matcher::Regex("assertion=".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"access_token":"ya29.test","expires_in":3599,"token_type":"Bearer"}"#)
        .create();

    let account = ServiceAccount::new("bot@project.iam.gserviceaccount.com", PRIVATE_KEY);
    let token = account
        .fetch_token(&ureq::agent(), &token_url)
        .expect("token");
    mock.assert();
    assert_eq!(token, AccessToken::new("ya29.test"));
}

#[test]
fn assertion_verifies_with_public_key() {
    let account = ServiceAccount::new("bot@project.iam.gserviceaccount.com", PRIVATE_KEY);
    let audience = "https://oauth2.googleapis.com/token";
    let jwt = account.assertion(audience, Utc::now()).expect("sign");

    let mut validation = Validation::new(Algorithm::RS256);
    validation.set_audience(&[audience]);
    let key = DecodingKey::from_rsa_pem(PUBLIC_KEY.as_bytes()).expect("public key");
    let decoded = jsonwebtoken::decode::<Claims>(&jwt, &key, &validation).expect("verify");
    assert_eq!(decoded.claims.iss, "bot@project.iam.gserviceaccount.com");
    assert_eq!(
        decoded.claims.scope,
        "https://www.googleapis.com/auth/spreadsheets"
    );
}

#[test]
fn key_with_escaped_newlines_still_signs() {
    let escaped = PRIVATE_KEY.replace('\n', "\\n");
    let account = ServiceAccount::new("bot@project.iam.gserviceaccount.com", escaped);
    account
        .assertion("https://oauth2.googleapis.com/token", Utc::now())
        .expect("sign");
}

#[test]
fn rejected_credentials_fail_the_connect() {
    let mut server = mockito::Server::new();
    server
        .mock("POST", "/token")
        .with_status(400)
        .with_body(r#"{"error":"invalid_grant"}"#)
        .create();

    let settings = SheetsSettings {
        spreadsheet_id: Some(SPREADSHEET.to_string()),
        service_account_email: Some("bot@project.iam.gserviceaccount.com".to_string()),
        service_account_key: Some(PRIVATE_KEY.to_string()),
        api_base: server.url(),
        token_url: format!("{}/token", server.url()),
        ..SheetsSettings::default()
    };
    let err = GoogleSheets::connect(&settings).err().expect("invalid grant");
    assert!(
        matches!(err, SyncError::Http { status: 400, .. }),
        "{err}"
    );
}

#[test]
fn connect_then_read_uses_issued_token() {
    let mut server = mockito::Server::new();
    server
        .mock("POST", "/token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"access_token":"issued","expires_in":3599,"token_type":"Bearer"}"#)
        .create();
    let read = server
        .mock("GET", values_path())
        .match_header("authorization", "Bearer issued")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"values":[["UUID"]]}"#)
        .create();

    let settings = SheetsSettings {
        spreadsheet_id: Some(SPREADSHEET.to_string()),
        service_account_email: Some("bot@project.iam.gserviceaccount.com".to_string()),
        service_account_key: Some(PRIVATE_KEY.to_string()),
        api_base: server.url(),
        token_url: format!("{}/token", server.url()),
        ..SheetsSettings::default()
    };
    let mut sheets = GoogleSheets::connect(&settings).expect("connect");
    let rows = sheets.read_range("'Draft Images'!A1:I1").expect("read");
    read.assert();
    assert_eq!(rows, vec![SheetRow::from(["UUID"])]);
}

#[test]
fn missing_credentials_are_named() {
    let settings = SheetsSettings {
        spreadsheet_id: Some(SPREADSHEET.to_string()),
        ..SheetsSettings::default()
    };
    let err = GoogleSheets::connect(&settings).err().expect("missing email");
    assert!(
        matches!(err, SyncError::MissingConfig("SHEETS_SERVICE_ACCOUNT_EMAIL")),
        "{err}"
    );
    assert_eq!(err.to_string(), "SHEETS_SERVICE_ACCOUNT_EMAIL is not set");
}
