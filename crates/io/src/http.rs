//! CSV exports served over HTTP.
//!
//! Blocking reqwest client (no Tokio runtime required). Each sheet is one
//! GET against a URL template such as
//! `https://docs.example.com/d/abc/export?format=csv&sheet={sheet}`.

use std::io::Read;
use std::sync::Arc;
use std::time::Duration;

use questgrid_core::{Grid, GridSource, SourceError};
use url::Url;

use crate::csv::{decode_text, grid_from_csv_str};
use crate::OpenError;

pub const SHEET_PLACEHOLDER: &str = "{sheet}";

/// Responses larger than this are rejected.
pub const MAX_BODY_BYTES: u64 = 10 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct HttpCsvSource {
    http: reqwest::blocking::Client,
    template: String,
}

impl HttpCsvSource {
    pub fn new(template: impl Into<String>, timeout: Duration) -> Result<Self, OpenError> {
        let template = template.into();
        validate_template(&template)?;

        let http = reqwest::blocking::Client::builder()
            .user_agent(format!("qgrid/{}", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| OpenError::Client(e.to_string()))?;

        Ok(Self { http, template })
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// Export URL for `sheet`, with the name percent-encoded.
    pub fn sheet_url(&self, sheet: &str) -> String {
        let encoded: String = url::form_urlencoded::byte_serialize(sheet.as_bytes()).collect();
        // form encoding writes spaces as '+'; a literal '+' is already %2B
        self.template
            .replace(SHEET_PLACEHOLDER, &encoded.replace('+', "%20"))
    }
}

fn validate_template(template: &str) -> Result<(), OpenError> {
    let invalid = |reason: String| OpenError::InvalidTemplate {
        template: template.to_string(),
        reason,
    };

    if !template.contains(SHEET_PLACEHOLDER) {
        return Err(invalid(format!("missing {SHEET_PLACEHOLDER} placeholder")));
    }
    let url = Url::parse(&template.replace(SHEET_PLACEHOLDER, "sheet"))
        .map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(invalid(format!("unsupported scheme '{other}'"))),
    }
}

impl GridSource for HttpCsvSource {
    fn fetch(&self, sheet: &str) -> Result<Arc<Grid>, SourceError> {
        let transport = |message: String| SourceError::Transport {
            sheet: sheet.to_string(),
            message,
        };

        let url = self.sheet_url(sheet);
        let response = self
            .http
            .get(&url)
            .send()
            .map_err(|e| transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(transport(format!("HTTP {} from {url}", status.as_u16())));
        }
        if response.content_length().is_some_and(|len| len > MAX_BODY_BYTES) {
            return Err(transport(format!("response exceeds {MAX_BODY_BYTES} bytes")));
        }

        let mut body = Vec::new();
        response
            .take(MAX_BODY_BYTES + 1)
            .read_to_end(&mut body)
            .map_err(|e| transport(e.to_string()))?;
        if body.len() as u64 > MAX_BODY_BYTES {
            return Err(transport(format!("response exceeds {MAX_BODY_BYTES} bytes")));
        }

        let grid = grid_from_csv_str(sheet, &decode_text(body))?;
        log::debug!("fetched '{}' from {} ({} rows)", sheet, url, grid.height());
        Ok(Arc::new(grid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use std::net::TcpListener;

    #[test]
    fn test_sheet_url_encodes_name() {
        let source =
            HttpCsvSource::new("https://example.com/export?sheet={sheet}", Duration::from_secs(5))
                .unwrap();
        assert_eq!(
            source.sheet_url("Quests 2024/25"),
            "https://example.com/export?sheet=Quests%202024%2F25"
        );
        assert_eq!(source.sheet_url("A+B"), "https://example.com/export?sheet=A%2BB");
    }

    #[test]
    fn test_template_needs_placeholder() {
        let err = HttpCsvSource::new("https://example.com/export", Duration::from_secs(5))
            .unwrap_err();
        assert!(err.to_string().contains("{sheet}"), "{err}");
    }

    #[test]
    fn test_template_rejects_other_schemes() {
        let err = HttpCsvSource::new("file:///tmp/{sheet}.csv", Duration::from_secs(5))
            .unwrap_err();
        assert!(err.to_string().contains("unsupported scheme"), "{err}");
    }

    #[test]
    fn test_template_rejects_garbage() {
        assert!(HttpCsvSource::new("not a url {sheet}", Duration::from_secs(5)).is_err());
    }

    #[test]
    fn test_fetch_parses_csv_body() {
        let server = MockServer::start();
        let export = server.mock(|when, then| {
            when.method(GET).path("/export/Gamertags");
            then.status(200)
                .header("content-type", "text/csv")
                .body("Gamertag;XP\nElArg;4349\n");
        });

        let source = HttpCsvSource::new(
            format!("{}/export/{{sheet}}", server.base_url()),
            Duration::from_secs(5),
        )
        .unwrap();
        let grid = source.fetch("Gamertags").unwrap();

        export.assert();
        assert_eq!(grid.name(), "Gamertags");
        assert_eq!(grid.text(1, 0), "ElArg");
        assert_eq!(grid.text(1, 1), "4349");
    }

    #[test]
    fn test_fetch_sends_encoded_sheet_name() {
        let server = MockServer::start();
        let export = server.mock(|when, then| {
            when.method(GET)
                .path("/export")
                .query_param("format", "csv")
                .query_param("sheet", "Quests 2024/25");
            then.status(200).body("Nachname;Bohrung\nLovelace;50\n");
        });

        let source = HttpCsvSource::new(
            format!("{}/export?format=csv&sheet={{sheet}}", server.base_url()),
            Duration::from_secs(5),
        )
        .unwrap();
        let grid = source.fetch("Quests 2024/25").unwrap();

        export.assert();
        assert_eq!(grid.name(), "Quests 2024/25");
        assert_eq!(grid.text(1, 1), "50");
    }

    #[test]
    fn test_non_success_status_is_transport_error() {
        let server = MockServer::start();
        let export = server.mock(|when, then| {
            when.method(GET).path("/Quests");
            then.status(503);
        });

        let source = HttpCsvSource::new(
            format!("{}/{{sheet}}", server.base_url()),
            Duration::from_secs(5),
        )
        .unwrap();
        let err = source.fetch("Quests").unwrap_err();

        export.assert();
        match err {
            SourceError::Transport { sheet, message } => {
                assert_eq!(sheet, "Quests");
                assert!(message.contains("503"), "{message}");
            }
            other => panic!("expected Transport, got {other:?}"),
        }
    }

    #[test]
    fn test_windows_1252_body_is_decoded() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/Quests");
            then.status(200).body(b"M\xFCnzen;Bohrung\n;50\n".to_vec());
        });

        let source = HttpCsvSource::new(
            format!("{}/{{sheet}}", server.base_url()),
            Duration::from_secs(5),
        )
        .unwrap();
        let grid = source.fetch("Quests").unwrap();
        assert_eq!(grid.text(0, 0), "Münzen");
    }

    #[test]
    fn test_unreachable_host_is_transport_error() {
        // Bind then drop to get a port with no listener.
        let port = TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let source = HttpCsvSource::new(
            format!("http://127.0.0.1:{port}/{{sheet}}"),
            Duration::from_secs(2),
        )
        .unwrap();
        assert!(matches!(
            source.fetch("Quests"),
            Err(SourceError::Transport { .. })
        ));
    }
}
