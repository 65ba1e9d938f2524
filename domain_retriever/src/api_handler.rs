// src/api_handler.rs

use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};

const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Blocking JSON client bound to one REST server. Failed calls are returned
/// as errors straight away; nothing is retried.
pub struct APIHandler {
    client: Client,
    base_url: String,
}

impl APIHandler {
    pub fn new(base_url: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static(APP_USER_AGENT));

        let client = Client::builder().default_headers(headers).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    pub fn get(&self, endpoint: &str) -> Result<Value> {
        let url = self.url(endpoint);
        debug!("GET {}", url);
        let response = self.client.get(&url).send()?;
        Self::json_body(&url, response)
    }

    pub fn post_form(&self, endpoint: &str, form: &[(&str, &str)]) -> Result<Value> {
        let url = self.url(endpoint);
        debug!("POST {} {:?}", url, form);
        let response = self.client.post(&url).form(form).send()?;
        Self::json_body(&url, response)
    }

    fn json_body(url: &str, response: Response) -> Result<Value> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json()?);
        }

        let body = response.text()?;
        Err(Error::Api {
            url: url.to_string(),
            status,
            body,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    /// Answer one connection per reply, in order, on a local port. The
    /// handle yields the request lines that were received.
    pub(crate) fn serve(replies: Vec<(u16, &'static str)>) -> (String, JoinHandle<Vec<String>>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let handle = thread::spawn(move || {
            let mut requests = Vec::new();
            for (status, body) in replies {
                let (stream, _) = listener.accept().unwrap();
                let mut reader = BufReader::new(stream);

                let mut request_line = String::new();
                reader.read_line(&mut request_line).unwrap();
                let mut content_length = 0;
                loop {
                    let mut line = String::new();
                    reader.read_line(&mut line).unwrap();
                    if line == "\r\n" || line.is_empty() {
                        break;
                    }
                    if let Some(value) = line.to_ascii_lowercase().strip_prefix("content-length:") {
                        content_length = value.trim().parse().unwrap();
                    }
                }
                let mut payload = vec![0; content_length];
                reader.read_exact(&mut payload).unwrap();
                requests.push(request_line.trim_end().to_string());

                let mut stream = reader.into_inner();
                write!(
                    stream,
                    "HTTP/1.1 {} Reply\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                )
                .unwrap();
                stream.flush().unwrap();
            }
            requests
        });

        (base_url, handle)
    }

    #[test]
    fn joins_base_and_endpoint() {
        let api = APIHandler::new("https://rest.ensembl.org/").unwrap();
        assert_eq!(
            api.url("/lookup/id/ENSG00000141510"),
            "https://rest.ensembl.org/lookup/id/ENSG00000141510"
        );
    }

    #[test]
    fn success_body_is_parsed() {
        let (base_url, server) = serve(vec![(200, r#"{"id":"ENSG00000141510","display_name":"TP53"}"#)]);
        let api = APIHandler::new(&base_url).unwrap();

        let value = api.get("/lookup/id/ENSG00000141510").unwrap();
        assert_eq!(value["display_name"], "TP53");
        assert_eq!(
            server.join().unwrap(),
            vec!["GET /lookup/id/ENSG00000141510 HTTP/1.1"]
        );
    }

    #[test]
    fn failed_status_is_an_error() {
        let (base_url, server) = serve(vec![(500, r#"{"error":"internal"}"#)]);
        let api = APIHandler::new(&base_url).unwrap();

        let err = api.get("/lookup/id/ENST00000269305").unwrap_err();
        match err {
            Error::Api { url, status, body } => {
                assert_eq!(status, reqwest::StatusCode::INTERNAL_SERVER_ERROR);
                assert!(url.ends_with("/lookup/id/ENST00000269305"));
                assert!(body.contains("internal"));
            }
            other => panic!("expected Error::Api, got {other:?}"),
        }
        // a single request: nothing is retried
        assert_eq!(server.join().unwrap().len(), 1);
    }

    #[test]
    fn form_post_failure_is_an_error() {
        let (base_url, server) = serve(vec![(400, r#"{"messages":["bad ids"]}"#)]);
        let api = APIHandler::new(&base_url).unwrap();

        let err = api
            .post_form("/idmapping/run", &[("from", "Ensembl_Transcript"), ("ids", "ENST1")])
            .unwrap_err();
        assert!(matches!(err, Error::Api { status, .. } if status == reqwest::StatusCode::BAD_REQUEST));
        assert_eq!(server.join().unwrap(), vec!["POST /idmapping/run HTTP/1.1"]);
    }
}
