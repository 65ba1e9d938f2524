// src/uniprot.rs

use std::thread;
use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::annotation::ProteinSource;
use crate::api_handler::APIHandler;
use crate::error::{Error, Result};
use crate::models::ProteinFeature;

const UNIPROT_REST: &str = "https://rest.uniprot.org";

// ID mapping jobs run server side; the status endpoint is polled until the
// job reports results.
const POLL_INTERVAL: Duration = Duration::from_secs(1);
const MAX_POLLS: u32 = 60;

const REVIEWED_ENTRY: &str = "UniProtKB reviewed (Swiss-Prot)";

pub struct UniProtClient {
    api: APIHandler,
    poll_interval: Duration,
    max_polls: u32,
}

impl UniProtClient {
    pub fn new() -> Result<Self> {
        Self::with_polling(UNIPROT_REST, POLL_INTERVAL, MAX_POLLS)
    }

    pub fn with_polling(base_url: &str, poll_interval: Duration, max_polls: u32) -> Result<Self> {
        Ok(Self {
            api: APIHandler::new(base_url)?,
            poll_interval,
            max_polls,
        })
    }

    fn submit_mapping(&self, transcript_id: &str) -> Result<String> {
        let response = self.api.post_form(
            "/idmapping/run",
            &[
                ("from", "Ensembl_Transcript"),
                ("to", "UniProtKB"),
                ("ids", transcript_id),
            ],
        )?;
        job_id(&response).ok_or_else(|| Error::id_mapping(transcript_id, "no jobId in response"))
    }

    fn wait_for_mapping(&self, transcript_id: &str, job: &str) -> Result<Vec<Value>> {
        for _ in 0..self.max_polls {
            // a finished job redirects to its results, which reqwest follows
            let status = self.api.get(&format!("/idmapping/status/{}", job))?;
            match job_state(&status) {
                JobState::Finished(results) => return Ok(results),
                JobState::Failed(message) => return Err(Error::id_mapping(transcript_id, message)),
                JobState::Running => thread::sleep(self.poll_interval),
            }
        }
        Err(Error::id_mapping(
            transcript_id,
            format!("job {} still running after {} polls", job, self.max_polls),
        ))
    }
}

impl ProteinSource for UniProtClient {
    fn uniprot_id(&self, transcript_id: &str) -> Result<String> {
        let job = self.submit_mapping(transcript_id)?;
        debug!("ID mapping job {} for {}", job, transcript_id);
        let results = self.wait_for_mapping(transcript_id, &job)?;
        let accession = pick_accession(&results);
        if accession.is_empty() {
            warn!("{} is not mapped to any UniProtKB entry", transcript_id);
        }
        Ok(accession)
    }

    fn features(&self, uniprot_id: &str, feature_types: &[String]) -> Result<Vec<ProteinFeature>> {
        if uniprot_id.is_empty() {
            return Ok(Vec::new());
        }
        let entry = self.api.get(&format!("/uniprotkb/{}.json", uniprot_id))?;
        parse_features(entry, feature_types)
    }
}

#[derive(Debug, PartialEq)]
enum JobState {
    Running,
    Finished(Vec<Value>),
    Failed(String),
}

fn job_id(response: &Value) -> Option<String> {
    response["jobId"].as_str().map(str::to_string)
}

fn job_state(status: &Value) -> JobState {
    if let Some(results) = status["results"].as_array() {
        return JobState::Finished(results.clone());
    }
    match status["jobStatus"].as_str() {
        Some("NEW") | Some("RUNNING") => JobState::Running,
        // results come through the redirect; a bare FINISHED means it was lost
        Some("FINISHED") => JobState::Failed("job finished but returned no results".to_string()),
        Some(other) => {
            let message = status
                .pointer("/errors/0/message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| format!("job status {}", other));
            JobState::Failed(message)
        }
        None => JobState::Failed(format!("unexpected status response: {}", status)),
    }
}

/// Reviewed entries win over unreviewed ones; otherwise the first hit.
fn pick_accession(results: &[Value]) -> String {
    let accession = |r: &Value| -> Option<String> {
        match &r["to"] {
            Value::String(s) => Some(s.clone()),
            to => to["primaryAccession"].as_str().map(str::to_string),
        }
    };

    results
        .iter()
        .find(|r| r.pointer("/to/entryType").and_then(Value::as_str) == Some(REVIEWED_ENTRY))
        .or_else(|| results.first())
        .and_then(accession)
        .unwrap_or_default()
}

#[derive(Deserialize)]
struct Entry {
    #[serde(default)]
    features: Vec<RawFeature>,
}

#[derive(Deserialize)]
struct RawFeature {
    #[serde(rename = "type")]
    feature_type: String,
    #[serde(default)]
    description: String,
    location: Location,
}

#[derive(Deserialize)]
struct Location {
    start: Position,
    end: Position,
}

#[derive(Deserialize)]
struct Position {
    value: Option<u64>,
}

fn parse_features(entry: Value, feature_types: &[String]) -> Result<Vec<ProteinFeature>> {
    let entry: Entry = serde_json::from_value(entry)?;
    Ok(entry
        .features
        .into_iter()
        .filter(|f| {
            feature_types
                .iter()
                .any(|t| t.eq_ignore_ascii_case(&f.feature_type))
        })
        .map(|f| ProteinFeature {
            feature_type: f.feature_type,
            description: f.description,
            start: f.location.start.value,
            end: f.location.end.value,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api_handler::tests::serve;
    use serde_json::json;

    const RUNNING: &str = r#"{"jobStatus":"RUNNING"}"#;

    fn client(base_url: &str, max_polls: u32) -> UniProtClient {
        UniProtClient::with_polling(base_url, Duration::ZERO, max_polls).unwrap()
    }

    #[test]
    fn maps_transcript_after_job_completes() {
        let (base_url, server) = serve(vec![
            (200, r#"{"jobId":"27a020f6"}"#),
            (200, RUNNING),
            (200, r#"{"results":[{"from":"ENST00000269305","to":{"primaryAccession":"P04637","entryType":"UniProtKB reviewed (Swiss-Prot)"}}]}"#),
        ]);

        let accession = client(&base_url, 5).uniprot_id("ENST00000269305").unwrap();
        assert_eq!(accession, "P04637");
        assert_eq!(
            server.join().unwrap(),
            vec![
                "POST /idmapping/run HTTP/1.1",
                "GET /idmapping/status/27a020f6 HTTP/1.1",
                "GET /idmapping/status/27a020f6 HTTP/1.1",
            ]
        );
    }

    #[test]
    fn gives_up_after_max_polls() {
        let (base_url, server) = serve(vec![(200, RUNNING), (200, RUNNING)]);

        let err = client(&base_url, 2)
            .wait_for_mapping("ENST00000269305", "27a020f6")
            .unwrap_err();
        assert!(matches!(err, Error::IdMapping { ref message, .. } if message.contains("after 2 polls")));
        assert_eq!(server.join().unwrap().len(), 2);
    }

    #[test]
    fn finished_without_results_is_an_error() {
        let (base_url, server) = serve(vec![(200, r#"{"jobStatus":"FINISHED"}"#)]);

        let err = client(&base_url, 5)
            .wait_for_mapping("ENST00000269305", "27a020f6")
            .unwrap_err();
        assert!(matches!(err, Error::IdMapping { .. }));
        server.join().unwrap();
    }

    #[test]
    fn failed_status_aborts_mapping() {
        let (base_url, server) = serve(vec![(503, r#"{"messages":["maintenance"]}"#)]);

        let err = client(&base_url, 5).uniprot_id("ENST00000269305").unwrap_err();
        assert!(matches!(err, Error::Api { .. }));
        assert_eq!(server.join().unwrap().len(), 1);
    }

    #[test]
    fn features_fetch_entry_json() {
        let (base_url, server) = serve(vec![(
            200,
            r#"{"features":[{"type":"Domain","description":"SH3","location":{"start":{"value":63},"end":{"value":97}}}]}"#,
        )]);

        let features = client(&base_url, 1)
            .features("P04637", &["Domain".to_string()])
            .unwrap();
        assert_eq!(features.len(), 1);
        assert_eq!(features[0].description, "SH3");
        assert_eq!(server.join().unwrap(), vec!["GET /uniprotkb/P04637.json HTTP/1.1"]);
    }

    #[test]
    fn job_state_transitions() {
        assert_eq!(job_state(&json!({ "jobStatus": "RUNNING" })), JobState::Running);
        assert_eq!(
            job_state(&json!({ "jobStatus": "FINISHED" })),
            JobState::Failed("job finished but returned no results".into())
        );
        assert_eq!(job_state(&json!({ "results": [] })), JobState::Finished(vec![]));
        assert_eq!(
            job_state(&json!({ "jobStatus": "ERROR", "errors": [{ "code": 45, "message": "bad ids" }] })),
            JobState::Failed("bad ids".into())
        );
        let done = json!({ "results": [{ "from": "ENST00000269305", "to": "P04637" }] });
        assert!(matches!(job_state(&done), JobState::Finished(r) if r.len() == 1));
    }

    #[test]
    fn reads_job_id() {
        assert_eq!(job_id(&json!({ "jobId": "27a020f6" })).as_deref(), Some("27a020f6"));
        assert_eq!(job_id(&json!({})), None);
    }

    #[test]
    fn prefers_reviewed_accession() {
        let results = json!([
            { "from": "ENST00000269305", "to": { "primaryAccession": "K7PPA8", "entryType": "UniProtKB unreviewed (TrEMBL)" } },
            { "from": "ENST00000269305", "to": { "primaryAccession": "P04637", "entryType": "UniProtKB reviewed (Swiss-Prot)" } }
        ]);
        assert_eq!(pick_accession(results.as_array().unwrap()), "P04637");
    }

    #[test]
    fn falls_back_to_first_accession() {
        let results = json!([{ "from": "ENST00000269305", "to": "K7PPA8" }]);
        assert_eq!(pick_accession(results.as_array().unwrap()), "K7PPA8");
        assert_eq!(pick_accession(&[]), "");
    }

    #[test]
    fn keeps_only_requested_feature_types() {
        let entry = json!({
            "primaryAccession": "P04637",
            "features": [
                { "type": "Domain", "description": "SH3",
                  "location": { "start": { "value": 63, "modifier": "EXACT" }, "end": { "value": 97, "modifier": "EXACT" } } },
                { "type": "Region", "description": "Disordered",
                  "location": { "start": { "value": 1, "modifier": "EXACT" }, "end": { "value": 45, "modifier": "EXACT" } } },
                { "type": "Chain", "description": "Cellular tumor antigen p53",
                  "location": { "start": { "value": 1, "modifier": "EXACT" }, "end": { "value": 393, "modifier": "EXACT" } } },
                { "type": "Zinc finger",
                  "location": { "start": { "value": null, "modifier": "UNKNOWN" }, "end": { "value": 200, "modifier": "EXACT" } } }
            ]
        });

        let features = parse_features(entry, &["domain".to_string(), "Zinc finger".to_string()]).unwrap();
        assert_eq!(
            features,
            vec![
                ProteinFeature {
                    feature_type: "Domain".into(),
                    description: "SH3".into(),
                    start: Some(63),
                    end: Some(97),
                },
                ProteinFeature {
                    feature_type: "Zinc finger".into(),
                    description: "".into(),
                    start: None,
                    end: Some(200),
                },
            ]
        );
    }

    #[test]
    fn entry_without_features() {
        let features = parse_features(json!({ "primaryAccession": "Q00000" }), &["Domain".to_string()]).unwrap();
        assert!(features.is_empty());
    }
}
