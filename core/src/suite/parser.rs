//! Request payloads → test and suite definitions.
//!
//! A JSON body wins over query parameters whenever it is present.

use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;

use crate::errors::ParseError;

use super::types::{Role, SuiteDefinition, TestDefinition, TranscriptSource, TranscriptTurn};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTest {
    name: Option<String>,
    bot: Option<String>,
    user_id: Option<String>,
    timeout_ms: Option<u64>,
    transcript: Option<Vec<RawActivity>>,
    transcript_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawSuite {
    name: Option<String>,
    tests: Option<Vec<RawTest>>,
}

/// Either a plain `{role, text}` turn or a Bot Framework activity.
#[derive(Debug, Deserialize)]
struct RawActivity {
    #[serde(rename = "type")]
    kind: Option<String>,
    role: Option<Role>,
    text: Option<String>,
    from: Option<RawParty>,
}

#[derive(Debug, Deserialize)]
struct RawParty {
    role: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawTranscript {
    Turns(Vec<RawActivity>),
    Wrapped { activities: Vec<RawActivity> },
}

pub fn parse_test_request(
    query: &HashMap<String, String>,
    body: &[u8],
) -> Result<TestDefinition, ParseError> {
    if has_body(body) {
        let raw: RawTest = serde_json::from_slice(body).map_err(ParseError::InvalidJson)?;
        return build_test(raw, "test".to_string());
    }

    let raw = RawTest {
        name: non_empty(query.get("name")),
        bot: non_empty(query.get("bot")),
        user_id: non_empty(query.get("userId")),
        timeout_ms: query
            .get("timeoutMs")
            .map(|v| parse_u64("timeoutMs", v))
            .transpose()?,
        transcript: None,
        transcript_url: non_empty(query.get("transcriptUrl")),
    };
    build_test(raw, "test".to_string())
}

pub fn parse_suite_request(
    query: &HashMap<String, String>,
    body: &[u8],
) -> Result<SuiteDefinition, ParseError> {
    if has_body(body) {
        let raw: RawSuite = serde_json::from_slice(body).map_err(ParseError::InvalidJson)?;
        let raw_tests = raw.tests.ok_or(ParseError::MissingField("tests"))?;
        if raw_tests.is_empty() {
            return Err(ParseError::EmptySuite);
        }
        let tests = raw_tests
            .into_iter()
            .enumerate()
            .map(|(i, t)| build_test(t, format!("test-{}", i + 1)))
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(SuiteDefinition {
            name: raw.name.unwrap_or_else(|| "suite".to_string()),
            tests,
        });
    }

    let urls = query
        .get("transcriptUrl")
        .ok_or(ParseError::MissingField("transcriptUrl"))?;
    let tests = urls
        .split(',')
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .enumerate()
        .map(|(i, url)| {
            build_test(
                RawTest {
                    name: None,
                    bot: non_empty(query.get("bot")),
                    user_id: non_empty(query.get("userId")),
                    timeout_ms: None,
                    transcript: None,
                    transcript_url: Some(url.to_string()),
                },
                format!("test-{}", i + 1),
            )
        })
        .collect::<Result<Vec<_>, _>>()?;
    if tests.is_empty() {
        return Err(ParseError::EmptySuite);
    }
    Ok(SuiteDefinition {
        name: non_empty(query.get("name")).unwrap_or_else(|| "suite".to_string()),
        tests,
    })
}

/// Parses a transcript document: a list of turns/activities, or an object
/// with an `activities` list. Non-message activities are dropped.
pub fn parse_transcript(bytes: &[u8]) -> Result<Vec<TranscriptTurn>, ParseError> {
    let raw: RawTranscript = serde_json::from_slice(bytes).map_err(ParseError::InvalidJson)?;
    let activities = match raw {
        RawTranscript::Turns(a) | RawTranscript::Wrapped { activities: a } => a,
    };
    convert_activities(activities)
}

fn build_test(raw: RawTest, default_name: String) -> Result<TestDefinition, ParseError> {
    let transcript = match (raw.transcript, raw.transcript_url) {
        (Some(_), Some(_)) => return Err(ParseError::Conflict("transcript, transcriptUrl")),
        (None, None) => return Err(ParseError::MissingField("transcript")),
        (Some(activities), None) => TranscriptSource::Inline(convert_activities(activities)?),
        (None, Some(url)) => {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ParseError::InvalidValue {
                    field: "transcriptUrl",
                    reason: format!("not an http(s) url: {url}"),
                });
            }
            TranscriptSource::Url(url)
        }
    };

    let timeout = match raw.timeout_ms {
        Some(0) => {
            return Err(ParseError::InvalidValue {
                field: "timeoutMs",
                reason: "must be greater than zero".into(),
            })
        }
        other => other.map(Duration::from_millis),
    };

    Ok(TestDefinition {
        name: raw
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(default_name),
        bot: raw.bot,
        user_id: raw.user_id,
        timeout,
        transcript,
    })
}

fn convert_activities(activities: Vec<RawActivity>) -> Result<Vec<TranscriptTurn>, ParseError> {
    let mut turns = Vec::with_capacity(activities.len());
    for activity in activities {
        if activity.kind.as_deref().is_some_and(|k| k != "message") {
            continue;
        }
        let role = match (activity.role, activity.from.and_then(|f| f.role)) {
            (Some(role), _) => role,
            (None, Some(from)) => match from.as_str() {
                "user" => Role::User,
                "bot" => Role::Bot,
                other => {
                    return Err(ParseError::InvalidValue {
                        field: "from.role",
                        reason: format!("unknown role: {other}"),
                    })
                }
            },
            (None, None) => return Err(ParseError::MissingField("role")),
        };
        turns.push(TranscriptTurn {
            role,
            text: activity.text.unwrap_or_default(),
        });
    }
    if turns.is_empty() {
        return Err(ParseError::EmptyTranscript);
    }
    Ok(turns)
}

fn has_body(body: &[u8]) -> bool {
    body.iter().any(|b| !b.is_ascii_whitespace())
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty()).map(str::to_string)
}

fn parse_u64(field: &'static str, value: &str) -> Result<u64, ParseError> {
    value.trim().parse().map_err(|_| ParseError::InvalidValue {
        field,
        reason: format!("not a number: {value}"),
    })
}
