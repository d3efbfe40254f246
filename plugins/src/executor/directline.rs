//! Runs a transcript against a bot through the Bot Framework Direct Line 3.0
//! REST API.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use bft_core::api::{DirectLineConfig, ExecutorError, Role, TestCase, TestExecutor, TestOutcome};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use tokio::time::Instant;

const SNIPPET_CHARS: usize = 200;
/// Headroom past the test deadline before a stalled request is abandoned.
const STALL_GRACE: Duration = Duration::from_millis(500);

pub struct DirectLineExecutor {
    http: Client,
    base_url: String,
    secret: String,
    bots: HashMap<String, String>,
    poll_interval: Duration,
    default_timeout: Duration,
}

impl DirectLineExecutor {
    pub fn new(cfg: &DirectLineConfig) -> Result<Self> {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            secret: cfg.secret.clone(),
            bots: cfg.bots.clone(),
            poll_interval: Duration::from_millis(cfg.poll_interval_ms),
            default_timeout: Duration::from_millis(cfg.default_timeout_ms),
        })
    }

    fn secret_for(&self, bot: Option<&str>) -> Result<&str, ExecutorError> {
        match bot {
            Some(name) => self
                .bots
                .get(name)
                .map(String::as_str)
                .ok_or_else(|| ExecutorError::UnknownBot(name.to_string())),
            None if self.secret.is_empty() => Err(ExecutorError::UnknownBot("<default>".into())),
            None => Ok(&self.secret),
        }
    }
}

#[async_trait]
impl TestExecutor for DirectLineExecutor {
    fn name(&self) -> &str {
        "directline"
    }

    /// The whole exchange is bounded by the test timeout, so a channel that
    /// accepts a request and never answers still yields a failing outcome.
    async fn execute(&self, test: &TestCase) -> Result<TestOutcome, ExecutorError> {
        let secret = self.secret_for(test.bot.as_deref())?;
        let timeout = test.timeout.unwrap_or(self.default_timeout);

        match tokio::time::timeout(timeout + STALL_GRACE, self.converse(test, secret, timeout))
            .await
        {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(test = %test.name, "Direct Line request stalled past the test timeout");
                Ok(TestOutcome::fail(
                    &test.name,
                    format!(
                        "bot channel did not respond within {}ms",
                        timeout.as_millis()
                    ),
                ))
            }
        }
    }
}

impl DirectLineExecutor {
    async fn converse(
        &self,
        test: &TestCase,
        secret: &str,
        timeout: Duration,
    ) -> Result<TestOutcome, ExecutorError> {
        let deadline = Instant::now() + timeout;
        let user_id = test
            .user_id
            .clone()
            .unwrap_or_else(|| format!("bft-{}", uuid::Uuid::new_v4()));

        let mut convo = Conversation::start(&self.http, &self.base_url, secret).await?;
        tracing::debug!(test = %test.name, conversation = %convo.id, "Direct Line conversation started");

        for (idx, turn) in test.transcript.iter().enumerate() {
            match turn.role {
                Role::User => convo.send(&user_id, &turn.text).await?,
                Role::Bot => {
                    let reply = convo
                        .next_reply(&user_id, deadline, self.poll_interval)
                        .await?;
                    match reply {
                        Some(actual) if actual.trim() == turn.text.trim() => {}
                        Some(actual) => {
                            return Ok(TestOutcome::fail(
                                &test.name,
                                format!("bot reply at turn {} did not match", idx + 1),
                            )
                            .with_mismatch(&turn.text, actual));
                        }
                        None => {
                            return Ok(TestOutcome::fail(
                                &test.name,
                                format!(
                                    "no bot reply at turn {} within {}ms",
                                    idx + 1,
                                    timeout.as_millis()
                                ),
                            )
                            .with_mismatch(&turn.text, ""));
                        }
                    }
                }
            }
        }

        Ok(TestOutcome::pass(&test.name))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConversationResponse {
    conversation_id: String,
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ActivitySet {
    #[serde(default)]
    activities: Vec<Activity>,
    watermark: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Activity {
    #[serde(rename = "type")]
    kind: String,
    from: ChannelAccount,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChannelAccount {
    id: String,
}

struct Conversation<'a> {
    http: &'a Client,
    url: String,
    id: String,
    token: String,
    watermark: Option<String>,
    pending: VecDeque<String>,
}

impl<'a> Conversation<'a> {
    async fn start(http: &'a Client, base_url: &str, secret: &str) -> Result<Self, ExecutorError> {
        let resp = http
            .post(format!("{base_url}/v3/directline/conversations"))
            .bearer_auth(secret)
            .send()
            .await
            .map_err(|e| ExecutorError::Transport(e.into()))?;
        let started: ConversationResponse = decode(check_status(resp).await?).await?;
        Ok(Self {
            http,
            url: format!(
                "{base_url}/v3/directline/conversations/{}/activities",
                started.conversation_id
            ),
            id: started.conversation_id,
            token: started.token.unwrap_or_else(|| secret.to_string()),
            watermark: None,
            pending: VecDeque::new(),
        })
    }

    async fn send(&mut self, user_id: &str, text: &str) -> Result<(), ExecutorError> {
        let body = serde_json::json!({
            "type": "message",
            "from": { "id": user_id },
            "text": text,
        });
        let resp = self
            .http
            .post(&self.url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .map_err(|e| ExecutorError::Transport(e.into()))?;
        check_status(resp).await?;
        Ok(())
    }

    /// Next message from anyone but `user_id`, or `None` once `deadline` passes.
    async fn next_reply(
        &mut self,
        user_id: &str,
        deadline: Instant,
        poll_interval: Duration,
    ) -> Result<Option<String>, ExecutorError> {
        loop {
            if let Some(reply) = self.pending.pop_front() {
                return Ok(Some(reply));
            }
            let now = Instant::now();
            if now >= deadline {
                return Ok(None);
            }

            self.poll(user_id).await?;
            if self.pending.is_empty() {
                tokio::time::sleep(poll_interval.min(deadline - now)).await;
            }
        }
    }

    async fn poll(&mut self, user_id: &str) -> Result<(), ExecutorError> {
        let mut req = self.http.get(&self.url).bearer_auth(&self.token);
        if let Some(w) = &self.watermark {
            req = req.query(&[("watermark", w)]);
        }
        let resp = req
            .send()
            .await
            .map_err(|e| ExecutorError::Transport(e.into()))?;
        let set: ActivitySet = decode(check_status(resp).await?).await?;

        self.pending.extend(
            set.activities
                .into_iter()
                .filter(|a| a.kind == "message" && a.from.id != user_id)
                .map(|a| a.text.unwrap_or_default()),
        );
        if set.watermark.is_some() {
            self.watermark = set.watermark;
        }
        Ok(())
    }
}

async fn check_status(resp: Response) -> Result<Response, ExecutorError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(ExecutorError::Unauthorized {
            status: status.as_u16(),
        });
    }
    let body_snippet: String = resp
        .text()
        .await
        .unwrap_or_default()
        .chars()
        .take(SNIPPET_CHARS)
        .collect();
    if status.is_server_error() {
        Err(ExecutorError::Unavailable {
            status: status.as_u16(),
            body_snippet,
        })
    } else {
        Err(ExecutorError::HttpStatus {
            status: status.as_u16(),
            body_snippet,
        })
    }
}

async fn decode<T: serde::de::DeserializeOwned>(resp: Response) -> Result<T, ExecutorError> {
    let bytes = resp
        .bytes()
        .await
        .map_err(|e| ExecutorError::Transport(e.into()))?;
    serde_json::from_slice(&bytes).map_err(|e| ExecutorError::Decode(e.into()))
}
