use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Bot,
}

/// One message of a conversation transcript. User turns are sent to the bot,
/// bot turns are the replies the bot is expected to produce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptTurn {
    pub role: Role,
    pub text: String,
}

impl TranscriptTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            role: Role::Bot,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptSource {
    Inline(Vec<TranscriptTurn>),
    Url(String),
}

/// A test as submitted. Its transcript may still need to be fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestDefinition {
    pub name: String,
    pub bot: Option<String>,
    pub user_id: Option<String>,
    pub timeout: Option<Duration>,
    pub transcript: TranscriptSource,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuiteDefinition {
    pub name: String,
    pub tests: Vec<TestDefinition>,
}

/// A test ready for the executor: the transcript is in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    pub name: String,
    pub bot: Option<String>,
    pub user_id: Option<String>,
    pub timeout: Option<Duration>,
    pub transcript: Vec<TranscriptTurn>,
}

impl TestCase {
    pub fn from_definition(def: &TestDefinition, transcript: Vec<TranscriptTurn>) -> Self {
        Self {
            name: def.name.clone(),
            bot: def.bot.clone(),
            user_id: def.user_id.clone(),
            timeout: def.timeout,
            transcript,
        }
    }
}
