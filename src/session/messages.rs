use serde::{Deserialize, Serialize};

use crate::session::grader::Verdict;
use crate::session::layout::LayoutMode;

/// Messages sent from the quiz client (WebSocket) to the server.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(tag = "messageType", content = "payload")]
pub enum ClientToServerMessage {
    /// The user picked (or changed) an option; `option` is "1".."5".
    SelectOption { option: String },
    /// The user asked for the pending selection to be graded.
    SubmitAnswer,
    /// The user asked to advance past a graded question.
    NextQuestion,
    /// The rendering layer finished loading the current question's image.
    /// Submissions are rejected until this arrives.
    ImageLoaded,
}

/// Messages sent from the server to the quiz client.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(tag = "messageType", content = "payload")] // Using camelCase for JS convention
pub enum ServerToClientMessage {
    /// Full session snapshot, pushed after every state-changing event.
    StateUpdate { state: SessionSnapshot },
    /// A transport-level problem, e.g. an unparseable client message.
    SystemError { message: String },
}

impl ServerToClientMessage {
    pub fn to_ws_text(&self) -> Result<axum::extract::ws::Message, serde_json::Error> {
        serde_json::to_string(self)
            .map(|json_string| axum::extract::ws::Message::Text(json_string.into()))
    }
}

pub fn client_message_from_ws_text(text: &str) -> Result<ClientToServerMessage, serde_json::Error> {
    serde_json::from_str(text)
}

/// Everything the rendering layer needs for one render cycle.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "phase", content = "data")]
pub enum SessionSnapshot {
    /// The question bank has not finished loading yet.
    Loading,
    /// Terminal: the bank is empty or the load failed.
    Empty,
    /// A question is on display.
    Question(QuestionView),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct QuestionView {
    pub round: String,
    pub number: u32,
    /// Public URL of the question's primary image (`q{number}.png`).
    pub image_url: String,
    pub layout: LayoutMode,
    pub options: Vec<OptionView>,
    pub image_ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_option: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verdict: Option<Verdict>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct OptionView {
    /// Option id as submitted back by the client, "1".."5".
    pub number: String,
    pub is_image: bool,
    /// Literal display text; absent for image options.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Resolved public URL; present only for image options.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}
