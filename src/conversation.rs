use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

// What the recognizer found in the user's message, checked in fixed priority
// order. A message that both greets and asks for a recommendation is treated
// as a greeting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Greeting,
    Thanks,
    Help,
    Recommend,
    CityQuery(String),
    Fallback,
}

static GREETING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:hi|hello|hey)\b").expect("greeting pattern"));

// The city name keeps its original casing; matching is case-insensitive.
static CITY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)weather\s*(?:in|at|for)?\s*([a-zA-Z][a-zA-Z ]*)").expect("city pattern")
});

/// Recognizes the intent of a single utterance. Keyword checks run over the
/// lower-cased text; city extraction runs over the original so the captured
/// name keeps its casing.
pub fn recognize(input: &str) -> Intent {
    let msg = input.to_lowercase();

    if GREETING_RE.is_match(&msg) {
        return Intent::Greeting;
    }
    if msg.contains("thank") {
        return Intent::Thanks;
    }
    if msg.contains("help") {
        return Intent::Help;
    }
    if msg.contains("recommend") || msg.contains("suggest") {
        return Intent::Recommend;
    }
    if let Some(city) = extract_city(input) {
        return Intent::CityQuery(city);
    }
    Intent::Fallback
}

/// Pulls a candidate city name out of phrases like "weather in Hyderabad".
/// The capture is not validated; the lookup decides whether it is a real
/// city.
pub fn extract_city(input: &str) -> Option<String> {
    CITY_RE
        .captures(input)
        .map(|caps| caps[1].trim().to_string())
        .filter(|city| !city.is_empty())
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

#[derive(Serialize, Debug, Clone)]
pub struct Message {
    pub sender: Sender,
    pub text: String,
}

// Ordered chat log for one session. Messages arrive in user/bot pairs and
// are never edited afterwards.
#[derive(Debug, Default)]
pub struct ConversationSession {
    messages: Vec<Message>,
}

impl ConversationSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_exchange(&mut self, user_text: &str, bot_text: &str) {
        self.messages.push(Message {
            sender: Sender::User,
            text: user_text.to_string(),
        });
        self.messages.push(Message {
            sender: Sender::Bot,
            text: bot_text.to_string(),
        });
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }
}
