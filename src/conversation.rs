use std::time::Duration;

use crate::api::{ChatResponse, Source};

/// Pause between receiving a response and revealing the assistant message,
/// so replies never look instantaneous.
pub const REVEAL_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    Send,
    Receive,
}

/// Side effects requested by the controller. The shell (the iced app, or a
/// test harness) decides how to execute them; the controller itself never
/// touches the network, the clock, or the speakers.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Send the trimmed question to the chat endpoint.
    Dispatch(String),
    /// Fire `reveal_ready` after `REVEAL_DELAY`.
    ScheduleReveal,
    Play(Cue),
    /// Surface a non-blocking error notification.
    Notify(String),
}

/// The conversation state machine: message history, the active source set,
/// and the single-flight request guard. Transitions are driven by event
/// methods which return the effects to run; at most one request is
/// outstanding at any time.
#[derive(Debug)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
    sources: Vec<Source>,
    pending: bool,
    typing: bool,
    sound_enabled: bool,
    staged: Option<ChatResponse>,
}

impl Conversation {
    pub fn new(sound_enabled: bool) -> Self {
        Conversation {
            messages: Vec::new(),
            sources: Vec::new(),
            pending: false,
            typing: false,
            sound_enabled,
            staged: None,
        }
    }

    /// Accept a user submission. A no-op (no state change, no effects) when
    /// the trimmed input is empty or a request is already pending.
    pub fn submit(&mut self, input: &str) -> Vec<Effect> {
        let text = input.trim();
        if text.is_empty() || self.pending {
            return Vec::new();
        }

        self.messages.push(ChatMessage {
            role: Role::User,
            content: text.to_string(),
        });
        self.pending = true;
        self.typing = true;

        let mut effects = Vec::new();
        if self.sound_enabled {
            effects.push(Effect::Play(Cue::Send));
        }
        effects.push(Effect::Dispatch(text.to_string()));
        effects
    }

    /// A successful response arrived. The assistant message is not appended
    /// yet; it is staged until the reveal delay elapses.
    pub fn response_received(&mut self, response: ChatResponse) -> Vec<Effect> {
        if !self.pending {
            return Vec::new();
        }
        self.typing = false;
        self.staged = Some(response);
        vec![Effect::ScheduleReveal]
    }

    /// The reveal delay elapsed: append the staged assistant message and
    /// replace the source set with the new turn's sources.
    pub fn reveal_ready(&mut self) -> Vec<Effect> {
        let Some(response) = self.staged.take() else {
            return Vec::new();
        };

        self.messages.push(ChatMessage {
            role: Role::Assistant,
            content: response.answer,
        });
        self.sources = response.sources;
        self.pending = false;

        if self.sound_enabled {
            vec![Effect::Play(Cue::Receive)]
        } else {
            Vec::new()
        }
    }

    /// The request failed. Flags reset, no assistant message is appended,
    /// and the user message already in history stays there.
    pub fn response_failed(&mut self, detail: impl Into<String>) -> Vec<Effect> {
        if !self.pending {
            return Vec::new();
        }
        self.typing = false;
        self.pending = false;
        self.staged = None;
        vec![Effect::Notify(detail.into())]
    }

    /// Flips whether cues are emitted. No other effect.
    pub fn toggle_sound(&mut self) {
        self.sound_enabled = !self.sound_enabled;
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn is_typing(&self) -> bool {
        self.typing
    }

    pub fn sound_enabled(&self) -> bool {
        self.sound_enabled
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::SourceMetadata;

    fn source(id: i64) -> Source {
        Source {
            id,
            content: format!("passage {}", id),
            metadata: SourceMetadata::default(),
            similarity: 0.8,
        }
    }

    fn response(answer: &str, sources: Vec<Source>) -> ChatResponse {
        ChatResponse {
            answer: answer.to_string(),
            sources,
        }
    }

    #[test]
    fn test_full_cycle() {
        let mut conv = Conversation::new(true);
        assert!(conv.is_empty());
        assert!(!conv.is_pending());
        assert!(!conv.is_typing());

        let effects = conv.submit("What vitamins are fat soluble?");
        assert_eq!(
            effects,
            vec![
                Effect::Play(Cue::Send),
                Effect::Dispatch("What vitamins are fat soluble?".to_string()),
            ]
        );
        assert!(conv.is_pending());
        assert!(conv.is_typing());
        assert_eq!(conv.messages().len(), 1);
        assert_eq!(conv.messages()[0].role, Role::User);
        assert!(!conv.is_empty());

        let effects = conv.response_received(response("A, D, E, K. [1]", vec![source(1)]));
        assert_eq!(effects, vec![Effect::ScheduleReveal]);
        assert!(conv.is_pending());
        assert!(!conv.is_typing());
        assert_eq!(conv.messages().len(), 1);

        let effects = conv.reveal_ready();
        assert_eq!(effects, vec![Effect::Play(Cue::Receive)]);
        assert!(!conv.is_pending());
        assert_eq!(conv.messages().len(), 2);
        assert_eq!(conv.messages()[1].role, Role::Assistant);
        assert_eq!(conv.messages()[1].content, "A, D, E, K. [1]");
        assert_eq!(conv.sources().len(), 1);
    }

    #[test]
    fn test_submit_trims_input() {
        let mut conv = Conversation::new(false);
        let effects = conv.submit("  hello  ");
        assert_eq!(effects, vec![Effect::Dispatch("hello".to_string())]);
        assert_eq!(conv.messages()[0].content, "hello");
    }

    #[test]
    fn test_empty_and_whitespace_submissions_are_noops() {
        let mut conv = Conversation::new(true);
        assert!(conv.submit("").is_empty());
        assert!(conv.submit("   \t\n").is_empty());
        assert!(conv.is_empty());
        assert!(!conv.is_pending());
    }

    #[test]
    fn test_second_submit_while_pending_is_noop() {
        let mut conv = Conversation::new(true);
        conv.submit("first");
        let effects = conv.submit("second");
        assert!(effects.is_empty());
        assert_eq!(conv.messages().len(), 1);
        assert_eq!(conv.messages()[0].content, "first");
    }

    #[test]
    fn test_failure_resets_flags_and_keeps_history() {
        let mut conv = Conversation::new(true);
        conv.submit("question");
        let effects = conv.response_failed("connection refused");
        assert_eq!(effects, vec![Effect::Notify("connection refused".to_string())]);
        assert!(!conv.is_pending());
        assert!(!conv.is_typing());
        assert_eq!(conv.messages().len(), 1);
        assert_eq!(conv.messages()[0].role, Role::User);

        // Recoverable: the next submission goes through.
        assert!(!conv.submit("again").is_empty());
    }

    #[test]
    fn test_sources_are_replaced_not_merged() {
        let mut conv = Conversation::new(false);
        conv.submit("one");
        conv.response_received(response("a", vec![source(1), source(2)]));
        conv.reveal_ready();
        assert_eq!(conv.sources().len(), 2);

        conv.submit("two");
        conv.response_received(response("b", vec![source(9)]));
        conv.reveal_ready();
        assert_eq!(conv.sources().len(), 1);
        assert_eq!(conv.sources()[0].id, 9);
    }

    #[test]
    fn test_response_without_sources_clears_current_set() {
        let mut conv = Conversation::new(false);
        conv.submit("one");
        conv.response_received(response("a", vec![source(1)]));
        conv.reveal_ready();
        conv.submit("two");
        conv.response_received(response("b", Vec::new()));
        conv.reveal_ready();
        assert!(conv.sources().is_empty());
    }

    #[test]
    fn test_sound_toggle_suppresses_cues_only() {
        let mut conv = Conversation::new(true);
        conv.toggle_sound();
        assert!(!conv.sound_enabled());

        let effects = conv.submit("quiet");
        assert_eq!(effects, vec![Effect::Dispatch("quiet".to_string())]);

        conv.response_received(response("a", Vec::new()));
        assert!(conv.reveal_ready().is_empty());
        assert_eq!(conv.messages().len(), 2);
    }

    #[test]
    fn test_stray_events_are_noops() {
        let mut conv = Conversation::new(true);
        assert!(conv.reveal_ready().is_empty());
        assert!(conv.response_failed("late").is_empty());
        assert!(conv
            .response_received(response("late", Vec::new()))
            .is_empty());
        assert!(conv.is_empty());
    }
}
