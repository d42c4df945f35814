use iced::{
    widget::{button, column, container, row, scrollable, text, text_input, tooltip, text_input::Id},
    Element, Length, Task, Theme, Font, Subscription,
    time, alignment, Padding,
    window,
};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use nutrichat::api::{ChatClient, ChatResponse};
use nutrichat::citations::{self, Citation, Segment};
use nutrichat::config::Config;
use nutrichat::conversation::{ChatMessage, Conversation, Effect, Role, REVEAL_DELAY};
use nutrichat::{audio, fixtures};

fn main() -> iced::Result {
    let config = Config::load();

    iced::application("NutriChat", App::update, App::view)
        .theme(App::theme)
        .subscription(App::subscription)
        .window(window::Settings {
            size: iced::Size::new(config.window.width as f32, config.window.height as f32),
            position: window::Position::Centered,
            ..Default::default()
        })
        .default_font(Font::MONOSPACE)
        .run_with(App::new)
}

#[derive(Debug, Clone)]
enum Message {
    InputChanged(String),
    Submit,
    ResponseReceived(ChatResponse),
    RequestFailed(String),
    RevealElapsed,
    ToggleSound,
    Tick,
}

struct App {
    input_text: String,
    conversation: Conversation,
    error_banner: Option<String>,
    typing_frame: usize,
    client: Option<Arc<ChatClient>>,
    input_id: Id,
}

impl App {
    fn new() -> (Self, Task<Message>) {
        let config = Config::load();

        let client = config
            .chat
            .endpoint
            .clone()
            .map(|endpoint| Arc::new(ChatClient::with_config(endpoint)));

        let input_id = Id::unique();

        let app = App {
            input_text: String::new(),
            conversation: Conversation::new(config.chat.sound),
            error_banner: None,
            typing_frame: 0,
            client,
            input_id: input_id.clone(),
        };

        (app, text_input::focus(input_id))
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::InputChanged(value) => {
                self.input_text = value;
                Task::none()
            }
            Message::Submit => {
                let effects = self.conversation.submit(&self.input_text);
                if effects.is_empty() {
                    return Task::none();
                }
                self.input_text.clear();
                self.error_banner = None;
                self.run_effects(effects)
            }
            Message::ResponseReceived(response) => {
                let effects = self.conversation.response_received(response);
                self.run_effects(effects)
            }
            Message::RevealElapsed => {
                let effects = self.conversation.reveal_ready();
                self.run_effects(effects)
            }
            Message::RequestFailed(detail) => {
                eprintln!("Chat error: {}", detail);
                let effects = self.conversation.response_failed(detail);
                self.run_effects(effects)
            }
            Message::ToggleSound => {
                self.conversation.toggle_sound();
                Task::none()
            }
            Message::Tick => {
                if self.conversation.is_typing() {
                    self.typing_frame = (self.typing_frame + 1) % 3;
                }
                Task::none()
            }
        }
    }

    fn run_effects(&mut self, effects: Vec<Effect>) -> Task<Message> {
        let mut tasks = Vec::new();

        for effect in effects {
            match effect {
                Effect::Dispatch(question) => match &self.client {
                    Some(client) => {
                        let client = client.clone();
                        tasks.push(Task::future(async move {
                            match client.send(&question).await {
                                Ok(response) => Message::ResponseReceived(response),
                                Err(e) => Message::RequestFailed(e.to_string()),
                            }
                        }));
                    }
                    None => {
                        // No endpoint configured: answer from the built-in
                        // fixture set, with a short pause so it still feels
                        // like a round trip.
                        tasks.push(Task::future(async move {
                            tokio::time::sleep(Duration::from_millis(600)).await;
                            Message::ResponseReceived(fixtures::canned_response(&question))
                        }));
                    }
                },
                Effect::ScheduleReveal => {
                    tasks.push(Task::future(async {
                        tokio::time::sleep(REVEAL_DELAY).await;
                        Message::RevealElapsed
                    }));
                }
                Effect::Play(cue) => audio::play(cue),
                Effect::Notify(_detail) => {
                    self.error_banner =
                        Some("Failed to get response. Please try again.".to_string());
                    desktop_notify();
                }
            }
        }

        Task::batch(tasks)
    }

    fn subscription(&self) -> Subscription<Message> {
        if self.conversation.is_typing() {
            time::every(Duration::from_millis(300)).map(|_| Message::Tick)
        } else {
            Subscription::none()
        }
    }

    fn view(&self) -> Element<Message> {
        let sound_label = if self.conversation.sound_enabled() {
            "sound: on"
        } else {
            "sound: off"
        };

        let header = row![
            column![
                text("NutriChat").size(22),
                text("RAG nutrition chatbot").size(13),
            ]
            .spacing(2)
            .width(Length::Fill),
            button(text(sound_label).size(13))
                .on_press(Message::ToggleSound)
                .padding(8),
        ]
        .padding(Padding::from([0, 4]));

        let mut feed = column![].spacing(12).padding(10);

        if self.conversation.is_empty() {
            feed = feed.push(empty_state());
        }

        for message in self.conversation.messages() {
            feed = feed.push(self.message_row(message));
        }

        if self.conversation.is_typing() {
            feed = feed.push(typing_row(self.typing_frame));
        }

        let input = text_input(
            "Ask about nutrition, vitamins, minerals, or any health-related topic...",
            &self.input_text,
        )
        .on_input(Message::InputChanged)
        .on_submit(Message::Submit)
        .padding(12)
        .size(15)
        .id(self.input_id.clone());

        let send = button(text("Send").size(15))
            .on_press(Message::Submit)
            .padding(12);

        let mut content = column![header].spacing(10).padding(10);

        if let Some(banner) = &self.error_banner {
            content = content.push(text(banner.clone()).size(14));
        }

        content = content.push(scrollable(feed).height(Length::Fill));

        if let Some(panel) = self.sources_panel() {
            content = content.push(panel);
        }

        content = content.push(row![input, send].spacing(8));

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn message_row(&self, message: &ChatMessage) -> Element<Message> {
        match message.role {
            Role::User => container(
                container(text(message.content.clone()).size(15)).padding(10),
            )
            .width(Length::Fill)
            .align_x(alignment::Horizontal::Right)
            .into(),
            Role::Assistant => container(self.assistant_bubble(&message.content))
                .width(Length::Fill)
                .align_x(alignment::Horizontal::Left)
                .into(),
        }
    }

    fn assistant_bubble(&self, content: &str) -> Element<'static, Message> {
        let segments = citations::render(content, self.conversation.sources());

        let mut display = String::new();
        let mut chips: Vec<Element<'static, Message>> = Vec::new();
        let mut seen = HashSet::new();

        for segment in &segments {
            match segment {
                Segment::Plain(s) => display.push_str(s),
                Segment::Citation(citation) => {
                    display.push('[');
                    display.push_str(&citation.label);
                    display.push(']');
                    if seen.insert(citation.ordinal) {
                        chips.push(citation_chip(citation));
                    }
                }
            }
        }

        let mut bubble = column![text(display).size(15)].spacing(8);

        if !chips.is_empty() {
            let mut chip_row = row![].spacing(8);
            for chip in chips {
                chip_row = chip_row.push(chip);
            }
            bubble = bubble.push(chip_row);
        }

        container(bubble).padding(10).into()
    }

    fn sources_panel(&self) -> Option<Element<Message>> {
        let sources = self.conversation.sources();
        if sources.is_empty() {
            return None;
        }

        let mut panel = column![text("Sources Referenced").size(14)].spacing(6);

        for source in sources {
            let ordinal = citations::citation_ordinal(sources, source.id).unwrap_or(0);
            let page = source
                .metadata
                .page
                .map(|p| p.to_string())
                .unwrap_or_else(|| "?".to_string());
            let mut preview: String = source.content.chars().take(120).collect();
            if source.content.chars().nth(120).is_some() {
                preview.push_str("...");
            }

            panel = panel.push(
                column![
                    text(format!(
                        "[{}] Page {} · {:.1}%",
                        ordinal,
                        page,
                        source.similarity * 100.0
                    ))
                    .size(13),
                    text(preview).size(12),
                ]
                .spacing(2),
            );
        }

        Some(container(panel).padding(10).width(Length::Fill).into())
    }

    fn theme(&self) -> Theme {
        Theme::TokyoNight
    }
}

fn citation_chip(citation: &Citation) -> Element<'static, Message> {
    let label = text(format!(
        "[{}] Page {} · {}% match",
        citation.label,
        citation.page_label(),
        citation.similarity_percent()
    ))
    .size(13);

    let tip = container(text(citation.preview.clone()).size(13))
        .padding(10)
        .max_width(340);

    tooltip(label, tip, tooltip::Position::Top).into()
}

fn typing_row(frame: usize) -> Element<'static, Message> {
    let dots = ["·", "··", "···"][frame % 3];
    container(container(text(dots).size(18)).padding(10))
        .width(Length::Fill)
        .align_x(alignment::Horizontal::Left)
        .into()
}

fn empty_state() -> Element<'static, Message> {
    container(
        column![
            text("Ask me about nutrition!").size(18),
            text("I can help you with questions about the nutrition document.").size(14),
        ]
        .spacing(8)
        .align_x(alignment::Horizontal::Center),
    )
    .width(Length::Fill)
    .padding(Padding::from([40, 0]))
    .align_x(alignment::Horizontal::Center)
    .into()
}

/// Best-effort desktop notification on request failure. Never blocks the
/// update loop; failures are swallowed.
fn desktop_notify() {
    std::thread::spawn(|| {
        let _ = notify_rust::Notification::new()
            .summary("NutriChat")
            .body("Failed to get response. Please try again.")
            .show();
    });
}
