//! Terminal rendering of engine events.

use std::io::{self, Write};

use chrono::Local;
use colored::{ColoredString, Colorize};
use murmur_core::{Ending, Message, Speaker};
use murmur_engine::{EngineEvent, OfferedChoice};
use murmur_store::Theme;

/// Prints transcript deltas, choices, status changes, and endings.
pub struct Presenter {
    protagonist: String,
    theme: Theme,
    interactive: bool,
    printed: usize,
    choices: Vec<OfferedChoice>,
}

impl Presenter {
    pub fn new(protagonist: &str, theme: Theme) -> Self {
        Self {
            protagonist: protagonist.to_string(),
            theme,
            interactive: false,
            printed: 0,
            choices: Vec::new(),
        }
    }

    /// Show typing indicators and input hints.
    pub fn interactive(mut self) -> Self {
        self.interactive = true;
        self
    }

    /// Choices from the most recent offer.
    pub fn choices(&self) -> &[OfferedChoice] {
        &self.choices
    }

    pub fn render(&mut self, event: &EngineEvent) {
        match event {
            EngineEvent::TypingStarted if self.interactive => {
                print!("  {}\r", format!("{} is typing...", self.protagonist).dimmed());
                let _ = io::stdout().flush();
            }
            EngineEvent::TypingEnded if self.interactive => {
                print!("\x1b[2K\r");
                let _ = io::stdout().flush();
            }
            _ => {
                for line in self.lines_for(event) {
                    println!("{line}");
                }
            }
        }
    }

    fn lines_for(&mut self, event: &EngineEvent) -> Vec<String> {
        match event {
            EngineEvent::MessagesUpdated(messages) => self.new_messages(messages),
            EngineEvent::ChoicesAvailable(choices) => {
                self.choices = choices.clone();
                self.choice_lines()
            }
            EngineEvent::StatusChanged { text, .. } => {
                vec![format!("  ({text})").dimmed().to_string()]
            }
            EngineEvent::GameOver(ending) => self.ending_lines(ending),
            EngineEvent::TypingStarted | EngineEvent::TypingEnded => Vec::new(),
        }
    }

    fn new_messages(&mut self, messages: &[Message]) -> Vec<String> {
        let mut lines = Vec::new();
        if messages.len() < self.printed {
            lines.push(String::new());
            lines.push("  -- conversation restarted --".dimmed().to_string());
            self.printed = 0;
        }
        for message in &messages[self.printed..] {
            lines.push(self.message_line(message));
        }
        self.printed = messages.len();
        lines
    }

    fn choice_lines(&self) -> Vec<String> {
        if self.choices.is_empty() {
            return Vec::new();
        }
        let mut lines = vec![String::new()];
        for (idx, choice) in self.choices.iter().enumerate() {
            lines.push(format!("  [{}] {}", idx + 1, choice.text));
        }
        if self.interactive {
            lines.push(
                "  Type a number, or reply in your own words."
                    .dimmed()
                    .to_string(),
            );
        }
        lines
    }

    fn ending_lines(&self, ending: &Ending) -> Vec<String> {
        let mut lines = vec![String::new(), format!("  {}", ending.text.bold())];
        if self.interactive {
            lines.push(
                "  /reset to play again, /quit to leave."
                    .dimmed()
                    .to_string(),
            );
        }
        lines
    }

    fn message_line(&self, message: &Message) -> String {
        let time = match message.timestamp {
            Some(at) if message.show_timestamp => {
                format!("{} ", at.with_timezone(&Local).format("%H:%M"))
                    .dimmed()
                    .to_string()
            }
            _ => String::new(),
        };
        match &message.speaker {
            Speaker::System => format!("  {}", message.text.italic().dimmed()),
            Speaker::Player => format!("  {time}{} {}", "you:".green().bold(), message.text),
            Speaker::Character(id) => {
                let name = self.accent(format!("{}:", self.display_name(id)).bold());
                format!("  {time}{name} {}", message.text)
            }
        }
    }

    fn accent(&self, text: ColoredString) -> ColoredString {
        match self.theme {
            Theme::Dark => text.cyan(),
            Theme::Light => text.blue(),
        }
    }

    fn display_name(&self, id: &str) -> String {
        if id.eq_ignore_ascii_case(&self.protagonist) {
            return self.protagonist.clone();
        }
        let mut chars = id.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}
