use anyhow::Result;
use colored::Colorize;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::info;

use crate::client::{HttpReplyClient, ReplyClient};
use crate::controller::ChatController;
use crate::events::ChatEvent;
use crate::session::{ConversationId, Role};
use crate::settings::Settings;

const MODEL_PROMPT: &str = "Enter the machine model (e.g., VF-4): ";

#[derive(Debug, Clone, PartialEq, Eq)]
struct SidebarEntry {
    id: ConversationId,
    label: String,
}

/// Applies controller events to the terminal: transcript lines plus the
/// sidebar listing of saved conversations, newest first.
pub struct Console {
    sidebar: Vec<SidebarEntry>,
    sidebar_visible: bool,
}

impl Console {
    pub fn new() -> Self {
        Self {
            sidebar: Vec::new(),
            sidebar_visible: true,
        }
    }

    pub fn apply(&mut self, event: &ChatEvent) {
        match event {
            ChatEvent::MessageAppended { role, content } => print_message(*role, content),
            ChatEvent::TranscriptCleared => {
                println!("{}", "────────────────────────────────────".bright_black());
            }
            ChatEvent::SidebarInserted { id, label } => {
                self.sidebar.insert(
                    0,
                    SidebarEntry {
                        id: *id,
                        label: label.clone(),
                    },
                );
                if self.sidebar_visible {
                    println!("{}", format!("saved: {label}").bright_black());
                }
            }
            ChatEvent::SidebarUpdated { id, label } => {
                if let Some(entry) = self.sidebar.iter_mut().find(|e| e.id == *id) {
                    entry.label = label.clone();
                }
            }
        }
    }

    pub fn toggle_sidebar(&mut self) -> bool {
        self.sidebar_visible = !self.sidebar_visible;
        self.sidebar_visible
    }

    /// Id behind a 1-based `/chats` listing position.
    pub fn entry_at(&self, position: usize) -> Option<ConversationId> {
        self.sidebar.get(position.checked_sub(1)?).map(|e| e.id)
    }

    pub fn print_sidebar(&self) {
        if !self.sidebar_visible {
            println!("{}", "sidebar is collapsed; /sidebar to expand".bright_black());
            return;
        }
        if self.sidebar.is_empty() {
            println!("{}", "no saved conversations".bright_black());
            return;
        }
        for (i, entry) in self.sidebar.iter().enumerate() {
            println!(
                "{:>3}. {}  {}",
                i + 1,
                entry.label,
                entry
                    .id
                    .created_at()
                    .format("%H:%M:%S")
                    .to_string()
                    .bright_black()
            );
        }
    }
}

fn print_message(role: Role, content: &str) {
    match role {
        Role::User => println!("{} {}", "you>".cyan().bold(), content),
        Role::Assistant => println!("{} {}", "assistant>".green().bold(), content),
    }
}

fn print_help() {
    println!("  /new          save the current chat and start a fresh one");
    println!("  /chats        list saved conversations");
    println!("  /load <n>     resume conversation n from the listing");
    println!("  /sidebar      collapse or expand the sidebar");
    println!("  /help         this text");
    println!("  exit | quit   leave");
}

fn prompt_model(editor: &mut DefaultEditor) -> Option<String> {
    match editor.readline(MODEL_PROMPT) {
        Ok(answer) => {
            let answer = answer.trim().to_string();
            if answer.is_empty() { None } else { Some(answer) }
        }
        Err(_) => None,
    }
}

fn parse_load_position(line: &str) -> Option<usize> {
    let rest = line.strip_prefix("/load")?.trim();
    let n: usize = rest.parse().ok()?;
    (n >= 1).then_some(n)
}

fn apply_all(console: &mut Console, events: &[ChatEvent]) {
    for event in events {
        console.apply(event);
    }
}

pub async fn run_repl(settings: Settings) -> Result<()> {
    info!(endpoint = %settings.endpoint, "starting chat console");
    let client = HttpReplyClient::new(settings.endpoint.clone());
    let mut controller = ChatController::new(settings.default_model.clone());
    let mut console = Console::new();
    let mut editor = DefaultEditor::new()?;

    println!("{}", "Machine service assistant".bold());
    match settings.default_model.as_deref() {
        Some(model) => println!(
            "{}",
            format!("Model: {model} • endpoint {}", settings.endpoint).bright_black()
        ),
        None => println!(
            "{}",
            format!(
                "No machine model selected; /new picks one • endpoint {}",
                settings.endpoint
            )
            .bright_black()
        ),
    }
    println!(
        "{}",
        "Commands: /new /chats /load <n> /sidebar /help • exit to quit\n".bright_black()
    );

    loop {
        let prompt = match controller.session().model.as_str() {
            "" => "> ".to_string(),
            model => format!("{model}> "),
        };
        let line = match editor.readline(&prompt) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };
        let line = line.trim().to_string();
        if line.is_empty() {
            continue;
        }
        let _ = editor.add_history_entry(&line);

        match line.as_str() {
            "exit" | "quit" => break,
            "/help" => print_help(),
            "/new" => {
                let events = controller.new_chat(|| prompt_model(&mut editor));
                apply_all(&mut console, &events);
            }
            "/chats" => console.print_sidebar(),
            "/sidebar" => {
                if console.toggle_sidebar() {
                    console.print_sidebar();
                } else {
                    println!("{}", "sidebar collapsed".bright_black());
                }
            }
            _ if line.starts_with("/load") => match parse_load_position(&line) {
                Some(n) => match console.entry_at(n) {
                    Some(id) => {
                        let events = controller.load(id);
                        apply_all(&mut console, &events);
                    }
                    None => println!("{}", "no such conversation".bright_black()),
                },
                None => println!("{}", "usage: /load <n>".bright_black()),
            },
            _ if line.starts_with('/') => {
                println!(
                    "{}",
                    format!("unknown command {line}; /help lists commands").bright_black()
                );
            }
            _ => {
                let Some((pending, events)) = controller.submit(&line) else {
                    continue;
                };
                apply_all(&mut console, &events);
                let outcome = client.reply(&pending.model, &pending.conversation).await;
                let events = controller.resolve(pending, outcome);
                apply_all(&mut console, &events);
            }
        }
    }
    Ok(())
}
