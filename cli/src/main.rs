mod render;
mod repl;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand, ValueEnum};
use client::net::{BalanceClient, ChatSession, SessionEvent};
use client::state::attachments::{load_audio, load_image};
use client::state::chat::Author;
use client::util::preferences::FileStore;
use client::util::theme::{self, Theme};
use client::{AppEffect, ChatApp, ClientConfig, ClientError};
use frames::{ClientMessage, ServerMessage};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::warn;

use crate::render::Palette;
use crate::repl::{ParseError, ReplCommand};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),
    #[error("connection closed before a response arrived")]
    Closed,
    #[error("timed out waiting for a response")]
    Timeout,
    #[error("not signed in; pass --session-cookie or set CHAT_SESSION_COOKIE")]
    NotSignedIn,
}

#[derive(Parser, Debug)]
#[command(name = "chat-cli", about = "Terminal client for the assistant chat backend")]
struct Cli {
    #[arg(long, env = "CHAT_BASE_URL")]
    base_url: Option<String>,

    #[arg(long, env = "CHAT_SESSION_COOKIE", help = "Raw Cookie header, e.g. sessionid=...")]
    session_cookie: Option<String>,

    #[arg(long, env = "CHAT_PREFS_PATH", help = "Preferences file (theme)")]
    prefs: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive chat session.
    Chat,
    /// Send one message and print the reply.
    Send {
        message: String,
        #[arg(long)]
        audio: Option<PathBuf>,
        #[arg(long)]
        image: Option<PathBuf>,
        #[arg(long, default_value_t = false)]
        use_tools: bool,
        #[arg(long, default_value_t = false, requires = "use_tools")]
        extract_inputs: bool,
        #[arg(long, default_value_t = 120)]
        wait_secs: u64,
    },
    /// Print the account balance.
    Balance,
    /// Add funds, then print the refreshed balance.
    TopUp { amount: f64 },
    /// Show or change the stored theme.
    Theme {
        #[arg(value_enum)]
        action: Option<ThemeAction>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ThemeAction {
    Light,
    Dark,
    Toggle,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let mut config = ClientConfig::from_env();
    if let Some(base_url) = cli.base_url {
        config.set_base_url(base_url);
    }
    if let Some(cookie) = cli.session_cookie {
        config.session_cookie = Some(cookie);
    }
    if let Some(path) = cli.prefs {
        config.preferences_path = path;
    }

    match cli.command {
        Command::Chat => run_chat(config).await,
        Command::Send { message, audio, image, use_tools, extract_inputs, wait_secs } => {
            let options = SendOptions {
                audio,
                image,
                use_tools,
                extract_inputs,
                wait: Duration::from_secs(wait_secs),
            };
            run_send(&config, &message, options).await
        }
        Command::Balance => run_balance(&config).await,
        Command::TopUp { amount } => run_top_up(&config, amount).await,
        Command::Theme { action } => run_theme(&config, action),
    }
}

fn load_theme(config: &ClientConfig) -> Result<(FileStore, Theme), CliError> {
    let mut store = FileStore::open(&config.preferences_path)?;
    let theme = theme::read_preference(&mut store, theme::system_prefers_dark())?;
    Ok((store, theme))
}

fn run_theme(config: &ClientConfig, action: Option<ThemeAction>) -> Result<(), CliError> {
    let (mut store, current) = load_theme(config)?;
    let next = match action {
        None => current,
        Some(ThemeAction::Toggle) => theme::toggle(&mut store, current)?,
        Some(ThemeAction::Light) => {
            theme::set(&mut store, Theme::Light)?;
            Theme::Light
        }
        Some(ThemeAction::Dark) => {
            theme::set(&mut store, Theme::Dark)?;
            Theme::Dark
        }
    };
    println!("{}", next.as_str());
    Ok(())
}

async fn run_balance(config: &ClientConfig) -> Result<(), CliError> {
    let balance = BalanceClient::new(config)?.fetch_balance().await?;
    let balance = balance.ok_or(CliError::NotSignedIn)?;
    println!("{}", client::net::balance::format_balance(balance));
    Ok(())
}

async fn run_top_up(config: &ClientConfig, amount: f64) -> Result<(), CliError> {
    let balance = BalanceClient::new(config)?;
    balance.top_up(amount).await?;
    tokio::time::sleep(config.balance_refresh_delay).await;
    let current = balance.fetch_balance().await?.ok_or(CliError::NotSignedIn)?;
    println!("{}", client::net::balance::format_balance(current));
    Ok(())
}

struct SendOptions {
    audio: Option<PathBuf>,
    image: Option<PathBuf>,
    use_tools: bool,
    extract_inputs: bool,
    wait: Duration,
}

async fn run_send(
    config: &ClientConfig,
    message: &str,
    options: SendOptions,
) -> Result<(), CliError> {
    let (_, theme) = load_theme(config)?;
    let palette = Palette::for_theme(theme);
    let mut app = ChatApp::new(config, theme);
    app.flags.set_use_tools(options.use_tools);
    app.flags.set_extract_inputs(options.extract_inputs);
    if let Some(path) = &options.audio {
        app.draft.set_audio(load_audio(path).await?);
    }
    if let Some(path) = &options.image {
        app.draft.set_image(load_image(path).await?);
    }

    let mut session = ChatSession::connect(config).await?;
    app.submit(message, &session)?;

    let outcome = tokio::time::timeout(options.wait, async {
        loop {
            match session.next_event().await {
                Some(SessionEvent::Message(ServerMessage::ChatHistory { .. })) => {}
                Some(SessionEvent::Message(event)) => {
                    let done = matches!(
                        event,
                        ServerMessage::AiResponse { .. } | ServerMessage::InputRequest { .. }
                    );
                    app.handle(event);
                    flush_toasts(&mut app, &palette);
                    if done {
                        return Ok(());
                    }
                }
                Some(SessionEvent::Closed) | None => return Err(CliError::Closed),
            }
        }
    })
    .await;
    session.close().await;
    outcome.map_err(|_| CliError::Timeout)??;

    if let Some(form) = app.chat.pending_inputs() {
        println!("{}", render::input_form(form));
    } else if let Some(reply) = app.chat.messages().iter().rev().find(|m| m.author == Author::Bot) {
        println!("{}", reply.text);
    }
    Ok(())
}

fn flush_toasts(app: &mut ChatApp, palette: &Palette) {
    for toast in app.notifications.drain() {
        eprintln!("{}", render::toast(palette, &toast));
    }
}

fn spawn_balance_fetch(
    balance: BalanceClient,
    delay: Duration,
    results: mpsc::UnboundedSender<Option<f64>>,
) {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        match balance.fetch_balance().await {
            Ok(value) => {
                let _ = results.send(value);
            }
            Err(error) => warn!(%error, "balance refresh failed"),
        }
    });
}

/// Interactive session state for `chat-cli chat`.
struct Repl {
    config: ClientConfig,
    app: ChatApp,
    store: FileStore,
    session: ChatSession,
    balance: BalanceClient,
    balance_results: mpsc::UnboundedSender<Option<f64>>,
    palette: Palette,
    closed: bool,
}

async fn run_chat(config: ClientConfig) -> Result<(), CliError> {
    let (store, theme) = load_theme(&config)?;
    let balance = BalanceClient::new(&config)?;
    let session = ChatSession::connect(&config).await?;
    let (balance_tx, mut balance_rx) = mpsc::unbounded_channel();

    let mut repl = Repl {
        app: ChatApp::new(&config, theme),
        palette: Palette::for_theme(theme),
        config,
        store,
        session,
        balance,
        balance_results: balance_tx,
        closed: false,
    };
    repl.refresh_balance(Duration::ZERO);
    println!("{}", repl::HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let deadline = repl.app.next_pager_deadline();
        let wake = tokio::time::Instant::from_std(deadline.unwrap_or_else(Instant::now));

        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match repl::parse(&line) {
                    Ok(ReplCommand::Quit) => break,
                    Ok(command) => {
                        if let Err(error) = repl.execute(command).await {
                            eprintln!("error: {error}");
                        }
                    }
                    Err(ParseError::Empty) => {}
                    Err(error) => eprintln!("{error}"),
                }
            }
            event = repl.session.next_event(), if !repl.closed => match event {
                Some(SessionEvent::Message(message)) => repl.on_message(message),
                Some(SessionEvent::Closed) | None => {
                    repl.closed = true;
                    repl.app.on_closed();
                }
            },
            () = tokio::time::sleep_until(wake), if deadline.is_some() => {
                for request in repl.app.poll_pagers(Instant::now()) {
                    if let Err(error) = repl.app.request(&request, &repl.session) {
                        eprintln!("error: {error}");
                        continue;
                    }
                    let status = match request {
                        ClientMessage::LoadMoreJournals { .. } => {
                            render::paging_status(repl.app.journal_pager(), "journals")
                        }
                        _ => render::paging_status(repl.app.chat_pager(), "messages"),
                    };
                    if let Some(status) = status {
                        println!("{status}");
                    }
                }
            }
            Some(balance) = balance_rx.recv() => {
                repl.app.set_balance(balance);
                match repl.app.balance_label() {
                    Some(label) => println!("balance: {label}"),
                    None => println!("balance: not signed in"),
                }
            }
        }
        flush_toasts(&mut repl.app, &repl.palette);
    }

    repl.session.close().await;
    Ok(())
}

impl Repl {
    fn refresh_balance(&self, delay: Duration) {
        spawn_balance_fetch(self.balance.clone(), delay, self.balance_results.clone());
    }

    fn send(&self, request: &ClientMessage) -> Result<(), CliError> {
        self.app.request(request, &self.session)?;
        Ok(())
    }

    fn on_message(&mut self, message: ServerMessage) {
        let view = View::for_message(&message);
        for effect in self.app.handle(message) {
            match effect {
                AppEffect::RefreshBalance => self.refresh_balance(self.config.balance_refresh_delay),
            }
        }

        let app = &self.app;
        match view {
            View::None => {}
            View::LastMessage => {
                if let Some(last) = app.chat.messages().last() {
                    println!("{}", render::message(&self.palette, last));
                }
            }
            View::History => {
                for message in app.chat.messages() {
                    println!("{}", render::message(&self.palette, message));
                }
            }
            View::Older(count) if count > 0 => {
                let older = &app.chat.messages()[..count.min(app.chat.messages().len())];
                println!("{}", render::older_messages(&self.palette, older));
            }
            View::Older(_) => println!("--- no older messages ---"),
            View::Inputs => {
                if let Some(form) = app.chat.pending_inputs() {
                    println!("{}", render::input_form(form));
                }
            }
            View::Profile => println!("{}", render::profile(&app.panels.profile)),
            View::Journal => println!("{}", render::journal(&app.panels.journal)),
            View::Responder => println!("{}", render::responder(&app.panels.responder)),
            View::Usage => println!("{}", render::transactions(&app.panels.transactions)),
        }
    }

    async fn execute(&mut self, command: ReplCommand) -> Result<(), CliError> {
        let app = &mut self.app;
        match command {
            ReplCommand::Chat(text) => {
                app.submit(&text, &self.session)?;
            }
            ReplCommand::AttachAudio(path) => {
                app.draft.set_audio(load_audio(&path).await?);
                println!("{}", render::compose_status(app.flags, &app.draft));
            }
            ReplCommand::AttachImage(path) => {
                app.draft.set_image(load_image(&path).await?);
                println!("{}", render::compose_status(app.flags, &app.draft));
            }
            ReplCommand::CancelAudio => {
                app.draft.cancel_audio();
                println!("{}", render::compose_status(app.flags, &app.draft));
            }
            ReplCommand::CancelImage => {
                app.draft.cancel_image();
                println!("{}", render::compose_status(app.flags, &app.draft));
            }
            ReplCommand::ToggleTools | ReplCommand::ToggleExtract => {
                if let Err(reason) = repl::toggle_flag(&mut app.flags, &command) {
                    println!("{reason}");
                }
                println!("{}", render::compose_status(app.flags, &app.draft));
            }
            ReplCommand::MoreChat => match render::paging_status(app.chat_pager(), "messages") {
                Some(status) => println!("{status}"),
                None => app.scroll_chat(Instant::now(), true),
            },
            ReplCommand::MoreJournals => {
                match render::paging_status(app.journal_pager(), "journals") {
                    Some(status) => println!("{status}"),
                    None => app.scroll_journals(Instant::now(), true),
                }
            }
            ReplCommand::Profile => self.send(&ClientMessage::UserProfile)?,
            ReplCommand::ProfileAdd(text) => {
                let panel = &mut app.panels.profile;
                panel.add_entry();
                if let Some(last) = panel.entries.last_mut() {
                    *last = text;
                }
                println!("{}", render::profile(panel));
            }
            ReplCommand::ProfileEdit { index, text } => {
                let panel = &mut app.panels.profile;
                match panel.entries.get_mut(index - 1) {
                    Some(entry) => *entry = text,
                    None => println!("no profile entry {index}"),
                }
                println!("{}", render::profile(panel));
            }
            ReplCommand::ProfileSave => {
                let request = app.panels.profile.change_request();
                self.send(&request)?;
            }
            ReplCommand::ProfileSettings { for_update, till_update, model } => {
                app.panels.profile.messages_for_update = for_update;
                app.panels.profile.messages_till_update = till_update;
                let request = app.panels.profile.settings_request(model);
                self.send(&request)?;
            }
            ReplCommand::Journal => self.send(&ClientMessage::UserJournal)?,
            ReplCommand::JournalSettings { for_update, till_update, model } => {
                app.panels.journal.messages_for_update = for_update;
                app.panels.journal.messages_till_update = till_update;
                let request = app.panels.journal.settings_request(model);
                self.send(&request)?;
            }
            ReplCommand::Responder => self.send(&ClientMessage::UserResponder)?,
            ReplCommand::ResponderPersonality(text) => {
                app.panels.responder.personality = text;
                println!("{}", render::responder(&app.panels.responder));
            }
            ReplCommand::ResponderSettings { messages, model } => {
                app.panels.responder.messages_for_input_extraction = messages;
                let request = app.panels.responder.settings_request(model);
                self.send(&request)?;
            }
            ReplCommand::Usage => self.send(&ClientMessage::UserTransactions)?,
            ReplCommand::SetInput { name, value } => {
                let form = app.chat.pending_inputs_mut().ok_or(ClientError::NoInputRequest)?;
                if !form.set(&name, value) {
                    println!("no input named `{name}`");
                }
                println!("{}", render::input_form(form));
            }
            ReplCommand::SendInputs => app.submit_inputs(&self.session)?,
            ReplCommand::CancelInputs => app.cancel_inputs()?,
            ReplCommand::Theme => {
                let theme = app.toggle_theme(&mut self.store)?;
                self.palette = Palette::for_theme(theme);
                println!("theme: {}", theme.as_str());
            }
            ReplCommand::Balance => self.refresh_balance(Duration::ZERO),
            ReplCommand::TopUp(amount) => {
                self.balance.top_up(amount).await?;
                self.refresh_balance(self.config.balance_refresh_delay);
            }
            ReplCommand::Help => println!("{}", repl::HELP),
            ReplCommand::Quit => {}
        }
        Ok(())
    }
}

/// What to print after an inbound event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum View {
    None,
    LastMessage,
    History,
    Older(usize),
    Inputs,
    Profile,
    Journal,
    Responder,
    Usage,
}

impl View {
    fn for_message(message: &ServerMessage) -> Self {
        match message {
            ServerMessage::LoadingResponse
            | ServerMessage::UserMessage { .. }
            | ServerMessage::AiResponse { .. } => Self::LastMessage,
            ServerMessage::ChatHistory { .. } => Self::History,
            ServerMessage::MoreChatHistory { chat } => Self::Older(chat.len()),
            ServerMessage::InputRequest { .. } => Self::Inputs,
            ServerMessage::UserProfile { .. } => Self::Profile,
            ServerMessage::UserJournal { .. } => Self::Journal,
            ServerMessage::UserResponder { .. } => Self::Responder,
            ServerMessage::UserTransactionsHistory { .. } => Self::Usage,
            ServerMessage::ConnectionEstablished { .. }
            | ServerMessage::Notification { .. }
            | ServerMessage::Unknown => Self::None,
        }
    }
}
