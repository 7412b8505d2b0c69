//! Interactive terminal session.

use std::{io::Write, sync::Arc};

use rustyline::{DefaultEditor, error::ReadlineError};
use tokio::{
    sync::{broadcast, mpsc, oneshot, watch},
    task::JoinHandle,
};

use crate::{
    domain::{MessageToSend, PublicId, SearchQuery, State},
    error::ClientError,
    usecase::{
        AuthService, ConversationsView, SearchResults, SyncInput, ToastService, UserSearchService,
    },
};

use super::{
    command::{Command, ConversationRef, parse_command},
    formatter::MessageFormatter,
};

const PROMPT: &str = "wac> ";

/// Redisplay the prompt after printing asynchronously
pub fn redisplay_prompt() {
    print!("{}", PROMPT);
    std::io::stdout().flush().ok();
}

/// Resolve a list position or id against the displayed conversations
pub fn resolve_conversation(
    view: &ConversationsView,
    reference: ConversationRef,
) -> Option<PublicId> {
    match reference {
        ConversationRef::Index(index) => view
            .conversations
            .get(index.checked_sub(1)?)
            .map(|conversation| conversation.public_id),
        ConversationRef::Id(id) => view
            .conversations
            .iter()
            .any(|conversation| conversation.public_id == id)
            .then_some(id),
    }
}

pub struct Repl {
    auth: Arc<AuthService>,
    inbox: mpsc::UnboundedSender<SyncInput>,
    view: watch::Receiver<ConversationsView>,
    navigation: watch::Receiver<Option<PublicId>>,
    search: UserSearchService,
    toasts: ToastService,
    formatter: MessageFormatter,
    page_size: u32,
}

impl Repl {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        auth: Arc<AuthService>,
        inbox: mpsc::UnboundedSender<SyncInput>,
        view: watch::Receiver<ConversationsView>,
        navigation: watch::Receiver<Option<PublicId>>,
        search: UserSearchService,
        toasts: ToastService,
        formatter: MessageFormatter,
        page_size: u32,
    ) -> Self {
        Self {
            auth,
            inbox,
            view,
            navigation,
            search,
            toasts,
            formatter,
            page_size,
        }
    }

    /// Read commands until `/quit`, Ctrl+C or Ctrl+D
    pub async fn run(self) -> Result<(), ClientError> {
        let (input_tx, mut input_rx) = mpsc::unbounded_channel::<String>();
        let (ready_tx, ready_rx) = oneshot::channel();
        spawn_readline(input_tx, ready_tx);
        ready_rx
            .await
            .map_err(|_| ClientError::Readline("line editor thread stopped".to_string()))?
            .map_err(ClientError::Readline)?;

        let printers = vec![
            spawn_toast_printer(self.toasts.clone()),
            spawn_search_printer(self.search.subscribe()),
            spawn_conversation_printer(
                self.formatter.clone(),
                self.view.clone(),
                self.navigation.clone(),
            ),
        ];

        print!(
            "{}",
            MessageFormatter::format_session(&self.auth.session().current())
        );
        println!("Type /help for the list of commands.");

        while let Some(line) = input_rx.recv().await {
            match parse_command(&line) {
                Ok(Command::Quit) => break,
                Ok(command) => self.execute(command).await,
                Err(e) => println!("{}", e),
            }
        }

        for printer in printers {
            printer.abort();
        }
        tracing::info!("Terminal session ended");
        Ok(())
    }

    fn post(&self, input: SyncInput) {
        if self.inbox.send(input).is_err() {
            tracing::error!("Conversation synchronizer is not running");
        }
    }

    fn require_login(&self) -> bool {
        let authenticated = self.auth.session().current().is_authenticated();
        if !authenticated {
            println!("Not logged in. Use /login first.");
        }
        authenticated
    }

    fn resolve(&self, reference: ConversationRef) -> Option<PublicId> {
        let resolved = resolve_conversation(&self.view.borrow(), reference);
        if resolved.is_none() {
            println!("No such conversation. Use /list to see the conversations.");
        }
        resolved
    }

    async fn execute(&self, command: Command) {
        match command {
            Command::Login(None) => {
                println!("Open this link to log in: {}", self.auth.login_url());
                println!("Then paste your access token with /login <token>.");
            }
            Command::Login(Some(token)) => {
                let state = self.auth.login_with_token(token).await;
                print!("{}", MessageFormatter::format_session(&state));
            }
            Command::Logout => {
                let url = self.auth.logout();
                println!("Logged out. End the provider session at {}", url);
            }
            Command::Profile => println!("Account page: {}", self.auth.profile_url()),
            Command::Help => print!("{}", MessageFormatter::format_help()),
            Command::Quit => {}
            command if !self.require_login() => {
                tracing::debug!("Ignoring {:?} while logged out", command);
            }
            Command::List => {
                print!(
                    "{}",
                    self.formatter.format_conversation_list(&self.view.borrow())
                );
            }
            Command::Open(reference) => {
                if let Some(id) = self.resolve(reference) {
                    self.post(SyncInput::Select(id));
                }
            }
            Command::Delete(reference) => {
                if let Some(id) = self.resolve(reference) {
                    self.post(SyncInput::Delete(id));
                }
            }
            Command::New(peer) => self.post(SyncInput::CreateOrLoad(peer)),
            Command::Search(text) => self.search.search(SearchQuery::new(text, self.page_size)),
            Command::Pick(index) => {
                let picked = match &*self.search.subscribe().borrow() {
                    Some(State::Success(users)) => users.get(index - 1).map(|user| user.public_id),
                    _ => None,
                };
                match picked {
                    Some(peer) => self.post(SyncInput::CreateOrLoad(peer)),
                    None => println!("No search result #{}. Use /search <text> first.", index),
                }
            }
            Command::Send(text) => {
                if text.is_empty() {
                    return;
                }
                let selected = self.view.borrow().selected;
                match selected {
                    Some(conversation_id) => {
                        self.post(SyncInput::Send(MessageToSend::text(conversation_id, text)))
                    }
                    None => println!("Open a conversation first with /open <n>."),
                }
            }
        }
    }
}

/// Run the line editor on a blocking thread, forwarding non-empty lines.
///
/// `ready` receives the outcome of the editor initialisation.
fn spawn_readline(
    input_tx: mpsc::UnboundedSender<String>,
    ready: oneshot::Sender<Result<(), String>>,
) {
    std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                let _ = ready.send(Err(e.to_string()));
                return;
            }
        };
        let _ = ready.send(Ok(()));

        loop {
            match rl.readline(PROMPT) {
                Ok(line) => {
                    let line = line.trim();
                    if !line.is_empty() {
                        rl.add_history_entry(line).ok();
                        if input_tx.send(line.to_string()).is_err() {
                            break;
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    tracing::info!("Interrupted");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    tracing::info!("EOF");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    break;
                }
            }
        }
    });
}

/// Print toasts as they are shown, then remove them from the queue
fn spawn_toast_printer(toasts: ToastService) -> JoinHandle<()> {
    let mut receiver = toasts.subscribe();
    tokio::spawn(async move {
        loop {
            match receiver.recv().await {
                Ok(toast) => {
                    print!("\n{}", MessageFormatter::format_toast(&toast));
                    redisplay_prompt();
                    toasts.remove(toast.id).await;
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!("{} toast(s) were not displayed", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

fn spawn_search_printer(mut results: SearchResults) -> JoinHandle<()> {
    tokio::spawn(async move {
        while results.changed().await.is_ok() {
            let output = results
                .borrow_and_update()
                .as_ref()
                .map(MessageFormatter::format_search_results);
            if let Some(output) = output {
                print!("\n{}", output);
                redisplay_prompt();
            }
        }
    })
}

/// Print the conversation on navigation, then its incoming messages
fn spawn_conversation_printer(
    formatter: MessageFormatter,
    mut view: watch::Receiver<ConversationsView>,
    mut navigation: watch::Receiver<Option<PublicId>>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut target: Option<PublicId> = None;
        // (conversation, id of its last message) already on screen
        let mut shown: Option<(PublicId, Option<PublicId>)> = None;

        loop {
            tokio::select! {
                changed = navigation.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    target = *navigation.borrow_and_update();
                    shown = None;
                }
                changed = view.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }

            // The navigation may be published before the view containing its target
            let snapshot = view.borrow_and_update().clone();
            let Some(conversation) = target.and_then(|id| {
                snapshot
                    .conversations
                    .iter()
                    .find(|conversation| conversation.public_id == id)
            }) else {
                continue;
            };
            let me = snapshot.connected_user.as_ref().map(|user| user.public_id);
            let last = conversation.last_message();
            let last_id = last.map(|message| message.public_id);

            match shown {
                Some((shown_id, last_seen)) if shown_id == conversation.public_id => {
                    if last_id == last_seen {
                        continue;
                    }
                    if let Some(message) = last
                        && Some(message.sender_id) != me
                    {
                        println!("{}", formatter.format_incoming(message, conversation));
                        redisplay_prompt();
                    }
                }
                _ => {
                    print!("{}", formatter.format_conversation(conversation, me.as_ref()));
                    redisplay_prompt();
                }
            }
            shown = Some((conversation.public_id, last_id));
        }
    })
}
