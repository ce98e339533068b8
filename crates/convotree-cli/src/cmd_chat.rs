use crate::feedback::{self, FeedbackStore};
use crate::view;
use anyhow::{Context, Result, anyhow, bail};
use convotree::{
    ConversationConfig, Direction, NavigationController, NodeId, Outcome, Responder,
};
use convotree_responder::ResponderConfig;
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;

const HELP: &str = "\
<text>             send a message from the selected node
/deepen [text]     continue from the selected leaf
/broaden [text]    add an alternative next to the selected node
/regen <id>        generate another reply alongside AI node <id>
/edit <id> <text>  branch off node <id> with new text
/left [id]         previous sibling (default: selected node)
/right [id]        next sibling (default: selected node)
/select <id>       select any node
/tree              show the whole tree
/path              show the selected conversation
/search <text>     find nodes containing <text>
/snapshot          print the session as JSON
/feedback <png>    save a feedback report with a screenshot
/help              show this help
/quit              end the session
Start a line with // to send a message that begins with /.";

/// One line of session input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    Submit(String),
    Deepen(String),
    Broaden(String),
    Regenerate(NodeId),
    Edit(NodeId, String),
    Sibling(Direction, Option<NodeId>),
    Select(NodeId),
    Tree,
    Path,
    Search(String),
    Snapshot,
    Feedback(PathBuf),
    Help,
    Quit,
}

/// Parse a line of input. Blank lines yield `None`.
pub fn parse_line(line: &str) -> Result<Option<ChatCommand>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    if let Some(text) = line.strip_prefix("//") {
        return Ok(Some(ChatCommand::Submit(format!("/{text}"))));
    }
    let Some(command) = line.strip_prefix('/') else {
        return Ok(Some(ChatCommand::Submit(line.to_string())));
    };
    let (name, rest) = match command.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (command, ""),
    };

    let parsed = match name {
        "deepen" => ChatCommand::Deepen(rest.to_string()),
        "broaden" => ChatCommand::Broaden(rest.to_string()),
        "regen" | "regenerate" => ChatCommand::Regenerate(parse_id(rest)?),
        "edit" => {
            let (id, text) = rest
                .split_once(char::is_whitespace)
                .map(|(id, text)| (id, text.trim()))
                .unwrap_or((rest, ""));
            ChatCommand::Edit(parse_id(id)?, text.to_string())
        }
        "left" => ChatCommand::Sibling(Direction::Left, parse_optional_id(rest)?),
        "right" => ChatCommand::Sibling(Direction::Right, parse_optional_id(rest)?),
        "select" => ChatCommand::Select(parse_id(rest)?),
        "tree" => ChatCommand::Tree,
        "path" => ChatCommand::Path,
        "search" => {
            if rest.is_empty() {
                bail!("usage: /search <text>");
            }
            ChatCommand::Search(rest.to_string())
        }
        "snapshot" => ChatCommand::Snapshot,
        "feedback" => {
            if rest.is_empty() {
                bail!("usage: /feedback <png>");
            }
            ChatCommand::Feedback(PathBuf::from(rest))
        }
        "help" | "?" => ChatCommand::Help,
        "quit" | "exit" => ChatCommand::Quit,
        other => bail!("unknown command /{other} (try /help)"),
    };
    Ok(Some(parsed))
}

fn parse_id(s: &str) -> Result<NodeId> {
    if s.is_empty() {
        bail!("expected a node id");
    }
    s.parse::<u64>()
        .map(NodeId)
        .map_err(|_| anyhow!("invalid node id: {s}"))
}

fn parse_optional_id(s: &str) -> Result<Option<NodeId>> {
    if s.is_empty() {
        Ok(None)
    } else {
        parse_id(s).map(Some)
    }
}

/// Whether the session keeps reading input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// A controller plus the outputs a chat session can produce.
pub struct Session<R> {
    nav: NavigationController<R>,
    feedback: FeedbackStore,
    pretty: bool,
}

impl<R: Responder> Session<R> {
    pub fn new(nav: NavigationController<R>, feedback: FeedbackStore, pretty: bool) -> Self {
        Self {
            nav,
            feedback,
            pretty,
        }
    }

    pub fn nav(&self) -> &NavigationController<R> {
        &self.nav
    }

    /// Run one command, writing its result to `out`.
    pub fn execute(&mut self, command: ChatCommand, out: &mut impl Write) -> Result<Flow> {
        let selected = self.nav.selected();
        match command {
            ChatCommand::Submit(text) => {
                let outcome = self.nav.submit(&text);
                self.report(outcome, out)?;
            }
            ChatCommand::Deepen(text) => {
                let outcome = self.nav.deepen(selected, &text);
                self.report(outcome, out)?;
            }
            ChatCommand::Broaden(text) => {
                let outcome = self.nav.broaden(selected, &text);
                self.report(outcome, out)?;
            }
            ChatCommand::Regenerate(id) => {
                let outcome = self.nav.regenerate(id);
                self.report(outcome, out)?;
            }
            ChatCommand::Edit(id, text) => {
                let outcome = self.nav.edit(id, &text);
                self.report(outcome, out)?;
            }
            ChatCommand::Sibling(direction, id) => {
                let outcome = self.nav.navigate_sibling(id.unwrap_or(selected), direction);
                self.report(outcome, out)?;
            }
            ChatCommand::Select(id) => {
                let outcome = self.nav.select(id);
                self.report(outcome, out)?;
            }
            ChatCommand::Tree => {
                let tree = view::render_tree(self.nav.store(), self.nav.path(), selected);
                write!(out, "{tree}")?;
            }
            ChatCommand::Path => {
                write!(out, "{}", view::render_path(self.nav.path()))?;
            }
            ChatCommand::Search(needle) => {
                let hits = self.nav.store().search(&needle);
                if hits.is_empty() {
                    writeln!(out, "no matches")?;
                }
                for id in hits {
                    let node = self.nav.store().find_node_by_id(id)?;
                    writeln!(
                        out,
                        "[{id}] {}: {}",
                        node.sender(),
                        view::preview(node.content())
                    )?;
                }
            }
            ChatCommand::Snapshot => {
                writeln!(out, "{}", self.snapshot_json()?)?;
            }
            ChatCommand::Feedback(screenshot) => {
                let bytes = std::fs::read(&screenshot)
                    .with_context(|| format!("failed to read {}", screenshot.display()))?;
                let files = self.feedback.save(&self.nav.snapshot(), &bytes)?;
                writeln!(
                    out,
                    "saved feedback: {} {}",
                    files.state.display(),
                    files.screenshot.display()
                )?;
            }
            ChatCommand::Help => writeln!(out, "{HELP}")?,
            ChatCommand::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    pub fn snapshot_json(&self) -> Result<String> {
        let snapshot = self.nav.snapshot();
        let json = if self.pretty {
            snapshot.to_json_pretty()
        } else {
            snapshot.to_json()
        };
        json.context("failed to serialize snapshot")
    }

    fn report(&self, outcome: Outcome, out: &mut impl Write) -> Result<()> {
        match outcome {
            Ok(_) => {
                let node = self.nav.selected_node();
                writeln!(out, "[{}] {}: {}", node.id(), node.sender(), node.content())?;
            }
            Err(rejection) => writeln!(out, "rejected: {rejection}")?,
        }
        Ok(())
    }
}

/// Feed `input` to the session line by line until it ends or `/quit`.
///
/// Bad commands and failed feedback writes are reported on `out` and the
/// session carries on; only write failures on `out` end it early.
pub fn drive<R: Responder>(
    session: &mut Session<R>,
    input: impl BufRead,
    out: &mut impl Write,
    prompt: bool,
) -> Result<()> {
    let mut lines = input.lines();
    loop {
        if prompt {
            write!(out, "[{}]> ", session.nav().selected())?;
            out.flush()?;
        }
        let Some(line) = lines.next() else {
            break;
        };
        let line = line.context("failed to read input")?;
        let command = match parse_line(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                writeln!(out, "error: {e}")?;
                continue;
            }
        };
        match session.execute(command, out) {
            Ok(Flow::Continue) => {}
            Ok(Flow::Quit) => break,
            Err(e) => writeln!(out, "error: {e:#}")?,
        }
    }
    Ok(())
}

pub fn run(
    responder_config: ResponderConfig,
    conversation_config: ConversationConfig,
    feedback_dir: PathBuf,
    snapshot_out: Option<PathBuf>,
    pretty: bool,
) -> Result<()> {
    let responder =
        convotree_responder::build(&responder_config).context("failed to build responder")?;
    let nav = NavigationController::with_config(responder, conversation_config);
    let mut session = Session::new(nav, FeedbackStore::new(feedback_dir), pretty);

    let stdin = io::stdin();
    let interactive = stdin.is_terminal();
    let mut stdout = io::stdout().lock();
    if interactive {
        writeln!(stdout, "convotree: type a message, or /help for commands")?;
    }
    drive(&mut session, stdin.lock(), &mut stdout, interactive)?;

    if let Some(path) = snapshot_out {
        let json = session.snapshot_json()?;
        feedback::write_atomic(&path, json.as_bytes())?;
        tracing::info!(path = %path.display(), "wrote snapshot");
    }
    Ok(())
}
