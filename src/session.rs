//! Interactive terminal session.
//!
//! Plain text submits a prompt; lines starting with `:` are commands. A line
//! ending in `\` continues the prompt on the next line.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::display;
use crate::error::ImageError;
use crate::orchestrator::{Orchestrator, RequestState, Submission};
use crate::output::download;
use crate::params::AspectRatio;
use crate::prompt::PromptStore;
use crate::suggest::ExampleSuggester;

const HELP: &str = "\
Type a prompt and press Enter to generate. End a line with \\ to continue it.
  :generate      regenerate the current prompt
  :ratio [r]     show or select the aspect ratio (1:1, 16:9, 9:16, 4:3, 3:4)
  :examples      list example prompts
  :try <n>       use example prompt n
  :surprise      use a random example prompt
  :save [n]      save image n, or every image
  :help          show this help
  :quit          leave";

/// A parsed line of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Set the prompt to this text and generate.
    Submit(String),
    /// Generate the current prompt again.
    Generate,
    /// Show the current ratio, or select a new one.
    Ratio(Option<String>),
    /// List example prompts.
    Examples,
    /// Use the example prompt at this 1-based position.
    Try(usize),
    /// Use a random example prompt.
    Surprise,
    /// Save one image (1-based) or all of them.
    Save(Option<usize>),
    /// Show help.
    Help,
    /// Leave the session.
    Quit,
}

/// Parse one complete entry.
///
/// # Errors
///
/// Returns a message for unknown commands or malformed arguments.
pub fn parse_command(entry: &str) -> Result<Command, String> {
    let Some(rest) = entry.trim_start().strip_prefix(':') else {
        return Ok(Command::Submit(entry.to_string()));
    };
    let mut words = rest.split_whitespace();
    let name = words.next().unwrap_or_default();
    let arg = words.next();

    let index = |arg: Option<&str>| -> Result<usize, String> {
        arg.and_then(|a| a.parse::<usize>().ok())
            .filter(|n| *n > 0)
            .ok_or_else(|| format!(":{name} expects a number starting at 1"))
    };

    match name {
        "generate" | "g" => Ok(Command::Generate),
        "ratio" | "r" => Ok(Command::Ratio(arg.map(str::to_string))),
        "examples" => Ok(Command::Examples),
        "try" => index(arg).map(Command::Try),
        "surprise" => Ok(Command::Surprise),
        "save" | "s" => match arg {
            None => Ok(Command::Save(None)),
            some => index(some).map(|n| Command::Save(Some(n))),
        },
        "help" | "h" | "?" => Ok(Command::Help),
        "quit" | "q" | "exit" => Ok(Command::Quit),
        other => Err(format!("Unknown command ':{other}'. Type :help for a list.")),
    }
}

/// Joins `\`-continued lines into one entry.
#[derive(Debug, Default)]
pub struct LineEditor {
    buffer: String,
}

impl LineEditor {
    /// Feed one line. Returns the finished entry once a line does not end in `\`.
    pub fn push(&mut self, line: &str) -> Option<String> {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if let Some(head) = line.strip_suffix('\\') {
            self.buffer.push_str(head);
            self.buffer.push('\n');
            return None;
        }
        self.buffer.push_str(line);
        Some(std::mem::take(&mut self.buffer))
    }
}

/// What the session loop should do after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Print a notice.
    Say(String),
    /// Nothing to print.
    Silent,
    /// End the session.
    Quit,
}

/// Interactive session state.
pub struct Session {
    orchestrator: Arc<Orchestrator>,
    store: PromptStore,
    suggester: ExampleSuggester,
    output_dir: PathBuf,
    pending: Option<JoinHandle<Submission>>,
}

impl Session {
    /// Create a session.
    #[must_use]
    pub fn new(
        orchestrator: Arc<Orchestrator>,
        store: PromptStore,
        suggester: ExampleSuggester,
        output_dir: PathBuf,
    ) -> Self {
        Self { orchestrator, store, suggester, output_dir, pending: None }
    }

    /// Read entries from `input` until `:quit` or end of input, rendering each
    /// state change as it happens.
    ///
    /// At end of input an in-flight request is allowed to finish; `:quit`
    /// aborts it.
    ///
    /// # Errors
    ///
    /// Returns an error if reading input fails.
    pub async fn run<R>(mut self, input: R) -> Result<(), ImageError>
    where
        R: AsyncBufRead + Unpin,
    {
        let per_request = self.orchestrator.images_per_request();
        let mut states = self.orchestrator.subscribe();
        let mut lines = input.lines();
        let mut editor = LineEditor::default();

        println!("{}", display::header());
        println!("{}", display::render(&states.borrow_and_update(), per_request));

        let mut quit = false;
        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else { break };
                    let Some(entry) = editor.push(&line) else { continue };
                    match parse_command(&entry).map_or_else(Reply::Say, |c| self.handle(c)) {
                        Reply::Say(text) => println!("{text}"),
                        Reply::Silent => {}
                        Reply::Quit => {
                            quit = true;
                            break;
                        }
                    }
                }
                Ok(()) = states.changed() => print_state(&mut states, per_request),
            }
        }

        if let Some(mut pending) = self.pending.take() {
            if quit {
                pending.abort();
            } else {
                loop {
                    tokio::select! {
                        joined = &mut pending => {
                            if let Err(e) = joined {
                                tracing::warn!("generation task ended abnormally: {e}");
                            }
                            break;
                        }
                        Ok(()) = states.changed() => print_state(&mut states, per_request),
                    }
                }
                if states.has_changed().unwrap_or(false) {
                    print_state(&mut states, per_request);
                }
            }
        }
        Ok(())
    }

    /// Apply one command.
    pub fn handle(&mut self, command: Command) -> Reply {
        match command {
            Command::Submit(text) => {
                if self.is_busy() {
                    return busy();
                }
                if text.trim().is_empty() {
                    return Reply::Silent;
                }
                self.store.set_text(text);
                self.submit()
            }
            Command::Generate => self.submit(),
            Command::Ratio(None) => {
                let options: Vec<String> = AspectRatio::ALL
                    .iter()
                    .map(|r| {
                        if *r == self.store.aspect_ratio() { format!("[{r}]") } else { r.to_string() }
                    })
                    .collect();
                Reply::Say(format!("Aspect ratio: {}", options.join(" ")))
            }
            Command::Ratio(Some(label)) => {
                if self.is_busy() {
                    return busy();
                }
                match label.parse::<AspectRatio>() {
                    Ok(ratio) => {
                        self.store.set_aspect_ratio(ratio);
                        Reply::Say(format!("Aspect ratio set to {ratio}"))
                    }
                    Err(e) => Reply::Say(e),
                }
            }
            Command::Examples => {
                let list: Vec<String> = self
                    .suggester
                    .prompts()
                    .iter()
                    .enumerate()
                    .map(|(i, p)| format!("  {}. {p}", i + 1))
                    .collect();
                Reply::Say(format!("Try:\n{}", list.join("\n")))
            }
            Command::Try(n) => {
                if self.is_busy() {
                    return busy();
                }
                match self.suggester.pick(n - 1) {
                    Some(prompt) => self.use_example(prompt),
                    None => Reply::Say(format!(
                        "There are only {} example prompts",
                        self.suggester.prompts().len()
                    )),
                }
            }
            Command::Surprise => {
                if self.is_busy() {
                    return busy();
                }
                match self.suggester.pick_random() {
                    Some(prompt) => self.use_example(prompt),
                    None => Reply::Say("No example prompts available".to_string()),
                }
            }
            Command::Save(which) => self.save(which),
            Command::Help => Reply::Say(HELP.to_string()),
            Command::Quit => Reply::Quit,
        }
    }

    fn is_busy(&self) -> bool {
        self.pending.as_ref().is_some_and(|p| !p.is_finished()) || self.orchestrator.is_loading()
    }

    fn use_example(&mut self, prompt: &str) -> Reply {
        self.store.set_text(prompt);
        Reply::Say(format!("Prompt: {prompt}\n(type :generate to create it)"))
    }

    fn submit(&mut self) -> Reply {
        if self.is_busy() {
            return busy();
        }
        if !self.store.is_submittable() {
            return Reply::Say("Type a prompt first.".to_string());
        }
        let orchestrator = Arc::clone(&self.orchestrator);
        let prompt = self.store.text().to_string();
        let ratio = self.store.aspect_ratio();
        self.pending = Some(tokio::spawn(async move { orchestrator.submit(&prompt, ratio).await }));
        Reply::Silent
    }

    fn save(&self, which: Option<usize>) -> Reply {
        let RequestState::Success { request, images } = self.orchestrator.state() else {
            return Reply::Say("Nothing to save yet.".to_string());
        };
        let selected: Vec<_> = match which {
            None => images.iter().collect(),
            Some(n) => match images.get(n - 1) {
                Some(image) => vec![image],
                None => return Reply::Say(format!("There are only {} images", images.len())),
            },
        };

        let lines: Vec<String> = selected
            .into_iter()
            .map(|image| match download(image, &request.prompt, &self.output_dir) {
                Ok(path) => format!("Saved: {}", path.display()),
                Err(e) => format!("Could not save {}: {e}", image.style),
            })
            .collect();
        Reply::Say(lines.join("\n"))
    }
}

fn busy() -> Reply {
    Reply::Say("A generation is already in progress.".to_string())
}

fn print_state(states: &mut watch::Receiver<RequestState>, per_request: usize) {
    let state = states.borrow_and_update().clone();
    println!("{}", display::render(&state, per_request));
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;
    use crate::client::GenerationClient;
    use crate::loading::LoadingIndicator;
    use crate::ports::image_generator::GenerateFuture;
    use crate::ports::{ImageGenerator, ImageRequest, ImageResponse, RenderedImage};
    use crate::styles::Variant;
    use crate::suggest::EXAMPLE_PROMPTS;

    struct Slow {
        calls: Arc<AtomicUsize>,
        delay: Duration,
    }

    impl ImageGenerator for Slow {
        fn generate(&self, _request: &ImageRequest) -> GenerateFuture<'_> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let delay = self.delay;
            Box::pin(async move {
                tokio::time::sleep(delay).await;
                Ok(ImageResponse {
                    images: vec![RenderedImage {
                        data: vec![0xFF, 0xD8, 0xFF, 0xE0],
                        mime_type: "image/jpeg".into(),
                    }],
                })
            })
        }
    }

    fn session(delay: Duration, output_dir: PathBuf) -> (Session, Arc<Orchestrator>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let generator = Slow { calls: Arc::clone(&calls), delay };
        let client =
            GenerationClient::new(Box::new(generator), "gpt-image-1", Variant::Single.presets());
        let orchestrator = Arc::new(Orchestrator::new(client, LoadingIndicator::default()));
        let session = Session::new(
            Arc::clone(&orchestrator),
            PromptStore::default(),
            ExampleSuggester::default(),
            output_dir,
        );
        (session, orchestrator, calls)
    }

    #[test]
    fn parses_commands() {
        assert_eq!(parse_command("a cat"), Ok(Command::Submit("a cat".into())));
        assert_eq!(parse_command(":generate"), Ok(Command::Generate));
        assert_eq!(parse_command(":ratio 16:9"), Ok(Command::Ratio(Some("16:9".into()))));
        assert_eq!(parse_command(":ratio"), Ok(Command::Ratio(None)));
        assert_eq!(parse_command(":try 2"), Ok(Command::Try(2)));
        assert_eq!(parse_command(":save"), Ok(Command::Save(None)));
        assert_eq!(parse_command(":save 3"), Ok(Command::Save(Some(3))));
        assert_eq!(parse_command("  :q"), Ok(Command::Quit));
    }

    #[test]
    fn rejects_bad_commands() {
        assert!(parse_command(":try").unwrap_err().contains("expects a number"));
        assert!(parse_command(":try 0").is_err());
        assert!(parse_command(":save x").is_err());
        assert!(parse_command(":paint").unwrap_err().contains("Unknown command ':paint'"));
    }

    #[test]
    fn backslash_continues_the_entry() {
        let mut editor = LineEditor::default();
        assert_eq!(editor.push("a cat\\"), None);
        assert_eq!(editor.push("on a mat\r"), Some("a cat\non a mat".into()));
        assert_eq!(editor.push("next"), Some("next".into()));
    }

    #[tokio::test]
    async fn examples_fill_the_prompt_without_submitting() {
        let (mut session, orchestrator, calls) = session(Duration::ZERO, PathBuf::from("."));

        session.handle(Command::Try(3));
        assert_eq!(session.store.text(), EXAMPLE_PROMPTS[2]);

        session.handle(Command::Surprise);
        assert!(EXAMPLE_PROMPTS.contains(&session.store.text()));

        let reply = session.handle(Command::Try(9));
        assert_eq!(reply, Reply::Say("There are only 4 example prompts".into()));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(orchestrator.state(), RequestState::Idle);
    }

    #[tokio::test]
    async fn ratio_selection() {
        let (mut session, _, _) = session(Duration::ZERO, PathBuf::from("."));

        assert_eq!(
            session.handle(Command::Ratio(Some("9:16".into()))),
            Reply::Say("Aspect ratio set to 9:16".into())
        );
        assert_eq!(session.store.aspect_ratio(), AspectRatio::Portrait);

        let Reply::Say(text) = session.handle(Command::Ratio(Some("2:1".into()))) else {
            panic!("expected a notice");
        };
        assert!(text.contains("Unsupported aspect ratio"));
        assert_eq!(session.store.aspect_ratio(), AspectRatio::Portrait);

        let Reply::Say(text) = session.handle(Command::Ratio(None)) else {
            panic!("expected a notice");
        };
        assert!(text.contains("[9:16]"));
    }

    #[tokio::test]
    async fn generate_without_prompt_is_refused() {
        let (mut session, _, calls) = session(Duration::ZERO, PathBuf::from("."));
        assert_eq!(session.handle(Command::Generate), Reply::Say("Type a prompt first.".into()));
        assert_eq!(session.handle(Command::Submit("   ".into())), Reply::Silent);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn controls_are_disabled_while_loading() {
        let (mut session, orchestrator, calls) =
            session(Duration::from_secs(5), PathBuf::from("."));

        assert_eq!(session.handle(Command::Submit("A cat".into())), Reply::Silent);
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(orchestrator.is_loading());

        assert_eq!(session.handle(Command::Submit("A dog".into())), busy());
        assert_eq!(session.handle(Command::Generate), busy());
        assert_eq!(session.handle(Command::Ratio(Some("16:9".into()))), busy());
        assert_eq!(session.handle(Command::Surprise), busy());
        assert_eq!(session.store.text(), "A cat");

        session.pending.take().unwrap().await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn save_writes_downloads() {
        let dir = std::env::temp_dir().join("imagen_studio_session_save");
        let _ = std::fs::remove_dir_all(&dir);
        let (mut session, _, _) = session(Duration::ZERO, dir.clone());

        assert_eq!(session.handle(Command::Save(None)), Reply::Say("Nothing to save yet.".into()));

        session.handle(Command::Submit("A cat".into()));
        session.pending.take().unwrap().await.unwrap();

        let Reply::Say(text) = session.handle(Command::Save(Some(1))) else {
            panic!("expected a notice");
        };
        assert!(text.starts_with("Saved:"));
        assert!(dir.join("a_cat_vivid.jpg").exists());
        assert_eq!(session.handle(Command::Save(Some(2))), Reply::Say("There are only 1 images".into()));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn run_finishes_pending_request_at_end_of_input() {
        let (session, orchestrator, calls) = session(Duration::ZERO, PathBuf::from("."));

        session.run(&b"A cat\\\nin a hat\n"[..]).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let RequestState::Success { request, .. } = orchestrator.state() else {
            panic!("expected success");
        };
        assert_eq!(request.prompt, "A cat\nin a hat");
    }

    #[tokio::test(start_paused = true)]
    async fn quit_aborts_in_flight_request() {
        let (session, orchestrator, _) = session(Duration::from_secs(60), PathBuf::from("."));

        session.run(&b"A cat\n:quit\n"[..]).await.unwrap();
        tokio::task::yield_now().await;

        assert!(!orchestrator.is_loading());
        assert_eq!(orchestrator.state(), RequestState::Idle);
    }
}
