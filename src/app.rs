//! Interactive console and one-shot runner around the search form

use std::io::Write;

use anyhow::Result;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::time::{Duration, interval};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::render;
use crate::search::{SearchState, Submission, run_search};
use crate::traits::ScrapeBackend;

const HELP: &str = "\
Commands:
  query <text>              set the search query
  pages <n>                 set the number of pages (1-5)
  test on|off|toggle        switch test mode (sample products)
  search                    run the scrape
  dismiss error|success|all close notifications
  show                      redraw the view
  help                      show this help
  quit                      exit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DismissTarget {
    Error,
    Success,
    All,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Query(String),
    Pages(String),
    TestMode(Option<bool>),
    Search,
    Dismiss(DismissTarget),
    Show,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("unknown command `{0}`, type `help` for the list")]
    Unknown(String),
    #[error("`{0}` needs an argument")]
    MissingArgument(&'static str),
    #[error("expected {expected}, got `{got}`")]
    InvalidArgument { expected: &'static str, got: String },
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let line = line.trim();
        let (word, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(w, r)| (w, r.trim()));

        match word.to_lowercase().as_str() {
            // An empty query is a valid edit; submitting it is what fails
            "query" | "q" => Ok(Self::Query(rest.to_string())),
            "pages" | "p" if rest.is_empty() => Err(CommandError::MissingArgument("pages")),
            "pages" | "p" => Ok(Self::Pages(rest.to_string())),
            "test" | "t" => match rest.to_lowercase().as_str() {
                "on" | "true" | "1" => Ok(Self::TestMode(Some(true))),
                "off" | "false" | "0" => Ok(Self::TestMode(Some(false))),
                "" | "toggle" => Ok(Self::TestMode(None)),
                other => Err(CommandError::InvalidArgument {
                    expected: "on, off or toggle",
                    got: other.to_string(),
                }),
            },
            "search" | "s" | "go" => Ok(Self::Search),
            "dismiss" | "d" => match rest.to_lowercase().as_str() {
                "error" => Ok(Self::Dismiss(DismissTarget::Error)),
                "success" => Ok(Self::Dismiss(DismissTarget::Success)),
                "" | "all" => Ok(Self::Dismiss(DismissTarget::All)),
                other => Err(CommandError::InvalidArgument {
                    expected: "error, success or all",
                    got: other.to_string(),
                }),
            },
            "show" | "" => Ok(Self::Show),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" => Ok(Self::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

/// Interactive console around a [`SearchState`] and a backend.
pub struct ScraperConsole<B, W> {
    backend: B,
    state: SearchState,
    hyperlinks: bool,
    out: W,
}

impl<B, W> ScraperConsole<B, W>
where
    B: ScrapeBackend,
    W: Write,
{
    pub fn new(backend: B, config: &Config, out: W) -> Self {
        Self {
            backend,
            state: SearchState::new(config.notice_ttl),
            hyperlinks: config.hyperlinks,
            out,
        }
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut SearchState {
        &mut self.state
    }

    pub fn into_output(self) -> W {
        self.out
    }

    fn draw(&mut self) -> Result<()> {
        let view = render::format_view(&self.state, self.hyperlinks);
        writeln!(self.out, "{view}\n")?;
        self.out.flush()?;
        Ok(())
    }

    fn say(&mut self, message: &str) -> Result<()> {
        writeln!(self.out, "{message}")?;
        self.out.flush()?;
        Ok(())
    }

    /// Submits the form, drawing the loading state before the request.
    pub async fn search(&mut self) -> Result<()> {
        let request = match self.state.begin_submit() {
            Submission::Started(request) => request,
            Submission::Busy => return self.say("A search is already running."),
            Submission::Rejected(failure) => {
                debug!("Submit rejected: {}", failure);
                return self.draw();
            }
        };

        self.draw()?;
        let outcome = run_search(&self.backend, &request).await;
        self.state.finish_submit(&outcome);
        self.draw()
    }

    /// Applies one command. Returns `false` when the console should exit.
    pub async fn handle(&mut self, command: Command) -> Result<bool> {
        self.state.notices_mut().expire();

        match command {
            Command::Query(query) => match self.state.set_query(&query) {
                Ok(()) => self.draw()?,
                Err(locked) => self.say(&locked.to_string())?,
            },
            Command::Pages(input) => match self.state.set_pages(&input) {
                Ok(_) => self.draw()?,
                Err(locked) => self.say(&locked.to_string())?,
            },
            Command::TestMode(enabled) => {
                let enabled = enabled.unwrap_or(!self.state.test_mode());
                self.state.set_test_mode(enabled);
                self.draw()?;
            }
            Command::Search => self.search().await?,
            Command::Dismiss(target) => {
                let notices = self.state.notices_mut();
                match target {
                    DismissTarget::Error => notices.dismiss_error(),
                    DismissTarget::Success => notices.dismiss_success(),
                    DismissTarget::All => notices.clear(),
                }
                self.draw()?;
            }
            Command::Show => self.draw()?,
            Command::Help => self.say(HELP)?,
            Command::Quit => return Ok(false),
        }

        Ok(true)
    }

    /// Reads commands until `quit` or end of input. Expired notifications
    /// are removed in the background and the view is redrawn when one goes.
    pub async fn run<R>(&mut self, input: R) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        info!("Console connected to {}", self.backend.base_url());
        self.draw()?;
        self.say("Type `help` for commands.")?;

        let mut lines = input.lines();
        let mut ticker = interval(Duration::from_secs(1));

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else { break };
                    match Command::parse(&line) {
                        Ok(command) => {
                            if !self.handle(command).await? {
                                break;
                            }
                        }
                        Err(e) => {
                            warn!("Bad command {:?}: {}", line, e);
                            self.say(&e.to_string())?;
                        }
                    }
                }
                _ = ticker.tick() => {
                    let before = self.state.notices().visible().count();
                    self.state.notices_mut().expire();
                    if self.state.notices().visible().count() != before {
                        self.draw()?;
                    }
                }
            }
        }

        info!("Console closed");
        Ok(())
    }

    /// Non-interactive mode: one submit, then print table or JSON.
    ///
    /// # Returns
    /// * `Result<bool>` - whether the submit produced products
    pub async fn run_once(
        &mut self,
        query: Option<&str>,
        pages: Option<&str>,
        test_mode: bool,
        json: bool,
    ) -> Result<bool> {
        self.state.set_test_mode(test_mode);
        if !test_mode {
            if let Some(query) = query {
                self.state.set_query(query)?;
            }
            if let Some(pages) = pages {
                self.state.set_pages(pages)?;
            }
        }

        let outcome = self.state.submit(&self.backend).await;

        if json {
            let output = render::format_json(&self.state);
            self.say(&output)?;
        } else {
            let mut sections = Vec::new();
            if let Some(notices) = render::format_notices(self.state.notices()) {
                sections.push(notices);
            }
            if !self.state.products().is_empty() {
                sections.push(render::format_table(self.state.products(), self.hyperlinks));
            }
            let output = sections.join("\n\n");
            self.say(&output)?;
        }

        Ok(matches!(outcome, Ok(Some(_))))
    }
}
