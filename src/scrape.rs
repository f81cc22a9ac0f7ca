// src/scrape.rs
//! Scrape orchestrator.
//!
//! A small state machine over the page range:
//!
//! ```text
//! Idle -> Fetching(p) -> Extracting(p) -> Writing(p) -> Checkpointing(p) -> Fetching(p+1) ... -> Done
//! ```
//!
//! `Failed` is reachable from every working state. The checkpoint is a plain
//! value threaded through [`Scraper::step`]; it is persisted only after the
//! page's rows were appended, so a crash can repeat a page but never skip one.

use crate::{
    checkpoint::{Checkpoint, CheckpointStore},
    config::options::{ParseFailurePolicy, ScrapeOptions},
    core::net::{HttpTransport, Transport},
    csv::CsvSink,
    data::PoemRow,
    error::ScrapeError,
    fetch::{Fetcher, Sleeper},
    progress::Progress,
    specs::listing,
};

#[derive(Debug)]
pub enum State {
    Idle,
    Fetching { page: u32 },
    Extracting { page: u32, body: String },
    Writing { page: u32, rows: Vec<PoemRow> },
    Checkpointing { page: u32, rows: usize },
    Done,
    Failed(ScrapeError),
}

impl State {
    pub fn is_terminal(&self) -> bool {
        matches!(self, State::Done | State::Failed(_))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub pages_fetched: u32,
    pub pages_skipped: u32,
    pub rows_written: usize,
    /// First page this run worked on (after resume).
    pub first_page: u32,
    /// Checkpoint value at the end of the run.
    pub next_page: u32,
}

pub struct Scraper<'a, T: Transport, S: Sleeper> {
    opts: &'a ScrapeOptions,
    fetcher: Fetcher<T, S>,
    sink: CsvSink,
    store: CheckpointStore,
    progress: &'a mut dyn Progress,
    summary: RunSummary,
}

impl<'a, T: Transport, S: Sleeper> Scraper<'a, T, S> {
    pub fn new(
        opts: &'a ScrapeOptions,
        fetcher: Fetcher<T, S>,
        progress: &'a mut dyn Progress,
    ) -> Self {
        Self {
            opts,
            fetcher,
            sink: CsvSink::new(&opts.output),
            store: CheckpointStore::new(&opts.checkpoint),
            progress,
            summary: RunSummary::default(),
        }
    }

    /// Checkpoint the run starts from: the stored one when resuming, never
    /// earlier than `start_page`.
    pub fn initial_checkpoint(&self) -> Checkpoint {
        let start = self.opts.start_page;
        if !self.opts.resume {
            return Checkpoint::new(start);
        }
        match self.store.load() {
            Some(cp) if cp.next_page > start => {
                logf!("Resuming from checkpoint: page {}", cp.next_page);
                cp
            }
            _ => Checkpoint::new(start),
        }
    }

    /// Drive the machine from `Idle` to `Done` or `Failed`.
    pub fn run(mut self) -> Result<RunSummary, ScrapeError> {
        let mut cp = self.initial_checkpoint();
        let mut state = State::Idle;

        while !state.is_terminal() {
            (state, cp) = self.step(state, cp);
        }
        self.summary.next_page = cp.next_page;
        self.progress.finish();

        match state {
            State::Failed(e) => Err(e),
            _ => {
                logf!(
                    "Done: {} pages fetched, {} rows written, {} pages skipped",
                    self.summary.pages_fetched,
                    self.summary.rows_written,
                    self.summary.pages_skipped
                );
                Ok(self.summary)
            }
        }
    }

    /// One transition.
    pub fn step(&mut self, state: State, cp: Checkpoint) -> (State, Checkpoint) {
        match state {
            State::Idle => self.start(cp),
            State::Fetching { page } => (self.fetch(page), cp),
            State::Extracting { page, body } => (self.extract(page, &body), cp),
            State::Writing { page, rows } => (self.write(page, rows), cp),
            State::Checkpointing { page, rows } => self.checkpoint(page, rows, cp),
            terminal => (terminal, cp),
        }
    }

    /* ---------------- States ---------------- */

    fn start(&mut self, cp: Checkpoint) -> (State, Checkpoint) {
        let first = cp.next_page.max(self.opts.start_page);
        self.summary.first_page = first;

        if let Err(source) = self.sink.ensure_header() {
            let path = self.sink.path().to_path_buf();
            return (State::Failed(ScrapeError::Sink { page: first, path, source }), cp);
        }

        let cp = Checkpoint::new(first);
        if first > self.opts.end_page {
            logf!("Nothing to do: next page {first} is past end page {}", self.opts.end_page);
            return (State::Done, cp);
        }

        let remaining = (self.opts.end_page - first + 1) as usize;
        self.progress.begin(remaining);
        self.progress.log(&format!("Scraping pages {first}..={}", self.opts.end_page));
        (State::Fetching { page: first }, cp)
    }

    fn fetch(&mut self, page: u32) -> State {
        logd!("fetching page {page}");
        match self.fetcher.fetch(page) {
            Ok(body) => {
                self.summary.pages_fetched += 1;
                State::Extracting { page, body }
            }
            Err(e) => {
                loge!("Giving up on page {page}: {e}");
                State::Failed(e.into())
            }
        }
    }

    fn extract(&mut self, page: u32, body: &str) -> State {
        let url = self.fetcher.page_url(page);
        match listing::extract(body, page, &url) {
            Ok(rows) => State::Writing { page, rows },
            Err(source) => match self.opts.on_parse_error {
                ParseFailurePolicy::Skip => {
                    logw!("Skipping page {page}: {source}");
                    self.summary.pages_skipped += 1;
                    State::Checkpointing { page, rows: 0 }
                }
                ParseFailurePolicy::Abort => State::Failed(ScrapeError::Parse { page, source }),
            },
        }
    }

    fn write(&mut self, page: u32, rows: Vec<PoemRow>) -> State {
        match self.sink.append(&rows, page) {
            Ok(()) => {
                self.summary.rows_written += rows.len();
                State::Checkpointing { page, rows: rows.len() }
            }
            Err(source) => {
                let path = self.sink.path().to_path_buf();
                State::Failed(ScrapeError::Sink { page, path, source })
            }
        }
    }

    fn checkpoint(&mut self, page: u32, rows: usize, cp: Checkpoint) -> (State, Checkpoint) {
        let next = Checkpoint::after(page);
        if let Err(source) = self.store.save(next) {
            let path = self.store.path().to_path_buf();
            return (State::Failed(ScrapeError::Checkpoint { path, source }), cp);
        }
        self.progress.item_done(page, rows);

        if page >= self.opts.end_page {
            return (State::Done, next);
        }
        self.fetcher.pause(self.opts.delay);
        (State::Fetching { page: next.next_page }, next)
    }
}

/// Top-level: validate, build the HTTP fetcher and run the whole range.
pub fn run(
    opts: &ScrapeOptions,
    progress: &mut dyn Progress,
) -> Result<RunSummary, ScrapeError> {
    opts.validate()?;
    let transport = HttpTransport::new(opts.fetch.timeout)?;
    let fetcher = Fetcher::new(transport, &opts.fetch).with_url_template(&opts.url_template);
    Scraper::new(opts, fetcher, progress).run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::options::FetchOptions;
    use crate::core::net::{Response, TransportError};
    use crate::progress::NullProgress;
    use std::time::Duration;

    const PAGE: &str = r#"<table><tr><td>Poem Title</td><td>Author</td><td>Lines</td><td>Views</td></tr>
        <tr><td><a href="/a">A</a></td><td>X</td><td>4</td><td>9</td></tr></table>"#;

    struct Fixed(&'static str);
    impl Transport for Fixed {
        fn get(&self, _url: &str) -> Result<Response, TransportError> {
            Ok(Response::ok(self.0))
        }
    }

    struct NoSleep;
    impl Sleeper for NoSleep {
        fn sleep(&self, _d: Duration) {}
    }

    fn opts(dir: &std::path::Path, policy: ParseFailurePolicy) -> ScrapeOptions {
        ScrapeOptions {
            start_page: 1,
            end_page: 2,
            output: dir.join("poems.csv"),
            checkpoint: dir.join("checkpoint.json"),
            on_parse_error: policy,
            fetch: FetchOptions { jitter: false, max_retries: 1, ..FetchOptions::default() },
            url_template: s!("https://site.test/list?page={page}"),
            ..ScrapeOptions::default()
        }
    }

    fn scraper<'a>(
        opts: &'a ScrapeOptions,
        body: &'static str,
        progress: &'a mut NullProgress,
    ) -> Scraper<'a, Fixed, NoSleep> {
        let fetcher = Fetcher::new(Fixed(body), &opts.fetch)
            .with_sleeper(NoSleep)
            .with_url_template(&opts.url_template);
        Scraper::new(opts, fetcher, progress)
    }

    #[test]
    fn walks_states_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let o = opts(dir.path(), ParseFailurePolicy::Skip);
        let mut np = NullProgress;
        let mut sc = scraper(&o, PAGE, &mut np);

        let (s, cp) = sc.step(State::Idle, Checkpoint::new(1));
        assert!(matches!(s, State::Fetching { page: 1 }));
        let (s, cp) = sc.step(s, cp);
        assert!(matches!(s, State::Extracting { page: 1, .. }));
        let (s, cp) = sc.step(s, cp);
        assert!(matches!(&s, State::Writing { page: 1, rows } if rows.len() == 1));
        let (s, cp) = sc.step(s, cp);
        assert!(matches!(s, State::Checkpointing { page: 1, rows: 1 }));
        assert_eq!(cp, Checkpoint::new(1));
        let (s, cp) = sc.step(s, cp);
        assert!(matches!(s, State::Fetching { page: 2 }));
        assert_eq!(cp, Checkpoint::new(2));
    }

    #[test]
    fn parse_failure_policies() {
        let dir = tempfile::tempdir().unwrap();
        let o = opts(dir.path(), ParseFailurePolicy::Skip);
        let mut np = NullProgress;
        let summary = scraper(&o, "<p>maintenance</p>", &mut np).run().unwrap();
        assert_eq!(summary.pages_skipped, 2);
        assert_eq!(summary.next_page, 3);

        let dir = tempfile::tempdir().unwrap();
        let o = opts(dir.path(), ParseFailurePolicy::Abort);
        let mut np = NullProgress;
        let err = scraper(&o, "<p>maintenance</p>", &mut np).run().unwrap_err();
        assert!(matches!(err, ScrapeError::Parse { page: 1, .. }));
        assert!(CheckpointStore::new(&o.checkpoint).load().is_none());
    }

    #[test]
    fn last_representable_page_finishes() {
        let dir = tempfile::tempdir().unwrap();
        let o = ScrapeOptions {
            start_page: u32::MAX,
            end_page: u32::MAX,
            ..opts(dir.path(), ParseFailurePolicy::Skip)
        };
        let mut np = NullProgress;
        let summary = scraper(&o, PAGE, &mut np).run().unwrap();
        assert_eq!(summary.pages_fetched, 1);
        assert_eq!(summary.next_page, u32::MAX);
    }

    #[test]
    fn checkpoint_past_end_is_done() {
        let dir = tempfile::tempdir().unwrap();
        let o = opts(dir.path(), ParseFailurePolicy::Skip);
        CheckpointStore::new(&o.checkpoint).save(Checkpoint::new(9)).unwrap();
        let mut np = NullProgress;
        let summary = scraper(&o, PAGE, &mut np).run().unwrap();
        assert_eq!(summary.pages_fetched, 0);
        assert_eq!(summary.next_page, 9);
    }
}
