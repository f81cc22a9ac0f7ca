// tests/common/mod.rs
#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use poem_scrape::core::net::{Response, Transport, TransportError};
use poem_scrape::fetch::Sleeper;

pub const TEMPLATE: &str = "https://poetry.test/listpoetry.php?letter=All&page={page}";

pub fn page_url(page: u32) -> String {
    TEMPLATE.replace("{page}", &page.to_string())
}

/// Per-URL queues of canned responses. The last response of a queue repeats;
/// unknown URLs get a 404. Every request is recorded.
#[derive(Default)]
pub struct Scripted {
    routes: RefCell<HashMap<String, VecDeque<Response>>>,
    pub calls: RefCell<Vec<String>>,
}

impl Scripted {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(self, url: &str, responses: Vec<Response>) -> Self {
        self.routes.borrow_mut().insert(url.to_string(), responses.into());
        self
    }

    pub fn calls_to(&self, url: &str) -> usize {
        self.calls.borrow().iter().filter(|c| *c == url).count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl Transport for Scripted {
    fn get(&self, url: &str) -> Result<Response, TransportError> {
        self.calls.borrow_mut().push(url.to_string());
        let mut routes = self.routes.borrow_mut();
        let Some(queue) = routes.get_mut(url) else {
            return Ok(Response::status(404));
        };
        let resp = if queue.len() > 1 { queue.pop_front() } else { queue.front().cloned() };
        Ok(resp.unwrap_or_else(|| Response::status(404)))
    }
}

/// Records requested waits instead of sleeping.
#[derive(Default)]
pub struct Recorder(pub RefCell<Vec<Duration>>);

impl Sleeper for Recorder {
    fn sleep(&self, d: Duration) {
        self.0.borrow_mut().push(d);
    }
}

impl Recorder {
    pub fn waits(&self) -> Vec<Duration> {
        self.0.borrow().clone()
    }
}

/// A listing page with `n` poems named `p<page>-<i>`, wrapped in layout tables
/// the way the real site nests its content.
pub fn listing_page(page: u32, n: usize) -> String {
    let mut rows = String::new();
    for i in 0..n {
        rows.push_str(&format!(
            "<tr><td><a href=\"/author-{i}/poem-{page}-{i}\">p{page}-{i}</a></td>\
             <td>Author {i}</td><td>{lines}</td><td>1,{i:03}</td></tr>\n",
            lines = 10 + i,
        ));
    }
    format!(
        "<html><body><table class=\"layout\"><tr><td>Main Menu</td><td>\
         <table class=\"poems\">\
         <tr><th>Poem Title</th><th>Author</th><th>Lines</th><th>Views</th></tr>\n\
         {rows}</table></td></tr></table></body></html>"
    )
}

/// A poem page whose body cell holds `lines`, after a title line and byline.
pub fn poem_page(title: &str, author: &str, lines: &[String]) -> String {
    format!(
        "<html><body><table><tr>\
         <td>Main Menu<br>Home<br>Authors<br>{filler}</td>\
         <td>Public Domain Poetry - {title}<br>{title}<br>By {author}<br>{body}</td>\
         </tr></table></body></html>",
        filler = "nav ".repeat(120),
        body = lines.join("<br>\n"),
    )
}

/// `n` lines of `words` lowercase words each.
pub fn verse(n: usize, words: usize) -> Vec<String> {
    (0..n)
        .map(|i| (0..words).map(|w| format!("word{i}x{w}")).collect::<Vec<_>>().join(" "))
        .collect()
}
