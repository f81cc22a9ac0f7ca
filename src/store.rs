// src/store.rs
//! On-disk HTML cache for poem pages.
//!
//! Entries live under one directory as `<sha256(url) hex>.html`; the file's
//! modification time is the fetch time. Writes land through a temp file, so a
//! reader never sees half a page. Nothing expires unless an
//! [`EvictionPolicy`] other than [`NeverEvict`] is plugged in.

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;

use crate::config::consts::CACHE_EXT;
use crate::core::net::Transport;
use crate::error::CacheError;
use crate::fetch::{Fetcher, Sleeper};
use crate::file::ensure_directory;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheEntry {
    pub url: String,
    pub body: Vec<u8>,
    pub fetched_at: DateTime<Utc>,
}

/// What a policy sees of each stored entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntryMeta {
    pub key: String,
    pub fetched_at: DateTime<Utc>,
}

/// Stable file stem for a URL.
pub fn cache_key(url: &str) -> String {
    hex::encode(Sha256::digest(url.as_bytes()))
}

/* ---------------- Eviction ---------------- */

pub trait EvictionPolicy {
    /// Whether `victims` needs the entry list after a put.
    fn wants_scan(&self) -> bool {
        true
    }

    /// Keys to drop. `keep` is the entry just written.
    fn victims(&self, entries: &[EntryMeta], keep: &str) -> Vec<String>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NeverEvict;

impl EvictionPolicy for NeverEvict {
    fn wants_scan(&self) -> bool {
        false
    }

    fn victims(&self, _entries: &[EntryMeta], _keep: &str) -> Vec<String> {
        Vec::new()
    }
}

/// Keep at most `n` entries, dropping the oldest `fetched_at` first.
#[derive(Clone, Copy, Debug)]
pub struct MaxEntries(pub usize);

impl EvictionPolicy for MaxEntries {
    fn victims(&self, entries: &[EntryMeta], keep: &str) -> Vec<String> {
        let excess = entries.len().saturating_sub(self.0.max(1));
        let mut old: Vec<&EntryMeta> = entries.iter().filter(|e| e.key != keep).collect();
        old.sort_by_key(|e| e.fetched_at);
        old.into_iter().take(excess).map(|e| e.key.clone()).collect()
    }
}

/* ---------------- Store ---------------- */

pub trait CacheStore {
    fn get(&self, url: &str) -> Result<Option<CacheEntry>, CacheError>;
    fn put(&mut self, url: &str, body: &[u8]) -> Result<(), CacheError>;
}

pub struct DiskStore<P: EvictionPolicy = NeverEvict> {
    dir: PathBuf,
    policy: P,
}

impl DiskStore<NeverEvict> {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into(), policy: NeverEvict }
    }
}

impl<P: EvictionPolicy> DiskStore<P> {
    pub fn with_policy<Q: EvictionPolicy>(self, policy: Q) -> DiskStore<Q> {
        DiskStore { dir: self.dir, policy }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for_key(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.{CACHE_EXT}"))
    }

    fn io_err(path: &Path, source: io::Error) -> CacheError {
        CacheError::Io { path: path.to_path_buf(), source }
    }

    /// Every `*.html` file with its mtime.
    pub fn entries(&self) -> Result<Vec<EntryMeta>, CacheError> {
        let read = match fs::read_dir(&self.dir) {
            Ok(r) => r,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Self::io_err(&self.dir, e)),
        };

        let mut out = Vec::new();
        for item in read {
            let item = item.map_err(|e| Self::io_err(&self.dir, e))?;
            let path = item.path();
            if path.extension().and_then(|x| x.to_str()) != Some(CACHE_EXT) {
                continue;
            }
            let Some(key) = path.file_stem().and_then(|s| s.to_str()) else { continue };
            let modified = item
                .metadata()
                .and_then(|m| m.modified())
                .map_err(|e| Self::io_err(&path, e))?;
            out.push(EntryMeta { key: s!(key), fetched_at: modified.into() });
        }
        Ok(out)
    }

    fn evict(&self, keep: &str) -> Result<(), CacheError> {
        if !self.policy.wants_scan() {
            return Ok(());
        }
        let entries = self.entries()?;
        for key in self.policy.victims(&entries, keep) {
            let path = self.path_for_key(&key);
            logd!("cache evict {}", path.display());
            match fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(Self::io_err(&path, e)),
            }
        }
        Ok(())
    }
}

impl<P: EvictionPolicy> CacheStore for DiskStore<P> {
    fn get(&self, url: &str) -> Result<Option<CacheEntry>, CacheError> {
        let path = self.path_for_key(&cache_key(url));
        let body = match fs::read(&path) {
            Ok(b) => b,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Self::io_err(&path, e)),
        };
        let fetched_at = fs::metadata(&path)
            .and_then(|m| m.modified())
            .map_err(|e| Self::io_err(&path, e))?
            .into();
        Ok(Some(CacheEntry { url: s!(url), body, fetched_at }))
    }

    fn put(&mut self, url: &str, body: &[u8]) -> Result<(), CacheError> {
        ensure_directory(&self.dir).map_err(|e| Self::io_err(&self.dir, e))?;
        let key = cache_key(url);
        let path = self.path_for_key(&key);
        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(|e| Self::io_err(&self.dir, e))?;
        tmp.write_all(body).map_err(|e| Self::io_err(tmp.path(), e))?;
        tmp.persist(&path).map_err(|e| Self::io_err(&path, e.error))?;
        self.evict(&key)
    }
}

/* ---------------- Cache front ---------------- */

/// Body plus whether the network was touched.
pub struct Cached {
    pub body: Vec<u8>,
    pub hit: bool,
}

impl Cached {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

pub struct HtmlCache<C: CacheStore> {
    store: C,
    hits: usize,
    misses: usize,
}

impl<C: CacheStore> HtmlCache<C> {
    pub fn new(store: C) -> Self {
        Self { store, hits: 0, misses: 0 }
    }

    /// Stored body on hit; otherwise fetch through `fetcher` and store.
    pub fn get_or_fetch<T: Transport, S: Sleeper>(
        &mut self,
        url: &str,
        fetcher: &mut Fetcher<T, S>,
    ) -> Result<Cached, CacheError> {
        if let Some(entry) = self.store.get(url)? {
            self.hits += 1;
            logd!("cache hit {url}");
            return Ok(Cached { body: entry.body, hit: true });
        }
        self.misses += 1;
        let body = fetcher.fetch_url(url)?;
        self.store.put(url, &body)?;
        Ok(Cached { body, hit: false })
    }

    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn misses(&self) -> usize {
        self.misses
    }

    pub fn store(&self) -> &C {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::options::FetchOptions;
    use crate::core::net::{Response, TransportError};
    use chrono::TimeZone;
    use std::cell::Cell;
    use std::time::{Duration, SystemTime};

    struct Counting(Cell<usize>);
    impl Transport for Counting {
        fn get(&self, url: &str) -> Result<Response, TransportError> {
            self.0.set(self.0.get() + 1);
            Ok(Response::ok(format!("<html>{url}</html>")))
        }
    }

    fn meta(key: &str, secs: i64) -> EntryMeta {
        EntryMeta { key: s!(key), fetched_at: Utc.timestamp_opt(secs, 0).unwrap() }
    }

    #[test]
    fn key_is_sha256_hex() {
        let k = cache_key("https://x/poem");
        assert_eq!(k.len(), 64);
        assert!(k.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(k, cache_key("https://x/poem2"));
    }

    #[test]
    fn second_get_is_served_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let transport = Counting(Cell::new(0));
        let opts = FetchOptions { jitter: false, max_retries: 1, ..FetchOptions::default() };
        let mut fetcher = Fetcher::new(&transport, &opts);
        let mut cache = HtmlCache::new(DiskStore::new(dir.path().join("pages")));

        let first = cache.get_or_fetch("https://x/p", &mut fetcher).unwrap();
        let second = cache.get_or_fetch("https://x/p", &mut fetcher).unwrap();
        assert!(!first.hit);
        assert!(second.hit);
        assert_eq!(first.body, second.body);
        assert_eq!(transport.0.get(), 1);
        assert_eq!((cache.hits(), cache.misses()), (1, 1));

        let entry = cache.store().get("https://x/p").unwrap().unwrap();
        assert_eq!(entry.url, "https://x/p");
        assert!(dir.path().join("pages").join(format!("{}.html", cache_key("https://x/p"))).is_file());
    }

    #[test]
    fn put_replaces_whole_entry_without_leftovers() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = DiskStore::new(dir.path());
        store.put("https://x/p", b"first version, rather long").unwrap();
        store.put("https://x/p", b"second").unwrap();

        assert_eq!(store.get("https://x/p").unwrap().unwrap().body, b"second");
        let names: Vec<_> = fs::read_dir(dir.path()).unwrap().map(|e| e.unwrap().file_name()).collect();
        assert_eq!(names.len(), 1);
        assert_eq!(store.entries().unwrap().len(), 1);
    }

    #[test]
    fn max_entries_picks_oldest_but_not_kept() {
        let entries = [meta("a", 10), meta("b", 5), meta("c", 20), meta("d", 1)];
        assert_eq!(MaxEntries(2).victims(&entries, "d"), vec![s!("b"), s!("a")]);
        assert!(MaxEntries(8).victims(&entries, "d").is_empty());
        assert!(NeverEvict.victims(&entries, "d").is_empty());
    }

    #[test]
    fn disk_store_evicts_on_put() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = DiskStore::new(dir.path()).with_policy(MaxEntries(1));
        store.put("https://x/old", b"old").unwrap();

        let old = fs::File::options()
            .write(true)
            .open(dir.path().join(format!("{}.html", cache_key("https://x/old"))))
            .unwrap();
        old.set_modified(SystemTime::now() - Duration::from_secs(3600)).unwrap();

        store.put("https://x/new", b"new").unwrap();
        assert!(store.get("https://x/old").unwrap().is_none());
        assert_eq!(store.get("https://x/new").unwrap().unwrap().body, b"new");
    }
}
