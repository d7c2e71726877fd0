use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::constants::store::{PORTFOLIOS_FILE, TICKERS_FILE};
use crate::error::Result;

/// A tracked portfolio page.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    /// Unique key used for delta tracking
    pub name: String,
    pub url: String,

    /// Alert when the total value reaches this; 0 disables the alert
    #[serde(default)]
    pub threshold: f64,

    /// Running sum of observed value changes since the monitor started
    #[serde(default, alias = "totalLostOrGainedSinceTheStartOfTheScript")]
    pub cumulative_gain_loss: f64,
}

impl Portfolio {
    pub fn new(name: String, url: String, threshold: f64) -> Self {
        Self {
            name,
            url,
            threshold,
            cumulative_gain_loss: 0.0,
        }
    }
}

/// Normalise a user-entered ticker: trimmed, upper case.
pub fn normalize_ticker(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Flat-file store for the tracked ticker list and portfolio list.
///
/// Loads never fail: a missing or unreadable document is an empty list.
/// Saves always rewrite both documents, each through a temp file and a
/// rename so readers never see a partial write. Clones share one write
/// lock; every read-modify-write holds it from load to save.
#[derive(Clone, Debug)]
pub struct ListStore {
    data_dir: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl ListStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        // The guarded unit carries no state, so a poisoned lock is still usable
        self.write_lock.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn tickers_path(&self) -> PathBuf {
        self.data_dir.join(TICKERS_FILE)
    }

    pub fn portfolios_path(&self) -> PathBuf {
        self.data_dir.join(PORTFOLIOS_FILE)
    }

    pub fn load_tickers(&self) -> Vec<String> {
        load_list(&self.tickers_path())
    }

    pub fn load_portfolios(&self) -> Vec<Portfolio> {
        load_list(&self.portfolios_path())
    }

    pub fn save(&self, portfolios: &[Portfolio], tickers: &[String]) -> Result<()> {
        let _guard = self.lock();
        self.write_both(portfolios, tickers)
    }

    fn write_both(&self, portfolios: &[Portfolio], tickers: &[String]) -> Result<()> {
        fs::create_dir_all(&self.data_dir)?;
        write_atomic(&self.portfolios_path(), &to_pretty_json(portfolios)?)?;
        write_atomic(&self.tickers_path(), &to_pretty_json(tickers)?)?;
        Ok(())
    }

    /// Returns false when the ticker was already tracked (or blank).
    pub fn add_ticker(&self, raw: &str) -> Result<bool> {
        let ticker = normalize_ticker(raw);
        if ticker.is_empty() {
            return Ok(false);
        }
        let _guard = self.lock();
        let mut tickers = self.load_tickers();
        if tickers.contains(&ticker) {
            return Ok(false);
        }
        tickers.push(ticker.clone());
        self.write_both(&self.load_portfolios(), &tickers)?;
        info!("🗂️ [STORE] Added ticker {}", ticker);
        Ok(true)
    }

    /// Returns false when the ticker was not tracked.
    pub fn remove_ticker(&self, ticker: &str) -> Result<bool> {
        let _guard = self.lock();
        let mut tickers = self.load_tickers();
        let before = tickers.len();
        tickers.retain(|t| t != ticker);
        if tickers.len() == before {
            return Ok(false);
        }
        self.write_both(&self.load_portfolios(), &tickers)?;
        info!("🗂️ [STORE] Removed ticker {}", ticker);
        Ok(true)
    }

    pub fn has_portfolio(&self, name: &str) -> bool {
        self.load_portfolios().iter().any(|p| p.name == name)
    }

    pub fn add_portfolio(&self, portfolio: Portfolio) -> Result<()> {
        let _guard = self.lock();
        let mut portfolios = self.load_portfolios();
        info!("🗂️ [STORE] Added portfolio {} ({})", portfolio.name, portfolio.url);
        portfolios.push(portfolio);
        self.write_both(&portfolios, &self.load_tickers())
    }

    /// Write the running gain/loss back to the named record, if it still exists.
    pub fn record_cumulative(&self, name: &str, value: f64) -> Result<()> {
        let _guard = self.lock();
        let mut portfolios = self.load_portfolios();
        let Some(record) = portfolios.iter_mut().find(|p| p.name == name) else {
            return Ok(());
        };
        record.cumulative_gain_loss = value;
        self.write_both(&portfolios, &self.load_tickers())
    }
}

fn load_list<T: DeserializeOwned>(path: &Path) -> Vec<T> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(_) => return Vec::new(),
    };
    match serde_json::from_str(&content) {
        Ok(items) => items,
        Err(e) => {
            warn!("⚠️ [STORE] Ignoring unreadable {}: {}", path.display(), e);
            Vec::new()
        }
    }
}

/// Write next to `path` then rename over it.
fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, contents)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Pretty JSON with 4-space indentation, the layout existing data files use.
fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    Ok(buf)
}
