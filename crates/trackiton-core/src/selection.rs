//! Symbols selected for the comparison chart.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::store::KeyValueStore;
use crate::{StockRecord, StoreError};

/// Key holding the serialized selection.
pub const SELECTION_KEY: &str = "selectedStocks";

/// Ordered set of selected symbols. Toggling appends new symbols at the end.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selection {
    symbols: Vec<String>,
}

impl Selection {
    pub fn new<I, T>(symbols: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let mut selection = Self::default();
        for symbol in symbols {
            let symbol = symbol.into();
            if !selection.is_selected(&symbol) {
                selection.symbols.push(symbol);
            }
        }
        selection
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn is_selected(&self, symbol: &str) -> bool {
        self.symbols.iter().any(|selected| selected == symbol)
    }

    /// Removes `symbol` when selected, appends it otherwise. Returns whether it is now selected.
    pub fn toggle(&mut self, symbol: &str) -> bool {
        if self.is_selected(symbol) {
            self.symbols.retain(|selected| selected != symbol);
            false
        } else {
            self.symbols.push(symbol.to_owned());
            true
        }
    }

    /// Records of selected symbols, in record order.
    pub fn filter<'a>(&self, records: &'a [StockRecord]) -> Vec<&'a StockRecord> {
        records
            .iter()
            .filter(|record| self.is_selected(record.symbol()))
            .collect()
    }

    /// Reads the stored selection, falling back to `defaults` when absent or unreadable.
    pub async fn load<S, I, T>(store: &S, defaults: I) -> Self
    where
        S: KeyValueStore,
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        match store.get(SELECTION_KEY).await {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<String>>(&raw) {
                Ok(symbols) => return Self::new(symbols),
                Err(error) => warn!(%error, "stored selection is malformed, using defaults"),
            },
            Ok(None) => {}
            Err(error) => warn!(%error, "stored selection unreadable, using defaults"),
        }
        Self::new(defaults)
    }

    pub async fn save<S: KeyValueStore>(&self, store: &S) -> Result<(), StoreError> {
        let raw = serde_json::to_string(self)?;
        store.set(SELECTION_KEY, raw).await
    }
}
