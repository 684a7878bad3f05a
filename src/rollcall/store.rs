// Persistence of the state, as a set of serialized documents stored by key.

use std::path::{Path, PathBuf};

use crate::rollcall::*;

/// A string key-value store, in the fashion of the browser local storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String);
}

#[cfg(test)]
impl KeyValueStore for std::collections::HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        std::collections::HashMap::get(self, key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.insert(key.to_string(), value);
    }
}

/// A store backed by a single JSON object on disk.
///
/// JSON documents are nested so that the file stays readable, and `get` returns
/// them in compact form. Any other text, including the serialized strings
/// written by older versions, is kept as a JSON string and returned unchanged.
/// Changes are only written by [JsonFileStore::flush].
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: JSMap<String, JSValue>,
}

impl JsonFileStore {
    /// Opens the store. A missing file is an empty store.
    pub fn open(path: &Path) -> AppResult<JsonFileStore> {
        let display = path.display().to_string();
        let entries = if path.exists() {
            let contents = fs::read_to_string(path).context(OpeningJsonSnafu {
                path: display.clone(),
            })?;
            if contents.trim().is_empty() {
                JSMap::new()
            } else {
                match serde_json::from_str::<JSValue>(&contents).context(ParsingJsonSnafu {})? {
                    JSValue::Object(m) => m,
                    other => whatever!(
                        "The state file {} must contain a JSON object, found: {}",
                        display,
                        other
                    ),
                }
            }
        } else {
            info!("State file {:?} does not exist, starting empty", display);
            JSMap::new()
        };
        debug!("JsonFileStore::open: keys: {:?}", entries.keys());
        Ok(JsonFileStore {
            path: path.to_path_buf(),
            entries,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn flush(&self) -> AppResult<()> {
        let contents = serde_json::to_string_pretty(&JSValue::Object(self.entries.clone()))
            .context(ParsingJsonSnafu {})?;
        fs::write(&self.path, contents + "\n").context(WritingJsonSnafu {
            path: self.path.display().to_string(),
        })?;
        debug!("JsonFileStore::flush: wrote {:?}", self.path);
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|v| match v {
            JSValue::String(s) => s.clone(),
            other => other.to_string(),
        })
    }

    fn set(&mut self, key: &str, value: String) {
        let js = match serde_json::from_str::<JSValue>(&value) {
            Ok(js) if !js.is_string() => js,
            _ => JSValue::String(value),
        };
        self.entries.insert(key.to_string(), js);
    }
}
