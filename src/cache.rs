use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

// Named JSON files in one directory. A hit returns the stored value, a miss computes and stores it.
pub struct JsonCache {
    dir: PathBuf,
}

impl JsonCache {
    pub fn new(dir: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).with_context(|| format!("creating cache dir {}", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, name: &str) -> PathBuf {
        let file: String = name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{file}.json"))
    }

    pub fn get_or_compute<T, E, F>(&self, name: &str, generate: F) -> anyhow::Result<T>
    where
        T: Serialize + DeserializeOwned,
        E: Into<anyhow::Error>,
        F: FnOnce() -> Result<T, E>,
    {
        let path = self.path_for(name);

        if path.exists() {
            let raw = fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
            match serde_json::from_str(&raw) {
                Ok(value) => {
                    debug!(name, "using cached");
                    return Ok(value);
                }
                // Stale or truncated file, regenerate it
                Err(err) => warn!(name, %err, "discarding unreadable cache entry"),
            }
        }

        debug!(name, "generating");
        let value = generate().map_err(Into::<anyhow::Error>::into)?;
        let raw = serde_json::to_string(&value)?;
        fs::write(&path, raw).with_context(|| format!("writing {}", path.display()))?;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn computes_once_then_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let cache = JsonCache::new(dir.path()).unwrap();
        let calls = Cell::new(0);

        for _ in 0..3 {
            let value: Vec<u32> = cache
                .get_or_compute("ratings2013casd", || {
                    calls.set(calls.get() + 1);
                    Ok::<_, anyhow::Error>(vec![254, 1678])
                })
                .unwrap();
            assert_eq!(value, vec![254, 1678]);
        }

        assert_eq!(calls.get(), 1);
        assert!(dir.path().join("ratings2013casd.json").exists());
    }

    #[test]
    fn failed_generation_stores_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let cache = JsonCache::new(dir.path()).unwrap();

        let result: anyhow::Result<u32> = cache.get_or_compute("broken", || Err(anyhow::anyhow!("no data")));
        assert!(result.is_err());
        assert!(!dir.path().join("broken.json").exists());
    }

    #[test]
    fn corrupt_entry_is_regenerated() {
        let dir = tempfile::tempdir().unwrap();
        let cache = JsonCache::new(dir.path()).unwrap();
        fs::write(dir.path().join("value.json"), "{ truncated").unwrap();

        let value: u32 = cache.get_or_compute("value", || Ok::<_, anyhow::Error>(7)).unwrap();
        assert_eq!(value, 7);
        assert_eq!(fs::read_to_string(dir.path().join("value.json")).unwrap(), "7");
    }

    #[test]
    fn names_are_made_filesystem_safe() {
        let dir = tempfile::tempdir().unwrap();
        let cache = JsonCache::new(dir.path()).unwrap();

        assert_eq!(cache.path_for("a/b c.d"), dir.path().join("a_b_c_d.json"));
    }
}
