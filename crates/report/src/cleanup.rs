//! Run-artifact cleanup
//!
//! Removes the temporary result log and any scratch caches. Runs on every
//! exit path, success or failure, and is idempotent: paths that are
//! already gone are not errors.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, warn};

use crate::config::RunnerConfig;

/// Delete the result log and every configured scrub path.
pub fn scrub(config: &RunnerConfig) {
    remove(&config.result_log);
    for path in &config.scrub {
        remove(path);
    }
}

fn remove(path: &Path) {
    let result = if path.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    match result {
        Ok(()) => debug!("removed {}", path.display()),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => warn!("could not remove {}: {}", path.display(), e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn config_for(dir: &Path) -> RunnerConfig {
        RunnerConfig {
            result_log: dir.join("result_log.json"),
            scrub: vec![dir.join("cache")],
            ..RunnerConfig::default()
        }
    }

    #[test]
    fn test_scrub_removes_log_and_caches() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(dir.path());

        fs::write(&config.result_log, "{}").unwrap();
        fs::create_dir(&config.scrub[0]).unwrap();
        fs::write(config.scrub[0].join("entry"), "x").unwrap();

        scrub(&config);
        assert!(!config.result_log.exists());
        assert!(!config.scrub[0].exists());
    }

    #[test]
    fn test_scrub_twice_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(dir.path());
        fs::write(&config.result_log, "{}").unwrap();

        scrub(&config);
        let listing_after_once: Vec<PathBuf> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect();

        scrub(&config);
        let listing_after_twice: Vec<PathBuf> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect();

        assert_eq!(listing_after_once, listing_after_twice);
        assert!(listing_after_once.is_empty());
    }
}
