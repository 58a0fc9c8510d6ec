//! Integration tests for modelcache

mod cache_tests {
    use filetime::{set_file_mtime, FileTime};
    use modelcache::cache::{CacheEntry, CacheStore};
    use modelcache::config::Config;
    use modelcache::model::{ApiModel, Operation};
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::sync::Arc;
    use tempfile::TempDir;

    struct Workspace {
        dir: TempDir,
    }

    impl Workspace {
        fn new() -> Self {
            Self {
                dir: TempDir::new().unwrap(),
            }
        }

        fn base(&self) -> PathBuf {
            self.dir.path().join("base")
        }

        /// Create a dependent file with a fixed size and mtime (seconds)
        fn jar(&self, name: &str, size: usize, mtime: i64) -> PathBuf {
            let path = self.dir.path().join(name);
            fs::write(&path, vec![b'x'; size]).unwrap();
            set_file_mtime(&path, FileTime::from_unix_time(mtime, 0)).unwrap();
            path
        }
    }

    fn pets() -> ApiModel {
        let mut model = ApiModel::new("Pets", "1.0");
        model.add_operation("/pets", "GET", Operation::with_id("listPets"));
        model
    }

    fn titled(title: &str) -> Config {
        let mut config = Config::default();
        config.info.title = Some(title.to_string());
        config
    }

    fn entry(
        base: &Path,
        identity: &str,
        config: &Config,
        files: &[&PathBuf],
    ) -> CacheEntry<ApiModel> {
        let mut entry = CacheEntry::create_new(identity, base);
        for file in files {
            entry.add_dependent_file(file).unwrap();
        }
        entry.set_config(Arc::new(config.clone())).unwrap();
        entry
    }

    #[test]
    fn round_trip_and_stability() {
        let ws = Workspace::new();
        let jar = ws.jar("a.jar", 100, 500);
        let config = titled("Pets");

        let mut written = entry(&ws.base(), "app1", &config, &[&jar]);
        written.set_artifact(pets()).unwrap();
        assert!(written.try_write().unwrap());

        let loaded = CacheEntry::<ApiModel>::read("app1", &ws.base()).unwrap();
        assert_eq!(loaded.artifact(), Some(&pets()));
        assert_eq!(loaded.fingerprints(), written.fingerprints());

        // Nothing changed: a fresh entry for the same inputs reuses the cache
        let current = entry(&ws.base(), "app1", &config, &[&jar]);
        assert!(loaded.is_up_to_date_with(&current).unwrap());
    }

    #[test]
    fn on_disk_layout() {
        let ws = Workspace::new();
        let jar = ws.jar("a.jar", 100, 500);

        let mut written = entry(&ws.base(), "my app/1", &titled("Pets"), &[&jar]);
        written.set_artifact(pets()).unwrap();
        written.write();

        let dir = ws.base().join("cache").join("my%20app%2F1");
        assert!(dir.join("files").is_file());
        assert!(dir.join("config").is_file());
        assert!(dir.join("model").is_file());

        let files = fs::read_to_string(dir.join("files")).unwrap();
        assert_eq!(files.lines().count(), 1);
        assert!(files.starts_with("500000 100 "));
        assert!(files.trim_end().ends_with("a.jar"));
    }

    #[test]
    fn config_change_invalidates() {
        let ws = Workspace::new();
        let jar = ws.jar("a.jar", 100, 500);

        let mut written = entry(&ws.base(), "app1", &titled("Pets"), &[&jar]);
        written.set_artifact(pets()).unwrap();
        written.write();

        let loaded = CacheEntry::<ApiModel>::read("app1", &ws.base()).unwrap();
        let current = entry(&ws.base(), "app1", &titled("Pets v2"), &[&jar]);
        assert!(!loaded.is_up_to_date_with(&current).unwrap());
    }

    #[test]
    fn override_scoped_to_stored_path_invalidates() {
        let ws = Workspace::new();
        let jar = ws.jar("a.jar", 100, 500);
        let config = titled("Pets");

        let mut written = entry(&ws.base(), "app1", &config, &[&jar]);
        written.set_artifact(pets()).unwrap();
        written.write();
        let loaded = CacheEntry::<ApiModel>::read("app1", &ws.base()).unwrap();

        // Override for a path the stored model does not have: still fresh
        let mut unrelated = config.clone();
        unrelated
            .overrides
            .paths
            .insert("/owners".to_string(), vec!["https://owners.example".to_string()]);
        let current = entry(&ws.base(), "app1", &unrelated, &[&jar]);
        assert!(loaded.is_up_to_date_with(&current).unwrap());

        // Override for /pets changes the outcome
        let mut scoped = config.clone();
        scoped
            .overrides
            .paths
            .insert("/pets".to_string(), vec!["https://pets.example".to_string()]);
        let current = entry(&ws.base(), "app1", &scoped, &[&jar]);
        assert!(!loaded.is_up_to_date_with(&current).unwrap());

        // Same for operation-scoped overrides
        let mut by_operation = config;
        by_operation
            .overrides
            .operations
            .insert("listPets".to_string(), vec!["https://list.example".to_string()]);
        let current = entry(&ws.base(), "app1", &by_operation, &[&jar]);
        assert!(!loaded.is_up_to_date_with(&current).unwrap());
    }

    #[test]
    fn mtime_change_invalidates() {
        let ws = Workspace::new();
        let jar = ws.jar("a.jar", 100, 500);
        let config = titled("Pets");

        let mut written = entry(&ws.base(), "app1", &config, &[&jar]);
        written.set_artifact(pets()).unwrap();
        written.write();

        set_file_mtime(&jar, FileTime::from_unix_time(600, 0)).unwrap();

        let loaded = CacheEntry::<ApiModel>::read("app1", &ws.base()).unwrap();
        let current = entry(&ws.base(), "app1", &config, &[&jar]);
        assert!(!loaded.is_up_to_date_with(&current).unwrap());
    }

    #[test]
    fn size_change_invalidates() {
        let ws = Workspace::new();
        let jar = ws.jar("a.jar", 100, 500);
        let config = titled("Pets");

        let mut written = entry(&ws.base(), "app1", &config, &[&jar]);
        written.set_artifact(pets()).unwrap();
        written.write();

        // Same name and mtime, different length
        let rewritten = ws.jar("a.jar", 101, 500);
        assert_eq!(rewritten, jar);

        let loaded = CacheEntry::<ApiModel>::read("app1", &ws.base()).unwrap();
        let current = entry(&ws.base(), "app1", &config, &[&jar]);
        assert_eq!(current.fingerprints().entries()[0].modified_ms, 500_000);
        assert!(!loaded.is_up_to_date_with(&current).unwrap());
    }

    #[test]
    fn dependent_file_order_matters() {
        let ws = Workspace::new();
        let a = ws.jar("a.jar", 100, 500);
        let b = ws.jar("b.jar", 200, 500);
        let config = titled("Pets");

        let mut written = entry(&ws.base(), "app1", &config, &[&a, &b]);
        written.set_artifact(pets()).unwrap();
        written.write();

        let loaded = CacheEntry::<ApiModel>::read("app1", &ws.base()).unwrap();
        let swapped = entry(&ws.base(), "app1", &config, &[&b, &a]);
        assert!(!loaded.is_up_to_date_with(&swapped).unwrap());
    }

    #[test]
    fn incomplete_entry_writes_nothing() {
        let ws = Workspace::new();
        let jar = ws.jar("a.jar", 100, 500);

        // No artifact
        let no_artifact = entry(&ws.base(), "app1", &titled("Pets"), &[&jar]);
        assert!(!no_artifact.try_write().unwrap());

        // No dependent files
        let mut no_files = entry(&ws.base(), "app1", &titled("Pets"), &[]);
        no_files.set_artifact(pets()).unwrap();
        assert!(!no_files.try_write().unwrap());

        // Empty identity
        let mut anonymous = entry(&ws.base(), "", &titled("Pets"), &[&jar]);
        anonymous.set_artifact(pets()).unwrap();
        assert!(!anonymous.try_write().unwrap());

        assert!(!ws.base().join("cache").exists());
    }

    #[test]
    fn corrupt_entry_is_a_miss() {
        let ws = Workspace::new();
        let jar = ws.jar("a.jar", 100, 500);

        let mut written = entry(&ws.base(), "app1", &titled("Pets"), &[&jar]);
        written.set_artifact(pets()).unwrap();
        written.write();

        let model = ws.base().join("cache").join("app1").join("model");
        fs::write(&model, "{ not json").unwrap();
        assert!(CacheEntry::<ApiModel>::read("app1", &ws.base()).is_none());
        assert!(CacheEntry::<ApiModel>::try_read("app1", &ws.base()).is_err());

        fs::remove_file(&model).unwrap();
        assert!(CacheEntry::<ApiModel>::read("app1", &ws.base()).is_none());
    }

    #[test]
    fn file_in_place_of_entry_directory() {
        let ws = Workspace::new();
        let jar = ws.jar("a.jar", 100, 500);

        let cache = ws.base().join("cache");
        fs::create_dir_all(&cache).unwrap();
        fs::write(cache.join("app1"), "not a directory").unwrap();

        let mut written = entry(&ws.base(), "app1", &titled("Pets"), &[&jar]);
        written.set_artifact(pets()).unwrap();
        assert!(written.try_write().unwrap_err().is_io());
        // Soft variant swallows the same failure
        written.write();

        assert!(CacheEntry::<ApiModel>::read("app1", &ws.base()).is_none());
        assert!(cache.join("app1").is_file());
    }

    #[test]
    fn comparing_against_unloaded_entry_is_invalid() {
        let ws = Workspace::new();
        let jar = ws.jar("a.jar", 100, 500);
        let config = titled("Pets");

        let fresh = entry(&ws.base(), "app1", &config, &[&jar]);
        let other = entry(&ws.base(), "app1", &config, &[&jar]);
        assert!(matches!(
            fresh.is_up_to_date_with(&other),
            Err(modelcache::CacheError::InvalidState(_))
        ));
    }

    #[test]
    fn rewrite_replaces_previous_entry() {
        let ws = Workspace::new();
        let jar = ws.jar("a.jar", 100, 500);

        let mut first = entry(&ws.base(), "app1", &titled("Pets"), &[&jar]);
        first.set_artifact(pets()).unwrap();
        first.write();

        let mut second = entry(&ws.base(), "app1", &titled("Pets v2"), &[&jar]);
        second.set_artifact(ApiModel::new("Pets", "2.0")).unwrap();
        second.write();

        let loaded = CacheEntry::<ApiModel>::read("app1", &ws.base()).unwrap();
        assert_eq!(loaded.artifact().unwrap().version, "2.0");
        assert_eq!(loaded.stored_snapshot().unwrap().get("info.title"), Some("Pets v2"));

        // Staging and retired directories are gone; only the entry and locks remain
        let store = CacheStore::new(&ws.base());
        assert_eq!(store.list().unwrap(), vec!["app1".to_string()]);
        let leftovers: Vec<_> = fs::read_dir(store.root())
            .unwrap()
            .map(|d| d.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|name| name.starts_with(".tmp-") || name.starts_with(".old-"))
            .collect();
        assert!(leftovers.is_empty(), "leftovers: {leftovers:?}");
    }
}

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    /// Isolated invocation: no global or local config, private cache dir
    fn modelcache(dir: &Path) -> Command {
        modelcache_with_config(dir, &dir.join("missing-config.toml"))
    }

    fn modelcache_with_config(dir: &Path, config: &Path) -> Command {
        let mut cmd = cargo_bin_cmd!("modelcache");
        cmd.env_remove("MODELCACHE_CONFIG")
            .env_remove("MODELCACHE_CACHE_DIR")
            .arg("--no-local")
            .arg("--config")
            .arg(config)
            .arg("--cache-dir")
            .arg(dir.join("base"));
        cmd
    }

    fn seed(dir: &Path) -> (String, String) {
        let jar = dir.join("a.jar");
        fs::write(&jar, "jar").unwrap();
        let model = dir.join("model.json");
        fs::write(
            &model,
            r#"{"title":"Pets","version":"1.0","paths":{"/pets":{"get":{"operationId":"listPets"}}}}"#,
        )
        .unwrap();
        (
            jar.to_string_lossy().into_owned(),
            model.to_string_lossy().into_owned(),
        )
    }

    #[test]
    fn help_displays() {
        cargo_bin_cmd!("modelcache")
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("cache generated API models"));
    }

    #[test]
    fn version_displays() {
        cargo_bin_cmd!("modelcache")
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("modelcache"));
    }

    #[test]
    fn status_miss() {
        let dir = TempDir::new().unwrap();
        let (jar, _) = seed(dir.path());

        modelcache(dir.path())
            .args(["status", "app1", "--file", &jar])
            .assert()
            .success()
            .stdout(predicate::str::contains("miss"));
    }

    #[test]
    fn store_then_status_up_to_date() {
        let dir = TempDir::new().unwrap();
        let (jar, model) = seed(dir.path());

        modelcache(dir.path())
            .args(["store", "app1", "--model", &model, "--file", &jar])
            .assert()
            .success()
            .stdout(predicate::str::contains("Stored"));

        modelcache(dir.path())
            .args(["status", "app1", "--file", &jar])
            .assert()
            .success()
            .stdout(predicate::str::contains("up to date"));
    }

    #[test]
    fn local_config_change_makes_entry_stale() {
        let dir = TempDir::new().unwrap();
        let (jar, model) = seed(dir.path());

        modelcache(dir.path())
            .args(["store", "app1", "--model", &model, "--file", &jar])
            .assert()
            .success();

        let config = dir.path().join("changed.toml");
        fs::write(&config, "[info]\ntitle = \"Renamed\"\n").unwrap();

        modelcache_with_config(dir.path(), &config)
            .args(["status", "app1", "--file", &jar])
            .assert()
            .success()
            .stdout(predicate::str::contains("stale"))
            .stdout(predicate::str::contains("config info.title"));
    }

    #[test]
    fn missing_dependent_file_fails() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("gone.jar");

        modelcache(dir.path())
            .args(["status", "app1", "--file"])
            .arg(&missing)
            .assert()
            .failure()
            .stderr(predicate::str::contains("Error:"));
    }

    #[test]
    fn list_show_and_clear() {
        let dir = TempDir::new().unwrap();
        let (jar, model) = seed(dir.path());

        modelcache(dir.path())
            .args(["list"])
            .assert()
            .success()
            .stdout(predicate::str::contains("No cache entries found"));

        modelcache(dir.path())
            .args(["store", "app1", "--model", &model, "--file", &jar])
            .assert()
            .success();

        modelcache(dir.path())
            .args(["list", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::diff("app1\n"));

        modelcache(dir.path())
            .args(["show", "app1", "--format", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"identity\": \"app1\""))
            .stdout(predicate::str::contains("a.jar"));

        modelcache(dir.path())
            .args(["clear", "--all", "--yes"])
            .assert()
            .success()
            .stdout(predicate::str::contains("cleared 1 entry"));

        modelcache(dir.path())
            .args(["show", "app1"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("No cache entry for app1"));
    }

    #[test]
    fn clear_requires_target() {
        let dir = TempDir::new().unwrap();
        modelcache(dir.path()).args(["clear"]).assert().failure();
    }
}
