// Shared helpers for integration tests.
//
// Provides a temporary-directory-backed system layout (vendor and admin
// definition directories, ledger, log directory) and helpers to write
// shell-script triggers that leave a trace of every execution.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::path::{Path, PathBuf};

use usysconf::config::Paths;
use usysconf::engine::Engine;
use usysconf::error::Error;
use usysconf::ledger::Ledger;
use usysconf::logging::Logger;
use usysconf::triggers::{RunContext, RunSummary};

/// An isolated system layout backed by a [`tempfile::TempDir`].
pub struct TestSystem {
    /// Temporary directory holding every path the engine touches.
    pub root: tempfile::TempDir,
}

impl TestSystem {
    /// Create a layout with empty vendor and admin directories and a watched
    /// directory containing one file.
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("create temp dir");
        for dir in ["usr", "etc", "watched"] {
            std::fs::create_dir_all(root.path().join(dir)).expect("create layout dir");
        }
        std::fs::write(root.path().join("watched/initial"), "x").expect("write watched file");
        Self { root }
    }

    /// Path to the layout root.
    pub fn root_path(&self) -> &Path {
        self.root.path()
    }

    /// Locations handed to the engine.
    pub fn paths(&self) -> Paths {
        Paths {
            usr_dir: self.root_path().join("usr"),
            sys_dir: self.root_path().join("etc"),
            ledger: self.root_path().join("state/ledger.json"),
            log_dir: self.root_path().join("log"),
        }
    }

    /// Glob matching everything in the watched directory.
    pub fn watched_glob(&self) -> String {
        format!("{}/watched/*", self.root_path().display())
    }

    /// Add a file to the watched directory.
    pub fn touch_watched(&self, name: &str) {
        std::fs::write(self.root_path().join("watched").join(name), name)
            .expect("write watched file");
    }

    /// File every script trigger appends its name to.
    pub fn trace_path(&self) -> PathBuf {
        self.root_path().join("trace")
    }

    /// Names of the triggers that ran, in execution order.
    pub fn trace(&self) -> Vec<String> {
        std::fs::read_to_string(self.trace_path())
            .unwrap_or_default()
            .lines()
            .map(ToString::to_string)
            .collect()
    }

    /// A definition running `sh -c` that records `label` in the trace and
    /// then runs `tail` (e.g. `exit 3`). `extra` is appended verbatim.
    pub fn script(&self, label: &str, tail: &str, extra: &str) -> String {
        format!(
            "binary = \"sh\"\narguments = [\"-c\", 'echo {label} >> {trace}; {tail}']\n{extra}\n",
            trace = self.trace_path().display(),
        )
    }

    /// Write a vendor-layer definition file `<name>.toml`.
    pub fn vendor(&self, name: &str, content: &str) {
        std::fs::write(self.root_path().join("usr").join(format!("{name}.toml")), content)
            .expect("write vendor definition");
    }

    /// Write an admin-layer definition file `<name>.toml`.
    pub fn admin(&self, name: &str, content: &str) {
        std::fs::write(self.root_path().join("etc").join(format!("{name}.toml")), content)
            .expect("write admin definition");
    }

    /// Run the engine with real processes.
    pub fn run(&self, ctx: &RunContext) -> Result<RunSummary, Error> {
        Engine::new(self.paths()).run(ctx, &Logger::default())
    }

    /// Run with default options, expecting no fatal error.
    pub fn run_default(&self) -> RunSummary {
        self.run(&RunContext::default()).expect("run should not fail")
    }

    /// Current ledger on disk.
    pub fn ledger(&self) -> Ledger {
        Ledger::load(&self.paths().ledger).expect("load ledger")
    }

    /// Raw ledger bytes, or `None` when the file does not exist.
    pub fn ledger_bytes(&self) -> Option<Vec<u8>> {
        std::fs::read(self.paths().ledger).ok()
    }
}
