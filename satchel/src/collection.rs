//! The template collection: a compiled set of named templates plus the
//! machinery that keeps it fresh.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::time::SystemTime;

use glob::Pattern;
use handlebars::{Handlebars, Template};
use log::debug;
use serde::Serialize;
use walkdir::WalkDir;

use crate::builder::Builder;
use crate::Error;

/// A collection of all templates found under a root directory.
///
/// Built with [`Collection::new`] or, for more control, through the
/// [`Collection::build`] API. Templates are addressed by their root-relative,
/// `/`-separated path, so a file at `root/nav/login.html` is always
/// `"nav/login.html"`, independent of the host's own path conventions.
///
/// A static collection is parsed once and read-only thereafter; concurrent
/// lookups share it without any locking. A dynamic collection re-checks the
/// underlying files on every lookup and re-parses the whole tree when any of
/// them changed, serializing all access on a single lock.
pub struct Collection {
    config: Config,
    mode: Mode,
}

impl std::fmt::Debug for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collection")
            .field("root", &self.config.root)
            .field("patterns", &self.config.pattern_strings())
            .field(
                "mode",
                &match self.mode {
                    Mode::Static(_) => "static",
                    Mode::Dynamic(_) => "dynamic",
                },
            )
            .finish()
    }
}

// Lock-freedom in static mode is structural: the mutex only exists in the
// dynamic variant, and the static store is never written after construction.
enum Mode {
    Static(Store),
    Dynamic(Mutex<Store>),
}

// The unit of atomic replacement: the compiled template namespace together
// with the modification time recorded when each file was parsed. The two
// always describe the same set of names.
struct Store {
    registry: Handlebars<'static>,
    mod_times: BTreeMap<String, SystemTime>,
}

struct Config {
    root: PathBuf,
    patterns: Vec<Pattern>,
}

impl Config {
    fn pattern_strings(&self) -> Vec<String> {
        self.patterns
            .iter()
            .map(|p| p.as_str().to_string())
            .collect()
    }
}

// One successfully parsed file from a scan pass.
struct Parsed {
    name: String,
    template: Template,
    modified: SystemTime,
}

impl Collection {
    /// Creates a `Collection` with parsed templates (files) from a directory.
    ///
    /// The `root` directory is recursively traversed, and every file whose
    /// base name (without the path) matches one of the given shell-glob
    /// `patterns` is parsed into the collection. Patterns are only ever
    /// matched against base names, so a pattern containing a path separator
    /// matches nothing.
    ///
    /// Finding no matching files at all is an error, not an empty collection:
    /// a misconfigured root or pattern set should fail loudly at start-up
    /// rather than serve nothing.
    ///
    /// If `dynamic` is set, every call to [`Collection::get`] checks whether
    /// files changed and updates the collection accordingly. If you need more
    /// control, use the [`Collection::build`] API instead.
    pub fn new<P, S>(root: P, patterns: &[S], dynamic: bool) -> Result<Self, Error>
    where
        P: AsRef<Path>,
        S: AsRef<str>,
    {
        Self::build(root, patterns).dynamic(dynamic).done()
    }

    /// Starts configuration of a collection. Call [`Builder::done`] once
    /// everything is configured.
    pub fn build<P, S>(root: P, patterns: &[S]) -> Builder
    where
        P: AsRef<Path>,
        S: AsRef<str>,
    {
        Builder::new(
            root.as_ref().to_path_buf(),
            patterns.iter().map(|p| p.as_ref().to_string()).collect(),
        )
    }

    pub(crate) fn from_builder(builder: Builder) -> Result<Self, Error> {
        let mut patterns = Vec::with_capacity(builder.patterns.len());
        for pattern in &builder.patterns {
            patterns.push(Pattern::new(pattern).map_err(|e| Error::Pattern(pattern.clone(), e))?);
        }
        let config = Config {
            root: builder.root,
            patterns,
        };

        let mut registry = Handlebars::new();
        for (name, helper) in builder.helpers {
            registry.register_helper(&name, helper);
        }
        let mut store = Store {
            registry,
            mod_times: BTreeMap::new(),
        };
        install(&mut store, scan(&config)?);

        let mode = if builder.dynamic {
            Mode::Dynamic(Mutex::new(store))
        } else {
            Mode::Static(store)
        };
        Ok(Self { config, mode })
    }

    /// Returns the named template.
    ///
    /// If the collection is dynamic and any file under the root changed, the
    /// whole tree is re-parsed first. There is no dependency graph between
    /// templates, so one changed file invalidates everything.
    pub fn get(&self, name: &str) -> Result<Template, Error> {
        self.with_current(name, |store| {
            store
                .registry
                .get_template(name)
                .cloned()
                .ok_or_else(|| self.not_found(name))
        })
    }

    /// Renders the named template with the given data.
    ///
    /// Follows the same freshness rules as [`Collection::get`]; for a dynamic
    /// collection the lookup, any re-parse and the render happen inside one
    /// critical section.
    pub fn render<T: Serialize>(&self, name: &str, data: &T) -> Result<String, Error> {
        self.with_current(name, |store| {
            store
                .registry
                .render(name, data)
                .map_err(|e| Error::Render(name.to_string(), e))
        })
    }

    /// Returns the whole compiled namespace, mostly useful for enumerating
    /// the collection. No freshness check is performed.
    pub fn templates(&self) -> BTreeMap<String, Template> {
        match &self.mode {
            Mode::Static(store) => snapshot(store),
            Mode::Dynamic(store) => {
                snapshot(&store.lock().unwrap_or_else(PoisonError::into_inner))
            }
        }
    }

    // Runs `f` against a store that is current for `name`: the name is known
    // to the store, and in dynamic mode the staleness check (and a reload, if
    // one was needed) has already run.
    fn with_current<T>(
        &self,
        name: &str,
        f: impl FnOnce(&Store) -> Result<T, Error>,
    ) -> Result<T, Error> {
        match &self.mode {
            Mode::Static(store) => {
                if !store.registry.has_template(name) {
                    return Err(self.not_found(name));
                }
                f(store)
            }
            Mode::Dynamic(store) => {
                let mut store = store.lock().unwrap_or_else(PoisonError::into_inner);
                if !store.registry.has_template(name) {
                    // A name the collection never knew does not trigger a
                    // reload.
                    return Err(self.not_found(name));
                }
                let stale = self
                    .is_stale(&store)
                    .map_err(|e| Error::Refresh(name.to_string(), Box::new(e)))?;
                if stale {
                    let parsed = scan(&self.config)
                        .map_err(|e| Error::Refresh(name.to_string(), Box::new(e)))?;
                    install(&mut store, parsed);
                    if !store.registry.has_template(name) {
                        // The file was deleted or renamed between detection
                        // and re-parse.
                        return Err(self.not_found(name));
                    }
                }
                f(&store)
            }
        }
    }

    // True if any tracked file's current modification time is strictly newer
    // than the one recorded when it was parsed. Equal timestamps count as
    // unchanged, so an edit within the file system's mtime resolution can be
    // missed. One changed file is enough; the scan short-circuits.
    fn is_stale(&self, store: &Store) -> Result<bool, Error> {
        for (name, parsed_mod_time) in &store.mod_times {
            let path = self.config.root.join(name);
            if modified_time(&path)? > *parsed_mod_time {
                debug!("Template {} changed on disk, re-parsing the collection", name);
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn not_found(&self, name: &str) -> Error {
        Error::NotFound(
            name.to_string(),
            self.config.root.clone(),
            self.config.pattern_strings(),
        )
    }
}

// Finds, reads and parses every matching file under the configuration's
// root. This is the single path through which templates enter a collection,
// for initial construction and reloads alike. Nothing is mutated here: the
// caller installs the result only once the whole pass has succeeded.
fn scan(config: &Config) -> Result<Vec<Parsed>, Error> {
    let mut parsed = Vec::new();
    for entry in WalkDir::new(&config.root).sort_by_file_name() {
        let entry = entry.map_err(|e| Error::Traversal(config.root.clone(), e))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let base = entry.file_name().to_string_lossy();
        if !config.patterns.iter().any(|p| p.matches(&base)) {
            continue;
        }
        let path = entry.path();
        // Stat before read: an edit landing between the two still compares
        // newer than the recorded time on the next check.
        let modified = modified_time(path)?;
        let contents =
            fs::read_to_string(path).map_err(|e| Error::Read(path.to_path_buf(), e))?;
        let name = relative_name(&config.root, path);
        let template = Template::compile_with_name(&contents, name.clone())
            .map_err(|e| Error::Parse(name.clone(), e))?;
        parsed.push(Parsed {
            name,
            template,
            modified,
        });
    }
    if parsed.is_empty() {
        return Err(Error::NoTemplates(
            config.root.clone(),
            config.pattern_strings(),
        ));
    }
    debug!(
        "Parsed {} templates under {}",
        parsed.len(),
        config.root.display()
    );
    Ok(parsed)
}

// Replaces the store's contents with the result of a successful scan. This
// step cannot fail: templates and modification times are swapped together,
// and helpers registered at construction stay in the registry.
fn install(store: &mut Store, parsed: Vec<Parsed>) {
    store.registry.clear_templates();
    store.mod_times.clear();
    for Parsed {
        name,
        template,
        modified,
    } in parsed
    {
        store.registry.register_template(&name, template);
        store.mod_times.insert(name, modified);
    }
}

fn modified_time(path: &Path) -> Result<SystemTime, Error> {
    let meta = fs::metadata(path).map_err(|e| Error::Stat(path.to_path_buf(), e))?;
    meta.modified()
        .map_err(|e| Error::Stat(path.to_path_buf(), e))
}

// Root-relative name with `/` separators, regardless of the host's own path
// conventions.
fn relative_name(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn snapshot(store: &Store) -> BTreeMap<String, Template> {
    store
        .registry
        .get_templates()
        .iter()
        .map(|(name, template)| (name.clone(), template.clone()))
        .collect()
}
