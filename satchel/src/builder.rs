//! Build-time configuration for a template [`Collection`](crate::Collection).

use std::collections::BTreeMap;
use std::path::PathBuf;

use handlebars::HelperDef;

use crate::{Collection, Error};

/// A boxed helper function, as registered on the underlying Handlebars
/// registry.
pub type HelperFn = Box<dyn HelperDef + Send + Sync + 'static>;

/// Accumulated configuration for a [`Collection`].
///
/// Created with [`Collection::build`]. Configuration calls only mutate the
/// builder itself; nothing touches the file system until [`Builder::done`].
pub struct Builder {
    pub(crate) root: PathBuf,
    pub(crate) patterns: Vec<String>,
    pub(crate) dynamic: bool,
    pub(crate) helpers: BTreeMap<String, HelperFn>,
}

impl Builder {
    pub(crate) fn new(root: PathBuf, patterns: Vec<String>) -> Self {
        Self {
            root,
            patterns,
            dynamic: false,
            helpers: BTreeMap::new(),
        }
    }

    /// Configures whether every lookup checks the underlying files for
    /// changes, re-parsing the collection accordingly. Checking the file
    /// system on every lookup is slow; leave this off in production.
    pub fn dynamic(mut self, enabled: bool) -> Self {
        self.dynamic = enabled;
        self
    }

    /// Defines a single helper function for the templates, overriding any
    /// previously defined helper with the same name.
    pub fn with_helper<N: AsRef<str>>(mut self, name: N, helper: HelperFn) -> Self {
        self.helpers.insert(name.as_ref().to_string(), helper);
        self
    }

    /// Defines the given helper functions for the templates. It can be called
    /// multiple times with different sets of helpers: if the same name is
    /// used it will override any previous definition.
    pub fn with_helpers<I, N>(mut self, helpers: I) -> Self
    where
        I: IntoIterator<Item = (N, HelperFn)>,
        N: AsRef<str>,
    {
        for (name, helper) in helpers {
            self.helpers.insert(name.as_ref().to_string(), helper);
        }
        self
    }

    /// Finishes configuration and builds the collection, or fails if the
    /// initial scan of the root directory does.
    pub fn done(self) -> Result<Collection, Error> {
        Collection::from_builder(self)
    }
}
