//! Backend registry
//!
//! Password query and output backends are registered by name in two
//! namespaces, `userinput` and `output`. The registry is created once at
//! startup with [`BackendRegistry::with_builtin`] and passed to whoever needs
//! it; the first backend registered in a namespace is its default.

mod node;

use std::fmt;
use std::sync::Arc;

use crate::config::AppSettings;
use crate::error::BackendError;
use crate::output::{AutotypeOutput, ClipboardOutput, MenuOutput, OutputBackend, StdoutOutput};
use crate::query::{FilterPasswordQuery, PasswordQuery, TerminalQuery};
use crate::selection::SelectionProtocol;

pub use node::{Namespace, Node};

/// The backend families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    /// Password query backends
    Query,
    /// Output backends
    Output,
}

impl BackendKind {
    /// All kinds, in display order
    pub const ALL: [Self; 2] = [Self::Query, Self::Output];

    /// Name of the namespace holding this kind
    #[must_use]
    pub const fn namespace(self) -> &'static str {
        match self {
            Self::Query => "userinput",
            Self::Output => "output",
        }
    }

    const fn label(self) -> &'static str {
        match self {
            Self::Query => "password query",
            Self::Output => "output",
        }
    }
}

/// A registered backend
#[derive(Clone)]
pub enum Backend {
    /// Asks the user for a database password
    Query(Arc<dyn PasswordQuery>),
    /// Delivers the selected credential
    Output(Arc<dyn OutputBackend>),
}

impl Backend {
    /// The family of this backend
    #[must_use]
    pub const fn kind(&self) -> BackendKind {
        match self {
            Self::Query(_) => BackendKind::Query,
            Self::Output(_) => BackendKind::Output,
        }
    }

    /// One-line description
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Query(query) => query.description(),
            Self::Output(output) => output.description(),
        }
    }
}

impl fmt::Debug for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Backend")
            .field(&self.kind())
            .field(&self.description())
            .finish()
    }
}

/// Named password query and output backends
#[derive(Debug, Clone)]
pub struct BackendRegistry {
    root: Namespace<Backend>,
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl BackendRegistry {
    /// Creates a registry with empty `userinput` and `output` namespaces
    #[must_use]
    pub fn new() -> Self {
        let mut root = Namespace::new("root");
        for kind in BackendKind::ALL {
            // the root holds no leaves, so this cannot fail
            let _ = root.namespace_mut(kind.namespace());
        }
        Self { root }
    }

    /// Creates the registry holding every built-in backend
    ///
    /// Query backends: `stdin`, `rofi`. Output backends: `menu`, `copy`,
    /// `autotype`, `stdout`.
    ///
    /// # Errors
    /// Returns `BackendError` if a built-in name is registered twice
    pub fn with_builtin(settings: &AppSettings) -> Result<Self, BackendError> {
        let mut registry = Self::new();

        registry.register_query("stdin", Arc::new(TerminalQuery::new()), false)?;
        registry.register_query(
            "rofi",
            Arc::new(FilterPasswordQuery::new(settings.filter.program.clone())),
            false,
        )?;

        let protocol = SelectionProtocol::with_process(settings.filter.command());
        let outputs: Vec<(String, Arc<dyn OutputBackend>)> = vec![
            ("copy".to_string(), Arc::new(ClipboardOutput::default()) as Arc<dyn OutputBackend>),
            ("autotype".to_string(), Arc::new(AutotypeOutput::default()) as Arc<dyn OutputBackend>),
            ("stdout".to_string(), Arc::new(StdoutOutput::new()) as Arc<dyn OutputBackend>),
        ];
        registry.register_output("menu", Arc::new(MenuOutput::new(&protocol, outputs.clone())), false)?;
        for (name, output) in outputs {
            registry.register_output(name, output, false)?;
        }

        Ok(registry)
    }

    fn namespace_mut(&mut self, kind: BackendKind) -> Result<&mut Namespace<Backend>, BackendError> {
        self.root.namespace_mut(kind.namespace())
    }

    /// Returns the namespace of `kind`
    ///
    /// # Errors
    /// Returns `BackendError::Unknown` if the namespace was never created
    pub fn namespace(&self, kind: BackendKind) -> Result<&Namespace<Backend>, BackendError> {
        self.root
            .namespace(kind.namespace())
            .ok_or_else(|| BackendError::Unknown {
                name: kind.namespace().to_string(),
                namespace: self.root.name().to_string(),
                available: self.root.children().map(|ns| ns.name().to_string()).collect(),
            })
    }

    /// Registers a backend in the namespace matching its kind
    ///
    /// # Errors
    /// Returns `BackendError::Duplicate` if the name is taken and `overwrite`
    /// is false
    pub fn register(
        &mut self,
        name: impl Into<String>,
        backend: Backend,
        overwrite: bool,
    ) -> Result<(), BackendError> {
        self.namespace_mut(backend.kind())?
            .register(name, backend, overwrite)
    }

    /// Registers a password query backend
    ///
    /// # Errors
    /// Returns `BackendError::Duplicate` if the name is taken and `overwrite`
    /// is false
    pub fn register_query(
        &mut self,
        name: impl Into<String>,
        query: Arc<dyn PasswordQuery>,
        overwrite: bool,
    ) -> Result<(), BackendError> {
        self.register(name, Backend::Query(query), overwrite)
    }

    /// Registers an output backend
    ///
    /// # Errors
    /// Returns `BackendError::Duplicate` if the name is taken and `overwrite`
    /// is false
    pub fn register_output(
        &mut self,
        name: impl Into<String>,
        output: Arc<dyn OutputBackend>,
        overwrite: bool,
    ) -> Result<(), BackendError> {
        self.register(name, Backend::Output(output), overwrite)
    }

    /// Resolves a backend by name within `kind`'s namespace
    ///
    /// A dotted path (`output.copy`) is resolved from the root instead.
    ///
    /// # Errors
    /// Returns `BackendError::Unknown` listing the available names
    pub fn resolve(&self, kind: BackendKind, name: &str) -> Result<&Backend, BackendError> {
        if name.contains('.') {
            self.root.resolve(name)
        } else {
            self.namespace(kind)?.resolve(name)
        }
    }

    /// Returns the password query backend `name`
    ///
    /// # Errors
    /// Returns `BackendError::Unknown` or `BackendError::KindMismatch`
    pub fn query(&self, name: &str) -> Result<Arc<dyn PasswordQuery>, BackendError> {
        match self.resolve(BackendKind::Query, name)? {
            Backend::Query(query) => Ok(Arc::clone(query)),
            Backend::Output(_) => Err(Self::mismatch(name, BackendKind::Query)),
        }
    }

    /// Returns the output backend `name`
    ///
    /// # Errors
    /// Returns `BackendError::Unknown` or `BackendError::KindMismatch`
    pub fn output(&self, name: &str) -> Result<Arc<dyn OutputBackend>, BackendError> {
        match self.resolve(BackendKind::Output, name)? {
            Backend::Output(output) => Ok(Arc::clone(output)),
            Backend::Query(_) => Err(Self::mismatch(name, BackendKind::Output)),
        }
    }

    fn mismatch(name: &str, expected: BackendKind) -> BackendError {
        BackendError::KindMismatch {
            name: name.to_string(),
            expected: expected.label(),
        }
    }

    /// Backend names of `kind` in registration order
    #[must_use]
    pub fn names(&self, kind: BackendKind) -> Vec<&str> {
        self.namespace(kind).map(Namespace::list).unwrap_or_default()
    }

    /// The default backend name of `kind` (the first registered)
    #[must_use]
    pub fn default_name(&self, kind: BackendKind) -> Option<&str> {
        self.namespace(kind).ok().and_then(Namespace::default_name)
    }

    /// The root namespace
    #[must_use]
    pub const fn root(&self) -> &Namespace<Backend> {
        &self.root
    }
}

impl fmt::Display for BackendRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.root, f)
    }
}
