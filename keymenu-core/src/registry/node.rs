//! Ordered namespace tree used by the backend registry
//!
//! A [`Namespace`] maps names to either a nested namespace or a leaf value,
//! keeping insertion order so that the first registered leaf can act as the
//! default choice.

use std::fmt;

use crate::error::BackendError;

/// A child of a namespace
#[derive(Debug, Clone)]
pub enum Node<T> {
    /// A nested namespace
    Namespace(Namespace<T>),
    /// A registered value
    Leaf(T),
}

/// An ordered, string-keyed tree of namespaces and leaves
#[derive(Debug, Clone)]
pub struct Namespace<T> {
    name: String,
    children: Vec<(String, Node<T>)>,
}

impl<T> Namespace<T> {
    /// Creates an empty namespace
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
        }
    }

    /// Returns the namespace name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.children.iter().position(|(n, _)| n == name)
    }

    /// Binds `value` to `name`
    ///
    /// Overwriting keeps the position of the original binding.
    ///
    /// # Errors
    /// Returns `BackendError::Duplicate` if the name is already bound and
    /// `overwrite` is false
    pub fn register(
        &mut self,
        name: impl Into<String>,
        value: T,
        overwrite: bool,
    ) -> Result<(), BackendError> {
        let name = name.into();
        match self.position(&name) {
            Some(_) if !overwrite => Err(BackendError::Duplicate {
                name,
                namespace: self.name.clone(),
            }),
            Some(index) => {
                self.children[index].1 = Node::Leaf(value);
                Ok(())
            }
            None => {
                self.children.push((name, Node::Leaf(value)));
                Ok(())
            }
        }
    }

    /// Returns the child namespace `name`, creating it if needed
    ///
    /// # Errors
    /// Returns `BackendError::NotANamespace` if `name` is bound to a leaf
    pub fn namespace_mut(&mut self, name: &str) -> Result<&mut Self, BackendError> {
        let index = match self.position(name) {
            Some(index) => index,
            None => {
                self.children
                    .push((name.to_string(), Node::Namespace(Self::new(name))));
                self.children.len() - 1
            }
        };
        match &mut self.children[index].1 {
            Node::Namespace(ns) => Ok(ns),
            Node::Leaf(_) => Err(BackendError::NotANamespace(name.to_string())),
        }
    }

    /// Returns the child namespace `name`, if any
    #[must_use]
    pub fn namespace(&self, name: &str) -> Option<&Self> {
        self.children.iter().find_map(|(n, node)| match node {
            Node::Namespace(ns) if n == name => Some(ns),
            _ => None,
        })
    }

    /// Resolves a leaf by name
    ///
    /// Dotted paths (`output.copy`) descend into nested namespaces.
    ///
    /// # Errors
    /// Returns `BackendError::Unknown` if no leaf is bound at the path, or
    /// `BackendError::NotANamespace` if an intermediate segment is a leaf
    pub fn resolve(&self, path: &str) -> Result<&T, BackendError> {
        if let Some((head, rest)) = path.split_once('.') {
            return match self.children.iter().find(|(n, _)| n == head) {
                Some((_, Node::Namespace(ns))) => ns.resolve(rest),
                Some((_, Node::Leaf(_))) => Err(BackendError::NotANamespace(head.to_string())),
                None => Err(self.unknown(path)),
            };
        }
        self.leaves()
            .find_map(|(n, value)| (n == path).then_some(value))
            .ok_or_else(|| self.unknown(path))
    }

    fn unknown(&self, name: &str) -> BackendError {
        BackendError::Unknown {
            name: name.to_string(),
            namespace: self.name.clone(),
            available: self.list().into_iter().map(String::from).collect(),
        }
    }

    /// Iterates the leaves of this namespace in registration order
    pub fn leaves(&self) -> impl Iterator<Item = (&str, &T)> {
        self.children.iter().filter_map(|(name, node)| match node {
            Node::Leaf(value) => Some((name.as_str(), value)),
            Node::Namespace(_) => None,
        })
    }

    /// Iterates the nested namespaces in registration order
    pub fn children(&self) -> impl Iterator<Item = &Self> {
        self.children.iter().filter_map(|(_, node)| match node {
            Node::Namespace(ns) => Some(ns),
            Node::Leaf(_) => None,
        })
    }

    /// Leaf names in registration order
    #[must_use]
    pub fn list(&self) -> Vec<&str> {
        self.leaves().map(|(name, _)| name).collect()
    }

    /// The first registered leaf name
    #[must_use]
    pub fn default_name(&self) -> Option<&str> {
        self.leaves().next().map(|(name, _)| name)
    }

    /// Returns true if nothing is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl<T> fmt::Display for Namespace<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{{", self.name)?;
        for (i, (name, node)) in self.children.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            match node {
                Node::Namespace(ns) => write!(f, "{ns}")?,
                Node::Leaf(_) => f.write_str(name)?,
            }
        }
        f.write_str("}")
    }
}
