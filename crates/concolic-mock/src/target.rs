//! Mock target descriptors and interception classification.
//!
//! A [`MockTarget`] describes a type the engine may be asked to substitute:
//! its kind, and the methods whose return values could steer a branch.
//! Classification decides *how* calls on the type are intercepted. Finality
//! never makes a type unmockable on its own: a `final` class or method is
//! intercepted at the call boundary instead of through a generated subtype.

use crate::config::{MockConfig, MockingMode};
use crate::result::{MockError, MockResult};
use crate::value::ValueType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Method modifiers relevant to interception
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Modifiers {
    /// Declared `final`
    pub is_final: bool,
    /// Declared `static`
    pub is_static: bool,
    /// Declared `private`
    pub is_private: bool,
}

/// Signature of a method on a mock target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodSig {
    /// Method name
    pub name: String,
    /// Parameter types, in order
    pub params: Vec<ValueType>,
    /// Declared return type
    pub returns: ValueType,
    /// Modifiers
    #[serde(default)]
    pub modifiers: Modifiers,
}

impl MethodSig {
    /// Create a public, virtual, zero-argument method
    #[must_use]
    pub fn new(name: impl Into<String>, returns: ValueType) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            returns,
            modifiers: Modifiers::default(),
        }
    }

    /// Set the parameter types
    #[must_use]
    pub fn with_params(mut self, params: impl IntoIterator<Item = ValueType>) -> Self {
        self.params = params.into_iter().collect();
        self
    }

    /// Mark the method `final`
    #[must_use]
    pub const fn final_method(mut self) -> Self {
        self.modifiers.is_final = true;
        self
    }

    /// Mark the method `static`
    #[must_use]
    pub const fn static_method(mut self) -> Self {
        self.modifiers.is_static = true;
        self
    }

    /// Mark the method `private`
    #[must_use]
    pub const fn private_method(mut self) -> Self {
        self.modifiers.is_private = true;
        self
    }

    /// Whether calls to this method can be redirected to the resolver
    ///
    /// Private and static methods have no receiver-visible call boundary,
    /// and a `void` return cannot influence control flow.
    #[must_use]
    pub const fn is_interceptable(&self) -> bool {
        !self.modifiers.is_private && !self.modifiers.is_static && self.returns.is_resolvable()
    }
}

impl fmt::Display for MethodSig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers.is_final {
            f.write_str("final ")?;
        }
        write!(f, "{} {}(", self.returns, self.name)?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{param}")?;
        }
        f.write_str(")")
    }
}

/// Kind of a mock target type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeKind {
    /// A class
    Class {
        /// Declared `final`
        is_final: bool,
        /// Declared `abstract`
        is_abstract: bool,
    },
    /// An interface
    Interface,
    /// A primitive type
    Primitive,
    /// An array type
    Array,
}

/// Mechanism used to redirect calls on a mock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interception {
    /// Dynamic proxy implementing the interface
    Proxy,
    /// Generated subtype overriding every interceptable method
    Subclass,
    /// Call-boundary rewriting; works on `final` classes and methods
    CallSite,
}

impl fmt::Display for Interception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Proxy => "proxy",
            Self::Subclass => "subclass",
            Self::CallSite => "call-site",
        };
        f.write_str(name)
    }
}

/// Descriptor of a type that may be mocked
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MockTarget {
    name: String,
    kind: TypeKind,
    methods: Vec<MethodSig>,
}

impl MockTarget {
    /// Start describing a class
    #[must_use]
    pub fn class(name: impl Into<String>) -> MockTargetBuilder {
        MockTargetBuilder::new(
            name,
            TypeKind::Class {
                is_final: false,
                is_abstract: false,
            },
        )
    }

    /// Start describing an interface
    #[must_use]
    pub fn interface(name: impl Into<String>) -> MockTargetBuilder {
        MockTargetBuilder::new(name, TypeKind::Interface)
    }

    /// Describe a primitive type (never mockable)
    #[must_use]
    pub fn primitive(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: TypeKind::Primitive,
            methods: Vec::new(),
        }
    }

    /// Type name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Type kind
    #[must_use]
    pub const fn kind(&self) -> TypeKind {
        self.kind
    }

    /// All declared methods
    #[must_use]
    pub fn methods(&self) -> &[MethodSig] {
        &self.methods
    }

    /// Look up an interceptable method by name
    #[must_use]
    pub fn method(&self, name: &str) -> Option<&MethodSig> {
        self.interceptable_methods().find(|m| m.name == name)
    }

    /// Methods whose calls can be redirected
    pub fn interceptable_methods(&self) -> impl Iterator<Item = &MethodSig> {
        self.methods.iter().filter(|m| m.is_interceptable())
    }

    /// An interface with exactly one interceptable method
    #[must_use]
    pub fn is_functional_interface(&self) -> bool {
        self.kind == TypeKind::Interface && self.interceptable_methods().count() == 1
    }

    /// Whether the real type could be constructed instead of mocked
    #[must_use]
    pub const fn is_instantiable(&self) -> bool {
        matches!(
            self.kind,
            TypeKind::Class {
                is_abstract: false,
                ..
            }
        )
    }

    /// Interception mechanism this type admits, independent of configuration
    pub fn interception(&self) -> MockResult<Interception> {
        match self.kind {
            TypeKind::Primitive | TypeKind::Array => {
                return Err(MockError::unmockable(
                    &self.name,
                    "sealed type without a method call boundary",
                ));
            }
            TypeKind::Class { .. } | TypeKind::Interface => {}
        }

        if self.interceptable_methods().next().is_none() {
            return Err(MockError::unmockable(
                &self.name,
                "no non-private instance method with a resolvable return type",
            ));
        }

        Ok(match self.kind {
            TypeKind::Interface => Interception::Proxy,
            TypeKind::Class { is_final: true, .. } => Interception::CallSite,
            _ if self.interceptable_methods().any(|m| m.modifiers.is_final) => {
                Interception::CallSite
            }
            _ => Interception::Subclass,
        })
    }

    /// Interception mechanism under the given mocking policy
    pub fn classify(&self, config: &MockConfig) -> MockResult<Interception> {
        if !config.enabled {
            return Err(MockError::unmockable(&self.name, "mocking is disabled"));
        }

        let interception = self.interception()?;

        if config.mode == MockingMode::Basic && self.is_instantiable() {
            return Err(MockError::unmockable(
                &self.name,
                "type is instantiable and mocking mode is basic",
            ));
        }

        if interception == Interception::CallSite && !config.call_site_rewrite {
            return Err(MockError::unmockable(
                &self.name,
                "final type or method requires call-site rewriting, which is disabled",
            ));
        }

        Ok(interception)
    }
}

/// Builder for [`MockTarget`]
#[derive(Debug)]
pub struct MockTargetBuilder {
    name: String,
    kind: TypeKind,
    methods: Vec<MethodSig>,
}

impl MockTargetBuilder {
    fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            methods: Vec::new(),
        }
    }

    /// Mark the class `final`; ignored for interfaces
    #[must_use]
    pub fn final_class(mut self) -> Self {
        if let TypeKind::Class { is_final, .. } = &mut self.kind {
            *is_final = true;
        }
        self
    }

    /// Mark the class `abstract`; ignored for interfaces
    #[must_use]
    pub fn abstract_class(mut self) -> Self {
        if let TypeKind::Class { is_abstract, .. } = &mut self.kind {
            *is_abstract = true;
        }
        self
    }

    /// Add a method
    #[must_use]
    pub fn method(mut self, method: MethodSig) -> Self {
        self.methods.push(method);
        self
    }

    /// Build the target
    #[must_use]
    pub fn build(self) -> MockTarget {
        MockTarget {
            name: self.name,
            kind: self.kind,
            methods: self.methods,
        }
    }
}
