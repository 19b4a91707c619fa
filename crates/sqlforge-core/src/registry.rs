// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Entity and method registry.
//!
//! Registration happens once at startup. Every descriptor is validated as it
//! is added, so metadata faults surface as [`CodeGenError`]s before the first
//! query runs. [`RegistryBuilder::build`] freezes the result; the frozen
//! [`EntityRegistry`] is read without locks and may be installed process-wide.
//!
//! ```rust,ignore
//! let registry = RegistryBuilder::new()
//!     .entity::<User>()?
//!     .method("User", MethodDescriptor::new("findByName", ReturnShape::List)
//!         .param(ParamDescriptor::value("name")))?
//!     .build();
//! registry.install()?;
//!
//! let users = EntityRegistry::global().unwrap().lookup::<User>()?;
//! ```

use std::{
    collections::{BTreeMap, HashMap},
    sync::OnceLock
};

use tracing::debug;

use crate::{
    entity::Entity,
    error::CodeGenError,
    metadata::EntityDescriptor,
    method::MethodDescriptor,
    resolver::{ConventionResolver, NamingResolver}
};

static GLOBAL: OnceLock<EntityRegistry> = OnceLock::new();

#[derive(Debug, Clone)]
struct Registered {
    descriptor: EntityDescriptor,
    methods:    BTreeMap<String, MethodDescriptor>
}

/// Frozen set of validated entities and methods.
#[derive(Debug, Clone, Default)]
pub struct EntityRegistry {
    entities: HashMap<String, Registered>
}

impl EntityRegistry {
    /// Descriptor registered under `name`.
    ///
    /// # Errors
    ///
    /// [`CodeGenError::UnknownEntity`].
    pub fn entity(&self, name: &str) -> Result<&EntityDescriptor, CodeGenError> {
        self.entities
            .get(name)
            .map(|r| &r.descriptor)
            .ok_or_else(|| CodeGenError::UnknownEntity(name.to_owned()))
    }

    /// Descriptor registered for `E`.
    ///
    /// # Errors
    ///
    /// [`CodeGenError::UnknownEntity`].
    pub fn lookup<E: Entity>(&self) -> Result<&EntityDescriptor, CodeGenError> {
        self.entity(&E::descriptor().name)
    }

    /// Method `method` of entity `entity`.
    ///
    /// # Errors
    ///
    /// [`CodeGenError::UnknownEntity`] or [`CodeGenError::UnknownMethod`].
    pub fn method(&self, entity: &str, method: &str) -> Result<&MethodDescriptor, CodeGenError> {
        let registered = self
            .entities
            .get(entity)
            .ok_or_else(|| CodeGenError::UnknownEntity(entity.to_owned()))?;
        registered
            .methods
            .get(method)
            .ok_or_else(|| CodeGenError::UnknownMethod {
                entity: entity.to_owned(),
                method: method.to_owned()
            })
    }

    /// Methods of an entity, sorted by name.
    pub fn methods(&self, entity: &str) -> impl Iterator<Item = &MethodDescriptor> {
        self.entities
            .get(entity)
            .into_iter()
            .flat_map(|r| r.methods.values())
    }

    /// Number of registered entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Check whether nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Make this registry the process-wide one.
    ///
    /// # Errors
    ///
    /// [`CodeGenError::RegistryInstalled`] on a second call.
    pub fn install(self) -> Result<&'static Self, CodeGenError> {
        GLOBAL
            .set(self)
            .map_err(|_| CodeGenError::RegistryInstalled)?;
        GLOBAL.get().ok_or(CodeGenError::RegistryInstalled)
    }

    /// The process-wide registry, once installed.
    #[must_use]
    pub fn global() -> Option<&'static Self> {
        GLOBAL.get()
    }
}

/// Collects and validates descriptors before freezing them.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    entities: HashMap<String, Registered>
}

impl RegistryBuilder {
    /// Empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a derived entity type.
    ///
    /// # Errors
    ///
    /// See [`RegistryBuilder::descriptor`].
    pub fn entity<E: Entity>(self) -> Result<Self, CodeGenError> {
        self.descriptor(E::descriptor().clone())
    }

    /// Register a descriptor.
    ///
    /// # Errors
    ///
    /// - [`CodeGenError::DuplicateEntity`] for a repeated name
    /// - any fault from [`EntityDescriptor::validate`]
    pub fn descriptor(mut self, descriptor: EntityDescriptor) -> Result<Self, CodeGenError> {
        descriptor.validate()?;
        if self.entities.contains_key(&descriptor.name) {
            return Err(CodeGenError::DuplicateEntity(descriptor.name));
        }
        debug!(entity = %descriptor.name, table = %descriptor.qualified_table(), "entity registered");
        self.entities.insert(
            descriptor.name.clone(),
            Registered {
                descriptor,
                methods: BTreeMap::new()
            }
        );
        Ok(self)
    }

    /// Register a method of an already registered entity.
    ///
    /// Derived methods are resolved once with [`ConventionResolver`] so an
    /// unresolvable name fails here rather than on first call.
    ///
    /// # Errors
    ///
    /// - [`CodeGenError::UnknownEntity`] when the entity is not registered
    /// - [`CodeGenError::DuplicateMethod`] for a repeated method name
    /// - any fault from [`MethodDescriptor::validate`] or the resolver
    pub fn method(self, entity: &str, method: MethodDescriptor) -> Result<Self, CodeGenError> {
        self.method_with(entity, method, &ConventionResolver)
    }

    /// Register a method, resolving derived names with `resolver`.
    ///
    /// # Errors
    ///
    /// Same as [`RegistryBuilder::method`].
    pub fn method_with(
        mut self,
        entity: &str,
        method: MethodDescriptor,
        resolver: &dyn NamingResolver
    ) -> Result<Self, CodeGenError> {
        let registered = self
            .entities
            .get_mut(entity)
            .ok_or_else(|| CodeGenError::UnknownEntity(entity.to_owned()))?;
        method.validate()?;
        if method.is_derived() {
            resolver.resolve(&registered.descriptor, &method)?;
        }
        if registered.methods.contains_key(&method.name) {
            return Err(CodeGenError::DuplicateMethod {
                entity: entity.to_owned(),
                method: method.name
            });
        }
        debug!(entity, method = %method.name, "method registered");
        registered.methods.insert(method.name.clone(), method);
        Ok(self)
    }

    /// Freeze the registry.
    #[must_use]
    pub fn build(self) -> EntityRegistry {
        EntityRegistry {
            entities: self.entities
        }
    }
}
