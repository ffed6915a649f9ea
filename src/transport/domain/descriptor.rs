//! Transport and property descriptors.

use super::{Mep, TransportDomainError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One configurable transport property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDescriptor {
    name: String,
    user_name: String,
    #[serde(default)]
    mandatory: bool,
    #[serde(default)]
    default_value: Option<String>,
}

impl PropertyDescriptor {
    /// Creates an optional property without a default.
    #[must_use]
    pub fn new(name: impl Into<String>, user_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            user_name: user_name.into(),
            mandatory: false,
            default_value: None,
        }
    }

    /// Marks the property as mandatory.
    #[must_use]
    pub const fn mandatory(mut self) -> Self {
        self.mandatory = true;
        self
    }

    /// Sets the value used when none is configured.
    #[must_use]
    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Returns the property key.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the display name.
    #[must_use]
    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    /// Returns whether a value is required.
    #[must_use]
    pub const fn is_mandatory(&self) -> bool {
        self.mandatory
    }

    /// Returns the default value.
    #[must_use]
    pub fn default_value(&self) -> Option<&str> {
        self.default_value.as_deref()
    }
}

/// Static description of a transport type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportDescriptor {
    type_name: String,
    user_name: String,
    #[serde(default)]
    view_hint: Option<String>,
    mep: Mep,
    #[serde(default)]
    properties: Vec<PropertyDescriptor>,
}

impl TransportDescriptor {
    /// Creates a descriptor without properties.
    ///
    /// # Errors
    ///
    /// Returns [`TransportDomainError::EmptyTypeName`] when `type_name` is
    /// blank.
    pub fn new(
        type_name: impl Into<String>,
        user_name: impl Into<String>,
        mep: Mep,
    ) -> Result<Self, TransportDomainError> {
        let name = type_name.into();
        if name.trim().is_empty() {
            return Err(TransportDomainError::EmptyTypeName);
        }
        Ok(Self {
            type_name: name,
            user_name: user_name.into(),
            view_hint: None,
            mep,
            properties: Vec::new(),
        })
    }

    /// Sets the directive or view hint used by editors.
    #[must_use]
    pub fn with_view_hint(mut self, hint: impl Into<String>) -> Self {
        self.view_hint = Some(hint.into());
        self
    }

    /// Appends a property; declaration order is preserved.
    #[must_use]
    pub fn with_property(mut self, property: PropertyDescriptor) -> Self {
        self.properties.push(property);
        self
    }

    /// Returns the unique type name.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Returns the display name.
    #[must_use]
    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    /// Returns the view hint.
    #[must_use]
    pub fn view_hint(&self) -> Option<&str> {
        self.view_hint.as_deref()
    }

    /// Returns the exchange pattern.
    #[must_use]
    pub const fn mep(&self) -> Mep {
        self.mep
    }

    /// Returns the properties in declaration order.
    #[must_use]
    pub fn properties(&self) -> &[PropertyDescriptor] {
        &self.properties
    }

    /// Returns the mandatory subset of the properties.
    pub fn mandatory_properties(&self) -> impl Iterator<Item = &PropertyDescriptor> {
        self.properties.iter().filter(|property| property.is_mandatory())
    }

    /// Checks that every mandatory property resolves to a value.
    ///
    /// A property resolves when `configured` holds a non-blank value for it
    /// or the descriptor declares a default.
    ///
    /// # Errors
    ///
    /// Returns [`TransportDomainError::MissingMandatoryProperty`] naming the
    /// first unresolved property.
    pub fn validate_properties(
        &self,
        configured: &BTreeMap<String, String>,
    ) -> Result<(), TransportDomainError> {
        let missing = self.mandatory_properties().find(|property| {
            let configured_value = configured
                .get(property.name())
                .is_some_and(|value| !value.trim().is_empty());
            !configured_value && property.default_value().is_none()
        });
        match missing {
            Some(property) => Err(TransportDomainError::MissingMandatoryProperty {
                transport: self.type_name.clone(),
                property: property.name().to_owned(),
            }),
            None => Ok(()),
        }
    }

    /// Returns `configured` completed with defaults for absent properties.
    #[must_use]
    pub fn resolve_properties(
        &self,
        configured: &BTreeMap<String, String>,
    ) -> BTreeMap<String, String> {
        let mut resolved = configured.clone();
        for property in &self.properties {
            if let Some(default) = property.default_value() {
                resolved
                    .entry(property.name().to_owned())
                    .or_insert_with(|| default.to_owned());
            }
        }
        resolved
    }
}
