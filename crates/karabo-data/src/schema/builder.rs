// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fluent schema construction.

use super::descriptor::Descriptor;
use super::meta::NodeType;
use super::{attr, Schema};
use crate::config::{CLASS_ID_SLOT, PATH_SEPARATOR};
use crate::error::{Error, Result};
use crate::hash::{validate_key, Hash, Node};
use crate::types::Value;

/// Collects descriptors in declaration order and composes them into a
/// [`Schema`].
///
/// ```rust
/// use karabo_data::schema::{LeafDescriptor, SchemaBuilder};
///
/// let schema = SchemaBuilder::new("Motor")
///     .add(LeafDescriptor::double("speed").reconfigurable().min_inc(0.0).default_value(1.0))
///     .add(LeafDescriptor::string("name").assignment_mandatory())
///     .build()
///     .unwrap();
/// assert_eq!(schema.paths(), ["speed", "name"]);
/// ```
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    root_name: String,
    descriptors: Vec<Descriptor>,
}

impl SchemaBuilder {
    pub fn new(root_name: impl Into<String>) -> Self {
        Self {
            root_name: root_name.into(),
            descriptors: Vec::new(),
        }
    }

    pub fn root_name(&self) -> &str {
        &self.root_name
    }

    /// Queue a descriptor. Errors surface in [`Self::build`].
    #[allow(clippy::should_implement_trait)]
    pub fn add(mut self, descriptor: impl Into<Descriptor>) -> Self {
        self.descriptors.push(descriptor.into());
        self
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Compose all descriptors, stopping at the first invalid one.
    pub fn build(self) -> Result<Schema> {
        let mut parameters = Hash::new();
        let count = self.descriptors.len();
        for descriptor in self.descriptors {
            let path = descriptor.key().to_string();
            declare(&mut parameters, descriptor).map_err(|e| e.at(&path))?;
        }
        log::debug!(
            "schema '{}': {count} descriptors, {} top-level parameters",
            self.root_name,
            parameters.len()
        );
        Ok(Schema::from_parts(self.root_name, parameters))
    }
}

fn declare(parameters: &mut Hash, descriptor: Descriptor) -> Result<()> {
    let path = descriptor.key().to_string();
    let (parent_path, key) = match path.rsplit_once(PATH_SEPARATOR) {
        Some((parent, key)) => (Some(parent), key),
        None => (None, path.as_str()),
    };
    validate_key(key).map_err(|_| Error::InvalidPath {
        path: path.clone(),
        detail: format!("bad parameter key '{key}'"),
    })?;
    let parent = match parent_path {
        Some(parent_path) => container_mut(parameters, parent_path)?,
        None => parameters,
    };

    match descriptor {
        Descriptor::Overwrite(overwrite) => {
            let node = existing(parent, key, &path)?;
            overwrite.apply_to(node)?;
            log::trace!("schema: overwrote '{path}'");
        }
        other => {
            let Some(node) = other.into_node(key) else {
                return Ok(());
            };
            let node = node?;
            if parent.node(key).is_some() {
                *existing(parent, key, &path)? = node;
                log::trace!("schema: replaced '{path}'");
            } else {
                parent.push_node(node)?;
            }
        }
    }
    Ok(())
}

fn existing<'a>(parent: &'a mut Hash, key: &str, path: &str) -> Result<&'a mut Node> {
    parent
        .iter_mut()
        .find(|node| node.key() == key)
        .ok_or_else(|| Error::KeyMissing {
            path: path.to_string(),
        })
}

/// Children of the node, choice or list declared at `path`.
fn container_mut<'a>(parameters: &'a mut Hash, path: &str) -> Result<&'a mut Hash> {
    let mut current = parameters;
    for (i, key) in path.split(PATH_SEPARATOR).enumerate() {
        let node = existing(current, key, path).map_err(|_| Error::KeyMissing {
            path: path
                .split(PATH_SEPARATOR)
                .take(i + 1)
                .collect::<Vec<_>>()
                .join("."),
        })?;
        let node_type = node
            .attributes()
            .get(attr::NODE_TYPE)
            .and_then(|v| match v {
                Value::Int32(code) => NodeType::from_i32(*code),
                _ => None,
            });
        let is_slot = node.attributes().get(attr::CLASS_ID).and_then(Value::as_str)
            == Some(CLASS_ID_SLOT);
        if is_slot
            || !matches!(
                node_type,
                Some(NodeType::Node | NodeType::ChoiceOfNodes | NodeType::ListOfNodes)
            )
        {
            return Err(Error::KindMismatch {
                path: path.to_string(),
                detail: format!("'{key}' cannot hold parameters"),
            });
        }
        current = node.value_mut().as_hash_mut().ok_or_else(|| Error::KindMismatch {
            path: path.to_string(),
            detail: format!("'{key}' holds no HASH"),
        })?;
    }
    Ok(current)
}
