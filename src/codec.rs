//! Polymorphic object protocol: class registry and tagged JSON codec.
//!
//! Objects that must preserve their concrete type across the wire carry one
//! reserved field, [`TYPE_TAG`], naming the type's entry in a [`Registry`].
//! The registry holds both directions of the mapping: a forward map from tag
//! to a decode descriptor, and a reverse map from runtime type identity to
//! tag. It is built once at startup (or test setup) and read-only afterwards;
//! share it with `Arc` and build a fresh one when a test needs a different
//! type set.
//!
//! Types opt into the protocol by implementing the [`Tagged`] marker trait
//! and registering with [`Registry::with_type`]. Registration supplies the
//! explicit per-type descriptors; no runtime reflection is involved. The
//! codec keeps two entry points apart: the tagged ones
//! ([`Registry::encode_object`], [`Registry::serialize`]) fail when the
//! concrete type has no registry entry, while plain structural values (raw
//! JSON, untyped maps) travel through [`Registry::encode_value`] and
//! [`Registry::serialize_value`] untagged.
//!
//! # Example
//!
//! ```
//! use route_bind::{Registry, Tagged};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
//! struct Widget {
//!     id: String,
//!     name: String,
//! }
//!
//! impl Tagged for Widget {}
//!
//! let registry = Registry::new().with_type::<Widget>("Widget");
//!
//! let widget = Widget { id: "7".into(), name: "Widget".into() };
//! let wire = registry.serialize(&widget).unwrap();
//! assert!(wire.contains(r#""@type":"Widget""#));
//!
//! let back: Widget = registry.decode(&wire).unwrap();
//! assert_eq!(back, widget);
//! ```
//!
//! Heterogeneous collections of registered types travel as `Box<dyn Tagged>`
//! values through [`Registry::encode_slice`] and [`Registry::decode_slice`];
//! each element is tagged individually, so a list can mix concrete variants
//! without the schema declaring every combination.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::Error;

/// The reserved wire field naming the registered type of an object.
pub const TYPE_TAG: &str = "@type";

/// A value that can cross the wire.
///
/// Blanket-implemented for every `Serialize + Debug + Send + Sync + 'static`
/// type, so any ordinary payload struct qualifies without ceremony. The
/// trait exists to give the codec an object-safe view of a value: its
/// runtime identity for the reverse map, and its plain JSON form.
pub trait Entity: Any + Send + Sync + fmt::Debug {
    /// The value as `&dyn Any`, for reverse-map lookup and downcasting.
    fn as_any(&self) -> &dyn Any;

    /// The boxed value as `Box<dyn Any>`, for owned downcasting.
    fn into_any(self: Box<Self>) -> Box<dyn Any>;

    /// The concrete type name, used in error messages.
    fn type_name(&self) -> &'static str;

    /// The value serialized to plain JSON, without any type tag.
    fn to_plain(&self) -> Result<Value, Error>;
}

impl<T> Entity for T
where
    T: Any + Send + Sync + fmt::Debug + Serialize,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn to_plain(&self) -> Result<Value, Error> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Marker for types that round-trip with a concrete-type tag.
///
/// Implementing `Tagged` declares that values of the type are meant to be
/// revived as that exact type on the other side of the wire. Serializing a
/// `Tagged` value whose type was never registered is an error, not a silent
/// untagged emission.
pub trait Tagged: Entity {}

impl dyn Tagged {
    /// Whether the boxed value is a `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.as_any().is::<T>()
    }

    /// Downcast the boxed value to its concrete type.
    pub fn downcast<T: Any>(self: Box<Self>) -> Option<Box<T>> {
        self.into_any().downcast().ok()
    }
}

/// Decode descriptor: plain fields in, concrete boxed value out.
type DecodeFn = Arc<dyn Fn(Value) -> Result<Box<dyn Tagged>, Error> + Send + Sync>;

/// Bidirectional tag ↔ type mapping driving polymorphic (de)serialization.
///
/// Populate once with [`Registry::with_type`], then treat as read-only.
/// Registering a tag again replaces its descriptors rather than merging.
#[derive(Default)]
pub struct Registry {
    forward: HashMap<String, DecodeFn>,
    reverse: HashMap<TypeId, String>,
}

impl Registry {
    /// Create an empty registry. (De)serialization of tagged objects against
    /// an empty registry fails fast with [`Error::EmptyRegistry`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type under a tag, adding both the forward entry
    /// (tag → decode descriptor) and the reverse entry (type → tag).
    pub fn with_type<T>(mut self, tag: &str) -> Self
    where
        T: Tagged + DeserializeOwned,
    {
        let decode: DecodeFn = Arc::new(|plain: Value| {
            let value: T = serde_json::from_value(plain)?;
            Ok(Box::new(value) as Box<dyn Tagged>)
        });
        self.forward.insert(tag.to_string(), decode);
        self.reverse.insert(TypeId::of::<T>(), tag.to_string());
        self
    }

    /// Whether no types are registered.
    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// The tag a value would be serialized under, if its type is registered.
    pub fn tag_of(&self, value: &dyn Entity) -> Option<&str> {
        self.reverse
            .get(&value.as_any().type_id())
            .map(String::as_str)
    }

    /// Encode a tagged object: its plain serde fields plus the [`TYPE_TAG`]
    /// field from the reverse map.
    ///
    /// Fails with [`Error::Serialization`] when the concrete type has no
    /// reverse-map entry, and with [`Error::EmptyRegistry`] when nothing is
    /// registered at all.
    pub fn encode_object(&self, value: &dyn Tagged) -> Result<Value, Error> {
        if self.reverse.is_empty() {
            return Err(Error::EmptyRegistry);
        }
        let tag = self
            .reverse
            .get(&value.as_any().type_id())
            .ok_or_else(|| {
                Error::serialization(format!(
                    "type {} has no registry entry",
                    value.type_name()
                ))
            })?
            .clone();
        self.tag_plain(value, &tag)
    }

    /// Encode a plain structural value: registered types still pick up
    /// their tag, everything else passes through unchanged.
    ///
    /// This is the entry point for untyped values (raw JSON, maps). Tagged
    /// objects should go through [`Registry::encode_object`], which fails
    /// on an unregistered type instead of silently emitting an untagged
    /// object.
    pub fn encode_value(&self, value: &dyn Entity) -> Result<Value, Error> {
        match self.reverse.get(&value.as_any().type_id()).cloned() {
            Some(tag) => self.tag_plain(value, &tag),
            None => value.to_plain(),
        }
    }

    /// Encode a heterogeneous list of tagged objects, tagging each element.
    pub fn encode_slice(&self, items: &[Box<dyn Tagged>]) -> Result<Value, Error> {
        items
            .iter()
            .map(|item| self.encode_object(item.as_ref()))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array)
    }

    /// Serialize a tagged object to wire text via
    /// [`Registry::encode_object`].
    ///
    /// Fails when the concrete type has no registry entry; a tagged value
    /// never leaves the process untagged.
    pub fn serialize(&self, value: &dyn Tagged) -> Result<String, Error> {
        Ok(serde_json::to_string(&self.encode_object(value)?)?)
    }

    /// Serialize a plain structural value to wire text via
    /// [`Registry::encode_value`].
    pub fn serialize_value(&self, value: &dyn Entity) -> Result<String, Error> {
        Ok(serde_json::to_string(&self.encode_value(value)?)?)
    }

    /// Deserialize wire text into a concrete type.
    ///
    /// The JSON tree is walked bottom-up first: every [`TYPE_TAG`] field
    /// found anywhere must name a registered type, otherwise the whole
    /// payload aborts with [`Error::UnknownTypeTag`]. Tags are then stripped
    /// and the plain tree is handed to serde, so outer values are built from
    /// already-typed inner values.
    pub fn decode<T: DeserializeOwned>(&self, text: &str) -> Result<T, Error> {
        let value: Value = serde_json::from_str(text)?;
        let plain = self.untag(value)?;
        Ok(serde_json::from_value(plain)?)
    }

    /// Deserialize wire text whose top level is a tagged object, reviving it
    /// as its registered concrete type.
    pub fn decode_object(&self, text: &str) -> Result<Box<dyn Tagged>, Error> {
        let value: Value = serde_json::from_str(text)?;
        self.decode_object_value(value)
    }

    /// Revive an already-parsed tagged object.
    pub fn decode_object_value(&self, value: Value) -> Result<Box<dyn Tagged>, Error> {
        if self.forward.is_empty() {
            return Err(Error::EmptyRegistry);
        }
        let Value::Object(mut map) = value else {
            return Err(Error::serialization("expected a tagged JSON object"));
        };
        let tag = match map.remove(TYPE_TAG) {
            Some(Value::String(tag)) => tag,
            _ => return Err(Error::serialization("object carries no type tag")),
        };
        let decode = self
            .forward
            .get(&tag)
            .ok_or_else(|| Error::UnknownTypeTag(tag.clone()))?;
        let plain = self.untag(Value::Object(map))?;
        decode(plain)
    }

    /// Deserialize a JSON array of tagged objects into boxed concrete
    /// values.
    pub fn decode_slice(&self, text: &str) -> Result<Vec<Box<dyn Tagged>>, Error> {
        let value: Value = serde_json::from_str(text)?;
        let Value::Array(items) = value else {
            return Err(Error::serialization("expected a JSON array"));
        };
        items
            .into_iter()
            .map(|item| self.decode_object_value(item))
            .collect()
    }

    /// Project a tagged object down to exactly the listed fields, keeping
    /// the type tag so the subset stays round-trippable.
    pub fn only(&self, value: &dyn Tagged, fields: &[&str]) -> Result<Value, Error> {
        let mut encoded = self.encode_object(value)?;
        if let Value::Object(map) = &mut encoded {
            map.retain(|key, _| key == TYPE_TAG || fields.contains(&key.as_str()));
        }
        Ok(encoded)
    }

    /// Project a tagged object down to all fields except the listed ones,
    /// keeping the type tag.
    pub fn except(&self, value: &dyn Tagged, fields: &[&str]) -> Result<Value, Error> {
        let mut encoded = self.encode_object(value)?;
        if let Value::Object(map) = &mut encoded {
            map.retain(|key, _| key == TYPE_TAG || !fields.contains(&key.as_str()));
        }
        Ok(encoded)
    }

    /// Insert the tag into a value's plain JSON form. Tagged values must
    /// serialize to JSON objects.
    fn tag_plain(&self, value: &dyn Entity, tag: &str) -> Result<Value, Error> {
        let mut plain = value.to_plain()?;
        match &mut plain {
            Value::Object(map) => {
                map.insert(TYPE_TAG.to_string(), Value::String(tag.to_string()));
                Ok(plain)
            }
            _ => Err(Error::serialization(format!(
                "tagged type {} must serialize to a JSON object",
                value.type_name()
            ))),
        }
    }

    /// Validate and strip type tags, bottom-up. An unknown tag anywhere in
    /// the tree aborts the whole payload.
    fn untag(&self, value: Value) -> Result<Value, Error> {
        match value {
            Value::Object(map) => {
                let mut out = serde_json::Map::with_capacity(map.len());
                for (key, inner) in map {
                    if key == TYPE_TAG {
                        let tag = inner.as_str().unwrap_or_default();
                        if !self.forward.contains_key(tag) {
                            return Err(Error::UnknownTypeTag(tag.to_string()));
                        }
                    } else {
                        out.insert(key, self.untag(inner)?);
                    }
                }
                Ok(Value::Object(out))
            }
            Value::Array(items) => Ok(Value::Array(
                items
                    .into_iter()
                    .map(|item| self.untag(item))
                    .collect::<Result<Vec<_>, _>>()?,
            )),
            other => Ok(other),
        }
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tags: Vec<&str> = self.forward.keys().map(String::as_str).collect();
        tags.sort_unstable();
        f.debug_struct("Registry").field("tags", &tags).finish()
    }
}
