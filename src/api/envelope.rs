//! Single-key response envelopes (`{"domain": {...}}`, `[{"record": {...}}]`).
//!
//! [`unwrap_envelope`] is the generic normalization `talk` applies to
//! untyped payloads. [`Enveloped`] is the explicit decoder for callers that
//! know an endpoint's shape.
use std::fmt;
use std::marker::PhantomData;

use serde::de::{self, Deserialize, Deserializer, MapAccess, Visitor};
use serde_json::Value;

/// A single-key object whose value is itself an object.
fn is_envelope(value: &Value) -> bool {
    value
        .as_object()
        .is_some_and(|map| map.len() == 1 && map.values().all(Value::is_object))
}

fn unwrap_object(value: Value) -> Value {
    if !is_envelope(&value) {
        return value;
    }
    match value {
        Value::Object(map) => map.into_iter().next().map(|(_, inner)| inner).unwrap_or_default(),
        other => other,
    }
}

/// Unwrap one level of single-key envelope from an object. An array is
/// unwrapped only when every element is an envelope, so a list never comes
/// back half unwrapped.
pub fn unwrap_envelope(value: Value) -> Value {
    match value {
        Value::Array(items) if items.iter().all(is_envelope) => {
            Value::Array(items.into_iter().map(unwrap_object).collect())
        }
        other => unwrap_object(other),
    }
}

/// Decodes `{"<any key>": T}` into `T`. Objects with zero or several keys are
/// rejected.
#[derive(Debug, Clone, PartialEq)]
pub struct Enveloped<T>(pub T);

impl<T> Enveloped<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Enveloped<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EnvelopeVisitor<T>(PhantomData<T>);

        impl<'de, T: Deserialize<'de>> Visitor<'de> for EnvelopeVisitor<T> {
            type Value = Enveloped<T>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object with exactly one key")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let (_, inner): (de::IgnoredAny, T) = map
                    .next_entry()?
                    .ok_or_else(|| de::Error::invalid_length(0, &self))?;
                if map.next_key::<de::IgnoredAny>()?.is_some() {
                    return Err(de::Error::invalid_length(2, &self));
                }
                Ok(Enveloped(inner))
            }
        }

        deserializer.deserialize_map(EnvelopeVisitor(PhantomData))
    }
}
