//! Absent-tolerant access into loosely shaped JSON documents.
//!
//! Every step of a lookup yields another [`Field`], so a chain such as
//! `doc.get("current").get("air_quality").get("pm10")` never fails: a missing
//! key, a `null`, or a value of the wrong shape at any level simply produces an
//! absent leaf.

use serde_json::Value;

#[derive(Debug, Clone, Copy, Default)]
pub struct Field<'a>(Option<&'a Value>);

impl<'a> Field<'a> {
    pub fn new(value: &'a Value) -> Self {
        Self(Some(value))
    }

    pub fn absent() -> Self {
        Self(None)
    }

    /// Object member lookup. Anything that isn't an object yields absent.
    pub fn get(self, key: &str) -> Self {
        Self(self.0.and_then(|v| v.as_object()).and_then(|obj| obj.get(key)))
    }

    /// First element of an array, or absent.
    pub fn first(self) -> Self {
        Self(self.0.and_then(|v| v.as_array()).and_then(|items| items.first()))
    }

    /// Array elements in order. A non-array yields no elements.
    pub fn items(self) -> impl Iterator<Item = Field<'a>> {
        self.0
            .and_then(|v| v.as_array())
            .into_iter()
            .flat_map(|items| items.iter().map(Field::new))
    }

    /// The underlying value; `null` counts as absent.
    pub fn value(self) -> Option<&'a Value> {
        self.0.filter(|v| !v.is_null())
    }

    pub fn text(self) -> Option<&'a str> {
        self.0.and_then(|v| v.as_str())
    }
}
