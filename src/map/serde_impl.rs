use std::fmt;
use std::marker::PhantomData;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::compare::Compare;

use super::ThreadedMap;

/// Serialized as a map with its entries in ascending key order
impl<K, V, C> Serialize for ThreadedMap<K, V, C>
    where K: Serialize,
          V: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

struct ThreadedMapVisitor<K, V, C> {
    marker: PhantomData<fn() -> ThreadedMap<K, V, C>>,
}

impl<'de, K, V, C> Visitor<'de> for ThreadedMapVisitor<K, V, C>
    where K: Deserialize<'de>,
          V: Deserialize<'de>,
          C: Compare<K> + Default,
{
    type Value = ThreadedMap<K, V, C>;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a map")
    }

    fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
        where A: MapAccess<'de>,
    {
        let mut map = ThreadedMap::with_capacity_and_comparator(
            access.size_hint().unwrap_or(0),
            C::default(),
        );
        // Later duplicates overwrite earlier ones, as with `insert`
        while let Some((key, value)) = access.next_entry()? {
            map.insert(key, value);
        }
        Ok(map)
    }
}

/// Entries are inserted in the order they appear. The comparator is created with `Default`.
impl<'de, K, V, C> Deserialize<'de> for ThreadedMap<K, V, C>
    where K: Deserialize<'de>,
          V: Deserialize<'de>,
          C: Compare<K> + Default,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where D: Deserializer<'de>,
    {
        deserializer.deserialize_map(ThreadedMapVisitor {marker: PhantomData})
    }
}
