//! Serde adapters for the parser's single-key `{"Tag": {...}}` objects.
//!
//! Closed families (statements, datums, leaves) are plain externally tagged
//! enums. Helper nodes that only ever carry one tag (`PLpgSQL_exception`,
//! `PLpgSQL_if_elsif`, ...) are plain structs that implement [`NodeTag`] and
//! are (de)serialized through these modules with `#[serde(with = "...")]`.

use std::fmt;
use std::marker::PhantomData;

use serde::de::{self, Deserialize, Deserializer, MapAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, Serializer};

/// The tag a helper node is wrapped in.
pub trait NodeTag {
    const TAG: &'static str;
}

struct Tagged<T>(T);

struct TaggedRef<'a, T>(&'a T);

impl<T: Serialize + NodeTag> Serialize for TaggedRef<'_, T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(T::TAG, self.0)?;
        map.end()
    }
}

impl<'de, T> Deserialize<'de> for Tagged<T>
where
    T: Deserialize<'de> + NodeTag,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TaggedVisitor<T>(PhantomData<T>);

        impl<'de, T> Visitor<'de> for TaggedVisitor<T>
        where
            T: Deserialize<'de> + NodeTag,
        {
            type Value = Tagged<T>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "an object tagged `{}`", T::TAG)
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let key: String = map
                    .next_key()?
                    .ok_or_else(|| de::Error::invalid_length(0, &self))?;
                if key != T::TAG {
                    return Err(de::Error::custom(format_args!(
                        "unknown variant `{}`, expected `{}`",
                        key,
                        T::TAG
                    )));
                }
                let value = map.next_value()?;
                if map.next_key::<String>()?.is_some() {
                    return Err(de::Error::invalid_length(2, &self));
                }
                Ok(Tagged(value))
            }
        }

        deserializer.deserialize_map(TaggedVisitor(PhantomData))
    }
}

pub mod one {
    use super::*;

    pub fn serialize<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Serialize + NodeTag,
        S: Serializer,
    {
        TaggedRef(value).serialize(serializer)
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
    where
        T: Deserialize<'de> + NodeTag,
        D: Deserializer<'de>,
    {
        Tagged::<T>::deserialize(deserializer).map(|tagged| tagged.0)
    }
}

pub mod opt {
    use super::*;

    pub fn serialize<T, S>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Serialize + NodeTag,
        S: Serializer,
    {
        value.as_ref().map(TaggedRef).serialize(serializer)
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        T: Deserialize<'de> + NodeTag,
        D: Deserializer<'de>,
    {
        Option::<Tagged<T>>::deserialize(deserializer).map(|tagged| tagged.map(|t| t.0))
    }
}

pub mod list {
    use super::*;

    #[allow(clippy::ptr_arg)]
    pub fn serialize<T, S>(values: &Vec<T>, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Serialize + NodeTag,
        S: Serializer,
    {
        serializer.collect_seq(values.iter().map(TaggedRef))
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Vec<T>, D::Error>
    where
        T: Deserialize<'de> + NodeTag,
        D: Deserializer<'de>,
    {
        Option::<Vec<Tagged<T>>>::deserialize(deserializer)
            .map(|values| values.unwrap_or_default().into_iter().map(|t| t.0).collect())
    }
}
