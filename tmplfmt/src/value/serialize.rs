use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{ser, Serialize, Serializer};

use crate::value::{Value, ValueMap, ValueRepr};

// We use in-band signalling to roundtrip some internal values.  This is
// not ideal but unfortunately there is no better system in serde today.
const VALUE_HANDLE_MARKER: &str = "\x01__tmplfmt_ValueHandle";

thread_local! {
    static INTERNAL_SERIALIZATION: Cell<bool> = const { Cell::new(false) };

    // This should be an AtomicU64 but sadly 32bit targets do not necessarily have
    // AtomicU64 available.
    static LAST_VALUE_HANDLE: Cell<u32> = const { Cell::new(0) };
    static VALUE_HANDLES: RefCell<BTreeMap<u32, Value>> = RefCell::new(BTreeMap::new());
}

/// Resets the internal serialization flag when dropped.
struct SerializationGuard(bool);

impl Drop for SerializationGuard {
    fn drop(&mut self) {
        if !self.0 {
            INTERNAL_SERIALIZATION.with(|flag| flag.set(false));
        }
    }
}

fn mark_internal_serialization() -> SerializationGuard {
    SerializationGuard(INTERNAL_SERIALIZATION.with(|flag| flag.replace(true)))
}

/// Caps size hints coming from foreign `Serialize` implementations.
fn untrusted_size_hint(value: usize) -> usize {
    value.min(1024)
}

fn transform<T: Serialize + ?Sized>(value: &T) -> Value {
    match value.serialize(ValueSerializer) {
        Ok(rv) => rv,
        Err(invalid) => Value(ValueRepr::Invalid(invalid.0)),
    }
}

/// Function that returns true when serialization for [`Value`] is taking place.
///
/// tmplfmt internally creates [`Value`] objects from all contexts passed to
/// the engine by going through the regular serde serialization trait.  This
/// function returns `true` while that happens so that a [`Serialize`]
/// implementation can produce a different shape for templates than it
/// would for disk.
pub fn serializing_for_value() -> bool {
    INTERNAL_SERIALIZATION.with(|flag| flag.get())
}

impl Value {
    /// Creates a value from something that can be serialized.
    ///
    /// This is what [`context!`](crate::context) and the render functions
    /// use for their contexts.  Values nested anywhere inside the serialized
    /// data, callables included, are carried over unchanged.
    ///
    /// ```
    /// # use tmplfmt::value::Value;
    /// let val = Value::from_serialize(&vec![1, 2, 3]);
    /// assert_eq!(val.to_string(), "1,2,3");
    /// ```
    ///
    /// This method does not fail.  If the [`Serialize`] implementation
    /// reports an error the result is an invalid value which fails the
    /// render it is used in.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Value {
        let _serialization_guard = mark_internal_serialization();
        transform(value)
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // enable round tripping of values
        if serializing_for_value() {
            let handle = LAST_VALUE_HANDLE.with(|x| {
                // we are okay with overflowing the handle here because these values only
                // live for a very short period of time.
                let rv = x.get().wrapping_add(1);
                x.set(rv);
                rv
            });
            VALUE_HANDLES.with(|handles| handles.borrow_mut().insert(handle, self.clone()));
            return serializer.serialize_unit_variant(
                VALUE_HANDLE_MARKER,
                handle,
                VALUE_HANDLE_MARKER,
            );
        }

        match self.0 {
            ValueRepr::Bool(b) => serializer.serialize_bool(b),
            ValueRepr::U64(u) => serializer.serialize_u64(u),
            ValueRepr::I64(i) => serializer.serialize_i64(i),
            ValueRepr::F64(f) => serializer.serialize_f64(f),
            ValueRepr::None | ValueRepr::Undefined | ValueRepr::Invalid(_) => {
                serializer.serialize_unit()
            }
            ValueRepr::String(ref s) => serializer.serialize_str(s),
            ValueRepr::Seq(ref elements) => elements.serialize(serializer),
            ValueRepr::Map(ref entries) => {
                use serde::ser::SerializeMap;
                let mut map = ok!(serializer.serialize_map(Some(entries.len())));
                for (k, v) in entries.iter() {
                    ok!(map.serialize_entry(k.as_ref(), v));
                }
                map.end()
            }
            ValueRepr::Callable(_) => serializer.serialize_str(&self.to_string()),
        }
    }
}

#[derive(Debug)]
pub struct InvalidValue(Arc<str>);

impl std::error::Error for InvalidValue {}

impl fmt::Display for InvalidValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl ser::Error for InvalidValue {
    fn custom<T>(msg: T) -> Self
    where
        T: fmt::Display,
    {
        InvalidValue(Arc::from(msg.to_string()))
    }
}

fn map_with_capacity(len: usize) -> ValueMap {
    ValueMap::with_capacity(untrusted_size_hint(len))
}

fn seq(elements: Vec<Value>) -> Value {
    Value(ValueRepr::Seq(Arc::new(elements)))
}

fn map(entries: ValueMap) -> Value {
    Value(ValueRepr::Map(Arc::new(entries)))
}

/// Map keys are stored as strings.  Other scalar keys use their string form.
fn key_from_value(key: Value) -> Option<Arc<str>> {
    match key.0 {
        ValueRepr::String(s) => Some(s),
        ValueRepr::Bool(_) | ValueRepr::U64(_) | ValueRepr::I64(_) | ValueRepr::F64(_) => {
            Some(Arc::from(key.to_string()))
        }
        _ => None,
    }
}

pub struct ValueSerializer;

impl Serializer for ValueSerializer {
    type Ok = Value;
    type Error = InvalidValue;

    type SerializeSeq = SerializeSeq;
    type SerializeTuple = SerializeSeq;
    type SerializeTupleStruct = SerializeSeq;
    type SerializeTupleVariant = SerializeTupleVariant;
    type SerializeMap = SerializeMap;
    type SerializeStruct = SerializeStruct;
    type SerializeStructVariant = SerializeStructVariant;

    fn serialize_bool(self, v: bool) -> Result<Value, InvalidValue> {
        Ok(Value::from(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Value, InvalidValue> {
        Ok(Value::from(v))
    }

    fn serialize_i16(self, v: i16) -> Result<Value, InvalidValue> {
        Ok(Value::from(v))
    }

    fn serialize_i32(self, v: i32) -> Result<Value, InvalidValue> {
        Ok(Value::from(v))
    }

    fn serialize_i64(self, v: i64) -> Result<Value, InvalidValue> {
        Ok(Value::from(v))
    }

    fn serialize_i128(self, v: i128) -> Result<Value, InvalidValue> {
        Ok(match i64::try_from(v) {
            Ok(v) => Value::from(v),
            Err(_) => Value::from(v as f64),
        })
    }

    fn serialize_u8(self, v: u8) -> Result<Value, InvalidValue> {
        Ok(Value::from(v))
    }

    fn serialize_u16(self, v: u16) -> Result<Value, InvalidValue> {
        Ok(Value::from(v))
    }

    fn serialize_u32(self, v: u32) -> Result<Value, InvalidValue> {
        Ok(Value::from(v))
    }

    fn serialize_u64(self, v: u64) -> Result<Value, InvalidValue> {
        Ok(Value::from(v))
    }

    fn serialize_u128(self, v: u128) -> Result<Value, InvalidValue> {
        Ok(match u64::try_from(v) {
            Ok(v) => Value::from(v),
            Err(_) => Value::from(v as f64),
        })
    }

    fn serialize_f32(self, v: f32) -> Result<Value, InvalidValue> {
        Ok(Value::from(v))
    }

    fn serialize_f64(self, v: f64) -> Result<Value, InvalidValue> {
        Ok(Value::from(v))
    }

    fn serialize_char(self, v: char) -> Result<Value, InvalidValue> {
        Ok(Value::from(v))
    }

    fn serialize_str(self, value: &str) -> Result<Value, InvalidValue> {
        Ok(Value::from(value))
    }

    fn serialize_bytes(self, value: &[u8]) -> Result<Value, InvalidValue> {
        Ok(value.iter().copied().collect())
    }

    fn serialize_none(self) -> Result<Value, InvalidValue> {
        Ok(Value::from(()))
    }

    fn serialize_some<T: ?Sized>(self, value: &T) -> Result<Value, InvalidValue>
    where
        T: Serialize,
    {
        Ok(transform(value))
    }

    fn serialize_unit(self) -> Result<Value, InvalidValue> {
        Ok(Value::from(()))
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Value, InvalidValue> {
        Ok(Value::from(()))
    }

    fn serialize_unit_variant(
        self,
        name: &'static str,
        variant_index: u32,
        variant: &'static str,
    ) -> Result<Value, InvalidValue> {
        if name == VALUE_HANDLE_MARKER && variant == VALUE_HANDLE_MARKER {
            VALUE_HANDLES
                .with(|handles| handles.borrow_mut().remove(&variant_index))
                .ok_or_else(|| InvalidValue(Arc::from("value handle not in registry")))
        } else {
            Ok(Value::from(variant))
        }
    }

    fn serialize_newtype_struct<T: ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<Value, InvalidValue>
    where
        T: Serialize,
    {
        Ok(transform(value))
    }

    fn serialize_newtype_variant<T: ?Sized>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Value, InvalidValue>
    where
        T: Serialize,
    {
        let mut entries = map_with_capacity(1);
        entries.insert(Arc::from(variant), transform(value));
        Ok(map(entries))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<Self::SerializeSeq, InvalidValue> {
        Ok(SerializeSeq {
            elements: Vec::with_capacity(untrusted_size_hint(len.unwrap_or(0))),
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<Self::SerializeTuple, InvalidValue> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleStruct, InvalidValue> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleVariant, InvalidValue> {
        Ok(SerializeTupleVariant {
            name: variant,
            fields: Vec::with_capacity(untrusted_size_hint(len)),
        })
    }

    fn serialize_map(self, len: Option<usize>) -> Result<Self::SerializeMap, InvalidValue> {
        Ok(SerializeMap {
            entries: map_with_capacity(len.unwrap_or(0)),
            key: None,
        })
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeStruct, InvalidValue> {
        Ok(SerializeStruct {
            fields: map_with_capacity(len),
        })
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeStructVariant, InvalidValue> {
        Ok(SerializeStructVariant {
            variant,
            fields: map_with_capacity(len),
        })
    }
}

pub struct SerializeSeq {
    elements: Vec<Value>,
}

impl ser::SerializeSeq for SerializeSeq {
    type Ok = Value;
    type Error = InvalidValue;

    fn serialize_element<T: ?Sized>(&mut self, value: &T) -> Result<(), InvalidValue>
    where
        T: Serialize,
    {
        self.elements.push(transform(value));
        Ok(())
    }

    fn end(self) -> Result<Value, InvalidValue> {
        Ok(seq(self.elements))
    }
}

impl ser::SerializeTuple for SerializeSeq {
    type Ok = Value;
    type Error = InvalidValue;

    fn serialize_element<T: ?Sized>(&mut self, value: &T) -> Result<(), InvalidValue>
    where
        T: Serialize,
    {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Value, InvalidValue> {
        ser::SerializeSeq::end(self)
    }
}

impl ser::SerializeTupleStruct for SerializeSeq {
    type Ok = Value;
    type Error = InvalidValue;

    fn serialize_field<T: ?Sized>(&mut self, value: &T) -> Result<(), InvalidValue>
    where
        T: Serialize,
    {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Value, InvalidValue> {
        ser::SerializeSeq::end(self)
    }
}

pub struct SerializeTupleVariant {
    name: &'static str,
    fields: Vec<Value>,
}

impl ser::SerializeTupleVariant for SerializeTupleVariant {
    type Ok = Value;
    type Error = InvalidValue;

    fn serialize_field<T: ?Sized>(&mut self, value: &T) -> Result<(), InvalidValue>
    where
        T: Serialize,
    {
        self.fields.push(transform(value));
        Ok(())
    }

    fn end(self) -> Result<Value, InvalidValue> {
        let mut entries = map_with_capacity(1);
        entries.insert(Arc::from(self.name), seq(self.fields));
        Ok(map(entries))
    }
}

pub struct SerializeMap {
    entries: ValueMap,
    key: Option<Arc<str>>,
}

impl ser::SerializeMap for SerializeMap {
    type Ok = Value;
    type Error = InvalidValue;

    fn serialize_key<T: ?Sized>(&mut self, key: &T) -> Result<(), InvalidValue>
    where
        T: Serialize,
    {
        self.key = key.serialize(ValueSerializer).ok().and_then(key_from_value);
        Ok(())
    }

    fn serialize_value<T: ?Sized>(&mut self, value: &T) -> Result<(), InvalidValue>
    where
        T: Serialize,
    {
        if let Some(key) = self.key.take() {
            self.entries.insert(key, transform(value));
        }
        Ok(())
    }

    fn end(self) -> Result<Value, InvalidValue> {
        Ok(map(self.entries))
    }
}

pub struct SerializeStruct {
    fields: ValueMap,
}

impl ser::SerializeStruct for SerializeStruct {
    type Ok = Value;
    type Error = InvalidValue;

    fn serialize_field<T: ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), InvalidValue>
    where
        T: Serialize,
    {
        self.fields.insert(Arc::from(key), transform(value));
        Ok(())
    }

    fn end(self) -> Result<Value, InvalidValue> {
        Ok(map(self.fields))
    }
}

pub struct SerializeStructVariant {
    variant: &'static str,
    fields: ValueMap,
}

impl ser::SerializeStructVariant for SerializeStructVariant {
    type Ok = Value;
    type Error = InvalidValue;

    fn serialize_field<T: ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), InvalidValue>
    where
        T: Serialize,
    {
        self.fields.insert(Arc::from(key), transform(value));
        Ok(())
    }

    fn end(self) -> Result<Value, InvalidValue> {
        let mut entries = map_with_capacity(1);
        entries.insert(Arc::from(self.variant), map(self.fields));
        Ok(map(entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct User {
        name: &'static str,
        tags: Vec<&'static str>,
    }

    #[test]
    fn test_struct_to_map() {
        let value = Value::from_serialize(&User {
            name: "Amy",
            tags: vec!["a", "b"],
        });
        assert_eq!(value.get_attr("name").as_str(), Some("Amy"));
        assert_eq!(value.get_attr("tags").len(), Some(2));
    }

    #[test]
    fn test_callable_roundtrip() {
        let func = Value::from_function(|| 42);
        let mut map = BTreeMap::new();
        map.insert("f", func.clone());
        let value = Value::from_serialize(&map);
        assert_eq!(value.get_attr("f"), func);
        assert!(!serializing_for_value());
    }

    #[test]
    fn test_numeric_keys() {
        let mut map = BTreeMap::new();
        map.insert(1, "one");
        let value = Value::from_serialize(&map);
        assert_eq!(value.get_attr("1").as_str(), Some("one"));
    }
}
