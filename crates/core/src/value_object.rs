//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are immutable and compared by their attribute values; two
/// instances holding the same values are interchangeable. `Volume` is the
/// canonical example in this workspace: a quantity of product has no
/// identity of its own, only a magnitude.
///
/// Implementors should be cheap to copy and never mutated in place; to
/// "change" a value object, construct a new one.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
