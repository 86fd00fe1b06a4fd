//! Entity trait: identity that persists across state changes.

/// Minimal interface for domain entities.
///
/// An entity is distinguished by its identifier, not its attribute values;
/// two stock records for the same product are the same entity even when
/// their levels differ.
pub trait Entity {
    /// Strongly-typed identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    fn id(&self) -> &Self::Id;
}
