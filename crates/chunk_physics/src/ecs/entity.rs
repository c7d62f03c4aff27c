//! Entity implementation

slotmap::new_key_type! {
    /// Entity identifier
    ///
    /// Generational: a despawned entity's slot can be reused, but the old
    /// handle never aliases the new occupant. Entities are ordered, which the
    /// collision detector relies on for a deterministic candidate order.
    pub struct Entity;
}
