//! Records with a stable identity.

/// A record whose identifier stays fixed while its other fields change.
///
/// Products keep their id across stock and price updates; movements are
/// keyed by id so stores can find and delete them.
pub trait Entity {
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug;

    fn id(&self) -> &Self::Id;
}

/// Index of the record carrying `id`, if any.
pub fn position_of<E: Entity>(records: &[E], id: &E::Id) -> Option<usize> {
    records.iter().position(|r| r.id() == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Row(u8);

    impl Entity for Row {
        type Id = u8;

        fn id(&self) -> &u8 {
            &self.0
        }
    }

    #[test]
    fn position_of_finds_by_identity() {
        let rows = [Row(3), Row(7), Row(9)];
        assert_eq!(position_of(&rows, &7), Some(1));
        assert_eq!(position_of(&rows, &4), None);
    }
}
