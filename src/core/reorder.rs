use crate::core::model::{PinnedCollection, PositionUpdate};
use crate::error::{Error, Result};

/// Turn a drag from index `from` to index `to` into a full renumbering.
///
/// Every pin gets `position = index + 1` in the resulting order, so the
/// output is always dense and starts at 1.
pub fn move_to(items: &[PinnedCollection], from: usize, to: usize) -> Result<Vec<PositionUpdate>> {
    let len = items.len();
    if from >= len || to >= len {
        return Err(Error::InvalidMove { from, to, len });
    }

    let mut order: Vec<&PinnedCollection> = items.iter().collect();
    let dragged = order.remove(from);
    order.insert(to, dragged);

    Ok(order
        .into_iter()
        .zip(1..)
        .map(|(item, position)| PositionUpdate {
            id: item.pin.id.clone(),
            position,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing::pinned;
    use assert_matches::assert_matches;

    fn positions(items: &[PinnedCollection], updates: &[PositionUpdate]) -> Vec<(String, u32)> {
        updates
            .iter()
            .map(|u| {
                let item = items.iter().find(|i| i.pin.id == u.id).unwrap();
                (item.collection_id().to_string(), u.position)
            })
            .collect()
    }

    #[test]
    fn moving_last_to_front_renumbers_everything() {
        let items = vec![pinned("a", 1), pinned("b", 2), pinned("c", 3)];
        let updates = move_to(&items, 2, 0).unwrap();
        assert_eq!(
            positions(&items, &updates),
            vec![("c".to_string(), 1), ("a".to_string(), 2), ("b".to_string(), 3)]
        );
    }

    #[test]
    fn closes_gaps_even_without_movement() {
        let items = vec![pinned("a", 2), pinned("b", 5)];
        let updates = move_to(&items, 0, 0).unwrap();
        assert_eq!(
            positions(&items, &updates),
            vec![("a".to_string(), 1), ("b".to_string(), 2)]
        );
    }

    #[test]
    fn rejects_out_of_range() {
        let items = vec![pinned("a", 1)];
        assert_matches!(
            move_to(&items, 0, 1),
            Err(Error::InvalidMove { from: 0, to: 1, len: 1 })
        );
        assert!(move_to(&[], 0, 0).is_err());
    }
}
