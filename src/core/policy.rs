use crate::core::model::{CollectionId, MAX_POSITION, PIN_LIMIT, PinId, PinnedCollection, PositionUpdate};
use crate::error::{Error, Result};
use std::collections::{HashMap, HashSet};

/// Whether another pin fits under [`PIN_LIMIT`].
pub fn can_pin(pins: &[PinnedCollection]) -> bool {
    pins.len() < PIN_LIMIT
}

/// Append position: one past the current maximum, starting at 1.
///
/// Saturates instead of wrapping; a result above [`MAX_POSITION`] is
/// rejected by [`validate_position`] when it is written.
pub fn next_position(pins: &[PinnedCollection]) -> u32 {
    pins.iter()
        .map(|p| p.pin.position)
        .max()
        .unwrap_or(0)
        .saturating_add(1)
}

pub fn is_pinned(pins: &[PinnedCollection], collection: &CollectionId) -> bool {
    pins.iter().any(|p| p.collection_id() == collection)
}

pub fn validate_position(position: u32) -> Result<()> {
    if position == 0 {
        return Err(Error::validation("Pin positions start at 1"));
    }
    if position > MAX_POSITION {
        return Err(Error::validation(format!(
            "Pin position {position} exceeds {MAX_POSITION}"
        )));
    }
    Ok(())
}

/// Check that applying `updates` to the `current` (pin, position) pairs
/// leaves every position in range and unique.
pub fn validate_positions<'a>(
    current: impl IntoIterator<Item = (&'a PinId, u32)>,
    updates: &[PositionUpdate],
) -> Result<()> {
    for update in updates {
        validate_position(update.position)?;
    }
    let lookup: HashMap<&PinId, u32> = updates.iter().map(|u| (&u.id, u.position)).collect();
    let mut taken = HashSet::new();
    for (id, position) in current {
        let position = lookup.get(id).copied().unwrap_or(position);
        if !taken.insert(position) {
            return Err(Error::validation(format!(
                "More than one pin would sit at position {position}"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing::pinned;
    use assert_matches::assert_matches;

    fn rows(pins: &[PinnedCollection]) -> impl Iterator<Item = (&PinId, u32)> {
        pins.iter().map(|p| (&p.pin.id, p.pin.position))
    }

    fn update(id: &str, position: u32) -> PositionUpdate {
        PositionUpdate {
            id: PinId::from(id),
            position,
        }
    }

    #[test]
    fn next_position_appends_after_max() {
        assert_eq!(next_position(&[]), 1);
        let pins = vec![pinned("a", 4), pinned("b", 2)];
        assert_eq!(next_position(&pins), 5);
    }

    #[test]
    fn next_position_saturates_at_u32_max() {
        let pins = vec![pinned("a", u32::MAX)];
        assert_eq!(next_position(&pins), u32::MAX);
        assert_matches!(
            validate_position(next_position(&pins)),
            Err(Error::Validation { .. })
        );
    }

    #[test]
    fn capacity_is_six() {
        let mut pins: Vec<_> = (1..=5).map(|i| pinned(&format!("c{i}"), i)).collect();
        assert!(can_pin(&pins));
        pins.push(pinned("c6", 6));
        assert!(!can_pin(&pins));
    }

    #[test]
    fn finds_pinned_collection() {
        let pins = vec![pinned("a", 1)];
        assert!(is_pinned(&pins, &CollectionId::from("a")));
        assert!(!is_pinned(&pins, &CollectionId::from("b")));
    }

    #[test]
    fn position_bounds() {
        assert!(validate_position(1).is_ok());
        assert!(validate_position(MAX_POSITION).is_ok());
        assert_matches!(validate_position(0), Err(Error::Validation { .. }));
        assert_matches!(validate_position(MAX_POSITION + 1), Err(Error::Validation { .. }));
    }

    #[test]
    fn merged_positions_must_stay_unique() {
        let pins = vec![pinned("a", 1), pinned("b", 2)];
        assert_matches!(
            validate_positions(rows(&pins), &[update("pin-a", 2)]),
            Err(Error::Validation { .. })
        );
        assert!(validate_positions(rows(&pins), &[update("pin-a", 2), update("pin-b", 1)]).is_ok());
        assert!(validate_positions(rows(&pins), &[update("pin-a", 5)]).is_ok());
        assert!(validate_positions(rows(&pins), &[update("pin-zz", 2)]).is_ok());
    }
}
