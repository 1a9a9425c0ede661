use std::collections::HashSet;

use thiserror::Error;

/// A list of siblings that share one position sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderScope {
    TripCities(i64),
    TripIdeas(i64),
    DayActivities(i64),
}

impl OrderScope {
    pub fn table(&self) -> &'static str {
        match self {
            OrderScope::TripCities(_) => "cities",
            OrderScope::TripIdeas(_) => "ideas",
            OrderScope::DayActivities(_) => "activities",
        }
    }

    pub fn parent_column(&self) -> &'static str {
        match self {
            OrderScope::TripCities(_) | OrderScope::TripIdeas(_) => "trip_id",
            OrderScope::DayActivities(_) => "day_id",
        }
    }

    pub fn parent_id(&self) -> i64 {
        match self {
            OrderScope::TripCities(id) | OrderScope::TripIdeas(id) => *id,
            OrderScope::DayActivities(id) => *id,
        }
    }

    pub fn noun(&self) -> &'static str {
        match self {
            OrderScope::TripCities(_) => "city",
            OrderScope::TripIdeas(_) => "idea",
            OrderScope::DayActivities(_) => "activity",
        }
    }

    fn parent_noun(&self) -> &'static str {
        match self {
            OrderScope::TripCities(_) | OrderScope::TripIdeas(_) => "trip",
            OrderScope::DayActivities(_) => "day",
        }
    }

    /// Error message for a malformed `order` body.
    pub fn order_shape_error(&self) -> String {
        format!("order must be an array of {} IDs", self.noun())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrderError {
    #[error("{noun} {id} does not belong to this {parent}")]
    Foreign {
        id: i64,
        noun: &'static str,
        parent: &'static str,
    },

    #[error("{noun} {id} appears more than once")]
    Duplicate { id: i64, noun: &'static str },
}

/// Computes `(id, position)` pairs for a reorder.
///
/// `current` is the scope in its present order. Requested ids come first,
/// then any members the request left out, keeping their relative order.
pub fn plan_positions(
    scope: OrderScope,
    current: &[i64],
    requested: &[i64],
) -> Result<Vec<(i64, i64)>, OrderError> {
    let members: HashSet<i64> = current.iter().copied().collect();
    let mut seen = HashSet::with_capacity(requested.len());

    for &id in requested {
        if !members.contains(&id) {
            return Err(OrderError::Foreign {
                id,
                noun: scope.noun(),
                parent: scope.parent_noun(),
            });
        }
        if !seen.insert(id) {
            return Err(OrderError::Duplicate {
                id,
                noun: scope.noun(),
            });
        }
    }

    let trailing = current.iter().copied().filter(|id| !seen.contains(id));
    Ok(requested
        .iter()
        .copied()
        .chain(trailing)
        .zip(1..)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: OrderScope = OrderScope::DayActivities(5);

    #[test]
    fn full_permutation_numbers_in_submitted_order() {
        let plan = plan_positions(DAY, &[1, 2, 3], &[3, 1, 2]).unwrap();
        assert_eq!(plan, vec![(3, 1), (1, 2), (2, 3)]);
    }

    #[test]
    fn omitted_members_trail_in_current_order() {
        let plan = plan_positions(DAY, &[1, 2, 3, 4], &[4, 2]).unwrap();
        assert_eq!(plan, vec![(4, 1), (2, 2), (1, 3), (3, 4)]);
    }

    #[test]
    fn empty_request_keeps_current_order_renumbered() {
        let plan = plan_positions(OrderScope::TripIdeas(1), &[9, 4], &[]).unwrap();
        assert_eq!(plan, vec![(9, 1), (4, 2)]);
    }

    #[test]
    fn foreign_id_is_rejected() {
        let err = plan_positions(DAY, &[1, 2], &[2, 77]).unwrap_err();
        assert_eq!(err.to_string(), "activity 77 does not belong to this day");
    }

    #[test]
    fn duplicate_id_is_rejected() {
        let err = plan_positions(OrderScope::TripCities(1), &[1, 2], &[1, 1]).unwrap_err();
        assert_eq!(
            err,
            OrderError::Duplicate {
                id: 1,
                noun: "city"
            }
        );
    }

    #[test]
    fn shape_error_names_the_kind() {
        assert_eq!(
            OrderScope::TripIdeas(1).order_shape_error(),
            "order must be an array of idea IDs"
        );
    }
}
