use std::fmt;

/// Action the car can take on a single step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Shift one lane to the left (no-op in the leftmost lane)
    MoveLeft,
    /// Keep the current lane
    Stay,
    /// Shift one lane to the right (no-op in the rightmost lane)
    MoveRight,
}

/// Error returned when a discrete action index is out of range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidActionIndex(pub usize);

impl fmt::Display for InvalidActionIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "action index {} out of range (expected 0..{})",
            self.0,
            Action::COUNT
        )
    }
}

impl std::error::Error for InvalidActionIndex {}

impl Action {
    /// Number of discrete actions
    pub const COUNT: usize = 3;

    /// Discrete index of this action (0 = left, 1 = stay, 2 = right)
    pub fn index(&self) -> usize {
        match self {
            Action::MoveLeft => 0,
            Action::Stay => 1,
            Action::MoveRight => 2,
        }
    }

    /// Lane delta applied by this action before clamping at the corridor edges
    pub fn lane_delta(&self) -> i32 {
        match self {
            Action::MoveLeft => -1,
            Action::Stay => 0,
            Action::MoveRight => 1,
        }
    }
}

impl TryFrom<usize> for Action {
    type Error = InvalidActionIndex;

    /// Map a discrete action index to an `Action`.
    ///
    /// An out-of-range index is a programmer error at the agent boundary and
    /// is reported as an error rather than silently clamped.
    fn try_from(idx: usize) -> Result<Self, Self::Error> {
        match idx {
            0 => Ok(Action::MoveLeft),
            1 => Ok(Action::Stay),
            2 => Ok(Action::MoveRight),
            other => Err(InvalidActionIndex(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_roundtrip() {
        for idx in 0..Action::COUNT {
            let action = Action::try_from(idx).unwrap();
            assert_eq!(action.index(), idx);
        }
    }

    #[test]
    fn test_invalid_index_rejected() {
        assert_eq!(Action::try_from(3), Err(InvalidActionIndex(3)));
        assert_eq!(Action::try_from(999), Err(InvalidActionIndex(999)));
    }

    #[test]
    fn test_lane_delta() {
        assert_eq!(Action::MoveLeft.lane_delta(), -1);
        assert_eq!(Action::Stay.lane_delta(), 0);
        assert_eq!(Action::MoveRight.lane_delta(), 1);
    }

    #[test]
    fn test_error_message_names_range() {
        let err = Action::try_from(7).unwrap_err();
        assert!(err.to_string().contains("7"));
        assert!(err.to_string().contains("0..3"));
    }
}
