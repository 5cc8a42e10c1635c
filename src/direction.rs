/// Motor rotation direction, selecting which H-bridge line is driven.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Direction {
    /// Drive the forward line (M1); slide moves towards the far end stop.
    Forward = 0,
    /// Drive the reverse line (M2); slide moves back.
    Reverse = 1,
}

impl Direction {
    /// Returns the opposite direction.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Forward => Self::Reverse,
            Self::Reverse => Self::Forward,
        }
    }

    /// Maps the numeric direction used in the lab sheet (0 or 1).
    #[must_use]
    pub const fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Self::Forward),
            1 => Some(Self::Reverse),
            _ => None,
        }
    }
}
