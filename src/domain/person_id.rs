use serde::Serialize;
use std::fmt;

/// Surrogate key of a row in `persons`, assigned by the database on insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PersonId(i32);

impl PersonId {
    pub fn from_str(s: &str) -> Result<Self, std::num::ParseIntError> {
        s.trim().parse::<i32>().map(Self)
    }

    pub fn from_i32(id: i32) -> Self {
        Self(id)
    }

    pub fn to_i32(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
