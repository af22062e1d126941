use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::problem::location::Location;

/// Single origin and terminus of every route. Carries no volume and no status.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Depot {
    location: Location,
}

impl Depot {
    pub fn new(location: Location) -> Self {
        Depot { location }
    }

    pub fn location(&self) -> &Location {
        &self.location
    }
}
