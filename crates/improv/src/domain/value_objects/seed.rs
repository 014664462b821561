//! Seed - Sampling seed for reproducible generations

use serde::{Deserialize, Serialize};

/// Sampling seed. `-1` asks the service to pick one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Seed(pub i64);

impl Seed {
    pub const RANDOM: Seed = Seed(-1);

    pub fn is_random(&self) -> bool {
        *self == Self::RANDOM
    }

    /// Non-negative, or the `-1` sentinel
    pub fn is_valid(&self) -> bool {
        self.0 >= 0 || self.is_random()
    }

    /// Registry key for this seed
    pub fn key(&self) -> String {
        self.0.to_string()
    }
}

impl Default for Seed {
    fn default() -> Self {
        Self::RANDOM
    }
}

impl From<i64> for Seed {
    fn from(value: i64) -> Self {
        Seed(value)
    }
}

impl std::fmt::Display for Seed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_random() {
            write!(f, "random")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl std::str::FromStr for Seed {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "random" | "-1" => Ok(Seed::RANDOM),
            other => match other.parse::<i64>() {
                Ok(value) if value >= 0 => Ok(Seed(value)),
                Ok(_) => Err(format!(
                    "Invalid seed: {}. Use a non-negative number or -1 for random",
                    s
                )),
                Err(_) => Err(format!("Invalid seed: {}", s)),
            },
        }
    }
}
