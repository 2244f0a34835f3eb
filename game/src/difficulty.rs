use serde::{Deserialize, Serialize};

/// Half-open population interval `[min, max)`; `max: None` is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopulationRange {
    pub min: u64,
    pub max: Option<u64>,
}

impl PopulationRange {
    pub fn contains(self, population: u64) -> bool {
        population >= self.min && self.max.is_none_or(|max| population < max)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    /// Bigger towns are easier to recognise.
    pub fn range(self) -> PopulationRange {
        match self {
            Difficulty::Easy => PopulationRange {
                min: 40_000,
                max: None,
            },
            Difficulty::Medium => PopulationRange {
                min: 20_000,
                max: Some(40_000),
            },
            Difficulty::Hard => PopulationRange {
                min: 0,
                max: Some(20_000),
            },
        }
    }

    pub fn contains(self, population: u64) -> bool {
        self.range().contains(population)
    }

    pub fn for_population(population: u64) -> Difficulty {
        Self::ALL
            .into_iter()
            .find(|d| d.contains(population))
            .unwrap_or(Difficulty::Hard)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "easy" => Some(Difficulty::Easy),
            "medium" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RoundCount {
    Five,
    #[default]
    Ten,
    Fifteen,
}

impl RoundCount {
    pub const ALL: [RoundCount; 3] = [RoundCount::Five, RoundCount::Ten, RoundCount::Fifteen];

    pub fn get(self) -> usize {
        match self {
            RoundCount::Five => 5,
            RoundCount::Ten => 10,
            RoundCount::Fifteen => 15,
        }
    }

    pub fn from_count(count: usize) -> Option<Self> {
        Self::ALL.into_iter().find(|rc| rc.get() == count)
    }
}

impl Serialize for RoundCount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u64(self.get() as u64)
    }
}

impl<'de> Deserialize<'de> for RoundCount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let count = u64::deserialize(deserializer)?;
        usize::try_from(count)
            .ok()
            .and_then(RoundCount::from_count)
            .ok_or_else(|| {
                serde::de::Error::custom(format!("round count must be 5, 10 or 15, got {count}"))
            })
    }
}
