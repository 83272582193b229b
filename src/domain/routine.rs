//! Routine domain models

use serde::{Deserialize, Serialize};

use super::document::{new_id, Document};

/// Difficulty tier of a routine, ordered from easiest to hardest
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RoutineLevel {
    #[default]
    #[serde(rename = "PUESTA_A_PUNTO")]
    Conditioning,
    #[serde(rename = "NIVEL_1")]
    Level1,
    #[serde(rename = "NIVEL_2")]
    Level2,
    #[serde(rename = "NIVEL_3")]
    Level3,
}

impl RoutineLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoutineLevel::Conditioning => "PUESTA_A_PUNTO",
            RoutineLevel::Level1 => "NIVEL_1",
            RoutineLevel::Level2 => "NIVEL_2",
            RoutineLevel::Level3 => "NIVEL_3",
        }
    }
}

impl std::str::FromStr for RoutineLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PUESTA_A_PUNTO" => Ok(RoutineLevel::Conditioning),
            "NIVEL_1" => Ok(RoutineLevel::Level1),
            "NIVEL_2" => Ok(RoutineLevel::Level2),
            "NIVEL_3" => Ok(RoutineLevel::Level3),
            _ => Err(format!("unknown routine level: {}", s)),
        }
    }
}

/// Set prescription embedded in a routine
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SetSpec {
    pub id: String,
    pub sets: u32,
    pub repetitions: u32,
    pub weight: Option<f64>,
    /// Rest between sets in seconds
    pub rest_seconds: Option<u32>,
}

/// Set prescription as supplied by callers, before it receives an ID
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SetSpecInput {
    pub sets: u32,
    pub repetitions: u32,
    pub weight: Option<f64>,
    pub rest_seconds: Option<u32>,
}

impl SetSpecInput {
    pub fn into_spec(self) -> SetSpec {
        SetSpec {
            id: new_id(),
            sets: self.sets,
            repetitions: self.repetitions,
            weight: self.weight,
            rest_seconds: self.rest_seconds,
        }
    }
}

/// Fields shared by routine creation and modification
#[derive(Debug, Clone, PartialEq)]
pub struct RoutineDraft {
    pub name: String,
    pub muscle_group_id: String,
    pub level: RoutineLevel,
    pub exercise_ids: Vec<String>,
    pub set_specs: Vec<SetSpecInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Routine {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub level: RoutineLevel,
    pub muscle_group_id: String,
    /// Ordered exercise references, all members of `muscle_group_id`
    #[serde(default)]
    pub exercise_ids: Vec<String>,
    #[serde(default)]
    pub set_specs: Vec<SetSpec>,
}

impl Routine {
    pub fn contains_exercise(&self, exercise_id: &str) -> bool {
        self.exercise_ids.iter().any(|id| id == exercise_id)
    }

    /// Swap one exercise reference in place, keeping order and length.
    /// Returns false when `old` is not part of the routine.
    pub fn replace_exercise(&mut self, old: &str, new: &str) -> bool {
        match self.exercise_ids.iter().position(|id| id == old) {
            Some(index) => {
                self.exercise_ids[index] = new.to_string();
                true
            }
            None => false,
        }
    }

    pub fn set_spec_mut(&mut self, set_spec_id: &str) -> Option<&mut SetSpec> {
        self.set_specs.iter_mut().find(|spec| spec.id == set_spec_id)
    }
}

impl Document for Routine {
    const COLLECTION: &'static str = "routines";

    fn id(&self) -> &str {
        &self.id
    }
}
