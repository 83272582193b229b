//! Exercise catalog: exercises and the muscle groups that own them

use serde::{Deserialize, Serialize};

use super::document::Document;

/// A single exercise, owned by exactly one muscle group
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Exercise {
    pub id: String,
    pub name: String,
    pub description: String,
    /// How the exercise is performed
    pub execution: String,
    pub muscle_group_id: String,
}

impl Document for Exercise {
    const COLLECTION: &'static str = "exercises";

    fn id(&self) -> &str {
        &self.id
    }
}

/// A muscle group and the ordered set of exercises that belong to it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MuscleGroup {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub exercise_ids: Vec<String>,
}

impl MuscleGroup {
    pub fn contains(&self, exercise_id: &str) -> bool {
        self.exercise_ids.iter().any(|id| id == exercise_id)
    }

    /// Append an exercise unless it is already a member. Returns whether
    /// the set changed.
    pub fn add_exercise(&mut self, exercise_id: &str) -> bool {
        if self.contains(exercise_id) {
            return false;
        }
        self.exercise_ids.push(exercise_id.to_string());
        true
    }
}

impl Document for MuscleGroup {
    const COLLECTION: &'static str = "muscle_groups";

    fn id(&self) -> &str {
        &self.id
    }
}
