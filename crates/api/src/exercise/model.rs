use serde::{Deserialize, Serialize};

/// Variant-specific data, stored with a discriminator so the generic and
/// programming flavours share one table and one JSON shape.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "discriminator", rename_all = "camelCase")]
pub enum ExerciseVariant {
    Generic,
    Programming {
        base_build_plan_id: String,
        base_repository_url: String,
    },
}

/// An exercise within a course.
///
/// Identity is assigned by the gateway on first save and immutable afterwards.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Exercise {
    pub id: Option<i64>,
    pub title: String,
    pub course_id: i64,
    #[serde(flatten)]
    pub variant: ExerciseVariant,
}

impl Exercise {
    pub fn is_programming(&self) -> bool {
        matches!(self.variant, ExerciseVariant::Programming { .. })
    }
}

// Equality is identity-based only. Two exercises that have not been persisted
// yet are never equal, not even to themselves.
impl PartialEq for Exercise {
    fn eq(&self, other: &Self) -> bool {
        match (self.id, other.id) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}
