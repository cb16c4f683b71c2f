//! Built-in Sequence Catalog
//!
//! An in-memory sequence library. It backs offline mode and doubles as the
//! mock API when no server is configured.

use std::collections::BTreeMap;

use async_trait::async_trait;

use super::traits::{FetchError, SequenceSource};
use crate::sequence::{Level, Pose, Sequence, SequenceId};

/// In-memory sequence source
#[derive(Clone, Debug, Default)]
pub struct CatalogSequenceSource {
    sequences: BTreeMap<SequenceId, Sequence>,
}

impl CatalogSequenceSource {
    /// Create an empty catalog
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a catalog holding the built-in library
    #[must_use]
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        for result in [sun_salutation(), morning_flow(), evening_wind_down()] {
            match result {
                Ok(sequence) => catalog.insert(sequence),
                Err(e) => tracing::error!("Skipping invalid built-in sequence: {}", e),
            }
        }
        catalog
    }

    /// Add a sequence (replaces any sequence with the same id)
    pub fn insert(&mut self, sequence: Sequence) {
        self.sequences.insert(sequence.id().clone(), sequence);
    }

    /// Builder-style [`insert`](Self::insert)
    #[must_use]
    pub fn with_sequence(mut self, sequence: Sequence) -> Self {
        self.insert(sequence);
        self
    }

    /// All sequences, ordered by id
    pub fn sequences(&self) -> impl Iterator<Item = &Sequence> {
        self.sequences.values()
    }

    /// Number of sequences in the catalog
    #[must_use]
    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    /// Whether the catalog is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }
}

#[async_trait]
impl SequenceSource for CatalogSequenceSource {
    fn name(&self) -> &'static str {
        "catalog"
    }

    async fn fetch(&self, id: &SequenceId) -> Result<Sequence, FetchError> {
        self.sequences
            .get(id)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(id.clone()))
    }
}

// ============================================
// Built-in Library
// ============================================

fn sun_salutation() -> Result<Sequence, crate::sequence::SequenceError> {
    let poses = vec![
        Pose::new("Mountain Pose", 30)
            .with_sanskrit("Tadasana")
            .with_image("poses/mountain.png")
            .with_instructions("Stand tall, feet hip-width apart, arms relaxed at your sides."),
        Pose::new("Upward Salute", 20)
            .with_sanskrit("Urdhva Hastasana")
            .with_image("poses/upward-salute.png")
            .with_instructions("Inhale and sweep the arms overhead, palms facing each other."),
        Pose::new("Standing Forward Bend", 30)
            .with_sanskrit("Uttanasana")
            .with_image("poses/forward-bend.png")
            .with_instructions("Exhale and fold from the hips, letting the head hang heavy."),
        Pose::new("Plank Pose", 30)
            .with_sanskrit("Phalakasana")
            .with_image("poses/plank.png")
            .with_instructions("Step back, shoulders over wrists, body in one long line."),
        Pose::new("Downward-Facing Dog", 45)
            .with_sanskrit("Adho Mukha Svanasana")
            .with_image("poses/downward-dog.png")
            .with_instructions("Lift the hips up and back, pressing the heels toward the floor."),
        Pose::new("Mountain Pose", 30)
            .with_sanskrit("Tadasana")
            .with_image("poses/mountain.png")
            .with_instructions("Walk the feet forward, rise slowly and return to standing."),
    ];
    Ok(Sequence::new("sun-salutation".into(), "Sun Salutation A", poses)?
        .with_description(Some("A classic warming flow to greet the day.".to_string())))
}

fn morning_flow() -> Result<Sequence, crate::sequence::SequenceError> {
    let poses = vec![
        Pose::new("Cat-Cow", 60)
            .with_sanskrit("Marjaryasana-Bitilasana")
            .with_image("poses/cat-cow.png")
            .with_instructions("On hands and knees, alternate arching and rounding the spine."),
        Pose::new("Warrior II", 60)
            .with_sanskrit("Virabhadrasana II")
            .with_image("poses/warrior-2.png")
            .with_instructions("Front knee over ankle, arms extended, gaze past the front hand."),
        Pose::new("Triangle Pose", 60)
            .with_sanskrit("Trikonasana")
            .with_image("poses/triangle.png")
            .with_instructions("Reach forward, then tilt down, top arm stretching to the sky."),
        Pose::new("Tree Pose", 60)
            .with_sanskrit("Vrksasana")
            .with_image("poses/tree.png")
            .with_instructions("Root through one foot, the other resting on calf or thigh."),
        Pose::new("Corpse Pose", 120)
            .with_sanskrit("Savasana")
            .with_image("poses/corpse.png")
            .with_instructions("Lie flat, release all effort and let the breath settle."),
    ];
    Ok(
        Sequence::new("morning-flow".into(), "Morning Flow", poses)?
            .with_level(Level::Intermediate)
            .with_description(Some("Standing strength and balance to wake up.".to_string())),
    )
}

fn evening_wind_down() -> Result<Sequence, crate::sequence::SequenceError> {
    let poses = vec![
        Pose::new("Child's Pose", 90)
            .with_sanskrit("Balasana")
            .with_image("poses/child.png")
            .with_instructions("Knees wide, forehead down, arms long or resting by the feet."),
        Pose::new("Seated Forward Bend", 90)
            .with_sanskrit("Paschimottanasana")
            .with_image("poses/seated-forward-bend.png")
            .with_instructions("Legs extended, hinge forward from the hips with a long spine."),
        Pose::new("Legs Up the Wall", 120)
            .with_sanskrit("Viparita Karani")
            .with_image("poses/legs-up-wall.png")
            .with_instructions("Lie back with legs resting up a wall, arms open."),
        Pose::new("Corpse Pose", 180)
            .with_sanskrit("Savasana")
            .with_image("poses/corpse.png")
            .with_instructions("Lie flat, release all effort and let the breath settle."),
    ];
    Ok(
        Sequence::new("evening-wind-down".into(), "Evening Wind-Down", poses)?
            .with_description(Some("Slow, grounding shapes before sleep.".to_string())),
    )
}
