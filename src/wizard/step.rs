use serde::Serialize;

/// One page of a wizard. Ids are 1-based and contiguous within a table;
/// their order is the only order the wizard may visit them in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Step {
    pub id: u8,
    pub title: &'static str,
}

pub const DATASET_STEPS: &[Step] = &[
    Step { id: 1, title: "Customer" },
    Step { id: 2, title: "Filters" },
    Step { id: 3, title: "Preview" },
    Step { id: 4, title: "Save" },
];

pub const TRAINING_STEPS: &[Step] = &[
    Step { id: 1, title: "Basic Information" },
    Step { id: 2, title: "Select Data" },
    Step { id: 3, title: "Base Model" },
    Step { id: 4, title: "Hyperparameters" },
    Step { id: 5, title: "Execution Parameters" },
    Step { id: 6, title: "Review & Submit" },
];

/// True when ids run 1..=len without gaps or reordering.
pub fn is_contiguous(steps: &[Step]) -> bool {
    !steps.is_empty()
        && steps
            .iter()
            .enumerate()
            .all(|(i, s)| s.id as usize == i + 1)
}
