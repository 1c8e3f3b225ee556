use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use trainboard::error::WizardError;
use trainboard::wizard::{Navigator, DATASET_STEPS, TRAINING_STEPS};

#[test]
fn test_random_walks_stay_in_range_and_move_by_one() {
    for (seed, steps) in [(7u64, DATASET_STEPS), (11, TRAINING_STEPS), (42, TRAINING_STEPS)] {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut nav = Navigator::new(steps);
        let last = steps.len() as u8;

        for _ in 0..2_000 {
            let before = nav.current();
            let valid = rng.gen_bool(0.6);
            if rng.gen_bool(0.5) {
                let moved = nav.advance(valid);
                if moved {
                    assert_eq!(nav.current(), before + 1);
                } else {
                    assert_eq!(nav.current(), before);
                    assert!(!valid || before == last);
                }
            } else {
                let moved = nav.retreat();
                assert_eq!(moved, before > 1);
                let expected = if before > 1 { before - 1 } else { before };
                assert_eq!(nav.current(), expected);
            }
            assert!((1..=last).contains(&nav.current()));
        }
    }
}

#[test]
fn test_invalid_step_blocks_advance() {
    let mut nav = Navigator::new(TRAINING_STEPS);
    assert!(!nav.advance(false));
    assert_eq!(nav.current(), 1);
}

#[test]
fn test_retreat_from_any_step_lands_on_previous() {
    for k in 2..=TRAINING_STEPS.len() as u8 {
        let mut nav = Navigator::new(TRAINING_STEPS);
        while nav.current() < k {
            assert!(nav.advance(true));
        }
        assert!(nav.retreat());
        assert_eq!(nav.current(), k - 1);
    }
}

#[test]
fn test_no_advance_past_last_step() {
    let mut nav = Navigator::new(DATASET_STEPS);
    while nav.advance(true) {}
    assert_eq!(nav.current(), 4);
    assert!(nav.is_last());
    assert_eq!(nav.current_step().title, "Save");
}

#[test]
fn test_submission_gate() {
    let mut nav = Navigator::new(DATASET_STEPS);
    assert_eq!(nav.begin_submit(true), Err(WizardError::NotOnFinalStep(1)));
    while nav.advance(true) {}

    assert_eq!(nav.begin_submit(false), Err(WizardError::StepBlocked(4)));
    assert!(!nav.is_submitting());

    nav.begin_submit(true).unwrap();
    assert!(nav.is_submitting());
    assert_eq!(nav.begin_submit(true), Err(WizardError::SubmissionInFlight));
    assert!(!nav.advance(true));

    nav.finish_submit();
    assert!(!nav.is_submitting());
    assert_eq!(nav.current(), 4);
}

#[test]
fn test_back_stays_available_while_submitting() {
    let mut nav = Navigator::new(DATASET_STEPS);
    while nav.advance(true) {}
    nav.begin_submit(true).unwrap();

    assert!(nav.retreat());
    assert_eq!(nav.current(), 3);
    assert!(nav.is_submitting());
    assert!(!nav.advance(true));

    nav.finish_submit();
    assert!(!nav.is_submitting());
    assert!(nav.advance(true));
    assert_eq!(nav.current(), 4);
}

#[test]
fn test_view_reports_current_title() {
    let mut nav = Navigator::new(TRAINING_STEPS);
    nav.advance(true);
    let view = nav.view();
    assert_eq!(view.current_step, 2);
    assert_eq!(view.title, "Select Data");
    assert_eq!(view.steps.len(), 6);
    assert!(!view.submitting);
}
