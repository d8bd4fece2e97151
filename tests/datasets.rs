// Integration tests for the builtin level set.
// These tests are native-friendly and avoid wasm/browser APIs.

use std::collections::HashSet;

use sentence_match::{ScreenId, builtin_levels};

#[test]
fn builtin_levels_parse_and_are_nonempty() {
    let levels = builtin_levels().expect("builtin levels must be valid");
    assert!(!levels.is_empty());
}

#[test]
fn builtin_images_are_unique_within_each_level() {
    for (i, level) in builtin_levels().unwrap().iter().enumerate() {
        let mut seen = HashSet::new();
        for image in level.images() {
            assert!(seen.insert(image), "duplicate image '{}' in level {}", image, i);
        }
        assert!(level.images().len() >= 2, "level {} needs at least two choices", i);
    }
}

#[test]
fn builtin_sentences_are_filled_in() {
    for (i, level) in builtin_levels().unwrap().iter().enumerate() {
        let s = level.sentence().trim();
        assert!(!s.is_empty(), "empty sentence in level {}", i);
        assert!(s.ends_with('.'), "sentence '{}' in level {} should end with a period", s, i);
    }
}

#[test]
fn builtin_screens_count_up_from_one() {
    for (i, level) in builtin_levels().unwrap().iter().enumerate() {
        assert_eq!(*level.screen(), ScreenId::Number(i as u64 + 1));
    }
}
