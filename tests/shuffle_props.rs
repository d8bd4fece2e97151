// Property tests for level shuffling (native only; proptest is not a wasm dev-dependency).
#![cfg(not(target_arch = "wasm32"))]

use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use sentence_match::{ImageRef, LevelDefinition, ScreenId, ShuffledLevel};

fn level_strategy() -> impl Strategy<Value = LevelDefinition> {
    prop::collection::hash_set("[a-z]{1,8}\\.png", 1..10).prop_flat_map(|names| {
        let images: Vec<ImageRef> = names.into_iter().map(ImageRef::new).collect();
        let len = images.len();
        (Just(images), 0..len).prop_map(|(images, answer)| {
            LevelDefinition::new("sentence.", images, answer, ScreenId::Number(1)).unwrap()
        })
    })
}

proptest! {
    #[test]
    fn shuffle_is_a_permutation(def in level_strategy(), seed in any::<u64>()) {
        let shuffled = ShuffledLevel::shuffle(&def, &mut StdRng::seed_from_u64(seed));
        let mut before = def.images().to_vec();
        let mut after = shuffled.images.clone();
        before.sort();
        after.sort();
        prop_assert_eq!(before, after);
    }

    #[test]
    fn shuffle_keeps_answer_identity(def in level_strategy(), seed in any::<u64>()) {
        let shuffled = ShuffledLevel::shuffle(&def, &mut StdRng::seed_from_u64(seed));
        prop_assert_eq!(&shuffled.correct_image, def.correct_image());
        let hits = shuffled.images.iter().filter(|i| shuffled.is_correct(i)).count();
        prop_assert_eq!(hits, 1);
        prop_assert_eq!(shuffled.sentence.as_str(), def.sentence());
    }
}
