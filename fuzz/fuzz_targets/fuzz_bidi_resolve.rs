#![no_main]

use libfuzzer_sys::fuzz_target;
use skein_text::options::{LayoutOptions, TextDirection};
use skein_text::reorder::reorder_visual;
use skein_text::{MAX_ITEM_LENGTH, TextEngine};

fuzz_target!(|data: &[u8]| {
    // First byte picks the paragraph direction.
    let Some((&dir, rest)) = data.split_first() else {
        return;
    };
    let Ok(text) = std::str::from_utf8(rest) else {
        return;
    };
    if text.len() > 4096 {
        return;
    }
    let direction = match dir % 3 {
        0 => TextDirection::Auto,
        1 => TextDirection::Ltr,
        _ => TextDirection::Rtl,
    };

    let mut engine = TextEngine::with_options(text, LayoutOptions::PLAIN.with_direction(direction));
    engine.itemize();

    let levels = engine.levels();
    assert_eq!(levels.len(), engine.text().len());
    assert!(levels.iter().all(|&l| l <= 126), "level past the depth limit");

    // Items tile the text.
    let mut pos = 0;
    for item in engine.items() {
        assert_eq!(item.position, pos, "gap or overlap between items");
        assert!(item.length > 0 && item.length <= MAX_ITEM_LENGTH);
        pos = item.end();
    }
    assert_eq!(pos, engine.text().len());

    // Visual order is a permutation.
    let mut order = reorder_visual(&levels);
    order.sort_unstable();
    assert!(order.iter().copied().eq(0..levels.len()));
});
