use image::{Rgb, RgbImage};
use wordcloud::layout::{LayoutParams, SeededDice, natural_fit_scale};
use wordcloud::mask::MaskThresholds;
use wordcloud::{
    BlockFont, CloudError, Config, OccupancyMask, RankedWord, compute_bounding_box, layout_cloud,
    rank_words,
};

fn mask_with_open_block(width: u32, height: u32, top: u32, left: u32, h: u32, w: u32) -> OccupancyMask {
    let mut image = RgbImage::from_pixel(width, height, Rgb([0, 0, 0]));
    for row in top..top + h {
        for col in left..left + w {
            image.put_pixel(col, row, Rgb([255, 255, 255]));
        }
    }
    OccupancyMask::new(image, MaskThresholds::default())
}

fn synthetic_words(count: usize) -> Vec<RankedWord> {
    let letters: Vec<char> = ('a'..='z').collect();
    (0..count)
        .map(|idx| RankedWord {
            text: format!("{}{}", letters[1 + idx / 26], letters[idx % 26]),
            frequency: 1.0 - idx as f64 * 0.015,
            rank: idx,
        })
        .collect()
}

#[test]
fn text_with_a_repeated_word_ranks_it_first() {
    let ranked = rank_words("cat cat dog").expect("ranked");
    let pairs: Vec<(&str, f64)> = ranked
        .iter()
        .map(|word| (word.text.as_str(), word.frequency))
        .collect();
    assert_eq!(pairs, [("cat", 1.0), ("dog", 0.5)]);
}

#[test]
fn single_word_in_an_open_mask_is_placed() {
    let mask = mask_with_open_block(200, 100, 0, 0, 100, 200);
    let bbox = compute_bounding_box(&mask).expect("bbox");
    let font = BlockFont::new(30.0);
    let params = LayoutParams::default();
    let words = rank_words("cloud").expect("ranked");
    let mut dice = SeededDice::from_seed(2024);

    let cloud = layout_cloud(&words, &mask, &font, &params, &mut dice).expect("cloud");
    let natural = natural_fit_scale("cloud", &bbox, &font);
    assert_eq!(cloud.initial_scale, natural);
    assert!(cloud.is_complete());
    assert_eq!(cloud.placed.len(), 1);
    let word = &cloud.placed[0];
    assert!(word.scale <= natural + params.font_step + 1e-9);
    assert!(word.scale >= params.min_font - params.font_step);
    assert!(word.rect.within(&cloud.bounding_box));
}

#[test]
fn region_smaller_than_the_minimum_font_has_no_usable_scale() {
    let mask = mask_with_open_block(64, 64, 30, 30, 6, 6);
    let font = BlockFont::new(30.0);
    let words = rank_words("cat cat dog").expect("ranked");
    let mut dice = SeededDice::from_seed(8);

    let err = layout_cloud(&words, &mask, &font, &LayoutParams::default(), &mut dice)
        .err()
        .expect("layout should fail");
    assert!(matches!(err, CloudError::NoUsableScale { .. }));
}

#[test]
fn many_words_in_a_small_mask_stop_early() {
    let mask = mask_with_open_block(60, 60, 0, 0, 60, 60);
    let font = BlockFont::new(30.0);
    let words = synthetic_words(50);
    let mut dice = SeededDice::from_seed(77);

    let cloud = layout_cloud(&words, &mask, &font, &LayoutParams::default(), &mut dice)
        .expect("cloud");
    assert!(cloud.placed.len() < 50);
    let stopped = cloud.stopped.as_ref().expect("run should stop early");
    assert_eq!(stopped.rank, cloud.placed.len());
    let last_try = *stopped.tried_scales.last().expect("tried");
    assert!(last_try < 0.3);
    assert!(stopped.tried_scales.windows(2).all(|pair| pair[1] < pair[0]));

    for (idx, word) in cloud.placed.iter().enumerate() {
        assert!(word.rect.within(&cloud.bounding_box), "{} escapes the box", word.text);
        for other in &cloud.placed[idx + 1..] {
            assert!(
                !word.rect.intersects(&other.rect),
                "{} overlaps {}",
                word.text,
                other.text
            );
        }
    }
}

#[test]
fn empty_input_fails_before_any_canvas_work() {
    let err = wordcloud::run(
        Config {
            input: Some(String::new()),
            seed: Some(1),
            ..Config::default()
        },
        "".as_bytes(),
    )
    .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<CloudError>(),
        Some(CloudError::NoWords)
    ));
    assert!(err.to_string().contains("at least one word"));
}

#[test]
fn same_seed_gives_the_same_cloud() {
    let mask = mask_with_open_block(240, 160, 10, 10, 140, 220);
    let font = BlockFont::new(30.0);
    let words = rank_words("sea sea sea sky sky sand shell wave wave gull").expect("ranked");

    let layout = |seed| {
        let mut dice = SeededDice::from_seed(seed);
        layout_cloud(&words, &mask, &font, &LayoutParams::default(), &mut dice)
            .expect("cloud")
            .placed
    };
    assert_eq!(layout(31), layout(31));
}

#[test]
fn full_run_writes_the_image() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mask_path = dir.path().join("mask.png");
    let output = dir.path().join("cloud.png");
    let mut image = RgbImage::from_pixel(320, 240, Rgb([0, 0, 0]));
    for row in 10..230 {
        for col in 10..310 {
            image.put_pixel(col, row, Rgb([255, 255, 255]));
        }
    }
    image.save(&mask_path).expect("save mask");

    let summary = wordcloud::run(
        Config {
            input: Some("rust rust rust cargo cargo crate trait borrow".to_string()),
            mask: Some(mask_path.to_string_lossy().to_string()),
            output: Some(output.to_string_lossy().to_string()),
            seed: Some(5),
            block_glyphs: true,
            ..Config::default()
        },
        "".as_bytes(),
    )
    .expect("run");

    assert_eq!(summary.ranked, 5);
    assert!(summary.placed >= 1);
    let written = image::open(&output).expect("decode").to_rgb8();
    assert_eq!(written.dimensions(), (320, 240));
}

#[test]
fn sketched_mask_feeds_the_run() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = dir.path().join("sketch.png");
    let script = "down 60 200\nmove 450 200\nmove 450 320\nmove 60 320\nup\ndone\n";

    let summary = wordcloud::run(
        Config {
            input: Some("kite kite string wind".to_string()),
            output: Some(output.to_string_lossy().to_string()),
            seed: Some(12),
            block_glyphs: true,
            ..Config::default()
        },
        script.as_bytes(),
    )
    .expect("run");

    assert_eq!(summary.ranked, 3);
    let written = image::open(&output).expect("decode").to_rgb8();
    assert_eq!(written.dimensions(), (512, 512));
}
