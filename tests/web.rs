// Browser tests: run with `wasm-pack test --headless --firefox`.
#![cfg(target_arch = "wasm32")]

use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn doc() -> web_sys::Document {
    web_sys::window().unwrap().document().unwrap()
}

#[wasm_bindgen_test]
fn mounts_builtin_game_into_root() {
    sentence_match::start_game().unwrap();
    let root = doc().get_element_by_id("sentence-match").unwrap();
    let tiles = root.query_selector_all(".image-tile").unwrap();
    assert!(tiles.length() >= 2);
    assert_eq!(sentence_match::current_attempts(), 0);
    assert!(sentence_match::progress_percentage() > 0.0);
}

#[wasm_bindgen_test]
fn empty_level_data_renders_no_grid() {
    sentence_match::start_game_with(
        Some("[]".to_string()),
        Some(r#"{"rootElementId":"sm-empty"}"#.to_string()),
    )
    .unwrap();
    let root = doc().get_element_by_id("sm-empty").unwrap();
    assert!(root.query_selector(".image-grid").unwrap().is_none());
    assert!(root.query_selector(".navbar").unwrap().is_some());
}

#[wasm_bindgen_test]
fn bad_level_json_is_reported() {
    let err = sentence_match::start_game_with(Some("{".to_string()), None).unwrap_err();
    assert!(err.as_string().unwrap().contains("invalid level JSON"));
}

#[wasm_bindgen_test]
fn tiles_left_in_a_replaced_root_are_inert() {
    use wasm_bindgen::JsCast;

    sentence_match::start_game_with(None, Some(r#"{"rootElementId":"sm-first"}"#.to_string()))
        .unwrap();
    let first = doc().get_element_by_id("sm-first").unwrap();
    let old_tile: web_sys::HtmlElement = first
        .query_selector(".image-tile")
        .unwrap()
        .unwrap()
        .dyn_into()
        .unwrap();

    sentence_match::start_game_with(None, Some(r#"{"rootElementId":"sm-second"}"#.to_string()))
        .unwrap();
    assert!(first.query_selector(".image-tile").unwrap().is_none());

    old_tile.click();
    first.dyn_ref::<web_sys::HtmlElement>().unwrap().click();
    assert_eq!(sentence_match::current_attempts(), 0);
}

#[wasm_bindgen_test]
fn confetti_paints_onto_a_canvas() {
    use rand::SeedableRng;
    use wasm_bindgen::JsCast;

    let canvas: web_sys::HtmlCanvasElement =
        doc().create_element("canvas").unwrap().dyn_into().unwrap();
    let ctx: web_sys::CanvasRenderingContext2d =
        canvas.get_context("2d").unwrap().unwrap().dyn_into().unwrap();
    let mut rng = rand::rngs::StdRng::seed_from_u64(5);
    let mut burst = sentence_match::confetti::Confetti::burst(20, 300.0, 200.0, &mut rng);
    burst.step(16.0);
    assert!(burst.paint(&ctx).is_ok());
}
