use soundgarden::carousel::{Carousel, CarouselConfig, FilterOutcome, Motion, SlotKind};
use soundgarden::pipeline::garden::{Garden, GardenSummary};

fn summaries(names: &[&str]) -> Vec<GardenSummary> {
    names.iter().map(|n| Garden::new("ana", n).summary()).collect()
}

fn run_frames(c: &mut Carousel<GardenSummary>, frames: usize) {
    for _ in 0..frames {
        c.frame(1.0 / 60.0);
    }
}

#[test]
fn scrolling_right_forever_keeps_cards_on_screen() {
    let mut c = Carousel::new(CarouselConfig::default());
    c.rebuild(summaries(&["moss", "fern", "ivy"]), 80.0);

    for _ in 0..50 {
        c.on_scroll_input(1.0);
        run_frames(&mut c, 3);
        assert!(!c.visible_slots().is_empty());
        let l = c.layout();
        assert!(c.rendered_offset() >= 0.0);
        assert!(c.rendered_offset() <= l.total_width - l.viewport_width + 1e-9);
    }
    run_frames(&mut c, 120);
    assert_eq!(c.motion(), Motion::Idle);
    assert!((c.current_offset() - c.target_offset()).abs() < 1e-9);
    // settled back on the real block
    let l = c.layout();
    assert!(c.current_offset() >= l.prefix_clone_width - 1e-9);
    assert!(c.current_offset() <= l.total_width - l.prefix_clone_width + 1e-9);
}

#[test]
fn clones_show_the_same_gardens_as_the_real_block() {
    let mut c = Carousel::new(CarouselConfig::default());
    c.rebuild(summaries(&["moss", "fern"]), 100.0);
    let slots = c.slots();
    let n = 2;
    let clones = c.layout().clone_count;
    assert!(clones >= (100.0f64 / c.layout().item_width).ceil() as usize);
    for (i, slot) in slots.iter().enumerate() {
        let expected = (i as isize - clones as isize).rem_euclid(n as isize) as usize;
        assert_eq!(slot.item, expected);
    }
    assert_eq!(slots.first().unwrap().kind, SlotKind::Prefix);
    assert_eq!(slots.last().unwrap().kind, SlotKind::Suffix);
}

#[test]
fn search_narrows_then_restores() {
    let mut c = Carousel::new(CarouselConfig::default());
    c.rebuild(summaries(&["Moss Hollow", "Fern Gully", "Mossy Rock"]), 80.0);
    assert_eq!(c.apply_filter(|s| s.matches("moss")), FilterOutcome::Matches(2));
    assert_eq!(c.apply_filter(|s| s.matches("orchid")), FilterOutcome::NoResults);
    assert_eq!(c.current_offset(), 0.0);
    assert!(c.centered_item().is_none());
    c.clear_filter();
    assert_eq!(c.visible_count(), 3);
}
