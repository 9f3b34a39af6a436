//! Horizontally scrolling card strip that never runs out of cards.
//!
//! The real items sit between a prefix and a suffix block of clones. Scrolling
//! eases `current_offset` toward `target_offset`; once the strip has settled
//! outside the real range the offset is silently moved back by a whole number
//! of content widths, which leaves the visible cards exactly where they were.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarouselConfig {
    pub card_width: f64,
    pub gap: f64,
    pub clone_margin: usize,
    pub scroll_step: f64,
    pub easing: f64,
    pub snap_threshold: f64,
    pub settle_secs: f64,
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self {
            card_width: 24.0,
            gap: 2.0,
            clone_margin: 2,
            scroll_step: 26.0,
            easing: 0.2,
            snap_threshold: 0.5,
            settle_secs: 0.15,
        }
    }
}

impl CarouselConfig {
    /// Replaces values that would stall the strip. `easing` must lie in
    /// (0, 1] and `snap_threshold` must be positive, or motion never ends.
    pub fn validated(self) -> Self {
        let defaults = Self::default();
        let positive = |v: f64| v.is_finite() && v > 0.0;
        let mut config = self;
        if !positive(config.easing) {
            log::warn!("carousel easing {} must be positive, using {}", config.easing, defaults.easing);
            config.easing = defaults.easing;
        }
        config.easing = config.easing.min(1.0);
        if !positive(config.snap_threshold) {
            log::warn!(
                "carousel snap_threshold {} must be positive, using {}",
                config.snap_threshold,
                defaults.snap_threshold
            );
            config.snap_threshold = defaults.snap_threshold;
        }
        if !positive(config.card_width) {
            config.card_width = defaults.card_width;
        }
        if !positive(config.scroll_step) {
            config.scroll_step = defaults.scroll_step;
        }
        if !config.gap.is_finite() || config.gap < 0.0 {
            config.gap = defaults.gap;
        }
        if !config.settle_secs.is_finite() || config.settle_secs < 0.0 {
            config.settle_secs = defaults.settle_secs;
        }
        config
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CarouselLayout {
    pub viewport_width: f64,
    pub item_width: f64,
    pub content_width: f64,
    pub clone_count: usize,
    pub prefix_clone_width: f64,
    pub total_width: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotKind {
    Prefix,
    Real,
    Suffix,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Slot {
    pub kind: SlotKind,
    pub item: usize, // index into the real items
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacedSlot {
    pub index: usize, // position in the whole strip
    pub slot: Slot,
    pub x: f64, // left edge relative to the viewport
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RebuildOutcome {
    Built,
    Empty,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterOutcome {
    Matches(usize),
    NoResults,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Motion {
    Idle,
    Easing,
}

#[derive(Clone, Debug)]
struct Entry<T> {
    item: T,
    visible: bool,
}

#[derive(Clone, Debug)]
pub struct Carousel<T> {
    config: CarouselConfig,
    entries: Vec<Entry<T>>,
    order: Vec<usize>, // visible entries, in display order
    layout: CarouselLayout,
    current_offset: f64,
    target_offset: f64,
    rendered_offset: f64,
    motion: Motion,
    quiet_for: Option<f64>, // seconds since last scroll input
}

impl<T> Carousel<T> {
    pub fn new(config: CarouselConfig) -> Self {
        Self {
            config: config.validated(),
            entries: Vec::new(),
            order: Vec::new(),
            layout: CarouselLayout::default(),
            current_offset: 0.0,
            target_offset: 0.0,
            rendered_offset: 0.0,
            motion: Motion::Idle,
            quiet_for: None,
        }
    }

    pub fn config(&self) -> &CarouselConfig {
        &self.config
    }

    pub fn layout(&self) -> &CarouselLayout {
        &self.layout
    }

    pub fn current_offset(&self) -> f64 {
        self.current_offset
    }

    pub fn target_offset(&self) -> f64 {
        self.target_offset
    }

    pub fn rendered_offset(&self) -> f64 {
        self.rendered_offset
    }

    pub fn motion(&self) -> Motion {
        self.motion
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn visible_count(&self) -> usize {
        self.order.len()
    }

    pub fn item(&self, index: usize) -> Option<&T> {
        self.entries.get(index).map(|e| &e.item)
    }

    /// Replaces every item (all visible) and lays the strip out again.
    pub fn rebuild(&mut self, items: Vec<T>, viewport_width: f64) -> RebuildOutcome {
        self.entries = items
            .into_iter()
            .map(|item| Entry { item, visible: true })
            .collect();
        self.relayout(viewport_width)
    }

    /// Viewport changed size: rebuild from scratch, no mid-flight state kept.
    pub fn resize(&mut self, viewport_width: f64) -> RebuildOutcome {
        self.relayout(viewport_width)
    }

    fn relayout(&mut self, viewport_width: f64) -> RebuildOutcome {
        // dropping the motion state is what cancels any pending easing frames
        self.motion = Motion::Idle;
        self.quiet_for = None;

        self.order = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.visible)
            .map(|(i, _)| i)
            .collect();

        let item_width = self.config.card_width + self.config.gap;
        let viewport_width = viewport_width.max(0.0);
        if self.order.is_empty() || item_width <= 0.0 {
            self.layout = CarouselLayout {
                viewport_width,
                item_width,
                ..CarouselLayout::default()
            };
            self.set_offset(0.0);
            return RebuildOutcome::Empty;
        }

        let clone_count = (viewport_width / item_width).ceil() as usize + self.config.clone_margin;
        let content_width = item_width * self.order.len() as f64;
        let prefix_clone_width = item_width * clone_count as f64;
        self.layout = CarouselLayout {
            viewport_width,
            item_width,
            content_width,
            clone_count,
            prefix_clone_width,
            total_width: content_width + 2.0 * prefix_clone_width,
        };
        self.set_offset(prefix_clone_width);
        log::debug!(
            "carousel laid out: {} items, {} clones per side",
            self.order.len(),
            clone_count
        );
        RebuildOutcome::Built
    }

    fn set_offset(&mut self, offset: f64) {
        self.current_offset = offset;
        self.target_offset = offset;
        self.rendered_offset = offset;
    }

    fn can_scroll(&self) -> bool {
        !self.order.is_empty() && self.layout.total_width > self.layout.viewport_width
    }

    /// Queues one scroll step in the direction of `delta`. Returns false when
    /// there is nothing to scroll.
    pub fn on_scroll_input(&mut self, delta: f64) -> bool {
        if delta == 0.0 || !self.can_scroll() {
            return false;
        }
        self.target_offset += delta.signum() * self.config.scroll_step;
        self.motion = Motion::Easing;
        self.quiet_for = Some(0.0);
        true
    }

    /// One easing step. Returns true while more frames are needed.
    pub fn advance_frame(&mut self) -> bool {
        if self.motion == Motion::Idle {
            return false;
        }
        self.current_offset += (self.target_offset - self.current_offset) * self.config.easing;
        if (self.target_offset - self.current_offset).abs() < self.config.snap_threshold {
            self.current_offset = self.target_offset;
            self.motion = Motion::Idle;
        }
        self.keep_within_clones();
        self.rendered_offset = self.current_offset;
        self.motion == Motion::Easing
    }

    // A long burst of input can outrun the clone blocks before the settle
    // debounce fires. Shift by whole content widths so the viewport never
    // shows past the ends of the strip.
    fn keep_within_clones(&mut self) {
        let l = self.layout;
        if self.current_offset >= 0.0 && self.current_offset <= l.total_width - l.viewport_width {
            return;
        }
        let shifted = l.prefix_clone_width
            + (self.current_offset - l.prefix_clone_width).rem_euclid(l.content_width);
        let delta = shifted - self.current_offset;
        self.current_offset = shifted;
        self.target_offset += delta;
    }

    /// Moves a settled offset that sits in a clone block back onto the real
    /// items. Rendered content is unchanged. Returns true if it moved.
    pub fn maybe_reanchor(&mut self) -> bool {
        if self.order.is_empty() {
            return false;
        }
        let l = self.layout;
        let outside = self.current_offset < l.prefix_clone_width
            || self.current_offset > l.total_width - l.prefix_clone_width;
        if !outside {
            return false;
        }
        let relative = (self.current_offset - l.prefix_clone_width).rem_euclid(l.content_width);
        log::trace!(
            "reanchor {:.1} -> {:.1}",
            self.current_offset,
            l.prefix_clone_width + relative
        );
        // instant jump, no easing
        self.set_offset(l.prefix_clone_width + relative);
        true
    }

    /// Per-frame driver: eases, and re-anchors once input has been quiet
    /// for the settle period and the strip has stopped. Returns true if the
    /// rendered offset may have changed.
    pub fn frame(&mut self, elapsed: f64) -> bool {
        let mut changed = false;
        if self.motion == Motion::Easing {
            self.advance_frame();
            changed = true;
        }
        if let Some(quiet) = self.quiet_for.as_mut() {
            *quiet += elapsed;
            if *quiet >= self.config.settle_secs && self.motion == Motion::Idle {
                self.quiet_for = None;
                changed |= self.maybe_reanchor();
            }
        }
        changed
    }

    /// Hides real items that don't match and rebuilds from the rest.
    pub fn apply_filter(&mut self, predicate: impl Fn(&T) -> bool) -> FilterOutcome {
        for entry in &mut self.entries {
            entry.visible = predicate(&entry.item);
        }
        let viewport = self.layout.viewport_width;
        match self.relayout(viewport) {
            RebuildOutcome::Built => FilterOutcome::Matches(self.order.len()),
            RebuildOutcome::Empty => FilterOutcome::NoResults,
        }
    }

    pub fn clear_filter(&mut self) -> RebuildOutcome {
        self.entries.iter_mut().for_each(|e| e.visible = true);
        let viewport = self.layout.viewport_width;
        self.relayout(viewport)
    }

    fn slot_at(&self, index: usize) -> Slot {
        let c = self.layout.clone_count;
        let n = self.order.len();
        let kind = if index < c {
            SlotKind::Prefix
        } else if index < c + n {
            SlotKind::Real
        } else {
            SlotKind::Suffix
        };
        let real = (index as isize - c as isize).rem_euclid(n as isize) as usize;
        Slot { kind, item: self.order[real] }
    }

    pub fn slot_count(&self) -> usize {
        if self.order.is_empty() {
            0
        } else {
            self.order.len() + 2 * self.layout.clone_count
        }
    }

    /// The whole strip: prefix clones, real items, suffix clones.
    pub fn slots(&self) -> Vec<Slot> {
        (0..self.slot_count()).map(|i| self.slot_at(i)).collect()
    }

    /// Slots that intersect the viewport at the rendered offset.
    pub fn visible_slots(&self) -> Vec<PlacedSlot> {
        let count = self.slot_count();
        if count == 0 {
            return Vec::new();
        }
        let l = self.layout;
        let first = (self.rendered_offset / l.item_width).floor().max(0.0) as usize;
        let last = ((self.rendered_offset + l.viewport_width) / l.item_width).ceil() as usize;
        (first..=last.min(count - 1))
            .map(|i| PlacedSlot {
                index: i,
                slot: self.slot_at(i),
                x: i as f64 * l.item_width - self.rendered_offset,
            })
            .filter(|p| p.x + self.config.card_width > 0.0 && p.x < l.viewport_width)
            .collect()
    }

    /// Strip index of the slot under the middle of the viewport. With only a
    /// few items this is often a clone.
    pub fn centered_index(&self) -> Option<usize> {
        let count = self.slot_count();
        if count == 0 {
            return None;
        }
        let l = self.layout;
        let centre = self.rendered_offset + l.viewport_width / 2.0;
        Some(((centre / l.item_width).floor().max(0.0) as usize).min(count - 1))
    }

    /// Item under the middle of the viewport.
    pub fn centered_item(&self) -> Option<usize> {
        self.centered_index().map(|i| self.slot_at(i).item)
    }
}
