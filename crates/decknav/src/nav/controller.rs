use std::time::{Duration, Instant};

use tracing::{debug, error, trace};

use crate::deck::{Deck, DeckError, Slide};

use super::host::Host;
use super::keys::{Action, Key};

/// Width of the fixed design canvas slides are laid out on in fullscreen.
pub const DESIGN_WIDTH: f32 = 1280.0;
/// Height of the fixed design canvas slides are laid out on in fullscreen.
pub const DESIGN_HEIGHT: f32 = 720.0;
/// Time the host needs to reflow after leaving fullscreen before scroll
/// positions are meaningful again.
pub const REALIGN_DELAY: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NavEvent {
    KeyDown(Key),
    FullscreenChanged { active: bool, at: Instant },
    Resized,
    Tick(Instant),
}

/// Whether an event was acted on. For key events `Consumed` means the host's
/// default action for that key must be suppressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handled {
    Consumed,
    Ignored,
}

pub struct NavigationController<H: Host> {
    host: H,
    deck: Deck,
    current: usize,
    fullscreen: bool,
    observing_resize: bool,
    realign_at: Option<Instant>,
}

impl<H: Host> NavigationController<H> {
    pub fn new(deck: Deck, host: H) -> Result<Self, DeckError> {
        if deck.is_empty() {
            return Err(DeckError::Empty);
        }
        let mut controller = Self {
            host,
            deck,
            current: 0,
            fullscreen: false,
            observing_resize: false,
            realign_at: None,
        };
        controller.update_scale();
        controller.recompute_current_index_from_viewport();
        Ok(controller)
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn slide_count(&self) -> usize {
        self.deck.len()
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    pub fn is_observing_resize(&self) -> bool {
        self.observing_resize
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn current_slide(&self) -> &Slide {
        &self.deck.slides()[self.current]
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Borrow the deck for drawing while the host records layout.
    pub fn deck_and_host_mut(&mut self) -> (&Deck, &mut H) {
        (&self.deck, &mut self.host)
    }

    /// When the pending post-fullscreen realignment is due, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.realign_at
    }

    pub fn handle(&mut self, event: NavEvent) -> Handled {
        match event {
            NavEvent::KeyDown(key) => self.handle_key(key),
            NavEvent::FullscreenChanged { active, at } => {
                self.on_fullscreen_change(active, at);
                Handled::Consumed
            }
            NavEvent::Resized => {
                if !self.observing_resize {
                    return Handled::Ignored;
                }
                self.update_scale();
                Handled::Consumed
            }
            NavEvent::Tick(now) => self.tick(now),
        }
    }

    pub fn handle_key(&mut self, key: Key) -> Handled {
        if !self.host.has_focus() {
            return Handled::Ignored;
        }

        // Respect manual scrolling that happened since the last keypress.
        if !self.fullscreen {
            self.recompute_current_index_from_viewport();
        }

        let Some(action) = key.action() else {
            return Handled::Ignored;
        };
        trace!(?key, ?action, "key dispatch");

        match action {
            Action::Advance => self.advance(),
            Action::Retreat => self.retreat(),
            Action::ToggleFullscreen => self.toggle_fullscreen(),
            Action::First => self.go_to_slide(0),
            Action::Last => self.go_to_slide(self.deck.len() as isize - 1),
        }
        Handled::Consumed
    }

    /// Pick the slide whose top edge is closest to the viewport top.
    /// Ties go to the lowest ordinal. Does nothing in fullscreen.
    pub fn recompute_current_index_from_viewport(&mut self) {
        if self.fullscreen {
            return;
        }

        let mut min_distance = f32::INFINITY;
        for index in 0..self.deck.len() {
            let Some(top) = self.host.slide_top(index) else {
                continue;
            };
            let distance = top.abs();
            if distance < min_distance {
                min_distance = distance;
                self.current = index;
            }
        }
        self.render();
    }

    /// Write the active flag and number text onto every slide.
    pub fn render(&mut self) {
        let current = self.current;
        for slide in self.deck.slides_mut() {
            let ordinal = slide.ordinal();
            slide.active = ordinal == current;
            if let Some(number) = slide.number.as_mut() {
                number.clear();
                if ordinal > 0 {
                    number.push_str(&(ordinal + 1).to_string());
                }
            }
        }
    }

    pub fn go_to_slide(&mut self, index: isize) {
        if index < 0 || index as usize >= self.deck.len() {
            trace!(index, "navigation target out of range");
            return;
        }
        let index = index as usize;
        debug!(from = self.current, to = index, "go to slide");
        self.current = index;
        self.render();

        // In fullscreen the active flag alone decides what is shown.
        if !self.fullscreen {
            self.host.scroll_into_view(index);
        }
    }

    /// Reveal the next hidden fragment, or move to the next slide.
    pub fn advance(&mut self) {
        let current = self.current;
        if let Some(slide) = self.deck.get_mut(current) {
            if let Some((n, fragment)) = slide
                .fragments
                .iter_mut()
                .enumerate()
                .find(|(_, f)| !f.visible)
            {
                fragment.visible = true;
                debug!(slide = current, fragment = n, "reveal fragment");
                return;
            }
        }
        self.go_to_slide(current as isize + 1);
    }

    /// Hide the last visible fragment, or move to the previous slide.
    pub fn retreat(&mut self) {
        let current = self.current;
        if let Some(slide) = self.deck.get_mut(current) {
            if let Some((n, fragment)) = slide
                .fragments
                .iter_mut()
                .enumerate()
                .rev()
                .find(|(_, f)| f.visible)
            {
                fragment.visible = false;
                debug!(slide = current, fragment = n, "hide fragment");
                return;
            }
        }
        self.go_to_slide(current as isize - 1);
    }

    /// Ask the host to enter or leave fullscreen. The mode flag only changes once
    /// the host reports the change back.
    pub fn toggle_fullscreen(&mut self) {
        if !self.host.is_fullscreen() {
            if let Err(err) = self.host.request_fullscreen() {
                error!(%err, "fullscreen request failed");
            }
        } else {
            self.host.exit_fullscreen();
        }
    }

    pub fn on_fullscreen_change(&mut self, active: bool, at: Instant) {
        debug!(active, "fullscreen changed");
        if active {
            self.fullscreen = true;
            self.realign_at = None;
            self.update_scale();
            self.observing_resize = true;
            self.render();
        } else {
            self.fullscreen = false;
            self.observing_resize = false;
            self.update_scale();
            self.realign_at = Some(at + REALIGN_DELAY);
        }
    }

    pub fn update_scale(&mut self) {
        if !self.fullscreen {
            self.host.set_scale_factor(None);
            return;
        }
        let size = self.host.viewport_size();
        let scale = (size.width / DESIGN_WIDTH).min(size.height / DESIGN_HEIGHT);
        trace!(scale, width = size.width, height = size.height, "update scale");
        self.host.set_scale_factor(Some(scale));
    }

    fn tick(&mut self, now: Instant) -> Handled {
        match self.realign_at {
            Some(due) if due <= now => {
                self.realign_at = None;
                self.go_to_slide(self.current as isize);
                Handled::Consumed
            }
            _ => Handled::Ignored,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::Fragment;
    use crate::nav::host::{FullscreenError, Size};

    const SLIDE_HEIGHT: f32 = 720.0;

    struct MockHost {
        tops: Vec<Option<f32>>,
        size: Size,
        focus: bool,
        fullscreen: bool,
        deny_fullscreen: bool,
        fullscreen_requests: usize,
        exit_requests: usize,
        scrolls: Vec<usize>,
        scale: Option<f32>,
    }

    impl MockHost {
        /// Slides stacked at `SLIDE_HEIGHT` intervals, scrolled so `at` is on top.
        fn stacked(count: usize, at: usize) -> Self {
            let mut host = Self {
                tops: vec![None; count],
                size: Size::new(1280.0, 720.0),
                focus: true,
                fullscreen: false,
                deny_fullscreen: false,
                fullscreen_requests: 0,
                exit_requests: 0,
                scrolls: Vec::new(),
                scale: None,
            };
            host.scroll_to(at);
            host
        }

        fn scroll_to(&mut self, index: usize) {
            for (i, top) in self.tops.iter_mut().enumerate() {
                *top = Some((i as f32 - index as f32) * SLIDE_HEIGHT);
            }
        }
    }

    impl Host for MockHost {
        fn slide_top(&self, index: usize) -> Option<f32> {
            self.tops.get(index).copied().flatten()
        }

        fn viewport_size(&self) -> Size {
            self.size
        }

        fn has_focus(&self) -> bool {
            self.focus
        }

        fn is_fullscreen(&self) -> bool {
            self.fullscreen
        }

        fn request_fullscreen(&mut self) -> Result<(), FullscreenError> {
            self.fullscreen_requests += 1;
            if self.deny_fullscreen {
                return Err(FullscreenError::Denied("not allowed".into()));
            }
            Ok(())
        }

        fn exit_fullscreen(&mut self) {
            self.exit_requests += 1;
        }

        fn scroll_into_view(&mut self, index: usize) {
            self.scrolls.push(index);
            self.scroll_to(index);
        }

        fn set_scale_factor(&mut self, scale: Option<f32>) {
            self.scale = scale;
        }
    }

    fn plain_deck(count: usize) -> Deck {
        Deck::from_slides(
            (0..count)
                .map(|i| Slide::new(Some(format!("Slide {i}")), vec![], vec![]))
                .collect(),
        )
    }

    fn deck_with_fragments() -> Deck {
        Deck::from_slides(vec![
            Slide::new(Some("intro".into()), vec![], vec![]),
            Slide::new(
                Some("points".into()),
                vec![],
                vec![Fragment::new("F0"), Fragment::new("F1"), Fragment::new("F2")],
            ),
            Slide::new(Some("end".into()), vec![], vec![]),
        ])
    }

    fn controller(count: usize, at: usize) -> NavigationController<MockHost> {
        NavigationController::new(plain_deck(count), MockHost::stacked(count, at)).unwrap()
    }

    fn numbers(c: &NavigationController<MockHost>) -> Vec<Option<String>> {
        c.deck().slides().iter().map(|s| s.number.clone()).collect()
    }

    fn visible(c: &NavigationController<MockHost>, slide: usize) -> Vec<bool> {
        c.deck().slides()[slide]
            .fragments
            .iter()
            .map(|f| f.visible)
            .collect()
    }

    fn enter_fullscreen(c: &mut NavigationController<MockHost>) {
        c.host_mut().fullscreen = true;
        c.handle(NavEvent::FullscreenChanged {
            active: true,
            at: Instant::now(),
        });
    }

    #[test]
    fn test_empty_deck_rejected() {
        let result = NavigationController::new(Deck::default(), MockHost::stacked(0, 0));
        assert!(matches!(result, Err(DeckError::Empty)));
    }

    #[test]
    fn test_initial_index_from_viewport() {
        let c = controller(5, 3);
        assert_eq!(c.current_index(), 3);
        assert_eq!(c.deck().active_indices(), vec![3]);
        assert_eq!(c.host().scale, None);
    }

    #[test]
    fn test_initial_index_without_layout() {
        let mut host = MockHost::stacked(3, 0);
        host.tops = vec![None; 3];
        let c = NavigationController::new(plain_deck(3), host).unwrap();
        assert_eq!(c.current_index(), 0);
        assert_eq!(c.deck().active_indices(), vec![0]);
    }

    #[test]
    fn test_nearest_slide_wins_and_ties_go_first() {
        let mut host = MockHost::stacked(4, 0);
        host.tops = vec![Some(-500.0), Some(-40.0), Some(40.0), Some(600.0)];
        let c = NavigationController::new(plain_deck(4), host).unwrap();
        assert_eq!(c.current_index(), 1);
    }

    #[test]
    fn test_go_to_slide_in_range() {
        let mut c = controller(4, 0);
        for i in 0..4 {
            c.go_to_slide(i as isize);
            assert_eq!(c.current_index(), i);
            assert_eq!(c.deck().active_indices(), vec![i]);
            let expected = if i == 0 {
                String::new()
            } else {
                (i + 1).to_string()
            };
            assert_eq!(c.deck().slides()[i].number.as_deref(), Some(expected.as_str()));
        }
        assert_eq!(numbers(&c)[0].as_deref(), Some(""));
    }

    #[test]
    fn test_go_to_slide_scrolls_outside_fullscreen() {
        let mut c = controller(3, 0);
        c.go_to_slide(2);
        assert_eq!(c.host().scrolls, vec![2]);
    }

    #[test]
    fn test_go_to_slide_out_of_range_is_noop() {
        let mut c = controller(3, 1);
        let before = numbers(&c);
        c.go_to_slide(-1);
        c.go_to_slide(3);
        c.go_to_slide(100);
        assert_eq!(c.current_index(), 1);
        assert_eq!(c.deck().active_indices(), vec![1]);
        assert_eq!(numbers(&c), before);
        assert!(c.host().scrolls.is_empty());
    }

    #[test]
    fn test_slide_without_number_element_stays_bare() {
        let deck = Deck::from_slides(vec![
            Slide::new(None, vec![], vec![]),
            Slide::new(None, vec![], vec![]).without_number(),
            Slide::new(None, vec![], vec![]),
        ]);
        let mut c = NavigationController::new(deck, MockHost::stacked(3, 0)).unwrap();
        c.go_to_slide(1);
        assert_eq!(numbers(&c), vec![Some(String::new()), None, Some("3".into())]);
    }

    #[test]
    fn test_advance_reveals_fragments_in_order() {
        let deck = deck_with_fragments();
        let mut c = NavigationController::new(deck, MockHost::stacked(3, 1)).unwrap();
        assert_eq!(c.current_index(), 1);

        c.advance();
        assert_eq!(visible(&c, 1), vec![true, false, false]);
        c.advance();
        assert_eq!(visible(&c, 1), vec![true, true, false]);
        c.advance();
        assert_eq!(visible(&c, 1), vec![true, true, true]);
        assert_eq!(c.current_index(), 1);

        c.advance();
        assert_eq!(c.current_index(), 2);
    }

    #[test]
    fn test_retreat_hides_fragments_in_reverse() {
        let mut deck = deck_with_fragments();
        for f in &mut deck.get_mut(1).unwrap().fragments {
            f.visible = true;
        }
        let mut c = NavigationController::new(deck, MockHost::stacked(3, 1)).unwrap();

        c.retreat();
        assert_eq!(visible(&c, 1), vec![true, true, false]);
        c.retreat();
        assert_eq!(visible(&c, 1), vec![true, false, false]);
        c.retreat();
        assert_eq!(visible(&c, 1), vec![false, false, false]);
        assert_eq!(c.current_index(), 1);

        c.retreat();
        assert_eq!(c.current_index(), 0);
    }

    #[test]
    fn test_fragment_state_survives_navigation() {
        let mut c =
            NavigationController::new(deck_with_fragments(), MockHost::stacked(3, 1)).unwrap();
        c.advance();
        c.go_to_slide(0);
        c.go_to_slide(1);
        assert_eq!(visible(&c, 1), vec![true, false, false]);
    }

    #[test]
    fn test_advance_past_last_slide_is_noop() {
        let mut c = controller(3, 2);
        c.advance();
        assert_eq!(c.current_index(), 2);
        c.go_to_slide(0);
        c.retreat();
        assert_eq!(c.current_index(), 0);
    }

    #[test]
    fn test_recompute_is_noop_in_fullscreen() {
        let mut c = controller(5, 0);
        enter_fullscreen(&mut c);
        c.go_to_slide(3);
        c.host_mut().scroll_to(1);
        c.recompute_current_index_from_viewport();
        assert_eq!(c.current_index(), 3);
    }

    #[test]
    fn test_fullscreen_navigation_does_not_scroll() {
        let mut c = controller(3, 0);
        enter_fullscreen(&mut c);
        c.handle_key(Key::ArrowRight);
        assert_eq!(c.current_index(), 1);
        assert_eq!(c.deck().active_indices(), vec![1]);
        assert!(c.host().scrolls.is_empty());
    }

    #[test]
    fn test_entering_fullscreen_applies_scale() {
        let mut c = controller(3, 0);
        c.host_mut().size = Size::new(1920.0, 1200.0);
        enter_fullscreen(&mut c);
        assert!(c.is_fullscreen());
        assert!(c.is_observing_resize());
        assert_eq!(c.host().scale, Some(1.5));
    }

    #[test]
    fn test_resize_rescales_only_while_observing() {
        let mut c = controller(3, 0);
        c.host_mut().size = Size::new(640.0, 720.0);
        assert_eq!(c.handle(NavEvent::Resized), Handled::Ignored);
        assert_eq!(c.host().scale, None);

        enter_fullscreen(&mut c);
        assert_eq!(c.host().scale, Some(0.5));
        c.host_mut().size = Size::new(2560.0, 720.0);
        assert_eq!(c.handle(NavEvent::Resized), Handled::Consumed);
        assert_eq!(c.host().scale, Some(1.0));
        c.host_mut().size = Size::new(128.0, 36.0);
        c.handle(NavEvent::Resized);
        assert_eq!(c.host().scale, Some(0.05));
    }

    #[test]
    fn test_exiting_fullscreen_clears_scale_and_realigns_after_delay() {
        let mut c = controller(5, 0);
        enter_fullscreen(&mut c);
        c.go_to_slide(3);
        assert!(c.host().scrolls.is_empty());

        let exited = Instant::now();
        c.host_mut().fullscreen = false;
        c.host_mut().scroll_to(0);
        c.handle(NavEvent::FullscreenChanged {
            active: false,
            at: exited,
        });
        assert!(!c.is_fullscreen());
        assert!(!c.is_observing_resize());
        assert_eq!(c.host().scale, None);
        assert_eq!(c.next_deadline(), Some(exited + REALIGN_DELAY));

        assert_eq!(c.handle(NavEvent::Tick(exited)), Handled::Ignored);
        assert!(c.host().scrolls.is_empty());

        assert_eq!(
            c.handle(NavEvent::Tick(exited + REALIGN_DELAY)),
            Handled::Consumed
        );
        assert_eq!(c.host().scrolls, vec![3]);
        assert_eq!(c.next_deadline(), None);
        assert_eq!(c.current_index(), 3);
    }

    #[test]
    fn test_reentering_fullscreen_cancels_realign() {
        let mut c = controller(3, 0);
        let now = Instant::now();
        c.handle(NavEvent::FullscreenChanged {
            active: false,
            at: now,
        });
        enter_fullscreen(&mut c);
        assert_eq!(c.next_deadline(), None);
        c.handle(NavEvent::Tick(now + REALIGN_DELAY * 2));
        assert!(c.host().scrolls.is_empty());
    }

    #[test]
    fn test_toggle_fullscreen_requests_without_changing_mode() {
        let mut c = controller(3, 0);
        assert_eq!(c.handle_key(Key::Char('f')), Handled::Consumed);
        assert_eq!(c.host().fullscreen_requests, 1);
        assert!(!c.is_fullscreen());

        c.host_mut().fullscreen = true;
        c.handle_key(Key::Char('F'));
        assert_eq!(c.host().exit_requests, 1);
    }

    #[test]
    fn test_denied_fullscreen_is_ignored() {
        let mut c = controller(3, 1);
        c.host_mut().deny_fullscreen = true;
        c.toggle_fullscreen();
        assert_eq!(c.host().fullscreen_requests, 1);
        assert!(!c.is_fullscreen());
        assert_eq!(c.current_index(), 1);
        assert_eq!(c.host().scale, None);
    }

    #[test]
    fn test_keys_ignored_without_focus() {
        let mut c = controller(3, 0);
        c.host_mut().focus = false;
        assert_eq!(c.handle_key(Key::ArrowRight), Handled::Ignored);
        assert_eq!(c.current_index(), 0);
    }

    #[test]
    fn test_unmapped_key_still_resyncs() {
        let mut c = controller(4, 0);
        c.host_mut().scroll_to(2);
        assert_eq!(c.handle_key(Key::Char('x')), Handled::Ignored);
        assert_eq!(c.current_index(), 2);
    }

    #[test]
    fn test_keydown_resyncs_after_manual_scroll() {
        let mut c = controller(5, 0);
        c.host_mut().scroll_to(3);
        c.handle_key(Key::Space);
        assert_eq!(c.current_index(), 4);
    }

    #[test]
    fn test_home_end_and_arrow_left() {
        let mut c = controller(5, 2);
        assert_eq!(c.current_index(), 2);

        assert_eq!(c.handle(NavEvent::KeyDown(Key::Home)), Handled::Consumed);
        assert_eq!(c.deck().active_indices(), vec![0]);
        assert_eq!(c.deck().slides()[0].number.as_deref(), Some(""));

        c.handle(NavEvent::KeyDown(Key::End));
        assert_eq!(c.deck().active_indices(), vec![4]);
        assert_eq!(c.deck().slides()[4].number.as_deref(), Some("5"));

        c.handle(NavEvent::KeyDown(Key::ArrowLeft));
        assert_eq!(c.deck().active_indices(), vec![3]);
        assert_eq!(c.deck().slides()[3].number.as_deref(), Some("4"));
    }
}
