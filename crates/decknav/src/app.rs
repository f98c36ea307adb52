use anyhow::Context as _;
use eframe::egui;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info};

use crate::config::{Config, StartMode};
use crate::deck::{Deck, Slide};
use crate::nav::{
    DESIGN_HEIGHT, DESIGN_WIDTH, FullscreenError, Handled, Host, Key, NavEvent,
    NavigationController, Size,
};
use crate::parser;
use crate::theme::Theme;

const SLIDE_MARGIN: f32 = 32.0;
const MIN_SLIDE_WIDTH: f32 = 160.0;

/// The window side of navigation: geometry recorded from the last frame and
/// requests queued for the next one.
pub struct WindowHost {
    slide_tops: Vec<Option<f32>>,
    viewport: Size,
    focused: bool,
    fullscreen: bool,
    fullscreen_supported: bool,
    scroll_target: Option<usize>,
    scale_factor: Option<f32>,
    commands: Vec<egui::ViewportCommand>,
}

impl WindowHost {
    pub fn new(slide_count: usize) -> Self {
        Self {
            slide_tops: vec![None; slide_count],
            viewport: Size::new(DESIGN_WIDTH, DESIGN_HEIGHT),
            focused: true,
            fullscreen: false,
            fullscreen_supported: true,
            scroll_target: None,
            scale_factor: None,
            commands: Vec::new(),
        }
    }

    pub fn scale_factor(&self) -> Option<f32> {
        self.scale_factor
    }

    fn take_commands(&mut self) -> Vec<egui::ViewportCommand> {
        std::mem::take(&mut self.commands)
    }
}

impl Host for WindowHost {
    fn slide_top(&self, index: usize) -> Option<f32> {
        self.slide_tops.get(index).copied().flatten()
    }

    fn viewport_size(&self) -> Size {
        self.viewport
    }

    fn has_focus(&self) -> bool {
        self.focused
    }

    fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    fn request_fullscreen(&mut self) -> Result<(), FullscreenError> {
        if !self.fullscreen_supported {
            return Err(FullscreenError::Unsupported);
        }
        self.commands.push(egui::ViewportCommand::Fullscreen(true));
        Ok(())
    }

    fn exit_fullscreen(&mut self) {
        self.commands.push(egui::ViewportCommand::Fullscreen(false));
    }

    fn scroll_into_view(&mut self, index: usize) {
        self.scroll_target = Some(index);
    }

    fn set_scale_factor(&mut self, scale: Option<f32>) {
        self.scale_factor = scale;
    }
}

struct PresentationApp {
    nav: NavigationController<WindowHost>,
    theme: Theme,
}

impl PresentationApp {
    fn new(deck: Deck, theme: Theme) -> anyhow::Result<Self> {
        let host = WindowHost::new(deck.len());
        let nav = NavigationController::new(deck, host)?;
        Ok(Self { nav, theme })
    }

    /// Feed this frame's input to the controller. Returns `false` when the
    /// window should close.
    fn process_input(&mut self, ctx: &egui::Context, now: Instant) -> bool {
        let (keys, focused, fullscreen, inner_rect) = ctx.input(|i| {
            let keys: Vec<(egui::Key, egui::Modifiers)> = i
                .events
                .iter()
                .filter_map(|e| match e {
                    egui::Event::Key {
                        key,
                        pressed: true,
                        modifiers,
                        ..
                    } => Some((*key, *modifiers)),
                    _ => None,
                })
                .collect();
            let viewport = i.viewport();
            (keys, i.focused, viewport.fullscreen, viewport.inner_rect)
        });

        if keys.iter().any(|(k, _)| *k == egui::Key::Q) {
            return false;
        }

        let host = self.nav.host_mut();
        host.focused = focused;
        host.fullscreen_supported = fullscreen.is_some();

        let is_fullscreen = fullscreen.unwrap_or(false);
        if is_fullscreen != host.fullscreen {
            host.fullscreen = is_fullscreen;
            self.nav.handle(NavEvent::FullscreenChanged {
                active: is_fullscreen,
                at: now,
            });
        }

        if let Some(rect) = inner_rect {
            let size = Size::new(rect.width(), rect.height());
            let host = self.nav.host_mut();
            if size != host.viewport {
                host.viewport = size;
                self.nav.handle(NavEvent::Resized);
            }
        }

        let mut consumed = Vec::new();
        for (key, modifiers) in keys {
            let event = NavEvent::KeyDown(translate_key(key, modifiers));
            if self.nav.handle(event) == Handled::Consumed {
                consumed.push(key);
            }
        }
        if !consumed.is_empty() {
            // Keep the scroll area from also acting on keys we handled.
            ctx.input_mut(|i| {
                i.events.retain(|e| {
                    !matches!(e, egui::Event::Key { key, pressed: true, .. } if consumed.contains(key))
                });
            });
        }

        self.nav.handle(NavEvent::Tick(now));
        true
    }

    fn show_scroll_mode(&mut self, ui: &mut egui::Ui) {
        let theme = &self.theme;
        let (deck, host) = self.nav.deck_and_host_mut();

        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                let viewport_top = ui.clip_rect().top();
                let width = (ui.available_width() - SLIDE_MARGIN * 2.0).max(MIN_SLIDE_WIDTH);
                let height = width * DESIGN_HEIGHT / DESIGN_WIDTH;

                ui.vertical_centered(|ui| {
                    ui.add_space(SLIDE_MARGIN);
                    for slide in deck.slides() {
                        let (rect, _) = ui
                            .allocate_exact_size(egui::vec2(width, height), egui::Sense::hover());
                        host.slide_tops[slide.ordinal()] = Some(rect.top() - viewport_top);
                        if host.scroll_target == Some(slide.ordinal()) {
                            ui.scroll_to_rect(rect, Some(egui::Align::TOP));
                            host.scroll_target = None;
                        }
                        if ui.is_rect_visible(rect) {
                            draw_slide(ui.painter(), slide, theme, rect, width / DESIGN_WIDTH, true);
                        }
                        ui.add_space(SLIDE_MARGIN);
                    }
                });
            });
    }

    fn show_fullscreen_mode(&self, ui: &egui::Ui) {
        let area = ui.max_rect();
        let scale = self.nav.host().scale_factor().unwrap_or_else(|| {
            (area.width() / DESIGN_WIDTH).min(area.height() / DESIGN_HEIGHT)
        });
        let rect = egui::Rect::from_center_size(
            area.center(),
            egui::vec2(DESIGN_WIDTH * scale, DESIGN_HEIGHT * scale),
        );
        // Only the slide carrying the active flag is shown.
        if let Some(slide) = self.nav.deck().slides().iter().find(|s| s.active) {
            draw_slide(ui.painter(), slide, &self.theme, rect, scale, false);
        }
    }
}

impl eframe::App for PresentationApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        if !self.process_input(ctx, now) {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            return;
        }

        // Viewport commands go out after the input closure has released its lock.
        for command in self.nav.host_mut().take_commands() {
            debug!(?command, "viewport command");
            ctx.send_viewport_cmd(command);
        }

        egui::CentralPanel::default()
            .frame(
                egui::Frame::new()
                    .fill(self.theme.background)
                    .inner_margin(0.0),
            )
            .show(ctx, |ui| {
                if self.nav.is_fullscreen() {
                    self.show_fullscreen_mode(ui);
                } else {
                    self.show_scroll_mode(ui);
                }
            });

        if let Some(due) = self.nav.next_deadline() {
            ctx.request_repaint_after(due.saturating_duration_since(now));
        }
    }
}

pub fn translate_key(key: egui::Key, modifiers: egui::Modifiers) -> Key {
    match key {
        egui::Key::ArrowRight => Key::ArrowRight,
        egui::Key::ArrowDown => Key::ArrowDown,
        egui::Key::ArrowLeft => Key::ArrowLeft,
        egui::Key::ArrowUp => Key::ArrowUp,
        egui::Key::Space => Key::Space,
        egui::Key::Enter => Key::Enter,
        egui::Key::Backspace => Key::Backspace,
        egui::Key::PageDown => Key::PageDown,
        egui::Key::PageUp => Key::PageUp,
        egui::Key::Home => Key::Home,
        egui::Key::End => Key::End,
        egui::Key::F if modifiers.shift => Key::Char('F'),
        egui::Key::F => Key::Char('f'),
        _ => Key::Other,
    }
}

/// Draw a slide scaled from the design canvas into `rect`.
fn draw_slide(
    painter: &egui::Painter,
    slide: &Slide,
    theme: &Theme,
    rect: egui::Rect,
    scale: f32,
    outline_active: bool,
) {
    let painter = painter.with_clip_rect(rect);
    painter.rect_filled(rect, 8.0 * scale, theme.slide_background);
    if outline_active && slide.active {
        painter.rect_stroke(
            rect,
            8.0 * scale,
            egui::Stroke::new(3.0, theme.accent),
            egui::StrokeKind::Inside,
        );
    }

    let padding = 64.0 * scale;
    let wrap_width = rect.width() - padding * 2.0;
    let left = rect.left() + padding;
    let mut y = rect.top() + padding;

    let text = |text: String, size: f32, color: egui::Color32, y: &mut f32| {
        let galley = painter.layout(text, egui::FontId::proportional(size), color, wrap_width);
        let height = galley.rect.height();
        painter.galley(egui::pos2(left, *y), galley, color);
        *y += height + 10.0 * scale;
    };

    if let Some(title) = &slide.title {
        text(
            title.clone(),
            theme.title_size * scale,
            theme.heading_color,
            &mut y,
        );
        y += 16.0 * scale;
    }
    for line in &slide.lines {
        if line.is_empty() {
            y += theme.body_size * scale * 0.5;
            continue;
        }
        text(line.clone(), theme.body_size * scale, theme.foreground, &mut y);
    }
    let fragment_color = Theme::with_opacity(theme.accent, 0.95);
    for fragment in slide.visible_fragments() {
        text(
            format!("\u{2022} {}", fragment.text),
            theme.body_size * scale,
            fragment_color,
            &mut y,
        );
    }

    if let Some(number) = slide.number.as_deref().filter(|n| !n.is_empty()) {
        let galley = painter.layout_no_wrap(
            number.to_string(),
            egui::FontId::proportional(theme.number_size * scale),
            theme.muted,
        );
        let pos = rect.right_bottom()
            - egui::vec2(padding * 0.5 + galley.rect.width(), padding * 0.5 + galley.rect.height());
        painter.galley(pos, galley, theme.muted);
    }
}

pub fn run(file: PathBuf, start_mode: Option<StartMode>) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(&file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let deck = parser::parse(&content);

    if deck.is_empty() {
        anyhow::bail!("No slides found in {}", file.display());
    }

    let config = Config::load_or_default();
    let start_mode = start_mode.unwrap_or_else(|| config.start_mode());
    let theme_name = deck.theme.as_deref().or(config.theme()).unwrap_or("light");
    let theme = Theme::from_name(theme_name);

    let title = deck.title.clone().unwrap_or_else(|| {
        format!(
            "decknav \u{2014} {}",
            file.file_name().unwrap_or_default().to_string_lossy()
        )
    });
    info!(slides = deck.len(), %start_mode, theme = %theme.name, "opening deck");

    let viewport = match start_mode {
        StartMode::Windowed => egui::ViewportBuilder::default()
            .with_inner_size([DESIGN_WIDTH, DESIGN_HEIGHT])
            .with_title(&title),
        StartMode::Fullscreen => egui::ViewportBuilder::default()
            .with_fullscreen(true)
            .with_title(&title),
    };

    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    eframe::run_native(
        &title,
        options,
        Box::new(move |_cc| {
            let app = PresentationApp::new(deck, theme)?;
            Ok(Box::new(app))
        }),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}
