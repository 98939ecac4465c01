use std::sync::Arc;
use std::time::Instant;

use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind,
};
use pixmorph_config::{AppConfig, SourceKind};
use pixmorph_core::{ConfigOverride, EffectConfig, EffectError, Rgba};
use pixmorph_effect::{Effect, EffectRoot, ImageSampler, Sampler, TextSampler, TransitionTicket};
use pixmorph_render::SurfaceWidget;
use ratatui::{
    DefaultTerminal, Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Stylize},
    text::Line,
};
use tracing::{debug, info, warn};

use crate::pointer::TerminalPointer;

/// Uniform colours cycled with `c`. `None` keeps each particle's sampled
/// colour.
const PALETTE: [Option<Rgba>; 5] = [
    None,
    Some(Rgba::LINEN),
    Some(Rgba::rgb(255, 105, 97)),
    Some(Rgba::rgb(119, 221, 119)),
    Some(Rgba::rgb(132, 182, 244)),
];

/// The main application which holds the state and logic of the application.
pub struct App {
    /// Is the application running?
    running: bool,
    config: AppConfig,
    /// Sources cycled by the slideshow.
    sources: Vec<String>,
    /// Index into `sources` of the source on screen.
    current: usize,
    /// Created once the terminal size is known and rebuilt on resize.
    effect: Option<Effect>,
    /// Config of an effect torn down while the terminal had no room for it.
    parked: Option<EffectConfig>,
    /// Area of the effect, in cells.
    effect_area: Rect,
    sampler: Arc<dyn Sampler>,
    pointer: Arc<TerminalPointer>,
    /// Background transitions whose outcome has not been seen yet.
    pending: Vec<TransitionTicket>,
    last_switch: Instant,
    palette_index: usize,
    /// Last error shown in place of the help line.
    status: Option<String>,
}

impl App {
    /// Construct a new instance of [`App`]. Command-line sources take
    /// precedence over the configured ones.
    pub fn new(config: AppConfig, args: Vec<String>) -> Self {
        let sources = resolve_sources(args, &config);
        let sampler: Arc<dyn Sampler> = match config.source_kind {
            SourceKind::Text => Arc::new(TextSampler::new(config.text)),
            SourceKind::Image => Arc::new(ImageSampler::new(config.image.auto_fit)),
        };
        let palette_index = config
            .effect
            .color
            .as_deref()
            .and_then(|c| c.parse::<Rgba>().ok())
            .and_then(|c| PALETTE.iter().position(|p| *p == Some(c)))
            .unwrap_or(0);

        Self {
            running: false,
            config,
            sources,
            current: 0,
            effect: None,
            parked: None,
            effect_area: Rect::default(),
            sampler,
            pointer: Arc::new(TerminalPointer),
            pending: Vec::new(),
            last_switch: Instant::now(),
            palette_index,
            status: None,
        }
    }

    /// Run the application's main loop.
    pub fn run(mut self, mut terminal: DefaultTerminal) -> color_eyre::Result<()> {
        let size = terminal.size()?;
        self.rebuild(Rect::new(0, 0, size.width, size.height))?;

        self.running = true;
        while self.running {
            self.tick()?;
            terminal.draw(|frame| self.render(frame))?;
            self.handle_crossterm_events()?;
        }
        Ok(())
    }

    /// Create the effect for a terminal of `area` and start rendering the
    /// current source.
    fn rebuild(&mut self, area: Rect) -> color_eyre::Result<()> {
        let [effect_area, _] = layout(area);
        self.effect_area = effect_area;

        // The old effect has to release mouse capture before the new one
        // takes it.
        let previous = self
            .effect
            .take()
            .map(|e| e.config().clone())
            .or_else(|| self.parked.take());
        if effect_area.is_empty() {
            info!("no room for the effect in {}x{}", area.width, area.height);
            self.parked = previous;
            return Ok(());
        }
        let config = match previous {
            Some(config) => EffectConfig {
                source: String::new(),
                ..config
            },
            None => {
                let mut config = self.config.effect_config()?;
                config.color = PALETTE[self.palette_index].or(config.color);
                config
            }
        };

        let mut effect = Effect::new(
            EffectRoot::Container(effect_area),
            config,
            Arc::clone(&self.sampler),
        )?
        .with_pointer_host(self.pointer.clone());
        info!("effect area {}x{} cells", effect_area.width, effect_area.height);

        if let Some(source) = self.sources.get(self.current) {
            if let Err(err) = effect.render(Some(source)) {
                warn!("cannot render `{source}`: {err}");
                self.status = Some(err.to_string());
            }
        }
        self.effect = Some(effect);
        self.last_switch = Instant::now();
        Ok(())
    }

    /// Advance the slideshow and the particles by one frame.
    fn tick(&mut self) -> color_eyre::Result<()> {
        if let Some(interval) = self.config.switch_interval() {
            if self.sources.len() > 1 && self.last_switch.elapsed() >= interval {
                self.next_source();
            }
        }

        if let Some(effect) = self.effect.as_mut() {
            effect.frame()?;
        }

        if let Some(err) = settle(&mut self.pending) {
            self.status = Some(err);
        }
        Ok(())
    }

    /// Renders the user interface.
    fn render(&mut self, frame: &mut Frame) {
        let [effect_area, help_area] = layout(frame.area());

        if let Some(effect) = &self.effect {
            frame.render_widget(SurfaceWidget::new(effect.surface()), effect_area);
        }

        if let Some(status) = &self.status {
            frame.render_widget(Line::from(status.as_str()).red().centered(), help_area);
            return;
        }

        let Rgba { r, g, b, .. } = PALETTE[self.palette_index].unwrap_or(Rgba::LINEN);
        let color = Color::Rgb(r, g, b);
        let help = Line::from(vec![
            "q".bold().fg(color),
            " quit  ".dark_gray(),
            "n".bold().fg(color),
            " next  ".dark_gray(),
            "m".bold().fg(color),
            " mouse  ".dark_gray(),
            "e".bold().fg(color),
            " easing  ".dark_gray(),
            "c".bold().fg(color),
            " cycle color".dark_gray(),
        ])
        .centered();
        frame.render_widget(help, help_area);
    }

    /// Reads the crossterm events and updates the state of [`App`].
    /// Polls for at most one frame interval so the animation keeps moving.
    fn handle_crossterm_events(&mut self) -> color_eyre::Result<()> {
        if event::poll(self.config.frame_interval())? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => self.on_key_event(key),
                Event::Mouse(mouse) => self.on_mouse_event(mouse),
                Event::FocusLost => self.with_effect(Effect::pointer_left),
                Event::Resize(width, height) => self.rebuild(Rect::new(0, 0, width, height))?,
                _ => {}
            }
        }
        Ok(())
    }

    /// Handles the key events and updates the state of [`App`].
    fn on_key_event(&mut self, key: KeyEvent) {
        match (key.modifiers, key.code) {
            (_, KeyCode::Esc | KeyCode::Char('q'))
            | (KeyModifiers::CONTROL, KeyCode::Char('c') | KeyCode::Char('C')) => self.quit(),
            (_, KeyCode::Char('n')) => self.next_source(),
            (_, KeyCode::Char('m')) => self.toggle_mouse_circle(),
            (_, KeyCode::Char('e')) => self.toggle_easing(),
            (_, KeyCode::Char('c')) => self.cycle_color(),
            _ => {}
        }
    }

    fn on_mouse_event(&mut self, mouse: MouseEvent) {
        if !matches!(mouse.kind, MouseEventKind::Moved | MouseEventKind::Drag(_)) {
            return;
        }
        match pointer_position(mouse.column, mouse.row, self.effect_area) {
            Some((x, y)) => self.with_effect(|effect| effect.pointer_moved(x, y)),
            None => self.with_effect(Effect::pointer_left),
        }
    }

    /// Move on to the next source, morphing in the background.
    fn next_source(&mut self) {
        self.last_switch = Instant::now();
        if self.sources.is_empty() {
            return;
        }
        self.current = (self.current + 1) % self.sources.len();
        let source = &self.sources[self.current];
        let duration = self.config.transition_time();

        let Some(effect) = self.effect.as_mut() else {
            return;
        };
        match effect.transition_in_background(source, duration, None) {
            Ok(ticket) => {
                self.status = None;
                self.pending.push(ticket);
            }
            Err(err) => {
                warn!("cannot switch to `{source}`: {err}");
                self.status = Some(err.to_string());
            }
        }
    }

    fn toggle_mouse_circle(&mut self) {
        self.with_effect(|effect| {
            let show = !effect.config().show_mouse_circle;
            effect.update_config(ConfigOverride {
                show_mouse_circle: Some(show),
                ..ConfigOverride::default()
            });
        });
    }

    fn toggle_easing(&mut self) {
        self.with_effect(|effect| {
            let continuous = !effect.config().enable_continuous_easing;
            effect.update_config(ConfigOverride {
                enable_continuous_easing: Some(continuous),
                ..ConfigOverride::default()
            });
        });
    }

    /// Cycle the uniform colour. Takes effect on the next sampled source.
    fn cycle_color(&mut self) {
        self.palette_index = (self.palette_index + 1) % PALETTE.len();
        let color = PALETTE[self.palette_index];
        if let Some(parked) = self.parked.as_mut() {
            parked.color = color;
        }
        self.with_effect(|effect| {
            effect.update_config(ConfigOverride {
                color: Some(color),
                ..ConfigOverride::default()
            });
        });
    }

    fn with_effect(&mut self, f: impl FnOnce(&mut Effect)) {
        if let Some(effect) = self.effect.as_mut() {
            f(effect);
        }
    }

    /// Set running to false to quit the application.
    fn quit(&mut self) {
        self.running = false;
    }
}

/// Drop every ticket whose outcome is in. Returns the last failure worth
/// showing; transitions abandoned by a rebuilt effect are not.
fn settle(pending: &mut Vec<TransitionTicket>) -> Option<String> {
    let mut status = None;
    pending.retain(|ticket| match ticket.try_outcome() {
        None => true,
        Some(Ok(())) => false,
        Some(Err(err @ EffectError::Abandoned { .. })) => {
            debug!("{err}");
            false
        }
        Some(Err(err)) => {
            status = Some(err.to_string());
            false
        }
    });
    status
}

/// Effect area and help line.
fn layout(area: Rect) -> [Rect; 2] {
    Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).areas(area)
}

fn resolve_sources(args: Vec<String>, config: &AppConfig) -> Vec<String> {
    let sources: Vec<String> = if args.is_empty() {
        config.sources.clone()
    } else {
        args
    };
    let sources: Vec<String> = sources.into_iter().filter(|s| !s.is_empty()).collect();
    if sources.is_empty() {
        AppConfig::default().sources
    } else {
        sources
    }
}

/// Pixel under a terminal cell, or `None` outside the effect area.
///
/// Each cell covers two pixel rows; the pointer is placed on the lower one.
fn pointer_position(column: u16, row: u16, area: Rect) -> Option<(f32, f32)> {
    let inside = column >= area.x
        && column < area.x + area.width
        && row >= area.y
        && row < area.y + area.height;
    inside.then(|| {
        let x = (column - area.x) as f32;
        let y = (row - area.y) as f32 * 2.0 + 1.0;
        (x, y)
    })
}

#[cfg(test)]
mod tests {
    use std::thread;
    use std::time::Duration;

    use pixmorph_core::PixelBuffer;
    use pixmorph_effect::StaticSampler;

    use super::*;

    fn quiet_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.effect.show_mouse_circle = false;
        config
    }

    fn app_with(sampler: StaticSampler) -> App {
        let mut app = App::new(quiet_config(), vec!["a".to_string(), "b".to_string()]);
        app.sampler = Arc::new(sampler);
        app
    }

    fn blocks() -> StaticSampler {
        let mut a = PixelBuffer::new(80, 46);
        a.fill_rect(0, 0, 4, 4, Rgba::WHITE);
        let mut b = PixelBuffer::new(80, 46);
        b.fill_rect(10, 10, 2, 2, Rgba::WHITE);
        StaticSampler::new().with("a", a).with("b", b)
    }

    #[test]
    fn one_row_terminal_parks_the_effect() {
        let mut app = app_with(blocks());
        app.rebuild(Rect::new(0, 0, 80, 24)).unwrap();
        assert!(app.effect.is_some());
        app.cycle_color();
        let color = PALETTE[app.palette_index];

        app.rebuild(Rect::new(0, 0, 80, 1)).unwrap();
        assert!(app.effect.is_none());
        app.tick().unwrap();

        app.rebuild(Rect::new(0, 0, 80, 24)).unwrap();
        let effect = app.effect.as_ref().unwrap();
        assert_eq!(effect.config().color, color);
        assert!(effect.is_rendering());
        assert!(app.status.is_none());
    }

    #[test]
    fn zero_sized_terminal_on_startup_is_not_fatal() {
        let mut app = app_with(blocks());
        app.rebuild(Rect::new(0, 0, 0, 0)).unwrap();
        assert!(app.effect.is_none());
        app.rebuild(Rect::new(0, 0, 80, 24)).unwrap();
        assert!(app.effect.is_some());
    }

    #[test]
    fn rebuilding_discards_transitions_of_the_old_effect() {
        let mut app = app_with(blocks());
        app.rebuild(Rect::new(0, 0, 80, 24)).unwrap();
        app.next_source();
        app.rebuild(Rect::new(0, 0, 80, 24)).unwrap();

        assert_eq!(app.pending.len(), 1);
        for _ in 0..500 {
            assert_eq!(settle(&mut app.pending), None);
            if app.pending.is_empty() {
                break;
            }
            thread::sleep(Duration::from_millis(10));
        }
        assert!(app.pending.is_empty());
    }

    #[test]
    fn failed_transitions_surface_in_the_status_line() {
        let mut app = app_with(blocks());
        app.sources.push("missing".to_string());
        app.rebuild(Rect::new(0, 0, 80, 24)).unwrap();
        app.current = 1;
        app.next_source();

        let effect = app.effect.as_mut().unwrap();
        assert!(effect.await_transition(Duration::from_secs(5)));
        assert!(settle(&mut app.pending).is_some());
        assert!(app.pending.is_empty());
    }

    #[test]
    fn pointer_maps_cells_to_pixels() {
        let area = Rect::new(0, 0, 10, 5);
        assert_eq!(pointer_position(3, 2, area), Some((3.0, 5.0)));
        assert_eq!(pointer_position(0, 0, area), Some((0.0, 1.0)));
        assert_eq!(pointer_position(10, 0, area), None);
        assert_eq!(pointer_position(0, 5, area), None);
    }

    #[test]
    fn arguments_override_configured_sources() {
        let config = AppConfig {
            sources: vec!["from config".to_string()],
            ..AppConfig::default()
        };
        assert_eq!(
            resolve_sources(vec!["a".to_string()], &config),
            ["a".to_string()]
        );
        assert_eq!(resolve_sources(Vec::new(), &config), ["from config"]);
    }

    #[test]
    fn empty_sources_fall_back_to_the_default() {
        let config = AppConfig {
            sources: vec![String::new()],
            ..AppConfig::default()
        };
        assert_eq!(resolve_sources(Vec::new(), &config), AppConfig::default().sources);
    }

    #[test]
    fn help_line_sits_below_the_effect() {
        let [effect, help] = layout(Rect::new(0, 0, 80, 24));
        assert_eq!(effect, Rect::new(0, 0, 80, 23));
        assert_eq!(help, Rect::new(0, 23, 80, 1));
    }
}
