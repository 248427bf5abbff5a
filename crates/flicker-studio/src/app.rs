use winit::dpi::LogicalSize;

use flicker_engine::core::{App, AppControl, FrameCtx};
use flicker_engine::paint::Color;
use flicker_engine::render::shapes::rect::RectRenderer;
use flicker_engine::time::{FrameGovernor, RateMeter, TickSlot};
use flicker_engine::window::RuntimeConfig;

use crate::controls::{Control, Controls, Effect};
use crate::grid::GridPainter;
use crate::settings::Settings;

/// The eye test: a governed grid painter plus keyboard controls.
pub struct EyeTest {
    governor: FrameGovernor<TickSlot, GridPainter>,
    controls: Controls,
    renderer: RectRenderer,
    meter: RateMeter,
    background: Color,
}

impl EyeTest {
    pub fn new(settings: &Settings) -> Self {
        let mut painter = GridPainter::new(settings.grid.clone());
        // Something is on screen before the first accepted tick.
        painter.paint();

        let governor = FrameGovernor::with_host_period(
            painter,
            settings.fps,
            TickSlot::new(),
            settings.host.period(),
        );

        Self {
            governor,
            controls: Controls::new(settings.fps),
            renderer: RectRenderer::new(),
            meter: RateMeter::default(),
            background: Color::BLACK,
        }
    }

    pub fn runtime_config(&self) -> RuntimeConfig {
        let (w, h) = self.governor.callback().surface_size();
        RuntimeConfig {
            title: self.title(None),
            initial_size: LogicalSize::new(w as f64, h as f64),
            ..RuntimeConfig::default()
        }
    }

    fn title(&self, measured: Option<f64>) -> String {
        let target = self.controls.fps();
        match (self.controls.is_paused(), measured) {
            (true, _) => format!("flicker - paused ({target} fps)"),
            (false, Some(rate)) => format!("flicker - {target} fps ({rate:.1} measured)"),
            (false, None) => format!("flicker - {target} fps"),
        }
    }

    fn handle_effect(&mut self, effect: Effect, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        match effect {
            Effect::SetRate(fps) => {
                self.governor.set_rate(fps);
                self.meter.reset();
                log::info!("target rate {fps} fps");
                ctx.runtime.set_title(self.title(None));
            }
            Effect::Grid(cmd) => {
                log::debug!("grid: {cmd:?}");
                let painter = self.governor.callback_mut();
                painter.apply(cmd);
                let (w, h) = painter.surface_size();
                ctx.runtime.request_size(LogicalSize::new(w as f64, h as f64));
            }
            Effect::Pause => {
                self.governor.cancel_pending();
                self.meter.reset();
                ctx.runtime.set_title(self.title(None));
            }
            Effect::Resume => {
                self.governor.request_tick();
                log::debug!("frame governor: resumed");
                ctx.runtime.set_title(self.title(None));
            }
            Effect::Exit => return AppControl::Exit,
        }
        AppControl::Continue
    }
}

impl App for EyeTest {
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let controls: Vec<Control> = ctx
            .input_frame
            .presses
            .iter()
            .filter_map(Control::from_press)
            .collect();

        for control in controls {
            let Some(effect) = self.controls.apply(control, self.governor.callback().config()) else {
                continue;
            };
            if self.handle_effect(effect, ctx) == AppControl::Exit {
                return AppControl::Exit;
            }
        }

        // This refresh is the host tick.
        if let Some(tick) = self.governor.source_mut().fire(ctx.time.since_start) {
            if self.governor.on_tick(tick).is_accepted() {
                if let Some(rate) = self.meter.record(tick.timestamp) {
                    log::info!(
                        "accepted {rate:.2} fps (target {}, host {:.2} Hz)",
                        self.governor.target_rate(),
                        self.governor.host_period().rate_hz()
                    );
                    ctx.runtime.set_title(self.title(Some(rate)));
                }
            }
        }

        let background = self.background;
        let (renderer, governor) = (&mut self.renderer, &self.governor);
        ctx.render(background, |rctx, target| {
            renderer.render(rctx, target, governor.callback().draw_list());
        })
    }

    fn on_exit(&mut self) {
        let stats = self.governor.stats();
        log::info!(
            "exiting: {} accepted, {} skipped, {} stale ticks; {} renders",
            stats.accepted,
            stats.skipped,
            stats.stale,
            self.governor.callback().renders()
        );
    }
}
