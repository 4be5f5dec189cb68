//! Main application module

mod keyboard;
mod menus;
mod styles;

use std::time::Duration;

use eframe::egui;

use crate::state::{AppSettings, AppState, GeometryLoader, LoadStatus};
use crate::ui::{parameters, status_bar, toolbar};
use crate::viewport::ViewportPanel;

/// Longest frame step fed to the render loop; longer stalls are clamped
const MAX_FRAME_STEP: f32 = 0.1;

/// Main application
pub struct PatternApp {
    state: AppState,
    viewport: ViewportPanel,
    /// Last applied font size (to detect changes)
    last_font_size: f32,
}

impl PatternApp {
    pub fn new(cc: &eframe::CreationContext<'_>, settings: AppSettings, loader: GeometryLoader) -> Self {
        let mut state = AppState::new(settings, loader);
        state.loader.request();

        styles::configure_styles(&cc.egui_ctx, state.settings.ui.font_size);

        let last_font_size = state.settings.ui.font_size;

        Self {
            state,
            viewport: ViewportPanel::new(),
            last_font_size,
        }
    }
}

impl eframe::App for PatternApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Apply font size if changed
        if self.state.settings.ui.font_size != self.last_font_size {
            styles::apply_font_size(ctx, self.state.settings.ui.font_size);
            self.last_font_size = self.state.settings.ui.font_size;
        }

        keyboard::handle_keyboard(ctx, &mut self.state);

        // ── Frame step: fetch results, messages, transition, camera ──
        let dt = ctx.input(|i| i.stable_dt).clamp(0.0, MAX_FRAME_STEP);
        self.state.tick(Duration::from_secs_f32(dt));

        // ── Menu bar ──────────────────────────────────────────
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                menus::file_menu(ui, &mut self.state);
                menus::view_menu(ui, &mut self.state);
                menus::settings_menu(ui, &mut self.state);
            });
        });

        // ── Settings window ──────────────────────────────────
        menus::settings_window(ctx, &mut self.state);

        // ── Toolbar ───────────────────────────────────────────
        egui::TopBottomPanel::top("toolbar")
            .frame(
                egui::Frame::side_top_panel(&ctx.style()).inner_margin(egui::Margin::symmetric(8, 4)),
            )
            .show(ctx, |ui| {
                toolbar::show(ui, &mut self.state);
            });

        // ── Status bar ───────────────────────────────────────
        egui::TopBottomPanel::bottom("status_bar")
            .exact_height(22.0)
            .frame(
                egui::Frame::side_top_panel(&ctx.style()).inner_margin(egui::Margin::symmetric(8, 2)),
            )
            .show(ctx, |ui| {
                status_bar::show(ui, &self.state);
            });

        // ── Left panel: Parameters + steps ───────────────────
        if self.state.panels.parameters || self.state.panels.steps {
            egui::SidePanel::left("parameters")
                .default_width(230.0)
                .width_range(160.0..=400.0)
                .resizable(true)
                .frame(
                    egui::Frame::side_top_panel(&ctx.style()).inner_margin(egui::Margin::same(6)),
                )
                .show(ctx, |ui| {
                    egui::ScrollArea::vertical().show(ui, |ui| {
                        if self.state.panels.parameters {
                            parameters::show(ui, &mut self.state);
                        }
                        if self.state.panels.steps {
                            ui.add_space(8.0);
                            parameters::show_steps(ui, &self.state);
                        }
                    });
                });
        }

        // ── Central panel: 3D viewport ───────────────────────
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                self.viewport.show(ui, &mut self.state);
            });

        // Frames run on demand: input wakes egui, and an idle tick changes nothing
        if self.state.preview.is_animating() || self.state.preview.pending_messages() > 0 {
            ctx.request_repaint();
        } else if self.state.loader.is_saving()
            || *self.state.preview.status() == LoadStatus::Loading
        {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}
