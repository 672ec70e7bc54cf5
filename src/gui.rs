//! Native viewer using egui
//!
//! Scatterplot of annotation embeddings with two caption selectors (BABEL
//! and HumanML3D) driving highlight/filter coloring, plus a hover tooltip
//! with point detail.

use eframe::egui;
use std::collections::HashMap;
use tracing::{info, warn};

use crate::config::Config;
use crate::dataset::{load_dataset, Dataset};
use crate::session::ViewSession;
use crate::xref;

/// Dropdown captions are shortened past this many chars; the full caption
/// stays the selected value
const CAPTION_DISPLAY_CHARS: usize = 100;

/// Fill for points matching a HumanML3D selection
const HUMANML3D_HIGHLIGHT: egui::Color32 = egui::Color32::from_rgb(60, 100, 255);

/// Run the native viewer
pub fn run_viewer(config: Config, view_id: Option<String>) -> anyhow::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_title("Embedding Viewer"),
        ..Default::default()
    };

    eframe::run_native(
        "Embedding Viewer",
        options,
        Box::new(|cc| Ok(Box::new(ViewerApp::new(cc, config, view_id)))),
    )
    .map_err(|e| anyhow::anyhow!("GUI error: {}", e))
}

struct ViewerApp {
    config: Config,
    selected_view: String,
    dataset: Option<Dataset>,
    session: Option<ViewSession>,
    load_error: Option<String>,
    // Controls
    cap_input: usize,
    selected_babel: String,
    selected_humanml3d: String,
}

impl ViewerApp {
    fn new(cc: &eframe::CreationContext<'_>, config: Config, view_id: Option<String>) -> Self {
        cc.egui_ctx.set_visuals(egui::Visuals::dark());

        let selected_view = view_id
            .filter(|id| config.get_view(id).is_some())
            .or_else(|| config.views.first().map(|v| v.id.clone()))
            .unwrap_or_default();
        let cap_input = config.default_cap;

        let mut app = Self {
            config,
            selected_view,
            dataset: None,
            session: None,
            load_error: None,
            cap_input,
            selected_babel: String::new(),
            selected_humanml3d: String::new(),
        };
        app.load_view();
        app
    }

    /// Load the current view's dataset and build a fresh session
    fn load_view(&mut self) {
        self.dataset = None;
        self.session = None;
        self.load_error = None;
        self.selected_babel.clear();
        self.selected_humanml3d.clear();

        let view = match self.config.get_view(&self.selected_view) {
            Some(v) => v.clone(),
            None => {
                warn!("No view configured with id '{}'", self.selected_view);
                return;
            }
        };

        info!("Loading dataset for view '{}' from {}", view.id, view.data);
        match load_dataset(&view.data) {
            Ok(dataset) => {
                self.session = Some(ViewSession::build(&dataset, self.cap_input, &view.embedding_key));
                self.dataset = Some(dataset);
            }
            Err(e) => {
                warn!("Failed to load dataset for '{}': {}", view.id, e);
                self.load_error = Some(e.to_string());
            }
        }
    }

    /// Rerun the transform with the current cap; replaces the old session
    fn rebuild_session(&mut self) {
        let Some(view) = self.config.get_view(&self.selected_view).cloned() else {
            return;
        };
        if let Some(dataset) = &self.dataset {
            self.session = Some(ViewSession::build(dataset, self.cap_input, &view.embedding_key));
        }
        // A selection absent from the new session matches zero points;
        // drop it so rendering reverts to neutral coloring
        if let Some(session) = &self.session {
            if !self.selected_babel.is_empty() && !session.babel_texts.contains(&self.selected_babel) {
                info!("Dropping stale BABEL selection '{}'", self.selected_babel);
                self.selected_babel.clear();
            }
            if !self.selected_humanml3d.is_empty()
                && !session.humanml3d_texts.contains(&self.selected_humanml3d)
            {
                info!("Dropping stale HumanML3D selection '{}'", self.selected_humanml3d);
                self.selected_humanml3d.clear();
            }
        }
    }

    fn reset_selection(&mut self) {
        self.selected_babel.clear();
        self.selected_humanml3d.clear();
    }

    /// Fill color for one point given the current selection
    ///
    /// A selection the session does not know (stale after a cap change) is
    /// an empty result set: coloring falls back to the neutral default
    /// instead of fading every point out.
    fn point_color(&self, session: &ViewSession, point: &crate::transform::Point) -> egui::Color32 {
        if !self.selected_babel.is_empty() {
            // Color map keys are exactly the session's BABEL captions
            if let Some(&rgb) = session.colors.get(&self.selected_babel) {
                if point.labels.iter().any(|l| l == &self.selected_babel) {
                    return color32(rgb);
                }
                return egui::Color32::TRANSPARENT;
            }
        } else if !self.selected_humanml3d.is_empty()
            && session.humanml3d_texts.contains(&self.selected_humanml3d)
        {
            if point.text == self.selected_humanml3d {
                return HUMANML3D_HIGHLIGHT;
            }
            return egui::Color32::TRANSPARENT;
        }
        color32(session.default_color(point))
    }

    fn controls_panel(&mut self, ui: &mut egui::Ui) {
        ui.heading("Embedding Viewer");
        ui.separator();

        // View selector (one entry per embedding model)
        if self.config.views.len() > 1 {
            let old_view = self.selected_view.clone();
            ui.horizontal(|ui| {
                ui.label("Model:");
                let selected_name = self
                    .config
                    .get_view(&self.selected_view)
                    .map(|v| v.name.clone())
                    .unwrap_or_default();
                egui::ComboBox::from_id_salt("view_select")
                    .selected_text(selected_name)
                    .show_ui(ui, |ui| {
                        for view in &self.config.views {
                            ui.selectable_value(&mut self.selected_view, view.id.clone(), &view.name);
                        }
                    });
            });
            if self.selected_view != old_view {
                self.load_view();
            }
        }

        // Annotation cap + explicit reload trigger
        ui.horizontal(|ui| {
            ui.label("Annotations:");
            ui.add(egui::DragValue::new(&mut self.cap_input).range(0..=100_000));
            if ui.button("Load").clicked() {
                self.rebuild_session();
            }
        });

        if ui.button("Show all points").clicked() {
            self.reset_selection();
        }

        if let Some(err) = &self.load_error {
            ui.colored_label(egui::Color32::LIGHT_RED, err);
        }

        let Some(session) = self.session.as_ref() else {
            return;
        };
        ui.label(format!(
            "{} points | {} BABEL | {} HumanML3D captions",
            session.points.len(),
            session.babel_texts.len(),
            session.humanml3d_texts.len()
        ));
        ui.separator();

        // BABEL caption selector
        ui.label("BABEL caption:");
        let old_babel = self.selected_babel.clone();
        caption_combo(ui, "babel_select", &mut self.selected_babel, &session.babel_texts, "Select a BABEL text");
        if self.selected_babel != old_babel && !self.selected_babel.is_empty() {
            // The two selectors are mutually exclusive, as in a radio pair
            self.selected_humanml3d.clear();
        }

        // HumanML3D caption selector
        ui.label("HumanML3D caption:");
        let old_humanml3d = self.selected_humanml3d.clone();
        caption_combo(
            ui,
            "humanml3d_select",
            &mut self.selected_humanml3d,
            &session.humanml3d_texts,
            "Select a HumanML3D text",
        );
        if self.selected_humanml3d != old_humanml3d && !self.selected_humanml3d.is_empty() {
            self.selected_babel.clear();
        }

        ui.separator();

        // Cross-reference panels for the active selection
        egui::ScrollArea::vertical().show(ui, |ui| {
            if !self.selected_babel.is_empty() {
                ui.strong("Corresponding HumanML3D texts:");
                for text in xref::humanml3d_texts_for(&session.points, &self.selected_babel) {
                    ui.label(text);
                }
            } else if !self.selected_humanml3d.is_empty() {
                ui.strong("Corresponding BABEL texts:");
                for text in xref::babel_texts_for(&session.points, &self.selected_humanml3d) {
                    ui.label(text);
                }
            }
        });
    }

    fn plot_panel(&self, ui: &mut egui::Ui) {
        let Some(session) = self.session.as_ref() else {
            ui.label("No dataset loaded");
            return;
        };

        // Group points by fill color so each group is one plot item
        let mut by_color: HashMap<egui::Color32, Vec<[f64; 2]>> = HashMap::new();
        for point in &session.points {
            by_color
                .entry(self.point_color(session, point))
                .or_default()
                .push([point.x, point.y]);
        }

        let plot = egui_plot::Plot::new("embedding_plot")
            .data_aspect(1.0)
            .allow_drag(true)
            .allow_zoom(true)
            .allow_scroll(true)
            .show_axes(true)
            .show_grid(true);

        let mut hovered: Option<&crate::transform::Point> = None;
        let response = plot.show(ui, |plot_ui| {
            for (color, coords) in by_color {
                plot_ui.points(
                    egui_plot::Points::new(egui_plot::PlotPoints::new(coords))
                        .color(color)
                        .radius(4.0),
                );
            }

            // Nearest point within a screen-space threshold gets the tooltip
            if let Some(pointer) = plot_ui.pointer_coordinate() {
                let pointer_px = plot_ui.screen_from_plot(pointer);
                let mut best_dist = 10.0f32;
                for point in &session.points {
                    let px = plot_ui.screen_from_plot(egui_plot::PlotPoint::new(point.x, point.y));
                    let dist = pointer_px.distance(px);
                    if dist < best_dist {
                        best_dist = dist;
                        hovered = Some(point);
                    }
                }
            }
        });

        if let Some(point) = hovered {
            egui::show_tooltip_at_pointer(
                ui.ctx(),
                response.response.layer_id,
                egui::Id::new("point_tooltip"),
                |ui| {
                    ui.label(format!("({:.2}, {:.2})", point.x, point.y));
                    ui.label(format!("HumanML3D: {}", point.text));
                    let labels = dedup_first_encounter(&point.labels);
                    ui.label(format!("BABEL: {}", labels.join(", ")));
                },
            );
        }
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::SidePanel::left("controls_panel")
            .min_width(300.0)
            .show(ctx, |ui| self.controls_panel(ui));

        egui::CentralPanel::default().show(ctx, |ui| self.plot_panel(ui));
    }
}

/// Caption dropdown with a leading "no selection" entry and display-side
/// truncation; the full caption remains the stored value
fn caption_combo(ui: &mut egui::Ui, id: &str, selected: &mut String, captions: &[String], placeholder: &str) {
    let shown = if selected.is_empty() {
        placeholder.to_string()
    } else {
        truncate_caption(selected, CAPTION_DISPLAY_CHARS)
    };
    egui::ComboBox::from_id_salt(id)
        .selected_text(shown)
        .width(260.0)
        .show_ui(ui, |ui| {
            ui.selectable_value(selected, String::new(), placeholder);
            for caption in captions {
                ui.selectable_value(
                    selected,
                    caption.clone(),
                    truncate_caption(caption, CAPTION_DISPLAY_CHARS),
                );
            }
        });
}

/// Deduplicate captions preserving first-encounter order; a sequence can
/// repeat a caption non-adjacently
fn dedup_first_encounter(labels: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for label in labels {
        if !out.contains(label) {
            out.push(label.clone());
        }
    }
    out
}

/// Shorten a caption for display, cutting on a char boundary
fn truncate_caption(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let cut: String = text.chars().take(max_chars).collect();
        format!("{}...", cut)
    } else {
        text.to_string()
    }
}

fn color32(rgb: [f32; 3]) -> egui::Color32 {
    egui::Color32::from_rgb(
        (rgb[0] * 255.0) as u8,
        (rgb[1] * 255.0) as u8,
        (rgb[2] * 255.0) as u8,
    )
}
