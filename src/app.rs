use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use egui::{Color32, PointerButton, RichText, Ui};
use egui_plot::{Legend, Line, MarkerShape, Plot, PlotPoint, Points};
use log::debug;

use crate::backup::{BackupLedger, BackupOutcome};
use crate::engine::{EngineSession, ENGINE_SECTION, TORQUE_CURVE_KEY};
use crate::gearbox::{GearboxView, GEARBOX_SECTION};
use crate::lut::{Delimiter, LutPoint};
use crate::notice::{NoticeLevel, Notices};
use crate::point_editor::{MAX_HIT_RADIUS, MIN_HIT_RADIUS};
use crate::session::{LutSession, RefreshOutcome};
use crate::settings::Settings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Tab {
    #[default]
    Lut,
    Engine,
    Gearbox,
}

enum LutAction {
    Load,
    Save,
    SaveAs,
    Refresh,
    AddPoint,
    RemovePoint(usize),
}

pub struct EditorApp {
    settings: Settings,
    tab: Tab,
    notices: Notices,
    backups: BackupLedger,

    // One independent editing surface per tab
    lut: Option<LutSession>,
    engine: Option<EngineSession>,
    gearbox: GearboxView,

    reset_plot: bool, // Fit the plot to the data on the next frame
}

impl EditorApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        Self::with_settings(Settings::restore(cc.storage))
    }

    pub fn with_settings(settings: Settings) -> Self {
        Self {
            settings,
            tab: Tab::default(),
            notices: Notices::default(),
            backups: BackupLedger::new(),
            lut: None,
            engine: None,
            gearbox: GearboxView::default(),
            reset_plot: false,
        }
    }

    fn apply_theme(&self, ctx: &egui::Context) {
        match self.settings.dark_mode {
            Some(true) => ctx.set_visuals(egui::Visuals::dark()),
            Some(false) => ctx.set_visuals(egui::Visuals::light()),
            None => ctx.set_visuals(egui::Visuals::default()),
        }
    }

    fn file_dialog(&self, filter_name: &str, extension: &str, title: &str) -> rfd::FileDialog {
        let dialog = rfd::FileDialog::new()
            .add_filter(filter_name, &[extension])
            .add_filter("All Files", &["*"])
            .set_title(title);
        match &self.settings.last_dir {
            Some(dir) => dialog.set_directory(dir),
            None => dialog,
        }
    }

    fn pick_file(&mut self, filter_name: &str, extension: &str, title: &str) -> Option<PathBuf> {
        let path = self.file_dialog(filter_name, extension, title).pick_file()?;
        self.settings.remember_dir(&path);
        Some(path)
    }

    fn load_lut(&mut self, path: &Path) -> Result<()> {
        let (session, backup) = LutSession::open(
            path,
            self.settings.delimiter,
            self.settings.hit_radius,
            &mut self.backups,
        )
        .with_context(|| format!("Failed to load LUT file: {}", path.display()))?;

        if let BackupOutcome::Created(backup) = backup {
            self.notices
                .info("Backup created", format!("Original saved to {}", backup.display()));
        }
        self.lut = Some(session);
        self.reset_plot = true;
        Ok(())
    }

    fn run_lut_action(&mut self, action: LutAction) {
        let result = match action {
            LutAction::Load => match self.pick_file("LUT Files", "lut", "Select a LUT file") {
                Some(path) => self.load_lut(&path),
                None => Ok(()),
            },
            LutAction::Save => self.save_lut(),
            LutAction::SaveAs => self.save_lut_as(),
            LutAction::Refresh => self.refresh_lut(),
            LutAction::AddPoint => {
                if let Some(session) = self.lut.as_mut() {
                    session.add_point();
                }
                Ok(())
            }
            LutAction::RemovePoint(index) => {
                if let Some(session) = self.lut.as_mut() {
                    session.remove_point(index);
                }
                Ok(())
            }
        };
        if let Err(e) = result {
            self.notices.error("Error", &e);
        }
    }

    fn save_lut(&mut self) -> Result<()> {
        let Some(session) = self.lut.as_mut() else {
            self.notices.warning("Warning", "No LUT file loaded.");
            return Ok(());
        };
        session
            .save()
            .with_context(|| format!("Failed to save LUT file: {}", session.path().display()))?;
        self.notices.info("Saved", format!("File saved: {}", session.path().display()));
        Ok(())
    }

    fn save_lut_as(&mut self) -> Result<()> {
        let Some(session) = self.lut.as_ref() else {
            self.notices.warning("Warning", "No LUT file loaded.");
            return Ok(());
        };
        let Some(picked) = self
            .file_dialog("LUT Files", "lut", "Save the LUT file")
            .set_file_name(session.file_name())
            .save_file()
        else {
            debug!("Save as cancelled");
            return Ok(());
        };
        let path = with_default_extension(picked, "lut");
        session
            .save_as(&path)
            .with_context(|| format!("Failed to save LUT file: {}", path.display()))?;
        self.settings.remember_dir(&path);
        self.notices.info("Saved", format!("File saved: {}", path.display()));
        Ok(())
    }

    fn refresh_lut(&mut self) -> Result<()> {
        let Some(session) = self.lut.as_mut() else {
            self.notices.warning("Warning", "No LUT file loaded.");
            return Ok(());
        };
        let outcome = session
            .refresh()
            .with_context(|| format!("Failed to refresh through {}", session.temp_path().display()))?;
        match outcome {
            RefreshOutcome::Reloaded(_) => self.reset_plot = true,
            RefreshOutcome::TempMissing(temp) => self.notices.warning(
                "Temp file not found",
                format!("{} is missing, nothing was reloaded", temp.display()),
            ),
        }
        Ok(())
    }

    fn load_engine(&mut self) -> Result<()> {
        let Some(path) = self.pick_file("INI Files", "ini", "Select engine.ini") else {
            return Ok(());
        };
        let session = EngineSession::open(&path)
            .with_context(|| format!("Failed to load engine.ini: {}", path.display()))?;
        self.engine = Some(session);
        Ok(())
    }

    fn add_torque_curve(&mut self) -> Result<()> {
        if self.engine.is_none() {
            self.notices.warning("Warning", "No engine.ini loaded.");
            return Ok(());
        }
        let Some(lut_path) = self.pick_file("LUT Files", "lut", "Select the torque curve") else {
            return Ok(());
        };
        if let Some(engine) = self.engine.as_mut() {
            engine
                .attach_torque_curve(&lut_path)
                .with_context(|| format!("Failed to save engine.ini: {}", engine.path().display()))?;
            self.notices.info("Success", "Torque curve added to engine.ini.");
        }
        Ok(())
    }

    fn load_gearbox(&mut self) {
        let Some(path) = self.pick_file("INI Files", "ini", "Select the gearbox file") else {
            return;
        };
        if let Some(err) = self.gearbox.load(&path) {
            let err = anyhow::Error::new(err)
                .context(format!("Failed to load gearbox values: {}", path.display()));
            self.notices.error("Error", &err);
        } else if self.gearbox.values().is_empty() {
            self.notices.info(
                "Gearbox",
                format!("No [{GEARBOX_SECTION}] values in {}", path.display()),
            );
        }
    }
}

impl eframe::App for EditorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Apply theme at the beginning of each frame
        self.apply_theme(ctx);

        // Ctrl+O to load and Ctrl+S to save while on the LUT tab
        let mut shortcut = None;
        if self.tab == Tab::Lut && self.notices.is_empty() {
            ctx.input(|i| {
                if i.modifiers.command && i.key_pressed(egui::Key::O) {
                    shortcut = Some(LutAction::Load);
                } else if i.modifiers.command && i.key_pressed(egui::Key::S) {
                    shortcut = Some(LutAction::Save);
                }
            });
        }
        if let Some(action) = shortcut {
            self.run_lut_action(action);
        }

        self.show_notice(ctx);
        let interactive = self.notices.is_empty();

        egui::TopBottomPanel::top("tabs").show(ctx, |ui| {
            ui.add_enabled_ui(interactive, |ui| {
                ui.horizontal(|ui| {
                    ui.selectable_value(&mut self.tab, Tab::Lut, "📈 LUT");
                    ui.selectable_value(&mut self.tab, Tab::Engine, "🔧 Engine.ini");
                    ui.selectable_value(&mut self.tab, Tab::Gearbox, "⚙ Gearbox");

                    // Push the theme toggle to the right
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let theme_text = match self.settings.dark_mode {
                            Some(true) => "🌙 Dark",
                            Some(false) => "💡 Light",
                            None => "🔄 System",
                        };
                        if ui
                            .button(theme_text)
                            .on_hover_text("Click to cycle between System, Dark, and Light themes")
                            .clicked()
                        {
                            self.settings.cycle_theme();
                        }
                    });
                });
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_enabled_ui(interactive, |ui| match self.tab {
                Tab::Lut => self.show_lut_tab(ui),
                Tab::Engine => self.show_engine_tab(ui),
                Tab::Gearbox => self.show_gearbox_tab(ui),
            });
        });
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        self.settings.persist(storage);
    }
}

impl EditorApp {
    fn show_notice(&mut self, ctx: &egui::Context) {
        let Some(notice) = self.notices.current() else {
            return;
        };
        let color = match notice.level {
            NoticeLevel::Info => None,
            NoticeLevel::Warning => Some(Color32::from_rgb(255, 165, 0)),
            NoticeLevel::Error => Some(Color32::RED),
        };
        let mut dismissed = false;
        egui::Window::new(notice.title.as_str())
            .id(egui::Id::new("notice"))
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                match color {
                    Some(color) => ui.colored_label(color, notice.message.as_str()),
                    None => ui.label(notice.message.as_str()),
                };
                ui.add_space(8.0);
                if ui.button("OK").clicked() || ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                    dismissed = true;
                }
            });
        if dismissed {
            self.notices.dismiss();
        }
    }

    fn show_lut_tab(&mut self, ui: &mut Ui) {
        let mut action = None;

        ui.horizontal(|ui| {
            if ui.button("📁 Load LUT").clicked() {
                action = Some(LutAction::Load);
            }
            let loaded = self.lut.is_some();
            if ui.add_enabled(loaded, egui::Button::new("💾 Save")).clicked() {
                action = Some(LutAction::Save);
            }
            if ui.add_enabled(loaded, egui::Button::new("Save As…")).clicked() {
                action = Some(LutAction::SaveAs);
            }
            if ui
                .add_enabled(loaded, egui::Button::new("🔄 Refresh"))
                .on_hover_text("Write the curve to temp_lut.lut and reload it")
                .clicked()
            {
                action = Some(LutAction::Refresh);
            }

            ui.separator();
            egui::ComboBox::from_label("Format")
                .selected_text(self.settings.delimiter.label())
                .show_ui(ui, |ui| {
                    for delimiter in Delimiter::ALL {
                        ui.selectable_value(&mut self.settings.delimiter, delimiter, delimiter.label());
                    }
                })
                .response
                .on_hover_text("Applies to the next file loaded");

            let radius = ui.add(
                egui::Slider::new(&mut self.settings.hit_radius, MIN_HIT_RADIUS..=MAX_HIT_RADIUS)
                    .text("Hit radius"),
            );
            if radius.changed() {
                if let Some(session) = self.lut.as_mut() {
                    session.set_hit_radius(self.settings.hit_radius);
                }
            }
        });
        ui.separator();

        let Some(session) = self.lut.as_mut() else {
            ui.colored_label(Color32::GRAY, "Load a LUT file to edit its curve");
            if let Some(action) = action {
                self.run_lut_action(action);
            }
            return;
        };

        let dirty_marker = if session.is_dirty() { " *" } else { "" };
        ui.label(
            RichText::new(format!("Interactive edit of {}{dirty_marker}", session.file_name())).heading(),
        );
        ui.small(format!(
            "{} · {}",
            session.path().display(),
            session.delimiter().label()
        ));

        ui.horizontal_top(|ui| {
            let list_width = 260.0;
            let plot_width = (ui.available_width() - list_width - 20.0).max(200.0);

            ui.vertical(|ui| {
                ui.set_width(plot_width);
                Self::show_curve_plot(ui, &mut *session, self.reset_plot);
            });
            self.reset_plot = false;

            ui.separator();
            ui.vertical(|ui| {
                ui.label(RichText::new("Points").strong());
                if let Some(remove) = Self::show_point_list(ui, &mut *session) {
                    action = Some(LutAction::RemovePoint(remove));
                }
                if ui.button("➕ Add point").clicked() {
                    action = Some(LutAction::AddPoint);
                }
            });
        });

        if let Some(action) = action {
            self.run_lut_action(action);
        }
    }

    fn show_curve_plot(ui: &mut Ui, session: &mut LutSession, reset: bool) {
        let points = session.table().as_plot_points();

        let mut plot = Plot::new("lut_plot")
            .height(ui.available_height().max(300.0))
            .allow_drag(false)
            .legend(Legend::default())
            .x_axis_label("RPM")
            .y_axis_label("Torque (Nm)");
        if reset {
            plot = plot.auto_bounds(egui::Vec2b::new(true, true)).reset();
        }

        let plot_response = plot.show(ui, |plot_ui| {
            plot_ui.line(Line::new(points.clone()).name("Torque Curve").width(2.0));
            plot_ui.points(
                Points::new(points)
                    .name("Torque Points")
                    .shape(MarkerShape::Circle)
                    .filled(true)
                    .radius(5.0)
                    .color(Color32::RED),
            );
        });

        let response = &plot_response.response;
        let transform = &plot_response.transform;

        if response.drag_started_by(PointerButton::Primary) {
            if let Some(origin) = ui.input(|i| i.pointer.press_origin()) {
                let to_screen = |p: LutPoint| {
                    let pos = transform.position_from_point(&PlotPoint::new(p.x, p.y));
                    [pos.x, pos.y]
                };
                session.press([origin.x, origin.y], to_screen);
            }
        }

        // Motion outside the plot frame is ignored, like presses outside the axes
        if session.editor().is_dragging() && response.dragged() {
            if let Some(pos) = response.interact_pointer_pos() {
                if transform.frame().contains(pos) {
                    let value = transform.value_from_position(pos);
                    if session.motion(value.y) {
                        ui.ctx().request_repaint();
                    }
                }
            }
        }

        if response.drag_stopped() {
            session.release();
        }
    }

    /// Editable point grid. Returns the index whose remove button was clicked.
    fn show_point_list(ui: &mut Ui, session: &mut LutSession) -> Option<usize> {
        let mut remove = None;
        egui::ScrollArea::vertical()
            .max_height(ui.available_height() - 40.0)
            .show(ui, |ui| {
                egui::Grid::new("lut_points").striped(true).show(ui, |ui| {
                    ui.label("#");
                    ui.label("RPM");
                    ui.label("Torque");
                    ui.end_row();

                    let removable = session.can_remove_point();
                    for index in 0..session.table().len() {
                        let Some(point) = session.table().get(index) else {
                            continue;
                        };
                        let (mut x, mut y) = (point.x, point.y);
                        ui.label(index.to_string());
                        let x_changed = ui.add(egui::DragValue::new(&mut x).speed(10.0)).changed();
                        let y_changed = ui.add(egui::DragValue::new(&mut y).speed(0.5)).changed();
                        if x_changed || y_changed {
                            session.set_point(index, LutPoint::new(x, y));
                        }
                        let button = ui
                            .add_enabled(removable, egui::Button::new("🗑").small())
                            .on_hover_text("Remove point")
                            .on_disabled_hover_text("A LUT needs at least one point");
                        if button.clicked() {
                            remove = Some(index);
                        }
                        ui.end_row();
                    }
                });
            });
        remove
    }

    fn show_engine_tab(&mut self, ui: &mut Ui) {
        ui.horizontal(|ui| {
            if ui.button("📁 Load Engine.ini").clicked() {
                if let Err(e) = self.load_engine() {
                    self.notices.error("Error", &e);
                }
            }
            if ui.button("➕ Add Torque Curve").clicked() {
                if let Err(e) = self.add_torque_curve() {
                    self.notices.error("Error", &e);
                }
            }
        });
        ui.separator();

        let Some(engine) = &self.engine else {
            ui.colored_label(Color32::GRAY, "Load an engine.ini file to attach a torque curve");
            return;
        };

        ui.label(format!("File: {}", engine.path().display()));
        ui.label(format!(
            "{ENGINE_SECTION}/{TORQUE_CURVE_KEY}: {}",
            engine.config().torque_curve().unwrap_or("(not set)")
        ));
        ui.separator();

        egui::ScrollArea::vertical().show(ui, |ui| {
            let doc = engine.config().document();
            for name in doc.section_names() {
                egui::CollapsingHeader::new(format!("[{name}]"))
                    .default_open(name == ENGINE_SECTION)
                    .show(ui, |ui| {
                        if let Some(section) = doc.section(name) {
                            egui::Grid::new(("engine_section", name)).striped(true).show(ui, |ui| {
                                for (key, value) in section {
                                    ui.label(key.as_str());
                                    ui.label(value.as_str());
                                    ui.end_row();
                                }
                            });
                        }
                    });
            }
        });
    }

    fn show_gearbox_tab(&mut self, ui: &mut Ui) {
        if ui.button("📁 Load Gearbox Values").clicked() {
            self.load_gearbox();
        }
        ui.separator();

        if let Some(path) = self.gearbox.path() {
            ui.label(format!("File: {}", path.display()));
        }
        if self.gearbox.values().is_empty() {
            ui.colored_label(Color32::GRAY, "No gearbox values to show");
            return;
        }

        egui::ScrollArea::vertical().show(ui, |ui| {
            egui::Grid::new("gearbox_values").striped(true).show(ui, |ui| {
                ui.label(RichText::new("Gear").strong());
                ui.label(RichText::new("Value").strong());
                ui.end_row();
                for (gear, value) in self.gearbox.values() {
                    ui.label(gear.as_str());
                    ui.label(value.as_str());
                    ui.end_row();
                }
            });
        });
    }
}

/// Add `extension` when the user typed a bare file name in a save dialog
pub fn with_default_extension(path: PathBuf, extension: &str) -> PathBuf {
    if path.extension().is_some() {
        path
    } else {
        path.with_extension(extension)
    }
}
