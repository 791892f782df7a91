//! UI overlays using bevy_egui

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts, EguiPrimaryContextPass};

use showroom_core::{ColorSpec, VehicleRecord, VehicleSpecs, ViewerPhase};
use showroom_scene::{ActiveSession, ViewerRequests};

/// Grouped system parameters for the main UI system
#[derive(SystemParam)]
pub struct UiParams<'w, 's> {
    pub contexts: EguiContexts<'w, 's>,
    pub session: Res<'w, ActiveSession>,
    pub requests: ResMut<'w, ViewerRequests>,
    pub route_input: ResMut<'w, RouteInput>,
    pub ui_layout: ResMut<'w, UiLayout>,
}

/// Text in the route bar
#[derive(Resource, Default)]
pub struct RouteInput(pub String);

/// UI layout settings for responsive design
#[derive(Debug, Clone, Resource)]
pub struct UiLayout {
    /// Whether the details panel is visible
    pub show_details: bool,
    pub screen_width: f32,
    /// Whether we're on a small screen (mobile/tablet)
    pub is_mobile: bool,
}

impl Default for UiLayout {
    fn default() -> Self {
        Self {
            show_details: true,
            screen_width: 1280.0,
            is_mobile: false,
        }
    }
}

impl UiLayout {
    pub fn update_for_screen(&mut self, width: f32) {
        self.screen_width = width;
        let was_mobile = self.is_mobile;
        self.is_mobile = width < 800.0;

        // Close the details panel on first switch to a small screen
        if self.is_mobile && !was_mobile {
            self.show_details = false;
        }
    }

    pub fn details_width(&self) -> f32 {
        if self.is_mobile {
            (self.screen_width * 0.6).min(220.0)
        } else {
            280.0
        }
    }
}

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<RouteInput>()
            .init_resource::<UiLayout>()
            .add_systems(Update, update_ui_layout)
            // Runs in EguiPrimaryContextPass for proper input handling (bevy_egui 0.38+)
            .add_systems(EguiPrimaryContextPass, ui_system);
    }
}

/// Heading shown above the viewer
pub fn vehicle_title(vehicle: &VehicleRecord) -> String {
    if vehicle.brand.is_empty() {
        vehicle.name.clone()
    } else {
        format!("{} {}", vehicle.brand, vehicle.name)
    }
}

/// Labelled spec rows, skipping values the catalog leaves blank
pub fn spec_rows(specs: &VehicleSpecs) -> Vec<(&'static str, &str)> {
    [
        ("Power", specs.power.as_str()),
        ("Capacity", specs.capacity.as_str()),
        ("Max speed", specs.speed.as_str()),
        ("Torque", specs.torque.as_str()),
        ("0-100 km/h", specs.acceleration.as_str()),
    ]
    .into_iter()
    .filter(|(_, value)| !value.trim().is_empty())
    .collect()
}

pub fn swatch_color(color: ColorSpec) -> egui::Color32 {
    let [r, g, b] = color.rgb8();
    egui::Color32::from_rgb(r, g, b)
}

fn update_ui_layout(windows: Query<&Window>, mut ui_layout: ResMut<UiLayout>) {
    if let Ok(window) = windows.single() {
        let width = window.width();
        if (ui_layout.screen_width - width).abs() > 1.0 {
            ui_layout.update_for_screen(width);
        }
    }
}

fn ui_system(mut params: UiParams) {
    let Ok(ctx) = params.contexts.ctx_mut() else { return };
    let session = &params.session;

    egui::TopBottomPanel::top("vehicle_header").show(ctx, |ui| {
        ui.horizontal(|ui| {
            match session.vehicle() {
                Some(vehicle) => {
                    ui.heading(vehicle_title(vehicle));
                    ui.separator();
                    for color in &vehicle.colors {
                        let selected = session.color() == *color;
                        let stroke = if selected {
                            egui::Stroke::new(2.0, egui::Color32::WHITE)
                        } else {
                            egui::Stroke::new(1.0, egui::Color32::DARK_GRAY)
                        };
                        let swatch = egui::Button::new("")
                            .fill(swatch_color(*color))
                            .stroke(stroke)
                            .min_size(egui::vec2(24.0, 24.0));
                        if ui.add(swatch).on_hover_text(color.hex()).clicked() {
                            params.requests.pick_color(*color);
                        }
                    }
                }
                None => {
                    ui.heading("Showroom");
                }
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if session.vehicle().is_some() {
                    let label = if params.ui_layout.show_details { "Details ✕" } else { "Details" };
                    if ui.button(label).clicked() {
                        params.ui_layout.show_details = !params.ui_layout.show_details;
                    }
                }
            });
        });
    });

    egui::TopBottomPanel::bottom("route_bar").show(ctx, |ui| {
        ui.horizontal(|ui| {
            ui.label("Route");
            let response = ui.add(
                egui::TextEdit::singleline(&mut params.route_input.0)
                    .hint_text("/cars/1")
                    .desired_width(160.0),
            );
            let submitted = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            if ui.button("Go").clicked() || submitted {
                let route = params.route_input.0.trim().to_string();
                tracing::info!(route = %route, "Navigating");
                params.requests.navigate(route);
            }
        });
    });

    if let Some(vehicle) = session.vehicle() {
        if params.ui_layout.show_details {
            egui::SidePanel::right("details_panel")
                .default_width(params.ui_layout.details_width())
                .resizable(!params.ui_layout.is_mobile)
                .show(ctx, |ui| {
                    ui.heading(&vehicle.name);
                    if !vehicle.brand.is_empty() {
                        ui.label(egui::RichText::new(&vehicle.brand).color(egui::Color32::GRAY));
                    }
                    if let Some(price) = &vehicle.price {
                        ui.add_space(4.0);
                        ui.label(egui::RichText::new(price).strong().size(16.0));
                    }
                    ui.separator();

                    let rows = spec_rows(&vehicle.specs);
                    if rows.is_empty() {
                        ui.label(egui::RichText::new("No specifications").small().color(egui::Color32::GRAY));
                    } else {
                        egui::Grid::new("vehicle_specs").striped(true).show(ui, |ui| {
                            for (label, value) in rows {
                                ui.label(label);
                                ui.label(value);
                                ui.end_row();
                            }
                        });
                    }

                    if vehicle.model_path.trim().is_empty() {
                        ui.add_space(8.0);
                        ui.label(egui::RichText::new("3D model not available yet").color(egui::Color32::GRAY));
                    }
                });
        }
    }

    match session.phase() {
        ViewerPhase::Loading => {
            egui::Area::new(egui::Id::new("loading_overlay"))
                .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
                .interactable(false)
                .show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.spinner();
                        ui.label("Loading model…");
                    });
                });
        }
        ViewerPhase::NotFound => {
            egui::Area::new(egui::Id::new("not_found"))
                .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
                .show(ctx, |ui| {
                    ui.heading("Car not found");
                    if let Some(err) = session.selection_error() {
                        ui.label(egui::RichText::new(err.to_string()).small().color(egui::Color32::GRAY));
                    }
                });
        }
        ViewerPhase::Failed => {
            egui::Window::new("Model failed to load")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
                .show(ctx, |ui| {
                    if let Some(err) = session.error() {
                        ui.label(egui::RichText::new(err.to_string()).color(egui::Color32::from_rgb(255, 100, 100)));
                    }
                    ui.add_space(4.0);
                    if ui.button("Retry").clicked() {
                        params.requests.retry = true;
                    }
                });
        }
        ViewerPhase::Idle | ViewerPhase::Ready => {}
    }
}
