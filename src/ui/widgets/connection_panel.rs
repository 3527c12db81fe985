use crate::connection::Controls;
use crate::session::{StatusLevel, StatusLine};
use crate::ui::events::AppEvent;

/// Colour for each status level
pub fn status_color(level: StatusLevel) -> egui::Color32 {
    match level {
        StatusLevel::Info => egui::Color32::GRAY,
        StatusLevel::Connecting => egui::Color32::YELLOW,
        StatusLevel::Connected => egui::Color32::GREEN,
        StatusLevel::Error => egui::Color32::RED,
    }
}

/// Draw the URL field, connect/disconnect buttons and status line
pub fn draw_connection_panel(
    ui: &mut egui::Ui,
    url: &mut String,
    status: &StatusLine,
    controls: Controls,
    events: &mut Vec<AppEvent>,
) {
    ui.horizontal(|ui| {
        ui.label("WebSocket URL:");
        let url_response = ui.add_enabled(
            controls.url_field,
            egui::TextEdit::singleline(url)
                .hint_text("ws://host:port/path")
                .desired_width(360.0),
        );

        // Enter in the URL field connects
        let submitted = url_response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

        let connect = ui.add_enabled(
            controls.connect,
            egui::Button::new("Connect").min_size(egui::Vec2::new(90.0, 24.0)),
        );
        if connect.clicked() || (submitted && controls.connect) {
            events.push(AppEvent::Connect(url.clone()));
        }

        let disconnect = ui.add_enabled(
            controls.disconnect,
            egui::Button::new("Disconnect").min_size(egui::Vec2::new(90.0, 24.0)),
        );
        if disconnect.clicked() {
            events.push(AppEvent::Disconnect);
        }
    });

    ui.horizontal(|ui| {
        ui.label("Status:");
        ui.colored_label(status_color(status.level), &status.text);
    });
}
