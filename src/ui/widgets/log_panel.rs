use crate::pipeline::{Direction, MessageLog};
use crate::ui::events::AppEvent;

/// Draw the message log, newest entries at the bottom
pub fn draw_log_panel(ui: &mut egui::Ui, log: &MessageLog, events: &mut Vec<AppEvent>) {
    ui.horizontal(|ui| {
        ui.label(format!("Messages ({})", log.len()));
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.button("Clear Log").clicked() {
                events.push(AppEvent::ClearLog);
            }
        });
    });
    ui.separator();

    egui::ScrollArea::vertical()
        .stick_to_bottom(true)
        .auto_shrink([false, false])
        .show(ui, |ui| {
            for entry in log.entries() {
                let color = match entry.direction {
                    Direction::Sent => egui::Color32::LIGHT_BLUE,
                    Direction::Received => egui::Color32::LIGHT_GREEN,
                };
                ui.label(
                    egui::RichText::new(format!(
                        "[{}] {}:",
                        entry.timestamp.format("%H:%M:%S"),
                        entry.direction
                    ))
                    .color(color)
                    .strong(),
                );
                ui.label(egui::RichText::new(&entry.payload).monospace());
                ui.add_space(6.0);
            }
        });
}
