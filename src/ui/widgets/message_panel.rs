use crate::connection::Controls;
use crate::pipeline::ValidationResult;
use crate::ui::events::AppEvent;

/// Draw the outbound message editor with its format and send buttons
pub fn draw_message_panel(
    ui: &mut egui::Ui,
    buffer: &mut String,
    validation: &ValidationResult,
    controls: Controls,
    events: &mut Vec<AppEvent>,
) {
    ui.label("Message to send:");
    let editor = ui.add(
        egui::TextEdit::multiline(buffer)
            .code_editor()
            .desired_rows(8)
            .desired_width(f32::INFINITY)
            .hint_text(r#"{"type": "ping"}"#),
    );
    if editor.changed() {
        events.push(AppEvent::BufferEdited(buffer.clone()));
    }

    ui.horizontal(|ui| {
        if ui.button("Format JSON").clicked() {
            events.push(AppEvent::Format);
        }

        let send = ui
            .add_enabled(controls.send, egui::Button::new("Send"))
            .on_hover_text("Ctrl+Enter");
        let shortcut = ui.input(|i| i.key_pressed(egui::Key::Enter) && i.modifiers.ctrl);
        if send.clicked() || (shortcut && controls.send) {
            events.push(AppEvent::Send);
        }

        let color = if validation.valid {
            egui::Color32::GREEN
        } else {
            egui::Color32::RED
        };
        ui.colored_label(color, &validation.message);
    });
}
