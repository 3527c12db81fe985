use crate::config::ClientConfig;
use crate::session::{Session, SessionOptions};
use crate::transport::WsConnector;
use anyhow::Result;
use eframe::{self, egui};
use log::{error, info, warn};
use std::sync::Arc;
use tokio::runtime::{Handle, Runtime};
use tokio::sync::oneshot;

use super::events::AppEvent;
use super::widgets::{connection_panel, log_panel, message_panel};

/// The WebSocket tester window
pub struct WsTesterApp {
    /// The single session every panel reads from
    session: Session,
    /// URL field contents
    url: String,
    /// Editor copy of the outbound buffer
    buffer: String,
    /// Shutdown channel
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl WsTesterApp {
    /// Create a new application instance
    pub fn new(
        config: &ClientConfig,
        url: String,
        auto_connect: bool,
        rt_handle: Handle,
        shutdown_tx: oneshot::Sender<()>,
    ) -> Self {
        let connector = Arc::new(WsConnector::new(rt_handle));
        let mut session = Session::new(connector, SessionOptions::from(config));

        if auto_connect {
            info!("Auto-connecting to {}", url);
            if let Err(e) = session.connect(&url) {
                warn!("Auto-connect failed: {}", e);
            }
        }

        Self {
            session,
            url,
            buffer: String::new(),
            shutdown_tx: Some(shutdown_tx),
        }
    }

    fn update_ui(&mut self, ctx: &egui::Context) {
        let controls = self.session.controls();
        let mut events = Vec::new();

        egui::TopBottomPanel::top("connection_panel").show(ctx, |ui| {
            ui.heading("WebSocket Tester");
            ui.separator();
            connection_panel::draw_connection_panel(
                ui,
                &mut self.url,
                self.session.status(),
                controls,
                &mut events,
            );
            ui.add_space(4.0);
        });

        egui::TopBottomPanel::top("message_panel").show(ctx, |ui| {
            message_panel::draw_message_panel(
                ui,
                &mut self.buffer,
                self.session.validation(),
                controls,
                &mut events,
            );
            ui.add_space(4.0);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            log_panel::draw_log_panel(ui, self.session.log(), &mut events);
        });

        for event in events {
            event.apply(&mut self.session);
        }

        // Formatting rewrites the buffer on the session side
        if self.buffer != self.session.buffer() {
            self.buffer = self.session.buffer().to_string();
        }
    }
}

impl eframe::App for WsTesterApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.session.pump_notices();
        self.update_ui(ctx);

        // Notices arrive off-thread, so keep polling
        ctx.request_repaint_after(std::time::Duration::from_millis(100));
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        info!("Application exiting");
        self.session.disconnect(false);

        // Send shutdown signal
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Run the GUI application
pub fn run_gui(config: ClientConfig, url: String, auto_connect: bool, rt: Runtime) -> Result<()> {
    let rt_handle = rt.handle().clone();

    // Initialize native options
    let mut options = eframe::NativeOptions::default();
    options.default_theme = if config.ui.dark_mode {
        eframe::Theme::Dark
    } else {
        eframe::Theme::Light
    };
    options.centered = true;

    // Set up a channel for shutdown notification
    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    // Connection tasks run on the runtime until the window closes
    std::thread::spawn(move || {
        rt.block_on(async {
            let _ = shutdown_rx.await;
            info!("Runtime shutdown complete");
        });
    });

    match eframe::run_native(
        "WebSocket Tester",
        options,
        Box::new(move |cc| {
            cc.egui_ctx.set_visuals(if config.ui.dark_mode {
                egui::Visuals::dark()
            } else {
                egui::Visuals::light()
            });
            let pixels_per_point = cc.egui_ctx.pixels_per_point() * config.ui.scale_factor;
            cc.egui_ctx.set_pixels_per_point(pixels_per_point);

            Box::new(WsTesterApp::new(
                &config,
                url,
                auto_connect,
                rt_handle,
                shutdown_tx,
            ))
        }),
    ) {
        Ok(_) => Ok(()),
        Err(e) => {
            error!("Failed to run GUI: {}", e);
            Err(anyhow::anyhow!("GUI initialization failed: {}", e))
        }
    }
}
