/// Default WebSocket URL shown in the URL field
pub const DEFAULT_URL: &str = "ws://127.0.0.1:8080";

/// Default scale factor
pub const DEFAULT_UI_SCALE: f32 = 1.0;

/// Directory under the platform config dir holding our files
pub const CONFIG_DIR_NAME: &str = "ws_tester";

/// Name of the configuration file
pub const CONFIG_FILE_NAME: &str = "config.toml";
