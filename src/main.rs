// RUST_LOG=info cargo run -- dumps the desktop state of $DISPLAY

use galena::{
    config::Config,
    connection::{DesktopHandler, DesktopQueryExt, WindowQueryExt},
    geometry::Orientation,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Stdout)
        .init();

    let (conn, screen_num) = x11rb::connect(None)?;
    let config = Config::load();
    let num_screen = config.num_screen;
    let legacy_name_fallback = config.legacy_name_fallback;
    let mut desktop = DesktopHandler::new(&conn, screen_num, &config)?;

    desktop.update_screen_geometry()?;
    let (screen_x, screen_y) = desktop.screen_offsets(num_screen)?;
    let geometry = desktop.geometry();
    log::info!(
        "virtual screen {}x{}, screen {}x{} at ({screen_x};{screen_y})",
        geometry.x_screen_width(Orientation::Horizontal),
        geometry.x_screen_height(Orientation::Horizontal),
        geometry.screen_width(Orientation::Horizontal),
        geometry.screen_height(Orientation::Horizontal),
    );

    let (columns, rows) = desktop.viewport_grid()?;
    let (viewport_x, viewport_y) = desktop.current_viewport()?;
    log::info!(
        "{} desktops of {columns}x{rows} viewports, current desktop {} viewport ({viewport_x};{viewport_y}), showing desktop: {}",
        desktop.desktop_count()?,
        desktop.current_desktop()?,
        desktop.desktop_is_visible()?,
    );

    let active = desktop.active_window()?;
    for window in desktop.window_list(false)? {
        let name = desktop
            .window_name(window, legacy_name_fallback)?
            .unwrap_or_else(|| String::from("?"));
        let class = desktop
            .window_class(window)?
            .map_or_else(|| String::from("?"), |(normalized, _)| normalized);
        let flags = desktop.window_flags(window)?;
        let geometry = desktop.window_geometry(window)?;
        log::info!(
            "window {window:#x} [{class}] '{name}' on desktop {} at ({};{}) {}x{}{}{}{}{}{}",
            desktop.window_desktop(window)?,
            geometry.x,
            geometry.y,
            geometry.width,
            geometry.height,
            if Some(window) == active { " active" } else { "" },
            if flags.fullscreen { " fullscreen" } else { "" },
            if flags.maximized { " maximized" } else { "" },
            if flags.hidden { " hidden" } else { "" },
            if flags.valid { "" } else { " skipped" },
        );
    }

    Ok(())
}
