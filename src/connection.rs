//!
//! This module owns the adapter context around an `x11rb` connection: the resolved atom table, the extension probe, the shared desktop geometry, and the query/command traits that speak the EWMH/ICCCM client-side protocol.
//!
//! Every operation is a blocking round-trip issued from the calling thread. Commands are fire-and-forget client messages: the window manager is free to ignore them and no completion is awaited.

use x11rb::{
    connection::Connection,
    errors::{ReplyError, ReplyOrIdError},
    protocol::xinerama::ConnectionExt as _,
    protocol::xproto::{
        Atom, AtomEnum, ChangeWindowAttributesAux, ClientMessageEvent, ConfigureWindowAux,
        ConnectionExt, EventMask, GetPropertyReply, Gravity, PropMode, Pixmap, Screen, StackMode,
        Window,
    },
    wrapper::ConnectionExt as _,
    x11_utils::X11Error,
};

use crate::{
    atoms::Atoms,
    class,
    config::Config,
    extensions::Extensions,
    geometry::{self, DesktopGeometry, Orientation, StrutPartial, WindowGeometry},
    state::WindowFlags,
};

/// A shorthand for `Result<(), ReplyOrIdError>`.
///
/// The `ReplyOrIdError` is the main error used when handling the X11 connection, so many functions return this type to be able to use the `?` syntax and bubble the error.
pub type Res = Result<(), ReplyOrIdError>;

/// Where recovered X protocol errors go.
///
/// Protocol errors (invalid window, bad atom, type mismatch) are expected in
/// normal operation since window handles can die between queries; the adapter
/// reports them here and the triggering operation yields its absent value.
/// Connection errors are never routed here, they propagate to the caller.
pub trait ErrorSink {
    fn protocol_error(&self, context: &'static str, error: &X11Error);
}

/// The default sink: protocol errors are only worth a debug line.
pub struct LogSink;

impl ErrorSink for LogSink {
    fn protocol_error(&self, context: &'static str, error: &X11Error) {
        log::debug!(
            "recovered X error during {context}: {:?} (code {}) request {}.{} on resource {}",
            error.error_kind,
            error.error_code,
            error.major_opcode,
            error.minor_opcode,
            error.bad_value
        );
    }
}

/// The adapter context: connection, root window, atom table, capability
/// probe, configuration and the shared desktop geometry record.
///
/// There is exactly one of these per connection; callers pass it wherever
/// desktop state is queried or changed.
pub struct DesktopHandler<'a, C: Connection> {
    /// A connection to the X11 server.
    pub conn: &'a C,
    /// The default screen.
    pub screen: &'a Screen,
    /// The root window of the default screen.
    root: Window,
    /// The resolved protocol atoms.
    pub atoms: Atoms,
    /// Which optional extensions the server offers.
    pub extensions: Extensions,
    config: Config,
    geometry: DesktopGeometry,
    sink: Box<dyn ErrorSink>,
}

impl<'a, C: Connection> DesktopHandler<'a, C> {
    /// Creates the adapter: probes the optional extensions, resolves every
    /// atom, and seeds the desktop geometry from the default screen.
    ///
    /// A missing extension is a degradation, not a failure; only a broken
    /// connection makes this return an error.
    /// # Errors
    /// Returns an error if the connection is faulty.
    pub fn new(conn: &'a C, screen_num: usize, config: &Config) -> Result<Self, ReplyOrIdError> {
        let screen = &conn.setup().roots[screen_num];

        log::trace!("screen num {screen_num} root {}", screen.root);

        let extensions = Extensions::probe(conn);
        let atoms = Atoms::new(conn)?;
        let geometry = DesktopGeometry::new(
            i32::from(screen.width_in_pixels),
            i32::from(screen.height_in_pixels),
        );

        Ok(Self {
            conn,
            screen,
            root: screen.root,
            atoms,
            extensions,
            config: config.clone(),
            geometry,
            sink: Box::new(LogSink),
        })
    }

    /// Replaces the default error sink, e.g. with a counting sink in tests.
    #[must_use]
    pub fn with_error_sink(mut self, sink: Box<dyn ErrorSink>) -> Self {
        self.sink = sink;
        self
    }

    #[must_use]
    pub fn root(&self) -> Window {
        self.root
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The shared geometry record, read by layout consumers.
    #[must_use]
    pub fn geometry(&self) -> &DesktopGeometry {
        &self.geometry
    }

    /// Splits a reply into the recovered and the fatal case: protocol errors
    /// go to the sink and come back as `None`, connection errors propagate.
    fn recover<T>(
        &self,
        context: &'static str,
        result: Result<T, ReplyError>,
    ) -> Result<Option<T>, ReplyOrIdError> {
        match result {
            Ok(reply) => Ok(Some(reply)),
            Err(ReplyError::ConnectionError(e)) => Err(e.into()),
            Err(ReplyError::X11Error(e)) => {
                self.sink.protocol_error(context, &e);
                Ok(None)
            }
        }
    }

    /// The generic property fetch every typed query is built on.
    ///
    /// Returns the property's 32-bit values; an absent property, a type
    /// mismatch at the server, or a recovered protocol error all yield an
    /// empty list, never a failure.
    /// # Errors
    /// Returns an error only if the connection is broken.
    pub fn get_property32(
        &self,
        window: Window,
        property: Atom,
        ty: impl Into<Atom>,
    ) -> Result<Vec<u32>, ReplyOrIdError> {
        let cookie = self
            .conn
            .get_property(false, window, property, ty, 0, u32::MAX)?;
        let reply = self.recover("get_property", cookie.reply())?;
        Ok(reply.as_ref().map(property_values).unwrap_or_default())
    }

    /// String variant of the property fetch. `None` when absent.
    /// # Errors
    /// Returns an error only if the connection is broken.
    pub fn get_property_text(
        &self,
        window: Window,
        property: Atom,
        ty: impl Into<Atom>,
    ) -> Result<Option<String>, ReplyOrIdError> {
        let cookie = self
            .conn
            .get_property(false, window, property, ty, 0, u32::MAX)?;
        let Some(reply) = self.recover("get_property", cookie.reply())? else {
            return Ok(None);
        };
        if reply.value_len == 0 {
            return Ok(None);
        }
        Ok(Some(String::from_utf8_lossy(&reply.value).into_owned()))
    }

    /// Sends a fire-and-forget request to the window manager: a 32-bit-format
    /// client message addressed to the root window. No reply is awaited and
    /// the window manager is not obliged to honor it.
    /// # Errors
    /// Returns an error if the message couldn't be written to the connection.
    pub fn send_root_request(&self, window: Window, message_type: Atom, data: [u32; 5]) -> Res {
        let event = build_client_message(window, message_type, data);
        self.conn.send_event(
            false,
            self.root,
            EventMask::SUBSTRUCTURE_REDIRECT | EventMask::SUBSTRUCTURE_NOTIFY,
            event,
        )?;
        Ok(())
    }

    /// The generic `_NET_WM_STATE` change request: add/remove `value` for up
    /// to two state atoms, then stamp the window with the root's user time so
    /// the window manager can order the request against real user input.
    fn change_window_state(
        &self,
        window: Window,
        value: u32,
        property1: Atom,
        property2: Atom,
    ) -> Res {
        self.send_root_request(window, self.atoms.net_wm_state, [value, property1, property2, 2, 0])?;
        let timestamp = self.window_timestamp(self.root)?;
        self.set_window_timestamp(window, timestamp)
    }

    fn window_state_set(&self, window: Window) -> Result<Vec<Atom>, ReplyOrIdError> {
        self.get_property32(window, self.atoms.net_wm_state, AtomEnum::ATOM)
    }

    fn window_has_type(&self, window: Window, ty: Atom) -> Result<bool, ReplyOrIdError> {
        let types = self.get_property32(window, self.atoms.net_wm_window_type, AtomEnum::ATOM)?;
        Ok(types.first() == Some(&ty))
    }
}

/// Read-side protocol operations against the root window.
pub trait DesktopQueryExt {
    /// Gets the index of the currently shown desktop. Absent property is
    /// desktop 0.
    /// # Errors
    /// Returns an error only if the connection is broken.
    fn current_desktop(&self) -> Result<u32, ReplyOrIdError>;
    /// Gets the origin of the current viewport in pixels.
    /// # Errors
    /// Returns an error only if the connection is broken.
    fn current_viewport(&self) -> Result<(i32, i32), ReplyOrIdError>;
    /// Gets the number of virtual desktops. Absent property is 0.
    /// # Errors
    /// Returns an error only if the connection is broken.
    fn desktop_count(&self) -> Result<u32, ReplyOrIdError>;
    /// Gets the viewport grid as (columns, rows), derived from the virtual
    /// desktop size divided by the screen size. Defaults to a 1x1 grid.
    /// # Errors
    /// Returns an error only if the connection is broken.
    fn viewport_grid(&self) -> Result<(u32, u32), ReplyOrIdError>;
    /// Whether the window manager is currently showing the bare desktop.
    /// # Errors
    /// Returns an error only if the connection is broken.
    fn desktop_is_visible(&self) -> Result<bool, ReplyOrIdError>;
    /// Gets the managed windows, in z-order or in stacking order.
    /// # Errors
    /// Returns an error only if the connection is broken.
    fn window_list(&self, stacking_order: bool) -> Result<Vec<Window>, ReplyOrIdError>;
    /// Gets the active window, if any.
    /// # Errors
    /// Returns an error only if the connection is broken.
    fn active_window(&self) -> Result<Option<Window>, ReplyOrIdError>;
    /// Whether a named property is present on the root window.
    /// # Errors
    /// Returns an error only if the connection is broken.
    fn root_has_property(&self, name: &str) -> Result<bool, ReplyOrIdError>;
    /// Re-reads the root geometry and returns whether the resolution changed;
    /// the shared geometry record is updated only on a change.
    /// # Errors
    /// Returns an error only if the connection is broken.
    fn update_screen_geometry(&mut self) -> Result<bool, ReplyOrIdError>;
    /// Gets the origin of the given monitor and installs its size as the
    /// physical-screen part of the geometry record. Without Xinerama, or when
    /// it reports no screens, falls back to the full virtual screen at (0,0).
    /// # Errors
    /// Returns an error only if the connection is broken.
    fn screen_offsets(&mut self, num_screen: usize) -> Result<(i32, i32), ReplyOrIdError>;
}

/// Read-side protocol operations against a single window. Window handles are
/// pure references whose validity is decided by the server; a dead handle
/// yields the absent value, never a failure.
pub trait WindowQueryExt {
    /// Gets the desktop a window is assigned to. Absent property is 0.
    /// # Errors
    /// Returns an error only if the connection is broken.
    fn window_desktop(&self, window: Window) -> Result<u32, ReplyOrIdError>;
    /// Gets the window's last user-interaction timestamp, 0 when unknown.
    /// # Errors
    /// Returns an error only if the connection is broken.
    fn window_timestamp(&self, window: Window) -> Result<u32, ReplyOrIdError>;
    /// Gets the window's UTF-8 name. When `legacy_fallback` is set and the
    /// UTF-8 property is absent, falls back to the legacy WM_NAME property.
    /// # Errors
    /// Returns an error only if the connection is broken.
    fn window_name(&self, window: Window, legacy_fallback: bool) -> Result<Option<String>, ReplyOrIdError>;
    /// Gets the (normalized class, raw class hint) pair, `None` when the
    /// window carries no class hint.
    /// # Errors
    /// Returns an error only if the connection is broken.
    fn window_class(&self, window: Window) -> Result<Option<(String, String)>, ReplyOrIdError>;
    /// Whether the window declares the utility window type.
    /// # Errors
    /// Returns an error only if the connection is broken.
    fn window_is_utility(&self, window: Window) -> Result<bool, ReplyOrIdError>;
    /// Whether the window declares the dock window type.
    /// # Errors
    /// Returns an error only if the connection is broken.
    fn window_is_dock(&self, window: Window) -> Result<bool, ReplyOrIdError>;
    /// Whether the window is maximized in both dimensions.
    /// # Errors
    /// Returns an error only if the connection is broken.
    fn window_is_maximized(&self, window: Window) -> Result<bool, ReplyOrIdError>;
    /// Whether the window is fullscreen.
    /// # Errors
    /// Returns an error only if the connection is broken.
    fn window_is_fullscreen(&self, window: Window) -> Result<bool, ReplyOrIdError>;
    /// Whether the window asked to be skipped by taskbars.
    /// # Errors
    /// Returns an error only if the connection is broken.
    fn window_skips_taskbar(&self, window: Window) -> Result<bool, ReplyOrIdError>;
    /// Gets the (above, below) stacking flags; first matching atom wins.
    /// # Errors
    /// Returns an error only if the connection is broken.
    fn window_above_or_below(&self, window: Window) -> Result<(bool, bool), ReplyOrIdError>;
    /// Accumulates the fullscreen/hidden/maximized/attention flags in a
    /// single pass over the window's state set.
    /// # Errors
    /// Returns an error only if the connection is broken.
    fn window_flags(&self, window: Window) -> Result<WindowFlags, ReplyOrIdError>;
    /// Gets the window's top-left corner and extents in current-viewport
    /// coordinates, compensated for the frame decorations.
    /// # Errors
    /// Returns an error only if the connection is broken.
    fn window_geometry(&self, window: Window) -> Result<WindowGeometry, ReplyOrIdError>;
    /// Gets the window's position normalized onto its own viewport, in
    /// `[0, screen_width) x [0, screen_height)`.
    /// # Errors
    /// Returns an error only if the connection is broken.
    fn window_position_on_viewport(&self, window: Window) -> Result<(i32, i32), ReplyOrIdError>;
    /// Gets the window manager's (left, right, top, bottom) decoration
    /// insets, zeros when unreported.
    /// # Errors
    /// Returns an error only if the connection is broken.
    fn frame_extents(&self, window: Window) -> Result<(i32, i32, i32, i32), ReplyOrIdError>;
    /// Gets the background pixmap id recorded on the window, usually queried
    /// on the root for the wallpaper pixmap.
    /// # Errors
    /// Returns an error only if the connection is broken.
    fn window_background_pixmap(&self, window: Window) -> Result<Option<Pixmap>, ReplyOrIdError>;
}

/// Write-side protocol requests. All of these are best-effort: the window
/// manager may refuse or reorder them and no completion signal exists.
pub trait WmRequestExt {
    /// Asks the window manager to switch to a desktop.
    /// # Errors
    /// Returns an error if the request couldn't be written to the connection.
    fn set_current_desktop(&self, desktop: u32) -> Res;
    /// Asks the window manager to move the viewport to a (column, row) index.
    /// # Errors
    /// Returns an error if the request couldn't be written to the connection.
    fn set_current_viewport(&self, viewport_x: u32, viewport_y: u32) -> Res;
    /// Asks the window manager to move the viewport to a pixel origin.
    /// # Errors
    /// Returns an error if the request couldn't be written to the connection.
    fn move_viewport_to(&self, x: u32, y: u32) -> Res;
    /// Asks the window manager to resize the viewport grid.
    /// # Errors
    /// Returns an error if the request couldn't be written to the connection.
    fn set_viewport_grid(&self, columns: u32, rows: u32) -> Res;
    /// Asks the window manager to change the number of desktops.
    /// # Errors
    /// Returns an error if the request couldn't be written to the connection.
    fn set_desktop_count(&self, count: u32) -> Res;
    /// Asks the window manager to show or leave the bare desktop.
    /// # Errors
    /// Returns an error if the request couldn't be written to the connection.
    fn show_desktop(&self, show: bool) -> Res;
    /// Asks the window manager to close a window, stamped with the window's
    /// user time and a direct-user-action source indication.
    /// # Errors
    /// Returns an error if the request couldn't be written to the connection.
    fn close_window(&self, window: Window) -> Res;
    /// Activates a window: switches to its desktop first, then requests
    /// activation.
    /// # Errors
    /// Returns an error if the request couldn't be written to the connection.
    fn activate_window(&self, window: Window) -> Res;
    /// Asks the window manager to iconify a window.
    /// # Errors
    /// Returns an error if the request couldn't be written to the connection.
    fn minimize_window(&self, window: Window) -> Res;
    /// Lowers a window to the bottom of the stacking order.
    /// # Errors
    /// Returns an error if the request couldn't be written to the connection.
    fn lower_window(&self, window: Window) -> Res;
    /// Forcibly disconnects the window's client. Unlike `close_window` this
    /// does not go through the window manager.
    /// # Errors
    /// Returns an error if the request couldn't be written to the connection.
    fn kill_window(&self, window: Window) -> Res;
    /// Toggles both maximize dimensions at once.
    /// # Errors
    /// Returns an error if the request couldn't be written to the connection.
    fn set_window_maximized(&self, window: Window, maximized: bool) -> Res;
    /// Toggles the fullscreen state.
    /// # Errors
    /// Returns an error if the request couldn't be written to the connection.
    fn set_window_fullscreen(&self, window: Window, fullscreen: bool) -> Res;
    /// Toggles the above state.
    /// # Errors
    /// Returns an error if the request couldn't be written to the connection.
    fn set_window_above(&self, window: Window, above: bool) -> Res;
    /// Moves a window to a desktop and a position in that desktop's
    /// viewport-relative coordinates.
    /// # Errors
    /// Returns an error if the request couldn't be written to the connection.
    fn move_window_to_position(&self, window: Window, desktop: u32, x: i32, y: i32) -> Res;
    /// Moves a window to a (desktop, viewport origin) pair, keeping its
    /// position on its own viewport.
    /// # Errors
    /// Returns an error if the request couldn't be written to the connection.
    fn move_window_to_desktop(
        &self,
        window: Window,
        desktop: u32,
        viewport_x: i32,
        viewport_y: i32,
    ) -> Res;
    /// Writes a user-interaction timestamp onto a window.
    /// # Errors
    /// Returns an error if the request couldn't be written to the connection.
    fn set_window_timestamp(&self, window: Window, timestamp: u32) -> Res;
    /// Reserves screen space for a docked window.
    /// # Errors
    /// Returns an error if the request couldn't be written to the connection.
    fn set_strut_partial(&self, window: Window, strut: &StrutPartial) -> Res;
    /// Declares where a window's taskbar icon lives, for minimize animations.
    /// A zero width or height deletes the property instead.
    /// # Errors
    /// Returns an error if the request couldn't be written to the connection.
    fn set_icon_geometry(&self, window: Window, x: i32, y: i32, width: u32, height: u32) -> Res;
    /// Declares the window's type (dock, utility, ...).
    /// # Errors
    /// Returns an error if the request couldn't be written to the connection.
    fn set_window_type(&self, window: Window, window_type: Atom) -> Res;
    /// Selects which events the server delivers for a window; delivery itself
    /// is the event loop's business, not this adapter's.
    /// # Errors
    /// Returns an error if the request couldn't be written to the connection.
    fn select_window_events(&self, window: Window, mask: EventMask) -> Res;
}

impl<C: Connection> DesktopQueryExt for DesktopHandler<'_, C> {
    fn current_desktop(&self) -> Result<u32, ReplyOrIdError> {
        let values =
            self.get_property32(self.root, self.atoms.net_current_desktop, AtomEnum::CARDINAL)?;
        Ok(values.first().copied().unwrap_or(0))
    }

    fn current_viewport(&self) -> Result<(i32, i32), ReplyOrIdError> {
        let cookie = self.conn.get_geometry(self.root)?;
        let (mut x, mut y) = match self.recover("get_geometry", cookie.reply())? {
            Some(reply) => (i32::from(reply.x), i32::from(reply.y)),
            None => (0, 0),
        };
        let viewport =
            self.get_property32(self.root, self.atoms.net_desktop_viewport, AtomEnum::CARDINAL)?;
        if viewport.len() >= 2 {
            x = viewport[0] as i32;
            y = viewport[1] as i32;
        }
        Ok((x, y))
    }

    fn desktop_count(&self) -> Result<u32, ReplyOrIdError> {
        let values = self.get_property32(
            self.root,
            self.atoms.net_number_of_desktops,
            AtomEnum::CARDINAL,
        )?;
        Ok(values.first().copied().unwrap_or(0))
    }

    fn viewport_grid(&self) -> Result<(u32, u32), ReplyOrIdError> {
        let virtual_size =
            self.get_property32(self.root, self.atoms.net_desktop_geometry, AtomEnum::CARDINAL)?;
        let width = self.geometry.x_screen_width(Orientation::Horizontal);
        let height = self.geometry.x_screen_height(Orientation::Horizontal);
        if virtual_size.len() < 2 || width <= 0 || height <= 0 {
            return Ok((1, 1));
        }
        log::debug!(
            "virtual desktop {}x{}; screen {width}x{height}",
            virtual_size[0],
            virtual_size[1]
        );
        Ok((virtual_size[0] / width as u32, virtual_size[1] / height as u32))
    }

    fn desktop_is_visible(&self) -> Result<bool, ReplyOrIdError> {
        let values =
            self.get_property32(self.root, self.atoms.net_showing_desktop, AtomEnum::CARDINAL)?;
        Ok(values.first().copied().unwrap_or(0) != 0)
    }

    fn window_list(&self, stacking_order: bool) -> Result<Vec<Window>, ReplyOrIdError> {
        let property = if stacking_order {
            self.atoms.net_client_list_stacking
        } else {
            self.atoms.net_client_list
        };
        self.get_property32(self.root, property, AtomEnum::WINDOW)
    }

    fn active_window(&self) -> Result<Option<Window>, ReplyOrIdError> {
        let values =
            self.get_property32(self.root, self.atoms.net_active_window, AtomEnum::WINDOW)?;
        Ok(values.first().copied().filter(|&window| window != 0))
    }

    fn root_has_property(&self, name: &str) -> Result<bool, ReplyOrIdError> {
        let atom = self.conn.intern_atom(false, name.as_bytes())?.reply()?.atom;
        let cookie = self.conn.list_properties(self.root)?;
        let Some(reply) = self.recover("list_properties", cookie.reply())? else {
            return Ok(false);
        };
        Ok(reply.atoms.contains(&atom))
    }

    fn update_screen_geometry(&mut self) -> Result<bool, ReplyOrIdError> {
        // the cached Screen is not refreshed after a resolution change, so
        // query the live root geometry instead
        let cookie = self.conn.get_geometry(self.root)?;
        let Some(reply) = self.recover("get_geometry", cookie.reply())? else {
            return Ok(false);
        };
        let changed = self
            .geometry
            .update_virtual_size(i32::from(reply.width), i32::from(reply.height));
        if changed {
            log::debug!("new screen size: {}x{}", reply.width, reply.height);
        }
        Ok(changed)
    }

    fn screen_offsets(&mut self, num_screen: usize) -> Result<(i32, i32), ReplyOrIdError> {
        if !self.extensions.xinerama {
            log::warn!("Xinerama is unavailable, cannot query per-screen offsets");
            return Ok((0, 0));
        }
        let cookie = self.conn.xinerama_query_screens()?;
        let screens = self
            .recover("xinerama_query_screens", cookie.reply())?
            .map(|reply| reply.screen_info)
            .unwrap_or_default();

        if screens.is_empty() {
            log::warn!("no screens reported by Xinerama, is it really active? using the full virtual screen");
            let width = self.geometry.x_screen_width(Orientation::Horizontal);
            let height = self.geometry.x_screen_height(Orientation::Horizontal);
            self.geometry.set_screen_size(width, height);
            return Ok((0, 0));
        }

        let index = if num_screen >= screens.len() {
            log::warn!("screen index {num_screen} is out of range, using the last screen");
            screens.len() - 1
        } else {
            num_screen
        };
        let screen = &screens[index];
        self.geometry
            .set_screen_size(i32::from(screen.width), i32::from(screen.height));
        log::info!(
            "screen {index} => ({};{}) {}x{}",
            screen.x_org,
            screen.y_org,
            screen.width,
            screen.height
        );
        Ok((i32::from(screen.x_org), i32::from(screen.y_org)))
    }
}

impl<C: Connection> WindowQueryExt for DesktopHandler<'_, C> {
    fn window_desktop(&self, window: Window) -> Result<u32, ReplyOrIdError> {
        let values = self.get_property32(window, self.atoms.net_wm_desktop, AtomEnum::CARDINAL)?;
        Ok(values.first().copied().unwrap_or(0))
    }

    fn window_timestamp(&self, window: Window) -> Result<u32, ReplyOrIdError> {
        let values = self.get_property32(window, self.atoms.net_wm_user_time, AtomEnum::CARDINAL)?;
        Ok(values.first().copied().unwrap_or(0))
    }

    fn window_name(
        &self,
        window: Window,
        legacy_fallback: bool,
    ) -> Result<Option<String>, ReplyOrIdError> {
        let name = self.get_property_text(window, self.atoms.net_wm_name, self.atoms.utf8_string)?;
        if name.is_some() || !legacy_fallback {
            return Ok(name);
        }
        self.get_property_text(window, AtomEnum::WM_NAME.into(), AtomEnum::STRING)
    }

    fn window_class(&self, window: Window) -> Result<Option<(String, String)>, ReplyOrIdError> {
        let cookie =
            self.conn
                .get_property(false, window, AtomEnum::WM_CLASS, AtomEnum::STRING, 0, u32::MAX)?;
        let Some(reply) = self.recover("get_property", cookie.reply())? else {
            return Ok(None);
        };
        let Some((res_name, res_class)) = class::parse_class_hint(&reply.value) else {
            return Ok(None);
        };
        log::trace!("res_name {res_name} res_class {res_class}");
        let normalized = class::normalize_class(&res_class, &res_name);
        log::debug!("got an application with class '{normalized}'");
        Ok(Some((normalized, res_class)))
    }

    fn window_is_utility(&self, window: Window) -> Result<bool, ReplyOrIdError> {
        self.window_has_type(window, self.atoms.net_wm_window_type_utility)
    }

    fn window_is_dock(&self, window: Window) -> Result<bool, ReplyOrIdError> {
        self.window_has_type(window, self.atoms.net_wm_window_type_dock)
    }

    fn window_is_maximized(&self, window: Window) -> Result<bool, ReplyOrIdError> {
        let states = self.window_state_set(window)?;
        Ok(self.atoms.state.is_maximized(&states))
    }

    fn window_is_fullscreen(&self, window: Window) -> Result<bool, ReplyOrIdError> {
        let states = self.window_state_set(window)?;
        Ok(states.contains(&self.atoms.state.fullscreen))
    }

    fn window_skips_taskbar(&self, window: Window) -> Result<bool, ReplyOrIdError> {
        let states = self.window_state_set(window)?;
        Ok(states.contains(&self.atoms.state.skip_taskbar))
    }

    fn window_above_or_below(&self, window: Window) -> Result<(bool, bool), ReplyOrIdError> {
        let states = self.window_state_set(window)?;
        Ok(self.atoms.state.above_or_below(&states))
    }

    fn window_flags(&self, window: Window) -> Result<WindowFlags, ReplyOrIdError> {
        let states = self.window_state_set(window)?;
        Ok(self.atoms.state.scan(&states))
    }

    fn window_geometry(&self, window: Window) -> Result<WindowGeometry, ReplyOrIdError> {
        let cookie = self.conn.get_geometry(window)?;
        let Some(geom) = self.recover("get_geometry", cookie.reply())? else {
            return Ok(WindowGeometry::default());
        };

        // some window managers report (0;0) from the direct geometry query,
        // so translate the window's origin into root coordinates instead
        let translated = self.conn.translate_coordinates(window, geom.root, 0, 0)?;
        let (x, y) = match self.recover("translate_coordinates", translated.reply())? {
            Some(t) => (i32::from(t.dst_x), i32::from(t.dst_y)),
            None => (i32::from(geom.x), i32::from(geom.y)),
        };

        // border_width is unreliably 0, compensate with the frame extents
        let (left, right, top, bottom) = self.frame_extents(window)?;
        Ok(WindowGeometry {
            x: x - left,
            y: y - top,
            width: i32::from(geom.width) + left + right,
            height: i32::from(geom.height) + top + bottom,
        })
    }

    fn window_position_on_viewport(&self, window: Window) -> Result<(i32, i32), ReplyOrIdError> {
        let geom = self.window_geometry(window)?;
        let x = geometry::wrap_to_screen(
            geom.x,
            self.geometry.x_screen_width(Orientation::Horizontal),
        );
        let y = geometry::wrap_to_screen(
            geom.y,
            self.geometry.x_screen_height(Orientation::Horizontal),
        );
        Ok((x, y))
    }

    fn frame_extents(&self, window: Window) -> Result<(i32, i32, i32, i32), ReplyOrIdError> {
        let values =
            self.get_property32(window, self.atoms.net_frame_extents, AtomEnum::CARDINAL)?;
        if values.len() >= 4 {
            Ok((
                values[0] as i32,
                values[1] as i32,
                values[2] as i32,
                values[3] as i32,
            ))
        } else {
            Ok((0, 0, 0, 0))
        }
    }

    fn window_background_pixmap(&self, window: Window) -> Result<Option<Pixmap>, ReplyOrIdError> {
        let values = self.get_property32(window, self.atoms.xrootpmap_id, AtomEnum::PIXMAP)?;
        Ok(values.first().copied().filter(|&pixmap| pixmap != 0))
    }
}

impl<C: Connection> WmRequestExt for DesktopHandler<'_, C> {
    fn set_current_desktop(&self, desktop: u32) -> Res {
        let timestamp = self.window_timestamp(self.root)?;
        self.send_root_request(
            self.root,
            self.atoms.net_current_desktop,
            [desktop, timestamp, 0, 0, 0],
        )
    }

    fn set_current_viewport(&self, viewport_x: u32, viewport_y: u32) -> Res {
        let width = self.geometry.x_screen_width(Orientation::Horizontal) as u32;
        let height = self.geometry.x_screen_height(Orientation::Horizontal) as u32;
        self.move_viewport_to(viewport_x * width, viewport_y * height)
    }

    fn move_viewport_to(&self, x: u32, y: u32) -> Res {
        self.send_root_request(self.root, self.atoms.net_desktop_viewport, [x, y, 0, 0, 0])
    }

    fn set_viewport_grid(&self, columns: u32, rows: u32) -> Res {
        let width = self.geometry.x_screen_width(Orientation::Horizontal) as u32;
        let height = self.geometry.x_screen_height(Orientation::Horizontal) as u32;
        self.send_root_request(
            self.root,
            self.atoms.net_desktop_geometry,
            [columns * width, rows * height, 0, 2, 0],
        )
    }

    fn set_desktop_count(&self, count: u32) -> Res {
        self.send_root_request(
            self.root,
            self.atoms.net_number_of_desktops,
            [count, 0, 0, 2, 0],
        )
    }

    fn show_desktop(&self, show: bool) -> Res {
        log::debug!("show desktop ({show})");
        self.send_root_request(
            self.root,
            self.atoms.net_showing_desktop,
            [u32::from(show), 0, 0, 2, 0],
        )
    }

    fn close_window(&self, window: Window) -> Res {
        let timestamp = self.window_timestamp(window)?;
        // source indication 2: a pager or other direct user action
        self.send_root_request(window, self.atoms.net_close_window, [timestamp, 2, 0, 0, 0])
    }

    fn activate_window(&self, window: Window) -> Res {
        // switch to the window's desktop first, otherwise some window
        // managers move the window onto the current desktop instead
        let desktop = self.window_desktop(window)?;
        self.set_current_desktop(desktop)?;
        self.send_root_request(window, self.atoms.net_active_window, [2, 0, 0, 0, 0])
    }

    fn minimize_window(&self, window: Window) -> Res {
        // ICCCM 4.1.4: iconify by sending WM_CHANGE_STATE with IconicState
        self.send_root_request(window, self.atoms.wm_change_state, [3, 0, 0, 0, 0])
    }

    fn lower_window(&self, window: Window) -> Res {
        self.conn
            .configure_window(window, &ConfigureWindowAux::new().stack_mode(StackMode::BELOW))?;
        Ok(())
    }

    fn kill_window(&self, window: Window) -> Res {
        log::debug!("killing the client of window {window}");
        self.conn.kill_client(window)?;
        Ok(())
    }

    fn set_window_maximized(&self, window: Window, maximized: bool) -> Res {
        self.change_window_state(
            window,
            u32::from(maximized),
            self.atoms.state.maximized_vert,
            self.atoms.state.maximized_horz,
        )
    }

    fn set_window_fullscreen(&self, window: Window, fullscreen: bool) -> Res {
        self.change_window_state(window, u32::from(fullscreen), self.atoms.state.fullscreen, 0)
    }

    fn set_window_above(&self, window: Window, above: bool) -> Res {
        self.change_window_state(window, u32::from(above), self.atoms.state.above, 0)
    }

    fn move_window_to_position(&self, window: Window, desktop: u32, x: i32, y: i32) -> Res {
        self.send_root_request(window, self.atoms.net_wm_desktop, [desktop, 2, 0, 0, 0])?;
        // static gravity, x and y present, width and height absent
        let flags = u32::from(Gravity::STATIC) | (1 << 8) | (1 << 9);
        self.send_root_request(
            window,
            self.atoms.net_moveresize_window,
            [flags, x as u32, y as u32, 0, 0],
        )
    }

    fn move_window_to_desktop(
        &self,
        window: Window,
        desktop: u32,
        viewport_x: i32,
        viewport_y: i32,
    ) -> Res {
        let (x, y) = self.window_position_on_viewport(window)?;
        self.move_window_to_position(window, desktop, viewport_x + x, viewport_y + y)
    }

    fn set_window_timestamp(&self, window: Window, timestamp: u32) -> Res {
        self.conn.change_property32(
            PropMode::REPLACE,
            window,
            self.atoms.net_wm_user_time,
            AtomEnum::CARDINAL,
            &[timestamp],
        )?;
        Ok(())
    }

    fn set_strut_partial(&self, window: Window, strut: &StrutPartial) -> Res {
        log::debug!("strut of {window}: {strut:?}");
        self.conn.change_property32(
            PropMode::REPLACE,
            window,
            self.atoms.net_wm_strut_partial,
            AtomEnum::CARDINAL,
            &strut.to_cardinals(),
        )?;
        let timestamp = self.window_timestamp(self.root)?;
        self.set_window_timestamp(window, timestamp)
    }

    fn set_icon_geometry(&self, window: Window, x: i32, y: i32, width: u32, height: u32) -> Res {
        if width == 0 || height == 0 {
            self.conn
                .delete_property(window, self.atoms.net_wm_icon_geometry)?;
            return Ok(());
        }
        self.conn.change_property32(
            PropMode::REPLACE,
            window,
            self.atoms.net_wm_icon_geometry,
            AtomEnum::CARDINAL,
            &[x as u32, y as u32, width, height],
        )?;
        Ok(())
    }

    fn set_window_type(&self, window: Window, window_type: Atom) -> Res {
        self.conn.change_property32(
            PropMode::REPLACE,
            window,
            self.atoms.net_wm_window_type,
            AtomEnum::ATOM,
            &[window_type],
        )?;
        Ok(())
    }

    fn select_window_events(&self, window: Window, mask: EventMask) -> Res {
        self.conn
            .change_window_attributes(window, &ChangeWindowAttributesAux::new().event_mask(mask))?;
        Ok(())
    }
}

/// Builds the 32-bit-format client message every request is sent as.
fn build_client_message(window: Window, message_type: Atom, data: [u32; 5]) -> ClientMessageEvent {
    ClientMessageEvent::new(32, window, message_type, data)
}

/// Decodes the 32-bit values of a property reply. A missing property or a
/// type mismatch both come back as an empty reply, so both decode to no
/// values.
fn property_values(reply: &GetPropertyReply) -> Vec<u32> {
    reply.value32().map(Iterator::collect).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn close_request_has_the_documented_layout() {
        let event = build_client_message(0x40_0001, 77, [1234, 2, 0, 0, 0]);
        assert_eq!(event.format, 32);
        assert_eq!(event.window, 0x40_0001);
        assert_eq!(event.type_, 77);
        assert_eq!(event.data.as_data32(), [1234, 2, 0, 0, 0]);
    }

    #[test]
    fn activate_request_carries_the_source_indication() {
        let event = build_client_message(0x40_0002, 78, [2, 0, 0, 0, 0]);
        assert_eq!(event.data.as_data32()[0], 2);
    }

    #[test]
    fn absent_property_decodes_to_no_values() {
        let reply = GetPropertyReply {
            format: 0,
            sequence: 0,
            length: 0,
            type_: 0,
            bytes_after: 0,
            value_len: 0,
            value: Vec::new(),
        };
        assert_eq!(property_values(&reply), Vec::<u32>::new());
    }

    #[test]
    fn cardinal_property_decodes_native_width_values() {
        let reply = GetPropertyReply {
            format: 32,
            sequence: 0,
            length: 2,
            type_: u32::from(AtomEnum::CARDINAL),
            bytes_after: 0,
            value_len: 2,
            value: vec![3, 0, 0, 0, 0x10, 0, 0, 0],
        };
        assert_eq!(property_values(&reply), vec![3, 16]);
    }

    #[test]
    fn format_mismatch_decodes_to_no_values() {
        let reply = GetPropertyReply {
            format: 8,
            sequence: 0,
            length: 1,
            type_: u32::from(AtomEnum::STRING),
            bytes_after: 0,
            value_len: 4,
            value: b"name".to_vec(),
        };
        assert_eq!(property_values(&reply), Vec::<u32>::new());
    }
}
