use std::collections::HashMap;

use x11rb::{
    connection::Connection,
    errors::ReplyOrIdError,
    protocol::xproto::{Atom, ConnectionExt},
};

use crate::state::StateAtoms;

const ATOM_NAMES: &[&str] = &[
    "_NET_WM_WINDOW_TYPE",
    "_NET_WM_WINDOW_TYPE_NORMAL",
    "_NET_WM_WINDOW_TYPE_UTILITY",
    "_NET_WM_WINDOW_TYPE_DOCK",
    "_NET_WM_ICON_GEOMETRY",
    "_NET_CURRENT_DESKTOP",
    "_NET_DESKTOP_VIEWPORT",
    "_NET_DESKTOP_GEOMETRY",
    "_NET_NUMBER_OF_DESKTOPS",
    "_XROOTPMAP_ID",
    "_NET_CLIENT_LIST",
    "_NET_CLIENT_LIST_STACKING",
    "_NET_ACTIVE_WINDOW",
    "_NET_WM_STATE",
    "_NET_WM_STATE_FULLSCREEN",
    "_NET_WM_STATE_ABOVE",
    "_NET_WM_STATE_BELOW",
    "_NET_WM_STATE_HIDDEN",
    "_NET_WM_STATE_SKIP_TASKBAR",
    "_NET_WM_STATE_MAXIMIZED_HORZ",
    "_NET_WM_STATE_MAXIMIZED_VERT",
    "_NET_WM_STATE_DEMANDS_ATTENTION",
    "_NET_WM_DESKTOP",
    "_NET_WM_NAME",
    "_NET_WM_USER_TIME",
    "_NET_FRAME_EXTENTS",
    "_NET_SHOWING_DESKTOP",
    "_NET_CLOSE_WINDOW",
    "_NET_MOVERESIZE_WINDOW",
    "_NET_WM_STRUT_PARTIAL",
    "WM_CHANGE_STATE",
    "UTF8_STRING",
];

/// Every protocol atom the adapter speaks, resolved once at initialization
/// and immutable afterwards.
pub struct Atoms {
    pub net_wm_window_type: Atom,
    pub net_wm_window_type_normal: Atom,
    pub net_wm_window_type_utility: Atom,
    pub net_wm_window_type_dock: Atom,
    pub net_wm_icon_geometry: Atom,
    pub net_current_desktop: Atom,
    pub net_desktop_viewport: Atom,
    pub net_desktop_geometry: Atom,
    pub net_number_of_desktops: Atom,
    pub xrootpmap_id: Atom,
    pub net_client_list: Atom,
    pub net_client_list_stacking: Atom,
    pub net_active_window: Atom,
    pub net_wm_state: Atom,
    pub net_wm_desktop: Atom,
    pub net_wm_name: Atom,
    pub net_wm_user_time: Atom,
    pub net_frame_extents: Atom,
    pub net_showing_desktop: Atom,
    pub net_close_window: Atom,
    pub net_moveresize_window: Atom,
    pub net_wm_strut_partial: Atom,
    pub wm_change_state: Atom,
    pub utf8_string: Atom,
    pub state: StateAtoms,
}

impl Atoms {
    /// Resolves every atom the adapter speaks in one batch of round-trips.
    /// # Errors
    /// Returns an error if the connection is faulty.
    pub fn new<C: Connection>(conn: &C) -> Result<Self, ReplyOrIdError> {
        let atoms = intern_all(conn, ATOM_NAMES)?;

        Ok(Self {
            net_wm_window_type: atoms["_NET_WM_WINDOW_TYPE"],
            net_wm_window_type_normal: atoms["_NET_WM_WINDOW_TYPE_NORMAL"],
            net_wm_window_type_utility: atoms["_NET_WM_WINDOW_TYPE_UTILITY"],
            net_wm_window_type_dock: atoms["_NET_WM_WINDOW_TYPE_DOCK"],
            net_wm_icon_geometry: atoms["_NET_WM_ICON_GEOMETRY"],
            net_current_desktop: atoms["_NET_CURRENT_DESKTOP"],
            net_desktop_viewport: atoms["_NET_DESKTOP_VIEWPORT"],
            net_desktop_geometry: atoms["_NET_DESKTOP_GEOMETRY"],
            net_number_of_desktops: atoms["_NET_NUMBER_OF_DESKTOPS"],
            xrootpmap_id: atoms["_XROOTPMAP_ID"],
            net_client_list: atoms["_NET_CLIENT_LIST"],
            net_client_list_stacking: atoms["_NET_CLIENT_LIST_STACKING"],
            net_active_window: atoms["_NET_ACTIVE_WINDOW"],
            net_wm_state: atoms["_NET_WM_STATE"],
            net_wm_desktop: atoms["_NET_WM_DESKTOP"],
            net_wm_name: atoms["_NET_WM_NAME"],
            net_wm_user_time: atoms["_NET_WM_USER_TIME"],
            net_frame_extents: atoms["_NET_FRAME_EXTENTS"],
            net_showing_desktop: atoms["_NET_SHOWING_DESKTOP"],
            net_close_window: atoms["_NET_CLOSE_WINDOW"],
            net_moveresize_window: atoms["_NET_MOVERESIZE_WINDOW"],
            net_wm_strut_partial: atoms["_NET_WM_STRUT_PARTIAL"],
            wm_change_state: atoms["WM_CHANGE_STATE"],
            utf8_string: atoms["UTF8_STRING"],
            state: StateAtoms {
                fullscreen: atoms["_NET_WM_STATE_FULLSCREEN"],
                above: atoms["_NET_WM_STATE_ABOVE"],
                below: atoms["_NET_WM_STATE_BELOW"],
                hidden: atoms["_NET_WM_STATE_HIDDEN"],
                skip_taskbar: atoms["_NET_WM_STATE_SKIP_TASKBAR"],
                maximized_horz: atoms["_NET_WM_STATE_MAXIMIZED_HORZ"],
                maximized_vert: atoms["_NET_WM_STATE_MAXIMIZED_VERT"],
                demands_attention: atoms["_NET_WM_STATE_DEMANDS_ATTENTION"],
            },
        })
    }
}

fn intern_all<'a, C: Connection>(
    conn: &C,
    names: &[&'a str],
) -> Result<HashMap<&'a str, Atom>, ReplyOrIdError> {
    let cookies = names
        .iter()
        .map(|name| Ok((*name, conn.intern_atom(false, name.as_bytes())?)))
        .collect::<Result<Vec<_>, ReplyOrIdError>>()?;

    let mut atoms = HashMap::new();
    for (name, cookie) in cookies {
        atoms.insert(name, cookie.reply()?.atom);
    }
    Ok(atoms)
}
