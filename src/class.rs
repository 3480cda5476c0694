//!
//! This module normalizes WM_CLASS hints into a stable application class.
//!
//! Applications are inconsistent about their class hints: some capitalize per window, Wine reports "Wine" for every hosted executable, Mono applications report the executable's absolute path, and some append version numbers. The normalized class is what consumers should key icons and grouping on.

/// Splits the raw `WM_CLASS` property value into its (instance, class) pair.
///
/// The property holds two NUL-terminated strings. Returns `None` when the
/// class half is missing or empty.
#[must_use]
pub fn parse_class_hint(value: &[u8]) -> Option<(String, String)> {
    let mut parts = value.split(|&byte| byte == 0);
    let instance = String::from_utf8_lossy(parts.next()?).into_owned();
    let class = String::from_utf8_lossy(parts.next()?).into_owned();
    if class.is_empty() {
        return None;
    }
    Some((instance, class))
}

/// Derives the effective application class from a class-hint pair.
///
/// Wine windows all share the class "Wine"; the instance name carries the
/// hosted executable, so it is promoted instead. Mono applications report an
/// absolute path ending in `.exe`; the basename is kept. Everything is
/// lowercased, then a trailing version suffix and anything after the first
/// dot are stripped.
#[must_use]
pub fn normalize_class(res_class: &str, res_name: &str) -> String {
    let mut class = if res_class == "Wine" && res_name.ends_with(".exe") {
        log::debug!("wine application detected, using the instance name '{res_name}'");
        res_name.to_ascii_lowercase()
    } else if res_class.starts_with('/') && res_class.ends_with(".exe") {
        let base = res_class.rsplit('/').next().unwrap_or(res_class);
        base[..base.len() - ".exe".len()].to_ascii_lowercase()
    } else {
        res_class.to_ascii_lowercase()
    };
    strip_version_suffix(&mut class);
    if let Some(dot) = class.find('.') {
        class.truncate(dot);
    }
    class
}

/// Strips a trailing version made of digits and dots preceded by a dash or a
/// space ("Glade-2", "OpenOffice 3.1"). Returns whether anything was removed.
pub fn strip_version_suffix(class: &mut String) -> bool {
    let bytes = class.as_bytes();
    let mut index = bytes.len();
    while index > 0 {
        let byte = bytes[index - 1];
        if byte.is_ascii_digit() || byte == b'.' {
            index -= 1;
            continue;
        }
        if byte == b'-' || byte == b' ' {
            class.truncate(index - 1);
            return true;
        }
        return false;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wine_executables_use_the_instance_name() {
        assert_eq!(normalize_class("Wine", "Notepad.exe"), "notepad");
    }

    #[test]
    fn mono_paths_keep_the_basename() {
        assert_eq!(normalize_class("/usr/lib/tomboy/Tomboy.exe", "tomboy"), "tomboy");
    }

    #[test]
    fn plain_classes_are_lowercased() {
        assert_eq!(normalize_class("Firefox", "Navigator"), "firefox");
    }

    #[test]
    fn version_then_extension_are_stripped() {
        // "OpenOffice.org-3.1" -> version strip -> "openoffice.org" -> first dot -> "openoffice"
        assert_eq!(normalize_class("OpenOffice.org-3.1", "soffice"), "openoffice");
    }

    #[test]
    fn script_extensions_are_stripped() {
        assert_eq!(normalize_class("jbrout.py", "jbrout"), "jbrout");
    }

    #[test]
    fn version_suffix_variants() {
        let mut class = String::from("glade-2");
        assert!(strip_version_suffix(&mut class));
        assert_eq!(class, "glade");

        let mut class = String::from("openoffice 3.1");
        assert!(strip_version_suffix(&mut class));
        assert_eq!(class, "openoffice");

        let mut class = String::from("firefox");
        assert!(!strip_version_suffix(&mut class));
        assert_eq!(class, "firefox");

        let mut class = String::from("x264");
        assert!(!strip_version_suffix(&mut class));
        assert_eq!(class, "x264");
    }

    #[test]
    fn class_hint_pair_splits_on_nul() {
        let value = b"Navigator\0Firefox\0";
        assert_eq!(
            parse_class_hint(value),
            Some((String::from("Navigator"), String::from("Firefox")))
        );
        assert_eq!(parse_class_hint(b""), None);
        assert_eq!(parse_class_hint(b"instance\0"), None);
    }
}
