//! Linux `input-event-codes` constants and the key code to symbolic name table.
//!
//! Values are taken from `include/uapi/linux/input-event-codes.h`.
//!
//! # Why symbolic names? (for beginners)
//!
//! The kernel reports every key as a small integer (`KEY_A` is 30).  Keymap
//! files are written by people, so they name keys the way the header does
//! (`KEY_A 1C`).  This table is the bridge between the two: the keymap parser
//! resolves each name to its code once at load time, and the translator only
//! ever compares integers afterwards.
//!
//! Every keyboard key from `KEY_ESC` (1) to `KEY_MICMUTE` (248) is listed.  Mouse buttons and relative axes are never
//! looked up by name, so they appear here as plain constants.

// ── Event types ───────────────────────────────────────────────────────────────

pub const EV_SYN: u16 = 0x00;
pub const EV_KEY: u16 = 0x01;
pub const EV_REL: u16 = 0x02;

// ── Relative axes ─────────────────────────────────────────────────────────────

pub const REL_X: u16 = 0x00;
pub const REL_Y: u16 = 0x01;
pub const REL_WHEEL: u16 = 0x08;

// ── Mouse buttons ─────────────────────────────────────────────────────────────

pub const BTN_LEFT: u16 = 0x110;
pub const BTN_RIGHT: u16 = 0x111;
pub const BTN_MIDDLE: u16 = 0x112;

// ── Keys with a fixed role ────────────────────────────────────────────────────

/// First key of the capture hotkey combination.
pub const KEY_LEFTSHIFT: u16 = 42;
/// Second key of the capture hotkey combination.
pub const KEY_LEFTCTRL: u16 = 29;
/// Third key of the capture hotkey combination.
pub const KEY_ESC: u16 = 1;
/// Always present on a keyboard; half of the keyboard fingerprint.
pub const KEY_BACKSPACE: u16 = 14;
/// Always present on a keyboard; the other half of the fingerprint.
pub const KEY_ENTER: u16 = 28;

/// Key codes and their names, sorted by code.
const KEY_NAMES: &[(u16, &str)] = &[
    (1, "KEY_ESC"),
    (2, "KEY_1"),
    (3, "KEY_2"),
    (4, "KEY_3"),
    (5, "KEY_4"),
    (6, "KEY_5"),
    (7, "KEY_6"),
    (8, "KEY_7"),
    (9, "KEY_8"),
    (10, "KEY_9"),
    (11, "KEY_0"),
    (12, "KEY_MINUS"),
    (13, "KEY_EQUAL"),
    (14, "KEY_BACKSPACE"),
    (15, "KEY_TAB"),
    (16, "KEY_Q"),
    (17, "KEY_W"),
    (18, "KEY_E"),
    (19, "KEY_R"),
    (20, "KEY_T"),
    (21, "KEY_Y"),
    (22, "KEY_U"),
    (23, "KEY_I"),
    (24, "KEY_O"),
    (25, "KEY_P"),
    (26, "KEY_LEFTBRACE"),
    (27, "KEY_RIGHTBRACE"),
    (28, "KEY_ENTER"),
    (29, "KEY_LEFTCTRL"),
    (30, "KEY_A"),
    (31, "KEY_S"),
    (32, "KEY_D"),
    (33, "KEY_F"),
    (34, "KEY_G"),
    (35, "KEY_H"),
    (36, "KEY_J"),
    (37, "KEY_K"),
    (38, "KEY_L"),
    (39, "KEY_SEMICOLON"),
    (40, "KEY_APOSTROPHE"),
    (41, "KEY_GRAVE"),
    (42, "KEY_LEFTSHIFT"),
    (43, "KEY_BACKSLASH"),
    (44, "KEY_Z"),
    (45, "KEY_X"),
    (46, "KEY_C"),
    (47, "KEY_V"),
    (48, "KEY_B"),
    (49, "KEY_N"),
    (50, "KEY_M"),
    (51, "KEY_COMMA"),
    (52, "KEY_DOT"),
    (53, "KEY_SLASH"),
    (54, "KEY_RIGHTSHIFT"),
    (55, "KEY_KPASTERISK"),
    (56, "KEY_LEFTALT"),
    (57, "KEY_SPACE"),
    (58, "KEY_CAPSLOCK"),
    (59, "KEY_F1"),
    (60, "KEY_F2"),
    (61, "KEY_F3"),
    (62, "KEY_F4"),
    (63, "KEY_F5"),
    (64, "KEY_F6"),
    (65, "KEY_F7"),
    (66, "KEY_F8"),
    (67, "KEY_F9"),
    (68, "KEY_F10"),
    (69, "KEY_NUMLOCK"),
    (70, "KEY_SCROLLLOCK"),
    (71, "KEY_KP7"),
    (72, "KEY_KP8"),
    (73, "KEY_KP9"),
    (74, "KEY_KPMINUS"),
    (75, "KEY_KP4"),
    (76, "KEY_KP5"),
    (77, "KEY_KP6"),
    (78, "KEY_KPPLUS"),
    (79, "KEY_KP1"),
    (80, "KEY_KP2"),
    (81, "KEY_KP3"),
    (82, "KEY_KP0"),
    (83, "KEY_KPDOT"),
    (85, "KEY_ZENKAKUHANKAKU"),
    (86, "KEY_102ND"),
    (87, "KEY_F11"),
    (88, "KEY_F12"),
    (89, "KEY_RO"),
    (90, "KEY_KATAKANA"),
    (91, "KEY_HIRAGANA"),
    (92, "KEY_HENKAN"),
    (93, "KEY_KATAKANAHIRAGANA"),
    (94, "KEY_MUHENKAN"),
    (95, "KEY_KPJPCOMMA"),
    (96, "KEY_KPENTER"),
    (97, "KEY_RIGHTCTRL"),
    (98, "KEY_KPSLASH"),
    (99, "KEY_SYSRQ"),
    (100, "KEY_RIGHTALT"),
    (101, "KEY_LINEFEED"),
    (102, "KEY_HOME"),
    (103, "KEY_UP"),
    (104, "KEY_PAGEUP"),
    (105, "KEY_LEFT"),
    (106, "KEY_RIGHT"),
    (107, "KEY_END"),
    (108, "KEY_DOWN"),
    (109, "KEY_PAGEDOWN"),
    (110, "KEY_INSERT"),
    (111, "KEY_DELETE"),
    (112, "KEY_MACRO"),
    (113, "KEY_MUTE"),
    (114, "KEY_VOLUMEDOWN"),
    (115, "KEY_VOLUMEUP"),
    (116, "KEY_POWER"),
    (117, "KEY_KPEQUAL"),
    (118, "KEY_KPPLUSMINUS"),
    (119, "KEY_PAUSE"),
    (120, "KEY_SCALE"),
    (121, "KEY_KPCOMMA"),
    (122, "KEY_HANGEUL"),
    (123, "KEY_HANJA"),
    (124, "KEY_YEN"),
    (125, "KEY_LEFTMETA"),
    (126, "KEY_RIGHTMETA"),
    (127, "KEY_COMPOSE"),
    (128, "KEY_STOP"),
    (129, "KEY_AGAIN"),
    (130, "KEY_PROPS"),
    (131, "KEY_UNDO"),
    (132, "KEY_FRONT"),
    (133, "KEY_COPY"),
    (134, "KEY_OPEN"),
    (135, "KEY_PASTE"),
    (136, "KEY_FIND"),
    (137, "KEY_CUT"),
    (138, "KEY_HELP"),
    (139, "KEY_MENU"),
    (140, "KEY_CALC"),
    (141, "KEY_SETUP"),
    (142, "KEY_SLEEP"),
    (143, "KEY_WAKEUP"),
    (144, "KEY_FILE"),
    (145, "KEY_SENDFILE"),
    (146, "KEY_DELETEFILE"),
    (147, "KEY_XFER"),
    (148, "KEY_PROG1"),
    (149, "KEY_PROG2"),
    (150, "KEY_WWW"),
    (151, "KEY_MSDOS"),
    (152, "KEY_COFFEE"),
    (153, "KEY_ROTATE_DISPLAY"),
    (154, "KEY_CYCLEWINDOWS"),
    (155, "KEY_MAIL"),
    (156, "KEY_BOOKMARKS"),
    (157, "KEY_COMPUTER"),
    (158, "KEY_BACK"),
    (159, "KEY_FORWARD"),
    (160, "KEY_CLOSECD"),
    (161, "KEY_EJECTCD"),
    (162, "KEY_EJECTCLOSECD"),
    (163, "KEY_NEXTSONG"),
    (164, "KEY_PLAYPAUSE"),
    (165, "KEY_PREVIOUSSONG"),
    (166, "KEY_STOPCD"),
    (167, "KEY_RECORD"),
    (168, "KEY_REWIND"),
    (169, "KEY_PHONE"),
    (170, "KEY_ISO"),
    (171, "KEY_CONFIG"),
    (172, "KEY_HOMEPAGE"),
    (173, "KEY_REFRESH"),
    (174, "KEY_EXIT"),
    (175, "KEY_MOVE"),
    (176, "KEY_EDIT"),
    (177, "KEY_SCROLLUP"),
    (178, "KEY_SCROLLDOWN"),
    (179, "KEY_KPLEFTPAREN"),
    (180, "KEY_KPRIGHTPAREN"),
    (181, "KEY_NEW"),
    (182, "KEY_REDO"),
    (183, "KEY_F13"),
    (184, "KEY_F14"),
    (185, "KEY_F15"),
    (186, "KEY_F16"),
    (187, "KEY_F17"),
    (188, "KEY_F18"),
    (189, "KEY_F19"),
    (190, "KEY_F20"),
    (191, "KEY_F21"),
    (192, "KEY_F22"),
    (193, "KEY_F23"),
    (194, "KEY_F24"),
    (200, "KEY_PLAYCD"),
    (201, "KEY_PAUSECD"),
    (202, "KEY_PROG3"),
    (203, "KEY_PROG4"),
    (204, "KEY_ALL_APPLICATIONS"),
    (205, "KEY_SUSPEND"),
    (206, "KEY_CLOSE"),
    (207, "KEY_PLAY"),
    (208, "KEY_FASTFORWARD"),
    (209, "KEY_BASSBOOST"),
    (210, "KEY_PRINT"),
    (211, "KEY_HP"),
    (212, "KEY_CAMERA"),
    (213, "KEY_SOUND"),
    (214, "KEY_QUESTION"),
    (215, "KEY_EMAIL"),
    (216, "KEY_CHAT"),
    (217, "KEY_SEARCH"),
    (218, "KEY_CONNECT"),
    (219, "KEY_FINANCE"),
    (220, "KEY_SPORT"),
    (221, "KEY_SHOP"),
    (222, "KEY_ALTERASE"),
    (223, "KEY_CANCEL"),
    (224, "KEY_BRIGHTNESSDOWN"),
    (225, "KEY_BRIGHTNESSUP"),
    (226, "KEY_MEDIA"),
    (227, "KEY_SWITCHVIDEOMODE"),
    (228, "KEY_KBDILLUMTOGGLE"),
    (229, "KEY_KBDILLUMDOWN"),
    (230, "KEY_KBDILLUMUP"),
    (231, "KEY_SEND"),
    (232, "KEY_REPLY"),
    (233, "KEY_FORWARDMAIL"),
    (234, "KEY_SAVE"),
    (235, "KEY_DOCUMENTS"),
    (236, "KEY_BATTERY"),
    (237, "KEY_BLUETOOTH"),
    (238, "KEY_WLAN"),
    (239, "KEY_UWB"),
    (240, "KEY_UNKNOWN"),
    (241, "KEY_VIDEO_NEXT"),
    (242, "KEY_VIDEO_PREV"),
    (243, "KEY_BRIGHTNESS_CYCLE"),
    (244, "KEY_BRIGHTNESS_AUTO"),
    (245, "KEY_DISPLAY_OFF"),
    (246, "KEY_WWAN"),
    (247, "KEY_RFKILL"),
    (248, "KEY_MICMUTE"),
];

/// Older spellings the header keeps as `#define` aliases of a listed key.
const KEY_ALIASES: &[(&str, u16)] = &[
    ("KEY_HANGUEL", 122),
    ("KEY_SCREENLOCK", 152),
    ("KEY_DIRECTION", 153),
    ("KEY_DASHBOARD", 204),
    ("KEY_BRIGHTNESS_ZERO", 244),
    ("KEY_WIMAX", 246),
];

/// Returns the symbolic name (`"KEY_A"`) for a keyboard key code.
///
/// Returns `None` for codes outside the table, including all mouse buttons.
pub fn code_to_name(code: u16) -> Option<&'static str> {
    KEY_NAMES
        .binary_search_by_key(&code, |&(c, _)| c)
        .ok()
        .map(|idx| KEY_NAMES[idx].1)
}

/// Returns the key code for a symbolic name such as `"KEY_ENTER"`.
///
/// The comparison is exact; keymap files use the upper-case header spelling.
/// Header aliases such as `KEY_SCREENLOCK` resolve to the same code as their
/// primary name.
pub fn name_to_code(name: &str) -> Option<u16> {
    KEY_NAMES
        .iter()
        .find(|&&(_, n)| n == name)
        .map(|&(code, _)| code)
        .or_else(|| {
            KEY_ALIASES
                .iter()
                .find(|&&(n, _)| n == name)
                .map(|&(_, code)| code)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_sorted_by_code_for_binary_search() {
        assert!(KEY_NAMES.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn test_letter_codes_match_kernel_header() {
        assert_eq!(name_to_code("KEY_A"), Some(30));
        assert_eq!(name_to_code("KEY_Q"), Some(16));
        assert_eq!(name_to_code("KEY_Z"), Some(44));
    }

    #[test]
    fn test_combo_constants_resolve_to_their_names() {
        assert_eq!(code_to_name(KEY_LEFTSHIFT), Some("KEY_LEFTSHIFT"));
        assert_eq!(code_to_name(KEY_LEFTCTRL), Some("KEY_LEFTCTRL"));
        assert_eq!(code_to_name(KEY_ESC), Some("KEY_ESC"));
    }

    #[test]
    fn test_fingerprint_keys_resolve() {
        assert_eq!(code_to_name(KEY_BACKSPACE), Some("KEY_BACKSPACE"));
        assert_eq!(code_to_name(KEY_ENTER), Some("KEY_ENTER"));
    }

    #[test]
    fn test_mouse_buttons_have_no_key_name() {
        for code in [BTN_LEFT, BTN_RIGHT, BTN_MIDDLE] {
            assert_eq!(code_to_name(code), None, "0x{code:X} must not be a keyboard key");
        }
    }

    #[test]
    fn test_every_name_round_trips_through_both_lookups() {
        for &(code, name) in KEY_NAMES {
            assert_eq!(code_to_name(code), Some(name));
            assert_eq!(name_to_code(name), Some(code));
        }
    }

    #[test]
    fn test_table_covers_every_code_through_micmute() {
        // 84 and 195..=199 are unassigned in the header.
        let expected = (1..=248u16).filter(|c| *c != 84 && !(195..=199).contains(c));
        for code in expected {
            assert!(code_to_name(code).is_some(), "key code {code} has no name");
        }
    }

    #[test]
    fn test_media_and_system_keys_match_kernel_header() {
        assert_eq!(name_to_code("KEY_MENU"), Some(139));
        assert_eq!(name_to_code("KEY_BACK"), Some(158));
        assert_eq!(name_to_code("KEY_PLAYPAUSE"), Some(164));
        assert_eq!(name_to_code("KEY_PRINT"), Some(210));
        assert_eq!(name_to_code("KEY_MICMUTE"), Some(248));
    }

    #[test]
    fn test_aliases_resolve_but_codes_keep_primary_name() {
        for &(alias, code) in KEY_ALIASES {
            assert_eq!(name_to_code(alias), Some(code));
            assert_ne!(code_to_name(code), Some(alias));
        }
        assert_eq!(code_to_name(152), Some("KEY_COFFEE"));
    }

    #[test]
    fn test_lower_case_names_are_not_accepted() {
        assert_eq!(name_to_code("key_a"), None);
    }

    #[test]
    fn test_extended_function_keys_are_present() {
        assert_eq!(name_to_code("KEY_F13"), Some(183));
        assert_eq!(name_to_code("KEY_F24"), Some(194));
    }
}
