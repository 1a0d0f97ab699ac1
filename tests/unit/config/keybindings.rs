use super::*;

#[test]
fn parse_key_handles_modifiers_and_named_keys() {
    assert_eq!(parse_key("ctrl+l"), Some(Key::ctrl(KeyCode::Char('l'))));
    assert_eq!(
        parse_key("Ctrl + Shift + X"),
        Some(Key::new(
            KeyCode::Char('x'),
            KeyModifiers::CONTROL | KeyModifiers::SHIFT
        ))
    );
    assert_eq!(parse_key("f10"), Some(Key::simple(KeyCode::F(10))));
    assert_eq!(parse_key("pagedown"), Some(Key::simple(KeyCode::PageDown)));
    assert_eq!(parse_key("space"), Some(Key::char(' ')));
    assert_eq!(parse_key("+"), Some(Key::char('+')));
    assert_eq!(parse_key("Q"), Some(Key::shift(KeyCode::Char('q'))));
}

#[test]
fn parse_key_rejects_garbage() {
    assert_eq!(parse_key(""), None);
    assert_eq!(parse_key("ctrl+"), None);
    assert_eq!(parse_key("ctrl+a+b"), None);
    assert_eq!(parse_key("f99"), None);
    assert_eq!(parse_key("hyper"), None);
}

#[test]
fn defaults_bind_quit_and_refresh() {
    let global = Keybindings::with_defaults();
    assert!(global.key_matches(&Key::char('q'), "Quit"));
    assert!(global.key_matches(&Key::ctrl(KeyCode::Char('l')), "Refresh"));
    assert!(global.key_matches(&Key::simple(KeyCode::Up), "Up"));
    assert!(global.key_matches(&Key::char('k'), "Up"));
    assert!(global.key_matches(&Key::simple(KeyCode::Tab), "Cycle"));
    assert!(!global.key_matches(&Key::char('q'), "NoSuchAction"));
}

#[test]
fn child_scope_inherits_and_overrides() {
    let global = Rc::new(Keybindings::with_defaults());
    let child = Keybindings::new(Some(Rc::clone(&global)));
    assert!(child.key_matches(&Key::char('q'), "Quit"));

    child.set("Quit", vec![Key::char('x')]);
    assert!(child.key_matches(&Key::char('x'), "Quit"));
    assert!(!child.key_matches(&Key::char('q'), "Quit"));
    assert!(global.key_matches(&Key::char('q'), "Quit"));

    // Parent changes show through where the child has no entry.
    global.set("Refresh", vec![Key::simple(KeyCode::F(5))]);
    assert_eq!(child.get("Refresh"), vec![Key::simple(KeyCode::F(5))]);
}

#[test]
fn describe_uses_first_key() {
    let global = Keybindings::with_defaults();
    assert_eq!(global.describe("Help").as_deref(), Some("?"));
    assert_eq!(global.describe("Missing"), None);
}
