use super::*;

#[test]
fn missing_style_is_empty() {
    let styles = Styles::with_defaults();
    assert_eq!(styles.get("NoSuchStyle"), Style::default());
    assert!(!styles.contains("NoSuchStyle"));
}

#[test]
fn set_replaces_default() {
    let mut styles = Styles::with_defaults();
    let header = Style::default().fg(Color::Indexed(2));
    styles.set("Header", header);
    assert_eq!(styles.get("Header"), header);
    assert_eq!(styles.get("Default").bg, Some(Color::Indexed(0)));
}
