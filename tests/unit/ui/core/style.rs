use super::*;

#[test]
fn mod_bit_ops_and_contains() {
    let m = Mod::BOLD | Mod::UNDERLINE;
    assert!(m.contains(Mod::BOLD));
    assert!(m.contains(Mod::UNDERLINE));
    assert!(!m.contains(Mod::REVERSE));
    assert!(Mod::NONE.is_empty());
}

#[test]
fn patch_keeps_unset_fields_of_base() {
    let base = Style::default().fg(Color::Indexed(7)).bg(Color::Indexed(0));
    let over = Style::default().bg(Color::Indexed(4)).add_mod(Mod::BOLD);
    let s = base.patch(over);
    assert_eq!(s.fg, Some(Color::Indexed(7)));
    assert_eq!(s.bg, Some(Color::Indexed(4)));
    assert!(s.mods.contains(Mod::BOLD));
}

#[test]
fn parse_color_names_and_hex() {
    assert_eq!(Color::parse("Cyan"), Some(Color::Indexed(6)));
    assert_eq!(Color::parse("dark_gray"), Some(Color::Indexed(8)));
    assert_eq!(Color::parse("#0a0B0c"), Some(Color::Rgb(10, 11, 12)));
    assert_eq!(Color::parse("#12345"), None);
    assert_eq!(Color::parse("chartreuse"), None);
}

#[test]
fn parse_modifiers() {
    assert_eq!(Mod::parse("Bold"), Some(Mod::BOLD));
    assert_eq!(Mod::parse("sparkle"), None);
}
