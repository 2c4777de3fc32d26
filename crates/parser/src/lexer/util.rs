use unicode_xid::UnicodeXID;

pub(super) fn is_line_break(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

pub(super) fn is_ident_start(c: char) -> bool {
    match c {
        'a'..='z' | 'A'..='Z' | '$' | '_' => true,
        c if c.is_ascii() => false,
        c => UnicodeXID::is_xid_start(c),
    }
}

pub(super) fn is_ident_part(c: char) -> bool {
    match c {
        'a'..='z' | 'A'..='Z' | '0'..='9' | '$' | '_' => true,
        '\u{200c}' | '\u{200d}' => true,
        c if c.is_ascii() => false,
        c => UnicodeXID::is_xid_continue(c),
    }
}
