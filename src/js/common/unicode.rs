//! Character predicates used by the lexer. All predicates operate on decoded `char`s.

use icu_properties::{
    props::{IdContinue, IdStart},
    CodePointSetData,
};

#[inline]
pub fn is_continuation_byte(byte: u8) -> bool {
    (byte & 0xC0) == 0x80
}

#[inline]
pub fn is_ascii(char: char) -> bool {
    (char as u32) < 0x80
}

#[inline]
pub fn is_decimal_digit(char: char) -> bool {
    char.is_ascii_digit()
}

#[inline]
pub fn is_ascii_whitespace(char: char) -> bool {
    matches!(
        char,
        ' ' | '\t'
        // Vertical tab
        | '\u{000B}'
        // Form feed
        | '\u{000C}'
    )
}

#[inline]
pub fn is_unicode_whitespace(char: char) -> bool {
    matches!(
        char,
        // All non-ascii characters in the unicode Space_Separator category
        '\u{00A0}'
        | '\u{1680}'
        | '\u{2000}'..='\u{200A}'
        | '\u{202F}'
        | '\u{205F}'
        | '\u{3000}'
        // And the zero width non breaking space
        | '\u{FEFF}'
    )
}

#[inline]
pub fn is_unicode_newline(char: char) -> bool {
    char == '\u{2028}' || char == '\u{2029}'
}

#[inline]
pub fn is_ascii_newline(char: char) -> bool {
    char == '\n' || char == '\r'
}

#[inline]
pub fn is_newline(char: char) -> bool {
    is_ascii_newline(char) || is_unicode_newline(char)
}

pub fn get_binary_value(char: char) -> Option<u32> {
    match char {
        '0' | '1' => char.to_digit(2),
        _ => None,
    }
}

pub fn get_octal_value(char: char) -> Option<u32> {
    char.to_digit(8)
}

pub fn get_hex_value(char: char) -> Option<u32> {
    char.to_digit(16)
}

/// Can this character appear as the first character of an identifier.
#[inline]
pub fn is_id_start_ascii(char: char) -> bool {
    char.is_ascii_alphabetic() || char == '_' || char == '$'
}

/// Can this character appear in an identifier (after the first character).
#[inline]
pub fn is_id_part_ascii(char: char) -> bool {
    char.is_ascii_alphanumeric() || char == '_' || char == '$'
}

#[inline]
pub fn is_id_start_unicode(char: char) -> bool {
    CodePointSetData::new::<IdStart>().contains(char)
}

#[inline]
pub fn is_id_continue_unicode(char: char) -> bool {
    CodePointSetData::new::<IdContinue>().contains(char)
}

#[inline]
pub fn is_id_part_unicode(char: char) -> bool {
    // Either part of the unicode ID_Continue, ZWNJ, or ZWJ
    is_id_continue_unicode(char) || char == '\u{200C}' || char == '\u{200D}'
}

#[inline]
pub fn is_id_start(char: char) -> bool {
    is_id_start_ascii(char) || (!is_ascii(char) && is_id_start_unicode(char))
}

#[inline]
pub fn is_id_part(char: char) -> bool {
    is_id_part_ascii(char) || (!is_ascii(char) && is_id_part_unicode(char))
}
