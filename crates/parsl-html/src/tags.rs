//! Static tag metadata lookup.
//!
//! Mirrors the original implementation's tag table design: a 1024-bucket
//! hash table over tag names, built once from a fixed list of known tags and
//! probed linearly on collision. Unknown names resolve to [`CUSTOM_TAG`].

use std::sync::OnceLock;

/// Numeric id of a tag, as resolved by [`tagmap_id`].
pub type TagId = u16;

/// Sentinel id for a name that does not match any known tag.
pub const CUSTOM_TAG: TagId = 0;

/// Bitset of per-tag properties consumers care about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TagFlags(u8);

impl TagFlags {
    /// Void element: never pushed onto the open-elements stack, and its
    /// `end(node)` is emitted immediately after `begin(node)`.
    pub const EMPTY: Self = Self(1 << 0);
    /// The end tag may be omitted; an implied end tag may close it.
    pub const OPTIONAL_CLOSE: Self = Self(1 << 1);
    /// CSS block-level hint for consumers.
    pub const BLOCK: Self = Self(1 << 2);
    /// Participates in scope/fostering rules (the "special" category).
    pub const SPECIAL: Self = Self(1 << 3);
    /// One of h1-h6.
    pub const HEADING: Self = Self(1 << 4);
    /// A formatting element (a, b, i, em, ...) eligible for the active
    /// formatting list in a full adoption-agency implementation.
    pub const FORMAT: Self = Self(1 << 5);

    const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Whether `self` carries every bit set in `other`.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for TagFlags {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

/// An entry in the static tag table.
#[derive(Debug, Clone, Copy)]
pub struct TagEntry {
    /// Canonical, already-lowercase spelling.
    pub name: &'static str,
    /// Property bitset.
    pub flags: TagFlags,
}

macro_rules! tags {
    ($(($id:ident, $name:expr, $flags:expr)),+ $(,)?) => {
        /// Ids for every known tag, in table order. Index 0 is
        /// [`CUSTOM_TAG`]; real tags start at 1.
        #[allow(missing_docs, non_upper_case_globals)]
        pub mod id {
            use super::TagId;
            pub const CUSTOM_TAG: TagId = 0;
            tags!(@count 1; $($id),+);
        }

        const TABLE: &[TagEntry] = &[
            TagEntry { name: "", flags: TagFlags(0) },
            $(TagEntry { name: $name, flags: $flags }),+
        ];
    };
    (@count $n:expr; $head:ident $(, $rest:ident)*) => {
        pub const $head: TagId = $n;
        tags!(@count $n + 1; $($rest),*);
    };
    (@count $n:expr;) => {};
}

tags! {
    (A, "a", TagFlags::FORMAT),
    (ADDRESS, "address", TagFlags::BLOCK.union(TagFlags::SPECIAL)),
    (APPLET, "applet", TagFlags::SPECIAL),
    (AREA, "area", TagFlags::EMPTY),
    (ARTICLE, "article", TagFlags::BLOCK.union(TagFlags::SPECIAL)),
    (ASIDE, "aside", TagFlags::BLOCK.union(TagFlags::SPECIAL)),
    (B, "b", TagFlags::FORMAT),
    (BASE, "base", TagFlags::EMPTY.union(TagFlags::SPECIAL)),
    (BASEFONT, "basefont", TagFlags::EMPTY.union(TagFlags::SPECIAL)),
    (BGSOUND, "bgsound", TagFlags::EMPTY.union(TagFlags::SPECIAL)),
    (BLOCKQUOTE, "blockquote", TagFlags::BLOCK.union(TagFlags::SPECIAL)),
    (BODY, "body", TagFlags::SPECIAL),
    (BR, "br", TagFlags::EMPTY),
    (BUTTON, "button", TagFlags::SPECIAL),
    (CAPTION, "caption", TagFlags::SPECIAL),
    (CODE, "code", TagFlags::FORMAT),
    (COL, "col", TagFlags::EMPTY.union(TagFlags::SPECIAL)),
    (COLGROUP, "colgroup", TagFlags::SPECIAL),
    (DD, "dd", TagFlags::OPTIONAL_CLOSE.union(TagFlags::BLOCK).union(TagFlags::SPECIAL)),
    (DIV, "div", TagFlags::BLOCK.union(TagFlags::SPECIAL)),
    (DL, "dl", TagFlags::BLOCK.union(TagFlags::SPECIAL)),
    (DT, "dt", TagFlags::OPTIONAL_CLOSE.union(TagFlags::BLOCK).union(TagFlags::SPECIAL)),
    (EM, "em", TagFlags::FORMAT),
    (EMBED, "embed", TagFlags::EMPTY.union(TagFlags::SPECIAL)),
    (FIELDSET, "fieldset", TagFlags::BLOCK.union(TagFlags::SPECIAL)),
    (FIGCAPTION, "figcaption", TagFlags::BLOCK.union(TagFlags::SPECIAL)),
    (FIGURE, "figure", TagFlags::BLOCK.union(TagFlags::SPECIAL)),
    (FONT, "font", TagFlags::FORMAT),
    (FOOTER, "footer", TagFlags::BLOCK.union(TagFlags::SPECIAL)),
    (FORM, "form", TagFlags::SPECIAL),
    (FRAME, "frame", TagFlags::EMPTY.union(TagFlags::SPECIAL)),
    (FRAMESET, "frameset", TagFlags::SPECIAL),
    (H1, "h1", TagFlags::HEADING.union(TagFlags::BLOCK).union(TagFlags::SPECIAL)),
    (H2, "h2", TagFlags::HEADING.union(TagFlags::BLOCK).union(TagFlags::SPECIAL)),
    (H3, "h3", TagFlags::HEADING.union(TagFlags::BLOCK).union(TagFlags::SPECIAL)),
    (H4, "h4", TagFlags::HEADING.union(TagFlags::BLOCK).union(TagFlags::SPECIAL)),
    (H5, "h5", TagFlags::HEADING.union(TagFlags::BLOCK).union(TagFlags::SPECIAL)),
    (H6, "h6", TagFlags::HEADING.union(TagFlags::BLOCK).union(TagFlags::SPECIAL)),
    (HEAD, "head", TagFlags::SPECIAL),
    (HEADER, "header", TagFlags::BLOCK.union(TagFlags::SPECIAL)),
    (HGROUP, "hgroup", TagFlags::BLOCK.union(TagFlags::SPECIAL)),
    (HR, "hr", TagFlags::EMPTY.union(TagFlags::BLOCK).union(TagFlags::SPECIAL)),
    (HTML, "html", TagFlags::SPECIAL),
    (I, "i", TagFlags::FORMAT),
    (IFRAME, "iframe", TagFlags::SPECIAL),
    (IMG, "img", TagFlags::EMPTY),
    (INPUT, "input", TagFlags::EMPTY),
    (KEYGEN, "keygen", TagFlags::EMPTY),
    (LI, "li", TagFlags::OPTIONAL_CLOSE.union(TagFlags::BLOCK).union(TagFlags::SPECIAL)),
    (LINK, "link", TagFlags::EMPTY.union(TagFlags::SPECIAL)),
    (LISTING, "listing", TagFlags::BLOCK.union(TagFlags::SPECIAL)),
    (MAIN, "main", TagFlags::BLOCK.union(TagFlags::SPECIAL)),
    (MARQUEE, "marquee", TagFlags::SPECIAL),
    (MATH, "math", TagFlags::SPECIAL),
    (MENU, "menu", TagFlags::BLOCK.union(TagFlags::SPECIAL)),
    (META, "meta", TagFlags::EMPTY.union(TagFlags::SPECIAL)),
    (NAV, "nav", TagFlags::BLOCK.union(TagFlags::SPECIAL)),
    (NOBR, "nobr", TagFlags::FORMAT),
    (NOEMBED, "noembed", TagFlags::SPECIAL),
    (NOFRAMES, "noframes", TagFlags::SPECIAL),
    (NOSCRIPT, "noscript", TagFlags::SPECIAL),
    (OBJECT, "object", TagFlags::SPECIAL),
    (OL, "ol", TagFlags::BLOCK.union(TagFlags::SPECIAL)),
    (OPTGROUP, "optgroup", TagFlags::OPTIONAL_CLOSE.union(TagFlags::SPECIAL)),
    (OPTION, "option", TagFlags::OPTIONAL_CLOSE.union(TagFlags::SPECIAL)),
    (P, "p", TagFlags::OPTIONAL_CLOSE.union(TagFlags::BLOCK).union(TagFlags::SPECIAL)),
    (PARAM, "param", TagFlags::EMPTY.union(TagFlags::SPECIAL)),
    (PLAINTEXT, "plaintext", TagFlags::BLOCK.union(TagFlags::SPECIAL)),
    (PRE, "pre", TagFlags::BLOCK.union(TagFlags::SPECIAL)),
    (RB, "rb", TagFlags::OPTIONAL_CLOSE),
    (RP, "rp", TagFlags::OPTIONAL_CLOSE),
    (RT, "rt", TagFlags::OPTIONAL_CLOSE),
    (RTC, "rtc", TagFlags::OPTIONAL_CLOSE),
    (S, "s", TagFlags::FORMAT),
    (SCRIPT, "script", TagFlags::SPECIAL),
    (SECTION, "section", TagFlags::BLOCK.union(TagFlags::SPECIAL)),
    (SELECT, "select", TagFlags::SPECIAL),
    (SMALL, "small", TagFlags::FORMAT),
    (SOURCE, "source", TagFlags::EMPTY),
    (SPAN, "span", TagFlags(0)),
    (STRIKE, "strike", TagFlags::FORMAT),
    (STRONG, "strong", TagFlags::FORMAT),
    (STYLE, "style", TagFlags::SPECIAL),
    (SUMMARY, "summary", TagFlags::BLOCK.union(TagFlags::SPECIAL)),
    (SVG, "svg", TagFlags::SPECIAL),
    (TABLE, "table", TagFlags::SPECIAL),
    (TBODY, "tbody", TagFlags::OPTIONAL_CLOSE.union(TagFlags::SPECIAL)),
    (TD, "td", TagFlags::OPTIONAL_CLOSE.union(TagFlags::SPECIAL)),
    (TEMPLATE, "template", TagFlags::SPECIAL),
    (TEXTAREA, "textarea", TagFlags::SPECIAL),
    (TFOOT, "tfoot", TagFlags::OPTIONAL_CLOSE.union(TagFlags::SPECIAL)),
    (TH, "th", TagFlags::OPTIONAL_CLOSE.union(TagFlags::SPECIAL)),
    (THEAD, "thead", TagFlags::OPTIONAL_CLOSE.union(TagFlags::SPECIAL)),
    (TITLE, "title", TagFlags::SPECIAL),
    (TR, "tr", TagFlags::OPTIONAL_CLOSE.union(TagFlags::SPECIAL)),
    (TRACK, "track", TagFlags::EMPTY),
    (TT, "tt", TagFlags::FORMAT),
    (U, "u", TagFlags::FORMAT),
    (UL, "ul", TagFlags::BLOCK.union(TagFlags::SPECIAL)),
    (WBR, "wbr", TagFlags::EMPTY),
    (XMP, "xmp", TagFlags::SPECIAL),
}

/// The multiplicative hash shared by the tag and attribute-name tables.
///
/// `addr = sum(bytes); addr *= 104729; addr %= 2^20; bucket = addr % 1024`.
const fn hash(name: &str) -> usize {
    let bytes = name.as_bytes();
    let mut addr: u64 = 0;
    let mut i = 0;
    while i < bytes.len() {
        addr += bytes[i] as u64;
        addr = (addr.wrapping_mul(104_729)) % (1 << 20);
        i += 1;
    }
    (addr % 1024) as usize
}

fn buckets() -> &'static [TagId; 1024] {
    static BUCKETS: OnceLock<[TagId; 1024]> = OnceLock::new();
    BUCKETS.get_or_init(|| {
        let mut table = [CUSTOM_TAG; 1024];
        for (idx, entry) in TABLE.iter().enumerate().skip(1) {
            let mut slot = hash(entry.name);
            while table[slot] != CUSTOM_TAG {
                slot = (slot + 1) % 1024;
            }
            table[slot] = idx as TagId;
        }
        table
    })
}

/// Resolve a (already ASCII-lowercased) tag name to its id, or
/// [`CUSTOM_TAG`] if the name is not recognized.
#[must_use]
pub fn tagmap_id(name: &str) -> TagId {
    let buckets = buckets();
    let mut slot = hash(name);
    loop {
        let candidate = buckets[slot];
        if candidate == CUSTOM_TAG {
            return CUSTOM_TAG;
        }
        if TABLE[candidate as usize].name == name {
            return candidate;
        }
        slot = (slot + 1) % 1024;
    }
}

/// Look up a tag's metadata entry by id. Returns `None` for [`CUSTOM_TAG`]
/// or an out-of-range id.
#[must_use]
pub fn tagmap(tag_id: TagId) -> Option<&'static TagEntry> {
    if tag_id == CUSTOM_TAG {
        return None;
    }
    TABLE.get(tag_id as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_tags_round_trip() {
        for entry in TABLE.iter().skip(1) {
            let id = tagmap_id(entry.name);
            assert_ne!(id, CUSTOM_TAG, "{} resolved to CUSTOM_TAG", entry.name);
            assert_eq!(tagmap(id).unwrap().name, entry.name);
            assert_eq!(tagmap_id(tagmap(id).unwrap().name), id);
        }
    }

    #[test]
    fn unknown_tag_is_custom() {
        assert_eq!(tagmap_id("x-unknown-widget"), CUSTOM_TAG);
    }

    #[test]
    fn flags_are_set_as_expected() {
        let br = tagmap(id::BR).unwrap();
        assert!(br.flags.contains(TagFlags::EMPTY));
        let p = tagmap(id::P).unwrap();
        assert!(p.flags.contains(TagFlags::OPTIONAL_CLOSE));
        assert!(p.flags.contains(TagFlags::BLOCK));
        let h1 = tagmap(id::H1).unwrap();
        assert!(h1.flags.contains(TagFlags::HEADING));
    }
}
