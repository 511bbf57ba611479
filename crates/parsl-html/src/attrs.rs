//! Static global-attribute name lookup.
//!
//! Uses the same 1024-bucket multiplicative hash as [`crate::tags`], over a
//! fixed list of well-known global/HTML attribute names. Unlike tags,
//! knowing whether a name is "known" isn't load-bearing for tree
//! construction today — attribute values are stored verbatim regardless —
//! but the table exists for the same reason the original's `attr_map_id`
//! did: O(1) identification of well-known attributes for future callers
//! (e.g. boolean-attribute handling) without re-deriving the table.

use std::sync::OnceLock;

/// Id of a known global attribute name, as resolved by [`attr_map_id`].
pub type AttrId = u16;

/// Sentinel id for a name outside the known-attribute list.
pub const CUSTOM_ATTR: AttrId = 0;

const NAMES: &[&str] = &[
    "", "id", "class", "style", "title", "lang", "dir", "hidden", "href", "src", "alt", "rel",
    "target", "type", "name", "value", "placeholder", "disabled", "checked", "selected",
    "readonly", "required", "action", "method", "for", "width", "height", "colspan", "rowspan",
    "content", "charset", "media",
];

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

fn buckets() -> &'static [AttrId; 1024] {
    static BUCKETS: OnceLock<[AttrId; 1024]> = OnceLock::new();
    BUCKETS.get_or_init(|| {
        let mut table = [CUSTOM_ATTR; 1024];
        for (idx, name) in NAMES.iter().enumerate().skip(1) {
            let mut slot = hash(name);
            while table[slot] != CUSTOM_ATTR {
                slot = (slot + 1) % 1024;
            }
            table[slot] = idx as AttrId;
        }
        table
    })
}

/// Resolve an ASCII-lowercased attribute name to its id, or [`CUSTOM_ATTR`]
/// if it is not one of the well-known names.
#[must_use]
pub fn attr_map_id(name: &str) -> AttrId {
    let buckets = buckets();
    let mut slot = hash(name);
    loop {
        let candidate = buckets[slot];
        if candidate == CUSTOM_ATTR {
            return CUSTOM_ATTR;
        }
        if NAMES[candidate as usize] == name {
            return candidate;
        }
        slot = (slot + 1) % 1024;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_attributes_round_trip() {
        for name in NAMES.iter().skip(1) {
            assert_ne!(attr_map_id(name), CUSTOM_ATTR);
        }
    }

    #[test]
    fn unknown_attribute_is_custom() {
        assert_eq!(attr_map_id("data-whatever"), CUSTOM_ATTR);
    }
}
