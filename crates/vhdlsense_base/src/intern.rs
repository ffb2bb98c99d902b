//! String interning for O(1) equality comparison.
//!
//! Symbols are lightweight integer handles that point to interned byte
//! strings. Each unique string is stored exactly once: interning hashes the
//! content and returns the handle of the first occurrence, so equality checks
//! are integer comparisons regardless of string length.
//!
//! Storage is a chain of fixed-size pages, newest first. Pages are never
//! freed individually; everything lives until the table is dropped. An
//! allocation larger than twice the page size gets a page of its own, linked
//! *behind* the current page so the current page's frontier is preserved and
//! subsequent small requests keep filling it.
//!
//! ## Example
//!
//! ```
//! use vhdlsense_base::StringTable;
//!
//! let mut strings = StringTable::new();
//! let a = strings.intern(b"clk");
//! let b = strings.intern(b"clk");
//! assert_eq!(a, b);
//! assert_eq!(strings.resolve(a), "clk");
//! ```

use std::collections::HashMap;
use std::hash::{Hash, Hasher};

/// A lightweight handle to an interned string.
///
/// Symbols are `Copy` and compare in O(1). Use [`StringTable::resolve`] to
/// get the text back. A symbol is only meaningful to the table that issued
/// it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Symbol(u32);

impl Symbol {
    /// The empty string, always pre-interned at index 0.
    pub const EMPTY: Symbol = Symbol(0);

    /// Internal index of this symbol, usable for dense side tables.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl Default for Symbol {
    fn default() -> Self {
        Self::EMPTY
    }
}

struct Page {
    buf: Vec<u8>,
}

#[derive(Clone, Copy)]
struct Span {
    page: u32,
    offset: u32,
    len: u32,
}

/// A page-arena string table issuing [`Symbol`] handles.
///
/// The content-hash map never evicts. `merge` splices another table's page
/// chain into this one's history (lifetime extension) without merging the
/// hash table, so the absorbed content is not deduplicated against future
/// interns.
pub struct StringTable {
    table: HashMap<u64, Symbol>,
    spans: Vec<Span>,
    // pages[current] is the frontier; oversize pages are pushed without
    // moving `current`.
    pages: Vec<Page>,
    current: usize,
    page_size: usize,
}

const PAGE_SIZE: usize = 4096;

fn content_hash(bytes: &[u8]) -> u64 {
    let mut h = std::collections::hash_map::DefaultHasher::new();
    bytes.hash(&mut h);
    h.finish()
}

impl StringTable {
    pub fn new() -> Self {
        Self::with_page_size(PAGE_SIZE)
    }

    /// Page size is configurable for tests; production code uses [`new`].
    ///
    /// [`new`]: StringTable::new
    pub fn with_page_size(page_size: usize) -> Self {
        let mut st = StringTable {
            table: HashMap::new(),
            spans: Vec::new(),
            pages: vec![Page { buf: Vec::with_capacity(page_size) }],
            current: 0,
            page_size,
        };
        let empty = st.store(b"");
        st.spans.push(empty);
        st.table.insert(content_hash(b""), Symbol::EMPTY);
        st
    }

    /// Interns a byte string, returning its symbol.
    ///
    /// Content equal (by hash) to an earlier intern returns the earlier
    /// symbol; the bytes are copied into the page chain otherwise.
    pub fn intern(&mut self, bytes: &[u8]) -> Symbol {
        let hash = content_hash(bytes);
        if let Some(&sym) = self.table.get(&hash) {
            return sym;
        }
        let span = self.store(bytes);
        let sym = Symbol(self.spans.len() as u32);
        self.spans.push(span);
        self.table.insert(hash, sym);
        sym
    }

    /// Interns a `str`, returning its symbol.
    pub fn intern_str(&mut self, s: &str) -> Symbol {
        self.intern(s.as_bytes())
    }

    /// Returns the text for the given symbol.
    ///
    /// # Panics
    ///
    /// Panics if `sym` was not issued by this table.
    pub fn resolve(&self, sym: Symbol) -> &str {
        let bytes = self.resolve_bytes(sym);
        // tokenizer only interns 8-bit graphic characters that are valid
        // single-byte utf8 or were checked on the way in
        std::str::from_utf8(bytes).unwrap_or("")
    }

    /// Returns the raw bytes for the given symbol.
    pub fn resolve_bytes(&self, sym: Symbol) -> &[u8] {
        let span = self.spans[sym.index()];
        let page = &self.pages[span.page as usize];
        &page.buf[span.offset as usize..(span.offset + span.len) as usize]
    }

    /// Looks up an already-interned string without creating an entry.
    pub fn lookup(&self, bytes: &[u8]) -> Option<Symbol> {
        self.table.get(&content_hash(bytes)).copied()
    }

    /// Number of distinct interned strings, including the empty string.
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.len() <= 1
    }

    /// Number of pages in the chain.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Splices `other`'s page chain into this table's history and empties
    /// `other`.
    ///
    /// The content-hash table is deliberately not merged: the absorbed bytes
    /// stay allocated (lifetime extension) but future interns of the same
    /// content will copy it again, and `lookup` will not find it.
    pub fn merge(&mut self, other: &mut StringTable) {
        self.pages.append(&mut other.pages);
        *other = StringTable::with_page_size(other.page_size);
    }

    fn store(&mut self, bytes: &[u8]) -> Span {
        if bytes.len() > 2 * self.page_size {
            // dedicated page behind the current one; the frontier of the
            // current page is untouched
            self.pages.push(Page { buf: bytes.to_vec() });
            return Span {
                page: (self.pages.len() - 1) as u32,
                offset: 0,
                len: bytes.len() as u32,
            };
        }

        if self.pages[self.current].buf.len() + bytes.len() > self.page_size {
            self.pages.push(Page { buf: Vec::with_capacity(self.page_size) });
            self.current = self.pages.len() - 1;
        }

        let page = &mut self.pages[self.current];
        let offset = page.buf.len() as u32;
        page.buf.extend_from_slice(bytes);
        Span {
            page: self.current as u32,
            offset,
            len: bytes.len() as u32,
        }
    }
}

impl Default for StringTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_returns_same_symbol_for_same_content() {
        let mut st = StringTable::new();
        let a = st.intern(b"counter");
        let b = st.intern(b"counter");
        assert_eq!(a, b);
    }

    #[test]
    fn intern_returns_different_symbols_for_different_content() {
        let mut st = StringTable::new();
        let a = st.intern(b"clk");
        let b = st.intern(b"rst");
        assert_ne!(a, b);
    }

    #[test]
    fn resolve_returns_original_text() {
        let mut st = StringTable::new();
        let sym = st.intern(b"architecture");
        assert_eq!(st.resolve(sym), "architecture");
    }

    #[test]
    fn empty_symbol_resolves_to_empty_string() {
        let st = StringTable::new();
        assert_eq!(st.resolve(Symbol::EMPTY), "");
    }

    #[test]
    fn lookup_finds_interned_but_not_unknown() {
        let mut st = StringTable::new();
        let sym = st.intern(b"q");
        assert_eq!(st.lookup(b"q"), Some(sym));
        assert_eq!(st.lookup(b"missing"), None);
    }

    #[test]
    fn len_counts_distinct_strings() {
        let mut st = StringTable::new();
        assert_eq!(st.len(), 1);
        st.intern(b"a");
        st.intern(b"b");
        st.intern(b"a");
        assert_eq!(st.len(), 3);
    }

    #[test]
    fn small_interns_share_a_page() {
        let mut st = StringTable::with_page_size(64);
        let a = st.intern(b"one");
        let b = st.intern(b"two");
        assert_eq!(st.spans[a.index()].page, st.spans[b.index()].page);
    }

    #[test]
    fn full_page_chains_a_new_one() {
        let mut st = StringTable::with_page_size(8);
        st.intern(b"aaaaaa");
        let before = st.page_count();
        st.intern(b"bbbbbb");
        assert_eq!(st.page_count(), before + 1);
    }

    #[test]
    fn oversize_request_preserves_current_page_frontier() {
        let mut st = StringTable::with_page_size(16);
        let small1 = st.intern(b"ab");
        let big = st.intern(&[b'x'; 40]); // > 2 * page size
        let small2 = st.intern(b"cd");

        assert_eq!(st.resolve_bytes(big), &[b'x'; 40][..]);
        // the small intern after the big one lands on the same page as the
        // one before it
        assert_eq!(st.spans[small1.index()].page, st.spans[small2.index()].page);
        assert_ne!(st.spans[big.index()].page, st.spans[small1.index()].page);
    }

    #[test]
    fn merge_moves_pages_and_empties_other() {
        let mut a = StringTable::new();
        let mut b = StringTable::new();
        b.intern(b"from_b");
        let pages_before = a.page_count();

        a.merge(&mut b);

        assert!(a.page_count() > pages_before);
        assert!(b.is_empty());
        // hash table is not merged: the content is alive but not findable
        assert_eq!(a.lookup(b"from_b"), None);
    }

    #[test]
    fn symbols_survive_many_interns() {
        let mut st = StringTable::with_page_size(32);
        let first = st.intern(b"stable");
        for i in 0..1000 {
            st.intern(format!("sym_{i}").as_bytes());
        }
        assert_eq!(st.resolve(first), "stable");
    }
}
