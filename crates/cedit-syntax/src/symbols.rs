/// Flat symbol table mapping declared names to highlight roles.
use serde::{Deserialize, Serialize};

/// What a declared name stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SymbolKind {
    Type,
    Function,
    Macro,
}

/// A declared name and its kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
}

/// Built-in type names seeded into every fresh table.
pub const BUILTIN_TYPES: &[&str] = &[
    "void", "bool", "char", "short", "int", "long", "float", "double", "signed", "unsigned",
];

/// Append-only symbol table with no scoping.
///
/// Lookup scans front to back and returns the first match, so the
/// earliest declaration of a name wins; later declarations of the same
/// name append but never shadow. The table is rebuilt from scratch on
/// every reparse.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    /// Creates a table seeded with the built-in type names.
    pub fn new() -> Self {
        let symbols = BUILTIN_TYPES
            .iter()
            .map(|name| Symbol {
                name: (*name).to_string(),
                kind: SymbolKind::Type,
            })
            .collect();
        Self { symbols }
    }

    /// Appends a declaration. Earlier entries keep precedence.
    pub fn define(&mut self, name: &str, kind: SymbolKind) {
        self.symbols.push(Symbol {
            name: name.to_string(),
            kind,
        });
    }

    /// Returns the kind of the earliest declaration of `name`, if any.
    pub fn lookup(&self, name: &str) -> Option<SymbolKind> {
        self.symbols
            .iter()
            .find(|symbol| symbol.name == name)
            .map(|symbol| symbol.kind)
    }

    /// Number of entries, builtins included.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}
