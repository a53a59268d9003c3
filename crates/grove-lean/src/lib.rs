//! Lean 4 grammar for grove.
//!
//! The grammar is plain data for the tokenizing engine: keyword classes plus a
//! tree of [`Mode`]s. Regexes are written to be valid both for the engine
//! (JavaScript, unicode mode) and for the Rust test harness.

use grove_highlight::{Contains, Grammar, Keywords, Mode};

/// Registered language id.
pub const ID: &str = "lean";

/// Display name.
pub const NAME: &str = "Lean";

/// Other names a code block may declare.
pub const ALIASES: &[&str] = &["lean4"];

/// Control and declaration keywords.
pub const KEYWORDS: &[&str] = &[
    "abbrev", "at", "attribute", "axiom", "begin", "by", "calc", "class", "decreasing_by",
    "def", "deriving", "do", "else", "elab", "end", "example", "export", "extends", "for",
    "from", "fun", "have", "if", "import", "in", "inductive", "infix", "infixl", "infixr",
    "instance", "lemma", "let", "local", "macro", "macro_rules", "match", "mutual",
    "namespace", "noncomputable", "notation", "opaque", "open", "partial", "postfix",
    "prefix", "private", "protected", "return", "scoped", "section", "set_option", "show",
    "structure", "syntax", "termination_by", "then", "theorem", "universe", "unsafe",
    "variable", "where", "with",
];

/// Built-in types and tactics.
pub const BUILT_INS: &[&str] = &[
    // types
    "Array", "Bool", "Char", "Fin", "Float", "IO", "Int", "List", "Nat", "Option", "Prop",
    "Sort", "String", "Type", "Unit", "ℕ", "ℤ", "ℚ", "ℝ",
    // tactics
    "aesop", "apply", "assumption", "cases", "constructor", "contradiction", "decide",
    "exact", "exfalso", "induction", "intro", "intros", "linarith", "norm_num", "obtain",
    "omega", "rcases", "refine", "refl", "rfl", "ring", "rintro", "rw", "simp", "simp_all",
    "sorry", "specialize", "trivial", "unfold", "use",
];

/// Literal constants.
pub const LITERALS: &[&str] = &["true", "false", "True", "False", "none"];

/// Attribute names recognised inside `@[...]`.
pub const ATTRIBUTES: &[&str] = &[
    "simp", "inline", "noinline", "macro_inline", "reducible", "irreducible",
    "semireducible", "specialize", "ext", "norm_cast", "export", "extern", "implemented_by",
    "default_instance", "instance",
];

/// Mathematical and logical operator symbols.
pub const OPERATORS: &[&str] = &[
    ":=", "=>", "->", "<-", "<->", "→", "←", "↔", "↦", "∀", "∃", "λ", "¬", "∧", "∨", "≠", "≤",
    "≥", "∈", "∉", "⊆", "⊂", "∩", "∪", "∘", "×", "⁻¹", "▸", "∣", "<;>", "<$>", "<|>", "<|",
    "|>", ">>=", "&&", "||", "==", "!=", "++", "::", "^", "+", "-", "*", "/", "%", "=", "<",
    ">",
];

/// Bracket pairs beyond ASCII parentheses.
pub const BRACKETS: &[(&str, &str)] = &[("⟨", "⟩"), ("⦃", "⦄"), ("⟦", "⟧"), ("‹", "›")];

/// Keywords that open a definition header.
const DECLARATIONS: &[&str] = &[
    "abbrev", "axiom", "class", "def", "example", "inductive", "instance", "lemma", "opaque",
    "structure", "theorem",
];

const IDENT: &str = r"[\p{L}_][\p{L}\p{N}_'!?]*";

/// The Lean grammar.
pub fn grammar() -> Grammar {
    Grammar::new(ID, NAME)
        .aliases(ALIASES.iter().copied())
        .unicode_regex(true)
        .keywords(keywords())
        .contains(
            [
                comments(),
                vec![
                    string(),
                    character(),
                    attribute(),
                    definition(),
                    proof_block(),
                ],
                atoms(OPERATORS),
                vec![brackets()],
            ]
            .into_iter()
            .flatten()
            .map(Contains::from),
        )
}

fn keywords() -> Keywords {
    Keywords::new()
        .pattern(IDENT)
        .class("keyword", KEYWORDS)
        .class("built_in", BUILT_INS)
        .class("literal", LITERALS)
}

/// Doc comments first so `/--` is not read as a block comment.
fn comments() -> Vec<Mode> {
    let nested = Mode::scoped("comment")
        .begin("/-")
        .end("-/")
        .contains([Contains::SelfRef]);
    vec![
        Mode::scoped("comment.doc")
            .begin("/-[-!]")
            .end("-/")
            .contains([nested.clone().into()]),
        nested,
        Mode::scoped("comment").begin("--").end("$"),
    ]
}

fn string() -> Mode {
    Mode::scoped("string")
        .begin("\"")
        .end("\"")
        .contains([Mode::scoped("char.escape").begin(r"\\.").relevance(0).into()])
}

fn character() -> Mode {
    Mode::scoped("char").begin(r"\B'(?:\\.|[^\\'\n])'")
}

/// Single-token modes usable anywhere an expression may appear.
///
/// `operators` is the operator table to use in this context.
fn atoms(operators: &[&str]) -> Vec<Mode> {
    vec![
        Mode::scoped("symbol").variants([
            Mode::new().begin(r"`[\p{L}_][\p{L}\p{N}_'.!?]*"),
            Mode::new().begin("«[^»]*»"),
        ]),
        Mode::scoped("variable").begin(r"\?[\p{L}_][\p{L}\p{N}_']*"),
        Mode::scoped("number").relevance(0).variants([
            Mode::new().begin(r"\b0x[0-9a-fA-F_]+\b"),
            Mode::new().begin(r"\b0b[01_]+\b"),
            Mode::new().begin(r"\b0o[0-7_]+\b"),
            Mode::new().begin(r"\b\d[\d_]*(?:\.\d+)?(?:[eE][+-]?\d+)?\b"),
        ]),
        Mode::scoped("variable.language").begin(r"\b_\b").relevance(0),
        Mode::scoped("operator")
            .begin(alternation(operators))
            .relevance(0),
    ]
}

fn brackets() -> Mode {
    let class: String = BRACKETS
        .iter()
        .flat_map(|(open, close)| [*open, *close])
        .collect();
    Mode::scoped("punctuation").begin(format!("[{class}]")).relevance(0)
}

/// `@[simp, inline]` or `@Foo.bar`.
fn attribute() -> Mode {
    Mode::scoped("meta")
        .keywords(Keywords::new().pattern(IDENT).class("attr", ATTRIBUTES))
        .contains([string().into(), Mode::scoped("number").begin(r"\b\d+\b").into()])
        .variants([
            Mode::new().begin(r"@\[").end(r"\]"),
            Mode::new().begin(r"@[\p{L}_][\p{L}\p{N}_'.]*"),
        ])
}

/// A declaration up to its body.
///
/// The header begins at a declaration keyword and ends, without consuming
/// it, at `:=`, `where` or `|`. The declared name is the title; the signature
/// after it runs until the header ends.
fn definition() -> Mode {
    let signature_operators: Vec<&str> = OPERATORS
        .iter()
        .copied()
        .filter(|op| *op != ":=" && !op.starts_with('|'))
        .collect();

    let signature = Mode::new()
        .keywords(keywords())
        .ends_with_parent()
        .contains(
            comments()
                .into_iter()
                .chain([params(), string(), character()])
                .chain(atoms(&signature_operators))
                .chain([brackets()])
                .map(Contains::from),
        );

    let title = Mode::scoped("title")
        .begin(r"[\p{L}_«][\p{L}\p{N}_'.!?»]*")
        .relevance(0)
        .starts(signature);

    Mode::new()
        .begin(format!(r"\b(?:{})\b", DECLARATIONS.join("|")))
        .end(r":=|\bwhere\b|\|")
        .return_end()
        .keywords(keywords())
        .contains([title.into()])
}

/// A bracketed parameter group, re-entered for nested groups.
///
/// Open and close brackets are matched by class, not by pair.
fn params() -> Mode {
    Mode::scoped("params")
        .begin(r"[(\[{⦃]")
        .end(r"[)\]}⦄]")
        .keywords(keywords())
        .contains(
            [Contains::SelfRef]
                .into_iter()
                .chain(comments().into_iter().map(Contains::from))
                .chain([string().into(), character().into()])
                .chain(atoms(OPERATORS).into_iter().map(Contains::from)),
        )
}

/// Lean 3 `begin ... end` tactic block.
fn proof_block() -> Mode {
    Mode::new()
        .begin(r"\bbegin\b")
        .end(r"\bend\b")
        .keywords(keywords())
        .contains(
            [Contains::SelfRef]
                .into_iter()
                .chain(comments().into_iter().map(Contains::from))
                .chain([string().into(), character().into(), attribute().into()])
                .chain(atoms(OPERATORS).into_iter().map(Contains::from))
                .chain([brackets().into()]),
        )
}

/// Longest-first alternation of literal symbols.
fn alternation(symbols: &[&str]) -> String {
    let mut sorted = symbols.to_vec();
    sorted.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()).then(a.cmp(b)));
    sorted
        .into_iter()
        .map(escape)
        .collect::<Vec<_>>()
        .join("|")
}

fn escape(symbol: &str) -> String {
    let mut out = String::with_capacity(symbol.len());
    for c in symbol.chars() {
        if "\\^$.*+?()[]{}|".contains(c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
