//! Canonical math transcription.
//!
//! A deterministic text-substitution pipeline that normalizes ad-hoc
//! arithmetic, ASCII operator notation and LaTeX-like macros into a single
//! canonical markup: structural LaTeX commands (`\sqrt{}`, `\frac{}{}`,
//! braced `^{}`/`_{}`) plus unicode symbols for everything that has one.
//!
//! The pass order is fixed and later passes never re-match earlier output,
//! so `to_canonical` is idempotent. Streamed text may be re-transcribed any
//! number of times and must come out unchanged after the first pass.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

/// Whether a delimited run was inline (`$...$`, `\(...\)`) or display
/// (`$$...$$`, `\[...\]`) math.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MathKind {
    Inline,
    Display,
}

static RE_DISPLAY_DOLLARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$\$(.+?)\$\$").unwrap());
static RE_DISPLAY_BRACKETS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\\[(.+?)\\\]").unwrap());
static RE_INLINE_PARENS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\\((.+?)\\\)").unwrap());
static RE_INLINE_DOLLAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$([^$]+)\$").unwrap());

/// Extract the first delimited math run found anywhere in the line.
/// Display delimiters are tried before inline so `$$x$$` is not misread as
/// an empty `$...$` pair.
pub(crate) fn extract_delimited(line: &str) -> Option<(String, MathKind)> {
    if let Some(c) = RE_DISPLAY_DOLLARS.captures(line) {
        return Some((c[1].trim().to_string(), MathKind::Display));
    }
    if let Some(c) = RE_DISPLAY_BRACKETS.captures(line) {
        return Some((c[1].trim().to_string(), MathKind::Display));
    }
    if let Some(c) = RE_INLINE_PARENS.captures(line) {
        return Some((c[1].trim().to_string(), MathKind::Inline));
    }
    if let Some(c) = RE_INLINE_DOLLAR.captures(line) {
        return Some((c[1].trim().to_string(), MathKind::Inline));
    }
    None
}

/// Macro name → expansion. Structural commands (`sqrt`, `frac`) are
/// intentionally absent: they already *are* the canonical form.
static MACROS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    let entries: &[(&str, &str)] = &[
        // Fraction synonyms collapse onto the canonical command.
        ("dfrac", "\\frac"),
        ("tfrac", "\\frac"),
        ("cfrac", "\\frac"),
        // Sizing wrappers carry no meaning in canonical markup.
        ("left", ""),
        ("right", ""),
        // Greek, lower.
        ("alpha", "α"),
        ("beta", "β"),
        ("gamma", "γ"),
        ("delta", "δ"),
        ("epsilon", "ε"),
        ("varepsilon", "ε"),
        ("zeta", "ζ"),
        ("eta", "η"),
        ("theta", "θ"),
        ("vartheta", "ϑ"),
        ("iota", "ι"),
        ("kappa", "κ"),
        ("lambda", "λ"),
        ("mu", "μ"),
        ("nu", "ν"),
        ("xi", "ξ"),
        ("omicron", "ο"),
        ("pi", "π"),
        ("varpi", "ϖ"),
        ("rho", "ρ"),
        ("varrho", "ϱ"),
        ("sigma", "σ"),
        ("varsigma", "ς"),
        ("tau", "τ"),
        ("upsilon", "υ"),
        ("phi", "φ"),
        ("varphi", "φ"),
        ("chi", "χ"),
        ("psi", "ψ"),
        ("omega", "ω"),
        // Greek, upper.
        ("Gamma", "Γ"),
        ("Delta", "Δ"),
        ("Theta", "Θ"),
        ("Lambda", "Λ"),
        ("Xi", "Ξ"),
        ("Pi", "Π"),
        ("Sigma", "Σ"),
        ("Upsilon", "Υ"),
        ("Phi", "Φ"),
        ("Psi", "Ψ"),
        ("Omega", "Ω"),
        // Big operators.
        ("sum", "∑"),
        ("prod", "∏"),
        ("int", "∫"),
        ("iint", "∬"),
        ("oint", "∮"),
        ("bigcup", "⋃"),
        ("bigcap", "⋂"),
        // Arrows.
        ("to", "→"),
        ("rightarrow", "→"),
        ("leftarrow", "←"),
        ("gets", "←"),
        ("Rightarrow", "⇒"),
        ("Leftarrow", "⇐"),
        ("leftrightarrow", "↔"),
        ("Leftrightarrow", "⇔"),
        ("implies", "⇒"),
        ("iff", "⇔"),
        ("mapsto", "↦"),
        ("uparrow", "↑"),
        ("downarrow", "↓"),
        // Set theory and relations.
        ("in", "∈"),
        ("notin", "∉"),
        ("ni", "∋"),
        ("subset", "⊂"),
        ("supset", "⊃"),
        ("subseteq", "⊆"),
        ("supseteq", "⊇"),
        ("cup", "∪"),
        ("cap", "∩"),
        ("setminus", "∖"),
        ("emptyset", "∅"),
        ("varnothing", "∅"),
        ("leq", "≤"),
        ("le", "≤"),
        ("geq", "≥"),
        ("ge", "≥"),
        ("neq", "≠"),
        ("ne", "≠"),
        ("approx", "≈"),
        ("equiv", "≡"),
        ("sim", "∼"),
        ("simeq", "≃"),
        ("cong", "≅"),
        ("propto", "∝"),
        // Arithmetic and logic symbols.
        ("pm", "±"),
        ("mp", "∓"),
        ("times", "×"),
        ("div", "÷"),
        ("cdot", "·"),
        ("ast", "∗"),
        ("circ", "∘"),
        ("bullet", "•"),
        ("oplus", "⊕"),
        ("otimes", "⊗"),
        ("perp", "⊥"),
        ("parallel", "∥"),
        ("angle", "∠"),
        ("triangle", "△"),
        ("land", "∧"),
        ("wedge", "∧"),
        ("lor", "∨"),
        ("vee", "∨"),
        ("neg", "¬"),
        ("lnot", "¬"),
        // Calculus and quantifiers.
        ("infty", "∞"),
        ("partial", "∂"),
        ("nabla", "∇"),
        ("forall", "∀"),
        ("exists", "∃"),
        ("nexists", "∄"),
        // Dots and misc.
        ("cdots", "⋯"),
        ("ldots", "…"),
        ("dots", "…"),
        ("vdots", "⋮"),
        ("ddots", "⋱"),
        ("prime", "′"),
        ("degree", "°"),
        ("therefore", "∴"),
        ("because", "∵"),
        ("aleph", "ℵ"),
        ("hbar", "ℏ"),
        ("ell", "ℓ"),
        ("Re", "ℜ"),
        ("Im", "ℑ"),
    ];
    entries.iter().copied().collect()
});

static RE_MACRO: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\([a-zA-Z]+)").unwrap());
static RE_SUBSCRIPT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([\p{L}\p{N}])_([A-Za-z0-9]+)").unwrap());
static RE_SQRT_CALL: Lazy<Regex> = Lazy::new(|| Regex::new(r"sqrt\s*\(([^()]*)\)").unwrap());
static RE_ROOT_PAREN: Lazy<Regex> = Lazy::new(|| Regex::new(r"√\s*\(([^()]*)\)").unwrap());
static RE_ROOT_BARE: Lazy<Regex> = Lazy::new(|| Regex::new(r"√\s*([0-9A-Za-z.]+)").unwrap());
static RE_FRACTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([A-Za-z0-9]+)\s*/\s*([A-Za-z0-9]+)").unwrap());
static RE_POW_PAREN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\^\(([^()]+)\)").unwrap());
static RE_POW: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([\p{L}\p{N})}])\^(\d+|\p{L})").unwrap());
static RE_SUM_OF_SQUARES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\p{L}\p{N}]\^\{?2\}?\s*\+\s*[\p{L}\p{N}]\^\{?2\}?").unwrap());
static RE_SIMPLE_ARITH_EQ: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9\s+\-*/^().=]+$").unwrap());

/// Normalize a raw math expression into canonical markup.
///
/// Pass order matters: delimiters are stripped before subscripts, subscripts
/// before macro expansion (so `\alpha_1` braces while the macro is still
/// ASCII), macros before operator rewriting. Idempotent by construction.
pub fn to_canonical(raw: &str) -> String {
    let stripped = strip_delimiters(raw);
    let subscripted = normalize_subscripts(stripped);
    let expanded = expand_macros(&subscripted);
    rewrite_operators(expanded.trim())
}

/// Remove one or more layers of enclosing display/inline delimiters.
fn strip_delimiters(raw: &str) -> &str {
    let mut s = raw.trim();
    loop {
        let inner = if let Some(i) = s.strip_prefix(r"\[").and_then(|r| r.strip_suffix(r"\]")) {
            i
        } else if let Some(i) = s.strip_prefix(r"\(").and_then(|r| r.strip_suffix(r"\)")) {
            i
        } else if let Some(i) = s.strip_prefix("$$").and_then(|r| r.strip_suffix("$$")) {
            i
        } else if s.len() >= 2 && s.starts_with('$') && s.ends_with('$') {
            &s[1..s.len() - 1]
        } else {
            return s;
        };
        s = inner.trim();
    }
}

/// `x_1`, `x_n`, `x_12` → `x_{1}`, `x_{n}`, `x_{12}`. Already-braced
/// subscripts are untouched (the pattern requires a word character after
/// the underscore).
fn normalize_subscripts(s: &str) -> String {
    RE_SUBSCRIPT.replace_all(s, "${1}_{${2}}").into_owned()
}

/// Expand `\name` macros through the symbol table; unknown macros pass
/// through untouched so canonical structural commands survive re-entry.
fn expand_macros(s: &str) -> String {
    RE_MACRO
        .replace_all(s, |caps: &regex::Captures| match MACROS.get(&caps[1]) {
            Some(expansion) => (*expansion).to_string(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// ASCII operator rewriting, named shapes first.
fn rewrite_operators(s: &str) -> String {
    // Sums of squares (Pythagorean shape) take precedence: they still get
    // their powers braced below even when the rest is simple arithmetic.
    let sum_of_squares = RE_SUM_OF_SQUARES.is_match(s);

    // Simple arithmetic with an `=` is already canonical ("2 + 2 = 4").
    if !sum_of_squares && s.contains('=') && RE_SIMPLE_ARITH_EQ.is_match(s) {
        return s.to_string();
    }

    // Roots before fractions: covers "result = sqrt(n) = m" without letting
    // the generic rules see the call syntax.
    let s = RE_SQRT_CALL.replace_all(s, "\\sqrt{${1}}");
    let s = RE_ROOT_PAREN.replace_all(&s, "\\sqrt{${1}}");
    let s = RE_ROOT_BARE.replace_all(&s, "\\sqrt{${1}}");

    // A sum of squares keeps its `+` structure; the fraction rule is
    // skipped so nothing inside gets folded.
    let s = if sum_of_squares {
        s.into_owned()
    } else {
        RE_FRACTION.replace_all(&s, "\\frac{${1}}{${2}}").into_owned()
    };

    let s = RE_POW_PAREN.replace_all(&s, "^{${1}}");
    let s = RE_POW.replace_all(&s, "${1}^{${2}}");
    s.replace('*', "×")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqrt_call_becomes_canonical_root() {
        assert_eq!(to_canonical("sqrt(16) = 4"), "\\sqrt{16} = 4");
    }

    #[test]
    fn simple_arithmetic_is_left_verbatim() {
        assert_eq!(to_canonical("2 + 2 = 4"), "2 + 2 = 4");
        assert_eq!(to_canonical("10 - 3 = 7"), "10 - 3 = 7");
    }

    #[test]
    fn delimiters_are_stripped() {
        assert_eq!(to_canonical(r"\[ x + y \]"), "x + y");
        assert_eq!(to_canonical("$$E = mc^2$$"), "E = mc^{2}");
        assert_eq!(to_canonical(r"\( \alpha \)"), "α");
    }

    #[test]
    fn subscript_shorthand_is_braced() {
        assert_eq!(to_canonical("x_1 + x_2 = x_3"), "x_{1} + x_{2} = x_{3}");
        assert_eq!(to_canonical("a_12"), "a_{12}");
        assert_eq!(to_canonical("x_{n}"), "x_{n}");
    }

    #[test]
    fn greek_and_operators_expand_to_unicode() {
        assert_eq!(to_canonical(r"\alpha + \beta \leq \gamma"), "α + β ≤ γ");
        assert_eq!(to_canonical(r"\sum_{i} x_i \to \infty"), "∑_{i} x_{i} → ∞");
        assert_eq!(to_canonical(r"\forall x \in S"), "∀ x ∈ S");
    }

    #[test]
    fn digit_fractions_fold() {
        assert_eq!(to_canonical("x = 3/4"), "x = \\frac{3}{4}");
    }

    #[test]
    fn pythagorean_shape_keeps_its_structure() {
        assert_eq!(to_canonical("3^2 + 4^2 = 5^2"), "3^{2} + 4^{2} = 5^{2}");
    }

    #[test]
    fn asterisk_becomes_multiplication_sign() {
        assert_eq!(to_canonical("2*x"), "2×x");
    }

    #[test]
    fn canonical_output_is_a_fixed_point() {
        let inputs = [
            "sqrt(16) = 4",
            "2 + 2 = 4",
            r"\[ \frac{a}{b} \]",
            "x_1 + x_2 = x_3",
            r"\alpha^2 + \beta^2 = \gamma^2",
            "α^2 + β_1 = γ",
            "x = 3/4",
            "2*3",
            "$$\\sum_{i=1}^n i$$",
            "√(25) = 5",
            "E = mc^2",
            "already plain text",
        ];
        for input in inputs {
            let once = to_canonical(input);
            let twice = to_canonical(&once);
            assert_eq!(once, twice, "not idempotent for {input:?}");
        }
    }
}
