//! Single-line classification.
//!
//! An ordered decision table: the first matching rule wins, and the order is
//! load-bearing because the patterns overlap. CJK-script rules run first so
//! Chinese headings and list glyphs are never claimed by the Latin rules,
//! then markdown headings, list markers, the math heuristic, and finally
//! plain text.

use once_cell::sync::Lazy;
use regex::Regex;

use super::math::{self, MathKind};
use crate::types::{ContentBlock, LanguageHint};

static RE_HASH_HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(#{1,6})\s*(\S.*)$").unwrap());
static RE_COLON_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z][A-Za-z0-9 ,'()/&-]{0,58}:$").unwrap());
static RE_BULLET: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[-*•]\s+(.+)$").unwrap());
static RE_ORDERED: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{1,3})[.)]\s+(.+)$").unwrap());
static RE_CJK_NUMERAL_ITEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[一二三四五六七八九十百]+\s*[、.．]\s*(.*)$").unwrap());
static RE_CJK_ARABIC_ITEM: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{1,3}、\s*(.*)$").unwrap());

// Math heuristic: rejection patterns.
static RE_BARE_INT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+$").unwrap());
static RE_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{1,2}[/-]\d{1,2}[/-]\d{2,4}$").unwrap());
static RE_NUMBERED_ITEM: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{1,3}[.)]\s").unwrap());

// Math heuristic: acceptance patterns.
// `/` is deliberately absent: slashed digits go through the fraction rule,
// which carries the URL guard.
static RE_DIGIT_OP_DIGIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d\s*[\^+\-*×]\s*\d").unwrap());
static RE_IMPERATIVE_VERB: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(solve|calculate|find|evaluate|simplify|compute)\b").unwrap());
static RE_FRACTION_FORM: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+\s*/\s*\d+").unwrap());
static RE_FUNCTION_CALL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(sqrt|sin|cos|tan|sec|csc|cot|log|ln|exp)\s*\(").unwrap());
static RE_WORD_PI: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bpi\b").unwrap());
static RE_VARIABLE_EQUATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z]\s*[+\-*/^]\s*[0-9A-Za-z]+\s*=").unwrap());
static RE_PYTHAGOREAN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\ba\s*\^\s*2\s*\+\s*b\s*\^\s*2\s*=\s*c\s*\^\s*2").unwrap());
static RE_MASS_ENERGY: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\be\s*=\s*mc\s*\^?\s*2").unwrap());
static RE_FORCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bf\s*=\s*m\s*\*?\s*a\b").unwrap());
static RE_GEOMETRY_TERM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(area|perimeter|radius|diameter|circumference|volume|hypotenuse|slope)\s*[:=]")
        .unwrap()
});

fn is_cjk_char(c: char) -> bool {
    matches!(c,
        '\u{4E00}'..='\u{9FFF}' | '\u{3400}'..='\u{4DBF}' | '\u{F900}'..='\u{FAFF}')
}

fn contains_cjk(s: &str) -> bool {
    s.chars().any(is_cjk_char)
}

fn cjk_rules_active(line: &str, hint: LanguageHint) -> bool {
    match hint {
        LanguageHint::Chinese => true,
        LanguageHint::Latin => false,
        LanguageHint::Auto => contains_cjk(line),
    }
}

/// Classify one line of accumulated text. Tables are handled by the
/// assembler; this never returns a `Table` variant.
pub fn classify_line(line: &str, hint: LanguageHint) -> ContentBlock {
    let line = line.trim();
    if line.is_empty() {
        return ContentBlock::PlainText {
            text: String::new(),
        };
    }

    if cjk_rules_active(line, hint) {
        if let Some(block) = classify_cjk(line) {
            return block;
        }
    }

    // Markdown heading. `##` is the top heading level the model actually
    // emits, so hash counts map down by one.
    if let Some(caps) = RE_HASH_HEADING.captures(line) {
        let level = (caps[1].len().saturating_sub(1)).clamp(1, 3) as u8;
        return ContentBlock::Heading {
            level,
            text: caps[2].trim().to_string(),
        };
    }
    if RE_COLON_HEADING.is_match(line) {
        return ContentBlock::Heading {
            level: 3,
            text: line.trim_end_matches(':').trim().to_string(),
        };
    }

    if let Some(caps) = RE_BULLET.captures(line) {
        return ContentBlock::ListItem {
            ordered: false,
            index: None,
            text: caps[1].trim().to_string(),
        };
    }
    if let Some(caps) = RE_ORDERED.captures(line) {
        // A numbered item carrying an `=` may really be a worked equation;
        // let the math heuristic look at it before settling on a list item.
        if !line.contains('=') || math_candidate(line).is_none() {
            return ContentBlock::ListItem {
                ordered: true,
                index: caps[1].parse().ok(),
                text: caps[2].trim().to_string(),
            };
        }
    }

    if let Some((expr, kind)) = math_candidate(line) {
        let markup = math::to_canonical(&expr);
        return match kind {
            MathKind::Display => ContentBlock::MathDisplay { markup },
            MathKind::Inline => ContentBlock::MathInline { markup },
        };
    }

    ContentBlock::PlainText {
        text: line.to_string(),
    }
}

/// CJK-script heading and list rules.
fn classify_cjk(line: &str) -> Option<ContentBlock> {
    if let Some(caps) = RE_HASH_HEADING.captures(line) {
        let text = caps[2].trim();
        if contains_cjk(text) {
            return Some(ContentBlock::ChineseHeading {
                text: text.to_string(),
            });
        }
    }
    // A run of CJK characters ending in a full- or half-width colon.
    if let Some(body) = line.strip_suffix('：').or_else(|| line.strip_suffix(':')) {
        let body = body.trim();
        if body.chars().last().is_some_and(is_cjk_char) {
            return Some(ContentBlock::ChineseHeading {
                text: body.to_string(),
            });
        }
    }
    for marker in ['•', '·', '◦'] {
        if let Some(rest) = line.strip_prefix(marker) {
            return Some(ContentBlock::ChineseSubheading {
                text: rest.trim().to_string(),
            });
        }
    }
    if let Some(caps) = RE_CJK_NUMERAL_ITEM.captures(line) {
        return Some(ContentBlock::ChineseSubheading {
            text: caps[1].trim().to_string(),
        });
    }
    if let Some(caps) = RE_CJK_ARABIC_ITEM.captures(line) {
        return Some(ContentBlock::ChineseSubheading {
            text: caps[1].trim().to_string(),
        });
    }
    None
}

/// The math-expression heuristic of the decision table.
///
/// Returns the expression to transcribe and whether it was display math.
/// This is an explicit, reproducible rule list, not NLP; known false
/// positives/negatives on edge cases are an accepted tradeoff.
fn math_candidate(line: &str) -> Option<(String, MathKind)> {
    // A delimited run anywhere in the line is the strongest signal.
    if let Some((inner, kind)) = math::extract_delimited(line) {
        if inner.len() > 100 {
            return None;
        }
        return Some((inner, kind));
    }

    let t = line.trim();
    if t.len() > 100 {
        return None;
    }
    if RE_BARE_INT.is_match(t) || RE_DATE.is_match(t) {
        return None;
    }
    if RE_NUMBERED_ITEM.is_match(t) && !t.contains('=') {
        return None;
    }
    // Ordinary prose: long and operator-free.
    let word_count = t.split_whitespace().count();
    let has_operator = t
        .chars()
        .any(|c| matches!(c, '=' | '+' | '*' | '/' | '^' | '√' | '×' | '÷'));
    if word_count > 8 && !has_operator {
        return None;
    }

    let has_arith = t
        .chars()
        .any(|c| matches!(c, '+' | '-' | '*' | '/' | '^' | '√'));
    // Chained operators: `-` is excluded from the count so hyphenated prose
    // does not trip the rule.
    let chained_ops = t.chars().filter(|c| matches!(c, '+' | '*' | '/' | '^')).count();

    let accepted = (t.contains('=') && has_arith)
        || RE_DIGIT_OP_DIGIT.is_match(t)
        || RE_IMPERATIVE_VERB.is_match(t)
        || (RE_FRACTION_FORM.is_match(t) && !looks_like_url(t))
        || t.contains("sqrt(")
        || t.contains('√')
        || RE_FUNCTION_CALL.is_match(t)
        || RE_WORD_PI.is_match(t)
        || RE_VARIABLE_EQUATION.is_match(t)
        || chained_ops >= 3
        || RE_PYTHAGOREAN.is_match(t)
        || RE_MASS_ENERGY.is_match(t)
        || RE_FORCE.is_match(t)
        || RE_GEOMETRY_TERM.is_match(t);

    accepted.then(|| (t.to_string(), MathKind::Inline))
}

fn looks_like_url(t: &str) -> bool {
    t.contains("http://") || t.contains("https://") || t.contains("www.")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LanguageHint::{Auto, Chinese, Latin};

    #[test]
    fn hash_headings_map_down_one_level() {
        assert_eq!(
            classify_line("## Summary", Auto),
            ContentBlock::Heading { level: 1, text: "Summary".into() }
        );
        assert_eq!(
            classify_line("# Title", Auto),
            ContentBlock::Heading { level: 1, text: "Title".into() }
        );
        assert_eq!(
            classify_line("### Details", Auto),
            ContentBlock::Heading { level: 2, text: "Details".into() }
        );
        assert_eq!(
            classify_line("#### Fine print", Auto),
            ContentBlock::Heading { level: 3, text: "Fine print".into() }
        );
    }

    #[test]
    fn capitalized_colon_line_is_a_heading() {
        assert_eq!(
            classify_line("Key Takeaways:", Auto),
            ContentBlock::Heading { level: 3, text: "Key Takeaways".into() }
        );
        // Not capitalized: falls through to plain text.
        assert!(matches!(
            classify_line("key takeaways:", Auto),
            ContentBlock::PlainText { .. }
        ));
    }

    #[test]
    fn bullet_and_numbered_items() {
        assert_eq!(
            classify_line("- first point", Auto),
            ContentBlock::ListItem { ordered: false, index: None, text: "first point".into() }
        );
        assert_eq!(
            classify_line("* star point", Auto),
            ContentBlock::ListItem { ordered: false, index: None, text: "star point".into() }
        );
        assert_eq!(
            classify_line("2. second", Auto),
            ContentBlock::ListItem { ordered: true, index: Some(2), text: "second".into() }
        );
    }

    #[test]
    fn numbered_equation_falls_through_to_math() {
        assert_eq!(
            classify_line("1. 2 + 2 = 4", Auto),
            ContentBlock::MathInline { markup: "1. 2 + 2 = 4".into() }
        );
        // Without an `=`, a numbered item stays a list item.
        assert_eq!(
            classify_line("1. Add 2 and 2", Auto),
            ContentBlock::ListItem { ordered: true, index: Some(1), text: "Add 2 and 2".into() }
        );
    }

    #[test]
    fn plain_arithmetic_is_inline_math() {
        assert_eq!(
            classify_line("2 + 2 = 4", Auto),
            ContentBlock::MathInline { markup: "2 + 2 = 4".into() }
        );
    }

    #[test]
    fn sqrt_line_gets_canonical_markup() {
        assert_eq!(
            classify_line("sqrt(16) = 4", Auto),
            ContentBlock::MathInline { markup: "\\sqrt{16} = 4".into() }
        );
    }

    #[test]
    fn display_delimiters_yield_display_math() {
        assert_eq!(
            classify_line(r"$$\frac{a}{b}$$", Auto),
            ContentBlock::MathDisplay { markup: "\\frac{a}{b}".into() }
        );
        assert!(matches!(
            classify_line(r"The identity \(e = mc^2\) holds.", Auto),
            ContentBlock::MathInline { .. }
        ));
    }

    #[test]
    fn math_rejections() {
        // Bare integer.
        assert!(matches!(classify_line("42", Auto), ContentBlock::PlainText { .. }));
        // Dates, slash and dash style.
        assert!(matches!(classify_line("12/05/2024", Auto), ContentBlock::PlainText { .. }));
        assert!(matches!(classify_line("3-04-25", Auto), ContentBlock::PlainText { .. }));
        // Long prose with no operators.
        assert!(matches!(
            classify_line(
                "The committee met on Tuesday to review the quarterly report in detail",
                Auto
            ),
            ContentBlock::PlainText { .. }
        ));
        // Fraction inside a URL.
        assert!(matches!(
            classify_line("see https://example.com/2/3 for context", Auto),
            ContentBlock::PlainText { .. }
        ));
    }

    #[test]
    fn imperative_verb_accepts_short_lines_only() {
        assert!(matches!(
            classify_line("Solve 3x + 1 = 7", Auto),
            ContentBlock::MathInline { .. }
        ));
        assert!(matches!(
            classify_line(
                "Find out what the committee decided about the new building on Tuesday",
                Auto
            ),
            ContentBlock::PlainText { .. }
        ));
    }

    #[test]
    fn chinese_headings_and_items() {
        assert_eq!(
            classify_line("## 摘要", Auto),
            ContentBlock::ChineseHeading { text: "摘要".into() }
        );
        assert_eq!(
            classify_line("第一部分：", Auto),
            ContentBlock::ChineseHeading { text: "第一部分".into() }
        );
        assert_eq!(
            classify_line("一、背景介绍", Auto),
            ContentBlock::ChineseSubheading { text: "背景介绍".into() }
        );
        assert_eq!(
            classify_line("1、第一项", Auto),
            ContentBlock::ChineseSubheading { text: "第一项".into() }
        );
        assert_eq!(
            classify_line("• 要点说明", Auto),
            ContentBlock::ChineseSubheading { text: "要点说明".into() }
        );
    }

    #[test]
    fn latin_hint_disables_cjk_rules() {
        // Same glyph, Latin hint: the bullet rule owns it.
        assert_eq!(
            classify_line("• bullet point", Latin),
            ContentBlock::ListItem { ordered: false, index: None, text: "bullet point".into() }
        );
        // Under Auto a Latin-only bullet also stays a list item.
        assert_eq!(
            classify_line("• bullet point", Auto),
            ContentBlock::ListItem { ordered: false, index: None, text: "bullet point".into() }
        );
        // Chinese hint claims it for the CJK subheading rule.
        assert_eq!(
            classify_line("• bullet point", Chinese),
            ContentBlock::ChineseSubheading { text: "bullet point".into() }
        );
    }
}
