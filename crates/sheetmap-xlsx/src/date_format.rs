//! Date-format detection heuristic
//!
//! XLSX has a "d" cell type for dates, but spreadsheet editors mostly store
//! dates as plain numeric cells. The only signal left is the cell's number
//! format: either its id is one of the built-in date/time formats, or its
//! display template looks like a date template. This is a heuristic, not a
//! guarantee: unrecognized locales produce false negatives, and false
//! positives are avoided by requiring every template token to match.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::styles::NumberFormat;

/// Number format ids reserved for date/time display.
/// https://hexdocs.pm/xlsxir/number_styles.html
const BUILT_IN_DATE_NUMBER_FORMAT_IDS: &[u32] = &[
    14, 15, 16, 17, 18, 19, 20, 21, 22, 27, 30, 36, 45, 46, 47, 50, 57,
];

/// Template tokens that may appear in a date/time format. Tokens could be in
/// upper case or in lower case; there seems to be no single standard, so
/// templates are lowercased before matching.
///
/// The odd "e" token appears in built-in formats 27/36/50/57
/// ("[$-404]e/m/d") and is undocumented.
const DATE_TEMPLATE_TOKENS: &[&str] = &[
    "ss", "mm", "h", "hh", "am", "pm", "d", "dd", "m", "mmm", "mmmm", "yy", "yyyy", "e",
];

// Some date formats carry a "[$-414]" locale prefix ("[$-414]mmmm\ yyyy;@")
// or a ";@" suffix ("m/d/yyyy;@"). Both are trimmed before tokenizing.
static LOCALE_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\[\$-414\]").unwrap());
static TRAILING_SUFFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r";@$").unwrap());
static NON_WORD_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\W+").unwrap());

/// Options steering the heuristic
#[derive(Debug, Clone, Default)]
pub struct DateFormatOptions {
    /// A template string the caller is certain is a date format; a style
    /// whose template equals it exactly is treated as a date
    pub explicit_template: Option<String>,
    /// Disable rule (3), the template-token detection
    pub disable_smart_detection: bool,
}

/// Decide whether a number format most likely displays a date.
pub fn is_date_format(format: &NumberFormat, options: &DateFormatOptions) -> bool {
    if BUILT_IN_DATE_NUMBER_FORMAT_IDS.contains(&format.id) {
        return true;
    }

    let template = match &format.template {
        Some(t) => t,
        None => return false,
    };

    if let Some(explicit) = &options.explicit_template {
        if template == explicit {
            return true;
        }
    }

    if !options.disable_smart_detection && is_date_template(template) {
        return true;
    }

    false
}

/// Check whether every token of a format template is a date/time token.
fn is_date_template(template: &str) -> bool {
    let template = template.to_lowercase();
    let template = LOCALE_PREFIX.replace(&template, "");
    let template = TRAILING_SUFFIX.replace(&template, "");

    NON_WORD_RUN
        .split(&template)
        .all(|token| DATE_TEMPLATE_TOKENS.contains(&token))
}
