//! Splitting a single cell's text into array elements.
//!
//! The separator is configurable; double-quoted blocks may contain the
//! separator verbatim. Quotes are unwrapped in the output.

/// Consume characters starting at `start` until `end_char` (exclusive).
///
/// A `"` opens a nested block that runs to the closing `"`; everything inside
/// it, separators included, is copied literally. Returns the collected text
/// and the number of characters consumed (not counting `end_char` itself).
fn get_block(chars: &[char], end_char: char, start: usize) -> (String, usize) {
    let mut consumed = 0;
    let mut text = String::new();
    while start + consumed < chars.len() {
        let character = chars[start + consumed];
        if character == end_char {
            return (text, consumed);
        } else if character == '"' {
            let (block, block_len) = get_block(chars, '"', start + consumed + 1);
            text.push_str(&block);
            // Skip the block plus both quote characters.
            consumed += 1 + block_len + 1;
        } else {
            text.push(character);
            consumed += 1;
        }
    }
    (text, consumed)
}

/// Split `text` on `separator`, respecting double-quoted blocks.
///
/// Each element is trimmed of surrounding whitespace.
///
/// ```
/// use sheetmap::schema::parse_array;
///
/// assert_eq!(
///     parse_array(r#"Barack Obama, "String, with, colons", Donald Trump"#, ','),
///     vec!["Barack Obama", "String, with, colons", "Donald Trump"]
/// );
/// ```
pub fn parse_array(text: &str, separator: char) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut blocks = Vec::new();
    let mut index = 0;
    while index < chars.len() {
        let (block, length) = get_block(&chars, separator, index);
        index += length + 1;
        blocks.push(block.trim().to_string());
    }
    blocks
}
