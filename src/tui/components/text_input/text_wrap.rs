//! Wrapping helpers and dimensions shared by `TextInput` and its cursor.

/// Two borders plus one column kept free for the cursor at line end
pub(super) const HORIZONTAL_OVERHEAD: u16 = 3;
/// Top + bottom borders
pub(super) const VERTICAL_OVERHEAD: u16 = 2;
/// Offset from area edge to content (border width)
pub(super) const BORDER_OFFSET: u16 = 1;

pub(super) fn wrap_options(inner_width: u16) -> textwrap::Options<'static> {
    textwrap::Options::new(inner_width as usize)
        .break_words(true)
        .word_separator(textwrap::WordSeparator::AsciiSpace)
}

/// Content width inside the bordered block, 0 if the area is too narrow.
pub(super) fn inner_width(content_width: u16) -> u16 {
    content_width.saturating_sub(HORIZONTAL_OVERHEAD)
}

/// Number of wrapped lines, counting a trailing newline as its own line.
pub(super) fn wrap_line_count(text: &str, width: u16) -> u16 {
    if width == 0 || text.is_empty() {
        return 1;
    }

    let lines = textwrap::wrap(text, wrap_options(width));
    let mut count = (lines.len() as u16).max(1);

    if text.ends_with('\n') && !lines.last().is_some_and(|l| l.is_empty()) {
        count += 1;
    }

    count
}

/// Byte range `(start, end)` of every wrapped row, in display order.
///
/// Rows keep the whitespace textwrap trims, so a whitespace-only line still
/// spans its bytes and the last row of a logical line ends at its newline.
pub(super) fn row_spans(text: &str, width: u16) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut line_start = 0;
    for logical in text.split('\n') {
        let line_end = line_start + logical.len();
        let mut starts = vec![line_start];
        let mut search = 0;
        for (idx, segment) in textwrap::wrap(logical, wrap_options(width)).iter().enumerate() {
            let at = logical[search..]
                .find(segment.as_ref())
                .map_or(search, |i| search + i);
            if idx > 0 {
                starts.push(line_start + at);
            }
            search = at + segment.len();
        }
        for (idx, &start) in starts.iter().enumerate() {
            let end = starts.get(idx + 1).copied().unwrap_or(line_end);
            spans.push((start, end));
        }
        line_start = line_end + 1;
    }
    spans
}

/// Index into `spans` of the row holding byte offset `pos`.
pub(super) fn row_of(spans: &[(usize, usize)], pos: usize) -> usize {
    spans
        .iter()
        .rposition(|&(start, _)| start <= pos)
        .unwrap_or(0)
}

pub(super) fn prev_char_boundary(text: &str, pos: usize) -> usize {
    text[..pos]
        .char_indices()
        .next_back()
        .map(|(i, _)| i)
        .unwrap_or(0)
}

pub(super) fn next_char_boundary(text: &str, pos: usize) -> usize {
    text[pos..]
        .char_indices()
        .nth(1)
        .map(|(i, _)| pos + i)
        .unwrap_or(text.len())
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Start of the word before `pos`: skip separators, then word characters.
pub(super) fn prev_word_boundary(text: &str, pos: usize) -> usize {
    let mut chars = text[..pos].char_indices().rev().peekable();

    while chars.peek().is_some_and(|&(_, c)| !is_word_char(c)) {
        chars.next();
    }

    let mut boundary = 0;
    while let Some(&(i, c)) = chars.peek() {
        if !is_word_char(c) {
            boundary = i + c.len_utf8();
            break;
        }
        boundary = i;
        chars.next();
    }

    boundary
}

/// End of the word after `pos`: skip separators, then word characters.
pub(super) fn next_word_boundary(text: &str, pos: usize) -> usize {
    let mut chars = text[pos..].char_indices().peekable();

    while chars.peek().is_some_and(|&(_, c)| !is_word_char(c)) {
        chars.next();
    }
    while chars.peek().is_some_and(|&(_, c)| is_word_char(c)) {
        chars.next();
    }

    match chars.peek() {
        Some(&(i, _)) => pos + i,
        None => text.len(),
    }
}

/// Byte offset of the start of the logical line containing `pos`.
pub(super) fn line_start(text: &str, pos: usize) -> usize {
    text[..pos].rfind('\n').map(|i| i + 1).unwrap_or(0)
}

/// Byte offset of the end of the logical line containing `pos`.
pub(super) fn line_end(text: &str, pos: usize) -> usize {
    text[pos..].find('\n').map(|i| pos + i).unwrap_or(text.len())
}
