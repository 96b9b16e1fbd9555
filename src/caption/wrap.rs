/// Default wrap width for captions, in characters.
pub const DEFAULT_WRAP_WIDTH: usize = 50;

/// Greedy word wrap at a fixed character width.
///
/// Whitespace runs (newlines included) collapse to a single space. Words longer than `width`
/// are split into `width`-sized pieces. Widths are counted in `char`s, not pixels.
pub fn wrap_caption(text: &str, width: usize) -> String {
    let width = width.max(1);
    let mut lines: Vec<String> = Vec::new();
    let mut line = String::new();
    let mut line_len = 0usize;

    for word in text.split_whitespace() {
        let chars: Vec<char> = word.chars().collect();
        let mut rest = chars.as_slice();

        while !rest.is_empty() {
            let sep = usize::from(line_len > 0);
            if line_len + sep + rest.len() <= width {
                if sep == 1 {
                    line.push(' ');
                }
                line.extend(rest.iter());
                line_len += sep + rest.len();
                break;
            }
            if rest.len() <= width {
                // Fits on a fresh line.
                lines.push(std::mem::take(&mut line));
                line_len = 0;
                continue;
            }
            // Overlong word: fill what is left of this line, carry the remainder.
            let room = width.saturating_sub(line_len + sep);
            if room == 0 {
                lines.push(std::mem::take(&mut line));
                line_len = 0;
                continue;
            }
            if sep == 1 {
                line.push(' ');
            }
            line.extend(rest[..room].iter());
            rest = &rest[room..];
            lines.push(std::mem::take(&mut line));
            line_len = 0;
        }
    }
    if line_len > 0 {
        lines.push(line);
    }
    lines.join("\n")
}

#[cfg(test)]
#[path = "../../tests/unit/caption/wrap.rs"]
mod tests;
