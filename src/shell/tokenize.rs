/// Split a command line into words.
///
/// Double or single quotes group words containing spaces; a backslash takes
/// the next character literally. Quotes are not part of the returned words.
pub fn split_command_line(line: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    // Distinguishes `""` (an empty argument) from no argument at all.
    let mut has_token = false;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match (c, quote) {
            ('\\', _) => {
                if let Some(next) = chars.next() {
                    current.push(next);
                    has_token = true;
                }
            }
            ('"' | '\'', None) => {
                quote = Some(c);
                has_token = true;
            }
            (c, Some(q)) if c == q => quote = None,
            (c, None) if c.is_whitespace() => {
                if has_token {
                    out.push(std::mem::take(&mut current));
                    has_token = false;
                }
            }
            _ => {
                current.push(c);
                has_token = true;
            }
        }
    }

    if has_token {
        out.push(current);
    }

    out
}
