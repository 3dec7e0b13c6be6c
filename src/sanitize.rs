/// Clean up user-supplied text before it reaches a command: strip control
/// characters, escape markup-significant characters, collapse runs of
/// whitespace into a single space, and trim both ends.
#[must_use]
pub fn sanitize(text: &str) -> String {
    let mut output = String::with_capacity(text.len());
    let mut pending_space = false;

    for c in text.chars() {
        if c.is_whitespace() {
            pending_space = !output.is_empty();
            continue;
        }

        if c.is_control() {
            continue;
        }

        if pending_space {
            output.push(' ');
            pending_space = false;
        }

        if matches!(c, '\\' | '<' | '>') {
            output.push('\\');
        }
        output.push(c);
    }

    output
}
