use std::io::Write;

/// Copy text to the system clipboard via the OSC 52 terminal escape sequence.
pub(super) fn osc52_copy(text: &str) {
    use base64::Engine;
    let encoded = base64::engine::general_purpose::STANDARD.encode(text.as_bytes());
    // Write directly to stdout, bypassing the terminal backend buffer
    let _ = std::io::stdout().write_all(format!("\x1b]52;c;{}\x07", encoded).as_bytes());
    let _ = std::io::stdout().flush();
}

/// Apply one typed character to a text buffer; `'\x08'` deletes the last char.
pub(super) fn edit_text(buffer: &mut String, ch: char) {
    if ch == '\x08' {
        buffer.pop();
    } else {
        buffer.push(ch);
    }
}

/// Next value after `current` in `values`, wrapping through `None` ("all").
pub(super) fn cycle<T: Copy + PartialEq>(current: Option<T>, values: &[T]) -> Option<T> {
    match current {
        None => values.first().copied(),
        Some(v) => values
            .iter()
            .position(|x| *x == v)
            .and_then(|i| values.get(i + 1))
            .copied(),
    }
}

/// Wall-clock time for status messages.
pub(super) fn now_hms() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_wraps_through_all() {
        let values = [1, 2, 3];
        assert_eq!(cycle(None, &values), Some(1));
        assert_eq!(cycle(Some(2), &values), Some(3));
        assert_eq!(cycle(Some(3), &values), None);
        assert_eq!(cycle::<i32>(None, &[]), None);
    }

    #[test]
    fn edit_text_handles_backspace() {
        let mut buf = String::from("ab");
        edit_text(&mut buf, '\x08');
        edit_text(&mut buf, 'é');
        assert_eq!(buf, "aé");
        edit_text(&mut String::new(), '\x08');
    }
}
