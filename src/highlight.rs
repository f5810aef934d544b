use inksac::prelude::*;

const ERROR_MARKER: &str = "✗";
const INFO_MARKER: &str = "ℹ";

#[derive(Debug, Clone, Copy)]
pub struct SyntaxHighlighter {
    color_support: ColorSupport,
}

impl Default for SyntaxHighlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntaxHighlighter {
    pub fn new() -> Self {
        let support = check_color_support().unwrap_or(ColorSupport::NoColor);
        Self {
            color_support: support,
        }
    }

    pub fn plain() -> Self {
        Self::with_support(ColorSupport::NoColor)
    }

    pub fn with_support(color_support: ColorSupport) -> Self {
        Self { color_support }
    }

    pub fn is_plain(&self) -> bool {
        matches!(self.color_support, ColorSupport::NoColor)
    }

    fn paint(&self, text: &str, style: Style) -> String {
        if self.is_plain() {
            return text.to_string();
        }
        text.style(style).to_string()
    }

    /// Colors the command word of each pipe segment and every flag, leaving
    /// the whitespace exactly as typed so the editor's cursor stays aligned.
    pub fn highlight_command(&self, input: &str) -> String {
        if self.is_plain() {
            return input.to_string();
        }

        let command_style = Style::builder().foreground(Color::Cyan).bold().build();
        let flag_style = Style::builder().foreground(Color::Yellow).build();

        let mut output = String::with_capacity(input.len() * 2);
        let mut word_start = None;
        let mut expect_command = true;
        for (index, c) in input.char_indices().chain([(input.len(), ' ')]) {
            match (c.is_whitespace(), word_start) {
                (false, None) => word_start = Some(index),
                (true, Some(start)) => {
                    let word = &input[start..index];
                    if word == "|" {
                        output.push_str(word);
                        expect_command = true;
                    } else if expect_command {
                        output.push_str(&self.paint(word, command_style));
                        expect_command = false;
                    } else if word.starts_with('-') {
                        output.push_str(&self.paint(word, flag_style));
                    } else {
                        output.push_str(word);
                    }
                    word_start = None;
                }
                _ => {}
            }
            if c.is_whitespace() && index < input.len() {
                output.push(c);
            }
        }
        output
    }

    pub fn highlight_error(&self, error: &str) -> String {
        let style = Style::builder().foreground(Color::Red).bold().build();
        self.paint(&format!("{ERROR_MARKER} {error}"), style)
    }

    pub fn highlight_info(&self, message: &str) -> String {
        let style = Style::builder().foreground(Color::Cyan).build();
        self.paint(&format!("{INFO_MARKER} {message}"), style)
    }

    pub fn highlight_hint(&self, hint: &str) -> String {
        let style = Style::builder().foreground(Color::RGB(128, 128, 128)).build();
        self.paint(hint, style)
    }

    pub fn highlight_match(&self, text: &str) -> String {
        let style = Style::builder().foreground(Color::Red).bold().build();
        self.paint(text, style)
    }

    pub fn highlight_directory(&self, name: &str) -> String {
        let style = Style::builder().foreground(Color::Blue).bold().build();
        self.paint(name, style)
    }

    pub fn highlight_executable(&self, name: &str) -> String {
        let style = Style::builder().foreground(Color::Green).bold().build();
        self.paint(name, style)
    }

    pub fn highlight_diff_line(&self, line: &str) -> String {
        let color = match line.as_bytes().first() {
            Some(b'+') => Color::Green,
            Some(b'-') => Color::Red,
            Some(b'@') => Color::Cyan,
            _ => return line.to_string(),
        };
        self.paint(line, Style::builder().foreground(color).build())
    }

    pub fn highlight_prompt(&self, prompt: &str) -> String {
        if self.is_plain() {
            return prompt.to_string();
        }
        let Some((identity, rest)) = prompt.split_once(':') else {
            return prompt.to_string();
        };
        let (path, tail) = match rest.rfind('$') {
            Some(index) => rest.split_at(index),
            None => (rest, ""),
        };

        let identity_style = Style::builder().foreground(Color::Green).bold().build();
        let path_style = Style::builder().foreground(Color::Blue).bold().build();
        format!(
            "{}:{}{}",
            self.paint(identity, identity_style),
            self.paint(path, path_style),
            tail
        )
    }
}
