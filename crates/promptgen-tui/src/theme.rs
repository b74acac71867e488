use ratatui::style::{Color, Modifier, Style};

const PURPLE: Color = Color::Rgb(0x7D, 0x56, 0xF4);
const STEEL: Color = Color::Rgb(0x4D, 0x7E, 0xA8);
const GREEN: Color = Color::Rgb(0x2D, 0x98, 0x62);
const MINT: Color = Color::Rgb(0x04, 0xB5, 0x75);
const PINK: Color = Color::Rgb(0xFF, 0x5F, 0x87);
const SNOW: Color = Color::Rgb(0xFA, 0xFA, 0xFA);
const CHARCOAL: Color = Color::Rgb(0x24, 0x24, 0x24);

/// Every style the UI draws with. Built once at startup and read-only after.
#[derive(Debug, Clone)]
pub struct Theme {
    pub title: Style,
    pub border: Style,
    pub item_title: Style,
    pub item_detail: Style,
    pub selected_title: Style,
    pub selected_detail: Style,
    pub filter_prompt: Style,
    pub dimmed: Style,
    pub tag: Style,
    pub info: Style,
    pub content_header: Style,
    pub input_label: Style,
    pub input_focused: Style,
    pub input_blurred: Style,
    pub spinner: Style,
    pub success: Style,
    pub error: Style,
    pub help_key: Style,
    pub help_desc: Style,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            title: Style::default().fg(PURPLE).add_modifier(Modifier::BOLD),
            border: Style::default().fg(STEEL),
            item_title: Style::default().fg(Color::White),
            item_detail: Style::default().fg(Color::DarkGray),
            selected_title: Style::default().fg(PURPLE).add_modifier(Modifier::BOLD),
            selected_detail: Style::default().fg(STEEL),
            filter_prompt: Style::default().fg(MINT),
            dimmed: Style::default().fg(Color::DarkGray),
            tag: Style::default().fg(MINT).bg(CHARCOAL),
            info: Style::default().fg(SNOW).bg(STEEL),
            content_header: Style::default()
                .fg(SNOW)
                .bg(GREEN)
                .add_modifier(Modifier::BOLD),
            input_label: Style::default().fg(PURPLE).add_modifier(Modifier::BOLD),
            input_focused: Style::default().fg(Color::Rgb(0xFF, 0x87, 0xD7)),
            input_blurred: Style::default().fg(Color::DarkGray),
            spinner: Style::default().fg(Color::Rgb(0xFF, 0x87, 0xD7)),
            success: Style::default().fg(GREEN).add_modifier(Modifier::BOLD),
            error: Style::default().fg(PINK).add_modifier(Modifier::BOLD),
            help_key: Style::default().fg(Color::Gray),
            help_desc: Style::default().fg(Color::DarkGray),
        }
    }
}

impl Theme {
    /// Modifiers only, for `--no-color` and `NO_COLOR`.
    pub fn monochrome() -> Self {
        let plain = Style::default();
        let bold = plain.add_modifier(Modifier::BOLD);
        let dim = plain.add_modifier(Modifier::DIM);
        let reversed = plain.add_modifier(Modifier::REVERSED);
        Self {
            title: bold,
            border: plain,
            item_title: plain,
            item_detail: dim,
            selected_title: bold.add_modifier(Modifier::REVERSED),
            selected_detail: reversed,
            filter_prompt: bold,
            dimmed: dim,
            tag: reversed,
            info: plain.add_modifier(Modifier::ITALIC),
            content_header: bold.add_modifier(Modifier::UNDERLINED),
            input_label: bold,
            input_focused: bold,
            input_blurred: dim,
            spinner: bold,
            success: bold,
            error: bold.add_modifier(Modifier::UNDERLINED),
            help_key: bold,
            help_desc: dim,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monochrome_has_no_colors() {
        let t = Theme::monochrome();
        for style in [
            t.title,
            t.border,
            t.item_title,
            t.selected_title,
            t.tag,
            t.info,
            t.content_header,
            t.success,
            t.error,
            t.help_key,
        ] {
            assert_eq!(style.fg, None);
            assert_eq!(style.bg, None);
        }
    }

    #[test]
    fn success_and_error_are_distinct() {
        let t = Theme::default();
        assert_ne!(t.success, t.error);
        let m = Theme::monochrome();
        assert_ne!(m.success, m.error);
    }
}
