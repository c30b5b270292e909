use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use supportchat_core::theme::{contrast, Rgb, Theme};
use supportchat_core::{Entry, Role};

use crate::app::App;

const DRAWER_WIDTH: u16 = 44;

fn color(c: Rgb) -> Color {
    Color::Rgb(c.0, c.1, c.2)
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let theme = app.widget.theme();
    let area = frame.area();

    if !app.widget.is_open() {
        render_closed(frame, area, &theme);
        return;
    }

    // Drawer slides in from the right; the rest of the screen stands in
    // for the host page.
    let [host_area, drawer_area] =
        Layout::horizontal([Constraint::Min(0), Constraint::Length(DRAWER_WIDTH)]).areas(area);

    render_backdrop(app, frame, host_area);
    render_drawer(app, frame, drawer_area, &theme);
}

/// Drawer closed: just the tab toggle in the bottom-right corner.
fn render_closed(frame: &mut Frame, area: Rect, theme: &Theme) {
    let hint = Paragraph::new(Span::styled(
        " enter/o open chat   q quit ",
        Style::default().fg(Color::DarkGray),
    ));
    let hint_area = Rect::new(area.x, area.bottom().saturating_sub(1), area.width, 1);
    frame.render_widget(hint, hint_area);

    let w = 12.min(area.width);
    let h = 3.min(area.height);
    if w == 0 || h == 0 {
        return;
    }
    let tab_area = Rect::new(
        area.right().saturating_sub(w + 2).max(area.x),
        area.bottom().saturating_sub(h + 1).max(area.y),
        w,
        h,
    );

    let tab_style = Style::default()
        .bg(color(theme.tab_bg))
        .fg(color(contrast(theme.tab_bg)));
    let tab = Paragraph::new("💬 Chat")
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL))
        .style(tab_style);
    frame.render_widget(tab, tab_area);
}

fn render_backdrop(app: &App, frame: &mut Frame, area: Rect) {
    if area.height < 2 {
        return;
    }
    let company = app
        .widget
        .state()
        .company_name()
        .unwrap_or("supportchat")
        .to_string();
    let text = vec![
        Line::styled(company, Style::default().fg(Color::DarkGray)),
        Line::styled(
            "esc closes the chat",
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        ),
    ];
    let middle = Rect::new(area.x, area.y + area.height / 2, area.width, 2);
    frame.render_widget(Paragraph::new(text).alignment(Alignment::Center), middle);
}

fn render_drawer(app: &mut App, frame: &mut Frame, area: Rect, theme: &Theme) {
    let input_h = app.input_height() + 2; // + borders
    let [header_area, messages_area, input_area, footer_area] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Min(0),
        Constraint::Length(input_h),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area, theme);
    render_messages(app, frame, messages_area, theme);
    render_input(app, frame, input_area, theme);
    render_footer(app, frame, footer_area, theme);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect, theme: &Theme) {
    let name = app.widget.state().chatbot_name();
    let close_hint = "✕ esc ";

    let left = format!(" {}", name);
    let pad = (area.width as usize)
        .saturating_sub(left.chars().count() + close_hint.chars().count());

    let title = Line::from(vec![
        Span::styled(
            left,
            Style::default()
                .fg(color(contrast(theme.header)))
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" ".repeat(pad)),
        Span::styled(
            close_hint.to_string(),
            Style::default().fg(color(theme.close_icon)),
        ),
    ])
    .style(Style::default().bg(color(theme.header)));

    let mut subtitle_text = app
        .widget
        .state()
        .company_name()
        .map(|c| format!(" {}", c))
        .unwrap_or_default();
    // Pad so the gradient band spans the full drawer width
    let fill = (area.width as usize).saturating_sub(subtitle_text.chars().count());
    subtitle_text.push_str(&" ".repeat(fill));
    let subtitle = Line::styled(
        subtitle_text,
        Style::default()
            .fg(color(contrast(theme.header_gradient)))
            .bg(color(theme.header_gradient)),
    );

    frame.render_widget(Paragraph::new(vec![title, subtitle]), area);
}

fn render_messages(app: &mut App, frame: &mut Frame, area: Rect, theme: &Theme) {
    app.messages_area = Some(area);
    app.chat_height = area.height;
    app.chat_width = area.width.saturating_sub(2);
    let wrap_width = app.chat_width.max(1) as usize;

    let name = app.widget.state().chatbot_name().to_string();
    let dots = ".".repeat(app.animation_frame as usize + 1);

    let transcript = app.widget.transcript();
    let mut lines: Vec<Line> = Vec::new();

    if transcript.shows_welcome() && !transcript.is_typing() {
        lines.push(Line::default());
        lines.push(Line::styled(
            format!(" 👋 Welcome to {}! Ask us anything.", name),
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        ));
    } else {
        for entry in transcript.entries() {
            match entry {
                Entry::Message {
                    role: Role::Human,
                    content,
                    ..
                } => {
                    lines.push(Line::from(Span::styled(
                        " You ",
                        Style::default()
                            .bg(color(theme.human_bubble))
                            .fg(color(contrast(theme.human_bubble)))
                            .add_modifier(Modifier::BOLD),
                    )));
                    for l in content.lines() {
                        lines.push(Line::from(l.to_string()));
                    }
                    lines.push(Line::default());
                }
                Entry::Message {
                    role: Role::Assistant,
                    content,
                    sources,
                } => {
                    lines.push(Line::from(Span::styled(
                        format!(" {} ", name),
                        Style::default()
                            .bg(color(theme.assistant_bubble))
                            .fg(color(contrast(theme.assistant_bubble)))
                            .add_modifier(Modifier::BOLD),
                    )));
                    for l in content.lines() {
                        lines.push(Line::from(l.to_string()));
                    }
                    for url in sources {
                        lines.push(Line::from(Span::styled(
                            format!("  ↗ {}", url),
                            Style::default()
                                .fg(color(theme.send_button))
                                .add_modifier(Modifier::UNDERLINED),
                        )));
                    }
                    lines.push(Line::default());
                }
                Entry::Error { text, .. } => {
                    lines.push(Line::from(Span::styled(
                        format!(" ⚠ {}", text),
                        Style::default().fg(Color::Red),
                    )));
                    lines.push(Line::default());
                }
            }
        }

        if transcript.is_typing() {
            lines.push(Line::from(Span::styled(
                format!(" {} is typing{}", name, dots),
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            )));
        }
    }

    // Estimate wrapped height the same way the scroll math does
    let total: u16 = lines
        .iter()
        .map(|l| wrapped_height(l.width(), wrap_width))
        .sum();
    app.total_chat_lines = total;

    // New entries pull the view to the end of the list
    if app.widget.take_follow() {
        app.scroll_to_bottom();
    }

    let base = Style::default()
        .bg(color(theme.chat_bg))
        .fg(color(contrast(theme.chat_bg)));
    let messages = Paragraph::new(Text::from(lines))
        .style(base)
        .wrap(Wrap { trim: true })
        .scroll((app.chat_scroll, 0));
    frame.render_widget(messages, area);
}

/// Rows a line occupies after wrapping. A line exactly as wide as the
/// view still fits in one row; an empty line still takes one.
fn wrapped_height(line_width: usize, wrap_width: usize) -> u16 {
    line_width.div_ceil(wrap_width).max(1) as u16
}

fn render_input(app: &App, frame: &mut Frame, area: Rect, theme: &Theme) {
    let sending = app.widget.is_sending();

    // Focus ring while the input is live, dim while disabled
    let border_color = if sending {
        Color::DarkGray
    } else {
        color(theme.input_focus)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));

    let inner_h = area.height.saturating_sub(2) as usize;
    let inner_w = area.width.saturating_sub(2) as usize;
    let (cur_line, cur_col) = app.cursor_line_col();

    // Keep the cursor inside the visible window, vertically and
    // horizontally
    let first_line = cur_line.saturating_sub(inner_h.saturating_sub(1));
    let hscroll = if inner_w == 0 || cur_col < inner_w {
        0
    } else {
        cur_col - inner_w + 1
    };

    let text: Vec<Line> = if app.input.is_empty() {
        vec![Line::styled(
            "Type your message…",
            Style::default().fg(Color::DarkGray),
        )]
    } else {
        app.input.split('\n').map(|l| Line::from(l.to_string())).collect()
    };

    let mut style = Style::default()
        .bg(color(theme.input_box))
        .fg(color(contrast(theme.input_box)));
    if sending {
        style = style.add_modifier(Modifier::DIM);
    }

    let input = Paragraph::new(text)
        .style(style)
        .block(block)
        .scroll((first_line as u16, hscroll as u16));
    frame.render_widget(input, area);

    if !sending && inner_h > 0 && inner_w > 0 {
        frame.set_cursor_position((
            area.x + 1 + (cur_col - hscroll) as u16,
            area.y + 1 + (cur_line - first_line) as u16,
        ));
    }
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect, theme: &Theme) {
    let sending = app.widget.is_sending();

    let send_bg = if sending {
        theme.send_button_hover
    } else {
        theme.send_button
    };
    let send_button = Span::styled(
        " Send ⏎ ",
        Style::default()
            .bg(color(send_bg))
            .fg(color(contrast(send_bg)))
            .add_modifier(Modifier::BOLD),
    );

    let hint = if sending {
        Span::styled(
            " sending…",
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        )
    } else {
        Span::styled(
            " shift+⏎ newline   esc close   ↑/↓ scroll",
            Style::default().fg(Color::DarkGray),
        )
    };

    frame.render_widget(Paragraph::new(Line::from(vec![send_button, hint])), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrapped_height_exact_fit_is_one_row() {
        assert_eq!(wrapped_height(0, 40), 1);
        assert_eq!(wrapped_height(39, 40), 1);
        assert_eq!(wrapped_height(40, 40), 1);
        assert_eq!(wrapped_height(41, 40), 2);
        assert_eq!(wrapped_height(80, 40), 2);
        assert_eq!(wrapped_height(81, 40), 3);
    }
}
