use iced::{
    Alignment::Center,
    Color, Element, Length, Theme, border,
    widget::{button, column, container, container::Style, row, text},
};
use iced_widget::container::bordered_box;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeKind {
    Neutral,
    Danger,
}

fn tinted(color: Color) -> Color {
    Color { a: 0.15, ..color }
}

impl BannerKind {
    fn style(self) -> impl Fn(&Theme) -> Style {
        move |theme: &Theme| {
            let palette = theme.palette();
            let accent = match self {
                BannerKind::Info => palette.primary,
                BannerKind::Success => palette.success,
                BannerKind::Error => palette.danger,
            };
            Style {
                text_color: Some(accent),
                ..bordered_box(theme)
            }
            .border(border::rounded(6).color(accent).width(1))
            .background(tinted(accent))
        }
    }
}

impl BadgeKind {
    fn style(self) -> impl Fn(&Theme) -> Style {
        move |theme: &Theme| {
            let palette = theme.palette();
            let accent = match self {
                BadgeKind::Neutral => palette.text,
                BadgeKind::Danger => palette.danger,
            };
            Style {
                text_color: Some(accent),
                ..Style::default()
            }
            .border(border::rounded(10))
            .background(tinted(accent))
        }
    }
}

/// Inline feedback message, optionally with a dismiss button.
pub fn banner<'a, Message>(
    kind: BannerKind,
    message: impl Into<String>,
    on_dismiss: Option<Message>,
) -> Element<'a, Message>
where
    Message: Clone + 'a,
{
    let mut content = row![text(message.into()).size(14).width(Length::Fill)]
        .spacing(12)
        .align_y(Center);
    if let Some(on_dismiss) = on_dismiss {
        content = content.push(
            button(text("Dismiss").size(14))
                .style(button::text)
                .on_press(on_dismiss),
        );
    }
    container(content)
        .padding(16)
        .width(Length::Fill)
        .style(kind.style())
        .into()
}

pub fn badge<'a, Message: 'a>(kind: BadgeKind, label: &'a str) -> Element<'a, Message> {
    container(text(label).size(12))
        .padding([2, 10])
        .style(kind.style())
        .into()
}

/// A muted box around one row of project details.
pub fn detail_box<'a, Message: 'a>(content: impl Into<Element<'a, Message>>) -> Element<'a, Message> {
    container(content)
        .padding(12)
        .width(Length::Fill)
        .style(|theme: &Theme| {
            let mut color_rgba = theme.palette().background.into_rgba8();
            for channel in color_rgba.iter_mut().take(3) {
                *channel = channel.saturating_add(12);
            }
            Style::default()
                .border(border::rounded(6))
                .background(Color::from_rgb8(color_rgba[0], color_rgba[1], color_rgba[2]))
        })
        .into()
}

/// Application frame: fixed header, page content, footer.
pub fn layout<'a, Message>(content: impl Into<Element<'a, Message>>) -> Element<'a, Message>
where
    Message: 'a,
{
    column![
        container(text("Project Importer").size(22))
            .center_x(Length::Fill)
            .padding(14)
            .style(bordered_box),
        container(content.into()).height(Length::Fill),
        container(text("© 2025").size(12)).center_x(Length::Fill).padding(10),
    ]
    .into()
}
