use iced::alignment::Vertical;
use iced::widget::{
    button, center, column, container, image, mouse_area, opaque, pick_list, row, stack, text,
    text_input, tooltip, Space,
};
use iced::{Alignment, Color, ContentFit, Element, Length, Theme};
use iced_aw::Wrap;

use super::pagination::{PageItem, PageWindow};
use super::projection::ThumbnailView;
use super::thumbnail::{ImageCache, ImageSlot, THUMBNAIL_SIZE};
use crate::state::data::PerPage;
use crate::Message;

const TILE_SPACING: f32 = 12.0;

/// Search field, search button and per-page selector
pub fn toolbar<'a>(query: &'a str, per_page: PerPage) -> Element<'a, Message> {
    let search = text_input("Search photo", query)
        .on_input(Message::QueryChanged)
        .on_submit(Message::QuerySubmitted)
        .padding(10)
        .width(Length::Fill);

    let per_page = column![
        text("Per Page").size(12),
        pick_list(&PerPage::ALL[..], Some(per_page), Message::PerPageSelected),
    ]
    .spacing(4);

    row![
        text("Search Photos").size(20),
        search,
        button("Search").on_press(Message::QuerySubmitted).padding(10),
        per_page,
    ]
    .spacing(16)
    .padding(16)
    .align_y(Alignment::Center)
    .into()
}

pub fn loading<'a>() -> Element<'a, Message> {
    container(text("Loading photos…").size(16))
        .width(Length::Fill)
        .center_x(Length::Fill)
        .padding(20)
        .into()
}

pub fn no_result_found<'a>() -> Element<'a, Message> {
    container(text("⌛ No result found").size(18))
        .width(Length::Fill)
        .center_x(Length::Fill)
        .padding(40)
        .into()
}

pub fn summary<'a>(summary_text: String) -> Element<'a, Message> {
    text(summary_text).size(14).into()
}

/// Dismissible banner for the last search failure
pub fn error_banner<'a>(message: String) -> Element<'a, Message> {
    let content = row![
        text(message).width(Length::Fill),
        button("Dismiss").on_press(Message::ErrorDismissed).style(button::text),
    ]
    .spacing(12)
    .align_y(Alignment::Center);

    container(content)
        .padding(12)
        .width(Length::Fill)
        .style(|theme: &Theme| {
            let danger = theme.extended_palette().danger.weak;
            container::Style {
                background: Some(danger.color.into()),
                text_color: Some(danger.text),
                ..container::Style::default()
            }
        })
        .into()
}

/// Wrapping grid of thumbnails
pub fn thumbnails<'a>(tiles: Vec<ThumbnailView<'a>>, cache: &ImageCache) -> Element<'a, Message> {
    let elements = tiles
        .into_iter()
        .map(|tile| thumbnail(tile, cache))
        .collect();

    Wrap::with_elements(elements)
        .spacing(TILE_SPACING)
        .line_spacing(TILE_SPACING)
        .into()
}

fn thumbnail<'a>(tile: ThumbnailView<'a>, cache: &ImageCache) -> Element<'a, Message> {
    let size = Length::Fixed(THUMBNAIL_SIZE as f32);

    let picture: Element<'a, Message> = match cache.get(&tile.photo.urls.thumb) {
        Some(ImageSlot::Ready(handle)) => image(handle.clone())
            .width(size)
            .height(size)
            .content_fit(ContentFit::Cover)
            .into(),
        Some(ImageSlot::Failed) => placeholder("Unavailable"),
        _ => placeholder("…"),
    };

    let mut layers = stack![picture];
    if tile.likes_visible {
        let badge = container(text(format!("♥ {}", tile.photo.likes)).color(Color::WHITE))
            .padding([4, 8])
            .style(|_theme| container::Style {
                background: Some(Color { a: 0.6, ..Color::BLACK }.into()),
                ..container::Style::default()
            });
        layers = layers.push(
            container(badge)
                .width(size)
                .height(size)
                .align_y(Vertical::Bottom)
                .padding(8),
        );
    }

    let framed = container(layers).style(if tile.hovered {
        container::bordered_box
    } else {
        container::rounded_box
    });

    let area = mouse_area(framed)
        .on_enter(Message::ThumbnailHovered(tile.index))
        .on_exit(Message::ThumbnailUnhovered(tile.index))
        .on_press(Message::PhotoOpened(tile.index));

    match tile.photo.alt_description.as_deref() {
        Some(description) if !description.is_empty() => tooltip(
            area,
            container(text(description).size(12)).padding(6).style(container::rounded_box),
            tooltip::Position::Bottom,
        )
        .into(),
        _ => area.into(),
    }
}

fn placeholder<'a>(label: &'a str) -> Element<'a, Message> {
    let size = Length::Fixed(THUMBNAIL_SIZE as f32);
    center(text(label).size(12)).width(size).height(size).into()
}

/// Previous/next arrows around the page buttons
pub fn pagination_bar<'a>(window: &PageWindow) -> Element<'a, Message> {
    let mut buttons = row![button("‹")
        .on_press_maybe(window.has_previous().then_some(Message::PreviousPage))
        .style(button::secondary)]
    .spacing(6)
    .align_y(Alignment::Center);

    for item in &window.items {
        buttons = buttons.push(match *item {
            PageItem::Page(n) => {
                let style = if n == window.current { button::primary } else { button::secondary };
                button(text(n.to_string())).on_press(Message::PageSelected(n)).style(style).into()
            }
            PageItem::Ellipsis => Element::from(text("…")),
        });
    }

    buttons = buttons.push(
        button("›")
            .on_press_maybe(window.has_next().then_some(Message::NextPage))
            .style(button::secondary),
    );

    row![Space::with_width(Length::Fill), buttons].into()
}

/// Full-size photo shown over `base`; clicking outside closes it
pub fn photo_dialog<'a>(base: Element<'a, Message>, slot: &ImageSlot) -> Element<'a, Message> {
    let content: Element<'a, Message> = match slot {
        ImageSlot::Ready(handle) => image(handle.clone()).content_fit(ContentFit::Contain).into(),
        ImageSlot::Loading => text("Loading photo…").color(Color::WHITE).into(),
        ImageSlot::Failed => text("Could not load this photo").color(Color::WHITE).into(),
    };

    let backdrop = mouse_area(
        center(opaque(content)).padding(40).style(|_theme| container::Style {
            background: Some(Color { a: 0.8, ..Color::BLACK }.into()),
            ..container::Style::default()
        }),
    )
    .on_press(Message::PhotoClosed);

    stack![base, opaque(backdrop)].into()
}
