use iced::widget::image::Handle;
use iced::widget::{column, scrollable};
use iced::{keyboard, Element, Length, Subscription, Task, Theme};
use std::sync::Arc;
use tracing::{debug, error, warn};

mod config;
mod error;
mod gateway;
mod logging;
mod state;
mod ui;

use config::Config;
use error::{AppError, GatewayError};
use gateway::UnsplashGateway;
use state::controller::{Applied, FetchRequest, RequestId, SearchController};
use state::data::{PerPage, ResultSet};
use ui::grid;
use ui::projection::{project, Projection};
use ui::thumbnail::{ImageCache, ImageLoader, ImageSlot, FULL_SIZE, THUMBNAIL_SIZE};

/// Photo shown in the full-size dialog
#[derive(Debug)]
struct OpenPhoto {
    url: String,
    slot: ImageSlot,
}

/// Main application state
struct PhotoSearch {
    /// Query, paging and results
    controller: SearchController,
    gateway: Arc<UnsplashGateway>,
    images: ImageLoader,
    /// Decoded grid thumbnails of the current page
    thumbnails: ImageCache,
    /// Grid tile under the pointer
    hovered: Option<usize>,
    open_photo: Option<OpenPhoto>,
}

/// Application messages (events)
#[derive(Debug, Clone)]
pub enum Message {
    /// Search field edited
    QueryChanged(String),
    /// Enter pressed or search button clicked
    QuerySubmitted,
    PerPageSelected(PerPage),
    PageSelected(u32),
    NextPage,
    PreviousPage,
    /// Background search finished
    SearchCompleted(RequestId, Result<ResultSet, GatewayError>),
    ThumbnailLoaded(String, Result<Handle, String>),
    ThumbnailHovered(usize),
    ThumbnailUnhovered(usize),
    /// Grid tile clicked
    PhotoOpened(usize),
    FullImageLoaded(String, Result<Handle, String>),
    PhotoClosed,
    ErrorDismissed,
}

impl PhotoSearch {
    /// Create a new instance of the application
    fn new(gateway: Arc<UnsplashGateway>, images: ImageLoader, default_per_page: PerPage) -> (Self, Task<Message>) {
        (
            PhotoSearch {
                controller: SearchController::new(default_per_page),
                gateway,
                images,
                thumbnails: ImageCache::new(),
                hovered: None,
                open_photo: None,
            },
            Task::none(),
        )
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::QueryChanged(text) => {
                self.controller.set_pending_query(text);
                Task::none()
            }
            Message::QuerySubmitted => {
                // Launch search for the committed text
                let request = self.controller.commit_query();
                self.fetch(request)
            }
            Message::PerPageSelected(per_page) => {
                let request = self.controller.set_per_page(per_page);
                self.fetch(request)
            }
            Message::PageSelected(page) => {
                let request = self.controller.set_page(page);
                self.fetch(request)
            }
            Message::NextPage => {
                let request = self.controller.next_page();
                self.fetch(request)
            }
            Message::PreviousPage => {
                let request = self.controller.previous_page();
                self.fetch(request)
            }
            Message::SearchCompleted(id, outcome) => {
                let succeeded = outcome.is_ok();
                match self.controller.apply(id, outcome) {
                    Applied::Fresh if succeeded => {
                        // New page on screen: reset per-tile state and fetch its thumbnails
                        self.hovered = None;
                        self.open_photo = None;
                        self.load_thumbnails()
                    }
                    // Requested page vanished, load the last one instead
                    Applied::Refetch(request) => self.fetch(Some(request)),
                    // Stale reply, or a failure already turned into the error banner
                    _ => Task::none(),
                }
            }
            Message::ThumbnailLoaded(url, result) => {
                self.thumbnails.finish(&url, result);
                Task::none()
            }
            Message::ThumbnailHovered(index) => {
                self.hovered = Some(index);
                Task::none()
            }
            Message::ThumbnailUnhovered(index) => {
                if self.hovered == Some(index) {
                    self.hovered = None;
                }
                Task::none()
            }
            Message::PhotoOpened(index) => {
                let Some(photo) = self.controller.results().and_then(|r| r.items.get(index)) else {
                    return Task::none();
                };

                // Show the dialog right away, the image fills in when decoded
                let url = photo.urls.full.clone();
                debug!(id = %photo.id, "Opening photo");
                self.open_photo = Some(OpenPhoto {
                    url: url.clone(),
                    slot: ImageSlot::Loading,
                });

                Task::perform(self.images.load(url.clone(), FULL_SIZE), move |result| {
                    Message::FullImageLoaded(url.clone(), result)
                })
            }
            Message::FullImageLoaded(url, result) => {
                match &mut self.open_photo {
                    Some(open) if open.url == url => {
                        open.slot = match result {
                            Ok(handle) => ImageSlot::Ready(handle),
                            Err(e) => {
                                warn!("⚠️  {}", e);
                                ImageSlot::Failed
                            }
                        };
                    }
                    // dialog closed or another photo opened meanwhile
                    _ => {}
                }
                Task::none()
            }
            Message::PhotoClosed => {
                self.open_photo = None;
                Task::none()
            }
            Message::ErrorDismissed => {
                self.controller.dismiss_error();
                Task::none()
            }
        }
    }

    /// Run a controller-issued search in the background
    fn fetch(&self, request: Option<FetchRequest>) -> Task<Message> {
        match request {
            Some(request) => Task::perform(
                gateway::execute(self.gateway.clone(), request),
                |(id, outcome)| Message::SearchCompleted(id, outcome),
            ),
            None => Task::none(),
        }
    }

    /// Start downloads for thumbnails of the current results not yet cached,
    /// and forget the ones of previous pages
    fn load_thumbnails(&mut self) -> Task<Message> {
        let Some(results) = self.controller.results() else {
            return Task::none();
        };

        // Forget thumbnails of the previous page
        self.thumbnails
            .retain(results.items.iter().map(|p| p.urls.thumb.as_str()));

        // One download task per thumbnail not cached yet (or failed before)
        let tasks: Vec<Task<Message>> = results
            .items
            .iter()
            .filter(|photo| self.thumbnails.begin(&photo.urls.thumb))
            .map(|photo| {
                let url = photo.urls.thumb.clone();
                Task::perform(self.images.load(url.clone(), THUMBNAIL_SIZE), move |result| {
                    Message::ThumbnailLoaded(url.clone(), result)
                })
            })
            .collect();

        Task::batch(tasks)
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let Projection {
            show_loading,
            show_empty,
            summary_text,
            thumbnails,
            pagination,
            error_text,
        } = project(&self.controller, self.hovered);

        let mut body = column![].spacing(16).padding(20);

        if let Some(message) = error_text {
            body = body.push(grid::error_banner(message));
        }

        if show_loading {
            body = body.push(grid::loading());
        } else {
            if show_empty {
                body = body.push(grid::no_result_found());
            }
            if let Some(summary_text) = summary_text {
                body = body.push(grid::summary(summary_text));
            }
            if !thumbnails.is_empty() {
                body = body.push(grid::thumbnails(thumbnails, &self.thumbnails));
            }
            if let Some(window) = &pagination {
                body = body.push(grid::pagination_bar(window));
            }
        }

        let page: Element<Message> = column![
            grid::toolbar(
                self.controller.pending_query(),
                self.controller.page_request().per_page,
            ),
            scrollable(body).height(Length::Fill),
        ]
        .into();

        match &self.open_photo {
            Some(open) => grid::photo_dialog(page, &open.slot),
            None => page,
        }
    }

    /// Escape closes the photo dialog
    fn subscription(&self) -> Subscription<Message> {
        keyboard::on_key_press(|key, _modifiers| match key {
            keyboard::Key::Named(keyboard::key::Named::Escape) => Some(Message::PhotoClosed),
            _ => None,
        })
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

fn main() -> Result<(), AppError> {
    // Logging first so config errors are reported
    let verbose = std::env::var("PHOTO_SEARCH_VERBOSE").ok();
    logging::init(logging::Verbosity::from_env_value(verbose.as_deref()));

    // Load configuration and build the HTTP clients
    let config = Config::load().inspect_err(|e| error!("{}", e))?;
    let gateway = Arc::new(UnsplashGateway::new(&config)?);
    let images = ImageLoader::new(&config)?;
    let default_per_page = config.default_per_page;

    // Run the application
    iced::application(
        "Photo Search",
        PhotoSearch::update,
        PhotoSearch::view,
    )
    .subscription(PhotoSearch::subscription)
    .theme(PhotoSearch::theme)
    .window_size((1280.0, 860.0))
    .centered()
    .run_with(move || PhotoSearch::new(gateway, images, default_per_page))?;

    Ok(())
}
