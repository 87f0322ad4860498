use chrono::Utc;
use eframe::egui;
use egui::{CornerRadius, RichText, ScrollArea, Stroke, Ui};

use crate::comments::CommentThread;
use crate::db::Bookmarks;
use crate::feed::FeedStatus;
use crate::loader::Loader;
use crate::location::Location;
use crate::models::{time_ago, Story, StoryId};
use crate::session::{BookmarksView, FeedView, Session, StorySlot, View};
use crate::theme::AppTheme;

const DARK_MODE_KEY: &str = "is_dark_mode";
const LOCATION_KEY: &str = "location";

// Collected while drawing and applied once the frame is laid out.
enum UiAction {
    Navigate(Location),
    Back,
    Bookmark(StoryId),
    LoadPrevious,
    SentinelSeen {
        sentinel: Option<StoryId>,
        visible: bool,
    },
    OpenLink(String),
    ToggleTheme,
    Retry,
}

pub struct ReaderApp {
    session: Session,
    theme: AppTheme,
    is_dark_mode: bool,
}

impl ReaderApp {
    pub fn new(loader: Loader, bookmarks: Bookmarks, start: Location, is_dark_mode: bool) -> Self {
        Self {
            session: Session::new(loader, bookmarks, start),
            theme: AppTheme::for_mode(is_dark_mode),
            is_dark_mode,
        }
    }

    /// Restores the theme and last location saved by a previous session.
    pub fn restore(
        storage: Option<&dyn eframe::Storage>,
        loader: Loader,
        bookmarks: Bookmarks,
    ) -> Self {
        let mut is_dark_mode = true;
        let mut start = Location::root();

        if let Some(storage) = storage {
            if let Some(value) = storage.get_string(DARK_MODE_KEY) {
                if let Ok(dark) = value.parse::<bool>() {
                    is_dark_mode = dark;
                }
            }
            if let Some(value) = storage.get_string(LOCATION_KEY) {
                start = Location::parse(&value);
            }
        }

        log::info!("starting at {}", start);
        Self::new(loader, bookmarks, start, is_dark_mode)
    }

    fn handle_action(&mut self, action: UiAction) {
        match action {
            UiAction::Navigate(location) => self.session.navigate(location),
            UiAction::Back => self.session.back(),
            UiAction::Bookmark(id) => self.session.bookmark(id),
            UiAction::LoadPrevious => self.session.load_previous(),
            UiAction::SentinelSeen { sentinel, visible } => {
                self.session.sentinel_seen(sentinel, visible)
            }
            UiAction::OpenLink(url) => {
                if let Err(e) = open::that(&url) {
                    log::error!("Failed to open URL {}: {}", url, e);
                }
            }
            UiAction::ToggleTheme => {
                self.is_dark_mode = !self.is_dark_mode;
                self.theme = AppTheme::for_mode(self.is_dark_mode);
            }
            UiAction::Retry => self.session.retry(),
        }
    }

    fn render_top_bar(&mut self, ctx: &egui::Context, actions: &mut Vec<UiAction>) {
        egui::TopBottomPanel::top("address_bar").show(ctx, |ui| {
            ui.add_space(4.0);
            ui.horizontal(|ui| {
                let can_go_back = self.session.history().can_go_back();
                if ui.add_enabled(can_go_back, egui::Button::new("←")).clicked() {
                    actions.push(UiAction::Back);
                }

                let width = ui.available_width() - 48.0;
                let address = ui.add(
                    egui::TextEdit::singleline(self.session.address_mut()).desired_width(width),
                );
                if address.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                    actions.push(UiAction::Navigate(Location::parse(self.session.address())));
                }

                let theme_label = if self.is_dark_mode { "☀" } else { "🌙" };
                if ui.button(theme_label).clicked() {
                    actions.push(UiAction::ToggleTheme);
                }
            });
            if let Some(status) = self.session.status_line() {
                ui.label(RichText::new(status).color(self.theme.secondary_text).small());
            }
            ui.add_space(4.0);
        });
    }

    fn render_view(&self, ui: &mut Ui, actions: &mut Vec<UiAction>) {
        match self.session.view() {
            View::Feed(feed) => self.render_feed(ui, feed, actions),
            View::Bookmarks(view) => self.render_bookmarks(ui, view, actions),
        }
    }

    fn render_feed(&self, ui: &mut Ui, feed: &FeedView, actions: &mut Vec<UiAction>) {
        ui.horizontal(|ui| {
            ui.heading(
                RichText::new("Alternative Hacker News")
                    .color(self.theme.highlight)
                    .strong(),
            );
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("My Bookmarks").clicked() {
                    actions.push(UiAction::Navigate(Location::bookmarks()));
                }
            });
        });
        ui.separator();

        let state = feed.state();
        match state.status() {
            FeedStatus::Loading => {
                ui.label(RichText::new("Loading...").color(self.theme.secondary_text));
            }
            FeedStatus::Error => {
                ui.label(
                    RichText::new(format!(
                        "Could not load top stories: {}",
                        state.error().unwrap_or("unknown error")
                    ))
                    .color(self.theme.error),
                );
                if ui.button("Retry").clicked() {
                    actions.push(UiAction::Retry);
                }
            }
            FeedStatus::Ok => {}
        }

        if state.has_previous() && ui.button("Load Previous").clicked() {
            actions.push(UiAction::LoadPrevious);
        }

        if state.status() != FeedStatus::Ok {
            return;
        }

        let sentinel = feed.sentinel();
        let mut sentinel_visible = false;
        ScrollArea::vertical()
            .id_salt(("feed", self.session.scope()))
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for (_, chunk) in state.visible_chunks() {
                    for id in chunk {
                        // Nothing is drawn for a story until it has loaded.
                        if let Some(StorySlot::Loaded { story, comments }) = feed.slot(*id) {
                            let rect = self.render_story(ui, story, comments.as_ref(), true, actions);
                            if Some(*id) == sentinel {
                                sentinel_visible = ui.is_rect_visible(rect);
                            }
                        }
                    }
                }
            });
        actions.push(UiAction::SentinelSeen {
            sentinel,
            visible: sentinel_visible,
        });
    }

    fn render_bookmarks(&self, ui: &mut Ui, view: &BookmarksView, actions: &mut Vec<UiAction>) {
        ui.horizontal(|ui| {
            ui.heading(RichText::new("My Bookmarks").color(self.theme.highlight).strong());
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("All Articles").clicked() {
                    actions.push(UiAction::Navigate(Location::root()));
                }
            });
        });
        ui.separator();

        let Some(stories) = view.stories() else {
            ui.label(RichText::new("Loading...").color(self.theme.secondary_text));
            return;
        };
        if stories.iter().all(Option::is_none) {
            ui.label(
                RichText::new("No bookmarks yet.")
                    .color(self.theme.secondary_text)
                    .italics(),
            );
            return;
        }

        ScrollArea::vertical()
            .id_salt(("bookmarks", self.session.scope()))
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for story in stories.iter().flatten() {
                    self.render_story(ui, story, view.comments(story.id), false, actions);
                }
            });
    }

    /// Draws one story card with its comments; returns the card's rect.
    fn render_story(
        &self,
        ui: &mut Ui,
        story: &Story,
        comments: Option<&CommentThread>,
        bookmarkable: bool,
        actions: &mut Vec<UiAction>,
    ) -> egui::Rect {
        let card = egui::Frame::new()
            .fill(self.theme.card_background)
            .corner_radius(CornerRadius::same(8))
            .stroke(Stroke::new(1.0, self.theme.separator))
            .inner_margin(12.0)
            .outer_margin(egui::vec2(8.0, 6.0))
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    let title = ui.add(
                        egui::Label::new(
                            RichText::new(&story.title)
                                .color(self.theme.text)
                                .size(16.0)
                                .strong(),
                        )
                        .sense(egui::Sense::click()),
                    );
                    if title.clicked() {
                        actions.push(UiAction::OpenLink(story.link()));
                    }
                    if title.hovered() {
                        ui.output_mut(|o| o.cursor_icon = egui::CursorIcon::PointingHand);
                    }

                    if let Some(domain) = story.domain() {
                        ui.label(
                            RichText::new(format!("({})", domain))
                                .color(self.theme.secondary_text)
                                .italics(),
                        );
                    }

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(
                            RichText::new(format!("{} pts", story.score))
                                .color(self.theme.score_color(story.score))
                                .strong(),
                        );
                    });
                });

                ui.horizontal(|ui| {
                    ui.label(RichText::new("By:").color(self.theme.secondary_text));
                    ui.label(RichText::new(&story.by).color(self.theme.text));
                    ui.label(
                        RichText::new(time_ago(story.time, Utc::now()))
                            .color(self.theme.secondary_text),
                    );
                    ui.label(
                        RichText::new(format!("{} comments", story.descendants))
                            .color(self.theme.secondary_text),
                    );
                    if bookmarkable && ui.button("Bookmark").clicked() {
                        actions.push(UiAction::Bookmark(story.id));
                    }
                });

                ui.add_space(6.0);
                self.render_comments(ui, comments);
            });
        card.response.rect
    }

    fn render_comments(&self, ui: &mut Ui, comments: Option<&CommentThread>) {
        let Some(thread) = comments else {
            ui.label(
                RichText::new("Loading comments...")
                    .color(self.theme.secondary_text)
                    .italics(),
            );
            return;
        };

        for comment in thread.visible() {
            egui::Frame::new()
                .fill(self.theme.comment_background)
                .corner_radius(CornerRadius::same(4))
                .inner_margin(8.0)
                .show(ui, |ui| {
                    ui.label(RichText::new(&comment.by).color(self.theme.highlight).strong());
                    ui.label(RichText::new(comment.plain_text()).color(self.theme.text));
                });
            ui.add_space(4.0);
        }
    }
}

impl eframe::App for ReaderApp {
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        storage.set_string(DARK_MODE_KEY, self.is_dark_mode.to_string());
        storage.set_string(LOCATION_KEY, self.session.history().current().to_string());
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.theme.apply_to_ctx(ctx);
        self.session.process_events();

        let mut actions = Vec::new();
        self.render_top_bar(ctx, &mut actions);
        egui::CentralPanel::default().show(ctx, |ui| {
            self.render_view(ui, &mut actions);
        });

        for action in actions {
            self.handle_action(action);
        }
    }
}
