//! The Canvas Model: editable state of exactly one page.
//!
//! `CanvasModel` is the sole mutable owner of a page for the length of an
//! editing session. Every operation here is synchronous and immediate. Local
//! preview handles created through the model are released through its
//! [`PreviewStore`] whenever their owner goes away: removal, replacement,
//! [`CanvasModel::reset`], [`CanvasModel::load_from_persisted`], and drop.

#[cfg(test)]
#[path = "model_test.rs"]
mod model_test;

use std::sync::Arc;

use uuid::Uuid;

use crate::consts::DEFAULT_IMAGE_SEQUENCE_DURATION;
use crate::media::{Direction, LocalFile, MediaSequence, MediaSlot, PreviewStore, SequenceKind};
use crate::page::{
    BackgroundKind, ColoringMode, ImageAnimation, PageTemplate, PartialTextBox, ScrollHeight,
    ScrollLayout, TextBox, TextBoxId, TextBoxLayout, VisualMode, WebView, WebViewSource,
};
use crate::persisted::PersistedPage;

pub struct CanvasModel {
    previews: Arc<dyn PreviewStore>,
    /// Server identity of the page being edited; `None` for a new page.
    page_id: Option<String>,
    /// User-editable page number.
    pub page_number: u32,

    background: MediaSlot,
    background_kind: BackgroundKind,
    background_audio_url: Option<String>,

    scroll: MediaSlot,
    /// Scroll placement; its setters clamp.
    pub scroll_layout: ScrollLayout,

    sound_effect: MediaSlot,
    sound_effect_filename: Option<String>,

    text_boxes: Vec<TextBox>,
    selected: Option<TextBoxId>,

    visual_mode: VisualMode,
    video_sequence: MediaSequence,
    image_sequence: MediaSequence,
    pub image_sequence_duration: f64,
    pub image_sequence_animation: ImageAnimation,

    pub coloring: ColoringMode,
    pub web_view: WebView,
}

impl std::fmt::Debug for CanvasModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CanvasModel")
            .field("page_id", &self.page_id)
            .field("page_number", &self.page_number)
            .field("background", &self.background.reference())
            .field("scroll", &self.scroll.reference())
            .field("text_boxes", &self.text_boxes.len())
            .field("visual_mode", &self.visual_mode)
            .finish_non_exhaustive()
    }
}

impl CanvasModel {
    /// An empty "create new page" model.
    #[must_use]
    pub fn new(previews: Arc<dyn PreviewStore>) -> Self {
        Self {
            previews,
            page_id: None,
            page_number: 1,
            background: MediaSlot::default(),
            background_kind: BackgroundKind::Image,
            background_audio_url: None,
            scroll: MediaSlot::default(),
            scroll_layout: ScrollLayout::default(),
            sound_effect: MediaSlot::default(),
            sound_effect_filename: None,
            text_boxes: Vec::new(),
            selected: None,
            visual_mode: VisualMode::Background,
            video_sequence: MediaSequence::default(),
            image_sequence: MediaSequence::default(),
            image_sequence_duration: DEFAULT_IMAGE_SEQUENCE_DURATION,
            image_sequence_animation: ImageAnimation::KenBurns,
            coloring: ColoringMode::default(),
            web_view: WebView::default(),
        }
    }

    /// The preview store backing this model's local handles.
    #[must_use]
    pub fn previews(&self) -> &Arc<dyn PreviewStore> {
        &self.previews
    }

    #[must_use]
    pub fn page_id(&self) -> Option<&str> {
        self.page_id.as_deref()
    }

    // --- Text boxes ---

    #[must_use]
    pub fn text_boxes(&self) -> &[TextBox] {
        &self.text_boxes
    }

    #[must_use]
    pub fn text_box(&self, id: &str) -> Option<&TextBox> {
        self.text_boxes.iter().find(|b| b.id == id)
    }

    #[must_use]
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Select a text box, or clear the selection. Unknown ids clear it.
    pub fn select(&mut self, id: Option<&str>) {
        self.selected = id
            .filter(|id| self.text_box(id).is_some())
            .map(str::to_owned);
    }

    /// Append a text box with default layout and select it.
    pub fn add_text_box(&mut self) -> TextBoxId {
        let id = Uuid::new_v4().to_string();
        self.text_boxes.push(TextBox::new(id.clone(), TextBoxLayout::default()));
        self.selected = Some(id.clone());
        id
    }

    /// Merge fields into a box, clamped. Returns false if the id is unknown.
    pub fn update_text_box(&mut self, id: &str, partial: &PartialTextBox) -> bool {
        let Some(text_box) = self.text_boxes.iter_mut().find(|b| b.id == id) else {
            return false;
        };
        text_box.apply(partial);
        true
    }

    /// Remove a box. Clears the selection only if it pointed at this box.
    pub fn delete_text_box(&mut self, id: &str) -> bool {
        let before = self.text_boxes.len();
        self.text_boxes.retain(|b| b.id != id);
        if self.selected.as_deref() == Some(id) {
            self.selected = None;
        }
        self.text_boxes.len() != before
    }

    // --- Background ---

    #[must_use]
    pub fn background(&self) -> &MediaSlot {
        &self.background
    }

    #[must_use]
    pub fn background_kind(&self) -> BackgroundKind {
        self.background_kind
    }

    #[must_use]
    pub fn background_audio_url(&self) -> Option<&str> {
        self.background_audio_url.as_deref()
    }

    /// Stage a background file. The returned preview handle renders at once.
    pub fn set_background_source(&mut self, kind: BackgroundKind, file: LocalFile) -> String {
        self.background_kind = kind;
        self.background_audio_url = None;
        self.background.stage(file, self.previews.as_ref())
    }

    /// Use an already-persisted background URL.
    pub fn set_background_url(&mut self, kind: BackgroundKind, url: &str) {
        self.background_kind = kind;
        self.background_audio_url = None;
        self.background.adopt(Some(url), self.previews.as_ref());
    }

    pub fn clear_background(&mut self) {
        self.background_audio_url = None;
        self.background.clear(self.previews.as_ref());
    }

    // --- Scroll ---

    #[must_use]
    pub fn scroll(&self) -> &MediaSlot {
        &self.scroll
    }

    pub fn set_scroll_source(&mut self, file: LocalFile) -> String {
        self.scroll.stage(file, self.previews.as_ref())
    }

    /// Point the scroll at an existing reference (remote URL or local handle)
    /// without a staged file.
    pub fn set_scroll_reference(&mut self, reference: Option<&str>) {
        self.scroll.adopt(reference, self.previews.as_ref());
    }

    pub fn clear_scroll(&mut self) {
        self.scroll.clear(self.previews.as_ref());
    }

    pub fn set_scroll_height(&mut self, height: ScrollHeight) {
        self.scroll_layout.height = height;
    }

    // --- Sound effect ---

    #[must_use]
    pub fn sound_effect(&self) -> &MediaSlot {
        &self.sound_effect
    }

    #[must_use]
    pub fn sound_effect_filename(&self) -> Option<&str> {
        self.sound_effect_filename.as_deref()
    }

    pub fn set_sound_effect(&mut self, file: LocalFile) -> String {
        self.sound_effect_filename = Some(file.name.clone());
        self.sound_effect.stage(file, self.previews.as_ref())
    }

    pub fn clear_sound_effect(&mut self) {
        self.sound_effect_filename = None;
        self.sound_effect.clear(self.previews.as_ref());
    }

    // --- Visual source ---

    #[must_use]
    pub fn visual_mode(&self) -> VisualMode {
        self.visual_mode
    }

    /// Enable or disable video-sequence mode. Enabling turns image-sequence
    /// mode off; staged items of both sequences are kept.
    pub fn toggle_video_sequence_mode(&mut self, on: bool) {
        self.toggle_mode(VisualMode::VideoSequence, on);
    }

    /// Enable or disable image-sequence mode. Enabling turns video-sequence
    /// mode off; staged items of both sequences are kept.
    pub fn toggle_image_sequence_mode(&mut self, on: bool) {
        self.toggle_mode(VisualMode::ImageSequence, on);
    }

    fn toggle_mode(&mut self, mode: VisualMode, on: bool) {
        if on {
            self.visual_mode = mode;
        } else if self.visual_mode == mode {
            self.visual_mode = VisualMode::Background;
        }
    }

    #[must_use]
    pub fn sequence(&self, kind: SequenceKind) -> &MediaSequence {
        match kind {
            SequenceKind::Video => &self.video_sequence,
            SequenceKind::Image => &self.image_sequence,
        }
    }

    fn sequence_mut(&mut self, kind: SequenceKind) -> (&mut MediaSequence, &dyn PreviewStore) {
        let previews = self.previews.as_ref();
        match kind {
            SequenceKind::Video => (&mut self.video_sequence, previews),
            SequenceKind::Image => (&mut self.image_sequence, previews),
        }
    }

    /// Stage a file at the end of a sequence. Returns the new item id.
    pub fn add_sequence_file(&mut self, kind: SequenceKind, file: LocalFile) -> String {
        let (sequence, previews) = self.sequence_mut(kind);
        sequence.push_file(file, previews)
    }

    pub fn reorder_sequence_item(&mut self, kind: SequenceKind, id: &str, direction: Direction) -> bool {
        let (sequence, _) = self.sequence_mut(kind);
        sequence.reorder(id, direction)
    }

    pub fn remove_sequence_item(&mut self, kind: SequenceKind, id: &str) -> bool {
        let (sequence, previews) = self.sequence_mut(kind);
        sequence.remove(id, previews)
    }

    pub fn replace_sequence_file(&mut self, kind: SequenceKind, id: &str, file: LocalFile) -> bool {
        let (sequence, previews) = self.sequence_mut(kind);
        sequence.replace_file(id, file, previews)
    }

    // --- Lifecycle ---

    /// Release every local preview handle the model owns and empty the media.
    pub fn release_all(&mut self) {
        let previews = self.previews.as_ref();
        self.background.clear(previews);
        self.scroll.clear(previews);
        self.sound_effect.clear(previews);
        self.video_sequence.clear(previews);
        self.image_sequence.clear(previews);
    }

    /// Clear to a fresh "create new page" state, then apply the template's
    /// scroll and text boxes if one is given.
    pub fn reset(&mut self, template: Option<&PageTemplate>) {
        self.release_all();
        let previews = Arc::clone(&self.previews);
        *self = Self::new(previews);
        if let Some(template) = template {
            self.apply_template(template);
        }
    }

    /// Lay a template's scroll and text boxes onto the page. Text boxes get
    /// fresh ids; their text is copied as stored in the template.
    pub fn apply_template(&mut self, template: &PageTemplate) {
        if let Some(url) = template.scroll_url.as_deref().filter(|u| !u.is_empty()) {
            self.set_scroll_reference(Some(url));
            self.scroll_layout.height = ScrollHeight::from_percent(f64::from(template.scroll_height));
        }
        self.text_boxes = template
            .text_boxes
            .iter()
            .map(|layout| TextBox::new(Uuid::new_v4().to_string(), layout.clone()))
            .collect();
        self.selected = None;
    }

    /// Capture the page's persisted scroll and its text boxes as a template.
    /// A scroll that is only staged locally is left out.
    #[must_use]
    pub fn layout_template(&self) -> PageTemplate {
        PageTemplate {
            scroll_url: self.scroll.remote_url().map(str::to_owned),
            scroll_height: self.scroll_layout.height.percent(),
            text_boxes: self.text_boxes.iter().map(|b| b.layout.clone()).collect(),
        }
    }

    /// Reset every field from a persisted record.
    ///
    /// Ambiguous fields go through the resolvers on [`PersistedPage`]. Text
    /// boxes are given ids of the form `{page_id}-{index}`.
    pub fn load_from_persisted(&mut self, page: &PersistedPage) {
        self.release_all();
        let previews = Arc::clone(&self.previews);
        *self = Self::new(previews);

        self.page_id = Some(page.id.clone()).filter(|id| !id.is_empty());
        self.page_number = page.page_number.max(1);

        self.background = MediaSlot::remote(page.resolve_background_url());
        self.background_kind = page.resolve_background_kind();
        self.background_audio_url = page.background_audio_url.clone().filter(|u| !u.is_empty());

        self.scroll = MediaSlot::remote(page.resolve_scroll_url());
        self.scroll_layout.height = page.resolve_scroll_height();
        self.scroll_layout.set_offsets(
            page.scroll_offset_x.unwrap_or(0.0),
            page.scroll_offset_y.unwrap_or(0.0),
        );
        if let Some(width) = page.scroll_width {
            self.scroll_layout.set_width(width);
        }

        self.sound_effect = MediaSlot::remote(page.resolve_sound_effect_url());
        self.sound_effect_filename = page.resolve_sound_effect_filename().map(str::to_owned);

        self.text_boxes = page
            .resolve_text_boxes()
            .iter()
            .enumerate()
            .map(|(index, layout)| TextBox::new(format!("{}-{index}", page.id), layout.clone()))
            .collect();

        for item in &page.video_sequence {
            self.video_sequence.push_remote(
                Uuid::new_v4().to_string(),
                item.url.clone(),
                item.filename.clone(),
                item.order,
                item.audio_url.clone(),
            );
        }
        for item in &page.image_sequence {
            self.image_sequence.push_remote(
                Uuid::new_v4().to_string(),
                item.url.clone(),
                item.filename.clone(),
                item.order,
                None,
            );
        }
        self.visual_mode = if page.use_video_sequence {
            VisualMode::VideoSequence
        } else if page.use_image_sequence {
            VisualMode::ImageSequence
        } else {
            VisualMode::Background
        };
        if let Some(duration) = page.image_sequence_duration.filter(|d| *d > 0.0) {
            self.image_sequence_duration = duration;
        }
        self.image_sequence_animation = page.image_sequence_animation.unwrap_or_default();

        self.coloring = ColoringMode::new(page.is_coloring_page, page.coloring_end_modal_only);
        self.web_view = WebView {
            enabled: page.is_web_view_page,
            source: page.web_view_source.unwrap_or(WebViewSource::Url),
            url: page.web_view_url.clone().filter(|u| !u.is_empty()),
            game_id: page.web_view_game_id.clone().filter(|g| !g.is_empty()),
            title: page.web_view_title.clone().filter(|t| !t.is_empty()),
            show_navigation_button: page.show_navigation_button.unwrap_or(true),
        };
    }
}

impl Drop for CanvasModel {
    fn drop(&mut self) {
        self.release_all();
    }
}
