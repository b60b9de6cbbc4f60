use lca::zoon::{eprintln, *};
use std::cell::RefCell;
use std::rc::Rc;

use lca::clock::SystemClock;
use lca::editor::Editors;
use lca::platform::browser::{
    IframeSurface, LocalStore, MessageListener, SANDBOX_PERMISSIONS, TextAreaEditor,
    offer_download,
};
use lca::error::InitError;
use lca::relay::{self, LogLine};
use lca::{Playground, Preferences, Project, SourceKind, Theme};

mod logger;
mod view;
use view::BrowserView;

type BrowserPlayground =
    Playground<TextAreaEditor, LocalStore, IframeSurface, BrowserView, SystemClock>;

const LOG_PANEL_HEIGHT_PX: u32 = 200;
const FONT_SIZE_STEP_PX: u32 = 1;

fn main() {
    logger::init();
    match App::init() {
        Ok(app) => start_app("app", move || app.root()),
        Err(error) => eprintln!("Failed to initialize LCA Playground: {error}"),
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum OutputTab {
    Preview,
    Console,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Modal {
    Projects,
    Settings(Preferences),
}

#[derive(Clone)]
struct App {
    playground: Rc<RefCell<BrowserPlayground>>,
    editors: Editors<TextAreaEditor>,
    surface: IframeSurface,
    view: BrowserView,
    output_tab: Mutable<OutputTab>,
    modal: Mutable<Option<Modal>>,
    output_fullscreen: Mutable<bool>,
    _relay_task: Rc<TaskHandle>,
    _message_listener: Rc<MessageListener>,
}

fn page_background(theme: Theme) -> Rgba {
    match theme {
        Theme::Dark => color!("#1b1c18"),
        Theme::Light => color!("#eef0f3"),
    }
}

fn panel_background(theme: Theme) -> Rgba {
    match theme {
        Theme::Dark => color!("#272822"),
        Theme::Light => color!("#ffffff"),
    }
}

fn text_color(theme: Theme) -> Rgba {
    match theme {
        Theme::Dark => color!("#f8f8f2"),
        Theme::Light => color!("#1d2129"),
    }
}

fn log_color(line: &LogLine) -> Rgba {
    if line.is_error() {
        color!("#ff6b6b")
    } else {
        color!("#a6e22e")
    }
}

impl App {
    /// Wires the playground to the page. Nothing is mounted when storage or
    /// the message listener is missing.
    fn init() -> Result<Self, InitError> {
        let store = LocalStore::open()?;
        let (sender, mut receiver) = relay::channel();
        let _message_listener = Rc::new(MessageListener::open(sender)?);

        let editors = Editors::new(
            TextAreaEditor::new(),
            TextAreaEditor::new(),
            TextAreaEditor::new(),
        );
        let surface = IframeSurface::new();
        let view = BrowserView::default();
        let playground = Rc::new(RefCell::new(Playground::init(
            editors.clone(),
            store,
            surface.clone(),
            view.clone(),
            SystemClock,
        )));

        let _relay_task = Rc::new(Task::start_droppable({
            let playground = playground.clone();
            async move {
                while let Some(event) = receiver.next().await {
                    playground.borrow_mut().accept_relay(event);
                }
            }
        }));

        Ok(Self {
            playground,
            editors,
            surface,
            view,
            output_tab: Mutable::new(OutputTab::Preview),
            modal: Mutable::new(None),
            output_fullscreen: Mutable::new(false),
            _relay_task,
            _message_listener,
        })
    }

    fn theme_signal(&self) -> impl Signal<Item = Theme> + use<> {
        self.view.preferences.signal().map(|preferences| preferences.theme)
    }

    fn root(&self) -> impl Element + use<> {
        Stack::new()
            .s(Width::fill())
            .s(Height::fill())
            .s(Background::new().color_signal(self.theme_signal().map(page_background)))
            .s(Font::new().color_signal(self.theme_signal().map(text_color)))
            .update_raw_el({
                let playground = self.playground.clone();
                move |raw_el| {
                    let playground = playground.clone();
                    raw_el.global_event_handler_with_options(
                        EventOptions::new().preventable().parents_first(),
                        move |event: events::KeyDown| {
                            if event.repeat() {
                                return;
                            }
                            if event.shift_key() && event.key() == "Enter" {
                                event.prevent_default();
                                playground.borrow_mut().run();
                            }
                        },
                    )
                }
            })
            .layer(self.main_layout())
            .layer_signal(self.modal.signal().map({
                let this = self.clone();
                move |modal| match modal? {
                    Modal::Projects => Some(Either::Left(this.modal_surface(this.projects_panel()))),
                    Modal::Settings(draft) => {
                        Some(Either::Right(this.modal_surface(this.settings_panel(draft))))
                    }
                }
            }))
    }

    fn main_layout(&self) -> impl Element + use<> {
        Column::new()
            .s(Width::fill())
            .s(Height::fill())
            .s(Padding::all(10))
            .s(Gap::new().y(10))
            .item(self.toolbar())
            .item(
                Row::new()
                    .s(Width::fill())
                    .s(Height::fill())
                    .s(Gap::new().x(10))
                    .item_signal(self.output_fullscreen.signal().map_false({
                        let this = self.clone();
                        move || this.editors_column()
                    }))
                    .item(self.output_column()),
            )
    }

    fn toolbar(&self) -> impl Element + use<> {
        Row::new()
            .s(Width::fill())
            .s(Align::new().center_y())
            .s(Gap::new().x(8))
            .item(
                El::new()
                    .s(Font::new().size(18).weight(FontWeight::SemiBold).no_wrap())
                    .child("LCA Playground"),
            )
            .item(El::new().s(Width::fill()))
            .item(self.action_button("Run", {
                let playground = self.playground.clone();
                move || {
                    playground.borrow_mut().run();
                }
            }))
            .item(self.action_button("Save", {
                let playground = self.playground.clone();
                move || {
                    playground.borrow_mut().save();
                }
            }))
            .item(self.action_button("New", {
                let playground = self.playground.clone();
                move || playground.borrow_mut().new_project()
            }))
            .item(self.action_button("Download", {
                let playground = self.playground.clone();
                move || {
                    let archive = playground.borrow().download();
                    match archive {
                        Ok(archive) => {
                            if let Err(error) = offer_download(&archive) {
                                eprintln!("Failed to offer download: {error:#?}");
                            }
                        }
                        Err(error) => eprintln!("Failed to build project archive: {error}"),
                    }
                }
            }))
            .item(self.action_button("Projects", {
                let modal = self.modal.clone();
                move || modal.set(Some(Modal::Projects))
            }))
            .item(self.action_button("Settings", {
                let modal = self.modal.clone();
                let preferences = self.view.preferences.clone();
                move || modal.set(Some(Modal::Settings(preferences.get())))
            }))
    }

    fn action_button(
        &self,
        label: &'static str,
        on_press: impl FnMut() + 'static,
    ) -> impl Element + use<> {
        let hovered = Mutable::new(false);
        Button::new()
            .s(Padding::new().x(14).y(6))
            .s(RoundedCorners::all(6))
            .s(Font::new().weight(FontWeight::Medium).no_wrap())
            .s(Background::new().color_signal(hovered.signal().map_bool(
                || color!("rgba(102, 217, 239, 0.45)"),
                || color!("rgba(102, 217, 239, 0.2)"),
            )))
            .on_hovered_change(move |is_hovered| hovered.set_neq(is_hovered))
            .label(El::new().child(label))
            .on_press(on_press)
    }

    fn editors_column(&self) -> impl Element + use<> {
        Column::new()
            .s(Width::percent(50))
            .s(Height::fill())
            .s(Gap::new().y(8))
            .items(SourceKind::ALL.map(|kind| self.editor_panel(kind)))
    }

    fn editor_panel(&self, kind: SourceKind) -> impl Element + use<> {
        let editor = self.editors.get(kind).clone();
        let preferences = editor.preferences_mutable().clone();
        Column::new()
            .s(Width::fill())
            .s(Height::fill())
            .s(Gap::new().y(4))
            .item(
                El::new()
                    .s(Font::new().size(13).weight(FontWeight::SemiBold))
                    .child(kind.label()),
            )
            .item(
                TextArea::new()
                    .s(Width::fill())
                    .s(Height::fill())
                    .s(Padding::all(8))
                    .s(RoundedCorners::all(6))
                    .s(Font::new()
                        .family([FontFamily::new("JetBrains Mono"), FontFamily::Monospace])
                        .size_signal(preferences.signal().map(|preferences| preferences.font_size_px))
                        .color_signal(preferences.signal().map(|preferences| text_color(preferences.theme))))
                    .s(Background::new().color_signal(
                        preferences.signal().map(|preferences| panel_background(preferences.theme)),
                    ))
                    .update_raw_el({
                        let preferences = preferences.clone();
                        move |raw_el| {
                            raw_el
                                .attr("spellcheck", "false")
                                .attr_signal(
                                    "data-editor-theme",
                                    preferences
                                        .signal()
                                        .map(|preferences| preferences.theme.editor_theme()),
                                )
                        }
                    })
                    .label_hidden(kind.label())
                    .text_signal(editor.text_mutable().signal_cloned())
                    .on_change({
                        let text = editor.text_mutable().clone();
                        let playground = self.playground.clone();
                        move |new_text| {
                            text.set_neq(new_text);
                            playground.borrow_mut().source_changed(kind);
                        }
                    }),
            )
    }

    fn output_column(&self) -> impl Element + use<> {
        Column::new()
            .s(Width::fill())
            .s(Height::fill())
            .s(Gap::new().y(6))
            .item(
                Row::new()
                    .s(Gap::new().x(6))
                    .item(self.tab_button("Preview", OutputTab::Preview))
                    .item(self.tab_button("Console", OutputTab::Console))
                    .item(self.fullscreen_button()),
            )
            .item(
                Stack::new()
                    .s(Width::fill())
                    .s(Height::fill())
                    .layer(self.preview())
                    .layer_signal(
                        self.output_tab
                            .signal()
                            .map(|tab| tab == OutputTab::Console)
                            .map_true({
                                let this = self.clone();
                                move || this.log_panel()
                            }),
                    ),
            )
    }

    fn fullscreen_button(&self) -> impl Element + use<> {
        let fullscreen = self.output_fullscreen.clone();
        Button::new()
            .s(Align::new().right())
            .s(Padding::new().x(12).y(4))
            .s(RoundedCorners::all(6))
            .s(Background::new().color(color!("rgba(102, 217, 239, 0.2)")))
            .label(
                El::new().child_signal(
                    fullscreen
                        .signal()
                        .map_bool(|| "Exit Fullscreen", || "Fullscreen"),
                ),
            )
            .on_press(move || fullscreen.set(!fullscreen.get()))
    }

    fn tab_button(&self, label: &'static str, tab: OutputTab) -> impl Element + use<> {
        Button::new()
            .s(Padding::new().x(12).y(4))
            .s(RoundedCorners::all(6))
            .s(Background::new().color_signal(self.output_tab.signal().map(move |active| {
                if active == tab {
                    color!("rgba(166, 226, 46, 0.35)")
                } else {
                    color!("rgba(0, 0, 0, 0)")
                }
            })))
            .label(El::new().child(label))
            .on_press({
                let output_tab = self.output_tab.clone();
                move || output_tab.set_neq(tab)
            })
    }

    fn preview(&self) -> impl Element + use<> {
        El::new()
            .s(Width::fill())
            .s(Height::fill())
            .s(RoundedCorners::all(6))
            .s(Clip::both())
            .s(Background::new().color(color!("#ffffff")))
            .child(
                RawHtmlEl::new("iframe")
                    .attr("sandbox", SANDBOX_PERMISSIONS)
                    .attr("title", "Preview")
                    .style("width", "100%")
                    .style("height", "100%")
                    .style("border", "none")
                    .attr_signal("srcdoc", self.surface.srcdoc_signal()),
            )
    }

    fn log_panel(&self) -> impl Element + use<> {
        Column::new()
            .s(Width::fill())
            .s(Height::exact(LOG_PANEL_HEIGHT_PX))
            .s(Padding::all(8))
            .s(Gap::new().y(2))
            .s(RoundedCorners::all(6))
            .s(Scrollbars::both())
            .s(Background::new().color(color!("#1e1e1e")))
            .s(Font::new().size(13).family([FontFamily::new("JetBrains Mono"), FontFamily::Monospace]))
            .items_signal_vec(self.view.log.signal_vec_cloned().map(|line| {
                El::new()
                    .s(Font::new().color(log_color(&line)))
                    .child(line.text)
            }))
    }

    fn modal_surface<T: Element>(&self, content: T) -> impl Element + use<T> {
        El::new()
            .s(Width::fill())
            .s(Height::fill())
            .s(Background::new().color(color!("rgba(0, 0, 0, 0.55)")))
            .child(
                Column::new()
                    .s(Align::center())
                    .s(Width::exact(420))
                    .s(Padding::all(16))
                    .s(Gap::new().y(12))
                    .s(RoundedCorners::all(10))
                    .s(Background::new().color_signal(self.theme_signal().map(panel_background)))
                    .item(content)
                    .item(self.action_button("Close", {
                        let modal = self.modal.clone();
                        move || modal.set(None)
                    })),
            )
    }

    fn projects_panel(&self) -> impl Element + use<> {
        Column::new()
            .s(Width::fill())
            .s(Height::exact(360))
            .s(Scrollbars::both())
            .s(Gap::new().y(6))
            .item(El::new().s(Font::new().size(16).weight(FontWeight::SemiBold)).child("Saved projects"))
            .items_signal_vec(self.view.projects.signal_vec_cloned().enumerate().map({
                let this = self.clone();
                move |(index, project)| this.project_item(index.get().unwrap_or_default(), project)
            }))
    }

    fn project_item(&self, index: usize, project: Project) -> impl Element + use<> {
        let hovered = Mutable::new(false);
        let id = project.id();
        Button::new()
            .s(Width::fill())
            .s(Padding::new().x(10).y(6))
            .s(RoundedCorners::all(6))
            .s(Background::new().color_signal(hovered.signal().map_bool(
                || color!("rgba(102, 217, 239, 0.25)"),
                || color!("rgba(0, 0, 0, 0)"),
            )))
            .on_hovered_change(move |is_hovered| hovered.set_neq(is_hovered))
            .label(
                Row::new()
                    .s(Width::fill())
                    .s(Gap::new().x(10))
                    .item(El::new().child(format!("Project {}", index + 1)))
                    .item(
                        El::new()
                            .s(Align::new().right())
                            .s(Font::new().size(12))
                            .child(local_time(&project)),
                    ),
            )
            .on_press({
                let playground = self.playground.clone();
                let modal = self.modal.clone();
                move || {
                    if playground.borrow_mut().load_by_id(id) {
                        modal.set(None);
                    }
                }
            })
    }

    /// Every control takes effect and is stored at once. "Save Settings"
    /// stores all three again and closes the panel.
    fn settings_panel(&self, current: Preferences) -> impl Element + use<> {
        let change = {
            let playground = self.playground.clone();
            let modal = self.modal.clone();
            move |change: &dyn Fn(&mut BrowserPlayground)| {
                let preferences = {
                    let mut playground = playground.borrow_mut();
                    change(&mut *playground);
                    *playground.preferences()
                };
                modal.set(Some(Modal::Settings(preferences)));
            }
        };
        Column::new()
            .s(Width::fill())
            .s(Gap::new().y(10))
            .item(El::new().s(Font::new().size(16).weight(FontWeight::SemiBold)).child("Settings"))
            .item(
                Row::new()
                    .s(Gap::new().x(8))
                    .item(El::new().s(Width::exact(90)).child("Theme"))
                    .items([Theme::Dark, Theme::Light].map(|theme| {
                        let change = change.clone();
                        let marker = if current.theme == theme { "● " } else { "" };
                        self.action_button_owned(format!("{marker}{theme}"), move || {
                            change(&|playground: &mut BrowserPlayground| playground.change_theme(theme))
                        })
                    })),
            )
            .item(
                Row::new()
                    .s(Gap::new().x(8))
                    .item(El::new().s(Width::exact(90)).child("Font size"))
                    .item(self.action_button("−", {
                        let change = change.clone();
                        let px = current.font_size_px.saturating_sub(FONT_SIZE_STEP_PX);
                        move || change(&|playground: &mut BrowserPlayground| playground.change_font_size(px))
                    }))
                    .item(El::new().child(format!("{}px", current.font_size_px)))
                    .item(self.action_button("+", {
                        let change = change.clone();
                        let px = current.font_size_px + FONT_SIZE_STEP_PX;
                        move || change(&|playground: &mut BrowserPlayground| playground.change_font_size(px))
                    })),
            )
            .item(
                Row::new()
                    .s(Gap::new().x(8))
                    .item(El::new().s(Width::exact(90)).child("Auto-run"))
                    .item(self.action_button_owned(
                        if current.auto_run { "On" } else { "Off" }.to_owned(),
                        {
                            let change = change.clone();
                            let enabled = !current.auto_run;
                            move || change(&|playground: &mut BrowserPlayground| playground.toggle_auto_run(enabled))
                        },
                    )),
            )
            .item(self.action_button("Save Settings", {
                let playground = self.playground.clone();
                let modal = self.modal.clone();
                move || {
                    let preferences = *playground.borrow().preferences();
                    playground.borrow_mut().apply_settings(preferences);
                    modal.set(None);
                }
            }))
    }

    fn action_button_owned(
        &self,
        label: String,
        on_press: impl FnMut() + 'static,
    ) -> impl Element + use<> {
        Button::new()
            .s(Padding::new().x(12).y(6))
            .s(RoundedCorners::all(6))
            .s(Background::new().color(color!("rgba(102, 217, 239, 0.2)")))
            .label(El::new().child(label))
            .on_press(on_press)
    }
}

/// Creation time in the visitor's locale.
fn local_time(project: &Project) -> String {
    let millis = project.created_at().timestamp_millis() as f64;
    js_sys::Date::new(&wasm_bindgen::JsValue::from_f64(millis))
        .to_locale_string("default", &wasm_bindgen::JsValue::UNDEFINED)
        .into()
}
