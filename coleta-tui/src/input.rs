use coleta_core::{ContactAction, Route};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, HomeFocus, Request, Screen};

pub(crate) enum Action {
    Quit,
    /// Start the given background calls (possibly none)
    Fetch(Vec<Request>),
}

pub(crate) fn handle_key_event(key: KeyEvent, app: &mut App) -> Action {
    use KeyCode::{Backspace, Char, Down, Enter, Esc, Left, Right, Tab, Up};

    // Global quit shortcuts
    if key.code == Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Action::Quit;
    }
    if key.code == Char('q') && key.modifiers.is_empty() {
        return Action::Quit;
    }

    let mut requests = Vec::new();

    match app.screen {
        Screen::Home => match (app.focus, key.code) {
            (HomeFocus::Regions, Up | Char('k')) => {
                app.region_index = app.region_index.saturating_sub(1);
            }
            (HomeFocus::Regions, Down | Char('j')) => {
                if app.region_index + 1 < app.explorer.regions().len() {
                    app.region_index += 1;
                }
            }
            (HomeFocus::Regions, Enter | Right | Tab | Char(' ')) => {
                requests.extend(app.choose_highlighted_region());
            }
            (HomeFocus::Regions, Char('r')) => {
                requests.push(Request::Regions(app.explorer.request_regions()));
            }
            (HomeFocus::Cities, Up | Char('k')) => {
                app.city_index = app.city_index.saturating_sub(1);
            }
            (HomeFocus::Cities, Down | Char('j')) => {
                if app.city_index + 1 < app.explorer.cities().len() {
                    app.city_index += 1;
                }
            }
            (HomeFocus::Cities, Enter | Char(' ')) => {
                requests.extend(app.choose_highlighted_city());
            }
            (HomeFocus::Cities, Char('r')) => {
                // re-choosing the highlighted region retries its city list
                requests.extend(app.choose_highlighted_region());
            }
            (HomeFocus::Cities, Left | Esc | Backspace) => {
                app.focus = HomeFocus::Regions;
            }
            _ => {}
        },

        Screen::Points => match key.code {
            Up | Char('k') => {
                app.marker_index = app.marker_index.saturating_sub(1);
            }
            Down | Char('j') => {
                if app.marker_index + 1 < app.explorer.markers().len() {
                    app.marker_index += 1;
                }
            }
            Left | Char('h') => {
                app.item_index = app.item_index.saturating_sub(1);
            }
            Right | Char('l') => {
                if app.item_index + 1 < app.items().len() {
                    app.item_index += 1;
                }
            }
            Char(' ') => {
                requests.extend(app.toggle_highlighted_item());
            }
            Char('r') => {
                requests.extend(app.resubmit());
            }
            Enter | Tab => {
                requests.extend(app.open_highlighted_marker());
            }
            Esc | Backspace | Char('b') => {
                requests.extend(app.navigate(Route::Home));
            }
            _ => {}
        },

        Screen::Detail => match key.code {
            Char('w') => app.prepare_contact(ContactAction::whatsapp),
            Char('m') => app.prepare_contact(ContactAction::mail),
            Char('r') => {
                requests.extend(app.retry_detail());
            }
            Left | Esc | Backspace | Char('b') => {
                requests.extend(app.close_detail());
            }
            _ => {}
        },
    }

    Action::Fetch(requests)
}
