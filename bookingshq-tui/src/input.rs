use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use bookingshq_core::AddressField;

use crate::app::{App, Screen};

#[derive(Debug, Clone, Copy)]
pub(crate) enum Action {
    None,
    Quit,
    /// Feed the edited address text to the resolver
    AddressEdited(AddressField),
}

pub(crate) fn handle_key_event(key: KeyEvent, app: &mut App) -> Action {
    use KeyCode::{BackTab, Backspace, Char, Down, Enter, Esc, Tab, Up};

    // Global quit shortcut
    if key.code == Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Action::Quit;
    }

    let mut action = Action::None;

    match app.screen {
        Screen::BookingList => match key.code {
            Char('q') => return Action::Quit,
            Up | Char('k') => {
                app.list_index = app.list_index.saturating_sub(1);
            }
            Down | Char('j') => {
                if app.list_index + 1 < app.visible_bookings().len() {
                    app.list_index += 1;
                }
            }
            Enter | Char(' ') => {
                app.open_current_booking();
            }
            Char('n') => {
                app.start_new_booking();
            }
            Char('f') => {
                app.cycle_filter();
            }
            _ => {}
        },

        Screen::BookingDetail => match key.code {
            Char('p') => app.quote_selected(),
            Char('c') => app.confirm_selected(),
            Char('a') => app.advance_selected(),
            Char('x') => app.cancel_selected(),
            Esc | Char('b') => {
                app.screen = Screen::BookingList;
            }
            _ => {}
        },

        Screen::CompletionNotes => match key.code {
            Char(character) if !is_chorded(key.modifiers) => {
                app.notes_input.push(character);
            }
            Backspace => {
                app.notes_input.pop();
            }
            Enter => app.complete_selected(),
            Esc => {
                app.screen = Screen::BookingDetail;
            }
            _ => {}
        },

        Screen::CreateBooking => match key.code {
            Tab | Down => {
                app.focus = app.focus.next();
            }
            BackTab | Up => {
                app.focus = app.focus.previous();
            }
            Char(character) if !is_chorded(key.modifiers) => {
                app.form.value_mut(app.focus).push(character);
                action = edited(app);
            }
            Backspace => {
                app.form.value_mut(app.focus).pop();
                action = edited(app);
            }
            Enter => {
                if app.form.is_submittable() {
                    app.submit_new_booking();
                } else {
                    app.error_message = Some("Customer name and title are required".into());
                }
            }
            Esc => app.cancel_new_booking(),
            _ => {}
        },
    }
    action
}

fn is_chorded(modifiers: KeyModifiers) -> bool {
    modifiers.contains(KeyModifiers::CONTROL) || modifiers.contains(KeyModifiers::ALT)
}

fn edited(app: &App) -> Action {
    app.focus
        .address()
        .map_or(Action::None, Action::AddressEdited)
}
