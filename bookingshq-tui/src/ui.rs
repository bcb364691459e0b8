use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};

use bookingshq_core::{
    AddressField, Bookable, Booking, BookingStatus, Location, Quotable, TaskDetails,
};

use crate::app::{App, FormField, Screen};

pub(crate) fn draw(frame: &mut Frame<'_>, app: &App) {
    let area = frame.area();

    // Outer layout: title, main content, status line
    let layout_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(area);

    let chunks = layout_chunks.as_ref();
    let [header_area, content_area, status_area] = chunks else {
        return;
    };

    let header = Paragraph::new("BookingsHQ – removals, deliveries and transport jobs")
        .block(Block::default().borders(Borders::ALL).title("BookingsHQ"));
    frame.render_widget(header, *header_area);

    match app.screen {
        Screen::BookingList => draw_booking_list(frame, app, *content_area),
        Screen::BookingDetail => draw_booking_detail(frame, app, *content_area),
        Screen::CompletionNotes => draw_completion_notes(frame, app, *content_area),
        Screen::CreateBooking => draw_create_booking(frame, app, *content_area),
    }

    let nav_hint = match app.screen {
        Screen::BookingList => "↑/↓ move · Enter open · n new · f filter · q/Ctrl-C quit",
        Screen::BookingDetail => {
            "p quote · c confirm quote · a advance · x cancel · Esc/b back · Ctrl-C quit"
        }
        Screen::CompletionNotes => "Type notes · Enter complete job · Esc back",
        Screen::CreateBooking => "Tab/↓ next field · Shift-Tab/↑ previous · Enter create · Esc cancel",
    };

    let status_text = if let Some(msg) = &app.error_message {
        format!("{msg} · {nav_hint}")
    } else if let Some(msg) = &app.info_message {
        format!("{msg} · {nav_hint}")
    } else {
        nav_hint.to_owned()
    };

    let status_style = if app.error_message.is_some() {
        Style::default().fg(Color::Red)
    } else {
        Style::default()
    };

    let status = Paragraph::new(status_text)
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .style(status_style)
        .wrap(Wrap { trim: true });

    frame.render_widget(status, *status_area);
}

fn draw_booking_list(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let bookings = app.visible_bookings();
    let items = if bookings.is_empty() {
        vec![ListItem::new("No bookings yet. Press n to create one.")]
    } else {
        bookings
            .iter()
            .map(|booking| {
                ListItem::new(format!(
                    "{} · {} · {} · {} · ${:.2}",
                    booking.customer_name(),
                    booking.title(),
                    booking.task_type(),
                    booking.status(),
                    booking.estimated_cost()
                ))
                .style(Style::default().fg(status_color(booking.status())))
            })
            .collect()
    };

    let filter_label = app
        .status_filter
        .map_or_else(|| "All".to_owned(), |status| status.to_string());

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Bookings ({filter_label})")),
        )
        .highlight_style(Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED));

    let mut state = ListState::default();
    if !bookings.is_empty() {
        state.select(Some(app.list_index));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_booking_detail(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let Some(booking) = app.selected_booking() else {
        let paragraph = Paragraph::new("Booking no longer exists.")
            .block(Block::default().borders(Borders::ALL).title("Booking"));
        frame.render_widget(paragraph, area);
        return;
    };

    let mut lines = vec![
        Line::from(format!("Customer:   {}", booking.customer_name())),
        Line::from(format!("Title:      {}", booking.title())),
        Line::from(format!("Task:       {}", task_summary(booking))),
        Line::styled(
            format!("Status:     {}", booking.status()),
            Style::default().fg(status_color(booking.status())),
        ),
        Line::from(format!(
            "Estimate:   ${:.2}{}",
            booking.estimated_cost(),
            if booking.is_confirmed() {
                " (confirmed)"
            } else {
                ""
            }
        )),
        Line::from(format!(
            "Created:    {}",
            booking.created_at().format("%d.%m.%Y %H:%M")
        )),
        Line::from(format!(
            "Pickup:     {}",
            location_label(booking.location(AddressField::Pickup))
        )),
        Line::from(format!(
            "Dropoff:    {}",
            location_label(booking.location(AddressField::Dropoff))
        )),
        Line::from(""),
        Line::from(format!("Description: {}", booking.description())),
    ];

    if booking.status() == BookingStatus::Completed {
        lines.push(Line::from(format!(
            "Completion notes: {}",
            booking.completion_notes()
        )));
    }

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Booking {}", booking.id())),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn draw_completion_notes(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let title = app
        .selected_booking()
        .map_or_else(|| "Completion notes".to_owned(), |booking| {
            format!("Completion notes for {}", booking.title())
        });
    let paragraph = Paragraph::new(app.notes_input.as_str())
        .block(Block::default().borders(Borders::ALL).title(title))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn draw_create_booking(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let mut constraints: Vec<Constraint> = FormField::ORDER
        .iter()
        .map(|_| Constraint::Length(3))
        .collect();
    constraints.push(Constraint::Min(0));

    let layout_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    for (field, field_area) in FormField::ORDER.iter().zip(layout_chunks.iter()) {
        let mut title = field.label().to_owned();
        if let Some(address) = field.address()
            && app.resolver.is_resolving(address)
        {
            title.push_str(" (resolving…)");
        }
        let border_style = if *field == app.focus {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        let input = Paragraph::new(app.form.value(*field))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(border_style)
                    .title(title),
            )
            .wrap(Wrap { trim: true });
        frame.render_widget(input, *field_area);
    }

    if let Some(map_area) = layout_chunks.get(FormField::ORDER.len()) {
        draw_map_panel(frame, app, *map_area);
    }
}

fn draw_map_panel(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let region = app.resolver.region();
    let lines = vec![
        Line::from(format!(
            "Center: {:.5}, {:.5}",
            region.center.latitude, region.center.longitude
        )),
        Line::from(format!(
            "Span:   {:.4}° × {:.4}°",
            region.span.latitude_delta, region.span.longitude_delta
        )),
        Line::styled(
            format!(
                "P  {}",
                location_label(app.resolver.location(AddressField::Pickup))
            ),
            Style::default().fg(Color::Green),
        ),
        Line::styled(
            format!(
                "D  {}",
                location_label(app.resolver.location(AddressField::Dropoff))
            ),
            Style::default().fg(Color::Red),
        ),
    ];
    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Pickup/Dropoff Locations"),
    );
    frame.render_widget(paragraph, area);
}

fn task_summary(booking: &Booking) -> String {
    match booking.details() {
        TaskDetails::General => booking.task_type().to_string(),
        TaskDetails::Removal {
            from_address,
            to_address,
            item_count,
        } => format!("Removal, {item_count} items, {from_address} → {to_address}"),
        TaskDetails::Delivery {
            delivery_address,
            package_size,
        } => format!("Delivery, {package_size} package to {delivery_address}"),
    }
}

fn location_label(location: Option<&Location>) -> String {
    location.map_or_else(
        || "–".to_owned(),
        |location| {
            format!(
                "{} ({:.4}, {:.4})",
                location.label, location.coordinate.latitude, location.coordinate.longitude
            )
        },
    )
}

fn status_color(status: BookingStatus) -> Color {
    match status {
        BookingStatus::Pending => Color::Green,
        BookingStatus::Confirmed => Color::Blue,
        BookingStatus::InProgress => Color::Yellow,
        BookingStatus::Completed => Color::Gray,
        BookingStatus::Cancelled => Color::Red,
    }
}
